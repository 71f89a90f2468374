//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::{Applicable, ResourceChange};

/// A symbolic link to create at `link`, replacing whatever is there.
#[derive(Debug, Clone, Copy)]
pub struct SymlinkResource<'a> {
    /// Target text the link points to, stored verbatim.
    pub target: &'a str,
    /// Path where the link is created.
    pub link: &'a Path,
}

impl<'a> SymlinkResource<'a> {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(target: &'a str, link: &'a Path) -> Self {
        Self { target, link }
    }
}

impl Applicable for SymlinkResource<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.link.display(), self.target)
    }

    fn apply(&self) -> Result<ResourceChange> {
        if let Ok(existing) = std::fs::read_link(self.link)
            && existing.as_os_str() == self.target
        {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        super::helpers::fs::remove_existing(self.link)?;
        create_symlink(Path::new(self.target), self.link)?;

        Ok(ResourceChange::Applied)
    }
}

fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        // Relative targets are resolved against the link's directory.
        let resolved = link.parent().map_or_else(|| target.to_path_buf(), |p| p.join(target));
        let result = if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(not(any(unix, windows)))]
    {
        anyhow::bail!(
            "symlinks not supported on this platform: {} -> {}",
            link.display(),
            target.display()
        );
    }

    Ok(())
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn description_shows_link_and_target() {
        let resource = SymlinkResource::new("../a", Path::new("/dst/b"));
        assert_eq!(resource.description(), "/dst/b -> ../a");
    }

    #[test]
    fn creates_dangling_link_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        let change = SymlinkResource::new("missing/target", &link).apply().unwrap();
        assert_eq!(change, ResourceChange::Applied);
        assert_eq!(
            std::fs::read_link(&link).unwrap(),
            Path::new("missing/target")
        );
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::fs::write(&link, "old").unwrap();
        SymlinkResource::new("elsewhere", &link).apply().unwrap();
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[test]
    fn replaces_link_with_other_target() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("one", &link).unwrap();
        SymlinkResource::new("two", &link).apply().unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap(), Path::new("two"));
    }

    #[test]
    fn same_target_is_already_correct() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("same", &link).unwrap();
        let change = SymlinkResource::new("same", &link).apply().unwrap();
        assert_eq!(change, ResourceChange::AlreadyCorrect);
    }

    #[test]
    fn non_empty_directory_in_the_way_fails() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("busy");
        std::fs::create_dir(&link).unwrap();
        std::fs::write(link.join("f"), "x").unwrap();
        assert!(SymlinkResource::new("x", &link).apply().is_err());
    }
}
