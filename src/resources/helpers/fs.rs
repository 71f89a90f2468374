//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::path::Path;

/// `true` if anything (including a dangling symlink) occupies `path`.
#[must_use]
pub fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Remove whatever occupies `path` without following symlinks.
///
/// Files and links are unlinked; a directory is removed only if it is empty.
/// Does nothing if `path` does not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        std::fs::remove_dir(path)
            .with_context(|| format!("remove existing directory: {}", path.display()))?;
    } else {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}
