use anyhow::{Context as _, Result};
use std::path::Path;

use super::{Applicable, ResourceChange};

/// Owner and group for a path; symlinks are changed themselves, not followed.
#[derive(Debug, Clone, Copy)]
pub struct ChownResource<'a> {
    /// Target path.
    pub target: &'a Path,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
}

impl<'a> ChownResource<'a> {
    /// Create a new chown resource.
    #[must_use]
    pub const fn new(target: &'a Path, uid: u32, gid: u32) -> Self {
        Self { target, uid, gid }
    }
}

impl Applicable for ChownResource<'_> {
    fn description(&self) -> String {
        format!("chown {}:{} {}", self.uid, self.gid, self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;

            let meta = std::fs::symlink_metadata(self.target)
                .with_context(|| format!("read ownership: {}", self.target.display()))?;
            if meta.uid() == self.uid && meta.gid() == self.gid {
                return Ok(ResourceChange::AlreadyCorrect);
            }

            std::os::unix::fs::lchown(self.target, Some(self.uid), Some(self.gid))
                .with_context(|| {
                    format!(
                        "change owner to {}:{}: {}",
                        self.uid,
                        self.gid,
                        self.target.display()
                    )
                })?;

            Ok(ResourceChange::Applied)
        }

        #[cfg(not(unix))]
        {
            Ok(ResourceChange::Skipped {
                reason: "chown not supported on this platform".to_string(),
            })
        }
    }
}
