use anyhow::{Context as _, Result};
use std::path::Path;

use super::{Applicable, ResourceChange};

/// Explicit permission bits for an existing path (Unix only).
///
/// Creation modes are filtered by the umask; this resource sets the exact
/// bits afterwards.
#[derive(Debug, Clone, Copy)]
pub struct ChmodResource<'a> {
    /// Target path.
    pub target: &'a Path,
    /// Permission bits.
    pub mode: u32,
}

impl<'a> ChmodResource<'a> {
    /// Create a new chmod resource.
    #[must_use]
    pub const fn new(target: &'a Path, mode: u32) -> Self {
        Self { target, mode }
    }
}

impl Applicable for ChmodResource<'_> {
    fn description(&self) -> String {
        format!("chmod {:o} {}", self.mode, self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let current = std::fs::metadata(self.target)
                .with_context(|| format!("read permissions: {}", self.target.display()))?
                .permissions()
                .mode()
                & 0o777;
            if current == self.mode {
                return Ok(ResourceChange::AlreadyCorrect);
            }

            std::fs::set_permissions(self.target, std::fs::Permissions::from_mode(self.mode))
                .with_context(|| format!("set permissions: {}", self.target.display()))?;

            Ok(ResourceChange::Applied)
        }

        #[cfg(not(unix))]
        {
            Ok(ResourceChange::Skipped {
                reason: "chmod not supported on this platform".to_string(),
            })
        }
    }
}
