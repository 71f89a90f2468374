//! Directory resource.
use anyhow::{Context as _, Result};
use std::path::Path;

use super::{Applicable, ResourceChange};

/// A directory to create, along with any missing ancestors.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryResource<'a> {
    /// Directory path.
    pub path: &'a Path,
    /// Mode for newly created directories, before the umask.
    pub mode: u32,
}

impl<'a> DirectoryResource<'a> {
    /// Create a new directory resource.
    #[must_use]
    pub const fn new(path: &'a Path, mode: u32) -> Self {
        Self { path, mode }
    }
}

impl Applicable for DirectoryResource<'_> {
    fn description(&self) -> String {
        format!("mkdir {}", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.path.is_dir() {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.mode);
        }
        builder
            .create(self.path)
            .with_context(|| format!("create directory: {}", self.path.display()))?;

        Ok(ResourceChange::Applied)
    }
}
