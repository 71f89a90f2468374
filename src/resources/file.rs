//! Regular file resource.
use anyhow::{Context as _, Result};
use std::io::Write as _;
use std::path::Path;

use super::{Applicable, ResourceChange};

/// File content to write, truncating any existing file.
#[derive(Debug, Clone, Copy)]
pub struct FileResource<'a> {
    /// File path.
    pub path: &'a Path,
    /// Bytes to write.
    pub content: &'a [u8],
    /// Mode for a newly created file, before the umask.
    pub mode: u32,
}

impl<'a> FileResource<'a> {
    /// Create a new file resource.
    #[must_use]
    pub const fn new(path: &'a Path, content: &'a [u8], mode: u32) -> Self {
        Self {
            path,
            content,
            mode,
        }
    }
}

impl Applicable for FileResource<'_> {
    fn description(&self) -> String {
        format!("write {}", self.path.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.mode);
        }

        let mut file = options
            .open(self.path)
            .with_context(|| format!("open for writing: {}", self.path.display()))?;
        file.write_all(self.content)
            .with_context(|| format!("write: {}", self.path.display()))?;

        Ok(ResourceChange::Applied)
    }
}
