//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the apply step can be
//! unit-tested without touching the real filesystem.  Production code uses
//! [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use anyhow::{Context as _, Result};
use std::path::Path;
use tracing::debug;

use crate::render::OutputEntry;
use crate::resources::{self, ResourceChange};

/// Abstraction over the filesystem calls made while applying a render.
///
/// Implement this trait to swap in a mock during unit tests, keeping the
/// apply policy independent of real I/O.  The production implementation is
/// [`SystemFileSystemOps`].
pub trait FileSystemOps: std::fmt::Debug {
    /// Returns `true` if anything occupies `path`, without following a
    /// final symlink.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` is a directory (following symlinks).
    fn is_dir(&self, path: &Path) -> bool;

    /// Create `path` and any missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Materialize `entry` at its destination path.
    ///
    /// With `preserve`, the entry's mode and ownership are applied
    /// explicitly after the write.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the write fails.
    fn write(&self, entry: &OutputEntry, preserve: bool) -> Result<()>;

    /// Remove the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove_file(&self, path: &Path) -> Result<()>;
}

/// Production [`FileSystemOps`] implementation backed by [`resources`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        resources::helpers::fs::occupied(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("create directory: {}", path.display()))
    }

    fn write(&self, entry: &OutputEntry, preserve: bool) -> Result<()> {
        for resource in resources::for_entry(entry, preserve) {
            match resource.apply()? {
                ResourceChange::Applied => debug!("applied: {}", resource.description()),
                ResourceChange::AlreadyCorrect => {
                    debug!("already correct: {}", resource.description());
                }
                ResourceChange::Skipped { reason } => {
                    debug!("skipped: {} ({reason})", resource.description());
                }
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("remove file: {}", path.display()))
    }
}

/// A filesystem call recorded by `MockFileSystemOps`.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    /// [`FileSystemOps::create_dir_all`].
    CreateDirAll(std::path::PathBuf),
    /// [`FileSystemOps::write`].
    Write {
        /// Destination path of the entry.
        path: std::path::PathBuf,
        /// Whether metadata was preserved.
        preserve: bool,
    },
    /// [`FileSystemOps::remove_file`].
    RemoveFile(std::path::PathBuf),
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure existing paths and failing paths with the builder-style
/// methods, run the code under test, then inspect [`MockFileSystemOps::calls`].
/// Writes and directory creation mark their path as existing; removals clear
/// it.
///
/// # Example
///
/// ```ignore
/// use mirdir::operations::MockFileSystemOps;
///
/// let fs = MockFileSystemOps::new()
///     .with_existing("/dst/app.conf")
///     .failing_on("/dst/locked");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    existing: std::sync::Mutex<std::collections::HashSet<std::path::PathBuf>>,
    dirs: std::collections::HashSet<std::path::PathBuf>,
    failing: std::collections::HashSet<std::path::PathBuf>,
    calls: std::sync::Mutex<Vec<FsCall>>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as existing.
    #[must_use]
    pub fn with_existing(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.existing
            .lock()
            .expect("mock existing set poisoned")
            .insert(path.into());
        self
    }

    /// Mark `path` as an existing directory.
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        let p = path.into();
        self.dirs.insert(p.clone());
        self.with_existing(p)
    }

    /// Make every mutating call on `path` fail.
    #[must_use]
    pub fn failing_on(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<FsCall> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    fn record(&self, call: FsCall, path: &Path) -> Result<()> {
        self.calls.lock().expect("mock call log poisoned").push(call);
        if self.failing.contains(path) {
            anyhow::bail!("mock: configured failure for {}", path.display());
        }
        Ok(())
    }

    fn set_existing(&self, path: &Path, present: bool) {
        let mut existing = self.existing.lock().expect("mock existing set poisoned");
        if present {
            existing.insert(path.to_path_buf());
        } else {
            existing.remove(path);
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.existing
            .lock()
            .expect("mock existing set poisoned")
            .contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.record(FsCall::CreateDirAll(path.to_path_buf()), path)?;
        self.set_existing(path, true);
        Ok(())
    }

    fn write(&self, entry: &OutputEntry, preserve: bool) -> Result<()> {
        let call = FsCall::Write {
            path: entry.path.clone(),
            preserve,
        };
        self.record(call, &entry.path)?;
        self.set_existing(&entry.path, true);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.record(FsCall::RemoveFile(path.to_path_buf()), path)?;
        self.set_existing(path, false);
        Ok(())
    }
}
