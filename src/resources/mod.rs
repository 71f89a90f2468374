//! Filesystem write primitives used when applying a render.
//!
//! Each output entry is turned into a short sequence of [`Applicable`]
//! resources by [`for_entry`]: the primary write (directory, file or link)
//! followed, when metadata is preserved, by a mode change and an ownership
//! change.
pub mod chmod;
pub mod chown;
pub mod directory;
pub mod file;
pub mod helpers;
pub mod symlink;

use anyhow::Result;

use crate::catalog::Payload;
use crate::render::OutputEntry;

/// Something that can be described and written to the filesystem.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying filesystem call fails.
    fn apply(&self) -> Result<ResourceChange>;
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use mirdir::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "unsupported platform".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// assert_ne!(noop, skipped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already in place (no change needed).
    AlreadyCorrect,
    /// Resource could not be applied on this platform.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Resources that bring the destination in line with `entry`, in the order
/// they must be applied.
#[must_use]
pub fn for_entry(entry: &OutputEntry, preserve: bool) -> Vec<Box<dyn Applicable + '_>> {
    let path = entry.path.as_path();
    let primary: Box<dyn Applicable + '_> = match &entry.payload {
        Payload::Directory => Box::new(directory::DirectoryResource::new(path, entry.mode)),
        Payload::File(content) => Box::new(file::FileResource::new(path, content, entry.mode)),
        Payload::Symlink(target) => Box::new(symlink::SymlinkResource::new(target, path)),
    };
    let mut resources = vec![primary];
    if preserve {
        // Link permissions cannot be changed on Linux; only their owner.
        if !matches!(entry.payload, Payload::Symlink(_)) {
            resources.push(Box::new(chmod::ChmodResource::new(path, entry.mode)));
        }
        resources.push(Box::new(chown::ChownResource::new(path, entry.uid, entry.gid)));
    }
    resources
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn output(payload: Payload) -> OutputEntry {
        OutputEntry {
            path: PathBuf::from("/dst/x"),
            payload,
            uid: 1,
            gid: 2,
            mode: 0o640,
            source: 0,
        }
    }

    fn descriptions(entry: &OutputEntry, preserve: bool) -> Vec<String> {
        for_entry(entry, preserve)
            .iter()
            .map(|r| r.description())
            .collect()
    }

    #[test]
    fn file_without_preserve_is_a_single_write() {
        let entry = output(Payload::File(b"x".to_vec()));
        assert_eq!(descriptions(&entry, false), vec!["write /dst/x"]);
    }

    #[test]
    fn file_with_preserve_sets_mode_then_owner() {
        let entry = output(Payload::File(b"x".to_vec()));
        assert_eq!(
            descriptions(&entry, true),
            vec!["write /dst/x", "chmod 640 /dst/x", "chown 1:2 /dst/x"]
        );
    }

    #[test]
    fn symlink_with_preserve_only_changes_owner() {
        let entry = output(Payload::Symlink("target".into()));
        assert_eq!(
            descriptions(&entry, true),
            vec!["/dst/x -> target", "chown 1:2 /dst/x"]
        );
    }

    #[test]
    fn directory_with_preserve() {
        let entry = output(Payload::Directory);
        assert_eq!(
            descriptions(&entry, true),
            vec!["mkdir /dst/x", "chmod 640 /dst/x", "chown 1:2 /dst/x"]
        );
    }
}
