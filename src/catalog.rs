//! Entry catalog: an ordered, read-only snapshot of a template directory.
//!
//! [`Catalog::walk`] visits every object below the template root (not the
//! root itself), records its metadata and payload, and then stable-sorts the
//! result by [`EntryKind`].  Directories therefore come before the files and
//! links that live inside them, which is what lets the apply step process
//! entries strictly in order.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::MirdirError;

/// Kind of a filesystem entry.  The declaration order is the catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    /// A directory.
    Directory,
    /// A regular file (anything that is neither a directory nor a symlink).
    File,
    /// A symbolic link.
    Symlink,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Directory => "directory",
            Self::File => "file",
            Self::Symlink => "link",
        })
    }
}

/// Kind-specific data carried by an entry.
///
/// File content and link targets live in separate variants, so an entry can
/// never carry both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Directories carry nothing.
    Directory,
    /// Full file content.
    File(Vec<u8>),
    /// Literal link target as returned by `readlink`.
    Symlink(String),
}

impl Payload {
    /// The kind this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::Directory => EntryKind::Directory,
            Self::File(_) => EntryKind::File,
            Self::Symlink(_) => EntryKind::Symlink,
        }
    }

    /// File content; empty for directories and links.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        match self {
            Self::File(content) => content,
            Self::Directory | Self::Symlink(_) => &[],
        }
    }

    /// Link target; `None` for directories and files.
    #[must_use]
    pub fn link_target(&self) -> Option<&str> {
        match self {
            Self::Symlink(target) => Some(target),
            Self::Directory | Self::File(_) => None,
        }
    }
}

/// One entry of the template tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the template root, `/`-separated on Unix.
    pub path: String,
    /// Kind-specific data.
    pub payload: Payload,
    /// Owning user id.
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Permission bits (`0o777` mask).
    pub mode: u32,
}

impl Entry {
    /// Kind of this entry.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.payload.kind()
    }

    /// File content; empty for directories and links.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        self.payload.content()
    }

    /// Link target; `None` unless this is a symlink.
    #[must_use]
    pub fn link_target(&self) -> Option<&str> {
        self.payload.link_target()
    }
}

/// Ordered collection of the entries found under a template root.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    entries: Vec<Entry>,
}

impl Catalog {
    /// Walk `root` and capture every entry below it.
    ///
    /// The root itself is followed when it is a symlink; nothing below it is.
    ///
    /// # Errors
    ///
    /// Returns [`MirdirError::PathNotFound`] or [`MirdirError::NotADirectory`]
    /// when `root` is unusable, and [`MirdirError::CatalogRead`] as soon as any
    /// entry cannot be read.  No partial catalog is ever returned.
    pub fn walk(root: &Path) -> Result<Self, MirdirError> {
        let meta = match fs::metadata(root) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MirdirError::PathNotFound {
                    path: root.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(MirdirError::CatalogRead {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };
        if !meta.is_dir() {
            return Err(MirdirError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();
        for item in walker {
            let item = item.map_err(|e| MirdirError::CatalogRead {
                path: e.path().unwrap_or(root).to_path_buf(),
                source: e.into(),
            })?;
            entries.push(read_entry(root, item.path())?);
        }

        entries.sort_by_key(Entry::kind);
        debug!("catalogued {} entries under {}", entries.len(), root.display());
        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    /// Build a catalog from already captured entries, applying the kind order.
    #[must_use]
    pub fn from_entries(root: impl Into<PathBuf>, mut entries: Vec<Entry>) -> Self {
        entries.sort_by_key(Entry::kind);
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Template root this catalog was built from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entry at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Iterate over entries in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the template root is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Capture a single entry found at `path` below `root`.
fn read_entry(root: &Path, path: &Path) -> Result<Entry, MirdirError> {
    let read_err = |source: io::Error| MirdirError::CatalogRead {
        path: path.to_path_buf(),
        source,
    };

    let meta = fs::symlink_metadata(path).map_err(read_err)?;
    let relative = path
        .strip_prefix(root)
        .map_err(|e| read_err(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
    let relative = utf8(relative.as_os_str().to_owned()).map_err(read_err)?;

    let file_type = meta.file_type();
    let payload = if file_type.is_symlink() {
        let target = fs::read_link(path).map_err(read_err)?;
        Payload::Symlink(utf8(target.into_os_string()).map_err(read_err)?)
    } else if file_type.is_dir() {
        Payload::Directory
    } else {
        Payload::File(fs::read(path).map_err(read_err)?)
    };

    let (uid, gid, mode) = ownership_and_mode(&meta);
    Ok(Entry {
        path: relative,
        payload,
        uid,
        gid,
        mode,
    })
}

fn utf8(value: std::ffi::OsString) -> io::Result<String> {
    value.into_string().map_err(|raw| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("not valid UTF-8: {}", raw.to_string_lossy()),
        )
    })
}

#[cfg(unix)]
fn ownership_and_mode(meta: &fs::Metadata) -> (u32, u32, u32) {
    use std::os::unix::fs::MetadataExt as _;
    (meta.uid(), meta.gid(), meta.mode() & 0o777)
}

#[cfg(not(unix))]
fn ownership_and_mode(meta: &fs::Metadata) -> (u32, u32, u32) {
    let mode = if meta.is_dir() {
        0o777
    } else if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    };
    (0, 0, mode)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn paths(catalog: &Catalog) -> Vec<&str> {
        catalog.iter().map(|e| e.path.as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Root validation
    // -----------------------------------------------------------------------

    #[test]
    fn missing_root_is_path_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalog::walk(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, MirdirError::PathNotFound { .. }));
    }

    #[test]
    fn file_root_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "x").unwrap();
        let err = Catalog::walk(&file).unwrap_err();
        assert!(matches!(err, MirdirError::NotADirectory { .. }));
    }

    #[test]
    fn empty_root_gives_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::walk(dir.path()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.root(), dir.path());
    }

    // -----------------------------------------------------------------------
    // Capture
    // -----------------------------------------------------------------------

    #[test]
    fn captures_relative_paths_and_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/b.txt"), b"bee").unwrap();

        let catalog = Catalog::walk(dir.path()).unwrap();
        assert_eq!(paths(&catalog), vec!["a", "a/b.txt"]);
        assert_eq!(catalog.entries()[0].kind(), EntryKind::Directory);
        assert_eq!(catalog.entries()[1].content(), b"bee");
        assert_eq!(catalog.entries()[1].link_target(), None);
    }

    #[cfg(unix)]
    #[test]
    fn captures_literal_link_target() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("../[HOME]/missing", dir.path().join("link")).unwrap();

        let catalog = Catalog::walk(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].kind(), EntryKind::Symlink);
        assert_eq!(catalog.entries()[0].link_target(), Some("../[HOME]/missing"));
        assert!(catalog.entries()[0].content().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real/f"), "x").unwrap();
        std::os::unix::fs::symlink("real", dir.path().join("alias")).unwrap();

        let catalog = Catalog::walk(dir.path()).unwrap();
        assert_eq!(paths(&catalog), vec!["real", "real/f", "alias"]);
    }

    #[cfg(unix)]
    #[test]
    fn captures_mode_bits() {
        use std::os::unix::fs::PermissionsExt as _;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("script.sh");
        fs::write(&file, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o750)).unwrap();

        let catalog = Catalog::walk(dir.path()).unwrap();
        assert_eq!(catalog.entries()[0].mode, 0o750);
    }

    // -----------------------------------------------------------------------
    // Ordering
    // -----------------------------------------------------------------------

    #[cfg(unix)]
    #[test]
    fn sorted_by_kind_then_walk_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("0-file"), "").unwrap();
        std::os::unix::fs::symlink("0-file", root.join("1-link")).unwrap();
        fs::create_dir_all(root.join("2-dir/nested")).unwrap();
        fs::write(root.join("2-dir/nested/deep.txt"), "").unwrap();
        fs::write(root.join("2-dir/z.txt"), "").unwrap();

        let catalog = Catalog::walk(root).unwrap();
        assert_eq!(
            paths(&catalog),
            vec![
                "2-dir",
                "2-dir/nested",
                "0-file",
                "2-dir/nested/deep.txt",
                "2-dir/z.txt",
                "1-link",
            ]
        );
    }

    #[test]
    fn from_entries_applies_kind_order() {
        let file = Entry {
            path: "f".into(),
            payload: Payload::File(Vec::new()),
            uid: 0,
            gid: 0,
            mode: 0o644,
        };
        let dir = Entry {
            path: "d".into(),
            payload: Payload::Directory,
            uid: 0,
            gid: 0,
            mode: 0o755,
        };
        let catalog = Catalog::from_entries("/tpl", vec![file, dir]);
        assert_eq!(paths(&catalog), vec!["d", "f"]);
    }

    // -----------------------------------------------------------------------
    // Failure is atomic
    // -----------------------------------------------------------------------

    #[cfg(unix)]
    #[test]
    fn unreadable_file_fails_whole_walk() {
        use std::os::unix::fs::PermissionsExt as _;
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.txt"), "fine").unwrap();
        let secret = dir.path().join("secret.txt");
        fs::write(&secret, "hidden").unwrap();
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits, so only assert when the read really fails.
        if fs::read(&secret).is_err() {
            let err = Catalog::walk(dir.path()).unwrap_err();
            assert!(matches!(err, MirdirError::CatalogRead { ref path, .. } if path == &secret));
        }
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
