//! Render planner: turns a catalog into the ordered list of destination entries.
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::catalog::{Catalog, Entry, EntryKind, Payload};
use crate::config::Variables;
use crate::error::MirdirError;
use crate::template::{TemplateEngine, TemplateError};
use crate::tokens;

/// Mode given to new files and links when metadata is not preserved; the
/// process umask is applied on creation.
pub const DEFAULT_FILE_MODE: u32 = 0o666;
/// Mode given to new directories when metadata is not preserved.
pub const DEFAULT_DIR_MODE: u32 = 0o777;

/// A planned destination entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    /// Destination path, joined under the destination root.
    pub path: PathBuf,
    /// Rendered content or substituted link target.
    pub payload: Payload,
    /// Owner copied from the template entry.
    pub uid: u32,
    /// Group copied from the template entry.
    pub gid: u32,
    /// Mode to create the entry with.
    pub mode: u32,
    /// Index of the originating entry in the catalog.
    pub source: usize,
}

impl OutputEntry {
    /// Kind of this entry.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        self.payload.kind()
    }

    /// `true` for directories.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.payload, Payload::Directory)
    }

    /// Rendered content; empty for directories and links.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        self.payload.content()
    }

    /// Link target; `None` unless this is a symlink.
    #[must_use]
    pub fn link_target(&self) -> Option<&str> {
        self.payload.link_target()
    }

    /// `true` for a file whose rendered content is empty or only whitespace.
    #[must_use]
    pub fn is_blank_file(&self) -> bool {
        match &self.payload {
            Payload::File(content) => String::from_utf8_lossy(content).trim().is_empty(),
            Payload::Directory | Payload::Symlink(_) => false,
        }
    }

    /// Catalog entry this output was derived from; `None` if `catalog` is
    /// not the catalog this entry was rendered from.
    #[must_use]
    pub fn source_entry<'c>(&self, catalog: &'c Catalog) -> Option<&'c Entry> {
        catalog.get(self.source)
    }
}

/// Compute the destination plan for `catalog` under `dest_root`.
///
/// The result has one entry per catalog entry, in catalog order.
///
/// # Errors
///
/// Returns [`MirdirError::TemplateParse`] or
/// [`MirdirError::TemplateExecution`] naming the first template file that
/// fails; no partial plan is returned.
pub fn render(
    catalog: &Catalog,
    dest_root: &Path,
    preserve: bool,
    vars: &Variables,
) -> Result<Vec<OutputEntry>, MirdirError> {
    let engine = TemplateEngine::new();
    let context = vars.to_context();

    let outputs = catalog
        .iter()
        .enumerate()
        .map(|(index, entry)| -> Result<OutputEntry, MirdirError> {
            let payload = match &entry.payload {
                Payload::Directory => Payload::Directory,
                Payload::File(content) if tokens::is_template(&entry.path) => {
                    let rendered = engine
                        .render(content, &context)
                        .map_err(|e| template_failure(&entry.path, e))?;
                    Payload::File(rendered.into_bytes())
                }
                Payload::File(content) => Payload::File(content.clone()),
                Payload::Symlink(target) => Payload::Symlink(tokens::substitute(target, vars)),
            };
            let mode = match (preserve, entry.kind()) {
                (true, _) => entry.mode,
                (false, EntryKind::Directory) => DEFAULT_DIR_MODE,
                (false, EntryKind::File | EntryKind::Symlink) => DEFAULT_FILE_MODE,
            };
            Ok(OutputEntry {
                path: join_under(dest_root, &tokens::output_path(&entry.path, vars)),
                payload,
                uid: entry.uid,
                gid: entry.gid,
                mode,
                source: index,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "rendered {} entries into {}",
        outputs.len(),
        dest_root.display()
    );
    Ok(outputs)
}

/// Join a substituted relative path below `root`.
///
/// Substituted values may start with a separator (`[HOME]` -> `/root`) or be
/// empty (`[EMPTY]/x` -> `/x`); neither may replace `root`.  Root and prefix
/// components are dropped and `..` is resolved lexically without climbing
/// above `root`.
fn join_under(root: &Path, relative: &str) -> PathBuf {
    let mut joined = root.to_path_buf();
    let mut depth = 0_usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                joined.push(part);
                depth += 1;
            }
            Component::ParentDir if depth > 0 => {
                joined.pop();
                depth -= 1;
            }
            Component::ParentDir
            | Component::CurDir
            | Component::RootDir
            | Component::Prefix(_) => {}
        }
    }
    joined
}

fn template_failure(path: &str, error: TemplateError) -> MirdirError {
    match error {
        TemplateError::Parse(source) => MirdirError::TemplateParse {
            path: path.to_string(),
            source,
        },
        TemplateError::Render(source) => MirdirError::TemplateExecution {
            path: path.to_string(),
            source,
        },
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn entry(path: &str, payload: Payload, mode: u32) -> Entry {
        Entry {
            path: path.to_string(),
            payload,
            uid: 1000,
            gid: 100,
            mode,
        }
    }

    fn file(path: &str, content: &str) -> Entry {
        entry(path, Payload::File(content.as_bytes().to_vec()), 0o640)
    }

    fn sample_catalog() -> Catalog {
        Catalog::from_entries(
            "/tpl",
            vec![
                file("greeting.txt.tpl", "Hello, {{.NAME}}!"),
                entry("[NAME]", Payload::Directory, 0o750),
                file("[NAME]/config.txt", "raw {{.NAME}} [NAME]"),
                entry("link", Payload::Symlink("[NAME]/config.txt".into()), 0o777),
            ],
        )
    }

    fn vars() -> Variables {
        Variables::new().with("NAME", "alice")
    }

    #[test]
    fn one_output_per_entry_in_catalog_order() {
        let catalog = sample_catalog();
        let out = render(&catalog, Path::new("/dst"), false, &vars()).unwrap();
        let paths: Vec<&Path> = out.iter().map(|o| o.path.as_path()).collect();
        assert_eq!(
            paths,
            vec![
                Path::new("/dst/alice"),
                Path::new("/dst/greeting.txt"),
                Path::new("/dst/alice/config.txt"),
                Path::new("/dst/link"),
            ]
        );
        for (i, o) in out.iter().enumerate() {
            assert_eq!(o.source, i);
            assert_eq!(Some(o.kind()), catalog.get(i).map(Entry::kind));
        }
    }

    #[test]
    fn templates_marked_files_only() {
        let out = render(&sample_catalog(), Path::new("/dst"), false, &vars()).unwrap();
        assert_eq!(out[1].content(), b"Hello, alice!");
        assert_eq!(out[2].content(), b"raw {{.NAME}} [NAME]");
    }

    #[test]
    fn substitutes_link_targets() {
        let out = render(&sample_catalog(), Path::new("/dst"), false, &vars()).unwrap();
        assert_eq!(out[3].link_target(), Some("alice/config.txt"));
        assert!(out[3].content().is_empty());
    }

    #[test]
    fn default_modes_without_preserve() {
        let out = render(&sample_catalog(), Path::new("/dst"), false, &vars()).unwrap();
        assert_eq!(out[0].mode, DEFAULT_DIR_MODE);
        assert_eq!(out[1].mode, DEFAULT_FILE_MODE);
        assert_eq!(out[3].mode, DEFAULT_FILE_MODE);
    }

    #[test]
    fn preserve_copies_modes_and_owner() {
        let out = render(&sample_catalog(), Path::new("/dst"), true, &vars()).unwrap();
        assert_eq!(out[0].mode, 0o750);
        assert_eq!(out[1].mode, 0o640);
        assert!(out.iter().all(|o| o.uid == 1000 && o.gid == 100));
    }

    #[test]
    fn catalog_is_left_untouched() {
        let catalog = sample_catalog();
        let before = catalog.entries().to_vec();
        let _ = render(&catalog, Path::new("/dst"), true, &vars()).unwrap();
        assert_eq!(catalog.entries(), before.as_slice());
    }

    #[test]
    fn source_entry_resolves_back() {
        let catalog = sample_catalog();
        let out = render(&catalog, Path::new("/dst"), false, &vars()).unwrap();
        assert_eq!(
            out[1].source_entry(&catalog).map(|e| e.path.as_str()),
            Some("greeting.txt.tpl")
        );
        let foreign = Catalog::from_entries("/other", Vec::new());
        assert!(out[1].source_entry(&foreign).is_none());
    }

    #[test]
    fn template_failure_aborts_whole_render() {
        let catalog = Catalog::from_entries(
            "/tpl",
            vec![file("ok.txt.tpl", "fine"), file("bad.txt.tpl", "{{#if .X}}")],
        );
        let err = render(&catalog, Path::new("/dst"), false, &vars()).unwrap_err();
        match err {
            MirdirError::TemplateParse { path, .. } => assert_eq!(path, "bad.txt.tpl"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn execution_failure_names_entry() {
        let catalog = Catalog::from_entries("/tpl", vec![file("x.tpl", "{{nohelper .NAME}}")]);
        let err = render(&catalog, Path::new("/dst"), false, &vars()).unwrap_err();
        assert!(matches!(err, MirdirError::TemplateExecution { ref path, .. } if path == "x.tpl"));
    }

    #[test]
    fn blank_detection() {
        let blank = OutputEntry {
            path: PathBuf::from("/dst/a"),
            payload: Payload::File(b" \n\t\r\n".to_vec()),
            uid: 0,
            gid: 0,
            mode: DEFAULT_FILE_MODE,
            source: 0,
        };
        assert!(blank.is_blank_file());
        let empty = OutputEntry {
            payload: Payload::File(Vec::new()),
            ..blank.clone()
        };
        assert!(empty.is_blank_file());
        let text = OutputEntry {
            payload: Payload::File(b" x ".to_vec()),
            ..blank.clone()
        };
        assert!(!text.is_blank_file());
        let dir = OutputEntry {
            payload: Payload::Directory,
            ..blank
        };
        assert!(!dir.is_blank_file());
    }

    #[test]
    fn absolute_substitution_stays_under_root() {
        let catalog = Catalog::from_entries(
            "/tpl",
            vec![
                entry("[HOME]", Payload::Directory, 0o755),
                file("[HOME]/.bashrc", "x"),
            ],
        );
        let vars = Variables::new().with("HOME", "/root");
        let out = render(&catalog, Path::new("/dst"), false, &vars).unwrap();
        assert_eq!(out[0].path, Path::new("/dst/root"));
        assert_eq!(out[1].path, Path::new("/dst/root/.bashrc"));
    }

    #[test]
    fn empty_substitution_stays_under_root() {
        let catalog = Catalog::from_entries(
            "/tpl",
            vec![
                entry("[EMPTY]", Payload::Directory, 0o755),
                file("[EMPTY]/config.txt", "x"),
            ],
        );
        let vars = Variables::new().with("EMPTY", "");
        let out = render(&catalog, Path::new("/dst"), false, &vars).unwrap();
        assert_eq!(out[0].path, Path::new("/dst"));
        assert_eq!(out[1].path, Path::new("/dst/config.txt"));
    }

    #[test]
    fn parent_components_cannot_climb_out() {
        let catalog = Catalog::from_entries("/tpl", vec![file("[UP]/x.txt", "x")]);
        let vars = Variables::new().with("UP", "a/../../../etc");
        let out = render(&catalog, Path::new("/dst"), false, &vars).unwrap();
        assert_eq!(out[0].path, Path::new("/dst/etc/x.txt"));
    }

    #[test]
    fn join_under_cleans_separators() {
        let root = Path::new("/dst");
        assert_eq!(join_under(root, "a//b/./c"), Path::new("/dst/a/b/c"));
        assert_eq!(join_under(root, "/abs/x"), Path::new("/dst/abs/x"));
        assert_eq!(join_under(root, "a/../b"), Path::new("/dst/b"));
        assert_eq!(join_under(root, ""), Path::new("/dst"));
    }
}
