//! Error kinds for the mirroring engine.
//!
//! Every failure the core can produce is a [`MirdirError`].  Catalog and render
//! errors are raised before anything touches the destination; write and delete
//! errors abort the apply queue where they happen.  The binary converts them to
//! [`anyhow::Error`] at its boundary and maps them back to an exit status with
//! [`MirdirError::exit_code`].
//!
//! ```text
//! MirdirError                 exit
//! ├── PathNotFound              1
//! ├── NotADirectory             2
//! ├── CatalogRead               3
//! ├── TemplateParse             4
//! ├── TemplateExecution         4
//! ├── Delete                    5
//! └── Write                     6
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while cataloguing, rendering, or applying a template tree.
#[derive(Error, Debug)]
pub enum MirdirError {
    /// The template root does not exist.
    #[error("template directory does not exist: {}", path.display())]
    PathNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The template root exists but is not a directory.
    #[error("template path is not a directory: {}", path.display())]
    NotADirectory {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// An entry under the template root could not be read.
    #[error("failed reading template entry {}", path.display())]
    CatalogRead {
        /// Entry that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A `.tpl` file does not parse as a template.
    #[error("failed parsing template {path}")]
    TemplateParse {
        /// Catalog path of the template file.
        path: String,
        /// Parser error.
        #[source]
        source: handlebars::TemplateError,
    },

    /// A `.tpl` file parsed but could not be rendered.
    #[error("failed rendering template {path}")]
    TemplateExecution {
        /// Catalog path of the template file.
        path: String,
        /// Renderer error.
        #[source]
        source: handlebars::RenderError,
    },

    /// Creating, writing, linking, or chowning a destination entry failed.
    #[error("failed writing {}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying error with context.
        #[source]
        source: anyhow::Error,
    },

    /// Removing an empty destination file failed.
    #[error("failed deleting {}", path.display())]
    Delete {
        /// Destination path.
        path: PathBuf,
        /// Underlying error with context.
        #[source]
        source: anyhow::Error,
    },
}

impl MirdirError {
    /// Process exit status for this failure class.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::PathNotFound { .. } => 1,
            Self::NotADirectory { .. } => 2,
            Self::CatalogRead { .. } => 3,
            Self::TemplateParse { .. } | Self::TemplateExecution { .. } => 4,
            Self::Delete { .. } => 5,
            Self::Write { .. } => 6,
        }
    }

    /// Short summary used for the `Error:` line printed by the binary.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::PathNotFound { .. } => "TPL_DIR does not exist",
            Self::NotADirectory { .. } => "TPL_DIR must be a directory",
            Self::CatalogRead { .. } => "Failed parsing template",
            Self::TemplateParse { .. } | Self::TemplateExecution { .. } => {
                "Failed rendering template"
            }
            Self::Delete { .. } => "Failed deleting file",
            Self::Write { .. } => "Failed writing file",
        }
    }

    /// Filesystem path the error refers to, when it names one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PathNotFound { path }
            | Self::NotADirectory { path }
            | Self::CatalogRead { path, .. }
            | Self::Write { path, .. }
            | Self::Delete { path, .. } => Some(path),
            Self::TemplateParse { path, .. } | Self::TemplateExecution { path, .. } => {
                Some(Path::new(path))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    fn template_parse_error() -> MirdirError {
        let source = handlebars::Template::compile("{{#if}}").unwrap_err();
        MirdirError::TemplateParse {
            path: "broken.txt.tpl".to_string(),
            source,
        }
    }

    // -----------------------------------------------------------------------
    // Exit codes
    // -----------------------------------------------------------------------

    #[test]
    fn exit_codes_are_distinct_per_failure_class() {
        let errors = [
            MirdirError::PathNotFound {
                path: PathBuf::from("/missing"),
            },
            MirdirError::NotADirectory {
                path: PathBuf::from("/etc/hosts"),
            },
            MirdirError::CatalogRead {
                path: PathBuf::from("a"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
            template_parse_error(),
            MirdirError::Delete {
                path: PathBuf::from("b"),
                source: anyhow::anyhow!("busy"),
            },
            MirdirError::Write {
                path: PathBuf::from("c"),
                source: anyhow::anyhow!("read-only"),
            },
        ];
        let codes: Vec<u8> = errors.iter().map(MirdirError::exit_code).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6]);
    }

    // -----------------------------------------------------------------------
    // Display and sources
    // -----------------------------------------------------------------------

    #[test]
    fn path_not_found_display() {
        let e = MirdirError::PathNotFound {
            path: PathBuf::from("/tpl"),
        };
        assert_eq!(e.to_string(), "template directory does not exist: /tpl");
        assert_eq!(e.summary(), "TPL_DIR does not exist");
    }

    #[test]
    fn catalog_read_keeps_io_source() {
        let e = MirdirError::CatalogRead {
            path: PathBuf::from("secret.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.to_string().contains("secret.txt"));
        assert!(e.source().is_some());
    }

    #[test]
    fn template_parse_names_entry() {
        let e = template_parse_error();
        assert!(e.to_string().contains("broken.txt.tpl"));
        assert!(e.source().is_some());
        assert_eq!(e.path(), Some(Path::new("broken.txt.tpl")));
    }

    #[test]
    fn write_error_exposes_anyhow_source() {
        let e = MirdirError::Write {
            path: PathBuf::from("/dst/file"),
            source: anyhow::anyhow!("disk full"),
        };
        assert_eq!(e.to_string(), "failed writing /dst/file");
        assert_eq!(e.source().map(ToString::to_string).as_deref(), Some("disk full"));
    }

    #[test]
    fn converts_to_anyhow_and_back() {
        let e: anyhow::Error = MirdirError::NotADirectory {
            path: PathBuf::from("file"),
        }
        .into();
        let back = e.downcast_ref::<MirdirError>().expect("downcast");
        assert_eq!(back.exit_code(), 2);
    }
}
