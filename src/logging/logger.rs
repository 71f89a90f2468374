//! Logger facade over [`tracing`] used by the command layer.
use std::path::{Path, PathBuf};

use super::subscriber::STAGE_TARGET;
use super::utils::log_file_path;

/// Structured logger for command-level progress.
///
/// All messages are written to a persistent log file at
/// `$XDG_CACHE_HOME/mirdir/<name>.log` (default `~/.cache/mirdir/<name>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display.  The log file itself is created
    /// and initialised by [`init_subscriber`](super::subscriber::init_subscriber);
    /// this constructor does not write to the file.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            log_file: log_file_path(name),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }
}
