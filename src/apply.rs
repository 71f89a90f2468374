//! Apply policy: decides, entry by entry, what happens to each planned
//! destination.
//!
//! Every entry ends in exactly one [`Outcome`].  Entries are processed in
//! plan order and the first write or delete failure aborts the rest; earlier
//! changes are kept.
use std::io::Write;
use std::ops::AddAssign;
use std::path::Path;

use tracing::debug;

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::error::MirdirError;
use crate::operations::FileSystemOps;
use crate::prompt::Prompter;
use crate::render::OutputEntry;
use crate::report;

/// Terminal state of one planned entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The entry was written to the destination.
    Written,
    /// The entry was left alone (declined prompt, or blank file with nothing
    /// to delete).
    Skipped,
    /// An existing destination file was removed because the rendered content
    /// was blank.
    Deleted,
    /// Dry run: the entry was only reported.
    Reported,
}

/// Number of entries that ended in each [`Outcome`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyStats {
    /// Entries written.
    pub written: usize,
    /// Entries skipped.
    pub skipped: usize,
    /// Entries deleted.
    pub deleted: usize,
    /// Entries reported by a dry run.
    pub reported: usize,
}

impl ApplyStats {
    /// Count one more entry ending in `outcome`.
    pub const fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Written => self.written += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::Reported => self.reported += 1,
        }
    }

    /// Total number of entries counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.written + self.skipped + self.deleted + self.reported
    }
}

impl AddAssign for ApplyStats {
    fn add_assign(&mut self, other: Self) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.deleted += other.deleted;
        self.reported += other.reported;
    }
}

impl std::fmt::Display for ApplyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} written, {} skipped, {} deleted, {} reported",
            self.written, self.skipped, self.deleted, self.reported
        )
    }
}

/// Create the destination root unless this is a dry run or it already
/// exists.
///
/// # Errors
///
/// Returns [`MirdirError::Write`] if the directory cannot be created.
pub fn prepare_destination(
    root: &Path,
    settings: &Settings,
    fs: &dyn FileSystemOps,
) -> Result<(), MirdirError> {
    if settings.dry_run || fs.is_dir(root) {
        return Ok(());
    }
    debug!("creating destination root {}", root.display());
    fs.create_dir_all(root).map_err(|source| MirdirError::Write {
        path: root.to_path_buf(),
        source,
    })
}

/// Apply one planned entry.
///
/// `catalog` must be the catalog `output` was rendered from; it supplies the
/// template side of the dry-run report.
///
/// # Errors
///
/// Returns [`MirdirError::Write`] if writing the entry (or, in a dry run, the
/// report) fails and [`MirdirError::Delete`] if removing a blank file fails.
pub fn apply_entry(
    output: &OutputEntry,
    catalog: &Catalog,
    settings: &Settings,
    fs: &dyn FileSystemOps,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<Outcome, MirdirError> {
    let path = output.path.as_path();
    let blank = output.is_blank_file();

    if settings.dry_run {
        let writes = !(blank && settings.delete_empty);
        let source = output
            .source_entry(catalog)
            .ok_or_else(|| MirdirError::Write {
                path: path.to_path_buf(),
                source: anyhow::anyhow!("no template entry at catalog index {}", output.source),
            })?;
        report::write_entry(
            out,
            source,
            output,
            writes,
            settings.verbose,
        )
        .map_err(|e| MirdirError::Write {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        return Ok(Outcome::Reported);
    }

    let exists = fs.exists(path);

    if blank && settings.delete_empty {
        if !exists {
            debug!("blank and absent, nothing to do: {}", path.display());
            return Ok(Outcome::Skipped);
        }
        if !settings.skip_prompt && !prompter.confirm_delete(path) {
            debug!("delete declined: {}", path.display());
            return Ok(Outcome::Skipped);
        }
        fs.remove_file(path).map_err(|source| MirdirError::Delete {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("deleted blank file {}", path.display());
        return Ok(Outcome::Deleted);
    }

    if exists && !settings.skip_prompt && !prompter.confirm_overwrite(path, output.is_dir()) {
        debug!("overwrite declined: {}", path.display());
        return Ok(Outcome::Skipped);
    }

    fs.write(output, settings.preserve)
        .map_err(|source| MirdirError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("wrote {} {}", output.kind(), path.display());
    Ok(Outcome::Written)
}

/// Apply a whole plan in order.
///
/// # Errors
///
/// Stops at the first failing entry and returns its error; entries already
/// applied are not rolled back.
pub fn apply_all(
    plan: &[OutputEntry],
    catalog: &Catalog,
    settings: &Settings,
    fs: &dyn FileSystemOps,
    prompter: &mut dyn Prompter,
    out: &mut dyn Write,
) -> Result<ApplyStats, MirdirError> {
    let mut stats = ApplyStats::default();
    for output in plan {
        let outcome = apply_entry(output, catalog, settings, fs, prompter, out)?;
        stats.record(outcome);
    }
    Ok(stats)
}
