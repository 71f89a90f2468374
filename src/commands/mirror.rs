//! One end-to-end mirror run: catalog, render, apply.
use std::io::Write;
use std::path::Path;

use crate::apply::{self, ApplyStats};
use crate::catalog::Catalog;
use crate::cli::Cli;
use crate::config::{Settings, Variables};
use crate::error::MirdirError;
use crate::logging::Logger;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::prompt::{Prompter, TerminalPrompter};
use crate::render;

/// Inputs of a mirror run.
#[derive(Debug, Clone, Copy)]
pub struct Mirror<'a> {
    /// Template root to catalog.
    pub template_dir: &'a Path,
    /// Destination root that rendered entries are joined under.
    pub destination_dir: &'a Path,
    /// Behaviour flags.
    pub settings: Settings,
    /// Substitution variables.
    pub variables: &'a Variables,
}

impl Mirror<'_> {
    /// Catalog the template tree, render it and apply the result.
    ///
    /// Nothing under the destination is touched unless cataloguing and
    /// rendering both succeed.  Dry-run reports are written to `out`.
    ///
    /// # Errors
    ///
    /// Returns the first [`MirdirError`] raised by any stage.
    pub fn run(
        &self,
        fs: &dyn FileSystemOps,
        prompter: &mut dyn Prompter,
        out: &mut dyn Write,
        log: &Logger,
    ) -> Result<ApplyStats, MirdirError> {
        log.stage("Reading template");
        let catalog = Catalog::walk(self.template_dir)?;
        log.info(&format!(
            "{} entries under {}",
            catalog.len(),
            self.template_dir.display()
        ));

        log.stage("Rendering");
        let plan = render::render(
            &catalog,
            self.destination_dir,
            self.settings.preserve,
            self.variables,
        )?;
        log.debug(&format!("{} variables available", self.variables.len()));

        log.stage(if self.settings.dry_run {
            "Reporting"
        } else {
            "Applying"
        });
        apply::prepare_destination(self.destination_dir, &self.settings, fs)?;
        let stats = apply::apply_all(&plan, &catalog, &self.settings, fs, prompter, out)?;
        out.flush().map_err(|e| MirdirError::Write {
            path: self.destination_dir.to_path_buf(),
            source: e.into(),
        })?;

        log.info(&stats.to_string());
        if let Some(path) = log.log_path() {
            log.debug(&format!("log: {}", path.display()));
        }
        Ok(stats)
    }
}

/// Run the mirror command for parsed command-line arguments, against the
/// real filesystem, the terminal and the process environment.
///
/// # Errors
///
/// Returns the first [`MirdirError`] raised by any stage.
pub fn run(cli: &Cli, log: &Logger) -> Result<ApplyStats, MirdirError> {
    let variables = Variables::from_env();
    let mirror = Mirror {
        template_dir: &cli.template_dir,
        destination_dir: &cli.destination_dir,
        settings: Settings::from(cli),
        variables: &variables,
    };
    let mut prompter = TerminalPrompter::stdio();
    let mut out = std::io::stdout();
    mirror.run(&SystemFileSystemOps, &mut prompter, &mut out, log)
}
