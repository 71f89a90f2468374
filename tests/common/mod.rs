// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed template tree and destination with a
// fluent builder, so each integration test can set up an isolated mirror run
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use mirdir::apply::ApplyStats;
use mirdir::commands::mirror::Mirror;
use mirdir::config::{Settings, Variables};
use mirdir::error::MirdirError;
use mirdir::logging::Logger;
use mirdir::operations::SystemFileSystemOps;
use mirdir::prompt::TerminalPrompter;

/// Result of one mirror run driven by [`TemplateTree::mirror`].
pub struct RunOutput {
    /// What the run returned.
    pub result: Result<ApplyStats, MirdirError>,
    /// Everything written to the report stream.
    pub report: String,
    /// Everything the prompter printed.
    pub prompts: String,
}

impl RunOutput {
    /// Stats of a successful run.
    pub fn stats(&self) -> ApplyStats {
        match &self.result {
            Ok(stats) => *stats,
            Err(e) => panic!("mirror run failed: {e:?}"),
        }
    }
}

/// A template tree and destination inside one [`tempfile::TempDir`].
///
/// The template lives in `tpl/` and the destination in `dst/`; neither the
/// destination nor its contents exist until a test creates them.
pub struct TemplateTree {
    root: tempfile::TempDir,
}

impl TemplateTree {
    /// Create an empty template directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir(root.path().join("tpl")).expect("create tpl dir");
        Self { root }
    }

    /// Template root.
    pub fn template_dir(&self) -> PathBuf {
        self.root.path().join("tpl")
    }

    /// Destination root.
    pub fn dest_dir(&self) -> PathBuf {
        self.root.path().join("dst")
    }

    /// Path of `rel` under the destination root.
    pub fn dest(&self, rel: &str) -> PathBuf {
        self.dest_dir().join(rel)
    }

    /// Add a directory (and its parents) to the template.
    pub fn dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.template_dir().join(rel)).expect("create template dir");
        self
    }

    /// Add a file to the template.
    pub fn file(self, rel: &str, content: &str) -> Self {
        write_with_parents(&self.template_dir().join(rel), content);
        self
    }

    /// Add a symbolic link to the template.
    #[cfg(unix)]
    pub fn symlink(self, rel: &str, target: &str) -> Self {
        std::os::unix::fs::symlink(target, self.template_dir().join(rel))
            .expect("create template symlink");
        self
    }

    /// Put a file into the destination before the run.
    pub fn existing(self, rel: &str, content: &str) -> Self {
        write_with_parents(&self.dest(rel), content);
        self
    }

    /// Read a destination file as text.
    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.dest(rel)).expect("read destination file")
    }

    /// Mirror the template into the destination on the real filesystem,
    /// answering prompts from `answers` (one answer per line).
    pub fn mirror(&self, settings: Settings, vars: &Variables, answers: &str) -> RunOutput {
        let template_dir = self.template_dir();
        let dest_dir = self.dest_dir();
        let mirror = Mirror {
            template_dir: &template_dir,
            destination_dir: &dest_dir,
            settings,
            variables: vars,
        };
        let mut prompter =
            TerminalPrompter::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new());
        let mut report = Vec::new();
        let log = Logger::new("test");

        let result = mirror.run(&SystemFileSystemOps, &mut prompter, &mut report, &log);

        let (_, prompts) = prompter.into_inner();
        RunOutput {
            result,
            report: String::from_utf8(report).expect("report is UTF-8"),
            prompts: String::from_utf8(prompts).expect("prompts are UTF-8"),
        }
    }
}

fn write_with_parents(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// Variables with a single entry.
pub fn var(key: &str, value: &str) -> Variables {
    Variables::new().with(key, value)
}
