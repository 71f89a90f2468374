//! Run configuration: behaviour flags and the substitution variables.
//!
//! Both values are built once at startup and only borrowed afterwards.
use std::collections::BTreeMap;
use std::ffi::OsString;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cli::Cli;

/// Behaviour switches for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// Never ask before overwriting or deleting.
    pub skip_prompt: bool,
    /// Print the plan instead of touching the destination.
    pub dry_run: bool,
    /// Remove destination files whose rendered content is blank.
    pub delete_empty: bool,
    /// Copy permission bits and ownership from the template.
    pub preserve: bool,
    /// Include file contents in dry-run output and error causes on failure.
    pub verbose: bool,
}

impl From<&Cli> for Settings {
    fn from(cli: &Cli) -> Self {
        Self {
            skip_prompt: cli.yes,
            dry_run: cli.dry_run,
            delete_empty: cli.delete_empty,
            preserve: cli.preserve,
            verbose: cli.verbose,
        }
    }
}

/// String variables used for `[KEY]` substitution and content templates.
///
/// Keys are kept sorted so that anything derived from the map is stable
/// between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    /// Create an empty variable map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_os_pairs(std::env::vars_os())
    }

    fn from_os_pairs(pairs: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        pairs
            .into_iter()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Insert or replace a variable, returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a variable.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when no variables are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Structured view of the variables, used as the template context.
    ///
    /// Serializes through the derived [`Serialize`] impl, so the context is a
    /// flat object of string values.
    #[must_use]
    pub fn to_context(&self) -> Value {
        // A map of strings always serializes.
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
