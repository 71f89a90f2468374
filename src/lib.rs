//! Directory mirroring and templating engine.
//!
//! Copies a template directory tree into a destination, replacing `[KEY]`
//! tokens in names and link targets with variables taken from the
//! environment and rendering the content of `.tpl` files through a
//! Handlebars template.
//!
//! The public API is organised into four layers:
//!
//! - **[`catalog`]**: walk a template root into ordered, typed entries
//! - **[`render`]**: plan destination entries ([`tokens`] and [`template`] do the substitution)
//! - **[`apply`]**: apply the plan through [`operations`] and [`prompt`], or print a [`report`]
//! - **[`commands`]**: end-to-end orchestration used by the binary
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod apply;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod operations;
pub mod prompt;
pub mod render;
pub mod report;
pub mod resources;
pub mod template;
pub mod tokens;
