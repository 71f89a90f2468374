//! Content templating for files carrying the template marker.
//!
//! Templates are Handlebars documents rendered against a structured context
//! built from the run variables.  Dot-prefixed references (`{{.NAME}}`) are
//! accepted as an alias of `{{this.NAME}}`; see [`normalize_dot_paths`].

mod dot_paths;
mod engine;
mod error;

pub use dot_paths::normalize_dot_paths;
pub use engine::TemplateEngine;
pub use error::TemplateError;
