use handlebars::{Handlebars, Template};
use serde_json::Value;

use super::dot_paths::normalize_dot_paths;
use super::error::TemplateError;

/// Renders template file contents.
#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("handlebars", &"<Handlebars>")
            .finish()
    }
}

impl TemplateEngine {
    /// Create an engine that renders plain text.
    #[must_use]
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        // Missing variables render as empty text rather than failing.
        handlebars.set_strict_mode(false);
        handlebars.set_dev_mode(false);

        // Output is file content, not HTML.
        handlebars.register_escape_fn(handlebars::no_escape);

        Self { handlebars }
    }

    /// Render template `source` against `context`.
    ///
    /// Source bytes that are not valid UTF-8 are replaced before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Parse`] when the source does not compile and
    /// [`TemplateError::Render`] when rendering fails (for example an unknown
    /// helper).
    pub fn render(&self, source: &[u8], context: &Value) -> Result<String, TemplateError> {
        let text = String::from_utf8_lossy(source);
        let normalized = normalize_dot_paths(&text);

        // Compile first so syntax errors are reported separately from render errors.
        Template::compile(&normalized).map_err(TemplateError::Parse)?;

        self.handlebars
            .render_template(&normalized, context)
            .map_err(TemplateError::Render)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
