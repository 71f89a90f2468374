use thiserror::Error;

/// Failure while turning template source into content.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The source is not a well-formed template.
    #[error("template syntax error: {0}")]
    Parse(#[source] handlebars::TemplateError),

    /// The template parsed but rendering it failed.
    #[error("template render error: {0}")]
    Render(#[source] handlebars::RenderError),
}
