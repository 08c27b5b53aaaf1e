//! Template rendering error types.

/// Template rendering error.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template text is not valid Handlebars.
    #[error("invalid link template: {0}")]
    Parse(#[from] handlebars::TemplateError),

    /// The template references data that is not available.
    #[error("failed to render link template: {0}")]
    Render(#[from] handlebars::RenderError),
}
