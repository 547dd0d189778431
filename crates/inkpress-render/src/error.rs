/// Errors that can occur while rendering pages or assets.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Failed to serialize render context: {0}")]
    Context(#[from] serde_json::Error),

    #[error("CSS error: {0}")]
    Css(String),
}
