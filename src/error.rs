use axum::http::StatusCode;
use thiserror::Error;

/// Fatal failures of a storybook request.
///
/// Asset failures are not represented here: they are absorbed per page as
/// [`crate::models::Asset::Failed`].
#[derive(Debug, Error)]
pub enum StoryError {
    /// Rejected before any collaborator call (bad body, empty prompt, bad page count)
    #[error("{0}")]
    InvalidRequest(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    /// The text-generation call itself failed
    #[error("story generation failed: {0}")]
    UpstreamCall(String),

    /// The text-generation call succeeded but its reply is not a story
    #[error("model returned malformed story output ({reason}); output preview: {preview}")]
    MalformedModelOutput { reason: String, preview: String },
}

impl StoryError {
    /// HTTP status this error is surfaced with
    pub fn status(&self) -> StatusCode {
        match self {
            StoryError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            StoryError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            StoryError::UpstreamCall(_) | StoryError::MalformedModelOutput { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
