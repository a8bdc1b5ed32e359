use axum::{
    extract::multipart::MultipartError,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures a handler cannot turn into a rendered page
#[derive(Debug, Error)]
pub enum AppError {
    /// The upload body itself was unreadable (truncated, over the body limit, ...)
    #[error("upload failed: {0}")]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Multipart(e) => {
                tracing::warn!("Upload failed: {}", e.body_text());
                (e.status(), e.body_text()).into_response()
            }
        }
    }
}
