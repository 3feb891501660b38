use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diagnosis_core::error::CoreError;
use tracing::error;

const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("malformed request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Core(CoreError::InvalidSubmission(msg) | CoreError::InvalidReport(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Body(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            other => {
                error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
