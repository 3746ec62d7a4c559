//! Error types for the webhook relay.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, WebhookError>;

/// Errors raised by the relay before dispatch.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The delivery body could not be parsed.
    #[error("Invalid webhook body: {0}")]
    InvalidBody(String),

    /// Binding or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::InvalidBody(details) => {
                tracing::warn!(error = %details, "Rejected webhook delivery");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "text": "400 bad request", "details": details })),
                )
                    .into_response()
            }
            WebhookError::Io(e) => {
                tracing::error!(error = %e, "Webhook relay IO error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "text": "500 error", "details": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
