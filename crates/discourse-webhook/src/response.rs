//! Response handle passed to webhook handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

/// Buffered reply for one delivery.
///
/// Handlers write through [`json`](Self::json) or [`send`](Self::send). Only
/// the first write is kept; later writes are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct WebhookResponse {
    reply: Option<(StatusCode, Value)>,
}

impl WebhookResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply `200` with a JSON body.
    pub fn json(&mut self, body: Value) {
        self.send(StatusCode::OK, body);
    }

    /// Reply with a status and JSON body.
    pub fn send(&mut self, status: StatusCode, body: Value) {
        if let Some((existing, _)) = &self.reply {
            tracing::warn!(
                status = %existing,
                ignored = %status,
                "Webhook response already written"
            );
            return;
        }
        self.reply = Some((status, body));
    }

    /// Replace whatever was written. Used by the isolation path.
    pub(crate) fn overwrite(&mut self, status: StatusCode, body: Value) {
        self.reply = Some((status, body));
    }

    /// Whether a handler has written a reply.
    pub fn is_written(&self) -> bool {
        self.reply.is_some()
    }

    /// Status that will be sent.
    pub fn status(&self) -> StatusCode {
        self.reply
            .as_ref()
            .map(|(status, _)| *status)
            .unwrap_or(StatusCode::OK)
    }

    /// Body that will be sent.
    pub fn body(&self) -> Value {
        self.reply
            .as_ref()
            .map(|(_, body)| body.clone())
            .unwrap_or_else(ack)
    }

    /// Final status and body; an unwritten handle acknowledges with `200`.
    pub fn into_parts(self) -> (StatusCode, Value) {
        self.reply.unwrap_or_else(|| (StatusCode::OK, ack()))
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        let (status, body) = self.into_parts();
        (status, Json(body)).into_response()
    }
}

fn ack() -> Value {
    json!({ "text": "200 ok" })
}
