//! Transport seam between the request composer and the network.
//!
//! The composer never talks to `reqwest` directly: it hands a fully built
//! [`TransportRequest`] to a [`Transport`] and gets back status, headers and
//! raw body. Non-success statuses are returned as ordinary responses; only
//! failures that produced no response at all are errors here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::Result;
use crate::form::MultipartForm;

/// Executes one HTTP exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return whatever the server answered.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// A fully composed outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Final URL (suffixing already applied).
    pub url: Url,
    /// Final header set.
    pub headers: HeaderMap,
    /// Query parameters appended to `url`.
    pub query: Vec<(String, String)>,
    /// Request body.
    pub body: TransportBody,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

/// Body of an outbound request.
#[derive(Debug, Clone, Default)]
pub enum TransportBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(Value),
    /// Multipart form; the transport sets the boundary-bearing content type.
    Multipart(MultipartForm),
}

/// Raw response from the server.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Decode the body: JSON when it parses, otherwise the raw text.
    ///
    /// An empty body decodes to `null`.
    pub fn body_value(&self) -> Value {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Value::Null;
        }
        match serde_json::from_slice(&self.body) {
            Ok(value) => value,
            Err(_) => Value::String(String::from_utf8_lossy(&self.body).into_owned()),
        }
    }
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing HTTP client.
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            TransportBody::Empty => builder,
            TransportBody::Json(value) => builder.json(&value),
            TransportBody::Multipart(form) => builder.multipart(form.into_reqwest()),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: &[u8]) -> TransportResponse {
        TransportResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_body_value_json() {
        assert_eq!(
            response(br#"{"id": 5, "raw": "hi"}"#).body_value(),
            json!({"id": 5, "raw": "hi"})
        );
    }

    #[test]
    fn test_body_value_falls_back_to_text() {
        assert_eq!(
            response(b"# Heading\n\nraw markdown").body_value(),
            json!("# Heading\n\nraw markdown")
        );
    }

    #[test]
    fn test_body_value_empty_is_null() {
        assert_eq!(response(b"").body_value(), Value::Null);
        assert_eq!(response(b"  \n").body_value(), Value::Null);
    }
}
