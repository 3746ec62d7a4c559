//! Client error types.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::transport::TransportResponse;

/// Boxed error produced by a [`Transport`](crate::transport::Transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Admin-key and user-key credentials were both configured.
    #[error("You cannot specify api_key and user_api_key at the same time")]
    ConflictingAuth,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The server answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced a response (connect, DNS, timeout, ...).
    ///
    /// The transport's own error is kept as-is and can be downcast back to
    /// its concrete type.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Encrypted payload was not valid base64.
    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// RSA key could not be generated, parsed or encoded.
    #[error("Key error: {0}")]
    Key(String),

    /// Ciphertext does not match the private key.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Local file access failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(Box::new(e))
    }
}

impl Error {
    /// Wrap a transport-level failure without altering it.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(err.into())
    }

    /// The normalized API error, if the server responded.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of the response, if the server responded.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|e| e.status)
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is an authentication or permission error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }

    /// Check if the request failed before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Uniform error for a call the server answered with a non-success status.
///
/// `message` starts as the transport-level description and gets the
/// server's validation errors appended when the body carries an `errors`
/// field.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for the status.
    pub status_text: String,
    /// Human-readable message.
    pub message: String,
    /// Response body (parsed JSON, or the raw text).
    pub body: Value,
    /// Coarse error code (`ERR_BAD_REQUEST` / `ERR_BAD_RESPONSE`).
    pub code: Option<String>,
    /// Method of the failed request.
    pub method: Method,
    /// URL of the failed request.
    pub url: Url,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ApiError {
    /// Build the normalized error from a non-success response.
    pub fn from_response(method: Method, url: Url, response: TransportResponse) -> Self {
        let status = response.status;
        let body = response.body_value();

        let mut message = format!("Request failed with status code {}", status.as_u16());
        if let Some(errors) = body.as_object().and_then(|obj| obj.get("errors")) {
            let detail = join_errors(errors).unwrap_or_else(|| stringify_errors(errors));
            message.push_str(": ");
            message.push_str(&detail);
        }

        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            message,
            body,
            code: error_code(status).map(str::to_string),
            method,
            url,
            headers: response.headers,
        }
    }

    /// The server-side `errors` entries, when the body has a list of them.
    pub fn errors(&self) -> Vec<String> {
        self.body
            .get("errors")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(join_item).collect())
            .unwrap_or_default()
    }
}

/// Join an `errors` value with `;` if it is a list. Returns `None` otherwise.
pub(crate) fn join_errors(errors: &Value) -> Option<String> {
    let items = errors.as_array()?;
    Some(items.iter().map(join_item).collect::<Vec<_>>().join(";"))
}

/// Render any `errors` value as JSON text.
pub(crate) fn stringify_errors(errors: &Value) -> String {
    errors.to_string()
}

fn join_item(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn error_code(status: StatusCode) -> Option<&'static str> {
    if status.is_client_error() {
        Some("ERR_BAD_REQUEST")
    } else if status.is_server_error() {
        Some("ERR_BAD_RESPONSE")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn normalize(status: u16, body: &str) -> ApiError {
        ApiError::from_response(
            Method::POST,
            Url::parse("https://forum.example.com/posts.json").unwrap(),
            response(status, body),
        )
    }

    #[test]
    fn test_join_errors_list() {
        assert_eq!(join_errors(&json!(["a", "b"])).as_deref(), Some("a;b"));
        assert_eq!(join_errors(&json!([])).as_deref(), Some(""));
        assert_eq!(join_errors(&json!(["a", 1, null])).as_deref(), Some("a;1;"));
    }

    #[test]
    fn test_join_errors_rejects_non_list() {
        assert!(join_errors(&json!("boom")).is_none());
        assert!(join_errors(&json!({"title": "too short"})).is_none());
        assert!(join_errors(&Value::Null).is_none());
    }

    #[test]
    fn test_stringify_errors() {
        assert_eq!(stringify_errors(&json!("boom")), "\"boom\"");
        assert_eq!(
            stringify_errors(&json!({"title": "too short"})),
            r#"{"title":"too short"}"#
        );
        assert_eq!(stringify_errors(&Value::Null), "null");
    }

    #[test]
    fn test_normalize_appends_joined_errors() {
        let err = normalize(422, r#"{"errors":["a","b"],"error_type":"invalid_parameters"}"#);
        assert_eq!(err.status, 422);
        assert_eq!(err.status_text, "Unprocessable Entity");
        assert_eq!(err.message, "Request failed with status code 422: a;b");
        assert!(err.message.ends_with(": a;b"));
        assert_eq!(err.code.as_deref(), Some("ERR_BAD_REQUEST"));
        assert_eq!(err.errors(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.body["error_type"], "invalid_parameters");
    }

    #[test]
    fn test_normalize_stringifies_non_list_errors() {
        let err = normalize(400, r#"{"errors":"bad things"}"#);
        assert_eq!(
            err.message,
            "Request failed with status code 400: \"bad things\""
        );
        assert!(err.errors().is_empty());
    }

    #[test]
    fn test_normalize_without_errors_field() {
        let err = normalize(404, r#"{"error_type":"not_found"}"#);
        assert_eq!(err.message, "Request failed with status code 404");
        assert_eq!(err.status_text, "Not Found");
    }

    #[test]
    fn test_normalize_non_json_body() {
        let err = normalize(502, "<html>Bad Gateway</html>");
        assert_eq!(err.body, json!("<html>Bad Gateway</html>"));
        assert_eq!(err.message, "Request failed with status code 502");
        assert_eq!(err.code.as_deref(), Some("ERR_BAD_RESPONSE"));
    }

    #[test]
    fn test_error_classification() {
        let err = Error::Api(normalize(404, "{}"));
        assert!(err.is_not_found());
        assert!(!err.is_server_error());
        assert!(!err.is_transport());

        let err = Error::Api(normalize(403, "{}"));
        assert!(err.is_auth_error());

        let err = Error::Api(normalize(429, "{}"));
        assert!(err.is_rate_limited());

        let err = Error::Api(normalize(503, "{}"));
        assert!(err.is_server_error());

        let err = Error::transport(std::io::Error::other("connection reset"));
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_api_error_display_is_message() {
        let err = Error::Api(normalize(422, r#"{"errors":["Title is too short"]}"#));
        assert_eq!(
            err.to_string(),
            "Request failed with status code 422: Title is too short"
        );
    }
}
