//! Per-call request options and the pure parts of request composition.

use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::form::MultipartForm;

/// Suffix that asks Discourse for a JSON representation of a path.
pub const JSON_SUFFIX: &str = ".json";

/// Options for a single call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Do not append [`JSON_SUFFIX`] to path endpoints.
    pub skip_path_suffixing: bool,
    /// Extra headers for this call.
    pub headers: BTreeMap<String, String>,
    /// Use `headers` as the complete header set instead of merging them
    /// over the credential headers.
    pub override_headers: bool,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable path suffixing.
    pub fn with_skip_path_suffixing(mut self, skip: bool) -> Self {
        self.skip_path_suffixing = skip;
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace instead of merge the default headers.
    pub fn with_override_headers(mut self, override_headers: bool) -> Self {
        self.override_headers = override_headers;
        self
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Data sent with a call.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Serialized as the JSON body.
    Json(Value),
    /// Search parameters; moved to the query string, no body is sent.
    Query(Vec<(String, String)>),
    /// Multipart form; any explicit `Content-Type` header is dropped.
    Form(MultipartForm),
}

impl Payload {
    /// Serialize a value into a JSON payload.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_value(value)?))
    }
}

/// Resolve an endpoint against the base URL.
///
/// Endpoints starting with `/` are paths on `base_url` and get
/// [`JSON_SUFFIX`] inserted before any query string unless they already end
/// with it or `skip_path_suffixing` is set. Anything else is an absolute URL
/// and is never suffixed. It is still parsed into a [`Url`], so it comes out
/// in canonical form: the scheme and host are lowercased and a bare origin
/// gains a trailing `/`. Path, query and fragment are kept as given.
pub fn resolve_endpoint(base_url: &str, endpoint: &str, skip_path_suffixing: bool) -> Result<Url> {
    if !endpoint.starts_with('/') {
        return Ok(Url::parse(endpoint)?);
    }

    let (path, query) = match endpoint.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (endpoint, None),
    };

    let suffix = if skip_path_suffixing || path.ends_with(JSON_SUFFIX) {
        ""
    } else {
        JSON_SUFFIX
    };

    let full = match query {
        Some(query) if !query.is_empty() => format!("{base_url}{path}{suffix}?{query}"),
        _ => format!("{base_url}{path}{suffix}"),
    };
    Ok(Url::parse(&full)?)
}

/// Compute the header set for one call.
///
/// Caller headers win over credential headers on conflicting names
/// (compared case-insensitively).
pub fn compose_headers(
    defaults: &[(&'static str, String)],
    options: &RequestOptions,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if !options.override_headers {
        for (name, value) in defaults {
            insert_header(&mut headers, name, value, true)?;
        }
    }
    for (name, value) in &options.headers {
        insert_header(&mut headers, name, value, false)?;
    }
    Ok(headers)
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str, sensitive: bool) -> Result<()> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::Config(format!("invalid header name '{}'", name)))?;
    let mut header_value = HeaderValue::from_str(value)
        .map_err(|_| Error::Config(format!("invalid value for header '{}'", name)))?;
    header_value.set_sensitive(sensitive);
    headers.insert(header_name, header_value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://forum.example.com";

    fn resolve(endpoint: &str, skip: bool) -> String {
        resolve_endpoint(BASE, endpoint, skip).unwrap().to_string()
    }

    #[test]
    fn test_path_gets_suffix() {
        assert_eq!(resolve("/site", false), "https://forum.example.com/site.json");
        assert_eq!(resolve("/t/5", false), "https://forum.example.com/t/5.json");
    }

    #[test]
    fn test_suffix_goes_before_query() {
        assert_eq!(
            resolve("/t/5?foo=bar", false),
            "https://forum.example.com/t/5.json?foo=bar"
        );
        assert_eq!(
            resolve("/latest?order=views&ascending=true", false),
            "https://forum.example.com/latest.json?order=views&ascending=true"
        );
    }

    #[test]
    fn test_existing_suffix_not_doubled() {
        assert_eq!(resolve("/t/5.json", false), "https://forum.example.com/t/5.json");
        assert_eq!(
            resolve("/t/5.json?page=2", false),
            "https://forum.example.com/t/5.json?page=2"
        );
    }

    #[test]
    fn test_skip_suffixing() {
        assert_eq!(resolve("/t/5", true), "https://forum.example.com/t/5");
        assert_eq!(
            resolve("/t/5?foo=bar", true),
            "https://forum.example.com/t/5?foo=bar"
        );
    }

    #[test]
    fn test_empty_query_dropped() {
        assert_eq!(resolve("/t/5?", false), "https://forum.example.com/t/5.json");
    }

    #[test]
    fn test_absolute_url_never_suffixed() {
        for skip in [false, true] {
            assert_eq!(
                resolve("https://cdn.example.com/notifications?offset=60", skip),
                "https://cdn.example.com/notifications?offset=60"
            );
        }
    }

    #[test]
    fn test_absolute_url_is_canonicalized_not_rewritten() {
        assert_eq!(
            resolve("HTTPS://CDN.Example.com", false),
            "https://cdn.example.com/"
        );
        assert_eq!(
            resolve("https://CDN.example.com/Uploads/A.PNG?Size=Large", false),
            "https://cdn.example.com/Uploads/A.PNG?Size=Large"
        );
    }

    #[test]
    fn test_base_with_subfolder() {
        let url = resolve_endpoint("https://example.com/forum", "/posts/3", false).unwrap();
        assert_eq!(url.as_str(), "https://example.com/forum/posts/3.json");
    }

    #[test]
    fn test_invalid_absolute_url() {
        assert!(matches!(
            resolve_endpoint(BASE, "not a url", false),
            Err(Error::InvalidUrl(_))
        ));
    }

    fn admin_defaults() -> Vec<(&'static str, String)> {
        vec![
            ("Api-Key", "key".to_string()),
            ("Api-Username", "system".to_string()),
        ]
    }

    #[test]
    fn test_merge_caller_wins() {
        let options = RequestOptions::new()
            .with_header("api-username", "alice")
            .with_header("X-Trace", "1");
        let headers = compose_headers(&admin_defaults(), &options).unwrap();

        assert_eq!(headers.len(), 3);
        assert_eq!(headers["api-key"], "key");
        assert_eq!(headers["api-username"], "alice");
        assert_eq!(headers["x-trace"], "1");
    }

    #[test]
    fn test_override_uses_only_caller_headers() {
        let options = RequestOptions::new()
            .with_header("User-Api-Key", "revoke-me")
            .with_override_headers(true);
        let headers = compose_headers(&admin_defaults(), &options).unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers["user-api-key"], "revoke-me");
        assert!(headers.get("api-key").is_none());
    }

    #[test]
    fn test_credential_headers_are_sensitive() {
        let headers = compose_headers(&admin_defaults(), &RequestOptions::new()).unwrap();
        assert!(headers["api-key"].is_sensitive());
    }

    #[test]
    fn test_invalid_header_name() {
        let options = RequestOptions::new().with_header("bad header", "x");
        assert!(matches!(
            compose_headers(&[], &options),
            Err(Error::Config(_))
        ));
    }
}
