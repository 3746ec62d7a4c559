//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ChatApi, NotificationsApi, PostsApi, SiteApi, TopicsApi, UploadsApi, UsersApi};
use crate::auth::AuthConfig;
use crate::error::{ApiError, Error, Result};
use crate::request::{Payload, RequestOptions, compose_headers, resolve_endpoint};
use crate::transport::{ReqwestTransport, Transport, TransportBody, TransportRequest};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Discourse API client.
///
/// Every endpoint helper funnels through [`DiscourseClient::request`], which
/// resolves the endpoint, attaches credential headers and normalizes
/// failures.
///
/// # Example
///
/// ```no_run
/// use discourse_client::DiscourseClient;
///
/// # async fn example() -> discourse_client::Result<()> {
/// let client = DiscourseClient::builder()
///     .base_url("https://forum.example.com")
///     .api_key("secret")
///     .api_username("system")
///     .build()?;
///
/// let latest = client.posts().list().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DiscourseClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// Transport used for every call.
    pub(crate) transport: Arc<dyn Transport>,
    /// Site URL without trailing slash.
    pub(crate) base_url: String,
    /// Credentials.
    pub(crate) auth: RwLock<AuthConfig>,
    /// Request timeout.
    pub(crate) timeout: Duration,
}

impl DiscourseClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create an anonymous client for a site.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    /// Get the site URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Read access to the credentials.
    pub fn auth(&self) -> RwLockReadGuard<'_, AuthConfig> {
        self.inner.auth.read()
    }

    /// Write access to the credentials. Setters on the guard validate.
    pub fn auth_mut(&self) -> RwLockWriteGuard<'_, AuthConfig> {
        self.inner.auth.write()
    }

    /// Replace all credentials at once.
    pub fn set_auth(&self, auth: AuthConfig) -> Result<()> {
        auth.validate()?;
        *self.inner.auth.write() = auth;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the site API.
    pub fn site(&self) -> SiteApi {
        SiteApi::new(self.clone())
    }

    /// Access the posts API.
    pub fn posts(&self) -> PostsApi {
        PostsApi::new(self.clone())
    }

    /// Access the topics API.
    pub fn topics(&self) -> TopicsApi {
        TopicsApi::new(self.clone())
    }

    /// Access the uploads API.
    pub fn uploads(&self) -> UploadsApi {
        UploadsApi::new(self.clone())
    }

    /// Access the notifications API.
    pub fn notifications(&self) -> NotificationsApi {
        NotificationsApi::new(self.clone())
    }

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the chat API.
    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request composition
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request and decode the response body into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<Payload>,
        options: RequestOptions,
    ) -> Result<T> {
        let value = self.request_value(endpoint, method, payload, options).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a request and return the response body as JSON.
    ///
    /// Path endpoints (leading `/`) are resolved against the site URL and
    /// suffixed with `.json`; absolute URLs pass through. Non-success
    /// responses become [`Error::Api`]; failures without a response are
    /// returned exactly as the transport produced them.
    pub async fn request_value(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<Payload>,
        options: RequestOptions,
    ) -> Result<Value> {
        let defaults = self.inner.auth.read().headers();
        let mut headers = compose_headers(&defaults, &options)?;
        let mut query = options.query;

        let body = match payload {
            None => TransportBody::Empty,
            Some(Payload::Json(value)) => TransportBody::Json(value),
            Some(Payload::Query(pairs)) => {
                query.extend(pairs);
                TransportBody::Empty
            }
            Some(Payload::Form(form)) => {
                headers.remove(CONTENT_TYPE);
                TransportBody::Multipart(form)
            }
        };

        let url = resolve_endpoint(&self.inner.base_url, endpoint, options.skip_path_suffixing)?;
        debug!(method = %method, url = %url, "Sending request");

        let request = TransportRequest {
            method: method.clone(),
            url: url.clone(),
            headers,
            query,
            body,
            timeout: Some(self.inner.timeout),
        };

        let response = self.inner.transport.execute(request).await?;
        if response.status.is_success() {
            return Ok(response.body_value());
        }

        let err = ApiError::from_response(method, url, response);
        warn!(status = err.status, url = %err.url, error = %err.message, "Request failed");
        Err(Error::Api(err))
    }

    /// Make a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, Method::GET, None, RequestOptions::default())
            .await
    }

    /// Make a GET request with search parameters.
    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        self.request(
            endpoint,
            Method::GET,
            Some(Payload::Query(query)),
            RequestOptions::default(),
        )
        .await
    }

    /// Make a POST request.
    pub(crate) async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(
            endpoint,
            Method::POST,
            Some(Payload::json(body)?),
            RequestOptions::default(),
        )
        .await
    }

    /// Make a PUT request.
    pub(crate) async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(
            endpoint,
            Method::PUT,
            Some(Payload::json(body)?),
            RequestOptions::default(),
        )
        .await
    }

    /// Make a DELETE request.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, Method::DELETE, None, RequestOptions::default())
            .await
    }

    /// Make a DELETE request with a JSON body.
    pub(crate) async fn delete_with<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(
            endpoint,
            Method::DELETE,
            Some(Payload::json(body)?),
            RequestOptions::default(),
        )
        .await
    }
}

/// Builder for creating a DiscourseClient.
pub struct ClientBuilder {
    base_url: Option<String>,
    auth: AuthConfig,
    auth_error: Option<Error>,
    timeout: Duration,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            auth: AuthConfig::default(),
            auth_error: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            transport: None,
        }
    }

    /// Set the site URL, e.g. `https://forum.example.com`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the admin API key.
    pub fn api_key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.with_auth(|auth| auth.set_api_key(key))
    }

    /// Set the username the admin API key acts as.
    pub fn api_username(self, username: impl Into<String>) -> Self {
        let username = username.into();
        self.with_auth(|auth| auth.set_api_username(username))
    }

    /// Set a delegated user API key.
    pub fn user_api_key(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.with_auth(|auth| auth.set_user_api_key(key))
    }

    /// Set the client id bound to the user API key.
    pub fn user_api_client_id(self, client_id: impl Into<String>) -> Self {
        let client_id = client_id.into();
        self.with_auth(|auth| auth.set_user_api_client_id(client_id))
    }

    /// Use a complete credential set, discarding earlier credential calls
    /// and any conflict they recorded.
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self.auth_error = None;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use a custom transport instead of the default `reqwest` one.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Record the first credential conflict; reported by `build`.
    fn with_auth(mut self, set: impl FnOnce(&mut AuthConfig) -> Result<()>) -> Self {
        if let Err(e) = set(&mut self.auth) {
            self.auth_error.get_or_insert(e);
        }
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DiscourseClient> {
        if let Some(err) = self.auth_error {
            return Err(err);
        }
        self.auth.validate()?;

        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("discourse-client/{}", env!("CARGO_PKG_VERSION")));
                let http = reqwest::Client::builder().user_agent(user_agent).build()?;
                Arc::new(ReqwestTransport::new(http))
            }
        };

        Ok(DiscourseClient {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                auth: RwLock::new(self.auth),
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MultipartForm;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;
    use serde_json::json;

    /// Transport that records requests and replays a canned outcome.
    #[derive(Clone)]
    struct MockTransport {
        seen: Arc<Mutex<Vec<TransportRequest>>>,
        outcome: Arc<dyn Fn() -> Result<TransportResponse> + Send + Sync>,
    }

    impl MockTransport {
        fn responding(status: u16, body: &'static str) -> Self {
            Self {
                seen: Arc::default(),
                outcome: Arc::new(move || {
                    Ok(TransportResponse {
                        status: StatusCode::from_u16(status).unwrap(),
                        headers: HeaderMap::new(),
                        body: body.as_bytes().to_vec(),
                    })
                }),
            }
        }

        fn last(&self) -> TransportRequest {
            self.seen.lock().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
            self.seen.lock().push(request);
            (self.outcome)()
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused by test")]
    struct Refused;

    fn client_with(transport: MockTransport) -> DiscourseClient {
        DiscourseClient::builder()
            .base_url("https://forum.example.com/")
            .api_key("key")
            .api_username("system")
            .transport(transport)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = DiscourseClient::new("https://forum.example.com/").unwrap();
        assert_eq!(client.base_url(), "https://forum.example.com");
    }

    #[test]
    fn test_builder_rejects_conflicting_auth() {
        let result = DiscourseClient::builder()
            .base_url("https://forum.example.com")
            .api_key("key")
            .user_api_key("ukey")
            .build();
        assert!(matches!(result, Err(Error::ConflictingAuth)));
    }

    #[test]
    fn test_builder_auth_replaces_conflicting_credentials() {
        let client = DiscourseClient::builder()
            .base_url("https://forum.example.com")
            .api_key("key")
            .user_api_key("ukey")
            .auth(AuthConfig::admin("key", "system"))
            .build()
            .unwrap();
        assert_eq!(client.auth().api_key(), Some("key"));
        assert_eq!(client.auth().user_api_key(), None);

        let result = DiscourseClient::builder()
            .base_url("https://forum.example.com")
            .auth(AuthConfig::admin("key", "system"))
            .user_api_key("ukey")
            .build();
        assert!(matches!(result, Err(Error::ConflictingAuth)));
    }

    #[test]
    fn test_auth_mut_rejects_conflict() {
        let client = DiscourseClient::builder()
            .base_url("https://forum.example.com")
            .user_api_key("ukey")
            .build()
            .unwrap();
        assert!(client.auth_mut().set_api_key("key").is_err());
        assert_eq!(client.auth().api_key(), None);

        let mut other = AuthConfig::new();
        other.set_api_username("system").unwrap();
        client.set_auth(other).unwrap();
        assert_eq!(client.auth().user_api_key(), None);
        assert_eq!(client.auth().api_username(), Some("system"));
    }

    #[tokio::test]
    async fn test_request_composes_url_and_headers() {
        let transport = MockTransport::responding(200, r#"{"ok":true}"#);
        let client = client_with(transport.clone());

        let value = client
            .request_value(
                "/t/5?foo=bar",
                Method::GET,
                None,
                RequestOptions::new().with_header("X-Trace", "1"),
            )
            .await
            .unwrap();
        assert_eq!(value, json!({"ok": true}));

        let request = transport.last();
        assert_eq!(request.url.as_str(), "https://forum.example.com/t/5.json?foo=bar");
        assert_eq!(request.headers["api-key"], "key");
        assert_eq!(request.headers["api-username"], "system");
        assert_eq!(request.headers["x-trace"], "1");
        assert!(matches!(request.body, TransportBody::Empty));
    }

    #[tokio::test]
    async fn test_query_payload_moves_to_query() {
        let transport = MockTransport::responding(200, "{}");
        let client = client_with(transport.clone());

        client
            .request_value(
                "/latest",
                Method::GET,
                Some(Payload::Query(vec![("order".into(), "views".into())])),
                RequestOptions::new().with_query("page", "2"),
            )
            .await
            .unwrap();

        let request = transport.last();
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "2".to_string()),
                ("order".to_string(), "views".to_string())
            ]
        );
        assert!(matches!(request.body, TransportBody::Empty));
    }

    #[tokio::test]
    async fn test_form_payload_strips_content_type() {
        let transport = MockTransport::responding(200, "{}");
        let client = client_with(transport.clone());

        client
            .request_value(
                "/uploads",
                Method::POST,
                Some(Payload::Form(MultipartForm::new().text("type", "composer"))),
                RequestOptions::new().with_header("content-type", "application/json"),
            )
            .await
            .unwrap();

        let request = transport.last();
        assert!(request.headers.get(CONTENT_TYPE).is_none());
        assert!(matches!(request.body, TransportBody::Multipart(_)));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_text() {
        let transport = MockTransport::responding(200, "just some raw text");
        let client = client_with(transport);
        let raw: String = client
            .request("/posts/1/raw", Method::GET, None, RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(raw, "just some raw text");
    }

    #[tokio::test]
    async fn test_error_status_normalized() {
        let transport = MockTransport::responding(422, r#"{"errors":["a","b"]}"#);
        let client = client_with(transport);

        let err = client
            .request_value("/posts", Method::POST, None, RequestOptions::new())
            .await
            .unwrap_err();
        let api = err.api_error().unwrap();
        assert_eq!(api.status, 422);
        assert!(api.message.ends_with(": a;b"));
        assert_eq!(api.method, Method::POST);
        assert_eq!(api.url.as_str(), "https://forum.example.com/posts.json");
    }

    #[tokio::test]
    async fn test_transport_error_propagates_unchanged() {
        let transport = MockTransport {
            seen: Arc::default(),
            outcome: Arc::new(|| Err(Error::transport(Refused))),
        };
        let client = client_with(transport);

        let err = client
            .request_value("/site", Method::GET, None, RequestOptions::new())
            .await
            .unwrap_err();
        match err {
            Error::Transport(inner) => {
                assert!(inner.downcast_ref::<Refused>().is_some());
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
