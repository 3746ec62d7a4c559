//! HTTP relay that feeds deliveries into a [`WebhookDispatcher`].

use std::net::SocketAddr;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::dispatcher::WebhookDispatcher;
use crate::error::{Result, WebhookError};

/// Path deliveries are accepted on when none is configured.
pub const DEFAULT_PATH: &str = "/webhook";

/// Configuration for the relay.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub bind_addr: SocketAddr,
    /// Paths that accept `POST` deliveries.
    pub paths: Vec<String>,
    pub enable_cors: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 80)),
            paths: vec![DEFAULT_PATH.to_string()],
            enable_cors: false,
        }
    }
}

impl WebhookConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Replace the delivery paths.
    pub fn with_paths(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Add a delivery path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }
}

/// The webhook relay server.
pub struct WebhookServer {
    config: WebhookConfig,
    dispatcher: WebhookDispatcher,
}

impl WebhookServer {
    pub fn new(config: WebhookConfig, dispatcher: WebhookDispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// The dispatcher deliveries are routed to.
    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.dispatcher
    }

    /// Build the axum router. It can be merged into a larger application.
    pub fn router(&self) -> Router {
        let mut router: Router<WebhookDispatcher> = Router::new();
        for path in self.delivery_paths() {
            router = router.route(&path, post(handle_delivery));
        }
        let mut router = router
            .with_state(self.dispatcher.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router
    }

    /// Configured paths with a leading `/`, duplicates removed.
    fn delivery_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for path in &self.config.paths {
            let path = if path.starts_with('/') {
                path.clone()
            } else {
                format!("/{}", path)
            };
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Run the relay until the process stops.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, paths = ?self.config.paths, "Starting webhook relay");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Run with graceful shutdown, returning the bound address.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<SocketAddr> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, paths = ?self.config.paths, "Starting webhook relay");
        let router = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                tracing::error!(error = %e, "Webhook relay stopped");
            }
        });
        Ok(local_addr)
    }
}

/// Handle POST on a delivery path.
async fn handle_delivery(
    State(dispatcher): State<WebhookDispatcher>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match parse_body(&headers, &body) {
        Ok(payload) => dispatcher.deliver(&payload).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Decode a delivery as JSON or as a urlencoded form (flattened to strings).
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<Value> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/x-www-form-urlencoded") {
        let fields: Map<String, Value> = url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        return Ok(Value::Object(fields));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body).map_err(|e| WebhookError::InvalidBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    async fn post_to(router: Router, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(CONTENT_TYPE, content_type)
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn server() -> WebhookServer {
        WebhookServer::new(WebhookConfig::default(), WebhookDispatcher::new())
    }

    #[tokio::test]
    async fn test_ping_delivery() {
        let (status, body) =
            post_to(server().router(), "/webhook", "application/json", r#"{"ping":"OK"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"text": "200 ok", "ec": 200}));
    }

    #[tokio::test]
    async fn test_registered_handler_reply() {
        let server = server();
        server.dispatcher().on("post", |post, res| {
            res.json(json!({"text": "got", "raw": post["raw"].clone()}));
            Ok(())
        });

        let (status, body) = post_to(
            server.router(),
            "/webhook",
            "application/json",
            r#"{"post":{"id":1,"raw":"hello"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"text": "got", "raw": "hello"}));
    }

    #[tokio::test]
    async fn test_handler_failure_is_500() {
        let server = server();
        server
            .dispatcher()
            .on("post", |_post, _res| Err(anyhow::anyhow!("database unavailable")));

        let (status, body) =
            post_to(server.router(), "/webhook", "application/json", r#"{"post":{}}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"text": "500 error", "details": "database unavailable"}));
    }

    #[tokio::test]
    async fn test_urlencoded_delivery() {
        let server = server();
        server.dispatcher().on("ping", |value, res| {
            res.json(json!({ "echo": value.clone() }));
            Ok(())
        });

        let (status, body) = post_to(
            server.router(),
            "/webhook",
            "application/x-www-form-urlencoded",
            "ping=hello+world",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"echo": "hello world"}));
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (status, body) =
            post_to(server().router(), "/webhook", "application/json", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["text"], "400 bad request");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_custom_paths() {
        let server = WebhookServer::new(
            WebhookConfig::default().with_paths(["/hooks/a", "/hooks/b"]),
            WebhookDispatcher::new(),
        );

        let (status, _) =
            post_to(server.router(), "/hooks/b", "application/json", r#"{"ping":"OK"}"#).await;
        assert_eq!(status, StatusCode::OK);

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_with_shutdown_binds() {
        let config = WebhookConfig::new("127.0.0.1:0".parse().unwrap());
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let addr = WebhookServer::new(config, WebhookDispatcher::new())
            .run_with_shutdown(async {
                rx.await.ok();
            })
            .await
            .unwrap();
        assert_ne!(addr.port(), 0);
        tx.send(()).ok();
    }

    #[test]
    fn test_delivery_paths_normalized() {
        let server = WebhookServer::new(
            WebhookConfig::default().with_path("hooks").with_path("/webhook"),
            WebhookDispatcher::new(),
        );
        assert_eq!(server.delivery_paths(), vec!["/webhook", "/hooks"]);
    }

    #[test]
    fn test_config_defaults() {
        let config = WebhookConfig::default();
        assert_eq!(config.bind_addr.port(), 80);
        assert_eq!(config.paths, vec!["/webhook".to_string()]);
        assert!(!config.enable_cors);
    }
}
