//! Webhook relay for Discourse.
//!
//! Discourse posts event deliveries such as `{"post": {...}}` or
//! `{"ping": "OK"}`. [`WebhookDispatcher`] routes each top-level key to a
//! registered handler; [`WebhookServer`] accepts the HTTP deliveries and
//! writes back the handler's reply.
//!
//! # Example
//!
//! ```no_run
//! use discourse_webhook::{WebhookConfig, WebhookDispatcher, WebhookServer};
//! use serde_json::json;
//!
//! # async fn example() -> discourse_webhook::Result<()> {
//! let dispatcher = WebhookDispatcher::new();
//! dispatcher.on("post", |post, res| {
//!     println!("new post: {}", post["raw"]);
//!     res.json(json!({ "text": "200 ok" }));
//!     Ok(())
//! });
//!
//! let config = WebhookConfig::new("0.0.0.0:8080".parse().unwrap());
//! WebhookServer::new(config, dispatcher).run().await?;
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod error;
pub mod response;
pub mod server;

pub use dispatcher::{ALL_EVENT, DEFAULT_EVENT, Handler, PING_EVENT, WebhookDispatcher};
pub use error::{Result, WebhookError};
pub use response::WebhookResponse;
pub use server::{DEFAULT_PATH, WebhookConfig, WebhookServer};
