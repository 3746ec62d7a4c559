//! Event routing for webhook deliveries.
//!
//! A delivery is a JSON object whose top-level keys name event types, e.g.
//! `{"post": {...}}` or `{"ping": "OK"}`. For every key, in document order:
//!
//! 1. the `all` handler (if registered) gets the whole payload;
//! 2. the handler registered under the key gets the key's value, or the
//!    `default` handler gets the whole payload when none is registered.
//!
//! Any error or panic aborts the rest of the delivery and turns the reply
//! into `500 {"text":"500 error","details":...}`.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use axum::http::StatusCode;
use parking_lot::RwLock;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::response::WebhookResponse;

/// Handler invoked for every top-level key.
pub const ALL_EVENT: &str = "all";
/// Handler invoked for keys without a handler of their own.
pub const DEFAULT_EVENT: &str = "default";
/// Event sent by Discourse when a webhook is tested.
pub const PING_EVENT: &str = "ping";

/// A registered event handler.
pub type Handler = Arc<dyn Fn(&Value, &mut WebhookResponse) -> anyhow::Result<()> + Send + Sync>;

/// Registry of event handlers plus the routing loop.
///
/// Cloning is cheap and clones share the registry.
#[derive(Clone)]
pub struct WebhookDispatcher {
    handlers: Arc<RwLock<HashMap<String, Handler>>>,
}

impl WebhookDispatcher {
    /// Create a dispatcher with the built-in `ping` and `default` handlers.
    pub fn new() -> Self {
        let dispatcher = Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        };
        dispatcher.on(PING_EVENT, |body, res| {
            info!(event = PING_EVENT, payload = %body, "Webhook ping");
            res.json(json!({ "text": "200 ok", "ec": 200 }));
            Ok(())
        });
        dispatcher.on(DEFAULT_EVENT, |body, res| {
            info!(event = DEFAULT_EVENT, payload = %body, "Unhandled webhook event");
            res.json(json!({ "text": "200 ok", "ec": 200 }));
            Ok(())
        });
        dispatcher
    }

    /// Register a handler, replacing any previous one for `event`.
    pub fn on<F>(&self, event: impl Into<String>, handler: F)
    where
        F: Fn(&Value, &mut WebhookResponse) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers.write().insert(event.into(), Arc::new(handler));
    }

    /// Whether a handler is registered for `event`.
    pub fn has_handler(&self, event: &str) -> bool {
        self.handlers.read().contains_key(event)
    }

    /// Route one delivery and return the reply to send.
    ///
    /// Never fails: handler errors and panics become a `500` reply.
    pub fn deliver(&self, payload: &Value) -> WebhookResponse {
        let handlers = self.handlers.read().clone();
        let mut response = WebhookResponse::new();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            dispatch(&handlers, payload, &mut response)
        }));

        let details = match outcome {
            Ok(Ok(())) => return response,
            Ok(Err(err)) => Value::String(err.to_string()),
            Err(panic) => panic_details(panic),
        };

        error!(details = %details, "Webhook handler failed");
        response.overwrite(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "text": "500 error", "details": details }),
        );
        response
    }
}

impl Default for WebhookDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut events: Vec<String> = self.handlers.read().keys().cloned().collect();
        events.sort();
        f.debug_struct("WebhookDispatcher")
            .field("events", &events)
            .finish()
    }
}

fn dispatch(
    handlers: &HashMap<String, Handler>,
    payload: &Value,
    response: &mut WebhookResponse,
) -> anyhow::Result<()> {
    let Some(events) = payload.as_object() else {
        return Ok(());
    };

    for (event, body) in events {
        if let Some(all) = handlers.get(ALL_EVENT) {
            all(payload, response)?;
        }
        match handlers.get(event) {
            Some(handler) => handler(body, response)?,
            None => {
                if let Some(default) = handlers.get(DEFAULT_EVENT) {
                    default(payload, response)?;
                }
            }
        }
    }
    Ok(())
}

/// Panic payloads are usually `&str` or `String`; anything else is opaque.
fn panic_details(panic: Box<dyn Any + Send>) -> Value {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        Value::String((*msg).to_string())
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        Value::String(msg.clone())
    } else {
        Value::String("handler panicked".to_string())
    }
}
