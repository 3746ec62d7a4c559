//! Notifications API.

use serde_json::json;

use crate::client::DiscourseClient;
use crate::error::Result;
use crate::types::{MarkReadResponse, Notifications};

/// Notifications API client.
pub struct NotificationsApi {
    client: DiscourseClient,
}

impl NotificationsApi {
    pub(crate) fn new(client: DiscourseClient) -> Self {
        Self { client }
    }

    /// List notifications for the acting user.
    pub async fn list(&self) -> Result<Notifications> {
        self.client.get("/notifications").await
    }

    /// Follow a `load_more_notifications` link from a previous page.
    pub async fn list_more(&self, load_more_notifications: &str) -> Result<Notifications> {
        self.client.get(load_more_notifications).await
    }

    /// Mark one notification, or all of them, as read.
    pub async fn mark_read(&self, id: Option<u64>) -> Result<MarkReadResponse> {
        let body = match id {
            Some(id) => json!({ "id": id }),
            None => json!({}),
        };
        self.client.put("/notifications/mark-read", &body).await
    }
}
