//! Chat API.

use serde_json::{Map, Value, json};

use crate::client::DiscourseClient;
use crate::error::Result;

/// Optional fields of a chat message.
#[derive(Debug, Clone, Default)]
pub struct ChatMessageOptions {
    /// Message being replied to.
    pub in_reply_to_id: Option<u64>,
    /// Ids of uploads to attach.
    pub upload_ids: Vec<u64>,
}

impl ChatMessageOptions {
    fn apply(&self, body: &mut Map<String, Value>) {
        if !self.upload_ids.is_empty() {
            body.insert("upload_ids".to_string(), json!(self.upload_ids));
        }
        if let Some(id) = self.in_reply_to_id {
            body.insert("in_reply_to_id".to_string(), json!(id));
        }
    }
}

/// Chat API client.
pub struct ChatApi {
    client: DiscourseClient,
}

impl ChatApi {
    pub(crate) fn new(client: DiscourseClient) -> Self {
        Self { client }
    }

    /// Post a message to a channel.
    pub async fn send_message(
        &self,
        channel_id: u64,
        message: &str,
        options: ChatMessageOptions,
    ) -> Result<Value> {
        let mut body = Map::new();
        body.insert("message".to_string(), json!(message));
        options.apply(&mut body);
        self.client
            .post(&format!("/chat/{}", channel_id), &body)
            .await
    }

    /// Replace the text of a message.
    pub async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: &str,
        options: ChatMessageOptions,
    ) -> Result<Value> {
        let mut body = Map::new();
        body.insert("new_message".to_string(), json!(message));
        options.apply(&mut body);
        self.client
            .put(&format!("/chat/{}/edit/{}", channel_id, message_id), &body)
            .await
    }

    /// Delete a message.
    pub async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<Value> {
        self.client
            .delete(&format!(
                "/chat/api/channels/{}/messages/{}",
                channel_id, message_id
            ))
            .await
    }
}
