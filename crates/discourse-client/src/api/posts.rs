//! Posts API.

use reqwest::Method;
use serde_json::{Value, json};

use crate::client::DiscourseClient;
use crate::error::Result;
use crate::request::RequestOptions;
use crate::types::{
    CookedPost, CreatePostRequest, LatestPosts, Post, PostActionType, UpdatePostRequest,
};

/// Posts API client.
pub struct PostsApi {
    client: DiscourseClient,
}

impl PostsApi {
    pub(crate) fn new(client: DiscourseClient) -> Self {
        Self { client }
    }

    /// List the latest posts across all topics.
    pub async fn list(&self) -> Result<LatestPosts> {
        self.client.get("/posts").await
    }

    /// Get a post by ID.
    pub async fn get(&self, id: u64) -> Result<Post> {
        self.client.get(&format!("/posts/{}", id)).await
    }

    /// Create a topic, a reply or a private message.
    pub async fn create(&self, request: CreatePostRequest) -> Result<Post> {
        self.client.post("/posts", &request).await
    }

    /// Replace the content of a post.
    pub async fn update(&self, id: u64, request: UpdatePostRequest) -> Result<Value> {
        self.client.put(&format!("/posts/{}", id), &request).await
    }

    /// Delete a post. `force_destroy` skips the soft-delete.
    pub async fn delete(&self, id: u64, force_destroy: bool) -> Result<Value> {
        self.client
            .delete_with(
                &format!("/posts/{}", id),
                &json!({ "force_destroy": force_destroy }),
            )
            .await
    }

    /// Get the replies to a post.
    pub async fn replies(&self, id: u64) -> Result<Vec<Post>> {
        self.client.get(&format!("/posts/{}/replies", id)).await
    }

    /// Get the markdown source of a post.
    ///
    /// Markdown that happens to parse as JSON (`42`, `[1, 2]`) is returned
    /// as its source text; a blank body yields an empty string.
    pub async fn raw(&self, id: u64) -> Result<String> {
        let value = self
            .client
            .request_value(
                &format!("/posts/{}/raw", id),
                Method::GET,
                None,
                RequestOptions::default(),
            )
            .await?;
        Ok(match value {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Get the rendered HTML of a post.
    pub async fn cooked(&self, id: u64) -> Result<String> {
        let response: CookedPost = self.client.get(&format!("/posts/{}/cooked", id)).await?;
        Ok(response.cooked)
    }

    /// Like, flag or bookmark a post.
    pub async fn perform_action(
        &self,
        id: u64,
        action: PostActionType,
        flag_topic: Option<bool>,
    ) -> Result<Post> {
        let mut body = json!({
            "id": id,
            "post_action_type_id": action.id(),
        });
        if let Some(flag_topic) = flag_topic {
            body["flag_topic"] = json!(flag_topic);
        }
        self.client.post("/post_actions", &body).await
    }

    /// Like a post.
    pub async fn like(&self, id: u64) -> Result<Post> {
        self.perform_action(id, PostActionType::Like, None).await
    }

    /// Undo an action on a post.
    pub async fn delete_action(&self, id: u64, action: PostActionType) -> Result<Post> {
        self.client
            .delete(&format!(
                "/post_actions/{}?post_action_type_id={}",
                id,
                action.id()
            ))
            .await
    }

    /// Remove a like.
    pub async fn unlike(&self, id: u64) -> Result<Post> {
        self.delete_action(id, PostActionType::Like).await
    }

    /// Lock a post against edits.
    pub async fn lock(&self, id: u64) -> Result<Value> {
        self.set_locked(id, true).await
    }

    /// Unlock a post.
    pub async fn unlock(&self, id: u64) -> Result<Value> {
        self.set_locked(id, false).await
    }

    async fn set_locked(&self, id: u64, locked: bool) -> Result<Value> {
        self.client
            .put(&format!("/posts/{}/locked", id), &json!({ "locked": locked }))
            .await
    }
}
