//! Topics API.

use serde_json::{Value, json};

use crate::client::DiscourseClient;
use crate::error::Result;
use crate::types::{
    InviteRequest, InviteResult, LatestOrder, LatestTopics, PostAnchor, Topic, TopicListStatus,
    TopicPosts, TopicStatus, TopicStatusRequest, TopicStatusUpdate, UpdateTopicRequest,
    UpdateTopicResponse,
};

/// Query for the latest topic list.
#[derive(Debug, Clone, Default)]
pub struct LatestQuery {
    /// A `more_topics_url` from a previous page. When set, the other
    /// fields are ignored.
    pub custom_url: Option<String>,
    pub order: Option<LatestOrder>,
    pub ascending: Option<bool>,
    pub status: Option<TopicListStatus>,
}

impl LatestQuery {
    /// Search parameters, in the order the server documents them.
    fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(order) = self.order {
            params.push(("order".to_string(), order.as_str().to_string()));
        }
        if let Some(ascending) = self.ascending {
            params.push(("ascending".to_string(), ascending.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status".to_string(), status.as_str().to_string()));
        }
        params
    }
}

/// Topics API client.
pub struct TopicsApi {
    client: DiscourseClient,
}

impl TopicsApi {
    pub(crate) fn new(client: DiscourseClient) -> Self {
        Self { client }
    }

    /// Get the latest topics.
    pub async fn latest(&self, query: LatestQuery) -> Result<LatestTopics> {
        match &query.custom_url {
            Some(url) => self.client.get(url).await,
            None => self.client.get_with_query("/latest", query.params()).await,
        }
    }

    /// Get a topic with its first page of posts.
    pub async fn get(&self, id: u64) -> Result<Topic> {
        self.client.get(&format!("/t/{}", id)).await
    }

    /// Get a topic with posts loaded around a given post.
    pub async fn get_around(&self, id: u64, anchor: PostAnchor) -> Result<Topic> {
        self.client.get(&format!("/t/-/{}/{}", id, anchor)).await
    }

    /// Get specific posts of a topic.
    pub async fn posts(&self, id: u64, post_ids: &[u64]) -> Result<TopicPosts> {
        let query = post_ids
            .iter()
            .map(|pid| ("post_ids[]".to_string(), pid.to_string()))
            .collect();
        self.client
            .get_with_query(&format!("/t/{}/posts", id), query)
            .await
    }

    /// Delete a topic.
    pub async fn remove(&self, id: u64) -> Result<Value> {
        self.client.delete(&format!("/t/{}", id)).await
    }

    /// Change a topic's title or category.
    pub async fn update(&self, id: u64, request: UpdateTopicRequest) -> Result<UpdateTopicResponse> {
        self.client
            .put(&format!("/t/-/{}", id), &json!({ "topic": request }))
            .await
    }

    /// Invite a user (by username or email) to a topic.
    pub async fn invite(&self, id: u64, request: InviteRequest) -> Result<InviteResult> {
        self.client
            .post(&format!("/t/{}/invite", id), &request)
            .await
    }

    /// Toggle a status flag on a topic.
    pub async fn update_status(
        &self,
        id: u64,
        status: TopicStatus,
        enabled: bool,
        until: Option<&str>,
    ) -> Result<TopicStatusUpdate> {
        let request = TopicStatusRequest {
            status,
            enabled,
            until: until.map(str::to_string),
        };
        self.client
            .put(&format!("/t/{}/status", id), &request)
            .await
    }

    /// Close a topic, optionally until a given time.
    pub async fn close(&self, id: u64, until: Option<&str>) -> Result<TopicStatusUpdate> {
        self.update_status(id, TopicStatus::Closed, true, until).await
    }

    /// Reopen a closed topic.
    pub async fn open(&self, id: u64) -> Result<TopicStatusUpdate> {
        self.update_status(id, TopicStatus::Closed, false, None).await
    }

    /// Archive a topic.
    pub async fn archive(&self, id: u64, until: Option<&str>) -> Result<TopicStatusUpdate> {
        self.update_status(id, TopicStatus::Archived, true, until).await
    }

    /// Unarchive a topic.
    pub async fn unarchive(&self, id: u64) -> Result<TopicStatusUpdate> {
        self.update_status(id, TopicStatus::Archived, false, None).await
    }

    /// Pin a topic in its category, or site-wide when `globally`.
    pub async fn pin(&self, id: u64, globally: bool, until: &str) -> Result<TopicStatusUpdate> {
        self.update_status(id, pin_status(globally), true, Some(until))
            .await
    }

    /// Unpin a topic.
    pub async fn unpin(&self, id: u64, globally: bool) -> Result<TopicStatusUpdate> {
        self.update_status(id, pin_status(globally), false, None)
            .await
    }

    /// Hide a topic from lists.
    pub async fn unlist(&self, id: u64, until: Option<&str>) -> Result<TopicStatusUpdate> {
        self.update_status(id, TopicStatus::Visible, false, until).await
    }

    /// Make an unlisted topic visible again.
    pub async fn list(&self, id: u64) -> Result<TopicStatusUpdate> {
        self.update_status(id, TopicStatus::Visible, true, None).await
    }
}

fn pin_status(globally: bool) -> TopicStatus {
    if globally {
        TopicStatus::PinnedGlobally
    } else {
        TopicStatus::Pinned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_params_use_own_keys() {
        let query = LatestQuery {
            order: Some(LatestOrder::Views),
            ascending: Some(true),
            status: Some(TopicListStatus::Closed),
            ..Default::default()
        };
        assert_eq!(
            query.params(),
            vec![
                ("order".to_string(), "views".to_string()),
                ("ascending".to_string(), "true".to_string()),
                ("status".to_string(), "closed".to_string()),
            ]
        );
        assert!(LatestQuery::default().params().is_empty());
    }
}
