//! Request and response types for the Discourse API.
//!
//! Response structs carry the commonly used fields; everything else the
//! server sends lands in `extra` so schema drift never breaks decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Open-ended remainder of a response object.
pub type Extra = HashMap<String, Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// Minimal user reference embedded in lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_template: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Full user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_template: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_posted_at: Option<String>,
    #[serde(default)]
    pub last_seen_at: Option<String>,
    #[serde(default)]
    pub trust_level: u8,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub moderator: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub badge_count: u64,
    #[serde(default)]
    pub post_count: u64,
    #[serde(default)]
    pub time_read: u64,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `GET /u/{username}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub user: User,
    #[serde(default)]
    pub user_badges: Vec<Value>,
    #[serde(default)]
    pub badges: Vec<Value>,
    #[serde(default)]
    pub users: Vec<BasicUser>,
    #[serde(default)]
    pub topics: Vec<BasicTopic>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ─────────────────────────────────────────────────────────────────────────────
// Posts
// ─────────────────────────────────────────────────────────────────────────────

/// A single post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar_template: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Markdown source; only present on some endpoints.
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub cooked: String,
    #[serde(default)]
    pub post_number: u64,
    #[serde(default)]
    pub post_type: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub reply_to_post_number: Option<u64>,
    #[serde(default)]
    pub topic_id: u64,
    #[serde(default)]
    pub topic_slug: Option<String>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub yours: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub edit_reason: Option<String>,
    #[serde(default)]
    pub actions_summary: Vec<PostActionSummary>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Post {
    /// Number of likes, as reported in the action summary.
    pub fn like_count(&self) -> u64 {
        self.actions_summary
            .iter()
            .find(|a| a.id == PostActionType::Like.id())
            .map(|a| a.count)
            .unwrap_or(0)
    }
}

/// Per-action counters attached to a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostActionSummary {
    pub id: u64,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub can_act: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestPosts {
    #[serde(default)]
    pub latest_posts: Vec<Post>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `GET /posts/{id}/cooked`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookedPost {
    pub cooked: String,
}

/// Post action types understood by `/post_actions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostActionType {
    Bookmark,
    Like,
    OffTopic,
    Inappropriate,
    Vote,
    NotifyUser,
    NotifyModerators,
    Spam,
    /// Any other numeric id.
    Other(u64),
}

impl PostActionType {
    /// Numeric `post_action_type_id`.
    pub fn id(self) -> u64 {
        match self {
            Self::Bookmark => 1,
            Self::Like => 2,
            Self::OffTopic => 3,
            Self::Inappropriate => 4,
            Self::Vote => 5,
            Self::NotifyUser => 6,
            Self::NotifyModerators => 7,
            Self::Spam => 8,
            Self::Other(id) => id,
        }
    }
}

/// Body of `POST /posts`: a topic, a reply or a private message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub raw: String,
    /// Required when creating a topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Required when replying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<u64>,
    /// Comma-separated usernames, for private messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_recipients: Option<String>,
    /// `private_message` for PMs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_post_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl CreatePostRequest {
    /// A new topic.
    pub fn topic(title: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            raw: raw.into(),
            ..Default::default()
        }
    }

    /// A reply in an existing topic.
    pub fn reply(topic_id: u64, raw: impl Into<String>) -> Self {
        Self {
            topic_id: Some(topic_id),
            raw: raw.into(),
            ..Default::default()
        }
    }

    /// A private message to the given recipients.
    pub fn private_message(
        title: impl Into<String>,
        raw: impl Into<String>,
        recipients: &[&str],
    ) -> Self {
        Self {
            title: Some(title.into()),
            raw: raw.into(),
            target_recipients: Some(recipients.join(",")),
            archetype: Some("private_message".to_string()),
            ..Default::default()
        }
    }
}

/// Body of `PUT /posts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_reason: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Topics
// ─────────────────────────────────────────────────────────────────────────────

/// Minimal topic reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicTopic {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fancy_title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub posts_count: u64,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A poster entry in a topic list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicPoster {
    #[serde(default)]
    pub extras: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub primary_group_id: Option<u64>,
}

/// Topic as it appears in topic lists and suggestions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestedTopic {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fancy_title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub posts_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub highest_post_number: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_posted_at: Option<String>,
    #[serde(default)]
    pub bumped_at: Option<String>,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub tags: Vec<Value>,
    #[serde(default)]
    pub posters: Vec<TopicPoster>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Posts loaded with a topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostStream {
    #[serde(default)]
    pub posts: Vec<Post>,
    /// Ids of every post in the topic, loaded or not.
    #[serde(default)]
    pub stream: Vec<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A full topic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topic {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fancy_title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub posts_count: u64,
    #[serde(default)]
    pub post_stream: PostStream,
    #[serde(default)]
    pub suggested_topics: Vec<SuggestedTopic>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub pinned_globally: bool,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub highest_post_number: u64,
    #[serde(default)]
    pub current_post_number: Option<u64>,
    #[serde(default)]
    pub tags: Vec<Value>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `GET /t/{id}/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicPosts {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub post_stream: PostStream,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Paginated topic list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicList {
    /// Path of the next page, usable as `LatestQuery::custom_url`.
    #[serde(default)]
    pub more_topics_url: Option<String>,
    #[serde(default)]
    pub can_create_topic: bool,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default)]
    pub topics: Vec<SuggestedTopic>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `GET /latest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestTopics {
    #[serde(default)]
    pub topic_list: TopicList,
    #[serde(default)]
    pub users: Vec<BasicUser>,
    #[serde(default)]
    pub primary_groups: Vec<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Sort order for `/latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatestOrder {
    Default,
    Created,
    Activity,
    Views,
    Posts,
    Category,
    Likes,
    OpLikes,
    Posters,
}

impl LatestOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Created => "created",
            Self::Activity => "activity",
            Self::Views => "views",
            Self::Posts => "posts",
            Self::Category => "category",
            Self::Likes => "likes",
            Self::OpLikes => "op_likes",
            Self::Posters => "posters",
        }
    }
}

/// Status filter for `/latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicListStatus {
    Deleted,
    Closed,
    Listed,
    Open,
    Public,
    Unlisted,
    Archived,
}

impl TopicListStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Closed => "closed",
            Self::Listed => "listed",
            Self::Open => "open",
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Archived => "archived",
        }
    }
}

/// Where to position a topic fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAnchor {
    /// Around a given post number.
    Number(u64),
    /// Around the last post.
    Last,
}

impl std::fmt::Display for PostAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Last => f.write_str("last"),
        }
    }
}

/// Status flags toggled through `PUT /t/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    Closed,
    Pinned,
    PinnedGlobally,
    Archived,
    Visible,
}

/// Body of `PUT /t/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicStatusRequest {
    pub status: TopicStatus,
    pub enabled: bool,
    /// Expiry for the status, e.g. `2030-01-01`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

/// Response of `PUT /t/{id}/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicStatusUpdate {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub topic_status_update: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Fields changed by `PUT /t/-/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTopicRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
}

/// Response of `PUT /t/-/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTopicResponse {
    #[serde(default)]
    pub basic_topic: Option<BasicTopic>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Body of `POST /t/{id}/invite`: a username or an email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InviteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Response of `POST /t/{id}/invite`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InviteResult {
    #[serde(default)]
    pub user: Option<BasicUser>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ─────────────────────────────────────────────────────────────────────────────
// Uploads
// ─────────────────────────────────────────────────────────────────────────────

/// Purpose of an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadType {
    Avatar,
    ProfileBackground,
    CardBackground,
    CustomEmoji,
    #[default]
    Composer,
}

impl UploadType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::ProfileBackground => "profile_background",
            Self::CardBackground => "card_background",
            Self::CustomEmoji => "custom_emoji",
            Self::Composer => "composer",
        }
    }
}

/// A stored upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Upload {
    pub id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub original_filename: String,
    #[serde(default)]
    pub filesize: u64,
    #[serde(default)]
    pub width: Option<u64>,
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub short_path: Option<String>,
    #[serde(default)]
    pub human_filesize: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ─────────────────────────────────────────────────────────────────────────────
// Notifications
// ─────────────────────────────────────────────────────────────────────────────

/// A single notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub notification_type: Option<u64>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub high_priority: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub post_number: Option<u64>,
    #[serde(default)]
    pub topic_id: Option<u64>,
    #[serde(default)]
    pub fancy_title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `GET /notifications`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notifications {
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub total_rows_notifications: Option<u64>,
    #[serde(default)]
    pub seen_notification_id: Option<u64>,
    /// Path of the next page.
    #[serde(default)]
    pub load_more_notifications: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `PUT /notifications/mark-read`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkReadResponse {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ─────────────────────────────────────────────────────────────────────────────
// Site
// ─────────────────────────────────────────────────────────────────────────────

/// A category as listed in site info.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parent_category_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Response of `GET /site`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteInfo {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub default_archetype: Option<String>,
    #[serde(default)]
    pub can_create_tag: bool,
    #[serde(default)]
    pub can_tag_topics: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// A chat message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub cooked: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub thread_id: Option<u64>,
    #[serde(default)]
    pub chat_channel_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_keeps_unknown_fields() {
        let post: Post = serde_json::from_value(json!({
            "id": 12,
            "username": "alice",
            "cooked": "<p>hi</p>",
            "topic_id": 4,
            "actions_summary": [{"id": 2, "count": 3}],
            "reviewable_score_count": 0
        }))
        .unwrap();

        assert_eq!(post.id, 12);
        assert_eq!(post.like_count(), 3);
        assert_eq!(post.extra["reviewable_score_count"], 0);
    }

    #[test]
    fn test_create_post_skips_unset_fields() {
        let body = serde_json::to_value(CreatePostRequest::reply(7, "thanks")).unwrap();
        assert_eq!(body, json!({"raw": "thanks", "topic_id": 7}));

        let pm = CreatePostRequest::private_message("hi", "hello", &["bob", "carol"]);
        let body = serde_json::to_value(pm).unwrap();
        assert_eq!(body["target_recipients"], "bob,carol");
        assert_eq!(body["archetype"], "private_message");
    }

    #[test]
    fn test_topic_status_serializes_snake_case() {
        let body = serde_json::to_value(TopicStatusRequest {
            status: TopicStatus::PinnedGlobally,
            enabled: true,
            until: None,
        })
        .unwrap();
        assert_eq!(body, json!({"status": "pinned_globally", "enabled": true}));
    }

    #[test]
    fn test_post_anchor_display() {
        assert_eq!(PostAnchor::Number(15).to_string(), "15");
        assert_eq!(PostAnchor::Last.to_string(), "last");
    }
}
