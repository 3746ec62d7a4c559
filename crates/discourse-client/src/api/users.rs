//! Users API.

use crate::client::DiscourseClient;
use crate::error::Result;
use crate::types::UserInfo;

/// Users API client.
pub struct UsersApi {
    client: DiscourseClient,
}

impl UsersApi {
    pub(crate) fn new(client: DiscourseClient) -> Self {
        Self { client }
    }

    /// Get a user's public profile.
    pub async fn get(&self, username: &str) -> Result<UserInfo> {
        self.client.get(&format!("/u/{}", username)).await
    }
}
