//! Site API.

use crate::client::DiscourseClient;
use crate::error::Result;
use crate::types::SiteInfo;

/// Site API client.
pub struct SiteApi {
    client: DiscourseClient,
}

impl SiteApi {
    pub(crate) fn new(client: DiscourseClient) -> Self {
        Self { client }
    }

    /// Get site info: categories, archetypes, settings exposed to clients.
    pub async fn get(&self) -> Result<SiteInfo> {
        self.client.get("/site").await
    }
}
