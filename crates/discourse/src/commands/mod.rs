//! CLI command handlers.

pub mod relay;
pub mod site;
pub mod user_api_key;

use anyhow::{Context as _, Result};
use clap::Args;
use discourse_client::DiscourseClient;

/// Credential flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct Credentials {
    /// Admin API key
    #[arg(long, global = true, env = "DISCOURSE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Username the admin API key acts as
    #[arg(long, global = true, env = "DISCOURSE_API_USERNAME")]
    pub api_username: Option<String>,

    /// User API key
    #[arg(long, global = true, env = "DISCOURSE_USER_API_KEY", hide_env_values = true)]
    pub user_api_key: Option<String>,

    /// Client id the user API key was issued to
    #[arg(long, global = true, env = "DISCOURSE_USER_API_CLIENT_ID")]
    pub user_api_client_id: Option<String>,
}

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Site URL.
    pub url: Option<String>,
    /// Credentials from flags or environment.
    pub credentials: Credentials,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Site URL, or an error telling the user how to set it.
    pub fn site_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Discourse URL not set (use --url or DISCOURSE_URL)"))
    }

    /// Build an API client from the site URL and credentials.
    pub fn client(&self) -> Result<DiscourseClient> {
        let mut builder = DiscourseClient::builder().base_url(self.site_url()?);

        let creds = &self.credentials;
        if let Some(key) = &creds.api_key {
            builder = builder.api_key(key);
        }
        if let Some(username) = &creds.api_username {
            builder = builder.api_username(username);
        }
        if let Some(key) = &creds.user_api_key {
            builder = builder.user_api_key(key);
        }
        if let Some(client_id) = &creds.user_api_client_id {
            builder = builder.user_api_client_id(client_id);
        }

        builder.build().context("Failed to configure Discourse client")
    }
}
