//! HTTP client for the Discourse forum REST API.
//!
//! Every endpoint call goes through one request composer that resolves the
//! endpoint (appending `.json` to paths), attaches the configured
//! credentials, and turns non-success responses into [`ApiError`]. Failures
//! that never produced a response come back as [`Error::Transport`] with the
//! transport's own error inside.
//!
//! # Example
//!
//! ```no_run
//! use discourse_client::{CreatePostRequest, DiscourseClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = DiscourseClient::builder()
//!     .base_url("https://forum.example.com")
//!     .api_key("secret")
//!     .api_username("system")
//!     .build()?;
//!
//! let topic = client.topics().get(42).await?;
//! println!("{}", topic.title);
//!
//! let post = client
//!     .posts()
//!     .create(CreatePostRequest::reply(topic.id, "Thanks!"))
//!     .await?;
//! println!("Created post {}", post.id);
//! # Ok(())
//! # }
//! ```
//!
//! # User API keys
//!
//! ```no_run
//! use discourse_client::{DiscourseClient, UserApiKeyParams};
//!
//! # fn example() -> discourse_client::Result<()> {
//! let client = DiscourseClient::new("https://forum.example.com")?;
//! let link = client.generate_user_api_key(UserApiKeyParams::new().with_scopes("read,write"))?;
//! println!("Visit {}", link.url);
//!
//! // ...later, with the payload the site redirected back with:
//! # let payload = "";
//! let private_key = link.private_key.as_deref().unwrap_or_default();
//! let decrypted = client.decrypt_user_api_key(private_key, payload)?;
//! assert!(decrypted.nonce_matches(&link.nonce));
//! client.auth_mut().set_user_api_key(decrypted.key)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod form;
pub mod request;
pub mod transport;
pub mod types;
pub mod user_api_key;

pub use auth::{AuthConfig, AuthMode};
pub use client::{ClientBuilder, DiscourseClient};
pub use error::{ApiError, BoxError, Error, Result};
pub use form::MultipartForm;
pub use request::{Payload, RequestOptions};
pub use transport::{ReqwestTransport, Transport, TransportBody, TransportRequest, TransportResponse};
pub use types::*;
pub use user_api_key::{
    ApiVersion, DecryptedUserApiKey, UserApiKeyLink, UserApiKeyParams, UserApiKeyRequest,
    decrypt_user_api_key, generate_keypair, generate_nonce,
};

pub use api::{ChatMessageOptions, LatestQuery, UploadOptions};

// Re-exported so callers can name methods without depending on reqwest.
pub use reqwest::Method;
