//! User API key handshake.
//!
//! The application generates an RSA keypair and a nonce, sends the user to
//! `/user-api-key/new` with the public half, and receives back a base64
//! payload encrypted with that public key. Decrypting it yields the key and
//! the nonce, which the caller must compare with the one it generated.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use reqwest::Method;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::USER_API_KEY_HEADER;
use crate::client::DiscourseClient;
use crate::error::{Error, Result};
use crate::request::RequestOptions;
use crate::types::Extra;

/// Application name and client id used when none is given.
pub const DEFAULT_APPLICATION_NAME: &str = "RustDiscourseClient";
/// Scopes requested when none are given.
pub const DEFAULT_SCOPES: &str = "read";
/// Size of generated keys.
pub const KEY_BITS: usize = 2048;
/// Random bytes in a nonce.
pub const NONCE_BYTES: usize = 16;

/// Caller-supplied handshake parameters. Unset or empty fields fall back to
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct UserApiKeyParams {
    pub application_name: Option<String>,
    /// Comma-separated scopes, e.g. `read,write`.
    pub scopes: Option<String>,
    pub client_id: Option<String>,
    /// PKCS#1 PEM public key. A fresh keypair is generated when unset.
    pub public_key: Option<String>,
    pub auth_redirect: Option<String>,
    pub push_url: Option<String>,
}

impl UserApiKeyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn with_scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = Some(scopes.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    pub fn with_auth_redirect(mut self, url: impl Into<String>) -> Self {
        self.auth_redirect = Some(url.into());
        self
    }

    pub fn with_push_url(mut self, url: impl Into<String>) -> Self {
        self.push_url = Some(url.into());
        self
    }
}

/// Fully resolved authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserApiKeyRequest {
    pub application_name: String,
    pub scopes: String,
    pub client_id: String,
    pub public_key: String,
    pub auth_redirect: Option<String>,
    pub push_url: Option<String>,
    /// Correlation token; keep it to check the decrypted payload.
    pub nonce: String,
}

impl UserApiKeyRequest {
    /// The `/user-api-key/new` URL the user must visit.
    pub fn authorization_url(&self, base_url: &str) -> Result<Url> {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("application_name", &self.application_name)
            .append_pair("scopes", &self.scopes)
            .append_pair("client_id", &self.client_id)
            .append_pair("public_key", &self.public_key);
        if let Some(auth_redirect) = &self.auth_redirect {
            query.append_pair("auth_redirect", auth_redirect);
        }
        if let Some(push_url) = &self.push_url {
            query.append_pair("push_url", push_url);
        }
        query.append_pair("nonce", &self.nonce);

        Ok(Url::parse(&format!(
            "{}/user-api-key/new?{}",
            base_url.trim_end_matches('/'),
            query.finish()
        ))?)
    }
}

/// Result of [`DiscourseClient::generate_user_api_key`].
#[derive(Clone)]
pub struct UserApiKeyLink {
    /// Authorization URL.
    pub url: String,
    /// Nonce embedded in the URL.
    pub nonce: String,
    /// Generated public key; `None` when the caller supplied one.
    pub public_key: Option<String>,
    /// Generated private key; `None` when the caller supplied a public key.
    pub private_key: Option<String>,
}

impl fmt::Debug for UserApiKeyLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserApiKeyLink")
            .field("url", &self.url)
            .field("nonce", &self.nonce)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// API version reported in the decrypted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiVersion {
    Number(u64),
    Text(String),
}

/// Decrypted handshake payload.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptedUserApiKey {
    /// The user API key.
    pub key: String,
    /// Nonce from the authorization request.
    pub nonce: String,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub api: Option<ApiVersion>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl DecryptedUserApiKey {
    /// Whether the payload answers the request that produced `nonce`.
    pub fn nonce_matches(&self, nonce: &str) -> bool {
        self.nonce == nonce
    }
}

impl fmt::Debug for DecryptedUserApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedUserApiKey")
            .field("key", &"[REDACTED]")
            .field("nonce", &self.nonce)
            .field("push", &self.push)
            .field("api", &self.api)
            .finish()
    }
}

/// Generate a fresh nonce: 16 random bytes, lowercase hex.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate an RSA keypair, returned as `(public_pem, private_pem)` in
/// PKCS#1 format.
pub fn generate_keypair() -> Result<(String, String)> {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
        .map_err(|e| Error::Key(format!("Failed to generate RSA key: {}", e)))?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_pem = private_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| Error::Key(format!("Failed to encode private key: {}", e)))?;
    let public_pem = public_key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| Error::Key(format!("Failed to encode public key: {}", e)))?;

    Ok((public_pem, private_pem.to_string()))
}

/// Resolve parameters and build the authorization link.
pub fn build_user_api_key_link(base_url: &str, params: UserApiKeyParams) -> Result<UserApiKeyLink> {
    let nonce = generate_nonce();

    let (public_key, generated) = match non_empty(params.public_key) {
        Some(public_key) => (public_key, None),
        None => {
            debug!(bits = KEY_BITS, "Generating RSA keypair for user API key");
            let (public_pem, private_pem) = generate_keypair()?;
            (public_pem.clone(), Some((public_pem, private_pem)))
        }
    };

    let request = UserApiKeyRequest {
        application_name: non_empty(params.application_name)
            .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string()),
        scopes: non_empty(params.scopes).unwrap_or_else(|| DEFAULT_SCOPES.to_string()),
        client_id: non_empty(params.client_id)
            .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string()),
        public_key,
        auth_redirect: non_empty(params.auth_redirect),
        push_url: non_empty(params.push_url),
        nonce,
    };
    let url = request.authorization_url(base_url)?;

    let (public_key, private_key) = match generated {
        Some((public_pem, private_pem)) => (Some(public_pem), Some(private_pem)),
        None => (None, None),
    };

    Ok(UserApiKeyLink {
        url: url.into(),
        nonce: request.nonce,
        public_key,
        private_key,
    })
}

/// Decrypt the base64 payload returned by the authorization redirect.
///
/// The nonce is not checked; use [`DecryptedUserApiKey::nonce_matches`].
pub fn decrypt_user_api_key(private_key: &str, encrypted: &str) -> Result<DecryptedUserApiKey> {
    let key = parse_private_key(private_key)?;

    let cleaned: String = encrypted.chars().filter(|c| !c.is_whitespace()).collect();
    let ciphertext = STANDARD.decode(cleaned)?;

    let plaintext = key
        .decrypt(Pkcs1v15Encrypt, &ciphertext)
        .map_err(|e| Error::Decryption(e.to_string()))?;

    Ok(serde_json::from_slice(&plaintext)?)
}

/// Parse a PEM private key in PKCS#1 or PKCS#8 form.
fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    let pem = pem.trim();
    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| Error::Key(format!("Invalid private key: {}", e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl DiscourseClient {
    /// Build a user API key authorization link for this site.
    ///
    /// Generating a keypair is CPU heavy; supply `public_key` to skip it.
    pub fn generate_user_api_key(&self, params: UserApiKeyParams) -> Result<UserApiKeyLink> {
        build_user_api_key_link(self.base_url(), params)
    }

    /// Async form of [`generate_user_api_key`](Self::generate_user_api_key).
    ///
    /// Runs on the blocking thread pool so keypair generation does not stall
    /// the runtime.
    pub async fn generate_user_api_key_async(
        &self,
        params: UserApiKeyParams,
    ) -> Result<UserApiKeyLink> {
        let base_url = self.base_url().to_string();
        tokio::task::spawn_blocking(move || build_user_api_key_link(&base_url, params))
            .await
            .map_err(|e| Error::Key(format!("Key generation task failed: {}", e)))?
    }

    /// Decrypt a handshake payload.
    pub fn decrypt_user_api_key(
        &self,
        private_key: &str,
        encrypted: &str,
    ) -> Result<DecryptedUserApiKey> {
        decrypt_user_api_key(private_key, encrypted)
    }

    /// Revoke a user API key, or the configured one when `key` is `None`.
    ///
    /// Only the `User-Api-Key` header is sent; other credentials are not
    /// merged in.
    pub async fn revoke_user_api_key(&self, key: Option<&str>) -> Result<Value> {
        let key = match key.filter(|k| !k.is_empty()) {
            Some(key) => key.to_string(),
            None => self
                .auth()
                .user_api_key()
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .ok_or_else(|| Error::Config("No user api key to revoke".to_string()))?,
        };

        let options = RequestOptions::new()
            .with_header(USER_API_KEY_HEADER, key)
            .with_override_headers(true);
        self.request_value("/user-api-key/revoke", Method::POST, None, options)
            .await
    }
}
