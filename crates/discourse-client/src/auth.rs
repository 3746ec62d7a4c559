//! Credential storage for the two Discourse authentication modes.
//!
//! Admin-key auth (`Api-Key` + `Api-Username`) and user-key auth
//! (`User-Api-Key` + `User-Api-Client-Id`) are mutually exclusive. Every
//! mutator goes through [`AuthConfig::update`], which validates the
//! candidate state and leaves the stored one untouched on conflict.

use std::fmt;

use crate::error::{Error, Result};

/// Header carrying the admin API key.
pub const API_KEY_HEADER: &str = "Api-Key";
/// Header carrying the username the admin key acts as.
pub const API_USERNAME_HEADER: &str = "Api-Username";
/// Header carrying a delegated user API key.
pub const USER_API_KEY_HEADER: &str = "User-Api-Key";
/// Header carrying the client id the user API key was issued to.
pub const USER_API_CLIENT_ID_HEADER: &str = "User-Api-Client-Id";

/// Which credential group is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No credentials; anonymous requests.
    Anonymous,
    /// `api_key` and/or `api_username`.
    AdminKey,
    /// `user_api_key` and/or `user_api_client_id`.
    UserKey,
}

/// Credentials attached to every request.
///
/// Empty strings count as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    api_username: Option<String>,
    api_key: Option<String>,
    user_api_key: Option<String>,
    user_api_client_id: Option<String>,
}

impl AuthConfig {
    /// Create an empty (anonymous) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admin-key credentials.
    pub fn admin(api_key: impl Into<String>, api_username: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            api_username: Some(api_username.into()),
            ..Self::default()
        }
    }

    /// User-key credentials.
    pub fn user(user_api_key: impl Into<String>, user_api_client_id: Option<String>) -> Self {
        Self {
            user_api_key: Some(user_api_key.into()),
            user_api_client_id,
            ..Self::default()
        }
    }

    pub fn api_username(&self) -> Option<&str> {
        self.api_username.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn user_api_key(&self) -> Option<&str> {
        self.user_api_key.as_deref()
    }

    pub fn user_api_client_id(&self) -> Option<&str> {
        self.user_api_client_id.as_deref()
    }

    /// Set the username the admin key acts as.
    pub fn set_api_username(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(|auth| auth.api_username = Some(value))
    }

    /// Set the admin API key.
    pub fn set_api_key(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(|auth| auth.api_key = Some(value))
    }

    /// Set the delegated user API key.
    pub fn set_user_api_key(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(|auth| auth.user_api_key = Some(value))
    }

    /// Set the client id bound to the user API key.
    pub fn set_user_api_client_id(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(|auth| auth.user_api_client_id = Some(value))
    }

    /// Remove both admin-key fields.
    pub fn clear_admin_key(&mut self) {
        self.api_key = None;
        self.api_username = None;
    }

    /// Remove both user-key fields.
    pub fn clear_user_key(&mut self) {
        self.user_api_key = None;
        self.user_api_client_id = None;
    }

    /// Apply a mutation, keeping it only if the result is still valid.
    fn update(&mut self, mutate: impl FnOnce(&mut Self)) -> Result<()> {
        let mut candidate = self.clone();
        mutate(&mut candidate);
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Check that at most one credential group is populated.
    pub fn validate(&self) -> Result<()> {
        if self.has_admin_key() && self.has_user_key() {
            return Err(Error::ConflictingAuth);
        }
        Ok(())
    }

    /// Whether any admin-key field is set.
    pub fn has_admin_key(&self) -> bool {
        is_set(&self.api_key) || is_set(&self.api_username)
    }

    /// Whether any user-key field is set.
    pub fn has_user_key(&self) -> bool {
        is_set(&self.user_api_key) || is_set(&self.user_api_client_id)
    }

    /// The populated credential group.
    pub fn mode(&self) -> AuthMode {
        if self.has_admin_key() {
            AuthMode::AdminKey
        } else if self.has_user_key() {
            AuthMode::UserKey
        } else {
            AuthMode::Anonymous
        }
    }

    /// Default headers derived from the populated fields.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        [
            (API_KEY_HEADER, &self.api_key),
            (API_USERNAME_HEADER, &self.api_username),
            (USER_API_KEY_HEADER, &self.user_api_key),
            (USER_API_CLIENT_ID_HEADER, &self.user_api_client_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (name, v.to_string()))
        })
        .collect()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_username", &self.api_username)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "user_api_key",
                &self.user_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user_api_client_id", &self.user_api_client_id)
            .finish()
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_fields_compose() {
        let mut auth = AuthConfig::new();
        auth.set_api_key("key").unwrap();
        auth.set_api_username("system").unwrap();
        assert_eq!(auth.mode(), AuthMode::AdminKey);
        assert_eq!(auth.api_key(), Some("key"));
        assert_eq!(auth.api_username(), Some("system"));
    }

    #[test]
    fn test_user_fields_compose() {
        let mut auth = AuthConfig::new();
        auth.set_user_api_key("ukey").unwrap();
        auth.set_user_api_client_id("client").unwrap();
        assert_eq!(auth.mode(), AuthMode::UserKey);
    }

    #[test]
    fn test_user_key_after_admin_key_fails() {
        let mut auth = AuthConfig::new();
        auth.set_api_key("key").unwrap();
        let err = auth.set_user_api_key("ukey").unwrap_err();
        assert!(matches!(err, Error::ConflictingAuth));
    }

    #[test]
    fn test_admin_key_after_user_key_fails() {
        let mut auth = AuthConfig::new();
        auth.set_user_api_key("ukey").unwrap();
        assert!(matches!(
            auth.set_api_key("key"),
            Err(Error::ConflictingAuth)
        ));
        assert!(matches!(
            auth.set_api_username("system"),
            Err(Error::ConflictingAuth)
        ));
    }

    #[test]
    fn test_every_cross_group_pair_fails() {
        type Setter = fn(&mut AuthConfig, &str) -> Result<()>;
        let admin: [Setter; 2] = [
            |a, v| a.set_api_key(v),
            |a, v| a.set_api_username(v),
        ];
        let user: [Setter; 2] = [
            |a, v| a.set_user_api_key(v),
            |a, v| a.set_user_api_client_id(v),
        ];

        for first in admin {
            for second in user {
                let mut auth = AuthConfig::new();
                first(&mut auth, "x").unwrap();
                assert!(second(&mut auth, "y").is_err());

                let mut auth = AuthConfig::new();
                second(&mut auth, "y").unwrap();
                assert!(first(&mut auth, "x").is_err());
            }
        }
    }

    #[test]
    fn test_failed_set_leaves_state_unchanged() {
        let mut auth = AuthConfig::admin("key", "system");
        let before = auth.clone();
        assert!(auth.set_user_api_client_id("client").is_err());
        assert_eq!(auth, before);
        assert_eq!(auth.user_api_client_id(), None);
    }

    #[test]
    fn test_empty_values_do_not_conflict() {
        let mut auth = AuthConfig::new();
        auth.set_api_key("").unwrap();
        auth.set_user_api_key("ukey").unwrap();
        assert_eq!(auth.mode(), AuthMode::UserKey);
    }

    #[test]
    fn test_clear_allows_switching_modes() {
        let mut auth = AuthConfig::admin("key", "system");
        auth.clear_admin_key();
        auth.set_user_api_key("ukey").unwrap();
        assert_eq!(auth.mode(), AuthMode::UserKey);
    }

    #[test]
    fn test_headers_follow_populated_group() {
        let admin = AuthConfig::admin("key", "system");
        assert_eq!(
            admin.headers(),
            vec![
                (API_KEY_HEADER, "key".to_string()),
                (API_USERNAME_HEADER, "system".to_string()),
            ]
        );

        let user = AuthConfig::user("ukey", None);
        assert_eq!(user.headers(), vec![(USER_API_KEY_HEADER, "ukey".to_string())]);

        assert!(AuthConfig::new().headers().is_empty());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", AuthConfig::admin("super-secret", "system"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("system"));
    }
}
