//! Authentication for the ShareFile API.
//!
//! ShareFile issues OAuth tokens out of band; this crate takes the token as
//! given at client construction and attaches it as a bearer credential to
//! every outbound request. Token refresh and rotation are the caller's
//! responsibility — implement [`AuthProvider`] to plug in a refreshing
//! source.
//!
//! # Example
//!
//! ```no_run
//! use integrations_sharefile::auth::{AuthProvider, StaticTokenProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = StaticTokenProvider::new("oauth-access-token");
//! let token = provider.access_token().await?;
//! assert!(token.authorization_header().starts_with("Bearer "));
//! # Ok(())
//! # }
//! ```

use crate::errors::AuthenticationError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Authentication provider abstraction.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Get an access token for API requests.
    async fn access_token(&self) -> Result<AccessToken, AuthenticationError>;
}

/// Access token with metadata.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token string.
    pub token: SecretString,

    /// Token type (usually "Bearer").
    pub token_type: String,
}

impl AccessToken {
    /// Creates a new access token.
    pub fn new(token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
            token_type: token_type.into(),
        }
    }

    /// Creates a bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(token, "Bearer")
    }

    /// Returns the authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.token.expose_secret())
    }
}

/// Authentication provider backed by a fixed OAuth token.
///
/// The token is held as a [`SecretString`] so it never appears in debug
/// output. Every call hands back the same bearer credential.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    /// Creates a provider from a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }

    /// Creates a provider from an existing secret.
    pub fn from_secret(token: SecretString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthenticationError> {
        if self.token.expose_secret().is_empty() {
            return Err(AuthenticationError::InvalidToken(
                "OAuth token is empty".to_string(),
            ));
        }
        Ok(AccessToken::bearer(self.token.expose_secret().clone()))
    }
}
