//! Configuration for the ShareFile client.

use crate::auth::{AuthProvider, StaticTokenProvider};
use crate::errors::{ConfigurationError, ShareFileError, ShareFileResult};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default chunk size for streamed uploads (8 MiB).
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Configuration for the ShareFile client.
#[derive(Clone)]
pub struct ShareFileConfig {
    /// Authentication provider.
    pub auth_provider: Arc<dyn AuthProvider>,

    /// Base URL for the API, e.g. `https://acmecorp.sf-api.com/sf/v3/`.
    pub base_url: Url,

    /// Default timeout for requests.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Chunk size for streamed uploads.
    pub upload_chunk_size: usize,

    /// User agent string.
    pub user_agent: String,
}

impl ShareFileConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ShareFileConfigBuilder {
        ShareFileConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ShareFileResult<()> {
        if self.upload_chunk_size == 0 {
            return Err(ShareFileError::Configuration(
                ConfigurationError::InvalidConfiguration(
                    "Upload chunk size must be non-zero".to_string(),
                ),
            ));
        }

        if self.base_url.host_str().is_none() {
            return Err(ShareFileError::Configuration(
                ConfigurationError::InvalidConfiguration(
                    "Base URL must carry a host".to_string(),
                ),
            ));
        }

        Ok(())
    }
}

/// Builder for [`ShareFileConfig`].
pub struct ShareFileConfigBuilder {
    auth_provider: Option<Arc<dyn AuthProvider>>,
    subdomain: Option<String>,
    base_url: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    upload_chunk_size: usize,
    user_agent: Option<String>,
}

impl ShareFileConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            auth_provider: None,
            subdomain: None,
            base_url: None,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
            user_agent: None,
        }
    }

    /// Sets the authentication provider.
    pub fn auth_provider<A: AuthProvider + 'static>(mut self, provider: A) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Sets the authentication provider from an Arc.
    pub fn auth_provider_arc(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth_provider = Some(provider);
        self
    }

    /// Sets a fixed OAuth token as the credential source.
    pub fn oauth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_provider = Some(Arc::new(StaticTokenProvider::new(token)));
        self
    }

    /// Sets the account subdomain.
    ///
    /// The base URL becomes `https://{subdomain}.sf-api.com/sf/v3/`.
    pub fn subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    /// Sets an explicit base URL, overriding the subdomain-derived one.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the streamed-upload chunk size.
    pub fn upload_chunk_size(mut self, size: usize) -> Self {
        self.upload_chunk_size = size;
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ShareFileResult<ShareFileConfig> {
        let auth_provider = self.auth_provider.ok_or_else(|| {
            ShareFileError::Configuration(ConfigurationError::MissingCredentials(
                "An authentication provider or OAuth token is required".to_string(),
            ))
        })?;

        let raw_url = match (self.base_url, self.subdomain) {
            (Some(url), _) => url,
            (None, Some(sub)) => format!("https://{}.sf-api.com/sf/v3/", sub),
            (None, None) => {
                return Err(ShareFileError::Configuration(
                    ConfigurationError::InvalidConfiguration(
                        "Either a subdomain or a base URL is required".to_string(),
                    ),
                ))
            }
        };

        // Url::join drops the last path segment unless the base ends in '/'.
        let normalized = if raw_url.ends_with('/') {
            raw_url
        } else {
            format!("{}/", raw_url)
        };

        let base_url = Url::parse(&normalized).map_err(|e| {
            ShareFileError::Configuration(ConfigurationError::InvalidConfiguration(format!(
                "Invalid base URL: {}",
                e
            )))
        })?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("integrations-sharefile/{}", env!("CARGO_PKG_VERSION")));

        let config = ShareFileConfig {
            auth_provider,
            base_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            upload_chunk_size: self.upload_chunk_size,
            user_agent,
        };

        config.validate()?;

        Ok(config)
    }
}

impl Default for ShareFileConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
