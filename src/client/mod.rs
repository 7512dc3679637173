//! ShareFile API client.

mod executor;

pub use executor::RequestExecutor;

use crate::auth::AuthProvider;
use crate::config::{ShareFileConfig, ShareFileConfigBuilder};
use crate::errors::ShareFileResult;
use crate::services::ItemsService;
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;
use std::time::Duration;

/// Client for the ShareFile v3 API.
///
/// Cheap to clone; all clones share the same transport and credential
/// source.
///
/// # Example
///
/// ```no_run
/// use integrations_sharefile::{ShareFileClient, UploadOptions};
/// use bytes::Bytes;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ShareFileClient::builder()
///     .oauth_token("access-token")
///     .subdomain("acmecorp")
///     .build()?;
///
/// let outcome = client
///     .items()
///     .upload_bytes(
///         Bytes::from("hello"),
///         "fox1234",
///         UploadOptions::new().file_name("hello.txt"),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ShareFileClient {
    executor: Arc<RequestExecutor>,
}

impl ShareFileClient {
    /// Creates a client from a configuration, with the default transport.
    pub fn new(config: ShareFileConfig) -> ShareFileResult<Self> {
        let transport = Arc::new(ReqwestTransport::with_defaults()?);
        Ok(Self::with_transport(config, transport))
    }

    /// Creates a client with a custom transport.
    pub fn with_transport(config: ShareFileConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let auth = config.auth_provider.clone();
        let executor = Arc::new(RequestExecutor::new(config, transport, auth));
        Self { executor }
    }

    /// Creates a new client builder.
    pub fn builder() -> ShareFileClientBuilder {
        ShareFileClientBuilder::new()
    }

    /// Item content operations.
    pub fn items(&self) -> ItemsService {
        ItemsService::new(self.executor.clone())
    }
}

/// Builder for [`ShareFileClient`].
pub struct ShareFileClientBuilder {
    config: ShareFileConfigBuilder,
}

impl ShareFileClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: ShareFileConfig::builder(),
        }
    }

    /// Sets the authentication provider.
    pub fn auth_provider<A: AuthProvider + 'static>(mut self, provider: A) -> Self {
        self.config = self.config.auth_provider(provider);
        self
    }

    /// Sets a fixed OAuth token as the credential source.
    pub fn oauth_token(mut self, token: impl Into<String>) -> Self {
        self.config = self.config.oauth_token(token);
        self
    }

    /// Sets the account subdomain.
    pub fn subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.config = self.config.subdomain(subdomain);
        self
    }

    /// Sets an explicit base URL, overriding the subdomain-derived one.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config = self.config.base_url(url);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Sets the streamed-upload chunk size.
    pub fn upload_chunk_size(mut self, size: usize) -> Self {
        self.config = self.config.upload_chunk_size(size);
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config = self.config.user_agent(ua);
        self
    }

    /// Builds the client.
    pub fn build(self) -> ShareFileResult<ShareFileClient> {
        ShareFileClient::new(self.config.build()?)
    }
}

impl Default for ShareFileClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_constructs_client() {
        let client = ShareFileClient::builder()
            .oauth_token("token")
            .subdomain("acmecorp")
            .build();

        assert!(client.is_ok());
    }

    #[test]
    fn test_builder_requires_credentials() {
        let client = ShareFileClient::builder().subdomain("acmecorp").build();
        assert!(client.is_err());
    }
}
