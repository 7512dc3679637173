//! Request executor with authentication and error mapping.

use crate::auth::AuthProvider;
use crate::config::ShareFileConfig;
use crate::errors::{
    AuthenticationError, RequestError, ResourceError, ResponseError, ServerError, ShareFileError,
    ShareFileResult,
};
use crate::transport::{
    ByteStream, HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody,
};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Executes HTTP requests against the ShareFile API.
///
/// Adds the bearer credential and user agent to every request, joins paths
/// onto the configured base URL, and maps API error responses onto the
/// domain error taxonomy. Upload traffic to server-issued session URIs goes
/// through [`RequestExecutor::execute_upload`], which leaves status
/// interpretation to the upload engine.
pub struct RequestExecutor {
    config: ShareFileConfig,
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(
        config: ShareFileConfig,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            auth,
        }
    }

    /// Executes an API request and deserializes the JSON response.
    pub async fn execute_request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
    ) -> ShareFileResult<T> {
        let response = self.execute_request_raw(method, path, body).await?;

        serde_json::from_slice(&response).map_err(|e| {
            ShareFileError::Response(ResponseError::DeserializationError(format!(
                "Failed to deserialize response: {}",
                e
            )))
        })
    }

    /// Executes an API request and returns the raw response body.
    pub async fn execute_request_raw(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
    ) -> ShareFileResult<Bytes> {
        let url = self.build_url(path)?;
        let headers = self.base_headers(Some("application/json")).await?;

        let http_request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: Some(self.config.timeout),
        };

        let response = self.transport.send(http_request).await?;

        if !response.status.is_success() {
            return Err(self.map_error_response(response));
        }

        Ok(response.body)
    }

    /// Executes an API request and returns the response body as a stream.
    pub async fn execute_streaming(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> ShareFileResult<ByteStream> {
        let url = self.build_url(path)?;
        let headers = self.base_headers(None).await?;

        let http_request = HttpRequest {
            method,
            url,
            headers,
            body: None,
            timeout: Some(self.config.timeout),
        };

        Ok(self.transport.send_streaming(http_request).await?)
    }

    /// Executes an authenticated request against an absolute URL.
    ///
    /// Session URIs point at storage servers outside the API base URL; the
    /// response is handed back unmapped because the chunk protocol judges
    /// responses by body, not status.
    pub async fn execute_upload(
        &self,
        method: HttpMethod,
        url: Url,
        extra_headers: HeaderMap,
        body: RequestBody,
    ) -> ShareFileResult<HttpResponse> {
        let mut headers = self.base_headers(None).await?;
        for (key, value) in extra_headers.iter() {
            headers.insert(key, value.clone());
        }

        let http_request = HttpRequest {
            method,
            url,
            headers,
            body: Some(body),
            timeout: Some(self.config.timeout),
        };

        Ok(self.transport.send(http_request).await?)
    }

    /// Builds a full URL from an API path relative to the base URL.
    pub fn build_url(&self, path: &str) -> ShareFileResult<Url> {
        let path = path.trim_start_matches('/');

        self.config.base_url.join(path).map_err(|e| {
            ShareFileError::Request(RequestError::ValidationError(format!(
                "Invalid URL: {}",
                e
            )))
        })
    }

    /// The configured chunk size for streamed uploads.
    pub fn upload_chunk_size(&self) -> usize {
        self.config.upload_chunk_size
    }

    async fn base_headers(
        &self,
        content_type: Option<&'static str>,
    ) -> ShareFileResult<HeaderMap> {
        let token = self
            .auth
            .access_token()
            .await
            .map_err(ShareFileError::Authentication)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token.authorization_header()).map_err(|e| {
                ShareFileError::Request(RequestError::ValidationError(format!(
                    "Invalid auth header: {}",
                    e
                )))
            })?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent).map_err(|e| {
                ShareFileError::Request(RequestError::ValidationError(format!(
                    "Invalid user agent: {}",
                    e
                )))
            })?,
        );
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }

        Ok(headers)
    }

    /// Maps an API error response to a domain error.
    ///
    /// ShareFile reports errors in an odata envelope:
    /// `{"code": "...", "message": {"lang": "...", "value": "..."}}`.
    fn map_error_response(&self, response: HttpResponse) -> ShareFileError {
        #[derive(serde::Deserialize)]
        struct ODataMessage {
            value: String,
        }

        #[derive(serde::Deserialize)]
        struct ODataError {
            #[allow(dead_code)]
            #[serde(default)]
            code: Option<String>,
            message: ODataMessage,
        }

        let status = response.status;
        let message = serde_json::from_slice::<ODataError>(&response.body)
            .map(|e| e.message.value)
            .unwrap_or_else(|_| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    String::from_utf8_lossy(&response.body)
                )
            });

        match status {
            StatusCode::BAD_REQUEST => {
                ShareFileError::Request(RequestError::ValidationError(message))
            }
            StatusCode::UNAUTHORIZED => {
                ShareFileError::Authentication(AuthenticationError::InvalidToken(message))
            }
            StatusCode::NOT_FOUND => {
                ShareFileError::Resource(ResourceError::ItemNotFound(message))
            }
            StatusCode::SERVICE_UNAVAILABLE => {
                ShareFileError::Server(ServerError::ServiceUnavailable(message))
            }
            s if s.is_server_error() => {
                ShareFileError::Server(ServerError::InternalError(message))
            }
            _ => ShareFileError::Server(ServerError::InternalError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            ))),
        }
    }
}
