//! HTTP transport layer for the ShareFile API.

use crate::errors::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use pin_project::pin_project;
use reqwest::{header::HeaderMap, Client, Method, StatusCode};
use std::pin::Pin;
use std::task::{Context, Poll};
use url::Url;

/// HTTP transport abstraction for testability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and receive a buffered response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Send a request and receive a streaming response body.
    async fn send_streaming(&self, request: HttpRequest) -> Result<ByteStream, TransportError>;
}

/// HTTP request representation.
#[derive(Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<RequestBody>,
    /// Request timeout.
    pub timeout: Option<std::time::Duration>,
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET method.
    Get,
    /// POST method.
    Post,
    /// PUT method.
    Put,
    /// DELETE method.
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Request body variants.
pub enum RequestBody {
    /// Empty body.
    Empty,
    /// Fixed-size bytes.
    Bytes(Bytes),
    /// Multipart form body.
    Multipart(MultipartBody),
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Empty => write!(f, "Empty"),
            RequestBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            RequestBody::Multipart(_) => write!(f, "Multipart"),
        }
    }
}

/// `multipart/form-data` body with a single file part.
///
/// The ShareFile standard upload expects exactly one part, named `File1`,
/// carrying the whole file.
pub struct MultipartBody {
    /// Form part name.
    pub part_name: String,
    /// File name reported in the part's disposition.
    pub file_name: String,
    /// File content.
    pub content: Bytes,
    /// Boundary string.
    pub boundary: String,
}

impl MultipartBody {
    /// Creates a new single-part form body.
    pub fn new(
        part_name: impl Into<String>,
        file_name: impl Into<String>,
        content: Bytes,
    ) -> Self {
        Self {
            part_name: part_name.into(),
            file_name: file_name.into(),
            content,
            boundary: Self::generate_boundary(),
        }
    }

    fn generate_boundary() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        format!("---------------------------{}", timestamp)
    }

    /// Converts to wire bytes.
    pub fn to_bytes(&self) -> Bytes {
        let header = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            self.boundary, self.part_name, self.file_name
        );

        let mut result = header.into_bytes();
        result.extend_from_slice(&self.content);
        result.extend_from_slice(format!("\r\n--{}--\r\n", self.boundary).as_bytes());

        Bytes::from(result)
    }

    /// Gets the content type header value.
    pub fn content_type_header(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// HTTP response representation.
pub struct HttpResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a new HTTP response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the body decoded as UTF-8 text, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Byte stream for streaming responses.
#[pin_project]
pub struct ByteStream {
    #[pin]
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>,
}

impl ByteStream {
    /// Creates a new byte stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Collects the remaining stream into a single buffer.
    pub async fn collect_bytes(mut self) -> Result<Bytes, TransportError> {
        let mut buf = Vec::new();
        while let Some(part) = self.next().await {
            buf.extend_from_slice(&part?);
        }
        Ok(Bytes::from(buf))
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes, TransportError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        this.inner.poll_next(cx)
    }
}

/// Reqwest-based HTTP transport implementation.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new reqwest transport from an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a new reqwest transport with a default client.
    pub fn with_defaults() -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create client: {}", e)))?;
        Ok(Self { client })
    }

    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method: Method = request.method.into();
        let mut req = self.client.request(method, request.url.clone());

        for (key, value) in request.headers.iter() {
            req = req.header(key, value);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        if let Some(body) = request.body {
            match body {
                RequestBody::Empty => {}
                RequestBody::Bytes(bytes) => {
                    req = req.body(bytes);
                }
                RequestBody::Multipart(multipart) => {
                    req = req.header("Content-Type", multipart.content_type_header());
                    req = req.body(multipart.to_bytes());
                }
            }
        }

        req
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = self.build_request(request).send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, headers, body))
    }

    async fn send_streaming(&self, request: HttpRequest) -> Result<ByteStream, TransportError> {
        let response = self.build_request(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await?;
            return Err(TransportError::Http(format!(
                "HTTP {} error: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(|e| TransportError::Network(format!("Stream error: {}", e))));

        Ok(ByteStream::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_body_layout() {
        let content = Bytes::from("Hello, World!");
        let multipart = MultipartBody::new("File1", "hello.txt", content);

        let bytes = multipart.to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        assert!(multipart
            .content_type_header()
            .starts_with("multipart/form-data; boundary="));
        assert!(text.contains("Content-Disposition: form-data; name=\"File1\"; filename=\"hello.txt\""));
        assert!(text.contains("Hello, World!"));
        assert!(text.trim_end().ends_with(&format!("--{}--", multipart.boundary)));
    }

    #[test]
    fn test_http_method_conversion() {
        assert_eq!(Method::from(HttpMethod::Get), Method::GET);
        assert_eq!(Method::from(HttpMethod::Post), Method::POST);
        assert_eq!(Method::from(HttpMethod::Put), Method::PUT);
        assert_eq!(Method::from(HttpMethod::Delete), Method::DELETE);
    }

    #[tokio::test]
    async fn test_byte_stream_collect() {
        let parts = vec![Ok(Bytes::from("ab")), Ok(Bytes::from("cd"))];
        let stream = ByteStream::new(futures::stream::iter(parts));

        let collected = stream.collect_bytes().await.unwrap();
        assert_eq!(&collected[..], b"abcd");
    }
}
