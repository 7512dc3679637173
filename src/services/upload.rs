//! Chunked upload engine.
//!
//! Drives transfers against a server-issued chunk-upload session URI, in two
//! flavors:
//!
//! - **Standard**: one `multipart/form-data` request carrying the whole file
//!   in a single part named `File1`.
//! - **Streamed**: the source is cut into fixed-size chunks (8 MiB by
//!   default), each POSTed as `application/octet-stream` with `index`,
//!   `byteOffset` and an MD5 `hash` appended to the session URI. The final
//!   chunk — a short read, end-of-stream, or a zero-length remainder —
//!   additionally carries a whole-stream `filehash` and `finish=true`.
//!
//! The server session is stateful and keyed by `index`/`byteOffset`, so
//! chunks go out strictly in order with one request in flight. A non-final
//! chunk is acknowledged with the literal body `"true"`; anything else stops
//! the transfer and is handed back to the caller as data, not an error.

use crate::client::RequestExecutor;
use crate::errors::{NetworkError, ShareFileError, ShareFileResult, UploadError};
use crate::transport::{HttpMethod, HttpResponse, MultipartBody, RequestBody};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use md5::{Digest, Md5};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::Serialize;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Response body the server sends to acknowledge a non-final chunk.
const CHUNK_ACCEPTED: &str = "true";

/// Result of an upload attempt.
///
/// Chunk rejection is an expected protocol outcome, not a programming
/// error, so it is reported as a value: the caller decides whether to retry
/// the whole session (there is no partial resume).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The transfer ran to completion.
    ///
    /// Carries the body of the final chunk response (streamed) or of the
    /// single upload response (standard), verbatim and uninterpreted.
    Completed(String),

    /// The server rejected a non-final chunk.
    ///
    /// No further chunks were sent after this response.
    ChunkRejected {
        /// Zero-based index of the rejected chunk.
        index: u64,
        /// Response body the server sent instead of the success token.
        response: String,
    },
}

/// Query parameters attached to a chunk request.
///
/// Field order is the wire order. Booleans serialize as the literal strings
/// `true`/`false`, which is the form the session endpoint's query parser
/// expects.
#[derive(Serialize)]
struct ChunkParams<'a> {
    index: u64,
    #[serde(rename = "byteOffset")]
    byte_offset: u64,
    hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filehash: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    finish: Option<bool>,
}

/// Uploader bound to one chunk-upload session.
pub(crate) struct ChunkedUploader {
    executor: Arc<RequestExecutor>,
    chunk_uri: String,
    chunk_size: usize,
}

impl ChunkedUploader {
    pub(crate) fn new(executor: Arc<RequestExecutor>, chunk_uri: String, chunk_size: usize) -> Self {
        Self {
            executor,
            chunk_uri,
            chunk_size,
        }
    }

    /// Uploads the whole content in a single multipart request.
    ///
    /// A 404-class response means the session URI has expired or never
    /// existed and is raised as [`UploadError::ServerRejected`]; any other
    /// response body is returned verbatim for the caller to interpret.
    pub(crate) async fn upload_standard(
        &self,
        file_name: &str,
        content: Bytes,
    ) -> ShareFileResult<UploadOutcome> {
        let url = Url::parse(&self.chunk_uri).map_err(|e| {
            ShareFileError::session(format!("Invalid chunk URI: {}", e))
        })?;

        debug!(bytes = content.len(), "starting standard upload");

        let body = RequestBody::Multipart(MultipartBody::new("File1", file_name, content));
        let response = self
            .executor
            .execute_upload(HttpMethod::Post, url, HeaderMap::new(), body)
            .await?;

        if response.status == StatusCode::NOT_FOUND {
            warn!(status = %response.status, "standard upload rejected by server");
            return Err(ShareFileError::Upload(UploadError::ServerRejected {
                status: response.status,
                body: response.body_text(),
            }));
        }

        info!(status = %response.status, "standard upload complete");
        Ok(UploadOutcome::Completed(response.body_text()))
    }

    /// Uploads the stream as a sequence of fixed-size chunks.
    pub(crate) async fn upload_streamed<S>(&self, stream: S) -> ShareFileResult<UploadOutcome>
    where
        S: Stream<Item = Result<Bytes, io::Error>> + Send,
    {
        let mut reader = ChunkReader::new(stream, self.chunk_size);
        let mut index: u64 = 0;

        loop {
            let (chunk, eof) = reader.next_chunk().await?;
            let is_final = eof || chunk.len() < self.chunk_size;
            let hash = md5_hex(&chunk);
            let byte_offset = index * self.chunk_size as u64;

            debug!(
                index,
                byte_offset,
                len = chunk.len(),
                is_final,
                "uploading chunk"
            );

            if !is_final {
                let params = ChunkParams {
                    index,
                    byte_offset,
                    hash: &hash,
                    filehash: None,
                    finish: None,
                };
                let response = self.post_chunk(&params, chunk).await?;
                let body = response.body_text();

                if body != CHUNK_ACCEPTED {
                    warn!(index, response = %body, "chunk rejected, stopping upload");
                    return Ok(UploadOutcome::ChunkRejected {
                        index,
                        response: body,
                    });
                }

                index += 1;
            } else {
                let filehash = reader.stream_hash();
                let params = ChunkParams {
                    index,
                    byte_offset,
                    hash: &hash,
                    filehash: Some(&filehash),
                    finish: Some(true),
                };
                let response = self.post_chunk(&params, chunk).await?;

                info!(
                    chunks = index + 1,
                    bytes = reader.bytes_delivered(),
                    "streamed upload complete"
                );
                return Ok(UploadOutcome::Completed(response.body_text()));
            }
        }
    }

    async fn post_chunk(
        &self,
        params: &ChunkParams<'_>,
        chunk: Bytes,
    ) -> ShareFileResult<HttpResponse> {
        let query = serde_urlencoded::to_string(params).map_err(|e| {
            ShareFileError::request(format!("Failed to encode chunk parameters: {}", e))
        })?;
        let url = self.chunk_url(&query)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from(chunk.len()));

        self.executor
            .execute_upload(HttpMethod::Post, url, headers, RequestBody::Bytes(chunk))
            .await
    }

    /// Appends chunk parameters to the session URI.
    ///
    /// Session URIs normally carry an upload id in their query already, so
    /// parameters join with `&`; a bare URI gets a `?`.
    fn chunk_url(&self, query: &str) -> ShareFileResult<Url> {
        let separator = if self.chunk_uri.contains('?') { '&' } else { '?' };
        Url::parse(&format!("{}{}{}", self.chunk_uri, separator, query))
            .map_err(|e| ShareFileError::session(format!("Invalid chunk URI: {}", e)))
    }
}

/// Cuts a byte stream into chunks of exactly `chunk_size` bytes.
///
/// Underlying reads may deliver fewer bytes than requested, so reads
/// accumulate until a chunk is full or the stream ends. A zero-length item
/// before end-of-stream indicates a corrupted or externally closed source
/// and is fatal. After filling an exact chunk the reader looks one item
/// ahead, so end-of-stream landing on a chunk boundary marks that full
/// chunk as final instead of producing a trailing empty one.
struct ChunkReader<S> {
    stream: Pin<Box<S>>,
    chunk_size: usize,
    leftover: Bytes,
    done: bool,
    digest: Md5,
    bytes_delivered: u64,
}

impl<S> ChunkReader<S>
where
    S: Stream<Item = Result<Bytes, io::Error>> + Send,
{
    fn new(stream: S, chunk_size: usize) -> Self {
        Self {
            stream: Box::pin(stream),
            chunk_size,
            leftover: Bytes::new(),
            done: false,
            digest: Md5::new(),
            bytes_delivered: 0,
        }
    }

    /// Reads the next chunk; returns it with an end-of-stream flag.
    async fn next_chunk(&mut self) -> ShareFileResult<(Bytes, bool)> {
        let mut buf = BytesMut::with_capacity(self.chunk_size.min(self.leftover.len().max(4096)));

        while buf.len() < self.chunk_size {
            if !self.leftover.is_empty() {
                let take = (self.chunk_size - buf.len()).min(self.leftover.len());
                buf.extend_from_slice(&self.leftover.split_to(take));
                continue;
            }
            if self.done {
                break;
            }
            self.fill_leftover().await?;
        }

        // Look one item ahead so EOF on an exact chunk boundary is visible.
        if buf.len() == self.chunk_size && self.leftover.is_empty() && !self.done {
            self.fill_leftover().await?;
        }

        self.digest.update(&buf);
        self.bytes_delivered += buf.len() as u64;

        let eof = self.done && self.leftover.is_empty();
        Ok((buf.freeze(), eof))
    }

    async fn fill_leftover(&mut self) -> ShareFileResult<()> {
        match self.stream.next().await {
            None => {
                self.done = true;
                Ok(())
            }
            Some(Err(e)) => Err(ShareFileError::Network(NetworkError::ConnectionFailed(
                format!("Stream error: {}", e),
            ))),
            Some(Ok(part)) if part.is_empty() => {
                Err(ShareFileError::Upload(UploadError::StreamRead(
                    "Source stream returned zero bytes before end of stream".to_string(),
                )))
            }
            Some(Ok(part)) => {
                self.leftover = part;
                Ok(())
            }
        }
    }

    /// Hex MD5 of every byte delivered so far.
    fn stream_hash(&self) -> String {
        hex::encode(self.digest.clone().finalize())
    }

    fn bytes_delivered(&self) -> u64 {
        self.bytes_delivered
    }
}

/// Hex-encoded MD5 digest.
fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}
