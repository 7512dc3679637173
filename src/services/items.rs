//! Item operations: uploads and downloads.

use crate::client::RequestExecutor;
use crate::errors::{SessionError, ShareFileError, ShareFileResult, UploadError};
use crate::services::upload::{ChunkedUploader, UploadOutcome};
use crate::transport::{ByteStream, HttpMethod};
use crate::types::{ResolvedUploadOptions, SourceMetadata, UploadMethod, UploadOptions, UploadSpec};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Characters kept verbatim when an item id is embedded in a URL path.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Service for item content transfer.
///
/// Uploads negotiate a server-side session first; the session's chunk URI
/// then receives the content, either whole (standard) or in fixed-size
/// chunks (streamed). Downloads hand back the response body as a stream
/// without buffering it.
pub struct ItemsService {
    executor: Arc<RequestExecutor>,
}

impl ItemsService {
    /// Creates a new items service.
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Uploads a byte stream into a parent folder.
    ///
    /// Resolves `options` against `metadata`, negotiates an upload session
    /// under the parent item, then transfers the stream with the resolved
    /// method. A rejected chunk ends the transfer and is reported as
    /// [`UploadOutcome::ChunkRejected`]; option and session failures are
    /// errors.
    #[instrument(skip_all, fields(parent_id = %parent_id))]
    pub async fn upload<S>(
        &self,
        stream: S,
        parent_id: &str,
        options: UploadOptions,
        metadata: SourceMetadata,
    ) -> ShareFileResult<UploadOutcome>
    where
        S: Stream<Item = Result<Bytes, io::Error>> + Send,
    {
        let resolved = options.resolve(&metadata)?;

        if resolved.method == UploadMethod::Threaded {
            return Err(ShareFileError::Upload(UploadError::UnsupportedMethod(
                resolved.method.to_string(),
            )));
        }

        debug!(
            file_name = %resolved.file_name,
            file_size = resolved.file_size,
            method = %resolved.method,
            "negotiating upload session"
        );

        let spec = self.create_upload_session(parent_id, &resolved).await?;
        let chunk_uri = spec
            .chunk_uri
            .filter(|uri| !uri.is_empty())
            .ok_or(ShareFileError::Session(SessionError::MissingChunkUri))?;

        let uploader = ChunkedUploader::new(
            self.executor.clone(),
            chunk_uri,
            self.executor.upload_chunk_size(),
        );

        if resolved.method == UploadMethod::Standard {
            let content = collect_stream(stream).await?;
            uploader.upload_standard(&resolved.file_name, content).await
        } else {
            uploader.upload_streamed(stream).await
        }
    }

    /// Uploads an in-memory buffer into a parent folder.
    ///
    /// Size metadata is derived from the buffer; timestamps are left unset.
    pub async fn upload_bytes(
        &self,
        content: Bytes,
        parent_id: &str,
        options: UploadOptions,
    ) -> ShareFileResult<UploadOutcome> {
        let metadata = SourceMetadata::new(content.len() as u64);
        let parts: Vec<Result<Bytes, io::Error>> = if content.is_empty() {
            Vec::new()
        } else {
            vec![Ok(content)]
        };

        self.upload(futures::stream::iter(parts), parent_id, options, metadata)
            .await
    }

    /// Negotiates a chunk-upload session under the parent item.
    async fn create_upload_session(
        &self,
        parent_id: &str,
        options: &ResolvedUploadOptions,
    ) -> ShareFileResult<UploadSpec> {
        let path = format!(
            "Items({})/Upload?{}",
            utf8_percent_encode(parent_id, ID_SEGMENT),
            options.to_query()?
        );

        self.executor
            .execute_request::<UploadSpec>(HttpMethod::Post, &path, None)
            .await
            .map_err(|e| match e {
                ShareFileError::Session(_) => e,
                other => ShareFileError::Session(SessionError::CreationFailed(other.to_string())),
            })
    }

    /// Downloads an item's content as a byte stream.
    ///
    /// Optional query parameters (e.g. `redirect`, `includeAllVersions`)
    /// pass through to the download endpoint unchanged.
    #[instrument(skip_all, fields(item_id = %item_id))]
    pub async fn download(
        &self,
        item_id: &str,
        query: Option<&[(&str, &str)]>,
    ) -> ShareFileResult<ByteStream> {
        let mut path = format!("Items({})/Download", utf8_percent_encode(item_id, ID_SEGMENT));

        if let Some(params) = query {
            if !params.is_empty() {
                let encoded = serde_urlencoded::to_string(params).map_err(|e| {
                    ShareFileError::request(format!("Failed to encode query parameters: {}", e))
                })?;
                path.push('?');
                path.push_str(&encoded);
            }
        }

        self.executor.execute_streaming(HttpMethod::Get, &path).await
    }
}

async fn collect_stream<S>(stream: S) -> ShareFileResult<Bytes>
where
    S: Stream<Item = Result<Bytes, io::Error>> + Send,
{
    futures::pin_mut!(stream);

    let mut buf = Vec::new();
    while let Some(part) = stream.next().await {
        let part =
            part.map_err(|e| ShareFileError::network(format!("Stream error: {}", e)))?;
        buf.extend_from_slice(&part);
    }

    Ok(Bytes::from(buf))
}
