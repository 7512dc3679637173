//! Type definitions for the ShareFile API.

use crate::errors::{ConfigurationError, ShareFileError, ShareFileResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upload transfer method.
///
/// `Threaded` is part of the negotiated option surface but this client does
/// not implement parallel chunk dispatch; choosing it fails before any
/// network activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    /// Single multipart request carrying the whole file.
    Standard,
    /// Sequential chunked transfer with per-chunk integrity checks.
    Streamed,
    /// Parallel chunked transfer (declared by the API, not implemented here).
    Threaded,
}

impl UploadMethod {
    /// Wire form of the method tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMethod::Standard => "standard",
            UploadMethod::Streamed => "streamed",
            UploadMethod::Threaded => "threaded",
        }
    }
}

impl std::fmt::Display for UploadMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about the upload source, supplied by the caller.
///
/// Decouples the upload engine from any particular stream implementation:
/// size and timestamps are captured once up front instead of being pulled
/// from an OS file handle mid-transfer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceMetadata {
    /// Total size of the source in bytes.
    pub size: u64,

    /// Creation time of the source, if known.
    pub created_at: Option<DateTime<Utc>>,

    /// Last modification time of the source, if known.
    pub modified_at: Option<DateTime<Utc>>,
}

impl SourceMetadata {
    /// Creates metadata with a known size and no timestamps.
    pub fn new(size: u64) -> Self {
        Self {
            size,
            created_at: None,
            modified_at: None,
        }
    }

    /// Sets the creation time.
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Sets the modification time.
    pub fn with_modified_at(mut self, at: DateTime<Utc>) -> Self {
        self.modified_at = Some(at);
        self
    }

    /// Derives metadata from filesystem metadata.
    ///
    /// Timestamps the platform cannot report are left unset.
    pub fn from_std(meta: &std::fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            created_at: meta.created().ok().map(DateTime::<Utc>::from),
            modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}

/// Sparse upload option bag.
///
/// Every field is optional; [`UploadOptions::resolve`] applies defaults,
/// enforces required options and merges in the source metadata. The bag can
/// be built with the setter methods or deserialized from a JSON map with
/// [`UploadOptions::from_map`], which rejects unrecognized keys.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct UploadOptions {
    /// Name the uploaded item will carry. Required.
    pub file_name: Option<String>,
    /// Size of the source in bytes. Overridden by the source metadata.
    pub file_size: Option<u64>,
    /// Display title.
    pub title: Option<String>,
    /// Batch identifier grouping related uploads.
    pub batch_id: Option<String>,
    /// Whether the body is sent raw.
    pub raw: Option<bool>,
    /// Tag identifying the calling integration.
    pub tool: Option<String>,
    /// Free-form details attached to the item.
    pub details: Option<String>,
    /// Send-guid correlation token.
    pub send_guid: Option<String>,
    /// Operation id.
    pub opid: Option<String>,
    /// Requested worker count for threaded uploads.
    pub thread_count: Option<u32>,
    /// Response format requested from the API.
    pub response_format: Option<String>,
    /// Client-side creation time. Overridden by the source metadata.
    #[serde(rename = "clientCreatedDateUTC")]
    pub client_created_at: Option<DateTime<Utc>>,
    /// Client-side modification time. Overridden by the source metadata.
    #[serde(rename = "clientModifiedDateUTC")]
    pub client_modified_at: Option<DateTime<Utc>>,
    /// Days until the item expires.
    pub expiration_days: Option<i32>,
    /// Id of the item this upload revises.
    pub base_file_id: Option<String>,
    /// Transfer method.
    pub method: Option<UploadMethod>,
}

impl UploadOptions {
    /// Creates an empty option bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file name.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Sets the display title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the batch id.
    pub fn batch_id(mut self, id: impl Into<String>) -> Self {
        self.batch_id = Some(id.into());
        self
    }

    /// Sets the raw flag.
    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Sets the integration tool tag.
    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Sets the free-form details.
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Sets the send guid.
    pub fn send_guid(mut self, guid: impl Into<String>) -> Self {
        self.send_guid = Some(guid.into());
        self
    }

    /// Sets the operation id.
    pub fn opid(mut self, opid: impl Into<String>) -> Self {
        self.opid = Some(opid.into());
        self
    }

    /// Sets the thread count.
    pub fn thread_count(mut self, count: u32) -> Self {
        self.thread_count = Some(count);
        self
    }

    /// Sets the response format.
    pub fn response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format = Some(format.into());
        self
    }

    /// Sets the expiration in days.
    pub fn expiration_days(mut self, days: i32) -> Self {
        self.expiration_days = Some(days);
        self
    }

    /// Sets the base file id.
    pub fn base_file_id(mut self, id: impl Into<String>) -> Self {
        self.base_file_id = Some(id.into());
        self
    }

    /// Sets the transfer method.
    pub fn method(mut self, method: UploadMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Builds an option bag from a JSON map.
    ///
    /// Any key that is not a recognized upload option fails with a
    /// [`ConfigurationError::UnknownOption`], before any network activity.
    pub fn from_map(map: serde_json::Map<String, serde_json::Value>) -> ShareFileResult<Self> {
        serde_json::from_value(serde_json::Value::Object(map)).map_err(|e| {
            let msg = e.to_string();
            let err = if msg.starts_with("unknown field") {
                ConfigurationError::UnknownOption(msg)
            } else {
                ConfigurationError::InvalidConfiguration(msg)
            };
            ShareFileError::Configuration(err)
        })
    }

    /// Resolves the bag against the source metadata.
    ///
    /// Applies the documented defaults, enforces that `fileName` is present
    /// and takes size and timestamps from the metadata. The resolved record
    /// carries no null values; unset optional fields are omitted from the
    /// wire entirely.
    pub fn resolve(self, metadata: &SourceMetadata) -> ShareFileResult<ResolvedUploadOptions> {
        let file_name = self.file_name.ok_or_else(|| {
            ShareFileError::Configuration(ConfigurationError::MissingOption(
                "fileName".to_string(),
            ))
        })?;

        Ok(ResolvedUploadOptions {
            file_name,
            file_size: metadata.size,
            title: self.title,
            batch_id: self.batch_id,
            raw: self.raw.unwrap_or(false),
            tool: self.tool.unwrap_or_else(|| "apiv3".to_string()),
            details: self.details,
            send_guid: self.send_guid,
            opid: self.opid,
            thread_count: self.thread_count,
            response_format: self.response_format.unwrap_or_else(|| "json".to_string()),
            client_created_at: metadata.created_at,
            client_modified_at: metadata.modified_at,
            expiration_days: self.expiration_days,
            base_file_id: self.base_file_id,
            method: self.method.unwrap_or(UploadMethod::Standard),
        })
    }
}

/// Fully resolved upload options, ready for the wire.
///
/// Serialization omits every unset optional field, so the remote API never
/// sees an explicit null or empty parameter. Booleans serialize as the
/// literal strings `true`/`false`, which is the form the ShareFile query
/// parser expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedUploadOptions {
    /// Name the uploaded item will carry.
    pub file_name: String,
    /// Size of the source in bytes.
    pub file_size: u64,
    /// Display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Batch identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// Whether the body is sent raw.
    pub raw: bool,
    /// Tag identifying the calling integration.
    pub tool: String,
    /// Free-form details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Send-guid correlation token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_guid: Option<String>,
    /// Operation id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opid: Option<String>,
    /// Requested worker count for threaded uploads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_count: Option<u32>,
    /// Response format requested from the API.
    pub response_format: String,
    /// Client-side creation time.
    #[serde(
        rename = "clientCreatedDateUTC",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_created_at: Option<DateTime<Utc>>,
    /// Client-side modification time.
    #[serde(
        rename = "clientModifiedDateUTC",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_modified_at: Option<DateTime<Utc>>,
    /// Days until the item expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_days: Option<i32>,
    /// Id of the item this upload revises.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_file_id: Option<String>,
    /// Transfer method.
    pub method: UploadMethod,
}

impl ResolvedUploadOptions {
    /// Encodes the resolved options as a query string.
    pub fn to_query(&self) -> ShareFileResult<String> {
        serde_urlencoded::to_string(self).map_err(|e| {
            ShareFileError::Request(crate::errors::RequestError::ValidationError(format!(
                "Failed to encode upload options: {}",
                e
            )))
        })
    }
}

/// Chunk-upload session handle returned by the remote service.
///
/// Created once per upload attempt and consumed for its duration; never
/// persisted or reused across attempts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadSpec {
    /// Transfer method the server settled on.
    #[serde(default)]
    pub method: Option<String>,

    /// URI chunk requests are POSTed to, with query parameters appended.
    #[serde(default)]
    pub chunk_uri: Option<String>,

    /// Opaque progress token.
    #[serde(default)]
    pub progress_data: Option<String>,

    /// Whether the server considers this a resumed upload.
    #[serde(default)]
    pub is_resume: Option<bool>,
}
