//! Rust client for the ShareFile v3 REST API.
//!
//! Centered on item content transfer: a negotiated upload session carries
//! the file either as a single multipart request (standard) or as a
//! sequence of fixed-size chunks with per-chunk and whole-stream MD5
//! integrity checks (streamed). Downloads stream the response body back
//! without buffering.
//!
//! # Example
//!
//! ```no_run
//! use integrations_sharefile::{ShareFileClient, UploadMethod, UploadOptions, UploadOutcome};
//! use bytes::Bytes;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ShareFileClient::builder()
//!     .oauth_token(std::env::var("SHAREFILE_TOKEN")?)
//!     .subdomain("acmecorp")
//!     .build()?;
//!
//! let outcome = client
//!     .items()
//!     .upload_bytes(
//!         Bytes::from("quarterly numbers"),
//!         "fox1234",
//!         UploadOptions::new()
//!             .file_name("report.txt")
//!             .method(UploadMethod::Streamed),
//!     )
//!     .await?;
//!
//! match outcome {
//!     UploadOutcome::Completed(body) => println!("uploaded: {}", body),
//!     UploadOutcome::ChunkRejected { index, response } => {
//!         eprintln!("chunk {} rejected: {}", index, response)
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod services;
pub mod transport;
pub mod types;

pub use auth::{AccessToken, AuthProvider, StaticTokenProvider};
pub use client::{ShareFileClient, ShareFileClientBuilder};
pub use config::{ShareFileConfig, ShareFileConfigBuilder, DEFAULT_UPLOAD_CHUNK_SIZE};
pub use errors::{ShareFileError, ShareFileResult};
pub use services::{ItemsService, UploadOutcome};
pub use types::{SourceMetadata, UploadMethod, UploadOptions, UploadSpec};

/// Commonly used types.
pub mod prelude {
    pub use crate::auth::{AuthProvider, StaticTokenProvider};
    pub use crate::client::ShareFileClient;
    pub use crate::config::ShareFileConfig;
    pub use crate::errors::{ShareFileError, ShareFileResult};
    pub use crate::services::UploadOutcome;
    pub use crate::types::{SourceMetadata, UploadMethod, UploadOptions};
}
