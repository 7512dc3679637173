//! Error types for the ShareFile integration.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for ShareFile operations.
pub type ShareFileResult<T> = Result<T, ShareFileError>;

/// Top-level error type for the ShareFile integration.
#[derive(Debug, Error)]
pub enum ShareFileError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Upload session error.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Upload error.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Resource error.
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Server error.
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Response error.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),
}

impl ShareFileError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        ShareFileError::Configuration(ConfigurationError::InvalidConfiguration(msg.into()))
    }

    /// Creates an authentication error.
    pub fn authentication(msg: impl Into<String>) -> Self {
        ShareFileError::Authentication(AuthenticationError::InvalidToken(msg.into()))
    }

    /// Creates a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        ShareFileError::Request(RequestError::ValidationError(msg.into()))
    }

    /// Creates a session error.
    pub fn session(msg: impl Into<String>) -> Self {
        ShareFileError::Session(SessionError::CreationFailed(msg.into()))
    }

    /// Creates a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        ShareFileError::Resource(ResourceError::ItemNotFound(msg.into()))
    }

    /// Creates a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        ShareFileError::Network(NetworkError::ConnectionFailed(msg.into()))
    }

    /// Creates a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        ShareFileError::Response(ResponseError::DeserializationError(msg.into()))
    }

    /// Returns the HTTP status code if applicable.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ShareFileError::Authentication(_) => Some(StatusCode::UNAUTHORIZED),
            ShareFileError::Request(_) => Some(StatusCode::BAD_REQUEST),
            ShareFileError::Resource(ResourceError::ItemNotFound(_)) => {
                Some(StatusCode::NOT_FOUND)
            }
            ShareFileError::Upload(UploadError::ServerRejected { status, .. }) => Some(*status),
            ShareFileError::Server(ServerError::InternalError(_)) => {
                Some(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ShareFileError::Server(ServerError::ServiceUnavailable(_)) => {
                Some(StatusCode::SERVICE_UNAVAILABLE)
            }
            _ => None,
        }
    }
}

/// Configuration errors.
///
/// Raised synchronously by option resolution or client construction,
/// always before any network activity.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A required upload option is missing after defaulting.
    #[error("Missing required option: {0}")]
    MissingOption(String),

    /// An unrecognized upload option key was supplied.
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Missing credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Invalid token.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Expired token.
    #[error("Expired token: {0}")]
    ExpiredToken(String),
}

/// Request errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing parameter.
    #[error("Missing parameter: {0}")]
    MissingParameter(String),
}

/// Upload session errors.
///
/// A failed session acquisition is terminal for the upload attempt; the
/// engine never starts a chunk transfer without a valid session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The remote service refused to create a chunk-upload session.
    #[error("Upload session creation failed: {0}")]
    CreationFailed(String),

    /// The session response carried no chunk URI.
    #[error("Upload session response is missing a chunk URI")]
    MissingChunkUri,
}

/// Upload errors.
#[derive(Debug, Error)]
pub enum UploadError {
    /// A standard upload received a 404-class response from the server.
    ///
    /// The session URI has expired or never existed; the original status
    /// and body are carried for diagnostics.
    #[error("Server rejected upload ({status}): {body}")]
    ServerRejected {
        /// HTTP status of the rejecting response.
        status: StatusCode,
        /// Response body, verbatim.
        body: String,
    },

    /// A read from the source stream returned zero bytes before end-of-stream.
    #[error("Stream read error: {0}")]
    StreamRead(String),

    /// The chosen upload method is not implemented.
    #[error("Unsupported upload method: {0}")]
    UnsupportedMethod(String),
}

/// Resource errors.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Item not found.
    #[error("Item not found: {0}")]
    ItemNotFound(String),
}

/// Network errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Internal error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// Service unavailable.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Response errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Unexpected format.
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<TransportError> for ShareFileError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => ShareFileError::Network(NetworkError::Timeout(msg)),
            TransportError::Network(msg) => {
                ShareFileError::Network(NetworkError::ConnectionFailed(msg))
            }
            TransportError::Http(msg) => {
                ShareFileError::Response(ResponseError::UnexpectedFormat(msg))
            }
        }
    }
}
