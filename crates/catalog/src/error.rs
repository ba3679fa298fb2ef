//! Error types for the catalog client

use cinefeed_core::error::{Error as CoreError, ErrorCode};
use thiserror::Error;

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Longest upstream excerpt carried in an error, in characters
pub const MAX_BODY_CHARS: usize = 300;

/// Catalog client errors
///
/// Every variant that reaches a caller maps to an HTTP-style status through
/// [`CatalogError::status_code`].
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Transport failed on every attempt
    #[error("Could not reach the movie catalog after {attempts} attempt(s): {message}")]
    Network {
        /// Number of attempts made
        attempts: u32,
        /// Truncated transport diagnostic
        message: String,
    },

    /// Upstream rejected the credential
    #[error("Invalid or missing X-API-KEY for the movie catalog")]
    Auth,

    /// Upstream throttled the request
    #[error("Movie catalog rate limit exceeded. Try again later.")]
    RateLimited,

    /// Upstream answered 4xx
    #[error("Movie catalog error ({status}): {body}")]
    UpstreamClient {
        /// Upstream status code
        status: u16,
        /// Truncated upstream body
        body: String,
    },

    /// Upstream answered 5xx, or a non-success status outside 4xx
    #[error("Movie catalog unavailable ({status}): {body}")]
    UpstreamServer {
        /// Upstream status code
        status: u16,
        /// Truncated upstream body
        body: String,
    },

    /// Upstream answered with something other than JSON
    #[error("Unexpected content type from the movie catalog ({content_type}): {body}")]
    InvalidContentType {
        /// Observed `Content-Type` header
        content_type: String,
        /// Truncated upstream body
        body: String,
    },

    /// Upstream body is not a JSON object
    #[error("Malformed JSON from the movie catalog: {body}")]
    Parse {
        /// Truncated upstream body
        body: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Coarse error classes, one per variant family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure
    Network,
    /// Credential rejected
    Auth,
    /// Throttled
    RateLimited,
    /// Upstream 4xx
    UpstreamClient,
    /// Upstream 5xx
    UpstreamServer,
    /// Non-JSON response
    InvalidContentType,
    /// Unparseable body
    Parse,
    /// Local configuration or client setup
    Config,
}

impl CatalogError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing env var error
    pub fn missing_env(var: impl Into<String>) -> Self {
        Self::MissingEnvVar(var.into())
    }

    /// Create a transport error, truncating the diagnostic
    pub fn network(attempts: u32, message: &str) -> Self {
        Self::Network {
            attempts,
            message: truncate(message),
        }
    }

    /// Create an upstream 4xx error, truncating the body
    pub fn upstream_client(status: u16, body: &str) -> Self {
        Self::UpstreamClient {
            status,
            body: truncate(body),
        }
    }

    /// Create an upstream server error, truncating the body
    pub fn upstream_server(status: u16, body: &str) -> Self {
        Self::UpstreamServer {
            status,
            body: truncate(body),
        }
    }

    /// Classification of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Auth => ErrorKind::Auth,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::UpstreamClient { .. } => ErrorKind::UpstreamClient,
            Self::UpstreamServer { .. } => ErrorKind::UpstreamServer,
            Self::InvalidContentType { .. } => ErrorKind::InvalidContentType,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Config(_) | Self::MissingEnvVar(_) | Self::Client(_) => ErrorKind::Config,
        }
    }

    /// HTTP status to report to the caller
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Network { .. } | Self::InvalidContentType { .. } | Self::Parse { .. } => 502,
            Self::RateLimited => 429,
            Self::UpstreamClient { status, .. } => *status,
            Self::UpstreamServer { status, .. } if *status >= 500 => *status,
            Self::UpstreamServer { .. } => 502,
            Self::Auth | Self::Config(_) | Self::MissingEnvVar(_) | Self::Client(_) => 500,
        }
    }
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::MissingEnvVar(name) => CoreError::missing_config(&name),
            CatalogError::Config(_) | CatalogError::Client(_) => CoreError::config(message),
            CatalogError::Auth => CoreError::upstream(message)
                .with_suggestion("Check the KINOPOISK_API_KEY value"),
            CatalogError::RateLimited => CoreError::new(ErrorCode::UpstreamUnavailable, message)
                .with_suggestion("Wait a moment before retrying"),
            CatalogError::Network { .. } | CatalogError::UpstreamServer { .. } => {
                CoreError::new(ErrorCode::UpstreamUnavailable, message)
            }
            CatalogError::UpstreamClient { .. }
            | CatalogError::InvalidContentType { .. }
            | CatalogError::Parse { .. } => CoreError::upstream(message),
        }
    }
}

/// Cut text to [`MAX_BODY_CHARS`] characters
#[must_use]
pub fn truncate(text: &str) -> String {
    match text.char_indices().nth(MAX_BODY_CHARS) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
