//! Error types for message sources.

use std::io;

/// Result type alias for message source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message source error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A transport payload was not valid base64.
    #[error("Payload decoding failed: {0}")]
    Base64Decode(#[source] maildigest_mime::Error),

    /// `OAuth2` error from the token endpoint.
    #[error("OAuth2 error: {error} - {description}")]
    OAuth {
        /// Error code (e.g., `invalid_grant`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// The stored token has expired and cannot be refreshed.
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Invalid configuration (credentials file, token store, base URL).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The message id is not known to the source.
    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    /// The mail API answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The fetched message could not be digested.
    #[error(transparent)]
    Digest(#[from] maildigest_core::Error),

    /// Keyring access failed.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl Error {
    /// Creates an OAuth error from error code and description.
    #[must_use]
    pub fn oauth_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidConfig(format!("Invalid URL: {e}"))
    }
}
