//! Error types for digest operations.

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Digest error types.
///
/// Each variant names the pipeline stage that failed. Soft failures (HTML
/// conversion, base64 probing, unmatched quote boundaries) never surface
/// here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The raw message could not be split into a header block and body.
    #[error("Malformed message: {0}")]
    MalformedMessage(#[source] maildigest_mime::Error),

    /// A `multipart/*` content type without a usable boundary, or a media
    /// type that does not parse.
    #[error("Bad content type {content_type:?}: {source}")]
    BadContentType {
        /// The declared content type.
        content_type: String,
        /// Why it was rejected.
        #[source]
        source: maildigest_mime::Error,
    },

    /// A declared quoted-printable body failed to decode.
    #[error("Transfer decoding failed: {0}")]
    TransferDecode(#[source] maildigest_mime::Error),
}

impl Error {
    pub(crate) fn bad_content_type(
        content_type: impl Into<String>,
        source: maildigest_mime::Error,
    ) -> Self {
        Self::BadContentType {
            content_type: content_type.into(),
            source,
        }
    }
}
