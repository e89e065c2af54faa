//! Whole-message digests.

use crate::error::{Error, Result};
use crate::options::DigestOptions;
use crate::walker::digest_body;
use maildigest_mime::Message;

/// Formats a raw RFC 5322 message as a digest.
///
/// The digest is an optional `From:` line, an optional `Subject:` line and
/// the reduced body. Header values are copied verbatim; encoded words are
/// not decoded.
///
/// # Errors
///
/// Returns [`Error::MalformedMessage`] if the header block cannot be
/// parsed, or any error from [`digest_body`] for the top-level body.
///
/// # Example
///
/// ```
/// use maildigest_core::{DigestOptions, digest_message};
///
/// let raw = "From: bob@example.com\r\nSubject: Lunch\r\n\r\nSee you at noon\r\n";
/// let digest = digest_message(raw, &DigestOptions::default()).unwrap();
/// assert_eq!(digest, "From: bob@example.com\nSubject: Lunch\nSee you at noon");
/// ```
pub fn digest_message(raw: &str, options: &DigestOptions) -> Result<String> {
    let message = Message::parse(raw).map_err(Error::MalformedMessage)?;

    let mut digest = String::new();
    if let Some(from) = message.from().filter(|v| !v.is_empty()) {
        digest.push_str("From: ");
        digest.push_str(from);
        digest.push('\n');
    }
    if let Some(subject) = message.subject().filter(|v| !v.is_empty()) {
        digest.push_str("Subject: ");
        digest.push_str(subject);
        digest.push('\n');
    }

    let body = digest_body(
        message.body(),
        message.content_type(),
        message.transfer_encoding(),
        options,
    )?;
    digest.push_str(&body);
    Ok(digest)
}
