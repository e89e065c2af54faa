//! Transfer decoding of part bodies.
//!
//! Senders often mislabel or omit `Content-Transfer-Encoding`, so every body
//! is first probed as base64 (URL-safe alphabet, then standard). A failed
//! probe silently keeps the text. Only a declared quoted-printable encoding
//! is then honored, and its failure is a hard error.
//!
//! Known limitation: short alphanumeric plain-text bodies that happen to be
//! valid base64 and decode to valid UTF-8 are decoded anyway.

use crate::error::{Error, Result};
use maildigest_mime::TransferEncoding;
use maildigest_mime::encoding::{decode_base64, decode_base64_url, decode_quoted_printable};
use std::borrow::Cow;
use tracing::trace;

/// Reverses the transfer encoding of `body`.
///
/// # Errors
///
/// Returns [`Error::TransferDecode`] if `transfer_encoding` is
/// `quoted-printable` (any case) and the body contains a malformed escape.
pub fn transfer_decode(body: &str, transfer_encoding: &str) -> Result<String> {
    let mut text = Cow::Borrowed(body);

    if let Some(decoded) = probe_base64(&text, decode_base64_url) {
        trace!("body decoded as URL-safe base64");
        text = Cow::Owned(decoded);
    }
    if let Some(decoded) = probe_base64(&text, decode_base64) {
        trace!("body decoded as standard base64");
        text = Cow::Owned(decoded);
    }

    if TransferEncoding::parse(transfer_encoding) == Some(TransferEncoding::QuotedPrintable) {
        return decode_quoted_printable(&text).map_err(Error::TransferDecode);
    }

    Ok(text.into_owned())
}

/// Attempts a base64 decode, accepting the result only if it is UTF-8.
fn probe_base64(text: &str, decode: fn(&str) -> maildigest_mime::Result<Vec<u8>>) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let bytes = decode(text).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_untouched() {
        let body = "Hello there, this is plain text.";
        assert_eq!(transfer_decode(body, "").unwrap(), body);
        assert_eq!(transfer_decode(body, "7bit").unwrap(), body);
    }

    #[test]
    fn test_base64_probe_standard() {
        assert_eq!(transfer_decode("PGI+aGk8L2I+", "").unwrap(), "<b>hi</b>");
    }

    #[test]
    fn test_base64_probe_url_safe() {
        assert_eq!(transfer_decode("PDw_Pz4-", "").unwrap(), "<<??>>");
    }

    #[test]
    fn test_base64_probe_wrapped_body() {
        let body = "SGVsbG8sIFdv\r\ncmxkIQ==\r\n";
        assert_eq!(transfer_decode(body, "base64").unwrap(), "Hello, World!");
    }

    #[test]
    fn test_base64_probe_ignores_declared_encoding() {
        // Declared 8bit, but the body is base64 anyway
        assert_eq!(transfer_decode("SGVsbG8=", "8bit").unwrap(), "Hello");
    }

    #[test]
    fn test_base64_probe_rejects_binary() {
        // Valid base64, but the decoded bytes are not UTF-8
        assert_eq!(transfer_decode("/w==", "").unwrap(), "/w==");
    }

    #[test]
    fn test_quoted_printable() {
        let body = "caf=C3=A9 au lait=\r\n, s'il vous pla=C3=AEt";
        assert_eq!(
            transfer_decode(body, "Quoted-Printable").unwrap(),
            "café au lait, s'il vous plaît"
        );
    }

    #[test]
    fn test_base64_then_quoted_printable() {
        // base64 of "caf=C3=A9"
        assert_eq!(
            transfer_decode("Y2FmPUMzPUE5", "quoted-printable").unwrap(),
            "café"
        );
    }

    #[test]
    fn test_quoted_printable_failure_is_error() {
        let err = transfer_decode("broken =ZZ escape", "quoted-printable").unwrap_err();
        assert!(matches!(err, Error::TransferDecode(_)));
    }

    #[test]
    fn test_unknown_encoding_is_noop() {
        assert_eq!(transfer_decode("a=ZZ b", "x-custom").unwrap(), "a=ZZ b");
    }
}
