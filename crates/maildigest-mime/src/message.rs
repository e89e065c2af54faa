//! Message and body-part framing.

use crate::error::{Error, Result};
use crate::header::Headers;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit text.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses a transfer encoding name, case-insensitively.
    ///
    /// An empty value means the RFC 2045 default (7bit). Returns `None`
    /// for unrecognized encodings.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "7bit" => Some(Self::SevenBit),
            "8bit" => Some(Self::EightBit),
            "base64" => Some(Self::Base64),
            "quoted-printable" => Some(Self::QuotedPrintable),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// A header block followed by a body, the shape shared by whole messages
/// and the parts of a multipart body.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Raw part body, still transfer-encoded.
    pub body: String,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: String) -> Self {
        Self { headers, body }
    }

    /// Splits `text` into its header block and body.
    ///
    /// # Errors
    ///
    /// Returns an error if the header block is malformed.
    pub fn parse(text: &str) -> Result<Self> {
        let (headers, offset) = Headers::parse(text)?;
        Ok(Self::new(headers, text[offset..].to_string()))
    }

    /// The declared `Content-Type` value, or `""` when absent.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.headers.get_or_empty("content-type")
    }

    /// The declared `Content-Transfer-Encoding` value, or `""` when absent.
    #[must_use]
    pub fn transfer_encoding(&self) -> &str {
        self.headers.get_or_empty("content-transfer-encoding")
    }
}

/// A complete mail message: top-level headers and the raw body.
#[derive(Debug, Clone)]
pub struct Message {
    part: Part,
}

impl Message {
    /// Parses a raw message using header/blank-line/body framing.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or the header block cannot be
    /// parsed.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::InvalidHeader("Empty message".to_string()));
        }
        Ok(Self {
            part: Part::parse(raw)?,
        })
    }

    /// Message headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.part.headers
    }

    /// Raw message body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.part.body
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.part.headers.get("from")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.part.headers.get("subject")
    }

    /// The declared top-level `Content-Type`, or `""` when absent.
    #[must_use]
    pub fn content_type(&self) -> &str {
        self.part.content_type()
    }

    /// The declared top-level `Content-Transfer-Encoding`, or `""`.
    #[must_use]
    pub fn transfer_encoding(&self) -> &str {
        self.part.transfer_encoding()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_encoding_parse() {
        assert_eq!(TransferEncoding::parse("7bit"), Some(TransferEncoding::SevenBit));
        assert_eq!(TransferEncoding::parse(""), Some(TransferEncoding::SevenBit));
        assert_eq!(TransferEncoding::parse("BASE64"), Some(TransferEncoding::Base64));
        assert_eq!(
            TransferEncoding::parse(" Quoted-Printable "),
            Some(TransferEncoding::QuotedPrintable)
        );
        assert_eq!(TransferEncoding::parse("x-uuencode"), None);
    }

    #[test]
    fn test_part_parse() {
        let part = Part::parse(concat!(
            "Content-Type: text/plain\r\n",
            "Content-Transfer-Encoding: quoted-printable\r\n",
            "\r\n",
            "Hello"
        ))
        .unwrap();
        assert_eq!(part.content_type(), "text/plain");
        assert_eq!(part.transfer_encoding(), "quoted-printable");
        assert_eq!(part.body, "Hello");
    }

    #[test]
    fn test_part_without_headers() {
        let part = Part::parse("\nJust a body").unwrap();
        assert_eq!(part.content_type(), "");
        assert_eq!(part.body, "Just a body");
    }

    #[test]
    fn test_message_parse() {
        let message = Message::parse(concat!(
            "From: sender@example.com\r\n",
            "Subject: Test\r\n",
            "\r\n",
            "Hello, World!"
        ))
        .unwrap();

        assert_eq!(message.from(), Some("sender@example.com"));
        assert_eq!(message.subject(), Some("Test"));
        assert_eq!(message.content_type(), "");
        assert_eq!(message.body(), "Hello, World!");
        assert!(message.headers().get("to").is_none());
    }

    #[test]
    fn test_message_parse_errors() {
        assert!(Message::parse("").is_err());
        assert!(Message::parse("  \r\n").is_err());
        assert!(Message::parse("not a header\n\nbody").is_err());
    }
}
