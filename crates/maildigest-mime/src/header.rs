//! MIME header handling.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Collection of email headers, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        let value = value.into();
        self.headers.entry(name).or_default().push(value);
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Gets the first value for a header, or `""` if absent.
    #[must_use]
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    /// Returns true if no headers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Parses a header block from the start of `text`.
    ///
    /// The block ends at the first empty line or at the end of input.
    /// Folded continuation lines (starting with space or tab) are joined to
    /// the previous value with a single space. Returns the headers and the
    /// byte offset at which the body begins.
    ///
    /// ```text
    /// Header-Name: value
    ///  continuation
    ///
    /// body...
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if a line in the block is neither a `Name: value`
    /// field nor a continuation of one.
    pub fn parse(text: &str) -> Result<(Self, usize)> {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;
        let mut offset = 0;

        for raw_line in text.split_inclusive('\n') {
            offset += raw_line.len();
            let line = raw_line.trim_end_matches(['\r', '\n']);

            if line.is_empty() {
                if let Some((name, value)) = current.take() {
                    headers.add(name, value);
                }
                return Ok((headers, offset));
            }

            if line.starts_with([' ', '\t']) {
                let Some((_, value)) = current.as_mut() else {
                    return Err(Error::InvalidHeader(format!(
                        "Continuation without a header: {line}"
                    )));
                };
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line.trim());
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value);
            }

            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::InvalidHeader(format!("Malformed header line: {line}")))?;
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(Error::InvalidHeader(format!("Malformed header name: {name}")));
            }
            current = Some((name.to_string(), value.trim().to_string()));
        }

        if let Some((name, value)) = current {
            headers.add(name, value);
        }

        Ok((headers, text.len()))
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
    fn test_headers_new() {
        let headers = Headers::new();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_headers_add_get() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");
        assert_eq!(headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(headers.get("content-type"), Some("text/plain")); // Case insensitive
        assert_eq!(headers.get_or_empty("Subject"), "");
    }

    #[test]
    fn test_headers_first_value_wins() {
        let mut headers = Headers::new();
        headers.add("Received", "one");
        headers.add("Received", "two");
        assert_eq!(headers.get("received"), Some("one"));
    }

    #[test]
    fn test_headers_parse() {
        let text = concat!(
            "From: sender@example.com\r\n",
            "To: recipient@example.com\r\n",
            "Subject: Test Message\r\n",
            "Content-Type: text/plain;\r\n",
            " charset=utf-8\r\n",
            "\r\n",
            "Body"
        );

        let (headers, offset) = Headers::parse(text).unwrap();
        assert_eq!(headers.get("From"), Some("sender@example.com"));
        assert_eq!(headers.get("To"), Some("recipient@example.com"));
        assert_eq!(headers.get("Subject"), Some("Test Message"));
        assert_eq!(
            headers.get("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(&text[offset..], "Body");
    }

    #[test]
    fn test_headers_parse_without_body() {
        let text = "Subject: Only headers\n";
        let (headers, offset) = Headers::parse(text).unwrap();
        assert_eq!(headers.get("subject"), Some("Only headers"));
        assert_eq!(offset, text.len());
    }

    #[test]
    fn test_headers_parse_empty_block() {
        let (headers, offset) = Headers::parse("\r\nHello").unwrap();
        assert!(headers.is_empty());
        assert_eq!(offset, 2);
    }

    #[test]
    fn test_headers_parse_malformed() {
        assert!(matches!(
            Headers::parse("Hi there\n\nBody"),
            Err(Error::InvalidHeader(_))
        ));
        assert!(matches!(
            Headers::parse(" folded first\n\n"),
            Err(Error::InvalidHeader(_))
        ));
        assert!(matches!(
            Headers::parse("Bad Name: value\n\n"),
            Err(Error::InvalidHeader(_))
        ));
    }
}
