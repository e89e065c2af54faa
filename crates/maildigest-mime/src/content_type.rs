//! MIME content type handling.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart"), lowercased.
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "alternative"), lowercased.
    pub sub_type: String,
    /// Parameters keyed by lowercased name (e.g., charset, boundary).
    pub parameters: HashMap<String, String>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: HashMap::new(),
        }
    }

    /// Returns the `type/subtype` pair without parameters.
    #[must_use]
    pub fn mime_type(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Returns the boundary parameter if present and non-empty.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters
            .get("boundary")
            .map(String::as_str)
            .filter(|b| !b.is_empty())
    }

    /// Returns the boundary of a multipart content type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBoundary`] if the parameter is absent or empty.
    pub fn require_boundary(&self) -> Result<&str> {
        self.boundary().ok_or(Error::MissingBoundary)
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type == "multipart"
    }

    /// Checks if this is a text content type.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.main_type == "text"
    }

    /// Parses a content type string.
    ///
    /// Format: `type/subtype; param1=value1; param2="quoted; value"`
    ///
    /// Parameter values may be quoted strings with backslash escapes.
    /// Parameters without a value are ignored; for repeated names the first
    /// occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the `type/subtype` pair is missing or malformed.
    pub fn parse(s: &str) -> Result<Self> {
        let (type_str, rest) = s.split_once(';').unwrap_or((s, ""));
        let type_str = type_str.trim();

        if type_str.is_empty() {
            return Err(Error::InvalidContentType("Empty content type".to_string()));
        }

        let (main_type, sub_type) = type_str
            .split_once('/')
            .ok_or_else(|| Error::InvalidContentType(format!("Missing subtype: {type_str}")))?;

        let main_type = main_type.trim();
        let sub_type = sub_type.trim();
        if !is_token(main_type) || !is_token(sub_type) {
            return Err(Error::InvalidContentType(format!(
                "Malformed media type: {type_str}"
            )));
        }

        let mut content_type = Self::new(main_type.to_lowercase(), sub_type.to_lowercase());
        parse_parameters(rest, &mut content_type.parameters);
        Ok(content_type)
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c))
}

fn parse_parameters(mut rest: &str, parameters: &mut HashMap<String, String>) {
    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if rest.is_empty() {
            return;
        }

        let Some(idx) = rest.find(['=', ';']) else {
            return;
        };
        if rest[idx..].starts_with(';') {
            rest = &rest[idx..];
            continue;
        }

        let key = rest[..idx].trim().to_lowercase();
        rest = rest[idx + 1..].trim_start();

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let (value, consumed) = unquote(quoted);
            rest = &quoted[consumed..];
            value
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let value = rest[..end].trim().to_string();
            rest = &rest[end..];
            value
        };

        if !key.is_empty() {
            parameters.entry(key).or_insert(value);
        }
    }
}

/// Reads a quoted string body (after the opening quote), returning the
/// unescaped value and the number of bytes consumed including the closing
/// quote.
fn unquote(s: &str) -> (String, usize) {
    let mut value = String::new();
    let mut chars = s.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return (value, i + 1),
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    value.push(escaped);
                }
            }
            _ => value.push(c),
        }
    }

    (value, s.len())
}
