//! Summaries of messages whose MIME structure is already parsed.
//!
//! Some providers (the Gmail API "full" format, for one) hand out a part
//! tree rather than raw RFC 5322 text. [`summarize`] renders such a tree
//! with the same leaf rendering as the raw walker, but never fails: every
//! problem becomes a short line of text in the summary.

use crate::decode::transfer_decode;
use crate::options::DigestOptions;
use crate::walker::{render_text, walk};
use maildigest_mime::{ContentType, TransferEncoding};
use std::borrow::Cow;
use tracing::debug;

/// Separator between sibling summaries.
const SIBLING_SEPARATOR: &str = "\n---\n";

/// A node of a pre-parsed MIME tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MimePart {
    /// Declared content type, possibly with parameters.
    pub content_type: String,
    /// Declared `Content-Transfer-Encoding`.
    pub transfer_encoding: String,
    /// Part body. Empty when the content lives in `children`.
    pub body: String,
    /// Nested parts, in order.
    pub children: Vec<MimePart>,
}

impl MimePart {
    /// Creates a leaf part.
    #[must_use]
    pub fn leaf(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Creates a container part.
    #[must_use]
    pub fn multipart(content_type: impl Into<String>, children: Vec<Self>) -> Self {
        Self {
            content_type: content_type.into(),
            children,
            ..Self::default()
        }
    }

    /// Sets the transfer encoding.
    #[must_use]
    pub fn with_transfer_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.transfer_encoding = encoding.into();
        self
    }
}

/// A message as returned by a part-tree provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TreeMessage {
    /// The `From` header.
    pub from: String,
    /// The `Subject` header.
    pub subject: String,
    /// Provider generated preview, used when there is no payload.
    pub snippet: String,
    /// Root of the part tree.
    pub payload: Option<MimePart>,
}

/// Summarizes a pre-parsed message.
///
/// Returns the snippet when the message has no payload. Otherwise returns
/// `From:` and `Subject:` lines (always present, possibly empty) followed
/// by the limited body with `padding` prefixed to every line.
#[must_use]
pub fn summarize(message: &TreeMessage, options: &DigestOptions, padding: &str) -> String {
    let Some(payload) = &message.payload else {
        return message.snippet.clone();
    };

    let body = options.limit(&summarize_part(payload, options));
    format!(
        "From: {}\nSubject: {}\n{}\n",
        message.from,
        message.subject,
        pad(&body, padding)
    )
}

fn summarize_part(part: &MimePart, options: &DigestOptions) -> String {
    let content_type = part.content_type.trim();
    let has_body = !part.body.trim().is_empty();

    if is_multipart(content_type) {
        if has_body {
            return walk(&part.body, content_type, &part.transfer_encoding, options)
                .unwrap_or_else(|e| e.to_string());
        }
        if content_type.to_lowercase().contains("multipart/alternative") {
            return part
                .children
                .iter()
                .filter(|child| is_text(&child.content_type) || is_multipart(&child.content_type))
                .map(|child| summarize_part(child, options))
                .find(|text| !text.is_empty())
                .unwrap_or_else(|| skipped(content_type));
        }
        return summarize_children(part, options);
    }

    if !is_text(content_type) {
        return skipped(content_type);
    }
    if !has_body {
        return summarize_children(part, options);
    }

    render_leaf(part, options)
}

fn summarize_children(part: &MimePart, options: &DigestOptions) -> String {
    part.children
        .iter()
        .map(|child| summarize_part(child, options))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(SIBLING_SEPARATOR)
}

fn render_leaf(part: &MimePart, options: &DigestOptions) -> String {
    let encoding = part.transfer_encoding.trim();
    if TransferEncoding::parse(encoding).is_none() {
        return format!("unknown content-transfer-encoding {}", encoding.to_lowercase());
    }

    let body = part.body.trim();
    let text = match transfer_decode(body, encoding) {
        Ok(text) => Cow::Owned(text),
        Err(e) => {
            debug!(error = %e, "keeping undecodable body as-is");
            Cow::Borrowed(body)
        }
    };
    render_text(&text, &part.content_type, options)
}

fn skipped(content_type: &str) -> String {
    format!("(skipped {content_type})")
}

fn is_multipart(content_type: &str) -> bool {
    content_type.to_lowercase().contains("multipart/")
}

/// An absent type counts as text. An unparseable one does not.
fn is_text(content_type: &str) -> bool {
    let content_type = content_type.trim();
    content_type.is_empty() || ContentType::parse(content_type).is_ok_and(|ct| ct.is_text())
}

fn pad(text: &str, padding: &str) -> String {
    if text.is_empty() || padding.is_empty() {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| format!("{padding}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
