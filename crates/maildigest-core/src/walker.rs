//! Recursive MIME traversal.
//!
//! Each level transfer-decodes its body, then either splits it as a
//! multipart and recurses into the children, or renders it as a text leaf.
//! Children with a bad content type are skipped. A child that cannot be
//! read or decoded ends the scan of its parent, keeping the text gathered
//! so far.

use crate::decode::transfer_decode;
use crate::error::{Error, Result};
use crate::html::reduce_html;
use crate::options::DigestOptions;
use crate::quote::strip_quoted;
use maildigest_mime::{ContentType, Multipart};
use std::borrow::Cow;
use tracing::{debug, trace, warn};

/// Separator between the texts of sibling parts.
const PART_SEPARATOR: &str = "\n\n";

/// Reduces a raw body with its declared content type and transfer encoding
/// to digest text, applying the configured size limits.
///
/// `body` may be the raw body or a base64 encoding of it.
///
/// # Errors
///
/// Returns [`Error::BadContentType`] for a `multipart/*` type without a
/// usable boundary and [`Error::TransferDecode`] for a broken
/// quoted-printable body.
pub fn digest_body(
    body: &str,
    content_type: &str,
    transfer_encoding: &str,
    options: &DigestOptions,
) -> Result<String> {
    let text = walk(body, content_type, transfer_encoding, options)?;
    Ok(options.limit(&text))
}

/// Walks one MIME level without applying size limits.
pub(crate) fn walk(
    body: &str,
    content_type: &str,
    transfer_encoding: &str,
    options: &DigestOptions,
) -> Result<String> {
    let body = transfer_decode(body, transfer_encoding)?;

    if content_type.to_lowercase().contains("multipart/") {
        return walk_multipart(&body, content_type, options);
    }

    if !is_textual(content_type) {
        debug!(content_type, "skipping non-text part");
        return Ok(String::new());
    }

    Ok(render_text(&body, content_type, options))
}

fn walk_multipart(body: &str, content_type: &str, options: &DigestOptions) -> Result<String> {
    let parsed = ContentType::parse(content_type)
        .map_err(|e| Error::bad_content_type(content_type, e))?;
    if !parsed.is_multipart() {
        return Err(Error::bad_content_type(
            content_type,
            maildigest_mime::Error::InvalidContentType(format!(
                "Not a multipart type: {}",
                parsed.mime_type()
            )),
        ));
    }
    let boundary = parsed
        .require_boundary()
        .map_err(|e| Error::bad_content_type(content_type, e))?;

    let mut texts = Vec::new();
    for part in Multipart::new(body, boundary) {
        let part = match part {
            Ok(part) => part,
            Err(e) => {
                warn!(error = %e, boundary, "stopping multipart scan");
                break;
            }
        };

        match walk(&part.body, part.content_type(), part.transfer_encoding(), options) {
            Ok(text) if text.is_empty() => {
                trace!(content_type = part.content_type(), "part produced no text");
            }
            Ok(text) => texts.push(text),
            Err(e @ Error::TransferDecode(_)) => {
                warn!(error = %e, boundary, "stopping multipart scan");
                break;
            }
            Err(e) => {
                debug!(error = %e, content_type = part.content_type(), "skipping part");
            }
        }
    }

    if parsed.sub_type == "alternative" && !texts.is_empty() {
        return Ok(texts.swap_remove(0));
    }
    Ok(texts.join(PART_SEPARATOR))
}

/// True for text types and for an absent or unparseable declaration,
/// which mail readers treat as `text/plain`.
fn is_textual(content_type: &str) -> bool {
    if content_type.trim().is_empty() {
        return true;
    }
    ContentType::parse(content_type).map_or(true, |ct| ct.is_text())
}

/// Renders an already-decoded text leaf: HTML flattening (unless skipped)
/// followed by quote stripping.
pub(crate) fn render_text(body: &str, content_type: &str, options: &DigestOptions) -> String {
    let text = if !options.skip_html && content_type.to_lowercase().contains("text/html") {
        Cow::Owned(reduce_html(body, options))
    } else {
        Cow::Borrowed(body)
    };
    strip_quoted(&text, options)
}
