//! Transfer decoding primitives.
//!
//! Supports Base64 (standard and URL-safe alphabets) and Quoted-Printable.
//! Line breaks inside Base64 input are ignored, as mail bodies wrap encoded
//! data at 76 columns.

use crate::error::{Error, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use std::borrow::Cow;

/// URL-safe engine accepting input with or without trailing `=` padding.
const URL_SAFE_ANY_PADDING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Removes CR and LF so wrapped Base64 decodes as one run.
fn without_line_breaks(data: &str) -> Cow<'_, str> {
    if data.contains(['\r', '\n']) {
        Cow::Owned(data.chars().filter(|c| *c != '\r' && *c != '\n').collect())
    } else {
        Cow::Borrowed(data)
    }
}

/// Decodes Base64 data using the standard alphabet.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(without_line_breaks(data).as_bytes())
        .map_err(Into::into)
}

/// Decodes Base64 data using the URL-safe alphabet with required padding.
///
/// # Errors
///
/// Returns an error if the input is not valid URL-safe Base64.
pub fn decode_base64_url(data: &str) -> Result<Vec<u8>> {
    URL_SAFE
        .decode(without_line_breaks(data).as_bytes())
        .map_err(Into::into)
}

/// Decodes URL-safe Base64 where trailing padding may have been dropped.
///
/// Mail provider APIs commonly strip the padding from `base64url` payloads.
///
/// # Errors
///
/// Returns an error if the input is not valid URL-safe Base64.
pub fn decode_base64_url_unpadded(data: &str) -> Result<Vec<u8>> {
    URL_SAFE_ANY_PADDING
        .decode(without_line_breaks(data.trim()).as_bytes())
        .map_err(Into::into)
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// Soft line breaks (`=` before a line break, optionally followed by
/// transport padding) are removed. Bytes that do not form valid UTF-8 after
/// decoding are replaced with U+FFFD.
///
/// # Errors
///
/// Returns an error if the input contains an incomplete or non-hex escape
/// sequence.
pub fn decode_quoted_printable(text: &str) -> Result<String> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        if byte != b'=' {
            result.push(byte);
            i += 1;
            continue;
        }

        let rest = &bytes[i + 1..];
        let padding = rest
            .iter()
            .take_while(|b| **b == b' ' || **b == b'\t')
            .count();

        match &rest[padding..] {
            // Soft line break
            [b'\r', b'\n', ..] => i += 1 + padding + 2,
            [b'\n', ..] => i += 1 + padding + 1,
            // Soft break on the final line
            [] => i = bytes.len(),
            [hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                result.push((hex_value(*hi) << 4) | hex_value(*lo));
                i += 3;
            }
            [_, _, ..] => {
                let escape = String::from_utf8_lossy(&rest[..2]);
                return Err(Error::InvalidEncoding(format!(
                    "Invalid hex escape: ={escape}"
                )));
            }
            [_] => {
                return Err(Error::InvalidEncoding(
                    "Incomplete escape sequence".to_string(),
                ));
            }
        }
    }

    Ok(String::from_utf8_lossy(&result).into_owned())
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}
