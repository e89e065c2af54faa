//! Multipart body splitting (RFC 2046 section 5.1).
//!
//! The splitter is an iterator over the body parts between delimiter lines.
//! Preamble and epilogue text are ignored. The first error ends iteration:
//! a malformed part header or a body that stops before its closing
//! delimiter means the rest of the stream cannot be trusted.

use crate::error::{Error, Result};
use crate::message::Part;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    /// `--boundary`
    Next,
    /// `--boundary--`
    Close,
}

/// Iterator over the parts of a multipart body.
#[derive(Debug)]
pub struct Multipart<'a> {
    body: &'a str,
    delimiter: String,
    pos: usize,
    started: bool,
    done: bool,
}

impl<'a> Multipart<'a> {
    /// Creates a splitter for `body` using the given boundary parameter.
    #[must_use]
    pub fn new(body: &'a str, boundary: &str) -> Self {
        Self {
            body,
            delimiter: format!("--{boundary}"),
            pos: 0,
            started: false,
            done: false,
        }
    }

    fn delimiter_kind(&self, line: &str) -> Option<Delimiter> {
        let rest = line.strip_prefix(self.delimiter.as_str())?;
        match rest.trim_end_matches([' ', '\t', '\r', '\n']) {
            "" => Some(Delimiter::Next),
            "--" => Some(Delimiter::Close),
            _ => None,
        }
    }

    /// Advances past the preamble to just after the first delimiter line.
    fn skip_preamble(&mut self) -> bool {
        let body = self.body;
        let mut line_start = 0;

        for line in body.split_inclusive('\n') {
            let line_end = line_start + line.len();
            match self.delimiter_kind(line) {
                Some(Delimiter::Next) => {
                    self.pos = line_end;
                    return true;
                }
                Some(Delimiter::Close) => return false,
                None => line_start = line_end,
            }
        }

        trace!(delimiter = %self.delimiter, "no multipart delimiter found");
        false
    }
}

impl Iterator for Multipart<'_> {
    type Item = Result<Part>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            if !self.skip_preamble() {
                self.done = true;
                return None;
            }
        }

        let body = self.body;
        let part_start = self.pos;
        let mut line_start = part_start;

        for line in body[part_start..].split_inclusive('\n') {
            let line_end = line_start + line.len();

            if let Some(kind) = self.delimiter_kind(line) {
                let content = strip_line_break(&body[part_start..line_start]);
                self.pos = line_end;
                self.done = kind == Delimiter::Close;

                let part = Part::parse(content);
                if part.is_err() {
                    self.done = true;
                }
                return Some(part);
            }

            line_start = line_end;
        }

        self.done = true;
        Some(Err(Error::InvalidMultipart(
            "Body ended before the closing boundary".to_string(),
        )))
    }
}

/// Removes the line break that belongs to the following delimiter line.
fn strip_line_break(content: &str) -> &str {
    content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .unwrap_or(content)
}
