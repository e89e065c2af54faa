//! Digest configuration.

use crate::limit::limit;

/// Options controlling how a message is reduced to a digest.
///
/// A limit of `0` means unlimited. The value is `Copy`; builder methods
/// return a modified copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[allow(clippy::struct_excessive_bools)] // Independent switches, clearer as bools
pub struct DigestOptions {
    /// Maximum number of body lines.
    pub line_limit: usize,
    /// Maximum characters per body line.
    pub col_limit: usize,
    /// Keep HTML bodies as-is instead of flattening them to text.
    pub skip_html: bool,
    /// Drop link targets when flattening HTML.
    pub omit_links: bool,
    /// Render HTML tables as aligned pipe tables.
    pub pretty_tables: bool,
    /// Keep lines without any alphabetic character.
    pub allow_non_letter_lines: bool,
}

impl DigestOptions {
    /// Creates options with no limits and every switch off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            line_limit: 0,
            col_limit: 0,
            skip_html: false,
            omit_links: false,
            pretty_tables: false,
            allow_non_letter_lines: false,
        }
    }

    /// Sets the maximum number of body lines.
    #[must_use]
    pub const fn with_line_limit(mut self, lines: usize) -> Self {
        self.line_limit = lines;
        self
    }

    /// Sets the maximum characters per line.
    #[must_use]
    pub const fn with_col_limit(mut self, cols: usize) -> Self {
        self.col_limit = cols;
        self
    }

    /// Keeps HTML bodies unconverted.
    #[must_use]
    pub const fn with_skip_html(mut self, skip: bool) -> Self {
        self.skip_html = skip;
        self
    }

    /// Drops link targets from converted HTML.
    #[must_use]
    pub const fn with_omit_links(mut self, omit: bool) -> Self {
        self.omit_links = omit;
        self
    }

    /// Renders HTML tables as aligned pipe tables.
    #[must_use]
    pub const fn with_pretty_tables(mut self, pretty: bool) -> Self {
        self.pretty_tables = pretty;
        self
    }

    /// Keeps lines that contain no letters.
    #[must_use]
    pub const fn with_allow_non_letter_lines(mut self, allow: bool) -> Self {
        self.allow_non_letter_lines = allow;
        self
    }

    /// Applies the configured line and column limits to `text`.
    #[must_use]
    pub fn limit(&self, text: &str) -> String {
        limit(text, self.line_limit, self.col_limit)
    }
}
