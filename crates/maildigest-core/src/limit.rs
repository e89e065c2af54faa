//! Line and column limits for digest text.

/// Keeps at most `line_limit` lines of `text`, each cut to at most
/// `col_limit` characters. A limit of `0` disables that bound.
///
/// Cuts are hard: no ellipsis is added. Columns count `char`s, not bytes.
#[must_use]
pub fn limit(text: &str, line_limit: usize, col_limit: usize) -> String {
    if line_limit == 0 && col_limit == 0 {
        return text.to_string();
    }

    let max_lines = if line_limit == 0 { usize::MAX } else { line_limit };
    text.split('\n')
        .take(max_lines)
        .map(|line| truncate_chars(line, col_limit))
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(line: &str, col_limit: usize) -> &str {
    if col_limit == 0 {
        return line;
    }
    line.char_indices()
        .nth(col_limit)
        .map_or(line, |(idx, _)| &line[..idx])
}
