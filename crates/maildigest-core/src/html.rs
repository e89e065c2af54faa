//! HTML to plain text reduction.
//!
//! Conversion is delegated to `htmd`, with handlers that keep inline
//! emphasis as plain text, render links per [`DigestOptions::omit_links`]
//! and lay out tables per [`DigestOptions::pretty_tables`]. A conversion
//! failure becomes the digest text instead of an error.

use crate::options::DigestOptions;
use htmd::{Element, HtmlToMarkdown};
use tracing::warn;

// Private markers threaded from cell/row handlers up to the table handler.
const ROW: char = '\u{1E}';
const CELL: char = '\u{1F}';
const HEADER: char = '\u{1D}';

/// Converts an HTML fragment to approximate plain text.
#[must_use]
pub fn reduce_html(html: &str, options: &DigestOptions) -> String {
    let converter = converter(options.omit_links, options.pretty_tables);
    match converter.convert(html) {
        Ok(text) => text.replace([ROW, CELL, HEADER], " "),
        Err(e) => {
            warn!(error = %e, "HTML conversion failed, using error text");
            e.to_string()
        }
    }
}

fn converter(omit_links: bool, pretty_tables: bool) -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .skip_tags(vec!["head", "title", "script", "style", "img", "svg"])
        .add_handler(
            vec!["b", "strong", "i", "em", "u"],
            |element: Element| -> Option<String> { Some(element.content.to_string()) },
        )
        .add_handler(vec!["a"], move |element: Element| -> Option<String> {
            Some(render_link(&element, omit_links))
        })
        .add_handler(vec!["td"], |element: Element| -> Option<String> {
            Some(format!("{CELL}{}", collapse_whitespace(element.content)))
        })
        .add_handler(vec!["th"], |element: Element| -> Option<String> {
            Some(format!("{CELL}{HEADER}{}", collapse_whitespace(element.content)))
        })
        .add_handler(vec!["tr"], |element: Element| -> Option<String> {
            Some(format!("{ROW}{}", element.content))
        })
        .add_handler(vec!["table"], move |element: Element| -> Option<String> {
            Some(render_table(element.content, pretty_tables))
        })
        .build()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_link(element: &Element, omit_links: bool) -> String {
    let text = element.content.trim();
    if omit_links {
        return text.to_string();
    }

    let href = element
        .attrs
        .iter()
        .find(|attr| &*attr.name.local == "href")
        .map(|attr| attr.value.trim().trim_start_matches("mailto:").to_string())
        .unwrap_or_default();

    if href.is_empty() || href == text {
        text.to_string()
    } else if text.is_empty() {
        href
    } else {
        format!("{text} ( {href} )")
    }
}

struct Row {
    header: bool,
    cells: Vec<String>,
}

fn parse_rows(content: &str) -> Vec<Row> {
    content
        .split(ROW)
        .skip(1)
        .filter_map(|segment| {
            let raw: Vec<&str> = segment.split(CELL).skip(1).collect();
            if raw.is_empty() {
                return None;
            }
            let header = raw.iter().all(|cell| cell.starts_with(HEADER));
            let cells = raw
                .iter()
                .map(|cell| cell.trim_start_matches(HEADER).trim().to_string())
                .collect();
            Some(Row { header, cells })
        })
        .collect()
}

fn render_table(content: &str, pretty: bool) -> String {
    let rows = parse_rows(content);
    if rows.is_empty() {
        return String::new();
    }

    let lines: Vec<String> = if pretty {
        let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
        let mut widths = vec![3; columns];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut lines = Vec::new();
        for row in &rows {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, width)| {
                    let cell = row.cells.get(i).map_or("", String::as_str);
                    format!("{cell:<width$}")
                })
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));
            if row.header {
                let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
                lines.push(format!("|-{}-|", rule.join("-|-")));
            }
        }
        lines
    } else {
        rows.iter()
            .map(|row| {
                row.cells
                    .iter()
                    .filter(|cell| !cell.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect()
    };

    format!("\n\n{}\n\n", lines.join("\n"))
}
