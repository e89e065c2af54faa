//! Removal of quoted replies, forwarded messages and noise lines.
//!
//! Mail clients mark the start of quoted or forwarded content in many
//! different ways. All known boundary signatures are compiled into a single
//! alternation so the earliest boundary in the text wins, whichever
//! signature it is. Every signature must start at the beginning of a line
//! and run to the end of a line.

use crate::options::DigestOptions;
use regex::Regex;
use std::sync::LazyLock;

/// Boundary signatures, matched case-insensitively.
const BOUNDARY_SIGNATURES: &[&str] = &[
    // From: <email>, possibly quoted as >From:
    r">?\s*from:.*[a-z0-9]+@[a-z0-9]+.*",
    // gmail style reply: 2019/5/14 Someone <someone@example.com>
    r"[0-9]{4}/[0-9]{1,2}/[0-9]{1,2} .* <\s*\S+@\S+\s*>",
    // someone@example.com wrote:
    r".*[a-z0-9]@[a-z0-9].*wrote:[ \t]*",
    // On <date>, <someone> wrote:  (may wrap over several lines)
    r"on\s[\s\S]*?wrote[^\n]*:",
    // Outlook web separator
    r"_{4,}",
    // Begin forwarded message:
    r".*forwarded\s+message:",
    r".*original\s+message:",
    // ---------- Forwarded message ---------
    r"-+\s*forwarded\s+message\s*-+",
    // -----Original Message-----
    r"-+\s*original\s+message\s*-+",
];

#[allow(clippy::expect_used)] // Constant pattern, covered by tests
static BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)(?:^|\n)(?:{})(?:$|\r|\n)",
        BOUNDARY_SIGNATURES.join("|")
    );
    Regex::new(&pattern).expect("boundary signatures compile")
});

/// Strips quoted/forwarded content and noise lines from `text`.
///
/// Content from the earliest boundary signature onwards is dropped, then
/// [`remove_noise`] is applied. A message made only of quoted content
/// yields an empty string.
#[must_use]
pub fn strip_quoted(text: &str, options: &DigestOptions) -> String {
    remove_noise(truncate_at_boundary(text), options.allow_non_letter_lines)
}

/// Returns the trimmed text preceding the earliest boundary signature, or
/// the whole trimmed text if there is none.
#[must_use]
pub fn truncate_at_boundary(text: &str) -> &str {
    BOUNDARY_RE
        .find(text)
        .map_or(text, |m| &text[..m.start()])
        .trim()
}

/// Trims every line and keeps only lines longer than three characters that
/// contain a letter (or any such line when `allow_non_letter_lines`).
#[must_use]
pub fn remove_noise(text: &str, allow_non_letter_lines: bool) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| {
            line.chars().count() > 3
                && (allow_non_letter_lines || line.chars().any(char::is_alphabetic))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SIGNATURES: &[&str] = &[
        "From: Bob <bob@example.com>",
        "> From: bob@example.com",
        "2019/5/14 Bob Smith <bob@example.com>",
        "bob@example.com wrote:",
        "On Mon, Jan 6, 2020 at 9:00 AM Bob <bob@example.com> wrote:",
        "________________________________",
        "Begin forwarded message:",
        "-----Original Message-----",
        "---------- Forwarded message ---------",
        "----- Original Message -----",
    ];

    fn strip(text: &str) -> String {
        strip_quoted(text, &DigestOptions::default())
    }

    #[test]
    fn test_on_wrote_reply() {
        let text = "Hi there\n\nOn Jan 1, 2020, Bob <bob@x.com> wrote:\n> old stuff";
        assert_eq!(strip(text), "Hi there");
    }

    #[test]
    fn test_on_wrote_wrapped_over_lines() {
        let text = "Sounds good\n\nOn Mon, Jan 6, 2020 at 9:00 AM Bob Smith\n<bob@example.com> wrote:\n\n> earlier";
        assert_eq!(strip(text), "Sounds good");
    }

    #[test]
    fn test_every_signature_truncates() {
        for signature in SIGNATURES {
            let text = format!("Reply text\n{signature}\nquoted text");
            assert_eq!(strip(&text), "Reply text", "signature: {signature}");
        }
    }

    #[test]
    fn test_signature_at_start_empties_text() {
        let text = "-----Original Message-----\nFrom: a@b.com\nold text";
        assert_eq!(strip(text), "");
    }

    #[test]
    fn test_signature_must_own_its_line() {
        let text = "I spoke to bob@example.com and he wrote: fine by me\nSecond line here";
        assert_eq!(strip(text), text);

        let text = "Please see the ---- forwarded message ---- below, thanks";
        assert_eq!(strip(text), text);
    }

    #[test]
    fn test_on_requires_a_word_boundary() {
        let text = "Only one thing\nthe list wrote: many notes\nKeep this";
        assert_eq!(strip(text), "Only one thing\nthe list wrote: many notes\nKeep this");
    }

    #[test]
    fn test_case_insensitive() {
        let text = "Thanks!\nFROM: ALICE <ALICE@EXAMPLE.COM>\nold";
        assert_eq!(strip(text), "Thanks!");
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "Reply here\r\n\r\nOn Tue, Alice wrote:\r\n> quoted\r\n";
        assert_eq!(strip(text), "Reply here");
    }

    #[test]
    fn test_noise_removal() {
        let text = "  Hello  \n\n--\n1234\n>>\nok\n  real line  ";
        assert_eq!(strip(text), "Hello\nreal line");
    }

    #[test]
    fn test_noise_removal_allow_non_letter_lines() {
        let options = DigestOptions::new().with_allow_non_letter_lines(true);
        let text = "Hello\n1234\n--\n*****";
        assert_eq!(strip_quoted(text, &options), "Hello\n1234\n*****");
    }

    #[test]
    fn test_non_ascii_letters_count() {
        assert_eq!(remove_noise("日本語です\n€€€€", false), "日本語です");
    }

    #[test]
    fn test_clean_text_round_trips() {
        let text = "Hello team\nThe build is green again\n--\n...\nCheers everyone";
        assert_eq!(
            strip(text),
            "Hello team\nThe build is green again\nCheers everyone"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(strip(""), "");
    }

    proptest! {
        #[test]
        fn prop_noise_removal_is_idempotent(text in "\\PC{0,200}", allow in any::<bool>()) {
            let once = remove_noise(&text, allow);
            prop_assert_eq!(remove_noise(&once, allow), once.clone());
        }

        #[test]
        fn prop_noise_removal_is_idempotent_multiline(
            lines in prop::collection::vec("[ \t]{0,2}[a-z0-9>*-]{0,8}[ \t\r]{0,2}", 0..12),
            allow in any::<bool>(),
        ) {
            let text = lines.join("\n");
            let once = remove_noise(&text, allow);
            prop_assert_eq!(remove_noise(&once, allow), once.clone());
        }

        #[test]
        fn prop_clean_text_only_loses_noise(
            lines in prop::collection::vec(
                prop_oneof!["[a-z]{1,8}( [a-z]{1,8}){0,4}", "[ *.=]{0,3}"],
                0..12,
            ),
        ) {
            let text = lines.join("\n");
            prop_assert_eq!(strip(&text), remove_noise(&text, false));
        }

        #[test]
        fn prop_earliest_boundary_wins(
            first in prop::sample::select(SIGNATURES),
            second in prop::sample::select(SIGNATURES),
        ) {
            let text = format!("Intro text here\n{first}\nmiddle words\n{second}\ntail words");
            prop_assert_eq!(strip(&text), "Intro text here");
        }
    }
}
