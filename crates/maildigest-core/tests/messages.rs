//! End-to-end digests of complete messages.
//!
//! Each fixture under `tests/fixtures/` is a full RFC 5322 message as a
//! mail client would deliver it.

use maildigest_core::{DigestOptions, Error, digest_body, digest_message};

const REPLY_CHAIN: &str = include_str!("fixtures/reply_chain.eml");
const FORWARD: &str = include_str!("fixtures/forward.eml");
const OUTLOOK: &str = include_str!("fixtures/outlook.eml");
const ALTERNATIVE: &str = include_str!("fixtures/alternative.eml");
const HTML_BASE64: &str = include_str!("fixtures/html_base64.eml");
const NESTED: &str = include_str!("fixtures/nested.eml");

fn digest(raw: &str) -> String {
    digest_message(raw, &DigestOptions::default()).unwrap()
}

#[test]
fn test_reply_chain() {
    assert_eq!(
        digest(REPLY_CHAIN),
        "From: Carol Jones <carol@example.org>\n\
         Subject: Re: Offsite agenda\n\
         Works for me. I'll book the room for Thursday afternoon and send a calendar invite once it is confirmed.\n\
         Thanks,\n\
         Carol"
    );
}

#[test]
fn test_reply_chain_with_limits() {
    let options = DigestOptions::new().with_line_limit(2).with_col_limit(20);
    assert_eq!(
        digest_message(REPLY_CHAIN, &options).unwrap(),
        "From: Carol Jones <carol@example.org>\n\
         Subject: Re: Offsite agenda\n\
         Works for me. I'll b\n\
         Thanks,"
    );
}

#[test]
fn test_forward() {
    assert_eq!(
        digest(FORWARD),
        "From: Erin <erin@example.net>\n\
         Subject: Fwd: Invoice 2291\n\
         FYI, see the invoice details below. Can you approve it by Friday?"
    );
}

#[test]
fn test_outlook_separator() {
    assert_eq!(
        digest(OUTLOOK),
        "From: Frank <frank@example.com>\n\
         Subject: RE: Purchase request\n\
         Approved, go ahead with the purchase.\n\
         Regards\n\
         Frank"
    );
}

#[test]
fn test_alternative_prefers_plain_text() {
    assert_eq!(
        digest(ALTERNATIVE),
        "From: Newsletter <news@example.com>\n\
         Subject: Weekly update\n\
         This week: the new build pipeline is live.\n\
         Read more on the blog."
    );
}

#[test]
fn test_base64_html() {
    let text = digest(HTML_BASE64);
    assert!(text.starts_with("From: Shop <orders@shop.example>\nSubject: Your order #1042\n"));
    assert!(text.contains("Your order has shipped."), "{text}");
    assert!(text.contains("Item  Qty"), "{text}");
    assert!(text.contains("Widget  2"), "{text}");
    assert!(text.contains("here ( https://track.example.com/abc )"), "{text}");
    let body: Vec<&str> = text.lines().skip(2).collect();
    assert!(body.iter().all(|line| !line.contains('<')), "{text}");
    assert!(!text.contains("padding"), "{text}");
}

#[test]
fn test_base64_html_options() {
    let options = DigestOptions::new()
        .with_omit_links(true)
        .with_pretty_tables(true);
    let text = digest_message(HTML_BASE64, &options).unwrap();
    assert!(text.contains("Track it here"), "{text}");
    assert!(!text.contains("track.example.com"), "{text}");
    assert!(text.contains("| Item   | Qty |"), "{text}");
    assert!(text.contains("| Widget | 2   |"), "{text}");
    // The rule line has no letters and is treated as noise
    assert!(!text.contains("|-"), "{text}");

    let options = options.with_allow_non_letter_lines(true);
    let text = digest_message(HTML_BASE64, &options).unwrap();
    assert!(text.contains("|--------|-----|"), "{text}");
}

#[test]
fn test_base64_html_skip_html() {
    let options = DigestOptions::new().with_skip_html(true);
    let text = digest_message(HTML_BASE64, &options).unwrap();
    assert!(text.contains("<p>Your order has shipped.</p>"), "{text}");
}

#[test]
fn test_nested_multipart() {
    assert_eq!(
        digest(NESTED),
        "From: Heidi <heidi@example.com>\n\
         Subject: Contract draft\n\
         The contract draft is attached. Legal signed off on sections 1\u{2013}3.\n\
         \n\
         Please send comments before the end of the week."
    );
}

#[test]
fn test_body_entry_point() {
    let body = "Hi there\n\nOn Jan 1, 2020, Bob <bob@x.com> wrote:\n> old stuff";
    assert_eq!(
        digest_body(body, "text/plain", "", &DigestOptions::default()).unwrap(),
        "Hi there"
    );
}

#[test]
fn test_clean_plain_text_round_trips() {
    let body = "Meeting moved to 3pm.\nBring the slides.\n--\n\n  \nSee you there";
    assert_eq!(
        digest_body(body, "text/plain", "", &DigestOptions::default()).unwrap(),
        "Meeting moved to 3pm.\nBring the slides.\nSee you there"
    );
}

#[test]
fn test_missing_boundary_fails() {
    let err = digest_body(
        "--xyz\r\n\r\nHello\r\n--xyz--\r\n",
        "multipart/mixed",
        "",
        &DigestOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::BadContentType { .. }));
    assert!(err.to_string().contains("multipart/mixed"));
}
