//! Digesting every unread message of a source.

use crate::error::Result;
use crate::gmail::GmailSource;
use crate::source::MessageSource;
use maildigest_core::{DigestOptions, digest_message, summarize};
use tracing::{debug, warn};

/// The outcome for one message of a batch.
#[derive(Debug)]
pub struct DigestEntry {
    /// Source specific message id.
    pub id: String,
    /// The digest, or why this message could not be digested.
    pub result: Result<String>,
}

impl DigestEntry {
    /// Returns true if the message was digested.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Lists the unread messages of `source` and digests each one, in order.
///
/// A message that cannot be fetched or digested is logged and reported in
/// its entry; it never stops the batch.
///
/// # Errors
///
/// Returns an error only if the unread messages cannot be listed.
pub async fn collect_digests<S>(source: &S, options: &DigestOptions) -> Result<Vec<DigestEntry>>
where
    S: MessageSource + Sync,
{
    let ids = source.list_unread().await?;
    let mut entries = Vec::with_capacity(ids.len());

    for id in ids {
        let result = digest_one(source, &id, options).await;
        if let Err(e) = &result {
            warn!(id = %id, error = %e, "skipping message");
        }
        entries.push(DigestEntry { id, result });
    }

    debug!(
        total = entries.len(),
        failed = entries.iter().filter(|e| !e.is_ok()).count(),
        "digested unread messages"
    );
    Ok(entries)
}

async fn digest_one<S>(source: &S, id: &str, options: &DigestOptions) -> Result<String>
where
    S: MessageSource + Sync,
{
    let raw = source.fetch_raw(id).await?;
    Ok(digest_message(&raw, options)?)
}

/// Like [`collect_digests`], but summarizes Gmail's pre-parsed part trees,
/// prefixing each body line with `padding`.
///
/// # Errors
///
/// Returns an error only if the unread messages cannot be listed.
pub async fn collect_summaries(
    source: &GmailSource,
    options: &DigestOptions,
    padding: &str,
) -> Result<Vec<DigestEntry>> {
    let ids = source.list_unread().await?;
    let mut entries = Vec::with_capacity(ids.len());

    for id in ids {
        let result = source
            .fetch_tree(&id)
            .await
            .map(|tree| summarize(&tree, options, padding));
        if let Err(e) = &result {
            warn!(id = %id, error = %e, "skipping message");
        }
        entries.push(DigestEntry { id, result });
    }
    Ok(entries)
}

/// Marks the successfully digested entries as read.
///
/// # Errors
///
/// Returns the first error reported by the source.
pub async fn mark_digested_read<S>(source: &S, entries: &[DigestEntry]) -> Result<usize>
where
    S: MessageSource + Sync,
{
    let mut marked = 0;
    for entry in entries.iter().filter(|e| e.is_ok()) {
        source.mark_read(&entry.id).await?;
        marked += 1;
    }
    Ok(marked)
}
