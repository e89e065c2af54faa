//! The message source abstraction and local file sources.

use crate::error::{Error, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, trace};

/// Path that stands for standard input in a [`FileSource`].
pub const STDIN_PATH: &str = "-";

/// A mailbox that yields raw RFC 5322 messages.
///
/// Implementations own all transport concerns (authentication, paging,
/// transport encodings). Raw text handed out by [`fetch_raw`] is ready for
/// `maildigest_core::digest_message`.
///
/// [`fetch_raw`]: MessageSource::fetch_raw
pub trait MessageSource {
    /// Lists the identifiers of unread messages, oldest first where the
    /// source can tell.
    fn list_unread(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Fetches the raw text of one message.
    fn fetch_raw(&self, id: &str) -> impl Future<Output = Result<String>> + Send;

    /// Marks one message as read.
    fn mark_read(&self, id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Every `*.eml` file in a directory is an unread message.
///
/// Message ids are file names. Files are read as UTF-8, lossily.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Creates a source over `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn message_path(&self, id: &str) -> Result<PathBuf> {
        let name = Path::new(id);
        if name.file_name() != Some(name.as_os_str()) {
            return Err(Error::UnknownMessage(id.to_string()));
        }
        Ok(self.root.join(name))
    }
}

impl MessageSource for DirectorySource {
    async fn list_unread(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_eml = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("eml"));
            if !is_eml || !entry.file_type().await?.is_file() {
                trace!(path = %path.display(), "ignoring directory entry");
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                ids.push(name.to_string());
            }
        }

        ids.sort();
        debug!(count = ids.len(), root = %self.root.display(), "listed messages");
        Ok(ids)
    }

    async fn fetch_raw(&self, id: &str) -> Result<String> {
        let bytes = fs::read(self.message_path(id)?).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        debug!(id, "directory messages have no read state");
        Ok(())
    }
}

/// An explicit list of message files. `-` reads standard input.
#[derive(Debug, Clone)]
pub struct FileSource {
    paths: Vec<String>,
}

impl FileSource {
    /// Creates a source over the given paths, in order.
    #[must_use]
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl MessageSource for FileSource {
    async fn list_unread(&self) -> Result<Vec<String>> {
        Ok(self.paths.clone())
    }

    async fn fetch_raw(&self, id: &str) -> Result<String> {
        if !self.paths.iter().any(|path| path == id) {
            return Err(Error::UnknownMessage(id.to_string()));
        }

        let bytes = if id == STDIN_PATH {
            let mut bytes = Vec::new();
            tokio::io::stdin().read_to_end(&mut bytes).await?;
            bytes
        } else {
            fs::read(id).await?
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        debug!(id, "files have no read state");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mailbox() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.eml"), "Subject: second\n\nSecond body\n").unwrap();
        std::fs::write(dir.path().join("a.EML"), "Subject: first\n\nFirst body\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a message").unwrap();
        std::fs::create_dir(dir.path().join("folder.eml")).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_directory_lists_eml_files() {
        let dir = mailbox();
        let source = DirectorySource::new(dir.path());
        assert_eq!(source.list_unread().await.unwrap(), vec!["a.EML", "b.eml"]);
    }

    #[tokio::test]
    async fn test_directory_fetch() {
        let dir = mailbox();
        let source = DirectorySource::new(dir.path());
        let raw = source.fetch_raw("b.eml").await.unwrap();
        assert_eq!(raw, "Subject: second\n\nSecond body\n");
        source.mark_read("b.eml").await.unwrap();
    }

    #[tokio::test]
    async fn test_directory_rejects_paths() {
        let dir = mailbox();
        let source = DirectorySource::new(dir.path());
        let err = source.fetch_raw("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, Error::UnknownMessage(_)));
    }

    #[tokio::test]
    async fn test_directory_missing() {
        let source = DirectorySource::new("/nonexistent/maildigest");
        assert!(matches!(source.list_unread().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_directory_lossy_utf8() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("latin1.eml"), b"Subject: caf\xe9\n\nbody\n").unwrap();
        let source = DirectorySource::new(dir.path());
        let raw = source.fetch_raw("latin1.eml").await.unwrap();
        assert_eq!(raw, "Subject: caf\u{FFFD}\n\nbody\n");
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = mailbox();
        let path = dir.path().join("a.EML").to_string_lossy().into_owned();
        let source = FileSource::new([path.clone()]);

        assert_eq!(source.list_unread().await.unwrap(), vec![path.clone()]);
        assert_eq!(
            source.fetch_raw(&path).await.unwrap(),
            "Subject: first\n\nFirst body\n"
        );
        assert!(matches!(
            source.fetch_raw("other.eml").await,
            Err(Error::UnknownMessage(_))
        ));
    }
}
