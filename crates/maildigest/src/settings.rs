//! Persistent settings.

use anyhow::{Context, Result};
use maildigest_core::DigestOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config directory.
const APP_DIR: &str = "maildigest";

/// Settings loaded from `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Digest options used unless overridden on the command line.
    pub digest: DigestOptions,
    /// Google client credentials file.
    pub credentials_file: Option<PathBuf>,
    /// Token file for the Gmail source.
    pub token_file: Option<PathBuf>,
    /// Keep the token in the platform keyring under this account instead.
    pub keyring_account: Option<String>,
    /// Gmail search query.
    pub query: Option<String>,
    /// Printed between digests.
    pub separator: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            digest: DigestOptions::new()
                .with_line_limit(10)
                .with_col_limit(80)
                .with_omit_links(true),
            credentials_file: None,
            token_file: None,
            keyring_account: None,
            query: None,
            separator: "\n\n".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(|| config_dir().join("settings.json"), Path::to_path_buf);

        if !path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid settings {}", path.display()))
    }

    /// Credentials file, defaulting to `credentials.json` beside the settings.
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_file
            .clone()
            .unwrap_or_else(|| config_dir().join("credentials.json"))
    }

    /// Token file, defaulting to `token.json` beside the settings.
    pub fn token_path(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| config_dir().join("token.json"))
    }
}

/// The maildigest configuration directory.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_digest() {
        let settings = Settings::default();
        assert_eq!(settings.digest.line_limit, 10);
        assert_eq!(settings.digest.col_limit, 80);
        assert!(settings.digest.omit_links);
        assert_eq!(settings.separator, "\n\n");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "digest": {"line_limit": 5, "pretty_tables": true},
                "token_file": "/tmp/token.json",
                "query": "is:unread label:work"
            }"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.digest.line_limit, 5);
        assert!(settings.digest.pretty_tables);
        assert_eq!(settings.token_path(), PathBuf::from("/tmp/token.json"));
        assert_eq!(settings.query.as_deref(), Some("is:unread label:work"));
        assert_eq!(settings.separator, "\n\n");
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("Invalid settings"));
    }
}
