//! `OAuth2` tokens, client credentials and token persistence.
//!
//! Only the non-interactive half of `OAuth2` lives here: a previously
//! granted token is loaded from a [`TokenStore`] and refreshed through the
//! token endpoint when it expires. Obtaining the first grant is left to
//! other tools; the token file format accepts the JSON written by Go's
//! `golang.org/x/oauth2` as well as our own.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use keyring::Entry;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Google's token endpoint, used when a credentials file omits `token_uri`.
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "maildigest";

/// `OAuth2` access token with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Access token string.
    pub access_token: String,
    /// Token type (usually "Bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expiration time.
    #[serde(alias = "expiry", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token for obtaining new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scope granted by authorization server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at: None,
            refresh_token: None,
            scope: None,
        }
    }

    /// Creates a token from a token endpoint response.
    #[must_use]
    pub fn from_response(response: TokenResponse) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(i64::from(secs)));

        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
            refresh_token: response.refresh_token,
            scope: response.scope,
        }
    }

    /// Checks if the token is expired (with 60 second buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| Utc::now() + Duration::seconds(60) >= exp)
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the expiration time.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns the refresh token if available.
    ///
    /// # Errors
    ///
    /// Returns an error if no refresh token is available.
    pub fn refresh_token(&self) -> Result<&str> {
        self.refresh_token.as_deref().ok_or(Error::NoRefreshToken)
    }
}

/// Token response from `OAuth2` server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type.
    pub token_type: String,
    /// Expires in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u32>,
    /// Refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Error response from `OAuth2` server.
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// `OAuth2` client credentials, as issued by the Google API console.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Client ID.
    pub client_id: String,
    /// Client secret (absent for public clients).
    pub client_secret: Option<String>,
    /// Token endpoint.
    pub token_uri: Url,
}

#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    token_uri: Option<String>,
}

impl Credentials {
    /// Reads a `credentials.json` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a Google
    /// client credentials document.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("Cannot read credentials {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Parses a credentials document with an `installed` or `web` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or has neither section.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: CredentialsFile = serde_json::from_str(text)?;
        let section = file.installed.or(file.web).ok_or_else(|| {
            Error::InvalidConfig("Credentials have no \"installed\" or \"web\" section".to_string())
        })?;

        let token_uri = section.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URI);
        Ok(Self {
            client_id: section.client_id,
            client_secret: section.client_secret.filter(|s| !s.is_empty()),
            token_uri: Url::parse(token_uri)?,
        })
    }
}

/// Persistent storage for a single `OAuth2` token.
pub trait TokenStore {
    /// Loads the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn load(&self) -> Result<Option<Token>>;

    /// Replaces the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be written.
    fn save(&self, token: &Token) -> Result<()>;
}

/// Token stored as JSON in a file readable only by its owner.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Token>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no token file");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &Token) -> Result<()> {
        let json = serde_json::to_string_pretty(token)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        // mode() only applies to newly created files
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(json.as_bytes())?;
        info!(path = %self.path.display(), "saved token");
        Ok(())
    }
}

/// Token stored in the platform keyring.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    account: String,
}

impl KeyringTokenStore {
    /// Creates a store for the given account name (usually the address).
    #[must_use]
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        let key = format!("{SERVICE_NAME}_oauth_token_{}", self.account);
        Ok(Entry::new(SERVICE_NAME, &key)?)
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<Token>> {
        match self.entry()?.get_password() {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(keyring::Error::NoEntry) => {
                debug!("No token in keyring for {}", self.account);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, token: &Token) -> Result<()> {
        let json = serde_json::to_string(token)?;
        self.entry()?.set_password(&json)?;
        debug!("Stored token in keyring for {}", self.account);
        Ok(())
    }
}

/// Refreshes tokens against the credentials' token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    credentials: Credentials,
    http_client: Client,
}

impl OAuthClient {
    /// Creates a client for the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials, http_client: Client) -> Self {
        Self {
            credentials,
            http_client,
        }
    }

    /// Refreshes an access token using its refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token has no refresh token or the endpoint
    /// rejects the request.
    pub async fn refresh_token(&self, token: &Token) -> Result<Token> {
        let refresh_token = token.refresh_token()?;

        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("client_id", &self.credentials.client_id);
        if let Some(secret) = &self.credentials.client_secret {
            params.insert("client_secret", secret);
        }

        let response = self
            .http_client
            .post(self.credentials.token_uri.clone())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await?;
            return Err(Error::oauth_error(error.error, error.error_description));
        }

        let token_response: TokenResponse = response.json().await?;
        let mut new_token = Token::from_response(token_response);

        // Preserve refresh token if not returned
        if new_token.refresh_token.is_none() {
            new_token.refresh_token.clone_from(&token.refresh_token);
        }

        Ok(new_token)
    }

    /// Loads the token from `store`, refreshing and saving it if expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is empty, or if the token is expired
    /// and cannot be refreshed.
    pub async fn fresh_token(&self, store: &impl TokenStore) -> Result<Token> {
        let token = store.load()?.ok_or_else(|| {
            Error::InvalidConfig("No stored token; authorize this client first".to_string())
        })?;

        if !token.is_expired() {
            return Ok(token);
        }

        debug!("access token expired, refreshing");
        let token = self.refresh_token(&token).await?;
        store.save(&token)?;
        Ok(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiration() {
        let expired =
            Token::new("access123", "Bearer").with_expires_at(Utc::now() - Duration::seconds(120));
        assert!(expired.is_expired());

        let almost =
            Token::new("access123", "Bearer").with_expires_at(Utc::now() + Duration::seconds(30));
        assert!(almost.is_expired());

        let valid =
            Token::new("access123", "Bearer").with_expires_at(Utc::now() + Duration::seconds(3600));
        assert!(!valid.is_expired());

        assert!(!Token::new("access123", "Bearer").is_expired());
    }

    #[test]
    fn test_token_from_response() {
        let response = TokenResponse {
            access_token: "test_token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: Some(3600),
            refresh_token: None,
            scope: Some("https://www.googleapis.com/auth/gmail.modify".to_string()),
        };

        let token = Token::from_response(response);
        assert_eq!(token.access_token, "test_token");
        assert!(token.expires_at.is_some());
        assert!(!token.is_expired());
        assert!(matches!(token.refresh_token(), Err(Error::NoRefreshToken)));
    }

    #[test]
    fn test_token_reads_go_oauth2_format() {
        let json = r#"{
            "access_token": "ya29.a0",
            "token_type": "Bearer",
            "refresh_token": "1//0g",
            "expiry": "2019-05-14T10:00:00.123456-07:00"
        }"#;
        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(token.refresh_token().unwrap(), "1//0g");
        assert!(token.is_expired());
    }

    #[test]
    fn test_credentials_installed() {
        let json = r#"{"installed": {
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "shh",
            "token_uri": "https://oauth2.example.com/token",
            "redirect_uris": ["http://localhost"]
        }}"#;
        let credentials = Credentials::from_json(json).unwrap();
        assert_eq!(credentials.client_id, "123.apps.googleusercontent.com");
        assert_eq!(credentials.client_secret.as_deref(), Some("shh"));
        assert_eq!(credentials.token_uri.as_str(), "https://oauth2.example.com/token");
    }

    #[test]
    fn test_credentials_web_defaults() {
        let json = r#"{"web": {"client_id": "abc", "client_secret": ""}}"#;
        let credentials = Credentials::from_json(json).unwrap();
        assert_eq!(credentials.client_id, "abc");
        assert!(credentials.client_secret.is_none());
        assert_eq!(credentials.token_uri.as_str(), GOOGLE_TOKEN_URI);
    }

    #[test]
    fn test_credentials_without_section() {
        let err = Credentials::from_json(r#"{"other": {}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = Credentials::from_file("/nonexistent/credentials.json").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        assert!(store.load().unwrap().is_none());

        let token = Token::new("access", "Bearer").with_refresh_token("refresh");
        store.save(&token).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
        assert!(loaded.expires_at.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        store.save(&Token::new("access", "Bearer")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_fresh_token_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));
        let credentials = Credentials::from_json(r#"{"installed": {"client_id": "abc"}}"#).unwrap();
        let client = OAuthClient::new(credentials, Client::new());

        let err = client.fresh_token(&store).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let valid = Token::new("live", "Bearer").with_expires_at(Utc::now() + Duration::hours(1));
        store.save(&valid).unwrap();
        assert_eq!(client.fresh_token(&store).await.unwrap().access_token, "live");

        let expired = Token::new("stale", "Bearer").with_expires_at(Utc::now() - Duration::hours(1));
        store.save(&expired).unwrap();
        let err = client.fresh_token(&store).await.unwrap_err();
        assert!(matches!(err, Error::NoRefreshToken));
    }
}
