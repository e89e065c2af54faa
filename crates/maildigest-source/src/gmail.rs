//! Gmail REST API source.
//!
//! Messages are listed with a search query (unread inbox mail by default),
//! fetched in `raw` format for [`MessageSource::fetch_raw`] or in `full`
//! format for [`GmailSource::fetch_tree`], and marked read by removing the
//! `UNREAD` label. Gmail encodes payloads as base64url, usually without
//! padding; they are decoded here so callers only ever see message text.

use crate::error::{Error, Result};
use crate::source::MessageSource;
use crate::token::Token;
use maildigest_core::{MimePart, TreeMessage};
use maildigest_mime::encoding::decode_base64_url_unpadded;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Gmail API root.
pub const GMAIL_API: &str = "https://gmail.googleapis.com/gmail/v1/";

/// Search used to find digest candidates.
pub const DEFAULT_QUERY: &str = "in:inbox is:unread";

/// Read/modify scope, needed to mark messages read.
pub const GMAIL_MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    raw: String,
}

#[derive(Debug, Deserialize)]
struct FullMessage {
    #[serde(default)]
    snippet: String,
    payload: Option<GmailPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GmailPart {
    mime_type: String,
    headers: Vec<GmailHeader>,
    body: Option<GmailBody>,
    parts: Vec<GmailPart>,
}

#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GmailBody {
    data: Option<String>,
}

fn header<'a>(headers: &'a [GmailHeader], name: &str) -> &'a str {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map_or("", |h| h.value.as_str())
}

fn to_mime_part(part: GmailPart) -> MimePart {
    let content_type = match header(&part.headers, "content-type") {
        "" => part.mime_type,
        declared => declared.to_string(),
    };
    let transfer_encoding = header(&part.headers, "content-transfer-encoding").to_string();
    let body = part
        .body
        .and_then(|body| body.data)
        .map(|data| decode_body_data(&data))
        .unwrap_or_default();

    MimePart {
        content_type,
        transfer_encoding,
        body,
        children: part.parts.into_iter().map(to_mime_part).collect(),
    }
}

fn to_tree_message(message: FullMessage) -> TreeMessage {
    let (from, subject) = message.payload.as_ref().map_or_else(Default::default, |p| {
        (
            header(&p.headers, "from").to_string(),
            header(&p.headers, "subject").to_string(),
        )
    });

    TreeMessage {
        from,
        subject,
        snippet: message.snippet,
        payload: message.payload.map(to_mime_part),
    }
}

/// Decodes a base64url transport payload to text.
///
/// # Errors
///
/// Returns [`Error::Base64Decode`] if `data` is not base64url.
pub fn decode_payload(data: &str) -> Result<String> {
    let bytes = decode_base64_url_unpadded(data).map_err(Error::Base64Decode)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Part bodies that fail to decode are kept as-is for the summarizer.
fn decode_body_data(data: &str) -> String {
    decode_payload(data).unwrap_or_else(|e| {
        debug!(error = %e, "keeping undecodable part body");
        data.to_string()
    })
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}

/// A Gmail mailbox accessed with an `OAuth2` bearer token.
#[derive(Debug, Clone)]
pub struct GmailSource {
    http_client: Client,
    token: Token,
    base_url: Url,
    user: String,
    query: String,
}

impl GmailSource {
    /// Creates a source for the authorized user's mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in API URL fails to parse.
    pub fn new(http_client: Client, token: Token) -> Result<Self> {
        Ok(Self {
            http_client,
            token,
            base_url: Url::parse(GMAIL_API)?,
            user: "me".to_string(),
            query: DEFAULT_QUERY.to_string(),
        })
    }

    /// Sets the search query used by [`MessageSource::list_unread`].
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Points the source at another API root.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid base URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidConfig(format!("Not a base URL: {url}")));
        }
        self.base_url = url;
        Ok(self)
    }

    fn messages_url(&self, rest: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig(format!("Not a base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["users", self.user.as_str(), "messages"])
            .extend(rest);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token.access_token)
    }

    async fn get_message<T: DeserializeOwned>(&self, id: &str, format: &str) -> Result<T> {
        let url = self.messages_url(&[id])?;
        let request = self.http_client.get(url).query(&[("format", format)]);
        let response = check(self.authorized(request).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Fetches a message as a pre-parsed part tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn fetch_tree(&self, id: &str) -> Result<TreeMessage> {
        let message: FullMessage = self.get_message(id, "full").await?;
        Ok(to_tree_message(message))
    }
}

impl MessageSource for GmailSource {
    async fn list_unread(&self) -> Result<Vec<String>> {
        let url = self.messages_url(&[])?;
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(url.clone())
                .query(&[("q", self.query.as_str())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = check(self.authorized(request).send().await?).await?;
            let page: ListResponse = response.json().await?;
            ids.extend(page.messages.into_iter().map(|m| m.id));

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(count = ids.len(), query = %self.query, "listed Gmail messages");
        Ok(ids)
    }

    async fn fetch_raw(&self, id: &str) -> Result<String> {
        let message: RawMessage = self.get_message(id, "raw").await?;
        decode_payload(&message.raw)
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        let url = self.messages_url(&[id, "modify"])?;
        let request = self
            .http_client
            .post(url)
            .json(&serde_json::json!({ "removeLabelIds": ["UNREAD"] }));
        check(self.authorized(request).send().await?).await?;
        debug!(id, "marked Gmail message read");
        Ok(())
    }
}
