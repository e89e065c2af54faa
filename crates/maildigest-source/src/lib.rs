//! # maildigest-source
//!
//! Where raw messages come from.
//!
//! ## Sources
//!
//! - [`DirectorySource`]: every `*.eml` file in a directory
//! - [`FileSource`]: explicit files, `-` for standard input
//! - [`GmailSource`]: unread inbox mail through the Gmail REST API
//!
//! Gmail access uses a previously granted `OAuth2` token, kept in a
//! [`FileTokenStore`] or [`KeyringTokenStore`] and refreshed through
//! [`OAuthClient`] when it expires.
//!
//! ## Quick Start
//!
//! ```ignore
//! use maildigest_core::DigestOptions;
//! use maildigest_source::{DirectorySource, collect_digests};
//!
//! let source = DirectorySource::new("/var/mail/inbox");
//! for entry in collect_digests(&source, &DigestOptions::default()).await? {
//!     match entry.result {
//!         Ok(digest) => println!("{digest}\n"),
//!         Err(e) => eprintln!("{}: {e}", entry.id),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod batch;
mod error;
mod gmail;
mod source;
mod token;

pub use batch::{DigestEntry, collect_digests, collect_summaries, mark_digested_read};
pub use error::{Error, Result};
pub use gmail::{DEFAULT_QUERY, GMAIL_API, GMAIL_MODIFY_SCOPE, GmailSource, decode_payload};
pub use source::{DirectorySource, FileSource, MessageSource, STDIN_PATH};
pub use token::{
    Credentials, FileTokenStore, KeyringTokenStore, OAuthClient, Token, TokenResponse, TokenStore,
};
