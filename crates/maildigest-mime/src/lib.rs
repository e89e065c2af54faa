//! # maildigest-mime
//!
//! Lenient MIME framing for email digests.
//!
//! ## Features
//!
//! - **Message framing**: Split a raw message into headers and body
//! - **Multipart**: Iterate the parts of any `multipart/*` body
//! - **Content types**: Parse `type/subtype` with quoted parameters
//! - **Decoding**: Base64 (standard and URL-safe) and Quoted-Printable
//!
//! This crate deliberately stops short of a full RFC 5322 parser: it does
//! not decode RFC 2047 encoded words or convert charsets.
//!
//! ## Quick Start
//!
//! ```ignore
//! use maildigest_mime::{ContentType, Message, Multipart};
//!
//! let message = Message::parse(raw)?;
//! println!("Subject: {}", message.subject().unwrap_or("(no subject)"));
//!
//! let content_type = ContentType::parse(message.content_type())?;
//! if content_type.is_multipart() {
//!     for part in Multipart::new(message.body(), content_type.require_boundary()?) {
//!         let part = part?;
//!         println!("{}: {} bytes", part.content_type(), part.body.len());
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;
mod multipart;

pub mod encoding;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Message, Part, TransferEncoding};
pub use multipart::Multipart;
