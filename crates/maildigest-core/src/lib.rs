//! # maildigest-core
//!
//! Reduces email messages to short plain-text digests.
//!
//! ## Pipeline
//!
//! - **Transfer decoding**: a best-effort base64 probe, then declared
//!   quoted-printable
//! - **MIME walking**: recursive multipart traversal, preferring the first
//!   rendering of `multipart/alternative`
//! - **HTML reduction**: HTML bodies flattened to text, links and tables
//!   rendered per [`DigestOptions`]
//! - **Quote stripping**: replies and forwards cut at the earliest boundary
//!   signature, noise lines dropped
//! - **Size limiting**: hard line and column cuts
//!
//! Every call is independent and synchronous. There is no shared state, so
//! digests for many messages can be computed in parallel.
//!
//! ## Quick Start
//!
//! ```
//! use maildigest_core::{DigestOptions, digest_message};
//!
//! let raw = concat!(
//!     "From: Bob <bob@example.com>\r\n",
//!     "Subject: Re: Launch\r\n",
//!     "\r\n",
//!     "Ship it on Monday.\r\n",
//!     "\r\n",
//!     "On Fri, Jan 3, 2020 at 5:12 PM Alice <alice@example.com> wrote:\r\n",
//!     "> Are we ready?\r\n",
//! );
//!
//! let options = DigestOptions::new().with_line_limit(10).with_col_limit(80);
//! let digest = digest_message(raw, &options).unwrap();
//! assert_eq!(digest, "From: Bob <bob@example.com>\nSubject: Re: Launch\nShip it on Monday.");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod decode;
mod digest;
mod error;
mod html;
mod limit;
mod options;
mod quote;
mod tree;
mod walker;

pub use decode::transfer_decode;
pub use digest::digest_message;
pub use error::{Error, Result};
pub use html::reduce_html;
pub use limit::limit;
pub use options::DigestOptions;
pub use quote::{remove_noise, strip_quoted, truncate_at_boundary};
pub use tree::{MimePart, TreeMessage, summarize};
pub use walker::digest_body;
