//! Mailpost is a minimal SMTP client.
//!
//! It sends one HTML message with a single base64 attachment to one
//! recipient, over a plain TCP connection, speaking the protocol directly:
//! greeting and `EHLO`, the `MAIL FROM` / `RCPT TO` / `DATA` envelope, a
//! `multipart/related` body streamed part by part, then end-of-data and
//! `QUIT`.
//!
//! There is no TLS, no authentication and no connection reuse. Every send
//! opens a fresh connection which is released on every exit path.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use mailpost::{
//!     message::{Attachment, Mailbox, MailRequest},
//!     transport::{ClientId, SmtpTransport},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = MailRequest::builder()
//!     .from(Mailbox::new(Some("Alice".into()), "alice@example.com".parse()?))
//!     .to(Mailbox::new(None, "bob@example.com".parse()?))
//!     .subject("Holiday")
//!     .body("<p>Look at this!</p>")
//!     .attachment(Attachment::new("beach.jpg", "beach.jpg").content_id("image1"))
//!     .build()?;
//!
//! let mailer = SmtpTransport::builder("mail.example.com")
//!     .port(2525)
//!     .timeout(Some(Duration::from_secs(30)))
//!     .hello_name(ClientId::Domain("client.example.com".into()))
//!     .build();
//!
//! mailer.send(&request)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! * **tracing** (default): logs every command and reply at `debug` level
//! * **serde**: `Serialize`/`Deserialize` for reply codes and client ids

#![deny(missing_docs, unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod address;
pub mod message;
pub mod transport;

pub use crate::{
    address::Address,
    message::{Attachment, MailRequest, Mailbox},
    transport::{Error, SmtpTransport},
};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
