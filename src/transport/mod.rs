//! The SMTP transport sends a [`MailRequest`](crate::message::MailRequest)
//! to a relay server over plain TCP.
//!
//! It speaks just enough of the protocol to deliver one message to one
//! recipient: `EHLO`, `MAIL FROM`, `RCPT TO`, `DATA` and `QUIT`. Every
//! delivery uses a fresh connection, closed before [`SmtpTransport::send`]
//! returns, whether the delivery succeeded or not.
//!
//! #### Simple example
//!
//! ```rust,no_run
//! use mailpost::{
//!     message::{Attachment, Mailbox, MailRequest},
//!     transport::SmtpTransport,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = MailRequest::builder()
//!     .from(Mailbox::new(None, "a@example.com".parse()?))
//!     .to(Mailbox::new(None, "b@example.com".parse()?))
//!     .subject("Logo")
//!     .body("<p>Our new logo</p>")
//!     .attachment(Attachment::new("/tmp/logo.jpg", "logo.jpg").content_id("logo"))
//!     .build()?;
//!
//! let mailer = SmtpTransport::builder("localhost").build();
//! let response = mailer.send(&request)?;
//! println!("{}", response.raw());
//! # Ok(())
//! # }
//! ```
//!
//! #### Stage by stage
//!
//! [`Session`] exposes each stage of the exchange separately:
//!
//! ```rust,no_run
//! # use mailpost::{message::MailRequest, transport::{SessionState, SmtpTransport}};
//! # fn run(request: &MailRequest) -> Result<(), mailpost::transport::Error> {
//! let mailer = SmtpTransport::builder("localhost").port(2525).build();
//! let mut session = mailer.session();
//!
//! session.handshake()?;
//! session.open_envelope(&request.from().email, &request.to().email)?;
//! session.write_message(request)?;
//! session.attach(request)?;
//! session.finish()?;
//! assert_eq!(session.state(), SessionState::Closed);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

pub use self::{
    commands::ClientId,
    error::Error,
    response::{Code, Outcome, Response},
    session::{Session, SessionState},
    smtp_transport::{SmtpTransport, SmtpTransportBuilder},
};

pub mod client;
pub mod commands;
pub mod error;
pub mod response;
mod session;
mod smtp_transport;

/// Default smtp port
pub const SMTP_PORT: u16 = 25;

/// Default timeout for connecting, reading and writing
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings of a transport
#[derive(Clone, Debug)]
pub(crate) struct SmtpInfo {
    /// Name sent during EHLO
    pub(crate) hello_name: ClientId,
    /// Server we are connecting to
    pub(crate) server: String,
    /// Port to connect to
    pub(crate) port: u16,
    /// Timeout for connect, read and write, `None` blocks forever
    pub(crate) timeout: Option<Duration>,
}

impl Default for SmtpInfo {
    fn default() -> Self {
        Self {
            hello_name: ClientId::default(),
            server: "localhost".to_owned(),
            port: SMTP_PORT,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}
