//! The mail to send and its MIME rendering
//!
//! A [`MailRequest`] carries everything one send needs: both mailboxes, the
//! subject, an HTML body and a single [`Attachment`]. It is immutable once
//! built.
//!
//! ```rust
//! use mailpost::message::{Attachment, Mailbox, MailRequest};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let request = MailRequest::builder()
//!     .from(Mailbox::new(Some("NoBody".into()), "nobody@domain.tld".parse()?))
//!     .to(Mailbox::new(None, "hei@domain.tld".parse()?))
//!     .subject("Happy new year")
//!     .body("<p>Be happy!</p>")
//!     .attachment(Attachment::new("fireworks.jpg", "fireworks.jpg").content_id("image1"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! Which is streamed after `DATA` as:
//!
//! ```sh
//! MIME-Version: 1.0
//! FROM: NoBody
//! TO: hei@domain.tld
//! SUBJECT: Happy new year
//! Content-Type: multipart/related; boundary=frontier
//! --frontier
//! Content-Type: text/html;charset="utf-8"
//!
//! <html><body><h1>Happy new year</h1><p>Be happy!</p><div><img src="cid:image1"></div></body></html>
//! --frontier
//! Content-Type: image/jpeg; name=fireworks.jpg
//! Content-Disposition: attachment;filename="fireworks.jpg"
//! Content-Transfer-Encoding: base64
//! Content-ID: <image1>
//!
//! /9j/4AAQSkZJRgABAQ...
//! --frontier--
//! ```

use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
};

pub use self::{
    attachment::Attachment,
    encoder::{encode_base64, Boundary, MessageEncoder},
    mailbox::Mailbox,
};

mod attachment;
pub mod encoder;
mod mailbox;

/// Everything needed to send one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRequest {
    from: Mailbox,
    to: Mailbox,
    subject: String,
    body: String,
    attachment: Attachment,
}

impl MailRequest {
    /// Create a new request builder
    pub fn builder() -> MailRequestBuilder {
        MailRequestBuilder::new()
    }

    /// Sender, used for `MAIL FROM` and the `FROM` header
    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    /// Recipient, used for `RCPT TO` and the `TO` header
    pub fn to(&self) -> &Mailbox {
        &self.to
    }

    /// Subject, also used as the HTML heading
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// HTML fragment placed verbatim in the body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The attached file
    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }
}

/// A builder for [`MailRequest`]
#[derive(Debug, Clone, Default)]
pub struct MailRequestBuilder {
    from: Option<Mailbox>,
    to: Option<Mailbox>,
    subject: String,
    body: String,
    attachment: Option<Attachment>,
}

impl MailRequestBuilder {
    /// Creates a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender
    pub fn from(mut self, mbox: Mailbox) -> Self {
        self.from = Some(mbox);
        self
    }

    /// Set the recipient
    pub fn to(mut self, mbox: Mailbox) -> Self {
        self.to = Some(mbox);
        self
    }

    /// Set the subject
    pub fn subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the HTML body fragment
    ///
    /// It is not escaped.
    pub fn body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = body.into();
        self
    }

    /// Set the attached file
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Checks that every part is present and that no header value spans lines
    pub fn build(self) -> Result<MailRequest, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFrom)?;
        let to = self.to.ok_or(BuildError::MissingTo)?;
        let attachment = self.attachment.ok_or(BuildError::MissingAttachment)?;

        let header_values = [
            from.display_name(),
            to.display_name(),
            self.subject.as_str(),
            attachment.filename(),
            attachment.id().unwrap_or_default(),
        ];
        if header_values
            .iter()
            .any(|value| value.contains(['\r', '\n']))
        {
            return Err(BuildError::InvalidHeader);
        }

        Ok(MailRequest {
            from,
            to,
            subject: self.subject,
            body: self.body,
            attachment,
        })
    }
}

/// Error type for incomplete requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    /// Missing sender
    MissingFrom,
    /// Missing recipient
    MissingTo,
    /// Missing attachment
    MissingAttachment,
    /// A header value contains a line break
    InvalidHeader,
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildError::MissingFrom => "missing source address",
            BuildError::MissingTo => "missing destination address",
            BuildError::MissingAttachment => "missing attachment",
            BuildError::InvalidHeader => "header value contains a line break",
        })
    }
}

impl StdError for BuildError {}

#[cfg(test)]
mod test {
    use super::*;

    fn mailbox(addr: &str) -> Mailbox {
        Mailbox::new(None, addr.parse().unwrap())
    }

    #[test]
    fn build_request() {
        let request = MailRequest::builder()
            .from(mailbox("a@x.com"))
            .to(mailbox("b@x.com"))
            .subject("Hi")
            .body("<p>hello</p>")
            .attachment(Attachment::new("photo.jpg", "photo.jpg"))
            .build()
            .unwrap();

        assert_eq!(request.from().email.as_ref(), "a@x.com");
        assert_eq!(request.to().email.as_ref(), "b@x.com");
        assert_eq!(request.subject(), "Hi");
        assert_eq!(request.body(), "<p>hello</p>");
        assert_eq!(request.attachment().filename(), "photo.jpg");
    }

    #[test]
    fn missing_parts() {
        assert_eq!(
            MailRequest::builder().to(mailbox("b@x.com")).build(),
            Err(BuildError::MissingFrom)
        );
        assert_eq!(
            MailRequest::builder().from(mailbox("a@x.com")).build(),
            Err(BuildError::MissingTo)
        );
        assert_eq!(
            MailRequest::builder()
                .from(mailbox("a@x.com"))
                .to(mailbox("b@x.com"))
                .build(),
            Err(BuildError::MissingAttachment)
        );
    }

    #[test]
    fn subject_with_line_break() {
        let result = MailRequest::builder()
            .from(mailbox("a@x.com"))
            .to(mailbox("b@x.com"))
            .subject("Hi\r\nBcc: c@x.com")
            .attachment(Attachment::new("photo.jpg", "photo.jpg"))
            .build();
        assert_eq!(result, Err(BuildError::InvalidHeader));
    }
}
