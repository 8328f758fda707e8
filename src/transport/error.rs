//! Error and result type for SMTP sessions

use std::{error::Error as StdError, fmt, io};

use crate::{transport::response::Code, BoxError};

/// The Errors that may occur when sending an email over SMTP
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    /// Returns true if the server refused a step, or answered something unreadable
    pub fn is_connection(&self) -> bool {
        matches!(self.inner.kind, Kind::Connection(_))
    }

    /// Returns true if the error is caused by a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self.inner.kind, Kind::Timeout)
    }

    /// Returns true if the error is from the underlying socket
    pub fn is_network(&self) -> bool {
        matches!(self.inner.kind, Kind::Network)
    }

    /// Returns true if the attachment file could not be read
    pub fn is_attachment(&self) -> bool {
        matches!(self.inner.kind, Kind::Attachment)
    }

    /// Returns true if the session was driven out of order
    pub fn is_client(&self) -> bool {
        matches!(self.inner.kind, Kind::Client)
    }

    /// Returns the status code, if the error was generated from a well formed reply.
    pub fn status(&self) -> Option<Code> {
        match self.inner.kind {
            Kind::Connection(code) => code,
            _ => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// Reply which is neither positive nor the `354` go-ahead
    ///
    /// The source holds the raw reply text.
    Connection(Option<Code>),
    /// Socket read or write exceeded the configured timeout
    Timeout,
    /// Underlying network i/o error
    Network,
    /// Attachment could not be read
    Attachment,
    /// Session used out of order
    Client,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("mailpost::transport::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Connection(Some(ref code)) => write!(f, "connection error ({code})")?,
            Kind::Connection(None) => f.write_str("connection error")?,
            Kind::Timeout => f.write_str("timed out")?,
            Kind::Network => f.write_str("network error")?,
            Kind::Attachment => f.write_str("attachment error")?,
            Kind::Client => f.write_str("internal client error")?,
        };

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn std::error::Error + 'static) = &**e;
            r
        })
    }
}

pub(crate) fn connection<E: Into<BoxError>>(code: Option<Code>, raw: E) -> Error {
    Error::new(Kind::Connection(code), Some(raw))
}

pub(crate) fn client<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Client, Some(e))
}

pub(crate) fn network<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Network, Some(e))
}

pub(crate) fn attachment(e: io::Error) -> Error {
    Error::new(Kind::Attachment, Some(e))
}

/// Socket errors, telling timeouts apart
///
/// A read timeout surfaces as `WouldBlock` on Unix and `TimedOut` on Windows.
pub(crate) fn from_io(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
            Error::new(Kind::Timeout, Some(e))
        }
        _ => network(e),
    }
}
