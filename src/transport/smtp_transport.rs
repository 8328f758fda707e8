use std::time::Duration;

use super::{ClientId, Error, Response, Session, SmtpInfo};
use crate::message::MailRequest;

/// Sends emails using the SMTP protocol
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    info: SmtpInfo,
}

impl SmtpTransport {
    /// Creates a new SMTP client
    ///
    /// Defaults are:
    ///
    /// * Port 25
    /// * A 30-seconds timeout for connecting, reading and writing
    /// * `[127.0.0.1]` as the `EHLO` identity
    pub fn builder<T: Into<String>>(server: T) -> SmtpTransportBuilder {
        SmtpTransportBuilder::new(server)
    }

    /// A new, disconnected session using this transport's settings
    pub fn session(&self) -> Session {
        Session::new(self.info.clone())
    }

    /// Sends an email
    ///
    /// Runs every stage in order over a new connection and returns the reply
    /// accepting the message. The connection is closed in every case.
    pub fn send(&self, request: &MailRequest) -> Result<Response, Error> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "sending to {} via {}:{}",
            request.to().email,
            self.info.server,
            self.info.port
        );

        let mut session = self.session();
        session.handshake()?;
        session.open_envelope(&request.from().email, &request.to().email)?;
        session.write_message(request)?;
        session.attach(request)?;
        session.finish()
    }
}

/// Contains client configuration.
/// Instances of this struct can be created using [`SmtpTransport::builder`].
#[derive(Debug, Clone)]
pub struct SmtpTransportBuilder {
    info: SmtpInfo,
}

impl SmtpTransportBuilder {
    fn new<T: Into<String>>(server: T) -> Self {
        Self {
            info: SmtpInfo {
                server: server.into(),
                ..Default::default()
            },
        }
    }

    /// Set the name used during EHLO
    pub fn hello_name(mut self, name: ClientId) -> Self {
        self.info.hello_name = name;
        self
    }

    /// Set the timeout duration
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.info.timeout = timeout;
        self
    }

    /// Set the port to use
    pub fn port(mut self, port: u16) -> Self {
        self.info.port = port;
        self
    }

    /// Build the transport
    pub fn build(self) -> SmtpTransport {
        SmtpTransport { info: self.info }
    }
}
