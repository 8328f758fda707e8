//! One mail delivery, stage by stage
//!
//! A [`Session`] drives a single connection through a fixed sequence:
//!
//! | stage            | from              | to                |
//! |------------------|-------------------|-------------------|
//! | [`handshake`]    | `Disconnected`    | `Greeted`         |
//! | [`open_envelope`]| `Greeted`         | `EnvelopeOpen`    |
//! | [`write_message`]| `EnvelopeOpen`    | `DataStreaming`   |
//! | [`attach`]       | `DataStreaming`   | `DataStreaming`   |
//! | [`finish`]       | `DataStreaming`   | `Closed`          |
//!
//! Calling a stage out of order is a client error and leaves the session
//! untouched. Any other failure shuts the connection down and moves the
//! session to `Closed`, from which nothing more can be done.
//!
//! [`handshake`]: Session::handshake
//! [`open_envelope`]: Session::open_envelope
//! [`write_message`]: Session::write_message
//! [`attach`]: Session::attach
//! [`finish`]: Session::finish

use std::fmt::Display;

use super::{
    client::SmtpConnection,
    commands::{Data, Ehlo, Mail, Quit, Rcpt},
    error::{self, Error},
    response::Response,
    SmtpInfo,
};
use crate::{
    address::Address,
    message::{Boundary, MailRequest, MessageEncoder},
};

macro_rules! try_smtp (
    ($err: expr, $session: ident) => ({
        match $err {
            Ok(val) => val,
            Err(err) => {
                $session.abort();
                return Err(From::from(err))
            },
        }
    })
);

/// Where a [`Session`] stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing sent yet
    Disconnected,
    /// The server greeted us and accepted `EHLO`
    Greeted,
    /// Sender and recipient accepted, the server waits for message data
    EnvelopeOpen,
    /// Message data is being sent
    DataStreaming,
    /// Connection released, either after `QUIT` or after a failure
    Closed,
}

/// A single delivery over its own connection
///
/// Dropping a session closes its connection, whatever the state.
pub struct Session {
    info: SmtpInfo,
    boundary: Boundary,
    connection: Option<SmtpConnection>,
    state: SessionState,
    attached: bool,
}

impl Session {
    pub(crate) fn new(info: SmtpInfo) -> Session {
        Session {
            info,
            boundary: Boundary::default(),
            connection: None,
            state: SessionState::Disconnected,
            attached: false,
        }
    }

    /// Current stage
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Boundary separating the parts of the message
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Connects, reads the greeting and introduces the client with `EHLO`
    ///
    /// An empty or multi-line client name is refused before connecting.
    pub fn handshake(&mut self) -> Result<(), Error> {
        self.check_state(SessionState::Disconnected, "handshake")?;
        if !self.info.hello_name.is_valid() {
            return Err(error::client("EHLO name is empty or spans several lines"));
        }

        let conn = try_smtp!(
            SmtpConnection::connect(
                (self.info.server.as_str(), self.info.port),
                self.info.timeout,
            ),
            self
        );
        self.connection = Some(conn);

        let hello = Ehlo::new(self.info.hello_name.clone());
        try_smtp!(self.command(hello), self);

        self.transition(SessionState::Greeted);
        Ok(())
    }

    /// Declares sender and recipient, then asks to send data
    ///
    /// The `DATA` reply may be `354` or any positive completion.
    pub fn open_envelope(&mut self, from: &Address, to: &Address) -> Result<(), Error> {
        self.check_state(SessionState::Greeted, "open_envelope")?;

        try_smtp!(self.command(Mail::new(from.clone())), self);
        try_smtp!(self.command(Rcpt::new(to.clone())), self);
        try_smtp!(self.command(Data), self);

        self.transition(SessionState::EnvelopeOpen);
        Ok(())
    }

    /// Sends the message headers and the HTML part
    pub fn write_message(&mut self, request: &MailRequest) -> Result<(), Error> {
        self.check_state(SessionState::EnvelopeOpen, "write_message")?;

        let encoder = MessageEncoder::new(request, self.boundary);
        let written = self.connection().and_then(|conn| {
            encoder
                .write_message(&mut conn.data_writer())
                .map_err(error::from_io)
        });
        try_smtp!(written, self);

        self.attached = false;
        self.transition(SessionState::DataStreaming);
        Ok(())
    }

    /// Sends the attachment part
    ///
    /// The file is read in full before anything is written, so a missing
    /// file never leaves half a part on the wire.
    pub fn attach(&mut self, request: &MailRequest) -> Result<(), Error> {
        self.check_state(SessionState::DataStreaming, "attach")?;
        if self.attached {
            return Err(error::client("attachment already sent"));
        }

        let contents = try_smtp!(request.attachment().read().map_err(error::attachment), self);

        let encoder = MessageEncoder::new(request, self.boundary);
        let written = self.connection().and_then(|conn| {
            encoder
                .write_attachment(&mut conn.data_writer(), &contents)
                .map_err(error::from_io)
        });
        try_smtp!(written, self);

        self.attached = true;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "attached {} ({} bytes)",
            request.attachment().filename(),
            contents.len()
        );
        Ok(())
    }

    /// Closes the multipart body, ends the data and says `QUIT`
    ///
    /// Returns the server reply accepting the message.
    pub fn finish(&mut self) -> Result<Response, Error> {
        self.check_state(SessionState::DataStreaming, "finish")?;
        if !self.attached {
            return Err(error::client("finish called before attach"));
        }

        let closing = self.boundary.closing();
        try_smtp!(
            self.connection()
                .and_then(|conn| conn.send_data(closing.as_bytes())),
            self
        );
        let accepted = try_smtp!(self.connection().and_then(SmtpConnection::end_data), self);
        try_smtp!(self.command(Quit), self);

        if let Some(mut conn) = self.connection.take() {
            conn.close();
        }
        self.transition(SessionState::Closed);
        Ok(accepted)
    }

    fn check_state(&self, expected: SessionState, operation: &str) -> Result<(), Error> {
        if self.state == expected {
            Ok(())
        } else {
            Err(error::client(format!(
                "{operation} not allowed in state {:?}",
                self.state
            )))
        }
    }

    fn connection(&mut self) -> Result<&mut SmtpConnection, Error> {
        self.connection
            .as_mut()
            .ok_or_else(|| error::client("no open connection"))
    }

    fn command<C: Display>(&mut self, command: C) -> Result<Response, Error> {
        self.connection()?.command(command)
    }

    fn transition(&mut self, to: SessionState) {
        #[cfg(feature = "tracing")]
        tracing::debug!("session {:?} -> {:?}", self.state, to);
        self.state = to;
    }

    /// Releases the connection after a failure
    fn abort(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::warn!("aborting session in state {:?}", self.state);

        if let Some(mut conn) = self.connection.take() {
            conn.close();
        }
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod test {
    use std::net::TcpListener;

    use super::*;
    use crate::{
        message::{Attachment, Mailbox},
        transport::ClientId,
    };

    fn request() -> MailRequest {
        MailRequest::builder()
            .from(Mailbox::new(None, "a@x.com".parse().unwrap()))
            .to(Mailbox::new(None, "b@x.com".parse().unwrap()))
            .subject("S")
            .body("B")
            .attachment(Attachment::new("i.jpg", "i.jpg"))
            .build()
            .unwrap()
    }

    fn session(port: u16) -> Session {
        Session::new(SmtpInfo {
            server: "127.0.0.1".to_owned(),
            port,
            ..Default::default()
        })
    }

    fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn stages_out_of_order() {
        let mut session = session(closed_port());
        let request = request();
        let from = request.from().email.clone();
        let to = request.to().email.clone();

        assert!(session.open_envelope(&from, &to).unwrap_err().is_client());
        assert!(session.write_message(&request).unwrap_err().is_client());
        assert!(session.attach(&request).unwrap_err().is_client());
        assert!(session.finish().unwrap_err().is_client());
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn hello_name_with_line_break() {
        let mut session = Session::new(SmtpInfo {
            server: "127.0.0.1".to_owned(),
            port: closed_port(),
            hello_name: ClientId::Domain("me\r\nMAIL FROM: <x@y.com>".to_owned()),
            ..Default::default()
        });

        assert!(session.handshake().unwrap_err().is_client());
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn failed_handshake_closes() {
        let mut session = session(closed_port());

        let err = session.handshake().unwrap_err();
        assert!(err.is_network() || err.is_timeout());
        assert_eq!(session.state(), SessionState::Closed);

        assert!(session.handshake().unwrap_err().is_client());
        assert_eq!(session.state(), SessionState::Closed);
    }
}
