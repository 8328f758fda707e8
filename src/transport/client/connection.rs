use std::{
    fmt::Display,
    io::{self, BufRead, BufReader, Write},
    net::{Shutdown, ToSocketAddrs},
    time::Duration,
};

#[cfg(feature = "tracing")]
use super::escape_crlf;
use super::{ClientCodec, NetworkStream};
use crate::transport::{
    error::{self, Error},
    response::{parse_response, Outcome, Response},
};

/// Structure that implements the SMTP client
///
/// Owns the connection. Every reply goes through [`read_response`], which
/// turns a failure reply into an error carrying the raw server text.
///
/// [`read_response`]: SmtpConnection::read_response
pub struct SmtpConnection {
    /// TCP stream between client and server
    stream: BufReader<NetworkStream>,
    /// Transparency state of the message data being streamed
    codec: ClientCodec,
    /// Whether the stream has been shut down
    closed: bool,
}

impl SmtpConnection {
    /// Connects to the configured server and reads its greeting
    ///
    /// `timeout` bounds the connection attempt and every later read and write.
    pub fn connect<A: ToSocketAddrs>(
        server: A,
        timeout: Option<Duration>,
    ) -> Result<SmtpConnection, Error> {
        let stream = NetworkStream::connect(server, timeout)?;
        Self::open(stream, timeout)
    }

    /// Takes over an already connected stream and reads the greeting
    ///
    /// A failure greeting closes the stream before the error is returned.
    pub fn open(stream: NetworkStream, timeout: Option<Duration>) -> Result<SmtpConnection, Error> {
        let mut conn = SmtpConnection {
            stream: BufReader::new(stream),
            codec: ClientCodec::new(),
            closed: false,
        };
        conn.set_timeout(timeout).map_err(error::network)?;

        #[cfg(feature = "tracing")]
        {
            if let Ok(peer) = conn.stream.get_ref().peer_addr() {
                tracing::debug!("connected to {}", peer);
            }
        }

        match conn.read_response() {
            Ok(_greeting) => Ok(conn),
            Err(err) => {
                conn.close();
                Err(err)
            }
        }
    }

    /// Set timeout
    pub fn set_timeout(&mut self, duration: Option<Duration>) -> io::Result<()> {
        self.stream.get_mut().set_read_timeout(duration)?;
        self.stream.get_mut().set_write_timeout(duration)
    }

    /// Sends an SMTP command
    pub fn command<C: Display>(&mut self, command: C) -> Result<Response, Error> {
        self.send_line(&command.to_string())?;
        self.read_response()
    }

    /// Writes `line` verbatim, the caller provides the line terminator
    pub fn send_line(&mut self, line: &str) -> Result<(), Error> {
        self.send_bytes(line.as_bytes())
    }

    /// Writes `bytes` verbatim and flushes them
    pub fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.write(bytes).map_err(error::from_io)
    }

    /// Writes message data, escaping lines starting with a dot
    pub fn send_data(&mut self, data: &[u8]) -> Result<(), Error> {
        self.data_writer().write_all(data).map_err(error::from_io)
    }

    /// An [`io::Write`] over message data, escaping lines starting with a dot
    ///
    /// Every write is flushed to the server before it returns.
    pub fn data_writer(&mut self) -> DataWriter<'_> {
        DataWriter { conn: self }
    }

    /// Sends the end-of-data marker and reads the acceptance reply
    pub fn end_data(&mut self) -> Result<Response, Error> {
        self.codec = ClientCodec::new();
        self.send_bytes(b"\r\n.\r\n")?;
        self.read_response()
    }

    /// Writes a string to the server
    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.closed {
            return Err(io::ErrorKind::NotConnected.into());
        }
        self.stream.get_mut().write_all(bytes)?;
        self.stream.get_mut().flush()?;

        #[cfg(feature = "tracing")]
        tracing::debug!("Wrote: {}", escape_crlf(&String::from_utf8_lossy(bytes)));
        Ok(())
    }

    /// Gets the SMTP response
    ///
    /// Reads until a complete reply has arrived, then classifies it by its
    /// leading characters: `354` and anything starting with `2` are
    /// returned, everything else becomes a connection error holding the raw
    /// text. A complete reply outside the reply grammar is classified the
    /// same way, without a code.
    pub fn read_response(&mut self) -> Result<Response, Error> {
        if self.closed {
            return Err(error::network(io::Error::from(io::ErrorKind::NotConnected)));
        }

        let mut buffer = String::with_capacity(100);

        while self
            .stream
            .read_line(&mut buffer)
            .map_err(error::from_io)?
            > 0
        {
            #[cfg(feature = "tracing")]
            tracing::debug!("<< {}", escape_crlf(&buffer));
            let malformed = match parse_response(&buffer) {
                Ok((_remaining, response)) => return classify(response),
                Err(nom::Err::Incomplete(_)) => false,
                Err(nom::Err::Failure(_)) | Err(nom::Err::Error(_)) => true,
            };
            if malformed {
                #[cfg(feature = "tracing")]
                tracing::warn!("malformed reply: {}", escape_crlf(&buffer));
                return classify(Response::unparsed(buffer));
            }
        }

        if buffer.is_empty() {
            Err(error::network("connection closed by server"))
        } else {
            Err(error::connection(None, buffer))
        }
    }

    /// Shuts the connection down, once
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.stream.get_ref().shutdown(Shutdown::Both);

        #[cfg(feature = "tracing")]
        tracing::debug!("connection closed");
    }

    /// Whether [`close`](SmtpConnection::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for SmtpConnection {
    fn drop(&mut self) {
        self.close();
    }
}

fn classify(response: Response) -> Result<Response, Error> {
    match response.outcome() {
        Outcome::Continue | Outcome::Success => Ok(response),
        Outcome::Failure => {
            #[cfg(feature = "tracing")]
            tracing::warn!("server refused: {}", escape_crlf(response.raw()));
            Err(error::connection(response.code(), response.raw().to_owned()))
        }
    }
}

/// Message data sink returned by [`SmtpConnection::data_writer`]
pub struct DataWriter<'a> {
    conn: &'a mut SmtpConnection,
}

impl Write for DataWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = Vec::with_capacity(buf.len() + 1);
        self.conn.codec.encode(buf, &mut out);
        self.conn.write(&out)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::client::MockStream;

    fn open(replies: &[&str]) -> (Result<SmtpConnection, Error>, MockStream) {
        let mock = MockStream::with_replies(replies);
        let conn = SmtpConnection::open(NetworkStream::Mock(mock.clone()), None);
        (conn, mock)
    }

    #[test]
    fn greeting_accepted() {
        let (conn, mock) = open(&["220 ready\r\n"]);
        let conn = conn.unwrap();
        assert!(!conn.is_closed());
        assert!(mock.written().is_empty());
    }

    #[test]
    fn greeting_refused_closes() {
        let (conn, mock) = open(&["554 go away\r\n"]);
        let err = conn.err().unwrap();
        assert!(err.is_connection());
        assert!(err.to_string().contains("554 go away"));
        assert!(mock.is_closed());
    }

    #[test]
    fn multiline_reply() {
        let (conn, mock) = open(&[
            "220 ready\r\n",
            "250-mail.example.com\r\n250-8BITMIME\r\n250 SIZE 42\r\n",
        ]);
        let mut conn = conn.unwrap();
        let response = conn.command("EHLO me\r\n").unwrap();

        assert!(response.has_code(250));
        assert_eq!(
            response.message().collect::<Vec<_>>(),
            ["mail.example.com", "8BITMIME", "SIZE 42"]
        );
        assert_eq!(mock.written(), b"EHLO me\r\n");
    }

    #[test]
    fn start_data_is_accepted() {
        let (conn, _mock) = open(&["220 ready\r\n", "354 go ahead\r\n"]);
        let response = conn.unwrap().command("DATA\r\n").unwrap();
        assert!(response.has_code(354));
    }

    #[test]
    fn failure_reply_keeps_raw_text() {
        let (conn, _mock) = open(&["220 ready\r\n", "550-no such user\r\n550 really\r\n"]);
        let err = conn.unwrap().command("RCPT TO: <b@x.com>\r\n").unwrap_err();

        assert!(err.is_connection());
        assert_eq!(err.status().map(u16::from), Some(550));
        assert!(err.to_string().ends_with("550-no such user\r\n550 really\r\n"));
    }

    #[test]
    fn garbage_reply_is_failure() {
        let (conn, _mock) = open(&["220 ready\r\n", "hello\r\n"]);
        let err = conn.unwrap().read_response().unwrap_err();
        assert!(err.is_connection());
        assert_eq!(err.status(), None);
        assert!(err.to_string().ends_with("hello\r\n"));
    }

    #[test]
    fn bare_lf_reply_is_classified() {
        let (conn, mock) = open(&["550 denied\n"]);
        let err = conn.err().unwrap();
        assert!(err.is_connection());
        assert_eq!(err.status().map(u16::from), Some(550));
        assert!(mock.is_closed());
    }

    #[test]
    fn leading_two_without_space_is_success() {
        let (conn, _mock) = open(&["220ready\r\n", "250\r\n", "299 odd\r\n"]);
        let mut conn = conn.unwrap();
        assert!(conn.read_response().unwrap().has_code(250));

        let odd = conn.read_response().unwrap();
        assert_eq!(odd.code(), None);
        assert_eq!(odd.raw(), "299 odd\r\n");
    }

    #[test]
    fn truncated_reply_is_failure() {
        let (conn, _mock) = open(&["220 ready\r\n", "250 o"]);
        let err = conn.unwrap().read_response().unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn closed_by_server() {
        let (conn, _mock) = open(&["220 ready\r\n"]);
        let err = conn.unwrap().read_response().unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn data_is_dot_stuffed_and_terminated() {
        let (conn, mock) = open(&["220 ready\r\n", "250 queued\r\n"]);
        let mut conn = conn.unwrap();

        conn.send_data(b"line\r\n.hidden\r\n").unwrap();
        let response = conn.end_data().unwrap();

        assert!(response.has_code(250));
        assert_eq!(mock.written(), b"line\r\n..hidden\r\n\r\n.\r\n");
    }

    #[test]
    fn close_on_drop() {
        let (conn, mock) = open(&["220 ready\r\n"]);
        drop(conn);
        assert!(mock.is_closed());
    }

    #[test]
    fn closed_connection_rejects_io() {
        let (conn, _mock) = open(&["220 ready\r\n"]);
        let mut conn = conn.unwrap();
        conn.close();

        assert!(conn.is_closed());
        assert!(conn.send_line("QUIT\r\n").is_err());
        assert!(conn.read_response().unwrap_err().is_network());
    }
}
