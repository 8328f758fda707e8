//! SMTP client
//!
//! `SmtpConnection` allows manually sending SMTP commands.
//!
//! ```rust,no_run
//! # use std::time::Duration;
//! use mailpost::transport::{
//!     client::SmtpConnection,
//!     commands::{ClientId, Data, Ehlo, Mail, Quit, Rcpt},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut conn = SmtpConnection::connect(("localhost", 25), Some(Duration::from_secs(30)))?;
//! conn.command(Ehlo::new(ClientId::default()))?;
//! conn.command(Mail::new("user@example.com".parse()?))?;
//! conn.command(Rcpt::new("user@example.org".parse()?))?;
//! conn.command(Data)?;
//! conn.send_data(b"Subject: hello\r\n\r\nhello\r\n")?;
//! conn.end_data()?;
//! conn.command(Quit)?;
//! # Ok(())
//! # }
//! ```

pub use self::{
    connection::{DataWriter, SmtpConnection},
    mock::MockStream,
    net::NetworkStream,
};

mod connection;
mod mock;
mod net;

/// The codec used for transparency
///
/// Doubles the dot starting any line of message data, so that the data can
/// not be mistaken for the end-of-data marker.
#[derive(Clone, Copy, Debug)]
pub struct ClientCodec {
    escape_count: u8,
}

impl Default for ClientCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientCodec {
    /// Creates a new client codec, positioned at the start of a line
    pub fn new() -> Self {
        ClientCodec { escape_count: 2 }
    }

    /// Adds transparency
    pub fn encode(&mut self, frame: &[u8], buf: &mut Vec<u8>) {
        let mut start = 0;
        for (idx, byte) in frame.iter().enumerate() {
            match self.escape_count {
                0 => self.escape_count = if *byte == b'\r' { 1 } else { 0 },
                1 => self.escape_count = if *byte == b'\n' { 2 } else { 0 },
                2 => {
                    self.escape_count = match *byte {
                        b'.' => 3,
                        b'\r' => 1,
                        _ => 0,
                    }
                }
                _ => unreachable!(),
            }
            if self.escape_count == 3 {
                self.escape_count = 0;
                buf.extend_from_slice(&frame[start..idx]);
                buf.push(b'.');
                start = idx;
            }
        }
        buf.extend_from_slice(&frame[start..]);
    }
}

/// Returns the string replacing all the CRLF with "\<CRLF\>"
/// Used for debug displays
#[cfg(feature = "tracing")]
pub(super) fn escape_crlf(string: &str) -> String {
    string.replace("\r\n", "<CRLF>")
}
