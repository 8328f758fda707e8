//! SMTP commands

use std::{
    fmt::{self, Display, Formatter},
    net::{Ipv4Addr, Ipv6Addr},
};

use crate::address::Address;

/// Client identifier, the parameter to `EHLO`
///
/// This is configuration, it is never looked up from the local host.
#[derive(PartialEq, Eq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ClientId {
    /// A fully-qualified domain name
    Domain(String),
    /// An IPv4 address
    Ipv4(Ipv4Addr),
    /// An IPv6 address
    Ipv6(Ipv6Addr),
}

const LOCALHOST_CLIENT: ClientId = ClientId::Ipv4(Ipv4Addr::new(127, 0, 0, 1));

impl Default for ClientId {
    fn default() -> Self {
        LOCALHOST_CLIENT
    }
}

impl ClientId {
    /// Whether the name can be sent on the `EHLO` line: not empty, no line breaks
    pub fn is_valid(&self) -> bool {
        match *self {
            Self::Domain(ref value) => !value.is_empty() && !value.contains(['\r', '\n']),
            Self::Ipv4(_) | Self::Ipv6(_) => true,
        }
    }
}

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Domain(ref value) => f.write_str(value),
            Self::Ipv4(ref value) => write!(f, "[{value}]"),
            Self::Ipv6(ref value) => write!(f, "[IPv6:{value}]"),
        }
    }
}

/// EHLO command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Ehlo {
    client_id: ClientId,
}

impl Display for Ehlo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "EHLO {}\r\n", self.client_id)
    }
}

impl Ehlo {
    /// Creates a EHLO command
    pub fn new(client_id: ClientId) -> Ehlo {
        Ehlo { client_id }
    }
}

/// MAIL command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Mail {
    sender: Address,
}

impl Display for Mail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "MAIL FROM: <{}>\r\n", self.sender)
    }
}

impl Mail {
    /// Creates a MAIL command
    pub fn new(sender: Address) -> Mail {
        Mail { sender }
    }
}

/// RCPT command
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Rcpt {
    recipient: Address,
}

impl Display for Rcpt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RCPT TO: <{}>\r\n", self.recipient)
    }
}

impl Rcpt {
    /// Creates an RCPT command
    pub fn new(recipient: Address) -> Rcpt {
        Rcpt { recipient }
    }
}

/// DATA command
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub struct Data;

impl Display for Data {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("DATA\r\n")
    }
}

/// QUIT command
#[derive(PartialEq, Eq, Clone, Debug, Copy)]
pub struct Quit;

impl Display for Quit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("QUIT\r\n")
    }
}

#[cfg(test)]
mod test {
    use std::net::Ipv6Addr;

    use super::*;

    #[test]
    fn test_display() {
        let id = ClientId::Domain("localhost".to_owned());
        let address: Address = "test@example.com".parse().unwrap();

        assert_eq!(format!("{}", Ehlo::new(id)), "EHLO localhost\r\n");
        assert_eq!(
            format!("{}", Mail::new(address.clone())),
            "MAIL FROM: <test@example.com>\r\n"
        );
        assert_eq!(
            format!("{}", Rcpt::new(address)),
            "RCPT TO: <test@example.com>\r\n"
        );
        assert_eq!(Data.to_string(), "DATA\r\n");
        assert_eq!(Quit.to_string(), "QUIT\r\n");
    }

    #[test]
    fn test_client_id_valid() {
        assert!(ClientId::default().is_valid());
        assert!(ClientId::Domain("mail.example.com".to_owned()).is_valid());
        assert!(!ClientId::Domain("a\r\nRSET".to_owned()).is_valid());
        assert!(!ClientId::Domain("a\nRSET".to_owned()).is_valid());
        assert!(!ClientId::Domain(String::new()).is_valid());
    }

    #[test]
    fn test_client_id_display() {
        assert_eq!(ClientId::default().to_string(), "[127.0.0.1]");
        assert_eq!(
            ClientId::Ipv6(Ipv6Addr::LOCALHOST).to_string(),
            "[IPv6:::1]"
        );
        assert_eq!(
            ClientId::Domain("mail.example.com".to_owned()).to_string(),
            "mail.example.com"
        );
    }
}
