use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::address::Address;

/// Represents an email address with an optional name for the sender/recipient.
///
/// The address goes into the envelope (`MAIL FROM` / `RCPT TO`), the name
/// into the `FROM` / `TO` headers.
///
/// # Examples
///
/// ```
/// # use mailpost::{Address, message::Mailbox};
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let address = Address::new("example", "email.com")?;
/// let mailbox = Mailbox::new(Some("John Smith".into()), address);
/// assert_eq!(mailbox.display_name(), "John Smith");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox {
    /// The name associated with the address.
    pub name: Option<String>,

    /// The email address itself.
    pub email: Address,
}

impl Mailbox {
    /// Creates a new `Mailbox` using an email address and the name of the recipient if there is one.
    pub fn new(name: Option<String>, email: Address) -> Self {
        Mailbox { name, email }
    }

    /// Name written in the message headers, falling back to the bare address
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.email.as_ref(),
        }
    }
}

impl Display for Mailbox {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

impl From<Address> for Mailbox {
    fn from(email: Address) -> Self {
        Mailbox::new(None, email)
    }
}
