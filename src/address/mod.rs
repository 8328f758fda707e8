//! Email addresses

mod types;

pub use self::types::{Address, AddressError};
