//! Error types.
//!
//! Only fetch failures and structural archive failures are fatal. Malformed
//! CIDR lines and unparseable query addresses are absorbed where they occur and
//! never show up here.

use std::io;

use thiserror::Error;

/// A value that is not a two-letter ASCII country code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid country code: {0:?}")]
pub struct CountryCodeError(pub String);

/// Reasons a CIDR string cannot become a [`crate::NetworkRange`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    #[error("invalid IPv4 address in {0:?}")]
    InvalidAddress(String),
    #[error("invalid prefix length or netmask in {0:?}")]
    InvalidPrefix(String),
    #[error("{address}/{prefix_len} has host bits set")]
    NonCanonical { address: std::net::Ipv4Addr, prefix_len: u8 },
}

/// The zone archive itself is unusable.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("corrupt or unreadable zone archive: {0}")]
    Io(#[from] io::Error),
    #[error("zone archive has no entries")]
    Empty,
    #[error("zone archive member {name} is unreadable: {source}")]
    Member {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Fatal errors from building an index out of remote sources.
#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("country list is empty")]
    NoCountryCodes,
}
