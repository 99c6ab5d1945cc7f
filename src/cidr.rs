//! IPv4 network ranges and CIDR parsing.
//!
//! A [`NetworkRange`] is always stored in canonical form: its start address is
//! the network address with every host bit zeroed. The strict constructor
//! rejects anything else; [`parse_cidr`] is the permissive path used for zone
//! files and masks host bits off, the way most real-world tooling does.

use std::fmt;
use std::net::Ipv4Addr;

use crate::country::CountryCode;
use crate::error::CidrError;

/// Longest IPv4 prefix length.
pub const MAX_PREFIX_LEN: u8 = 32;

/// Network mask for a prefix length, e.g. `24 -> 0xFFFF_FF00`.
///
/// Callers must pass `prefix_len <= 32`.
#[inline]
pub fn prefix_mask(prefix_len: u8) -> u32 {
    debug_assert!(prefix_len <= MAX_PREFIX_LEN);
    u32::MAX
        .checked_shl(u32::from(MAX_PREFIX_LEN - prefix_len))
        .unwrap_or(0)
}

/// One CIDR block attributed to a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkRange {
    start: u32,
    prefix_len: u8,
    country: CountryCode,
}

impl NetworkRange {
    /// Strict constructor: `start` must already be the network address.
    ///
    /// # Examples
    /// ```
    /// use std::net::Ipv4Addr;
    /// use country_cidr_lookup::{CountryCode, NetworkRange};
    ///
    /// let us = CountryCode::parse("us").unwrap();
    /// assert!(NetworkRange::new(Ipv4Addr::new(10, 0, 0, 0), 24, us).is_ok());
    /// assert!(NetworkRange::new(Ipv4Addr::new(10, 0, 0, 5), 24, us).is_err());
    /// ```
    pub fn new(start: Ipv4Addr, prefix_len: u8, country: CountryCode) -> Result<Self, CidrError> {
        if prefix_len > MAX_PREFIX_LEN {
            return Err(CidrError::InvalidPrefix(format!("{start}/{prefix_len}")));
        }
        let bits = u32::from(start);
        if bits & !prefix_mask(prefix_len) != 0 {
            return Err(CidrError::NonCanonical { address: start, prefix_len });
        }
        Ok(NetworkRange { start: bits, prefix_len, country })
    }

    /// First address of the block as an integer.
    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last address of the block as an integer (inclusive).
    #[inline]
    pub fn end(&self) -> u32 {
        self.start | !prefix_mask(self.prefix_len)
    }

    #[inline]
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    #[inline]
    pub fn country(&self) -> CountryCode {
        self.country
    }

    /// Network address of the block.
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.start)
    }

    /// Number of addresses in the block (`2^(32 - prefix_len)`).
    pub fn size(&self) -> u64 {
        1u64 << (MAX_PREFIX_LEN - self.prefix_len)
    }

    /// `start <= ip <= end`.
    #[inline]
    pub fn contains(&self, ip: u32) -> bool {
        self.start <= ip && ip <= self.end()
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len)
    }
}

/// Parse an IPv4 CIDR in non-strict mode.
///
/// Accepted forms are `a.b.c.d/len`, `a.b.c.d/m.m.m.m` (contiguous netmask or
/// hostmask, so `/255.255.255.0` and `/0.0.0.255` both mean /24) and a bare
/// `a.b.c.d`, which is taken as a /32. Host bits in the address are
/// masked off, so `10.0.0.5/24` yields `10.0.0.0/24`. Anything else, IPv6
/// included, is an error.
///
/// # Examples
/// ```
/// use country_cidr_lookup::{parse_cidr, CountryCode};
///
/// let ca = CountryCode::parse("CA").unwrap();
/// let range = parse_cidr("10.0.0.5/24", ca).unwrap();
/// assert_eq!(range.to_string(), "10.0.0.0/24");
/// ```
pub fn parse_cidr(s: &str, country: CountryCode) -> Result<NetworkRange, CidrError> {
    let (addr, prefix) = match s.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (s, None),
    };

    let addr: Ipv4Addr = addr
        .parse()
        .map_err(|_| CidrError::InvalidAddress(s.to_string()))?;

    let prefix_len = match prefix {
        None => MAX_PREFIX_LEN,
        Some(p) => parse_prefix(p).ok_or_else(|| CidrError::InvalidPrefix(s.to_string()))?,
    };

    let network = Ipv4Addr::from(u32::from(addr) & prefix_mask(prefix_len));
    NetworkRange::new(network, prefix_len, country)
}

/// Prefix length from a decimal length, a dotted netmask or a dotted hostmask.
///
/// A netmask reading wins when both apply (`0.0.0.0` is /0, not /32).
fn parse_prefix(p: &str) -> Option<u8> {
    if !p.is_empty() && p.len() <= 2 && p.bytes().all(|b| b.is_ascii_digit()) {
        let len: u8 = p.parse().ok()?;
        return (len <= MAX_PREFIX_LEN).then_some(len);
    }

    let mask = u32::from(p.parse::<Ipv4Addr>().ok()?);
    netmask_len(mask).or_else(|| netmask_len(!mask))
}

/// Prefix length of a contiguous netmask, e.g. `0xFFFF_FF00 -> 24`.
fn netmask_len(mask: u32) -> Option<u8> {
    let ones = mask.leading_ones();
    (ones + mask.trailing_zeros() == u32::from(MAX_PREFIX_LEN)).then_some(ones as u8)
}
