//! # IPv4 Country Attribution from CIDR Zone Tables
//!
//! This crate maps IPv4 addresses to ISO-3166 country codes using per-country
//! CIDR block lists ("zone files"), such as the aggregated archive published by
//! ipdeny.com. The whole table is rebuilt in memory on every run and then
//! queried with binary search.
//!
//! ## What this crate does
//!
//! - Fetches the list of country codes and the bulk zone archive, retrying each
//!   download a fixed number of times (feature `download`, on by default).
//! - Parses zone files permissively: host bits are masked off, blank lines are
//!   skipped, and lines that are not IPv4 CIDRs are discarded.
//! - Resolves addresses in `O(log n)` to a country, `"UNKNOWN"` or `"INVALID IP"`.
//!
//! ## What this crate does NOT do
//!
//! - It does **not** handle IPv6 addresses; they resolve as `"INVALID IP"`.
//! - It does **not** persist the built table or update it incrementally.
//! - It does **not** resolve below country granularity.
//!
//! ## Data flow
//!
//! ```text
//! country list ──> [CountryCode] ──┐
//!                                  ├──> NetworkIndex::build ──> resolve(ip)
//! zone archive ──> ZoneArchive ────┘
//! ```
//!
//! The built [`NetworkIndex`] is immutable and can be shared across threads
//! without locking.
mod cidr;
mod config;
mod country;
mod database;
#[cfg(feature = "download")]
mod download;
mod error;
mod retry;
mod zones;

// Re-export public API
pub use cidr::{MAX_PREFIX_LEN, NetworkRange, parse_cidr, prefix_mask};
pub use config::{COUNTRY_LIST_URL, DEFAULT_CODE_COLUMN, SourceConfig, ZONE_ARCHIVE_URL};
pub use country::{CountryCode, parse_country_codes};
pub use database::{IndexStats, NetworkIndex, Resolution};
#[cfg(feature = "download")]
pub use download::{fetch_country_codes, fetch_zone_archive};
pub use error::{ArchiveError, CidrError, CountryCodeError, Error};
pub use retry::{DEFAULT_MAX_ATTEMPTS, with_retry};
pub use zones::{BlockSource, ZoneArchive};

/// Parses the text of one zone file into network ranges for `country`.
///
/// Blank lines are skipped and lines that do not parse as IPv4 CIDRs (IPv6
/// blocks, comments, garbage) are silently discarded.
///
/// # Examples
/// ```
/// use country_cidr_lookup::{parse_zone, CountryCode};
///
/// let us = CountryCode::parse("us").unwrap();
/// let ranges = parse_zone(us, "1.0.0.0/24\n\n2001:db8::/32\n3.0.0.9/8\n");
/// assert_eq!(ranges.len(), 2);
/// assert_eq!(ranges[1].to_string(), "3.0.0.0/8");
/// ```
pub fn parse_zone(country: CountryCode, text: &str) -> Vec<NetworkRange> {
    parse_blocks(
        country,
        text.lines().map(str::trim).filter(|line| !line.is_empty()),
    )
}

pub(crate) fn parse_blocks<'a, I>(country: CountryCode, blocks: I) -> Vec<NetworkRange>
where
    I: IntoIterator<Item = &'a str>,
{
    blocks
        .into_iter()
        .filter_map(|block| match parse_cidr(block, country) {
            Ok(range) => Some(range),
            Err(e) => {
                log::trace!("discarding {country} block: {e}");
                None
            }
        })
        .collect()
}
