//! In-memory country range index and address resolution.
//!
//! ## Structure
//!
//! - [`NetworkIndex`] owns every parsed [`NetworkRange`], sorted by start address
//! - [`Resolution`] is the outcome of resolving one address string
//! - [`IndexStats`] summarises what was loaded
//!
//! ## Lookup
//!
//! The table is sorted by start address only. A lookup finds the last range
//! whose start is `<=` the address (upper-bound binary search), then checks that
//! range and the one before it for actual containment, nearest first. Zone data
//! from one source does not overlap, so the first candidate normally decides;
//! the second covers a single level of nesting, e.g. a small block sitting at
//! the start of a larger one that also contains the address.
//!
//! Deeper nesting is not searched. See [`NetworkIndex::lookup_v4`].
//!
//! ## Performance characteristics
//!
//! - Building is `O(n log n)` and happens once per run
//! - Lookups are `O(log n)` with no heap allocation
//! - The index is never mutated after construction

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::net::Ipv4Addr;

use crate::cidr::NetworkRange;
use crate::country::CountryCode;
use crate::zones::BlockSource;

/// Ranges checked for containment at and below the binary-search cut point.
const CANDIDATES: usize = 2;

/// Result of resolving an address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The address lies in a block attributed to this country.
    Country(CountryCode),
    /// A valid IPv4 address not covered by any loaded block.
    Unknown,
    /// The input is not an IPv4 address.
    InvalidIp,
}

impl Resolution {
    pub const UNKNOWN: &'static str = "UNKNOWN";
    pub const INVALID_IP: &'static str = "INVALID IP";

    /// The country code, `"UNKNOWN"` or `"INVALID IP"`.
    pub fn as_str(&self) -> &str {
        match self {
            Resolution::Country(code) => code.as_str(),
            Resolution::Unknown => Self::UNKNOWN,
            Resolution::InvalidIp => Self::INVALID_IP,
        }
    }

    pub fn country(&self) -> Option<CountryCode> {
        match self {
            Resolution::Country(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sorted, read-only table of country network ranges.
#[derive(Debug, Clone, Default)]
pub struct NetworkIndex {
    ranges: Vec<NetworkRange>,
}

impl NetworkIndex {
    /// Build an index from every country's blocks in `source`.
    ///
    /// Countries the source has nothing for are skipped, as are blocks that do
    /// not parse as IPv4 CIDRs. A code listed more than once is loaded once.
    ///
    /// # Examples
    /// ```
    /// use std::collections::HashMap;
    /// use country_cidr_lookup::{CountryCode, NetworkIndex};
    ///
    /// let us = CountryCode::parse("us").unwrap();
    /// let zones = HashMap::from([(us, "1.0.0.0/24\n".to_string())]);
    ///
    /// let index = NetworkIndex::build(&[us], &zones);
    /// assert_eq!(index.resolve("1.0.0.5").as_str(), "US");
    /// ```
    pub fn build<S: BlockSource + ?Sized>(codes: &[CountryCode], source: &S) -> Self {
        let mut seen = HashSet::with_capacity(codes.len());
        let mut ranges = Vec::new();
        let mut loaded = 0usize;

        for &code in codes {
            if !seen.insert(code) {
                continue;
            }

            let blocks = source.blocks(code);
            if blocks.is_empty() {
                log::debug!("no CIDR blocks for {code}");
                continue;
            }

            loaded += 1;
            ranges.extend(crate::parse_blocks(code, blocks));
        }

        log::info!(
            "loaded {} ranges for {loaded} of {} countries",
            ranges.len(),
            seen.len()
        );
        Self::from_ranges(ranges)
    }

    /// Build an index from already-parsed ranges.
    ///
    /// Ranges with equal start addresses keep their relative order.
    pub fn from_ranges(mut ranges: Vec<NetworkRange>) -> Self {
        ranges.sort_by_key(NetworkRange::start);
        NetworkIndex { ranges }
    }

    /// Find the range containing `ip`.
    ///
    /// Returns [`None`] if neither the last range starting at or before `ip`
    /// nor the one preceding it contains `ip`.
    #[inline]
    pub fn lookup_v4(&self, ip: Ipv4Addr) -> Option<&NetworkRange> {
        let ip_u32 = u32::from(ip);

        // upper_bound: first index whose start is > ip
        let idx = self.ranges.partition_point(|r| r.start() <= ip_u32);

        self.ranges[..idx]
            .iter()
            .rev()
            .take(CANDIDATES)
            .find(|r| r.contains(ip_u32))
    }

    /// Resolve an address string to a country.
    ///
    /// Input that is not a dotted-quad IPv4 address, IPv6 literals included,
    /// yields [`Resolution::InvalidIp`]; it is never an error.
    pub fn resolve(&self, ip: &str) -> Resolution {
        match ip.parse::<Ipv4Addr>() {
            Ok(v4) => self
                .lookup_v4(v4)
                .map_or(Resolution::Unknown, |r| Resolution::Country(r.country())),
            Err(_) => Resolution::InvalidIp,
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Ranges in ascending start-address order.
    pub fn iter(&self) -> std::slice::Iter<'_, NetworkRange> {
        self.ranges.iter()
    }

    /// Return basic statistics about the loaded index.
    ///
    /// This can be useful for sanity checks (e.g., validating that data loaded correctly).
    pub fn stats(&self) -> IndexStats {
        let mut ranges_per_country = BTreeMap::new();
        let mut addresses_spanned = 0u64;
        for range in &self.ranges {
            *ranges_per_country.entry(range.country()).or_insert(0usize) += 1;
            addresses_spanned += range.size();
        }

        IndexStats {
            total_ranges: self.ranges.len(),
            countries: ranges_per_country.len(),
            addresses_spanned,
            ranges_per_country,
        }
    }
}

#[cfg(feature = "download")]
impl NetworkIndex {
    /// Fetch the country list and zone archive described by `config` and build
    /// an index from them.
    ///
    /// # Errors
    /// Returns an error if either download still fails after
    /// `config.max_attempts` attempts, if the country list yields no codes, or
    /// if the archive is corrupt.
    ///
    /// # Feature
    /// Available only when the crate is built with the `download` feature.
    pub fn download(config: &crate::SourceConfig) -> Result<Self, crate::Error> {
        let codes = crate::download::fetch_country_codes(config)?;
        if codes.is_empty() {
            return Err(crate::Error::NoCountryCodes);
        }
        let archive = crate::download::fetch_zone_archive(config)?;
        Ok(Self::build(&codes, &archive))
    }
}

impl<'a> IntoIterator for &'a NetworkIndex {
    type Item = &'a NetworkRange;
    type IntoIter = std::slice::Iter<'a, NetworkRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

/// Summary counts for the index contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub total_ranges: usize,
    pub countries: usize,
    /// Sum of range sizes; overlapping ranges are counted twice.
    pub addresses_spanned: u64,
    pub ranges_per_country: BTreeMap<CountryCode, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cidr::parse_cidr;
    use std::collections::HashMap;

    fn cc(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    fn zones(entries: &[(&str, &str)]) -> HashMap<CountryCode, String> {
        entries
            .iter()
            .map(|(code, text)| (cc(code), text.to_string()))
            .collect()
    }

    fn us_ca() -> NetworkIndex {
        let source = zones(&[("us", "1.0.0.0/24\n"), ("ca", "2.0.0.0/24\n")]);
        NetworkIndex::build(&[cc("us"), cc("ca")], &source)
    }

    #[test]
    fn test_two_country_scenario() {
        let index = us_ca();

        assert_eq!(index.resolve("1.0.0.5"), Resolution::Country(cc("US")));
        assert_eq!(index.resolve("2.0.0.255").as_str(), "CA");
        assert_eq!(index.resolve("3.0.0.1"), Resolution::Unknown);
        assert_eq!(index.resolve("1.0.1.1"), Resolution::Unknown);
    }

    #[test]
    fn test_resolution_country() {
        let index = us_ca();

        assert_eq!(index.resolve("1.0.0.5").country(), Some(cc("us")));
        assert_eq!(index.resolve("3.0.0.1").country(), None);
        assert_eq!(index.resolve("not-an-ip").country(), None);
    }

    #[test]
    fn test_range_boundaries() {
        let index = us_ca();

        assert_eq!(index.resolve("1.0.0.0").as_str(), "US");
        assert_eq!(index.resolve("1.0.0.255").as_str(), "US");
        assert_eq!(index.resolve("0.255.255.255").as_str(), "UNKNOWN");
        assert_eq!(index.resolve("0.0.0.0").as_str(), "UNKNOWN");
        assert_eq!(index.resolve("255.255.255.255").as_str(), "UNKNOWN");
    }

    #[test]
    fn test_invalid_input() {
        let index = us_ca();

        for bad in ["not-an-ip", "1.2.3.4.5", "::1", "2001:db8::1", "", " 1.0.0.5", "1.0.0"] {
            assert_eq!(index.resolve(bad), Resolution::InvalidIp, "{bad:?}");
            assert_eq!(index.resolve(bad).to_string(), "INVALID IP");
        }
    }

    #[test]
    fn test_empty_index() {
        let index = NetworkIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.resolve("8.8.8.8"), Resolution::Unknown);
        assert!(index.lookup_v4(Ipv4Addr::BROADCAST).is_none());
    }

    #[test]
    fn test_missing_country_member() {
        let source = zones(&[("us", "1.0.0.0/24\n")]);
        let index = NetworkIndex::build(&[cc("us"), cc("fr")], &source);

        assert_eq!(index.len(), 1);
        assert!(index.iter().all(|r| r.country() != cc("fr")));
        assert_eq!(index.stats().countries, 1);
    }

    #[test]
    fn test_sorted_and_normalised() {
        let source = zones(&[
            ("de", "46.4.0.0/16\n5.1.0.0/16\n"),
            ("nl", "\n145.220.3.9/16\n\nbogus\n2a00::/12\n"),
        ]);
        let index = NetworkIndex::build(&[cc("de"), cc("nl")], &source);

        let starts: Vec<u32> = index.iter().map(NetworkRange::start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
        assert_eq!(index.len(), 3);
        assert_eq!(index.resolve("145.220.255.1").as_str(), "NL");
    }

    #[test]
    fn test_duplicate_codes_loaded_once() {
        let source = zones(&[("us", "1.0.0.0/24\n")]);
        let index = NetworkIndex::build(&[cc("us"), cc("US"), cc("us")], &source);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_nested_range_checks_second_candidate() {
        // 10.0.0.0/24 sits at the start of 10.0.0.0/8 and ends before the query.
        let source = zones(&[("us", "10.0.0.0/8\n"), ("ca", "10.0.0.0/24\n")]);
        let index = NetworkIndex::build(&[cc("us"), cc("ca")], &source);

        assert_eq!(index.resolve("10.0.0.7").as_str(), "CA");
        assert_eq!(index.resolve("10.200.0.1").as_str(), "US");
    }

    #[test]
    fn test_nearest_candidate_wins() {
        let source = zones(&[("us", "10.0.0.0/8\n"), ("ca", "10.1.0.0/16\n")]);
        let index = NetworkIndex::build(&[cc("us"), cc("ca")], &source);

        assert_eq!(index.resolve("10.1.2.3").as_str(), "CA");
        assert_eq!(index.resolve("10.2.0.0").as_str(), "US");
    }

    #[test]
    fn test_deep_nesting_is_not_searched() {
        let source = zones(&[
            ("us", "10.0.0.0/8\n"),
            ("ca", "10.1.0.0/24\n"),
            ("mx", "10.2.0.0/24\n"),
        ]);
        let index = NetworkIndex::build(&[cc("us"), cc("ca"), cc("mx")], &source);

        // Only the two ranges nearest the cut point are checked.
        assert_eq!(index.resolve("10.3.0.1"), Resolution::Unknown);
    }

    #[test]
    fn test_equal_starts_keep_insertion_order() {
        let ranges = vec![
            parse_cidr("1.0.0.0/24", cc("us")).unwrap(),
            parse_cidr("0.0.0.0/8", cc("zz")).unwrap(),
            parse_cidr("1.0.0.0/24", cc("ca")).unwrap(),
        ];
        let index = NetworkIndex::from_ranges(ranges);

        let order: Vec<String> = index.iter().map(|r| r.country().to_string()).collect();
        assert_eq!(order, ["ZZ", "US", "CA"]);
        // Nearest candidate is the later-inserted duplicate.
        assert_eq!(index.resolve("1.0.0.1").as_str(), "CA");
    }

    #[test]
    fn test_rebuild_answers_identically() {
        let source = zones(&[
            ("us", "3.0.0.0/8\n1.0.0.0/24\n"),
            ("ca", "2.0.0.0/24\n24.0.0.0/12\n"),
            ("gb", "2.0.0.0/24\n"),
        ]);
        let codes = [cc("us"), cc("ca"), cc("gb")];
        let first = NetworkIndex::build(&codes, &source);
        let reversed: Vec<CountryCode> = codes.iter().rev().copied().collect();
        let second = NetworkIndex::build(&reversed, &source);

        for ip in ["1.0.0.1", "3.4.5.6", "24.15.0.1", "24.16.0.0", "9.9.9.9", "x"] {
            assert_eq!(first.resolve(ip), second.resolve(ip), "{ip}");
        }

        // CA and GB share 2.0.0.0/24; which one is nearer may differ between
        // builds, but the address is attributed either way.
        for index in [&first, &second] {
            let owner = index.resolve("2.0.0.1").to_string();
            assert!(owner == "CA" || owner == "GB", "{owner}");
        }
        assert_eq!(first.stats(), second.stats());
    }

    #[test]
    fn test_stats() {
        let source = zones(&[("us", "1.0.0.0/24\n3.0.0.0/8\n"), ("ca", "2.0.0.0/24\n")]);
        let stats = NetworkIndex::build(&[cc("us"), cc("ca")], &source).stats();

        assert_eq!(stats.total_ranges, 3);
        assert_eq!(stats.countries, 2);
        assert_eq!(stats.addresses_spanned, 256 + 256 + (1 << 24));
        assert_eq!(stats.ranges_per_country[&cc("us")], 2);
        assert_eq!(stats.ranges_per_country[&cc("ca")], 1);
    }

    #[test]
    fn test_index_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NetworkIndex>();

        let index = std::sync::Arc::new(us_ca());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let index = std::sync::Arc::clone(&index);
                std::thread::spawn(move || index.resolve("2.0.0.1"))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().as_str(), "CA");
        }
    }
}
