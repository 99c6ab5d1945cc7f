//! Country codes and the country list source.
//!
//! The country list is a CSV document with one ISO-3166 alpha-2 code per row in
//! a designated column (`Code` for the datahub.io list). Codes are normalised
//! to upper case exactly once, when parsed; the lower-case form is only derived
//! when naming zone archive members.

use std::fmt;
use std::str::FromStr;

use crate::error::CountryCodeError;

/// ISO-3166 alpha-2 country code, stored as two upper-case ASCII bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Parse a two-letter code in either case. Surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, CountryCodeError> {
        match s.trim().as_bytes() {
            &[a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                Ok(CountryCode([a.to_ascii_uppercase(), b.to_ascii_uppercase()]))
            }
            _ => Err(CountryCodeError(s.to_string())),
        }
    }

    /// The code in upper case, e.g. `"US"`.
    pub fn as_str(&self) -> &str {
        // Always ASCII by construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    /// The code in lower case, as used by zone archive member names.
    pub fn to_lowercase(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Name of this country's member in the zone archive, e.g. `"us.zone"`.
    pub fn zone_file_name(&self) -> String {
        format!("{}.zone", self.to_lowercase())
    }
}

impl FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract country codes from the `column` column of a CSV document.
///
/// Rows that lack the column, are not valid UTF-8, hold an empty value, or hold
/// something that is not a two-letter code are skipped. If the header has no such column at all,
/// the result is empty; treating that as fatal is up to the caller.
///
/// # Examples
/// ```
/// use country_cidr_lookup::parse_country_codes;
///
/// let csv = "Name,Code\nCanada,CA\n\"Korea, Republic of\",kr\n";
/// let codes = parse_country_codes(csv, "Code");
/// let codes: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
/// assert_eq!(codes, ["CA", "KR"]);
/// ```
pub fn parse_country_codes<T>(csv_data: &T, column: &str) -> Vec<CountryCode>
where
    T: AsRef<[u8]> + ?Sized,
{
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_data.as_ref());

    let idx = match reader.headers() {
        Ok(headers) => headers.iter().position(|h| h.trim() == column),
        Err(e) => {
            log::warn!("unreadable country list header: {e}");
            None
        }
    };
    let Some(idx) = idx else {
        log::warn!("country list has no {column:?} column");
        return Vec::new();
    };

    reader
        .records()
        .filter_map(|record| match record {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("skipping unreadable country list row: {e}");
                None
            }
        })
        .filter_map(|record| {
            let value = record.get(idx)?;
            match CountryCode::parse(value) {
                Ok(code) => Some(code),
                Err(e) => {
                    log::debug!("skipping country list row: {e}");
                    None
                }
            }
        })
        .collect()
}
