//! Where the country list and zone archive come from, and how hard to try.

use std::time::Duration;

use crate::retry::DEFAULT_MAX_ATTEMPTS;

/// ISO-3166 country list (CSV with a `Code` column).
pub const COUNTRY_LIST_URL: &str = "https://datahub.io/core/country-list/_r/-/data.csv";

/// ipdeny.com aggregated zones: a gzipped tar with one `<code>.zone` per country.
pub const ZONE_ARCHIVE_URL: &str =
    "https://www.ipdeny.com/ipblocks/data/countries/all-zones.tar.gz";

/// Column of the country list holding the alpha-2 code.
pub const DEFAULT_CODE_COLUMN: &str = "Code";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Source locations and fetch policy for building an index from the network.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use country_cidr_lookup::SourceConfig;
///
/// let config = SourceConfig::default()
///     .with_max_attempts(5)
///     .with_timeout(Some(Duration::from_secs(10)));
/// assert_eq!(config.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub country_list_url: String,
    pub zone_archive_url: String,
    pub code_column: String,
    /// Attempts per fetch, first try included.
    pub max_attempts: u32,
    /// Per-attempt HTTP timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            country_list_url: COUNTRY_LIST_URL.to_string(),
            zone_archive_url: ZONE_ARCHIVE_URL.to_string(),
            code_column: DEFAULT_CODE_COLUMN.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl SourceConfig {
    pub fn with_country_list_url(mut self, url: impl Into<String>) -> Self {
        self.country_list_url = url.into();
        self
    }

    pub fn with_zone_archive_url(mut self, url: impl Into<String>) -> Self {
        self.zone_archive_url = url.into();
        self
    }

    pub fn with_code_column(mut self, column: impl Into<String>) -> Self {
        self.code_column = column.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}
