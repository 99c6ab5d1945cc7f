//! Per-country CIDR blocks.
//!
//! The bulk source is a gzip-compressed tar archive holding one member per
//! country, named `<lower-case code>.zone`, each a newline-separated list of
//! CIDR strings. The whole archive is decoded up front, so a corrupt stream
//! is reported once, when the archive is opened, and never while the index is
//! being built.
//!
//! [`BlockSource`] is the seam between block retrieval and the index builder:
//! anything that can hand out zone text per country can feed an index.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::{fs, io};

use flate2::read::GzDecoder;

use crate::country::CountryCode;
use crate::error::ArchiveError;

/// Provider of raw zone text per country.
pub trait BlockSource {
    /// Raw zone text for `code`, or `None` if the source has nothing for it.
    fn zone(&self, code: CountryCode) -> Option<&str>;

    /// Non-blank, trimmed CIDR strings for `code`.
    ///
    /// A country the source does not know yields an empty list.
    fn blocks(&self, code: CountryCode) -> Vec<&str> {
        self.zone(code)
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl BlockSource for HashMap<CountryCode, String> {
    fn zone(&self, code: CountryCode) -> Option<&str> {
        self.get(&code).map(String::as_str)
    }
}

/// Decoded zone archive, keyed by country.
#[derive(Debug, Default, Clone)]
pub struct ZoneArchive {
    zones: HashMap<CountryCode, String>,
}

impl ZoneArchive {
    /// Decode a gzipped tar archive held in memory.
    ///
    /// Members whose file name is not `<two letters>.zone` are ignored.
    ///
    /// # Errors
    /// Returns [`ArchiveError`] if the stream is not a valid gzip/tar archive,
    /// holds no entries at all, or a zone member is not UTF-8 text.
    pub fn from_gzip_bytes(bytes: &[u8]) -> Result<Self, ArchiveError> {
        Self::from_reader(bytes)
    }

    /// Decode a gzipped tar archive from disk, e.g. a previously downloaded copy.
    ///
    /// # Errors
    /// Returns [`ArchiveError`] if the file cannot be opened or is not a valid archive.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = fs::File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    fn from_reader<R: Read>(reader: R) -> Result<Self, ArchiveError> {
        let mut archive = tar::Archive::new(GzDecoder::new(reader));
        let mut zones = HashMap::new();
        let mut entries = 0usize;

        for entry in archive.entries()? {
            let mut entry = entry?;
            entries += 1;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let path = entry.path()?.into_owned();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(code) = name
                .strip_suffix(".zone")
                .and_then(|stem| CountryCode::parse(stem).ok())
            else {
                log::trace!("ignoring archive member {}", path.display());
                continue;
            };

            let mut text = String::new();
            entry
                .read_to_string(&mut text)
                .map_err(|source| ArchiveError::Member { name: name.to_string(), source })?;
            zones.insert(code, text);
        }

        if entries == 0 {
            return Err(ArchiveError::Empty);
        }

        log::info!("zone archive holds {} countries", zones.len());
        Ok(ZoneArchive { zones })
    }

    /// Number of countries present in the archive.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn contains(&self, code: CountryCode) -> bool {
        self.zones.contains_key(&code)
    }

    /// Countries present in the archive, sorted.
    pub fn countries(&self) -> Vec<CountryCode> {
        let mut codes: Vec<CountryCode> = self.zones.keys().copied().collect();
        codes.sort();
        codes
    }
}

impl BlockSource for ZoneArchive {
    fn zone(&self, code: CountryCode) -> Option<&str> {
        self.zones.zone(code)
    }
}
