//! Blocking HTTP fetches for the country list and the zone archive.
//!
//! Each fetch is wrapped in [`with_retry`]. Only transport and HTTP status
//! failures are retried; a downloaded archive that turns out to be corrupt is
//! reported straight away.

use reqwest::blocking::Client;

use crate::config::SourceConfig;
use crate::country::{CountryCode, parse_country_codes};
use crate::error::Error;
use crate::retry::with_retry;
use crate::zones::ZoneArchive;

fn client(config: &SourceConfig, url: &str) -> Result<Client, Error> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| Error::Fetch { url: url.to_string(), source: Box::new(e) })
}

fn get_bytes(config: &SourceConfig, url: &str) -> Result<Vec<u8>, Error> {
    let client = client(config, url)?;
    let body = with_retry(config.max_attempts, || {
        client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
    })
    .map_err(|e| Error::Fetch { url: url.to_string(), source: Box::new(e) })?;

    log::info!("downloaded {} bytes from {url}", body.len());
    Ok(body.to_vec())
}

/// Download the country list and extract its codes.
///
/// An empty result is not an error here; [`crate::NetworkIndex::download`]
/// treats it as fatal.
///
/// # Errors
/// Returns [`Error::Fetch`] once `config.max_attempts` attempts have failed.
///
/// # Feature
/// Available only when the crate is built with the `download` feature.
pub fn fetch_country_codes(config: &SourceConfig) -> Result<Vec<CountryCode>, Error> {
    let body = get_bytes(config, &config.country_list_url)?;
    let codes = parse_country_codes(&body, &config.code_column);
    log::info!("country list holds {} codes", codes.len());
    Ok(codes)
}

/// Download and decode the bulk zone archive.
///
/// # Errors
/// Returns [`Error::Fetch`] once `config.max_attempts` attempts have failed,
/// or [`Error::Archive`] if the body is not a valid gzipped tar archive.
///
/// # Feature
/// Available only when the crate is built with the `download` feature.
pub fn fetch_zone_archive(config: &SourceConfig) -> Result<ZoneArchive, Error> {
    let body = get_bytes(config, &config.zone_archive_url)?;
    Ok(ZoneArchive::from_gzip_bytes(&body)?)
}
