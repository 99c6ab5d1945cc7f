use std::io::BufRead;

use country_cidr_lookup::{NetworkIndex, SourceConfig};
use env_logger::Env;

/// Source overrides from the environment: `COUNTRY_LIST_URL`,
/// `ZONE_ARCHIVE_URL` and `FETCH_ATTEMPTS`.
fn config_from_env() -> Result<SourceConfig, Box<dyn std::error::Error>> {
    let mut config = SourceConfig::default();
    if let Ok(url) = std::env::var("COUNTRY_LIST_URL") {
        config = config.with_country_list_url(url);
    }
    if let Ok(url) = std::env::var("ZONE_ARCHIVE_URL") {
        config = config.with_zone_archive_url(url);
    }
    if let Ok(attempts) = std::env::var("FETCH_ATTEMPTS") {
        config = config.with_max_attempts(attempts.parse()?);
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = config_from_env()?;

    // 1) Fetch country codes and zones, build the index
    let index = NetworkIndex::download(&config)?;
    let stats = index.stats();
    log::info!(
        "index ready: {} ranges across {} countries",
        stats.total_ranges,
        stats.countries
    );

    // 2) Resolve addresses from the command line, or the first field of each
    //    stdin line (the client address of an access log line)
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        for ip in &args {
            println!("{ip} -> {}", index.resolve(ip));
        }
        return Ok(());
    }

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if let Some(ip) = line.split_whitespace().next() {
            println!("{ip} -> {}", index.resolve(ip));
        }
    }

    Ok(())
}
