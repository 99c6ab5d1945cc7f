use std::collections::HashMap;

use country_cidr_lookup::{CountryCode, NetworkIndex, parse_country_codes};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Offline country-cidr-lookup usage example\n");

    // Country list as it would come from the CSV source
    let countries = "Name,Code\nGermany,DE\nNetherlands,NL\nRussian Federation,RU\nAtlantis,AQ\n";
    let codes = parse_country_codes(countries, "Code");

    // Zone text per country, as found in the zone archive
    let mut zones: HashMap<CountryCode, String> = HashMap::new();
    zones.insert("de".parse()?, "46.4.0.0/16\n88.198.0.0/16\n".to_string());
    zones.insert("nl".parse()?, "145.220.0.0/16\n91.198.174.0/24\n".to_string());
    zones.insert("ru".parse()?, "5.3.0.0/16\n\n2a00:1fa0::/29\n".to_string());

    let index = NetworkIndex::build(&codes, &zones);

    let test_ips = [
        "46.4.0.1",       // German
        "88.198.0.1",     // German
        "91.198.174.192", // Dutch
        "5.3.0.1",        // Russian
        "151.101.1.69",   // not loaded
        "2a01:4f8::1",    // IPv6 is not handled
        "not-an-ip",
    ];

    println!("Resolving addresses:\n");
    for ip in test_ips {
        println!("  {ip} -> {}", index.resolve(ip));
    }

    let stats = index.stats();
    println!("\nIndex info:");
    println!("  Total ranges: {}", stats.total_ranges);
    println!("  Countries: {}", stats.countries);
    for (code, count) in &stats.ranges_per_country {
        println!("    {code}: {count} ranges");
    }

    Ok(())
}
