//! Probe every default site with a live query

use toonseek::listing::ListingOptions;
use toonseek::search::SearchOptions;
use toonseek::{create_client, default_sites, deeplinks, listing, log, normalize, search};

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[tokio::main]
async fn main() {
    if let Some(path) = log::init_log() {
        println!("Log file: {}", path.display());
    }

    let query = std::env::args().nth(1).unwrap_or_else(|| "pokemon".to_string());
    let expanded = normalize(&query);
    println!("\nProbing sites with query: \"{}\" (expanded: \"{}\")", query, expanded);

    let client = match create_client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    let sites = default_sites();
    let options = ListingOptions::default();

    // Each site individually first, so a dead source is easy to spot.
    let mut working = 0usize;
    for site in &sites {
        println!("\n--- {} ---", site.name);
        let results = listing::scrape_site(&client, site, &expanded, &options).await;
        if results.is_empty() {
            println!("  no results");
            continue;
        }
        working += 1;
        println!("  {} results:", results.len());
        for (i, r) in results.iter().take(5).enumerate() {
            let tags: Vec<&str> = r
                .quality_tags
                .iter()
                .chain(r.audio_tags.iter())
                .map(String::as_str)
                .collect();
            println!("    {}. {} [{}]", i + 1, truncate(&r.title, 50), tags.join(", "));
        }
        if results.len() > 5 {
            println!("    ... and {} more", results.len() - 5);
        }
    }

    // Combined search through the bounded pool.
    println!("\n============================================================");
    println!("  COMBINED SEARCH");
    println!("============================================================");
    let all = search(&query, &sites, &SearchOptions::default()).await;
    println!("  Total results: {}", all.len());

    let mut by_source: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for r in &all {
        *by_source.entry(r.source_site.as_str()).or_insert(0) += 1;
    }
    println!("  By source: {:?}", by_source);

    // Deep link scan of the first result, if any.
    if let Some(first) = all.first() {
        println!("\n--- Deep links for: {} ---", truncate(&first.title, 50));
        let links = deeplinks::scan_detail_page(&client, &first.detail_link).await;
        if links.is_empty() {
            println!("  no direct links found");
        } else {
            for link in links.iter().take(10) {
                println!("  - {} -> {}", link.label, truncate(&link.url, 60));
            }
        }
    }

    println!("\n  {} of {} sites returned results", working, sites.len());
}
