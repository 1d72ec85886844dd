//! toonseek - multi-source anime & cartoon search aggregation
//!
//! Fans a normalized query out to a set of independently themed content
//! sites, parses their unstable markup through layered fallback heuristics,
//! and on demand scans a result's detail page for direct download/stream
//! links. The core is a library: the host UI owns all session state
//! (history, favorites, the deep-link cache keyed by detail link) and all
//! rendering; this crate takes plain inputs and returns plain records.

pub mod client;
pub mod deeplinks;
pub mod filters;
pub mod listing;
pub mod log;
pub mod query;
pub mod search;
pub mod sites;

pub use client::{create_client, fetch, FetchError, RawPage};
pub use deeplinks::{extract_deep_links, scan_detail_page, DeepLink};
pub use listing::{
    parse_listing, scrape_site, ListingOptions, ParseError, RelevanceOptions, SearchResult,
};
pub use query::normalize;
pub use search::{search, search_with_client, SearchOptions};
pub use sites::{default_sites, resolve, SiteDescriptor};
