//! Aggregation scheduler - fans one query out to all selected sites

use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::client::create_client;
use crate::listing::{scrape_site, ListingOptions, SearchResult};
use crate::query::normalize;
use crate::sites::SiteDescriptor;

/// Default worker pool width. Enough to overlap network latency across a
/// dozen sites without swamping the caller's network stack.
pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub concurrency: usize,
    pub listing: ListingOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            listing: ListingOptions::default(),
        }
    }
}

/// Search all given sites concurrently and flatten the per-site results.
///
/// The query is normalized first. Results arrive in completion order, so the
/// output order is non-deterministic across runs; callers must not rely on
/// it beyond existence and count. A failing site contributes zero results
/// and never cancels its siblings; the call returns once every site has
/// completed or burned its timeout.
pub async fn search(
    query: &str,
    sites: &[SiteDescriptor],
    options: &SearchOptions,
) -> Vec<SearchResult> {
    if sites.is_empty() {
        return Vec::new();
    }

    let client = match create_client() {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    search_with_client(&client, query, sites, options).await
}

/// Same as [`search`] but reusing a caller-owned client. Each worker gets
/// its own clone of the handle; workers never share mutable state.
pub async fn search_with_client(
    client: &Client,
    query: &str,
    sites: &[SiteDescriptor],
    options: &SearchOptions,
) -> Vec<SearchResult> {
    let normalized = normalize(query);

    let per_site: Vec<Vec<SearchResult>> = stream::iter(sites.iter().cloned())
        .map(|site| {
            let client = client.clone();
            let query = normalized.clone();
            let listing = options.listing.clone();
            async move { scrape_site(&client, &site, &query, &listing).await }
        })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    per_site.into_iter().flatten().collect()
}
