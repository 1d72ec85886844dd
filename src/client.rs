//! HTTP fetch client - the single point of outbound network I/O

use std::time::Duration;

use anyhow::Result;
use rand::seq::IndexedRandom;
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Identity header pool. Read-only after process start, so a plain static
/// slice with per-request random selection is enough.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:122.0) Gecko/20100101 Firefox/122.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// A fetch failure. Network covers DNS, connect and timeout errors; Http is
/// any non-2xx status.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("http status {0}")]
    Http(StatusCode),
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// URL after redirects.
    pub final_url: String,
    pub body: String,
}

/// Pick a User-Agent from the pool.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Build the shared HTTP client. Per-request timeouts are set at call sites;
/// this is only a safety net.
pub fn create_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(Into::into)
}

/// Fetch a URL with a bounded timeout and a freshly randomized identity
/// header set. Both the listing parser and the deep link extractor go
/// through here.
pub async fn fetch(client: &Client, url: &str, timeout: Duration) -> Result<RawPage, FetchError> {
    let resp = client
        .get(url)
        .timeout(timeout)
        .header("User-Agent", random_user_agent())
        .header("Accept", ACCEPT)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Http(status));
    }

    let final_url = resp.url().to_string();
    let body = resp.text().await?;

    Ok(RawPage { final_url, body })
}
