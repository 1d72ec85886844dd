//! Deep link extraction - scans a detail page for download/stream anchors

use std::collections::HashSet;
use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::client::fetch;
use crate::log::{log_error, log_info};

/// Detail pages are heavier than search pages, so the budget is longer.
pub const DETAIL_TIMEOUT: Duration = Duration::from_secs(12);

/// An anchor whose visible text contains any of these qualifies.
const LINK_KEYWORDS: &[&str] = &[
    "drive", "mega", "download", "480p", "720p", "1080p", "4k", "batch", "zip", "watch",
    "stream", "magnet", "torrent", "mediafire", "mirror",
];

/// Common content wrappers, tried in order; whole document as fallback.
const CONTENT_REGIONS: &[&str] = &["div.entry-content", "div.post-content", "div.the-content"];

const MAX_LABEL_LEN: usize = 40;
const FALLBACK_LABEL: &str = "Download Link";

/// One direct download/stream link discovered on a detail page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeepLink {
    pub label: String,
    pub url: String,
}

/// Fetch a detail page and extract its deep links. Any failure is soft and
/// reads as "no links found".
pub async fn scan_detail_page(client: &Client, detail_url: &str) -> Vec<DeepLink> {
    let page = match fetch(client, detail_url, DETAIL_TIMEOUT).await {
        Ok(p) => p,
        Err(e) => {
            log_error("deeplinks", &format!("Fetch failed for {}: {}", detail_url, e));
            return Vec::new();
        }
    };

    let links = extract_deep_links(&page.body);
    log_info("deeplinks", &format!("{}: {} links", detail_url, links.len()));
    links
}

/// Extract deep links from detail page HTML. Pure and separately testable.
pub fn extract_deep_links(html: &str) -> Vec<DeepLink> {
    let document = Html::parse_document(html);
    let anchor_sel = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let region = content_region(&document);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in region.select(&anchor_sel) {
        let href = anchor.value().attr("href").unwrap_or("").trim();
        if href.starts_with("javascript:") || href.starts_with('#') || href.len() < 5 {
            continue;
        }

        if !qualifies(anchor) {
            continue;
        }

        let link = DeepLink {
            label: make_label(&anchor_text(anchor)),
            url: href.to_string(),
        };

        if seen.insert((link.label.clone(), link.url.clone())) {
            links.push(link);
        }
    }

    links
}

/// First matching content wrapper, else the whole document.
fn content_region(document: &Html) -> ElementRef<'_> {
    for region in CONTENT_REGIONS {
        if let Ok(sel) = Selector::parse(region) {
            if let Some(el) = document.select(&sel).next() {
                return el;
            }
        }
    }
    document.root_element()
}

fn qualifies(anchor: ElementRef<'_>) -> bool {
    let text = anchor_text(anchor).to_lowercase();
    if LINK_KEYWORDS.iter().any(|k| text.contains(k)) {
        return true;
    }

    let class = anchor.value().attr("class").unwrap_or("");
    let class_lower = class.to_lowercase();
    class_lower.contains("btn") || class_lower.contains("button")
}

fn anchor_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Truncate and title-case the anchor text; generic label when the text is
/// too short to mean anything.
fn make_label(text: &str) -> String {
    let truncated: String = text.chars().take(MAX_LABEL_LEN).collect();
    let truncated = truncated.trim();
    if truncated.chars().count() <= 2 {
        return FALLBACK_LABEL.to_string();
    }
    title_case(truncated)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
