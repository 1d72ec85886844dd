//! Listing parser - turns one site's search page into normalized results
//!
//! The source sites share no schema: each runs its own theme, and the markup
//! drifts. Container discovery is therefore an ordered chain of increasingly
//! generic structural strategies, and title/link extraction a layered
//! heuristic. The first tier that matches anything wins.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::fetch;
use crate::log::{log_error, log_info};
use crate::sites::SiteDescriptor;

/// Sentinel thumbnail when a listing carries no usable image.
pub const PLACEHOLDER_THUMB: &str = "https://via.placeholder.com/300x180?text=No+Img";

/// Container discovery tiers, most specific first. WordPress-flavored themes
/// dominate these sites, hence the post/entry vocabulary.
const CONTAINER_TIERS: &[&str] = &[
    "article",
    ".post-summary, .result-item",
    ".post-item, .post, .item",
    "[id^='post-']",
];

/// Headings that carry a recognized title class and wrap an anchor.
const HEADING_ANCHORS: &str = "h1.entry-title a, h2.entry-title a, h3.entry-title a, \
     h1.post-title a, h2.post-title a, h3.post-title a, \
     h1.title a, h2.title a, h3.title a";

/// Lazy-load attributes checked before the plain src.
const IMG_ATTRS: &[&str] = &["data-src", "data-original", "data-lazy-src", "src"];

const MIN_TITLE_LEN: usize = 3;

/// Anchor text shorter than this is treated as an icon-only link.
const MIN_ANCHOR_TEXT: usize = 4;

const QUALITY_LABELS: &[(&str, &str)] = &[
    ("480p", "480p"),
    ("720p", "720p"),
    ("1080p", "1080p"),
    ("2160p", "2160p"),
    ("4k", "4K"),
];

const AUDIO_LABELS: &[(&str, &str)] = &[
    ("dual audio", "Dual Audio"),
    ("multi audio", "Multi Audio"),
    ("hindi", "Hindi"),
    ("english", "English"),
    ("tamil", "Tamil"),
    ("telugu", "Telugu"),
    ("japanese", "Japanese"),
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "of", "in", "on", "to", "season", "episode", "movie", "part",
];

/// One discovered listing, normalized across sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub source_site: String,
    pub title: String,
    pub detail_link: String,
    pub thumbnail_url: String,
    pub year: Option<u16>,
    pub quality_tags: BTreeSet<String>,
    pub audio_tags: BTreeSet<String>,
}

/// Why one container was skipped. Containment is per container: an error
/// here never aborts the rest of the page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no usable anchor in container")]
    NoAnchor,
    #[error("title shorter than {MIN_TITLE_LEN} chars")]
    TitleTooShort,
}

/// Relevance filter knobs. Thresholds are heuristic and vary across site
/// snapshots, so they stay configurable rather than baked in.
#[derive(Debug, Clone)]
pub struct RelevanceOptions {
    pub enabled: bool,
    /// Minimum fraction of significant query tokens the title must contain.
    pub min_token_overlap: f32,
    pub stop_words: Vec<String>,
}

impl Default for RelevanceOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            min_token_overlap: 0.5,
            stop_words: STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RelevanceOptions {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Per-site scrape knobs.
#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub timeout: Duration,
    pub relevance: RelevanceOptions,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            relevance: RelevanceOptions::default(),
        }
    }
}

/// Fetch one site's search page and parse it. Any fetch failure is isolated
/// to this site and yields an empty vec.
pub async fn scrape_site(
    client: &Client,
    site: &SiteDescriptor,
    query: &str,
    options: &ListingOptions,
) -> Vec<SearchResult> {
    let url = site.search_url(query);
    log_info(&site.name, &format!("Fetching: {}", url));

    let page = match fetch(client, &url, options.timeout).await {
        Ok(p) => p,
        Err(e) => {
            log_error(&site.name, &format!("Fetch failed: {}", e));
            return Vec::new();
        }
    };

    let results = parse_listing(site, &page.body, query, &options.relevance);
    log_info(&site.name, &format!("Found {} results", results.len()));
    results
}

/// Parse a search page into results. Pure: no network, no shared state.
pub fn parse_listing(
    site: &SiteDescriptor,
    html: &str,
    query: &str,
    relevance: &RelevanceOptions,
) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let containers = find_containers(&document);

    let mut seen_links = HashSet::new();
    let mut results = Vec::new();

    for container in containers {
        let result = match extract_result(site, container) {
            Ok(r) => r,
            Err(_) => continue,
        };

        if !is_relevant(&result.title, query, relevance) {
            continue;
        }

        // Nested tiers and repeated widgets can surface the same listing twice.
        if seen_links.insert(result.detail_link.clone()) {
            results.push(result);
        }
    }

    results
}

/// Try each discovery tier in order and return the first non-empty match
/// set. The last resort scans div class attributes by regex.
fn find_containers(document: &Html) -> Vec<ElementRef<'_>> {
    for tier in CONTAINER_TIERS {
        if let Ok(sel) = Selector::parse(tier) {
            let found: Vec<_> = document.select(&sel).collect();
            if !found.is_empty() {
                return found;
            }
        }
    }

    let class_re = match Regex::new(r"(?i)\b(post|entry|item)") {
        Ok(r) => r,
        Err(_) => return Vec::new(),
    };
    let div_sel = match Selector::parse("div") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&div_sel)
        .filter(|el| {
            el.value()
                .attr("class")
                .map(|c| class_re.is_match(c))
                .unwrap_or(false)
        })
        .collect()
}

/// Layered title/link heuristic: recognized heading anchor, then bookmark
/// anchor, then the container itself, then the first non-icon anchor.
fn title_anchor<'a>(container: ElementRef<'a>) -> Option<ElementRef<'a>> {
    if let Ok(sel) = Selector::parse(HEADING_ANCHORS) {
        if let Some(a) = container.select(&sel).next() {
            return Some(a);
        }
    }

    if let Ok(sel) = Selector::parse("a[rel~='bookmark']") {
        if let Some(a) = container.select(&sel).next() {
            return Some(a);
        }
    }

    if container.value().name() == "a" {
        return Some(container);
    }

    let anchor_sel = Selector::parse("a").ok()?;
    container
        .select(&anchor_sel)
        .find(|a| anchor_text(*a).chars().count() >= MIN_ANCHOR_TEXT)
}

fn anchor_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn extract_result(site: &SiteDescriptor, container: ElementRef<'_>) -> Result<SearchResult, ParseError> {
    let anchor = title_anchor(container).ok_or(ParseError::NoAnchor)?;

    let href = anchor.value().attr("href").unwrap_or("").trim();
    if href.is_empty() {
        return Err(ParseError::NoAnchor);
    }
    let detail_link = absolutize(&site.query_url_template, href);

    let title = anchor_text(anchor);
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(ParseError::TitleTooShort);
    }

    let (year, quality_tags, audio_tags) = title_metadata(&title);

    Ok(SearchResult {
        source_site: site.name.clone(),
        title,
        detail_link,
        thumbnail_url: thumbnail(container),
        year,
        quality_tags,
        audio_tags,
    })
}

/// First image in the container, lazy-load attributes before src, first
/// absolute URL wins. Srcset-style values are cut at the first space.
fn thumbnail(container: ElementRef<'_>) -> String {
    if let Ok(sel) = Selector::parse("img") {
        if let Some(img) = container.select(&sel).next() {
            for attr in IMG_ATTRS {
                if let Some(val) = img.value().attr(attr) {
                    let val = val.split_whitespace().next().unwrap_or("");
                    if val.starts_with("http") {
                        return val.to_string();
                    }
                }
            }
        }
    }
    PLACEHOLDER_THUMB.to_string()
}

/// Resolve a possibly-relative href against the site's origin.
fn absolutize(template: &str, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    let origin = template.splitn(4, '/').take(3).collect::<Vec<_>>().join("/");
    if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else {
        format!("{}/{}", origin, href)
    }
}

/// Derive year and quality/audio tag sets from the title text.
fn title_metadata(title: &str) -> (Option<u16>, BTreeSet<String>, BTreeSet<String>) {
    let lower = title.to_lowercase();

    let year = Regex::new(r"\b(19|20)\d{2}\b")
        .ok()
        .and_then(|re| re.find(title).and_then(|m| m.as_str().parse().ok()));

    let quality = QUALITY_LABELS
        .iter()
        .filter(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| label.to_string())
        .collect();

    let audio = AUDIO_LABELS
        .iter()
        .filter(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| label.to_string())
        .collect();

    (year, quality, audio)
}

/// Relevance check: the title must contain the query's first significant
/// word, and at least `min_token_overlap` of all significant query tokens.
/// Site search endpoints are loose, so this trades recall for precision.
pub fn is_relevant(title: &str, query: &str, options: &RelevanceOptions) -> bool {
    if !options.enabled {
        return true;
    }

    let title_lower = title.to_lowercase();
    let significant: Vec<String> = query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= 2 && !options.stop_words.iter().any(|s| s == w))
        .collect();

    let first = match significant.first() {
        Some(w) => w,
        None => return true,
    };
    if !title_lower.contains(first.as_str()) {
        return false;
    }

    let matched = significant
        .iter()
        .filter(|w| title_lower.contains(w.as_str()))
        .count();

    matched as f32 / significant.len() as f32 >= options.min_token_overlap
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteDescriptor {
        SiteDescriptor::new("A", "https://a.test/?s={}")
    }

    fn lenient() -> RelevanceOptions {
        RelevanceOptions::disabled()
    }

    #[test]
    fn article_tier_with_entry_title_heading() {
        let html = r#"
            <article>
              <h2 class="entry-title"><a href="https://a.test/naruto">Naruto Shippuden 720p Hindi (2007)</a></h2>
              <img data-src="https://cdn.test/naruto.jpg" src="data:image/gif;base64,xyz">
            </article>
        "#;
        let results = parse_listing(&site(), html, "naruto", &RelevanceOptions::default());
        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert_eq!(r.source_site, "A");
        assert_eq!(r.title, "Naruto Shippuden 720p Hindi (2007)");
        assert_eq!(r.detail_link, "https://a.test/naruto");
        assert_eq!(r.thumbnail_url, "https://cdn.test/naruto.jpg");
        assert_eq!(r.year, Some(2007));
        assert!(r.quality_tags.contains("720p"));
        assert!(r.audio_tags.contains("Hindi"));
    }

    #[test]
    fn falls_back_to_post_summary_class() {
        let html = r#"
            <div class="post-summary">
              <h3 class="title"><a href="/shinchan-s1">Shin Chan Season 1 Complete</a></h3>
            </div>
        "#;
        let results = parse_listing(&site(), html, "", &lenient());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Shin Chan Season 1 Complete");
        // Relative href is resolved against the site origin.
        assert_eq!(results[0].detail_link, "https://a.test/shinchan-s1");
    }

    #[test]
    fn container_can_be_the_anchor_itself() {
        let html = r#"<a class="item" href="https://a.test/dbz">Dragon Ball Z Movie</a>"#;
        let results = parse_listing(&site(), html, "", &lenient());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Dragon Ball Z Movie");
    }

    #[test]
    fn bookmark_anchor_when_no_recognized_heading() {
        let html = r#"
            <article>
              <a rel="bookmark" href="https://a.test/aot">Attack on Titan Final Season</a>
            </article>
        "#;
        let results = parse_listing(&site(), html, "", &lenient());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].detail_link, "https://a.test/aot");
    }

    #[test]
    fn regex_class_tier_is_the_last_resort() {
        let html = r#"
            <div class="grid-entry-box">
              <a rel="bookmark" href="https://a.test/pokemon">Pokemon Horizons Hindi Dub</a>
            </div>
        "#;
        let results = parse_listing(&site(), html, "", &lenient());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Pokemon Horizons Hindi Dub");
    }

    #[test]
    fn skips_icon_only_anchors_in_fallback() {
        let html = r#"
            <article>
              <a href="https://a.test/p/1">*</a>
              <a href="https://a.test/p/2">Pokemon Season 1 Complete</a>
            </article>
        "#;
        let results = parse_listing(&site(), html, "", &lenient());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].detail_link, "https://a.test/p/2");
    }

    #[test]
    fn rejects_short_titles() {
        let html = r#"
            <article><h2 class="entry-title"><a href="https://a.test/x">Hi</a></h2></article>
        "#;
        assert!(parse_listing(&site(), html, "", &lenient()).is_empty());
    }

    #[test]
    fn discards_containers_without_anchors() {
        let html = r#"<article><p>Nothing to see here, really.</p></article>"#;
        assert!(parse_listing(&site(), html, "", &lenient()).is_empty());
    }

    #[test]
    fn lazy_load_attributes_beat_plain_src() {
        let html = r#"
            <article>
              <h2 class="entry-title"><a href="https://a.test/x">One Piece Film Red</a></h2>
              <img src="https://cdn.test/eager.jpg" data-src="https://cdn.test/lazy.jpg">
            </article>
        "#;
        let results = parse_listing(&site(), html, "", &lenient());
        assert_eq!(results[0].thumbnail_url, "https://cdn.test/lazy.jpg");
    }

    #[test]
    fn placeholder_when_no_absolute_image_url() {
        let html = r#"
            <article>
              <h2 class="entry-title"><a href="https://a.test/x">One Piece Film Red</a></h2>
              <img src="/img/relative.jpg">
            </article>
        "#;
        let results = parse_listing(&site(), html, "", &lenient());
        assert_eq!(results[0].thumbnail_url, PLACEHOLDER_THUMB);
    }

    #[test]
    fn duplicate_detail_links_collapse() {
        let html = r#"
            <article><h2 class="entry-title"><a href="https://a.test/x">Bleach Thousand Year Blood War</a></h2></article>
            <article><h2 class="entry-title"><a href="https://a.test/x">Bleach Thousand Year Blood War</a></h2></article>
        "#;
        assert_eq!(parse_listing(&site(), html, "", &lenient()).len(), 1);
    }

    #[test]
    fn relevance_requires_first_significant_word() {
        let opts = RelevanceOptions::default();
        assert!(is_relevant("Naruto Shippuden 720p", "naruto shippuden", &opts));
        assert!(!is_relevant("Boruto Next Generations", "naruto shippuden", &opts));
    }

    #[test]
    fn relevance_enforces_token_overlap() {
        let opts = RelevanceOptions::default();
        // 1 of 4 significant tokens matched is below the 0.5 default.
        assert!(!is_relevant("Demon King Academy", "demon slayer mugen train", &opts));
        // 2 of 3 passes.
        assert!(is_relevant("Demon Slayer Mugen Arc", "demon slayer mugen", &opts));
    }

    #[test]
    fn relevance_threshold_is_configurable() {
        let mut opts = RelevanceOptions::default();
        opts.min_token_overlap = 1.0;
        assert!(!is_relevant("Demon Slayer Movie", "demon slayer mugen", &opts));
        opts.min_token_overlap = 0.3;
        assert!(is_relevant("Demon Slayer Movie", "demon slayer mugen", &opts));
    }

    #[test]
    fn relevance_ignores_stop_words() {
        let opts = RelevanceOptions::default();
        // "season" is a stop word and "1" is too short to count.
        assert!(is_relevant("Pokemon Indigo League", "Pokemon Season 1", &opts));
    }

    #[test]
    fn disabled_relevance_passes_everything() {
        assert!(is_relevant("anything at all", "naruto", &lenient()));
    }

    #[test]
    fn filtered_titles_contain_first_query_word() {
        let html = r#"
            <article><h2 class="entry-title"><a href="https://a.test/1">Naruto Classic Hindi</a></h2></article>
            <article><h2 class="entry-title"><a href="https://a.test/2">One Piece 1080p</a></h2></article>
        "#;
        let results = parse_listing(&site(), html, "naruto", &RelevanceOptions::default());
        assert_eq!(results.len(), 1);
        for r in &results {
            assert!(r.title.to_lowercase().contains("naruto"));
        }
    }

    #[test]
    fn metadata_extraction() {
        let (year, quality, audio) = title_metadata("Jujutsu Kaisen 0 (2021) 1080p 4K Dual Audio English");
        assert_eq!(year, Some(2021));
        assert!(quality.contains("1080p"));
        assert!(quality.contains("4K"));
        assert!(audio.contains("Dual Audio"));
        assert!(audio.contains("English"));
        assert!(!audio.contains("Hindi"));
    }

    #[test]
    fn year_outside_range_is_ignored() {
        let (year, _, _) = title_metadata("Episode 1234 Collection");
        assert_eq!(year, None);
    }
}
