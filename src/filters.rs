//! Post-hoc result filters - pure functions the host applies after a search
//!
//! Filtering never happens inside the scheduler; the host decides which of
//! these to apply to the returned sequence.

use crate::listing::{is_relevant, RelevanceOptions, SearchResult};

/// Keep results matching an audio label. "Hindi" also matches dual-audio
/// releases and "English" matches the common "eng" shorthand, mirroring how
/// these titles are actually written.
pub fn by_audio(results: &[SearchResult], tag: &str) -> Vec<SearchResult> {
    let needles: &[&str] = match tag.to_lowercase().as_str() {
        "hindi" => &["hindi", "dual"],
        "english" => &["english", "eng"],
        _ => return by_title_needle(results, &tag.to_lowercase()),
    };

    results
        .iter()
        .filter(|r| {
            let title = r.title.to_lowercase();
            needles.iter().any(|n| title.contains(n))
        })
        .cloned()
        .collect()
}

/// Keep results whose title mentions a quality label, e.g. "720p" or "4k".
pub fn by_quality(results: &[SearchResult], tag: &str) -> Vec<SearchResult> {
    by_title_needle(results, &tag.to_lowercase())
}

/// Re-filter an existing result set at a different relevance strictness.
pub fn by_relevance(
    results: &[SearchResult],
    query: &str,
    options: &RelevanceOptions,
) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|r| is_relevant(&r.title, query, options))
        .cloned()
        .collect()
}

fn by_title_needle(results: &[SearchResult], needle: &str) -> Vec<SearchResult> {
    results
        .iter()
        .filter(|r| r.title.to_lowercase().contains(needle))
        .cloned()
        .collect()
}
