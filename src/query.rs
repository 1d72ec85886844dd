//! Query normalization - expands user-typed abbreviations

/// Abbreviation table applied token-by-token before dispatch
const EXPANSIONS: &[(&str, &str)] = &[
    ("s1", "Season 1"),
    ("s2", "Season 2"),
    ("s3", "Season 3"),
    ("ep", "Episode"),
    ("mov", "Movie"),
    ("pkmn", "Pokemon"),
    ("dbz", "Dragon Ball Z"),
    ("op", "One Piece"),
    ("mha", "My Hero Academia"),
    ("aot", "Attack on Titan"),
    ("jjk", "Jujutsu Kaisen"),
    ("ds", "Demon Slayer"),
    ("dora", "Doraemon"),
    ("shin", "Shin Chan"),
];

/// Expand known abbreviations in a raw query.
///
/// Each whitespace-separated token is looked up case-insensitively; unmatched
/// tokens pass through unchanged. Always returns a string, possibly equal to
/// the input.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            EXPANSIONS
                .iter()
                .find(|(abbr, _)| *abbr == lower)
                .map(|(_, full)| *full)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
