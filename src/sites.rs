//! Static registry of searchable source sites

use serde::{Deserialize, Serialize};

/// One searchable source: a display name plus a search URL template with a
/// single `{}` slot for the percent-encoded query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub name: String,
    pub query_url_template: String,
}

impl SiteDescriptor {
    pub fn new(name: &str, query_url_template: &str) -> Self {
        Self {
            name: name.to_string(),
            query_url_template: query_url_template.to_string(),
        }
    }

    /// Build the request URL for a query by percent-encoding it into the
    /// template slot.
    pub fn search_url(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        self.query_url_template.replacen("{}", &encoded, 1)
    }
}

/// Default source list. Markup on these sites drifts; the listing parser's
/// fallback chain is what keeps them usable.
pub fn default_sites() -> Vec<SiteDescriptor> {
    vec![
        SiteDescriptor::new("Toonworld4all", "https://toonworld4all.me/?s={}"),
        SiteDescriptor::new("RareToons", "https://raretoonsindia.rtilinks.com/?s={}"),
        SiteDescriptor::new("DeadToons", "https://deadtoons.one/?s={}"),
        SiteDescriptor::new("AnimeMafia", "https://animemafia.in/?s={}"),
        SiteDescriptor::new("PureToons", "https://puretoons.me/?s={}"),
        SiteDescriptor::new("StarToons", "https://startoonsindia.com/?s={}"),
        SiteDescriptor::new("CartoonsArea", "https://cartoonsarea.xyz/?s={}"),
        SiteDescriptor::new("ToonNation", "https://toonnation.in/?s={}"),
        SiteDescriptor::new("AnimeTM", "https://animetm.org/?s={}"),
    ]
}

/// Resolve a set of names against the registry, preserving registry order.
/// Unknown names are silently omitted, never an error.
pub fn resolve<'a>(sites: &'a [SiteDescriptor], names: &[String]) -> Vec<&'a SiteDescriptor> {
    sites
        .iter()
        .filter(|s| names.iter().any(|n| n == &s.name))
        .collect()
}
