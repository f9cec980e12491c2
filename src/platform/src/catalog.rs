use std::collections::BTreeMap;
use std::collections::HashMap;

use common::config::CatalogEntry;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

pub const DEFAULT_ARTIST_NAME: &str = "matas";
pub const DEFAULT_TITLE: &str = "Mein Herz";
const EMPTY_HREF: &str = "#";

/// Streaming services in the order the buttons appear on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicService {
    Spotify,
    Apple,
    Ytm,
    Amazon,
}

impl MusicService {
    pub const ALL: [MusicService; 4] = [
        MusicService::Spotify,
        MusicService::Apple,
        MusicService::Ytm,
        MusicService::Amazon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MusicService::Spotify => "spotify",
            MusicService::Apple => "apple",
            MusicService::Ytm => "ytm",
            MusicService::Amazon => "amazon",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MusicService::Spotify => "Auf Spotify hören",
            MusicService::Apple => "Auf Apple Music hören",
            MusicService::Ytm => "Auf YouTube Music hören",
            MusicService::Amazon => "Auf Amazon Music hören",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub service: MusicService,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub artist_name: String,
    pub title: String,
    pub links: Vec<Link>,
}

/// Only absolute `http(s)` links end up in a page, anything else becomes `#`.
fn safe_href(href: &str) -> String {
    match Url::parse(href.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => href.trim().to_string(),
        _ => EMPTY_HREF.to_string(),
    }
}

impl Release {
    pub fn new(artist_name: &str, title: &str, hrefs: [&str; 4]) -> Self {
        let links = MusicService::ALL
            .into_iter()
            .zip(hrefs)
            .map(|(service, href)| Link {
                service,
                href: safe_href(href),
            })
            .collect();

        Self {
            artist_name: artist_name.to_string(),
            title: title.to_string(),
            links,
        }
    }

    /// Ad-hoc release from query parameters: `artist`, `title` and one parameter per
    /// service. `None` unless at least one of them is present.
    pub fn from_query(query: &HashMap<String, String>) -> Option<Self> {
        let has_any = ["artist", "title"]
            .into_iter()
            .chain(MusicService::ALL.iter().map(|s| s.as_str()))
            .any(|k| query.contains_key(k));
        if !has_any {
            return None;
        }

        let or_default = |v: &str, default: &'static str| {
            if v.is_empty() {
                default.to_string()
            } else {
                v.to_string()
            }
        };

        Some(Release::new(
            &or_default(param(query, "artist"), DEFAULT_ARTIST_NAME),
            &or_default(param(query, "title"), DEFAULT_TITLE),
            MusicService::ALL.map(|s| param(query, s.as_str())),
        ))
    }
}

fn param<'a>(query: &'a HashMap<String, String>, k: &str) -> &'a str {
    query.get(k).map(String::as_str).unwrap_or_default()
}

impl From<&CatalogEntry> for Release {
    fn from(e: &CatalogEntry) -> Self {
        Release::new(&e.artist_name, &e.title, [
            e.spotify.as_str(),
            e.apple.as_str(),
            e.ytm.as_str(),
            e.amazon.as_str(),
        ])
    }
}

/// Releases by slug. Built once at start, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    releases: BTreeMap<String, Release>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let mut releases = BTreeMap::new();
        releases.insert(
            "meinherz".to_string(),
            Release::new(DEFAULT_ARTIST_NAME, DEFAULT_TITLE, [
                "https://open.spotify.com/search/matas%20mein%20herz",
                "https://music.apple.com/de/search?term=matas%20mein%20herz",
                "https://music.youtube.com/search?q=matas+mein+herz",
                "https://music.amazon.de/search/matas%20mein%20herz",
            ]),
        );

        Self { releases }
    }

    /// Built-in releases plus the configured ones. Configured entries replace built-in
    /// entries with the same slug.
    pub fn new(entries: &BTreeMap<String, CatalogEntry>) -> Self {
        let mut catalog = Self::builtin();
        for (slug, entry) in entries {
            catalog
                .releases
                .insert(slug.to_lowercase(), Release::from(entry));
        }

        catalog
    }

    pub fn get(&self, slug: &str) -> Option<&Release> {
        self.releases.get(slug.to_lowercase().as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Release)> {
        self.releases.iter()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin() {
        let catalog = Catalog::builtin();
        let release = catalog.get("meinherz").unwrap();
        assert_eq!(release.artist_name, "matas");
        assert_eq!(release.title, "Mein Herz");
        assert_eq!(
            release.links.iter().map(|l| l.service).collect::<Vec<_>>(),
            MusicService::ALL.to_vec()
        );
        assert!(catalog.get("MeinHerz").is_some());
        assert!(catalog.get("doesnotexist").is_none());
    }

    #[test]
    fn test_configured_entries() {
        let entries = BTreeMap::from([
            ("Sommer".to_string(), CatalogEntry {
                artist_name: "matas".to_string(),
                title: "Sommer".to_string(),
                spotify: "https://open.spotify.com/track/1".to_string(),
                apple: "".to_string(),
                ytm: "https://music.youtube.com/watch?v=1".to_string(),
                amazon: "".to_string(),
            }),
        ]);

        let catalog = Catalog::new(&entries);
        assert_eq!(catalog.len(), 2);
        let release = catalog.get("sommer").unwrap();
        assert_eq!(release.links[0].href, "https://open.spotify.com/track/1");
        assert_eq!(release.links[1].href, "#");
        assert_eq!(release.links[3].href, "#");
    }

    #[test]
    fn test_unsafe_links_are_dropped() {
        let release = Release::new("a", "b", [
            "javascript:alert(document.cookie)",
            " JavaScript:alert(1)",
            "data:text/html,<script>alert(1)</script>",
            "/relative",
        ]);
        assert!(release.links.iter().all(|l| l.href == "#"));

        let release = Release::new("a", "b", ["http://example.com/x", "", "", ""]);
        assert_eq!(release.links[0].href, "http://example.com/x");
    }

    #[test]
    fn test_from_query() {
        assert_eq!(Release::from_query(&HashMap::new()), None);

        let query = HashMap::from([
            ("spotify".to_string(), "https://open.spotify.com/track/1".to_string()),
            ("title".to_string(), "".to_string()),
        ]);
        let release = Release::from_query(&query).unwrap();
        assert_eq!(release.artist_name, DEFAULT_ARTIST_NAME);
        assert_eq!(release.title, DEFAULT_TITLE);
        assert_eq!(release.links[0].href, "https://open.spotify.com/track/1");
        assert_eq!(release.links[2].href, "#");
    }
}
