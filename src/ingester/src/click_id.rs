//! Click identifier (`fbc`) derivation.
//!
//! A click identifier has the form `fb.1.<unix_seconds>.<fbclid>`. The page script builds
//! the very same string in the browser, so the formatting here must stay in lockstep with
//! `ensureFbc()` in the page template.

use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::Utc;
use common::types::QUERY_PARAM_CLICK_REFERENCE;
use url::form_urlencoded;
use url::Url;

use crate::is_blank;

const PREFIX: &str = "fb";
const VERSION: u8 = 1;

/// Where a click identifier was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Previously stored value (cookie or client supplied), used as-is.
    Stored,
    Query,
    Referer,
    EventSourceUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickId {
    pub value: String,
    pub origin: Origin,
}

impl ClickId {
    pub fn is_derived(&self) -> bool {
        self.origin != Origin::Stored
    }
}

impl Display for ClickId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// Inputs of the derivation, in priority order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sources<'a> {
    pub stored: Option<&'a str>,
    pub query: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub event_source_url: Option<&'a str>,
}

pub fn format(reference: &str, now: DateTime<Utc>) -> String {
    format!("{PREFIX}.{VERSION}.{}.{reference}", now.timestamp())
}

/// Extracts the click reference from a raw query string.
pub fn reference_from_query(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == QUERY_PARAM_CLICK_REFERENCE)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !is_blank(v))
}

/// Extracts the click reference from an absolute url. Relative or broken urls yield nothing.
pub fn reference_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.query().and_then(reference_from_query)
}

/// Resolves the click identifier, first match wins.
pub fn resolve(sources: Sources<'_>, now: DateTime<Utc>) -> Option<ClickId> {
    if let Some(stored) = sources.stored.filter(|v| !is_blank(v)) {
        return Some(ClickId {
            value: stored.to_string(),
            origin: Origin::Stored,
        });
    }

    let derived = [
        (sources.query.and_then(reference_from_query), Origin::Query),
        (sources.referer.and_then(reference_from_url), Origin::Referer),
        (
            sources.event_source_url.and_then(reference_from_url),
            Origin::EventSourceUrl,
        ),
    ];

    derived
        .into_iter()
        .find_map(|(reference, origin)| reference.map(|r| (r, origin)))
        .map(|(reference, origin)| ClickId {
            value: format(&reference, now),
            origin,
        })
}
