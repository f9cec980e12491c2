use serde::Deserialize;

/// Body of `/capi/visit` and `/capi/click`, as sent by the page script.
/// Every field is optional; what is missing is left out of the forwarded event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackRequest {
    pub event_id: Option<String>,
    pub fbp: Option<String>,
    pub fbc: Option<String>,
    pub artist_name: Option<String>,
    pub title: Option<String>,
    pub music_service: Option<String>,
    pub event_source_url: Option<String>,
    /// Outbound link of a click.
    pub to: Option<String>,
    pub test_event_code: Option<String>,
}
