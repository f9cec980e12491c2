use tracing::debug;

use crate::click_id;
use crate::click_id::Sources;
use crate::error::Result;
use crate::is_blank;
use crate::Processor;
use crate::RequestContext;
use crate::Track;

/// Completes the browser (`fbp`) and click (`fbc`) identifiers of an event.
///
/// Values sent by the client win, then the cookies of the request. A missing click
/// identifier is derived from the request query, the referer and finally the event
/// source url. This covers the first visit, where the page script hasn't written the
/// cookie yet when the beacon fires.
#[derive(Default)]
pub struct Identity {}

impl Identity {
    pub fn new() -> Self {
        Self {}
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|v| !is_blank(v))
}

impl Processor for Identity {
    fn process(&self, ctx: &RequestContext, mut track: Track) -> Result<Track> {
        if non_empty(&track.fbp).is_none() {
            track.fbp = non_empty(&ctx.fbp_cookie).map(str::to_owned);
        }

        let stored = non_empty(&track.fbc).or_else(|| non_empty(&ctx.fbc_cookie));
        let click_id = click_id::resolve(
            Sources {
                stored,
                query: ctx.query.as_deref(),
                referer: ctx.referer.as_deref(),
                event_source_url: track.event_source_url.as_deref(),
            },
            ctx.received_at,
        );

        if let Some(click_id) = &click_id {
            if click_id.is_derived() {
                debug!("derived fbc {} from {:?}", click_id, click_id.origin);
            }
        }
        track.fbc = click_id.map(|v| v.value);

        Ok(track)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_client_values_are_kept() {
        let mut ctx = ctx();
        ctx.fbc_cookie = Some("fb.1.1.cookie".to_string());
        ctx.fbp_cookie = Some("fb.1.1.cookiefbp".to_string());
        ctx.referer = Some("https://example.com/?fbclid=ref".to_string());

        let track = Identity::new()
            .process(&ctx, Track {
                fbc: Some("fb.1.1.body".to_string()),
                fbp: Some("fb.1.1.bodyfbp".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(track.fbc.as_deref(), Some("fb.1.1.body"));
        assert_eq!(track.fbp.as_deref(), Some("fb.1.1.bodyfbp"));
    }

    #[test]
    fn test_cookies_fill_missing_values() {
        let mut ctx = ctx();
        ctx.fbc_cookie = Some("fb.1.1.cookie".to_string());
        ctx.fbp_cookie = Some("fb.1.1.cookiefbp".to_string());
        ctx.referer = Some("https://example.com/?fbclid=ref".to_string());

        let track = Identity::new()
            .process(&ctx, Track {
                fbc: Some("".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(track.fbc.as_deref(), Some("fb.1.1.cookie"));
        assert_eq!(track.fbp.as_deref(), Some("fb.1.1.cookiefbp"));
    }

    #[test]
    fn test_blank_fbc_falls_back_to_referer() {
        let mut ctx = ctx();
        ctx.fbc_cookie = Some("  ".to_string());
        ctx.referer = Some("https://example.com/meinherz?fbclid=IwAR0".to_string());

        let track = Identity::new()
            .process(&ctx, Track {
                fbc: Some(" ".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(track.fbc.as_deref(), Some("fb.1.1714564800.IwAR0"));
    }

    #[test]
    fn test_fbc_from_referer() {
        let mut ctx = ctx();
        ctx.referer = Some("https://example.com/meinherz?fbclid=IwAR0".to_string());

        let track = Identity::new().process(&ctx, Track::default()).unwrap();

        assert_eq!(track.fbc.as_deref(), Some("fb.1.1714564800.IwAR0"));
        assert_eq!(track.fbp, None);
    }

    #[test]
    fn test_nothing_recoverable() {
        let track = Identity::new()
            .process(&ctx(), Track {
                event_source_url: Some("https://example.com/meinherz".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(track.fbc, None);
    }
}
