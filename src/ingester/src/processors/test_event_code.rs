use crate::error::Result;
use crate::Processor;
use crate::RequestContext;
use crate::Track;

/// Routes events to the vendor's test console when a server-wide code is configured.
/// A code sent by the client takes precedence.
pub struct TestEventCode {
    code: String,
}

impl TestEventCode {
    pub fn new(code: String) -> Self {
        Self { code }
    }
}

impl Processor for TestEventCode {
    fn process(&self, _ctx: &RequestContext, mut track: Track) -> Result<Track> {
        if track.test_event_code.as_deref().map_or(true, str::is_empty) {
            track.test_event_code = Some(self.code.clone());
        }

        Ok(track)
    }
}
