use crate::error::Result;
use crate::RequestContext;
use crate::Track;

/// Step applied to every event before it is turned into a payload.
pub trait Processor: Send + Sync {
    fn process(&self, ctx: &RequestContext, track: Track) -> Result<Track>;
}
