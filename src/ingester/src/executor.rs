use std::sync::Arc;

use common::types::METRIC_CAPI_EVENTS_TOTAL;
use metrics::counter;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;

use crate::error::Result;
use crate::Destination;
use crate::Payload;
use crate::Processor;
use crate::RequestContext;
use crate::Track;

/// Runs the processors over an event and hands the resulting payload to every destination.
///
/// Delivery is fire-and-forget: each destination gets its own detached task and the
/// outcome is only logged. Nothing is retried.
pub struct Executor {
    processors: Vec<Arc<dyn Processor>>,
    destinations: Vec<Arc<dyn Destination>>,
}

impl Executor {
    pub fn new(
        processors: Vec<Arc<dyn Processor>>,
        destinations: Vec<Arc<dyn Destination>>,
    ) -> Self {
        Self {
            processors,
            destinations,
        }
    }

    /// Must be called within a tokio runtime. The returned handles may be dropped, which
    /// detaches the deliveries.
    pub fn execute(&self, ctx: &RequestContext, mut track: Track) -> Result<Vec<JoinHandle<()>>> {
        for processor in &self.processors {
            track = processor.process(ctx, track)?;
        }

        let payload = Arc::new(Payload::build(ctx, track));

        let handles = self
            .destinations
            .iter()
            .map(|dest| {
                let dest = dest.clone();
                let payload = payload.clone();
                tokio::spawn(async move {
                    let event = payload.event_name().to_string();
                    match dest.send(&payload).await {
                        Ok(_) => {
                            debug!(
                                "{} event {:?} delivered to {}",
                                event,
                                payload.event_id(),
                                dest.name()
                            );
                            counter!(METRIC_CAPI_EVENTS_TOTAL, "event" => event, "destination" => dest.name(), "status" => "ok")
                                .increment(1);
                        }
                        Err(err) => {
                            error!(
                                "{} event {:?} delivery to {} failed: {}",
                                event,
                                payload.event_id(),
                                dest.name(),
                                err
                            );
                            counter!(METRIC_CAPI_EVENTS_TOTAL, "event" => event, "destination" => dest.name(), "status" => "error")
                                .increment(1);
                        }
                    }
                })
            })
            .collect();

        Ok(handles)
    }
}
