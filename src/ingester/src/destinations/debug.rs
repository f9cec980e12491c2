use async_trait::async_trait;
use tracing::info;

use crate::destination::Destination;
use crate::error::Result;
use crate::Payload;

/// Logs payloads instead of sending them. Used while the conversions API isn't configured.
#[derive(Default)]
pub struct Debug {}

impl Debug {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl Destination for Debug {
    fn name(&self) -> &'static str {
        "debug"
    }

    async fn send(&self, payload: &Payload) -> Result<()> {
        info!("payload: {}", serde_json::to_string(payload)?);
        Ok(())
    }
}
