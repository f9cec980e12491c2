use async_trait::async_trait;

use crate::error::Result;
use crate::Payload;

/// Receiver of assembled payloads. One call is one delivery attempt.
#[async_trait]
pub trait Destination: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, payload: &Payload) -> Result<()>;
}
