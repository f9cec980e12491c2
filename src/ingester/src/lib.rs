pub mod click_id;
pub mod destination;
pub mod destinations;
pub mod error;
pub mod event_id;
pub mod executor;
pub mod payload;
pub mod processor;
pub mod processors;
pub mod sources;
pub mod track;

use std::net::IpAddr;

use chrono::DateTime;
use chrono::Utc;
pub use destination::Destination;
pub use event_id::EventId;
pub use executor::Executor;
pub use payload::Payload;
pub use processor::Processor;
pub use track::CustomData;
pub use track::Track;

/// Whitespace-only values count as absent everywhere an identifier is read.
pub(crate) fn is_blank(v: &str) -> bool {
    v.trim().is_empty()
}

/// What the server knows about the request an event arrived with.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub client_ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    /// Raw query string of the request, without the leading `?`.
    pub query: Option<String>,
    pub fbc_cookie: Option<String>,
    pub fbp_cookie: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(received_at: DateTime<Utc>) -> Self {
        Self {
            client_ip: None,
            user_agent: None,
            referer: None,
            query: None,
            fbc_cookie: None,
            fbp_cookie: None,
            received_at,
        }
    }
}
