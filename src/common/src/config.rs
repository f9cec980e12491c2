use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::level_filters::LevelFilter;
use url::Url;

use crate::error::CommonError;
use crate::error::Result;

pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v19.0";

#[derive(Debug, Clone)]
pub struct Server {
    pub host: SocketAddr,
    /// Take the client ip from `X-Forwarded-For` instead of the peer address.
    pub trust_proxy: bool,
}

#[derive(Debug, Clone)]
pub struct Capi {
    pub pixel_id: Option<String>,
    pub access_token: Option<String>,
    pub graph_url: Url,
    pub api_version: String,
    pub test_event_code: Option<String>,
    pub timeout: Duration,
}

impl Capi {
    /// `<graph_url>/<api_version>/<pixel_id>/events`
    pub fn events_url(&self) -> Result<Url> {
        let pixel_id = self
            .pixel_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CommonError::InvalidConfig("pixel id is not set".to_string()))?;

        let mut url = self.graph_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                CommonError::InvalidConfig(format!("graph url {} can't be a base", self.graph_url))
            })?
            .pop_if_empty()
            .push(&self.api_version)
            .push(pixel_id)
            .push("events");

        Ok(url)
    }

    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|v| !v.is_empty());
        set(&self.pixel_id) && set(&self.access_token)
    }
}

#[derive(Debug, Clone)]
pub struct Log {
    pub level: LevelFilter,
}

#[derive(Debug, Clone)]
pub struct Metrics {
    pub listen: Option<SocketAddr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub artist_name: String,
    pub title: String,
    pub spotify: String,
    pub apple: String,
    pub ytm: String,
    pub amazon: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: Server,
    pub capi: Capi,
    pub log: Log,
    pub metrics: Metrics,
    /// Extra catalog entries keyed by slug, on top of the built-in ones.
    pub catalog: BTreeMap<String, CatalogEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: Server {
                host: SocketAddr::from(([0, 0, 0, 0], 3000)),
                trust_proxy: true,
            },
            capi: Capi {
                pixel_id: None,
                access_token: None,
                graph_url: Url::parse(DEFAULT_GRAPH_URL).expect("default graph url is valid"),
                api_version: DEFAULT_API_VERSION.to_string(),
                test_event_code: None,
                timeout: Duration::from_secs(10),
            },
            log: Log {
                level: LevelFilter::INFO,
            },
            metrics: Metrics { listen: None },
            catalog: BTreeMap::new(),
        }
    }
}
