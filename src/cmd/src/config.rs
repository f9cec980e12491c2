use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::Path;

use clap::ValueEnum;
use common::config::DEFAULT_API_VERSION;
use common::config::DEFAULT_GRAPH_URL;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use url::Url;

use crate::error::Error;
use crate::error::Result;

pub const ENV_PIXEL_ID: &str = "PIXEL_ID";
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ENV_PORT: &str = "PORT";
pub const ENV_TEST_EVENT_CODE: &str = "TEST_EVENT_CODE";

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Server {
    pub host: SocketAddr,
    pub trust_proxy: bool,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Capi {
    pub pixel_id: Option<String>,
    pub access_token: Option<String>,
    pub graph_url: String,
    pub api_version: String,
    pub test_event_code: Option<String>,
    pub timeout: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Log {
    pub level: LogLevel,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Metrics {
    pub listen: Option<SocketAddr>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogEntry {
    pub artist_name: String,
    pub title: String,
    pub spotify: String,
    pub apple: String,
    pub ytm: String,
    pub amazon: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub server: Server,
    pub capi: Capi,
    pub log: Log,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub catalog: BTreeMap<String, CatalogEntry>,
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|v| !v.is_empty())
}

/// Loads the config file (format picked by extension) on top of the defaults, then applies
/// the environment overrides. `env` is usually `std::env::var`.
pub fn load<F>(path: Option<&Path>, env: F) -> Result<Config>
where F: Fn(&str) -> Option<String> {
    let mut builder = ::config::Config::builder()
        .set_default("server.host", "0.0.0.0:3000")?
        .set_default("server.trust_proxy", true)?
        .set_default("capi.graph_url", DEFAULT_GRAPH_URL)?
        .set_default("capi.api_version", DEFAULT_API_VERSION)?
        .set_default("capi.timeout", "10s")?
        .set_default("log.level", "info")?;
    if let Some(path) = path {
        builder = builder.add_source(::config::File::from(path));
    }

    let mut cfg: Config = builder
        .set_override_option("capi.pixel_id", non_empty(env(ENV_PIXEL_ID)))?
        .set_override_option("capi.access_token", non_empty(env(ENV_ACCESS_TOKEN)))?
        .set_override_option("capi.test_event_code", non_empty(env(ENV_TEST_EVENT_CODE)))?
        .build()?
        .try_deserialize()?;

    if let Some(port) = non_empty(env(ENV_PORT)) {
        let port = port
            .parse::<u16>()
            .map_err(|err| Error::InvalidConfig(format!("{ENV_PORT} {port:?}: {err}")))?;
        cfg.server.host.set_port(port);
    }

    Ok(cfg)
}

impl TryInto<common::config::Config> for Config {
    type Error = Error;

    fn try_into(self) -> Result<common::config::Config> {
        Ok(common::config::Config {
            server: common::config::Server {
                host: self.server.host,
                trust_proxy: self.server.trust_proxy,
            },
            capi: common::config::Capi {
                pixel_id: non_empty(self.capi.pixel_id),
                access_token: non_empty(self.capi.access_token),
                graph_url: Url::parse(&self.capi.graph_url)?,
                api_version: self.capi.api_version,
                test_event_code: non_empty(self.capi.test_event_code),
                timeout: parse_duration::parse(&self.capi.timeout)?,
            },
            log: common::config::Log {
                level: self.log.level.into(),
            },
            metrics: common::config::Metrics {
                listen: self.metrics.listen,
            },
            catalog: self
                .catalog
                .into_iter()
                .map(|(slug, e)| {
                    (slug, common::config::CatalogEntry {
                        artist_name: e.artist_name,
                        title: e.title,
                        spotify: e.spotify,
                        apple: e.apple,
                        ytm: e.ytm,
                        amazon: e.amazon,
                    })
                })
                .collect(),
        })
    }
}

#[derive(Deserialize, Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::temp_dir;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = temp_dir().join(format!("linkpage-{}-{name}.toml", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let cfg: common::config::Config = load(None, no_env).unwrap().try_into().unwrap();

        assert_eq!(cfg.server.host, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert!(cfg.server.trust_proxy);
        assert_eq!(cfg.capi.pixel_id, None);
        assert_eq!(cfg.capi.graph_url.as_str(), "https://graph.facebook.com/");
        assert_eq!(cfg.capi.api_version, DEFAULT_API_VERSION);
        assert_eq!(cfg.capi.timeout, Duration::from_secs(10));
        assert_eq!(cfg.log.level, LevelFilter::INFO);
        assert_eq!(cfg.metrics.listen, None);
        assert!(cfg.catalog.is_empty());
    }

    #[test]
    fn test_file() {
        let path = write_config(
            "file",
            r#"
[server]
host = "127.0.0.1:8080"
trust_proxy = false

[capi]
pixel_id = "123456789012345"
access_token = "token"
timeout = "3s"

[log]
level = "debug"

[metrics]
listen = "127.0.0.1:9102"

[catalog.sommer]
artist_name = "matas"
title = "Sommer"
spotify = "https://open.spotify.com/track/1"
"#,
        );

        let cfg: common::config::Config = load(Some(&path), no_env).unwrap().try_into().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(cfg.server.host, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert!(!cfg.server.trust_proxy);
        assert!(cfg.capi.is_configured());
        assert_eq!(cfg.capi.timeout, Duration::from_secs(3));
        assert_eq!(cfg.log.level, LevelFilter::DEBUG);
        assert_eq!(
            cfg.metrics.listen,
            Some(SocketAddr::from(([127, 0, 0, 1], 9102)))
        );
        let entry = cfg.catalog.get("sommer").unwrap();
        assert_eq!(entry.title, "Sommer");
        assert_eq!(entry.apple, "");
    }

    #[test]
    fn test_env_overrides() {
        let path = write_config(
            "env",
            r#"
[capi]
pixel_id = "from-file"
"#,
        );
        let env = HashMap::from([
            (ENV_PIXEL_ID, "from-env"),
            (ENV_ACCESS_TOKEN, "token"),
            (ENV_PORT, "8081"),
            (ENV_TEST_EVENT_CODE, ""),
        ]);

        let cfg = load(Some(&path), |k| env.get(k).map(|v| v.to_string())).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(cfg.capi.pixel_id.as_deref(), Some("from-env"));
        assert_eq!(cfg.capi.access_token.as_deref(), Some("token"));
        assert_eq!(cfg.capi.test_event_code, None);
        assert_eq!(cfg.server.host, SocketAddr::from(([0, 0, 0, 0], 8081)));
    }

    #[test]
    fn test_invalid_port() {
        let res = load(None, |k| (k == ENV_PORT).then(|| "http".to_string()));
        assert!(matches!(res, Err(Error::InvalidConfig(_))));
    }
}
