use std::result;

use common::error::CommonError;
use ingester::error::IngesterError;
use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("BadRequest: {0}")]
    BadRequest(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("config: {0:?}")]
    Config(#[from] ::config::ConfigError),
    #[error("common: {0:?}")]
    Common(#[from] CommonError),
    #[error("ingester: {0:?}")]
    Ingester(#[from] IngesterError),
    #[error("ParseDuration: {0:?}")]
    ParseDuration(#[from] parse_duration::parse::Error),
    #[error("url: {0:?}")]
    Url(#[from] url::ParseError),
    #[error("StdIO: {0:?}")]
    StdIO(#[from] std::io::Error),
    #[error("SetGlobalDefaultError: {0:?}")]
    SetGlobalDefaultError(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("metrics: {0:?}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}
