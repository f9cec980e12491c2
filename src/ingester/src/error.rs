use std::result;

use axum::response::IntoResponse;
use axum::response::Response;
use common::error::CommonError;
use common::http::ApiError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = result::Result<T, IngesterError>;

#[derive(Error, Debug)]
pub enum IngesterError {
    #[error("General: {0:?}")]
    General(String),
    #[error("destination {destination}: status {status}: {body}")]
    Status {
        destination: &'static str,
        status: u16,
        body: String,
    },
    #[error("common: {0:?}")]
    Common(#[from] CommonError),
    #[error("reqwest: {0:?}")]
    Reqwest(#[from] reqwest::Error),
    #[error("serde: {0:?}")]
    Serde(#[from] serde_json::Error),
}

impl IntoResponse for IngesterError {
    fn into_response(self) -> Response {
        error!("ingester: {self}");
        ApiError::internal("internal server error").into_response()
    }
}
