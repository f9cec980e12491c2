use std::result;

use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Response;
use common::http::ApiError;
use thiserror::Error;
use tracing::error;

use crate::pages;

pub type Result<T> = result::Result<T, PlatformError>;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("not found: {0:?}")]
    NotFound(String),
    #[error("render: {0:?}")]
    Render(#[from] sailfish::RenderError),
    #[error("internal: {0:?}")]
    Internal(String),
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        match self {
            PlatformError::NotFound(what) => match pages::not_found(&what) {
                Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
                Err(err) => err.into_response(),
            },
            err => {
                error!("platform error: {:?}", err);
                ApiError::internal(err.to_string()).into_response()
            }
        }
    }
}
