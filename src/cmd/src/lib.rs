use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header;
use axum::http::HeaderValue;
use axum::middleware;
use axum::Router;
use common::config::Config;
use common::http::measure_request_response;
use common::http::print_request_response;
use common::types::METRIC_CAPI_EVENTS_TOTAL;
use common::types::METRIC_HTTP_REQUESTS_TOTAL;
use common::types::METRIC_HTTP_REQUEST_TIME_SECONDS;
use ingester::destinations::capi::Capi;
use ingester::destinations::debug::Debug;
use ingester::processors::identity::Identity;
use ingester::processors::test_event_code::TestEventCode;
use ingester::Destination;
use ingester::Executor;
use ingester::Processor;
use metrics::describe_counter;
use metrics::describe_histogram;
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusBuilder;
use platform::Catalog;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::error::Result;

pub mod config;
pub mod error;
pub mod server;

pub fn init_metrics(listen: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(listen)
        .install()?;

    describe_counter!(METRIC_HTTP_REQUESTS_TOTAL, "number of http requests");
    describe_histogram!(
        METRIC_HTTP_REQUEST_TIME_SECONDS,
        Unit::Seconds,
        "http request time"
    );
    describe_counter!(
        METRIC_CAPI_EVENTS_TOTAL,
        "number of conversion events handed to a destination"
    );

    Ok(())
}

fn init_ingester(cfg: &Config, router: Router) -> Result<Router> {
    let mut processors = vec![Arc::new(Identity::new()) as Arc<dyn Processor>];
    if let Some(code) = cfg.capi.test_event_code.clone() {
        info!("test event code: {code}");
        processors.push(Arc::new(TestEventCode::new(code)) as Arc<dyn Processor>);
    }

    let destination = if cfg.capi.is_configured() {
        let capi = Capi::try_new(&cfg.capi)?;
        info!("forwarding events to {}", capi.endpoint());
        Arc::new(capi) as Arc<dyn Destination>
    } else {
        warn!("PIXEL_ID or ACCESS_TOKEN is not set, events are only logged");
        Arc::new(Debug::new()) as Arc<dyn Destination>
    };

    let executor = Executor::new(processors, vec![destination]);

    Ok(ingester::sources::http::attach_routes(
        router,
        Arc::new(executor),
        cfg.server.trust_proxy,
    ))
}

fn init_platform(cfg: &Config, router: Router) -> Router {
    let catalog = Catalog::new(&cfg.catalog);
    info!("catalog: {} releases", catalog.len());

    platform::http::attach_routes(router, catalog, cfg.capi.pixel_id.clone())
}

/// Complete application router: tracking routes, page routes and the shared layers.
pub fn router(cfg: &Config) -> Result<Router> {
    info!("initializing ingester...");
    let router = init_ingester(cfg, Router::new())?;
    info!("initializing platform...");
    let router = init_platform(cfg, router);

    Ok(router
        .layer(middleware::from_fn(print_request_response))
        .layer(middleware::from_fn(measure_request_response))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(CatchPanicLayer::new()))
}
