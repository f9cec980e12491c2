use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::routing;
use axum::Router;
use axum_macros::debug_handler;
use chrono::Utc;
use common::http::Json;
use common::types::CLICK_CURRENCY;
use common::types::CLICK_VALUE;
use common::types::COOKIE_NAME_FBC;
use common::types::COOKIE_NAME_FBP;
use common::types::EVENT_LINK_CLICK;
use common::types::EVENT_LINK_VISIT;
use common::types::MUSIC_SERVICE_LANDING;
use tower_cookies::CookieManagerLayer;
use tower_cookies::Cookies;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tracing::debug;
use tracing::info;

use crate::error::Result;
use crate::executor::Executor;
pub use crate::sources::http::track::TrackRequest;
use crate::CustomData;
use crate::RequestContext;
use crate::Track;

mod track;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Picks the client address. Behind a trusted proxy the left-most `X-Forwarded-For` entry
/// is the client, otherwise the peer of the connection.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> Option<IpAddr> {
    if trust_proxy {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }

    peer.map(|addr| addr.ip())
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

#[derive(Clone)]
struct App {
    executor: Arc<Executor>,
    trust_proxy: bool,
}

impl App {
    fn request_context(
        &self,
        peer: Option<SocketAddr>,
        headers: &HeaderMap,
        uri: &Uri,
        cookies: &Cookies,
    ) -> RequestContext {
        RequestContext {
            client_ip: client_ip(headers, peer, self.trust_proxy),
            user_agent: header_value(headers, header::USER_AGENT),
            referer: header_value(headers, header::REFERER),
            query: uri.query().map(str::to_owned),
            fbc_cookie: cookies.get(COOKIE_NAME_FBC).map(|c| c.value().to_string()),
            fbp_cookie: cookies.get(COOKIE_NAME_FBP).map(|c| c.value().to_string()),
            received_at: Utc::now(),
        }
    }

    fn visit(&self, ctx: &RequestContext, req: TrackRequest) -> Result<()> {
        let track = Track {
            event: EVENT_LINK_VISIT.to_string(),
            event_id: req.event_id,
            event_source_url: req.event_source_url,
            fbp: req.fbp,
            fbc: req.fbc,
            custom_data: CustomData {
                artist_name: req.artist_name,
                title: req.title,
                music_service: Some(MUSIC_SERVICE_LANDING.to_string()),
                ..Default::default()
            },
            test_event_code: req.test_event_code,
        };

        self.executor.execute(ctx, track)?;
        Ok(())
    }

    fn click(&self, ctx: &RequestContext, req: TrackRequest) -> Result<()> {
        debug!("click to {:?}", req.to);
        let track = Track {
            event: EVENT_LINK_CLICK.to_string(),
            event_id: req.event_id,
            event_source_url: req.event_source_url,
            fbp: req.fbp,
            fbc: req.fbc,
            custom_data: CustomData {
                artist_name: req.artist_name,
                title: req.title,
                music_service: req.music_service,
                value: Some(CLICK_VALUE),
                currency: Some(CLICK_CURRENCY.to_string()),
                ..Default::default()
            },
            test_event_code: req.test_event_code,
        };

        self.executor.execute(ctx, track)?;
        Ok(())
    }
}

#[debug_handler]
async fn visit(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    State(state): State<App>,
    cookies: Cookies,
    headers: HeaderMap,
    uri: Uri,
    Json(request): Json<TrackRequest>,
) -> Result<StatusCode> {
    let ctx = state.request_context(connect_info.map(|v| v.0), &headers, &uri, &cookies);
    state.visit(&ctx, request)?;
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
async fn click(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    State(state): State<App>,
    cookies: Cookies,
    headers: HeaderMap,
    uri: Uri,
    Json(request): Json<TrackRequest>,
) -> Result<StatusCode> {
    let ctx = state.request_context(connect_info.map(|v| v.0), &headers, &uri, &cookies);
    state.click(&ctx, request)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn attach_routes(router: Router, executor: Arc<Executor>, trust_proxy: bool) -> Router {
    let state = App {
        executor,
        trust_proxy,
    };
    info!("attaching capi routes...");
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    router.merge(
        Router::new()
            .route("/capi/visit", routing::post(visit))
            .route("/capi/click", routing::post(click))
            .layer(CookieManagerLayer::new())
            .layer(cors)
            .with_state(state),
    )
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_client_ip() {
        let peer = Some(SocketAddr::from(([10, 0, 0, 1], 5555)));
        let mut headers = HeaderMap::new();
        assert_eq!(
            client_ip(&headers, peer, true),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
        );

        headers.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 10.0.0.2"),
        );
        assert_eq!(
            client_ip(&headers, peer, true),
            Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)))
        );
        assert_eq!(
            client_ip(&headers, peer, false),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
        );

        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("garbage"));
        assert_eq!(
            client_ip(&headers, peer, true),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
        );
        assert_eq!(client_ip(&HeaderMap::new(), None, true), None);
    }
}
