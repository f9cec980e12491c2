use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Path;
use axum::extract::Query;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::Uri;
use axum::response::Html;
use axum::routing::get;
use axum::Extension;
use axum::Router;
use axum_macros::debug_handler;
use chrono::Utc;
use common::types::COOKIE_FBC_MAX_AGE;
use common::types::COOKIE_NAME_FBC;
use ingester::click_id;
use ingester::click_id::ClickId;
use ingester::click_id::Sources;
use ingester::EventId;
use time::Duration;
use time::OffsetDateTime;
use tower_cookies::cookie::SameSite;
use tower_cookies::CookieManagerLayer;
use tower_cookies::Cookie;
use tower_cookies::Cookies;
use tracing::debug;
use tracing::info;

use crate::catalog::Release;
use crate::pages;
use crate::Catalog;
use crate::PlatformError;
use crate::Result;

/// Read-only state of the page routes.
#[derive(Debug, Clone)]
pub struct Pages {
    pub catalog: Catalog,
    pub pixel_id: Option<String>,
}

/// Stores a click identifier derived on this request so the page script and later
/// beacons find it. A stored identifier is never rewritten.
fn remember_click_id(cookies: &Cookies, click_id: &ClickId) {
    if !click_id.is_derived() {
        return;
    }

    let cookie = Cookie::build((COOKIE_NAME_FBC, click_id.value.clone()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(false)
        .expires(OffsetDateTime::now_utc() + Duration::days(COOKIE_FBC_MAX_AGE))
        .build();
    cookies.add(cookie);
}

fn render_release(
    state: &Pages,
    release: &Release,
    cookies: &Cookies,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<Html<String>> {
    let stored = cookies.get(COOKIE_NAME_FBC).map(|c| c.value().to_string());
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok());
    let sources = Sources {
        stored: stored.as_deref(),
        query: uri.query(),
        referer,
        event_source_url: None,
    };
    if let Some(click_id) = click_id::resolve(sources, Utc::now()) {
        debug!("click id {} ({:?})", click_id, click_id.origin);
        remember_click_id(cookies, &click_id);
    }

    let html = pages::release(release, state.pixel_id.as_deref(), EventId::new())?;
    Ok(Html(html))
}

#[debug_handler]
async fn index(
    Extension(state): Extension<Arc<Pages>>,
    Query(query): Query<HashMap<String, String>>,
    cookies: Cookies,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Html<String>> {
    match Release::from_query(&query) {
        Some(release) => render_release(&state, &release, &cookies, &headers, &uri),
        None => Ok(Html(pages::index(&state.catalog)?)),
    }
}

#[debug_handler]
async fn release(
    Extension(state): Extension<Arc<Pages>>,
    Path(slug): Path<String>,
    cookies: Cookies,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Html<String>> {
    let release = state
        .catalog
        .get(&slug)
        .ok_or_else(|| PlatformError::NotFound(format!("release \"{slug}\"")))?;

    render_release(&state, release, &cookies, &headers, &uri)
}

async fn privacy() -> Result<Html<String>> {
    Ok(Html(pages::privacy()?))
}

pub fn attach_routes(router: Router, catalog: Catalog, pixel_id: Option<String>) -> Router {
    info!("attaching page routes...");
    let state = Arc::new(Pages { catalog, pixel_id });

    router.merge(
        Router::new()
            .route("/", get(index))
            .route("/privacy", get(privacy))
            .route("/:slug", get(release))
            .layer(Extension(state))
            .layer(CookieManagerLayer::new()),
    )
}
