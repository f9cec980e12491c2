use common::types::COOKIE_FBC_MAX_AGE;
use ingester::EventId;
use sailfish::TemplateOnce;

use crate::catalog::Catalog;
use crate::catalog::Release;
use crate::error::Result;

/// Serializes a string as a JS literal that is safe to place inside a `<script>` element.
pub fn script_string(s: &str) -> String {
    let json = serde_json::Value::String(s.to_string()).to_string();
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

struct LinkView {
    service: &'static str,
    label: &'static str,
    href: String,
}

#[derive(TemplateOnce)]
#[template(path = "release.stpl")]
struct ReleaseTemplate {
    artist_name: String,
    title: String,
    links: Vec<LinkView>,
    pixel_id: Option<String>,
    pixel_id_js: String,
    artist_name_js: String,
    title_js: String,
    visit_event_id_js: String,
    cookie_days: i64,
}

/// Landing page of one release.
///
/// `visit_event_id` is the single id of this page visit: the pixel call and the
/// `/capi/visit` beacon embedded in the page both send it.
pub fn release(release: &Release, pixel_id: Option<&str>, visit_event_id: EventId) -> Result<String> {
    let links = release
        .links
        .iter()
        .map(|l| LinkView {
            service: l.service.as_str(),
            label: l.service.label(),
            href: l.href.clone(),
        })
        .collect();

    let pixel_id = pixel_id.filter(|v| !v.is_empty()).map(str::to_owned);
    let tpl = ReleaseTemplate {
        artist_name: release.artist_name.clone(),
        title: release.title.clone(),
        links,
        pixel_id_js: script_string(pixel_id.as_deref().unwrap_or_default()),
        pixel_id,
        artist_name_js: script_string(&release.artist_name),
        title_js: script_string(&release.title),
        visit_event_id_js: script_string(&visit_event_id.to_string()),
        cookie_days: COOKIE_FBC_MAX_AGE,
    };

    Ok(tpl.render_once()?)
}

#[derive(TemplateOnce)]
#[template(path = "index.stpl")]
struct IndexTemplate {
    releases: Vec<(String, String, String)>,
}

pub fn index(catalog: &Catalog) -> Result<String> {
    let releases = catalog
        .iter()
        .map(|(slug, r)| (slug.clone(), r.artist_name.clone(), r.title.clone()))
        .collect();

    Ok(IndexTemplate { releases }.render_once()?)
}

#[derive(TemplateOnce)]
#[template(path = "privacy.stpl")]
struct PrivacyTemplate {}

pub fn privacy() -> Result<String> {
    Ok(PrivacyTemplate {}.render_once()?)
}

#[derive(TemplateOnce)]
#[template(path = "not_found.stpl")]
struct NotFoundTemplate {
    what: String,
}

pub fn not_found(what: &str) -> Result<String> {
    Ok(NotFoundTemplate {
        what: what.to_string(),
    }
    .render_once()?)
}
