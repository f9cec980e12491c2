pub const EVENT_LINK_VISIT: &str = "LinkVisit";
pub const EVENT_LINK_CLICK: &str = "LinkClick";

pub const ACTION_SOURCE_WEBSITE: &str = "website";

pub const COOKIE_NAME_FBC: &str = "_fbc";
pub const COOKIE_NAME_FBP: &str = "_fbp";
// days
pub const COOKIE_FBC_MAX_AGE: i64 = 90;

pub const QUERY_PARAM_CLICK_REFERENCE: &str = "fbclid";

pub const MUSIC_SERVICE_LANDING: &str = "landing";
pub const CLICK_VALUE: i64 = 0;
pub const CLICK_CURRENCY: &str = "EUR";

pub const METRIC_HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const METRIC_HTTP_REQUEST_TIME_SECONDS: &str = "http_request_time_seconds";
pub const METRIC_CAPI_EVENTS_TOTAL: &str = "capi_events_total";
