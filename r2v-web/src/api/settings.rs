//! Trending display settings
//!
//! Region and item count live in two cookies; there is no server-side
//! storage.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use r2v_common::model::Settings;
use r2v_common::regions::{format_region_label, supported_regions};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::AppState;

pub const REGION_COOKIE: &str = "trending_region";
pub const COUNT_COOKIE: &str = "trending_count";

/// One year
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

/// Value of cookie `name` from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}

/// `Set-Cookie` value with the shared attributes
pub fn cookie_header(name: &str, value: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        name, value, COOKIE_MAX_AGE_SECS
    )
}

/// Settings from cookies; missing or invalid values take the defaults
pub fn settings_from_headers(headers: &HeaderMap) -> Settings {
    let defaults = Settings::default();

    let region = read_cookie(headers, REGION_COOKIE)
        .and_then(|r| Settings::normalize_region(&r))
        .unwrap_or(defaults.region);

    let count = read_cookie(headers, COUNT_COOKIE)
        .and_then(|c| c.parse::<i64>().ok())
        .filter(|c| Settings::valid_count(*c))
        .map(|c| c as u32)
        .unwrap_or(defaults.count);

    Settings { region, count }
}

#[derive(Debug, Serialize)]
pub struct RegionOption {
    pub code: &'static str,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub region: String,
    pub region_label: String,
    pub count: u32,
    pub regions: Vec<RegionOption>,
}

/// Body of POST /api/settings/region
///
/// Fields are loosely typed so wrong types produce the endpoint's own
/// `{ok:false}` answer instead of a JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub region: Option<Value>,
    #[serde(default)]
    pub count: Option<Value>,
}

fn rejected(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "ok": false, "error": message })),
    )
        .into_response()
}

/// POST /api/settings/region
///
/// **Request:** `{"region": "gb", "count": 20}` (count optional)
/// **Response:** `{"ok": true}` plus `Set-Cookie` headers
///
/// **Errors:**
/// - 400 `{"ok": false, "error": "Invalid region"}`
/// - 400 `{"ok": false, "error": "Invalid count"}`
pub async fn update_settings(body: Option<Json<UpdateSettingsRequest>>) -> Response {
    let Json(payload) = body.unwrap_or_default();

    let Some(region) = payload
        .region
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Settings::normalize_region)
    else {
        debug!(region = ?payload.region, "Rejected region");
        return rejected("Invalid region");
    };

    let count = match payload.count {
        None | Some(Value::Null) => None,
        Some(ref value) => match value.as_i64().filter(|c| Settings::valid_count(*c)) {
            Some(c) => Some(c),
            None => {
                debug!(count = %value, "Rejected count");
                return rejected("Invalid count");
            }
        },
    };

    let mut cookies = vec![(header::SET_COOKIE, cookie_header(REGION_COOKIE, &region))];
    if let Some(c) = count {
        cookies.push((header::SET_COOKIE, cookie_header(COUNT_COOKIE, &c.to_string())));
    }

    info!(region = %region, count = ?count, "Trending settings saved");

    (AppendHeaders(cookies), Json(json!({ "ok": true }))).into_response()
}

/// GET /api/settings
pub async fn get_settings(headers: HeaderMap) -> Json<SettingsResponse> {
    let settings = settings_from_headers(&headers);

    Json(SettingsResponse {
        region_label: format_region_label(Some(&settings.region)),
        region: settings.region,
        count: settings.count,
        regions: supported_regions()
            .into_iter()
            .map(|code| RegionOption {
                code,
                label: format_region_label(Some(code)),
            })
            .collect(),
    })
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settings", get(get_settings))
        .route("/api/settings/region", post(update_settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        h
    }

    #[test]
    fn test_read_cookie() {
        let h = headers("theme=dark; trending_region=GB; trending_count=20");
        assert_eq!(read_cookie(&h, REGION_COOKIE).as_deref(), Some("GB"));
        assert_eq!(read_cookie(&h, COUNT_COOKIE).as_deref(), Some("20"));
        assert_eq!(read_cookie(&h, "missing"), None);
    }

    #[test]
    fn test_settings_fall_back_on_bad_cookies() {
        let s = settings_from_headers(&headers("trending_region=XYZ; trending_count=500"));
        assert_eq!(s, Settings::default());

        let s = settings_from_headers(&headers("trending_region=jp; trending_count=7"));
        assert_eq!(s.region, "JP");
        assert_eq!(s.count, 7);

        assert_eq!(settings_from_headers(&HeaderMap::new()), Settings::default());
    }

    #[test]
    fn test_cookie_header_attributes() {
        assert_eq!(
            cookie_header(REGION_COOKIE, "GB"),
            "trending_region=GB; Path=/; Max-Age=31536000; SameSite=Lax"
        );
    }
}
