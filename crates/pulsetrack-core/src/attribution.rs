use serde::{Deserialize, Serialize};
use url::Url;

/// Placeholder for attribution fields that could not be resolved.
/// The backend treats it as "absent" — never an empty string, so that
/// downstream CAPI calls can distinguish "unset" from "blank".
pub const SENTINEL: &str = "-";

/// The fixed UTM field list, in the order it participates in the
/// campaign fingerprint.
pub const UTM_FIELDS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
];

/// UTM parameters extracted from a page URL.
///
/// Missing fields stay `None` — defaulting happens server-side, never
/// in the client payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
}

impl UtmData {
    pub fn is_empty(&self) -> bool {
        self.utm_source.is_none()
            && self.utm_medium.is_none()
            && self.utm_campaign.is_none()
            && self.utm_term.is_none()
            && self.utm_content.is_none()
    }

    /// Present fields as `(key, value)` pairs in fixed field order.
    pub fn present_fields(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        let slots = [
            ("utm_source", self.utm_source.as_deref()),
            ("utm_medium", self.utm_medium.as_deref()),
            ("utm_campaign", self.utm_campaign.as_deref()),
            ("utm_term", self.utm_term.as_deref()),
            ("utm_content", self.utm_content.as_deref()),
        ];
        for (key, value) in slots {
            if let Some(v) = value {
                out.push((key, v));
            }
        }
        out
    }
}

/// Parse the fixed UTM field list from a URL's query string.
///
/// Returns the default (all-`None`) struct when the URL cannot be
/// parsed — a bad URL must never abort tracking.
pub fn parse_utm(page_url: &str) -> UtmData {
    let Ok(url) = Url::parse(page_url) else {
        return UtmData::default();
    };
    let mut utm = UtmData::default();
    for (key, value) in url.query_pairs() {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "utm_source" => utm.utm_source = Some(value.into_owned()),
            "utm_medium" => utm.utm_medium = Some(value.into_owned()),
            "utm_campaign" => utm.utm_campaign = Some(value.into_owned()),
            "utm_term" => utm.utm_term = Some(value.into_owned()),
            "utm_content" => utm.utm_content = Some(value.into_owned()),
            _ => {}
        }
    }
    utm
}

/// Extract a single query parameter from a URL.
pub fn query_param(page_url: &str, name: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Synthesize a Meta click identifier from a `fbclid` URL parameter.
///
/// Format: `fb.1.<epoch_ms>.<fbclid>` — mirrors the `_fbc` cookie
/// layout Meta's own pixel writes, so server-side CAPI calls accept
/// the value unmodified.
pub fn synthesize_fbc(fbclid: &str, now_ms: i64) -> String {
    format!("fb.1.{}.{}", now_ms, fbclid)
}

/// Browser characteristics captured once per page load and attached to
/// every event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserInfo {
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    pub platform: String,
    pub language: String,
    #[serde(rename = "cookiesEnabled")]
    pub cookies_enabled: bool,
}
