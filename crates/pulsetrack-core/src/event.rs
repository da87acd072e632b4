use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::attribution::{BrowserInfo, UtmData};

/// The payload the tracker POSTs to `<script-origin>/api/track`.
/// Wire field "type" maps to the event kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub tracking_id: String,
    pub visitor_id: String,
    pub session_id: String,
    /// Millisecond timestamp minted once per page load; correlates all
    /// events fired from the same page view.
    pub page_view_id: i64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Combined string, e.g. "1920x1080".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport_size: Option<String>,
    pub event_data: EventData,
}

/// Attribution and context attached to every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub utm_data: UtmData,
    pub browser_info: BrowserInfo,
    /// Meta click id, `"-"` when unresolved.
    pub fbc: String,
    /// Meta browser id, `"-"` when unresolved.
    pub fbp: String,
    /// `"-"` until the out-of-band lookup resolves.
    pub ip: String,
    pub in_iframe: bool,
    /// Free-form per-event fields (event name, click destination, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const EVENT_TYPE_PAGEVIEW: &str = "pageview";
pub const EVENT_TYPE_CUSTOM: &str = "custom";
pub const EVENT_TYPE_CHECKOUT_CLICK: &str = "hotmart_click";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::SENTINEL;
    use serde_json::json;

    fn sample() -> EventPayload {
        let mut extra = Map::new();
        extra.insert("name".to_string(), json!("signup"));
        EventPayload {
            event_type: EVENT_TYPE_CUSTOM.to_string(),
            tracking_id: "acct_1".to_string(),
            visitor_id: "vis-1".to_string(),
            session_id: "sess-1".to_string(),
            page_view_id: 1700000000123,
            url: "https://example.com/".to_string(),
            referrer: None,
            user_agent: Some("UA".to_string()),
            screen_resolution: Some("1920x1080".to_string()),
            viewport_size: None,
            event_data: EventData {
                utm_data: UtmData::default(),
                browser_info: BrowserInfo {
                    user_agent: "UA".to_string(),
                    platform: "Linux".to_string(),
                    language: "en-US".to_string(),
                    cookies_enabled: true,
                },
                fbc: SENTINEL.to_string(),
                fbp: SENTINEL.to_string(),
                ip: SENTINEL.to_string(),
                in_iframe: false,
                extra,
            },
        }
    }

    #[test]
    fn wire_json_uses_type_field_and_flattens_extras() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["type"], "custom");
        assert_eq!(value["event_data"]["name"], "signup");
        assert_eq!(value["event_data"]["ip"], "-");
        // Absent optionals are omitted, not null.
        assert!(value.get("referrer").is_none());
    }
}
