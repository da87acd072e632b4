use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::attribution::UtmData;

/// Compact, reversible encoding of the active campaign parameters.
///
/// Present UTM fields are joined as `key=value` pairs (fixed field
/// order) and base64-url encoded. An empty fingerprint means "no
/// campaign data on this page load" and is represented as the empty
/// string — it never participates in session rotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignFingerprint(String);

impl CampaignFingerprint {
    pub fn from_utm(utm: &UtmData) -> Self {
        if utm.is_empty() {
            return Self(String::new());
        }
        let joined = utm
            .present_fields()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("|");
        Self(URL_SAFE_NO_PAD.encode(joined))
    }

    /// Rehydrate from a stored string. No validation — an unreadable
    /// stored fingerprint simply compares unequal and rotates.
    pub fn from_encoded(encoded: &str) -> Self {
        Self(encoded.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reverse the encoding back to `key=value` pairs, for debugging.
    pub fn decode(&self) -> Option<Vec<(String, String)>> {
        if self.0.is_empty() {
            return Some(Vec::new());
        }
        let bytes = URL_SAFE_NO_PAD.decode(&self.0).ok()?;
        let joined = String::from_utf8(bytes).ok()?;
        let mut pairs = Vec::new();
        for part in joined.split('|') {
            let (k, v) = part.split_once('=')?;
            pairs.push((k.to_string(), v.to_string()));
        }
        Some(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::parse_utm;

    #[test]
    fn empty_utm_yields_empty_fingerprint() {
        let fp = CampaignFingerprint::from_utm(&UtmData::default());
        assert!(fp.is_empty());
        assert_eq!(fp.as_str(), "");
    }

    #[test]
    fn fingerprint_is_reversible() {
        let utm = parse_utm("https://x.com/?utm_source=fb&utm_campaign=summer");
        let fp = CampaignFingerprint::from_utm(&utm);
        let pairs = fp.decode().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("utm_source".to_string(), "fb".to_string()),
                ("utm_campaign".to_string(), "summer".to_string()),
            ]
        );
    }

    #[test]
    fn fingerprint_is_order_stable() {
        // Query order must not matter; field order is fixed.
        let a = CampaignFingerprint::from_utm(&parse_utm(
            "https://x.com/?utm_medium=cpc&utm_source=fb",
        ));
        let b = CampaignFingerprint::from_utm(&parse_utm(
            "https://x.com/?utm_source=fb&utm_medium=cpc",
        ));
        assert_eq!(a, b);
    }

    #[test]
    fn different_campaigns_differ() {
        let a = CampaignFingerprint::from_utm(&parse_utm("https://x.com/?utm_source=fb"));
        let b = CampaignFingerprint::from_utm(&parse_utm("https://x.com/?utm_source=google"));
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_contains_no_delimiter_chars() {
        // The session record is colon-delimited; base64-url output must
        // never collide with it.
        let utm = parse_utm("https://x.com/?utm_source=a:b&utm_campaign=c_d");
        let fp = CampaignFingerprint::from_utm(&utm);
        assert!(!fp.as_str().contains(':'));
    }
}
