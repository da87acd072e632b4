use pulsetrack_core::attribution::{parse_utm, query_param, synthesize_fbc, UtmData, SENTINEL};

use crate::store::{IdentityStore, FBC_KEY, FBP_KEY};

/// Per-event attribution snapshot. Computed synchronously from the URL
/// and storage only — safe to call before the IP lookup resolves.
#[derive(Debug, Clone)]
pub struct AttributionSnapshot {
    pub utm: UtmData,
    pub fbc: String,
    pub fbp: String,
}

/// Assemble the snapshot for the current page load.
///
/// `fbp` is read-only from storage. `fbc` prefers the stored cookie;
/// absent that, it is synthesized from a `fbclid` URL parameter and
/// the current time. Synthesized values are intentionally not written
/// back — each page view without a real `_fbc` cookie reflects the
/// freshest click. Both default to the sentinel and never block
/// dispatch.
pub fn snapshot(store: &IdentityStore, page_url: &str, now_ms: i64) -> AttributionSnapshot {
    let utm = parse_utm(page_url);

    let fbp = store
        .get(FBP_KEY)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| SENTINEL.to_string());

    let fbc = store
        .get(FBC_KEY)
        .filter(|v| !v.is_empty())
        .or_else(|| query_param(page_url, "fbclid").map(|id| synthesize_fbc(&id, now_ms)))
        .unwrap_or_else(|| SENTINEL.to_string());

    AttributionSnapshot { utm, fbc, fbp }
}
