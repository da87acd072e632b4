use tracing::debug;

use pulsetrack_core::attribution::parse_utm;
use pulsetrack_core::fingerprint::CampaignFingerprint;
use pulsetrack_core::session::{evaluate, SessionRecord, SESSION_TIMEOUT_SECS};
use pulsetrack_core::visitor::generate_session_id;

use crate::store::{IdentityStore, SESSION_KEY};

/// Resolved session for this page load.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session_id: String,
    pub rotated: bool,
}

/// Evaluate session continuity once per page load and persist the
/// refreshed composite record.
///
/// The record is always rewritten with the current timestamp, current
/// campaign fingerprint, and the resolved session id — every page load
/// extends session life, whether or not rotation occurred.
pub fn resolve(store: &IdentityStore, page_url: &str, now: i64) -> SessionOutcome {
    let current = CampaignFingerprint::from_utm(&parse_utm(page_url));
    let stored = store
        .get(SESSION_KEY)
        .and_then(|raw| SessionRecord::parse(&raw));

    let decision = evaluate(stored.as_ref(), now, &current, generate_session_id);
    if decision.rotated {
        debug!(session_id = %decision.session_id, "session rotated");
    }

    let record = SessionRecord {
        started_at: now,
        fingerprint: current,
        session_id: decision.session_id.clone(),
    };
    // TTL matches the inactivity window; the rewrite above refreshes it.
    let ttl_minutes = (SESSION_TIMEOUT_SECS / 60) as u32;
    store.set(SESSION_KEY, &record.encode(), Some(ttl_minutes));

    SessionOutcome {
        session_id: decision.session_id,
        rotated: decision.rotated,
    }
}
