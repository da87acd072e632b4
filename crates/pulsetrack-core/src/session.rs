use crate::fingerprint::CampaignFingerprint;

/// A session goes stale after 30 minutes without activity.
/// Fixed constant — intentionally not configurable per tracking id.
pub const SESSION_TIMEOUT_SECS: i64 = 1800;

/// The composite session record persisted client-side as one value:
/// `<unix_seconds>:<fingerprint>:<session_id>`.
///
/// Keeping all three fields in a single record lets session continuity
/// be evaluated on the next page load without a server round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub started_at: i64,
    pub fingerprint: CampaignFingerprint,
    pub session_id: String,
}

impl SessionRecord {
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}",
            self.started_at,
            self.fingerprint.as_str(),
            self.session_id
        )
    }

    /// Parse a stored composite record. Returns `None` for anything
    /// malformed — the caller treats that the same as "no record" and
    /// mints a fresh session.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ':');
        let started_at: i64 = parts.next()?.parse().ok()?;
        let fingerprint = CampaignFingerprint::from_encoded(parts.next()?);
        let session_id = parts.next()?.to_string();
        if session_id.is_empty() {
            return None;
        }
        Some(Self {
            started_at,
            fingerprint,
            session_id,
        })
    }
}

/// Outcome of the once-per-page-load session evaluation.
#[derive(Debug, Clone)]
pub struct SessionDecision {
    pub session_id: String,
    pub rotated: bool,
}

/// Apply the session-boundary rule.
///
/// A stored session is reused only while both hold:
/// - elapsed time since the record's timestamp is within the 30-minute
///   window, and
/// - the current campaign fingerprint, when non-empty, matches the
///   stored one. An empty current fingerprint (no UTM on this page
///   load) never forces rotation on its own.
///
/// `mint` supplies fresh session ids so the rule stays testable with a
/// deterministic generator.
pub fn evaluate<F>(
    record: Option<&SessionRecord>,
    now: i64,
    current: &CampaignFingerprint,
    mut mint: F,
) -> SessionDecision
where
    F: FnMut() -> String,
{
    let Some(record) = record else {
        return SessionDecision {
            session_id: mint(),
            rotated: true,
        };
    };

    let elapsed = now - record.started_at;
    let expired = elapsed > SESSION_TIMEOUT_SECS;
    let campaign_changed = !current.is_empty() && *current != record.fingerprint;

    if expired || campaign_changed {
        SessionDecision {
            session_id: mint(),
            rotated: true,
        }
    } else {
        SessionDecision {
            session_id: record.session_id.clone(),
            rotated: false,
        }
    }
}
