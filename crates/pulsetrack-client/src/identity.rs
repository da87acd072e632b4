use tracing::warn;

use pulsetrack_core::visitor::{fallback_visitor_id, generate_visitor_id};

use crate::store::{IdentityStore, DEFAULT_TTL_MINUTES, VISITOR_KEY};

/// Return the stored visitor id, or mint and persist a new one.
///
/// Persistence failures are swallowed: the generated id is still used
/// for the current page view even if it will not survive a reload.
pub fn get_or_create(store: &IdentityStore) -> String {
    if let Some(id) = store.get(VISITOR_KEY) {
        if !id.is_empty() {
            return id;
        }
    }

    let id = new_visitor_id();
    store.set(VISITOR_KEY, &id, Some(DEFAULT_TTL_MINUTES));
    id
}

/// Strong UUID path with a weaker, visually distinguishable fallback.
/// `uuid` v4 aborts by panicking when the OS entropy source is
/// unavailable, so the unwind is contained here.
fn new_visitor_id() -> String {
    match std::panic::catch_unwind(generate_visitor_id) {
        Ok(id) => id,
        Err(_) => {
            warn!("strong random source unavailable, using fallback visitor id");
            fallback_visitor_id()
        }
    }
}
