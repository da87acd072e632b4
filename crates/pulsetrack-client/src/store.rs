use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::page::Page;

/// Visitor id key. Stable across script versions — renaming it would
/// churn every visitor id in the field.
pub const VISITOR_KEY: &str = "pt_visitor";
/// Composite session record key.
pub const SESSION_KEY: &str = "pt_session";
/// Meta's own cookie names; the pixel may have written these already.
pub const FBC_KEY: &str = "_fbc";
pub const FBP_KEY: &str = "_fbp";

/// Rolling one-year TTL, in minutes.
pub const DEFAULT_TTL_MINUTES: u32 = 525_600;

const PROBE_KEY: &str = "pt_probe";

/// Durable key-value persistence behind the tracker.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str, ttl_minutes: Option<u32>);
}

/// Cookie-backed store. All operations delegate to the page boundary.
pub struct CookieStore {
    page: Arc<dyn Page>,
}

impl KeyValueStore for CookieStore {
    fn get(&self, key: &str) -> Option<String> {
        self.page.read_cookie(key)
    }

    fn set(&self, key: &str, value: &str, ttl_minutes: Option<u32>) {
        let ttl = ttl_minutes.filter(|t| *t > 0).unwrap_or(DEFAULT_TTL_MINUTES);
        self.page.write_cookie(key, value, ttl);
    }
}

/// In-memory fallback used when cookies are blocked. Does not survive
/// a page reload — accepted degradation, not a bug.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str, _ttl_minutes: Option<u32>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

/// Storage abstraction with graceful degradation: probes cookie
/// writability once at initialisation and falls back to a
/// non-persistent in-memory map when the probe fails. Every operation
/// is best-effort and never fails.
pub struct IdentityStore {
    backend: Box<dyn KeyValueStore>,
    durable: bool,
}

impl IdentityStore {
    /// Probe the cookie medium by writing a throwaway marker, reading
    /// it back, and deleting it.
    pub fn initialize(page: Arc<dyn Page>) -> Self {
        page.write_cookie(PROBE_KEY, "1", 1);
        let writable = page.read_cookie(PROBE_KEY).as_deref() == Some("1");
        page.delete_cookie(PROBE_KEY);

        if writable {
            debug!("cookie storage available");
            Self {
                backend: Box::new(CookieStore { page }),
                durable: true,
            }
        } else {
            warn!("cookie storage unavailable, falling back to in-memory store");
            Self {
                backend: Box::new(MemoryStore::default()),
                durable: false,
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.backend.get(key)
    }

    pub fn set(&self, key: &str, value: &str, ttl_minutes: Option<u32>) {
        self.backend.set(key, value, ttl_minutes);
    }

    /// False when operating on the in-memory fallback.
    pub fn is_durable(&self) -> bool {
        self.durable
    }
}
