use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};
use url::{Origin, Url};

use pulsetrack_core::attribution::SENTINEL;
use pulsetrack_core::event::EventPayload;

use crate::config::Config;
use crate::error::TrackerError;

/// IP poll cadence and bound: check every 500 ms, give up after 10
/// attempts (~5 s) and dispatch with the sentinel. Fixed constants.
pub const POLL_INTERVAL_MS: u64 = 500;
pub const POLL_MAX_ATTEMPTS: u32 = 10;

/// Events POST to this sub-path of the script tag's origin.
pub const TRACK_PATH: &str = "/api/track";

/// Outbound event delivery seam.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, endpoint: &str, payload: &EventPayload) -> Result<()>;
}

/// reqwest-backed transport. The request is driven by the runtime, not
/// the page lifecycle, so an in-flight POST survives navigation.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, endpoint: &str, payload: &EventPayload) -> Result<()> {
        let response = self
            .client
            .post(endpoint)
            .json(payload)
            .send()
            .await
            .map_err(TrackerError::Transport)?;
        // Body is read for logging only; status never drives behaviour.
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(%status, %body, "event delivered");
        Ok(())
    }
}

/// Out-of-band IP resolution seam.
#[async_trait]
pub trait IpResolver: Send + Sync + 'static {
    async fn resolve(&self) -> Result<String>;
}

/// Queries the configured IP-echo service. Accepts either a JSON body
/// with an `ip` field or a bare-text address.
pub struct HttpIpResolver {
    client: reqwest::Client,
    url: String,
}

impl HttpIpResolver {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: config.ip_echo_url.clone(),
        }
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<String> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(TrackerError::Transport)?
            .text()
            .await
            .map_err(TrackerError::Transport)?;

        let ip = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => value
                .get("ip")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            Err(_) => body.trim().to_string(),
        };
        if ip.is_empty() {
            anyhow::bail!("ip echo service returned an empty address");
        }
        Ok(ip)
    }
}

/// Shared slot the boot-time lookup fills and dispatches read.
#[derive(Clone, Default)]
pub struct IpSlot(Arc<RwLock<Option<String>>>);

impl IpSlot {
    pub fn get(&self) -> Option<String> {
        self.0.read().ok().and_then(|slot| slot.clone())
    }

    pub fn set(&self, ip: String) {
        if let Ok(mut slot) = self.0.write() {
            *slot = Some(ip);
        }
    }

    pub fn current_or_sentinel(&self) -> String {
        self.get().unwrap_or_else(|| SENTINEL.to_string())
    }
}

/// Fire the IP lookup once at boot, independent of any page view.
/// Failure leaves the slot empty; dispatches fall back to the sentinel.
pub fn spawn_ip_lookup(resolver: Arc<dyn IpResolver>, slot: IpSlot) {
    tokio::spawn(async move {
        match resolver.resolve().await {
            Ok(ip) => {
                debug!(%ip, "ip resolved");
                slot.set(ip);
            }
            Err(e) => warn!(error = %e, "ip resolution failed"),
        }
    });
}

/// Derive the backend endpoint from the tracker script's own `src`:
/// the script origin plus the fixed track path. The backend is always
/// colocated with wherever the script was served from.
pub fn derive_endpoint(script_src: &str) -> Option<String> {
    let url = Url::parse(script_src).ok()?;
    match url.origin() {
        Origin::Tuple(..) => Some(format!("{}{}", url.origin().ascii_serialization(), TRACK_PATH)),
        Origin::Opaque(_) => None,
    }
}

/// Assembles and transmits event payloads.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    ip: IpSlot,
    endpoint: Option<String>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, ip: IpSlot, endpoint: Option<String>) -> Self {
        Self {
            transport,
            ip,
            endpoint,
        }
    }

    /// Best-effort IP for time-sensitive events; never waits.
    pub fn ip_now(&self) -> String {
        self.ip.current_or_sentinel()
    }

    /// Bounded wait for the out-of-band IP lookup: poll every 500 ms,
    /// at most 10 attempts, then proceed with whatever is available.
    /// The event is never dropped because of a slow or failed lookup.
    pub async fn wait_for_ip(&self) -> String {
        for _ in 0..POLL_MAX_ATTEMPTS {
            if let Some(ip) = self.ip.get() {
                return ip;
            }
            tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
        self.ip.current_or_sentinel()
    }

    fn endpoint(&self) -> Result<&str, TrackerError> {
        self.endpoint
            .as_deref()
            .ok_or(TrackerError::MissingScriptContext)
    }

    /// Fire-and-forget delivery. Failures are logged, never retried,
    /// and never surface to the caller.
    pub fn send(&self, payload: EventPayload) {
        let endpoint = match self.endpoint() {
            Ok(endpoint) => endpoint.to_string(),
            Err(e) => {
                warn!(error = %e, event_type = %payload.event_type, "event dropped");
                return;
            }
        };
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(e) = transport.send(&endpoint, &payload).await {
                warn!(error = %e, event_type = %payload.event_type, "event delivery failed");
            }
        });
    }

    /// Delivery that completes before returning. Used on the checkout
    /// click path, where the send must finish ahead of the navigation
    /// it precedes.
    pub async fn send_and_wait(&self, payload: EventPayload) {
        let endpoint = match self.endpoint() {
            Ok(endpoint) => endpoint.to_string(),
            Err(e) => {
                warn!(error = %e, event_type = %payload.event_type, "event dropped");
                return;
            }
        };
        if let Err(e) = self.transport.send(&endpoint, &payload).await {
            warn!(error = %e, event_type = %payload.event_type, "event delivery failed");
        }
    }
}
