use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use pulsetrack_core::attribution::BrowserInfo;
use pulsetrack_core::command::{Command, EventInput, RawCommand};
use pulsetrack_core::event::{
    EventData, EventPayload, EVENT_TYPE_CHECKOUT_CLICK, EVENT_TYPE_CUSTOM, EVENT_TYPE_PAGEVIEW,
};

use crate::attribution;
use crate::config::Config;
use crate::dispatch::{derive_endpoint, spawn_ip_lookup, Dispatcher, IpResolver, IpSlot, Transport};
use crate::identity;
use crate::page::Page;
use crate::queue::CommandBuffer;
use crate::session;
use crate::store::IdentityStore;

/// Outbound links whose href contains this substring are intercepted
/// as purchase-intent clicks.
pub const CHECKOUT_LINK_MARKER: &str = "pay.hotmart.com";

/// Query parameter carrying the visitor id onto the checkout page.
pub const CHECKOUT_VISITOR_PARAM: &str = "vid";

/// Identity resolved once per page load and shared by every event
/// fired from it.
#[derive(Debug, Clone)]
pub struct TrackerState {
    pub visitor_id: String,
    pub session_id: String,
    /// Millisecond timestamp, unique per page load, in-memory only.
    pub page_view_id: i64,
}

/// The tracker agent: one instance per page load.
///
/// Inside an embedded frame the instance is inert — no storage access,
/// no dispatches, no interception — so an embedded page is never
/// double-counted as a separate visit.
pub struct Tracker {
    inner: Option<Active>,
}

struct Active {
    page: Arc<dyn Page>,
    store: IdentityStore,
    state: TrackerState,
    dispatcher: Dispatcher,
    accounts: Vec<String>,
    click_armed: bool,
}

impl Tracker {
    /// Initialise the tracker and replay any commands the host page
    /// queued before the script loaded.
    ///
    /// Sequence: frame check → storage probe → visitor id → session
    /// evaluation → out-of-band IP lookup → buffered command replay.
    /// Each step degrades independently; none can break the host page.
    pub async fn boot(
        page: Arc<dyn Page>,
        transport: Arc<dyn Transport>,
        ip_resolver: Arc<dyn IpResolver>,
        buffer: CommandBuffer,
    ) -> Tracker {
        if !page.is_top_frame() {
            debug!("embedded frame detected, tracker inert");
            return Tracker { inner: None };
        }

        let store = IdentityStore::initialize(Arc::clone(&page));
        let visitor_id = identity::get_or_create(&store);

        let now = Utc::now();
        let session = session::resolve(&store, &page.url(), now.timestamp());

        let ip = IpSlot::default();
        spawn_ip_lookup(ip_resolver, ip.clone());

        let endpoint = page.script_src().as_deref().and_then(derive_endpoint);
        if endpoint.is_none() {
            warn!("no backend origin derivable from script context, events will be dropped");
        }

        let mut tracker = Tracker {
            inner: Some(Active {
                page,
                store,
                state: TrackerState {
                    visitor_id,
                    session_id: session.session_id,
                    page_view_id: now.timestamp_millis(),
                },
                dispatcher: Dispatcher::new(transport, ip, endpoint),
                accounts: Vec::new(),
                click_armed: false,
            }),
        };

        for raw in buffer.drain() {
            tracker.push(raw).await;
        }
        tracker
    }

    /// Convenience constructor wiring the production HTTP stack.
    pub async fn boot_with_http(
        page: Arc<dyn Page>,
        config: Config,
        buffer: CommandBuffer,
    ) -> Tracker {
        let transport = Arc::new(crate::dispatch::HttpTransport::new(&config));
        let resolver = Arc::new(crate::dispatch::HttpIpResolver::new(&config));
        Self::boot(page, transport, resolver, buffer).await
    }

    pub fn is_active(&self) -> bool {
        self.inner.is_some()
    }

    /// Identity for this page load, when the tracker is active.
    pub fn state(&self) -> Option<&TrackerState> {
        self.inner.as_ref().map(|active| &active.state)
    }

    pub fn accounts(&self) -> &[String] {
        self.inner
            .as_ref()
            .map(|active| active.accounts.as_slice())
            .unwrap_or_default()
    }

    /// Live command entry point. Commands pushed after boot dispatch
    /// immediately; unrecognized names are silently ignored.
    pub async fn push(&mut self, raw: RawCommand) {
        let Some(active) = self.inner.as_mut() else {
            return;
        };
        match Command::resolve(raw) {
            Command::Init(tracking_id) => active.handle_init(tracking_id),
            Command::Event(input) => active.handle_event(input).await,
            Command::Unknown(name) => {
                debug!(command = %name, "ignoring unrecognized command");
            }
        }
    }

    /// Delegated click handler for outbound checkout links.
    ///
    /// When `href` carries the checkout marker: the default navigation
    /// is the caller's to suppress, a purchase-intent event is
    /// dispatched and completed, the visitor id is appended to the
    /// destination, and the page is navigated there. Returns the final
    /// URL, or `None` when the click is not intercepted.
    pub async fn handle_click(&mut self, href: &str) -> Option<String> {
        let active = self.inner.as_mut()?;
        if !active.click_armed || !href.contains(CHECKOUT_LINK_MARKER) {
            return None;
        }
        Some(active.handle_checkout_click(href).await)
    }
}

impl Active {
    fn handle_init(&mut self, tracking_id: String) {
        if self.accounts.iter().any(|a| a == &tracking_id) {
            debug!(%tracking_id, "init already registered, no-op");
            return;
        }
        self.accounts.push(tracking_id.clone());
        debug!(%tracking_id, "account registered");

        self.dispatch_page_view(&tracking_id);
        self.arm_click_interception();
    }

    async fn handle_event(&mut self, input: EventInput) {
        if self.accounts.is_empty() {
            debug!("event received before any init, dropped");
            return;
        }
        let fields = input.into_fields();
        // Custom events are time-sensitive; attach the IP best-effort
        // without polling.
        let ip = self.dispatcher.ip_now();
        for tracking_id in self.accounts.clone() {
            let payload =
                self.build_payload(EVENT_TYPE_CUSTOM, &tracking_id, ip.clone(), fields.clone());
            self.dispatcher.send(payload);
        }
    }

    /// The payload is assembled synchronously; the bounded IP wait and
    /// the send run in their own task so command handling never stalls
    /// behind the poll.
    #[tracing::instrument(skip(self))]
    fn dispatch_page_view(&self, tracking_id: &str) {
        let mut payload = self.build_payload(
            EVENT_TYPE_PAGEVIEW,
            tracking_id,
            String::new(),
            Map::new(),
        );
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            payload.event_data.ip = dispatcher.wait_for_ip().await;
            dispatcher.send_and_wait(payload).await;
        });
    }

    /// Guarded so a second `init` never attaches a duplicate listener.
    fn arm_click_interception(&mut self) {
        if self.click_armed {
            return;
        }
        self.click_armed = true;
        debug!("outbound click interception armed");
    }

    #[tracing::instrument(skip(self))]
    async fn handle_checkout_click(&mut self, href: &str) -> String {
        let ip = self.dispatcher.ip_now();
        let mut fields = Map::new();
        fields.insert("destination".to_string(), Value::String(href.to_string()));

        // The sends must complete before navigation tears the page
        // down, hence send_and_wait on this path only.
        for tracking_id in self.accounts.clone() {
            let payload = self.build_payload(
                EVENT_TYPE_CHECKOUT_CLICK,
                &tracking_id,
                ip.clone(),
                fields.clone(),
            );
            self.dispatcher.send_and_wait(payload).await;
        }

        let target = append_visitor_param(href, &self.state.visitor_id);
        self.page.navigate(&target);
        target
    }

    fn build_payload(
        &self,
        event_type: &str,
        tracking_id: &str,
        ip: String,
        extra: Map<String, Value>,
    ) -> EventPayload {
        let url = self.page.url();
        let attr = attribution::snapshot(&self.store, &url, Utc::now().timestamp_millis());

        EventPayload {
            event_type: event_type.to_string(),
            tracking_id: tracking_id.to_string(),
            visitor_id: self.state.visitor_id.clone(),
            session_id: self.state.session_id.clone(),
            page_view_id: self.state.page_view_id,
            url,
            referrer: self.page.referrer().filter(|r| !r.is_empty()),
            user_agent: Some(self.page.user_agent()),
            screen_resolution: self.page.screen_resolution(),
            viewport_size: self.page.viewport_size(),
            event_data: EventData {
                utm_data: attr.utm,
                browser_info: BrowserInfo {
                    user_agent: self.page.user_agent(),
                    platform: self.page.platform(),
                    language: self.page.language(),
                    cookies_enabled: self.page.cookies_enabled(),
                },
                fbc: attr.fbc,
                fbp: attr.fbp,
                ip,
                in_iframe: !self.page.is_top_frame(),
                extra,
            },
        }
    }
}

/// Append the visitor id to the destination's query string. Falls back
/// to the original href when it cannot be parsed.
fn append_visitor_param(href: &str, visitor_id: &str) -> String {
    match Url::parse(href) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair(CHECKOUT_VISITOR_PARAM, visitor_id);
            url.to_string()
        }
        Err(_) => href.to_string(),
    }
}
