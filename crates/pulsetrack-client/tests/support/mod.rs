#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use pulsetrack_client::dispatch::{IpResolver, Transport};
use pulsetrack_client::page::Page;
use pulsetrack_core::event::EventPayload;

/// Ordered log shared between the fake page and the mock transport so
/// tests can assert cross-component ordering (send before navigate).
pub type ActionLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> ActionLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// In-memory page double. Cookie writes respect `cookies_enabled`.
pub struct FakePage {
    pub url: String,
    pub referrer: Option<String>,
    pub script_src: Option<String>,
    pub cookies_enabled: bool,
    pub top_frame: bool,
    pub cookies: Arc<Mutex<HashMap<String, String>>>,
    pub navigations: Mutex<Vec<String>>,
    pub cookie_write_calls: Mutex<usize>,
    pub log: ActionLog,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            referrer: None,
            script_src: Some("https://cdn.example.com/client/track.js".to_string()),
            cookies_enabled: true,
            top_frame: true,
            cookies: Arc::new(Mutex::new(HashMap::new())),
            navigations: Mutex::new(Vec::new()),
            cookie_write_calls: Mutex::new(0),
            log: new_log(),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.lock().unwrap().get(name).cloned()
    }

    pub fn set_cookie(&self, name: &str, value: &str) {
        self.cookies
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn cookie_write_calls(&self) -> usize {
        *self.cookie_write_calls.lock().unwrap()
    }
}

impl Page for FakePage {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn referrer(&self) -> Option<String> {
        self.referrer.clone()
    }

    fn user_agent(&self) -> String {
        "Mozilla/5.0 (X11; Linux x86_64) TestBrowser/1.0".to_string()
    }

    fn platform(&self) -> String {
        "Linux x86_64".to_string()
    }

    fn language(&self) -> String {
        "en-US".to_string()
    }

    fn screen_resolution(&self) -> Option<String> {
        Some("1920x1080".to_string())
    }

    fn viewport_size(&self) -> Option<String> {
        Some("1280x720".to_string())
    }

    fn cookies_enabled(&self) -> bool {
        self.cookies_enabled
    }

    fn read_cookie(&self, name: &str) -> Option<String> {
        self.cookies.lock().unwrap().get(name).cloned()
    }

    fn write_cookie(&self, name: &str, value: &str, _max_age_minutes: u32) {
        *self.cookie_write_calls.lock().unwrap() += 1;
        if !self.cookies_enabled {
            return;
        }
        self.cookies
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
    }

    fn delete_cookie(&self, name: &str) {
        self.cookies.lock().unwrap().remove(name);
    }

    fn is_top_frame(&self) -> bool {
        self.top_frame
    }

    fn script_src(&self) -> Option<String> {
        self.script_src.clone()
    }

    fn navigate(&self, url: &str) {
        self.log.lock().unwrap().push(format!("navigate:{url}"));
        self.navigations.lock().unwrap().push(url.to_string());
    }
}

/// Records every delivered payload instead of touching the network.
pub struct MockTransport {
    pub sent: Mutex<Vec<(String, EventPayload)>>,
    pub log: ActionLog,
}

impl MockTransport {
    pub fn new(log: ActionLog) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            log,
        }
    }

    pub fn payloads(&self) -> Vec<EventPayload> {
        self.sent.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn of_type(&self, event_type: &str) -> Vec<EventPayload> {
        self.payloads()
            .into_iter()
            .filter(|p| p.event_type == event_type)
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, endpoint: &str, payload: &EventPayload) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("send:{}", payload.event_type));
        self.sent
            .lock()
            .unwrap()
            .push((endpoint.to_string(), payload.clone()));
        Ok(())
    }
}

/// Resolves instantly with a fixed address.
pub struct StaticIpResolver(pub &'static str);

#[async_trait]
impl IpResolver for StaticIpResolver {
    async fn resolve(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Never resolves — exercises the bounded-wait timeout path.
pub struct NeverIpResolver;

#[async_trait]
impl IpResolver for NeverIpResolver {
    async fn resolve(&self) -> Result<String> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

/// Let spawned fire-and-forget delivery tasks run to completion.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
