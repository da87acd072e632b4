use std::time::Duration;

/// Embedder-facing configuration.
///
/// The session timeout (30 minutes) and the IP poll bound (10 × 500 ms)
/// are deliberately NOT configurable — they are fixed constants in
/// `pulsetrack_core::session` and [`crate::dispatch`].
#[derive(Debug, Clone)]
pub struct Config {
    /// External IP-echo service queried once at boot.
    pub ip_echo_url: String,
    /// Timeout applied to every outbound HTTP request.
    pub request_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            ip_echo_url: std::env::var("PULSETRACK_IP_ECHO_URL")
                .unwrap_or_else(|_| "https://api.ipify.org/?format=json".to_string()),
            request_timeout_ms: std::env::var("PULSETRACK_REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip_echo_url: "https://api.ipify.org/?format=json".to_string(),
            request_timeout_ms: 3000,
        }
    }
}
