//! Channel configuration

use std::time::Duration;

/// Default window before an unconfirmed connect attempt is abandoned
const CONNECTION_TIMEOUT_MS: u64 = 8000;
/// Default fixed delay before re-dialing after an abnormal close
const RECONNECT_DELAY_MS: u64 = 5000;
/// Default application keep-alive interval
const KEEP_ALIVE_INTERVAL_MS: u64 = 30_000;
/// Default window inside which a repeated identical scan code is dropped
const DUPLICATE_SCAN_WINDOW_MS: u64 = 2000;
/// Default window inside which a repeated scanner-status notice of the
/// same polarity is suppressed
const DUPLICATE_NOTICE_WINDOW_MS: u64 = 5000;

/// Addressing and timing for one relay channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Origin the register is served from (e.g. "https://pos.example.com").
    /// The pairing URL, the relay address and the catalog base all derive
    /// from it unless overridden.
    pub origin: String,

    /// Relay origin override, for deployments where the relay is not
    /// co-hosted with the register
    pub relay_origin: Option<String>,

    /// Catalog API base override
    pub catalog_base: Option<String>,

    /// Abort CONNECTING if the socket is not open within this window
    pub connection_timeout: Duration,

    /// Fixed re-dial delay. Not an exponential backoff: the pairing flow
    /// is operator-attended
    pub reconnect_delay: Duration,

    /// `{"type":"ping"}` cadence while the channel is open
    pub keep_alive_interval: Duration,

    /// Dedup window for repeated identical scan codes
    pub duplicate_scan_window: Duration,

    /// Dedup window for repeated scanner-status notices of one polarity
    pub duplicate_notice_window: Duration,
}

impl ChannelConfig {
    /// Create a configuration with the standard timings.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            relay_origin: None,
            catalog_base: None,
            connection_timeout: Duration::from_millis(CONNECTION_TIMEOUT_MS),
            reconnect_delay: Duration::from_millis(RECONNECT_DELAY_MS),
            keep_alive_interval: Duration::from_millis(KEEP_ALIVE_INTERVAL_MS),
            duplicate_scan_window: Duration::from_millis(DUPLICATE_SCAN_WINDOW_MS),
            duplicate_notice_window: Duration::from_millis(DUPLICATE_NOTICE_WINDOW_MS),
        }
    }

    /// Point the relay connection at a different origin.
    pub fn with_relay_origin(mut self, origin: impl Into<String>) -> Self {
        self.relay_origin = Some(origin.into());
        self
    }

    /// Point catalog searches at a different base URL.
    pub fn with_catalog_base(mut self, base: impl Into<String>) -> Self {
        self.catalog_base = Some(base.into());
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    pub fn with_duplicate_scan_window(mut self, window: Duration) -> Self {
        self.duplicate_scan_window = window;
        self
    }

    pub fn with_duplicate_notice_window(mut self, window: Duration) -> Self {
        self.duplicate_notice_window = window;
        self
    }

    /// Origin the relay connection dials.
    pub fn relay_origin(&self) -> &str {
        self.relay_origin.as_deref().unwrap_or(&self.origin)
    }

    /// Base URL for catalog searches.
    pub fn catalog_base(&self) -> &str {
        self.catalog_base.as_deref().unwrap_or(&self.origin)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}
