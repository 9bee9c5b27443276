//! Configuration for the real-time client.

use std::time::Duration;

use crate::backoff::{DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY};
use crate::queue::DEFAULT_QUEUE_CAPACITY;

/// Environment variable overriding the real-time origin.
///
/// Consulted once, at [`RealtimeConfig::from_env`].
pub const ORIGIN_ENV_VAR: &str = "BOARD_WS_ORIGIN";

/// Configuration for channel connections.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Explicit real-time origin, e.g. `wss://boards.example.com`.
    /// Takes precedence over everything else; trailing slashes are stripped
    /// at resolution time.
    pub origin_override: Option<String>,

    /// The HTTP origin the application is served from, if known.
    /// Used to derive the real-time origin (`https` maps to `wss`).
    pub http_origin: Option<String>,

    /// Starting delay between reconnect attempts.
    pub base_delay: Duration,

    /// Ceiling for the reconnect delay.
    pub max_delay: Duration,

    /// Bound on payloads queued while disconnected.
    pub queue_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            origin_override: None,
            http_origin: None,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl RealtimeConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration, reading the origin override from the
    /// [`ORIGIN_ENV_VAR`] environment variable. An unset or empty variable
    /// leaves the override unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(origin) = std::env::var(ORIGIN_ENV_VAR)
            && !origin.is_empty()
        {
            config.origin_override = Some(origin);
        }
        config
    }

    /// Sets the explicit real-time origin.
    pub fn origin_override(mut self, origin: impl Into<String>) -> Self {
        self.origin_override = Some(origin.into());
        self
    }

    /// Sets the HTTP origin to derive the real-time origin from.
    pub fn http_origin(mut self, origin: impl Into<String>) -> Self {
        self.http_origin = Some(origin.into());
        self
    }

    /// Sets the starting reconnect delay.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the reconnect delay ceiling.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the outbound queue bound.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}
