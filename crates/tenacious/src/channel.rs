//! Channel identity, connection parameters, and listener registration.
//!
//! A channel is a named real-time endpoint: one board's live updates, or
//! the session's notification stream. Callers identify channels by a
//! [`ChannelKey`], describe how to reach them with [`ChannelParams`], and
//! observe them through [`Listeners`] callbacks. The callback model mirrors
//! how the rest of the application consumes real-time events; no listener
//! for a given channel ever runs concurrently with another, since all of a
//! channel's callbacks fire from its own supervisor task.

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::codec::Inbound;
use crate::error::TransportError;

/// Stable identifier for a logical channel, e.g. `board:42` or
/// `notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelKey(String);

impl ChannelKey {
    /// Creates a key from an arbitrary identifier.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key for a board's update channel.
    pub fn board(board_id: impl fmt::Display) -> Self {
        Self(format!("board:{board_id}"))
    }

    /// The key for the session's notification channel.
    pub fn notifications() -> Self {
        Self("notifications".to_string())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Connection parameters for a channel: the endpoint path and the query
/// parameters appended to it.
#[derive(Debug, Clone)]
pub struct ChannelParams {
    path: String,
    query: Vec<(String, String)>,
}

impl ChannelParams {
    /// Creates parameters for the given endpoint path, e.g. `/ws/boards/42/`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter. Values are percent-encoded when the URL
    /// is built.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// The endpoint path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Builds the full connection URL against the given origin.
    pub fn build_url(&self, origin: &str) -> Result<Url, TransportError> {
        let mut url = Url::parse(&format!("{}{}", origin, self.path))?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// State of a channel's underlying connection.
///
/// Exactly one state is live per channel at any instant. `Closed` is
/// terminal only after an explicit close; an unexpectedly dropped
/// connection re-enters `Connecting` on the next scheduled attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A connection attempt is in flight or scheduled.
    Connecting,
    /// The transport is open; sends go out directly.
    Open,
    /// An explicit close was requested; no reconnect will follow.
    Closing,
    /// The supervisor has stopped.
    Closed,
}

impl ConnectionState {
    /// Whether the transport is open.
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

type MessageFn = Arc<dyn Fn(Inbound) + Send + Sync>;
type EventFn = Arc<dyn Fn() + Send + Sync>;
type ErrorFn = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// Callbacks observing a channel's lifecycle.
///
/// All callbacks are optional and best-effort: they are invoked from the
/// channel's supervisor task and must not block for long.
///
/// # Example
///
/// ```ignore
/// let listeners = Listeners::new()
///     .on_message(|msg| println!("got {msg:?}"))
///     .on_close(|| println!("dropped, reconnecting"));
/// ```
#[derive(Clone, Default)]
pub struct Listeners {
    on_message: Option<MessageFn>,
    on_open: Option<EventFn>,
    on_close: Option<EventFn>,
    on_error: Option<ErrorFn>,
}

impl Listeners {
    /// Creates an empty listener set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the inbound message callback.
    pub fn on_message(mut self, f: impl Fn(Inbound) + Send + Sync + 'static) -> Self {
        self.on_message = Some(Arc::new(f));
        self
    }

    /// Registers the connection-open callback.
    pub fn on_open(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_open = Some(Arc::new(f));
        self
    }

    /// Registers the connection-closed callback.
    pub fn on_close(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(f));
        self
    }

    /// Registers the transport-error callback.
    pub fn on_error(mut self, f: impl Fn(&TransportError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub(crate) fn notify_message(&self, message: Inbound) {
        if let Some(f) = &self.on_message {
            f(message);
        }
    }

    pub(crate) fn notify_open(&self) {
        if let Some(f) = &self.on_open {
            f();
        }
    }

    pub(crate) fn notify_close(&self) {
        if let Some(f) = &self.on_close {
            f();
        }
    }

    pub(crate) fn notify_error(&self, error: &TransportError) {
        if let Some(f) = &self.on_error {
            f(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_key_format() {
        assert_eq!(ChannelKey::board(42).as_str(), "board:42");
        assert_eq!(ChannelKey::notifications().as_str(), "notifications");
        assert_eq!(ChannelKey::board(42), ChannelKey::new("board:42"));
    }

    #[test]
    fn test_build_url_appends_encoded_params() {
        let params = ChannelParams::new("/ws/boards/42/").param("token", "ab/cd=ef");
        let url = params.build_url("ws://127.0.0.1:8000").unwrap();

        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.path(), "/ws/boards/42/");
        assert_eq!(url.query(), Some("token=ab%2Fcd%3Def"));
    }

    #[test]
    fn test_build_url_without_params_has_no_query() {
        let params = ChannelParams::new("/ws/notifications/");
        let url = params.build_url("wss://rt.example.com").unwrap();

        assert_eq!(url.as_str(), "wss://rt.example.com/ws/notifications/");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_build_url_rejects_bad_origin() {
        let params = ChannelParams::new("/ws/notifications/");
        assert!(params.build_url("not-an-origin").is_err());
    }

    #[test]
    fn test_listeners_forward_when_registered() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let opens = Arc::new(AtomicUsize::new(0));
        let opens_clone = opens.clone();
        let listeners = Listeners::new().on_open(move || {
            opens_clone.fetch_add(1, Ordering::SeqCst);
        });

        listeners.notify_open();
        listeners.notify_open();
        // Unregistered callbacks are a no-op.
        listeners.notify_close();

        assert_eq!(opens.load(Ordering::SeqCst), 2);
    }
}
