//! Caller-facing real-time client for the task board application.
//!
//! The rest of the application (CRUD screens, popups, drag-and-drop lists)
//! consumes real-time updates only through this facade: it opens the board
//! and notification channels, emits board events, and closes everything on
//! navigation or logout. Connection recovery and queuing happen underneath.
//!
//! # Example
//!
//! ```ignore
//! let client = RealtimeClient::from_env();
//!
//! client.open_board_channel(42, &token, |msg| {
//!     // apply the board update
//! });
//!
//! client.send_board_event("card_update", json!({ "id": 7, "pos": 2 }));
//!
//! // On logout:
//! client.close_all();
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::channel::{ChannelKey, ChannelParams, Listeners};
use crate::codec::{self, Inbound};
use crate::config::RealtimeConfig;
use crate::registry::ChannelRegistry;
use crate::supervisor::ChannelHandle;
use crate::transport::Connector;

/// Real-time client owning the channel registry and the resolved origin.
///
/// One instance lives at the application's composition root. Board and
/// notification channels are tracked by key; opening a channel that is
/// already open (same key or a different board) tears the old one down
/// first.
pub struct RealtimeClient {
    registry: ChannelRegistry,
    board_key: Mutex<Option<ChannelKey>>,
}

impl RealtimeClient {
    /// Creates a client from the given configuration.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            registry: ChannelRegistry::new(config),
            board_key: Mutex::new(None),
        }
    }

    /// Creates a client, reading the origin override from the environment.
    pub fn from_env() -> Self {
        Self::new(RealtimeConfig::from_env())
    }

    /// Creates a client with a custom connector.
    pub fn with_connector(config: RealtimeConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            registry: ChannelRegistry::with_connector(config, connector),
            board_key: Mutex::new(None),
        }
    }

    /// Opens the live-update channel for a board.
    ///
    /// Endpoint: `{origin}/ws/boards/{board_id}/?token={token}`. Replaces
    /// any previously open board channel, including one for a different
    /// board, so navigating between boards never leaks a connection.
    pub fn open_board_channel(
        &self,
        board_id: impl fmt::Display,
        token: &str,
        on_message: impl Fn(Inbound) + Send + Sync + 'static,
    ) -> ChannelHandle {
        let key = ChannelKey::board(&board_id);
        let previous = self.board_key.lock().replace(key.clone());
        if let Some(previous) = previous
            && previous != key
        {
            self.registry.close(&previous);
        }

        let params = ChannelParams::new(format!("/ws/boards/{board_id}/")).param("token", token);
        self.registry
            .open(key, params, Listeners::new().on_message(on_message))
    }

    /// Opens the session's notification channel.
    ///
    /// Endpoint: `{origin}/ws/notifications/?token={token}`.
    pub fn open_notification_channel(
        &self,
        token: &str,
        on_message: impl Fn(Inbound) + Send + Sync + 'static,
    ) -> ChannelHandle {
        let params = ChannelParams::new("/ws/notifications/").param("token", token);
        self.registry.open(
            ChannelKey::notifications(),
            params,
            Listeners::new().on_message(on_message),
        )
    }

    /// Closes the board channel, if one is open.
    pub fn close_board_channel(&self) {
        if let Some(key) = self.board_key.lock().take() {
            self.registry.close(&key);
        }
    }

    /// Closes every channel. Used on logout and session teardown.
    pub fn close_all(&self) {
        self.board_key.lock().take();
        self.registry.close_all();
    }

    /// Emits a named event on the board channel, fire-and-forget.
    ///
    /// The payload is wrapped in the `{"type": event, "payload": ...}`
    /// envelope. A no-op when no board channel is open.
    pub fn send_board_event(&self, event: &str, payload: Value) {
        let guard = self.board_key.lock();
        if let Some(key) = guard.as_ref() {
            self.registry.send(key, codec::event(event, payload));
        }
    }

    /// True iff the board channel is open and ready to send.
    pub fn is_board_ready(&self) -> bool {
        let guard = self.board_key.lock();
        guard
            .as_ref()
            .map(|key| self.registry.is_ready(key))
            .unwrap_or(false)
    }

    /// The resolved real-time origin.
    pub fn origin(&self) -> &str {
        self.registry.origin()
    }

    /// The underlying channel registry, for callers that manage their own
    /// channel keys.
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }
}
