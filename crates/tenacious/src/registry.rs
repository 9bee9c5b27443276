//! Registry of live channels.
//!
//! The registry is the single source of truth mapping a [`ChannelKey`] to
//! its supervisor handle. It is an owned instance, constructed at the
//! application's composition root and passed to call sites; there is no
//! process-wide channel state.
//!
//! Opening a key that is already registered closes the old supervisor
//! before constructing the replacement, so switching boards or refreshing
//! a token never leaks a socket: at most one live transport per key at any
//! instant.

use std::sync::Arc;

use dashmap::DashMap;

use crate::channel::{ChannelKey, ChannelParams, Listeners};
use crate::codec::Outbound;
use crate::config::RealtimeConfig;
use crate::origin;
use crate::supervisor::{self, ChannelHandle};
use crate::transport::{Connector, WsConnector};

/// Tracks named logical channels, one supervisor per key.
pub struct ChannelRegistry {
    origin: String,
    config: RealtimeConfig,
    connector: Arc<dyn Connector>,
    channels: DashMap<ChannelKey, ChannelHandle>,
}

impl ChannelRegistry {
    /// Creates a registry using the WebSocket connector.
    pub fn new(config: RealtimeConfig) -> Self {
        Self::with_connector(config, Arc::new(WsConnector::new()))
    }

    /// Creates a registry with a custom connector. Used by tests and by
    /// embeddings that provide their own socket primitive.
    pub fn with_connector(config: RealtimeConfig, connector: Arc<dyn Connector>) -> Self {
        let origin = origin::resolve_origin(&config);
        Self {
            origin,
            config,
            connector,
            channels: DashMap::new(),
        }
    }

    /// Opens (or replaces) the channel for `key`.
    ///
    /// Any existing supervisor for the key is closed first; its transport
    /// teardown completes asynchronously while the fresh supervisor starts
    /// connecting with the new parameters.
    pub fn open(&self, key: ChannelKey, params: ChannelParams, listeners: Listeners) -> ChannelHandle {
        if let Some((_, old)) = self.channels.remove(&key) {
            tracing::debug!(key = %key, "replacing existing channel");
            old.close();
        }

        let handle = supervisor::spawn(
            key.clone(),
            params,
            listeners,
            self.origin.clone(),
            self.connector.clone(),
            &self.config,
        );
        self.channels.insert(key, handle.clone());
        handle
    }

    /// Closes and removes the channel for `key`. No-op if absent.
    pub fn close(&self, key: &ChannelKey) {
        if let Some((_, handle)) = self.channels.remove(key) {
            handle.close();
        }
    }

    /// Closes and removes every registered channel. Used on logout and
    /// application teardown.
    pub fn close_all(&self) {
        let keys: Vec<ChannelKey> = self.channels.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            self.close(&key);
        }
    }

    /// Forwards a payload to the channel for `key`.
    ///
    /// A send to an unregistered key is a silent no-op, matching the
    /// fire-and-forget semantics of ephemeral UI events.
    pub fn send(&self, key: &ChannelKey, payload: impl Into<Outbound>) {
        if let Some(handle) = self.channels.get(key) {
            handle.send(payload);
        }
    }

    /// True iff the channel for `key` exists and its connection is open.
    pub fn is_ready(&self, key: &ChannelKey) -> bool {
        self.channels
            .get(key)
            .map(|handle| handle.is_ready())
            .unwrap_or(false)
    }

    /// Whether a channel is registered for `key`.
    pub fn contains(&self, key: &ChannelKey) -> bool {
        self.channels.contains_key(key)
    }

    /// Number of registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channels are registered.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// The resolved real-time origin this registry connects to.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}
