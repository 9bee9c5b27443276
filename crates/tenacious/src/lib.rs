//! # Tenacious - Resilient Real-Time Channels
//!
//! Tenacious maintains the task board application's persistent push
//! connections: board update streams and the session notification stream.
//! It multiplexes independently-keyed channels and recovers dropped
//! connections with exponential backoff. Messages sent while a connection
//! is down are buffered until it comes back, so the rest of the
//! application can treat real-time delivery as fire-and-forget.
//!
//! # Architecture
//!
//! - **[`RealtimeClient`]**: caller-facing facade (open board channel,
//!   emit events, close on logout)
//! - **[`ChannelRegistry`]**: key to supervisor mapping, at most one live
//!   transport per key
//! - **Connection supervisor**: per-channel task owning the
//!   connect/recover lifecycle and the outbound queue
//! - **[`Transport`](transport::Transport)**: pluggable socket primitive;
//!   WebSocket in production, scripted mocks in tests
//!
//! # Quick Start
//!
//! ```ignore
//! use tenacious::prelude::*;
//!
//! let client = RealtimeClient::from_env();
//!
//! client.open_board_channel(42, &token, |msg| match msg {
//!     Inbound::Json(update) => apply_update(update),
//!     Inbound::Text(raw) => tracing::debug!(%raw, "non-json frame"),
//! });
//!
//! client.send_board_event("card_update", serde_json::json!({ "id": 7 }));
//! ```
//!
//! Failures never reach callers as errors: a send while disconnected is
//! queued, a dropped connection reconnects on its own, and a non-JSON
//! inbound frame is delivered as raw text rather than dropped.

#![deny(warnings)]
#![deny(missing_docs)]

/// Exponential backoff policy for reconnect scheduling.
pub mod backoff;

/// Channel identity, parameters, state, and listeners.
pub mod channel;

/// Caller-facing facade for the task board application.
pub mod client;

/// Wire codec: JSON-or-raw-text inbound, text-or-structured outbound.
pub mod codec;

/// Client configuration and environment override.
pub mod config;

/// Transport error taxonomy.
pub mod error;

/// Real-time origin resolution.
pub mod origin;

/// FIFO buffer for sends while disconnected.
pub mod queue;

/// Key to supervisor registry.
pub mod registry;

/// Per-channel connection supervision.
pub mod supervisor;

/// Pluggable transport traits and the WebSocket implementation.
pub mod transport;

pub use channel::{ChannelKey, ChannelParams, ConnectionState, Listeners};
pub use client::RealtimeClient;
pub use codec::{Inbound, Outbound};
pub use config::RealtimeConfig;
pub use error::TransportError;
pub use registry::ChannelRegistry;
pub use supervisor::ChannelHandle;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```ignore
/// use tenacious::prelude::*;
/// ```
pub mod prelude {
    pub use crate::channel::{ChannelKey, ChannelParams, ConnectionState, Listeners};
    pub use crate::client::RealtimeClient;
    pub use crate::codec::{Inbound, Outbound};
    pub use crate::config::RealtimeConfig;
    pub use crate::error::TransportError;
    pub use crate::registry::ChannelRegistry;
    pub use crate::supervisor::ChannelHandle;
}
