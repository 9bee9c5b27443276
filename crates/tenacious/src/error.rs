//! Error types for transport operations.

use thiserror::Error;

/// Errors that can occur on the underlying transport.
///
/// None of these propagate to callers as hard failures. The connection
/// supervisor absorbs every variant and turns it into a reconnect with
/// backoff (or a queued payload, for send failures); listeners receive a
/// reference for observability only.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection URL could not be built from origin, path, and params.
    #[error("invalid connection url: {0}")]
    InvalidUrl(String),

    /// Establishing the connection failed.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// The connection dropped mid-session.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// A frame could not be written to the transport.
    #[error("send failed: {0}")]
    SendFailed(String),
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidUrl(err.to_string())
    }
}
