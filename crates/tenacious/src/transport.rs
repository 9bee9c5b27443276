//! Pluggable transport for channel connections.
//!
//! The connection supervisor drives connections through the [`Connector`]
//! and [`Transport`] traits so that tests (and future protocols) can swap
//! the socket primitive out. The production implementation,
//! [`WsConnector`], speaks WebSocket via `tokio-tungstenite`.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::error::TransportError;

/// A live connection carrying text frames.
#[async_trait]
pub trait Transport: Send {
    /// Receives the next inbound frame.
    ///
    /// Returns `Ok(Some(text))` for a data frame, `Ok(None)` when the peer
    /// closed the connection cleanly, and `Err` when the connection
    /// dropped.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;

    /// Sends a text frame.
    async fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Closes the connection gracefully.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// A type-erased transport, as handed to the supervisor.
pub type BoxedTransport = Box<dyn Transport>;

/// Creates one transport per connection attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establishes a new connection to `url`.
    async fn connect(&self, url: &Url) -> Result<BoxedTransport, TransportError>;
}

/// The production WebSocket connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Creates a WebSocket connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<BoxedTransport, TransportError> {
        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;
        Ok(Box::new(WsTransport { stream }))
    }
}

/// WebSocket transport over a (possibly TLS) TCP stream.
struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_string())),
                Some(Ok(Message::Binary(_))) => {
                    // The board protocol is text-only.
                    tracing::debug!("ignoring binary frame");
                }
                // tungstenite replies to pings on flush; nothing to do here.
                Some(Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Err(e)) => return Err(TransportError::ConnectionLost(e.to_string())),
            }
        }
    }

    async fn send(&mut self, frame: String) -> Result<(), TransportError> {
        self.stream
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::ConnectionLost(e.to_string()))
    }
}
