//! Connection supervision for a single channel.
//!
//! Each channel is owned by one supervisor task that maintains exactly one
//! underlying transport connection, transparently recovering from drops:
//!
//! ```text
//! Closed ──construct──▶ Connecting ──open──▶ Open
//!                          ▲  │                │
//!                          │  └──fail──┐       ├──close()──▶ Closing ──▶ Closed (terminal)
//!                          │           ▼       │
//!                          └──backoff──┴◀──drop┘
//! ```
//!
//! Entry to `Open` resets the backoff, flushes the outbound queue in FIFO
//! order, then invokes the open listener. An unexpected drop notifies the
//! close/error listeners and schedules a reconnect after the current
//! backoff delay. An explicit close is terminal for the supervisor; the
//! registry constructs a fresh one to reconnect.
//!
//! Callers never talk to the task directly; they hold a cheap, cloneable
//! [`ChannelHandle`]. Failures are absorbed here: a send while disconnected
//! queues the payload, a connect failure retries, and nothing propagates to
//! the caller as an error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, watch};

use crate::backoff::Backoff;
use crate::channel::{ChannelKey, ChannelParams, ConnectionState, Listeners};
use crate::codec::{self, Outbound};
use crate::config::RealtimeConfig;
use crate::error::TransportError;
use crate::queue::OutboundQueue;
use crate::transport::{BoxedTransport, Connector};

/// Commands from handles to the supervisor task.
enum Command {
    Send(Outbound),
    Close,
}

/// How a live session ended.
enum SessionEnd {
    /// The caller asked to close; terminal.
    Requested,
    /// The connection dropped (cleanly or with an error); reconnect.
    Dropped(Option<TransportError>),
}

/// Outcome of waiting out a backoff delay.
#[derive(PartialEq)]
enum BackoffOutcome {
    Elapsed,
    CloseRequested,
}

/// Handle to a supervised channel.
///
/// Cloning is cheap; all clones address the same supervisor. Dropping every
/// handle (including the registry's) tears the channel down.
#[derive(Clone)]
pub struct ChannelHandle {
    key: ChannelKey,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    closing: Arc<AtomicBool>,
}

impl ChannelHandle {
    /// The channel's key.
    pub fn key(&self) -> &ChannelKey {
        &self.key
    }

    /// Sends a payload, best-effort.
    ///
    /// Delivered directly when the connection is open, queued for the next
    /// flush otherwise. Never fails from the caller's perspective; a send
    /// into a closed channel is silently discarded.
    pub fn send(&self, payload: impl Into<Outbound>) {
        let _ = self.commands.send(Command::Send(payload.into()));
    }

    /// Requests a close. Idempotent; the channel never reconnects after
    /// this, and the caller-visible state flips to `Closing` immediately.
    pub fn close(&self) {
        if self.closing.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self.commands.send(Command::Close);
    }

    /// The current connection state.
    pub fn state(&self) -> ConnectionState {
        let state = *self.state.borrow();
        if self.closing.load(Ordering::SeqCst)
            && matches!(state, ConnectionState::Connecting | ConnectionState::Open)
        {
            return ConnectionState::Closing;
        }
        state
    }

    /// True iff the connection is open and no close has been requested.
    pub fn is_ready(&self) -> bool {
        self.state().is_open()
    }

    /// Waits for the next state transition and returns the new state.
    ///
    /// Returns `Closed` once the supervisor is gone.
    pub async fn state_changed(&mut self) -> ConnectionState {
        if self.state.changed().await.is_err() {
            return ConnectionState::Closed;
        }
        *self.state.borrow()
    }
}

/// Spawns the supervisor task for a channel and returns its handle.
pub(crate) fn spawn(
    key: ChannelKey,
    params: ChannelParams,
    listeners: Listeners,
    origin: String,
    connector: Arc<dyn Connector>,
    config: &RealtimeConfig,
) -> ChannelHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
    let closing = Arc::new(AtomicBool::new(false));

    let task = SupervisorTask {
        key: key.clone(),
        params,
        origin,
        connector,
        listeners,
        backoff: Backoff::new(config.base_delay, config.max_delay),
        queue: OutboundQueue::with_capacity(config.queue_capacity),
        commands: command_rx,
        state: state_tx,
        closing: closing.clone(),
    };
    tokio::spawn(task.run());

    ChannelHandle {
        key,
        commands: command_tx,
        state: state_rx,
        closing,
    }
}

struct SupervisorTask {
    key: ChannelKey,
    params: ChannelParams,
    origin: String,
    connector: Arc<dyn Connector>,
    listeners: Listeners,
    backoff: Backoff,
    queue: OutboundQueue,
    commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ConnectionState>,
    closing: Arc<AtomicBool>,
}

impl SupervisorTask {
    async fn run(mut self) {
        loop {
            self.set_state(ConnectionState::Connecting);

            match self.connect_once().await {
                Ok(mut transport) => {
                    if self.closing.load(Ordering::SeqCst) {
                        // close() raced the connect; tear the fresh transport
                        // down without ever reporting it open.
                        if let Err(e) = transport.close().await {
                            tracing::debug!(key = %self.key, error = %e, "transport close failed");
                        }
                        self.listeners.notify_close();
                        break;
                    }

                    self.backoff.reset();
                    self.set_state(ConnectionState::Open);
                    self.flush(&mut transport).await;
                    self.listeners.notify_open();
                    tracing::debug!(key = %self.key, "channel open");

                    match self.session(transport).await {
                        SessionEnd::Requested => {
                            // The close listener fires on every live-session
                            // teardown, explicit close included.
                            self.listeners.notify_close();
                            break;
                        }
                        SessionEnd::Dropped(error) => {
                            // Reconnect is scheduled below, so the channel is
                            // back to connecting as far as callers can tell.
                            self.set_state(ConnectionState::Connecting);
                            if let Some(e) = &error {
                                tracing::warn!(key = %self.key, error = %e, "connection lost");
                                self.listeners.notify_error(e);
                            } else {
                                tracing::debug!(key = %self.key, "connection closed by peer");
                            }
                            self.listeners.notify_close();
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "connect failed");
                    self.listeners.notify_error(&e);
                }
            }

            if self.closing.load(Ordering::SeqCst) {
                break;
            }
            if self.wait_backoff().await == BackoffOutcome::CloseRequested {
                break;
            }
        }

        self.set_state(ConnectionState::Closed);
        tracing::debug!(key = %self.key, "channel supervisor stopped");
    }

    /// Builds the connection URL and attempts a single connect. A URL that
    /// fails to build takes the same retry path as a refused connection.
    async fn connect_once(&mut self) -> Result<BoxedTransport, TransportError> {
        let url = self.params.build_url(&self.origin)?;
        self.connector.connect(&url).await
    }

    /// Drains the queue to the transport in FIFO order. A send failure puts
    /// the payload back at the head; the session loop will observe the drop.
    async fn flush(&mut self, transport: &mut BoxedTransport) {
        while let Some(payload) = self.queue.pop() {
            let frame = codec::encode(&payload);
            if let Err(e) = transport.send(frame).await {
                tracing::debug!(key = %self.key, error = %e, "flush interrupted, payload requeued");
                self.queue.requeue_front(payload);
                return;
            }
        }
    }

    /// Serves one live connection until it drops or a close is requested.
    async fn session(&mut self, mut transport: BoxedTransport) -> SessionEnd {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Send(payload)) => {
                        let frame = codec::encode(&payload);
                        if let Err(e) = transport.send(frame).await {
                            tracing::debug!(key = %self.key, error = %e, "send failed, payload queued");
                            self.enqueue(payload);
                        }
                    }
                    Some(Command::Close) | None => {
                        self.set_state(ConnectionState::Closing);
                        if let Err(e) = transport.close().await {
                            tracing::debug!(key = %self.key, error = %e, "transport close failed");
                        }
                        return SessionEnd::Requested;
                    }
                },
                frame = transport.recv() => match frame {
                    Ok(Some(text)) => self.listeners.notify_message(codec::decode(&text)),
                    Ok(None) => return SessionEnd::Dropped(None),
                    Err(e) => return SessionEnd::Dropped(Some(e)),
                },
            }
        }
    }

    /// Waits out the current backoff delay, doubling it for next time.
    /// Sends arriving during the wait are queued; a close ends the wait.
    async fn wait_backoff(&mut self) -> BackoffOutcome {
        let delay = self.backoff.next_delay();
        tracing::debug!(
            key = %self.key,
            delay_ms = delay.as_millis() as u64,
            "reconnect scheduled"
        );

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return BackoffOutcome::Elapsed,
                command = self.commands.recv() => match command {
                    Some(Command::Send(payload)) => self.enqueue(payload),
                    Some(Command::Close) | None => return BackoffOutcome::CloseRequested,
                },
            }
        }
    }

    fn enqueue(&mut self, payload: Outbound) {
        if self.queue.enqueue(payload).is_some() {
            tracing::warn!(
                key = %self.key,
                capacity = self.queue.capacity(),
                "outbound queue full, dropped oldest payload"
            );
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }
}
