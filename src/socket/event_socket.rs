// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Self-healing WebSocket connection to the hub's event stream.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{WebSocketStream, connect_async};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::event::parse_frame;
use crate::subscription::HandlerRegistry;

use super::policy::ReconnectPolicy;
use super::state::ConnectionState;

/// Reconnecting client for the hub's `/ws/events` stream.
///
/// The socket owns at most one live WebSocket connection. Inbound frames
/// parse into events and dispatch synchronously through the shared
/// [`HandlerRegistry`]; the channel is receive-only apart from transport
/// control frames.
///
/// # Reconnection
///
/// Every connect attempt runs under a watchdog window, starting at the
/// configured floor (1 second by default). While the hub stays unreachable
/// the window doubles per expiry up to the ceiling (30 seconds by default).
/// A successful connection resets the window, and a connection that drops
/// after being established reconnects immediately.
///
/// Racing connect attempts resolve through a compare-and-set on the shared
/// connection state: the first to open wins, the other closes its socket
/// and its task ends.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use platyr_lib::socket::EventSocket;
/// use platyr_lib::subscription::HandlerRegistry;
/// use platyr_lib::ClientConfig;
///
/// # fn example() -> platyr_lib::Result<()> {
/// let registry = Arc::new(HandlerRegistry::new());
/// let socket = EventSocket::new(&ClientConfig::new("hub.local"), registry)?;
///
/// let task = socket.connect();
/// // ... receive events ...
/// socket.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EventSocket {
    url: String,
    policy: ReconnectPolicy,
    registry: Arc<HandlerRegistry>,
    state: Arc<ConnectionState>,
    shutdown: watch::Sender<bool>,
}

impl EventSocket {
    /// Creates an event socket for the configured hub.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::error::ConfigError) if the
    /// configuration does not form a valid events URL. Configuration
    /// problems surface here once; they are never retried.
    pub fn new(config: &ClientConfig, registry: Arc<HandlerRegistry>) -> Result<Self> {
        config.validate()?;
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            url: config.events_url(),
            policy: ReconnectPolicy::new(config.reconnect_floor(), config.reconnect_ceiling()),
            registry,
            state: Arc::new(ConnectionState::new()),
            shutdown,
        })
    }

    /// Returns the events URL this socket connects to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `true` while a connection to the hub is established.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Starts the connection task.
    ///
    /// The task keeps a connection to the hub alive until
    /// [`close`](Self::close) is called or the socket is dropped. The
    /// returned handle can be awaited to observe the task ending; aborting
    /// it skips the closing handshake, so prefer `close`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn connect(&self) -> JoinHandle<()> {
        let url = self.url.clone();
        let policy = self.policy.clone();
        let registry = self.registry.clone();
        let state = self.state.clone();
        let shutdown = self.shutdown.subscribe();
        tokio::spawn(run(url, policy, registry, state, shutdown))
    }

    /// Closes the connection and ends every connection task.
    ///
    /// The socket stays closed afterwards; create a new socket to
    /// reconnect.
    pub fn close(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// How a pump loop over an established connection ended.
enum PumpEnd {
    /// Shutdown was requested; the run task must end.
    Shutdown,
    /// The connection dropped; the run task should reconnect.
    ConnectionLost,
}

async fn run(
    url: String,
    policy: ReconnectPolicy,
    registry: Arc<HandlerRegistry>,
    state: Arc<ConnectionState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut window = policy.initial_window();

    loop {
        if *shutdown.borrow() {
            return;
        }

        let deadline = Instant::now() + window;
        tracing::debug!(
            url = %url,
            window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            "Connecting to event socket"
        );

        tokio::select! {
            result = connect_async(url.as_str()) => match result {
                Ok((stream, _response)) => {
                    if !state.try_open() {
                        tracing::info!(
                            "Another events connection is already open, closing the new one"
                        );
                        close_quietly(stream).await;
                        return;
                    }
                    tracing::info!(url = %url, "Event socket connected");
                    window = policy.initial_window();

                    let outcome = pump(stream, &registry, &mut shutdown).await;
                    state.set_closed();
                    match outcome {
                        PumpEnd::Shutdown => return,
                        PumpEnd::ConnectionLost => {
                            tracing::info!("Event socket disconnected, reconnecting");
                        }
                    }
                }
                Err(error) => {
                    if matches!(error, WsError::Url(_)) {
                        tracing::error!(%error, url = %url, "Invalid events URL, giving up");
                        return;
                    }
                    tracing::warn!(%error, "Event socket connection failed");
                    tokio::select! {
                        () = tokio::time::sleep_until(deadline) => {}
                        _ = shutdown.changed() => return,
                    }
                    window = policy.next_window(window);
                }
            },
            () = tokio::time::sleep_until(deadline) => {
                tracing::warn!(
                    window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
                    "Event socket connection timed out, retrying"
                );
                window = policy.next_window(window);
            }
            _ = shutdown.changed() => return,
        }
    }
}

async fn pump<S>(
    mut stream: WebSocketStream<S>,
    registry: &HandlerRegistry,
    shutdown: &mut watch::Receiver<bool>,
) -> PumpEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            message = stream.next() => match message {
                Some(Ok(Message::Text(text))) => dispatch_frame(text.as_str(), registry),
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => dispatch_frame(text, registry),
                    Err(_) => tracing::warn!("Dropping non UTF-8 binary frame"),
                },
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(error) = stream.send(Message::Pong(payload)).await {
                        tracing::warn!(%error, "Failed to answer ping");
                        return PumpEnd::ConnectionLost;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    match frame {
                        Some(frame) => tracing::info!(
                            code = ?frame.code,
                            reason = %frame.reason,
                            "Event socket closed by the hub"
                        ),
                        None => tracing::info!("Event socket closed by the hub"),
                    }
                    return PumpEnd::ConnectionLost;
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    tracing::warn!(%error, "Event socket error");
                    return PumpEnd::ConnectionLost;
                }
                None => return PumpEnd::ConnectionLost,
            },
            _ = shutdown.changed() => {
                let _ = stream.close(None).await;
                return PumpEnd::Shutdown;
            }
        }
    }
}

fn dispatch_frame(text: &str, registry: &HandlerRegistry) {
    match parse_frame(text) {
        Ok(Some(event)) => {
            let handlers = registry.dispatch(&event);
            tracing::debug!(event = %event.name(), handlers, "Dispatched event");
        }
        Ok(None) => tracing::trace!("Ignoring non-event message"),
        Err(error) => tracing::warn!(%error, "Dropping malformed frame"),
    }
}

async fn close_quietly<S>(mut stream: WebSocketStream<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(error) = stream.close(None).await {
        tracing::debug!(%error, "Error while closing redundant connection");
    }
}
