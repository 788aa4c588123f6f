// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the event socket against a loopback WebSocket server.

#![cfg(feature = "ws")]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use platyr_lib::socket::EventSocket;
use platyr_lib::subscription::HandlerRegistry;
use platyr_lib::{ClientConfig, event};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::Message;

/// Builds an event frame for the given event class.
fn event_frame(event_class: &str) -> String {
    json!({"type": "event", "args": {"type": event_class}}).to_string()
}

fn config_for(address: SocketAddr) -> ClientConfig {
    ClientConfig::new(address.ip().to_string()).with_port(address.port())
}

/// Spawns a server that sends every connected client the given frames, then
/// holds the connection open.
async fn spawn_event_server(frames: Vec<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let frames = frames.clone();
            tokio::spawn(async move {
                let mut server = accept_async(stream).await.unwrap();
                for frame in frames {
                    if server.send(Message::text(frame)).await.is_err() {
                        return;
                    }
                }
                while let Some(message) = server.next().await {
                    if message.is_err() {
                        return;
                    }
                }
            });
        }
    });

    address
}

/// Polls `condition` until it holds or five seconds pass.
async fn eventually(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..250 {
        if condition() {
            return;
        }
        sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for: {what}");
}

// ============================================================================
// Event Dispatch Tests
// ============================================================================

mod dispatch {
    use super::*;

    #[tokio::test]
    async fn delivers_events_and_skips_everything_else() {
        let address = spawn_event_server(vec![
            event_frame(event::MUSIC_PLAY),
            // Not an event, silently ignored.
            json!({"type": "response", "response": {"output": null}}).to_string(),
            // Malformed, dropped without killing the connection.
            "not json at all".to_owned(),
            event_frame(event::SPEECH_RECOGNIZED),
        ])
        .await;

        let registry = Arc::new(HandlerRegistry::new());
        let music = Arc::new(AtomicU32::new(0));
        let any = Arc::new(AtomicU32::new(0));
        {
            let music = Arc::clone(&music);
            registry.subscribe([event::MUSIC_PLAY.into()], move |_| {
                music.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let any = Arc::clone(&any);
            registry.subscribe([], move |_| {
                any.fetch_add(1, Ordering::SeqCst);
            });
        }

        let socket = EventSocket::new(&config_for(address), Arc::clone(&registry)).unwrap();
        let task = socket.connect();

        eventually("both events to arrive", || any.load(Ordering::SeqCst) >= 2).await;
        assert_eq!(music.load(Ordering::SeqCst), 1);
        assert_eq!(any.load(Ordering::SeqCst), 2);
        assert!(socket.is_open());

        socket.close();
        task.await.unwrap();
        assert!(!socket.is_open());
    }
}

// ============================================================================
// Reconnection Tests
// ============================================================================

mod reconnection {
    use super::*;

    #[tokio::test]
    async fn reconnects_after_the_server_drops_the_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            // First connection gets one event and is dropped.
            let (stream, _) = listener.accept().await.unwrap();
            let mut server = accept_async(stream).await.unwrap();
            server
                .send(Message::text(event_frame(event::MUSIC_PLAY)))
                .await
                .unwrap();
            drop(server);

            // The client comes back on its own and gets another.
            let (stream, _) = listener.accept().await.unwrap();
            let mut server = accept_async(stream).await.unwrap();
            server
                .send(Message::text(event_frame(event::MUSIC_STOP)))
                .await
                .unwrap();
            while server.next().await.is_some() {}
        });

        let registry = Arc::new(HandlerRegistry::new());
        let seen = Arc::new(AtomicU32::new(0));
        {
            let seen = Arc::clone(&seen);
            registry.subscribe([], move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        let socket = EventSocket::new(&config_for(address), registry).unwrap();
        let task = socket.connect();

        eventually("the event after reconnection", || {
            seen.load(Ordering::SeqCst) >= 2
        })
        .await;
        assert!(socket.is_open());

        socket.close();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn backoff_resets_to_the_floor_after_a_successful_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut stalled = Vec::new();

            // The first two attempts stall before the handshake, escalating
            // the client's window from 100 ms to 400 ms.
            for _ in 0..2 {
                let (stream, _) = listener.accept().await.unwrap();
                stalled.push(stream);
            }

            // The third attempt succeeds, delivers one event and is dropped.
            let (stream, _) = listener.accept().await.unwrap();
            let mut server = accept_async(stream).await.unwrap();
            server
                .send(Message::text(event_frame(event::MUSIC_PLAY)))
                .await
                .unwrap();
            drop(server);

            // The reconnect attempt stalls again; only a reset window
            // retries it after the floor.
            let (stream, _) = listener.accept().await.unwrap();
            stalled.push(stream);

            let (stream, _) = listener.accept().await.unwrap();
            let mut server = accept_async(stream).await.unwrap();
            server
                .send(Message::text(event_frame(event::MUSIC_STOP)))
                .await
                .unwrap();
            while server.next().await.is_some() {}
        });

        let registry = Arc::new(HandlerRegistry::new());
        let seen = Arc::new(AtomicU32::new(0));
        {
            let seen = Arc::clone(&seen);
            registry.subscribe([], move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        let config = config_for(address).with_reconnect_floor(Duration::from_millis(100));
        let socket = EventSocket::new(&config, registry).unwrap();
        let task = socket.connect();

        eventually("the first event to arrive", || {
            seen.load(Ordering::SeqCst) >= 1
        })
        .await;

        // Without the reset the stalled retry would sit out an escalated
        // 400 ms window; with it the next event lands after roughly the
        // 100 ms floor plus a handshake.
        let reconnect_started = std::time::Instant::now();
        eventually("the event after the stalled reconnect", || {
            seen.load(Ordering::SeqCst) >= 2
        })
        .await;
        let took = reconnect_started.elapsed();
        assert!(
            took < Duration::from_millis(350),
            "reconnect took {took:?}, the window did not reset to the floor"
        );

        socket.close();
        task.await.unwrap();
    }
}

// ============================================================================
// Duplicate Connection Tests
// ============================================================================

mod duplicates {
    use super::*;

    #[tokio::test]
    async fn racing_connections_resolve_to_exactly_one() {
        let address = spawn_event_server(vec![event_frame(event::MUSIC_PLAY)]).await;

        let registry = Arc::new(HandlerRegistry::new());
        let seen = Arc::new(AtomicU32::new(0));
        {
            let seen = Arc::clone(&seen);
            registry.subscribe([], move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        let socket = EventSocket::new(&config_for(address), registry).unwrap();
        let first = socket.connect();
        let second = socket.connect();

        eventually("the winning connection to deliver", || {
            seen.load(Ordering::SeqCst) >= 1
        })
        .await;

        // The losing task closes its socket without dispatching anything.
        sleep(Duration::from_millis(300)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(socket.is_open());

        socket.close();
        first.await.unwrap();
        second.await.unwrap();
    }
}
