// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `PlatyR` Lib - A Rust client library for Platypush hubs.
//!
//! This library connects to a [Platypush](https://platypush.tech) hub,
//! keeps its WebSocket event stream alive, runs actions over HTTP and
//! carries the client-side plumbing around both: an in-process event
//! relay, a notification surface with auto-dismissal and a persistent
//! entity cache.
//!
//! # Supported Features
//!
//! - **Event stream**: `/ws/events` subscription with automatic
//!   reconnection under doubling watchdog windows
//! - **Event handlers**: name-keyed registrations per event class, with
//!   wildcard subscriptions
//! - **Actions**: `POST /execute` request envelopes with typed failure
//!   and auth-redirect handling
//! - **Notifications**: auto-dismissing toasts fed from the relay or
//!   raised directly
//! - **Entities**: last-known device state, cached in memory and
//!   optionally autosaved to disk every 10 seconds
//!
//! # Quick Start
//!
//! ```no_run
//! use platyr_lib::notify::Notification;
//! use platyr_lib::{ClientConfig, Hub};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> platyr_lib::Result<()> {
//!     let config = ClientConfig::new("hub.local").with_token("secret");
//!     let hub = Hub::new(config)?;
//!
//!     // Open the event stream.
//!     hub.connect();
//!
//!     // React to events from the hub.
//!     hub.subscribe(
//!         ["platypush.message.event.music.MusicPlayEvent".into()],
//!         |event| println!("music started: {}", event.name()),
//!     );
//!
//!     // Run an action and raise a notification.
//!     hub.execute("lights.hue.on", json!({"groups": ["Living Room"]}))
//!         .await?;
//!     hub.notify(Notification::new("Lights are on").with_title("Hue"));
//!
//!     hub.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `http` (default): the `/execute` action client, via `reqwest`
//! - `ws` (default): the WebSocket event stream, via `tokio-tungstenite`
//!
//! The relay, registry, notification surface and entity cache are always
//! available; a client built without `ws` can still dispatch events fed
//! from elsewhere through the [`subscription::HandlerRegistry`].

#[cfg(feature = "http")]
pub mod api;
mod config;
pub mod entity;
pub mod error;
pub mod event;
mod hub;
pub mod notify;
pub mod relay;
pub mod session;
#[cfg(feature = "ws")]
pub mod socket;
pub mod subscription;

#[cfg(feature = "http")]
pub use api::{ExecuteClient, login_redirect};
pub use config::ClientConfig;
pub use entity::{Entity, EntityCache};
pub use error::{ApiError, AuthError, ConfigError, Error, ParseError, ProtocolError, Result};
pub use event::{Event, EventKind, EventName, Track};
pub use hub::Hub;
pub use notify::{Notification, NotificationSurface};
pub use relay::EventRelay;
pub use session::Session;
#[cfg(feature = "ws")]
pub use socket::{EventSocket, ReconnectPolicy};
pub use subscription::{HandlerName, HandlerRegistry};
