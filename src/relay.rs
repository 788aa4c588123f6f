// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process event relay between client components.
//!
//! The relay is a synchronous publish/subscribe mediator with string-named
//! channels. Components talk through it instead of holding references to
//! each other: the socket publishes entity updates, the notification surface
//! listens for notification requests, widgets signal each other.
//!
//! Delivery is immediate and in registration order; there is no replay, so a
//! listener only sees payloads emitted after it registered.
//!
//! # Examples
//!
//! ```
//! use platyr_lib::relay::EventRelay;
//! use serde_json::json;
//!
//! let relay = EventRelay::new();
//!
//! let id = relay.on("dropdown-open", |payload| {
//!     println!("dropdown requested: {payload}");
//! });
//!
//! let delivered = relay.emit("dropdown-open", &json!({"menu": "settings"}));
//! assert_eq!(delivered, 1);
//!
//! relay.off("dropdown-open", id);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use crate::entity::Entity;
use crate::notify::Notification;

/// Channel carrying notification requests to the notification surface.
pub const NOTIFICATION_CREATE: &str = "notification-create";

/// Channel carrying entity state changes to entity observers.
pub const ENTITY_UPDATE: &str = "entity-update";

/// Channel signalling that a dropdown menu should open.
pub const DROPDOWN_OPEN: &str = "dropdown-open";

/// Unique identifier for a relay listener.
///
/// Returned by [`EventRelay::on`] and used to remove the listener later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

type ChannelListener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Synchronous publish/subscribe bus with string-named channels.
///
/// # Thread Safety
///
/// The relay is fully thread-safe. [`emit`](Self::emit) snapshots a
/// channel's listeners before invoking them, so listeners may register or
/// remove listeners from within a delivery without deadlocking.
pub struct EventRelay {
    next_id: AtomicU64,
    channels: RwLock<HashMap<String, Vec<(ListenerId, ChannelListener)>>>,
}

impl EventRelay {
    /// Creates a new relay with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    // =========================================================================
    // Raw channels
    // =========================================================================

    /// Registers a listener on a channel.
    ///
    /// The listener runs synchronously for every payload emitted on the
    /// channel from now on.
    pub fn on<F>(&self, channel: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = ListenerId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.channels
            .write()
            .entry(channel.into())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener from a channel.
    ///
    /// Returns `true` if the listener was registered there.
    pub fn off(&self, channel: &str, id: ListenerId) -> bool {
        let mut channels = self.channels.write();
        let Some(listeners) = channels.get_mut(channel) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        let removed = listeners.len() < before;
        if listeners.is_empty() {
            channels.remove(channel);
        }
        removed
    }

    /// Emits a payload on a channel.
    ///
    /// Listeners run synchronously in registration order. Returns the number
    /// of listeners invoked; a channel nobody listens on delivers to zero.
    pub fn emit(&self, channel: &str, payload: &Value) -> usize {
        let targets: Vec<ChannelListener> = {
            let channels = self.channels.read();
            match channels.get(channel) {
                Some(listeners) => listeners
                    .iter()
                    .map(|(_, listener)| listener.clone())
                    .collect(),
                None => Vec::new(),
            }
        };

        for listener in &targets {
            listener(payload);
        }
        targets.len()
    }

    /// Removes every listener on every channel.
    pub fn clear(&self) {
        self.channels.write().clear();
    }

    /// Returns the total number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.channels.read().values().map(|c| c.len()).sum()
    }

    // =========================================================================
    // Well-known channels
    // =========================================================================

    /// Publishes a notification request on [`NOTIFICATION_CREATE`].
    pub fn publish_notification(&self, notification: &Notification) -> usize {
        match serde_json::to_value(notification) {
            Ok(payload) => self.emit(NOTIFICATION_CREATE, &payload),
            Err(error) => {
                tracing::error!(%error, "Failed to serialize notification for the relay");
                0
            }
        }
    }

    /// Listens for notification requests on [`NOTIFICATION_CREATE`].
    ///
    /// Payloads that do not decode as a [`Notification`] are logged at warn
    /// level and skipped.
    pub fn on_notification<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        self.on(NOTIFICATION_CREATE, move |payload| {
            match serde_json::from_value(payload.clone()) {
                Ok(notification) => listener(notification),
                Err(error) => {
                    tracing::warn!(%error, "Undecodable payload on the notification channel");
                }
            }
        })
    }

    /// Publishes an entity state change on [`ENTITY_UPDATE`].
    pub fn publish_entity(&self, entity: &Entity) -> usize {
        match serde_json::to_value(entity) {
            Ok(payload) => self.emit(ENTITY_UPDATE, &payload),
            Err(error) => {
                tracing::error!(%error, "Failed to serialize entity for the relay");
                0
            }
        }
    }

    /// Listens for entity state changes on [`ENTITY_UPDATE`].
    ///
    /// Payloads that do not decode as an [`Entity`] are logged at warn level
    /// and skipped.
    pub fn on_entity<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(Entity) + Send + Sync + 'static,
    {
        self.on(ENTITY_UPDATE, move |payload| {
            match serde_json::from_value(payload.clone()) {
                Ok(entity) => listener(entity),
                Err(error) => {
                    tracing::warn!(%error, "Undecodable payload on the entity channel");
                }
            }
        })
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = self.channels.read();
        f.debug_struct("EventRelay")
            .field("channel_count", &channels.len())
            .field(
                "listener_count",
                &channels.values().map(|c| c.len()).sum::<usize>(),
            )
            .finish()
    }
}
