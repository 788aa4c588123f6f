// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hub client wiring every component together.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::entity::EntityCache;
use crate::error::Result;
use crate::event::{self, Event, EventKind, EventName};
use crate::notify::{Notification, NotificationSurface};
use crate::relay::EventRelay;
use crate::subscription::{HandlerName, HandlerRegistry};

#[cfg(feature = "http")]
use crate::api::ExecuteClient;
#[cfg(feature = "http")]
use crate::error::Error;
#[cfg(feature = "ws")]
use crate::socket::EventSocket;

/// Client for a single Platypush hub.
///
/// The `Hub` owns the event socket, the handler registry, the in-process
/// relay, the notification surface and the entity cache, and wires them
/// together:
///
/// - entity events from the socket update the cache and fan out on the
///   relay's `entity-update` channel
/// - notifications published on the relay's `notification-create` channel
///   land on the surface, which assigns ids and dismissal timers
/// - failed actions raise an error notification and still return the
///   error, so call sites keep their own rollback policy
///
/// # Examples
///
/// ```no_run
/// use platyr_lib::notify::Notification;
/// use platyr_lib::{ClientConfig, Hub};
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> platyr_lib::Result<()> {
///     let hub = Hub::new(ClientConfig::new("hub.local").with_token("secret"))?;
///     hub.connect();
///
///     // React to events from the hub.
///     hub.subscribe(
///         ["platypush.message.event.music.MusicPlayEvent".into()],
///         |event| println!("music started: {}", event.name()),
///     );
///
///     // Run an action.
///     let status = hub.execute("music.mpd.play", json!({})).await?;
///     println!("{status}");
///
///     hub.notify(Notification::new("Playback started").with_title("Music"));
///
///     hub.shutdown().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Hub {
    config: ClientConfig,
    relay: Arc<EventRelay>,
    registry: Arc<HandlerRegistry>,
    surface: NotificationSurface,
    entities: EntityCache,
    #[cfg(feature = "http")]
    api: ExecuteClient,
    #[cfg(feature = "ws")]
    socket: EventSocket,
    #[cfg(feature = "ws")]
    socket_task: Mutex<Option<JoinHandle<()>>>,
    autosave_task: Mutex<Option<JoinHandle<()>>>,
}

impl Hub {
    /// Creates a hub client and wires its components together.
    ///
    /// Nothing connects yet; call [`connect`](Self::connect) to open the
    /// event stream. When the configuration names a cache path, the last
    /// saved entity snapshot is loaded here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::error::ConfigError) if the
    /// configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let relay = Arc::new(EventRelay::new());
        let registry = Arc::new(HandlerRegistry::new());
        let surface = NotificationSurface::new();
        let entities = match config.cache_path() {
            Some(path) => EntityCache::with_path(path),
            None => EntityCache::new(),
        };

        wire_notifications(&relay, &surface);
        wire_entity_events(&registry, &relay, &entities);

        Ok(Self {
            #[cfg(feature = "http")]
            api: ExecuteClient::new(&config)?,
            #[cfg(feature = "ws")]
            socket: EventSocket::new(&config, Arc::clone(&registry))?,
            #[cfg(feature = "ws")]
            socket_task: Mutex::new(None),
            autosave_task: Mutex::new(None),
            config,
            relay,
            registry,
            surface,
            entities,
        })
    }

    /// Returns the configuration this hub was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // =========================================================================
    // Event stream
    // =========================================================================

    /// Opens the event stream and starts the background tasks.
    ///
    /// Starts the socket's connection task (with the `ws` feature) and,
    /// when a cache path is configured, the entity autosave task. Calling
    /// `connect` while the tasks are running does nothing.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn connect(&self) {
        #[cfg(feature = "ws")]
        {
            let mut task = self.socket_task.lock();
            if task.as_ref().is_some_and(|task| !task.is_finished()) {
                tracing::debug!("Event socket task already running");
            } else {
                *task = Some(self.socket.connect());
            }
        }

        self.start_autosave();
    }

    /// Returns `true` while the event stream is connected.
    #[cfg(feature = "ws")]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.socket.is_open()
    }

    /// Subscribes a handler to the given event classes.
    ///
    /// An empty event list subscribes to every event. Handlers run on the
    /// socket task, synchronously and in registration order; see
    /// [`HandlerRegistry::subscribe`].
    pub fn subscribe<I, F>(&self, events: I, handler: F) -> HandlerName
    where
        I: IntoIterator<Item = EventName>,
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.registry.subscribe(events, handler)
    }

    /// Subscribes a handler under a caller-chosen name, replacing any
    /// previous registration with that name.
    pub fn subscribe_named<I, F>(&self, name: HandlerName, events: I, handler: F) -> HandlerName
    where
        I: IntoIterator<Item = EventName>,
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.registry.subscribe_named(name, events, handler)
    }

    /// Removes a handler registration.
    ///
    /// Returns `true` if the name was registered.
    pub fn unsubscribe(&self, name: &HandlerName) -> bool {
        self.registry.unsubscribe(name)
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Runs an action on the hub.
    ///
    /// On failure an error notification is raised on the relay before the
    /// error returns to the caller. Authentication failures skip the
    /// notification; recovery for those is a navigation concern (see
    /// [`login_redirect`](crate::api::login_redirect)).
    ///
    /// # Errors
    ///
    /// See [`ExecuteClient::execute`].
    #[cfg(feature = "http")]
    pub async fn execute(&self, action: &str, args: serde_json::Value) -> Result<serde_json::Value> {
        match self.api.execute(action, args).await {
            Ok(output) => Ok(output),
            Err(error) => {
                self.notify_failure(action, &error);
                Err(error)
            }
        }
    }

    /// Runs an action with a per-call timeout.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    #[cfg(feature = "http")]
    pub async fn execute_with_timeout(
        &self,
        action: &str,
        args: serde_json::Value,
        timeout: std::time::Duration,
    ) -> Result<serde_json::Value> {
        match self.api.execute_with_timeout(action, args, timeout).await {
            Ok(output) => Ok(output),
            Err(error) => {
                self.notify_failure(action, &error);
                Err(error)
            }
        }
    }

    #[cfg(feature = "http")]
    fn notify_failure(&self, action: &str, error: &Error) {
        if matches!(error, Error::Auth(_)) {
            return;
        }
        self.notify(
            Notification::new(error.to_string())
                .with_title(action)
                .as_error(),
        );
    }

    // =========================================================================
    // Notifications and components
    // =========================================================================

    /// Publishes a notification on the relay's `notification-create`
    /// channel.
    ///
    /// The surface picks it up and assigns the id and dismissal timer; use
    /// [`notifications`](Self::notifications) directly when the id is
    /// needed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, as dismissal timers are
    /// spawned tasks.
    pub fn notify(&self, notification: Notification) {
        let _ = self.relay.publish_notification(&notification);
    }

    /// Returns the in-process relay.
    #[must_use]
    pub fn relay(&self) -> &EventRelay {
        &self.relay
    }

    /// Returns the notification surface.
    #[must_use]
    pub fn notifications(&self) -> &NotificationSurface {
        &self.surface
    }

    /// Returns the entity cache.
    #[must_use]
    pub fn entities(&self) -> &EntityCache {
        &self.entities
    }

    /// Returns the action execution client.
    #[cfg(feature = "http")]
    #[must_use]
    pub fn api(&self) -> &ExecuteClient {
        &self.api
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Shuts the hub down.
    ///
    /// Closes the event stream and waits for the closing handshake, stops
    /// the autosave task, saves the entity cache if needed, and drops every
    /// notification, handler and relay listener. The hub is inert
    /// afterwards; build a new one to reconnect.
    pub async fn shutdown(&self) {
        #[cfg(feature = "ws")]
        {
            self.socket.close();
            let task = self.socket_task.lock().take();
            if let Some(task) = task {
                let _ = task.await;
            }
        }

        let autosave = self.autosave_task.lock().take();
        if let Some(task) = autosave {
            task.abort();
        }
        if self.config.cache_path().is_some()
            && let Err(error) = self.entities.save_if_dirty()
        {
            tracing::warn!(%error, "Failed to save the entity cache on shutdown");
        }

        self.surface.clear();
        self.registry.clear();
        self.relay.clear();
        tracing::info!("Hub client shut down");
    }

    fn start_autosave(&self) {
        if self.config.cache_path().is_none() {
            return;
        }
        let mut task = self.autosave_task.lock();
        if task.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }
        *task = Some(self.entities.spawn_autosave(EntityCache::AUTOSAVE_PERIOD));
    }
}

/// Routes `notification-create` payloads onto the surface.
fn wire_notifications(relay: &Arc<EventRelay>, surface: &NotificationSurface) {
    let surface = surface.clone();
    relay.on_notification(move |notification| {
        surface.create(notification);
    });
}

/// Routes entity events into the cache and onto the relay.
fn wire_entity_events(
    registry: &Arc<HandlerRegistry>,
    relay: &Arc<EventRelay>,
    entities: &EntityCache,
) {
    let relay = Arc::clone(relay);
    let entities = entities.clone();
    registry.subscribe(
        [
            EventName::from(event::ENTITY_UPDATE),
            EventName::from(event::ENTITY_DELETE),
        ],
        move |event| match event.kind() {
            EventKind::EntityUpdate { entity } => {
                entities.upsert(entity.clone());
                relay.publish_entity(entity);
            }
            EventKind::EntityDelete { entity } => {
                entities.remove(&entity.id);
            }
            _ => {}
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::parse_frame;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn hub() -> Hub {
        Hub::new(ClientConfig::new("hub.local")).unwrap()
    }

    fn entity_frame(event_class: &str, id: &str) -> String {
        json!({
            "type": "event",
            "args": {
                "type": event_class,
                "entity": {"id": id, "name": "Kitchen", "type": "light"}
            }
        })
        .to_string()
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(Hub::new(ClientConfig::new("")).is_err());
    }

    #[tokio::test]
    async fn notify_reaches_the_surface() {
        let hub = hub();
        hub.notify(Notification::new("saved").with_title("Config"));

        let active = hub.notifications().active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].notification.text, "saved");
    }

    #[tokio::test]
    async fn entity_updates_flow_into_cache_and_relay() {
        let hub = hub();
        let seen = Arc::new(AtomicU32::new(0));
        {
            let seen = Arc::clone(&seen);
            hub.relay().on_entity(move |entity| {
                assert_eq!(entity.id, "light.kitchen");
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        let frame = entity_frame(event::ENTITY_UPDATE, "light.kitchen");
        let event = parse_frame(&frame).unwrap().unwrap();
        hub.registry.dispatch(&event);

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(hub.entities().get("light.kitchen").is_some());
    }

    #[tokio::test]
    async fn entity_deletes_drop_cache_entries() {
        let hub = hub();

        let update = parse_frame(&entity_frame(event::ENTITY_UPDATE, "light.kitchen"))
            .unwrap()
            .unwrap();
        hub.registry.dispatch(&update);
        assert_eq!(hub.entities().len(), 1);

        let delete = parse_frame(&entity_frame(event::ENTITY_DELETE, "light.kitchen"))
            .unwrap()
            .unwrap();
        hub.registry.dispatch(&delete);
        assert!(hub.entities().is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_stops_a_handler() {
        let hub = hub();
        let calls = Arc::new(AtomicU32::new(0));
        let name = {
            let calls = Arc::clone(&calls);
            hub.subscribe([], move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        let event = parse_frame(&entity_frame(event::ENTITY_UPDATE, "light.kitchen"))
            .unwrap()
            .unwrap();
        hub.registry.dispatch(&event);
        assert!(hub.unsubscribe(&name));
        hub.registry.dispatch(&event);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_starts_the_entity_autosave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");

        // Nothing listens on port 1; the autosave must run regardless of
        // how the socket fares.
        let config = ClientConfig::new("127.0.0.1")
            .with_port(1)
            .with_cache_path(&path);
        let hub = Hub::new(config).unwrap();
        hub.connect();

        let event = parse_frame(&entity_frame(event::ENTITY_UPDATE, "light.kitchen"))
            .unwrap()
            .unwrap();
        hub.registry.dispatch(&event);

        tokio::time::sleep(std::time::Duration::from_millis(10_100)).await;
        assert!(path.exists(), "autosave never wrote the cache file");

        hub.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_clears_everything() {
        let hub = hub();
        hub.notify(Notification::new("pending"));
        hub.subscribe([], |_| {});
        assert!(!hub.notifications().is_empty());

        hub.shutdown().await;

        assert!(hub.notifications().is_empty());
        assert!(hub.registry.is_empty());
        assert_eq!(hub.relay().listener_count(), 0);
    }
}
