// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry that routes hub events to subscribed handlers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{Event, EventName};

use super::{EventHandler, HandlerName};

/// Registry mapping event classes to handlers.
///
/// Handlers subscribe to a list of event classes, or to every event when the
/// list is empty (a wildcard subscription). Each registration is keyed by a
/// unique [`HandlerName`]; registering an existing name replaces the old
/// registration entirely.
///
/// # Thread Safety
///
/// The registry is fully thread-safe. Dispatch snapshots the matching
/// handlers before invoking them, so a handler may subscribe or unsubscribe
/// from within its own invocation without deadlocking.
pub struct HandlerRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    /// Handlers per event class, in registration order.
    exact: HashMap<EventName, Vec<(HandlerName, EventHandler)>>,
    /// Handlers receiving every event, in registration order.
    wildcard: Vec<(HandlerName, EventHandler)>,
    /// Event classes each handler name is bound to; an empty list marks a
    /// wildcard binding.
    bindings: HashMap<HandlerName, Vec<EventName>>,
}

impl RegistryInner {
    fn remove(&mut self, name: &HandlerName) -> bool {
        let Some(events) = self.bindings.remove(name) else {
            return false;
        };
        if events.is_empty() {
            self.wildcard.retain(|(bound, _)| bound != name);
        } else {
            for event in &events {
                if let Some(handlers) = self.exact.get_mut(event) {
                    handlers.retain(|(bound, _)| bound != name);
                    if handlers.is_empty() {
                        self.exact.remove(event);
                    }
                }
            }
        }
        true
    }
}

impl HandlerRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Subscribes a handler to the given event classes.
    ///
    /// An empty `events` list subscribes the handler to every event. The
    /// returned generated name identifies the registration for
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<I, F>(&self, events: I, handler: F) -> HandlerName
    where
        I: IntoIterator<Item = EventName>,
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribe_named(HandlerName::generate(), events, handler)
    }

    /// Subscribes a handler under a caller-chosen name.
    ///
    /// If a registration with the same name exists, it is removed first: its
    /// callback is never invoked again, for any event class it was bound to.
    pub fn subscribe_named<I, F>(&self, name: HandlerName, events: I, handler: F) -> HandlerName
    where
        I: IntoIterator<Item = EventName>,
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(handler);
        let mut bound = Vec::new();
        for event in events {
            if !bound.contains(&event) {
                bound.push(event);
            }
        }

        let mut inner = self.inner.write();
        if inner.remove(&name) {
            tracing::debug!(handler = %name, "Replacing existing handler registration");
        }
        if bound.is_empty() {
            inner.wildcard.push((name.clone(), handler));
        } else {
            for event in &bound {
                inner
                    .exact
                    .entry(event.clone())
                    .or_default()
                    .push((name.clone(), handler.clone()));
            }
        }
        inner.bindings.insert(name.clone(), bound);
        name
    }

    /// Unsubscribes a registration by name.
    ///
    /// Returns `true` if a registration was found and removed.
    pub fn unsubscribe(&self, name: &HandlerName) -> bool {
        let removed = self.inner.write().remove(name);
        if removed {
            tracing::debug!(handler = %name, "Unsubscribed handler");
        }
        removed
    }

    /// Removes all registrations.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.exact.clear();
        inner.wildcard.clear();
        inner.bindings.clear();
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches an event to every matching handler.
    ///
    /// Handlers bound to the event's class run first, then wildcard handlers,
    /// each group in registration order and each handler exactly once.
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &Event) -> usize {
        let targets: Vec<EventHandler> = {
            let inner = self.inner.read();
            let exact = inner.exact.get(event.name()).into_iter().flatten();
            exact
                .chain(inner.wildcard.iter())
                .map(|(_, handler)| handler.clone())
                .collect()
        };

        for handler in &targets {
            handler(event);
        }
        targets.len()
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the number of registrations.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.read().bindings.len()
    }

    /// Returns `true` if there are no registrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handler_count() == 0
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("HandlerRegistry")
            .field("handler_count", &inner.bindings.len())
            .field("wildcard_count", &inner.wildcard.len())
            .finish()
    }
}
