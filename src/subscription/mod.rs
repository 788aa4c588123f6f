// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for hub events.
//!
//! This module routes events arriving over the hub's WebSocket stream to
//! registered callbacks. Handlers subscribe to specific event classes by
//! their dotted names, or to every event with an empty class list.
//!
//! # Overview
//!
//! - [`HandlerName`] - Unique registration key; re-registering a name
//!   replaces the previous registration
//! - [`HandlerRegistry`] - Stores registrations and dispatches events
//! - [`EventHandler`] - The callback type handlers are stored as
//!
//! # Usage
//!
//! ```
//! use platyr_lib::event::EventName;
//! use platyr_lib::subscription::HandlerRegistry;
//!
//! let registry = HandlerRegistry::new();
//!
//! // Subscribe to one event class
//! let name = registry.subscribe(
//!     [EventName::new("platypush.message.event.music.MusicPlayEvent")],
//!     |event| println!("{} fired", event.name().short_name()),
//! );
//!
//! // Later, unsubscribe
//! registry.unsubscribe(&name);
//! ```

mod registration;
mod registry;

pub use registration::{EventHandler, HandlerName};
pub use registry::HandlerRegistry;
