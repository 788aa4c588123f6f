// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity records and the last-known-state cache.
//!
//! Entities are the hub's uniform model for plugin-backed state: lights,
//! switches, sensors. This module keeps the client-side view of them: the
//! [`Entity`] record as reported in entity events, and the [`EntityCache`]
//! remembering the last known state of each entity between runs.
//!
//! # Examples
//!
//! ```
//! use platyr_lib::entity::{Entity, EntityCache};
//!
//! let cache = EntityCache::new();
//! cache.upsert(Entity::new("light:1", "Desk Lamp", "light"));
//!
//! assert_eq!(cache.get("light:1").unwrap().display_name(), "Desk Lamp");
//! ```

mod cache;
mod record;

pub use cache::EntityCache;
pub use record::Entity;
