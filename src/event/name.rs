// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event type name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fully qualified name of a hub event class.
///
/// Platypush identifies event types by their dotted Python class path, e.g.
/// `platypush.message.event.music.MusicPlayEvent`. This wrapper provides a
/// distinct type for those names so they cannot be confused with channel
/// names or action names.
///
/// # Examples
///
/// ```
/// use platyr_lib::event::EventName;
///
/// let name = EventName::new("platypush.message.event.music.MusicPlayEvent");
/// assert_eq!(name.short_name(), "MusicPlayEvent");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    /// Creates an event name from a dotted class path.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the full dotted name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment of the dotted name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }

    /// Returns `true` if the name lives under the given dotted prefix.
    ///
    /// The prefix matches on segment boundaries only, so
    /// `...event.music` does not match `...event.musicextra.FooEvent`.
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        match self.0.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Debug for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventName({})", self.0)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
