// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handler naming for event subscriptions.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::event::Event;

/// Callback invoked with every event a subscription matches.
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Unique name of an event handler registration.
///
/// Handler names key the registry: registering a second handler under an
/// existing name replaces the first one's bindings. Components that manage
/// their own lifecycle pass a stable name so re-registration stays
/// idempotent; one-off subscribers let the registry generate a name.
///
/// # Examples
///
/// ```
/// use platyr_lib::subscription::HandlerName;
///
/// let named = HandlerName::new("music-widget");
/// let generated = HandlerName::generate();
/// assert_ne!(named, generated);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HandlerName(String);

impl HandlerName {
    /// Creates a handler name from a caller-chosen string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Generates a unique handler name.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the name as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HandlerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerName({})", self.0)
    }
}

impl fmt::Display for HandlerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HandlerName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for HandlerName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
