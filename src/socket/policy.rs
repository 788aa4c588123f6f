// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reconnect timing for the event socket.

use std::time::Duration;

/// Exponential backoff bounds for event socket reconnection.
///
/// The socket gives each connect attempt a window of time. While the hub
/// stays unreachable the window doubles on every expiry, up to the ceiling;
/// a successful connection resets it to the floor.
///
/// # Examples
///
/// ```
/// use platyr_lib::socket::ReconnectPolicy;
/// use std::time::Duration;
///
/// let policy = ReconnectPolicy::default();
/// let mut window = policy.initial_window();
/// assert_eq!(window, Duration::from_millis(1000));
///
/// window = policy.next_window(window);
/// assert_eq!(window, Duration::from_millis(2000));
/// ```
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    floor: Duration,
    ceiling: Duration,
}

impl ReconnectPolicy {
    /// Default initial reconnect window.
    pub const DEFAULT_FLOOR: Duration = Duration::from_millis(1000);
    /// Default maximum reconnect window.
    pub const DEFAULT_CEILING: Duration = Duration::from_millis(30_000);

    /// Creates a policy with the given window bounds.
    ///
    /// A ceiling below the floor is raised to the floor.
    #[must_use]
    pub fn new(floor: Duration, ceiling: Duration) -> Self {
        Self {
            floor,
            ceiling: ceiling.max(floor),
        }
    }

    /// Returns the initial reconnect window.
    #[must_use]
    pub fn floor(&self) -> Duration {
        self.floor
    }

    /// Returns the maximum reconnect window.
    #[must_use]
    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// Returns the window for a fresh connection attempt.
    #[must_use]
    pub fn initial_window(&self) -> Duration {
        self.floor
    }

    /// Returns the window to use after `current` expired without a
    /// successful connection: doubled, capped at the ceiling.
    #[must_use]
    pub fn next_window(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.ceiling)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FLOOR, Self::DEFAULT_CEILING)
    }
}
