// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared connection state for the event socket.

use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether an event socket connection is established.
///
/// The state is shared by every run task a socket spawns. Opening is a
/// compare-and-set: when two connect attempts race, exactly one claims the
/// connection and the other closes its freshly opened socket.
#[derive(Debug, Default)]
pub(crate) struct ConnectionState {
    opened: AtomicBool,
}

impl ConnectionState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claims the open connection slot.
    ///
    /// Returns `false` if another connection already holds it.
    pub(crate) fn try_open(&self) -> bool {
        self.opened
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Releases the open connection slot.
    pub(crate) fn set_closed(&self) {
        self.opened.store(false, Ordering::Release);
    }

    /// Returns `true` while a connection holds the slot.
    pub(crate) fn is_open(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_claim_succeeds() {
        let state = ConnectionState::new();
        assert!(state.try_open());
        assert!(!state.try_open());
        assert!(state.is_open());
    }

    #[test]
    fn closing_releases_the_slot() {
        let state = ConnectionState::new();
        assert!(state.try_open());
        state.set_closed();
        assert!(!state.is_open());
        assert!(state.try_open());
    }
}
