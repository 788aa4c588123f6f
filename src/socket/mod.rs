// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebSocket event stream with automatic reconnection.
//!
//! [`EventSocket`] holds a single connection to the hub's `/ws/events`
//! endpoint and feeds every inbound event through a shared
//! [`HandlerRegistry`](crate::subscription::HandlerRegistry). Connection
//! attempts run under doubling watchdog windows described by
//! [`ReconnectPolicy`].

mod event_socket;
mod policy;
mod state;

pub use event_socket::EventSocket;
pub use policy::ReconnectPolicy;
