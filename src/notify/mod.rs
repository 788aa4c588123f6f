// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-facing notifications.
//!
//! This module tracks the ephemeral notifications a client shows for hub
//! activity: action failures, connection changes, assistant events. The
//! [`NotificationSurface`] owns the live set, assigns ids, and dismisses
//! notifications when their time runs out.
//!
//! # Examples
//!
//! ```no_run
//! use platyr_lib::notify::{Notification, NotificationSurface};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let surface = NotificationSurface::new();
//!
//! surface.create(
//!     Notification::new("Could not reach the Hue bridge")
//!         .with_title("Lights")
//!         .as_error()
//!         .with_duration(Duration::from_secs(5)),
//! );
//! # }
//! ```

mod notification;
mod surface;

pub use notification::{ActiveNotification, Notification, NotificationId};
pub use surface::{NotificationChange, NotificationSurface};
