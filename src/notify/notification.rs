// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notification records.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a displayed notification.
///
/// Ids are assigned by the surface in creation order and can be used to
/// dismiss a notification early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(u64);

impl NotificationId {
    /// Creates a notification ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Notification({})", self.0)
    }
}

/// A notification to display to the user.
///
/// Notifications travel over the relay's `notification-create` channel and
/// end up on the [`NotificationSurface`](super::NotificationSurface), which
/// assigns ids and dismissal timers.
///
/// # Duration
///
/// When [`duration`](Self::duration) is `None` the surface applies its
/// default (10 seconds). An explicit zero duration makes the notification
/// sticky: it stays until dismissed.
///
/// # Examples
///
/// ```
/// use platyr_lib::notify::Notification;
/// use std::time::Duration;
///
/// let info = Notification::new("Playback started")
///     .with_title("Music");
///
/// let alert = Notification::new("Hub connection lost")
///     .as_error()
///     .sticky();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Optional notification title.
    #[serde(default)]
    pub title: Option<String>,

    /// Notification body text.
    pub text: String,

    /// Marks an error notification.
    #[serde(default)]
    pub error: bool,

    /// Marks a warning notification.
    #[serde(default)]
    pub warning: bool,

    /// How long the notification stays up, in milliseconds. `None` applies
    /// the surface default; zero disables auto-dismissal.
    #[serde(
        rename = "duration",
        default,
        with = "duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,
}

impl Notification {
    /// Creates a plain notification with the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            title: None,
            text: text.into(),
            error: false,
            warning: false,
            duration: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Marks this notification as an error.
    #[must_use]
    pub fn as_error(mut self) -> Self {
        self.error = true;
        self
    }

    /// Marks this notification as a warning.
    #[must_use]
    pub fn as_warning(mut self) -> Self {
        self.warning = true;
        self
    }

    /// Sets how long the notification stays up.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Keeps the notification up until it is dismissed.
    #[must_use]
    pub fn sticky(mut self) -> Self {
        self.duration = Some(Duration::ZERO);
        self
    }
}

/// A notification with surface-assigned identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveNotification {
    /// Surface-assigned id.
    pub id: NotificationId,

    /// The notification content.
    #[serde(flatten)]
    pub notification: Notification,

    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => {
                serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
