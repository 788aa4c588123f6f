// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Surface tracking live notifications and their dismissal timers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{ActiveNotification, Notification, NotificationId};

/// How long notifications stay up when no duration is given.
const DEFAULT_DURATION: Duration = Duration::from_millis(10_000);

/// Default bound on the number of live notifications.
const DEFAULT_CAPACITY: usize = 256;

/// Capacity of the change broadcast channel.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// A change to the set of live notifications.
#[derive(Debug, Clone)]
pub enum NotificationChange {
    /// A notification was created.
    Created(ActiveNotification),

    /// A notification was dismissed, expired or evicted.
    Dismissed {
        /// Id of the removed notification.
        id: NotificationId,
    },
}

/// Tracks live notifications and dismisses them when their time is up.
///
/// The surface assigns monotonically increasing ids, keeps notifications in
/// creation order, and runs one timer task per non-sticky notification.
/// The set is bounded: past [`capacity`](Self::capacity) live notifications,
/// creating a new one evicts the oldest.
///
/// Observers follow the surface through [`changes`](Self::changes), a
/// broadcast feed of [`NotificationChange`] values.
///
/// # Examples
///
/// ```no_run
/// use platyr_lib::notify::{Notification, NotificationSurface};
///
/// # async fn example() {
/// let surface = NotificationSurface::new();
/// let id = surface.create(Notification::new("Scene activated"));
///
/// assert_eq!(surface.len(), 1);
/// surface.destroy(id);
/// # }
/// ```
#[derive(Clone)]
pub struct NotificationSurface {
    inner: Arc<SurfaceInner>,
}

struct SurfaceInner {
    next_id: AtomicU64,
    capacity: usize,
    active: RwLock<Vec<ActiveNotification>>,
    timers: Mutex<HashMap<NotificationId, JoinHandle<()>>>,
    changes: broadcast::Sender<NotificationChange>,
}

impl NotificationSurface {
    /// Creates a surface with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a surface bounded to `capacity` live notifications.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SurfaceInner {
                next_id: AtomicU64::new(1),
                capacity: capacity.max(1),
                active: RwLock::new(Vec::new()),
                timers: Mutex::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Returns the bound on live notifications.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Creates a notification and schedules its dismissal.
    ///
    /// Without an explicit duration the notification stays up for 10
    /// seconds; a zero duration keeps it up until [`destroy`](Self::destroy).
    /// Returns the assigned id.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, because dismissal timers
    /// run as spawned tasks.
    pub fn create(&self, notification: Notification) -> NotificationId {
        let id = NotificationId::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let duration = notification.duration.unwrap_or(DEFAULT_DURATION);
        let active = ActiveNotification {
            id,
            notification,
            created_at: Utc::now(),
        };

        let evicted = {
            let mut list = self.inner.active.write();
            let evicted = if list.len() >= self.inner.capacity {
                Some(list.remove(0).id)
            } else {
                None
            };
            list.push(active.clone());
            evicted
        };

        if let Some(oldest) = evicted {
            if let Some(handle) = self.inner.timers.lock().remove(&oldest) {
                handle.abort();
            }
            tracing::debug!(id = %oldest, "Evicted oldest notification");
            let _ = self
                .inner
                .changes
                .send(NotificationChange::Dismissed { id: oldest });
        }

        if !duration.is_zero() {
            let surface = self.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                surface.expire(id);
            });
            self.inner.timers.lock().insert(id, handle);
        }

        tracing::debug!(id = %id, duration_ms = duration.as_millis(), "Created notification");
        let _ = self.inner.changes.send(NotificationChange::Created(active));
        id
    }

    /// Dismisses a notification early.
    ///
    /// Aborts its timer if one is pending. Returns `true` if the
    /// notification was live.
    pub fn destroy(&self, id: NotificationId) -> bool {
        if let Some(handle) = self.inner.timers.lock().remove(&id) {
            handle.abort();
        }
        if !self.remove_active(id) {
            return false;
        }
        tracing::debug!(id = %id, "Dismissed notification");
        let _ = self.inner.changes.send(NotificationChange::Dismissed { id });
        true
    }

    /// Removes a notification whose timer fired.
    fn expire(&self, id: NotificationId) {
        self.inner.timers.lock().remove(&id);
        if self.remove_active(id) {
            tracing::debug!(id = %id, "Notification expired");
            let _ = self.inner.changes.send(NotificationChange::Dismissed { id });
        }
    }

    fn remove_active(&self, id: NotificationId) -> bool {
        let mut list = self.inner.active.write();
        let Some(position) = list.iter().position(|active| active.id == id) else {
            return false;
        };
        list.remove(position);
        true
    }

    /// Returns a snapshot of live notifications in creation order.
    #[must_use]
    pub fn active(&self) -> Vec<ActiveNotification> {
        self.inner.active.read().clone()
    }

    /// Returns the number of live notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.active.read().len()
    }

    /// Returns `true` if no notifications are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.active.read().is_empty()
    }

    /// Subscribes to notification changes.
    ///
    /// Returns a receiver observing every creation and dismissal after the
    /// subscription is created.
    #[must_use]
    pub fn changes(&self) -> broadcast::Receiver<NotificationChange> {
        self.inner.changes.subscribe()
    }

    /// Dismisses everything and aborts all pending timers.
    pub fn clear(&self) {
        let mut timers = self.inner.timers.lock();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
        drop(timers);

        let removed: Vec<NotificationId> = {
            let mut list = self.inner.active.write();
            list.drain(..).map(|active| active.id).collect()
        };
        for id in removed {
            let _ = self.inner.changes.send(NotificationChange::Dismissed { id });
        }
    }
}

impl Default for NotificationSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NotificationSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSurface")
            .field("active_count", &self.len())
            .field("capacity", &self.inner.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let surface = NotificationSurface::new();
        let id1 = surface.create(Notification::new("first"));
        let id2 = surface.create(Notification::new("second"));
        assert!(id2.value() > id1.value());
    }

    #[tokio::test]
    async fn active_keeps_creation_order() {
        let surface = NotificationSurface::new();
        surface.create(Notification::new("first"));
        surface.create(Notification::new("second"));

        let texts: Vec<String> = surface
            .active()
            .into_iter()
            .map(|active| active.notification.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn destroy_removes_notification() {
        let surface = NotificationSurface::new();
        let id = surface.create(Notification::new("bye"));

        assert!(surface.destroy(id));
        assert!(surface.is_empty());
        assert!(!surface.destroy(id));
    }

    #[tokio::test(start_paused = true)]
    async fn notification_expires_after_its_duration() {
        let surface = NotificationSurface::new();
        surface.create(Notification::new("short").with_duration(Duration::from_secs(5)));
        assert_eq!(surface.len(), 1);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(surface.len(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(surface.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn default_duration_is_ten_seconds() {
        let surface = NotificationSurface::new();
        surface.create(Notification::new("default"));

        tokio::time::sleep(Duration::from_millis(9_900)).await;
        assert_eq!(surface.len(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(surface.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sticky_notification_never_expires() {
        let surface = NotificationSurface::new();
        surface.create(Notification::new("pinned").sticky());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(surface.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn destroy_cancels_the_timer() {
        let surface = NotificationSurface::new();
        let mut changes = surface.changes();
        let id = surface.create(Notification::new("gone early").with_duration(Duration::from_secs(5)));

        assert!(surface.destroy(id));
        tokio::time::sleep(Duration::from_secs(10)).await;

        // One Created and exactly one Dismissed, not a second one from the timer.
        assert!(matches!(
            changes.try_recv(),
            Ok(NotificationChange::Created(_))
        ));
        assert!(matches!(
            changes.try_recv(),
            Ok(NotificationChange::Dismissed { .. })
        ));
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_first() {
        let surface = NotificationSurface::with_capacity(2);
        let first = surface.create(Notification::new("first").sticky());
        surface.create(Notification::new("second").sticky());
        surface.create(Notification::new("third").sticky());

        let texts: Vec<String> = surface
            .active()
            .into_iter()
            .map(|active| active.notification.text)
            .collect();
        assert_eq!(texts, vec!["second", "third"]);
        assert!(!surface.destroy(first));
    }

    #[tokio::test]
    async fn change_feed_reports_create_and_dismiss() {
        let surface = NotificationSurface::new();
        let mut changes = surface.changes();

        let id = surface.create(Notification::new("observable"));
        surface.destroy(id);

        let Ok(NotificationChange::Created(active)) = changes.try_recv() else {
            panic!("expected Created change");
        };
        assert_eq!(active.id, id);
        assert_eq!(active.notification.text, "observable");

        let Ok(NotificationChange::Dismissed { id: dismissed }) = changes.try_recv() else {
            panic!("expected Dismissed change");
        };
        assert_eq!(dismissed, id);
    }

    #[tokio::test]
    async fn clear_empties_the_surface() {
        let surface = NotificationSurface::new();
        surface.create(Notification::new("a").sticky());
        surface.create(Notification::new("b"));

        surface.clear();
        assert!(surface.is_empty());
    }

    #[tokio::test]
    async fn zero_capacity_behaves_as_one() {
        let surface = NotificationSurface::with_capacity(0);
        assert_eq!(surface.capacity(), 1);

        surface.create(Notification::new("only").sticky());
        surface.create(Notification::new("replacement").sticky());
        assert_eq!(surface.len(), 1);
        assert_eq!(surface.active()[0].notification.text, "replacement");
    }
}
