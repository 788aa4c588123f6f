// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known entity state, persisted between runs.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;

use super::Entity;

/// Soft cache of the entities the hub has reported.
///
/// Entities are keyed by id and overwritten on update; nothing is ever
/// evicted. With a backing file the cache loads the previous run's snapshot
/// at construction and can write the current one back, so entity panels have
/// state to show before the first event arrives.
///
/// Load failures are not errors: a missing or unreadable file produces an
/// empty cache and a log line.
///
/// # Examples
///
/// ```no_run
/// use platyr_lib::entity::{Entity, EntityCache};
///
/// let cache = EntityCache::with_path("/var/lib/platyr/entities.json");
/// cache.upsert(Entity::new("light:1", "Desk Lamp", "light"));
/// cache.save().unwrap();
/// ```
#[derive(Clone)]
pub struct EntityCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entities: RwLock<HashMap<String, Entity>>,
    path: Option<PathBuf>,
    dirty: AtomicBool,
}

impl EntityCache {
    /// Default period between autosave snapshots.
    pub const AUTOSAVE_PERIOD: Duration = Duration::from_secs(10);

    /// Creates an in-memory cache with no backing file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entities: RwLock::new(HashMap::new()),
                path: None,
                dirty: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a cache backed by a JSON file, loading its current contents.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entities = load_from(&path);
        Self {
            inner: Arc::new(CacheInner {
                entities: RwLock::new(entities),
                path: Some(path),
                dirty: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Inserts or overwrites an entity by id.
    pub fn upsert(&self, entity: Entity) {
        self.inner
            .entities
            .write()
            .insert(entity.id.clone(), entity);
        self.inner.dirty.store(true, Ordering::Relaxed);
    }

    /// Removes an entity by id, returning it if it was cached.
    pub fn remove(&self, id: &str) -> Option<Entity> {
        let removed = self.inner.entities.write().remove(id);
        if removed.is_some() {
            self.inner.dirty.store(true, Ordering::Relaxed);
        }
        removed
    }

    /// Returns an entity by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Entity> {
        self.inner.entities.read().get(id).cloned()
    }

    /// Returns all cached entities, ordered by id.
    #[must_use]
    pub fn all(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = self.inner.entities.read().values().cloned().collect();
        entities.sort_by(|a, b| a.id.cmp(&b.id));
        entities
    }

    /// Returns the number of cached entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entities.read().len()
    }

    /// Returns `true` if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entities.read().is_empty()
    }

    /// Writes the full entity set to the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache has no backing file or the write fails.
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = &self.inner.path else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "entity cache has no backing file",
            ));
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&self.all())?;
        fs::write(path, contents)?;
        self.inner.dirty.store(false, Ordering::Relaxed);

        tracing::debug!(path = %path.display(), "Saved entity cache");
        Ok(())
    }

    /// Saves only when the cache changed since the last save.
    ///
    /// Returns `true` if a snapshot was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_if_dirty(&self) -> io::Result<bool> {
        if !self.inner.dirty.load(Ordering::Relaxed) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Spawns a task that snapshots the cache to disk every `period`.
    ///
    /// The task only writes when entities changed since the last snapshot.
    /// Abort the returned handle to stop it.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn_autosave(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            loop {
                ticks.tick().await;
                if let Err(error) = cache.save_if_dirty() {
                    tracing::error!(%error, "Entity cache autosave failed");
                }
            }
        })
    }
}

fn load_from(path: &Path) -> HashMap<String, Entity> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No entity cache file, starting empty");
        return HashMap::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) => {
            tracing::error!(%error, path = %path.display(), "Failed to read entity cache");
            return HashMap::new();
        }
    };

    match serde_json::from_str::<Vec<Entity>>(&contents) {
        Ok(entities) => {
            tracing::info!(
                path = %path.display(),
                count = entities.len(),
                "Loaded entity cache"
            );
            entities
                .into_iter()
                .map(|entity| (entity.id.clone(), entity))
                .collect()
        }
        Err(error) => {
            tracing::error!(%error, path = %path.display(), "Failed to parse entity cache");
            HashMap::new()
        }
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("entity_count", &self.len())
            .field("path", &self.inner.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_overwrites_by_id() {
        let cache = EntityCache::new();
        cache.upsert(Entity::new("light:1", "Old Name", "light"));
        cache.upsert(Entity::new("light:1", "New Name", "light"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("light:1").unwrap().name, "New Name");
    }

    #[test]
    fn remove_returns_the_entity() {
        let cache = EntityCache::new();
        cache.upsert(Entity::new("switch:2", "Fan", "switch"));

        let removed = cache.remove("switch:2").unwrap();
        assert_eq!(removed.name, "Fan");
        assert!(cache.is_empty());
        assert!(cache.remove("switch:2").is_none());
    }

    #[test]
    fn all_is_ordered_by_id() {
        let cache = EntityCache::new();
        cache.upsert(Entity::new("b", "Second", "light"));
        cache.upsert(Entity::new("a", "First", "light"));

        let ids: Vec<String> = cache.all().into_iter().map(|entity| entity.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");

        let cache = EntityCache::with_path(&path);
        cache.upsert(Entity::new("light:1", "Desk Lamp", "light"));
        cache.upsert(Entity::new("sensor:3", "Thermometer", "sensor"));
        cache.save().unwrap();

        let reloaded = EntityCache::with_path(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("light:1").unwrap().name, "Desk Lamp");
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EntityCache::with_path(dir.path().join("nope.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");
        fs::write(&path, "{definitely not json").unwrap();

        let cache = EntityCache::with_path(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn save_without_path_is_an_error() {
        let cache = EntityCache::new();
        assert!(cache.save().is_err());
    }

    #[test]
    fn save_if_dirty_skips_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EntityCache::with_path(dir.path().join("entities.json"));

        cache.upsert(Entity::new("light:1", "Lamp", "light"));
        assert!(cache.save_if_dirty().unwrap());
        assert!(!cache.save_if_dirty().unwrap());

        cache.remove("light:1");
        assert!(cache.save_if_dirty().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn autosave_writes_within_one_period() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");

        let cache = EntityCache::with_path(&path);
        let autosave = cache.spawn_autosave(EntityCache::AUTOSAVE_PERIOD);

        cache.upsert(Entity::new("light:1", "Lamp", "light"));
        tokio::time::sleep(Duration::from_millis(10_100)).await;
        autosave.abort();

        let reloaded = EntityCache::with_path(&path);
        assert_eq!(reloaded.len(), 1);
    }
}
