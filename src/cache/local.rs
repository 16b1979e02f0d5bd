//! Local Store Module
//!
//! In-process cache engine combining HashMap storage with LRU tracking, TTL
//! expiration and an entry/cost budget, shared behind an async mutex.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::cache::{CacheBackend, CacheEntry, CacheStats, LruTracker};
use crate::config::{BackendKind, LocalStoreConfig};
use crate::error::{ConfigError, StoreError, StoreResult};
use crate::tasks::spawn_cleanup_task;

// == Local Engine ==
/// Single-threaded cache engine; [`LocalStore`] wraps it for shared use.
#[derive(Debug)]
pub(crate) struct LocalEngine {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Maximum total cost allowed
    max_cost: u64,
    /// Maximum entries evicted per eviction pass
    eviction_batch: usize,
    /// Sum of the cost of all entries
    cost: u64,
}

impl LocalEngine {
    /// Builds an engine from budgets already checked by
    /// [`LocalStoreConfig::validate`].
    pub(crate) fn new(config: &LocalStoreConfig) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: config.max_entries,
            max_cost: config.max_cost,
            eviction_batch: config.eviction_batch,
            cost: 0,
        }
    }

    // == Set ==
    /// Stores a value, replacing any previous entry and resetting its TTL.
    ///
    /// Evicts least recently used entries until the new entry fits in both
    /// budgets. A value costing more than the whole budget is rejected.
    pub(crate) fn set(
        &mut self,
        key: String,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> StoreResult<()> {
        let entry = CacheEntry::new(value, ttl);
        let cost = entry.cost();

        if cost > self.max_cost {
            return Err(StoreError::CacheFull(format!(
                "value of {} bytes exceeds cost budget of {} bytes",
                cost, self.max_cost
            )));
        }

        // Overwrite releases the old entry's budget first
        self.remove_entry(&key);

        while self.entries.len() >= self.max_entries || self.cost + cost > self.max_cost {
            if self.evict_batch(cost) == 0 {
                return Err(StoreError::CacheFull(
                    "cache is full and eviction failed".to_string(),
                ));
            }
        }

        self.cost += cost;
        self.lru.touch(&key);
        self.entries.insert(key, entry);
        Ok(())
    }

    // == Get ==
    /// Returns a copy of the value if present and not expired.
    ///
    /// Expired entries are removed and counted as misses.
    pub(crate) fn get(&mut self, key: &str) -> StoreResult<Vec<u8>> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return Err(StoreError::NotFound(key.to_string()));
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return Err(StoreError::Expired(key.to_string()));
        }

        self.stats.record_hit();
        self.lru.touch(key);
        Ok(self.entries[key].value.clone())
    }

    // == Delete ==
    /// Removes an entry, returning whether one was present.
    pub(crate) fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub(crate) fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired_keys.len());
        expired_keys.len()
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            total_cost: self.cost,
            ..self.stats.clone()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Evicts up to one batch of LRU entries, stopping early once an entry
    /// of `incoming_cost` fits. Returns the number of evicted entries.
    fn evict_batch(&mut self, incoming_cost: u64) -> usize {
        let mut evicted = 0;
        while evicted < self.eviction_batch
            && (self.entries.len() >= self.max_entries || self.cost + incoming_cost > self.max_cost)
        {
            let Some(key) = self.lru.evict_oldest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.cost -= entry.cost();
                self.stats.record_eviction();
                evicted += 1;
                trace!(key = %key, "evicted entry");
            }
        }

        if evicted > 0 {
            debug!(
                evicted,
                entries = self.entries.len(),
                cost = self.cost,
                "local store eviction pass"
            );
        }
        evicted
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.cost -= entry.cost();
        Some(entry)
    }
}

// == Local Store ==
/// Bounded in-process store.
///
/// Cloning is cheap; clones share the same entries. When built inside a tokio
/// runtime with a cleanup interval, a sweeper task removes expired entries in
/// the background and stops once every clone has been dropped.
#[derive(Debug, Clone)]
pub struct LocalStore {
    engine: Arc<Mutex<LocalEngine>>,
}

impl LocalStore {
    /// Creates a store with the given budgets.
    ///
    /// Fails when a budget is zero.
    pub fn new(config: &LocalStoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let store = Self {
            engine: Arc::new(Mutex::new(LocalEngine::new(config))),
        };

        if let Some(interval) = config.cleanup_interval {
            if tokio::runtime::Handle::try_current().is_ok() {
                spawn_cleanup_task(&store, interval);
            } else {
                debug!("no tokio runtime, local store expiry is lazy only");
            }
        }

        debug!(
            max_entries = config.max_entries,
            max_cost = config.max_cost,
            eviction_batch = config.eviction_batch,
            "local store created"
        );
        Ok(store)
    }

    /// Current counters.
    pub async fn stats(&self) -> CacheStats {
        self.engine.lock().await.stats()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.engine.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Removes all expired entries now; returns how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        self.engine.lock().await.cleanup_expired()
    }

    pub(crate) fn engine(&self) -> &Arc<Mutex<LocalEngine>> {
        &self.engine
    }
}

#[async_trait]
impl CacheBackend for LocalStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()> {
        self.engine.lock().await.set(key.to_string(), value, ttl)
    }

    async fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.engine.lock().await.get(key)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let removed = self.engine.lock().await.delete(key);
        trace!(key, removed, "local delete");
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn engine(max_entries: usize, max_cost: u64) -> LocalEngine {
        LocalEngine::new(&LocalStoreConfig {
            max_entries,
            max_cost,
            eviction_batch: 64,
            cleanup_interval: None,
        })
    }

    fn bytes(s: &str) -> Vec<u8> {
        s.as_bytes().to_vec()
    }

    #[test]
    fn test_engine_set_and_get() {
        let mut store = engine(100, 1024);

        store.set("key1".to_string(), bytes("value1"), None).unwrap();

        assert_eq!(store.get("key1").unwrap(), bytes("value1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().total_cost, 6);
    }

    #[test]
    fn test_engine_get_nonexistent() {
        let mut store = engine(100, 1024);
        assert!(matches!(store.get("nonexistent"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_engine_delete() {
        let mut store = engine(100, 1024);

        store.set("key1".to_string(), bytes("value1"), None).unwrap();
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));

        assert_eq!(store.len(), 0);
        assert_eq!(store.stats().total_cost, 0);
        assert!(matches!(store.get("key1"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_engine_overwrite_recharges_cost() {
        let mut store = engine(100, 1024);

        store.set("key1".to_string(), bytes("value1"), None).unwrap();
        store.set("key1".to_string(), bytes("v2"), None).unwrap();

        assert_eq!(store.get("key1").unwrap(), bytes("v2"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().total_cost, 2);
    }

    #[test]
    fn test_engine_ttl_expiration() {
        let mut store = engine(100, 1024);

        store
            .set("key1".to_string(), bytes("value1"), Some(Duration::from_millis(50)))
            .unwrap();
        assert!(store.get("key1").is_ok());

        sleep(Duration::from_millis(80));

        assert!(matches!(store.get("key1"), Err(StoreError::Expired(_))));
        // Lazy expiry removed the entry, so the next miss is a plain miss
        assert!(matches!(store.get("key1"), Err(StoreError::NotFound(_))));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_engine_lru_eviction_by_count() {
        let mut store = engine(3, 1024);

        store.set("key1".to_string(), bytes("value1"), None).unwrap();
        store.set("key2".to_string(), bytes("value2"), None).unwrap();
        store.set("key3".to_string(), bytes("value3"), None).unwrap();
        store.set("key4".to_string(), bytes("value4"), None).unwrap();

        assert_eq!(store.len(), 3);
        assert!(matches!(store.get("key1"), Err(StoreError::NotFound(_))));
        assert!(store.get("key2").is_ok());
        assert!(store.get("key4").is_ok());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_engine_lru_touch_on_get() {
        let mut store = engine(3, 1024);

        store.set("key1".to_string(), bytes("value1"), None).unwrap();
        store.set("key2".to_string(), bytes("value2"), None).unwrap();
        store.set("key3".to_string(), bytes("value3"), None).unwrap();

        store.get("key1").unwrap();
        store.set("key4".to_string(), bytes("value4"), None).unwrap();

        assert!(store.get("key1").is_ok());
        assert!(matches!(store.get("key2"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_engine_eviction_by_cost() {
        let mut store = engine(100, 10);

        store.set("a".to_string(), vec![0; 4], None).unwrap();
        store.set("b".to_string(), vec![0; 4], None).unwrap();
        // 8 + 6 > 10, evicting "a" is enough
        store.set("c".to_string(), vec![0; 6], None).unwrap();

        assert!(matches!(store.get("a"), Err(StoreError::NotFound(_))));
        assert!(store.get("b").is_ok());
        assert!(store.get("c").is_ok());
        assert_eq!(store.stats().total_cost, 10);
    }

    #[test]
    fn test_engine_eviction_spans_batches() {
        let mut store = LocalEngine::new(&LocalStoreConfig {
            max_entries: 100,
            max_cost: 10,
            eviction_batch: 1,
            cleanup_interval: None,
        });

        for key in ["a", "b", "c", "d", "e"] {
            store.set(key.to_string(), vec![0; 2], None).unwrap();
        }
        store.set("big".to_string(), vec![0; 10], None).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().evictions, 5);
    }

    #[test]
    fn test_engine_value_over_budget() {
        let mut store = engine(100, 8);

        store.set("small".to_string(), vec![0; 4], None).unwrap();
        let result = store.set("huge".to_string(), vec![0; 9], None);

        assert!(matches!(result, Err(StoreError::CacheFull(_))));
        assert!(store.get("small").is_ok(), "Rejected write must not evict");
    }

    #[test]
    fn test_engine_stats() {
        let mut store = engine(100, 1024);

        store.set("key1".to_string(), bytes("value1"), None).unwrap();
        store.get("key1").unwrap();
        let _ = store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_engine_cleanup_expired() {
        let mut store = engine(100, 1024);

        store
            .set("key1".to_string(), bytes("value1"), Some(Duration::from_millis(30)))
            .unwrap();
        store
            .set("key2".to_string(), bytes("value2"), Some(Duration::from_secs(10)))
            .unwrap();

        sleep(Duration::from_millis(60));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().total_cost, 6);
        assert!(store.get("key2").is_ok());
    }

    #[tokio::test]
    async fn test_local_store_backend_contract() {
        let store = LocalStore::new(&LocalStoreConfig {
            cleanup_interval: None,
            ..LocalStoreConfig::default()
        })
        .unwrap();

        store.set("k", bytes("v"), None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), bytes("v"));

        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap_err().is_not_found());
        assert_eq!(store.kind(), BackendKind::Local);
    }

    #[tokio::test]
    async fn test_local_store_clones_share_entries() {
        let store = LocalStore::new(&LocalStoreConfig::default()).unwrap();
        let clone = store.clone();

        store.set("shared", bytes("v"), None).await.unwrap();

        assert_eq!(clone.get("shared").await.unwrap(), bytes("v"));
        assert_eq!(clone.len().await, 1);
    }

    #[test]
    fn test_local_store_rejects_zero_budget() {
        for config in [
            LocalStoreConfig {
                max_entries: 0,
                ..LocalStoreConfig::default()
            },
            LocalStoreConfig {
                max_cost: 0,
                ..LocalStoreConfig::default()
            },
            LocalStoreConfig {
                eviction_batch: 0,
                ..LocalStoreConfig::default()
            },
        ] {
            assert!(matches!(
                LocalStore::new(&config),
                Err(ConfigError::InvalidSetting { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_local_store_zero_ttl_keeps_entry() {
        let store = LocalStore::new(&LocalStoreConfig {
            cleanup_interval: None,
            ..LocalStoreConfig::default()
        })
        .unwrap();

        store.set("k", bytes("v"), Some(Duration::ZERO)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.get("k").await.unwrap(), bytes("v"));
    }

    #[test]
    fn test_local_store_without_runtime() {
        // Building outside a runtime must not try to spawn the sweeper
        let store = LocalStore::new(&LocalStoreConfig::default()).unwrap();
        assert!(tokio_test::block_on(store.is_empty()));
    }
}
