//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for local-store eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Every touch stamps the key with a monotonically increasing tick. The
/// smallest tick in `by_tick` is the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Next tick to hand out
    clock: u64,
    /// Current tick of each tracked key
    by_key: HashMap<String, u64>,
    /// Keys ordered by tick, oldest first
    by_tick: BTreeMap<u64, String>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, tracking it if new.
    pub fn touch(&mut self, key: &str) {
        let tick = self.clock;
        self.clock += 1;

        match self.by_key.get_mut(key) {
            Some(current) => {
                let previous = *current;
                *current = tick;
                if let Some(k) = self.by_tick.remove(&previous) {
                    self.by_tick.insert(tick, k);
                }
            }
            None => {
                self.by_key.insert(key.to_string(), tick);
                self.by_tick.insert(tick, key.to_string());
            }
        }
    }

    // == Remove ==
    /// Stops tracking a key.
    pub fn remove(&mut self, key: &str) {
        if let Some(tick) = self.by_key.remove(key) {
            self.by_tick.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.by_tick.pop_first()?;
        self.by_key.remove(&key);
        Some(key)
    }
}
