//! Bounded least-recently-used cache.
//!
//! Shared by the template match memo and the conversation accelerator.  The
//! capacity is fixed at construction and eviction is explicit; there is no
//! implicit unbounded growth tied to process lifetime.
//!
//! Recency is tracked with a monotonic stamp per entry; eviction scans for
//! the minimum stamp.  At the capacities used here (≤ ~10k entries) the scan
//! is cheaper than maintaining an intrusive list and keeps the structure
//! trivially correct.

use std::collections::HashMap;
use std::hash::Hash;

struct Slot<V> {
    value: V,
    stamp: u64,
}

/// Fixed-capacity LRU map.
pub struct LruCache<K, V> {
    map: HashMap<K, Slot<V>>,
    capacity: usize,
    clock: u64,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity.min(1024)),
            capacity,
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up `key`, marking the entry most-recently-used on a hit.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let stamp = self.tick();
        let slot = self.map.get_mut(key)?;
        slot.stamp = stamp;
        Some(&slot.value)
    }

    /// Like [`get`](Self::get) but yields a mutable reference.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let stamp = self.tick();
        let slot = self.map.get_mut(key)?;
        slot.stamp = stamp;
        Some(&mut slot.value)
    }

    /// Look up `key` without touching its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).map(|slot| &slot.value)
    }

    /// Insert or replace `key`, evicting the least-recently-used entry when
    /// the cache is full.  Returns the evicted pair, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return None;
        }
        let stamp = self.tick();
        if let Some(slot) = self.map.get_mut(&key) {
            slot.value = value;
            slot.stamp = stamp;
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.lru_key().map(|lru| {
                let slot = self.map.remove(&lru).expect("lru key present");
                (lru, slot.value)
            })
        } else {
            None
        };

        self.map.insert(key, Slot { value, stamp });
        evicted
    }

    /// Drop every entry, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    fn lru_key(&self) -> Option<K> {
        self.map
            .iter()
            .min_by_key(|(_, slot)| slot.stamp)
            .map(|(key, _)| key.clone())
    }
}
