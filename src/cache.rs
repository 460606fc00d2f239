//! Bounded, text-keyed memoization caches.
//!
//! Keys are canonical display text (optionally suffixed with a target symbol). A stored
//! [`CacheSlot::NoChange`] is distinct from an absent entry: it records that a previous attempt
//! completed and produced nothing, so the caller can skip the recomputation entirely.
//!
//! Lookups take the read lock and run in parallel; insert, eviction, and the recency touch on a
//! bounded-cache hit take the write lock, briefly. Eviction drops the least recently used entry
//! via an auxiliary recency list.

use crate::expr::Expr;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

/// A memoized outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheSlot {
    /// The operation produced this result.
    Result(Expr),
    /// The operation completed and produced no change / no result.
    NoChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Bounded(usize),
    Unlimited,
}

#[derive(Debug, Default)]
struct CacheInner {
    map: HashMap<String, CacheSlot>,
    recency: VecDeque<String>,
}

/// One text-keyed memoization cache.
#[derive(Debug)]
pub struct Cache {
    capacity: Capacity,
    inner: RwLock<CacheInner>,
}

impl Cache {
    pub fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            inner: RwLock::new(CacheInner::default()),
        }
    }

    pub fn get(&self, key: &str) -> Option<CacheSlot> {
        let slot = {
            let inner = self.inner.read().expect("cache lock poisoned");
            inner.map.get(key).cloned()
        };
        if slot.is_some() && self.capacity != Capacity::Unlimited {
            let mut inner = self.inner.write().expect("cache lock poisoned");
            if let Some(position) = inner.recency.iter().position(|existing| existing == key) {
                inner.recency.remove(position);
                inner.recency.push_back(key.to_string());
            }
        }
        slot
    }

    pub fn insert(&self, key: String, slot: CacheSlot) {
        let mut inner = self.inner.write().expect("cache lock poisoned");

        if inner.map.insert(key.clone(), slot).is_some() {
            // refresh recency on reinsert
            inner.recency.retain(|existing| existing != &key);
        }
        inner.recency.push_back(key);

        if let Capacity::Bounded(limit) = self.capacity {
            while inner.map.len() > limit {
                let Some(oldest) = inner.recency.pop_front() else {
                    break;
                };
                inner.map.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("cache lock poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bounded_eviction_drops_oldest() {
        let cache = Cache::new(Capacity::Bounded(2));
        cache.insert("a".into(), CacheSlot::NoChange);
        cache.insert("b".into(), CacheSlot::NoChange);
        cache.insert("c".into(), CacheSlot::NoChange);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some(CacheSlot::NoChange));
    }

    #[test]
    fn no_change_is_distinct_from_absent() {
        let cache = Cache::new(Capacity::Unlimited);
        assert_eq!(cache.get("x + x"), None);
        cache.insert("x + x".into(), CacheSlot::NoChange);
        assert_eq!(cache.get("x + x"), Some(CacheSlot::NoChange));
    }

    #[test]
    fn lookups_refresh_recency() {
        let cache = Cache::new(Capacity::Bounded(2));
        cache.insert("a".into(), CacheSlot::NoChange);
        cache.insert("b".into(), CacheSlot::NoChange);
        assert!(cache.get("a").is_some());
        cache.insert("c".into(), CacheSlot::NoChange);

        // "b" was the least recently used entry, not "a"
        assert_eq!(cache.get("b"), None);
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn reinsert_refreshes_recency() {
        let cache = Cache::new(Capacity::Bounded(2));
        cache.insert("a".into(), CacheSlot::NoChange);
        cache.insert("b".into(), CacheSlot::NoChange);
        cache.insert("a".into(), CacheSlot::NoChange);
        cache.insert("c".into(), CacheSlot::NoChange);

        // "b" was the oldest untouched entry
        assert_eq!(cache.get("b"), None);
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }
}
