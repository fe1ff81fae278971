//! Bounded in-memory cache for pure inference lookups.
//!
//! Emotion classification and speech synthesis are pure functions of their
//! input text, so results are cached keyed by the exact input. The cache is
//! shared across sessions; it must never be keyed by conversation identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A bounded, thread-safe key-value cache.
///
/// At capacity, the oldest ~10% of entries are evicted to make room. There
/// is no TTL: both backing calls are deterministic for a fixed input.
#[derive(Debug, Clone)]
pub struct LookupCache<V> {
    entries: Arc<Mutex<HashMap<String, Entry<V>>>>,
    capacity: usize,
}

impl<V: Clone> LookupCache<V> {
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Returns the cached value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Inserts a value, evicting the oldest entries if at capacity.
    pub fn insert(&self, key: &str, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() >= self.capacity && !entries.contains_key(key) {
            // Remove ~10% of oldest entries
            let mut ordered: Vec<_> = entries
                .iter()
                .map(|(k, entry)| (k.clone(), entry.inserted_at))
                .collect();
            ordered.sort_by_key(|(_, inserted_at)| *inserted_at);
            let to_remove = (ordered.len() / 10).max(1);
            for (key, _) in ordered.into_iter().take(to_remove) {
                entries.remove(&key);
            }
        }
        entries.insert(
            key.to_string(),
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_inserted_value() {
        let cache = LookupCache::new(10);
        cache.insert("I feel fine", "joy".to_string());
        assert_eq!(cache.get("I feel fine"), Some("joy".to_string()));
        assert_eq!(cache.get("something else"), None);
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let cache = LookupCache::new(10);
        cache.insert("text", 1u32);
        cache.insert("text", 2u32);
        assert_eq!(cache.get("text"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn eviction_keeps_cache_bounded() {
        let cache = LookupCache::new(20);
        for i in 0..200 {
            cache.insert(&format!("key-{i}"), i);
        }
        assert!(cache.len() <= 20);
        // The most recent insert always survives eviction.
        assert_eq!(cache.get("key-199"), Some(199));
    }

    #[test]
    fn eviction_removes_oldest_first() {
        let cache = LookupCache::new(10);
        for i in 0..10 {
            cache.insert(&format!("key-{i}"), i);
        }
        // Capacity reached: the next insert evicts the oldest entry.
        cache.insert("key-10", 10);
        assert_eq!(cache.get("key-0"), None);
        assert_eq!(cache.get("key-10"), Some(10));
    }

    #[test]
    fn clones_share_storage() {
        let cache = LookupCache::new(10);
        let clone = cache.clone();
        cache.insert("shared", "value".to_string());
        assert_eq!(clone.get("shared"), Some("value".to_string()));
    }
}
