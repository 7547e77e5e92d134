//! In-process cache with lazy expiry.

use crate::KvCache;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::trace;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Mutex-guarded map. Expired entries are reaped on the next read of the
/// same key, so an idle entry can outlive its TTL in memory but is never
/// observable after it.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, including not-yet-reaped ones.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.expired(now) => {
                entries.remove(key);
                trace!(key, "cache entry expired");
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn put(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), Entry { value, expires_at });
    }

    fn forget(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_forget() {
        let cache = MemoryCache::new();
        cache.put("a", b"one".to_vec(), None);
        assert_eq!(cache.get("a"), Some(b"one".to_vec()));
        cache.forget("a");
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn overwrite_replaces_value() {
        let cache = MemoryCache::new();
        cache.put("k", b"old".to_vec(), None);
        cache.put("k", b"new".to_vec(), None);
        assert_eq!(cache.get("k"), Some(b"new".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entry_reads_as_miss() {
        let cache = MemoryCache::new();
        cache.put("k", b"v".to_vec(), Some(Duration::from_millis(0)));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn unexpired_entry_survives() {
        let cache = MemoryCache::new();
        cache.put("k", b"v".to_vec(), Some(Duration::from_secs(300)));
        assert_eq!(cache.get("k"), Some(b"v".to_vec()));
    }
}
