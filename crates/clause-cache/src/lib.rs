//! Process-wide service registry (4.K).
//!
//! A thread-safe key-value store mapping a stable string key to a lazily
//! constructed, shared service instance (e.g. a trained TF-IDF model, an
//! embedding provider) with a time-to-live and access counters, so the
//! orchestrator (4.L) can reuse expensive-to-build services across jobs
//! without rebuilding them on every call. Grounded in the original's
//! `ServiceCache` singleton (`original_source/hienfeld/services/service_cache.py`),
//! reshaped from a class-level singleton into an explicit, shareable value
//! the caller threads through as context rather than a hidden global.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    created_at: Instant,
    ttl: Option<Duration>,
    access_count: AtomicU64,
    last_accessed: Mutex<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.created_at.elapsed() > ttl,
            None => false,
        }
    }

    fn touch(&self) {
        self.access_count.fetch_add(1, Ordering::Relaxed);
        *self.last_accessed.lock() = Instant::now();
    }
}

/// A snapshot of one entry's usage, returned by [`ServiceRegistry::stats`].
#[derive(Debug, Clone)]
pub struct EntryStats {
    pub key: String,
    pub access_count: u64,
    pub age: Duration,
    pub expired: bool,
}

/// Process-wide, thread-safe key-value store mapping a stable string key to
/// a shared service instance.
#[derive(Default)]
pub struct ServiceRegistry {
    entries: DashMap<String, CacheEntry>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached service for `key`, constructing it with `factory`
    /// if absent, expired, or `force_reload` is set. `ttl: None` means the
    /// entry never expires on its own.
    ///
    /// Double-checked: the fast path only takes a shared read on the
    /// underlying map; only a genuine miss (or forced reload) takes the
    /// per-shard write lock that `DashMap::entry` provides, and the
    /// presence check is repeated once inside it in case another thread
    /// won the race to construct the same key first.
    pub fn get_or_create<T, F>(&self, key: &str, ttl: Option<Duration>, force_reload: bool, factory: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if !force_reload {
            if let Some(entry) = self.entries.get(key) {
                if !entry.is_expired() {
                    entry.touch();
                    if let Ok(value) = entry.value.clone().downcast::<T>() {
                        return value;
                    }
                }
            }
        }

        let fresh_entry = |factory: F| CacheEntry {
            value: Arc::new(factory()) as Arc<dyn Any + Send + Sync>,
            created_at: Instant::now(),
            ttl,
            access_count: AtomicU64::new(0),
            last_accessed: Mutex::new(Instant::now()),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if force_reload || occupied.get().is_expired() {
                    occupied.insert(fresh_entry(factory));
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh_entry(factory));
            }
        }

        let entry = self.entries.get(key).expect("entry just inserted");
        entry.touch();
        entry
            .value
            .clone()
            .downcast::<T>()
            .expect("ServiceRegistry key reused with a different type")
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> Vec<EntryStats> {
        self.entries
            .iter()
            .map(|entry| EntryStats {
                key: entry.key().clone(),
                access_count: entry.value().access_count.load(Ordering::Relaxed),
                age: entry.value().created_at.elapsed(),
                expired: entry.value().is_expired(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_the_constructed_value() {
        let registry = ServiceRegistry::new();
        let calls = std::sync::atomic::AtomicU64::new(0);
        for _ in 0..3 {
            let _value: Arc<String> = registry.get_or_create("greeting", None, false, || {
                calls.fetch_add(1, Ordering::SeqCst);
                "hello".to_string()
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn force_reload_rebuilds_the_entry() {
        let registry = ServiceRegistry::new();
        let first: Arc<u32> = registry.get_or_create("n", None, false, || 1u32);
        let second: Arc<u32> = registry.get_or_create("n", None, true, || 2u32);
        assert_eq!(*first, 1);
        assert_eq!(*second, 2);
    }

    #[test]
    fn expired_entries_are_rebuilt() {
        let registry = ServiceRegistry::new();
        let _first: Arc<u32> = registry.get_or_create("n", Some(Duration::from_millis(1)), false, || 1u32);
        std::thread::sleep(Duration::from_millis(5));
        let second: Arc<u32> = registry.get_or_create("n", Some(Duration::from_millis(1)), false, || 2u32);
        assert_eq!(*second, 2);
    }

    #[test]
    fn invalidate_removes_the_entry() {
        let registry = ServiceRegistry::new();
        let _value: Arc<u32> = registry.get_or_create("n", None, false, || 1u32);
        registry.invalidate("n");
        assert!(registry.is_empty());
    }

    #[test]
    fn stats_report_access_counts() {
        let registry = ServiceRegistry::new();
        let _a: Arc<u32> = registry.get_or_create("n", None, false, || 1u32);
        let _b: Arc<u32> = registry.get_or_create("n", None, false, || 1u32);
        let stats = registry.stats();
        assert_eq!(stats.len(), 1);
        assert!(stats[0].access_count >= 1);
    }
}
