//! Embedded key/value engine with per-entry TTL.
//!
//! Each operation is atomic on its own key; there is no multi-key
//! transaction.  An entry whose TTL has elapsed is unreadable from that
//! instant on, and nothing is signalled to callers when it happens.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::notification::RemovalCause;
use moka::sync::Cache;
use moka::Expiry;

use cc_domain::error::Result;

/// The storage contract the credential store is written against.
pub trait KvEngine: Send + Sync {
    /// Read a live entry.  `Ok(None)` when the key is absent or expired.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Write (or overwrite) `key` so that it expires `ttl` from now.
    fn set(&self, key: &[u8], value: &[u8], ttl: Duration) -> Result<()>;

    /// Remove `key`.  Removing an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Snapshot of every live entry, ordered by key.  Debug use only.
    fn scan_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Drop expired entries and return how many were reclaimed.
    fn purge_expired(&self) -> usize;

    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory engine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Longest TTL handed to the cache.  Anything above is capped, which in
/// practice means "never expires".
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Clone)]
struct Entry {
    value: Arc<[u8]>,
    ttl: Duration,
}

/// Each entry carries its own TTL; an overwrite restarts the clock.
struct EntryTtl;

impl Expiry<Vec<u8>, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &Vec<u8>,
        entry: &Entry,
        _at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &Vec<u8>,
        entry: &Entry,
        _at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Process-local engine backed by a `moka` cache with per-entry expiry.
///
/// Expired entries are unreadable at once but stay resident until the
/// cache's pending maintenance runs, which [`KvEngine::purge_expired`]
/// forces.
pub struct MemoryEngine {
    cache: Cache<Vec<u8>, Entry>,
    expired: Arc<AtomicUsize>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        let expired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&expired);
        let cache: Cache<Vec<u8>, Entry> = Cache::builder()
            .expire_after(EntryTtl)
            .eviction_listener(move |_key, _entry, cause| {
                if cause == RemovalCause::Expired {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
            .build();
        Self { cache, expired }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl KvEngine for MemoryEngine {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.cache.get(key).map(|e| e.value.to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8], ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: Arc::from(value),
            ttl: ttl.min(MAX_TTL),
        };
        self.cache.insert(key.to_vec(), entry);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.cache.invalidate(key);
        Ok(())
    }

    fn scan_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut live: Vec<_> = self
            .cache
            .iter()
            .map(|(k, e)| ((*k).clone(), e.value.to_vec()))
            .collect();
        live.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(live)
    }

    fn purge_expired(&self) -> usize {
        self.cache.run_pending_tasks();
        self.expired.swap(0, Ordering::Relaxed)
    }

    fn len(&self) -> usize {
        // `entry_count` lags until maintenance runs; iteration skips expired
        // entries.
        self.cache.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn set_then_get() {
        let engine = MemoryEngine::new();
        engine.set(b"k", b"v", HOUR).unwrap();
        assert_eq!(engine.get(b"k").unwrap().as_deref(), Some(&b"v"[..]));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let engine = MemoryEngine::new();
        assert!(engine.get(b"nope").unwrap().is_none());
    }

    #[test]
    fn set_overwrites_value_and_ttl() {
        let engine = MemoryEngine::new();
        engine.set(b"k", b"old", Duration::ZERO).unwrap();
        assert!(engine.get(b"k").unwrap().is_none());
        engine.set(b"k", b"new", HOUR).unwrap();
        assert_eq!(engine.get(b"k").unwrap().as_deref(), Some(&b"new"[..]));
    }

    #[test]
    fn delete_is_idempotent() {
        let engine = MemoryEngine::new();
        engine.set(b"k", b"v", HOUR).unwrap();
        engine.delete(b"k").unwrap();
        engine.delete(b"k").unwrap();
        assert!(engine.get(b"k").unwrap().is_none());
        assert!(engine.is_empty());
    }

    #[test]
    fn huge_ttl_never_expires() {
        let engine = MemoryEngine::new();
        engine.set(b"k", b"v", Duration::MAX).unwrap();
        assert!(engine.get(b"k").unwrap().is_some());
        assert_eq!(engine.purge_expired(), 0);
    }

    #[tokio::test]
    async fn entries_expire_without_delete() {
        let engine = MemoryEngine::new();
        engine.set(b"short", b"v", Duration::from_millis(50)).unwrap();
        engine.set(b"long", b"v", HOUR).unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(engine.get(b"short").unwrap().is_none());
        assert!(engine.get(b"long").unwrap().is_some());
        assert_eq!(engine.len(), 1);

        let keys: Vec<_> = engine.scan_all().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"long".to_vec()]);
    }

    #[tokio::test]
    async fn purge_reports_reclaimed_entries_once() {
        let engine = MemoryEngine::new();
        engine.set(b"short", b"v", Duration::from_millis(50)).unwrap();
        engine.set(b"long", b"v", HOUR).unwrap();

        // Expiry timers are bucketed at roughly one second.
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(engine.purge_expired(), 1);
        assert_eq!(engine.purge_expired(), 0);
        assert!(engine.get(b"long").unwrap().is_some());
    }

    #[test]
    fn scan_all_is_sorted_by_key() {
        let engine = MemoryEngine::new();
        engine.set(b"b", b"2", HOUR).unwrap();
        engine.set(b"a", b"1", HOUR).unwrap();
        engine.set(b"c", b"3", HOUR).unwrap();
        let keys: Vec<_> = engine.scan_all().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }
}
