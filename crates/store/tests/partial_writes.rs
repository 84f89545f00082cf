//! Multi-key save/delete behaviour when the engine fails part way through,
//! and passive TTL expiry of whole credentials.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cc_domain::error::{Error, Result};
use cc_domain::Credential;
use cc_store::{CredentialStore, KvEngine, MemoryEngine};

/// Wraps a [`MemoryEngine`] and fails the N-th `set` / `delete` call
/// (1-based).  `0` disables the failure.
struct FlakyEngine {
    inner: MemoryEngine,
    fail_set_at: usize,
    fail_delete_at: usize,
    sets: AtomicUsize,
    deletes: AtomicUsize,
}

impl FlakyEngine {
    fn new(fail_set_at: usize, fail_delete_at: usize) -> Self {
        Self {
            inner: MemoryEngine::new(),
            fail_set_at,
            fail_delete_at,
            sets: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }
}

impl KvEngine for FlakyEngine {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &[u8], value: &[u8], ttl: Duration) -> Result<()> {
        let n = self.sets.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_set_at {
            return Err(Error::Other("disk full".into()));
        }
        self.inner.set(key, value, ttl)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        let n = self.deletes.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_delete_at {
            return Err(Error::Other("io error".into()));
        }
        self.inner.delete(key)
    }

    fn scan_all(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.inner.scan_all()
    }

    fn purge_expired(&self) -> usize {
        self.inner.purge_expired()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

fn credential() -> Credential {
    Credential::new("user123", "at", 3600, Some("ss-1".into()))
}

#[test]
fn failed_second_write_leaves_only_subject_entry() {
    let store = CredentialStore::new(Arc::new(FlakyEngine::new(2, 0)), "cred_");
    let cred = credential();

    let err = store.save(&cred).unwrap_err();
    assert!(matches!(err, Error::StoreWrite(_)));

    // Subject entry landed, id and session-state entries never written.
    assert!(store.exists_by_subject("user123"));
    assert!(store.get_by_id(&cred.id).is_none());
    assert!(store.get_by_session_state("ss-1").is_none());
    // The dangling subject entry points at nothing.
    assert!(store.get_by_subject("user123").is_none());
}

#[test]
fn failed_first_write_writes_nothing() {
    let store = CredentialStore::new(Arc::new(FlakyEngine::new(1, 0)), "cred_");
    assert!(store.save(&credential()).is_err());
    assert!(store.engine().is_empty());
}

#[test]
fn failed_delete_stops_the_sequence() {
    let store = CredentialStore::new(Arc::new(FlakyEngine::new(0, 2)), "cred_");
    let cred = credential();
    store.save(&cred).unwrap();

    let err = store.delete(&cred).unwrap_err();
    assert!(matches!(err, Error::StoreWrite(_)));

    // Id entry removed first; subject and session-state entries remain.
    assert!(store.get_by_id(&cred.id).is_none());
    assert!(store.exists_by_subject("user123"));
    assert_eq!(store.get_by_session_state("ss-1").unwrap().id, cred.id);
}

#[test]
fn store_write_error_names_the_index() {
    let store = CredentialStore::new(Arc::new(FlakyEngine::new(3, 0)), "cred_");
    let err = store.save(&credential()).unwrap_err();
    assert!(err.to_string().contains("session_state index"));
}

#[tokio::test]
async fn whole_credential_expires_after_ttl() {
    let store = CredentialStore::new(Arc::new(MemoryEngine::new()), "cred_");
    let cred = Credential::new("user123", "at", 1, Some("ss-1".into()));
    store.save(&cred).unwrap();
    assert!(store.get_by_id(&cred.id).is_some());

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert!(store.get_by_id(&cred.id).is_none());
    assert!(store.get_by_subject("user123").is_none());
    assert!(store.get_by_session_state("ss-1").is_none());
    assert!(!store.exists_by_subject("user123"));
    store.engine().purge_expired();
    assert!(store.engine().is_empty());
}
