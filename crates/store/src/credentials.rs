//! Three-index credential store.
//!
//! A live credential occupies up to three engine keys, all under the same
//! namespace prefix:
//!
//! | key                      | value              |
//! |--------------------------|--------------------|
//! | `prefix + subject_id`    | credential id      |
//! | `prefix + id`            | JSON record        |
//! | `prefix + session_state` | JSON record        |
//!
//! All three are written with TTL = `expires_in` and are never refreshed.
//! Writes and deletes go key by key; a failure part way through stops the
//! sequence and leaves the keys already touched as they are.  Orphans left
//! that way disappear when their TTL runs out.

use std::sync::Arc;

use cc_domain::error::{Error, Result};
use cc_domain::Credential;

use crate::engine::KvEngine;

/// Credential read/write/delete over a shared [`KvEngine`].
pub struct CredentialStore {
    engine: Arc<dyn KvEngine>,
    prefix: String,
}

impl CredentialStore {
    pub fn new(engine: Arc<dyn KvEngine>, prefix: impl Into<String>) -> Self {
        Self {
            engine,
            prefix: prefix.into(),
        }
    }

    /// The underlying engine handle.
    pub fn engine(&self) -> &Arc<dyn KvEngine> {
        &self.engine
    }

    fn key(&self, part: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + part.len());
        key.extend_from_slice(self.prefix.as_bytes());
        key.extend_from_slice(part.as_bytes());
        key
    }

    /// Read a raw value.  Engine read errors are logged and reported as a
    /// miss; an empty value also counts as a miss.
    fn read(&self, part: &str) -> Option<Vec<u8>> {
        match self.engine.get(&self.key(part)) {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, key = %part, "engine read failed, treating as miss");
                None
            }
        }
    }

    fn read_record(&self, part: &str) -> Option<Credential> {
        let raw = self.read(part)?;
        match serde_json::from_slice(&raw) {
            Ok(cred) => Some(cred),
            Err(e) => {
                tracing::warn!(error = %e, key = %part, "undecodable credential record");
                None
            }
        }
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn exists_by_subject(&self, subject_id: &str) -> bool {
        self.read(subject_id).is_some()
    }

    /// Resolve subject → id, then id → record.
    pub fn get_by_subject(&self, subject_id: &str) -> Option<Credential> {
        let id = self.read(subject_id)?;
        let id = String::from_utf8_lossy(&id);
        self.get_by_id(&id)
    }

    pub fn get_by_id(&self, id: &str) -> Option<Credential> {
        self.read_record(id)
    }

    pub fn get_by_session_state(&self, session_state: &str) -> Option<Credential> {
        self.read_record(session_state)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Write the subject, id and (when present) session-state entries, in
    /// that order.  The first failing write aborts the rest.
    pub fn save(&self, cred: &Credential) -> Result<()> {
        let record = serde_json::to_vec(cred)?;
        let ttl = cred.ttl();

        self.write("subject", &cred.subject_id, cred.id.as_bytes(), ttl)?;
        self.write("id", &cred.id, &record, ttl)?;
        if let Some(state) = cred.session_state() {
            self.write("session_state", state, &record, ttl)?;
        }

        tracing::debug!(
            credential_id = %cred.id,
            subject_id = %cred.subject_id,
            ttl_secs = cred.expires_in,
            "credential indexed"
        );
        Ok(())
    }

    /// Remove the id, subject and (when present) session-state entries, in
    /// that order.  The first failing delete aborts the rest.
    pub fn delete(&self, cred: &Credential) -> Result<()> {
        self.remove("id", &cred.id)?;
        self.remove("subject", &cred.subject_id)?;
        if let Some(state) = cred.session_state() {
            self.remove("session_state", state)?;
        }

        tracing::debug!(credential_id = %cred.id, "credential unindexed");
        Ok(())
    }

    fn write(&self, index: &str, part: &str, value: &[u8], ttl: std::time::Duration) -> Result<()> {
        self.engine.set(&self.key(part), value, ttl).map_err(|e| {
            tracing::error!(error = %e, index, "credential index write failed");
            Error::StoreWrite(format!("{index} index: {e}"))
        })
    }

    fn remove(&self, index: &str, part: &str) -> Result<()> {
        self.engine.delete(&self.key(part)).map_err(|e| {
            tracing::error!(error = %e, index, "credential index delete failed");
            Error::StoreWrite(format!("{index} index: {e}"))
        })
    }

    /// Every live engine entry rendered as text, for the debug console.
    pub fn dump(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .engine
            .scan_all()?
            .into_iter()
            .map(|(k, v)| {
                (
                    String::from_utf8_lossy(&k).into_owned(),
                    String::from_utf8_lossy(&v).into_owned(),
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;

    fn store() -> CredentialStore {
        CredentialStore::new(Arc::new(MemoryEngine::new()), "cred_")
    }

    #[test]
    fn save_populates_all_three_indices() {
        let store = store();
        let cred = Credential::new("user123", "at", 3600, Some("ss-1".into()));
        store.save(&cred).unwrap();

        assert!(store.exists_by_subject("user123"));
        assert_eq!(store.get_by_id(&cred.id).unwrap(), cred);
        assert_eq!(store.get_by_subject("user123").unwrap().id, cred.id);
        assert_eq!(store.get_by_session_state("ss-1").unwrap().id, cred.id);
        assert_eq!(store.engine().len(), 3);
    }

    #[test]
    fn keys_are_prefixed() {
        let store = store();
        let cred = Credential::new("user123", "at", 3600, Some("ss-1".into()));
        store.save(&cred).unwrap();

        let engine = store.engine();
        assert_eq!(
            engine.get(b"cred_user123").unwrap().as_deref(),
            Some(cred.id.as_bytes())
        );
        assert!(engine.get(format!("cred_{}", cred.id).as_bytes()).unwrap().is_some());
        assert!(engine.get(b"cred_ss-1").unwrap().is_some());
    }

    #[test]
    fn no_session_state_means_two_entries() {
        let store = store();
        let cred = Credential::new("user123", "at", 3600, None);
        store.save(&cred).unwrap();
        assert_eq!(store.engine().len(), 2);
        assert!(store.get_by_session_state("").is_none());
    }

    #[test]
    fn delete_clears_every_index() {
        let store = store();
        let cred = Credential::new("user123", "at", 3600, Some("ss-1".into()));
        store.save(&cred).unwrap();
        store.delete(&cred).unwrap();

        assert!(!store.exists_by_subject("user123"));
        assert!(store.get_by_id(&cred.id).is_none());
        assert!(store.get_by_subject("user123").is_none());
        assert!(store.get_by_session_state("ss-1").is_none());
        assert!(store.engine().is_empty());
    }

    #[test]
    fn lookups_miss_on_empty_store() {
        let store = store();
        assert!(!store.exists_by_subject("ghost"));
        assert!(store.get_by_subject("ghost").is_none());
        assert!(store.get_by_id("ghost").is_none());
        assert!(store.get_by_session_state("ghost").is_none());
    }

    #[test]
    fn garbage_record_reads_as_miss() {
        let store = store();
        store
            .engine()
            .set(b"cred_c-1", b"not json", std::time::Duration::from_secs(60))
            .unwrap();
        assert!(store.get_by_id("c-1").is_none());
    }

    #[test]
    fn dump_renders_entries_as_text() {
        let store = store();
        let cred = Credential::new("user123", "at", 3600, None);
        store.save(&cred).unwrap();
        let dump = store.dump().unwrap();
        assert_eq!(dump.len(), 2);
        assert!(dump.iter().any(|(k, v)| k == "cred_user123" && v == &cred.id));
    }
}
