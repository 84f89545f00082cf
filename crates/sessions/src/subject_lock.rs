//! Per-subject serialization of credential creation.
//!
//! `create` is a check-then-save over two engine keys.  Holding the
//! subject's permit across both steps means two concurrent creates for
//! the same subject cannot both observe "absent"; the second one waits
//! and then finds the first one's credential.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use cc_domain::error::{Error, Result};

/// Maps each subject id to a `Semaphore(1)`.
#[derive(Default)]
pub struct SubjectLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl SubjectLockMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `subject_id`.  The permit releases on
    /// drop.
    pub async fn acquire(&self, subject_id: &str) -> Result<OwnedSemaphorePermit> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(subject_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        sem.acquire_owned()
            .await
            .map_err(|_| Error::Other(format!("subject lock closed for {subject_id}")))
    }

    /// Number of tracked subjects.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget subjects nobody holds or waits on.
    ///
    /// Only entries whose `Arc` is referenced by the map alone are dropped;
    /// a caller between `entry()` and `acquire_owned()` keeps its entry.
    pub fn prune_idle(&self) -> usize {
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, sem| Arc::strong_count(sem) > 1);
        before - locks.len()
    }
}
