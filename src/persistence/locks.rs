//! Per-recipient mutual exclusion for task-list read-modify-write cycles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

type LockMap = HashMap<String, Arc<tokio::sync::Mutex<()>>>;

/// Async locks keyed by recipient user ID.
///
/// Two events targeting the same recipient serialize; events for different
/// recipients never wait on each other. Entries nobody holds or awaits are
/// pruned on the next acquisition.
#[derive(Clone, Default)]
pub struct RecipientLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl RecipientLocks {
    /// Wait for exclusive access to `recipient`'s task list.
    pub async fn acquire(&self, recipient: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(map.entry(recipient.to_owned()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of recipients currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
