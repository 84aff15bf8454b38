//! Per-session mutual exclusion.
//!
//! Every mutating command on a session runs under the lock for that
//! session's code. This is the sole mechanism that prevents two concurrent
//! card plays from double-resolving a round: the store itself offers no
//! transactions. Locks are created lazily and can be evicted once a
//! session is finished, but only when no handle to them is live.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct SessionLockRegistry {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, code: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the exclusive lock for `code`. Callers queue
    /// in arrival order; the session code is the only blocking resource.
    pub async fn with_session_lock<T, F, Fut>(&self, code: &str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let lock = self.lock_for(code);
        let _guard = lock.lock().await;
        f().await
    }

    /// Drop the lock entry for a finished session. Succeeds only when no
    /// other handle is live, so eviction can never race an in-flight
    /// operation: acquirers clone the Arc before locking, and the map
    /// shard is write-locked during the check.
    pub fn evict(&self, code: &str) -> bool {
        self.locks
            .remove_if(code, |_, lock| Arc::strong_count(lock) == 1)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
