//! Disconnect grace timers.
//!
//! One cancellable one-shot timer per player key. Scheduling overwrites
//! (and cancels) any pending timer for the same key; cancelling an idle
//! key is a safe no-op. A fired callback cannot be rolled back, so
//! reconnection after firing is a fresh mutation, not an undo.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Default)]
pub struct DisconnectGraceScheduler {
    pending: Arc<DashMap<String, (u64, CancellationToken)>>,
    next_id: AtomicU64,
}

impl DisconnectGraceScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer for `key`, replacing any pending one. When it
    /// fires the callback runs on a background task; the callback must
    /// acquire the session lock itself before mutating anything.
    pub fn schedule<F, Fut>(&self, key: &str, delay: Duration, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        self.cancel(key);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.pending.insert(key.to_string(), (id, token.clone()));
        debug!(key, delay_secs = delay.as_secs(), "grace timer armed");

        let pending = Arc::clone(&self.pending);
        let key = key.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(key, "grace timer cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    // Clear our own entry before running the callback, but
                    // leave any newer timer for the same key untouched.
                    pending.remove_if(&key, |_, (entry_id, _)| *entry_id == id);
                    debug!(key, "grace timer fired");
                    callback().await;
                }
            }
        });
    }

    /// Cancel the pending timer for `key`, if any.
    pub fn cancel(&self, key: &str) {
        if let Some((_, (_, token))) = self.pending.remove(key) {
            token.cancel();
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }
}
