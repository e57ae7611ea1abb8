//! Per-serial advisory lock
//!
//! Serializes scope mutations for one serial within this process

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Advisory locks keyed by serial number
#[derive(Clone, Default)]
pub struct ScopeLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and hold the lock of one serial
    pub async fn acquire(&self, serial_number: &str) -> ScopeGuard {
        let mutex = self
            .locks
            .entry(serial_number.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;
        debug!(serial_number, "Scope lock acquired");

        ScopeGuard {
            guard: Some(guard),
            serial_number: serial_number.to_string(),
            locks: self.locks.clone(),
        }
    }

    /// Number of serials with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Held scope lock; released on drop
pub struct ScopeGuard {
    guard: Option<OwnedMutexGuard<()>>,
    serial_number: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        // Release first so the entry is only dropped when no one else waits on it
        self.guard.take();
        self.locks
            .remove_if(&self.serial_number, |_, mutex| Arc::strong_count(mutex) == 1);
        debug!(serial_number = %self.serial_number, "Scope lock released");
    }
}
