use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::EngineError;

/// Single-writer locks keyed by id.
///
/// Acquisition never waits: a second writer for the same key gets
/// [`EngineError::Conflict`]. Entries nobody holds are pruned on acquire.
#[derive(Debug)]
pub struct KeyedLocks {
    label: &'static str,
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn try_acquire(&self, key: Uuid) -> Result<OwnedMutexGuard<()>, EngineError> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(key).or_default().clone()
        };
        lock.try_lock_owned().map_err(|_| {
            tracing::debug!(label = self.label, key = %key, "concurrent mutation rejected");
            EngineError::Conflict(format!("{} {key} is being modified by another request", self.label))
        })
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
