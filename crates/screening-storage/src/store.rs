use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::error::StorageError;
use crate::state::StatePersistence;
use crate::tables::Tables;

/// Transactional in-process store.
///
/// A transaction mutates the live tables in place while every touched row
/// is journaled. When the closure fails, or the change log cannot be
/// written, the journal is rolled back. With a state file configured, a
/// committed transaction appends only the rows it wrote.
#[derive(Debug)]
pub struct Store {
    tables: Mutex<Tables>,
    persistence: Option<StatePersistence>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            persistence: None,
        }
    }

    /// Open a store backed by a JSON state file, loading it if present.
    ///
    /// Logged transactions are replayed and folded into a fresh state file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let persistence = StatePersistence::new(path);
        let mut tables = persistence.load::<Tables>()?.unwrap_or_default();
        let transactions = persistence.load_log()?;
        if !transactions.is_empty() {
            for change in transactions.into_iter().flatten() {
                tables.apply(change)?;
            }
            persistence.flush(&tables)?;
        }
        Ok(Self {
            tables: Mutex::new(tables),
            persistence: Some(persistence),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| {
            // A closure panicked mid-transaction; undo whatever it wrote.
            let mut tables = poisoned.into_inner();
            tables.rollback();
            self.tables.clear_poison();
            tables
        })
    }

    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        let tables = self.lock();
        f(&tables)
    }

    pub fn transact<R, E>(&self, f: impl FnOnce(&mut Tables) -> Result<R, E>) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let mut tables = self.lock();
        let result = match f(&mut tables) {
            Ok(result) => result,
            Err(error) => {
                tables.rollback();
                return Err(error);
            }
        };
        if let Some(persistence) = &self.persistence
            && let Err(error) = tables.changes().and_then(|changes| persistence.append(&changes))
        {
            tables.rollback();
            return Err(error.into());
        }
        tables.commit();
        Ok(result)
    }
}
