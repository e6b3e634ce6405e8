use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::StorageError;
use crate::table::Change;

/// JSON state file written atomically (tmp + rename), plus an append-only
/// change log next to it holding one JSON line per committed transaction.
#[derive(Debug, Clone)]
pub struct StatePersistence {
    path: PathBuf,
    log_path: PathBuf,
}

impl StatePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let log_path = path.with_extension("json.log");
        Self { path, log_path }
    }

    /// Load the state file. Returns `None` when it does not exist yet.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StorageError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no state file, starting empty");
            return Ok(None);
        }
        let json = std::fs::read(&self.path)?;
        let value: T = serde_json::from_slice(&json)?;
        tracing::debug!(path = %self.path.display(), "state loaded from disk");
        Ok(Some(value))
    }

    /// Transactions logged since the state file was last written, oldest
    /// first. A torn final line (a crash mid-append) is dropped.
    pub fn load_log(&self) -> Result<Vec<Vec<Change>>, StorageError> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }
        let lines: Vec<String> = BufReader::new(std::fs::File::open(&self.log_path)?)
            .lines()
            .collect::<Result<_, _>>()?;
        let last = lines.len().saturating_sub(1);

        let mut transactions = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Vec<Change>>(line) {
                Ok(changes) => transactions.push(changes),
                Err(error) if index == last => {
                    tracing::warn!(path = %self.log_path.display(), %error, "dropping torn change log line");
                }
                Err(source) => return Err(StorageError::CorruptLog { line: index + 1, source }),
            }
        }
        tracing::debug!(
            path = %self.log_path.display(),
            transactions = transactions.len(),
            "change log loaded"
        );
        Ok(transactions)
    }

    /// Append one committed transaction to the change log.
    pub fn append(&self, changes: &[Change]) -> Result<(), StorageError> {
        if changes.is_empty() {
            return Ok(());
        }
        self.ensure_parent()?;
        let mut line = serde_json::to_vec(changes)?;
        line.push(b'\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.log_path)?;
        file.write_all(&line)?;
        file.sync_data()?;
        Ok(())
    }

    /// Write the full state and drop the change log it now covers.
    pub fn flush<T: Serialize>(&self, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(value)?;
        self.ensure_parent()?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        if self.log_path.exists() {
            std::fs::remove_file(&self.log_path)?;
        }

        tracing::debug!(path = %self.path.display(), bytes = json.len(), "state flushed to disk");
        Ok(())
    }

    fn ensure_parent(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}
