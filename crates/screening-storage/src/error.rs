use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("state file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("change log names unknown table: {0}")]
    UnknownTable(String),

    #[error("change log line {line} is corrupt: {source}")]
    CorruptLog {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StorageError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
