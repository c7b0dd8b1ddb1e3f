use thiserror::Error;

/// Failures inside the storage layer. Public store operations never return
/// these; they log them and fall back to empty data or a `false` status.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded writing {key}: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { key: String, needed: u64, quota: u64 },

    #[error("corrupt value under {key}: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("could not serialize value for {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
