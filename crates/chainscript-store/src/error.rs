use chainscript_types::StoryId;

/// Errors from ledger store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A stored document could not be decoded.
    #[error("corrupt ledger document for {story}: {reason}")]
    CorruptDocument { story: StoryId, reason: String },

    /// Serialization failure while writing.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
