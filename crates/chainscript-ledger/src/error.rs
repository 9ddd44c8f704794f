use chainscript_types::ContentHash;

use crate::content::ContentError;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("pending entry {index} not found ({pending} pending)")]
    NotFound { index: usize, pending: usize },

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ContentError),

    #[error("corrupt entry at seq {seq}: stored hash {stored}, computed {computed}")]
    CorruptEntry {
        seq: u64,
        stored: ContentHash,
        computed: ContentHash,
    },

    #[error("stale linkage: entry links to {linked}, but the chain tip is now {tip}; resubmit it")]
    StaleLinkage {
        linked: ContentHash,
        tip: ContentHash,
    },

    #[error("parent story not found: {0}")]
    ParentStoryNotFound(String),

    #[error("parent entry {hash} not found in story {story}")]
    ParentEntryNotFound { story: String, hash: String },

    #[error("ledger has no genesis entry")]
    EmptyChain,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
