use chainscript_ledger::LedgerError;
use chainscript_store::StoreError;
use chainscript_types::StoryId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("story not found: {0}")]
    StoryNotFound(StoryId),

    #[error("story already exists: {0}")]
    AlreadyExists(StoryId),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The change is applied in memory but the store rejected the write.
    /// The story's next successful save carries it.
    #[error("story {story} changed but was not saved: {source}")]
    NotPersisted {
        story: StoryId,
        #[source]
        source: StoreError,
    },

    #[error("registry lock poisoned")]
    LockPoisoned,
}

pub type RegistryResult<T> = Result<T, RegistryError>;
