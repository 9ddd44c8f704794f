use chainscript_ledger::SerializedLedger;
use chainscript_types::StoryId;

use crate::error::StoreResult;

/// Persistent home of serialized ledgers, keyed by story id.
///
/// Implementations must be thread-safe (`Send + Sync`). A save replaces the
/// previous document for that story in full.
pub trait LedgerStore: Send + Sync {
    /// Load a story's ledger.
    ///
    /// Returns `Ok(None)` if nothing is stored under `story_id`.
    fn load(&self, story_id: &StoryId) -> StoreResult<Option<SerializedLedger>>;

    /// Store (create or replace) a story's ledger.
    fn save(&self, story_id: &StoryId, ledger: &SerializedLedger) -> StoreResult<()>;

    /// All stored story ids, sorted.
    fn list(&self) -> StoreResult<Vec<StoryId>>;

    /// Check whether anything is stored under `story_id`.
    fn exists(&self, story_id: &StoryId) -> StoreResult<bool> {
        Ok(self.load(story_id)?.is_some())
    }
}
