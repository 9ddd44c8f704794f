use std::collections::HashMap;
use std::sync::RwLock;

use chainscript_ledger::SerializedLedger;
use chainscript_types::StoryId;

use crate::error::{StoreError, StoreResult};
use crate::traits::LedgerStore;

/// In-memory, HashMap-based ledger store.
///
/// Intended for tests and servers run without a data directory. Documents
/// are cloned on load and save; everything is lost when the store is
/// dropped.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    ledgers: RwLock<HashMap<StoryId, SerializedLedger>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn load(&self, story_id: &StoryId) -> StoreResult<Option<SerializedLedger>> {
        let ledgers = self.ledgers.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(ledgers.get(story_id).cloned())
    }

    fn save(&self, story_id: &StoryId, ledger: &SerializedLedger) -> StoreResult<()> {
        let mut ledgers = self.ledgers.write().map_err(|_| StoreError::LockPoisoned)?;
        ledgers.insert(story_id.clone(), ledger.clone());
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<StoryId>> {
        let ledgers = self.ledgers.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut ids: Vec<StoryId> = ledgers.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
