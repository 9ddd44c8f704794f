//! Story-level branch references.
//!
//! A derivation names the passage a new story continues from. It is
//! resolved once, when the story is created, and never re-checked.

use std::sync::Arc;

use chainscript_types::{ContentHash, StoryId};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::Ledger;

/// "This story continues from that passage."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationRef {
    pub source_ledger_id: StoryId,
    pub source_entry_hash: ContentHash,
}

impl DerivationRef {
    pub fn new(source_ledger_id: StoryId, source_entry_hash: ContentHash) -> Self {
        Self {
            source_ledger_id,
            source_entry_hash,
        }
    }

    /// Build a reference from caller-supplied strings.
    ///
    /// A story id that cannot name any story reports `ParentStoryNotFound`;
    /// a hash that cannot name any entry reports `ParentEntryNotFound`.
    pub fn parse(story_id: &str, entry_hash: &str) -> Result<Self, LedgerError> {
        let source_ledger_id = StoryId::new(story_id)
            .map_err(|_| LedgerError::ParentStoryNotFound(story_id.to_string()))?;
        let source_entry_hash = ContentHash::from_hex(entry_hash)
            .ok()
            .filter(|hash| !hash.is_null())
            .ok_or_else(|| LedgerError::ParentEntryNotFound {
                story: story_id.to_string(),
                hash: entry_hash.to_string(),
            })?;
        Ok(Self::new(source_ledger_id, source_entry_hash))
    }

    /// Check that the referenced passage exists in the source story's
    /// committed chain.
    pub fn resolve<R: LedgerResolver>(&self, resolver: &R) -> Result<(), R::Error> {
        let source = resolver
            .resolve(&self.source_ledger_id)?
            .ok_or_else(|| LedgerError::ParentStoryNotFound(self.source_ledger_id.to_string()))?;

        if source.find_committed(&self.source_entry_hash)?.is_none() {
            return Err(LedgerError::ParentEntryNotFound {
                story: self.source_ledger_id.to_string(),
                hash: self.source_entry_hash.to_hex(),
            }
            .into());
        }

        Ok(())
    }
}

/// Lookup of ledgers by story id, used to resolve derivations.
///
/// Implementations may rehydrate ledgers from storage on demand.
pub trait LedgerResolver {
    type Error: From<LedgerError>;

    fn resolve(&self, story_id: &StoryId) -> Result<Option<Arc<Ledger>>, Self::Error>;
}
