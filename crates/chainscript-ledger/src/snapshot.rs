//! Serialized ledger schema exchanged with the persistence collaborator.
//!
//! One schema covers every generation of stored ledgers: fields added over
//! time are optional and default on load (empty chain, empty queue, no
//! title, no derivation). Older documents that recorded the derivation as
//! the flat pair `parent_story_id` / `parent_block_hash` are still read.

use serde::{Deserialize, Serialize};

use crate::derivation::DerivationRef;
use crate::entry::Entry;
use crate::error::LedgerError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedLedger {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub derivation: Option<DerivationRef>,
    #[serde(default)]
    pub chain: Vec<Entry>,
    #[serde(default)]
    pub pending: Vec<Entry>,
    #[serde(default, skip_serializing)]
    parent_story_id: Option<String>,
    #[serde(default, skip_serializing)]
    parent_block_hash: Option<String>,
}

impl SerializedLedger {
    pub fn new(
        title: String,
        derivation: Option<DerivationRef>,
        chain: Vec<Entry>,
        pending: Vec<Entry>,
    ) -> Self {
        Self {
            title,
            derivation,
            chain,
            pending,
            parent_story_id: None,
            parent_block_hash: None,
        }
    }

    /// The derivation, falling back to the legacy flat pair.
    ///
    /// A legacy pair that cannot be parsed is dropped with a warning.
    pub fn effective_derivation(&self) -> Option<DerivationRef> {
        if let Some(derivation) = &self.derivation {
            return Some(derivation.clone());
        }
        let (story, hash) = match (&self.parent_story_id, &self.parent_block_hash) {
            (Some(story), Some(hash)) => (story, hash),
            _ => return None,
        };
        match DerivationRef::parse(story, hash) {
            Ok(derivation) => Some(derivation),
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable legacy parent reference");
                None
            }
        }
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(json).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}
