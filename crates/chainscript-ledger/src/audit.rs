use chainscript_crypto::{ChainError, ContentHasher, HashChainVerifier};
use chainscript_types::ContentHash;

use crate::entry::Entry;

/// Result of auditing one ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditReport {
    pub title: String,
    pub chain_length: usize,
    pub pending_count: usize,
    /// Problems found in the committed chain, in chain order.
    pub chain_problems: Vec<ChainError>,
    /// Queue positions whose stored hash does not match their fields.
    pub corrupt_pending: Vec<usize>,
    /// Queue positions linked to something other than the current tip.
    /// These can only commit after a resubmit.
    pub stale_pending: Vec<usize>,
}

impl AuditReport {
    pub(crate) fn build(title: &str, chain: &[Entry], pending: &[Entry]) -> Self {
        let chain_problems = HashChainVerifier::audit_chain(&ContentHasher::ENTRY, chain);
        let tip = chain
            .last()
            .map(|e| e.content_hash)
            .unwrap_or_else(ContentHash::null);

        let corrupt_pending = pending
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.hash_is_valid())
            .map(|(i, _)| i)
            .collect();
        let stale_pending = pending
            .iter()
            .enumerate()
            .filter(|(_, e)| e.predecessor_hash != tip)
            .map(|(i, _)| i)
            .collect();

        Self {
            title: title.to_string(),
            chain_length: chain.len(),
            pending_count: pending.len(),
            chain_problems,
            corrupt_pending,
            stale_pending,
        }
    }

    /// Returns `true` if the committed chain and every pending hash check
    /// out. Stale pending entries are recoverable and do not count.
    pub fn is_valid(&self) -> bool {
        self.chain_problems.is_empty() && self.corrupt_pending.is_empty()
    }
}
