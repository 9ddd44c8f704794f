use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chainscript_crypto::{ContentHasher, HashChainVerifier};
use chainscript_types::{ContentHash, Timestamp};

use crate::audit::AuditReport;
use crate::content::validate_content;
use crate::derivation::{DerivationRef, LedgerResolver};
use crate::entry::Entry;
use crate::error::LedgerError;
use crate::snapshot::SerializedLedger;

/// Votes a pending entry needs before it is committed.
pub const VERIFICATION_THRESHOLD: u32 = 2;

/// The hash-linked passage chain of one story, plus its pending queue.
///
/// All mutation goes through the ledger's own lock, so `submit`, `verify`
/// and `resubmit` are serialized per story while independent stories never
/// contend. Committed entries are never edited or removed.
pub struct Ledger {
    title: String,
    derivation: Option<DerivationRef>,
    inner: RwLock<LedgerState>,
}

struct LedgerState {
    chain: Vec<Entry>,
    pending: Vec<Entry>,
}

impl LedgerState {
    fn tip(&self) -> Result<&Entry, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    fn pending_at(&self, index: usize) -> Result<&Entry, LedgerError> {
        self.pending.get(index).ok_or(LedgerError::NotFound {
            index,
            pending: self.pending.len(),
        })
    }
}

/// Result of a successful [`Ledger::verify`] call.
#[derive(Clone, Debug, PartialEq)]
pub enum Verification {
    /// The vote was counted; the entry is still pending.
    Recorded { votes: u32, entry: Entry },
    /// The vote reached the threshold and the entry joined the chain.
    Committed { entry: Entry },
}

impl Verification {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    pub fn entry(&self) -> &Entry {
        match self {
            Self::Recorded { entry, .. } | Self::Committed { entry } => entry,
        }
    }

    /// Human-readable progress line.
    pub fn message(&self) -> String {
        match self {
            Self::Recorded { votes, .. } => {
                format!("{votes}/{VERIFICATION_THRESHOLD} verifications")
            }
            Self::Committed { entry } => format!(
                "passage committed to the chain at position {}",
                entry.sequence_index
            ),
        }
    }
}

impl Ledger {
    /// Create a story holding only its genesis entry.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_parts(
            title.into(),
            None,
            vec![Entry::genesis(Timestamp::now())],
            Vec::new(),
        )
    }

    /// Create a story that continues from a passage in another story.
    ///
    /// The derivation must resolve against a committed entry of the source
    /// story; otherwise `ParentStoryNotFound` or `ParentEntryNotFound` is
    /// returned and no ledger is built.
    pub fn derived<R: LedgerResolver>(
        title: impl Into<String>,
        derivation: DerivationRef,
        resolver: &R,
    ) -> Result<Self, R::Error> {
        derivation.resolve(resolver)?;
        let ledger = Self::with_parts(
            title.into(),
            Some(derivation),
            vec![Entry::genesis(Timestamp::now())],
            Vec::new(),
        );
        tracing::info!(
            title = %ledger.title,
            source = %ledger.derivation.as_ref().map(|d| d.source_ledger_id.to_string()).unwrap_or_default(),
            "derived story created"
        );
        Ok(ledger)
    }

    /// Rebuild a ledger from its serialized form.
    ///
    /// An empty chain is replaced by a fresh genesis entry. Committed flags
    /// are normalized from position (chain vs. queue). The chain is audited
    /// and any problems are logged; loading never fails on them.
    pub fn from_serialized(serialized: SerializedLedger) -> Self {
        let derivation = serialized.effective_derivation();
        let SerializedLedger {
            title,
            mut chain,
            mut pending,
            ..
        } = serialized;

        if chain.is_empty() {
            chain.push(Entry::genesis(Timestamp::now()));
        }
        for entry in &mut chain {
            entry.committed = true;
        }
        for entry in &mut pending {
            entry.committed = false;
        }

        let problems = HashChainVerifier::audit_chain(&ContentHasher::ENTRY, &chain);
        for problem in &problems {
            tracing::warn!(title = %title, %problem, "integrity problem in rehydrated ledger");
        }

        Self::with_parts(title, derivation, chain, pending)
    }

    fn with_parts(
        title: String,
        derivation: Option<DerivationRef>,
        chain: Vec<Entry>,
        pending: Vec<Entry>,
    ) -> Self {
        Self {
            title,
            derivation,
            inner: RwLock::new(LedgerState { chain, pending }),
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn derivation(&self) -> Option<&DerivationRef> {
        self.derivation.as_ref()
    }

    /// Queue a new passage for verification, linked to the current tip.
    ///
    /// Only author and content emptiness are checked here; content rules
    /// are applied when the passage is verified. An empty
    /// `branch_source_hash` is treated as absent.
    pub fn submit(
        &self,
        content: &str,
        author: &str,
        branch_source_hash: Option<String>,
    ) -> Result<Entry, LedgerError> {
        if content.trim().is_empty() {
            return Err(LedgerError::InvalidInput("content must not be empty".into()));
        }
        if author.trim().is_empty() {
            return Err(LedgerError::InvalidInput("author must not be empty".into()));
        }
        let branch_source_hash = branch_source_hash.filter(|h| !h.trim().is_empty());

        let mut state = self.write_state()?;
        let tip = state.tip()?;
        let entry = Entry::pending(
            state.chain.len() as u64,
            content,
            author,
            tip.content_hash,
            branch_source_hash,
            Timestamp::now(),
        );
        state.pending.push(entry.clone());

        tracing::debug!(
            title = %self.title,
            seq = entry.sequence_index,
            hash = %entry.content_hash.short_hex(),
            author,
            "passage submitted"
        );
        Ok(entry)
    }

    /// Cast one verification vote for the pending entry at `pending_index`.
    ///
    /// The whole transition runs under the ledger's write lock:
    /// 1. the index must exist (`NotFound`);
    /// 2. content rules are re-checked on every vote (`ValidationFailed`,
    ///    no vote recorded);
    /// 3. the vote is counted and kept even if a later check fails;
    /// 4. below the threshold the entry stays pending;
    /// 5. at the threshold the stored hash is re-derived (`CorruptEntry`)
    ///    and the predecessor must still be the tip (`StaleLinkage`), after
    ///    which the entry is committed and removed from the queue.
    pub fn verify(&self, pending_index: usize, verifier: &str) -> Result<Verification, LedgerError> {
        let mut state = self.write_state()?;

        let candidate = state.pending_at(pending_index)?;
        validate_content(&candidate.content)?;

        let entry = &mut state.pending[pending_index];
        entry.vote_count = entry.vote_count.saturating_add(1);
        let votes = entry.vote_count;
        tracing::debug!(
            title = %self.title,
            seq = entry.sequence_index,
            votes,
            verifier,
            "verification vote recorded"
        );

        if votes < VERIFICATION_THRESHOLD {
            return Ok(Verification::Recorded {
                votes,
                entry: entry.clone(),
            });
        }

        let entry = &state.pending[pending_index];
        let computed = entry.recompute_hash();
        if computed != entry.content_hash {
            tracing::error!(
                title = %self.title,
                seq = entry.sequence_index,
                stored = %entry.content_hash,
                %computed,
                "pending entry hash does not match its fields"
            );
            return Err(LedgerError::CorruptEntry {
                seq: entry.sequence_index,
                stored: entry.content_hash,
                computed,
            });
        }

        let tip = state.tip()?.content_hash;
        if entry.predecessor_hash != tip {
            tracing::warn!(
                title = %self.title,
                seq = entry.sequence_index,
                linked = %entry.predecessor_hash.short_hex(),
                tip = %tip.short_hex(),
                "pending entry links to a superseded tip"
            );
            return Err(LedgerError::StaleLinkage {
                linked: entry.predecessor_hash,
                tip,
            });
        }

        // The write lock has been held since the index was checked, so it
        // still names this entry even if another entry shares its hash.
        let mut committed = state.pending.remove(pending_index);
        committed.committed = true;
        state.chain.push(committed.clone());

        tracing::info!(
            title = %self.title,
            seq = committed.sequence_index,
            hash = %committed.content_hash.short_hex(),
            author = %committed.author,
            "passage committed"
        );
        Ok(Verification::Committed { entry: committed })
    }

    /// Re-link a stale pending entry to the current tip.
    ///
    /// This is an explicit recovery path for entries that failed with
    /// `StaleLinkage`: the passage is rebuilt against the tip with a fresh
    /// timestamp and zero votes, in the same queue position. Only the
    /// original author may do this, and only for an entry that is actually
    /// stale.
    pub fn resubmit(&self, pending_index: usize, author: &str) -> Result<Entry, LedgerError> {
        let mut state = self.write_state()?;

        let tip = state.tip()?.content_hash;
        let next_seq = state.chain.len() as u64;
        let stale = state.pending_at(pending_index)?;

        if stale.author != author {
            return Err(LedgerError::InvalidInput(
                "only the original author may resubmit a passage".into(),
            ));
        }
        if stale.predecessor_hash == tip && stale.sequence_index == next_seq {
            return Err(LedgerError::InvalidInput(
                "passage is already linked to the current tip".into(),
            ));
        }

        let relinked = Entry::pending(
            next_seq,
            stale.content.clone(),
            stale.author.clone(),
            tip,
            stale.branch_source_hash.clone(),
            Timestamp::now(),
        );
        tracing::info!(
            title = %self.title,
            old = %stale.content_hash.short_hex(),
            new = %relinked.content_hash.short_hex(),
            "stale passage resubmitted"
        );
        state.pending[pending_index] = relinked.clone();
        Ok(relinked)
    }

    /// The most recently committed entry.
    pub fn tip(&self) -> Result<Entry, LedgerError> {
        self.read_state()?.tip().cloned()
    }

    /// Snapshot of the committed chain, genesis first.
    pub fn committed(&self) -> Result<Vec<Entry>, LedgerError> {
        Ok(self.read_state()?.chain.clone())
    }

    /// Snapshot of the pending queue, in submission order.
    pub fn pending(&self) -> Result<Vec<Entry>, LedgerError> {
        Ok(self.read_state()?.pending.clone())
    }

    pub fn pending_entry(&self, index: usize) -> Result<Entry, LedgerError> {
        self.read_state()?.pending_at(index).cloned()
    }

    /// Number of committed entries, genesis included.
    pub fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.read_state()?.chain.len())
    }

    pub fn pending_len(&self) -> Result<usize, LedgerError> {
        Ok(self.read_state()?.pending.len())
    }

    /// Look up a committed entry by its hash.
    pub fn find_committed(&self, hash: &ContentHash) -> Result<Option<Entry>, LedgerError> {
        Ok(self
            .read_state()?
            .chain
            .iter()
            .find(|e| e.content_hash == *hash)
            .cloned())
    }

    /// The story so far: committed passages in order, separated by a blank
    /// line. Recomputed on every call.
    pub fn full_text(&self) -> Result<String, LedgerError> {
        let state = self.read_state()?;
        Ok(state
            .chain
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// Integrity report over the committed chain and the pending queue.
    pub fn audit(&self) -> Result<AuditReport, LedgerError> {
        let state = self.read_state()?;
        Ok(AuditReport::build(&self.title, &state.chain, &state.pending))
    }

    /// Serialized form for the persistence collaborator.
    pub fn to_serialized(&self) -> Result<SerializedLedger, LedgerError> {
        let state = self.read_state()?;
        Ok(SerializedLedger::new(
            self.title.clone(),
            self.derivation.clone(),
            state.chain.clone(),
            state.pending.clone(),
        ))
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("title", &self.title)
            .field("derivation", &self.derivation)
            .finish_non_exhaustive()
    }
}
