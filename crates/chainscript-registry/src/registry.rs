use std::collections::hash_map::{self, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chainscript_ledger::{
    DerivationRef, Entry, Ledger, LedgerError, LedgerResolver, Verification,
};
use chainscript_store::{InMemoryLedgerStore, LedgerStore};
use chainscript_types::StoryId;
use serde::Serialize;

use crate::error::{RegistryError, RegistryResult};

/// Keyed collection of story ledgers backed by a [`LedgerStore`].
pub struct LedgerRegistry {
    store: Arc<dyn LedgerStore>,
    resident: Mutex<HashMap<StoryId, Arc<Resident>>>,
}

/// A loaded ledger plus the lock that orders its saves.
///
/// Saves snapshot the ledger while holding `save_lock`, so the last save to
/// finish always writes the newest state.
struct Resident {
    ledger: Arc<Ledger>,
    save_lock: Mutex<()>,
}

impl Resident {
    fn new(ledger: Ledger) -> Arc<Self> {
        Arc::new(Self {
            ledger: Arc::new(ledger),
            save_lock: Mutex::new(()),
        })
    }
}

/// One row of the story listing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StorySummary {
    pub id: StoryId,
    pub title: String,
    pub length: usize,
    pub pending: usize,
    pub derivation: Option<DerivationRef>,
}

impl LedgerRegistry {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            store,
            resident: Mutex::new(HashMap::new()),
        }
    }

    /// A registry over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryLedgerStore::new()))
    }

    fn lock_resident(&self) -> RegistryResult<MutexGuard<'_, HashMap<StoryId, Arc<Resident>>>> {
        self.resident.lock().map_err(|_| RegistryError::LockPoisoned)
    }

    /// Find a resident story or rehydrate it from the store.
    ///
    /// The store is read without holding the registry lock, so a slow load
    /// never delays other stories. If two callers load the same story at
    /// once, the first insertion wins and the other copy is dropped.
    fn resident(&self, id: &StoryId) -> RegistryResult<Option<Arc<Resident>>> {
        if let Some(found) = self.lock_resident()?.get(id) {
            return Ok(Some(Arc::clone(found)));
        }

        let Some(serialized) = self.store.load(id)? else {
            return Ok(None);
        };
        tracing::debug!(story = %id, "rehydrating ledger from store");
        let loaded = Resident::new(Ledger::from_serialized(serialized));

        let mut resident = self.lock_resident()?;
        Ok(Some(Arc::clone(resident.entry(id.clone()).or_insert(loaded))))
    }

    fn require(&self, id: &StoryId) -> RegistryResult<Arc<Resident>> {
        self.resident(id)?
            .ok_or_else(|| RegistryError::StoryNotFound(id.clone()))
    }

    fn save(&self, id: &StoryId, resident: &Resident) -> RegistryResult<()> {
        let _guard = resident
            .save_lock
            .lock()
            .map_err(|_| RegistryError::LockPoisoned)?;
        let snapshot = resident.ledger.to_serialized()?;
        self.store
            .save(id, &snapshot)
            .map_err(|source| RegistryError::NotPersisted {
                story: id.clone(),
                source,
            })
    }

    /// Look up a story's ledger, rehydrating it if needed.
    pub fn get(&self, id: &StoryId) -> RegistryResult<Option<Arc<Ledger>>> {
        Ok(self.resident(id)?.map(|r| Arc::clone(&r.ledger)))
    }

    /// Like [`Self::get`], but a missing story is an error.
    pub fn ledger(&self, id: &StoryId) -> RegistryResult<Arc<Ledger>> {
        Ok(Arc::clone(&self.require(id)?.ledger))
    }

    /// Create a new story, optionally continuing from a passage elsewhere.
    ///
    /// The derivation is resolved before anything is inserted. Fails with
    /// `AlreadyExists` if the id is resident or already stored. The store is
    /// checked before the registry lock is taken; the insertion itself is a
    /// check-then-insert under the lock.
    pub fn create_story(
        &self,
        id: StoryId,
        title: impl Into<String>,
        derivation: Option<DerivationRef>,
    ) -> RegistryResult<Arc<Ledger>> {
        let title = title.into();
        let ledger = match derivation {
            Some(derivation) => Ledger::derived(title, derivation, self)?,
            None => Ledger::new(title),
        };

        if self.store.exists(&id)? {
            return Err(RegistryError::AlreadyExists(id));
        }

        let created = {
            let mut resident = self.lock_resident()?;
            if resident.contains_key(&id) {
                return Err(RegistryError::AlreadyExists(id));
            }
            let created = Resident::new(ledger);
            resident.insert(id.clone(), Arc::clone(&created));
            created
        };

        self.save(&id, &created)?;
        tracing::info!(story = %id, title = %created.ledger.title(), "story created");
        Ok(Arc::clone(&created.ledger))
    }

    /// Fetch a story, creating an empty one (titled after its id) if it
    /// exists nowhere yet.
    pub fn get_or_create(&self, id: &StoryId) -> RegistryResult<Arc<Ledger>> {
        if let Some(found) = self.resident(id)? {
            return Ok(Arc::clone(&found.ledger));
        }

        let (resident, fresh) = {
            let mut map = self.lock_resident()?;
            match map.entry(id.clone()) {
                hash_map::Entry::Occupied(found) => (Arc::clone(found.get()), false),
                hash_map::Entry::Vacant(slot) => {
                    let created = Resident::new(Ledger::new(id.as_str()));
                    (Arc::clone(slot.insert(created)), true)
                }
            }
        };

        if fresh {
            self.save(id, &resident)?;
            tracing::info!(story = %id, "story created on first use");
        }
        Ok(Arc::clone(&resident.ledger))
    }

    /// Every known story id, resident or stored, sorted.
    pub fn story_ids(&self) -> RegistryResult<Vec<StoryId>> {
        let mut ids = self.store.list()?;
        ids.extend(self.lock_resident()?.keys().cloned());
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Listing rows for every known story.
    pub fn summaries(&self) -> RegistryResult<Vec<StorySummary>> {
        let mut rows = Vec::new();
        for id in self.story_ids()? {
            let Some(ledger) = self.get(&id)? else {
                continue;
            };
            rows.push(StorySummary {
                title: ledger.title().to_string(),
                length: ledger.len()?,
                pending: ledger.pending_len()?,
                derivation: ledger.derivation().cloned(),
                id,
            });
        }
        Ok(rows)
    }

    /// Write a resident story back to the store.
    pub fn persist(&self, id: &StoryId) -> RegistryResult<()> {
        let resident = self.require(id)?;
        self.save(id, &resident)
    }

    /// Submit a passage to a story and persist it.
    ///
    /// A failed save is reported as `NotPersisted`. The passage is still
    /// queued in memory and goes to the store with the story's next
    /// successful save, so the caller must not submit it again.
    pub fn submit(
        &self,
        id: &StoryId,
        content: &str,
        author: &str,
        branch_source_hash: Option<String>,
    ) -> RegistryResult<Entry> {
        let resident = self.require(id)?;
        let entry = resident.ledger.submit(content, author, branch_source_hash)?;
        self.save(id, &resident)?;
        Ok(entry)
    }

    /// Cast a verification vote and persist the outcome.
    ///
    /// Failures that still changed the ledger (the vote is kept on
    /// `StaleLinkage` and `CorruptEntry`) are persisted before the error is
    /// returned.
    pub fn verify(
        &self,
        id: &StoryId,
        pending_index: usize,
        verifier: &str,
    ) -> RegistryResult<Verification> {
        let resident = self.require(id)?;
        match resident.ledger.verify(pending_index, verifier) {
            Ok(verification) => {
                self.save(id, &resident)?;
                Ok(verification)
            }
            Err(err @ (LedgerError::StaleLinkage { .. } | LedgerError::CorruptEntry { .. })) => {
                self.save(id, &resident)?;
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Re-link a stale pending passage and persist it.
    ///
    /// As with [`Self::submit`], `NotPersisted` means the re-link already
    /// happened in memory.
    pub fn resubmit(
        &self,
        id: &StoryId,
        pending_index: usize,
        author: &str,
    ) -> RegistryResult<Entry> {
        let resident = self.require(id)?;
        let entry = resident.ledger.resubmit(pending_index, author)?;
        self.save(id, &resident)?;
        Ok(entry)
    }
}

impl LedgerResolver for LedgerRegistry {
    type Error = RegistryError;

    fn resolve(&self, story_id: &StoryId) -> Result<Option<Arc<Ledger>>, RegistryError> {
        self.get(story_id)
    }
}

impl std::fmt::Debug for LedgerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerRegistry").finish_non_exhaustive()
    }
}
