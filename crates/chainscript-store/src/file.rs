//! Directory-backed ledger store.
//!
//! Each story lives in `<root>/<story_id>.json`. Writes go to a temporary
//! file in the same directory which is then renamed over the target, so a
//! crash mid-save leaves the previous document intact.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chainscript_ledger::SerializedLedger;
use chainscript_types::StoryId;
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};
use crate::traits::LedgerStore;

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    root: PathBuf,
}

impl FileLedgerStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, story_id: &StoryId) -> PathBuf {
        self.root.join(format!("{story_id}.{EXTENSION}"))
    }
}

impl LedgerStore for FileLedgerStore {
    fn load(&self, story_id: &StoryId) -> StoreResult<Option<SerializedLedger>> {
        let raw = match fs::read_to_string(self.path_for(story_id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let ledger = serde_json::from_str(&raw).map_err(|e| StoreError::CorruptDocument {
            story: story_id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(ledger))
    }

    fn save(&self, story_id: &StoryId, ledger: &SerializedLedger) -> StoreResult<()> {
        let encoded = serde_json::to_vec_pretty(ledger)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(story_id))
            .map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!(story = %story_id, bytes = encoded.len(), "ledger saved");
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<StoryId>> {
        let mut ids = Vec::new();
        for dirent in fs::read_dir(&self.root)? {
            let path = dirent?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match StoryId::new(stem) {
                Ok(id) => ids.push(id),
                Err(err) => tracing::debug!(%err, "skipping unrecognized file in ledger directory"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use chainscript_ledger::Ledger;

    use super::*;

    fn story(id: &str) -> StoryId {
        StoryId::new(id).unwrap()
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(dir.path()).unwrap();
        let ledger = Ledger::new("Tale");
        ledger.submit("a pending passage", "alice", None).unwrap();
        let doc = ledger.to_serialized().unwrap();

        store.save(&story("tale"), &doc).unwrap();

        assert!(dir.path().join("tale.json").exists());
        assert_eq!(store.load(&story("tale")).unwrap(), Some(doc));
    }

    #[test]
    fn missing_story_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(dir.path()).unwrap();
        assert_eq!(store.load(&story("nope")).unwrap(), None);
    }

    #[test]
    fn open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileLedgerStore::open(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.root(), nested.as_path());
    }

    #[test]
    fn corrupt_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("broken.json"), b"{ not json").unwrap();

        let err = store.load(&story("broken")).unwrap_err();
        assert!(matches!(err, StoreError::CorruptDocument { story: s, .. } if s.as_str() == "broken"));
    }

    #[test]
    fn legacy_document_loads_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(dir.path()).unwrap();
        fs::write(
            dir.path().join("old.json"),
            br#"{"parent_story_id": null, "parent_block_hash": null}"#,
        )
        .unwrap();

        let doc = store.load(&story("old")).unwrap().unwrap();
        assert!(doc.chain.is_empty());
        assert!(doc.pending.is_empty());
        assert!(doc.effective_derivation().is_none());
    }

    #[test]
    fn list_skips_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(dir.path()).unwrap();
        let doc = SerializedLedger::default();
        store.save(&story("beta"), &doc).unwrap();
        store.save(&story("alpha"), &doc).unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        fs::write(dir.path().join("bad id.json"), b"{}").unwrap();

        assert_eq!(store.list().unwrap(), vec![story("alpha"), story("beta")]);
    }

    #[test]
    fn save_overwrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLedgerStore::open(dir.path()).unwrap();
        let ledger = Ledger::new("Tale");
        store.save(&story("tale"), &ledger.to_serialized().unwrap()).unwrap();

        ledger.submit("another passage", "bob", None).unwrap();
        store.save(&story("tale"), &ledger.to_serialized().unwrap()).unwrap();

        let loaded = store.load(&story("tale")).unwrap().unwrap();
        assert_eq!(loaded.pending.len(), 1);
        // Only the document itself remains; no temporary files linger.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
