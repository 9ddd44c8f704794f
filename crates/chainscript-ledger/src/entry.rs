use chainscript_crypto::{ChainLink, ContentHasher};
use chainscript_types::{ContentHash, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Text of the genesis passage every story starts with.
pub const GENESIS_CONTENT: &str =
    "Welcome to ChainScript. This is the beginning of our collaborative story.";
/// Author recorded on the genesis passage.
pub const GENESIS_AUTHOR: &str = "System";

/// One passage, pending or committed.
///
/// `content_hash` is derived from the other hashed fields (see
/// [`EntryFields`]); `committed` and `vote_count` are bookkeeping and do not
/// participate in the digest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub sequence_index: u64,
    pub content: String,
    pub author: String,
    pub predecessor_hash: ContentHash,
    #[serde(default)]
    pub branch_source_hash: Option<String>,
    pub created_at: Timestamp,
    pub content_hash: ContentHash,
    #[serde(default)]
    pub committed: bool,
    #[serde(default)]
    pub vote_count: u32,
}

/// The hashed fields of an entry, borrowed.
#[derive(Clone, Copy, Debug)]
pub struct EntryFields<'a> {
    pub sequence_index: u64,
    pub content: &'a str,
    pub author: &'a str,
    pub predecessor_hash: ContentHash,
    pub branch_source_hash: Option<&'a str>,
    pub created_at: Timestamp,
}

impl EntryFields<'_> {
    /// Canonical encoding: compact JSON with keys in ascending order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        json!({
            "author": self.author,
            "branch_source_hash": self.branch_source_hash,
            "content": self.content,
            "created_at": self.created_at.as_secs(),
            "predecessor_hash": self.predecessor_hash.to_hex(),
            "sequence_index": self.sequence_index,
        })
        .to_string()
        .into_bytes()
    }
}

/// Digest of an entry's hashed fields.
pub fn compute_content_hash(fields: &EntryFields<'_>) -> ContentHash {
    ContentHasher::ENTRY.hash(&fields.canonical_bytes())
}

impl Entry {
    /// Build an uncommitted entry with no votes and its hash filled in.
    pub fn pending(
        sequence_index: u64,
        content: impl Into<String>,
        author: impl Into<String>,
        predecessor_hash: ContentHash,
        branch_source_hash: Option<String>,
        created_at: Timestamp,
    ) -> Self {
        let mut entry = Self {
            sequence_index,
            content: content.into(),
            author: author.into(),
            predecessor_hash,
            branch_source_hash,
            created_at,
            content_hash: ContentHash::null(),
            committed: false,
            vote_count: 0,
        };
        entry.content_hash = entry.recompute_hash();
        entry
    }

    /// The pre-committed first entry of a story.
    pub fn genesis(created_at: Timestamp) -> Self {
        let mut entry = Self::pending(
            0,
            GENESIS_CONTENT,
            GENESIS_AUTHOR,
            ContentHash::null(),
            None,
            created_at,
        );
        entry.committed = true;
        entry.vote_count = 1;
        entry
    }

    pub fn fields(&self) -> EntryFields<'_> {
        EntryFields {
            sequence_index: self.sequence_index,
            content: &self.content,
            author: &self.author,
            predecessor_hash: self.predecessor_hash,
            branch_source_hash: self.branch_source_hash.as_deref(),
            created_at: self.created_at,
        }
    }

    /// Digest of the current field values, ignoring the stored hash.
    pub fn recompute_hash(&self) -> ContentHash {
        compute_content_hash(&self.fields())
    }

    /// Returns `true` if the stored hash matches the fields.
    pub fn hash_is_valid(&self) -> bool {
        self.recompute_hash() == self.content_hash
    }
}

impl ChainLink for Entry {
    fn sequence(&self) -> u64 {
        self.sequence_index
    }

    fn content_hash(&self) -> ContentHash {
        self.content_hash
    }

    fn predecessor_hash(&self) -> ContentHash {
        self.predecessor_hash
    }

    fn payload_bytes(&self) -> Vec<u8> {
        self.fields().canonical_bytes()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn sample() -> Entry {
        Entry::pending(
            1,
            "The lighthouse keeper counted the ships.",
            "alice",
            ContentHash::from_hash([3; 32]),
            None,
            Timestamp::from_secs(1_700_000_000.5),
        )
    }

    #[test]
    fn genesis_shape() {
        let genesis = Entry::genesis(Timestamp::from_secs(1.0));
        assert_eq!(genesis.sequence_index, 0);
        assert!(genesis.predecessor_hash.is_null());
        assert!(genesis.committed);
        assert_eq!(genesis.vote_count, 1);
        assert_eq!(genesis.author, GENESIS_AUTHOR);
        assert!(genesis.hash_is_valid());
    }

    #[test]
    fn pending_entries_start_unverified() {
        let entry = sample();
        assert!(!entry.committed);
        assert_eq!(entry.vote_count, 0);
        assert!(entry.hash_is_valid());
    }

    #[test]
    fn canonical_encoding_sorts_keys() {
        let bytes = sample().fields().canonical_bytes();
        let text = String::from_utf8(bytes).unwrap();
        let order = [
            "\"author\"",
            "\"branch_source_hash\"",
            "\"content\"",
            "\"created_at\"",
            "\"predecessor_hash\"",
            "\"sequence_index\"",
        ];
        let positions: Vec<usize> = order.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
        assert!(text.contains("\"branch_source_hash\":null"));
    }

    #[test]
    fn hash_is_deterministic() {
        let a = sample();
        let b = sample();
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn bookkeeping_fields_do_not_affect_hash() {
        let mut entry = sample();
        entry.vote_count = 7;
        entry.committed = true;
        assert!(entry.hash_is_valid());
    }

    #[test]
    fn each_hashed_field_changes_the_digest() {
        let base = sample();
        let original = base.content_hash;

        let mut e = base.clone();
        e.sequence_index += 1;
        assert_ne!(e.recompute_hash(), original);

        let mut e = base.clone();
        e.content.push('!');
        assert_ne!(e.recompute_hash(), original);

        let mut e = base.clone();
        e.author = "mallory".into();
        assert_ne!(e.recompute_hash(), original);

        let mut e = base.clone();
        e.predecessor_hash = ContentHash::from_hash([4; 32]);
        assert_ne!(e.recompute_hash(), original);

        let mut e = base.clone();
        e.branch_source_hash = Some("elsewhere".into());
        assert_ne!(e.recompute_hash(), original);

        let mut e = base;
        e.created_at = Timestamp::from_secs(1_700_000_001.5);
        assert_ne!(e.recompute_hash(), original);
    }

    #[test]
    fn chain_link_payload_matches_stored_hash() {
        let entry = sample();
        assert!(ContentHasher::ENTRY.verify(&entry.payload_bytes(), &entry.content_hash));
    }

    #[test]
    fn serde_keeps_every_field() {
        let mut entry = sample();
        entry.branch_source_hash = Some("abc".into());
        entry.vote_count = 1;
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["predecessor_hash"], ContentHash::from_hash([3; 32]).to_hex());
        assert_eq!(json["vote_count"], 1);
        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn missing_bookkeeping_fields_default() {
        let json = serde_json::json!({
            "sequence_index": 0,
            "content": "x",
            "author": "a",
            "predecessor_hash": "0",
            "created_at": 1.0,
            "content_hash": "0",
        });
        let entry: Entry = serde_json::from_value(json).unwrap();
        assert!(!entry.committed);
        assert_eq!(entry.vote_count, 0);
        assert_eq!(entry.branch_source_hash, None);
    }

    proptest! {
        #[test]
        fn content_edits_change_the_digest(content in ".{1,64}", extra in "[a-z]{1,8}") {
            let a = Entry::pending(
                3, content.clone(), "bob", ContentHash::null(), None, Timestamp::from_secs(5.0),
            );
            let b = Entry::pending(
                3, format!("{content}{extra}"), "bob", ContentHash::null(), None, Timestamp::from_secs(5.0),
            );
            prop_assert_ne!(a.content_hash, b.content_hash);
        }

        #[test]
        fn equal_fields_hash_equally(content in ".{0,64}", secs in 0.0f64..2.0e9) {
            let a = Entry::pending(1, content.clone(), "c", ContentHash::null(), None, Timestamp::from_secs(secs));
            let b = Entry::pending(1, content, "c", ContentHash::null(), None, Timestamp::from_secs(secs));
            prop_assert_eq!(a.content_hash, b.content_hash);
        }
    }
}
