use chainscript_types::ContentHash;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"chainscript-entry-v1"`) that is
/// prepended to every hash computation, so an entry digest can never be
/// confused with a digest of the same bytes produced for another purpose.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for ledger entries.
    pub const ENTRY: Self = Self {
        domain: "chainscript-entry-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ContentHash::from_hash(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &ContentHash) -> bool {
        self.hash(data) == *expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"once upon a time";
        assert_eq!(ContentHasher::ENTRY.hash(data), ContentHasher::ENTRY.hash(data));
    }

    #[test]
    fn domain_tag_is_part_of_the_digest() {
        let data = b"same content";
        let untagged = ContentHash::from_hash(*blake3::hash(data).as_bytes());
        assert_ne!(ContentHasher::ENTRY.hash(data), untagged);

        let mut tagged = b"chainscript-entry-v1:".to_vec();
        tagged.extend_from_slice(data);
        let expected = ContentHash::from_hash(*blake3::hash(&tagged).as_bytes());
        assert_eq!(ContentHasher::ENTRY.hash(data), expected);
    }

    #[test]
    fn hash_is_never_null() {
        assert!(!ContentHasher::ENTRY.hash(b"").is_null());
    }

    #[test]
    fn verify_correct_and_tampered_data() {
        let id = ContentHasher::ENTRY.hash(b"original");
        assert!(ContentHasher::ENTRY.verify(b"original", &id));
        assert!(!ContentHasher::ENTRY.verify(b"tampered", &id));
    }
}
