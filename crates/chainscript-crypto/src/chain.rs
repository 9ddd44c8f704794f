use chainscript_types::ContentHash;

use crate::hasher::ContentHasher;

/// An object that occupies one position in a hash chain.
pub trait ChainLink {
    /// Position within the chain, starting at 0 for genesis.
    fn sequence(&self) -> u64;
    /// The link's own stored hash.
    fn content_hash(&self) -> ContentHash;
    /// The hash of the link before it (null for genesis).
    fn predecessor_hash(&self) -> ContentHash;
    /// Canonical payload bytes the stored hash was computed from.
    fn payload_bytes(&self) -> Vec<u8>;
}

/// Hash chain integrity verifier.
///
/// Checks that a sequence of links forms a valid hash chain:
/// each link's predecessor hash matches the previous link's hash,
/// sequence numbers are contiguous from 0, and each stored hash is
/// correctly computed from its payload.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Check every link and collect all problems in chain order.
    ///
    /// Checks:
    /// 1. The first link has a null predecessor
    /// 2. Sequence numbers count up from 0 without gaps
    /// 3. Each subsequent predecessor hash matches the previous link's hash
    /// 4. Each stored hash is correct for its payload
    pub fn audit_chain(hasher: &ContentHasher, links: &[impl ChainLink]) -> Vec<ChainError> {
        let mut problems = Vec::new();

        for (index, link) in links.iter().enumerate() {
            if link.sequence() != index as u64 {
                problems.push(ChainError::SequenceGap {
                    index,
                    found: link.sequence(),
                });
            }

            if index == 0 {
                if !link.predecessor_hash().is_null() {
                    problems.push(ChainError::GenesisHasPredecessor);
                }
            } else if link.predecessor_hash() != links[index - 1].content_hash() {
                problems.push(ChainError::BrokenLink { index });
            }

            if !Self::verify_link(hasher, link) {
                problems.push(ChainError::HashMismatch { index });
            }
        }

        problems
    }

    /// Recompute a single link's hash from its payload and compare.
    fn verify_link(hasher: &ContentHasher, link: &impl ChainLink) -> bool {
        hasher.verify(&link.payload_bytes(), &link.content_hash())
    }
}

/// Errors from chain verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis entry has a predecessor (should be \"0\")")]
    GenesisHasPredecessor,

    #[error("sequence gap at index {index}: found sequence {found}")]
    SequenceGap { index: usize, found: u64 },

    #[error("broken link at index {index}: predecessor hash does not match")]
    BrokenLink { index: usize },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestLink {
        seq: u64,
        hash: ContentHash,
        prev: ContentHash,
        payload: Vec<u8>,
    }

    impl ChainLink for TestLink {
        fn sequence(&self) -> u64 {
            self.seq
        }
        fn content_hash(&self) -> ContentHash {
            self.hash
        }
        fn predecessor_hash(&self) -> ContentHash {
            self.prev
        }
        fn payload_bytes(&self) -> Vec<u8> {
            let mut bytes = self.prev.to_hex().into_bytes();
            bytes.extend_from_slice(&self.payload);
            bytes
        }
    }

    fn build_chain(count: usize) -> Vec<TestLink> {
        let mut chain: Vec<TestLink> = Vec::new();
        let mut prev = ContentHash::null();

        for i in 0..count {
            let mut link = TestLink {
                seq: i as u64,
                hash: ContentHash::null(),
                prev,
                payload: format!("passage-{i}").into_bytes(),
            };
            link.hash = ContentHasher::ENTRY.hash(&link.payload_bytes());
            prev = link.hash;
            chain.push(link);
        }

        chain
    }

    fn rehash(link: &mut TestLink) {
        link.hash = ContentHasher::ENTRY.hash(&link.payload_bytes());
    }

    #[test]
    fn empty_chain_is_valid() {
        let chain: Vec<TestLink> = vec![];
        assert!(HashChainVerifier::audit_chain(&ContentHasher::ENTRY, &chain).is_empty());
    }

    #[test]
    fn multi_link_chain() {
        let chain = build_chain(10);
        assert!(HashChainVerifier::audit_chain(&ContentHasher::ENTRY, &chain).is_empty());
    }

    #[test]
    fn genesis_with_predecessor_fails() {
        let mut chain = build_chain(1);
        chain[0].prev = ContentHash::from_hash([1; 32]);
        rehash(&mut chain[0]);
        let problems = HashChainVerifier::audit_chain(&ContentHasher::ENTRY, &chain);
        assert_eq!(problems[0], ChainError::GenesisHasPredecessor);
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].prev = ContentHash::from_hash([99; 32]);
        rehash(&mut chain[2]);
        let problems = HashChainVerifier::audit_chain(&ContentHasher::ENTRY, &chain);
        assert_eq!(problems[0], ChainError::BrokenLink { index: 2 });
    }

    #[test]
    fn sequence_gap_detected() {
        let mut chain = build_chain(3);
        chain[1].seq = 5;
        let problems = HashChainVerifier::audit_chain(&ContentHasher::ENTRY, &chain);
        assert_eq!(problems[0], ChainError::SequenceGap { index: 1, found: 5 });
    }

    #[test]
    fn tampered_payload_detected() {
        let mut chain = build_chain(3);
        chain[1].payload = b"tampered".to_vec();
        let problems = HashChainVerifier::audit_chain(&ContentHasher::ENTRY, &chain);
        assert_eq!(problems[0], ChainError::HashMismatch { index: 1 });
    }

    #[test]
    fn audit_collects_every_problem() {
        let mut chain = build_chain(4);
        chain[1].payload = b"tampered".to_vec();
        chain[3].prev = ContentHash::from_hash([7; 32]);
        rehash(&mut chain[3]);

        let problems = HashChainVerifier::audit_chain(&ContentHasher::ENTRY, &chain);
        assert_eq!(
            problems,
            vec![
                ChainError::HashMismatch { index: 1 },
                ChainError::BrokenLink { index: 3 },
            ]
        );
    }
}
