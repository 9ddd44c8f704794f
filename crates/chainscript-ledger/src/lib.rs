//! Hash-linked story ledger for ChainScript.
//!
//! This crate is the heart of ChainScript. It provides:
//! - [`Entry`] passages with deterministic content hashes
//! - The per-story [`Ledger`]: submit, verify (two votes to commit),
//!   resubmit, and derived views such as [`Ledger::full_text`]
//! - Passage content rules ([`validate_content`])
//! - Story derivation references resolved through a [`LedgerResolver`]
//! - The [`SerializedLedger`] schema used by persistence backends
//! - Integrity audits ([`AuditReport`])

pub mod audit;
pub mod content;
pub mod derivation;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod snapshot;

pub use audit::AuditReport;
pub use content::{validate_content, word_count, ContentError, ContentRules};
pub use derivation::{DerivationRef, LedgerResolver};
pub use entry::{compute_content_hash, Entry, EntryFields};
pub use error::LedgerError;
pub use ledger::{Ledger, Verification, VERIFICATION_THRESHOLD};
pub use snapshot::SerializedLedger;
