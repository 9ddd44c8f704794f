//! Story registry for ChainScript.
//!
//! A [`LedgerRegistry`] owns the resident ledgers of a process, keyed by
//! [`StoryId`](chainscript_types::StoryId). It is an ordinary value:
//! construct one at startup and hand it to whoever needs it, or build an
//! isolated one per test.
//!
//! Stories not yet resident are rehydrated from the registry's
//! [`LedgerStore`](chainscript_store::LedgerStore) on first access, and
//! every successful mutation made through the registry is written back.
//! The registry also resolves story derivations
//! ([`LedgerResolver`](chainscript_ledger::LedgerResolver)).

pub mod error;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use registry::{LedgerRegistry, StorySummary};
