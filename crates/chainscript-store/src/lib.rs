//! Ledger persistence for ChainScript.
//!
//! The ledger core never performs I/O. Callers load a story before working
//! with it and save it after a successful mutation, through the
//! [`LedgerStore`] boundary defined here.
//!
//! # Storage Backends
//!
//! - [`InMemoryLedgerStore`] -- `HashMap`-based store for tests and ephemeral servers
//! - [`FileLedgerStore`] -- one JSON document per story in a directory
//!
//! # Design Rules
//!
//! 1. The store never interprets ledger contents beyond (de)serialization.
//! 2. Saves replace the whole document; a reader never sees a partial write.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileLedgerStore;
pub use memory::InMemoryLedgerStore;
pub use traits::LedgerStore;
