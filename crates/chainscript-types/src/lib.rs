//! Foundation types for ChainScript.
//!
//! This crate provides the identifier and temporal types shared by every
//! other ChainScript crate.
//!
//! # Key Types
//!
//! - [`ContentHash`] — 32-byte entry digest, rendered as hex (`"0"` for null)
//! - [`StoryId`] — Validated identifier naming one story ledger
//! - [`Timestamp`] — Wall-clock seconds since the UNIX epoch

pub mod error;
pub mod hash;
pub mod story;
pub mod temporal;

pub use error::TypeError;
pub use hash::ContentHash;
pub use story::StoryId;
pub use temporal::Timestamp;
