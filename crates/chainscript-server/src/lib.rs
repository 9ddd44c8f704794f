//! HTTP server for ChainScript.
//!
//! Exposes the story registry over a small JSON API: list and create
//! stories, read a story with its pending queue, submit passages, and cast
//! verification votes. The voter's identity comes from the bearer token.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AuthProvider, BearerIdentityAuth, Credentials, Identity};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::ChainScriptServer;
pub use state::AppState;
