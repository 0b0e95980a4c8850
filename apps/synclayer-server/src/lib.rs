//! SyncLayer Server Library
//!
//! In-memory push/pull sync backend for offline-first clients.
//! The server binary is in main.rs; the modules are exposed for
//! integration tests.
//!
//! # Modules
//!
//! - `sync`: Record store, wire types and timestamp handling
//! - `routes`: HTTP endpoints (`/sync`, `/health`, `/debug`)
//! - `state`: Shared application state owning the store

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod sync;

pub use config::Config;
pub use routes::app;
pub use state::AppState;
