//! Sync module for push/pull record synchronization
//!
//! Provides:
//! - Per-collection record storage with version counters
//! - Incremental pulls filtered by client timestamps
//! - Optional deletion tombstones
//!
//! # Sync Protocol
//!
//! 1. Client pushes a record (`recordId`, `data`, `timestamp`)
//! 2. Server stores it unconditionally and returns the new version
//! 3. Client pulls records with `updatedAt` later than its last sync
//! 4. Deletes remove the record; with tombstones enabled they are also
//!    reported to pulls made after the delete
//!
//! # Conflict Resolution
//!
//! None: the last push to arrive wins and the version is incremented.

mod store;
mod timestamp;
mod types;

pub use store::SyncStore;
pub use timestamp::now_iso;
pub use types::{
    DeleteResponse, PullQuery, PullResponse, PushRequest, PushResponse, SyncRecord, Tombstone,
};
