//! In-memory sync store
//!
//! Records live in per-collection maps, each behind its own lock:
//! - Push reads and bumps the version under one write guard
//! - Collections are created lazily on first access and never dropped
//! - Optional tombstones let incremental pulls learn about deletes

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use super::timestamp::{is_after, parse_timestamp};
use super::types::{record_key, PullResponse, SyncRecord, Tombstone};

// ============================================================================
// Store
// ============================================================================

/// Process-wide record store, shared by handle
#[derive(Clone)]
pub struct SyncStore {
    inner: Arc<SyncStoreInner>,
}

struct SyncStoreInner {
    /// Collections indexed by name
    collections: RwLock<HashMap<String, Arc<RwLock<Collection>>>>,

    /// How long tombstones are retained (`None` = tombstones disabled)
    tombstone_retention: Option<Duration>,
}

#[derive(Default)]
struct Collection {
    records: HashMap<String, SyncRecord>,
    tombstones: HashMap<String, DateTime<Utc>>,
}

impl SyncStore {
    /// Create a store without tombstones
    pub fn new() -> Self {
        Self::with_tombstone_retention(None)
    }

    /// Create a store that keeps deletion tombstones for `retention`
    pub fn with_tombstone_retention(retention: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(SyncStoreInner {
                collections: RwLock::new(HashMap::new()),
                tombstone_retention: retention,
            }),
        }
    }

    /// Whether deletes leave tombstones behind
    pub fn tombstones_enabled(&self) -> bool {
        self.inner.tombstone_retention.is_some()
    }

    /// Get or lazily create a collection
    async fn collection(&self, name: &str) -> Arc<RwLock<Collection>> {
        {
            let collections = self.inner.collections.read().await;
            if let Some(collection) = collections.get(name) {
                return collection.clone();
            }
        }

        let mut collections = self.inner.collections.write().await;
        collections.entry(name.to_string()).or_default().clone()
    }

    // ========================================================================
    // Sync Operations
    // ========================================================================

    /// Create or overwrite a record.
    ///
    /// Last writer wins: no comparison against the stored timestamp or
    /// version is made. The id and timestamp are not validated; the record
    /// is keyed by [`record_key`]. Returns the record as stored.
    pub async fn push(
        &self,
        collection: &str,
        record_id: impl Into<Value>,
        data: Value,
        updated_at: Option<Value>,
    ) -> SyncRecord {
        let record_id = record_id.into();
        let key = record_key(&record_id);

        let handle = self.collection(collection).await;
        let mut guard = handle.write().await;
        let coll = &mut *guard;

        coll.tombstones.remove(&key);

        let record = match coll.records.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().overwrite(record_id, data, updated_at);
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry
                .insert(SyncRecord::new(record_id, data, updated_at))
                .clone(),
        };

        tracing::info!(
            collection = %collection,
            record_id = %key,
            version = record.version,
            "Push"
        );

        record
    }

    /// Return records changed after `since`, or every record when omitted.
    ///
    /// An empty `since` counts as omitted. An unparseable `since` matches
    /// nothing. Order is unspecified.
    pub async fn pull(&self, collection: &str, since: Option<&str>) -> PullResponse {
        let since = since.map(str::trim).filter(|s| !s.is_empty());

        tracing::info!(
            collection = %collection,
            since = since.unwrap_or("beginning"),
            "Pull"
        );

        let handle = self.collection(collection).await;

        let response = match since {
            None => {
                let coll = handle.read().await;
                PullResponse {
                    records: coll.records.values().cloned().collect(),
                    deleted: Vec::new(),
                }
            }
            Some(raw) => match parse_timestamp(raw) {
                Some(since) => {
                    if self.tombstones_enabled() {
                        self.prune_collection(&handle, Utc::now()).await;
                    }

                    let coll = handle.read().await;
                    PullResponse {
                        records: coll
                            .records
                            .values()
                            .filter(|r| is_after(r.updated_at.as_ref(), &since))
                            .cloned()
                            .collect(),
                        deleted: coll
                            .tombstones
                            .iter()
                            .filter(|(_, deleted_at)| **deleted_at > since)
                            .map(|(id, deleted_at)| Tombstone {
                                record_id: id.clone(),
                                deleted_at: *deleted_at,
                            })
                            .collect(),
                    }
                }
                None => {
                    tracing::warn!(
                        collection = %collection,
                        since = %raw,
                        "Unparseable since timestamp, returning no records"
                    );
                    PullResponse::default()
                }
            },
        };

        tracing::info!(
            collection = %collection,
            count = response.records.len(),
            deleted = response.deleted.len(),
            "Pull returning records"
        );

        response
    }

    /// Remove a record. Idempotent; returns whether it existed.
    pub async fn delete(&self, collection: &str, record_id: &str) -> bool {
        let handle = self.collection(collection).await;
        let mut coll = handle.write().await;

        let existed = coll.records.remove(record_id).is_some();
        if existed && self.tombstones_enabled() {
            coll.tombstones.insert(record_id.to_string(), Utc::now());
        }

        tracing::info!(
            collection = %collection,
            record_id = %record_id,
            existed = existed,
            "Delete"
        );

        existed
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Number of collections created so far
    pub async fn collection_count(&self) -> usize {
        self.inner.collections.read().await.len()
    }

    /// Every record in a collection (creates the collection if absent)
    pub async fn snapshot(&self, collection: &str) -> Vec<SyncRecord> {
        let handle = self.collection(collection).await;
        let coll = handle.read().await;
        coll.records.values().cloned().collect()
    }

    #[cfg(test)]
    async fn get(&self, collection: &str, record_id: &str) -> Option<SyncRecord> {
        let handle = self.collection(collection).await;
        let coll = handle.read().await;
        coll.records.get(record_id).cloned()
    }

    // ========================================================================
    // Tombstone Cleanup
    // ========================================================================

    /// Drop tombstones older than the retention window.
    ///
    /// Returns the number removed.
    pub async fn prune_tombstones(&self) -> usize {
        self.prune_expired(Utc::now()).await
    }

    pub(crate) async fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        if !self.tombstones_enabled() {
            return 0;
        }

        let handles: Vec<_> = {
            let collections = self.inner.collections.read().await;
            collections.values().cloned().collect()
        };

        let mut count = 0;
        for handle in handles {
            count += self.prune_collection(&handle, now).await;
        }

        if count > 0 {
            tracing::info!(count = count, "Pruned expired tombstones");
        }

        count
    }

    async fn prune_collection(&self, handle: &RwLock<Collection>, now: DateTime<Utc>) -> usize {
        let Some(retention) = self.inner.tombstone_retention else {
            return 0;
        };

        let mut coll = handle.write().await;
        let before = coll.tombstones.len();
        coll.tombstones.retain(|_, deleted_at| {
            (now - *deleted_at)
                .to_std()
                .map(|age| age <= retention)
                .unwrap_or(true)
        });
        before - coll.tombstones.len()
    }

    /// Start background tombstone pruning.
    ///
    /// Returns `None` when tombstones are disabled.
    pub fn start_cleanup_task(self, every: Duration) -> Option<tokio::task::JoinHandle<()>> {
        if !self.tombstones_enabled() {
            return None;
        }

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);

            loop {
                interval.tick().await;
                self.prune_tombstones().await;
            }
        }))
    }
}

impl Default for SyncStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
