//! Sync API endpoints
//!
//! Push, pull and delete for records in a named collection.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Json, Router,
};

use crate::error::SyncJson;
use crate::state::AppState;
use crate::sync::{DeleteResponse, PullQuery, PullResponse, PushRequest, PushResponse};

/// Create the sync router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:collection", get(pull_records).post(push_record))
        .route("/:collection/:record_id", delete(delete_record))
}

/// Receive a record pushed by a client.
///
/// Only a body that is not JSON is rejected; any field may be missing or
/// of any type.
async fn push_record(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    SyncJson(req): SyncJson<PushRequest>,
) -> Json<PushResponse> {
    let record = state
        .store()
        .push(&collection, req.record_id, req.data, req.timestamp)
        .await;

    Json(PushResponse {
        success: true,
        record_id: record.record_id,
        version: record.version,
    })
}

/// Return records updated since a timestamp
async fn pull_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<PullQuery>,
) -> Json<PullResponse> {
    Json(state.store().pull(&collection, query.since.as_deref()).await)
}

/// Remove a record; succeeds whether or not it existed
async fn delete_record(
    State(state): State<AppState>,
    Path((collection, record_id)): Path<(String, String)>,
) -> Json<DeleteResponse> {
    state.store().delete(&collection, &record_id).await;

    Json(DeleteResponse {
        success: true,
        record_id,
    })
}
