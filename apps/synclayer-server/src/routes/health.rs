//! Health check and diagnostic endpoints

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;
use crate::sync::{now_iso, SyncRecord};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub collections: usize,
    pub timestamp: String,
}

/// Full dump of one collection
#[derive(Serialize)]
pub struct DebugResponse {
    pub collection: String,
    pub count: usize,
    pub records: Vec<SyncRecord>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        collections: state.store().collection_count().await,
        timestamp: now_iso(),
    })
}

async fn debug_collection(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> Json<DebugResponse> {
    let records = state.store().snapshot(&collection).await;

    Json(DebugResponse {
        collection,
        count: records.len(),
        records,
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/debug/:collection", get(debug_collection))
}
