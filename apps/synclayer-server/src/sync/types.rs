//! Sync data types
//!
//! Wire shapes for the push/pull protocol. Field names are camelCase on the
//! wire to match the client SDKs. Push bodies are not validated: ids and
//! timestamps are kept as the JSON the client sent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Store key for a client-supplied record id.
///
/// Strings are used as-is, other JSON values take their JavaScript string
/// form, and a missing id becomes `"undefined"`.
pub fn record_key(record_id: &Value) -> String {
    match record_id {
        Value::Null => "undefined".to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => record_key(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// A stored record in a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Caller-chosen identifier as sent by the last push
    #[serde(rename = "recordId", skip_serializing_if = "Value::is_null", default)]
    pub record_id: Value,
    /// Opaque payload
    pub data: Value,
    /// Client-supplied timestamp of the last push, stored verbatim
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none", default)]
    pub updated_at: Option<Value>,
    /// Starts at 1, incremented on every push to the same id
    pub version: u64,
}

impl SyncRecord {
    /// Create a record at version 1
    pub fn new(record_id: Value, data: Value, updated_at: Option<Value>) -> Self {
        Self {
            record_id,
            data,
            updated_at,
            version: 1,
        }
    }

    /// Overwrite the record with a new push, bumping the version
    pub fn overwrite(&mut self, record_id: Value, data: Value, updated_at: Option<Value>) {
        self.record_id = record_id;
        self.data = data;
        self.updated_at = updated_at;
        self.version += 1;
    }

    /// Key this record is stored under
    pub fn key(&self) -> String {
        record_key(&self.record_id)
    }
}

/// Marker left behind by a delete while tombstones are enabled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tombstone {
    #[serde(rename = "recordId")]
    pub record_id: String,
    /// Server time of the delete
    #[serde(rename = "deletedAt")]
    pub deleted_at: DateTime<Utc>,
}

/// Body of `POST /sync/{collection}`; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushRequest {
    #[serde(rename = "recordId", default)]
    pub record_id: Value,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushResponse {
    pub success: bool,
    #[serde(rename = "recordId", skip_serializing_if = "Value::is_null", default)]
    pub record_id: Value,
    pub version: u64,
}

/// Query string of `GET /sync/{collection}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullQuery {
    pub since: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullResponse {
    pub records: Vec<SyncRecord>,
    /// Deletions newer than `since`; only populated when tombstones are enabled
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub deleted: Vec<Tombstone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(rename = "recordId")]
    pub record_id: String,
}
