//! Record model and identifier derivation

use crate::dataset::Row;
use crate::error::{Result, TrackError};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of the most recent merge of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    New,
    Updated,
}

/// One tracked business entity, keyed by its natural identifier.
///
/// Reconciliation metadata lives in dedicated fields, never inside `fields`,
/// so field-level diffing does not have to skip reserved keys. Exactly one
/// record exists per identifier at any time; it is mutated in place across
/// snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub identifier: String,
    /// Business columns in source order, values are string | number | null
    pub fields: IndexMap<String, Value>,
    /// The snapshot that most recently wrote this record
    pub snapshot_id: String,
    /// Set once on first ingestion, never overwritten
    pub first_seen: DateTime<Utc>,
    /// Advanced on every write
    pub last_seen: DateTime<Utc>,
    pub status: RecordStatus,
}

/// What to do when a row carries no `UniqueID` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Fail the ingestion with [`TrackError::MissingIdentifier`]
    #[default]
    Require,
    /// Manufacture a key from the snapshot id and a random suffix
    /// (legacy-compatible behavior of the original tracker)
    Synthesize,
}

/// Derive the natural key for a normalized row.
pub fn identifier_of(
    row: &Row,
    row_index: usize,
    snapshot_id: &str,
    policy: IdentifierPolicy,
) -> Result<String> {
    match row.get("UniqueID") {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => match policy {
            IdentifierPolicy::Require => Err(TrackError::MissingIdentifier { row_index }),
            IdentifierPolicy::Synthesize => {
                let suffix = uuid::Uuid::new_v4().simple().to_string();
                Ok(format!("{}-{}", snapshot_id, &suffix[..8]))
            }
        },
    }
}
