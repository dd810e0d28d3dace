//! Snapshot metadata and id generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable description of one completed upload.
///
/// Created atomically when an ingest completes, never modified afterwards,
/// and only removed by a full data wipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Time-derived id, monotonically increasing by creation order
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source_filename: String,
    pub row_count: usize,
    /// Column names as found in the source, in order
    pub columns: Vec<String>,
}

/// Generate the next snapshot id from the current time in milliseconds.
///
/// Two uploads landing in the same millisecond (or a clock stepping
/// backwards) are disambiguated by bumping past the previous id, keeping ids
/// strictly increasing by creation order.
pub fn next_snapshot_id(last: Option<&str>) -> String {
    let mut id = Utc::now().timestamp_millis().max(0) as u128;

    if let Some(last) = last {
        if let Ok(last_id) = last.parse::<u128>() {
            if id <= last_id {
                id = last_id.saturating_add(1);
            }
        }
    }

    id.to_string()
}

impl Snapshot {
    pub fn new(
        id: String,
        timestamp: DateTime<Utc>,
        source_filename: &str,
        row_count: usize,
        columns: Vec<String>,
    ) -> Self {
        Self {
            id,
            timestamp,
            source_filename: source_filename.to_string(),
            row_count,
            columns,
        }
    }
}
