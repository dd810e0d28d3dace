//! Snapshot comparison: new/removed/modified partitions
//!
//! Operates on two record sets by identifier set operations plus field-level
//! diffing. `Tracker::compare` feeds it the version sets frozen at ingest
//! time rather than the live (single-version) record store.

use crate::record::Record;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Result of comparing two snapshots' record sets. Derived on demand, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub new_count: usize,
    pub removed_count: usize,
    pub modified_count: usize,
    pub new: Vec<Record>,
    pub removed: Vec<Record>,
    pub modified: Vec<Record>,
}

/// Partition `target` against `base` by identifier set operations and
/// field-level diffing.
pub fn compare_records(base: &[Record], target: &[Record]) -> Comparison {
    let base_by_id: HashMap<&str, &Record> = base
        .iter()
        .map(|record| (record.identifier.as_str(), record))
        .collect();
    let target_ids: HashSet<&str> = target
        .iter()
        .map(|record| record.identifier.as_str())
        .collect();

    let new: Vec<Record> = target
        .iter()
        .filter(|record| !base_by_id.contains_key(record.identifier.as_str()))
        .cloned()
        .collect();

    let removed: Vec<Record> = base
        .iter()
        .filter(|record| !target_ids.contains(record.identifier.as_str()))
        .cloned()
        .collect();

    // Field diffing over potentially wide rows; candidates are independent.
    let modified: Vec<Record> = target
        .par_iter()
        .filter(|record| {
            base_by_id
                .get(record.identifier.as_str())
                .map(|old| fields_differ(&old.fields, &record.fields))
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    Comparison {
        new_count: new.len(),
        removed_count: removed.len(),
        modified_count: modified.len(),
        new,
        removed,
        modified,
    }
}

/// True when at least one of the target's fields differs by value from the
/// base version (strict inequality; a field absent on the base side counts
/// as different).
fn fields_differ(
    base: &indexmap::IndexMap<String, Value>,
    target: &indexmap::IndexMap<String, Value>,
) -> bool {
    target
        .iter()
        .any(|(key, value)| base.get(key) != Some(value))
}
