//! The reconciliation engine and public facade
//!
//! `Tracker` owns the keyed stores and exposes every engine operation:
//! ingest (validate → normalize → reconcile → snapshot), snapshot listing,
//! comparison, and the query layer. Presentation code registers ingest
//! listeners instead of being called by name; the engine performs no UI side
//! effects of its own.

use crate::compare::{compare_records, Comparison};
use crate::dataset::{normalize_rows, RawDataset, Row};
use crate::error::{Result, TrackError};
use crate::query::{self, Criteria};
use crate::record::{identifier_of, IdentifierPolicy, Record, RecordStatus};
use crate::snapshot::{next_snapshot_id, Snapshot};
use crate::store::TrackerStore;
use crate::workspace::TrackerWorkspace;
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::Value;

/// Callback invoked with the new snapshot after a successful ingest
pub type IngestListener = Box<dyn Fn(&Snapshot) + Send + Sync>;

/// The latest snapshot together with its records
#[derive(Debug, Clone)]
pub struct LatestData {
    pub snapshot: Snapshot,
    pub records: Vec<Record>,
}

/// Reconciliation engine over one workspace's stores
pub struct Tracker {
    store: TrackerStore,
    identifier_policy: IdentifierPolicy,
    listeners: Vec<IngestListener>,
}

impl Tracker {
    /// Open the tracker over a workspace, loading all three stores
    pub fn open(workspace: &TrackerWorkspace) -> Result<Self> {
        Ok(Self {
            store: TrackerStore::open(workspace)?,
            identifier_policy: IdentifierPolicy::default(),
            listeners: Vec::new(),
        })
    }

    /// Switch the missing-identifier policy (fail fast by default)
    pub fn with_identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    /// Register a listener notified after every successful ingest
    pub fn on_ingest(&mut self, listener: impl Fn(&Snapshot) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Validate, normalize, and reconcile one upload, then record it as a
    /// new snapshot.
    ///
    /// Rows are keyed by `UniqueID`; an unknown identifier creates a record
    /// (`status = new`, `first_seen = last_seen = now`), a known one is
    /// overwritten in place (`status = updated`, `first_seen` preserved).
    /// The full merged record set is also frozen into the version store so
    /// later comparisons can see this snapshot as ingested.
    /// Duplicate identifiers within one upload resolve deterministically to
    /// the last occurrence in row order. Identifier derivation happens
    /// before any write, so a missing identifier leaves the stores
    /// untouched; a storage failure after the record flush can still leave
    /// the upload without its snapshot entry (no rollback).
    pub fn ingest(&mut self, dataset: &RawDataset, source_filename: &str) -> Result<Snapshot> {
        dataset.validate_structure()?;

        let rows = normalize_rows(&dataset.rows);
        let snapshot_id = next_snapshot_id(self.last_snapshot_id().as_deref());
        let now = Utc::now();

        // Group rows by identifier in row order: the last occurrence wins,
        // and every identifier is derived before the first upsert.
        let mut merged: IndexMap<String, Row> = IndexMap::with_capacity(rows.len());
        for (row_index, row) in rows.into_iter().enumerate() {
            let identifier =
                identifier_of(&row, row_index, &snapshot_id, self.identifier_policy)?;
            merged.insert(identifier, row);
        }

        let mut new_count = 0usize;
        let mut updated_count = 0usize;
        let mut versions: Vec<Record> = Vec::with_capacity(merged.len());
        for (identifier, fields) in merged {
            let record = match self.store.records.get(&identifier) {
                Some(existing) => {
                    updated_count += 1;
                    Record {
                        identifier: identifier.clone(),
                        fields,
                        snapshot_id: snapshot_id.clone(),
                        first_seen: existing.first_seen,
                        last_seen: now,
                        status: RecordStatus::Updated,
                    }
                }
                None => {
                    new_count += 1;
                    Record {
                        identifier: identifier.clone(),
                        fields,
                        snapshot_id: snapshot_id.clone(),
                        first_seen: now,
                        last_seen: now,
                        status: RecordStatus::New,
                    }
                }
            };
            versions.push(record.clone());
            self.store.records.insert(identifier, record);
        }

        let snapshot = Snapshot::new(
            snapshot_id.clone(),
            now,
            source_filename,
            dataset.rows.len(),
            dataset.columns.clone(),
        );

        self.store.records.persist()?;
        self.store.versions.insert(snapshot_id.clone(), versions);
        self.store.versions.persist()?;
        self.store
            .snapshots
            .insert(snapshot_id.clone(), snapshot.clone());
        self.store.snapshots.persist()?;

        log::info!(
            "ingested snapshot {} from '{}': {} rows ({} new, {} updated)",
            snapshot_id,
            source_filename,
            snapshot.row_count,
            new_count,
            updated_count
        );

        for listener in &self.listeners {
            listener(&snapshot);
        }

        Ok(snapshot)
    }

    /// All snapshots, newest first by timestamp
    pub fn list_snapshots(&self) -> Vec<Snapshot> {
        let mut snapshots: Vec<Snapshot> = self.store.snapshots.values().cloned().collect();
        snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        snapshots
    }

    pub fn get_snapshot(&self, id: &str) -> Option<Snapshot> {
        self.store.snapshots.get(id).cloned()
    }

    /// Records whose most recent write came from the given snapshot.
    ///
    /// Records are single-version per identifier: one untouched since an
    /// earlier snapshot belongs to that earlier snapshot's scan only as long
    /// as nothing newer overwrites it.
    pub fn records_of(&self, snapshot_id: &str) -> Vec<Record> {
        self.store
            .records
            .values()
            .filter(|record| record.snapshot_id == snapshot_id)
            .cloned()
            .collect()
    }

    /// The most recent snapshot and its records, if any upload happened
    pub fn latest(&self) -> Option<LatestData> {
        let snapshot = self.list_snapshots().into_iter().next()?;
        let records = self.records_of(&snapshot.id);
        Some(LatestData { snapshot, records })
    }

    pub fn get_record(&self, identifier: &str) -> Option<Record> {
        self.store.records.get(identifier).cloned()
    }

    /// Partition two snapshots' records into new/removed/modified.
    ///
    /// Comparison runs over the version sets frozen at ingest time, so both
    /// sides see their snapshot's full record set even when a later upload
    /// has since rewritten the live records.
    pub fn compare(&self, base_id: &str, target_id: &str) -> Result<Comparison> {
        for id in [base_id, target_id] {
            if !self.store.snapshots.contains_key(id) {
                return Err(TrackError::SnapshotNotFound { id: id.to_string() });
            }
        }

        let empty = Vec::new();
        let base = self.store.versions.get(base_id).unwrap_or(&empty);
        let target = self.store.versions.get(target_id).unwrap_or(&empty);
        Ok(compare_records(base, target))
    }

    /// Records matching every criterion, optionally scoped to one snapshot
    pub fn filtered(&self, criteria: &Criteria, snapshot_id: Option<&str>) -> Vec<Record> {
        self.scoped(snapshot_id)
            .filter(|record| query::matches_criteria(record, criteria))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search across all fields.
    ///
    /// An empty query returns every record of the given snapshot, or nothing
    /// at all when unscoped.
    pub fn search(&self, query: &str, snapshot_id: Option<&str>) -> Vec<Record> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return match snapshot_id {
                Some(id) => self.records_of(id),
                None => Vec::new(),
            };
        }

        let needle = trimmed.to_lowercase();
        self.scoped(snapshot_id)
            .filter(|record| query::matches_search(record, &needle))
            .cloned()
            .collect()
    }

    /// Unique non-null values of one field, sorted ascending
    pub fn distinct(&self, field: &str, snapshot_id: Option<&str>) -> Vec<Value> {
        query::distinct_values(self.scoped(snapshot_id), field)
    }

    /// Wipe records and snapshots; settings survive
    pub fn clear_all(&mut self) -> Result<()> {
        self.store.clear_data()
    }

    pub fn save_setting(&mut self, key: &str, value: Value) -> Result<()> {
        self.store.settings.insert(key.to_string(), value);
        self.store.settings.persist()
    }

    pub fn get_setting(&self, key: &str) -> Option<Value> {
        self.store.settings.get(key).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.store.records.len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.store.snapshots.len()
    }

    fn scoped(&self, snapshot_id: Option<&str>) -> impl Iterator<Item = &Record> {
        let snapshot_id = snapshot_id.map(|s| s.to_string());
        self.store
            .records
            .values()
            .filter(move |record| match &snapshot_id {
                Some(id) => &record.snapshot_id == id,
                None => true,
            })
    }

    /// Highest snapshot id seen so far, used to keep ids monotonic
    fn last_snapshot_id(&self) -> Option<String> {
        self.store
            .snapshots
            .keys()
            .max_by_key(|id| id.parse::<u128>().unwrap_or(0))
            .cloned()
    }
}
