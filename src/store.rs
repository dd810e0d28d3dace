//! Durable keyed stores backed by JSON files
//!
//! Three independent stores (records, snapshots, settings) live under one
//! workspace directory. There are no cross-store transactions: each store
//! loads fully into memory on open and flushes atomically on persist, so a
//! mutating engine operation is durable before it returns to the caller.

use crate::error::{Result, TrackError};
use crate::record::Record;
use crate::snapshot::Snapshot;
use crate::workspace::TrackerWorkspace;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// One keyed store: an in-memory map mirrored to a JSON file
#[derive(Debug)]
pub struct KeyedStore<T> {
    path: PathBuf,
    entries: IndexMap<String, T>,
}

impl<T: Serialize + DeserializeOwned> KeyedStore<T> {
    /// Open the store, loading existing entries if the file is present
    pub fn open(path: PathBuf) -> Result<Self> {
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                TrackError::storage(format!("failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                TrackError::storage(format!("failed to decode {}: {}", path.display(), e))
            })?
        } else {
            IndexMap::new()
        };

        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: String, value: T) {
        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate values in store order (insertion order of first write)
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Flush the store to disk. Writes to a sibling temp file first so a
    /// crash mid-write never corrupts the previous state.
    pub fn persist(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries).map_err(|e| {
            TrackError::storage(format!("failed to encode {}: {}", self.path.display(), e))
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).map_err(|e| {
            TrackError::storage(format!("failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            TrackError::storage(format!("failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}

/// The keyed stores of one workspace.
///
/// `records` holds the single live version of every record; `versions`
/// freezes each snapshot's record set at ingest time so comparisons see a
/// snapshot as it was, not as the live store has since evolved.
#[derive(Debug)]
pub struct TrackerStore {
    pub records: KeyedStore<Record>,
    pub snapshots: KeyedStore<Snapshot>,
    pub versions: KeyedStore<Vec<Record>>,
    pub settings: KeyedStore<Value>,
}

impl TrackerStore {
    /// Open all stores under a workspace
    pub fn open(workspace: &TrackerWorkspace) -> Result<Self> {
        if !workspace.data_dir.exists() {
            fs::create_dir_all(&workspace.data_dir).map_err(|e| {
                TrackError::storage(format!(
                    "failed to create {}: {}",
                    workspace.data_dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            records: KeyedStore::open(workspace.records_path())?,
            snapshots: KeyedStore::open(workspace.snapshots_path())?,
            versions: KeyedStore::open(workspace.versions_path())?,
            settings: KeyedStore::open(workspace.settings_path())?,
        })
    }

    /// Wipe records, snapshots, and versions; user preferences survive
    pub fn clear_data(&mut self) -> Result<()> {
        self.records.clear();
        self.snapshots.clear();
        self.versions.clear();
        self.records.persist()?;
        self.snapshots.persist()?;
        self.versions.persist()?;
        log::info!("Cleared all records and snapshots");
        Ok(())
    }
}
