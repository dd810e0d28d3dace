//! # ordertrack
//!
//! A snapshot-based reconciliation and diff engine for tabular data uploads:
//! successive uploads are persisted as snapshots, every row is merged into a
//! durable per-record history keyed by its natural identifier, and any two
//! snapshots can be compared into new/removed/modified partitions.

pub mod cli;
pub mod commands;
pub mod compare;
pub mod dataset;
pub mod error;
pub mod header;
pub mod output;
pub mod query;
pub mod record;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod tracker;
pub mod workspace;

pub use error::{Result, TrackError};
pub use tracker::Tracker;
pub use workspace::TrackerWorkspace;

/// Current format version for persisted ordertrack state
pub const FORMAT_VERSION: &str = "1.0.0";

/// Columns every upload must expose before it is accepted
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "UniqueID",
    "Location Code",
    "Customer",
    "Fabric Type",
    "GPU Model",
];

/// Default number of leading rows scanned when locating a header row
pub const HEADER_SCAN_LIMIT: usize = 10;
