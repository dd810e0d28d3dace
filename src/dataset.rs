//! Dataset shape, normalization, and structural validation
//!
//! A [`RawDataset`] is the contract between the parsing collaborator and the
//! engine: field-name → value rows plus the ordered header list, with values
//! limited to JSON scalars (string, number, bool, null).

use crate::error::{Result, TrackError};
use crate::REQUIRED_COLUMNS;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;

/// One parsed row: column name → raw scalar value
pub type Row = IndexMap<String, Value>;

/// A parsed dataset as handed over by a file parser
#[derive(Debug, Clone)]
pub struct RawDataset {
    pub rows: Vec<Row>,
    /// Column names in source order
    pub columns: Vec<String>,
}

impl RawDataset {
    pub fn new(rows: Vec<Row>, columns: Vec<String>) -> Self {
        Self { rows, columns }
    }

    /// Check that the dataset is non-empty and exposes all required columns.
    ///
    /// Must pass before normalized rows are trusted for reconciliation.
    pub fn validate_structure(&self) -> Result<()> {
        if self.rows.is_empty() {
            return Err(TrackError::EmptyDataset);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !self.columns.iter().any(|c| c == *col))
            .map(|col| col.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(TrackError::missing_columns(missing));
        }

        Ok(())
    }
}

/// Canonicalize a single raw value: trim strings, coerce blanks to null,
/// pass every other scalar through unchanged.
pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            }
        }
        other => other.clone(),
    }
}

/// Canonicalize one row, preserving key order. Total over any input mapping.
pub fn normalize_row(row: &Row) -> Row {
    row.iter()
        .map(|(key, value)| (key.clone(), normalize_value(value)))
        .collect()
}

/// Canonicalize every row of a dataset. Rows are independent, so the pass
/// runs in parallel.
pub fn normalize_rows(rows: &[Row]) -> Vec<Row> {
    rows.par_iter().map(normalize_row).collect()
}

/// The sample dataset shipped with the original tracker: seven orders with
/// ids 1001-1007. Used by the `sample` command and the test suite.
pub fn sample_dataset() -> RawDataset {
    let columns = vec![
        "UniqueID".to_string(),
        "Location Code".to_string(),
        "Customer".to_string(),
        "Fabric Type".to_string(),
        "GPU Model".to_string(),
        "Quantity".to_string(),
        "Order Date".to_string(),
    ];

    let raw = [
        (1001, "LOC001", "Acme Corp", "Cotton", "RTX 3080", 5, "2025-01-15"),
        (1002, "LOC002", "TechGiant", "Polyester", "RTX 4090", 2, "2025-01-17"),
        (1003, "LOC001", "Acme Corp", "Wool", "RTX 3070", 3, "2025-01-20"),
        (1004, "LOC003", "DataSystems", "Nylon", "RTX 4080", 1, "2025-01-22"),
        (1005, "LOC002", "TechGiant", "Cotton", "RTX 3090", 4, "2025-01-25"),
        (1006, "LOC004", "CloudHost", "Silk", "RTX 3080", 2, "2025-01-27"),
        (1007, "LOC003", "DataSystems", "Polyester", "RTX 4070", 6, "2025-01-30"),
    ];

    let rows = raw
        .iter()
        .map(|(id, loc, customer, fabric, gpu, qty, date)| {
            let mut row = Row::new();
            row.insert("UniqueID".to_string(), Value::from(*id));
            row.insert("Location Code".to_string(), Value::from(*loc));
            row.insert("Customer".to_string(), Value::from(*customer));
            row.insert("Fabric Type".to_string(), Value::from(*fabric));
            row.insert("GPU Model".to_string(), Value::from(*gpu));
            row.insert("Quantity".to_string(), Value::from(*qty));
            row.insert("Order Date".to_string(), Value::from(*date));
            row
        })
        .collect();

    RawDataset::new(rows, columns)
}
