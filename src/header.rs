//! Header row location for untrusted sheet grids
//!
//! Spreadsheet exports often carry title and metadata rows above the real
//! header. The locator scans a bounded number of leading rows for the first
//! one in which every required column resolves to a cell, tolerating exact,
//! case-insensitive, and partial header spellings, then remaps the rows
//! below onto canonical column names.

use crate::dataset::{RawDataset, Row};
use crate::error::{Result, TrackError};
use crate::{HEADER_SCAN_LIMIT, REQUIRED_COLUMNS};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

/// Locates the header row of a positional cell grid
#[derive(Debug, Clone)]
pub struct HeaderLocator {
    required: Vec<String>,
    scan_limit: usize,
}

/// Outcome of a successful header scan
#[derive(Debug, Clone)]
pub struct HeaderLocation {
    /// 0-indexed row accepted as the header row
    pub row_index: usize,
    /// Required column name → actual header text found in the sheet
    pub mapping: IndexMap<String, String>,
    /// Required column name → cell position within the header row
    positions: IndexMap<String, usize>,
}

impl Default for HeaderLocator {
    fn default() -> Self {
        Self::new(
            REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            HEADER_SCAN_LIMIT,
        )
    }
}

impl HeaderLocator {
    pub fn new(required: Vec<String>, scan_limit: usize) -> Self {
        Self {
            required,
            scan_limit,
        }
    }

    /// Scan the grid top-down and accept the first row in which all required
    /// columns find a mapping. Fails with [`TrackError::HeaderNotFound`] when
    /// no row within the scan limit qualifies.
    pub fn locate(&self, grid: &[Vec<Value>]) -> Result<HeaderLocation> {
        let scanned = grid.len().min(self.scan_limit);

        for (row_index, row) in grid.iter().take(self.scan_limit).enumerate() {
            if let Some(location) = self.match_row(row_index, row) {
                log::debug!(
                    "header row located at index {} ({} required columns)",
                    row_index,
                    location.mapping.len()
                );
                return Ok(location);
            }
        }

        Err(TrackError::HeaderNotFound { scanned })
    }

    /// Locate the header row and relabel everything below it onto canonical
    /// column names. Non-required header cells keep their own (trimmed) text.
    pub fn locate_and_remap(&self, grid: &[Vec<Value>]) -> Result<RawDataset> {
        let location = self.locate(grid)?;
        Ok(location.remap(grid))
    }

    fn match_row(&self, row_index: usize, row: &[Value]) -> Option<HeaderLocation> {
        let cells: Vec<(usize, String)> = row
            .iter()
            .enumerate()
            .filter_map(|(pos, cell)| cell_text(cell).map(|text| (pos, text)))
            .collect();

        let mut mapping = IndexMap::new();
        let mut positions = IndexMap::new();
        let mut used: HashSet<usize> = HashSet::new();

        // Pass 1: verbatim matches only.
        for required in &self.required {
            if let Some((pos, text)) = cells
                .iter()
                .find(|(pos, text)| !used.contains(pos) && text == required)
            {
                used.insert(*pos);
                mapping.insert(required.clone(), text.clone());
                positions.insert(required.clone(), *pos);
            }
        }

        // Pass 2: case-insensitive, then substring in either direction.
        for required in &self.required {
            if mapping.contains_key(required) {
                continue;
            }

            let wanted = required.to_lowercase();
            let found = cells
                .iter()
                .filter(|(pos, _)| !used.contains(pos))
                .find(|(_, text)| text.to_lowercase() == wanted)
                .or_else(|| {
                    cells.iter().filter(|(pos, _)| !used.contains(pos)).find(
                        |(_, text)| {
                            let cell = text.to_lowercase();
                            cell.contains(&wanted) || wanted.contains(&cell)
                        },
                    )
                });

            if let Some((pos, text)) = found {
                used.insert(*pos);
                mapping.insert(required.clone(), text.clone());
                positions.insert(required.clone(), *pos);
            }
        }

        if mapping.len() == self.required.len() {
            Some(HeaderLocation {
                row_index,
                mapping,
                positions,
            })
        } else {
            None
        }
    }
}

impl HeaderLocation {
    /// Relabel the data rows below the header row onto canonical names.
    ///
    /// Columns are emitted in sheet position order; cells matched to a
    /// required column take the canonical name, everything else keeps its
    /// header text. Rows with no non-null cell are dropped.
    pub fn remap(&self, grid: &[Vec<Value>]) -> RawDataset {
        let header_row = &grid[self.row_index];

        let mut columns: Vec<(usize, String)> = Vec::new();
        for (pos, cell) in header_row.iter().enumerate() {
            let canonical = self
                .positions
                .iter()
                .find(|(_, p)| **p == pos)
                .map(|(name, _)| name.clone());

            match canonical {
                Some(name) => columns.push((pos, name)),
                None => {
                    if let Some(text) = cell_text(cell) {
                        columns.push((pos, text));
                    }
                }
            }
        }

        let rows: Vec<Row> = grid[self.row_index + 1..]
            .iter()
            .filter_map(|data_row| {
                let row: Row = columns
                    .iter()
                    .map(|(pos, name)| {
                        let value = data_row.get(*pos).cloned().unwrap_or(Value::Null);
                        (name.clone(), value)
                    })
                    .collect();

                if row.values().all(is_blank) {
                    None
                } else {
                    Some(row)
                }
            })
            .collect();

        let column_names = columns.into_iter().map(|(_, name)| name).collect();
        RawDataset::new(rows, column_names)
    }
}

fn cell_text(cell: &Value) -> Option<String> {
    let text = match cell {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
