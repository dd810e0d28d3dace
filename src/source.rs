//! Tabular file decoding using DuckDB
//!
//! The engine itself only consumes [`RawDataset`]s; this module is the
//! parsing collaborator that produces them from files. Delimited files with
//! a trustworthy first row go through [`SourceReader::read_dataset`];
//! exports with preamble rows above the header go through
//! [`SourceReader::read_grid`] plus the header locator.

use crate::dataset::{RawDataset, Row};
use crate::error::{Result, TrackError};
use duckdb::types::ValueRef;
use duckdb::Connection;
use serde_json::Value;
use std::path::Path;

/// Reads tabular files into the engine's dataset shape
pub struct SourceReader {
    connection: Connection,
}

impl SourceReader {
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute("SET enable_progress_bar=false", [])?;
        Ok(Self { connection })
    }

    /// Check if the file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        if let Some(extension) = file_path.extension().and_then(|s| s.to_str()) {
            matches!(
                extension.to_lowercase().as_str(),
                "csv" | "tsv" | "json" | "jsonl" | "parquet"
            )
        } else {
            false
        }
    }

    /// Decode a file whose first row is the header into field-name → value
    /// rows plus the ordered column list.
    pub fn read_dataset(&self, file_path: &Path) -> Result<RawDataset> {
        self.create_view(file_path, "upload_view")?;
        let columns = self.view_columns("upload_view")?;
        let rows = self.view_rows("upload_view", &columns)?;
        Ok(RawDataset::new(rows, columns))
    }

    /// Decode a delimited file as a positional cell grid, every cell a
    /// string, for header-locator processing.
    pub fn read_grid(&self, file_path: &Path) -> Result<Vec<Vec<Value>>> {
        self.check_path(file_path)?;

        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW grid_view AS \
             SELECT * FROM read_csv_auto('{}', header=false, all_varchar=true)",
            file_path.to_string_lossy()
        );
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| convert_duckdb_error(e, file_path))?;

        let columns = self.view_columns("grid_view")?;
        let column_count = columns.len();

        let mut stmt = self.connection.prepare("SELECT * FROM grid_view")?;
        let mapped = stmt.query_map([], |row| {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(value_from_ref(row.get_ref(i)?));
            }
            Ok(cells)
        })?;

        let mut grid = Vec::new();
        for row in mapped {
            grid.push(row.map_err(|e| {
                TrackError::invalid_input(format!("failed to read grid row: {}", e))
            })?);
        }

        Ok(grid)
    }

    fn create_view(&self, file_path: &Path, view: &str) -> Result<()> {
        self.check_path(file_path)?;

        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW {} AS SELECT * FROM '{}'",
            view,
            file_path.to_string_lossy()
        );
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| convert_duckdb_error(e, file_path))?;

        Ok(())
    }

    fn check_path(&self, file_path: &Path) -> Result<()> {
        if !file_path.exists() {
            return Err(TrackError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }
        if !file_path.is_file() {
            return Err(TrackError::invalid_input(format!(
                "Path is not a file: {}",
                file_path.display()
            )));
        }
        Ok(())
    }

    /// Column names of a view in source order
    fn view_columns(&self, view: &str) -> Result<Vec<String>> {
        let mut stmt = self.connection.prepare(&format!("DESCRIBE {}", view))?;
        let mapped = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut columns = Vec::new();
        for name in mapped {
            columns.push(name.map_err(|e| {
                TrackError::invalid_input(format!("failed to read column info: {}", e))
            })?);
        }

        Ok(columns)
    }

    fn view_rows(&self, view: &str, columns: &[String]) -> Result<Vec<Row>> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self
            .connection
            .prepare(&format!("SELECT * FROM {}", view))?;
        let mapped = stmt.query_map([], |row| {
            let mut fields = Row::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                fields.insert(name.clone(), value_from_ref(row.get_ref(i)?));
            }
            Ok(fields)
        })?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row.map_err(|e| {
                TrackError::invalid_input(format!("failed to read data row: {}", e))
            })?);
        }

        Ok(rows)
    }
}

/// Map a DuckDB cell onto the engine's scalar value space
fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::from(i),
        ValueRef::SmallInt(i) => Value::from(i),
        ValueRef::Int(i) => Value::from(i),
        ValueRef::BigInt(i) => Value::from(i),
        ValueRef::HugeInt(i) => i64::try_from(i)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(i.to_string())),
        ValueRef::UTinyInt(i) => Value::from(i),
        ValueRef::USmallInt(i) => Value::from(i),
        ValueRef::UInt(i) => Value::from(i),
        ValueRef::UBigInt(i) => Value::from(i),
        ValueRef::Float(f) => Value::from(f),
        ValueRef::Double(f) => Value::from(f),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(d.to_string())),
        ValueRef::Text(s) => Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => Value::String(format!("<blob:{} bytes>", b.len())),
        ValueRef::Date32(d) => Value::String(format!("{:?}", d)),
        ValueRef::Time64(t, _) => Value::String(format!("{:?}", t)),
        ValueRef::Timestamp(ts, _) => Value::String(format!("{:?}", ts)),
        _ => Value::String("<unknown>".to_string()),
    }
}

/// Convert DuckDB errors on common file problems into invalid-input errors
fn convert_duckdb_error(error: duckdb::Error, file_path: &Path) -> TrackError {
    let error_msg = error.to_string();

    if error_msg.contains("CSV Error")
        || error_msg.contains("Could not convert")
        || error_msg.contains("Invalid CSV")
        || error_msg.contains("Unterminated quoted field")
    {
        TrackError::invalid_input(format!(
            "Malformed CSV file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("JSON") || error_msg.contains("Malformed JSON") {
        TrackError::invalid_input(format!(
            "Malformed JSON file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
        TrackError::invalid_input(format!("File not found: {}", file_path.display()))
    } else if error_msg.contains("Permission denied") {
        TrackError::invalid_input(format!(
            "Permission denied accessing file: {}",
            file_path.display()
        ))
    } else {
        TrackError::DuckDb(error)
    }
}
