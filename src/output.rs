//! Output formatting utilities

use crate::compare::Comparison;
use crate::error::Result;
use crate::query::display_text;
use crate::record::{Record, RecordStatus};
use crate::snapshot::Snapshot;
use serde_json::Value;

/// Pretty printer for ordertrack output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print snapshot list, newest first
    pub fn print_snapshot_list(snapshots: &[Snapshot]) {
        if snapshots.is_empty() {
            println!("No uploads found.");
            return;
        }

        println!("📸 Uploads:");
        for (i, snapshot) in snapshots.iter().enumerate() {
            let prefix = if i == snapshots.len() - 1 { "└─" } else { "├─" };
            println!(
                "{} {} — {} ({} rows, {})",
                prefix,
                snapshot.id,
                snapshot.source_filename,
                snapshot.row_count,
                snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    /// Print one snapshot's metadata
    pub fn print_snapshot(snapshot: &Snapshot) {
        println!("📸 Upload: {}", snapshot.id);
        println!("├─ Source: {}", snapshot.source_filename);
        println!(
            "├─ Ingested: {}",
            snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("├─ Rows: {}", snapshot.row_count);
        println!("└─ Columns: {}", snapshot.columns.join(", "));
    }

    /// Print a record set as one tree entry per record
    pub fn print_records(records: &[Record]) {
        if records.is_empty() {
            println!("No records found.");
            return;
        }

        println!("📦 Records: {}", records.len());
        for (i, record) in records.iter().enumerate() {
            let last = i == records.len() - 1;
            let prefix = if last { "└─" } else { "├─" };
            let status = match record.status {
                RecordStatus::New => "new",
                RecordStatus::Updated => "updated",
            };
            println!("{} {} ({})", prefix, record.identifier, status);

            let field_prefix = if last { "   " } else { "│  " };
            let fields: Vec<(&String, &Value)> = record.fields.iter().collect();
            for (j, (name, value)) in fields.iter().enumerate() {
                let marker = if j == fields.len() - 1 { "└─" } else { "├─" };
                println!("{}{} {}: {}", field_prefix, marker, name, display_text(value));
            }
        }
    }

    /// Print one record with its tracking metadata
    pub fn print_record(record: &Record) {
        println!("📦 Record: {}", record.identifier);
        println!("├─ Upload: {}", record.snapshot_id);
        println!(
            "├─ First seen: {}",
            record.first_seen.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!(
            "├─ Last seen: {}",
            record.last_seen.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let status = match record.status {
            RecordStatus::New => "new",
            RecordStatus::Updated => "updated",
        };
        println!("├─ Status: {}", status);
        println!("└─ Fields:");
        let fields: Vec<(&String, &Value)> = record.fields.iter().collect();
        for (i, (name, value)) in fields.iter().enumerate() {
            let marker = if i == fields.len() - 1 { "   └─" } else { "   ├─" };
            println!("{} {}: {}", marker, name, display_text(value));
        }
    }

    /// Print comparison results between two uploads
    pub fn print_comparison(base_id: &str, target_id: &str, comparison: &Comparison) {
        println!("🔍 Comparison: {} → {}", base_id, target_id);

        if comparison.new_count > 0 {
            println!("├─ ➕ New: {}", comparison.new_count);
            Self::print_identifier_sample(&comparison.new, "│  ");
        } else {
            println!("├─ ✅ New: 0");
        }

        if comparison.removed_count > 0 {
            println!("├─ ➖ Removed: {}", comparison.removed_count);
            Self::print_identifier_sample(&comparison.removed, "│  ");
        } else {
            println!("├─ ✅ Removed: 0");
        }

        if comparison.modified_count > 0 {
            println!("└─ ❌ Modified: {}", comparison.modified_count);
            Self::print_identifier_sample(&comparison.modified, "   ");
        } else {
            println!("└─ ✅ Modified: 0");
        }
    }

    /// Print distinct values of one field
    pub fn print_distinct(field: &str, values: &[Value]) {
        if values.is_empty() {
            println!("No values found for '{}'.", field);
            return;
        }

        println!("🔢 Distinct values of '{}': {}", field, values.len());
        for (i, value) in values.iter().enumerate() {
            let prefix = if i == values.len() - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, display_text(value));
        }
    }

    fn print_identifier_sample(records: &[Record], prefix: &str) {
        let sample_count = std::cmp::min(5, records.len());
        let sample: Vec<&str> = records
            .iter()
            .take(sample_count)
            .map(|r| r.identifier.as_str())
            .collect();
        println!(
            "{}└─ Identifiers: {}{}",
            prefix,
            sample.join(", "),
            if records.len() > sample_count { "..." } else { "" }
        );
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}
