//! Command-line interface for ordertrack

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ordertrack")]
#[command(about = "A snapshot-based order upload tracker and reconciler")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override workspace location
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize ordertrack workspace
    Init {
        /// Force initialization even if workspace exists
        #[arg(long)]
        force: bool,
    },

    /// Ingest an upload file and reconcile it into the record store
    Ingest {
        /// Input file path (csv, tsv, json, jsonl, parquet)
        input: String,

        /// Scan the first rows for a header instead of trusting row 0
        #[arg(long)]
        scan_header: bool,

        /// Synthesize identifiers for rows with a blank UniqueID
        #[arg(long)]
        synthesize_ids: bool,
    },

    /// List all uploads, newest first
    List {
        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Show one upload and its records
    Show {
        /// Upload id to display
        snapshot: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Show the most recent upload and its records
    Latest {
        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Compare two uploads
    Compare {
        /// Base upload id
        base: String,

        /// Target upload id
        target: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Write JSON results to a file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Free-text search across all record fields
    Search {
        /// Search query
        query: String,

        /// Restrict to one upload (defaults to all records)
        #[arg(long)]
        snapshot: Option<String>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Filter records by field criteria
    Filter {
        /// Criterion as "Field=value" (repeatable; criteria AND together)
        #[arg(long = "where", value_parser = parse_criterion)]
        criteria: Vec<(String, String)>,

        /// Restrict to one upload (defaults to all records)
        #[arg(long)]
        snapshot: Option<String>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// List the distinct values of one field
    Distinct {
        /// Field name
        field: String,

        /// Restrict to one upload (defaults to all records)
        #[arg(long)]
        snapshot: Option<String>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Show one record by identifier
    Record {
        /// Record identifier (UniqueID)
        identifier: String,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Ingest the built-in sample dataset
    Sample,

    /// Delete all records and uploads (settings survive)
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// Parse output format string
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Parse a "Field=value" criterion
fn parse_criterion(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!(
            "Invalid criterion: '{}'. Use the form 'Field=value'",
            s
        )),
    }
}
