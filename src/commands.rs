//! Command implementations for ordertrack CLI

use crate::cli::{Commands, OutputFormat};
use crate::dataset::sample_dataset;
use crate::error::{Result, TrackError};
use crate::header::HeaderLocator;
use crate::output::{JsonFormatter, PrettyPrinter};
use crate::query::Criteria;
use crate::record::IdentifierPolicy;
use crate::source::SourceReader;
use crate::tracker::Tracker;
use crate::workspace::TrackerWorkspace;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Execute a command
pub fn execute_command(command: Commands, workspace_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Init { force } => init_command(workspace_path, force),
        Commands::Ingest {
            input,
            scan_header,
            synthesize_ids,
        } => ingest_command(workspace_path, &input, scan_header, synthesize_ids),
        Commands::List { format } => list_command(workspace_path, &format),
        Commands::Show { snapshot, format } => show_command(workspace_path, &snapshot, &format),
        Commands::Latest { format } => latest_command(workspace_path, &format),
        Commands::Compare {
            base,
            target,
            format,
            output,
        } => compare_command(workspace_path, &base, &target, &format, output.as_deref()),
        Commands::Search {
            query,
            snapshot,
            format,
        } => search_command(workspace_path, &query, snapshot.as_deref(), &format),
        Commands::Filter {
            criteria,
            snapshot,
            format,
        } => filter_command(workspace_path, &criteria, snapshot.as_deref(), &format),
        Commands::Distinct {
            field,
            snapshot,
            format,
        } => distinct_command(workspace_path, &field, snapshot.as_deref(), &format),
        Commands::Record { identifier, format } => {
            record_command(workspace_path, &identifier, &format)
        }
        Commands::Sample => sample_command(workspace_path),
        Commands::Clear { force } => clear_command(workspace_path, force),
    }
}

fn open_tracker(workspace_path: Option<&Path>) -> Result<Tracker> {
    let workspace = TrackerWorkspace::find_or_create(workspace_path)?;
    Tracker::open(&workspace)
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::parse(format).map_err(TrackError::invalid_input)
}

/// Initialize ordertrack workspace
fn init_command(workspace_path: Option<&Path>, force: bool) -> Result<()> {
    let current_dir = std::env::current_dir()?;
    let root = workspace_path.unwrap_or(&current_dir);

    let workspace = if force {
        let workspace = TrackerWorkspace::from_root(root.to_path_buf());
        std::fs::create_dir_all(&workspace.data_dir)?;
        workspace.create_config(true)?;
        workspace.ensure_gitignore()?;
        workspace
    } else {
        // For init, always create in the specified directory rather than
        // searching parents for an existing workspace.
        TrackerWorkspace::create_new(root.to_path_buf())?
    };

    println!("✅ Initialized ordertrack workspace at: {}", workspace.root.display());
    println!("📁 Data directory: {}", workspace.data_dir.display());

    Ok(())
}

/// Ingest an upload file into the record store
fn ingest_command(
    workspace_path: Option<&Path>,
    input: &str,
    scan_header: bool,
    synthesize_ids: bool,
) -> Result<()> {
    let input_path = resolve_input_path(workspace_path, input)?;
    if !SourceReader::is_supported_format(&input_path) {
        return Err(TrackError::invalid_input(format!(
            "Unsupported file format: {}",
            input_path.display()
        )));
    }

    let reader = SourceReader::new()?;
    let dataset = if scan_header {
        let grid = reader.read_grid(&input_path)?;
        HeaderLocator::default().locate_and_remap(&grid)?
    } else {
        reader.read_dataset(&input_path)?
    };

    let mut tracker = open_tracker(workspace_path)?;
    if synthesize_ids {
        tracker = tracker.with_identifier_policy(IdentifierPolicy::Synthesize);
    }

    let filename = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string());

    let snapshot = tracker.ingest(&dataset, &filename)?;

    println!("✅ Ingested upload: {}", snapshot.id);
    println!("├─ Source: {}", snapshot.source_filename);
    println!("├─ Rows: {}", snapshot.row_count);
    println!("└─ Records tracked: {}", tracker.record_count());

    Ok(())
}

/// List all uploads
fn list_command(workspace_path: Option<&Path>, format: &str) -> Result<()> {
    let tracker = open_tracker(workspace_path)?;
    let snapshots = tracker.list_snapshots();

    match parse_format(format)? {
        OutputFormat::Pretty => PrettyPrinter::print_snapshot_list(&snapshots),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&snapshots)?),
    }

    Ok(())
}

/// Show one upload and its records
fn show_command(workspace_path: Option<&Path>, snapshot_id: &str, format: &str) -> Result<()> {
    let tracker = open_tracker(workspace_path)?;
    let snapshot = tracker
        .get_snapshot(snapshot_id)
        .ok_or_else(|| TrackError::SnapshotNotFound {
            id: snapshot_id.to_string(),
        })?;
    let records = tracker.records_of(snapshot_id);

    match parse_format(format)? {
        OutputFormat::Pretty => {
            PrettyPrinter::print_snapshot(&snapshot);
            PrettyPrinter::print_records(&records);
        }
        OutputFormat::Json => {
            let payload = json!({ "snapshot": snapshot, "records": records });
            println!("{}", JsonFormatter::format(&payload)?);
        }
    }

    Ok(())
}

/// Show the most recent upload and its records
fn latest_command(workspace_path: Option<&Path>, format: &str) -> Result<()> {
    let tracker = open_tracker(workspace_path)?;

    let Some(latest) = tracker.latest() else {
        println!("No uploads found.");
        return Ok(());
    };

    match parse_format(format)? {
        OutputFormat::Pretty => {
            PrettyPrinter::print_snapshot(&latest.snapshot);
            PrettyPrinter::print_records(&latest.records);
        }
        OutputFormat::Json => {
            let payload = json!({ "snapshot": latest.snapshot, "records": latest.records });
            println!("{}", JsonFormatter::format(&payload)?);
        }
    }

    Ok(())
}

/// Compare two uploads
fn compare_command(
    workspace_path: Option<&Path>,
    base_id: &str,
    target_id: &str,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let tracker = open_tracker(workspace_path)?;
    let comparison = tracker.compare(base_id, target_id)?;

    if let Some(output_path) = output {
        std::fs::write(output_path, JsonFormatter::format(&comparison)?)?;
        println!("📄 Comparison written to: {}", output_path.display());
    }

    match parse_format(format)? {
        OutputFormat::Pretty => PrettyPrinter::print_comparison(base_id, target_id, &comparison),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&comparison)?),
    }

    Ok(())
}

/// Free-text search across records
fn search_command(
    workspace_path: Option<&Path>,
    query: &str,
    snapshot_id: Option<&str>,
    format: &str,
) -> Result<()> {
    let tracker = open_tracker(workspace_path)?;
    let records = tracker.search(query, snapshot_id);

    match parse_format(format)? {
        OutputFormat::Pretty => PrettyPrinter::print_records(&records),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&records)?),
    }

    Ok(())
}

/// Filter records by field criteria
fn filter_command(
    workspace_path: Option<&Path>,
    raw_criteria: &[(String, String)],
    snapshot_id: Option<&str>,
    format: &str,
) -> Result<()> {
    let tracker = open_tracker(workspace_path)?;

    // Repeated criteria on the same field collapse into an array so that
    // `--where Location Code=LOC001 --where Location Code=LOC002` means
    // membership rather than an unsatisfiable AND.
    let mut criteria = Criteria::new();
    for (field, value) in raw_criteria {
        match criteria.entry(field.clone()) {
            indexmap::map::Entry::Occupied(mut entry) => match entry.get_mut() {
                Value::Array(existing) => existing.push(json!(value)),
                single => {
                    let first = single.take();
                    *single = json!([first, value]);
                }
            },
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(json!(value));
            }
        }
    }

    let records = tracker.filtered(&criteria, snapshot_id);

    match parse_format(format)? {
        OutputFormat::Pretty => PrettyPrinter::print_records(&records),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&records)?),
    }

    Ok(())
}

/// List the distinct values of one field
fn distinct_command(
    workspace_path: Option<&Path>,
    field: &str,
    snapshot_id: Option<&str>,
    format: &str,
) -> Result<()> {
    let tracker = open_tracker(workspace_path)?;
    let values = tracker.distinct(field, snapshot_id);

    match parse_format(format)? {
        OutputFormat::Pretty => PrettyPrinter::print_distinct(field, &values),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&values)?),
    }

    Ok(())
}

/// Show one record by identifier
fn record_command(workspace_path: Option<&Path>, identifier: &str, format: &str) -> Result<()> {
    let tracker = open_tracker(workspace_path)?;
    let record = tracker.get_record(identifier).ok_or_else(|| {
        TrackError::invalid_input(format!("No record with identifier '{}'", identifier))
    })?;

    match parse_format(format)? {
        OutputFormat::Pretty => PrettyPrinter::print_record(&record),
        OutputFormat::Json => println!("{}", JsonFormatter::format(&record)?),
    }

    Ok(())
}

/// Ingest the built-in sample dataset
fn sample_command(workspace_path: Option<&Path>) -> Result<()> {
    let mut tracker = open_tracker(workspace_path)?;
    let snapshot = tracker.ingest(&sample_dataset(), "sample-data")?;

    println!("✅ Ingested sample upload: {}", snapshot.id);
    println!("└─ Rows: {}", snapshot.row_count);

    Ok(())
}

/// Delete all records and uploads after confirmation
fn clear_command(workspace_path: Option<&Path>, force: bool) -> Result<()> {
    let mut tracker = open_tracker(workspace_path)?;

    if tracker.snapshot_count() == 0 && tracker.record_count() == 0 {
        println!("Nothing to clear.");
        return Ok(());
    }

    if !force {
        println!(
            "⚠️  This will delete {} records across {} uploads. Continue? (y/N)",
            tracker.record_count(),
            tracker.snapshot_count()
        );
        let mut user_input = String::new();
        std::io::stdin().read_line(&mut user_input)?;

        if !user_input.trim().to_lowercase().starts_with('y') {
            println!("❌ Clear cancelled.");
            return Ok(());
        }
    }

    tracker.clear_all()?;
    println!("✅ Cleared all records and uploads. Settings were kept.");

    Ok(())
}

fn resolve_input_path(workspace_path: Option<&Path>, input: &str) -> Result<PathBuf> {
    let candidate = Path::new(input);
    let input_path = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else if let Some(root) = workspace_path {
        root.join(candidate)
    } else {
        std::env::current_dir()?.join(candidate)
    };

    if !input_path.exists() {
        return Err(TrackError::invalid_input(format!(
            "Input file does not exist: {}",
            input_path.display()
        )));
    }

    Ok(input_path)
}
