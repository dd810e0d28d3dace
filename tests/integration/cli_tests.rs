//! CLI command tests

use crate::common::{sample_data, CliTestRunner};
use ordertrack::TrackError;

#[test]
fn test_init_command() {
    let runner = CliTestRunner::new().unwrap();

    // Fixture already initialized; a second init is a no-op.
    runner.expect_success(&["init"]);
    assert!(runner.fixture().root().join(".ordertrack").exists());
    assert!(runner
        .fixture()
        .root()
        .join(".ordertrack")
        .join("config.json")
        .exists());
}

#[test]
fn test_ingest_then_list_and_show() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_csv("orders.csv", &sample_data::baseline_csv_data())
        .unwrap();

    runner.expect_success(&["ingest", "orders.csv"]);
    runner.expect_success(&["list"]);
    runner.expect_success(&["list", "--format", "json"]);
    runner.expect_success(&["latest"]);

    let tracker = runner.fixture().tracker().unwrap();
    assert_eq!(tracker.record_count(), 3);

    let snapshot_id = tracker.latest().unwrap().snapshot.id;
    runner.expect_success(&["show", &snapshot_id]);
}

#[test]
fn test_ingest_rejects_unsupported_format() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_csv_raw("orders.xlsx", "not a spreadsheet")
        .unwrap();

    let error = runner.expect_failure(&["ingest", "orders.xlsx"]);
    assert!(matches!(error, TrackError::InvalidInput { .. }));
}

#[test]
fn test_ingest_missing_file_fails() {
    let runner = CliTestRunner::new().unwrap();
    let error = runner.expect_failure(&["ingest", "does_not_exist.csv"]);
    assert!(matches!(error, TrackError::InvalidInput { .. }));
}

#[test]
fn test_compare_command_writes_output_file() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_csv("orders.csv", &sample_data::baseline_csv_data())
        .unwrap();

    runner.expect_success(&["ingest", "orders.csv"]);
    runner.expect_success(&["ingest", "orders.csv"]);

    let tracker = runner.fixture().tracker().unwrap();
    let snapshots = tracker.list_snapshots();
    assert_eq!(snapshots.len(), 2);

    let output = runner.fixture().root().join("comparison.json");
    runner.expect_success(&[
        "compare",
        &snapshots[1].id,
        &snapshots[0].id,
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(output.exists());

    let error = runner.expect_failure(&["compare", &snapshots[0].id, "bogus"]);
    assert!(matches!(error, TrackError::SnapshotNotFound { .. }));
}

#[test]
fn test_query_commands() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["sample"]);

    runner.expect_success(&["search", "acme"]);
    runner.expect_success(&["filter", "--where", "Location Code=LOC001"]);
    runner.expect_success(&[
        "filter",
        "--where",
        "Location Code=LOC001",
        "--where",
        "Location Code=LOC002",
    ]);
    runner.expect_success(&["distinct", "GPU Model", "--format", "json"]);
    runner.expect_success(&["record", "1001"]);

    let error = runner.expect_failure(&["record", "9999"]);
    assert!(matches!(error, TrackError::InvalidInput { .. }));
}

#[test]
fn test_clear_force_wipes_data() {
    let runner = CliTestRunner::new().unwrap();
    runner.expect_success(&["sample"]);
    runner.expect_success(&["clear", "--force"]);

    let tracker = runner.fixture().tracker().unwrap();
    assert_eq!(tracker.record_count(), 0);
    assert_eq!(tracker.snapshot_count(), 0);
}
