//! End-to-end ingest and reconciliation tests

use crate::common::{sample_data, TestFixture};
use ordertrack::header::HeaderLocator;
use ordertrack::record::RecordStatus;
use ordertrack::source::SourceReader;
use ordertrack::TrackError;
use serde_json::json;

#[test]
fn test_ingest_populates_latest() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();

    let snapshot = tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();

    let latest = tracker.latest().unwrap();
    assert_eq!(latest.snapshot.id, snapshot.id);
    assert_eq!(latest.records.len(), 3);
    assert!(latest
        .records
        .iter()
        .all(|r| r.status == RecordStatus::New));
}

#[test]
fn test_ingested_data_survives_reopen() {
    let fixture = TestFixture::new().unwrap();

    let snapshot = {
        let mut tracker = fixture.tracker().unwrap();
        tracker
            .ingest(&sample_data::baseline_upload(), "orders.csv")
            .unwrap()
    };

    let reopened = fixture.tracker().unwrap();
    assert_eq!(reopened.record_count(), 3);
    assert_eq!(reopened.snapshot_count(), 1);

    let record = reopened.get_record("1002").unwrap();
    assert_eq!(record.snapshot_id, snapshot.id);
    assert_eq!(record.fields["Customer"], json!("TechGiant"));
}

#[test]
fn test_reingest_keeps_one_version_per_identifier() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();

    let first = tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();
    let second = tracker
        .ingest(&sample_data::revised_upload(), "orders_v2.csv")
        .unwrap();

    // 1001 and 1002 were rewritten by the second upload, 1004 is new, and
    // 1003 still belongs to the first upload.
    assert_eq!(tracker.record_count(), 4);
    assert_eq!(tracker.records_of(&second.id).len(), 3);
    assert_eq!(tracker.records_of(&first.id).len(), 1);
    assert_eq!(tracker.records_of(&first.id)[0].identifier, "1003");

    let updated = tracker.get_record("1001").unwrap();
    assert_eq!(updated.status, RecordStatus::Updated);
    assert_eq!(updated.fields["GPU Model"], json!("RTX 5090"));
}

#[test]
fn test_compare_partitions_new_removed_modified() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();

    let first = tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();
    let second = tracker
        .ingest(&sample_data::revised_upload(), "orders_v2.csv")
        .unwrap();

    // Relative to the baseline: 1004 is new, 1003 is gone, 1001 changed its
    // GPU Model, and 1002 is untouched.
    let comparison = tracker.compare(&first.id, &second.id).unwrap();
    assert_eq!(comparison.new_count, 1);
    assert_eq!(comparison.new[0].identifier, "1004");
    assert_eq!(comparison.removed_count, 1);
    assert_eq!(comparison.removed[0].identifier, "1003");
    assert_eq!(comparison.modified_count, 1);
    assert_eq!(comparison.modified[0].identifier, "1001");
}

#[test]
fn test_reingest_end_to_end_scenario() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();

    let first = tracker
        .ingest(&ordertrack::dataset::sample_dataset(), "sample.csv")
        .unwrap();
    assert_eq!(tracker.latest().unwrap().records.len(), 7);
    let first_seen_before = tracker.get_record("1001").unwrap().first_seen;

    let second = tracker
        .ingest(&ordertrack::dataset::sample_dataset(), "sample.csv")
        .unwrap();

    let latest = tracker.latest().unwrap();
    assert_eq!(latest.records.len(), 7);
    for record in &latest.records {
        assert_eq!(record.status, RecordStatus::Updated);
    }

    let after = tracker.get_record("1001").unwrap();
    assert_eq!(after.first_seen, first_seen_before);
    assert!(after.last_seen >= first_seen_before);

    // Nothing actually changed between the two uploads.
    let comparison = tracker.compare(&first.id, &second.id).unwrap();
    assert_eq!(comparison.new_count, 0);
    assert_eq!(comparison.removed_count, 0);
    assert_eq!(comparison.modified_count, 0);
}

#[test]
fn test_missing_required_columns_rejected() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();

    let mut dataset = sample_data::baseline_upload();
    dataset.columns.retain(|c| c != "Fabric Type");
    for row in &mut dataset.rows {
        row.shift_remove("Fabric Type");
    }

    match tracker.ingest(&dataset, "orders.csv") {
        Err(TrackError::MissingColumns { missing }) => {
            assert_eq!(missing, vec!["Fabric Type".to_string()]);
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
    assert_eq!(tracker.snapshot_count(), 0);
}

#[test]
fn test_file_ingest_through_source_reader() {
    let fixture = TestFixture::new().unwrap();
    let csv_path = fixture
        .create_csv("orders.csv", &sample_data::baseline_csv_data())
        .unwrap();

    let reader = SourceReader::new().unwrap();
    let dataset = reader.read_dataset(&csv_path).unwrap();

    let mut tracker = fixture.tracker().unwrap();
    let snapshot = tracker.ingest(&dataset, "orders.csv").unwrap();

    assert_eq!(snapshot.row_count, 3);
    assert_eq!(snapshot.columns.len(), 6);
    assert_eq!(tracker.record_count(), 3);
}

#[test]
fn test_file_ingest_with_header_scan() {
    let fixture = TestFixture::new().unwrap();
    let csv_path = fixture
        .create_csv_raw(
            "export.csv",
            "Weekly Order Export,,,,,\n\
             Generated 2026-08-20,,,,,\n\
             UniqueID,Location Code,Customer,Fabric Type,GPU Model,Quantity\n\
             1001,LOC001,Acme Corp,Cotton,RTX 4090,5\n\
             1002,LOC002,TechGiant,Polyester,RTX 4080,3\n",
        )
        .unwrap();

    let reader = SourceReader::new().unwrap();
    let grid = reader.read_grid(&csv_path).unwrap();
    let dataset = HeaderLocator::default().locate_and_remap(&grid).unwrap();

    let mut tracker = fixture.tracker().unwrap();
    let snapshot = tracker.ingest(&dataset, "export.csv").unwrap();

    assert_eq!(snapshot.row_count, 2);
    assert_eq!(
        tracker.get_record("1001").unwrap().fields["Customer"],
        json!("Acme Corp")
    );
}

#[test]
fn test_snapshot_ids_strictly_increase() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();

    let first = tracker
        .ingest(&sample_data::baseline_upload(), "a.csv")
        .unwrap();
    let second = tracker
        .ingest(&sample_data::baseline_upload(), "b.csv")
        .unwrap();

    let first_id: u128 = first.id.parse().unwrap();
    let second_id: u128 = second.id.parse().unwrap();
    assert!(second_id > first_id);
}
