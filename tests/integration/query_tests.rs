//! Query layer tests through the tracker facade

use crate::common::{sample_data, TestFixture};
use ordertrack::query::Criteria;
use serde_json::json;

#[test]
fn test_filter_by_field_criteria() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();
    tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();

    let mut criteria = Criteria::new();
    criteria.insert("Location Code".to_string(), json!("LOC001"));

    let records = tracker.filtered(&criteria, None);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.fields["Location Code"] == json!("LOC001")));
}

#[test]
fn test_filter_with_array_membership() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();
    tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();

    let mut criteria = Criteria::new();
    criteria.insert("GPU Model".to_string(), json!(["RTX 4090", "RTX 4080"]));

    let records = tracker.filtered(&criteria, None);
    assert_eq!(records.len(), 2);
}

#[test]
fn test_filter_scoped_to_snapshot() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();

    tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();
    let second = tracker
        .ingest(&sample_data::revised_upload(), "orders_v2.csv")
        .unwrap();

    let mut criteria = Criteria::new();
    criteria.insert("Location Code".to_string(), json!("LOC001"));

    // 1003 (LOC001) is stale: it belongs to the first upload only.
    let scoped = tracker.filtered(&criteria, Some(&second.id));
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].identifier, "1001");

    let unscoped = tracker.filtered(&criteria, None);
    assert_eq!(unscoped.len(), 2);
}

#[test]
fn test_search_across_all_fields() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();
    tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();

    let by_customer = tracker.search("techgiant", None);
    assert_eq!(by_customer.len(), 1);
    assert_eq!(by_customer[0].identifier, "1002");

    let by_gpu = tracker.search("RTX", None);
    assert_eq!(by_gpu.len(), 3);

    assert!(tracker.search("no such thing", None).is_empty());
}

#[test]
fn test_empty_search_is_scoped_listing() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();
    let snapshot = tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();

    assert_eq!(tracker.search("  ", Some(&snapshot.id)).len(), 3);
    assert!(tracker.search("", None).is_empty());
}

#[test]
fn test_distinct_values_sorted() {
    let fixture = TestFixture::new().unwrap();
    let mut tracker = fixture.tracker().unwrap();
    tracker
        .ingest(&sample_data::baseline_upload(), "orders.csv")
        .unwrap();

    let locations = tracker.distinct("Location Code", None);
    assert_eq!(locations, vec![json!("LOC001"), json!("LOC002")]);

    assert!(tracker.distinct("No Such Field", None).is_empty());
}

#[test]
fn test_settings_round_trip() {
    let fixture = TestFixture::new().unwrap();

    {
        let mut tracker = fixture.tracker().unwrap();
        tracker
            .save_setting("default_view", json!("latest"))
            .unwrap();
    }

    let reopened = fixture.tracker().unwrap();
    assert_eq!(reopened.get_setting("default_view"), Some(json!("latest")));
    assert_eq!(reopened.get_setting("missing"), None);
}
