//! Filtering, free-text search, and distinct-value enumeration
//!
//! Pure predicates over records; criteria are passed explicitly per call,
//! the query layer holds no state of its own.

use crate::record::Record;
use indexmap::IndexMap;
use serde_json::Value;

/// Filter criteria: field name → expected value.
///
/// An array value matches when the record's field is a member (an empty
/// array matches everything); a string criterion against a string field is
/// case-insensitive substring containment; anything else is exact equality.
/// Criteria combine with logical AND.
pub type Criteria = IndexMap<String, Value>;

/// The string form of a field value, as used by search and distinct sorting.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// True when the record satisfies every criterion.
pub fn matches_criteria(record: &Record, criteria: &Criteria) -> bool {
    criteria.iter().all(|(key, criterion)| {
        let field = record.fields.get(key).unwrap_or(&Value::Null);

        match criterion {
            Value::Array(allowed) => allowed.is_empty() || allowed.contains(field),
            Value::String(wanted) => match field {
                Value::String(actual) => actual
                    .to_lowercase()
                    .contains(&wanted.to_lowercase()),
                other => criterion == other,
            },
            other => other == field,
        }
    })
}

/// True when any field's string form contains the (already lowercased,
/// trimmed, non-empty) query.
pub fn matches_search(record: &Record, query_lower: &str) -> bool {
    record
        .fields
        .values()
        .any(|value| match value {
            Value::Null => false,
            other => display_text(other).to_lowercase().contains(query_lower),
        })
}

/// Collect the unique non-null values of one field, sorted ascending by
/// string form.
pub fn distinct_values<'a>(records: impl Iterator<Item = &'a Record>, field: &str) -> Vec<Value> {
    let mut values: Vec<Value> = Vec::new();

    for record in records {
        if let Some(value) = record.fields.get(field) {
            if !value.is_null() && !values.contains(value) {
                values.push(value.clone());
            }
        }
    }

    values.sort_by_key(|value| display_text(value));
    values
}
