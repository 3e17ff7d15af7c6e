//! Parse functions - reshape raw records into tables and plot values

use crate::pipeline::types::{EstimateKind, EstimateRecord, EstimateTable, PlotValues};
use crate::pipeline::utils::value_as_f64;
use serde_json::{Map, Value};
use tracing::debug;

/// Flatten a record into a single-row table; an empty record gives zero rows
/// Pure function - no side effects
pub fn normalize(record: &EstimateRecord) -> EstimateTable {
    if record.is_empty() {
        return EstimateTable::empty();
    }

    let mut columns = Vec::new();
    let mut row = Vec::new();
    flatten_into(record.fields(), None, &mut columns, &mut row);

    debug!("Normalized record into {} columns", columns.len());

    EstimateTable {
        columns,
        rows: vec![row],
    }
}

/// Nested objects become dotted column names; arrays and scalars are kept whole
fn flatten_into(
    fields: &Map<String, Value>,
    prefix: Option<&str>,
    columns: &mut Vec<String>,
    row: &mut Vec<Value>,
) {
    for (key, value) in fields {
        let name = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };

        match value {
            Value::Object(nested) if !nested.is_empty() => {
                flatten_into(nested, Some(name.as_str()), columns, row);
            }
            other => {
                columns.push(name);
                row.push(other.clone());
            }
        }
    }
}

/// Pull the [estimate, low, high] numbers out of a table
///
/// `None` when the table is empty or the point estimate is missing, null or
/// non-numeric. Missing range bounds stay `None` and plot as gaps.
pub fn extract_plot_values(table: &EstimateTable, kind: EstimateKind) -> Option<PlotValues> {
    let estimate = table.first(kind.estimate_field()).and_then(value_as_f64)?;

    Some(PlotValues {
        estimate,
        low: table.first(kind.low_field()).and_then(value_as_f64),
        high: table.first(kind.high_field()).and_then(value_as_f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EstimateRecord {
        match value {
            Value::Object(fields) => EstimateRecord::new(fields),
            _ => panic!("test records must be objects"),
        }
    }

    #[test]
    fn test_normalize_flat_record() {
        let rec = record(json!({
            "price": 250000,
            "priceRangeLow": 230000,
            "priceRangeHigh": 270000
        }));

        let table = normalize(&rec);

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.columns, vec!["price", "priceRangeLow", "priceRangeHigh"]);
        assert_eq!(table.first("priceRangeHigh"), Some(&json!(270000)));
    }

    #[test]
    fn test_normalize_nested_record() {
        let rec = record(json!({
            "rent": 1850,
            "subjectProperty": {
                "city": "San Antonio",
                "location": { "latitude": 29.47, "longitude": -98.35 }
            },
            "comparables": [{ "id": "a" }, { "id": "b" }]
        }));

        let table = normalize(&rec);

        assert_eq!(
            table.columns,
            vec![
                "rent",
                "subjectProperty.city",
                "subjectProperty.location.latitude",
                "subjectProperty.location.longitude",
                "comparables",
            ]
        );
        assert_eq!(table.first("subjectProperty.city"), Some(&json!("San Antonio")));
        assert_eq!(
            table.first("comparables"),
            Some(&json!([{ "id": "a" }, { "id": "b" }]))
        );
    }

    #[test]
    fn test_normalize_empty_record() {
        let table = normalize(&EstimateRecord::default());

        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }

    #[test]
    fn test_normalize_keeps_empty_nested_object_as_value() {
        let rec = record(json!({ "rent": 1850, "extra": {} }));
        let table = normalize(&rec);

        assert_eq!(table.columns, vec!["rent", "extra"]);
        assert_eq!(table.first("extra"), Some(&json!({})));
    }

    #[test]
    fn test_extract_plot_values() {
        let table = normalize(&record(json!({
            "rentRangeHigh": 2000,
            "rent": 1850,
            "rentRangeLow": "1700"
        })));

        let values = extract_plot_values(&table, EstimateKind::Rent).unwrap();

        assert_eq!(values.estimate, 1850.0);
        assert_eq!(values.low, Some(1700.0));
        assert_eq!(values.high, Some(2000.0));
    }

    #[test]
    fn test_extract_plot_values_missing_range() {
        let table = normalize(&record(json!({ "price": 250000, "priceRangeLow": null })));

        let values = extract_plot_values(&table, EstimateKind::Value).unwrap();

        assert_eq!(values.in_bar_order(), [Some(250000.0), None, None]);
    }

    #[test]
    fn test_extract_plot_values_without_estimate() {
        let table = normalize(&record(json!({ "priceRangeLow": 230000 })));
        assert!(extract_plot_values(&table, EstimateKind::Value).is_none());

        let table = normalize(&record(json!({ "price": null })));
        assert!(extract_plot_values(&table, EstimateKind::Value).is_none());

        // Rent fields do not satisfy a value chart
        let table = normalize(&record(json!({ "rent": 1850 })));
        assert!(extract_plot_values(&table, EstimateKind::Value).is_none());

        assert!(extract_plot_values(&EstimateTable::empty(), EstimateKind::Rent).is_none());
    }
}
