//! Write functions - persist raw records to flat files

use crate::error::Result;
use crate::pipeline::types::EstimateRecord;
use crate::pipeline::utils::{cell_text, parse_cell};
use serde_json::Map;
use std::path::Path;
use tracing::{debug, info};

/// Write one record as a CSV file with a header row and one data row,
/// replacing any existing file
///
/// Columns are the record's top-level keys; nested values are written as
/// compact JSON. Nothing ties the column set to earlier runs.
pub fn write_record_csv(record: &EstimateRecord, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(record.fields().keys())?;
    writer.write_record(record.fields().values().map(cell_text))?;
    writer.flush()?;

    info!("Saved {} columns to {:?}", record.fields().len(), path);

    Ok(())
}

/// Read back a file written by [`write_record_csv`]
///
/// Numeric and boolean cells are coerced back to JSON numbers/booleans and
/// empty cells to null; everything else comes back as a string.
pub fn read_record_csv(path: &Path) -> Result<EstimateRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let row = match reader.records().next() {
        Some(row) => row?,
        None => {
            debug!("{:?} has no data row", path);
            return Ok(EstimateRecord::default());
        }
    };

    let fields: Map<_, _> = headers
        .iter()
        .zip(row.iter())
        .map(|(name, cell)| (name.to_string(), parse_cell(cell)))
        .collect();

    Ok(EstimateRecord::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::tempdir;

    fn record(value: Value) -> EstimateRecord {
        match value {
            Value::Object(fields) => EstimateRecord::new(fields),
            _ => panic!("test records must be objects"),
        }
    }

    #[test]
    fn test_write_record_csv_layout() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("rent_estimate.csv");

        let rec = record(json!({
            "rent": 1850,
            "rentRangeLow": 1700,
            "rentRangeHigh": 2000,
            "propertyType": "Single Family"
        }));

        write_record_csv(&rec, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "rent,rentRangeLow,rentRangeHigh,propertyType",
                "1850,1700,2000,Single Family",
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("value_estimate.csv");

        let rec = record(json!({
            "price": 250000,
            "priceRangeLow": 230000,
            "priceRangeHigh": 270000,
            "latitude": 29.47,
            "formattedAddress": "123 Main St, San Antonio, TX 78244",
            "lastSaleDate": null
        }));

        write_record_csv(&rec, &path).unwrap();
        let back = read_record_csv(&path).unwrap();

        assert_eq!(back, rec);
    }

    #[test]
    fn test_round_trip_nested_values_come_back_as_text() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested.csv");

        let rec = record(json!({
            "rent": 1850,
            "comparables": [{ "id": "a", "price": 1800 }]
        }));

        write_record_csv(&rec, &path).unwrap();
        let back = read_record_csv(&path).unwrap();

        assert_eq!(back.get("rent"), Some(&json!(1850)));
        assert_eq!(
            back.get("comparables"),
            Some(&json!(r#"[{"id":"a","price":1800}]"#))
        );
    }

    #[test]
    fn test_write_overwrites_previous_columns() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("estimate.csv");

        write_record_csv(&record(json!({ "a": 1, "b": 2, "c": 3 })), &path).unwrap();
        write_record_csv(&record(json!({ "rent": 1850 })), &path).unwrap();

        let back = read_record_csv(&path).unwrap();
        assert_eq!(back, record(json!({ "rent": 1850 })));
    }

    #[test]
    fn test_read_missing_file_fails() {
        let temp = tempdir().unwrap();
        assert!(read_record_csv(&temp.path().join("missing.csv")).is_err());
    }
}
