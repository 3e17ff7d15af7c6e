//! Core data types for the estimate pipeline
//! Pure data structures, plus the per-kind lookup tables

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// RentCast property types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    SingleFamily,
    Condo,
    Townhouse,
    Manufactured,
    MultiFamily,
    Apartment,
    Land,
}

impl PropertyType {
    pub const ALL: [PropertyType; 7] = [
        PropertyType::SingleFamily,
        PropertyType::Condo,
        PropertyType::Townhouse,
        PropertyType::Manufactured,
        PropertyType::MultiFamily,
        PropertyType::Apartment,
        PropertyType::Land,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "Single Family",
            PropertyType::Condo => "Condo",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::Manufactured => "Manufactured",
            PropertyType::MultiFamily => "Multi-Family",
            PropertyType::Apartment => "Apartment",
            PropertyType::Land => "Land",
        }
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown property type '{0}'")]
pub struct ParsePropertyTypeError(pub String);

impl FromStr for PropertyType {
    type Err = ParsePropertyTypeError;

    /// Accepts "Single Family", "single-family", "single_family", ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_type_name(s);
        PropertyType::ALL
            .into_iter()
            .find(|t| normalize_type_name(t.as_str()) == wanted)
            .ok_or_else(|| ParsePropertyTypeError(s.to_string()))
    }
}

fn normalize_type_name(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Which AVM estimate to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateKind {
    Value,
    Rent,
}

impl EstimateKind {
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            EstimateKind::Value => "avm/value",
            EstimateKind::Rent => "avm/rent/long-term",
        }
    }

    /// Point-estimate field name in the API response
    pub fn estimate_field(&self) -> &'static str {
        match self {
            EstimateKind::Value => "price",
            EstimateKind::Rent => "rent",
        }
    }

    pub fn low_field(&self) -> &'static str {
        match self {
            EstimateKind::Value => "priceRangeLow",
            EstimateKind::Rent => "rentRangeLow",
        }
    }

    pub fn high_field(&self) -> &'static str {
        match self {
            EstimateKind::Value => "priceRangeHigh",
            EstimateKind::Rent => "rentRangeHigh",
        }
    }

    /// Chart bar labels, in bar order [estimate, low, high]
    pub fn bar_labels(&self) -> [&'static str; 3] {
        match self {
            EstimateKind::Value => ["Est. Value", "Low Range", "High Range"],
            EstimateKind::Rent => ["Est. Rent", "Low Range", "High Range"],
        }
    }

    pub fn chart_title(&self, label: &str) -> String {
        match self {
            EstimateKind::Value => format!("Property Value Estimate for: {}", label),
            EstimateKind::Rent => format!("Rent Estimate for: {}", label),
        }
    }

    pub fn y_axis_label(&self) -> &'static str {
        match self {
            EstimateKind::Value => "Value (USD)",
            EstimateKind::Rent => "Monthly Rent (USD)",
        }
    }

    /// Only the value endpoint takes a comparables count
    pub fn sends_comp_count(&self) -> bool {
        matches!(self, EstimateKind::Value)
    }

    /// File name stem used when the caller gives no output base
    pub fn default_file_base(&self) -> &'static str {
        match self {
            EstimateKind::Value => "value_estimate",
            EstimateKind::Rent => "rent_estimate",
        }
    }

    /// Lowercase noun for user-facing notices ("value", "rent")
    pub fn noun(&self) -> &'static str {
        match self {
            EstimateKind::Value => "value",
            EstimateKind::Rent => "rent",
        }
    }
}

impl std::fmt::Display for EstimateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateKind::Value => write!(f, "Property Value Estimate"),
            EstimateKind::Rent => write!(f, "Rental Estimates"),
        }
    }
}

/// Property description sent to the AVM endpoints
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyQuery {
    pub address: String,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: f32,
    pub square_footage: u32,
}

impl PropertyQuery {
    /// Query with the default property description
    pub fn new(address: impl Into<String>) -> Self {
        PropertyQuery {
            address: address.into(),
            property_type: PropertyType::SingleFamily,
            bedrooms: 3,
            bathrooms: 2.0,
            square_footage: 1500,
        }
    }

    /// Query parameters in the order the API documents them
    pub fn query_params(&self, kind: EstimateKind, comp_count: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("address", self.address.clone()),
            ("propertyType", self.property_type.to_string()),
            ("bedrooms", self.bedrooms.to_string()),
            ("bathrooms", self.bathrooms.to_string()),
            ("squareFootage", self.square_footage.to_string()),
        ];

        if kind.sends_comp_count() {
            params.push(("compCount", comp_count.to_string()));
        }

        params
    }
}

/// Untyped API response: top-level field name to JSON value, in response order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimateRecord(pub Map<String, Value>);

impl EstimateRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        EstimateRecord(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Tabular view of a record: zero rows (empty) or exactly one row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimateTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl EstimateTable {
    pub fn empty() -> Self {
        EstimateTable::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Value of `column` in the first row
    pub fn first(&self, column: &str) -> Option<&Value> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.first().and_then(|row| row.get(idx))
    }

    /// (column, value) pairs of the first row
    pub fn first_row(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.rows.first().into_iter().flatten())
    }
}

/// The three numbers a chart is drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotValues {
    pub estimate: f64,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl PlotValues {
    /// Values in bar order [estimate, low, high]
    pub fn in_bar_order(&self) -> [Option<f64>; 3] {
        [Some(self.estimate), self.low, self.high]
    }
}

/// Encoded PNG chart; zero length means "no chart"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartArtifact(pub Vec<u8>);

impl ChartArtifact {
    pub fn none() -> Self {
        ChartArtifact(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Paths written by a file-persisting run; `None` when that step was skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFiles {
    pub csv: Option<PathBuf>,
    pub chart: Option<PathBuf>,
}

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub kind: EstimateKind,
    pub query: PropertyQuery,
    pub record: EstimateRecord,
    pub table: EstimateTable,
    pub chart: ChartArtifact,
    pub files: Option<OutputFiles>,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_property_type() {
        assert_eq!(
            "Single Family".parse::<PropertyType>(),
            Ok(PropertyType::SingleFamily)
        );
        assert_eq!(
            "single-family".parse::<PropertyType>(),
            Ok(PropertyType::SingleFamily)
        );
        assert_eq!(
            "multi_family".parse::<PropertyType>(),
            Ok(PropertyType::MultiFamily)
        );
        assert_eq!("condo".parse::<PropertyType>(), Ok(PropertyType::Condo));
        assert!("castle".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_property_type_names_match_api() {
        for property_type in PropertyType::ALL {
            assert_eq!(
                property_type.to_string().parse::<PropertyType>(),
                Ok(property_type)
            );
        }
        assert_eq!(PropertyType::MultiFamily.to_string(), "Multi-Family");

        let params = PropertyQuery::new("1 Elm St").query_params(EstimateKind::Rent, 5);
        assert_eq!(params[1], ("propertyType", "Single Family".to_string()));
    }

    #[test]
    fn test_value_query_params_include_comp_count() {
        let query = PropertyQuery::new("123 Main St");
        let params = query.query_params(EstimateKind::Value, 5);

        assert_eq!(
            params,
            vec![
                ("address", "123 Main St".to_string()),
                ("propertyType", "Single Family".to_string()),
                ("bedrooms", "3".to_string()),
                ("bathrooms", "2".to_string()),
                ("squareFootage", "1500".to_string()),
                ("compCount", "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_rent_query_params_skip_comp_count() {
        let mut query = PropertyQuery::new("123 Main St");
        query.bathrooms = 2.5;

        let params = query.query_params(EstimateKind::Rent, 5);

        assert_eq!(params.len(), 5);
        assert!(params.iter().all(|(k, _)| *k != "compCount"));
        assert!(params.contains(&("bathrooms", "2.5".to_string())));
    }

    #[test]
    fn test_kind_field_names() {
        assert_eq!(EstimateKind::Value.estimate_field(), "price");
        assert_eq!(EstimateKind::Rent.low_field(), "rentRangeLow");
        assert_eq!(EstimateKind::Rent.endpoint_path(), "avm/rent/long-term");
        assert_eq!(EstimateKind::Value.bar_labels()[0], "Est. Value");
    }

    #[test]
    fn test_table_first() {
        let table = EstimateTable {
            columns: vec!["price".to_string(), "address".to_string()],
            rows: vec![vec![json!(250000), json!("123 Main St")]],
        };

        assert_eq!(table.first("price"), Some(&json!(250000)));
        assert_eq!(table.first("missing"), None);
        assert_eq!(table.first_row().count(), 2);
        assert!(EstimateTable::empty().first("price").is_none());
    }
}
