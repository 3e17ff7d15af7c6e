//! Utility functions for common operations

use serde_json::Value;

/// Format a dollar amount with thousands separators, rounded to whole dollars
/// (e.g. `250000.0` -> `"$250,000"`)
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}", sign, grouped)
}

/// Numeric view of a JSON value; numeric strings count ("$1,200" does not)
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Text of a value as it goes into a flat-file cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}

/// Inverse of [`cell_text`] for scalars: numbers and booleans are coerced,
/// empty cells become null, anything else stays a string
pub fn parse_cell(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }

    if let Ok(i) = text.parse::<i64>() {
        return Value::from(i);
    }

    if let Ok(f) = text.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }

    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(250000.0), "$250,000");
        assert_eq!(format_usd(1850.0), "$1,850");
        assert_eq!(format_usd(999.0), "$999");
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(1234567.49), "$1,234,567");
        assert_eq!(format_usd(1999.5), "$2,000");
        assert_eq!(format_usd(-1500.0), "-$1,500");
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(value_as_f64(&json!(250000)), Some(250000.0));
        assert_eq!(value_as_f64(&json!(1.5)), Some(1.5));
        assert_eq!(value_as_f64(&json!("1850")), Some(1850.0));
        assert_eq!(value_as_f64(&json!("$1,850")), None);
        assert_eq!(value_as_f64(&json!(null)), None);
        assert_eq!(value_as_f64(&json!([1])), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("Single Family")), "Single Family");
        assert_eq!(cell_text(&json!(250000)), "250000");
        assert_eq!(cell_text(&json!(0.25)), "0.25");
        assert_eq!(cell_text(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(""), json!(null));
        assert_eq!(parse_cell("250000"), json!(250000));
        assert_eq!(parse_cell("0.25"), json!(0.25));
        assert_eq!(parse_cell("true"), json!(true));
        assert_eq!(parse_cell("123 Main St"), json!("123 Main St"));
    }
}
