pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Flatten nested objects into dotted `field.sub` rows. Arrays of objects
/// (schedules) collapse to a row count; scalar arrays are joined.
pub(crate) fn flatten(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&name, val, rows);
            }
        }
        _ => rows.push((prefix.to_string(), format_scalar(value))),
    }
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) if arr.iter().any(Value::is_object) => format!("[{} rows]", arr.len()),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Union of keys across rows, in first-seen order.
pub(crate) fn row_headers(arr: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for item in arr {
        if let Value::Object(map) = item {
            for key in map.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_payment() {
        let value = json!({
            "home_price": "425000",
            "payment": { "total": "3269.45", "hoa": "0" },
            "funding_fee": null,
        });
        let mut rows = Vec::new();
        flatten("", &value, &mut rows);
        assert!(rows.contains(&("payment.total".to_string(), "3269.45".to_string())));
        assert!(rows.contains(&("funding_fee".to_string(), String::new())));
    }

    #[test]
    fn test_schedule_collapses_to_count() {
        let value = json!([{ "period": 1 }, { "period": 2 }]);
        assert_eq!(format_scalar(&value), "[2 rows]");
    }

    #[test]
    fn test_row_headers_union() {
        let rows = vec![json!({"a": 1}), json!({"a": 2, "b": 3})];
        assert_eq!(row_headers(&rows), vec!["a".to_string(), "b".to_string()]);
    }
}
