use serde_json::Value;
use std::io;

use super::{flatten, format_scalar, row_headers};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match value {
        Value::Array(arr) => write_rows(&mut wtr, arr),
        Value::Object(map) => write_fields(&mut wtr, map.get("result").unwrap_or(value)),
        _ => wtr.write_record([format_scalar(value)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        tracing::error!(error = %e, "failed to write CSV output");
        eprintln!("CSV write error: {e}");
    }
}

/// Two-column CSV: field, value.
fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    let mut rows = Vec::new();
    flatten("", value, &mut rows);
    wtr.write_record(["field", "value"])?;
    for (field, val) in rows {
        wtr.write_record([field, val])?;
    }
    Ok(())
}

/// One row per element (e.g. schedule periods).
fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let headers = row_headers(arr);
    if headers.is_empty() {
        for item in arr {
            wtr.write_record([format_scalar(item)])?;
        }
        return Ok(());
    }

    wtr.write_record(&headers)?;
    for item in arr {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h.as_str()).map(format_scalar).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(f: impl FnOnce(&mut csv::Writer<Vec<u8>>) -> csv::Result<()>) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        f(&mut wtr).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_schedule_rows() {
        let rows = vec![
            json!({"period": 1, "payment_date": "2026-01-01", "remaining_balance": "99"}),
            json!({"period": 2, "payment_date": "2026-02-01", "remaining_balance": "0"}),
        ];
        let out = render(|w| write_rows(w, &rows));
        assert_eq!(
            out,
            "payment_date,period,remaining_balance\n2026-01-01,1,99\n2026-02-01,2,0\n"
        );
    }

    #[test]
    fn test_nested_fields() {
        let value = json!({"payment": {"total": "1500"}});
        let out = render(|w| write_fields(w, &value));
        assert_eq!(out, "field,value\npayment.total,1500\n");
    }
}
