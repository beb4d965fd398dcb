use serde_json::Value;

use super::format_scalar;

/// Headline figure of each calculator, by dotted path, in priority order.
const HEADLINE_PATHS: [&str; 6] = [
    "recommended_home_price",
    "payment.total",
    "monthly_payment",
    "fee_amount",
    "within_limits",
    "version",
];

/// Print just the key answer value from the output, falling back to the
/// first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(headline) = headline(result_obj) {
        println!("{}", format_scalar(headline));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}

fn headline(result: &Value) -> Option<&Value> {
    HEADLINE_PATHS.iter().find_map(|path| {
        path.split('.')
            .try_fold(result, |node, key| node.get(key))
            .filter(|v| !v.is_null())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mortgage_headline_is_total_payment() {
        let result = json!({
            "funding_fee_amount": "9137.5",
            "payment": { "principal_and_interest": "2744.05", "total": "3269.05" },
        });
        assert_eq!(headline(&result), Some(&json!("3269.05")));
    }

    #[test]
    fn test_affordability_headline_wins_over_nested_payment() {
        let result = json!({
            "recommended_home_price": "294907",
            "recommended": { "payment": { "total": "2299" } },
        });
        assert_eq!(headline(&result), Some(&json!("294907")));
    }

    #[test]
    fn test_no_headline() {
        assert_eq!(headline(&json!({"period": 1})), None);
    }
}
