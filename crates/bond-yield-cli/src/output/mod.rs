pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Result field holding the per-period rows.
pub const SCHEDULE_KEY: &str = "cashFlowSchedule";

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar for table/CSV cells.
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten one level of nesting (`inputs.faceValue`) and drop the schedule,
/// which is rendered separately.
pub fn flatten_result(map: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(_) if key == SCHEDULE_KEY => {}
            Value::Object(nested) => {
                for (inner, v) in nested {
                    rows.push((format!("{key}.{inner}"), format_scalar(v)));
                }
            }
            _ => rows.push((key.clone(), format_scalar(val))),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_result_skips_schedule() {
        let value = json!({
            "ytmPct": 5.66,
            "inputs": { "faceValue": 1000.0, "couponFrequency": "annual" },
            "cashFlowSchedule": [{ "period": 1 }],
        });
        let rows = flatten_result(value.as_object().unwrap());
        assert_eq!(
            rows,
            vec![
                ("inputs.couponFrequency".to_string(), "annual".to_string()),
                ("inputs.faceValue".to_string(), "1000.0".to_string()),
                ("ytmPct".to_string(), "5.66".to_string()),
            ]
        );
    }

    #[test]
    fn test_format_scalar_joins_arrays() {
        assert_eq!(format_scalar(&json!(["a", "b"])), "a, b");
        assert_eq!(format_scalar(&Value::Null), "");
    }
}
