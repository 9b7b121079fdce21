//! Date handling for DevOps Guru insight filters
//!
//! Playbooks write `from_time: 2025-02-10`; the service expects timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::{AiOpsError, AiOpsResult};

const TIME_RANGE_KEYS: [&str; 4] = ["StartTimeRange", "EndTimeRange", "start_time_range", "end_time_range"];
const TIME_KEYS: [&str; 4] = ["FromTime", "ToTime", "from_time", "to_time"];

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn format_utc(dt: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Parse `YYYY-MM-DD` or an RFC3339 timestamp into an RFC3339 UTC string
pub fn convert_time(input: &Value, set_midnight: bool) -> AiOpsResult<String> {
    let text = match input {
        Value::String(s) => s.trim(),
        other => {
            return Err(AiOpsError::validation(format!(
                "Unsupported type for date conversion: {}",
                json_type_name(other)
            )))
        }
    };

    let parsed = match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0),
        Err(date_err) => match DateTime::parse_from_rfc3339(text) {
            Ok(dt) => Some(dt.with_timezone(&Utc).naive_utc()),
            Err(_) => {
                return Err(AiOpsError::validation(format!(
                    "Invalid date format for '{}': {}",
                    text, date_err
                )))
            }
        },
    };

    let mut dt = parsed.ok_or_else(|| AiOpsError::validation(format!("Invalid date format for '{}'", text)))?;
    if set_midnight {
        if let Some(midnight) = dt.date().and_hms_opt(0, 0, 0) {
            dt = midnight;
        }
    }
    Ok(format_utc(dt))
}

/// Convert every `FromTime`/`ToTime` inside the status filter's time ranges
///
/// Only second-level range objects are inspected; anything else passes
/// through untouched.
pub fn convert_time_ranges(mut status_filter: Value) -> AiOpsResult<Value> {
    let Some(statuses) = status_filter.as_object_mut() else {
        return Ok(status_filter);
    };

    for status in statuses.values_mut() {
        let Some(status) = status.as_object_mut() else {
            continue;
        };
        for range_key in TIME_RANGE_KEYS {
            let Some(range) = status.get_mut(range_key).and_then(Value::as_object_mut) else {
                continue;
            };
            for time_key in TIME_KEYS {
                if let Some(value) = range.get_mut(time_key) {
                    let set_midnight = matches!(time_key, "ToTime" | "to_time");
                    *value = Value::String(convert_time(value, set_midnight)?);
                }
            }
        }
    }

    Ok(status_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_convert_pascal_case_keys() {
        let filter = json!({"Any": {"Type": "REACTIVE", "StartTimeRange": {"FromTime": "2025-02-10", "ToTime": "2025-02-12"}}});
        let converted = convert_time_ranges(filter).unwrap();
        assert_eq!(converted["Any"]["StartTimeRange"]["FromTime"], json!("2025-02-10T00:00:00Z"));
        assert_eq!(converted["Any"]["StartTimeRange"]["ToTime"], json!("2025-02-12T00:00:00Z"));
        assert_eq!(converted["Any"]["Type"], json!("REACTIVE"));
    }

    #[test]
    fn test_convert_snake_case_keys() {
        let filter = json!({"Any": {"Type": "PROACTIVE", "start_time_range": {"from_time": "2024-01-01", "to_time": "2024-01-02"}}});
        let converted = convert_time_ranges(filter).unwrap();
        assert_eq!(converted["Any"]["start_time_range"]["from_time"], json!("2024-01-01T00:00:00Z"));
        assert_eq!(converted["Any"]["start_time_range"]["to_time"], json!("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn test_to_time_forced_to_midnight() {
        let filter = json!({"Closed": {"EndTimeRange": {"FromTime": "2024-05-01T10:30:00Z", "ToTime": "2024-05-03T17:45:00+02:00"}}});
        let converted = convert_time_ranges(filter).unwrap();
        assert_eq!(converted["Closed"]["EndTimeRange"]["FromTime"], json!("2024-05-01T10:30:00Z"));
        assert_eq!(converted["Closed"]["EndTimeRange"]["ToTime"], json!("2024-05-03T00:00:00Z"));
    }

    #[test]
    fn test_invalid_format() {
        let filter = json!({"Any": {"StartTimeRange": {"FromTime": "02/10/2025", "ToTime": "2025-02-12"}}});
        let err = convert_time_ranges(filter).unwrap_err();
        assert!(err.to_string().starts_with("Invalid date format for '02/10/2025'"));
    }

    #[test]
    fn test_unsupported_type() {
        let filter = json!({"Any": {"StartTimeRange": {"FromTime": 20250210}}});
        let err = convert_time_ranges(filter).unwrap_err();
        assert!(err.to_string().starts_with("Unsupported type for date conversion"));
    }

    #[test]
    fn test_no_time_keys_unchanged() {
        let filter = json!({"Any": {"Type": "REACTIVE"}, "Ongoing": "skip"});
        assert_eq!(convert_time_ranges(filter.clone()).unwrap(), filter);
    }
}
