use serde_json::Value;

use crate::error::ToolError;

/// Default cap on how many times a string payload is re-parsed as JSON
/// before normalization gives up. Matches the `dict -> JSON string ->
/// escaped JSON string` double-serialization pattern agent frameworks are
/// known to produce: two peels succeed, a third fails.
pub const DEFAULT_MAX_DEPTH: u32 = 2;

/// Normalizes a raw tool payload that may be a map, a JSON string, or a
/// JSON string containing a JSON string (nested up to `max_depth` times).
///
/// Repeatedly parses while the current value is a string. A list is
/// accepted at any point (bulk tools take a top-level array); any other
/// leaf type is rejected. Exceeding `max_depth` fails with a precise
/// error rather than looping forever on a malformed payload.
pub fn normalize_input(raw: Value, max_depth: u32) -> Result<Value, ToolError> {
    let mut current = raw;
    let mut depth = 0;

    while let Value::String(s) = &current {
        if depth >= max_depth {
            return Err(ToolError::Validation(format!(
                "max recursion depth ({max_depth}) exceeded while normalizing input"
            )));
        }
        let parsed: Value = serde_json::from_str(s)
            .map_err(|e| ToolError::Validation(format!("failed to parse JSON at depth {depth}: {e}")))?;
        if parsed == current {
            break;
        }
        current = parsed;
        depth += 1;
    }

    match &current {
        Value::Object(_) | Value::Array(_) => Ok(current),
        other => Err(ToolError::Validation(format!(
            "normalized input must be an object or array, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_object_passes_through_unchanged() {
        let input = serde_json::json!({"a": 1});
        assert_eq!(normalize_input(input.clone(), DEFAULT_MAX_DEPTH).unwrap(), input);
    }

    #[test]
    fn single_serialized_string_is_parsed_once() {
        let inner = serde_json::json!({"a": 1});
        let once = Value::String(inner.to_string());
        assert_eq!(normalize_input(once, DEFAULT_MAX_DEPTH).unwrap(), inner);
    }

    #[test]
    fn double_serialized_string_is_parsed_twice() {
        let inner = serde_json::json!({"a": 1});
        let once = Value::String(inner.to_string());
        let twice = Value::String(serde_json::to_string(&once).unwrap());
        assert_eq!(normalize_input(twice, DEFAULT_MAX_DEPTH).unwrap(), inner);
    }

    #[test]
    fn triple_serialized_string_exceeds_default_depth() {
        let inner = serde_json::json!({"a": 1});
        let once = Value::String(inner.to_string());
        let twice = Value::String(serde_json::to_string(&once).unwrap());
        let thrice = Value::String(serde_json::to_string(&twice).unwrap());
        assert!(normalize_input(thrice, DEFAULT_MAX_DEPTH).is_err());
    }

    #[test]
    fn malformed_json_string_fails_with_parse_error() {
        let bad = Value::String("{not json".into());
        assert!(normalize_input(bad, DEFAULT_MAX_DEPTH).is_err());
    }

    #[test]
    fn top_level_list_is_accepted_for_bulk_tools() {
        let list = serde_json::json!([{"a": 1}, {"b": 2}]);
        assert_eq!(normalize_input(list.clone(), DEFAULT_MAX_DEPTH).unwrap(), list);
    }

    #[test]
    fn bare_number_is_rejected() {
        assert!(normalize_input(serde_json::json!(42), DEFAULT_MAX_DEPTH).is_err());
    }
}
