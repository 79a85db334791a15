use chrono::Utc;
use serde_json::{json, Value};

use crate::error::ToolError;

/// Builds the minimal response envelope every tool call returns:
/// `success`, `timestamp`, and (for memory-linked tools) `active_branch`.
/// `extra` fields are merged in on top, so a tool's own result fields
/// (`id`, `results`, …) sit alongside the common ones.
pub fn success_envelope(extra: Value, active_branch: Option<&str>) -> Value {
    let mut map = match extra {
        Value::Object(m) => m,
        Value::Null => serde_json::Map::new(),
        other => {
            let mut m = serde_json::Map::new();
            m.insert("result".to_string(), other);
            m
        }
    };
    // A bulk tool's own `success`/`partial_success` accounting (false when
    // any item failed) must survive the envelope, not be clobbered by the
    // default "the dispatch itself didn't throw" true.
    map.entry("success").or_insert_with(|| json!(true));
    map.insert("timestamp".to_string(), json!(Utc::now()));
    if let Some(branch) = active_branch {
        map.entry("active_branch").or_insert_with(|| json!(branch));
    }
    Value::Object(map)
}

/// Builds the standard error envelope: `success: false`, the stable
/// `error_code`, a human `error` message, `timestamp`, and the active
/// branch when known — never the sentinel string `"unknown"` per §7.
pub fn error_envelope(err: &ToolError, active_branch: Option<&str>) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("success".to_string(), json!(false));
    map.insert("error".to_string(), json!(err.to_string()));
    map.insert("error_code".to_string(), json!(err.code().as_str()));
    map.insert("timestamp".to_string(), json!(Utc::now()));
    if let Some(branch) = active_branch {
        map.insert("active_branch".to_string(), json!(branch));
    }
    if let Some(previous_version) = err.previous_version() {
        map.insert("previous_version".to_string(), json!(previous_version));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_merges_extra_fields() {
        let env = success_envelope(json!({"id": "abc"}), Some("main"));
        assert_eq!(env["success"], json!(true));
        assert_eq!(env["id"], json!("abc"));
        assert_eq!(env["active_branch"], json!("main"));
    }

    #[test]
    fn error_envelope_never_uses_unknown_sentinel() {
        let err = ToolError::Validation("bad input".into());
        let env = error_envelope(&err, None);
        assert_eq!(env["success"], json!(false));
        assert_eq!(env["error_code"], json!("VALIDATION_ERROR"));
        assert!(env.get("active_branch").is_none());
    }
}
