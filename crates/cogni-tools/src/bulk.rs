use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use cogni_core::ErrorCode;

/// Outcome of one item in a bulk operation. `item_id` is whatever the
/// caller supplied to identify the item (a block id for deletes/updates,
/// an index-derived placeholder for creates before an id exists).
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemResult {
    pub item_id: String,
    pub success: bool,
    pub error: Option<String>,
    pub error_code: Option<ErrorCode>,
    pub data: Option<Value>,
}

impl BulkItemResult {
    pub fn ok(item_id: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            item_id: item_id.into(),
            success: true,
            error: None,
            error_code: None,
            data,
        }
    }

    pub fn failed(item_id: impl Into<String>, error: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            item_id: item_id.into(),
            success: false,
            error: Some(error.into()),
            error_code: Some(code),
            data: None,
        }
    }
}

/// Aggregates a list of per-item results into the bulk-tool response
/// shape shared by `BulkCreateBlocks`/`BulkCreateLinks`/`BulkDeleteBlocks`/
/// `BulkUpdateNamespace`: `success` iff every attempted item succeeded,
/// `partial_success` iff at least one did, a per-code `error_summary`, and
/// the ids of anything skipped after a `stop_on_first_error` short-circuit.
pub fn bulk_envelope(results: &[BulkItemResult], skipped_ids: &[String]) -> Value {
    let successful = results.iter().filter(|r| r.success).count();
    let failed = results.len() - successful;

    let mut error_summary: BTreeMap<&'static str, u32> = BTreeMap::new();
    for r in results {
        if let Some(code) = r.error_code {
            *error_summary.entry(code.as_str()).or_insert(0) += 1;
        }
    }

    json!({
        "success": failed == 0 && skipped_ids.is_empty(),
        "partial_success": successful > 0,
        "total_items": results.len() + skipped_ids.len(),
        "successful_items": successful,
        "failed_items": failed,
        "results": results,
        "skipped_block_ids": skipped_ids,
        "error_summary": error_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_success_yields_success_true_and_no_partial_distinction() {
        let results = vec![BulkItemResult::ok("a", None), BulkItemResult::ok("b", None)];
        let env = bulk_envelope(&results, &[]);
        assert_eq!(env["success"], json!(true));
        assert_eq!(env["partial_success"], json!(true));
        assert_eq!(env["failed_items"], json!(0));
    }

    #[test]
    fn mixed_results_report_partial_success_and_error_summary() {
        let results = vec![
            BulkItemResult::ok("a", None),
            BulkItemResult::failed("missing", "not found", ErrorCode::BlockNotFound),
        ];
        let env = bulk_envelope(&results, &[]);
        assert_eq!(env["success"], json!(false));
        assert_eq!(env["partial_success"], json!(true));
        assert_eq!(env["error_summary"]["BLOCK_NOT_FOUND"], json!(1));
    }

    #[test]
    fn skipped_ids_after_stop_on_first_error_are_reported() {
        let results = vec![BulkItemResult::failed("a", "boom", ErrorCode::InternalError)];
        let env = bulk_envelope(&results, &["b".to_string(), "c".to_string()]);
        assert_eq!(env["skipped_block_ids"], json!(["b", "c"]));
        assert_eq!(env["success"], json!(false));
    }

    #[test]
    fn result_count_plus_skipped_matches_total_items() {
        let results = vec![BulkItemResult::ok("a", None)];
        let skipped = vec!["b".to_string()];
        let env = bulk_envelope(&results, &skipped);
        assert_eq!(env["total_items"], json!(2));
    }
}
