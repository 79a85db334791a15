mod common;

use serde_json::json;

#[tokio::test]
async fn bulk_delete_reports_partial_success_with_an_error_summary() {
    let executor = common::executor();

    let valid_id = executor.dispatch("CreateMemoryBlock", json!({"type": "knowledge", "text": "keep me gone"})).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = executor
        .dispatch(
            "BulkDeleteBlocks",
            json!({
                "blocks": [
                    {"block_id": valid_id},
                    {"block_id": "does-not-exist"},
                ],
                "stop_on_first_error": false,
            }),
        )
        .await;

    assert_eq!(response["success"], json!(false));
    assert_eq!(response["partial_success"], json!(true));
    assert_eq!(response["successful_items"], json!(1));
    assert_eq!(response["failed_items"], json!(1));
    assert_eq!(response["error_summary"]["BLOCK_NOT_FOUND"], json!(1));
}
