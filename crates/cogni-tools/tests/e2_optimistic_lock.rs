mod common;

use serde_json::json;

#[tokio::test]
async fn stale_previous_block_version_is_rejected_with_actual_version() {
    let executor = common::executor();

    let created = executor
        .dispatch("CreateMemoryBlock", json!({"type": "knowledge", "text": "hello"}))
        .await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["block_version"], json!(0));

    let response = executor
        .dispatch(
            "UpdateMemoryBlock",
            json!({"block_id": id, "previous_block_version": 3, "text": "x"}),
        )
        .await;

    assert_eq!(response["success"], json!(false));
    assert_eq!(response["error_code"], json!("VERSION_CONFLICT"));
    assert_eq!(response["previous_version"], json!(0));
}
