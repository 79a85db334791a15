mod common;

use serde_json::json;

#[tokio::test]
async fn missing_namespace_id_is_filled_from_current_context() {
    let executor = common::executor();

    let set = executor.dispatch("SetContext", json!({"namespace_id": "cogni-core"})).await;
    assert_eq!(set["success"], json!(true));

    let created = executor
        .dispatch("CreateMemoryBlock", json!({"type": "knowledge", "text": "C"}))
        .await;
    assert_eq!(created["success"], json!(true));
    let id = created["id"].as_str().unwrap().to_string();

    let fetched = executor.dispatch("GetMemoryBlock", json!({"block_id": id})).await;
    assert_eq!(fetched["block"]["namespace_id"], json!("cogni-core"));
}
