mod common;

use serde_json::{json, Value};

#[tokio::test]
async fn double_serialized_input_behaves_like_the_plain_object() {
    let executor = common::executor();

    let plain = json!({"type": "knowledge", "text": "same content"});
    let once = Value::String(plain.to_string());
    let twice = Value::String(once.to_string());

    let response = executor.dispatch("CreateMemoryBlock", twice).await;
    assert_eq!(response["success"], json!(true));
    assert!(response["id"].is_string());

    let direct = executor.dispatch("CreateMemoryBlock", plain).await;
    assert_eq!(direct["success"], json!(true));
}
