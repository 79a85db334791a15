mod common;

use serde_json::json;

#[tokio::test]
async fn hierarchical_link_closing_a_cycle_is_rejected() {
    let executor = common::executor();

    let a = executor.dispatch("CreateMemoryBlock", json!({"type": "task", "text": "A"})).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let b = executor.dispatch("CreateMemoryBlock", json!({"type": "task", "text": "B"})).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let c = executor.dispatch("CreateMemoryBlock", json!({"type": "task", "text": "C"})).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let link_ab = executor
        .dispatch("CreateBlockLink", json!({"from_id": a, "to_id": b, "relation": "subtask_of"}))
        .await;
    assert_eq!(link_ab["success"], json!(true));

    let link_bc = executor
        .dispatch("CreateBlockLink", json!({"from_id": b, "to_id": c, "relation": "subtask_of"}))
        .await;
    assert_eq!(link_bc["success"], json!(true));

    let closing_edge = executor
        .dispatch("CreateBlockLink", json!({"from_id": c, "to_id": a, "relation": "subtask_of"}))
        .await;
    assert_eq!(closing_edge["success"], json!(false));
    assert_eq!(closing_edge["error_code"], json!("LINK_VALIDATION_ERROR"));
}
