//! Work-item tool specialization (§4.6): `CreateWorkItem`, `UpdateWorkItem`,
//! `UpdateTaskStatus`, `AddValidationReport`, `GetActiveWorkItems`. A thin
//! layer mapping work-item fields into `MemoryBlock.text`/`metadata`,
//! grounded in
//! `original_source/infra_core/memory_system/tools/agent_facing/update_work_item_tool.py`
//! and its `create_work_item`/`get_active_work_items` siblings.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use cogni_bank::{MemoryBankHandle, UpdateBlockRequest};
use cogni_core::{BlockState, MemoryBlock, Value, Visibility};

use crate::descriptor::{make_tool, CogniTool};
use crate::error::{Result, ToolError};
use crate::tools::{not_found, parse_block_type};

const WORK_ITEM_TYPES: [&str; 4] = ["task", "project", "epic", "bug"];

fn metadata_str(md: &cogni_core::Metadata, key: &str) -> Option<String> {
    md.get(key).and_then(Value::as_str).map(str::to_string)
}

fn metadata_list(md: &cogni_core::Metadata, key: &str) -> Vec<String> {
    match md.get(key) {
        Some(Value::List(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Builds the `{criterion, status: "pass", notes}` validation report the
/// teacher's `update_work_item_tool.py` synthesizes when a work item
/// transitions to `done`/`released` with no existing report: one entry per
/// acceptance criterion, or a single default entry if none were declared.
fn synthesize_validation_report(acceptance_criteria: &[String], validated_by: &str) -> Value {
    let mut results = Vec::new();
    let criteria: Vec<&str> = if acceptance_criteria.is_empty() {
        vec!["Work item completed"]
    } else {
        acceptance_criteria.iter().map(String::as_str).collect()
    };
    for criterion in criteria {
        let mut entry = std::collections::BTreeMap::new();
        entry.insert("criterion".to_string(), Value::Text(criterion.to_string()));
        entry.insert("status".to_string(), Value::Text("pass".to_string()));
        entry.insert(
            "notes".to_string(),
            Value::Text("Automatically validated when status set to done".to_string()),
        );
        results.push(Value::Map(entry));
    }
    let mut report = std::collections::BTreeMap::new();
    report.insert("validated_by".to_string(), Value::Text(validated_by.to_string()));
    report.insert("results".to_string(), Value::List(results));
    Value::Map(report)
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateWorkItemInput {
    #[serde(rename = "type")]
    item_type: String,
    title: String,
    description: String,
    namespace_id: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    owner: Option<String>,
    acceptance_criteria: Option<Vec<String>>,
    action_items: Option<Vec<String>>,
    expected_artifacts: Option<Vec<String>>,
    blocked_by: Option<Vec<String>>,
    story_points: Option<f64>,
    estimate_hours: Option<f64>,
    tags: Option<Vec<String>>,
    #[serde(default = "default_agent")]
    agent_id: String,
}

fn default_agent() -> String {
    "cogni_agent".to_string()
}

#[derive(Debug, Serialize, JsonSchema)]
struct CreateWorkItemOutput {
    success: bool,
    id: String,
    work_item_type: String,
    block_version: i64,
}

async fn create_work_item(input: CreateWorkItemInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<CreateWorkItemOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    if !WORK_ITEM_TYPES.contains(&input.item_type.as_str()) {
        return Err(ToolError::Validation(format!(
            "{} is not a work item type (expected one of {WORK_ITEM_TYPES:?})",
            input.item_type
        )));
    }
    let block_type = parse_block_type(&input.item_type)?;
    let namespace_id = input.namespace_id.unwrap_or_else(|| cogni_core::DEFAULT_NAMESPACE.to_string());

    let mut block = MemoryBlock::new(namespace_id, block_type, input.description.clone());
    block.created_by = Some(input.agent_id.clone());
    if let Some(tags) = input.tags {
        block.set_tags(tags).map_err(cogni_bank::BankError::Core)?;
    }

    let mut md = cogni_core::Metadata::new();
    md.insert("title".to_string(), Value::Text(input.title));
    md.insert("description".to_string(), Value::Text(input.description));
    md.insert(
        "status".to_string(),
        Value::Text(input.status.unwrap_or_else(|| "backlog".to_string())),
    );
    if let Some(priority) = input.priority {
        md.insert("priority".to_string(), Value::Text(priority));
    }
    if let Some(owner) = input.owner {
        md.insert("assignee".to_string(), Value::Text(owner));
    }
    if let Some(ac) = input.acceptance_criteria {
        md.insert("acceptance_criteria".to_string(), Value::List(ac.into_iter().map(Value::Text).collect()));
    }
    if let Some(items) = input.action_items {
        md.insert("action_items".to_string(), Value::List(items.into_iter().map(Value::Text).collect()));
    }
    if let Some(artifacts) = input.expected_artifacts {
        md.insert(
            "expected_artifacts".to_string(),
            Value::List(artifacts.into_iter().map(Value::Text).collect()),
        );
    }
    if let Some(blocked_by) = input.blocked_by {
        md.insert("blocked_by".to_string(), Value::List(blocked_by.into_iter().map(Value::Text).collect()));
    }
    if let Some(points) = input.story_points {
        md.insert("story_points".to_string(), Value::Float(points));
    }
    if let Some(hours) = input.estimate_hours {
        md.insert("estimate_hours".to_string(), Value::Float(hours));
    }
    block.metadata = md;

    let created = bank.create_memory_block(block).await?;
    Ok(CreateWorkItemOutput {
        success: true,
        id: created.id,
        work_item_type: input.item_type,
        block_version: created.block_version,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateWorkItemInput {
    block_id: String,
    previous_block_version: Option<i64>,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    owner: Option<String>,
    acceptance_criteria: Option<Vec<String>>,
    action_items: Option<Vec<String>>,
    expected_artifacts: Option<Vec<String>>,
    blocked_by: Option<Vec<String>>,
    story_points: Option<f64>,
    estimate_hours: Option<f64>,
    tags: Option<Vec<String>>,
    state: Option<BlockState>,
    visibility: Option<Visibility>,
    execution_phase: Option<String>,
    #[serde(default = "default_true")]
    merge_tags: bool,
    #[serde(default = "default_true")]
    merge_metadata: bool,
    #[serde(default = "default_agent")]
    agent_id: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, JsonSchema)]
struct UpdateWorkItemOutput {
    success: bool,
    id: String,
    work_item_type: String,
    block_version: i64,
}

async fn update_work_item(input: UpdateWorkItemInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<UpdateWorkItemOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");

    let current = bank
        .get_memory_block(&input.block_id)
        .await?
        .ok_or_else(|| not_found(&input.block_id))?;
    let work_item_type = serde_json::to_value(current.block_type)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    if input.execution_phase.is_some() && input.status.as_deref() != Some("in_progress") {
        return Err(ToolError::Validation(
            "execution_phase can only be set when status is 'in_progress'".to_string(),
        ));
    }

    let mut md = cogni_core::Metadata::new();
    if let Some(title) = input.title {
        md.insert("title".to_string(), Value::Text(title));
    }
    if let Some(priority) = input.priority {
        md.insert("priority".to_string(), Value::Text(priority));
    }
    if let Some(owner) = input.owner {
        md.insert("assignee".to_string(), Value::Text(owner));
    }
    if let Some(ac) = &input.acceptance_criteria {
        md.insert("acceptance_criteria".to_string(), Value::List(ac.iter().cloned().map(Value::Text).collect()));
    }
    if let Some(items) = input.action_items {
        md.insert("action_items".to_string(), Value::List(items.into_iter().map(Value::Text).collect()));
    }
    if let Some(artifacts) = input.expected_artifacts {
        md.insert(
            "expected_artifacts".to_string(),
            Value::List(artifacts.into_iter().map(Value::Text).collect()),
        );
    }
    if let Some(blocked_by) = input.blocked_by {
        md.insert("blocked_by".to_string(), Value::List(blocked_by.into_iter().map(Value::Text).collect()));
    }
    if let Some(points) = input.story_points {
        md.insert("story_points".to_string(), Value::Float(points));
    }
    if let Some(hours) = input.estimate_hours {
        md.insert("estimate_hours".to_string(), Value::Float(hours));
    }

    if let Some(status) = &input.status {
        md.insert("status".to_string(), Value::Text(status.clone()));
        if status == "done" || status == "released" {
            let acceptance_criteria = input
                .acceptance_criteria
                .clone()
                .unwrap_or_else(|| metadata_list(&current.metadata, "acceptance_criteria"));
            if !current.metadata.contains_key("validation_report") {
                md.insert(
                    "validation_report".to_string(),
                    synthesize_validation_report(&acceptance_criteria, &input.agent_id),
                );
            }
        }
        if status != "in_progress" {
            md.insert("execution_phase".to_string(), Value::Null);
        }
    }
    if let Some(phase) = input.execution_phase {
        md.insert("execution_phase".to_string(), Value::Text(phase));
    }

    let mut req = UpdateBlockRequest::new(input.block_id.clone());
    req.previous_block_version = input.previous_block_version;
    req.text = input.description;
    req.state = input.state;
    req.visibility = input.visibility;
    req.tags = input.tags;
    req.merge_tags = input.merge_tags;
    req.merge_metadata = input.merge_metadata;
    if !md.is_empty() {
        req.metadata = Some(md);
    }

    let updated = bank.update_memory_block(req).await?;
    Ok(UpdateWorkItemOutput {
        success: true,
        id: updated.id,
        work_item_type,
        block_version: updated.block_version,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateTaskStatusInput {
    block_id: String,
    status: String,
    previous_block_version: Option<i64>,
    #[serde(default = "default_agent")]
    agent_id: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct UpdateTaskStatusOutput {
    success: bool,
    id: String,
    status: String,
    block_version: i64,
}

async fn update_task_status(input: UpdateTaskStatusInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<UpdateTaskStatusOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let current = bank
        .get_memory_block(&input.block_id)
        .await?
        .ok_or_else(|| not_found(&input.block_id))?;

    let mut md = cogni_core::Metadata::new();
    md.insert("status".to_string(), Value::Text(input.status.clone()));
    if input.status == "done" || input.status == "released" {
        if !current.metadata.contains_key("validation_report") {
            let acceptance_criteria = metadata_list(&current.metadata, "acceptance_criteria");
            md.insert(
                "validation_report".to_string(),
                synthesize_validation_report(&acceptance_criteria, &input.agent_id),
            );
        }
    }
    if input.status != "in_progress" {
        md.insert("execution_phase".to_string(), Value::Null);
    }

    let mut req = UpdateBlockRequest::new(input.block_id.clone());
    req.previous_block_version = input.previous_block_version;
    req.metadata = Some(md);
    req.merge_metadata = true;

    let updated = bank.update_memory_block(req).await?;
    Ok(UpdateTaskStatusOutput {
        success: true,
        id: updated.id,
        status: input.status,
        block_version: updated.block_version,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ValidationResultInput {
    criterion: String,
    status: String,
    notes: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AddValidationReportInput {
    block_id: String,
    previous_block_version: Option<i64>,
    results: Vec<ValidationResultInput>,
    #[serde(default = "default_agent")]
    validated_by: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct AddValidationReportOutput {
    success: bool,
    id: String,
    block_version: i64,
}

async fn add_validation_report(
    input: AddValidationReportInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<AddValidationReportOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let mut results = Vec::with_capacity(input.results.len());
    for r in input.results {
        let mut entry = std::collections::BTreeMap::new();
        entry.insert("criterion".to_string(), Value::Text(r.criterion));
        entry.insert("status".to_string(), Value::Text(r.status));
        if let Some(notes) = r.notes {
            entry.insert("notes".to_string(), Value::Text(notes));
        }
        results.push(Value::Map(entry));
    }
    let mut report = std::collections::BTreeMap::new();
    report.insert("validated_by".to_string(), Value::Text(input.validated_by));
    report.insert("results".to_string(), Value::List(results));

    let mut md = cogni_core::Metadata::new();
    md.insert("validation_report".to_string(), Value::Map(report));

    let mut req = UpdateBlockRequest::new(input.block_id.clone());
    req.previous_block_version = input.previous_block_version;
    req.metadata = Some(md);
    req.merge_metadata = true;

    let updated = bank.update_memory_block(req).await?;
    Ok(AddValidationReportOutput {
        success: true,
        id: updated.id,
        block_version: updated.block_version,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetActiveWorkItemsInput {
    namespace_id: Option<String>,
    #[serde(rename = "type")]
    item_type: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct GetActiveWorkItemsOutput {
    success: bool,
    count: usize,
    items: Vec<JsonValue>,
}

const ACTIVE_STATUSES: [&str; 3] = ["backlog", "ready", "in_progress"];

async fn get_active_work_items(
    input: GetActiveWorkItemsInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<GetActiveWorkItemsOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let mut items = Vec::new();
    for work_type in WORK_ITEM_TYPES {
        if let Some(wanted) = &input.item_type {
            if wanted != work_type {
                continue;
            }
        }
        let blocks = bank.get_all_memory_blocks(input.namespace_id.as_deref(), Some(work_type)).await?;
        for block in blocks {
            let status = metadata_str(&block.metadata, "status").unwrap_or_else(|| "backlog".to_string());
            if ACTIVE_STATUSES.contains(&status.as_str()) {
                items.push(block.to_wire_json());
            }
        }
    }
    Ok(GetActiveWorkItemsOutput {
        success: true,
        count: items.len(),
        items,
    })
}

pub(super) fn tools() -> Vec<CogniTool> {
    vec![
        make_tool(
            "CreateWorkItem",
            "Creates a task/project/epic/bug work item with its type-specific metadata.",
            true,
            create_work_item,
        ),
        make_tool(
            "UpdateWorkItem",
            "Applies a work-item-aware partial update, synthesizing a validation report on completion.",
            true,
            update_work_item,
        ),
        make_tool(
            "UpdateTaskStatus",
            "Transitions a work item's status field, synthesizing a validation report on completion.",
            true,
            update_task_status,
        ),
        make_tool(
            "AddValidationReport",
            "Attaches or replaces a work item's validation report.",
            true,
            add_validation_report,
        ),
        make_tool(
            "GetActiveWorkItems",
            "Lists work items whose status is backlog, ready, or in_progress.",
            true,
            get_active_work_items,
        ),
    ]
}
