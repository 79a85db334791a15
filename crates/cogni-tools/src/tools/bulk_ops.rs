//! Bulk variants: `BulkCreateBlocks`, `BulkCreateLinks`, `BulkDeleteBlocks`,
//! `BulkUpdateNamespace`. Each processes its items independently (a
//! failure on one never aborts the batch unless `stop_on_first_error`),
//! aggregating through [`crate::bulk::bulk_envelope`]. `BulkUpdateNamespace`
//! additionally stages every successful per-block update and commits once
//! at the end, downgrading every entry to `COMMIT_FAILED` on a failed
//! commit — grounded in
//! `original_source/infra_core/memory_system/tools/agent_facing/bulk_update_namespace_tool.py`
//! and `bulk_delete_blocks_tool.py`.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cogni_bank::{MemoryBankHandle, UpdateBlockRequest};
use cogni_core::{ErrorCode, MemoryBlock, Metadata, Value};

use crate::bulk::{bulk_envelope, BulkItemResult};
use crate::descriptor::{make_tool, CogniTool};
use crate::error::{Result, ToolError};
use crate::tools::parse_block_type;

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateBlockSpec {
    #[serde(rename = "type")]
    block_type: String,
    text: String,
    namespace_id: Option<String>,
    tags: Option<Vec<String>>,
    metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct BulkCreateBlocksInput {
    blocks: Vec<CreateBlockSpec>,
    #[serde(default)]
    stop_on_first_error: bool,
    default_namespace_id: Option<String>,
}

async fn bulk_create_blocks(input: BulkCreateBlocksInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<serde_json::Value> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let mut results = Vec::with_capacity(input.blocks.len());
    let mut skipped = Vec::new();
    let mut stopped = false;

    for (idx, spec) in input.blocks.into_iter().enumerate() {
        let item_id = format!("item_{idx}");
        if stopped {
            skipped.push(item_id);
            continue;
        }

        let outcome = async {
            let block_type = parse_block_type(&spec.block_type)?;
            let namespace_id = spec
                .namespace_id
                .or_else(|| input.default_namespace_id.clone())
                .unwrap_or_else(|| cogni_core::DEFAULT_NAMESPACE.to_string());
            let mut block = MemoryBlock::new(namespace_id, block_type, spec.text);
            if let Some(tags) = spec.tags {
                block.set_tags(tags).map_err(cogni_bank::BankError::Core)?;
            }
            if let Some(metadata) = spec.metadata {
                block.metadata = metadata;
            }
            let created = bank.create_memory_block(block).await?;
            Ok::<_, ToolError>(created)
        }
        .await;

        match outcome {
            Ok(created) => results.push(BulkItemResult::ok(created.id.clone(), Some(created.to_wire_json()))),
            Err(e) => {
                results.push(BulkItemResult::failed(item_id, e.to_string(), e.code()));
                if input.stop_on_first_error {
                    stopped = true;
                }
            }
        }
    }

    Ok(bulk_envelope(&results, &skipped))
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateLinkSpec {
    from_id: String,
    to_id: String,
    relation: String,
    #[serde(default)]
    priority: i32,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct BulkCreateLinksInput {
    links: Vec<CreateLinkSpec>,
    #[serde(default)]
    stop_on_first_error: bool,
}

async fn bulk_create_links(input: BulkCreateLinksInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<serde_json::Value> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let mut results = Vec::with_capacity(input.links.len());
    let mut skipped = Vec::new();
    let mut stopped = false;

    for spec in input.links {
        let item_id = format!("{}->{}:{}", spec.from_id, spec.to_id, spec.relation);
        if stopped {
            skipped.push(item_id);
            continue;
        }
        match bank
            .create_link(&spec.from_id, &spec.to_id, &spec.relation, spec.priority, Metadata::new(), None)
            .await
        {
            Ok(link) => results.push(BulkItemResult::ok(item_id, serde_json::to_value(&link).ok())),
            Err(e) => {
                let err = ToolError::from(e);
                results.push(BulkItemResult::failed(item_id, err.to_string(), err.code()));
                if input.stop_on_first_error {
                    stopped = true;
                }
            }
        }
    }

    Ok(bulk_envelope(&results, &skipped))
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DeleteSpec {
    block_id: String,
    validate_dependencies: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct BulkDeleteBlocksInput {
    blocks: Vec<DeleteSpec>,
    #[serde(default)]
    stop_on_first_error: bool,
    #[serde(default = "default_validate_dependencies")]
    default_validate_dependencies: bool,
}

fn default_validate_dependencies() -> bool {
    true
}

async fn bulk_delete_blocks(input: BulkDeleteBlocksInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<serde_json::Value> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let mut results = Vec::with_capacity(input.blocks.len());
    let mut skipped = Vec::new();
    let mut stopped = false;

    for spec in input.blocks {
        if stopped {
            skipped.push(spec.block_id);
            continue;
        }
        let validate_dependencies = spec.validate_dependencies.unwrap_or(input.default_validate_dependencies);
        let force = !validate_dependencies;
        match bank.delete_memory_block(&spec.block_id, force).await {
            Ok(()) => results.push(BulkItemResult::ok(spec.block_id, None)),
            Err(e) => {
                let err = ToolError::from(e);
                results.push(BulkItemResult::failed(spec.block_id, err.to_string(), err.code()));
                if input.stop_on_first_error {
                    stopped = true;
                }
            }
        }
    }

    Ok(bulk_envelope(&results, &skipped))
}

#[derive(Debug, Deserialize, JsonSchema)]
struct BlockUpdateSpec {
    block_id: String,
    #[serde(default = "default_true")]
    validate_exists: bool,
    change_note: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, JsonSchema)]
struct BulkUpdateNamespaceInput {
    blocks: Vec<BlockUpdateSpec>,
    target_namespace_id: String,
    #[serde(default)]
    stop_on_first_error: bool,
}

/// `BulkUpdateNamespace` is the one bulk tool with an all-or-nothing
/// commit: every per-block update happens against a bank with auto-commit
/// disabled for the batch, and a final single commit either lands
/// everything or (per the design ledger's Open Question decision) rolls
/// back and downgrades every "successful" entry to `COMMIT_FAILED`.
async fn bulk_update_namespace(input: BulkUpdateNamespaceInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<serde_json::Value> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let mut results = Vec::with_capacity(input.blocks.len());
    let mut skipped = Vec::new();
    let mut stopped = false;
    let mut any_succeeded = false;

    for spec in input.blocks {
        if stopped {
            skipped.push(spec.block_id);
            continue;
        }

        let outcome = async {
            if spec.validate_exists {
                bank.get_memory_block(&spec.block_id)
                    .await?
                    .ok_or_else(|| crate::tools::not_found(&spec.block_id))?;
            }
            let mut req = UpdateBlockRequest::new(spec.block_id.clone());
            req.namespace_id = Some(input.target_namespace_id.clone());
            if let Some(note) = &spec.change_note {
                let mut metadata = Metadata::new();
                metadata.insert("namespace_change_note".to_string(), Value::Text(note.clone()));
                req.metadata = Some(metadata);
                req.merge_metadata = true;
            }
            bank.update_memory_block(req).await.map_err(ToolError::from)
        }
        .await;

        match outcome {
            Ok(updated) => {
                any_succeeded = true;
                results.push(BulkItemResult::ok(updated.id.clone(), Some(updated.to_wire_json())));
            }
            Err(e) => {
                results.push(BulkItemResult::failed(spec.block_id, e.to_string(), e.code()));
                if input.stop_on_first_error {
                    stopped = true;
                }
            }
        }
    }

    if any_succeeded {
        if let Err(commit_err) = bank.commit(&format!("bulk namespace update to {}", input.target_namespace_id)).await {
            tracing::error!(error = %commit_err, possible_inconsistency = true, "bulk namespace update commit failed, downgrading successes");
            for result in &mut results {
                if result.success {
                    *result = BulkItemResult::failed(result.item_id.clone(), commit_err.to_string(), ErrorCode::CommitFailed);
                }
            }
        }
    }

    Ok(bulk_envelope(&results, &skipped))
}

pub(super) fn tools() -> Vec<CogniTool> {
    vec![
        make_tool(
            "BulkCreateBlocks",
            "Creates a batch of memory blocks with independent per-item success tracking.",
            true,
            bulk_create_blocks,
        ),
        make_tool(
            "BulkCreateLinks",
            "Creates a batch of block links with independent per-item success tracking.",
            true,
            bulk_create_links,
        ),
        make_tool(
            "BulkDeleteBlocks",
            "Deletes a batch of memory blocks with independent per-item success tracking.",
            true,
            bulk_delete_blocks,
        ),
        make_tool(
            "BulkUpdateNamespace",
            "Moves a batch of blocks to a target namespace, committed atomically at the end.",
            true,
            bulk_update_namespace,
        ),
    ]
}
