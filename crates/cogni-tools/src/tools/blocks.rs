//! Block CRUD: `CreateMemoryBlock`, `GetMemoryBlock`, `UpdateMemoryBlock`,
//! `DeleteMemoryBlock`. Grounded in
//! `cogni-bank::StructuredMemoryBank::{create,get,update,delete}_memory_block`.

use std::collections::BTreeMap;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cogni_bank::{MemoryBankHandle, UpdateBlockRequest};
use cogni_core::{BlockState, MemoryBlock, Metadata, Value, Visibility};

use crate::descriptor::{make_tool, CogniTool};
use crate::error::{Result, ToolError};
use crate::patch::{apply_json_patch, apply_text_patch};
use crate::tools::{not_found, parse_block_type};

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateMemoryBlockInput {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
    /// Accepted as an alias for `text`, matching the agent-facing tool's
    /// looser field naming for freeform content.
    content: Option<String>,
    namespace_id: Option<String>,
    tags: Option<Vec<String>>,
    metadata: Option<BTreeMap<String, serde_json::Value>>,
    state: Option<BlockState>,
    visibility: Option<Visibility>,
    source_file: Option<String>,
    source_uri: Option<String>,
    created_by: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct CreateMemoryBlockOutput {
    success: bool,
    id: String,
    block_version: i64,
}

async fn create_memory_block(
    input: CreateMemoryBlockInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<CreateMemoryBlockOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let namespace_id = input.namespace_id.unwrap_or_else(|| cogni_core::DEFAULT_NAMESPACE.to_string());
    let block_type = parse_block_type(&input.block_type)?;
    let text = input.text.or(input.content).unwrap_or_default();

    let mut block = MemoryBlock::new(namespace_id, block_type, text);
    if let Some(tags) = input.tags {
        block.set_tags(tags).map_err(cogni_bank::BankError::Core)?;
    }
    if let Some(metadata) = input.metadata {
        block.metadata = metadata.into_iter().map(|(k, v)| (k, Value::from(v))).collect::<Metadata>();
    }
    block.state = input.state;
    block.visibility = input.visibility;
    block.source_file = input.source_file;
    block.source_uri = input.source_uri;
    block.created_by = input.created_by;

    let created = bank.create_memory_block(block).await?;
    Ok(CreateMemoryBlockOutput {
        success: true,
        id: created.id,
        block_version: created.block_version,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetMemoryBlockInput {
    block_id: Option<String>,
    /// Bulk-style lookup, mirrored from the original tool's `block_ids`
    /// field; when present, `blocks` in the output holds every hit in
    /// order and misses are simply absent rather than erroring.
    block_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct GetMemoryBlockOutput {
    found: bool,
    block: Option<serde_json::Value>,
    blocks: Vec<serde_json::Value>,
}

async fn get_memory_block(input: GetMemoryBlockInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<GetMemoryBlockOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");

    if let Some(ids) = input.block_ids {
        let mut blocks = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(block) = bank.get_memory_block(&id).await? {
                blocks.push(block.to_wire_json());
            }
        }
        return Ok(GetMemoryBlockOutput {
            found: !blocks.is_empty(),
            block: None,
            blocks,
        });
    }

    let id = input
        .block_id
        .ok_or_else(|| ToolError::Validation("either block_id or block_ids is required".to_string()))?;
    match bank.get_memory_block(&id).await? {
        Some(block) => Ok(GetMemoryBlockOutput {
            found: true,
            block: Some(block.to_wire_json()),
            blocks: Vec::new(),
        }),
        None => Ok(GetMemoryBlockOutput {
            found: false,
            block: None,
            blocks: Vec::new(),
        }),
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateMemoryBlockInput {
    block_id: String,
    previous_block_version: Option<i64>,
    text: Option<String>,
    /// Unified-diff patch against the current `text`; mutually exclusive
    /// with `text`.
    text_patch: Option<String>,
    tags: Option<Vec<String>>,
    metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// RFC-6902 JSON-Patch operations applied to `metadata` as a JSON
    /// document before being folded back into typed `Value`s; mutually
    /// exclusive with `metadata`.
    metadata_patch: Option<serde_json::Value>,
    state: Option<BlockState>,
    visibility: Option<Visibility>,
    #[serde(default = "default_true")]
    merge_tags: bool,
    #[serde(default = "default_true")]
    merge_metadata: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, JsonSchema)]
struct UpdateMemoryBlockOutput {
    success: bool,
    id: String,
    block_version: i64,
}

async fn update_memory_block(
    input: UpdateMemoryBlockInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<UpdateMemoryBlockOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");

    if input.text.is_some() && input.text_patch.is_some() {
        return Err(ToolError::Validation("text and text_patch are mutually exclusive".to_string()));
    }
    if input.metadata.is_some() && input.metadata_patch.is_some() {
        return Err(ToolError::Validation(
            "metadata and metadata_patch are mutually exclusive".to_string(),
        ));
    }

    let mut req = UpdateBlockRequest::new(input.block_id.clone());
    req.previous_block_version = input.previous_block_version;
    req.state = input.state;
    req.visibility = input.visibility;
    req.merge_tags = input.merge_tags;
    req.merge_metadata = input.merge_metadata;
    req.tags = input.tags;

    if let Some(patch_text) = input.text_patch {
        let current = bank
            .get_memory_block(&input.block_id)
            .await?
            .ok_or_else(|| not_found(&input.block_id))?;
        req.text = Some(apply_text_patch(&current.text, &patch_text)?);
    } else if let Some(text) = input.text {
        req.text = Some(text);
    }

    if let Some(patch_ops) = input.metadata_patch {
        let current = bank
            .get_memory_block(&input.block_id)
            .await?
            .ok_or_else(|| not_found(&input.block_id))?;
        let mut metadata_doc: serde_json::Value =
            serde_json::Value::Object(current.metadata.iter().map(|(k, v)| (k.clone(), v.clone().into())).collect());
        apply_json_patch(&mut metadata_doc, &patch_ops)?;
        let patched: BTreeMap<String, serde_json::Value> =
            serde_json::from_value(metadata_doc).map_err(|e| ToolError::PatchApply(e.to_string()))?;
        req.metadata = Some(patched.into_iter().map(|(k, v)| (k, Value::from(v))).collect());
        // The patch result already represents the desired final state.
        req.merge_metadata = false;
    } else if let Some(metadata) = input.metadata {
        req.metadata = Some(metadata.into_iter().map(|(k, v)| (k, Value::from(v))).collect());
    }

    let updated = bank.update_memory_block(req).await?;
    Ok(UpdateMemoryBlockOutput {
        success: true,
        id: updated.id,
        block_version: updated.block_version,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DeleteMemoryBlockInput {
    block_id: String,
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
struct DeleteMemoryBlockOutput {
    success: bool,
    id: String,
}

async fn delete_memory_block(input: DeleteMemoryBlockInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<DeleteMemoryBlockOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    bank.delete_memory_block(&input.block_id, input.force).await?;
    Ok(DeleteMemoryBlockOutput {
        success: true,
        id: input.block_id,
    })
}

pub(super) fn tools() -> Vec<CogniTool> {
    vec![
        make_tool(
            "CreateMemoryBlock",
            "Creates a new memory block in the given (or current) namespace.",
            true,
            create_memory_block,
        ),
        make_tool(
            "GetMemoryBlock",
            "Fetches one block by id, or several by a list of ids.",
            true,
            get_memory_block,
        ),
        make_tool(
            "UpdateMemoryBlock",
            "Applies a partial, optimistically-locked update to an existing block.",
            true,
            update_memory_block,
        ),
        make_tool(
            "DeleteMemoryBlock",
            "Deletes a block, refusing when dependents still link to it unless forced.",
            true,
            delete_memory_block,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_block_type_is_rejected() {
        assert!(parse_block_type("not_a_type").is_err());
    }

    #[test]
    fn known_block_type_round_trips() {
        assert_eq!(parse_block_type("knowledge").unwrap(), cogni_core::BlockType::Knowledge);
    }
}
