//! Global/session tools: `GlobalMemoryInventory`, `GlobalSemanticSearch`,
//! `SetContext`, `LogInteractionBlock`. The originals
//! (`global_memory_inventory_tool.py`, `set_context_tool.py`, …) were not
//! part of the retrieval pack; these are grounded directly on
//! `StructuredMemoryBank`'s own surface (`get_all_memory_blocks`,
//! `semantic_search`, `create_memory_block`) and the `SetContext`
//! ambient-context contract in §5.

use std::collections::BTreeMap;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cogni_bank::MemoryBankHandle;
use cogni_core::{BlockType, MemoryBlock};

use crate::context::SharedContext;
use crate::descriptor::{make_tool, CogniTool};
use crate::error::Result;

#[derive(Debug, Deserialize, JsonSchema)]
struct GlobalMemoryInventoryInput {
    namespace_id: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct GlobalMemoryInventoryOutput {
    success: bool,
    total_blocks: usize,
    by_type: BTreeMap<String, usize>,
}

async fn global_memory_inventory(
    input: GlobalMemoryInventoryInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<GlobalMemoryInventoryOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let blocks = bank.get_all_memory_blocks(input.namespace_id.as_deref(), None).await?;

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for block in &blocks {
        let type_name = serde_json::to_value(block.block_type)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        *by_type.entry(type_name).or_insert(0) += 1;
    }

    Ok(GlobalMemoryInventoryOutput {
        success: true,
        total_blocks: blocks.len(),
        by_type,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GlobalSemanticSearchInput {
    query: String,
    #[serde(default = "default_top_k")]
    top_k: usize,
    namespace_id: Option<String>,
}

fn default_top_k() -> usize {
    10
}

#[derive(Debug, Serialize, JsonSchema)]
struct GlobalSearchHit {
    block_id: String,
    distance: f32,
    #[serde(rename = "type")]
    block_type: String,
    text: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct GlobalSemanticSearchOutput {
    success: bool,
    results: Vec<GlobalSearchHit>,
}

async fn global_semantic_search(
    input: GlobalSemanticSearchInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<GlobalSemanticSearchOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let scored = bank.semantic_search(&input.query, input.top_k).await?;

    let mut results = Vec::with_capacity(scored.len());
    for hit in scored {
        let Some(block) = bank.get_memory_block(&hit.block_id).await? else {
            continue;
        };
        if let Some(wanted_ns) = &input.namespace_id {
            if &block.namespace_id != wanted_ns {
                continue;
            }
        }
        let block_type = serde_json::to_value(block.block_type)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        results.push(GlobalSearchHit {
            block_id: block.id,
            distance: hit.distance,
            block_type,
            text: block.text,
        });
    }

    Ok(GlobalSemanticSearchOutput { success: true, results })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SetContextInput {
    namespace_id: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct SetContextOutput {
    success: bool,
    namespace_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct LogInteractionBlockInput {
    namespace_id: Option<String>,
    input_text: String,
    output_text: String,
    session_id: Option<String>,
    agent_id: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct LogInteractionBlockOutput {
    success: bool,
    id: String,
}

async fn log_interaction_block(input: LogInteractionBlockInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<LogInteractionBlockOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let namespace_id = input.namespace_id.unwrap_or_else(|| cogni_core::DEFAULT_NAMESPACE.to_string());

    let mut block = MemoryBlock::new(namespace_id, BlockType::Interaction, input.output_text);
    block.created_by = input.agent_id;
    block
        .metadata
        .insert("input_text".to_string(), cogni_core::Value::Text(input.input_text));
    if let Some(session_id) = input.session_id {
        block.metadata.insert("session_id".to_string(), cogni_core::Value::Text(session_id));
    }

    let created = bank.create_memory_block(block).await?;
    Ok(LogInteractionBlockOutput {
        success: true,
        id: created.id,
    })
}

pub(super) fn tools(context: Arc<SharedContext>) -> Vec<CogniTool> {
    let set_context_ctx = context;
    vec![
        make_tool(
            "GlobalMemoryInventory",
            "Summarizes block counts by type across a namespace (or every namespace).",
            true,
            global_memory_inventory,
        ),
        make_tool(
            "GlobalSemanticSearch",
            "Semantic search across every block type, optionally scoped to a namespace.",
            true,
            global_semantic_search,
        ),
        make_tool(
            "SetContext",
            "Sets the process-wide current namespace injected into subsequent memory-linked calls.",
            false,
            move |input: SetContextInput, _bank| {
                let ctx = set_context_ctx.clone();
                async move {
                    ctx.set_current_namespace(input.namespace_id.clone());
                    Ok(SetContextOutput {
                        success: true,
                        namespace_id: input.namespace_id,
                    })
                }
            },
        ),
        make_tool(
            "LogInteractionBlock",
            "Records an agent input/output exchange as an interaction-type memory block.",
            true,
            log_interaction_block,
        ),
    ]
}
