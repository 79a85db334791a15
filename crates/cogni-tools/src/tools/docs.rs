//! Document memory blocks: `CreateDocMemoryBlock`, `QueryDocMemoryBlock`.
//! A thin specialization over the generic block-create path and the
//! vector index's semantic query, constrained to `BlockType::Doc` — the
//! same shape as the work-item specialization in §4.6, scoped to docs
//! rather than executable work.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cogni_bank::MemoryBankHandle;
use cogni_core::{BlockType, MemoryBlock, Value};

use crate::descriptor::{make_tool, CogniTool};
use crate::error::Result;

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateDocMemoryBlockInput {
    title: String,
    content: String,
    namespace_id: Option<String>,
    tags: Option<Vec<String>>,
    source_file: Option<String>,
    source_uri: Option<String>,
    created_by: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct CreateDocMemoryBlockOutput {
    success: bool,
    id: String,
    block_version: i64,
}

async fn create_doc_memory_block(
    input: CreateDocMemoryBlockInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<CreateDocMemoryBlockOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let namespace_id = input.namespace_id.unwrap_or_else(|| cogni_core::DEFAULT_NAMESPACE.to_string());

    let mut block = MemoryBlock::new(namespace_id, BlockType::Doc, input.content);
    block.created_by = input.created_by;
    block.source_file = input.source_file;
    block.source_uri = input.source_uri;
    if let Some(tags) = input.tags {
        block.set_tags(tags).map_err(cogni_bank::BankError::Core)?;
    }
    block.metadata.insert("title".to_string(), Value::Text(input.title));

    let created = bank.create_memory_block(block).await?;
    Ok(CreateDocMemoryBlockOutput {
        success: true,
        id: created.id,
        block_version: created.block_version,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct QueryDocMemoryBlockInput {
    query: String,
    #[serde(default = "default_top_k")]
    top_k: usize,
    namespace_id: Option<String>,
}

fn default_top_k() -> usize {
    10
}

#[derive(Debug, Serialize, JsonSchema)]
struct QueryDocHit {
    block_id: String,
    distance: f32,
    title: Option<String>,
    text: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct QueryDocMemoryBlockOutput {
    success: bool,
    results: Vec<QueryDocHit>,
}

async fn query_doc_memory_block(
    input: QueryDocMemoryBlockInput,
    bank: Option<Arc<dyn MemoryBankHandle>>,
) -> Result<QueryDocMemoryBlockOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let scored = bank.semantic_search(&input.query, input.top_k).await?;

    let mut results = Vec::with_capacity(scored.len());
    for hit in scored {
        let Some(block) = bank.get_memory_block(&hit.block_id).await? else {
            continue;
        };
        if block.block_type != BlockType::Doc {
            continue;
        }
        if let Some(wanted_ns) = &input.namespace_id {
            if &block.namespace_id != wanted_ns {
                continue;
            }
        }
        let title = block.metadata.get("title").and_then(Value::as_str).map(str::to_string);
        results.push(QueryDocHit {
            block_id: block.id,
            distance: hit.distance,
            title,
            text: block.text,
        });
    }

    Ok(QueryDocMemoryBlockOutput { success: true, results })
}

pub(super) fn tools() -> Vec<CogniTool> {
    vec![
        make_tool(
            "CreateDocMemoryBlock",
            "Creates a doc-type memory block from a title and body of content.",
            true,
            create_doc_memory_block,
        ),
        make_tool(
            "QueryDocMemoryBlock",
            "Semantic search over doc-type memory blocks, optionally scoped to a namespace.",
            true,
            query_doc_memory_block,
        ),
    ]
}
