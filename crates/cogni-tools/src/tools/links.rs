//! Link tools: `CreateBlockLink`, `GetMemoryLinks`, `GetLinkedBlocks`.
//! Grounded in `cogni-links::LinkManager` (cycle detection, relation
//! aliasing, paginated `links_from`/`links_to`) and
//! `original_source/services/mcp_server/app/mcp_server.py`'s
//! `get_linked_blocks` wrapper for the `GetLinkedBlocks` field names.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use cogni_bank::MemoryBankHandle;
use cogni_core::Metadata;

use crate::descriptor::{make_tool, CogniTool};
use crate::error::{Result, ToolError};

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateBlockLinkInput {
    from_id: String,
    to_id: String,
    relation: String,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    bidirectional: bool,
    metadata: Option<Metadata>,
    created_by: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct CreateBlockLinkOutput {
    success: bool,
    from_id: String,
    to_id: String,
    relation: String,
    inverse_relation: Option<String>,
}

async fn create_block_link(input: CreateBlockLinkInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<CreateBlockLinkOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let metadata = input.metadata.unwrap_or_default();

    if input.bidirectional {
        let (forward, _inverse) = bank
            .create_bidirectional_link(&input.from_id, &input.to_id, &input.relation, input.priority, metadata, input.created_by)
            .await?;
        return Ok(CreateBlockLinkOutput {
            success: true,
            from_id: forward.from_id,
            to_id: forward.to_id,
            relation: forward.relation.clone(),
            inverse_relation: cogni_core::inverse_of(&forward.relation).map(str::to_string),
        });
    }

    let link = bank
        .create_link(&input.from_id, &input.to_id, &input.relation, input.priority, metadata, input.created_by)
        .await?;
    Ok(CreateBlockLinkOutput {
        success: true,
        from_id: link.from_id,
        to_id: link.to_id,
        relation: link.relation.clone(),
        inverse_relation: cogni_core::inverse_of(&link.relation).map(str::to_string),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetMemoryLinksInput {
    block_id: String,
    relation: Option<String>,
    cursor: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default = "default_direction")]
    direction: String,
}

fn default_limit() -> u32 {
    50
}

fn default_direction() -> String {
    "both".to_string()
}

#[derive(Debug, Serialize, JsonSchema)]
struct GetMemoryLinksOutput {
    success: bool,
    links: Vec<JsonValue>,
    next_cursor: Option<String>,
}

async fn get_memory_links(input: GetMemoryLinksInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<GetMemoryLinksOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let relation = input.relation.as_deref();

    match input.direction.as_str() {
        "outgoing" => {
            let page = bank.links_from(&input.block_id, relation, input.cursor.as_deref(), input.limit).await?;
            Ok(GetMemoryLinksOutput {
                success: true,
                links: page.items.iter().map(|l| serde_json::to_value(l).unwrap_or_default()).collect(),
                next_cursor: page.next_cursor,
            })
        }
        "incoming" => {
            let page = bank.links_to(&input.block_id, relation, input.cursor.as_deref(), input.limit).await?;
            Ok(GetMemoryLinksOutput {
                success: true,
                links: page.items.iter().map(|l| serde_json::to_value(l).unwrap_or_default()).collect(),
                next_cursor: page.next_cursor,
            })
        }
        "both" => {
            let outgoing = bank.links_from(&input.block_id, relation, input.cursor.as_deref(), input.limit).await?;
            let incoming = bank.links_to(&input.block_id, relation, None, input.limit).await?;
            let mut links: Vec<JsonValue> = outgoing.items.iter().map(|l| serde_json::to_value(l).unwrap_or_default()).collect();
            links.extend(incoming.items.iter().map(|l| serde_json::to_value(l).unwrap_or_default()));
            Ok(GetMemoryLinksOutput {
                success: true,
                links,
                next_cursor: outgoing.next_cursor,
            })
        }
        other => Err(ToolError::Validation(format!(
            "direction must be one of outgoing, incoming, both; got {other}"
        ))),
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetLinkedBlocksInput {
    source_block_id: String,
    relation_filter: Option<String>,
    #[serde(default = "default_direction")]
    direction_filter: String,
    #[serde(default = "default_linked_blocks_limit")]
    limit: u32,
}

fn default_linked_blocks_limit() -> u32 {
    50
}

#[derive(Debug, Serialize, JsonSchema)]
struct LinkedBlockEntry {
    block: JsonValue,
    relation: String,
    direction: &'static str,
}

#[derive(Debug, Serialize, JsonSchema)]
struct GetLinkedBlocksOutput {
    success: bool,
    linked_blocks: Vec<LinkedBlockEntry>,
}

async fn get_linked_blocks(input: GetLinkedBlocksInput, bank: Option<Arc<dyn MemoryBankHandle>>) -> Result<GetLinkedBlocksOutput> {
    let bank = bank.expect("memory_linked tool always receives a bank");
    let relation = input.relation_filter.as_deref();
    let mut linked_blocks = Vec::new();

    if input.direction_filter == "outgoing" || input.direction_filter == "both" {
        let page = bank.links_from(&input.source_block_id, relation, None, input.limit).await?;
        for link in page.items {
            if let Some(block) = bank.get_memory_block(&link.to_id).await? {
                linked_blocks.push(LinkedBlockEntry {
                    block: block.to_wire_json(),
                    relation: link.relation,
                    direction: "outgoing",
                });
            }
        }
    }
    if input.direction_filter == "incoming" || input.direction_filter == "both" {
        let page = bank.links_to(&input.source_block_id, relation, None, input.limit).await?;
        for link in page.items {
            if let Some(block) = bank.get_memory_block(&link.from_id).await? {
                linked_blocks.push(LinkedBlockEntry {
                    block: block.to_wire_json(),
                    relation: link.relation,
                    direction: "incoming",
                });
            }
        }
    }

    Ok(GetLinkedBlocksOutput {
        success: true,
        linked_blocks,
    })
}

pub(super) fn tools() -> Vec<CogniTool> {
    vec![
        make_tool(
            "CreateBlockLink",
            "Creates a directed, typed link between two blocks, optionally with its canonical inverse.",
            true,
            create_block_link,
        ),
        make_tool(
            "GetMemoryLinks",
            "Pages through the raw links touching a block in one or both directions.",
            true,
            get_memory_links,
        ),
        make_tool(
            "GetLinkedBlocks",
            "Resolves a block's links into the full linked blocks, with relation and direction context.",
            true,
            get_linked_blocks,
        ),
    ]
}
