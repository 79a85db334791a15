//! Concrete [`crate::descriptor::CogniTool`] implementations, grouped by
//! the categories in §6: block CRUD, work-item specialization, docs,
//! links, bulk variants, namespaces, global/branch ops, and `HealthCheck`.

mod blocks;
mod branch_ops;
mod bulk_ops;
mod docs;
mod global;
mod links;
mod namespaces;
mod system;
mod work_items;

use std::sync::Arc;

use crate::context::SharedContext;
use crate::descriptor::CogniTool;
use crate::error::{Result, ToolError};
use crate::registry::ToolRegistry;

use cogni_core::{BlockType, CogniError};

/// Parses a work-item/block `type` string against [`BlockType`]'s
/// `snake_case` wire form, reporting an unrecognized value the same way
/// schema validation would.
fn parse_block_type(raw: &str) -> Result<BlockType> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| ToolError::Validation(format!("unrecognized block type: {raw}")))
}

/// Maps a [`cogni_bank::BankError`] (or a bare [`CogniError`]) that
/// reached a tool body into the field-name `BLOCK_NOT_FOUND` tools report
/// when `get_memory_block` yields `None` rather than an error — kept
/// distinct from the `Err` path so lookup tools can choose whether a
/// miss is a soft `found: false` result or a hard error.
fn not_found(block_id: &str) -> ToolError {
    ToolError::Bank(cogni_bank::BankError::Core(CogniError::BlockNotFound(block_id.to_string())))
}

/// Registers every declared tool exactly once. Call at process start;
/// duplicate names would be a programming error, hence the `expect`. The
/// `context` handle is shared with the [`crate::dispatch::ToolExecutor`]
/// that will run this registry, so `SetContext` mutations are visible to
/// every subsequent dispatch.
pub fn build_registry(context: Arc<SharedContext>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in all_tools(context) {
        registry
            .register(tool)
            .expect("tool names must be unique across every category");
    }
    registry
}

fn all_tools(context: Arc<SharedContext>) -> Vec<CogniTool> {
    let mut tools = Vec::new();
    tools.extend(blocks::tools());
    tools.extend(work_items::tools());
    tools.extend(docs::tools());
    tools.extend(links::tools());
    tools.extend(bulk_ops::tools());
    tools.extend(namespaces::tools());
    tools.extend(global::tools(context));
    tools.extend(branch_ops::tools());
    tools.extend(system::tools());
    tools
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_spec_tool_name_is_registered_exactly_once() {
        let registry = build_registry(Arc::new(SharedContext::new("legacy")));
        let expected = [
            "CreateMemoryBlock",
            "GetMemoryBlock",
            "UpdateMemoryBlock",
            "DeleteMemoryBlock",
            "CreateWorkItem",
            "UpdateWorkItem",
            "UpdateTaskStatus",
            "AddValidationReport",
            "GetActiveWorkItems",
            "CreateDocMemoryBlock",
            "QueryDocMemoryBlock",
            "CreateBlockLink",
            "GetMemoryLinks",
            "GetLinkedBlocks",
            "BulkCreateBlocks",
            "BulkCreateLinks",
            "BulkDeleteBlocks",
            "BulkUpdateNamespace",
            "CreateNamespace",
            "ListNamespaces",
            "GlobalMemoryInventory",
            "GlobalSemanticSearch",
            "SetContext",
            "LogInteractionBlock",
            "DoltCommit",
            "DoltAdd",
            "DoltReset",
            "DoltStatus",
            "DoltCheckout",
            "DoltBranch",
            "DoltListBranches",
            "DoltPush",
            "DoltPull",
            "DoltMerge",
            "DoltDiff",
            "DoltAutoCommitAndPush",
            "HealthCheck",
        ];
        for name in expected {
            assert!(registry.contains(name), "missing tool: {name}");
        }
        assert_eq!(registry.count(), expected.len());
    }
}
