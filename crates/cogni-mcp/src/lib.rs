//! # cogni-mcp
//!
//! The RPC server shell: wires the [`cogni_tools`] auto-registered tool
//! registry to the MCP stdio transport. Every [`cogni_tools::descriptor::CogniTool`]
//! becomes one `rmcp` tool; `list_tools` reflects the registry, `call_tool`
//! drives the same normalize → inject_namespace → validate → execute →
//! serialize pipeline the dispatcher already implements, so this crate
//! adds nothing but transport framing.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;

use cogni_tools::dispatch::ToolExecutor;

/// Implements [`ServerHandler`] over a [`ToolExecutor`]. Holds no state of
/// its own beyond the executor: the registry, the bank handle, and the
/// shared namespace context all live there already. The trait methods are
/// thin wrappers over inherent methods so the dispatch logic is testable
/// without constructing an `rmcp` transport context.
#[derive(Clone)]
pub struct CogniMcpServer {
    executor: Arc<ToolExecutor>,
}

impl CogniMcpServer {
    pub fn new(executor: Arc<ToolExecutor>) -> Self {
        Self { executor }
    }

    /// Number of tools currently registered; used by tests and by the
    /// startup log line.
    pub fn tool_count(&self) -> usize {
        self.executor.registry().count()
    }

    /// Builds the `rmcp` tool list from the registry. One entry per
    /// [`cogni_tools::descriptor::CogniTool`]; the schema is whatever
    /// `schemars` generated for that tool's input model.
    pub fn tool_list(&self) -> Vec<Tool> {
        self.executor
            .registry()
            .list()
            .into_iter()
            .map(|tool| Tool::new(tool.name, tool.description, Arc::new(object_schema(&tool.input_schema))))
            .collect()
    }

    /// Runs one tool invocation end-to-end and folds the result into an
    /// `rmcp` `CallToolResult`. Never returns `Err` for a tool-level
    /// failure (unknown tool, validation error, bank error) — those are
    /// reported via `is_error: true` with the structured envelope as
    /// content, matching §4.5's "no exception escapes the wrapper" rule.
    /// A protocol-level `McpError` is reserved for transport issues this
    /// layer itself cannot recover from, which never happens today.
    pub async fn call(&self, name: &str, arguments: Option<serde_json::Map<String, Value>>) -> CallToolResult {
        let input = arguments.map(Value::Object).unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let response = self.executor.dispatch(name, input).await;
        let is_error = response.get("success").and_then(Value::as_bool) == Some(false);
        let text = serde_json::to_string_pretty(&response)
            .unwrap_or_else(|_| "{\"success\":false,\"error\":\"failed to serialize response\"}".to_string());

        CallToolResult {
            content: vec![Content::text(text)],
            structured_content: Some(response),
            is_error: Some(is_error),
        }
    }
}

impl ServerHandler for CogniMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "cogni-memory".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Versioned, namespaced, graph-structured memory store for agents. \
                 Block CRUD, work-item specialization, links, bulk operations, \
                 namespace and branch management are exposed as tools; see \
                 each tool's own description for its input schema."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _pagination: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_list(),
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.call(&request.name, request.arguments).await)
    }
}

/// `Tool::new` takes a JSON-object schema map, not an arbitrary `Value` —
/// every [`cogni_tools`] schema is already object-shaped (schemars renders
/// structs as `{"type": "object", ...}`), so this only needs to handle the
/// degenerate `Value::Null` case for tools without a meaningful input
/// model.
fn object_schema(schema: &Value) -> serde_json::Map<String, Value> {
    match schema {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    }
}
