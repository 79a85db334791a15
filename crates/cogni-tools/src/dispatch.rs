use std::sync::Arc;

use cogni_bank::MemoryBankHandle;
use serde_json::Value;

use crate::context::SharedContext;
use crate::envelope::{error_envelope, success_envelope};
use crate::error::ToolError;
use crate::normalize::{normalize_input, DEFAULT_MAX_DEPTH};
use crate::registry::ToolRegistry;
use crate::{context::inject_namespace, descriptor::CogniTool};

/// Drives the auto-generated RPC pipeline for one registry:
/// normalize → inject_namespace → validate → execute → serialize.
/// Holds the bank (for memory-linked tools) and the shared, mutable
/// current-namespace context — the only two pieces of ambient context a
/// tool invocation needs beyond its own input. `SetContext` mutates the
/// same [`SharedContext`] this executor reads, so a context change takes
/// effect on the very next dispatch.
pub struct ToolExecutor {
    registry: ToolRegistry,
    bank: Option<Arc<dyn MemoryBankHandle>>,
    context: Arc<SharedContext>,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, bank: Option<Arc<dyn MemoryBankHandle>>, context: Arc<SharedContext>) -> Self {
        Self { registry, bank, context }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Executes one tool call end-to-end. Never returns an `Err` —
    /// every failure, including an unknown tool name, is folded into the
    /// standard error envelope so no exception-shaped value escapes to
    /// the transport.
    pub async fn dispatch(&self, tool_name: &str, raw_input: Value) -> Value {
        let active_branch = if let Some(bank) = &self.bank {
            Some(bank.active_branch().await)
        } else {
            None
        };

        let span = tracing::info_span!("tool_dispatch", tool_name = %tool_name, namespace_id = %self.context.current_namespace());
        let _enter = span.enter();

        let Some(tool) = self.registry.get(tool_name) else {
            let err = ToolError::UnknownTool(tool_name.to_string());
            tracing::warn!(error = %err, "unknown tool");
            return error_envelope(&err, active_branch.as_deref());
        };

        match self.run(tool, raw_input, active_branch.as_deref()).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, error_code = %err.code(), "tool invocation failed");
                error_envelope(&err, active_branch.as_deref())
            }
        }
    }

    async fn run(&self, tool: &CogniTool, raw_input: Value, active_branch: Option<&str>) -> Result<Value, ToolError> {
        let normalized = normalize_input(raw_input, DEFAULT_MAX_DEPTH)?;

        let with_namespace = if tool.memory_linked {
            inject_namespace(&normalized, &self.context.current_namespace())
        } else {
            normalized
        };

        validate_against_schema(&with_namespace, &tool.input_schema)?;

        let bank = if tool.memory_linked { self.bank.clone() } else { None };
        let result = (tool.function)(with_namespace, bank).await?;

        Ok(success_envelope(result, active_branch))
    }
}

/// Structural pre-check against the tool's generated JSON schema. Tool
/// bodies still re-validate cross-field invariants the schema cannot
/// express (e.g. `execution_phase` only legal when `status ==
/// in_progress`) and report those as `VALIDATION_ERROR` themselves.
fn validate_against_schema(instance: &Value, schema: &Value) -> Result<(), ToolError> {
    if schema.is_null() {
        return Ok(());
    }
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| ToolError::Validation(format!("invalid tool schema: {e}")))?;
    if let Err(first_error) = validator.validate(instance) {
        return Err(ToolError::Validation(first_error.to_string()));
    }
    Ok(())
}
