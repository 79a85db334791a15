use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use cogni_bank::MemoryBankHandle;
use serde_json::Value;

use crate::error::ToolError;

/// A boxed, `Send` future — the return type every tool function produces.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The validated-input, bank-carrying tool body. Tools that are not
/// `memory_linked` still receive the `Option<Arc<dyn MemoryBankHandle>>`
/// slot but always see `None` there. An `Err` here — a not-found, a
/// version conflict, a cycle rejection — is folded into the standard
/// error envelope by the dispatcher; the body never assembles
/// `success: false` itself.
pub type ToolFn = Arc<
    dyn Fn(Value, Option<Arc<dyn MemoryBankHandle>>) -> BoxFuture<'static, Result<Value, ToolError>>
        + Send
        + Sync,
>;

/// Declarative descriptor for one RPC endpoint: a name, typed input/output
/// schemas, and a function. [`crate::registry::ToolRegistry`] turns a list
/// of these into one auto-generated endpoint each, following the
/// normalize → inject_namespace → validate → execute → serialize pipeline
/// in [`crate::dispatch::ToolExecutor`].
#[derive(Clone)]
pub struct CogniTool {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub output_schema: Value,
    /// Whether this tool needs a [`MemoryBankHandle`] and participates in
    /// namespace injection. Non-memory-linked tools (e.g. `HealthCheck`)
    /// skip both.
    pub memory_linked: bool,
    pub function: ToolFn,
}

impl std::fmt::Debug for CogniTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CogniTool")
            .field("name", &self.name)
            .field("memory_linked", &self.memory_linked)
            .finish_non_exhaustive()
    }
}

/// Builds a [`CogniTool::input_schema`]/[`CogniTool::output_schema`] pair
/// from the two Rust types via `schemars`, the same derive stack
/// `cogni-core`'s types already carry.
pub fn schema_pair<I: schemars::JsonSchema, O: schemars::JsonSchema>() -> (Value, Value) {
    let input = serde_json::to_value(schemars::schema_for!(I)).unwrap_or(Value::Null);
    let output = serde_json::to_value(schemars::schema_for!(O)).unwrap_or(Value::Null);
    (input, output)
}

/// Builds a [`CogniTool`] from a typed async body, handling the
/// input/output `serde_json::Value` conversion every concrete tool would
/// otherwise repeat. `f` sees its own strongly-typed input struct (a
/// malformed payload is reported as `ToolError::Validation` before `f`
/// ever runs) and returns its own typed output struct.
pub fn make_tool<I, O, F, Fut>(name: &'static str, description: &'static str, memory_linked: bool, f: F) -> CogniTool
where
    I: serde::de::DeserializeOwned + schemars::JsonSchema + Send + 'static,
    O: serde::Serialize + schemars::JsonSchema + Send + 'static,
    F: Fn(I, Option<Arc<dyn MemoryBankHandle>>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<O, crate::error::ToolError>> + Send + 'static,
{
    let (input_schema, output_schema) = schema_pair::<I, O>();
    CogniTool {
        name,
        description,
        input_schema,
        output_schema,
        memory_linked,
        function: Arc::new(move |value, bank| match serde_json::from_value::<I>(value) {
            Ok(input) => {
                let fut = f(input, bank);
                Box::pin(async move {
                    let output = fut.await?;
                    serde_json::to_value(output)
                        .map_err(|e| crate::error::ToolError::Validation(format!("failed to serialize output: {e}")))
                })
            }
            Err(e) => Box::pin(async move { Err(crate::error::ToolError::Validation(e.to_string())) }),
        }),
    }
}
