use parking_lot::RwLock;
use serde_json::Value;

/// The per-process current-branch/current-namespace context tools read
/// through the injector (§5's "per-process values set at startup from
/// environment"). `SetContext` is the one tool that mutates it; every
/// other memory-linked tool only ever reads it via [`ToolExecutor`].
///
/// [`ToolExecutor`]: crate::dispatch::ToolExecutor
pub struct SharedContext {
    current_namespace: RwLock<String>,
}

impl SharedContext {
    pub fn new(initial_namespace: impl Into<String>) -> Self {
        Self {
            current_namespace: RwLock::new(initial_namespace.into()),
        }
    }

    pub fn current_namespace(&self) -> String {
        self.current_namespace.read().clone()
    }

    pub fn set_current_namespace(&self, namespace_id: impl Into<String>) {
        *self.current_namespace.write() = namespace_id.into();
    }
}

/// Injects `namespace_id` into a normalized, memory-linked tool input if
/// it is absent or `null`. Operates on a shallow copy — the caller's
/// `Value` is never mutated in place — and is a no-op for anything that
/// is not a JSON object (bulk/list inputs pass through untouched; each
/// bulk item is injected individually by the bulk tool itself).
pub fn inject_namespace(input: &Value, current_namespace: &str) -> Value {
    match input {
        Value::Object(map) => {
            let mut copy = map.clone();
            let needs_default = match copy.get("namespace_id") {
                None => true,
                Some(Value::Null) => true,
                Some(_) => false,
            };
            if needs_default {
                copy.insert("namespace_id".to_string(), Value::String(current_namespace.to_string()));
            }
            Value::Object(copy)
        }
        other => other.clone(),
    }
}
