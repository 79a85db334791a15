use std::collections::HashMap;

use crate::descriptor::CogniTool;

/// Holds every declared [`CogniTool`], keyed by name. Mirrors the
/// teacher's own `ToolRegistry` API (`register`/`get`/`list`/`count`/
/// `contains`) one-for-one; the auto-registration step in
/// [`crate::dispatch`] turns each entry into one RPC endpoint.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, CogniTool>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    AlreadyRegistered(String),
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: CogniTool) -> Result<(), RegistryError> {
        if self.tools.contains_key(tool.name) {
            return Err(RegistryError::AlreadyRegistered(tool.name.to_string()));
        }
        self.tools.insert(tool.name.to_string(), tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CogniTool> {
        self.tools.get(name)
    }

    pub fn list(&self) -> Vec<&CogniTool> {
        self.tools.values().collect()
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}
