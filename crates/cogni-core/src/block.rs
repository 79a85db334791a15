use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::confidence::ConfidenceScore;
use crate::error::{CogniError, Result};
use crate::link::BlockLink;
use crate::value::Metadata;

pub const EMBEDDING_DIM: usize = 384;
pub const MAX_TAGS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Knowledge,
    Task,
    Project,
    Doc,
    Interaction,
    Log,
    Epic,
    Bug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Internal,
    Public,
    Restricted,
}

/// The primary unit of memory in the system.
///
/// `block_version` is an optimistic-lock counter: it must be supplied
/// unchanged on every update request and is bumped by exactly one on a
/// successful persisted mutation. `updated_at` only advances on a real,
/// persisted mutation of `state`, `visibility`, or `block_version` — never
/// merely from being read back out, mirroring the source system's
/// selective-timestamp behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MemoryBlock {
    pub id: String,
    pub namespace_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub schema_version: Option<i32>,
    pub text: String,
    pub state: Option<BlockState>,
    pub visibility: Option<Visibility>,
    pub block_version: i64,
    pub tags: Vec<String>,
    pub metadata: Metadata,
    /// Populated on fetch from the link table; never written back on
    /// update. LinkManager, not MemoryBlock persistence, owns link writes.
    #[serde(default)]
    pub links: Vec<BlockLink>,
    pub source_file: Option<String>,
    pub source_uri: Option<String>,
    pub confidence: Option<ConfidenceScore>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl MemoryBlock {
    pub fn new(namespace_id: impl Into<String>, block_type: BlockType, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            namespace_id: namespace_id.into(),
            block_type,
            schema_version: None,
            text: text.into(),
            state: None,
            visibility: None,
            block_version: 0,
            tags: Vec::new(),
            metadata: Metadata::new(),
            links: Vec::new(),
            source_file: None,
            source_uri: None,
            confidence: None,
            created_by: None,
            created_at: now,
            updated_at: now,
            embedding: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tags.len() > MAX_TAGS {
            return Err(CogniError::Validation(format!(
                "tags list cannot contain more than {} items",
                MAX_TAGS
            )));
        }
        if self.block_version < 0 {
            return Err(CogniError::Validation(
                "block_version must be a non-negative integer".into(),
            ));
        }
        if let Some(embedding) = &self.embedding {
            if embedding.len() != EMBEDDING_DIM {
                return Err(CogniError::Validation(format!(
                    "embedding must have exactly {} dimensions",
                    EMBEDDING_DIM
                )));
            }
        }
        Ok(())
    }

    /// Deduplicates tags while preserving first-seen order, enforcing the
    /// max-20 cap.
    pub fn set_tags(&mut self, tags: Vec<String>) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        let deduped: Vec<String> = tags.into_iter().filter(|t| seen.insert(t.clone())).collect();
        if deduped.len() > MAX_TAGS {
            return Err(CogniError::Validation(format!(
                "tags list cannot contain more than {} items",
                MAX_TAGS
            )));
        }
        self.tags = deduped;
        Ok(())
    }

    /// Converts to a JSON map with `embedding` omitted, and timestamps
    /// rendered as RFC 3339 strings — the wire representation returned to
    /// tool callers.
    pub fn to_wire_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).expect("MemoryBlock always serializes");
        if let Some(obj) = value.as_object_mut() {
            obj.remove("embedding");
        }
        value
    }

    /// Bumps `block_version` and `updated_at` together, as a single
    /// persisted mutation.
    pub fn bump_version(&mut self) {
        self.block_version += 1;
        self.updated_at = Utc::now();
    }

    pub fn set_state(&mut self, state: BlockState) {
        if self.state != Some(state) {
            self.state = Some(state);
            self.updated_at = Utc::now();
        }
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        if self.visibility != Some(visibility) {
            self.visibility = Some(visibility);
            self.updated_at = Utc::now();
        }
    }
}
