use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiffSummary {
    pub fields_updated: Vec<String>,
    pub text_changed: bool,
    pub metadata_changed: bool,
    pub tags_changed: bool,
    pub links_changed: bool,
    pub patch_stats: Option<PatchStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PatchStats {
    pub lines_added: usize,
    pub lines_removed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StagedChange {
    pub table_name: String,
    pub row_id: String,
    pub operation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BranchDiff {
    pub from_ref: String,
    pub to_ref: String,
    pub added: Vec<StagedChange>,
    pub modified: Vec<StagedChange>,
    pub removed: Vec<StagedChange>,
}
