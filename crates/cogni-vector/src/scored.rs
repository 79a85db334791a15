use serde::{Deserialize, Serialize};

/// One hit from a semantic query: a block id paired with its similarity
/// score. Lower `distance` is more similar, matching the metric LanceDB
/// reports for its default (L2) index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredNode {
    pub block_id: String,
    pub distance: f32,
}

impl ScoredNode {
    pub fn new(block_id: impl Into<String>, distance: f32) -> Self {
        Self {
            block_id: block_id.into(),
            distance,
        }
    }
}
