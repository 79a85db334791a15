use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProofOperation {
    Create,
    Update,
    Delete,
}

/// Append-only record tying a block mutation to the commit that persisted
/// it. When auto-commit is disabled, `commit_hash` carries a synthetic
/// `"uncommitted:{uuid}"` marker so every mutation is still traceable
/// before an explicit branch commit happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BlockProof {
    pub block_id: String,
    pub operation: ProofOperation,
    pub commit_hash: String,
    pub timestamp: DateTime<Utc>,
}

impl BlockProof {
    pub fn is_committed(&self) -> bool {
        !self.commit_hash.starts_with("uncommitted:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncommitted_marker_is_detected() {
        let proof = BlockProof {
            block_id: "b1".into(),
            operation: ProofOperation::Update,
            commit_hash: "uncommitted:abc".into(),
            timestamp: Utc::now(),
        };
        assert!(!proof.is_committed());
    }

    #[test]
    fn real_commit_hash_is_committed() {
        let proof = BlockProof {
            block_id: "b1".into(),
            operation: ProofOperation::Create,
            commit_hash: "deadbeef".into(),
            timestamp: Utc::now(),
        };
        assert!(proof.is_committed());
    }
}
