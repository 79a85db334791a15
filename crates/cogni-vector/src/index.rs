use async_trait::async_trait;
use cogni_core::MemoryBlock;

use crate::error::Result;
use crate::scored::ScoredNode;

/// Mirror of block embeddings keyed by block id. Treated as a best-effort
/// copy of the SQL truth: §4.2 of the design does not require a
/// distributed transaction between this and the SQL engine, only that
/// failures here are surfaced so a caller can decide whether to roll back
/// or accept a re-index later.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn add_block(&self, block: &MemoryBlock) -> Result<()>;

    async fn update_block(&self, block: &MemoryBlock) -> Result<()>;

    async fn delete_block(&self, block_id: &str) -> Result<()>;

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<ScoredNode>>;

    async fn is_ready(&self) -> bool;
}
