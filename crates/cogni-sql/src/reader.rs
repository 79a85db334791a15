use async_trait::async_trait;
use cogni_core::{BlockLink, MemoryBlock};

use crate::diff::BranchDiff;
use crate::error::Result;

/// Read-side of the branch-scoped SQL session. Implementations must never
/// build queries by string interpolation — every value reaches the engine
/// through a bound parameter.
#[async_trait]
pub trait SqlReader: Send + Sync {
    async fn get_block(&self, branch: &str, block_id: &str) -> Result<Option<MemoryBlock>>;

    async fn block_exists(&self, branch: &str, block_id: &str) -> Result<bool>;

    async fn query_blocks(
        &self,
        branch: &str,
        namespace_id: Option<&str>,
        block_type: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<MemoryBlock>>;

    /// Typed metadata for one block, as stored via the Property-Schema
    /// Split.
    async fn read_block_properties(
        &self,
        branch: &str,
        block_id: &str,
    ) -> Result<Vec<(String, cogni_core::Value)>>;

    /// Batched form of [`SqlReader::read_block_properties`], one round
    /// trip for every id in `block_ids`.
    async fn batch_read_block_properties(
        &self,
        branch: &str,
        block_ids: &[String],
    ) -> Result<std::collections::HashMap<String, Vec<(String, cogni_core::Value)>>>;

    async fn links_from(
        &self,
        branch: &str,
        from_id: &str,
        relation: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BlockLink>>;

    async fn links_to(
        &self,
        branch: &str,
        to_id: &str,
        relation: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BlockLink>>;

    async fn link_exists(&self, branch: &str, from_id: &str, to_id: &str, relation: &str) -> Result<bool>;

    async fn namespace_exists(&self, namespace_id: &str) -> Result<bool>;

    async fn list_namespaces(&self) -> Result<Vec<(String, String)>>;

    async fn list_branches(&self) -> Result<Vec<String>>;

    async fn active_branch(&self) -> Result<String>;

    async fn diff(&self, from_ref: &str, to_ref: &str) -> Result<BranchDiff>;

    async fn status(&self, branch: &str) -> Result<Vec<crate::diff::StagedChange>>;
}
