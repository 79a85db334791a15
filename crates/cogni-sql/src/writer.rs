use async_trait::async_trait;
use cogni_core::{BlockLink, MemoryBlock, Namespace};

use crate::error::Result;

/// Write-side of the branch-scoped SQL session: row mutations, staging,
/// commits, and branch lifecycle operations. A writer pins a single
/// connection for the lifetime of a staged transaction so staging and
/// commit observe a consistent session.
#[async_trait]
pub trait SqlWriter: Send + Sync {
    async fn insert_block(&self, branch: &str, block: &MemoryBlock) -> Result<()>;

    async fn update_block(&self, branch: &str, block: &MemoryBlock) -> Result<()>;

    async fn delete_block(&self, branch: &str, block_id: &str) -> Result<()>;

    /// Replaces every `block_properties` row for `block_id` with
    /// `properties` — the write side of the Property-Schema Split.
    async fn write_block_properties(
        &self,
        branch: &str,
        block_id: &str,
        properties: &[(String, cogni_core::Value)],
    ) -> Result<()>;

    async fn delete_block_properties(&self, branch: &str, block_id: &str) -> Result<()>;

    async fn insert_link(&self, branch: &str, link: &BlockLink) -> Result<()>;

    async fn delete_links_touching(&self, branch: &str, block_id: &str) -> Result<()>;

    async fn delete_link(
        &self,
        branch: &str,
        from_id: &str,
        to_id: &str,
        relation: &str,
    ) -> Result<()>;

    async fn create_namespace(&self, namespace: &Namespace) -> Result<()>;

    async fn write_proof(&self, branch: &str, proof: &cogni_core::BlockProof) -> Result<()>;

    async fn add_to_staging(&self, branch: &str, tables: &[&str]) -> Result<()>;

    async fn commit_changes(&self, branch: &str, message: &str, author: &str) -> Result<String>;

    async fn discard_changes(&self, branch: &str) -> Result<()>;

    async fn checkout_branch(&self, branch: &str) -> Result<()>;

    async fn create_branch(&self, branch: &str, from_ref: &str) -> Result<()>;

    async fn push(&self, remote: &str, branch: &str) -> Result<()>;

    async fn pull(&self, remote: &str, branch: &str) -> Result<()>;

    async fn merge(&self, from_branch: &str, into_branch: &str) -> Result<String>;

    async fn reset(&self, branch: &str, hard: bool) -> Result<()>;
}
