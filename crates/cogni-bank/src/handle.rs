use async_trait::async_trait;

use cogni_core::{BlockLink, MemoryBlock, Metadata, Namespace};
use cogni_links::Page;
use cogni_sql::diff::BranchDiff;
use cogni_sql::{SqlReader, SqlWriter};
use cogni_vector::{ScoredNode, VectorIndex};

use crate::bank::StructuredMemoryBank;
use crate::error::Result;
use crate::request::UpdateBlockRequest;

/// Object-safe view of [`StructuredMemoryBank`], erasing the reader/writer/
/// vector type parameters. Tools never need to know which SQL engine or
/// vector backend is behind the bank — they hold a non-owning
/// `Arc<dyn MemoryBankHandle>`, matching §3's "tools hold a non-owning
/// reference to the bank" ownership rule.
#[async_trait]
pub trait MemoryBankHandle: Send + Sync {
    async fn active_branch(&self) -> String;

    async fn create_memory_block(&self, block: MemoryBlock) -> Result<MemoryBlock>;
    async fn get_memory_block(&self, id: &str) -> Result<Option<MemoryBlock>>;
    async fn get_all_memory_blocks(&self, namespace_id: Option<&str>, block_type: Option<&str>) -> Result<Vec<MemoryBlock>>;
    async fn update_memory_block(&self, req: UpdateBlockRequest) -> Result<MemoryBlock>;
    async fn delete_memory_block(&self, id: &str, force: bool) -> Result<()>;

    async fn create_namespace(&self, namespace: Namespace) -> Result<Namespace>;
    async fn list_namespaces(&self) -> Result<Vec<(String, String)>>;

    async fn semantic_search(&self, text: &str, top_k: usize) -> Result<Vec<ScoredNode>>;

    async fn create_link(
        &self,
        from_id: &str,
        to_id: &str,
        relation: &str,
        priority: i32,
        metadata: Metadata,
        created_by: Option<String>,
    ) -> Result<BlockLink>;
    async fn create_bidirectional_link(
        &self,
        from_id: &str,
        to_id: &str,
        relation: &str,
        priority: i32,
        metadata: Metadata,
        created_by: Option<String>,
    ) -> Result<(BlockLink, BlockLink)>;
    async fn delete_link(&self, from_id: &str, to_id: &str, relation: &str) -> Result<()>;
    async fn links_from(&self, id: &str, relation: Option<&str>, cursor: Option<&str>, limit: u32) -> Result<Page<BlockLink>>;
    async fn links_to(&self, id: &str, relation: Option<&str>, cursor: Option<&str>, limit: u32) -> Result<Page<BlockLink>>;

    async fn status(&self) -> Result<Vec<cogni_sql::diff::StagedChange>>;
    async fn add_to_staging(&self, tables: &[&str]) -> Result<()>;
    async fn commit(&self, message: &str) -> Result<String>;
    async fn push(&self, remote: &str) -> Result<()>;
    async fn pull(&self, remote: &str) -> Result<()>;
    async fn checkout(&self, branch: &str) -> Result<()>;
    async fn create_branch(&self, name: &str, from_ref: &str) -> Result<()>;
    async fn list_branches(&self) -> Result<Vec<String>>;
    async fn diff(&self, from_ref: &str, to_ref: &str) -> Result<BranchDiff>;
    async fn merge(&self, source_branch: &str) -> Result<String>;
    async fn reset(&self, hard: bool) -> Result<()>;
    async fn auto_commit_and_push(&self, remote: &str) -> Result<bool>;
}

#[async_trait]
impl<R, W, V> MemoryBankHandle for StructuredMemoryBank<R, W, V>
where
    R: SqlReader + 'static,
    W: SqlWriter + 'static,
    V: VectorIndex + 'static,
{
    async fn active_branch(&self) -> String {
        StructuredMemoryBank::active_branch(self).await
    }

    async fn create_memory_block(&self, block: MemoryBlock) -> Result<MemoryBlock> {
        StructuredMemoryBank::create_memory_block(self, block).await
    }
    async fn get_memory_block(&self, id: &str) -> Result<Option<MemoryBlock>> {
        StructuredMemoryBank::get_memory_block(self, id).await
    }
    async fn get_all_memory_blocks(&self, namespace_id: Option<&str>, block_type: Option<&str>) -> Result<Vec<MemoryBlock>> {
        StructuredMemoryBank::get_all_memory_blocks(self, namespace_id, block_type).await
    }
    async fn update_memory_block(&self, req: UpdateBlockRequest) -> Result<MemoryBlock> {
        StructuredMemoryBank::update_memory_block(self, req).await
    }
    async fn delete_memory_block(&self, id: &str, force: bool) -> Result<()> {
        StructuredMemoryBank::delete_memory_block(self, id, force).await
    }

    async fn create_namespace(&self, namespace: Namespace) -> Result<Namespace> {
        StructuredMemoryBank::create_namespace(self, namespace).await
    }
    async fn list_namespaces(&self) -> Result<Vec<(String, String)>> {
        StructuredMemoryBank::list_namespaces(self).await
    }

    async fn semantic_search(&self, text: &str, top_k: usize) -> Result<Vec<ScoredNode>> {
        StructuredMemoryBank::semantic_search(self, text, top_k).await
    }

    async fn create_link(
        &self,
        from_id: &str,
        to_id: &str,
        relation: &str,
        priority: i32,
        metadata: Metadata,
        created_by: Option<String>,
    ) -> Result<BlockLink> {
        StructuredMemoryBank::create_link(self, from_id, to_id, relation, priority, metadata, created_by).await
    }
    async fn create_bidirectional_link(
        &self,
        from_id: &str,
        to_id: &str,
        relation: &str,
        priority: i32,
        metadata: Metadata,
        created_by: Option<String>,
    ) -> Result<(BlockLink, BlockLink)> {
        StructuredMemoryBank::create_bidirectional_link(self, from_id, to_id, relation, priority, metadata, created_by).await
    }
    async fn delete_link(&self, from_id: &str, to_id: &str, relation: &str) -> Result<()> {
        StructuredMemoryBank::delete_link(self, from_id, to_id, relation).await
    }
    async fn links_from(&self, id: &str, relation: Option<&str>, cursor: Option<&str>, limit: u32) -> Result<Page<BlockLink>> {
        StructuredMemoryBank::links_from(self, id, relation, cursor, limit).await
    }
    async fn links_to(&self, id: &str, relation: Option<&str>, cursor: Option<&str>, limit: u32) -> Result<Page<BlockLink>> {
        StructuredMemoryBank::links_to(self, id, relation, cursor, limit).await
    }

    async fn status(&self) -> Result<Vec<cogni_sql::diff::StagedChange>> {
        StructuredMemoryBank::status(self).await
    }
    async fn add_to_staging(&self, tables: &[&str]) -> Result<()> {
        StructuredMemoryBank::add_to_staging(self, tables).await
    }
    async fn commit(&self, message: &str) -> Result<String> {
        StructuredMemoryBank::commit(self, message).await
    }
    async fn push(&self, remote: &str) -> Result<()> {
        StructuredMemoryBank::push(self, remote).await
    }
    async fn pull(&self, remote: &str) -> Result<()> {
        StructuredMemoryBank::pull(self, remote).await
    }
    async fn checkout(&self, branch: &str) -> Result<()> {
        StructuredMemoryBank::checkout(self, branch).await
    }
    async fn create_branch(&self, name: &str, from_ref: &str) -> Result<()> {
        StructuredMemoryBank::create_branch(self, name, from_ref).await
    }
    async fn list_branches(&self) -> Result<Vec<String>> {
        StructuredMemoryBank::list_branches(self).await
    }
    async fn diff(&self, from_ref: &str, to_ref: &str) -> Result<BranchDiff> {
        StructuredMemoryBank::diff(self, from_ref, to_ref).await
    }
    async fn merge(&self, source_branch: &str) -> Result<String> {
        StructuredMemoryBank::merge(self, source_branch).await
    }
    async fn reset(&self, hard: bool) -> Result<()> {
        StructuredMemoryBank::reset(self, hard).await
    }
    async fn auto_commit_and_push(&self, remote: &str) -> Result<bool> {
        StructuredMemoryBank::auto_commit_and_push(self, remote).await
    }
}
