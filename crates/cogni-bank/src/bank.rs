use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use cogni_core::{BlockLink, BlockProof, CogniError, MemoryBlock, Namespace, ProofOperation, Value};
use cogni_links::{LinkManager, Page};
use cogni_sql::diff::{BranchDiff, StagedChange};
use cogni_sql::{SqlReader, SqlWriter};
use cogni_vector::VectorIndex;

use crate::error::{BankError, Result};
use crate::namespace_cache::NamespaceCache;
use crate::request::UpdateBlockRequest;

/// Tables brought into a Dolt commit by the auto-commit policy. Fixed
/// regardless of which of them a given mutation actually touched — a
/// commit always stages the whole memory surface, not just the changed
/// table, so a partial mutation never leaves a half-staged working set.
pub const STAGING_TABLES: [&str; 4] = ["memory_blocks", "block_properties", "block_links", "block_proofs"];

fn synthetic_commit_hash() -> String {
    format!("uncommitted:{}", Uuid::new_v4())
}

/// Cross-substrate coordinator: the SQL engine is the system of record,
/// the vector index a best-effort mirror, and `LinkManager` the sole
/// writer of link rows. Every public mutation here either leaves both
/// substrates consistent or surfaces the divergence rather than hiding it.
pub struct StructuredMemoryBank<R: SqlReader, W: SqlWriter, V: VectorIndex> {
    reader: Arc<R>,
    writer: Arc<W>,
    vector: Arc<V>,
    links: LinkManager<R, W>,
    namespace_cache: NamespaceCache,
    branch: RwLock<String>,
    auto_commit: AtomicBool,
}

impl<R: SqlReader, W: SqlWriter, V: VectorIndex> StructuredMemoryBank<R, W, V> {
    pub fn new(reader: Arc<R>, writer: Arc<W>, vector: Arc<V>, branch: impl Into<String>, auto_commit: bool) -> Self {
        let links = LinkManager::new(reader.clone(), writer.clone());
        Self {
            reader,
            writer,
            vector,
            links,
            namespace_cache: NamespaceCache::new(),
            branch: RwLock::new(branch.into()),
            auto_commit: AtomicBool::new(auto_commit),
        }
    }

    pub fn links(&self) -> &LinkManager<R, W> {
        &self.links
    }

    pub async fn active_branch(&self) -> String {
        self.branch.read().await.clone()
    }

    pub fn auto_commit_enabled(&self) -> bool {
        self.auto_commit.load(Ordering::SeqCst)
    }

    pub fn set_auto_commit(&self, enabled: bool) {
        self.auto_commit.store(enabled, Ordering::SeqCst);
    }

    async fn validate_namespace(&self, namespace_id: &str) -> Result<()> {
        let exists = self.namespace_cache.exists(self.reader.as_ref(), namespace_id).await?;
        if exists {
            Ok(())
        } else {
            Err(BankError::Core(CogniError::NamespaceNotFound(namespace_id.to_string())))
        }
    }

    /// Stages the fixed table set and commits if auto-commit is on,
    /// rolling back the working set on a failed commit. Returns a
    /// synthetic `uncommitted:` marker otherwise.
    async fn maybe_commit(&self, message: &str) -> Result<String> {
        if !self.auto_commit_enabled() {
            return Ok(synthetic_commit_hash());
        }
        let branch = self.active_branch().await;
        self.writer.add_to_staging(&branch, &STAGING_TABLES).await?;
        match self.writer.commit_changes(&branch, message, "cogni-bank").await {
            Ok(hash) => Ok(hash),
            Err(e) => {
                tracing::error!(error = %e, branch = %branch, "auto-commit failed, discarding staged changes");
                if let Err(rollback_err) = self.writer.discard_changes(&branch).await {
                    tracing::error!(error = %rollback_err, "rollback after failed auto-commit also failed");
                }
                Err(BankError::Core(CogniError::CommitFailed(e.to_string())))
            }
        }
    }

    async fn record_proof(&self, block_id: &str, operation: ProofOperation, commit_hash: String) -> Result<()> {
        let branch = self.active_branch().await;
        self.writer
            .write_proof(
                &branch,
                &BlockProof {
                    block_id: block_id.to_string(),
                    operation,
                    commit_hash,
                    timestamp: Utc::now(),
                },
            )
            .await?;
        Ok(())
    }

    /// Inserts a new block: SQL row, flattened metadata, and the vector
    /// mirror. A vector failure rolls the SQL write back and reports
    /// `PERSISTENCE_FAILURE` — the only CRUD path where the two substrates
    /// are kept atomic rather than best-effort.
    pub async fn create_memory_block(&self, mut block: MemoryBlock) -> Result<MemoryBlock> {
        self.validate_namespace(&block.namespace_id).await?;
        if block.state.is_none() {
            block.state = Some(cogni_core::BlockState::Draft);
        }
        if block.visibility.is_none() {
            block.visibility = Some(cogni_core::Visibility::Internal);
        }
        if block.block_version <= 0 {
            block.block_version = 1;
        }
        block.validate().map_err(BankError::Core)?;

        let branch = self.active_branch().await;
        self.writer.insert_block(&branch, &block).await?;
        let properties: Vec<(String, Value)> = block.metadata.clone().into_iter().collect();
        self.writer.write_block_properties(&branch, &block.id, &properties).await?;

        if let Err(e) = self.vector.add_block(&block).await {
            tracing::error!(block_id = %block.id, error = %e, "vector add failed, rolling back sql write");
            let _ = self.writer.delete_block_properties(&branch, &block.id).await;
            let _ = self.writer.delete_block(&branch, &block.id).await;
            return Err(BankError::Core(CogniError::Persistence(format!(
                "vector index rejected block {}: {e}",
                block.id
            ))));
        }

        let commit_hash = self.maybe_commit(&format!("create block {}", block.id)).await?;
        self.record_proof(&block.id, ProofOperation::Create, commit_hash).await?;

        Ok(block)
    }

    /// Fetches one block and hydrates its metadata and links, which the
    /// SQL reader does not populate on its own (Property-Schema Split and
    /// link-table separation, respectively).
    pub async fn get_memory_block(&self, id: &str) -> Result<Option<MemoryBlock>> {
        let branch = self.active_branch().await;
        let Some(mut block) = self.reader.get_block(&branch, id).await? else {
            return Ok(None);
        };
        let props = self.reader.read_block_properties(&branch, id).await?;
        block.metadata = props.into_iter().collect();

        let mut links: Vec<BlockLink> = self.links.links_from(&branch, id, None, None, 500).await?.items;
        links.extend(self.links.links_to(&branch, id, None, None, 500).await?.items);
        block.links = links;

        Ok(Some(block))
    }

    pub async fn get_all_memory_blocks(&self, namespace_id: Option<&str>, block_type: Option<&str>) -> Result<Vec<MemoryBlock>> {
        let branch = self.active_branch().await;
        let mut blocks = self
            .reader
            .query_blocks(&branch, namespace_id, block_type, 10_000, 0)
            .await?;
        let ids: Vec<String> = blocks.iter().map(|b| b.id.clone()).collect();
        let mut props_by_block = self.reader.batch_read_block_properties(&branch, &ids).await?;
        for block in &mut blocks {
            if let Some(props) = props_by_block.remove(&block.id) {
                block.metadata = props.into_iter().collect();
            }
        }
        Ok(blocks)
    }

    /// Applies a partial update under optimistic locking: a mismatched
    /// `previous_block_version` fails with `VERSION_CONFLICT` before any
    /// write is attempted. A `namespace_id` change is validated against
    /// the namespace cache the same way `create_memory_block` validates
    /// its initial namespace, so moving a block to an unknown namespace
    /// fails with `NAMESPACE_NOT_FOUND` instead of silently reassigning
    /// it. A vector-index failure here is logged and surfaced as
    /// `RE_INDEX_FAILURE` without rolling back the SQL write — the block
    /// is retained with a stale vector entry pending reconciliation.
    pub async fn update_memory_block(&self, req: UpdateBlockRequest) -> Result<MemoryBlock> {
        let branch = self.active_branch().await;
        let mut current = self
            .reader
            .get_block(&branch, &req.id)
            .await?
            .ok_or_else(|| BankError::Core(CogniError::BlockNotFound(req.id.clone())))?;
        let existing_props = self.reader.read_block_properties(&branch, &req.id).await?;
        current.metadata = existing_props.into_iter().collect();

        if let Some(expected) = req.previous_block_version {
            if expected != current.block_version {
                return Err(BankError::Core(CogniError::VersionConflict {
                    expected,
                    actual: current.block_version,
                }));
            }
        }

        if let Some(namespace_id) = req.namespace_id {
            self.validate_namespace(&namespace_id).await?;
            current.namespace_id = namespace_id;
        }
        if let Some(text) = req.text {
            current.text = text;
        }
        if let Some(state) = req.state {
            current.set_state(state);
        }
        if let Some(visibility) = req.visibility {
            current.set_visibility(visibility);
        }
        if let Some(tags) = req.tags {
            let merged = if req.merge_tags {
                let mut combined = current.tags.clone();
                combined.extend(tags);
                combined
            } else {
                tags
            };
            current.set_tags(merged).map_err(BankError::Core)?;
        }
        if let Some(metadata) = req.metadata {
            current.metadata = if req.merge_metadata {
                let mut merged = current.metadata.clone();
                merged.extend(metadata);
                merged
            } else {
                metadata
            };
        }

        current.bump_version();
        current.validate().map_err(BankError::Core)?;

        self.writer.update_block(&branch, &current).await?;
        let properties: Vec<(String, Value)> = current.metadata.clone().into_iter().collect();
        self.writer
            .write_block_properties(&branch, &current.id, &properties)
            .await?;

        if let Err(e) = self.vector.update_block(&current).await {
            tracing::error!(block_id = %current.id, error = %e, "vector update failed, sql change retained");
            return Err(BankError::Core(CogniError::ReIndex(format!(
                "vector index rejected update for {}: {e}",
                current.id
            ))));
        }

        let commit_hash = self.maybe_commit(&format!("update block {}", current.id)).await?;
        self.record_proof(&current.id, ProofOperation::Update, commit_hash).await?;

        Ok(current)
    }

    /// Deletes a block and everything that keys off it. Refuses when other
    /// blocks still link to it unless `force` is set, so removing a block
    /// never silently orphans a dependent link.
    pub async fn delete_memory_block(&self, id: &str, force: bool) -> Result<()> {
        let branch = self.active_branch().await;
        if !self.reader.block_exists(&branch, id).await? {
            return Err(BankError::Core(CogniError::BlockNotFound(id.to_string())));
        }
        if !force {
            let dependents: Page<BlockLink> = self.links.links_to(&branch, id, None, None, 1).await?;
            if !dependents.items.is_empty() {
                return Err(BankError::Core(CogniError::DependenciesExist(id.to_string())));
            }
        }

        self.writer.delete_links_touching(&branch, id).await?;
        self.writer.delete_block_properties(&branch, id).await?;
        self.writer.delete_block(&branch, id).await?;

        if let Err(e) = self.vector.delete_block(id).await {
            tracing::error!(block_id = %id, error = %e, "vector delete failed; sql delete already applied");
        }

        let commit_hash = self.maybe_commit(&format!("delete block {id}")).await?;
        self.record_proof(id, ProofOperation::Delete, commit_hash).await?;

        Ok(())
    }

    pub async fn create_namespace(&self, namespace: Namespace) -> Result<Namespace> {
        self.writer.create_namespace(&namespace).await?;
        self.namespace_cache.invalidate(&namespace.id);
        Ok(namespace)
    }

    pub async fn list_namespaces(&self) -> Result<Vec<(String, String)>> {
        Ok(self.reader.list_namespaces().await?)
    }

    pub async fn semantic_search(&self, text: &str, top_k: usize) -> Result<Vec<cogni_vector::ScoredNode>> {
        Ok(self.vector.query(text, top_k).await?)
    }

    pub async fn create_link(
        &self,
        from_id: &str,
        to_id: &str,
        relation: &str,
        priority: i32,
        metadata: cogni_core::Metadata,
        created_by: Option<String>,
    ) -> Result<BlockLink> {
        let branch = self.active_branch().await;
        self.links
            .create_link(&branch, from_id, to_id, relation, priority, metadata, created_by)
            .await
            .map_err(Into::into)
    }

    pub async fn create_bidirectional_link(
        &self,
        from_id: &str,
        to_id: &str,
        relation: &str,
        priority: i32,
        metadata: cogni_core::Metadata,
        created_by: Option<String>,
    ) -> Result<(BlockLink, BlockLink)> {
        let branch = self.active_branch().await;
        self.links
            .create_bidirectional(&branch, from_id, to_id, relation, priority, metadata, created_by)
            .await
            .map_err(Into::into)
    }

    pub async fn delete_link(&self, from_id: &str, to_id: &str, relation: &str) -> Result<()> {
        let branch = self.active_branch().await;
        self.links.delete_link(&branch, from_id, to_id, relation).await.map_err(Into::into)
    }

    pub async fn links_from(&self, id: &str, relation: Option<&str>, cursor: Option<&str>, limit: u32) -> Result<Page<BlockLink>> {
        let branch = self.active_branch().await;
        self.links.links_from(&branch, id, relation, cursor, limit).await.map_err(Into::into)
    }

    pub async fn links_to(&self, id: &str, relation: Option<&str>, cursor: Option<&str>, limit: u32) -> Result<Page<BlockLink>> {
        let branch = self.active_branch().await;
        self.links.links_to(&branch, id, relation, cursor, limit).await.map_err(Into::into)
    }

    pub async fn status(&self) -> Result<Vec<StagedChange>> {
        let branch = self.active_branch().await;
        Ok(self.reader.status(&branch).await?)
    }

    pub async fn add_to_staging(&self, tables: &[&str]) -> Result<()> {
        let branch = self.active_branch().await;
        Ok(self.writer.add_to_staging(&branch, tables).await?)
    }

    pub async fn commit(&self, message: &str) -> Result<String> {
        let branch = self.active_branch().await;
        Ok(self.writer.commit_changes(&branch, message, "cogni-bank").await?)
    }

    pub async fn push(&self, remote: &str) -> Result<()> {
        let branch = self.active_branch().await;
        Ok(self.writer.push(remote, &branch).await?)
    }

    pub async fn pull(&self, remote: &str) -> Result<()> {
        let branch = self.active_branch().await;
        Ok(self.writer.pull(remote, &branch).await?)
    }

    pub async fn checkout(&self, branch: &str) -> Result<()> {
        self.writer.checkout_branch(branch).await?;
        *self.branch.write().await = branch.to_string();
        Ok(())
    }

    pub async fn create_branch(&self, name: &str, from_ref: &str) -> Result<()> {
        Ok(self.writer.create_branch(name, from_ref).await?)
    }

    pub async fn list_branches(&self) -> Result<Vec<String>> {
        Ok(self.reader.list_branches().await?)
    }

    pub async fn diff(&self, from_ref: &str, to_ref: &str) -> Result<BranchDiff> {
        Ok(self.reader.diff(from_ref, to_ref).await?)
    }

    pub async fn merge(&self, source_branch: &str) -> Result<String> {
        let branch = self.active_branch().await;
        Ok(self.writer.merge(source_branch, &branch).await?)
    }

    pub async fn reset(&self, hard: bool) -> Result<()> {
        let branch = self.active_branch().await;
        Ok(self.writer.reset(&branch, hard).await?)
    }

    /// Composite branch op: commits the working set if anything is staged,
    /// then pushes. Returns `false` without touching the remote when the
    /// working set was already clean.
    pub async fn auto_commit_and_push(&self, remote: &str) -> Result<bool> {
        let branch = self.active_branch().await;
        let status = self.reader.status(&branch).await?;
        if status.is_empty() {
            return Ok(false);
        }
        self.writer.add_to_staging(&branch, &STAGING_TABLES).await?;
        self.writer.commit_changes(&branch, "auto_commit_and_push", "cogni-bank").await?;
        self.writer.push(remote, &branch).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cogni_core::BlockType;
    use cogni_vector::ScoredNode;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryEngine {
        blocks: Mutex<HashMap<String, MemoryBlock>>,
        properties: Mutex<HashMap<String, Vec<(String, Value)>>>,
        links: Mutex<Vec<BlockLink>>,
        namespaces: Mutex<Vec<String>>,
        proofs: Mutex<Vec<BlockProof>>,
    }

    #[async_trait]
    impl SqlReader for MemoryEngine {
        async fn get_block(&self, _branch: &str, block_id: &str) -> cogni_sql::Result<Option<MemoryBlock>> {
            Ok(self.blocks.lock().unwrap().get(block_id).cloned())
        }
        async fn block_exists(&self, _branch: &str, block_id: &str) -> cogni_sql::Result<bool> {
            Ok(self.blocks.lock().unwrap().contains_key(block_id))
        }
        async fn query_blocks(
            &self,
            _branch: &str,
            _namespace_id: Option<&str>,
            _block_type: Option<&str>,
            _limit: u32,
            _offset: u32,
        ) -> cogni_sql::Result<Vec<MemoryBlock>> {
            Ok(self.blocks.lock().unwrap().values().cloned().collect())
        }
        async fn read_block_properties(&self, _branch: &str, block_id: &str) -> cogni_sql::Result<Vec<(String, Value)>> {
            Ok(self.properties.lock().unwrap().get(block_id).cloned().unwrap_or_default())
        }
        async fn batch_read_block_properties(
            &self,
            _branch: &str,
            block_ids: &[String],
        ) -> cogni_sql::Result<HashMap<String, Vec<(String, Value)>>> {
            let properties = self.properties.lock().unwrap();
            Ok(block_ids
                .iter()
                .filter_map(|id| properties.get(id).map(|p| (id.clone(), p.clone())))
                .collect())
        }
        async fn links_from(
            &self,
            _branch: &str,
            from_id: &str,
            relation: Option<&str>,
            limit: u32,
            offset: u32,
        ) -> cogni_sql::Result<Vec<BlockLink>> {
            let rows: Vec<BlockLink> = self
                .links
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.from_id == from_id && relation.map_or(true, |r| l.relation == r))
                .cloned()
                .collect();
            Ok(rows.into_iter().skip(offset as usize).take(limit as usize).collect())
        }
        async fn links_to(
            &self,
            _branch: &str,
            to_id: &str,
            relation: Option<&str>,
            limit: u32,
            offset: u32,
        ) -> cogni_sql::Result<Vec<BlockLink>> {
            let rows: Vec<BlockLink> = self
                .links
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.to_id == to_id && relation.map_or(true, |r| l.relation == r))
                .cloned()
                .collect();
            Ok(rows.into_iter().skip(offset as usize).take(limit as usize).collect())
        }
        async fn link_exists(&self, _branch: &str, from_id: &str, to_id: &str, relation: &str) -> cogni_sql::Result<bool> {
            Ok(self
                .links
                .lock()
                .unwrap()
                .iter()
                .any(|l| l.from_id == from_id && l.to_id == to_id && l.relation == relation))
        }
        async fn namespace_exists(&self, namespace_id: &str) -> cogni_sql::Result<bool> {
            Ok(self.namespaces.lock().unwrap().iter().any(|n| n == namespace_id))
        }
        async fn list_namespaces(&self) -> cogni_sql::Result<Vec<(String, String)>> {
            Ok(self.namespaces.lock().unwrap().iter().map(|n| (n.clone(), n.clone())).collect())
        }
        async fn list_branches(&self) -> cogni_sql::Result<Vec<String>> {
            Ok(vec!["main".into()])
        }
        async fn active_branch(&self) -> cogni_sql::Result<String> {
            Ok("main".into())
        }
        async fn diff(&self, from_ref: &str, to_ref: &str) -> cogni_sql::Result<BranchDiff> {
            Ok(BranchDiff {
                from_ref: from_ref.into(),
                to_ref: to_ref.into(),
                ..Default::default()
            })
        }
        async fn status(&self, _branch: &str) -> cogni_sql::Result<Vec<StagedChange>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl SqlWriter for MemoryEngine {
        async fn insert_block(&self, _branch: &str, block: &MemoryBlock) -> cogni_sql::Result<()> {
            self.blocks.lock().unwrap().insert(block.id.clone(), block.clone());
            Ok(())
        }
        async fn update_block(&self, _branch: &str, block: &MemoryBlock) -> cogni_sql::Result<()> {
            self.blocks.lock().unwrap().insert(block.id.clone(), block.clone());
            Ok(())
        }
        async fn delete_block(&self, _branch: &str, block_id: &str) -> cogni_sql::Result<()> {
            self.blocks.lock().unwrap().remove(block_id);
            Ok(())
        }
        async fn write_block_properties(&self, _branch: &str, block_id: &str, properties: &[(String, Value)]) -> cogni_sql::Result<()> {
            self.properties.lock().unwrap().insert(block_id.to_string(), properties.to_vec());
            Ok(())
        }
        async fn delete_block_properties(&self, _branch: &str, block_id: &str) -> cogni_sql::Result<()> {
            self.properties.lock().unwrap().remove(block_id);
            Ok(())
        }
        async fn insert_link(&self, _branch: &str, link: &BlockLink) -> cogni_sql::Result<()> {
            self.links.lock().unwrap().push(link.clone());
            Ok(())
        }
        async fn delete_links_touching(&self, _branch: &str, block_id: &str) -> cogni_sql::Result<()> {
            self.links
                .lock()
                .unwrap()
                .retain(|l| l.from_id != block_id && l.to_id != block_id);
            Ok(())
        }
        async fn delete_link(&self, _branch: &str, from_id: &str, to_id: &str, relation: &str) -> cogni_sql::Result<()> {
            self.links
                .lock()
                .unwrap()
                .retain(|l| !(l.from_id == from_id && l.to_id == to_id && l.relation == relation));
            Ok(())
        }
        async fn create_namespace(&self, namespace: &Namespace) -> cogni_sql::Result<()> {
            self.namespaces.lock().unwrap().push(namespace.id.clone());
            Ok(())
        }
        async fn write_proof(&self, _branch: &str, proof: &BlockProof) -> cogni_sql::Result<()> {
            self.proofs.lock().unwrap().push(proof.clone());
            Ok(())
        }
        async fn add_to_staging(&self, _branch: &str, _tables: &[&str]) -> cogni_sql::Result<()> {
            Ok(())
        }
        async fn commit_changes(&self, _branch: &str, _message: &str, _author: &str) -> cogni_sql::Result<String> {
            Ok("deadbeef".into())
        }
        async fn discard_changes(&self, _branch: &str) -> cogni_sql::Result<()> {
            Ok(())
        }
        async fn checkout_branch(&self, _branch: &str) -> cogni_sql::Result<()> {
            Ok(())
        }
        async fn create_branch(&self, _branch: &str, _from_ref: &str) -> cogni_sql::Result<()> {
            Ok(())
        }
        async fn push(&self, _remote: &str, _branch: &str) -> cogni_sql::Result<()> {
            Ok(())
        }
        async fn pull(&self, _remote: &str, _branch: &str) -> cogni_sql::Result<()> {
            Ok(())
        }
        async fn merge(&self, _from_branch: &str, _into_branch: &str) -> cogni_sql::Result<String> {
            Ok("deadbeef".into())
        }
        async fn reset(&self, _branch: &str, _hard: bool) -> cogni_sql::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct NullVectorIndex {
        fail_next: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl VectorIndex for NullVectorIndex {
        async fn add_block(&self, _block: &MemoryBlock) -> cogni_vector::Result<()> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(cogni_vector::VectorError::NotReady);
            }
            Ok(())
        }
        async fn update_block(&self, _block: &MemoryBlock) -> cogni_vector::Result<()> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(cogni_vector::VectorError::NotReady);
            }
            Ok(())
        }
        async fn delete_block(&self, _block_id: &str) -> cogni_vector::Result<()> {
            Ok(())
        }
        async fn query(&self, _text: &str, _top_k: usize) -> cogni_vector::Result<Vec<ScoredNode>> {
            Ok(vec![])
        }
        async fn is_ready(&self) -> bool {
            true
        }
    }

    fn make_bank() -> StructuredMemoryBank<MemoryEngine, MemoryEngine, NullVectorIndex> {
        let engine = Arc::new(MemoryEngine::default());
        engine.namespaces.lock().unwrap().push("legacy".into());
        StructuredMemoryBank::new(engine.clone(), engine, Arc::new(NullVectorIndex::default()), "main", false)
    }

    #[tokio::test]
    async fn create_then_get_round_trips_metadata() {
        let bank = make_bank();
        let mut block = MemoryBlock::new("legacy", BlockType::Knowledge, "hello world");
        block.metadata.insert("priority".into(), Value::Int(3));
        let created = bank.create_memory_block(block).await.unwrap();

        let fetched = bank.get_memory_block(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.text, "hello world");
        assert_eq!(fetched.metadata.get("priority"), Some(&Value::Int(3)));
    }

    #[tokio::test]
    async fn create_in_unknown_namespace_fails() {
        let bank = make_bank();
        let block = MemoryBlock::new("no-such-namespace", BlockType::Knowledge, "hi");
        let err = bank.create_memory_block(block).await.unwrap_err();
        assert_eq!(err.code(), cogni_core::ErrorCode::NamespaceNotFound);
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let bank = make_bank();
        let created = bank
            .create_memory_block(MemoryBlock::new("legacy", BlockType::Knowledge, "v1"))
            .await
            .unwrap();

        let mut req = UpdateBlockRequest::new(created.id.clone());
        req.previous_block_version = Some(created.block_version + 1);
        req.text = Some("v2".into());
        let err = bank.update_memory_block(req).await.unwrap_err();
        assert_eq!(err.code(), cogni_core::ErrorCode::VersionConflict);
    }

    #[tokio::test]
    async fn update_bumps_version_and_persists_text() {
        let bank = make_bank();
        let created = bank
            .create_memory_block(MemoryBlock::new("legacy", BlockType::Knowledge, "v1"))
            .await
            .unwrap();

        let mut req = UpdateBlockRequest::new(created.id.clone());
        req.previous_block_version = Some(created.block_version);
        req.text = Some("v2".into());
        let updated = bank.update_memory_block(req).await.unwrap();
        assert_eq!(updated.text, "v2");
        assert_eq!(updated.block_version, created.block_version + 1);
    }

    #[tokio::test]
    async fn update_moves_block_to_a_different_namespace() {
        let bank = make_bank();
        bank.create_namespace(Namespace {
            id: "archive".into(),
            name: "archive".into(),
            slug: "archive".into(),
            owner_id: None,
            created_at: Utc::now(),
            description: None,
            is_active: true,
        })
        .await
        .unwrap();
        let created = bank
            .create_memory_block(MemoryBlock::new("legacy", BlockType::Knowledge, "v1"))
            .await
            .unwrap();

        let mut req = UpdateBlockRequest::new(created.id.clone());
        req.namespace_id = Some("archive".into());
        let updated = bank.update_memory_block(req).await.unwrap();
        assert_eq!(updated.namespace_id, "archive");

        let fetched = bank.get_memory_block(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.namespace_id, "archive");
    }

    #[tokio::test]
    async fn update_into_unknown_namespace_fails_without_moving_the_block() {
        let bank = make_bank();
        let created = bank
            .create_memory_block(MemoryBlock::new("legacy", BlockType::Knowledge, "v1"))
            .await
            .unwrap();

        let mut req = UpdateBlockRequest::new(created.id.clone());
        req.namespace_id = Some("no-such-namespace".into());
        let err = bank.update_memory_block(req).await.unwrap_err();
        assert_eq!(err.code(), cogni_core::ErrorCode::NamespaceNotFound);

        let fetched = bank.get_memory_block(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.namespace_id, "legacy");
    }

    #[tokio::test]
    async fn delete_with_dependents_requires_force() {
        let bank = make_bank();
        let a = bank
            .create_memory_block(MemoryBlock::new("legacy", BlockType::Knowledge, "a"))
            .await
            .unwrap();
        let b = bank
            .create_memory_block(MemoryBlock::new("legacy", BlockType::Knowledge, "b"))
            .await
            .unwrap();
        bank.create_link(&a.id, &b.id, "related_to", 0, Default::default(), None)
            .await
            .unwrap();

        let err = bank.delete_memory_block(&b.id, false).await.unwrap_err();
        assert_eq!(err.code(), cogni_core::ErrorCode::DependenciesExist);

        bank.delete_memory_block(&b.id, true).await.unwrap();
        assert!(bank.get_memory_block(&b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rolls_back_sql_write_on_vector_failure() {
        let engine = Arc::new(MemoryEngine::default());
        engine.namespaces.lock().unwrap().push("legacy".into());
        let vector = Arc::new(NullVectorIndex::default());
        vector.fail_next.store(true, Ordering::SeqCst);
        let bank = StructuredMemoryBank::new(engine.clone(), engine.clone(), vector, "main", false);

        let block = MemoryBlock::new("legacy", BlockType::Knowledge, "doomed");
        let id = block.id.clone();
        let err = bank.create_memory_block(block).await.unwrap_err();
        assert_eq!(err.code(), cogni_core::ErrorCode::PersistenceFailure);
        assert!(!engine.blocks.lock().unwrap().contains_key(&id));
    }

    #[tokio::test]
    async fn uncommitted_blocks_get_synthetic_proof_marker() {
        let engine = Arc::new(MemoryEngine::default());
        engine.namespaces.lock().unwrap().push("legacy".into());
        let bank = StructuredMemoryBank::new(engine.clone(), engine.clone(), Arc::new(NullVectorIndex::default()), "main", false);

        bank.create_memory_block(MemoryBlock::new("legacy", BlockType::Knowledge, "v1"))
            .await
            .unwrap();

        let proofs = engine.proofs.lock().unwrap();
        assert_eq!(proofs.len(), 1);
        assert!(!proofs[0].is_committed());
    }
}
