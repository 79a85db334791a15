//! In-memory [`MemoryBankHandle`] fixture for end-to-end tool dispatch
//! tests. Real backends (`cogni-sql`/`cogni-vector`) need a live MySQL
//! server and FAISS-backed index, so these tests exercise the same
//! object-safe seam tools are written against instead of the concrete
//! `StructuredMemoryBank`, replicating just enough of its invariants
//! (optimistic locking, hierarchical-relation cycle rejection,
//! dependency-checked deletes) to drive the tool layer end to end.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use cogni_bank::{BankError, MemoryBankHandle, Result, UpdateBlockRequest};
use cogni_core::{BlockLink, CogniError, MemoryBlock, Metadata, Namespace};
use cogni_links::Page;
use cogni_sql::diff::{BranchDiff, StagedChange};
use cogni_vector::ScoredNode;

#[derive(Default)]
pub struct FakeBank {
    blocks: Mutex<Vec<MemoryBlock>>,
    links: Mutex<Vec<BlockLink>>,
    namespaces: Mutex<Vec<Namespace>>,
    branch: Mutex<String>,
    staged: Mutex<Vec<StagedChange>>,
}

impl FakeBank {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            branch: Mutex::new("main".to_string()),
            ..Default::default()
        })
    }

    fn find(&self, id: &str) -> Option<MemoryBlock> {
        self.blocks.lock().iter().find(|b| b.id == id).cloned()
    }

    fn has_dependents(&self, id: &str) -> bool {
        self.links.lock().iter().any(|l| l.to_id == id)
    }

    fn would_cycle(&self, from_id: &str, to_id: &str, relation: &str) -> bool {
        if !cogni_core::is_hierarchical(relation) {
            return false;
        }
        if from_id == to_id {
            return true;
        }
        // Walk forward from to_id over the same relation; a path back to
        // from_id means the candidate edge from_id -> to_id closes a cycle.
        let links = self.links.lock();
        let mut stack = vec![to_id.to_string()];
        let mut seen = std::collections::HashSet::new();
        while let Some(current) = stack.pop() {
            if current == from_id {
                return true;
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            for link in links.iter().filter(|l| l.relation == relation && l.from_id == current) {
                stack.push(link.to_id.clone());
            }
        }
        false
    }
}

#[async_trait]
impl MemoryBankHandle for FakeBank {
    async fn active_branch(&self) -> String {
        self.branch.lock().clone()
    }

    async fn create_memory_block(&self, block: MemoryBlock) -> Result<MemoryBlock> {
        block.validate().map_err(BankError::Core)?;
        self.blocks.lock().push(block.clone());
        Ok(block)
    }

    async fn get_memory_block(&self, id: &str) -> Result<Option<MemoryBlock>> {
        Ok(self.find(id))
    }

    async fn get_all_memory_blocks(&self, namespace_id: Option<&str>, block_type: Option<&str>) -> Result<Vec<MemoryBlock>> {
        let blocks = self.blocks.lock();
        Ok(blocks
            .iter()
            .filter(|b| namespace_id.map(|ns| b.namespace_id == ns).unwrap_or(true))
            .filter(|b| {
                block_type
                    .map(|t| serde_json::to_value(b.block_type).ok().and_then(|v| v.as_str().map(str::to_string)).as_deref() == Some(t))
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn update_memory_block(&self, req: UpdateBlockRequest) -> Result<MemoryBlock> {
        if let Some(namespace_id) = &req.namespace_id {
            if !self.namespaces.lock().iter().any(|n| &n.id == namespace_id) {
                return Err(BankError::Core(CogniError::NamespaceNotFound(namespace_id.clone())));
            }
        }

        let mut blocks = self.blocks.lock();
        let block = blocks
            .iter_mut()
            .find(|b| b.id == req.id)
            .ok_or_else(|| BankError::Core(CogniError::BlockNotFound(req.id.clone())))?;

        if let Some(expected) = req.previous_block_version {
            if expected != block.block_version {
                return Err(BankError::Core(CogniError::VersionConflict {
                    expected,
                    actual: block.block_version,
                }));
            }
        }

        if let Some(namespace_id) = req.namespace_id {
            block.namespace_id = namespace_id;
        }
        if let Some(text) = req.text {
            block.text = text;
        }
        if let Some(tags) = req.tags {
            if req.merge_tags {
                let mut merged = block.tags.clone();
                merged.extend(tags);
                block.set_tags(merged).map_err(BankError::Core)?;
            } else {
                block.set_tags(tags).map_err(BankError::Core)?;
            }
        }
        if let Some(metadata) = req.metadata {
            if req.merge_metadata {
                for (k, v) in metadata {
                    block.metadata.insert(k, v);
                }
            } else {
                block.metadata = metadata;
            }
        }
        if let Some(state) = req.state {
            block.set_state(state);
        }
        if let Some(visibility) = req.visibility {
            block.set_visibility(visibility);
        }
        block.bump_version();
        Ok(block.clone())
    }

    async fn delete_memory_block(&self, id: &str, force: bool) -> Result<()> {
        if self.find(id).is_none() {
            return Err(BankError::Core(CogniError::BlockNotFound(id.to_string())));
        }
        if !force && self.has_dependents(id) {
            return Err(BankError::Core(CogniError::DependenciesExist(id.to_string())));
        }
        self.blocks.lock().retain(|b| b.id != id);
        Ok(())
    }

    async fn create_namespace(&self, namespace: Namespace) -> Result<Namespace> {
        self.namespaces.lock().push(namespace.clone());
        Ok(namespace)
    }

    async fn list_namespaces(&self) -> Result<Vec<(String, String)>> {
        Ok(self.namespaces.lock().iter().map(|n| (n.id.clone(), n.name.clone())).collect())
    }

    async fn semantic_search(&self, text: &str, top_k: usize) -> Result<Vec<ScoredNode>> {
        // No real embedding backend; approximate with substring matching so
        // search-dependent tools have deterministic, testable results.
        let blocks = self.blocks.lock();
        let mut hits: Vec<ScoredNode> = blocks
            .iter()
            .filter(|b| b.text.to_lowercase().contains(&text.to_lowercase()))
            .map(|b| ScoredNode::new(b.id.clone(), 0.0))
            .collect();
        hits.truncate(top_k);
        Ok(hits)
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
        let relation = cogni_core::resolve_relation_alias(relation).unwrap_or(relation);
        if self.would_cycle(from_id, to_id, relation) {
            return Err(BankError::Core(CogniError::LinkValidation(format!(
                "link {from_id} -> {to_id} ({relation}) would create a cycle"
            ))));
        }
        let link = BlockLink {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            relation: relation.to_string(),
            priority,
            link_metadata: metadata,
            created_by,
            created_at: chrono::Utc::now(),
        };
        self.links.lock().push(link.clone());
        Ok(link)
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
        let forward = self
            .create_link(from_id, to_id, relation, priority, metadata.clone(), created_by.clone())
            .await?;
        let inverse_relation = cogni_core::inverse_of(&forward.relation).unwrap_or(&forward.relation);
        let inverse = self
            .create_link(to_id, from_id, inverse_relation, priority, metadata, created_by)
            .await?;
        Ok((forward, inverse))
    }

    async fn delete_link(&self, from_id: &str, to_id: &str, relation: &str) -> Result<()> {
        self.links.lock().retain(|l| !(l.from_id == from_id && l.to_id == to_id && l.relation == relation));
        Ok(())
    }

    async fn links_from(&self, id: &str, relation: Option<&str>, _cursor: Option<&str>, limit: u32) -> Result<Page<BlockLink>> {
        let links = self.links.lock();
        let items: Vec<BlockLink> = links
            .iter()
            .filter(|l| l.from_id == id)
            .filter(|l| relation.map(|r| l.relation == r).unwrap_or(true))
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(Page { items, next_cursor: None })
    }

    async fn links_to(&self, id: &str, relation: Option<&str>, _cursor: Option<&str>, limit: u32) -> Result<Page<BlockLink>> {
        let links = self.links.lock();
        let items: Vec<BlockLink> = links
            .iter()
            .filter(|l| l.to_id == id)
            .filter(|l| relation.map(|r| l.relation == r).unwrap_or(true))
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(Page { items, next_cursor: None })
    }

    async fn status(&self) -> Result<Vec<StagedChange>> {
        Ok(self.staged.lock().clone())
    }

    async fn add_to_staging(&self, tables: &[&str]) -> Result<()> {
        let mut staged = self.staged.lock();
        for table in tables {
            staged.push(StagedChange {
                table_name: table.to_string(),
                row_id: "*".to_string(),
                operation: "update".to_string(),
            });
        }
        Ok(())
    }

    async fn commit(&self, _message: &str) -> Result<String> {
        self.staged.lock().clear();
        Ok("fake-commit-hash".to_string())
    }

    async fn push(&self, _remote: &str) -> Result<()> {
        Ok(())
    }

    async fn pull(&self, _remote: &str) -> Result<()> {
        Ok(())
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        *self.branch.lock() = branch.to_string();
        Ok(())
    }

    async fn create_branch(&self, _name: &str, _from_ref: &str) -> Result<()> {
        Ok(())
    }

    async fn list_branches(&self) -> Result<Vec<String>> {
        Ok(vec![self.branch.lock().clone()])
    }

    async fn diff(&self, from_ref: &str, to_ref: &str) -> Result<BranchDiff> {
        Ok(BranchDiff {
            from_ref: from_ref.to_string(),
            to_ref: to_ref.to_string(),
            ..Default::default()
        })
    }

    async fn merge(&self, _source_branch: &str) -> Result<String> {
        Ok("fake-merge-hash".to_string())
    }

    async fn reset(&self, _hard: bool) -> Result<()> {
        self.staged.lock().clear();
        Ok(())
    }

    async fn auto_commit_and_push(&self, _remote: &str) -> Result<bool> {
        let dirty = !self.staged.lock().is_empty();
        if dirty {
            self.staged.lock().clear();
        }
        Ok(dirty)
    }
}

pub fn executor() -> cogni_tools::ToolExecutor {
    let bank = FakeBank::new();
    let context = Arc::new(cogni_tools::SharedContext::new("legacy"));
    let registry = cogni_tools::build_registry(context.clone());
    cogni_tools::ToolExecutor::new(registry, Some(bank), context)
}
