use std::collections::{HashMap, VecDeque};

use cogni_sql::SqlReader;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::Result;

pub const DEFAULT_MAX_DEPTH: u32 = 50;

/// Depth-bounded DFS (breadth-first in practice, bounded by hop count)
/// from `to_id` over `relation` edges, checking whether inserting
/// `from_id -> to_id` would close a cycle. Only called for relations
/// flagged hierarchical in the registry; non-hierarchical relations skip
/// this check entirely.
///
/// The traversal stays shallow by construction (`max_depth` hops), builds
/// the reachable subgraph with `petgraph`, appends the candidate edge, and
/// asks `petgraph::algo::is_cyclic_directed` whether that subgraph now
/// contains a cycle.
pub async fn would_create_cycle(
    reader: &dyn SqlReader,
    branch: &str,
    from_id: &str,
    to_id: &str,
    relation: &str,
    max_depth: u32,
) -> Result<bool> {
    if from_id == to_id {
        return Ok(true);
    }

    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
    let mut node_of = |graph: &mut DiGraph<String, ()>, nodes: &mut HashMap<String, NodeIndex>, id: &str| -> NodeIndex {
        *nodes
            .entry(id.to_string())
            .or_insert_with(|| graph.add_node(id.to_string()))
    };

    let to_node = node_of(&mut graph, &mut nodes, to_id);
    let from_node = node_of(&mut graph, &mut nodes, from_id);

    let mut queue = VecDeque::new();
    queue.push_back((to_id.to_string(), 0u32));
    let mut visited = std::collections::HashSet::new();
    visited.insert(to_id.to_string());

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let links = reader
            .links_from(branch, &current, Some(relation), 1000, 0)
            .await?;
        for link in links {
            let source = node_of(&mut graph, &mut nodes, &current);
            let target = node_of(&mut graph, &mut nodes, &link.to_id);
            graph.update_edge(source, target, ());
            if visited.insert(link.to_id.clone()) {
                queue.push_back((link.to_id, depth + 1));
            }
        }
    }

    graph.update_edge(from_node, to_node, ());
    Ok(is_cyclic_directed(&graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cogni_core::{BlockLink, MemoryBlock};
    use cogni_sql::diff::BranchDiff;
    use std::sync::Arc;

    struct FakeReader {
        edges: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl SqlReader for FakeReader {
        async fn get_block(&self, _branch: &str, _block_id: &str) -> cogni_sql::Result<Option<MemoryBlock>> {
            Ok(None)
        }
        async fn block_exists(&self, _branch: &str, _block_id: &str) -> cogni_sql::Result<bool> {
            Ok(true)
        }
        async fn query_blocks(
            &self,
            _branch: &str,
            _namespace_id: Option<&str>,
            _block_type: Option<&str>,
            _limit: u32,
            _offset: u32,
        ) -> cogni_sql::Result<Vec<MemoryBlock>> {
            Ok(vec![])
        }
        async fn read_block_properties(
            &self,
            _branch: &str,
            _block_id: &str,
        ) -> cogni_sql::Result<Vec<(String, cogni_core::Value)>> {
            Ok(vec![])
        }
        async fn batch_read_block_properties(
            &self,
            _branch: &str,
            _block_ids: &[String],
        ) -> cogni_sql::Result<std::collections::HashMap<String, Vec<(String, cogni_core::Value)>>> {
            Ok(Default::default())
        }
        async fn links_from(
            &self,
            _branch: &str,
            from_id: &str,
            _relation: Option<&str>,
            _limit: u32,
            _offset: u32,
        ) -> cogni_sql::Result<Vec<BlockLink>> {
            Ok(self
                .edges
                .iter()
                .filter(|(f, _)| *f == from_id)
                .map(|(f, t)| BlockLink {
                    from_id: f.to_string(),
                    to_id: t.to_string(),
                    relation: "subtask_of".to_string(),
                    priority: 0,
                    link_metadata: Default::default(),
                    created_by: None,
                    created_at: chrono::Utc::now(),
                })
                .collect())
        }
        async fn links_to(
            &self,
            _branch: &str,
            _to_id: &str,
            _relation: Option<&str>,
            _limit: u32,
            _offset: u32,
        ) -> cogni_sql::Result<Vec<BlockLink>> {
            Ok(vec![])
        }
        async fn link_exists(&self, _branch: &str, _from_id: &str, _to_id: &str, _relation: &str) -> cogni_sql::Result<bool> {
            Ok(false)
        }
        async fn namespace_exists(&self, _namespace_id: &str) -> cogni_sql::Result<bool> {
            Ok(true)
        }
        async fn list_namespaces(&self) -> cogni_sql::Result<Vec<(String, String)>> {
            Ok(vec![])
        }
        async fn list_branches(&self) -> cogni_sql::Result<Vec<String>> {
            Ok(vec![])
        }
        async fn active_branch(&self) -> cogni_sql::Result<String> {
            Ok("main".to_string())
        }
        async fn diff(&self, from_ref: &str, to_ref: &str) -> cogni_sql::Result<BranchDiff> {
            Ok(BranchDiff {
                from_ref: from_ref.to_string(),
                to_ref: to_ref.to_string(),
                ..Default::default()
            })
        }
        async fn status(&self, _branch: &str) -> cogni_sql::Result<Vec<cogni_sql::diff::StagedChange>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn no_existing_edges_never_cycles() {
        let reader = FakeReader { edges: vec![] };
        let cycles = would_create_cycle(&reader, "main", "a", "b", "subtask_of", DEFAULT_MAX_DEPTH)
            .await
            .unwrap();
        assert!(!cycles);
    }

    #[tokio::test]
    async fn existing_path_back_to_source_is_a_cycle() {
        // a -subtask_of-> b -subtask_of-> c already exists; c -subtask_of-> a would cycle.
        let reader = FakeReader {
            edges: vec![("a", "b"), ("b", "c")],
        };
        let cycles = would_create_cycle(&reader, "main", "c", "a", "subtask_of", DEFAULT_MAX_DEPTH)
            .await
            .unwrap();
        assert!(cycles);
    }

    #[tokio::test]
    async fn unrelated_branch_does_not_cycle() {
        let reader = FakeReader {
            edges: vec![("a", "b"), ("x", "y")],
        };
        let cycles = would_create_cycle(&reader, "main", "z", "y", "subtask_of", DEFAULT_MAX_DEPTH)
            .await
            .unwrap();
        assert!(!cycles);
    }

    #[tokio::test]
    async fn self_link_is_always_a_cycle() {
        let reader = FakeReader { edges: vec![] };
        let cycles = would_create_cycle(&reader, "main", "a", "a", "subtask_of", DEFAULT_MAX_DEPTH)
            .await
            .unwrap();
        assert!(cycles);
        let _ = Arc::new(reader);
    }
}
