use dashmap::DashMap;

use cogni_core::namespace::{Namespace, DEFAULT_NAMESPACE};
use cogni_sql::{Result as SqlResult, SqlReader};

/// Process-local cache of namespace existence, keyed by the same
/// normalized id used everywhere namespaces are compared. `legacy` never
/// touches the cache or the reader — it always exists.
#[derive(Default)]
pub struct NamespaceCache {
    cache: DashMap<String, bool>,
}

impl NamespaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn exists<R: SqlReader>(&self, reader: &R, namespace_id: &str) -> SqlResult<bool> {
        let key = Namespace::normalize_id(namespace_id);
        if key == DEFAULT_NAMESPACE {
            return Ok(true);
        }
        if let Some(exists) = self.cache.get(&key) {
            return Ok(*exists);
        }
        let exists = reader.namespace_exists(&key).await?;
        self.cache.insert(key, exists);
        Ok(exists)
    }

    pub fn invalidate(&self, namespace_id: &str) {
        self.cache.remove(&Namespace::normalize_id(namespace_id));
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cogni_core::{BlockLink, MemoryBlock};
    use cogni_sql::diff::{BranchDiff, StagedChange};

    struct FakeReader {
        known: Vec<&'static str>,
        hits: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl SqlReader for FakeReader {
        async fn get_block(&self, _branch: &str, _block_id: &str) -> SqlResult<Option<MemoryBlock>> {
            Ok(None)
        }
        async fn block_exists(&self, _branch: &str, _block_id: &str) -> SqlResult<bool> {
            Ok(false)
        }
        async fn query_blocks(
            &self,
            _branch: &str,
            _namespace_id: Option<&str>,
            _block_type: Option<&str>,
            _limit: u32,
            _offset: u32,
        ) -> SqlResult<Vec<MemoryBlock>> {
            Ok(vec![])
        }
        async fn read_block_properties(
            &self,
            _branch: &str,
            _block_id: &str,
        ) -> SqlResult<Vec<(String, cogni_core::Value)>> {
            Ok(vec![])
        }
        async fn batch_read_block_properties(
            &self,
            _branch: &str,
            _block_ids: &[String],
        ) -> SqlResult<std::collections::HashMap<String, Vec<(String, cogni_core::Value)>>> {
            Ok(Default::default())
        }
        async fn links_from(
            &self,
            _branch: &str,
            _from_id: &str,
            _relation: Option<&str>,
            _limit: u32,
            _offset: u32,
        ) -> SqlResult<Vec<BlockLink>> {
            Ok(vec![])
        }
        async fn links_to(
            &self,
            _branch: &str,
            _to_id: &str,
            _relation: Option<&str>,
            _limit: u32,
            _offset: u32,
        ) -> SqlResult<Vec<BlockLink>> {
            Ok(vec![])
        }
        async fn link_exists(&self, _branch: &str, _from_id: &str, _to_id: &str, _relation: &str) -> SqlResult<bool> {
            Ok(false)
        }
        async fn namespace_exists(&self, namespace_id: &str) -> SqlResult<bool> {
            self.hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(self.known.contains(&namespace_id))
        }
        async fn list_namespaces(&self) -> SqlResult<Vec<(String, String)>> {
            Ok(vec![])
        }
        async fn list_branches(&self) -> SqlResult<Vec<String>> {
            Ok(vec![])
        }
        async fn active_branch(&self) -> SqlResult<String> {
            Ok("main".into())
        }
        async fn diff(&self, from_ref: &str, to_ref: &str) -> SqlResult<BranchDiff> {
            Ok(BranchDiff {
                from_ref: from_ref.into(),
                to_ref: to_ref.into(),
                ..Default::default()
            })
        }
        async fn status(&self, _branch: &str) -> SqlResult<Vec<StagedChange>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn legacy_never_hits_the_reader() {
        let reader = FakeReader {
            known: vec![],
            hits: Default::default(),
        };
        let cache = NamespaceCache::new();
        assert!(cache.exists(&reader, "legacy").await.unwrap());
        assert_eq!(reader.hits.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let reader = FakeReader {
            known: vec!["team-alpha"],
            hits: Default::default(),
        };
        let cache = NamespaceCache::new();
        assert!(cache.exists(&reader, "Team-Alpha").await.unwrap());
        assert!(cache.exists(&reader, "team-alpha").await.unwrap());
        assert_eq!(reader.hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_a_fresh_lookup() {
        let reader = FakeReader {
            known: vec!["team-alpha"],
            hits: Default::default(),
        };
        let cache = NamespaceCache::new();
        cache.exists(&reader, "team-alpha").await.unwrap();
        cache.invalidate("team-alpha");
        cache.exists(&reader, "team-alpha").await.unwrap();
        assert_eq!(reader.hits.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
