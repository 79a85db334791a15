use std::collections::HashMap;

use async_trait::async_trait;
use cogni_core::{BlockLink, BlockProof, BlockState, BlockType, ConfidenceScore, MemoryBlock, Namespace, Value, Visibility};
use cogni_config::SqlConnectionConfig;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};

use crate::diff::{BranchDiff, StagedChange};
use crate::error::{check_bindable, Result, SqlError};
use crate::reader::SqlReader;
use crate::writer::SqlWriter;

/// The concrete MySQL-wire client binding to the Dolt-hosted versioned
/// engine. Branch/staging operations (`add_to_staging`, `commit_changes`,
/// `checkout_branch`, ...) run against the same pool; callers that need a
/// pinned single-connection session across a staging sequence acquire one
/// explicitly via `pool().acquire()` rather than this type holding one
/// itself, keeping `MySqlEngine` cheaply cloneable and `Sync`.
pub struct MySqlEngine {
    pool: MySqlPool,
}

impl MySqlEngine {
    pub async fn connect(config: &SqlConnectionConfig) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .connect(&config.connection_url())
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for stmt in crate::schema::all_statements() {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    fn row_to_block(row: &sqlx::mysql::MySqlRow) -> Result<MemoryBlock> {
        let block_type: String = row.try_get("type")?;
        let block_type = match block_type.as_str() {
            "knowledge" => BlockType::Knowledge,
            "task" => BlockType::Task,
            "project" => BlockType::Project,
            "doc" => BlockType::Doc,
            "interaction" => BlockType::Interaction,
            "log" => BlockType::Log,
            "epic" => BlockType::Epic,
            "bug" => BlockType::Bug,
            other => {
                return Err(SqlError::CommitFailed(format!(
                    "unrecognized block type in storage: {other}"
                )))
            }
        };
        let state: Option<String> = row.try_get("state")?;
        let visibility: Option<String> = row.try_get("visibility")?;
        let tags_json: serde_json::Value = row.try_get("tags")?;
        let confidence_json: Option<serde_json::Value> = row.try_get("confidence")?;

        Ok(MemoryBlock {
            id: row.try_get("id")?,
            namespace_id: row.try_get("namespace_id")?,
            block_type,
            schema_version: row.try_get("schema_version")?,
            text: row.try_get("text")?,
            state: state.and_then(|s| match s.as_str() {
                "draft" => Some(BlockState::Draft),
                "published" => Some(BlockState::Published),
                "archived" => Some(BlockState::Archived),
                _ => None,
            }),
            visibility: visibility.and_then(|v| match v.as_str() {
                "internal" => Some(Visibility::Internal),
                "public" => Some(Visibility::Public),
                "restricted" => Some(Visibility::Restricted),
                _ => None,
            }),
            block_version: row.try_get::<i32, _>("block_version")? as i64,
            tags: serde_json::from_value(tags_json).unwrap_or_default(),
            metadata: Default::default(),
            links: Vec::new(),
            source_file: row.try_get("source_file")?,
            source_uri: row.try_get("source_uri")?,
            confidence: confidence_json.and_then(|v| serde_json::from_value::<ConfidenceScore>(v).ok()),
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            embedding: None,
        })
    }

    fn row_to_link(row: &sqlx::mysql::MySqlRow) -> Result<BlockLink> {
        let metadata_json: Option<serde_json::Value> = row.try_get("link_metadata")?;
        Ok(BlockLink {
            from_id: row.try_get("from_id")?,
            to_id: row.try_get("to_id")?,
            relation: row.try_get("relation")?,
            priority: row.try_get("priority")?,
            link_metadata: metadata_json
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn value_to_row(value: &Value) -> (&'static str, String) {
        match value {
            Value::Bool(b) => ("bool", b.to_string()),
            Value::Int(i) => ("int", i.to_string()),
            Value::Float(f) => ("float", f.to_string()),
            Value::Text(s) => ("text", s.clone()),
            Value::Null => ("null", String::new()),
            Value::List(_) | Value::Map(_) => (
                value.type_tag(),
                serde_json::to_string(&serde_json::Value::from(value.clone())).unwrap_or_default(),
            ),
        }
    }

    fn row_to_value(value_type: &str, value_text: &str) -> Value {
        match value_type {
            "bool" => Value::Bool(value_text.parse().unwrap_or(false)),
            "int" => Value::Int(value_text.parse().unwrap_or(0)),
            "float" => Value::Float(value_text.parse().unwrap_or(0.0)),
            "text" => Value::Text(value_text.to_string()),
            "list" | "map" => serde_json::from_str::<serde_json::Value>(value_text)
                .map(Value::from)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }
}

#[async_trait]
impl SqlReader for MySqlEngine {
    async fn get_block(&self, branch: &str, block_id: &str) -> Result<Option<MemoryBlock>> {
        check_bindable(branch)?;
        check_bindable(block_id)?;
        let row = sqlx::query("SELECT * FROM memory_blocks AS OF ? WHERE id = ?")
            .bind(branch)
            .bind(block_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_block).transpose()
    }

    async fn query_blocks(
        &self,
        branch: &str,
        namespace_id: Option<&str>,
        block_type: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<MemoryBlock>> {
        check_bindable(branch)?;
        if let Some(ns) = namespace_id {
            check_bindable(ns)?;
        }
        if let Some(bt) = block_type {
            check_bindable(bt)?;
        }

        let mut query = String::from("SELECT * FROM memory_blocks AS OF ? WHERE 1 = 1");
        if namespace_id.is_some() {
            query.push_str(" AND namespace_id = ?");
        }
        if block_type.is_some() {
            query.push_str(" AND type = ?");
        }
        query.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query(&query).bind(branch);
        if let Some(ns) = namespace_id {
            q = q.bind(ns);
        }
        if let Some(bt) = block_type {
            q = q.bind(bt);
        }
        q = q.bind(limit).bind(offset);

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_block).collect()
    }

    async fn block_exists(&self, branch: &str, block_id: &str) -> Result<bool> {
        check_bindable(branch)?;
        check_bindable(block_id)?;
        let row = sqlx::query("SELECT id FROM memory_blocks AS OF ? WHERE id = ?")
            .bind(branch)
            .bind(block_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn read_block_properties(
        &self,
        branch: &str,
        block_id: &str,
    ) -> Result<Vec<(String, Value)>> {
        check_bindable(branch)?;
        check_bindable(block_id)?;
        let rows = sqlx::query(
            "SELECT property_key, value_type, value_text FROM block_properties AS OF ? WHERE block_id = ?",
        )
        .bind(branch)
        .bind(block_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let key: String = row.try_get("property_key")?;
                let value_type: String = row.try_get("value_type")?;
                let value_text: String = row.try_get("value_text")?;
                Ok((key, Self::row_to_value(&value_type, &value_text)))
            })
            .collect()
    }

    async fn batch_read_block_properties(
        &self,
        branch: &str,
        block_ids: &[String],
    ) -> Result<HashMap<String, Vec<(String, Value)>>> {
        let mut out = HashMap::with_capacity(block_ids.len());
        for id in block_ids {
            let props = self.read_block_properties(branch, id).await?;
            out.insert(id.clone(), props);
        }
        Ok(out)
    }

    async fn links_from(
        &self,
        branch: &str,
        from_id: &str,
        relation: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BlockLink>> {
        check_bindable(branch)?;
        check_bindable(from_id)?;
        if let Some(r) = relation {
            check_bindable(r)?;
        }
        let mut query = String::from("SELECT * FROM block_links AS OF ? WHERE from_id = ?");
        if relation.is_some() {
            query.push_str(" AND relation = ?");
        }
        query.push_str(" ORDER BY from_id, to_id, relation LIMIT ? OFFSET ?");

        let mut q = sqlx::query(&query).bind(branch).bind(from_id);
        if let Some(r) = relation {
            q = q.bind(r);
        }
        q = q.bind(limit).bind(offset);

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_link).collect()
    }

    async fn links_to(
        &self,
        branch: &str,
        to_id: &str,
        relation: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BlockLink>> {
        check_bindable(branch)?;
        check_bindable(to_id)?;
        if let Some(r) = relation {
            check_bindable(r)?;
        }
        let mut query = String::from("SELECT * FROM block_links AS OF ? WHERE to_id = ?");
        if relation.is_some() {
            query.push_str(" AND relation = ?");
        }
        query.push_str(" ORDER BY from_id, to_id, relation LIMIT ? OFFSET ?");

        let mut q = sqlx::query(&query).bind(branch).bind(to_id);
        if let Some(r) = relation {
            q = q.bind(r);
        }
        q = q.bind(limit).bind(offset);

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_link).collect()
    }

    async fn link_exists(&self, branch: &str, from_id: &str, to_id: &str, relation: &str) -> Result<bool> {
        check_bindable(branch)?;
        check_bindable(from_id)?;
        check_bindable(to_id)?;
        check_bindable(relation)?;
        let row = sqlx::query(
            "SELECT from_id FROM block_links AS OF ? WHERE from_id = ? AND to_id = ? AND relation = ?",
        )
        .bind(branch)
        .bind(from_id)
        .bind(to_id)
        .bind(relation)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn namespace_exists(&self, namespace_id: &str) -> Result<bool> {
        check_bindable(namespace_id)?;
        let row = sqlx::query("SELECT id FROM namespaces WHERE LOWER(id) = LOWER(?)")
            .bind(namespace_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn list_namespaces(&self) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query("SELECT id, name FROM namespaces ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| Ok((row.try_get("id")?, row.try_get("name")?)))
            .collect()
    }

    async fn list_branches(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT name FROM dolt_branches")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| Ok(row.try_get("name")?)).collect()
    }

    async fn active_branch(&self) -> Result<String> {
        let row = sqlx::query("SELECT active_branch() AS branch")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("branch")?)
    }

    async fn diff(&self, from_ref: &str, to_ref: &str) -> Result<BranchDiff> {
        check_bindable(from_ref)?;
        check_bindable(to_ref)?;
        let rows = sqlx::query(
            "SELECT to_table_name, to_pk, diff_type FROM dolt_diff(?, ?, 'memory_blocks')",
        )
        .bind(from_ref)
        .bind(to_ref)
        .fetch_all(&self.pool)
        .await?;

        let mut diff = BranchDiff {
            from_ref: from_ref.to_string(),
            to_ref: to_ref.to_string(),
            ..Default::default()
        };
        for row in rows {
            let table_name: String = row.try_get("to_table_name").unwrap_or_default();
            let row_id: String = row.try_get("to_pk").unwrap_or_default();
            let diff_type: String = row.try_get("diff_type").unwrap_or_default();
            let change = StagedChange {
                table_name,
                row_id,
                operation: diff_type.clone(),
            };
            match diff_type.as_str() {
                "added" => diff.added.push(change),
                "removed" => diff.removed.push(change),
                _ => diff.modified.push(change),
            }
        }
        Ok(diff)
    }

    async fn status(&self, branch: &str) -> Result<Vec<StagedChange>> {
        check_bindable(branch)?;
        let rows = sqlx::query("SELECT table_name, staged FROM dolt_status")
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| {
                Ok(StagedChange {
                    table_name: row.try_get("table_name")?,
                    row_id: String::new(),
                    operation: if row.try_get::<bool, _>("staged")? {
                        "staged".into()
                    } else {
                        "unstaged".into()
                    },
                })
            })
            .collect()
    }
}

#[async_trait]
impl SqlWriter for MySqlEngine {
    async fn insert_block(&self, branch: &str, block: &MemoryBlock) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(&block.id)?;
        sqlx::query(
            "INSERT INTO memory_blocks (id, namespace_id, type, schema_version, text, state, \
             visibility, block_version, tags, source_file, source_uri, confidence, created_by, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&block.id)
        .bind(&block.namespace_id)
        .bind(serde_json::to_string(&block.block_type).unwrap_or_default())
        .bind(block.schema_version)
        .bind(&block.text)
        .bind(block.state.map(|s| serde_json::to_string(&s).unwrap_or_default()))
        .bind(block.visibility.map(|v| serde_json::to_string(&v).unwrap_or_default()))
        .bind(block.block_version as i32)
        .bind(serde_json::to_value(&block.tags).unwrap_or_default())
        .bind(&block.source_file)
        .bind(&block.source_uri)
        .bind(block.confidence.map(|c| serde_json::to_value(c).unwrap_or_default()))
        .bind(&block.created_by)
        .bind(block.created_at)
        .bind(block.updated_at)
        .execute(&self.pool)
        .await?;
        let _ = branch;
        Ok(())
    }

    async fn update_block(&self, branch: &str, block: &MemoryBlock) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(&block.id)?;
        let result = sqlx::query(
            "UPDATE memory_blocks SET text = ?, state = ?, visibility = ?, block_version = ?, \
             tags = ?, source_file = ?, source_uri = ?, confidence = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&block.text)
        .bind(block.state.map(|s| serde_json::to_string(&s).unwrap_or_default()))
        .bind(block.visibility.map(|v| serde_json::to_string(&v).unwrap_or_default()))
        .bind(block.block_version as i32)
        .bind(serde_json::to_value(&block.tags).unwrap_or_default())
        .bind(&block.source_file)
        .bind(&block.source_uri)
        .bind(block.confidence.map(|c| serde_json::to_value(c).unwrap_or_default()))
        .bind(block.updated_at)
        .bind(&block.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(SqlError::BlockNotFound(block.id.clone()));
        }
        Ok(())
    }

    async fn delete_block(&self, branch: &str, block_id: &str) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(block_id)?;
        sqlx::query("DELETE FROM memory_blocks WHERE id = ?")
            .bind(block_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn write_block_properties(
        &self,
        branch: &str,
        block_id: &str,
        properties: &[(String, Value)],
    ) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(block_id)?;
        sqlx::query("DELETE FROM block_properties WHERE block_id = ?")
            .bind(block_id)
            .execute(&self.pool)
            .await?;
        for (key, value) in properties {
            check_bindable(key)?;
            let (value_type, value_text) = Self::value_to_row(value);
            check_bindable(&value_text)?;
            sqlx::query(
                "INSERT INTO block_properties (block_id, property_key, value_type, value_text) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(block_id)
            .bind(key)
            .bind(value_type)
            .bind(value_text)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn delete_block_properties(&self, branch: &str, block_id: &str) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(block_id)?;
        sqlx::query("DELETE FROM block_properties WHERE block_id = ?")
            .bind(block_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_links_touching(&self, branch: &str, block_id: &str) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(block_id)?;
        sqlx::query("DELETE FROM block_links WHERE from_id = ? OR to_id = ?")
            .bind(block_id)
            .bind(block_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn write_proof(&self, branch: &str, proof: &BlockProof) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(&proof.block_id)?;
        check_bindable(&proof.commit_hash)?;
        sqlx::query(
            "INSERT INTO block_proofs (block_id, operation, commit_hash, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(&proof.block_id)
        .bind(serde_json::to_string(&proof.operation).unwrap_or_default())
        .bind(&proof.commit_hash)
        .bind(proof.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_link(&self, branch: &str, link: &BlockLink) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(&link.from_id)?;
        check_bindable(&link.to_id)?;
        check_bindable(&link.relation)?;
        sqlx::query(
            "INSERT INTO block_links (from_id, to_id, relation, priority, link_metadata, \
             created_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&link.from_id)
        .bind(&link.to_id)
        .bind(&link.relation)
        .bind(link.priority)
        .bind(serde_json::to_value(&link.link_metadata).unwrap_or_default())
        .bind(&link.created_by)
        .bind(link.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_link(
        &self,
        branch: &str,
        from_id: &str,
        to_id: &str,
        relation: &str,
    ) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(from_id)?;
        check_bindable(to_id)?;
        check_bindable(relation)?;
        sqlx::query("DELETE FROM block_links WHERE from_id = ? AND to_id = ? AND relation = ?")
            .bind(from_id)
            .bind(to_id)
            .bind(relation)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_namespace(&self, namespace: &Namespace) -> Result<()> {
        check_bindable(&namespace.id)?;
        sqlx::query(
            "INSERT INTO namespaces (id, name, slug, owner_id, created_at, description, \
             is_active) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&namespace.id)
        .bind(&namespace.name)
        .bind(&namespace.slug)
        .bind(&namespace.owner_id)
        .bind(namespace.created_at)
        .bind(&namespace.description)
        .bind(namespace.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn add_to_staging(&self, branch: &str, tables: &[&str]) -> Result<()> {
        check_bindable(branch)?;
        for table in tables {
            check_bindable(table)?;
            sqlx::query("CALL DOLT_ADD(?)")
                .bind(*table)
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }

    async fn commit_changes(&self, branch: &str, message: &str, author: &str) -> Result<String> {
        check_bindable(branch)?;
        check_bindable(message)?;
        check_bindable(author)?;
        let row = sqlx::query("SELECT DOLT_COMMIT('-m', ?, '--author', ?) AS hash")
            .bind(message)
            .bind(author)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("hash")?)
    }

    async fn discard_changes(&self, branch: &str) -> Result<()> {
        check_bindable(branch)?;
        sqlx::query("CALL DOLT_RESET('--hard')")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn checkout_branch(&self, branch: &str) -> Result<()> {
        check_bindable(branch)?;
        sqlx::query("CALL DOLT_CHECKOUT(?)")
            .bind(branch)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create_branch(&self, branch: &str, from_ref: &str) -> Result<()> {
        check_bindable(branch)?;
        check_bindable(from_ref)?;
        sqlx::query("CALL DOLT_BRANCH(?, ?)")
            .bind(branch)
            .bind(from_ref)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        check_bindable(remote)?;
        check_bindable(branch)?;
        sqlx::query("CALL DOLT_PUSH(?, ?)")
            .bind(remote)
            .bind(branch)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        check_bindable(remote)?;
        check_bindable(branch)?;
        sqlx::query("CALL DOLT_PULL(?, ?)")
            .bind(remote)
            .bind(branch)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn merge(&self, from_branch: &str, into_branch: &str) -> Result<String> {
        check_bindable(from_branch)?;
        check_bindable(into_branch)?;
        let row = sqlx::query("SELECT DOLT_MERGE(?) AS hash")
            .bind(from_branch)
            .fetch_one(&self.pool)
            .await?;
        let hash: Option<String> = row.try_get("hash").ok();
        hash.ok_or_else(|| SqlError::MergeConflict(into_branch.to_string()))
    }

    async fn reset(&self, branch: &str, hard: bool) -> Result<()> {
        check_bindable(branch)?;
        let flag = if hard { "--hard" } else { "--soft" };
        sqlx::query("CALL DOLT_RESET(?)")
            .bind(flag)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
