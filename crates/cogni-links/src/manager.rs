use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use cogni_core::{inverse_of, is_hierarchical, resolve_relation_alias, BlockLink, Value};
use cogni_sql::{SqlReader, SqlWriter};

use crate::cycle::{would_create_cycle, DEFAULT_MAX_DEPTH};
use crate::error::{LinkError, Result};
use crate::page::{Cursor, Page};

/// The only writer of `block_links` rows. Holds non-owning references to
/// the SQL reader/writer — `StructuredMemoryBank` owns their lifetimes and
/// hands this manager a cloned handle.
pub struct LinkManager<R: SqlReader, W: SqlWriter> {
    reader: Arc<R>,
    writer: Arc<W>,
    max_cycle_depth: u32,
}

impl<R: SqlReader, W: SqlWriter> LinkManager<R, W> {
    pub fn new(reader: Arc<R>, writer: Arc<W>) -> Self {
        Self {
            reader,
            writer,
            max_cycle_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_cycle_depth(mut self, depth: u32) -> Self {
        self.max_cycle_depth = depth;
        self
    }

    pub fn resolve_alias(&self, name: &str) -> Result<&'static str> {
        resolve_relation_alias(name).ok_or_else(|| LinkError::InvalidRelation(name.to_string()))
    }

    async fn ensure_endpoints_exist(&self, branch: &str, from_id: &str, to_id: &str) -> Result<()> {
        if !self.reader.block_exists(branch, from_id).await? {
            return Err(LinkError::NotFound(from_id.to_string()));
        }
        if !self.reader.block_exists(branch, to_id).await? {
            return Err(LinkError::NotFound(to_id.to_string()));
        }
        Ok(())
    }

    /// Creates one directed link. An identical pre-existing triple is
    /// reported as [`LinkError::Duplicate`] rather than silently re-created.
    pub async fn create_link(
        &self,
        branch: &str,
        from_id: &str,
        to_id: &str,
        relation: &str,
        priority: i32,
        metadata: BTreeMap<String, Value>,
        created_by: Option<String>,
    ) -> Result<BlockLink> {
        if from_id == to_id {
            return Err(LinkError::SelfLink(from_id.to_string()));
        }
        let canonical = self.resolve_alias(relation)?;
        self.ensure_endpoints_exist(branch, from_id, to_id).await?;

        if self.reader.link_exists(branch, from_id, to_id, canonical).await? {
            return Err(LinkError::Duplicate {
                from_id: from_id.to_string(),
                to_id: to_id.to_string(),
                relation: canonical.to_string(),
            });
        }

        if is_hierarchical(canonical)
            && would_create_cycle(self.reader.as_ref(), branch, from_id, to_id, canonical, self.max_cycle_depth)
                .await?
        {
            return Err(LinkError::Cycle {
                from_id: from_id.to_string(),
                to_id: to_id.to_string(),
                relation: canonical.to_string(),
            });
        }

        let link = BlockLink {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            relation: canonical.to_string(),
            priority,
            link_metadata: metadata,
            created_by,
            created_at: Utc::now(),
        };
        self.writer.insert_link(branch, &link).await?;
        Ok(link)
    }

    /// Creates the forward link and its canonical inverse atomically: both
    /// are checked for absence first, so either both are created or
    /// neither is. A relation with no declared inverse fails with
    /// [`LinkError::NoInverse`]; a triple where exactly one direction
    /// already exists fails with [`LinkError::PartialCollision`] rather
    /// than silently creating only the missing half.
    pub async fn create_bidirectional(
        &self,
        branch: &str,
        from_id: &str,
        to_id: &str,
        relation: &str,
        priority: i32,
        metadata: BTreeMap<String, Value>,
        created_by: Option<String>,
    ) -> Result<(BlockLink, BlockLink)> {
        if from_id == to_id {
            return Err(LinkError::SelfLink(from_id.to_string()));
        }
        let canonical = self.resolve_alias(relation)?;
        let inverse = inverse_of(canonical).ok_or_else(|| LinkError::NoInverse {
            relation: canonical.to_string(),
        })?;
        self.ensure_endpoints_exist(branch, from_id, to_id).await?;

        let forward_exists = self.reader.link_exists(branch, from_id, to_id, canonical).await?;
        let inverse_exists = self.reader.link_exists(branch, to_id, from_id, inverse).await?;

        if forward_exists != inverse_exists {
            let existing = if forward_exists {
                format!("({from_id}, {to_id}, {canonical})")
            } else {
                format!("({to_id}, {from_id}, {inverse})")
            };
            return Err(LinkError::PartialCollision(existing));
        }
        if forward_exists {
            return Err(LinkError::Duplicate {
                from_id: from_id.to_string(),
                to_id: to_id.to_string(),
                relation: canonical.to_string(),
            });
        }

        if is_hierarchical(canonical)
            && would_create_cycle(self.reader.as_ref(), branch, from_id, to_id, canonical, self.max_cycle_depth)
                .await?
        {
            return Err(LinkError::Cycle {
                from_id: from_id.to_string(),
                to_id: to_id.to_string(),
                relation: canonical.to_string(),
            });
        }

        let now = Utc::now();
        let forward = BlockLink {
            from_id: from_id.to_string(),
            to_id: to_id.to_string(),
            relation: canonical.to_string(),
            priority,
            link_metadata: metadata.clone(),
            created_by: created_by.clone(),
            created_at: now,
        };
        let backward = BlockLink {
            from_id: to_id.to_string(),
            to_id: from_id.to_string(),
            relation: inverse.to_string(),
            priority,
            link_metadata: metadata,
            created_by,
            created_at: now,
        };

        self.writer.insert_link(branch, &forward).await?;
        self.writer.insert_link(branch, &backward).await?;
        Ok((forward, backward))
    }

    pub async fn delete_link(&self, branch: &str, from_id: &str, to_id: &str, relation: &str) -> Result<()> {
        let canonical = self.resolve_alias(relation)?;
        self.writer.delete_link(branch, from_id, to_id, canonical).await?;
        Ok(())
    }

    pub async fn links_from(
        &self,
        branch: &str,
        id: &str,
        relation: Option<&str>,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<BlockLink>> {
        let canonical = relation.map(|r| self.resolve_alias(r)).transpose()?;
        let offset = cursor.and_then(Cursor::decode).map(|c| c.offset).unwrap_or(0);
        let mut rows = self
            .reader
            .links_from(branch, id, canonical, limit + 1, offset)
            .await?;
        paginate(&mut rows, offset, limit)
    }

    pub async fn links_to(
        &self,
        branch: &str,
        id: &str,
        relation: Option<&str>,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<BlockLink>> {
        let canonical = relation.map(|r| self.resolve_alias(r)).transpose()?;
        let offset = cursor.and_then(Cursor::decode).map(|c| c.offset).unwrap_or(0);
        let mut rows = self
            .reader
            .links_to(branch, id, canonical, limit + 1, offset)
            .await?;
        paginate(&mut rows, offset, limit)
    }
}

fn paginate(rows: &mut Vec<BlockLink>, offset: u32, limit: u32) -> Result<Page<BlockLink>> {
    let has_more = rows.len() as u32 > limit;
    rows.truncate(limit as usize);
    let next_cursor = has_more.then(|| {
        Cursor {
            offset: offset + limit,
        }
        .encode()
    });
    Ok(Page {
        items: std::mem::take(rows),
        next_cursor,
    })
}
