use std::sync::Arc;

use arrow_array::{Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_array::builder::FixedSizeListBuilder;
use arrow_array::builder::Float32Builder;
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use cogni_core::{MemoryBlock, EMBEDDING_DIM};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table};

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, VectorError};
use crate::index::VectorIndex;
use crate::scored::ScoredNode;

const BLOCK_ID_COLUMN: &str = "block_id";
const VECTOR_COLUMN: &str = "vector";

fn table_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(BLOCK_ID_COLUMN, DataType::Utf8, false),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIM as i32,
            ),
            false,
        ),
    ]))
}

fn row_batch(schema: Arc<Schema>, block_id: &str, embedding: &[f32]) -> Result<RecordBatch> {
    let ids = StringArray::from(vec![block_id.to_string()]);

    let mut list_builder = FixedSizeListBuilder::new(Float32Builder::new(), EMBEDDING_DIM as i32);
    for value in embedding {
        list_builder.values().append_value(*value);
    }
    list_builder.append(true);
    let vectors = list_builder.finish();

    Ok(RecordBatch::try_new(
        schema,
        vec![Arc::new(ids), Arc::new(vectors)],
    )?)
}

/// LanceDB-backed implementation of [`VectorIndex`]. Opens (or creates, on
/// first use) a single table named `blocks` at the configured URI, one row
/// per memory block keyed by `block_id`.
pub struct LanceVectorIndex<E: EmbeddingProvider> {
    connection: Connection,
    embedder: Arc<E>,
    table_name: String,
}

impl<E: EmbeddingProvider> LanceVectorIndex<E> {
    pub async fn connect(uri: &str, table_name: impl Into<String>, embedder: Arc<E>) -> Result<Self> {
        let connection = lancedb::connect(uri).execute().await?;
        Ok(Self {
            connection,
            embedder,
            table_name: table_name.into(),
        })
    }

    async fn table(&self) -> Result<Table> {
        match self.connection.open_table(&self.table_name).execute().await {
            Ok(table) => Ok(table),
            Err(_) => {
                let schema = table_schema();
                let empty = RecordBatchIterator::new(std::iter::empty::<std::result::Result<RecordBatch, arrow_schema::ArrowError>>(), schema);
                Ok(self
                    .connection
                    .create_table(&self.table_name, Box::new(empty))
                    .execute()
                    .await?)
            }
        }
    }

    async fn upsert(&self, block: &MemoryBlock) -> Result<()> {
        let embedding = match &block.embedding {
            Some(vector) => vector.clone(),
            None => self.embedder.embed(&block.text).await?,
        };
        if embedding.len() != EMBEDDING_DIM {
            return Err(VectorError::WrongDimension {
                expected: EMBEDDING_DIM,
                actual: embedding.len(),
            });
        }

        let table = self.table().await?;
        // LanceDB has no native upsert in the retrieved API surface; mirror
        // the "delete then insert" sequence the corpus's other merge/replace
        // paths use for idempotent re-indexing.
        let predicate = format!("{BLOCK_ID_COLUMN} = '{}'", block.id.replace('\'', "''"));
        let _ = table.delete(&predicate).await;

        let schema = table_schema();
        let batch = row_batch(schema.clone(), &block.id, &embedding)?;
        let batches = RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema);
        table.add(Box::new(batches)).execute().await?;
        Ok(())
    }
}

#[async_trait]
impl<E: EmbeddingProvider> VectorIndex for LanceVectorIndex<E> {
    async fn add_block(&self, block: &MemoryBlock) -> Result<()> {
        self.upsert(block).await
    }

    async fn update_block(&self, block: &MemoryBlock) -> Result<()> {
        self.upsert(block).await
    }

    async fn delete_block(&self, block_id: &str) -> Result<()> {
        let table = self.table().await?;
        let predicate = format!("{BLOCK_ID_COLUMN} = '{}'", block_id.replace('\'', "''"));
        table.delete(&predicate).await?;
        Ok(())
    }

    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<ScoredNode>> {
        let embedding = self.embedder.embed(text).await?;
        let table = self.table().await?;
        let results = table
            .query()
            .nearest_to(embedding)?
            .limit(top_k)
            .execute()
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        let mut scored = Vec::new();
        for batch in results {
            let ids = batch
                .column_by_name(BLOCK_ID_COLUMN)
                .and_then(|c| c.as_any().downcast_ref::<StringArray>().cloned())
                .unwrap_or_else(|| StringArray::from(Vec::<String>::new()));
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>().cloned());
            for i in 0..batch.num_rows() {
                let block_id = ids.value(i).to_string();
                let distance = distances.as_ref().map(|d| d.value(i)).unwrap_or(0.0);
                scored.push(ScoredNode::new(block_id, distance));
            }
        }
        Ok(scored)
    }

    async fn is_ready(&self) -> bool {
        self.table().await.is_ok()
    }
}
