//! # cogni-vector
//!
//! The vector index adapter: a best-effort mirror of block embeddings,
//! keyed by block id, backed by LanceDB. StructuredMemoryBank is the only
//! caller; this crate never speaks to the SQL engine.

mod embedding;
mod error;
mod index;
mod lance;
mod scored;

pub use embedding::{EmbeddingProvider, HashEmbeddingProvider};
pub use error::{Result, VectorError};
pub use index::VectorIndex;
pub use lance::LanceVectorIndex;
pub use scored::ScoredNode;
