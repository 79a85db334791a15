use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("vector backend error: {0}")]
    Backend(#[from] lancedb::Error),

    #[error("embedding provider error: {0}")]
    Embedding(String),

    #[error("embedding has wrong dimension: expected {expected}, got {actual}")]
    WrongDimension { expected: usize, actual: usize },

    #[error("vector index is not ready")]
    NotReady,

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

pub type Result<T> = std::result::Result<T, VectorError>;
