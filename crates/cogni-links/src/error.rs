use cogni_core::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("block not found: {0}")]
    NotFound(String),

    #[error("unknown relation: {0}")]
    InvalidRelation(String),

    #[error("relation {relation} has no declared inverse")]
    NoInverse { relation: String },

    #[error("link from {from_id} to {to_id} would create a cycle via {relation}")]
    Cycle {
        from_id: String,
        to_id: String,
        relation: String,
    },

    #[error("a link ({from_id}, {to_id}, {relation}) already exists")]
    Duplicate {
        from_id: String,
        to_id: String,
        relation: String,
    },

    #[error("bidirectional create partially collided: {0} already existed")]
    PartialCollision(String),

    #[error("a link cannot connect a block to itself: {0}")]
    SelfLink(String),

    #[error(transparent)]
    Sql(#[from] cogni_sql::SqlError),
}

impl LinkError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LinkError::NotFound(_) => ErrorCode::BlockNotFound,
            LinkError::InvalidRelation(_)
            | LinkError::NoInverse { .. }
            | LinkError::Cycle { .. }
            | LinkError::Duplicate { .. }
            | LinkError::PartialCollision(_)
            | LinkError::SelfLink(_) => ErrorCode::LinkValidationError,
            LinkError::Sql(_) => ErrorCode::PersistenceFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;
