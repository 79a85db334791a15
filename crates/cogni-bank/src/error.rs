use cogni_core::{CogniError, ErrorCode};
use cogni_links::LinkError;
use cogni_sql::SqlError;
use cogni_vector::VectorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BankError {
    #[error(transparent)]
    Core(#[from] CogniError),

    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Vector(#[from] VectorError),
}

impl BankError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BankError::Core(e) => e.code(),
            BankError::Sql(_) => ErrorCode::PersistenceFailure,
            BankError::Link(e) => e.code(),
            BankError::Vector(_) => ErrorCode::ReIndexFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, BankError>;
