use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("value contains a disallowed control byte: {0:?}")]
    InvalidControlByte(char),

    #[error("block not found: {0}")]
    BlockNotFound(String),

    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("merge conflict on branch {0}")]
    MergeConflict(String),
}

pub type Result<T> = std::result::Result<T, SqlError>;

/// Rejects string values carrying NUL, backspace, or SUB control bytes
/// before they reach a bound parameter. These bytes have caused wire-level
/// corruption with some MySQL-protocol proxies in front of Dolt, so they
/// are rejected outright rather than escaped.
pub fn check_bindable(value: &str) -> Result<()> {
    for c in value.chars() {
        if c == '\0' || c == '\u{0008}' || c == '\u{001A}' {
            return Err(SqlError::InvalidControlByte(c));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nul_byte() {
        assert!(check_bindable("hello\0world").is_err());
    }

    #[test]
    fn accepts_clean_string() {
        assert!(check_bindable("hello world").is_ok());
    }
}
