use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable machine-readable error codes returned to RPC callers.
///
/// Serializes to the exact SCREAMING_SNAKE_CASE strings tool callers match
/// against; do not rename variants without treating it as a breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    BlockNotFound,
    VersionConflict,
    PatchParseError,
    PatchApplyError,
    PatchSizeLimitError,
    LinkValidationError,
    DependenciesExist,
    NamespaceNotFound,
    PersistenceFailure,
    ReIndexFailure,
    CommitFailed,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::BlockNotFound => "BLOCK_NOT_FOUND",
            ErrorCode::VersionConflict => "VERSION_CONFLICT",
            ErrorCode::PatchParseError => "PATCH_PARSE_ERROR",
            ErrorCode::PatchApplyError => "PATCH_APPLY_ERROR",
            ErrorCode::PatchSizeLimitError => "PATCH_SIZE_LIMIT_ERROR",
            ErrorCode::LinkValidationError => "LINK_VALIDATION_ERROR",
            ErrorCode::DependenciesExist => "DEPENDENCIES_EXIST",
            ErrorCode::NamespaceNotFound => "NAMESPACE_NOT_FOUND",
            ErrorCode::PersistenceFailure => "PERSISTENCE_FAILURE",
            ErrorCode::ReIndexFailure => "RE_INDEX_FAILURE",
            ErrorCode::CommitFailed => "COMMIT_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CogniError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("block not found: {0}")]
    BlockNotFound(String),

    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict { expected: i64, actual: i64 },

    #[error("failed to parse patch: {0}")]
    PatchParse(String),

    #[error("failed to apply patch: {0}")]
    PatchApply(String),

    #[error("patch exceeds size limit: {0}")]
    PatchSizeLimit(String),

    #[error("link validation failed: {0}")]
    LinkValidation(String),

    #[error("dependent records exist: {0}")]
    DependenciesExist(String),

    #[error("namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("re-index failure: {0}")]
    ReIndex(String),

    #[error("commit failed: {0}")]
    CommitFailed(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CogniError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CogniError::Validation(_) => ErrorCode::ValidationError,
            CogniError::BlockNotFound(_) => ErrorCode::BlockNotFound,
            CogniError::VersionConflict { .. } => ErrorCode::VersionConflict,
            CogniError::PatchParse(_) => ErrorCode::PatchParseError,
            CogniError::PatchApply(_) => ErrorCode::PatchApplyError,
            CogniError::PatchSizeLimit(_) => ErrorCode::PatchSizeLimitError,
            CogniError::LinkValidation(_) => ErrorCode::LinkValidationError,
            CogniError::DependenciesExist(_) => ErrorCode::DependenciesExist,
            CogniError::NamespaceNotFound(_) => ErrorCode::NamespaceNotFound,
            CogniError::Persistence(_) => ErrorCode::PersistenceFailure,
            CogniError::ReIndex(_) => ErrorCode::ReIndexFailure,
            CogniError::CommitFailed(_) => ErrorCode::CommitFailed,
            CogniError::Internal(_) | CogniError::Other(_) => ErrorCode::InternalError,
        }
    }
}

pub type Result<T> = std::result::Result<T, CogniError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_serializes_to_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::BlockNotFound).unwrap();
        assert_eq!(json, "\"BLOCK_NOT_FOUND\"");
    }

    #[test]
    fn version_conflict_maps_to_version_conflict_code() {
        let err = CogniError::VersionConflict {
            expected: 2,
            actual: 3,
        };
        assert_eq!(err.code(), ErrorCode::VersionConflict);
    }

    #[test]
    fn other_wraps_anyhow_as_internal_error() {
        let err: CogniError = anyhow::anyhow!("boom").into();
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
