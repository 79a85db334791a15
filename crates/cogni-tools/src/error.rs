use cogni_bank::BankError;
use cogni_core::ErrorCode;
use thiserror::Error;

/// Error surface for the tool framework itself — normalization, namespace
/// injection, schema validation, and patch application — layered over the
/// bank's own error taxonomy so every failure still carries one of the
/// stable [`ErrorCode`]s from §7.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("failed to parse patch: {0}")]
    PatchParse(String),

    #[error("failed to apply patch: {0}")]
    PatchApply(String),

    #[error("patch exceeds size limit: {0}")]
    PatchSizeLimit(String),

    #[error(transparent)]
    Bank(#[from] BankError),
}

impl ToolError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ToolError::Validation(_) => ErrorCode::ValidationError,
            ToolError::UnknownTool(_) => ErrorCode::ValidationError,
            ToolError::PatchParse(_) => ErrorCode::PatchParseError,
            ToolError::PatchApply(_) => ErrorCode::PatchApplyError,
            ToolError::PatchSizeLimit(_) => ErrorCode::PatchSizeLimitError,
            ToolError::Bank(e) => e.code(),
        }
    }

    /// `VERSION_CONFLICT` carries the actual stored version alongside the
    /// stable error code and message, matching §8's "Optimistic lock"
    /// scenario: callers need `previous_version` to retry without another
    /// round-trip fetch.
    pub fn previous_version(&self) -> Option<i64> {
        match self {
            ToolError::Bank(BankError::Core(cogni_core::CogniError::VersionConflict { actual, .. })) => Some(*actual),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
