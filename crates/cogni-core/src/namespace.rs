use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The namespace that always exists, used as a fast-path default throughout
/// the namespace validation cache.
pub const DEFAULT_NAMESPACE: &str = "legacy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Namespace {
    pub id: String,
    pub name: String,
    /// Unique case-insensitively across all namespaces.
    pub slug: String,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
    pub is_active: bool,
}

impl Namespace {
    pub fn legacy() -> Self {
        Self {
            id: DEFAULT_NAMESPACE.to_string(),
            name: "Legacy".to_string(),
            slug: DEFAULT_NAMESPACE.to_string(),
            owner_id: None,
            created_at: Utc::now(),
            description: Some("Default namespace for blocks created before namespacing".into()),
            is_active: true,
        }
    }

    /// Normalized cache/comparison key: lower-cased and trimmed, matching
    /// the namespace validation helper's key normalization.
    pub fn normalize_id(id: &str) -> String {
        id.to_lowercase().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_namespace_is_active_by_default() {
        assert!(Namespace::legacy().is_active);
    }

    #[test]
    fn normalize_id_lowercases_and_trims() {
        assert_eq!(Namespace::normalize_id("  Team-Alpha \n"), "team-alpha");
    }
}
