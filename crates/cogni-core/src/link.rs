use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A directed, typed edge between two memory blocks. The primary key is
/// `(from_id, to_id, relation)`: the same pair of blocks may carry more
/// than one relation, but never the same relation twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BlockLink {
    pub from_id: String,
    pub to_id: String,
    pub relation: String,
    pub priority: i32,
    pub link_metadata: BTreeMap<String, Value>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BlockLink {
    pub fn is_self_link(&self) -> bool {
        self.from_id == self.to_id
    }
}

/// Static description of one relation in the closed registry: its inverse
/// (if any), whether it participates in cycle detection, and its aliases.
#[derive(Debug, Clone, Copy)]
pub struct RelationInfo {
    pub canonical: &'static str,
    pub inverse: Option<&'static str>,
    pub hierarchical: bool,
}

/// The closed relation registry. An implementer's decision (recorded in
/// this workspace's design ledger): new relations are not dynamically
/// registrable, so this table is the full set of recognized relations.
static RELATIONS: Lazy<Vec<RelationInfo>> = Lazy::new(|| {
    vec![
        RelationInfo {
            canonical: "subtask_of",
            inverse: Some("has_subtask"),
            hierarchical: true,
        },
        RelationInfo {
            canonical: "has_subtask",
            inverse: Some("subtask_of"),
            hierarchical: true,
        },
        RelationInfo {
            canonical: "depends_on",
            inverse: Some("blocks"),
            hierarchical: true,
        },
        RelationInfo {
            canonical: "blocks",
            inverse: Some("depends_on"),
            hierarchical: true,
        },
        RelationInfo {
            canonical: "child_of",
            inverse: Some("parent_of"),
            hierarchical: true,
        },
        RelationInfo {
            canonical: "parent_of",
            inverse: Some("child_of"),
            hierarchical: true,
        },
        RelationInfo {
            canonical: "related_to",
            inverse: Some("related_to"),
            hierarchical: false,
        },
        RelationInfo {
            canonical: "mentions",
            inverse: None,
            hierarchical: false,
        },
        RelationInfo {
            canonical: "derived_from",
            inverse: Some("source_of"),
            hierarchical: false,
        },
        RelationInfo {
            canonical: "source_of",
            inverse: Some("derived_from"),
            hierarchical: false,
        },
    ]
});

/// Aliases resolve to a canonical relation name before storage.
static ALIASES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert("is_blocked_by", "depends_on");
    m.insert("relates_to", "related_to");
    m.insert("references", "mentions");
    m
});

/// Resolves a relation name (possibly an alias) to its canonical form.
/// Returns `None` if the name is neither a canonical relation nor a known
/// alias.
pub fn resolve_relation_alias(name: &str) -> Option<&'static str> {
    if let Some(info) = RELATIONS.iter().find(|r| r.canonical == name) {
        return Some(info.canonical);
    }
    ALIASES.get(name).copied()
}

pub fn relation_info(canonical: &str) -> Option<RelationInfo> {
    RELATIONS.iter().find(|r| r.canonical == canonical).copied()
}

pub fn is_hierarchical(canonical: &str) -> bool {
    relation_info(canonical).map(|r| r.hierarchical).unwrap_or(false)
}

pub fn inverse_of(canonical: &str) -> Option<&'static str> {
    relation_info(canonical).and_then(|r| r.inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_resolves_to_canonical() {
        assert_eq!(resolve_relation_alias("is_blocked_by"), Some("depends_on"));
    }

    #[test]
    fn canonical_resolves_to_itself() {
        assert_eq!(resolve_relation_alias("blocks"), Some("blocks"));
    }

    #[test]
    fn unknown_relation_resolves_to_none() {
        assert_eq!(resolve_relation_alias("nonsense"), None);
    }

    #[test]
    fn depends_on_and_blocks_are_mutual_inverses() {
        assert_eq!(inverse_of("depends_on"), Some("blocks"));
        assert_eq!(inverse_of("blocks"), Some("depends_on"));
    }

    #[test]
    fn hierarchical_relations_are_flagged() {
        assert!(is_hierarchical("subtask_of"));
        assert!(!is_hierarchical("mentions"));
    }

    #[test]
    fn self_link_detection() {
        let link = BlockLink {
            from_id: "a".into(),
            to_id: "a".into(),
            relation: "related_to".into(),
            priority: 0,
            link_metadata: BTreeMap::new(),
            created_by: None,
            created_at: Utc::now(),
        };
        assert!(link.is_self_link());
    }
}
