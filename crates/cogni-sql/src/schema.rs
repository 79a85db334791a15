//! DDL for the tables this crate reads and writes. `ensure_schema` is an
//! opt-in bootstrap helper, not a migration framework — evolving the
//! Dolt-hosted schema over time is out of scope here.

pub const MEMORY_BLOCKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS memory_blocks (
    id VARCHAR(255) PRIMARY KEY,
    namespace_id VARCHAR(255) NOT NULL,
    type VARCHAR(50) NOT NULL,
    schema_version INT NULL,
    text LONGTEXT NOT NULL,
    state VARCHAR(50) NULL DEFAULT 'draft',
    visibility VARCHAR(50) NULL DEFAULT 'internal',
    block_version INT NULL DEFAULT 1,
    tags JSON NOT NULL,
    source_file VARCHAR(255) NULL,
    source_uri VARCHAR(255) NULL,
    confidence JSON NULL,
    created_by VARCHAR(255) NULL,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL,
    embedding LONGTEXT NULL,
    CONSTRAINT chk_valid_state CHECK (state IN ('draft', 'published', 'archived')),
    CONSTRAINT chk_valid_visibility CHECK (visibility IN ('internal', 'public', 'restricted')),
    CONSTRAINT chk_block_version_positive CHECK (block_version > 0)
);
"#;

pub const MEMORY_BLOCKS_INDEX: &str =
    "CREATE INDEX idx_memory_blocks_type_state_visibility ON memory_blocks (type, state, visibility);";

/// Property-Schema Split: one row per metadata key, preserving the exact
/// runtime type via `value_type` rather than collapsing everything to
/// JSON text.
pub const BLOCK_PROPERTIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS block_properties (
    block_id VARCHAR(255) NOT NULL,
    property_key VARCHAR(255) NOT NULL,
    value_type VARCHAR(20) NOT NULL,
    value_text LONGTEXT NULL,
    PRIMARY KEY (block_id, property_key)
);
"#;

pub const BLOCK_LINKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS block_links (
    from_id VARCHAR(255) NOT NULL,
    to_id VARCHAR(255) NOT NULL,
    relation VARCHAR(50) NOT NULL,
    priority INT NOT NULL DEFAULT 0,
    link_metadata JSON NULL,
    created_by VARCHAR(255) NULL,
    created_at DATETIME NOT NULL,
    PRIMARY KEY (from_id, to_id, relation)
);
"#;

pub const BLOCK_LINKS_INDEX: &str = "CREATE INDEX idx_block_links_to_id ON block_links (to_id);";

pub const NAMESPACES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS namespaces (
    id VARCHAR(255) PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(255) NOT NULL,
    owner_id VARCHAR(255) NULL,
    created_at DATETIME NOT NULL,
    description VARCHAR(255) NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE
);
"#;

pub const NAMESPACES_SLUG_INDEX: &str =
    "CREATE UNIQUE INDEX idx_namespaces_slug_ci ON namespaces ((LOWER(slug)));";

pub const BLOCK_PROOFS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS block_proofs (
    block_id VARCHAR(255) NOT NULL,
    operation VARCHAR(20) NOT NULL,
    commit_hash VARCHAR(255) NOT NULL,
    timestamp DATETIME NOT NULL
);
"#;

pub fn all_statements() -> Vec<&'static str> {
    vec![
        MEMORY_BLOCKS_TABLE,
        MEMORY_BLOCKS_INDEX,
        BLOCK_PROPERTIES_TABLE,
        BLOCK_LINKS_TABLE,
        BLOCK_LINKS_INDEX,
        NAMESPACES_TABLE,
        NAMESPACES_SLUG_INDEX,
        BLOCK_PROOFS_TABLE,
    ]
}
