//! # cogni-core
//!
//! Core schemas and error taxonomy shared by every other crate in the
//! memory system: the block/link/namespace/proof data model, the typed
//! metadata value, and the stable error code enum returned to tool
//! callers.

pub mod block;
pub mod confidence;
pub mod link;
pub mod namespace;
pub mod proof;
pub mod value;

mod error;
pub use error::{CogniError, ErrorCode, Result};

pub use block::{BlockState, BlockType, MemoryBlock, Visibility, EMBEDDING_DIM, MAX_TAGS};
pub use confidence::ConfidenceScore;
pub use link::{inverse_of, is_hierarchical, relation_info, resolve_relation_alias, BlockLink, RelationInfo};
pub use namespace::{Namespace, DEFAULT_NAMESPACE};
pub use proof::{BlockProof, ProofOperation};
pub use value::{Metadata, Value};
