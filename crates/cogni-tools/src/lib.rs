//! # cogni-tools
//!
//! The tool-dispatch RPC layer: the `CogniTool` descriptor, the registry
//! auto-registration turns into one endpoint per tool, the
//! normalize → inject_namespace → validate → execute → serialize pipeline,
//! and every concrete tool implementation named in §6 — block CRUD,
//! work-item specialization, docs, links, bulk variants, namespaces,
//! global/branch ops, and `HealthCheck`.

pub mod bulk;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod normalize;
pub mod patch;
pub mod registry;
pub mod tools;

pub use context::SharedContext;
pub use descriptor::{make_tool, schema_pair, BoxFuture, CogniTool, ToolFn};
pub use dispatch::ToolExecutor;
pub use error::{Result, ToolError};
pub use registry::{RegistryError, ToolRegistry};
pub use tools::build_registry;
