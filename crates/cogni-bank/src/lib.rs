//! # cogni-bank
//!
//! `StructuredMemoryBank` coordinates the three storage substrates the rest
//! of the system never talks to directly: the Dolt-backed SQL engine (the
//! system of record), the LanceDB vector mirror, and the link subsystem.
//! It owns the active-branch handle, the namespace existence cache, and the
//! auto-commit policy, and is the only place `BlockProof` rows get written.

mod bank;
mod error;
mod handle;
mod namespace_cache;
mod request;

pub use bank::{StructuredMemoryBank, STAGING_TABLES};
pub use error::{BankError, Result};
pub use handle::MemoryBankHandle;
pub use namespace_cache::NamespaceCache;
pub use request::UpdateBlockRequest;
