//! Script overlay runtime for the enemy decision core.
//!
//! This crate owns everything about scripts that is not per-frame work:
//! serializable tree definitions, structural validation, repositories
//! (RON files or in-memory fixtures), a bounded least-recently-added cache,
//! and the async loading service whose tickets the per-entity controller
//! polls. The decision core itself lives in `enemy-core` and stays free of
//! I/O.

pub mod cache;
pub mod definition;
pub mod error;
pub mod repository;
pub mod service;

pub use cache::ScriptCache;
pub use definition::{NodeSpec, ScriptDefinition, ScriptMetadata, MAX_TREE_DEPTH, MAX_TREE_NODES};
pub use error::{Result, ScriptError};
pub use repository::{FileScriptRepository, InMemoryScriptRepository, ScriptRepository};
pub use service::ScriptService;
