//! Repository contracts for fetching script definitions.

use async_trait::async_trait;

use crate::definition::ScriptDefinition;
use crate::error::Result;

mod file;
mod memory;

pub use file::FileScriptRepository;
pub use memory::InMemoryScriptRepository;

/// Source of script definitions, keyed by id.
///
/// Fetches are asynchronous; the per-frame decision loop never calls them
/// directly. Implementations must be shareable across load tasks.
#[async_trait]
pub trait ScriptRepository: Send + Sync {
    /// Fetch a definition by id.
    async fn fetch(&self, id: &str) -> Result<ScriptDefinition>;

    /// List the ids this repository can currently serve.
    async fn list(&self) -> Result<Vec<String>>;
}
