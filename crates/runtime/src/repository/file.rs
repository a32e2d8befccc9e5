//! RON-file backed script repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::definition::ScriptDefinition;
use crate::error::{Result, ScriptError};
use crate::repository::ScriptRepository;

/// Reads script definitions from `<root>/<id>.ron`.
pub struct FileScriptRepository {
    root: PathBuf,
}

impl FileScriptRepository {
    pub fn new(root: impl Into<PathBuf>) -> FileScriptRepository {
        FileScriptRepository { root: root.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.ron"))
    }
}

#[async_trait]
impl ScriptRepository for FileScriptRepository {
    async fn fetch(&self, id: &str) -> Result<ScriptDefinition> {
        let path = self.path_for(id);
        debug!(id, path = %path.display(), "fetching script definition");
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScriptError::NotFound(id.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        ron::from_str(&text).map_err(|err| ScriptError::Parse {
            id: id.to_string(),
            reason: err.to_string(),
        })
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("ron")
                && let Some(stem) = stem_of(&path)
            {
                ids.push(stem);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(String::from)
}
