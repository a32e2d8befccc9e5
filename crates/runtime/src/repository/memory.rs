//! In-memory script repository for tests and embedded fixtures.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::definition::ScriptDefinition;
use crate::error::{Result, ScriptError};
use crate::repository::ScriptRepository;

#[derive(Default)]
pub struct InMemoryScriptRepository {
    scripts: RwLock<HashMap<String, ScriptDefinition>>,
}

impl InMemoryScriptRepository {
    pub fn new() -> InMemoryScriptRepository {
        InMemoryScriptRepository::default()
    }

    pub fn insert(&self, definition: ScriptDefinition) -> Result<()> {
        let mut scripts = self.scripts.write().map_err(|_| ScriptError::LockPoisoned)?;
        scripts.insert(definition.id.clone(), definition);
        Ok(())
    }
}

#[async_trait]
impl ScriptRepository for InMemoryScriptRepository {
    async fn fetch(&self, id: &str) -> Result<ScriptDefinition> {
        let scripts = self.scripts.read().map_err(|_| ScriptError::LockPoisoned)?;
        scripts
            .get(id)
            .cloned()
            .ok_or_else(|| ScriptError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>> {
        let scripts = self.scripts.read().map_err(|_| ScriptError::LockPoisoned)?;
        let mut ids: Vec<String> = scripts.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{NodeSpec, ScriptMetadata};
    use enemy_core::{EnemyEffect, OverrideMode};

    fn def(id: &str) -> ScriptDefinition {
        ScriptDefinition {
            id: id.into(),
            name: id.into(),
            mode: OverrideMode::Full,
            tree: Some(NodeSpec::Action(EnemyEffect::Patrol)),
            bonus_tree: None,
            metadata: ScriptMetadata::default(),
        }
    }

    #[tokio::test]
    async fn insert_reports_success_and_fetch_round_trips() {
        let repo = InMemoryScriptRepository::new();
        repo.insert(def("guard")).unwrap();
        assert_eq!(repo.fetch("guard").await.unwrap().id, "guard");
        assert_eq!(repo.list().await.unwrap(), vec!["guard".to_string()]);
        assert!(matches!(
            repo.fetch("nope").await,
            Err(ScriptError::NotFound(_))
        ));
    }
}
