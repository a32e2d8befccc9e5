//! On-disk script definitions and their compilation into live trees.
//!
//! A definition is plain serializable data; compiling it builds a fresh
//! [`CompiledScript`] with its own tree instance, so no per-tick state is
//! ever shared between entities running the same script.

use std::time::Duration;

use behavior_tree::builder::{action, condition, cooldown, selector, sequence};
use serde::{Deserialize, Serialize};

use enemy_core::{CompiledScript, EnemyEffect, EnemyPredicate, EnemyTree, OverrideMode};

use crate::error::{Result, ScriptError};

/// Bounds on accepted script trees; anything larger is rejected at
/// validation rather than trusted into the per-frame tick.
pub const MAX_TREE_DEPTH: usize = 16;
pub const MAX_TREE_NODES: usize = 256;

/// Serializable description of one tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSpec {
    Selector(Vec<NodeSpec>),
    Sequence(Vec<NodeSpec>),
    Condition(EnemyPredicate),
    Action(EnemyEffect),
    Cooldown { child: Box<NodeSpec>, interval_ms: u64 },
}

impl NodeSpec {
    /// Build a live tree from this spec.
    pub fn compile(&self) -> EnemyTree {
        match self {
            NodeSpec::Selector(children) => {
                selector(children.iter().map(NodeSpec::compile).collect())
            }
            NodeSpec::Sequence(children) => {
                sequence(children.iter().map(NodeSpec::compile).collect())
            }
            NodeSpec::Condition(predicate) => condition(*predicate),
            NodeSpec::Action(effect) => action(*effect),
            NodeSpec::Cooldown { child, interval_ms } => {
                cooldown(child.compile(), Duration::from_millis(*interval_ms))
            }
        }
    }

    fn size(&self) -> usize {
        match self {
            NodeSpec::Selector(children) | NodeSpec::Sequence(children) => {
                1 + children.iter().map(NodeSpec::size).sum::<usize>()
            }
            NodeSpec::Condition(_) | NodeSpec::Action(_) => 1,
            NodeSpec::Cooldown { child, .. } => 1 + child.size(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            NodeSpec::Selector(children) | NodeSpec::Sequence(children) => {
                1 + children.iter().map(NodeSpec::depth).max().unwrap_or(0)
            }
            NodeSpec::Condition(_) | NodeSpec::Action(_) => 1,
            NodeSpec::Cooldown { child, .. } => 1 + child.depth(),
        }
    }
}

/// Free-form descriptive fields carried alongside a script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptMetadata {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One loadable script as stored in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptDefinition {
    pub id: String,
    pub name: String,
    pub mode: OverrideMode,
    /// Primary tree; required for `Full` and `Partial`.
    #[serde(default)]
    pub tree: Option<NodeSpec>,
    /// Supplementary tree; required for `Bonus`.
    #[serde(default)]
    pub bonus_tree: Option<NodeSpec>,
    #[serde(default)]
    pub metadata: ScriptMetadata,
}

impl ScriptDefinition {
    /// Structural validation, run before a definition enters the cache.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(self.invalid("empty id"));
        }
        match self.mode {
            OverrideMode::Full | OverrideMode::Partial => {
                if self.tree.is_none() {
                    return Err(self.invalid("mode requires a primary tree"));
                }
            }
            OverrideMode::Bonus => {
                if self.bonus_tree.is_none() {
                    return Err(self.invalid("bonus mode requires a bonus tree"));
                }
            }
        }
        for spec in self.tree.iter().chain(self.bonus_tree.iter()) {
            if spec.depth() > MAX_TREE_DEPTH {
                return Err(self.invalid("tree exceeds the depth bound"));
            }
            if spec.size() > MAX_TREE_NODES {
                return Err(self.invalid("tree exceeds the node bound"));
            }
        }
        Ok(())
    }

    /// Validate and build a fresh compiled script.
    pub fn compile(&self) -> Result<CompiledScript> {
        self.validate()?;
        Ok(CompiledScript {
            id: self.id.clone(),
            name: self.name.clone(),
            mode: self.mode,
            // Bonus-mode scripts may omit the primary tree; an empty selector
            // abstains on every tick.
            tree: self
                .tree
                .as_ref()
                .map(NodeSpec::compile)
                .unwrap_or_else(|| selector(vec![])),
            bonus: self.bonus_tree.as_ref().map(NodeSpec::compile),
        })
    }

    fn invalid(&self, reason: &str) -> ScriptError {
        ScriptError::Invalid {
            id: self.id.clone(),
            reason: reason.to_string(),
        }
    }
}
