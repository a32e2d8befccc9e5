//! Bounded definition cache with least-recently-added eviction.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::definition::ScriptDefinition;

/// Fixed-capacity cache keyed by script id.
///
/// Eviction is by insertion order: once full, adding a new id drops the
/// oldest-added entry. Reads do not reorder anything.
pub struct ScriptCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, ScriptDefinition>,
}

impl ScriptCache {
    pub fn new(capacity: usize) -> ScriptCache {
        ScriptCache {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ScriptDefinition> {
        self.entries.get(id)
    }

    pub fn insert(&mut self, definition: ScriptDefinition) {
        let id = definition.id.clone();
        if self.entries.insert(id.clone(), definition).is_some() {
            // Replacing keeps the original insertion position.
            return;
        }
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
                debug!(id = %evicted, "evicted oldest cached script");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
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

    #[test]
    fn overflow_evicts_the_oldest_entry() {
        let mut cache = ScriptCache::new(2);
        cache.insert(def("a"));
        cache.insert(def("b"));
        cache.insert(def("c"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none(), "oldest-added entry is gone");
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn replacing_does_not_change_eviction_order() {
        let mut cache = ScriptCache::new(2);
        cache.insert(def("a"));
        cache.insert(def("b"));
        // Re-adding "a" is a replacement, not a refresh.
        cache.insert(def("a"));
        cache.insert(def("c"));
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn reads_do_not_affect_eviction() {
        let mut cache = ScriptCache::new(2);
        cache.insert(def("a"));
        cache.insert(def("b"));
        let _ = cache.get("a");
        cache.insert(def("c"));
        assert!(cache.get("a").is_none(), "a read is not an add");
    }
}
