//! Tree assembly per rarity and intelligence tier.

use std::time::Duration;

use behavior_tree::builder::{action, condition, cooldown, selector, sequence};
use behavior_tree::Node;
use tracing::warn;

use crate::config::ThinkTuning;
use crate::leaves::{EnemyEffect, EnemyPredicate};
use crate::profile::{BehaviorProfile, Intelligence, Rarity};

/// The concrete node type every enemy tree is made of.
pub type EnemyTree = Node<EnemyPredicate, EnemyEffect>;

/// Build the tree and profile for a rarity/intelligence pair.
///
/// A missing profile cell is not fatal: it logs once and answers with the
/// reduced fallback tree and its conservative profile, so a mis-tabled spawn
/// still patrols and fights instead of standing dead.
pub fn build_tree(rarity: Rarity, intelligence: Intelligence) -> (EnemyTree, BehaviorProfile) {
    match BehaviorProfile::lookup(rarity, intelligence) {
        Some(profile) => (full_tree(), profile),
        None => {
            warn!(%rarity, %intelligence, "no behavior profile; using fallback tree");
            (fallback_tree(), BehaviorProfile::fallback())
        }
    }
}

/// The complete decision tree.
///
/// Priority runs defensive reactions, then the rate-limited melee attack,
/// then chase, then the rate-limited special, then vertical exploration and
/// patrol decisions, with an unconditional patrol as the floor so a
/// consultation always produces a command.
pub fn full_tree() -> EnemyTree {
    selector(vec![
        // Defensive reactions against a close threat.
        sequence(vec![
            condition(EnemyPredicate::CanEvade),
            action(EnemyEffect::Evade),
        ]),
        sequence(vec![
            condition(EnemyPredicate::CanBlock),
            action(EnemyEffect::Block),
        ]),
        // Rate-limited offense: the scored melee attack always outranks the
        // special, and chasing into range outranks both firing from afar.
        cooldown(
            sequence(vec![
                condition(EnemyPredicate::TargetInAttackRange),
                action(EnemyEffect::Attack),
            ]),
            Duration::from_millis(ThinkTuning::ATTACK_COOLDOWN_MS),
        ),
        sequence(vec![
            condition(EnemyPredicate::TargetInChaseRange),
            action(EnemyEffect::Chase),
        ]),
        cooldown(
            sequence(vec![
                condition(EnemyPredicate::SpecialReady),
                action(EnemyEffect::Special),
            ]),
            Duration::from_millis(ThinkTuning::SPECIAL_COOLDOWN_MS),
        ),
        // Unprompted wandering.
        sequence(vec![
            condition(EnemyPredicate::WantsVerticalShift { up: true }),
            action(EnemyEffect::VerticalMove { up: true }),
        ]),
        sequence(vec![
            condition(EnemyPredicate::WantsVerticalShift { up: false }),
            action(EnemyEffect::VerticalMove { up: false }),
        ]),
        sequence(vec![
            condition(EnemyPredicate::CanDecidePatrol),
            action(EnemyEffect::DecidePatrol),
        ]),
        action(EnemyEffect::Patrol),
    ])
}

/// Reduced tree used when no profile cell exists: attack when adjacent, chase
/// what is visible, otherwise patrol.
pub fn fallback_tree() -> EnemyTree {
    selector(vec![
        cooldown(
            sequence(vec![
                condition(EnemyPredicate::TargetInAttackRange),
                action(EnemyEffect::Attack),
            ]),
            Duration::from_millis(ThinkTuning::ATTACK_COOLDOWN_MS),
        ),
        sequence(vec![
            condition(EnemyPredicate::TargetInChaseRange),
            action(EnemyEffect::Chase),
        ]),
        action(EnemyEffect::Patrol),
    ])
}
