//! Decision context built fresh for every consultation.
//!
//! The context is the blackboard the tree reads: an immutable snapshot of the
//! entity and its surroundings plus a single output slot for the resulting
//! command. Randomness is pre-rolled into [`DecisionRolls`] so tree leaves
//! stay pure over the context.

use rand::Rng;

use crate::command::{AttackRepertoire, Command};
use crate::profile::{BehaviorProfile, Capabilities, IntelligenceProfile};
use crate::services::BehaviorConstraints;
use crate::targeting;

/// Identifier of a live entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Why a consultation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConsultReason {
    IdleTimeout,
    PlayerDetected,
    ScreenBoundary,
    EntityCollision,
    AttackComplete,
    PatrolEnd,
    /// The chase target died, despawned, or outran the leash.
    TargetLost,
}

/// Snapshot of the deciding entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelfSnapshot {
    pub hp: f32,
    pub max_hp: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SelfSnapshot {
    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }
}

/// One candidate target as seen this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSnapshot {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Full 3-axis Euclidean distance from the deciding entity.
    pub distance: f32,
    /// Remaining health, 0-100.
    pub hp_percent: f32,
}

impl TargetSnapshot {
    /// Build a snapshot, deriving `distance` from the observer's position.
    pub fn observed_from(
        observer: (f32, f32, f32),
        id: EntityId,
        position: (f32, f32, f32),
        hp_percent: f32,
    ) -> TargetSnapshot {
        TargetSnapshot {
            id,
            x: position.0,
            y: position.1,
            z: position.2,
            distance: targeting::distance3(observer, position),
            hp_percent,
        }
    }
}

/// Pre-rolled randomness for one consultation.
///
/// Rolling once per consultation keeps predicates pure and makes decisions
/// reproducible from a seeded generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionRolls {
    /// Gate for block/evade reactions.
    pub defense: f32,
    /// Tier pick for the attack repertoire.
    pub attack: f32,
    /// Gate for vertical exploration.
    pub explore: f32,
    /// Left/right pick for random patrol direction.
    pub steer: f32,
}

impl DecisionRolls {
    pub fn draw<R: Rng>(rng: &mut R) -> DecisionRolls {
        DecisionRolls {
            defense: rng.r#gen(),
            attack: rng.r#gen(),
            explore: rng.r#gen(),
            steer: rng.r#gen(),
        }
    }

    /// Rolls that never fire chance-gated branches; used by fallback paths.
    pub fn inert() -> DecisionRolls {
        DecisionRolls {
            defense: 1.0,
            attack: 1.0,
            explore: 1.0,
            steer: 1.0,
        }
    }
}

/// Everything a tree tick may read, plus the single command output slot.
///
/// Built fresh per consultation; borrows the frame's target list and owns
/// copies of the small profile values so leaves never reach back into the
/// controller.
pub struct DecisionContext<'a> {
    pub entity: EntityId,
    pub self_state: SelfSnapshot,
    pub targets: &'a [TargetSnapshot],
    /// Best target within the awareness radius, if any.
    pub best_target: Option<TargetSnapshot>,
    pub capabilities: Capabilities,
    pub intelligence: IntelligenceProfile,
    pub profile: BehaviorProfile,
    pub repertoire: AttackRepertoire,
    /// Whether the special attack is currently unlocked (boss phases toggle
    /// this on top of the profile's availability flag).
    pub special_active: bool,
    pub reason: ConsultReason,
    pub constraints: BehaviorConstraints,
    pub rolls: DecisionRolls,
    command: Option<Command>,
}

impl<'a> DecisionContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entity: EntityId,
        self_state: SelfSnapshot,
        targets: &'a [TargetSnapshot],
        capabilities: Capabilities,
        intelligence: IntelligenceProfile,
        profile: BehaviorProfile,
        repertoire: AttackRepertoire,
        special_active: bool,
        reason: ConsultReason,
        constraints: BehaviorConstraints,
        rolls: DecisionRolls,
    ) -> DecisionContext<'a> {
        let best_target =
            targeting::select_target(targets, profile.meta.awareness_radius).copied();
        DecisionContext {
            entity,
            self_state,
            targets,
            best_target,
            capabilities,
            intelligence,
            profile,
            repertoire,
            special_active,
            reason,
            constraints,
            rolls,
            command: None,
        }
    }

    /// The best target if it is within `radius` of the entity.
    pub fn target_within(&self, radius: f32) -> Option<&TargetSnapshot> {
        self.best_target
            .as_ref()
            .filter(|target| target.distance <= radius)
    }

    /// Store the consultation's output command.
    ///
    /// A second write in the same consultation indicates a tree bug (two
    /// action leaves succeeded); the first command wins and the duplicate is
    /// logged rather than surfaced, since the controller never throws outward.
    pub fn set_command(&mut self, command: Command) {
        if let Some(existing) = &self.command {
            tracing::warn!(
                entity = %self.entity,
                kept = ?existing,
                dropped = ?command,
                "duplicate command in one consultation; keeping the first"
            );
            return;
        }
        self.command = Some(command);
    }

    /// Take the output command, leaving the slot empty.
    pub fn take_command(&mut self) -> Option<Command> {
        self.command.take()
    }

    pub fn has_command(&self) -> bool {
        self.command.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Intelligence, Rarity};

    fn minimal_ctx(targets: &[TargetSnapshot]) -> DecisionContext<'_> {
        DecisionContext::new(
            EntityId(7),
            SelfSnapshot {
                hp: 100.0,
                max_hp: 100.0,
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            targets,
            Capabilities::default(),
            IntelligenceProfile::for_tier(Intelligence::Basic),
            BehaviorProfile::lookup(Rarity::Common, Intelligence::Basic).unwrap(),
            AttackRepertoire::standard(),
            false,
            ConsultReason::IdleTimeout,
            BehaviorConstraints::unrestricted(),
            DecisionRolls::inert(),
        )
    }

    #[test]
    fn duplicate_command_keeps_first() {
        let mut ctx = minimal_ctx(&[]);
        ctx.set_command(Command::Patrol);
        ctx.set_command(Command::Chase);
        assert_eq!(ctx.take_command(), Some(Command::Patrol));
        assert_eq!(ctx.take_command(), None);
    }

    #[test]
    fn best_target_respects_awareness_radius() {
        let observer = (0.0, 0.0, 0.0);
        let targets = [TargetSnapshot::observed_from(
            observer,
            EntityId(1),
            (5000.0, 0.0, 0.0),
            50.0,
        )];
        let ctx = minimal_ctx(&targets);
        assert!(ctx.best_target.is_none());
    }
}
