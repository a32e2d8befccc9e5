//! Leaf payloads for enemy behavior trees.
//!
//! Conditions and actions are enumerated kinds rather than closures, so trees
//! are data: they can be logged, diffed, and deserialized from script files.
//! Conditions are pure over the context; actions write exactly one command
//! into the context's output slot and always succeed.

use behavior_tree::{Effect, Predicate, Status};

use crate::command::Command;
use crate::config::ThinkTuning;
use crate::context::{ConsultReason, DecisionContext};
use crate::profile::{DirectionLogic, InterruptResponse};
use crate::services::SteerAction;

/// Condition kinds evaluated against the decision context.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnemyPredicate {
    /// Evade capability, a close threat, and a winning defense roll.
    CanEvade,
    /// Block capability, a close threat, and a winning defense roll.
    CanBlock,
    /// Best target within melee range.
    TargetInAttackRange,
    /// Best target within the profile's chase radius.
    TargetInChaseRange,
    /// Special attack unlocked and a target worth using it on.
    SpecialReady,
    /// Unprompted vertical wandering: direction open and the explore roll hit.
    WantsVerticalShift { up: bool },
    /// Some patrol decision is possible: a side is open or the consultation
    /// was a reactive interruption.
    CanDecidePatrol,
}

impl EnemyPredicate {
    fn threat_range() -> f32 {
        ThinkTuning::MELEE_RANGE * ThinkTuning::THREAT_RANGE_FACTOR
    }
}

impl Predicate<DecisionContext<'_>> for EnemyPredicate {
    fn check(&self, ctx: &DecisionContext<'_>) -> bool {
        match self {
            EnemyPredicate::CanEvade => {
                ctx.capabilities.can_evade
                    && ctx.target_within(Self::threat_range()).is_some()
                    && ctx.rolls.defense
                        <= ctx.profile.evade.use_chance * ctx.intelligence.evade_chance
            }
            EnemyPredicate::CanBlock => {
                ctx.capabilities.can_block
                    && ctx.target_within(Self::threat_range()).is_some()
                    && ctx.rolls.defense
                        <= ctx.profile.block.use_chance * ctx.intelligence.block_chance
            }
            EnemyPredicate::TargetInAttackRange => {
                ctx.target_within(ThinkTuning::MELEE_RANGE).is_some()
            }
            EnemyPredicate::TargetInChaseRange => {
                ctx.target_within(ctx.profile.chase.radius_x).is_some()
            }
            EnemyPredicate::SpecialReady => {
                ctx.profile.special.available
                    && ctx.special_active
                    && ctx.target_within(ctx.profile.chase.radius_x).is_some()
            }
            EnemyPredicate::WantsVerticalShift { up } => {
                let action = if *up {
                    SteerAction::MoveUp
                } else {
                    SteerAction::MoveDown
                };
                ctx.constraints.allows(action)
                    && ctx.rolls.explore <= ThinkTuning::EXPLORE_CHANCE
            }
            EnemyPredicate::CanDecidePatrol => {
                ctx.constraints.allows(SteerAction::PatrolLeft)
                    || ctx.constraints.allows(SteerAction::PatrolRight)
                    || matches!(
                        ctx.reason,
                        ConsultReason::ScreenBoundary
                            | ConsultReason::EntityCollision
                            | ConsultReason::PatrolEnd
                    )
            }
        }
    }
}

/// Action kinds; each writes one command and reports success.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnemyEffect {
    /// Stand idle, optionally for an explicit duration.
    Idle { duration: Option<f32> },
    /// Hold a guard stance briefly.
    Block,
    /// Step away from the threat.
    Evade,
    /// Attack with the tier picked by the repertoire scoring rule.
    Attack,
    Chase,
    Special,
    VerticalMove { up: bool },
    /// Direction-aware patrol decision keyed by constraints and the
    /// interruption reason.
    DecidePatrol,
    /// Unconditional patrol fallback.
    Patrol,
}

impl EnemyEffect {
    fn patrol_decision(ctx: &DecisionContext<'_>) -> Command {
        // Reactive interruptions take the profile's configured response.
        match ctx.reason {
            ConsultReason::ScreenBoundary | ConsultReason::EntityCollision => {
                return match ctx.profile.patrol.interrupt {
                    InterruptResponse::Reverse => Command::ReversePatrol,
                    InterruptResponse::Pause => Command::Idle {
                        duration: Some(ThinkTuning::INTERRUPT_PAUSE_SECS),
                    },
                    InterruptResponse::Rethink => Command::Patrol,
                };
            }
            // Walking off the end of the band always walks back in.
            ConsultReason::PatrolEnd => return Command::ReversePatrol,
            _ => {}
        }

        let left = ctx.constraints.allows(SteerAction::PatrolLeft);
        let right = ctx.constraints.allows(SteerAction::PatrolRight);
        match (left, right) {
            (true, false) => Command::PatrolLeft,
            (false, true) => Command::PatrolRight,
            (false, false) => Command::Idle { duration: None },
            (true, true) => match ctx.profile.patrol.direction_logic {
                DirectionLogic::Alternating => Command::ReversePatrol,
                DirectionLogic::Random => {
                    if ctx.rolls.steer < 0.5 {
                        Command::PatrolLeft
                    } else {
                        Command::PatrolRight
                    }
                }
                DirectionLogic::TowardThreat => match &ctx.best_target {
                    Some(target) if target.x < ctx.self_state.x => Command::PatrolLeft,
                    Some(_) => Command::PatrolRight,
                    None => {
                        if ctx.rolls.steer < 0.5 {
                            Command::PatrolLeft
                        } else {
                            Command::PatrolRight
                        }
                    }
                },
            },
        }
    }
}

impl Effect<DecisionContext<'_>> for EnemyEffect {
    fn apply(&self, ctx: &mut DecisionContext<'_>) -> Status {
        let command = match self {
            EnemyEffect::Idle { duration } => Command::Idle {
                duration: *duration,
            },
            EnemyEffect::Block => Command::Idle {
                duration: Some(ThinkTuning::BLOCK_HOLD_SECS),
            },
            EnemyEffect::Evade => Command::ReversePatrol,
            EnemyEffect::Attack => {
                let tier = ctx.repertoire.choose(&ctx.profile.attack, ctx.rolls.attack);
                Command::Attack(tier)
            }
            EnemyEffect::Chase => Command::Chase,
            EnemyEffect::Special => Command::Special,
            EnemyEffect::VerticalMove { up } => {
                if *up {
                    Command::MoveUp
                } else {
                    Command::MoveDown
                }
            }
            EnemyEffect::DecidePatrol => Self::patrol_decision(ctx),
            EnemyEffect::Patrol => Command::Patrol,
        };
        ctx.set_command(command);
        Status::Success
    }
}
