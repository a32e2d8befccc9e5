//! Per-entity enemy decision core.
//!
//! `enemy-core` decides what an autonomous combatant does next and drives that
//! decision through a small execution state machine. The crate combines a
//! behavior-tree evaluator for strategic choice, a frame-stepped FSM that
//! carries chosen behaviors out, a thinking-latency model that decouples
//! decisions from instantaneous reaction, and a script-overlay seam that lets
//! loaded trees replace, override, or supplement the base logic.
//!
//! All per-frame work is synchronous and allocation-light; the only
//! asynchronous collaborator (script loading) is polled through the
//! [`script::ScriptTicket`] trait and never blocks the update.
pub mod boss;
pub mod command;
pub mod config;
pub mod context;
pub mod controller;
pub mod factory;
pub mod leaves;
pub mod profile;
pub mod script;
pub mod services;
pub mod targeting;

pub use boss::{BossPhase, BossPhaseManager};
pub use command::{AttackMove, AttackRepertoire, AttackTier, Command};
pub use config::ThinkTuning;
pub use context::{
    ConsultReason, DecisionContext, DecisionRolls, EntityId, SelfSnapshot, TargetSnapshot,
};
pub use controller::{EnemyController, EnemyControllerBuilder, FsmState};
pub use factory::{EnemyTree, build_tree, fallback_tree, full_tree};
pub use leaves::{EnemyEffect, EnemyPredicate};
pub use profile::{
    BehaviorProfile, Capabilities, DirectionLogic, Intelligence, IntelligenceProfile,
    InterruptResponse, Rarity,
};
pub use script::{CompiledScript, OverrideMode, ScriptConfig, ScriptPoll, ScriptTicket};
pub use services::{
    AnimationAdapter, BehaviorConstraints, BlockedAction, ConstraintResolver, EnemyServices,
    OpenField, PhysicsAdapter, SteerAction,
};
