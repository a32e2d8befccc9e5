//! Constructor-injected collaborator interfaces.
//!
//! The decision core never reaches into ambient globals: physical
//! constraints, the animation layer, and collision/boundary physics are trait
//! objects handed to the controller at construction, the same way the game
//! engine consumes its read-only oracles. [`OpenField`] is the permissive
//! implementation used by tests and headless tools.

use std::sync::Arc;

use crate::context::EntityId;
use crate::controller::FsmState;

/// Discrete steering actions the environment can veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SteerAction {
    PatrolLeft,
    PatrolRight,
    MoveUp,
    MoveDown,
}

/// A vetoed action together with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedAction {
    pub action: SteerAction,
    pub reason: String,
}

/// The environment's verdict on what this entity may do right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BehaviorConstraints {
    allowed: Vec<SteerAction>,
    blocked: Vec<BlockedAction>,
}

impl BehaviorConstraints {
    pub fn new(allowed: Vec<SteerAction>, blocked: Vec<BlockedAction>) -> BehaviorConstraints {
        BehaviorConstraints { allowed, blocked }
    }

    /// All actions allowed; the open-field default.
    pub fn unrestricted() -> BehaviorConstraints {
        use strum::IntoEnumIterator;
        BehaviorConstraints {
            allowed: SteerAction::iter().collect(),
            blocked: Vec::new(),
        }
    }

    pub fn allows(&self, action: SteerAction) -> bool {
        self.allowed.contains(&action)
    }

    pub fn blocked_reason(&self, action: SteerAction) -> Option<&str> {
        self.blocked
            .iter()
            .find(|b| b.action == action)
            .map(|b| b.reason.as_str())
    }

    pub fn allowed(&self) -> &[SteerAction] {
        &self.allowed
    }
}

/// Reports which directional/behavioral actions the physical environment
/// currently permits (screen bounds, nearby obstacles).
pub trait ConstraintResolver: Send + Sync {
    fn resolve(&self, entity: EntityId, x: f32, z: f32) -> BehaviorConstraints;
}

/// Bridge to the animation/state layer.
pub trait AnimationAdapter: Send + Sync {
    /// Whether the entity is still inside an attack sub-state. Attack
    /// completion is detected by this flipping to `false`.
    fn attack_in_progress(&self, entity: EntityId) -> bool;

    /// Notification that the FSM entered a new state, so the renderer can
    /// pick a clip. `attack` carries the tier for attacking states.
    fn state_changed(
        &self,
        entity: EntityId,
        state: FsmState,
        attack: Option<crate::command::AttackMove>,
    );
}

/// Collision correction and vertical clamping.
pub trait PhysicsAdapter: Send + Sync {
    /// Returns the corrected position after resolving overlaps at (x, z).
    fn correct_position(&self, entity: EntityId, x: f32, z: f32) -> (f32, f32);

    /// Clamps an in-progress vertical move; the flag reports whether a
    /// boundary was hit.
    fn clamp_vertical(&self, entity: EntityId, z: f32) -> (f32, bool);
}

/// The collaborator bundle injected into every controller.
#[derive(Clone)]
pub struct EnemyServices {
    pub constraints: Arc<dyn ConstraintResolver>,
    pub animation: Arc<dyn AnimationAdapter>,
    pub physics: Arc<dyn PhysicsAdapter>,
}

impl EnemyServices {
    pub fn new(
        constraints: Arc<dyn ConstraintResolver>,
        animation: Arc<dyn AnimationAdapter>,
        physics: Arc<dyn PhysicsAdapter>,
    ) -> EnemyServices {
        EnemyServices {
            constraints,
            animation,
            physics,
        }
    }

    /// Permissive bundle backed by [`OpenField`].
    pub fn open_field() -> EnemyServices {
        let field = Arc::new(OpenField);
        EnemyServices {
            constraints: field.clone(),
            animation: field.clone(),
            physics: field,
        }
    }
}

/// Unbounded, obstacle-free world: everything is allowed, nothing corrects,
/// and attacks finish instantly.
pub struct OpenField;

impl ConstraintResolver for OpenField {
    fn resolve(&self, _entity: EntityId, _x: f32, _z: f32) -> BehaviorConstraints {
        BehaviorConstraints::unrestricted()
    }
}

impl AnimationAdapter for OpenField {
    fn attack_in_progress(&self, _entity: EntityId) -> bool {
        false
    }

    fn state_changed(
        &self,
        _entity: EntityId,
        _state: FsmState,
        _attack: Option<crate::command::AttackMove>,
    ) {
    }
}

impl PhysicsAdapter for OpenField {
    fn correct_position(&self, _entity: EntityId, x: f32, z: f32) -> (f32, f32) {
        (x, z)
    }

    fn clamp_vertical(&self, _entity: EntityId, z: f32) -> (f32, bool) {
        (z, false)
    }
}
