//! Per-entity controller: execution FSM plus the thinking scheduler.
//!
//! The controller is the only object the game loop calls into each frame. It
//! owns one tree instance, the thinking timer, the pending-command slot, and
//! the four-state execution machine. Strategic decisions are made at most
//! once per thinking episode; everything else is frame-stepped motion.
//!
//! The thinking timer is the signed `ai_timer`: negative means remaining
//! thinking time counting up toward zero, non-negative means elapsed time in
//! the current state. `ai_timer < 0` implies the FSM is in `Idle`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::boss::{BossPhase, BossPhaseManager};
use crate::command::{AttackMove, AttackRepertoire, Command};
use crate::config::ThinkTuning;
use crate::context::{
    ConsultReason, DecisionContext, DecisionRolls, EntityId, SelfSnapshot, TargetSnapshot,
};
use crate::factory::{build_tree, EnemyTree};
use crate::profile::{
    BehaviorProfile, Capabilities, Intelligence, IntelligenceProfile, Rarity,
};
use crate::script::{CompiledScript, OverrideMode, ScriptConfig, ScriptPoll, ScriptTicket};
use crate::services::{EnemyServices, SteerAction};
use crate::targeting;

/// Execution states. The animation layer reads the snake_case name to pick a
/// clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FsmState {
    Idle,
    Walking,
    Running,
    Attacking,
}

/// An in-progress vertical exploration move.
#[derive(Debug, Clone, Copy)]
struct VerticalMove {
    origin_z: f32,
}

pub struct EnemyController {
    entity: EntityId,
    rarity: Rarity,
    intelligence: Intelligence,
    profile: BehaviorProfile,
    capabilities: Capabilities,
    intelligence_profile: IntelligenceProfile,
    repertoire: AttackRepertoire,
    special_active: bool,

    tree: EnemyTree,
    script: Option<CompiledScript>,
    script_config: Option<ScriptConfig>,
    pending_script: Option<Box<dyn ScriptTicket>>,
    boss_phases: Option<BossPhaseManager>,
    services: EnemyServices,
    rng: StdRng,

    fsm: FsmState,
    ai_timer: f32,
    is_thinking: bool,
    has_started: bool,
    pending_command: Option<Command>,
    think_reason: ConsultReason,
    /// Whether a threat was already inside the chase radius when the current
    /// thinking episode began; interruption fires only on a fresh entry.
    threat_seen: bool,
    idle_hold: f32,
    patrol_dir: f32,
    patrol_origin_x: f32,
    skip_collision: u8,
    vertical: Option<VerticalMove>,
    active_attack: Option<AttackMove>,
    last_reason: Option<ConsultReason>,
    last_command: Option<Command>,

    hp: f32,
    max_hp: f32,
    x: f32,
    y: f32,
    z: f32,
    vx: f32,
    vz: f32,
    alive: bool,
}

impl EnemyController {
    pub fn builder(
        entity: EntityId,
        rarity: Rarity,
        intelligence: Intelligence,
    ) -> EnemyControllerBuilder {
        EnemyControllerBuilder::new(entity, rarity, intelligence)
    }

    /// Advance one frame. Never blocks; script loading resolves through
    /// ticket polling and boss phases re-match against current health before
    /// the state dispatch.
    pub fn update(&mut self, targets: &[TargetSnapshot], dt: f32) {
        if !self.alive {
            return;
        }
        self.poll_script();
        self.apply_boss_phase();
        if !self.has_started {
            self.has_started = true;
            self.begin_thinking(ConsultReason::IdleTimeout, targets);
            return;
        }
        match self.fsm {
            FsmState::Idle => self.update_idle(targets, dt),
            FsmState::Walking => self.update_walking(targets, dt),
            FsmState::Running => self.update_running(targets, dt),
            FsmState::Attacking => self.update_attacking(targets, dt),
        }
    }

    pub fn take_damage(&mut self, amount: f32) {
        if !self.alive {
            return;
        }
        self.hp = (self.hp - amount).max(0.0);
        if self.hp <= 0.0 {
            self.die();
        }
    }

    pub fn die(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.vx = 0.0;
        self.vz = 0.0;
        self.is_thinking = false;
        self.pending_command = None;
        info!(entity = %self.entity, "entity died");
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn state(&self) -> FsmState {
        self.fsm
    }

    /// Snake_case state name for the animation layer.
    pub fn state_name(&self) -> String {
        self.fsm.to_string()
    }

    /// Stage a command behind an explicit thinking latency, bypassing a
    /// consultation. Hosts use this for externally directed behavior.
    pub fn schedule(&mut self, command: Command, think_secs: f32) {
        self.enter_state(FsmState::Idle, None);
        self.vx = 0.0;
        self.vz = 0.0;
        self.vertical = None;
        self.is_thinking = true;
        self.think_reason = ConsultReason::IdleTimeout;
        self.pending_command = Some(command);
        self.ai_timer = -think_secs.max(ThinkTuning::MIN_THINK_SECS);
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_thinking(&self) -> bool {
        self.is_thinking
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }

    pub fn position(&self) -> (f32, f32, f32) {
        (self.x, self.y, self.z)
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vz)
    }

    pub fn patrol_direction(&self) -> f32 {
        self.patrol_dir
    }

    pub fn active_attack(&self) -> Option<AttackMove> {
        self.active_attack
    }

    /// The most recent consultation's reason and resulting command.
    pub fn last_decision(&self) -> (Option<ConsultReason>, Option<&Command>) {
        (self.last_reason, self.last_command.as_ref())
    }

    pub fn script_attached(&self) -> bool {
        self.script.is_some()
    }

    pub fn script_pending(&self) -> bool {
        self.pending_script.is_some()
    }

    pub fn script_config(&self) -> Option<&ScriptConfig> {
        self.script_config.as_ref()
    }

    fn poll_script(&mut self) {
        let Some(ticket) = self.pending_script.as_mut() else {
            return;
        };
        match ticket.poll() {
            ScriptPoll::Pending => return,
            ScriptPoll::Ready(script) => {
                info!(entity = %self.entity, script = %script.id, mode = ?script.mode,
                    "script overlay attached");
                // The old tree is discarded whole, so no resume index leaks
                // across the swap.
                self.script = Some(script);
            }
            ScriptPoll::Failed(reason) => {
                warn!(entity = %self.entity, %reason,
                    "script load failed; staying on the base tree");
            }
        }
        self.pending_script = None;
    }

    fn apply_boss_phase(&mut self) {
        let ratio = self.hp_ratio();
        let Some(manager) = self.boss_phases.as_mut() else {
            return;
        };
        let Some(phase) = manager.update(ratio) else {
            return;
        };
        let phase = phase.clone();
        self.capabilities = phase.capabilities;
        self.repertoire = phase.repertoire;
        self.intelligence = phase.intelligence;
        self.intelligence_profile = IntelligenceProfile::for_tier(phase.intelligence);
        self.special_active = phase.special_active;
    }

    /// Enter a thinking episode. Event-driven reasons consult immediately and
    /// hold the resulting command pending until the latency elapses; routine
    /// idle timeouts defer the consultation to the episode's end. Either way
    /// the strategic decision happens exactly once per episode.
    fn begin_thinking(&mut self, reason: ConsultReason, targets: &[TargetSnapshot]) {
        let duration = ThinkTuning::thinking_duration(
            &self.profile,
            self.rarity,
            self.intelligence,
            reason,
        );
        self.enter_state(FsmState::Idle, None);
        self.vx = 0.0;
        self.vz = 0.0;
        self.vertical = None;
        self.is_thinking = true;
        self.think_reason = reason;
        self.threat_seen =
            targeting::select_target(targets, self.profile.chase.radius_x).is_some();
        self.pending_command = if reason == ConsultReason::IdleTimeout {
            None
        } else {
            Some(self.consult(reason, targets))
        };
        self.ai_timer = -duration;
        debug!(entity = %self.entity, %reason, duration, "thinking episode started");
    }

    fn update_idle(&mut self, targets: &[TargetSnapshot], dt: f32) {
        if self.is_thinking {
            // Interruption check runs before the timer advances: a target
            // entering the chase radius ends the episode on this frame.
            let threat =
                targeting::select_target(targets, self.profile.chase.radius_x).is_some();
            if threat && !self.threat_seen {
                self.consult_and_execute(ConsultReason::PlayerDetected, targets);
                return;
            }
            self.threat_seen = threat;
            self.ai_timer += dt;
            if self.ai_timer >= -ThinkTuning::EPSILON {
                self.ai_timer = 0.0;
                match self.pending_command.take() {
                    Some(command) => {
                        self.is_thinking = false;
                        self.execute(command, targets);
                    }
                    None => self.consult_and_execute(self.think_reason, targets),
                }
            }
        } else {
            // Fixed-duration idle commanded by `Idle { duration: Some(_) }`.
            self.ai_timer += dt;
            if self.ai_timer >= self.idle_hold {
                self.begin_thinking(ConsultReason::IdleTimeout, targets);
            }
        }
    }

    fn update_walking(&mut self, targets: &[TargetSnapshot], dt: f32) {
        // Vertical moves run to completion; threats are picked up by the
        // thinking episode that follows the move.
        if self.vertical.is_some() {
            self.update_vertical(targets, dt);
            return;
        }
        // A target entering chase range overrides the patrol leg.
        if targeting::select_target(targets, self.profile.chase.radius_x).is_some() {
            self.consult_and_execute(ConsultReason::PlayerDetected, targets);
            return;
        }
        self.ai_timer += dt;
        let next_x = self.x + self.vx * dt;
        if self.skip_collision > 0 {
            // Fresh patrol legs get one uncorrected frame so the turn away
            // from whatever ended the last leg is not immediately re-flagged.
            self.skip_collision -= 1;
            self.x = next_x;
        } else {
            let (cx, cz) = self
                .services
                .physics
                .correct_position(self.entity, next_x, self.z);
            let correction = (cx - next_x).abs().max((cz - self.z).abs());
            self.x = cx;
            self.z = cz;
            if correction > ThinkTuning::COLLISION_BUFFER {
                self.begin_thinking(ConsultReason::EntityCollision, targets);
                return;
            }
        }
        let constraints = self
            .services
            .constraints
            .resolve(self.entity, self.x, self.z);
        let forward = if self.patrol_dir < 0.0 {
            SteerAction::PatrolLeft
        } else {
            SteerAction::PatrolRight
        };
        if !constraints.allows(forward) {
            self.begin_thinking(ConsultReason::ScreenBoundary, targets);
            return;
        }
        if (self.x - self.patrol_origin_x).abs() > self.profile.patrol.radius_x {
            self.begin_thinking(ConsultReason::PatrolEnd, targets);
        }
    }

    fn update_vertical(&mut self, targets: &[TargetSnapshot], dt: f32) {
        let Some(v) = self.vertical else { return };
        let next_z = self.z + self.vz * dt;
        let (clamped, hit) = self.services.physics.clamp_vertical(self.entity, next_z);
        self.z = clamped;
        if hit || (self.z - v.origin_z).abs() >= ThinkTuning::VERTICAL_STEP {
            self.vertical = None;
            self.vz = 0.0;
            let reason = if hit {
                ConsultReason::ScreenBoundary
            } else {
                ConsultReason::IdleTimeout
            };
            self.begin_thinking(reason, targets);
        }
    }

    fn update_running(&mut self, targets: &[TargetSnapshot], dt: f32) {
        self.ai_timer += dt;
        let leash = self.profile.chase.radius_x * ThinkTuning::CHASE_LEASH_FACTOR;
        let radius = self.profile.meta.awareness_radius.max(leash);
        let Some(target) = targeting::select_target(targets, radius).copied() else {
            self.vx = 0.0;
            self.vz = 0.0;
            self.begin_thinking(ConsultReason::TargetLost, targets);
            return;
        };
        if target.distance <= ThinkTuning::MELEE_RANGE {
            // Stop on this frame; the consultation queued here resolves to
            // the attack on the next decision.
            self.vx = 0.0;
            self.vz = 0.0;
            self.begin_thinking(ConsultReason::PlayerDetected, targets);
            return;
        }
        if target.distance > leash {
            self.vx = 0.0;
            self.vz = 0.0;
            self.begin_thinking(ConsultReason::TargetLost, targets);
            return;
        }
        let dx = target.x - self.x;
        let dz = target.z - self.z;
        let len = (dx * dx + dz * dz).sqrt();
        if len > f32::EPSILON {
            self.vx = dx / len * self.profile.chase.speed;
            self.vz = dz / len * self.profile.chase.speed;
        }
        let next_x = self.x + self.vx * dt;
        let next_z = self.z + self.vz * dt;
        let (cx, cz) = self
            .services
            .physics
            .correct_position(self.entity, next_x, next_z);
        self.x = cx;
        self.z = cz;
    }

    fn update_attacking(&mut self, targets: &[TargetSnapshot], dt: f32) {
        self.ai_timer += dt;
        if !self.services.animation.attack_in_progress(self.entity) {
            self.active_attack = None;
            self.begin_thinking(ConsultReason::AttackComplete, targets);
        }
    }

    fn consult_and_execute(&mut self, reason: ConsultReason, targets: &[TargetSnapshot]) {
        self.is_thinking = false;
        self.pending_command = None;
        let command = self.consult(reason, targets);
        self.execute(command, targets);
    }

    /// One consultation: build a fresh context, run the overlay merge, and
    /// return exactly one command.
    fn consult(&mut self, reason: ConsultReason, targets: &[TargetSnapshot]) -> Command {
        let constraints = self
            .services
            .constraints
            .resolve(self.entity, self.x, self.z);
        let rolls = DecisionRolls::draw(&mut self.rng);
        let mut ctx = DecisionContext::new(
            self.entity,
            SelfSnapshot {
                hp: self.hp,
                max_hp: self.max_hp,
                x: self.x,
                y: self.y,
                z: self.z,
            },
            targets,
            self.capabilities,
            self.intelligence_profile,
            self.profile,
            self.repertoire,
            self.special_active,
            reason,
            constraints,
            rolls,
        );

        let mut disarm = false;
        let command = match self.script.as_mut() {
            Some(script) => match script.mode {
                OverrideMode::Full => match script.consult(&mut ctx) {
                    Ok(Some(cmd)) => Some(cmd),
                    Ok(None) => {
                        warn!(entity = %self.entity, script = %script.id,
                            "full-override script abstained; consulting base tree");
                        self.tree.tick(&mut ctx);
                        ctx.take_command()
                    }
                    Err(()) => {
                        disarm = true;
                        self.tree.tick(&mut ctx);
                        ctx.take_command()
                    }
                },
                OverrideMode::Partial => {
                    let scripted = match script.consult(&mut ctx) {
                        Ok(cmd) => cmd,
                        Err(()) => {
                            disarm = true;
                            None
                        }
                    };
                    match scripted {
                        Some(cmd) => Some(cmd),
                        None => {
                            self.tree.tick(&mut ctx);
                            ctx.take_command()
                        }
                    }
                }
                OverrideMode::Bonus => {
                    self.tree.tick(&mut ctx);
                    let base = ctx.take_command();
                    let bonus = match script.consult_bonus(&mut ctx) {
                        Ok(cmd) => cmd,
                        Err(()) => {
                            disarm = true;
                            None
                        }
                    };
                    match (base, bonus) {
                        (Some(b), Some(x)) => {
                            Some(Command::Composite(Box::new(b), Box::new(x)))
                        }
                        (Some(b), None) => Some(b),
                        (None, Some(x)) => Some(x),
                        (None, None) => None,
                    }
                }
            },
            None => {
                self.tree.tick(&mut ctx);
                ctx.take_command()
            }
        };
        if disarm {
            self.script = None;
        }
        self.last_reason = Some(reason);
        match command {
            Some(cmd) => cmd,
            None => {
                debug!(entity = %self.entity, %reason,
                    "consultation abstained; using fallback decision");
                Self::fallback_decision(reason, &ctx)
            }
        }
    }

    /// Context-aware default used when no tree produced a command.
    fn fallback_decision(reason: ConsultReason, ctx: &DecisionContext<'_>) -> Command {
        match reason {
            ConsultReason::ScreenBoundary | ConsultReason::EntityCollision => {
                Command::ReversePatrol
            }
            ConsultReason::PlayerDetected => {
                match ctx.target_within(ThinkTuning::FALLBACK_CHASE_RANGE) {
                    Some(_) => Command::Chase,
                    None => Command::Patrol,
                }
            }
            _ => {
                if ctx.target_within(ThinkTuning::FALLBACK_ATTACK_RANGE).is_some() {
                    let tier = ctx.repertoire.choose(&ctx.profile.attack, ctx.rolls.attack);
                    Command::Attack(tier)
                } else if ctx.target_within(ThinkTuning::FALLBACK_CHASE_RANGE).is_some() {
                    Command::Chase
                } else {
                    Command::Patrol
                }
            }
        }
    }

    fn execute(&mut self, command: Command, targets: &[TargetSnapshot]) {
        self.is_thinking = false;
        debug!(entity = %self.entity, ?command, "executing command");
        self.last_command = Some(command.clone());
        self.apply(command, targets);
    }

    fn apply(&mut self, command: Command, targets: &[TargetSnapshot]) {
        match command {
            Command::Idle { duration: Some(hold) } => {
                self.enter_state(FsmState::Idle, None);
                self.is_thinking = false;
                self.idle_hold = hold;
                self.vx = 0.0;
                self.vz = 0.0;
            }
            Command::Idle { duration: None } => {
                self.begin_thinking(ConsultReason::IdleTimeout, targets);
            }
            Command::Patrol => self.start_patrol(self.patrol_dir),
            Command::PatrolLeft => self.start_patrol(-1.0),
            Command::PatrolRight => self.start_patrol(1.0),
            Command::ReversePatrol => {
                // Flips direction but keeps the patrol origin.
                self.patrol_dir = -self.patrol_dir;
                self.enter_state(FsmState::Walking, None);
                self.skip_collision = 1;
                self.vx = self.patrol_dir * self.profile.patrol.speed;
                self.vz = 0.0;
            }
            Command::MoveUp => self.start_vertical(1.0),
            Command::MoveDown => self.start_vertical(-1.0),
            Command::Chase => {
                self.enter_state(FsmState::Running, None);
            }
            Command::Attack(tier) => {
                self.enter_state(FsmState::Attacking, Some(AttackMove::Tier(tier)));
                self.vx = 0.0;
                self.vz = 0.0;
            }
            Command::Special => {
                self.enter_state(FsmState::Attacking, Some(AttackMove::Special));
                self.vx = 0.0;
                self.vz = 0.0;
            }
            Command::Composite(base, bonus) => {
                self.apply(*base, targets);
                self.apply(*bonus, targets);
            }
        }
    }

    fn start_patrol(&mut self, dir: f32) {
        self.enter_state(FsmState::Walking, None);
        self.patrol_dir = dir;
        self.patrol_origin_x = self.x;
        self.skip_collision = 1;
        self.vx = dir * self.profile.patrol.speed;
        self.vz = 0.0;
    }

    fn start_vertical(&mut self, dir: f32) {
        self.enter_state(FsmState::Walking, None);
        self.vertical = Some(VerticalMove { origin_z: self.z });
        self.vx = 0.0;
        self.vz = dir * ThinkTuning::VERTICAL_SPEED;
    }

    fn enter_state(&mut self, state: FsmState, attack: Option<AttackMove>) {
        if self.fsm != state || self.active_attack != attack {
            debug!(entity = %self.entity, from = %self.fsm, to = %state, "fsm transition");
            self.fsm = state;
            self.active_attack = attack;
            self.services
                .animation
                .state_changed(self.entity, state, attack);
        }
        self.ai_timer = 0.0;
    }
}

pub struct EnemyControllerBuilder {
    entity: EntityId,
    rarity: Rarity,
    intelligence: Intelligence,
    profile: Option<BehaviorProfile>,
    capabilities: Option<Capabilities>,
    services: Option<EnemyServices>,
    script: Option<CompiledScript>,
    script_config: Option<ScriptConfig>,
    script_ticket: Option<Box<dyn ScriptTicket>>,
    boss_phases: Option<Vec<BossPhase>>,
    seed: Option<u64>,
    position: (f32, f32, f32),
    max_hp: f32,
}

impl EnemyControllerBuilder {
    pub fn new(entity: EntityId, rarity: Rarity, intelligence: Intelligence) -> Self {
        EnemyControllerBuilder {
            entity,
            rarity,
            intelligence,
            profile: None,
            capabilities: None,
            services: None,
            script: None,
            script_config: None,
            script_ticket: None,
            boss_phases: None,
            seed: None,
            position: (0.0, 0.0, 0.0),
            max_hp: 100.0,
        }
    }

    /// Override the table profile (tuning experiments, boss variants).
    pub fn profile(mut self, profile: BehaviorProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn services(mut self, services: EnemyServices) -> Self {
        self.services = Some(services);
        self
    }

    /// Attach an already-compiled script overlay.
    pub fn script(mut self, script: CompiledScript) -> Self {
        self.script = Some(script);
        self
    }

    pub fn script_config(mut self, config: ScriptConfig) -> Self {
        self.script_config = Some(config);
        self
    }

    /// Attach an in-flight script load; the controller polls it per frame and
    /// hot-swaps the overlay in when it resolves.
    pub fn script_ticket(mut self, ticket: Box<dyn ScriptTicket>) -> Self {
        self.script_ticket = Some(ticket);
        self
    }

    pub fn boss_phases(mut self, phases: Vec<BossPhase>) -> Self {
        self.boss_phases = Some(phases);
        self
    }

    /// Seed for the decision rolls; defaults to the entity id.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = (x, y, z);
        self
    }

    pub fn max_hp(mut self, max_hp: f32) -> Self {
        self.max_hp = max_hp;
        self
    }

    pub fn build(self) -> EnemyController {
        let (tree, table_profile) = build_tree(self.rarity, self.intelligence);
        let profile = self.profile.unwrap_or(table_profile);
        let capabilities = self
            .capabilities
            .unwrap_or_else(|| Capabilities::for_tier(self.intelligence));
        let services = self.services.unwrap_or_else(EnemyServices::open_field);
        let seed = self.seed.unwrap_or(u64::from(self.entity.0));
        let (x, y, z) = self.position;
        EnemyController {
            entity: self.entity,
            rarity: self.rarity,
            intelligence: self.intelligence,
            profile,
            capabilities,
            intelligence_profile: IntelligenceProfile::for_tier(self.intelligence),
            repertoire: AttackRepertoire::standard(),
            special_active: profile.special.available,
            tree,
            script: self.script,
            script_config: self.script_config,
            pending_script: self.script_ticket,
            boss_phases: self.boss_phases.map(BossPhaseManager::new),
            services,
            rng: StdRng::seed_from_u64(seed),
            fsm: FsmState::Idle,
            ai_timer: 0.0,
            is_thinking: false,
            has_started: false,
            pending_command: None,
            think_reason: ConsultReason::IdleTimeout,
            threat_seen: false,
            idle_hold: 0.0,
            patrol_dir: 1.0,
            patrol_origin_x: x,
            skip_collision: 0,
            vertical: None,
            active_attack: None,
            last_reason: None,
            last_command: None,
            hp: self.max_hp,
            max_hp: self.max_hp,
            x,
            y,
            z,
            vx: 0.0,
            vz: 0.0,
            alive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::command::AttackTier;
    use crate::leaves::EnemyEffect;
    use crate::services::{
        AnimationAdapter, BehaviorConstraints, ConstraintResolver, OpenField,
    };
    use behavior_tree::builder::{action, selector};

    /// Keeps enemies on the ground so patrol decisions are not perturbed by
    /// the random vertical-exploration roll.
    struct GroundOnly;

    impl ConstraintResolver for GroundOnly {
        fn resolve(&self, _entity: EntityId, _x: f32, _z: f32) -> BehaviorConstraints {
            BehaviorConstraints::new(
                vec![SteerAction::PatrolLeft, SteerAction::PatrolRight],
                vec![],
            )
        }
    }

    fn grounded() -> EnemyServices {
        let field = Arc::new(OpenField);
        EnemyServices::new(Arc::new(GroundOnly), field.clone(), field)
    }

    fn common_basic() -> EnemyController {
        EnemyController::builder(EntityId(1), Rarity::Common, Intelligence::Basic)
            .services(grounded())
            .build()
    }

    fn target_at(ctrl: &EnemyController, x: f32) -> TargetSnapshot {
        TargetSnapshot::observed_from(ctrl.position(), EntityId(99), (x, 0.0, 0.0), 100.0)
    }

    fn script(mode: OverrideMode, tree: EnemyTree, bonus: Option<EnemyTree>) -> CompiledScript {
        CompiledScript {
            id: "test".into(),
            name: "Test".into(),
            mode,
            tree,
            bonus,
        }
    }

    #[test]
    fn pending_command_executes_on_the_twentieth_update() {
        let mut c = common_basic();
        c.update(&[], 0.1);
        c.schedule(Command::Chase, 2.0);
        for i in 1..=19 {
            c.update(&[], 0.1);
            assert!(c.is_thinking, "still thinking after update {i}");
            assert_eq!(c.state(), FsmState::Idle);
        }
        c.update(&[], 0.1);
        assert_eq!(c.state(), FsmState::Running, "command runs on update 20");
    }

    #[test]
    fn chase_radius_entry_interrupts_thinking_immediately() {
        let mut c = common_basic();
        c.update(&[], 0.1);
        c.ai_timer = -1.2;
        let target = target_at(&c, 200.0);
        c.update(&[target], 0.1);
        assert!(!c.is_thinking, "thinking ends on the entry frame");
        assert_eq!(c.last_decision().0, Some(ConsultReason::PlayerDetected));
        assert_eq!(c.state(), FsmState::Running);
    }

    #[test]
    fn threat_already_in_radius_does_not_retrigger() {
        let mut c = common_basic();
        let target = target_at(&c, 200.0);
        // Spawn with the threat present: the episode records it, so it is an
        // ambient fact rather than an interruption.
        c.update(&[target], 0.1);
        assert!(c.is_thinking);
        c.update(&[target], 0.1);
        assert!(c.is_thinking);
    }

    #[test]
    fn idle_timeout_walks_out_with_a_direction() {
        let mut c = common_basic();
        for _ in 0..40 {
            c.update(&[], 0.1);
        }
        assert_eq!(c.state(), FsmState::Walking);
        assert!(c.patrol_direction() != 0.0);
    }

    #[test]
    fn melee_stop_then_attack_with_scored_tier() {
        let mut profile =
            BehaviorProfile::lookup(Rarity::Common, Intelligence::Advanced).unwrap();
        profile.attack.heavy_chance = 1.0;
        let mut c = EnemyController::builder(EntityId(5), Rarity::Common, Intelligence::Advanced)
            .profile(profile)
            .capabilities(Capabilities::default())
            .build();
        c.update(&[], 0.1);
        c.fsm = FsmState::Running;
        c.is_thinking = false;
        let target = target_at(&c, 40.0);
        c.update(&[target], 0.1);
        assert_eq!(c.velocity(), (0.0, 0.0), "movement stops on the melee frame");
        assert!(c.is_thinking);
        for _ in 0..64 {
            c.update(&[target], 0.1);
            if c.state() == FsmState::Attacking {
                break;
            }
        }
        assert_eq!(c.state(), FsmState::Attacking);
        assert_eq!(c.active_attack(), Some(AttackMove::Tier(AttackTier::Heavy)));
    }

    struct FlaggedAnimation {
        active: AtomicBool,
    }

    impl AnimationAdapter for FlaggedAnimation {
        fn attack_in_progress(&self, _entity: EntityId) -> bool {
            self.active.load(Ordering::Relaxed)
        }

        fn state_changed(&self, _entity: EntityId, _state: FsmState, _attack: Option<AttackMove>) {}
    }

    #[test]
    fn attack_completion_starts_a_shorter_thinking_episode() {
        let anim = Arc::new(FlaggedAnimation {
            active: AtomicBool::new(true),
        });
        let services = EnemyServices::new(Arc::new(OpenField), anim.clone(), Arc::new(OpenField));
        let mut c = EnemyController::builder(EntityId(2), Rarity::Common, Intelligence::Basic)
            .services(services)
            .build();
        c.update(&[], 0.1);
        c.fsm = FsmState::Attacking;
        c.is_thinking = false;
        c.update(&[], 0.1);
        assert_eq!(c.state(), FsmState::Attacking, "still mid-swing");

        anim.active.store(false, Ordering::Relaxed);
        c.update(&[], 0.1);
        assert!(c.is_thinking);
        assert_eq!(c.last_decision().0, Some(ConsultReason::AttackComplete));
        let routine = ThinkTuning::thinking_duration(
            &c.profile,
            Rarity::Common,
            Intelligence::Basic,
            ConsultReason::IdleTimeout,
        );
        assert!(-c.ai_timer < routine, "post-attack thinking is shorter");
    }

    #[test]
    fn full_override_wins_over_the_base_tree() {
        let mut c = common_basic();
        c.script = Some(script(
            OverrideMode::Full,
            selector(vec![action(EnemyEffect::Chase)]),
            None,
        ));
        let cmd = c.consult(ConsultReason::IdleTimeout, &[]);
        assert_eq!(cmd, Command::Chase);
    }

    #[test]
    fn partial_defers_to_base_when_script_abstains() {
        let mut c = common_basic();
        c.script = Some(script(OverrideMode::Partial, selector(vec![]), None));
        let cmd = c.consult(ConsultReason::IdleTimeout, &[]);
        // The base tree's patrol decision: common/basic alternates.
        assert_eq!(cmd, Command::ReversePatrol);
    }

    #[test]
    fn bonus_composites_only_when_both_sides_yield() {
        let mut c = common_basic();
        c.script = Some(script(
            OverrideMode::Bonus,
            selector(vec![]),
            Some(selector(vec![action(EnemyEffect::Special)])),
        ));
        let cmd = c.consult(ConsultReason::IdleTimeout, &[]);
        assert_eq!(
            cmd,
            Command::Composite(Box::new(Command::ReversePatrol), Box::new(Command::Special))
        );

        let mut c = common_basic();
        c.script = Some(script(OverrideMode::Bonus, selector(vec![]), None));
        let cmd = c.consult(ConsultReason::IdleTimeout, &[]);
        assert_eq!(cmd, Command::ReversePatrol, "no bonus means no composite");
    }

    struct ReadyTicket(Option<CompiledScript>);

    impl ScriptTicket for ReadyTicket {
        fn poll(&mut self) -> ScriptPoll {
            match self.0.take() {
                Some(s) => ScriptPoll::Ready(s),
                None => ScriptPoll::Pending,
            }
        }
    }

    #[test]
    fn script_ticket_hot_swaps_when_ready() {
        let overlay = script(
            OverrideMode::Full,
            selector(vec![action(EnemyEffect::Chase)]),
            None,
        );
        let mut c = EnemyController::builder(EntityId(3), Rarity::Common, Intelligence::Basic)
            .script_ticket(Box::new(ReadyTicket(Some(overlay))))
            .build();
        assert!(!c.script_attached());
        assert!(c.script_pending());
        c.update(&[], 0.1);
        assert!(c.script_attached());
        assert!(!c.script_pending());
    }

    #[test]
    fn boss_phase_reconfigures_the_controller() {
        let phases = vec![BossPhase {
            name: "opening".into(),
            hp_threshold: 1.0,
            capabilities: Capabilities {
                can_block: true,
                can_evade: true,
            },
            repertoire: AttackRepertoire::standard(),
            intelligence: Intelligence::Advanced,
            special_active: true,
        }];
        let mut c = EnemyController::builder(EntityId(4), Rarity::Boss, Intelligence::Basic)
            .boss_phases(phases)
            .build();
        c.update(&[], 0.1);
        assert!(c.capabilities.can_block && c.capabilities.can_evade);
        assert!(c.special_active);
        assert_eq!(c.intelligence, Intelligence::Advanced);
    }

    #[test]
    fn vertical_move_completes_and_rethinks() {
        let mut c = common_basic();
        c.update(&[], 0.1);
        c.execute(Command::MoveUp, &[]);
        assert_eq!(c.state(), FsmState::Walking);
        for _ in 0..3 {
            c.update(&[], 0.5);
        }
        assert!(c.is_thinking);
        assert!(c.position().2 > 0.0);
    }

    #[test]
    fn vertical_move_is_not_aborted_by_a_nearby_target() {
        let mut c = common_basic();
        c.update(&[], 0.1);
        c.execute(Command::MoveUp, &[]);
        let target = target_at(&c, 200.0);
        c.update(&[target], 0.1);
        assert_eq!(c.state(), FsmState::Walking, "the move keeps running");
        assert!(!c.is_thinking());

        // Completion re-enters thinking; the waiting threat is handled there.
        for _ in 0..3 {
            c.update(&[target], 0.5);
        }
        assert!(c.is_thinking);
    }

    #[test]
    fn damage_kills_and_dead_entities_stay_inert() {
        let mut c = common_basic();
        c.update(&[], 0.1);
        c.take_damage(40.0);
        assert!(c.is_alive());
        c.take_damage(60.0);
        assert!(!c.is_alive());
        let state = c.state();
        c.update(&[], 0.1);
        assert_eq!(c.state(), state);
        assert_eq!(c.velocity(), (0.0, 0.0));
    }
}
