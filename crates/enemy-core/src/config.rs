//! Decision-core constants and the thinking-latency model.

use crate::context::ConsultReason;
use crate::profile::{BehaviorProfile, Intelligence, Rarity};

/// Tunable constants for the decision core.
pub struct ThinkTuning;

impl ThinkTuning {
    /// Numeric slack when a counting-up timer crosses zero.
    pub const EPSILON: f32 = 1e-4;

    /// Range inside which a melee attack connects.
    pub const MELEE_RANGE: f32 = 80.0;
    /// Defensive reactions trigger slightly outside melee range.
    pub const THREAT_RANGE_FACTOR: f32 = 1.25;

    /// Displacement of one vertical exploration move, in world units.
    pub const VERTICAL_STEP: f32 = 50.0;
    pub const VERTICAL_SPEED: f32 = 70.0;

    /// A chase ends when the target exceeds this multiple of the chase radius.
    pub const CHASE_LEASH_FACTOR: f32 = 1.5;

    /// Collision corrections below this are absorbed silently.
    pub const COLLISION_BUFFER: f32 = 4.0;

    /// Wall-clock gates on the rate-limited tree branches.
    pub const ATTACK_COOLDOWN_MS: u64 = 900;
    pub const SPECIAL_COOLDOWN_MS: u64 = 6_000;

    /// Probability that an unoccupied entity wanders vertically.
    pub const EXPLORE_CHANCE: f32 = 0.12;

    /// How long a block stance is held.
    pub const BLOCK_HOLD_SECS: f32 = 0.6;
    /// Pause length for the `Pause` interrupt response.
    pub const INTERRUPT_PAUSE_SECS: f32 = 0.8;

    /// Floor under every thinking duration.
    pub const MIN_THINK_SECS: f32 = 0.15;

    /// Ranges for the tree-less fallback decision.
    pub const FALLBACK_ATTACK_RANGE: f32 = 100.0;
    pub const FALLBACK_CHASE_RANGE: f32 = 300.0;

    /// Tier base for non-routine thinking; faster tiers react quicker.
    fn tier_base(intelligence: Intelligence) -> f32 {
        match intelligence {
            Intelligence::Basic => 1.6,
            Intelligence::Normal => 1.0,
            Intelligence::Advanced => 0.6,
        }
    }

    /// Rarer entities deliberate slightly longer.
    fn rarity_factor(rarity: Rarity) -> f32 {
        match rarity {
            Rarity::Common => 1.0,
            Rarity::Elite => 1.1,
            Rarity::Boss => 1.25,
        }
    }

    /// Urgent reasons shorten the episode, routine ones do not.
    fn reason_factor(reason: ConsultReason) -> f32 {
        match reason {
            ConsultReason::PlayerDetected => 0.25,
            ConsultReason::AttackComplete => 0.5,
            ConsultReason::ScreenBoundary | ConsultReason::EntityCollision => 0.6,
            ConsultReason::TargetLost => 0.7,
            ConsultReason::PatrolEnd => 0.8,
            ConsultReason::IdleTimeout => 1.0,
        }
    }

    /// Thinking latency for one episode.
    ///
    /// Routine idle episodes use the profile's idle duration as the base so a
    /// designer tunes one number; every other reason starts from the tier
    /// base. Both are scaled by rarity and reason and floored.
    pub fn thinking_duration(
        profile: &BehaviorProfile,
        rarity: Rarity,
        intelligence: Intelligence,
        reason: ConsultReason,
    ) -> f32 {
        let base = if reason == ConsultReason::IdleTimeout {
            profile.idle.duration
        } else {
            Self::tier_base(intelligence)
        };
        (base * Self::rarity_factor(rarity) * Self::reason_factor(reason))
            .max(Self::MIN_THINK_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_timeout_uses_profile_idle_duration() {
        let profile = BehaviorProfile::lookup(Rarity::Common, Intelligence::Basic).unwrap();
        let d = ThinkTuning::thinking_duration(
            &profile,
            Rarity::Common,
            Intelligence::Basic,
            ConsultReason::IdleTimeout,
        );
        assert!((d - profile.idle.duration).abs() < 1e-6);
    }

    #[test]
    fn urgent_reasons_think_faster_than_routine() {
        let profile = BehaviorProfile::lookup(Rarity::Common, Intelligence::Normal).unwrap();
        let urgent = ThinkTuning::thinking_duration(
            &profile,
            Rarity::Common,
            Intelligence::Normal,
            ConsultReason::PlayerDetected,
        );
        let routine = ThinkTuning::thinking_duration(
            &profile,
            Rarity::Common,
            Intelligence::Normal,
            ConsultReason::IdleTimeout,
        );
        assert!(urgent < routine);
    }

    #[test]
    fn thinking_never_drops_below_the_floor() {
        let mut profile = BehaviorProfile::lookup(Rarity::Common, Intelligence::Advanced).unwrap();
        profile.idle.duration = 0.0;
        let d = ThinkTuning::thinking_duration(
            &profile,
            Rarity::Common,
            Intelligence::Advanced,
            ConsultReason::PlayerDetected,
        );
        assert!(d >= ThinkTuning::MIN_THINK_SECS);
    }

    #[test]
    fn bosses_deliberate_longer_than_commons() {
        let profile = BehaviorProfile::lookup(Rarity::Boss, Intelligence::Normal).unwrap();
        let boss = ThinkTuning::thinking_duration(
            &profile,
            Rarity::Boss,
            Intelligence::Normal,
            ConsultReason::PlayerDetected,
        );
        let common = ThinkTuning::thinking_duration(
            &profile,
            Rarity::Common,
            Intelligence::Normal,
            ConsultReason::PlayerDetected,
        );
        assert!(boss > common);
    }
}
