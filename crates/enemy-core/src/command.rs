//! Commands produced by consultations.
//!
//! A consultation yields at most one [`Command`]; the controller consumes it
//! exactly once by mutating its state machine and motion. Commands are a
//! closed tagged variant so dispatch is exhaustive and fixtures serialize.

use crate::profile::AttackTuning;

/// Melee attack tiers, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttackTier {
    Light,
    Medium,
    Heavy,
}

impl AttackTier {
    /// Rank used by the repertoire scoring rule; heavier wins.
    pub fn severity(self) -> u8 {
        match self {
            AttackTier::Light => 1,
            AttackTier::Medium => 2,
            AttackTier::Heavy => 3,
        }
    }
}

/// The attack the entity is currently carrying out, as reported to the
/// animation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackMove {
    Tier(AttackTier),
    Special,
}

/// Ordered attack-tier list with the scoring rule used to pick one.
///
/// Tiers are tried by descending severity; a tier is taken when its profile
/// chance is positive and the consultation's attack roll falls under that
/// chance. `Light` is the unconditional floor, so with every tier allowed the
/// rule resolves heavy > medium > light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRepertoire {
    order: [AttackTier; 3],
}

impl AttackRepertoire {
    /// Full repertoire in severity order.
    pub fn standard() -> AttackRepertoire {
        AttackRepertoire {
            order: [AttackTier::Heavy, AttackTier::Medium, AttackTier::Light],
        }
    }

    /// Repertoire restricted by a custom preference order (boss phases).
    pub fn ordered(order: [AttackTier; 3]) -> AttackRepertoire {
        AttackRepertoire { order }
    }

    pub fn order(&self) -> &[AttackTier; 3] {
        &self.order
    }

    /// Pick a tier for this consultation.
    pub fn choose(&self, tuning: &AttackTuning, roll: f32) -> AttackTier {
        for tier in self.order {
            let chance = match tier {
                AttackTier::Light => tuning.light_chance,
                AttackTier::Medium => tuning.medium_chance,
                AttackTier::Heavy => tuning.heavy_chance,
            };
            if chance > 0.0 && roll <= chance {
                return tier;
            }
        }
        AttackTier::Light
    }
}

impl Default for AttackRepertoire {
    fn default() -> Self {
        Self::standard()
    }
}

/// Output of one consultation, consumed exactly once by the controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Command {
    /// Stand still; an explicit duration bypasses the thinking timer.
    Idle { duration: Option<f32> },
    /// Walk the patrol band in the current direction.
    Patrol,
    PatrolLeft,
    PatrolRight,
    /// Flip patrol direction without resetting the patrol origin.
    ReversePatrol,
    /// Run at the best target; velocity is recomputed every frame.
    Chase,
    Attack(AttackTier),
    MoveUp,
    MoveDown,
    /// Fire the special-attack behavior.
    Special,
    /// Base command plus a scripted bonus; execution runs both effects.
    Composite(Box<Command>, Box<Command>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning(light: f32, medium: f32, heavy: f32) -> AttackTuning {
        AttackTuning {
            light_chance: light,
            medium_chance: medium,
            heavy_chance: heavy,
        }
    }

    #[test]
    fn repertoire_prefers_heavy_when_all_allowed() {
        let rep = AttackRepertoire::standard();
        // Roll below every chance: the severity order decides.
        assert_eq!(rep.choose(&tuning(1.0, 1.0, 1.0), 0.5), AttackTier::Heavy);
    }

    #[test]
    fn repertoire_falls_through_disallowed_tiers() {
        let rep = AttackRepertoire::standard();
        assert_eq!(rep.choose(&tuning(1.0, 1.0, 0.0), 0.5), AttackTier::Medium);
        assert_eq!(rep.choose(&tuning(1.0, 0.0, 0.0), 0.5), AttackTier::Light);
    }

    #[test]
    fn repertoire_defaults_to_light_on_high_roll() {
        let rep = AttackRepertoire::standard();
        assert_eq!(
            rep.choose(&tuning(0.2, 0.3, 0.1), 0.95),
            AttackTier::Light
        );
    }

    #[test]
    fn custom_order_caps_severity() {
        let rep = AttackRepertoire::ordered([
            AttackTier::Medium,
            AttackTier::Light,
            AttackTier::Light,
        ]);
        assert_eq!(rep.choose(&tuning(1.0, 1.0, 1.0), 0.5), AttackTier::Medium);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn commands_round_trip_as_fixtures() {
        let cmd = Command::Composite(
            Box::new(Command::Attack(AttackTier::Heavy)),
            Box::new(Command::Special),
        );
        let text = serde_json::to_string(&cmd).unwrap();
        let back: Command = serde_json::from_str(&text).unwrap();
        assert_eq!(cmd, back);
    }
}
