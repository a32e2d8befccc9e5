//! Static behavior profiles keyed by rarity and intelligence tier.
//!
//! Profiles are plain data: numeric durations, speeds, chances, and radii that
//! the tree leaves and the controller read through the decision context. The
//! table is total over the nine (rarity, intelligence) cells, but the factory
//! still treats a missing cell as non-fatal and falls back to a reduced tree.

/// Spawn-table rarity axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rarity {
    Common,
    Elite,
    Boss,
}

/// Intelligence tier axis; orthogonal to rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Intelligence {
    Basic,
    Normal,
    Advanced,
}

/// How a patrol direction is picked when both sides are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DirectionLogic {
    /// Flip direction relative to the previous leg.
    Alternating,
    /// Pick a side from the consultation's steering roll.
    Random,
    /// Walk toward the best known target, if any.
    TowardThreat,
}

/// Reactive response when a patrol is interrupted by the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InterruptResponse {
    /// Turn around and keep walking.
    Reverse,
    /// Stand still briefly before re-deciding.
    Pause,
    /// Go straight back to a fresh patrol decision.
    Rethink,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdleTuning {
    /// Baseline idle duration in seconds; doubles as the routine thinking time.
    pub duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatrolTuning {
    /// Half-width of the patrol band around the patrol origin, in world units.
    pub radius_x: f32,
    pub speed: f32,
    pub direction_logic: DirectionLogic,
    pub interrupt: InterruptResponse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChaseTuning {
    /// Distance at which a target pulls this entity into a chase.
    pub radius_x: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackTuning {
    pub light_chance: f32,
    pub medium_chance: f32,
    pub heavy_chance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockTuning {
    pub use_chance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvadeTuning {
    pub use_chance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpTuning {
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecialTuning {
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetaTuning {
    /// Maximum distance at which a target is considered for selection.
    pub awareness_radius: f32,
}

/// Behavioral parameters for one (rarity, intelligence) cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorProfile {
    pub idle: IdleTuning,
    pub patrol: PatrolTuning,
    pub chase: ChaseTuning,
    pub attack: AttackTuning,
    pub block: BlockTuning,
    pub evade: EvadeTuning,
    pub jump: JumpTuning,
    pub special: SpecialTuning,
    pub meta: MetaTuning,
}

impl BehaviorProfile {
    /// Resolve the profile for a rarity/intelligence pair.
    ///
    /// The static table below is total, but callers must treat a `None` as
    /// routine: the factory answers it with the reduced fallback tree.
    #[rustfmt::skip]
    pub fn lookup(rarity: Rarity, intelligence: Intelligence) -> Option<BehaviorProfile> {
        use Intelligence::*;
        use Rarity::*;

        Some(match (rarity, intelligence) {
            (Common, Basic) => Self::cell(3.0, 120.0, 40.0, 260.0, 90.0, (0.70, 0.25, 0.05), 0.30, 0.20, 60.0, false, 300.0, DirectionLogic::Alternating, InterruptResponse::Reverse),
            (Common, Normal) => Self::cell(2.2, 140.0, 46.0, 280.0, 100.0, (0.55, 0.35, 0.10), 0.40, 0.30, 70.0, false, 300.0, DirectionLogic::Random, InterruptResponse::Reverse),
            (Common, Advanced) => Self::cell(1.6, 160.0, 52.0, 300.0, 115.0, (0.40, 0.40, 0.20), 0.50, 0.40, 80.0, false, 320.0, DirectionLogic::TowardThreat, InterruptResponse::Rethink),
            (Elite, Basic) => Self::cell(2.6, 150.0, 48.0, 290.0, 105.0, (0.60, 0.30, 0.10), 0.40, 0.25, 80.0, false, 340.0, DirectionLogic::Alternating, InterruptResponse::Reverse),
            (Elite, Normal) => Self::cell(2.0, 170.0, 54.0, 310.0, 118.0, (0.45, 0.40, 0.15), 0.50, 0.35, 90.0, false, 360.0, DirectionLogic::Random, InterruptResponse::Pause),
            (Elite, Advanced) => Self::cell(1.4, 190.0, 60.0, 330.0, 130.0, (0.30, 0.45, 0.25), 0.60, 0.45, 100.0, true, 380.0, DirectionLogic::TowardThreat, InterruptResponse::Rethink),
            (Boss, Basic) => Self::cell(2.2, 160.0, 50.0, 320.0, 110.0, (0.50, 0.35, 0.15), 0.50, 0.30, 100.0, true, 400.0, DirectionLogic::Alternating, InterruptResponse::Reverse),
            (Boss, Normal) => Self::cell(1.6, 180.0, 56.0, 340.0, 124.0, (0.40, 0.40, 0.20), 0.60, 0.40, 110.0, true, 420.0, DirectionLogic::TowardThreat, InterruptResponse::Pause),
            (Boss, Advanced) => Self::cell(1.2, 200.0, 62.0, 360.0, 140.0, (0.25, 0.40, 0.35), 0.70, 0.50, 120.0, true, 440.0, DirectionLogic::TowardThreat, InterruptResponse::Rethink),
        })
    }

    /// Conservative profile backing the reduced fallback tree.
    #[rustfmt::skip]
    pub fn fallback() -> BehaviorProfile {
        Self::cell(3.0, 100.0, 36.0, 240.0, 85.0, (0.80, 0.20, 0.00), 0.20, 0.10, 50.0, false, 280.0, DirectionLogic::Alternating, InterruptResponse::Reverse)
    }

    #[allow(clippy::too_many_arguments)]
    fn cell(
        idle: f32,
        patrol_radius: f32,
        patrol_speed: f32,
        chase_radius: f32,
        chase_speed: f32,
        (light, medium, heavy): (f32, f32, f32),
        block: f32,
        evade: f32,
        jump: f32,
        special: bool,
        awareness: f32,
        direction_logic: DirectionLogic,
        interrupt: InterruptResponse,
    ) -> BehaviorProfile {
        BehaviorProfile {
            idle: IdleTuning { duration: idle },
            patrol: PatrolTuning {
                radius_x: patrol_radius,
                speed: patrol_speed,
                direction_logic,
                interrupt,
            },
            chase: ChaseTuning {
                radius_x: chase_radius,
                speed: chase_speed,
            },
            attack: AttackTuning {
                light_chance: light,
                medium_chance: medium,
                heavy_chance: heavy,
            },
            block: BlockTuning { use_chance: block },
            evade: EvadeTuning { use_chance: evade },
            jump: JumpTuning { height: jump },
            special: SpecialTuning { available: special },
            meta: MetaTuning {
                awareness_radius: awareness,
            },
        }
    }
}

/// Tier-derived decision chances, independent of the numeric profile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntelligenceProfile {
    pub block_chance: f32,
    pub evade_chance: f32,
    pub aggression: f32,
}

impl IntelligenceProfile {
    pub fn for_tier(intelligence: Intelligence) -> IntelligenceProfile {
        match intelligence {
            Intelligence::Basic => IntelligenceProfile {
                block_chance: 0.20,
                evade_chance: 0.10,
                aggression: 0.40,
            },
            Intelligence::Normal => IntelligenceProfile {
                block_chance: 0.40,
                evade_chance: 0.25,
                aggression: 0.60,
            },
            Intelligence::Advanced => IntelligenceProfile {
                block_chance: 0.60,
                evade_chance: 0.45,
                aggression: 0.85,
            },
        }
    }
}

/// Which defensive reactions an entity may use at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    pub can_block: bool,
    pub can_evade: bool,
}

impl Capabilities {
    pub fn for_tier(intelligence: Intelligence) -> Capabilities {
        match intelligence {
            Intelligence::Basic => Capabilities {
                can_block: false,
                can_evade: false,
            },
            Intelligence::Normal => Capabilities {
                can_block: true,
                can_evade: false,
            },
            Intelligence::Advanced => Capabilities {
                can_block: true,
                can_evade: true,
            },
        }
    }
}
