//! Health-threshold boss phases.
//!
//! Phases reconfigure the deciding entity without swapping its tree: each one
//! carries capability toggles, an attack repertoire, an intelligence override,
//! and a special-attack flag that the controller applies when the phase
//! becomes active.

use tracing::info;

use crate::command::AttackRepertoire;
use crate::profile::{Capabilities, Intelligence};

/// One phase in a boss fight, active while health sits at or under its
/// threshold.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossPhase {
    pub name: String,
    /// Health ratio in `0.0..=1.0` at which this phase can engage.
    pub hp_threshold: f32,
    pub capabilities: Capabilities,
    pub repertoire: AttackRepertoire,
    pub intelligence: Intelligence,
    pub special_active: bool,
}

/// Tracks which phase is active as health moves.
///
/// Phases are held sorted by descending threshold and matched first-fit: the
/// first phase whose threshold is at or above the current health ratio wins.
/// With the conventional monotone phase ladder that is the opening phase
/// until health crosses the next threshold down. Phase changes are one-way
/// per update and are reported to the caller exactly once.
#[derive(Debug, Clone)]
pub struct BossPhaseManager {
    phases: Vec<BossPhase>,
    active: Option<usize>,
}

impl BossPhaseManager {
    pub fn new(mut phases: Vec<BossPhase>) -> BossPhaseManager {
        phases.sort_by(|a, b| {
            b.hp_threshold
                .partial_cmp(&a.hp_threshold)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        BossPhaseManager {
            phases,
            active: None,
        }
    }

    pub fn phases(&self) -> &[BossPhase] {
        &self.phases
    }

    /// The currently active phase, if any update has matched one.
    pub fn active(&self) -> Option<&BossPhase> {
        self.active.map(|i| &self.phases[i])
    }

    /// Re-evaluate against the current health ratio.
    ///
    /// Returns the newly active phase only on the update where it changes;
    /// steady state returns `None`.
    pub fn update(&mut self, hp_ratio: f32) -> Option<&BossPhase> {
        let matched = self
            .phases
            .iter()
            .position(|phase| phase.hp_threshold >= hp_ratio);
        match matched {
            Some(index) if self.active != Some(index) => {
                let phase = &self.phases[index];
                info!(
                    phase = %phase.name,
                    threshold = phase.hp_threshold,
                    hp_ratio,
                    "boss phase engaged"
                );
                self.active = Some(index);
                Some(phase)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::AttackTier;

    fn phase(name: &str, threshold: f32) -> BossPhase {
        BossPhase {
            name: name.into(),
            hp_threshold: threshold,
            capabilities: Capabilities::default(),
            repertoire: AttackRepertoire::standard(),
            intelligence: Intelligence::Normal,
            special_active: false,
        }
    }

    #[test]
    fn phases_sort_by_descending_threshold() {
        let mgr = BossPhaseManager::new(vec![
            phase("desperate", 0.2),
            phase("opening", 1.0),
            phase("wounded", 0.5),
        ]);
        let thresholds: Vec<f32> = mgr.phases().iter().map(|p| p.hp_threshold).collect();
        assert_eq!(thresholds, vec![1.0, 0.5, 0.2]);
    }

    #[test]
    fn first_matching_phase_wins() {
        let mut mgr = BossPhaseManager::new(vec![
            phase("opening", 1.0),
            phase("wounded", 0.5),
            phase("desperate", 0.2),
        ]);
        // Every threshold is >= 0.4, so the highest-threshold phase matches
        // first even though "wounded" sits closer to the current ratio.
        let engaged = mgr.update(0.4).unwrap();
        assert_eq!(engaged.name, "opening");
    }

    #[test]
    fn phase_change_reports_exactly_once() {
        let mut mgr = BossPhaseManager::new(vec![phase("opening", 1.0)]);
        assert!(mgr.update(0.9).is_some());
        assert!(mgr.update(0.8).is_none());
        assert!(mgr.update(0.7).is_none());
        assert_eq!(mgr.active().unwrap().name, "opening");
    }

    #[test]
    fn no_phase_matches_above_every_threshold() {
        let mut mgr = BossPhaseManager::new(vec![phase("wounded", 0.5)]);
        assert!(mgr.update(0.9).is_none());
        assert!(mgr.active().is_none());
        assert!(mgr.update(0.5).is_some());
    }

    #[test]
    fn phase_repertoire_carries_custom_order() {
        let mut p = phase("restrained", 1.0);
        p.repertoire =
            AttackRepertoire::ordered([AttackTier::Light, AttackTier::Light, AttackTier::Light]);
        let mut mgr = BossPhaseManager::new(vec![p]);
        let engaged = mgr.update(1.0).unwrap();
        assert_eq!(engaged.repertoire.order()[0], AttackTier::Light);
    }
}
