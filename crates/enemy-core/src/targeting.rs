//! Target scoring and selection.

use crate::context::TargetSnapshot;

/// Full 3-axis Euclidean distance between two points (2.5D layout: x/z carry
/// gameplay, y is presentation but still contributes when present).
pub fn distance3(a: (f32, f32, f32), b: (f32, f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    let dz = a.2 - b.2;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Score one candidate: closer and weaker targets rank higher.
fn score(target: &TargetSnapshot) -> f32 {
    (1000.0 - target.distance) + (100.0 - target.hp_percent)
}

/// Pick the best candidate within the awareness radius.
///
/// Returns `None` when nothing is in range. Ties keep the earliest-iterated
/// candidate; there is no randomization.
pub fn select_target(
    targets: &[TargetSnapshot],
    awareness_radius: f32,
) -> Option<&TargetSnapshot> {
    let mut best: Option<(&TargetSnapshot, f32)> = None;
    for target in targets.iter().filter(|t| t.distance <= awareness_radius) {
        let s = score(target);
        let better = match best {
            Some((_, best_score)) => s > best_score,
            None => true,
        };
        if better {
            best = Some((target, s));
        }
    }
    best.map(|(target, _)| target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EntityId;

    fn candidate(id: u32, distance: f32, hp_percent: f32) -> TargetSnapshot {
        TargetSnapshot {
            id: EntityId(id),
            x: distance,
            y: 0.0,
            z: 0.0,
            distance,
            hp_percent,
        }
    }

    #[test]
    fn out_of_range_candidates_are_filtered() {
        let targets = [candidate(1, 50.0, 80.0), candidate(2, 150.0, 20.0)];
        let best = select_target(&targets, 100.0).unwrap();
        assert_eq!(best.id, EntityId(1));
    }

    #[test]
    fn widest_radius_picks_highest_score() {
        // d=150/hp=20 scores (1000-150)+(100-20)=930 against
        // d=50/hp=80 scoring (1000-50)+(100-80)=970.
        let targets = [candidate(1, 50.0, 80.0), candidate(2, 150.0, 20.0)];
        let best = select_target(&targets, 200.0).unwrap();
        assert_eq!(best.id, EntityId(1));

        // Weaken the far candidate until it outranks the near one.
        let targets = [candidate(1, 50.0, 80.0), candidate(2, 150.0, 0.0)];
        let best = select_target(&targets, 200.0).unwrap();
        assert_eq!(best.id, EntityId(1), "950 < 970 keeps the near target");

        let targets = [candidate(1, 120.0, 90.0), candidate(2, 60.0, 30.0)];
        let best = select_target(&targets, 200.0).unwrap();
        assert_eq!(best.id, EntityId(2));
    }

    #[test]
    fn ties_keep_the_earliest_candidate() {
        let targets = [candidate(1, 100.0, 50.0), candidate(2, 100.0, 50.0)];
        let best = select_target(&targets, 200.0).unwrap();
        assert_eq!(best.id, EntityId(1));
    }

    #[test]
    fn empty_range_returns_none() {
        let targets = [candidate(1, 500.0, 10.0)];
        assert!(select_target(&targets, 100.0).is_none());
        assert!(select_target(&[], 100.0).is_none());
    }

    #[test]
    fn distance_uses_all_three_axes() {
        let d = distance3((0.0, 0.0, 0.0), (3.0, 4.0, 12.0));
        assert!((d - 13.0).abs() < 1e-5);
    }
}
