use std::collections::BTreeMap;
use std::num::NonZeroU32;

use swarm_proto::{Food, Snapshot};
use thiserror::Error;

/// Entity whose team has been checked against the snapshot's team count.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamEntity {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub team: u32,
    pub invulnerable: bool,
}

/// A well-formed frame that cannot be rendered as a whole.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("team count {0} is not positive")]
    NonPositiveTeamCount(i64),
    #[error("team count {0} exceeds {}", u32::MAX)]
    TeamCountTooLarge(i64),
    #[error("entity {index} has team {team_id} outside [0, {team_count})")]
    TeamOutOfRange {
        index: usize,
        team_id: i64,
        team_count: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedSnapshot {
    pub team_count: NonZeroU32,
    pub active_entities: Vec<TeamEntity>,
    pub inactive_entities: Vec<TeamEntity>,
    pub active_food: Vec<Food>,
    pub inactive_food: Vec<Food>,
    /// Active entities per team, keyed by team so iteration is in team order.
    pub per_team_active_counts: BTreeMap<u32, usize>,
}

impl ClassifiedSnapshot {
    pub fn active_total(&self) -> usize {
        self.active_entities.len()
    }
}

/// Stable partition of a snapshot into render buckets.
///
/// The whole frame is rejected if any entity carries a team outside
/// `[0, team_count)`.
pub fn classify(snapshot: &Snapshot) -> Result<ClassifiedSnapshot, ProtocolViolation> {
    if snapshot.team_count <= 0 {
        return Err(ProtocolViolation::NonPositiveTeamCount(snapshot.team_count));
    }
    let team_count = u32::try_from(snapshot.team_count)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(ProtocolViolation::TeamCountTooLarge(snapshot.team_count))?;

    let mut active_entities = Vec::new();
    let mut inactive_entities = Vec::new();
    let mut per_team_active_counts = BTreeMap::new();

    for (index, entity) in snapshot.entities.iter().enumerate() {
        let team = u32::try_from(entity.team_id)
            .ok()
            .filter(|team| *team < team_count.get())
            .ok_or(ProtocolViolation::TeamOutOfRange {
                index,
                team_id: entity.team_id,
                team_count: team_count.get(),
            })?;
        let classified = TeamEntity {
            x: entity.x,
            y: entity.y,
            radius: entity.width,
            team,
            invulnerable: entity.invulnerable,
        };
        if entity.active {
            *per_team_active_counts.entry(team).or_insert(0) += 1;
            active_entities.push(classified);
        } else {
            inactive_entities.push(classified);
        }
    }

    let (active_food, inactive_food): (Vec<Food>, Vec<Food>) =
        snapshot.foods.iter().cloned().partition(|food| food.active);

    Ok(ClassifiedSnapshot {
        team_count,
        active_entities,
        inactive_entities,
        active_food,
        inactive_food,
        per_team_active_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_proto::Entity;

    fn entity(x: f64, team_id: i64, active: bool) -> Entity {
        Entity {
            x,
            y: 0.0,
            width: 4.0,
            team_id,
            active,
            invulnerable: false,
        }
    }

    fn food(x: f64, active: bool) -> Food {
        Food {
            x,
            y: 0.0,
            size: 2.0,
            active,
        }
    }

    #[test]
    fn partition_is_stable_and_complete() {
        let snapshot = Snapshot {
            entities: vec![
                entity(1.0, 0, true),
                entity(2.0, 1, false),
                entity(3.0, 2, true),
                entity(4.0, 0, false),
                entity(5.0, 0, true),
            ],
            foods: vec![food(1.0, false), food(2.0, true), food(3.0, false)],
            team_count: 3,
        };
        let classified = classify(&snapshot).unwrap();

        assert_eq!(
            classified.active_entities.len() + classified.inactive_entities.len(),
            snapshot.entities.len()
        );
        let active_x: Vec<f64> = classified.active_entities.iter().map(|e| e.x).collect();
        let inactive_x: Vec<f64> = classified.inactive_entities.iter().map(|e| e.x).collect();
        assert_eq!(active_x, vec![1.0, 3.0, 5.0]);
        assert_eq!(inactive_x, vec![2.0, 4.0]);

        let inactive_food_x: Vec<f64> = classified.inactive_food.iter().map(|f| f.x).collect();
        assert_eq!(inactive_food_x, vec![1.0, 3.0]);
        assert_eq!(classified.active_food, vec![food(2.0, true)]);
    }

    #[test]
    fn team_counts_cover_only_active_entities() {
        let snapshot = Snapshot {
            entities: vec![
                entity(1.0, 1, true),
                entity(2.0, 1, true),
                entity(3.0, 0, false),
                entity(4.0, 2, true),
                entity(5.0, 0, false),
            ],
            foods: Vec::new(),
            team_count: 3,
        };
        let classified = classify(&snapshot).unwrap();
        let counts: Vec<(u32, usize)> = classified
            .per_team_active_counts
            .iter()
            .map(|(team, count)| (*team, *count))
            .collect();
        assert_eq!(counts, vec![(1, 2), (2, 1)]);
        assert_eq!(
            classified.per_team_active_counts.values().sum::<usize>(),
            classified.active_total()
        );
    }

    #[test]
    fn missing_food_is_empty() {
        let snapshot = swarm_proto::decode_snapshot_json(
            r#"{"Entities":[{"X":1,"Y":1,"Width":2,"TeamID":0,"Active":true,"Invulnerable":false}],"TeamCount":1}"#,
        )
        .unwrap();
        let classified = classify(&snapshot).unwrap();
        assert!(classified.active_food.is_empty());
        assert!(classified.inactive_food.is_empty());
        assert_eq!(classified.active_total(), 1);
    }

    #[test]
    fn team_equal_to_count_is_rejected() {
        let snapshot = Snapshot {
            entities: vec![entity(1.0, 0, true), entity(2.0, 2, false)],
            foods: Vec::new(),
            team_count: 2,
        };
        assert_eq!(
            classify(&snapshot).unwrap_err(),
            ProtocolViolation::TeamOutOfRange {
                index: 1,
                team_id: 2,
                team_count: 2,
            }
        );
    }

    #[test]
    fn negative_team_is_rejected() {
        let snapshot = Snapshot {
            entities: vec![entity(1.0, -1, true)],
            foods: Vec::new(),
            team_count: 4,
        };
        assert!(matches!(
            classify(&snapshot),
            Err(ProtocolViolation::TeamOutOfRange { team_id: -1, .. })
        ));
    }

    #[test]
    fn non_positive_team_count_is_rejected() {
        for team_count in [0, -3] {
            let snapshot = Snapshot {
                entities: Vec::new(),
                foods: Vec::new(),
                team_count,
            };
            assert_eq!(
                classify(&snapshot).unwrap_err(),
                ProtocolViolation::NonPositiveTeamCount(team_count)
            );
        }
    }

    #[test]
    fn oversized_team_count_is_rejected_as_too_large() {
        let snapshot = Snapshot {
            entities: Vec::new(),
            foods: Vec::new(),
            team_count: 5_000_000_000,
        };
        let err = classify(&snapshot).unwrap_err();
        assert_eq!(err, ProtocolViolation::TeamCountTooLarge(5_000_000_000));
        assert_eq!(err.to_string(), "team count 5000000000 exceeds 4294967295");
    }

    #[test]
    fn empty_snapshot_classifies_cleanly() {
        let snapshot = Snapshot {
            entities: Vec::new(),
            foods: Vec::new(),
            team_count: 1,
        };
        let classified = classify(&snapshot).unwrap();
        assert_eq!(classified.active_total(), 0);
        assert!(classified.per_team_active_counts.is_empty());
    }
}
