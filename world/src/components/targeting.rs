use std::cmp::Ordering;

use space_salvagers_catalog::TowerStats;
use space_salvagers_core::{EntityId, TargetingPolicy, Vec2};

use super::Transform;
use crate::{
    entity::Entity,
    radar::{EnemyRadar, RadarContact},
    FrameContext,
};

/// Target selection of a tower.
///
/// The policy is fixed at construction; only range, air coverage and target
/// count follow tier upgrades.
#[derive(Clone, Debug, PartialEq)]
pub struct Targeting {
    policy: TargetingPolicy,
    range: f32,
    can_target_air: bool,
    max_targets: u32,
    cluster_radius: f32,
    targets: Vec<EntityId>,
}

impl Targeting {
    /// Creates targeting for a tower at its current stats.
    #[must_use]
    pub fn new(policy: TargetingPolicy, stats: &TowerStats, cluster_radius: f32) -> Self {
        Self {
            policy,
            range: stats.range,
            can_target_air: stats.can_target_air,
            max_targets: stats.max_targets.max(1),
            cluster_radius,
            targets: Vec::new(),
        }
    }

    /// Selection rule.
    #[must_use]
    pub const fn policy(&self) -> TargetingPolicy {
        self.policy
    }

    /// Engagement range.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Reports whether flying enemies can be engaged.
    #[must_use]
    pub const fn can_target_air(&self) -> bool {
        self.can_target_air
    }

    /// Targets chosen this frame, best first.
    #[must_use]
    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    /// Best target chosen this frame.
    #[must_use]
    pub fn primary(&self) -> Option<EntityId> {
        self.targets.first().copied()
    }

    /// Applies upgraded stats.
    pub fn resync(&mut self, stats: &TowerStats) {
        self.range = stats.range;
        self.can_target_air = stats.can_target_air;
        self.max_targets = stats.max_targets.max(1);
    }

    /// Ranks the radar contacts in range of `origin` by the policy.
    #[must_use]
    pub fn select(&self, radar: &EnemyRadar, origin: Vec2) -> Vec<EntityId> {
        let flying_only = self.policy == TargetingPolicy::FlyingOnly;
        let mut candidates: Vec<(&RadarContact, usize)> = radar
            .within(origin, self.range)
            .filter(|contact| {
                if flying_only {
                    contact.flying
                } else {
                    self.can_target_air || !contact.flying
                }
            })
            .map(|contact| {
                let neighbours = if self.policy == TargetingPolicy::MostClustered {
                    radar
                        .within(contact.position, self.cluster_radius)
                        .filter(|other| other.id != contact.id)
                        .count()
                } else {
                    0
                };
                (contact, neighbours)
            })
            .collect();

        let distance = |contact: &RadarContact| contact.position.distance_squared(origin);
        candidates.sort_by(|(left, left_cluster), (right, right_cluster)| {
            let primary = match self.policy {
                TargetingPolicy::Nearest | TargetingPolicy::FlyingOnly => {
                    distance(*left).total_cmp(&distance(*right))
                }
                TargetingPolicy::Strongest => right.health.total_cmp(&left.health),
                TargetingPolicy::Weakest => left.health.total_cmp(&right.health),
                TargetingPolicy::First => right.progress.total_cmp(&left.progress),
                TargetingPolicy::MostClustered => right_cluster
                    .cmp(left_cluster)
                    .then_with(|| distance(*left).total_cmp(&distance(*right))),
            };
            match primary {
                Ordering::Equal => left.id.cmp(&right.id),
                ordering => ordering,
            }
        });

        candidates
            .into_iter()
            .take(self.max_targets as usize)
            .map(|(contact, _)| contact.id)
            .collect()
    }

    pub(crate) fn update(&mut self, entity: &Entity, ctx: &mut FrameContext<'_>) {
        let Some(origin) = entity.get::<Transform>().map(|transform| transform.position) else {
            self.targets.clear();
            return;
        };
        self.targets = self.select(ctx.radar, origin);
    }

    pub(crate) fn teardown(&mut self) {
        self.targets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(index: u32, x: f32, health: f32, progress: f32, flying: bool) -> RadarContact {
        RadarContact {
            id: EntityId::new(index, 0),
            position: Vec2::new(x, 0.0),
            velocity: Vec2::ZERO,
            health,
            progress,
            flying,
        }
    }

    fn radar() -> EnemyRadar {
        let mut radar = EnemyRadar::default();
        radar.rebuild([
            contact(1, 10.0, 50.0, 0.2, false),
            contact(2, 40.0, 80.0, 0.6, false),
            contact(3, 45.0, 20.0, 0.4, true),
            contact(4, 50.0, 30.0, 0.1, false),
            contact(5, 500.0, 999.0, 0.9, false),
        ]);
        radar
    }

    fn targeting(policy: TargetingPolicy, air: bool, max_targets: u32) -> Targeting {
        let stats = TowerStats {
            range: 100.0,
            can_target_air: air,
            max_targets,
            ..TowerStats::default()
        };
        Targeting::new(policy, &stats, 15.0)
    }

    fn ids(indices: &[u32]) -> Vec<EntityId> {
        indices.iter().map(|index| EntityId::new(*index, 0)).collect()
    }

    #[test]
    fn policies_rank_in_range_contacts() {
        let radar = radar();
        let origin = Vec2::ZERO;
        let select = |policy, air| targeting(policy, air, 4).select(&radar, origin);

        assert_eq!(select(TargetingPolicy::Nearest, false), ids(&[1, 2, 4]));
        assert_eq!(select(TargetingPolicy::Strongest, false), ids(&[2, 1, 4]));
        assert_eq!(select(TargetingPolicy::Weakest, true), ids(&[3, 4, 1, 2]));
        assert_eq!(select(TargetingPolicy::First, false), ids(&[2, 1, 4]));
        assert_eq!(select(TargetingPolicy::FlyingOnly, true), ids(&[3]));
    }

    #[test]
    fn most_clustered_prefers_crowded_enemies() {
        let radar = radar();
        let chosen = targeting(TargetingPolicy::MostClustered, true, 1).select(&radar, Vec2::ZERO);
        assert_eq!(chosen, ids(&[2]));
    }

    #[test]
    fn resync_follows_upgraded_stats() {
        let mut targeting = targeting(TargetingPolicy::Nearest, false, 1);
        let upgraded = TowerStats {
            range: 600.0,
            can_target_air: true,
            max_targets: 2,
            ..TowerStats::default()
        };
        targeting.resync(&upgraded);
        assert_eq!(targeting.range(), 600.0);
        assert!(targeting.can_target_air());
        assert_eq!(targeting.select(&radar(), Vec2::ZERO).len(), 2);
        assert_eq!(targeting.policy(), TargetingPolicy::Nearest);
    }
}
