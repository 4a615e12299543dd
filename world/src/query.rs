//! Read-only views over the world used by snapshots and the autopilot.

use space_salvagers_core::{EnemySnapshot, EntityId, TowerSnapshot};

use crate::{
    components::{EnemyProfile, Health, PathFollow, TowerProfile, Transform, Weapon},
    Group, WorldState,
};

/// Snapshot of a single tower, or `None` for stale handles and non-towers.
#[must_use]
pub fn tower(state: &WorldState, id: EntityId) -> Option<TowerSnapshot> {
    let entity = state.entity(id)?;
    let profile = entity.get::<TowerProfile>()?;
    let spec = state.catalog().tower(profile.kind)?;
    let stats = entity
        .get::<Weapon>()
        .map_or_else(|| spec.stats_at(profile.tier), |weapon| *weapon.stats());
    Some(TowerSnapshot {
        id,
        kind: profile.kind,
        tier: profile.tier,
        max_tier: spec.effective_max_tier(),
        node: profile.node,
        position: entity
            .get::<Transform>()
            .map_or_else(Default::default, |transform| transform.position),
        upgrade_cost: spec.upgrade_cost(profile.tier),
        sell_value: state.catalog().economy().refund(profile.invested),
        damage_per_second: stats.damage_per_second(),
        range: stats.range,
    })
}

/// Snapshots of every placed tower in handle order.
#[must_use]
pub fn towers(state: &WorldState) -> Vec<TowerSnapshot> {
    state
        .entities_in(Group::Towers)
        .into_iter()
        .filter_map(|id| tower(state, id))
        .collect()
}

/// Snapshots of every live enemy in handle order.
#[must_use]
pub fn enemies(state: &WorldState) -> Vec<EnemySnapshot> {
    state
        .entities_in(Group::Enemies)
        .into_iter()
        .filter_map(|id| {
            let entity = state.entity(id)?;
            if !entity.is_active() {
                return None;
            }
            let profile = entity.get::<EnemyProfile>()?;
            let health = entity.get::<Health>()?;
            if health.is_dead() {
                return None;
            }
            Some(EnemySnapshot {
                id,
                kind: profile.kind,
                position: entity.get::<Transform>()?.position,
                health: health.current(),
                max_health: health.max(),
                progress: entity.get::<PathFollow>().map_or(0.0, PathFollow::progress),
                flying: profile.flying,
            })
        })
        .collect()
}

/// Number of enemies still on the field.
#[must_use]
pub fn live_enemy_count(state: &WorldState) -> usize {
    state
        .entities_in(Group::Enemies)
        .into_iter()
        .filter(|id| state.is_active(*id))
        .count()
}

#[cfg(test)]
mod tests {
    use space_salvagers_catalog::Catalog;
    use space_salvagers_core::{BuildNodeId, EnemyKind, TowerKind, Vec2};

    use super::*;

    #[test]
    fn tower_snapshot_reports_refund_and_next_cost() {
        let mut state = WorldState::new(Catalog::builtin(), 1);
        let id = state.spawn_tower(TowerKind::Cannon, BuildNodeId::new(2), Vec2::new(1.0, 2.0));
        let snapshot = tower(&state, id).expect("tower snapshot");
        assert_eq!(snapshot.tier, 1);
        assert_eq!(snapshot.sell_value, 70);
        assert_eq!(snapshot.upgrade_cost, Some(60));
        assert_eq!(snapshot.position, Vec2::new(1.0, 2.0));
        assert_eq!(towers(&state).len(), 1);
    }

    #[test]
    fn enemy_snapshots_skip_removed_enemies() {
        let mut state = WorldState::new(Catalog::builtin(), 1);
        let kept = state.spawn_enemy(EnemyKind::Scout, 1, 0.0).expect("scout");
        let removed = state.spawn_enemy(EnemyKind::Drone, 1, 0.0).expect("drone");
        let _ = state.remove_entity(removed);
        let snapshots = enemies(&state);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].id, kept);
        assert_eq!(live_enemy_count(&state), 1);
        assert!(tower(&state, kept).is_none());
    }
}
