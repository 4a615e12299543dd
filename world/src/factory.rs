//! Assembly of towers, enemies and projectiles from catalog entries.

use space_salvagers_core::{
    BuildNodeId, EnemyKind, EntityId, Event, ProjectileKind, TowerKind, Vec2,
};

use crate::{
    components::{
        Ability, EnemyProfile, Generator, Health, Movement, PathFollow, ProjectileBody,
        StatusEffects, Targeting, TowerProfile, Transform, Weapon,
    },
    mailbox::Payload,
    Group, WorldState,
};

impl WorldState {
    /// Builds a tier one tower of `kind` at `position`.
    ///
    /// # Panics
    ///
    /// Panics if the catalog lacks `kind`; the catalog always carries the core kinds.
    pub fn spawn_tower(&mut self, kind: TowerKind, node: BuildNodeId, position: Vec2) -> EntityId {
        let spec = self.catalog().tower_spec(kind).clone();
        let stats = spec.stats_at(1);
        let id = self.create_entity(&[Group::Towers]);
        if let Some(entity) = self.entity_mut(id) {
            let _ = entity.attach(Transform::at(position));
            let _ = entity.attach(Targeting::new(spec.targeting, &stats, spec.cluster_radius));
            let _ = entity.attach(Weapon::new(&spec, stats));
            if stats.income > 0.0 {
                let _ = entity.attach(Generator::new(stats.income));
            }
            let _ = entity.attach(TowerProfile {
                kind,
                tier: 1,
                node,
                invested: spec.cost,
            });
        }
        id
    }

    /// Applies the stats of the tower's current tier to its components.
    ///
    /// Returns `false` when `id` is not a tower.
    pub fn resync_tower(&mut self, id: EntityId) -> bool {
        let Some(profile) = self.component::<TowerProfile>(id).copied() else {
            return false;
        };
        let Some(spec) = self.catalog().tower(profile.kind) else {
            return false;
        };
        let stats = spec.stats_at(profile.tier);
        let Some(entity) = self.entity_mut(id) else {
            return false;
        };
        if let Some(targeting) = entity.get_mut::<Targeting>() {
            targeting.resync(&stats);
        }
        if let Some(weapon) = entity.get_mut::<Weapon>() {
            weapon.resync(stats);
        }
        match entity.get_mut::<Generator>() {
            Some(generator) => generator.resync(stats.income),
            None if stats.income > 0.0 => {
                let _ = entity.attach(Generator::new(stats.income));
            }
            None => {}
        }
        true
    }

    /// Spawns an enemy scaled for `wave` at normalised path `progress`.
    ///
    /// Returns `None` when the catalog has no entry for `kind`.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, wave: u32, progress: f32) -> Option<EntityId> {
        let spec = self.catalog().enemy(kind)?.clone();
        let scaled = spec.scaled(self.catalog().waves().multiplier(wave));
        let position = self.path().point_at(progress);
        let id = self.create_entity(&[Group::Enemies]);
        let entity = self.entity_mut(id)?;
        let _ = entity.attach(Transform::at(position));
        let _ = entity.attach(
            Health::new(scaled.health)
                .with_armor(spec.armor)
                .with_resistances(spec.resistances)
                .with_shield(scaled.shield),
        );
        let _ = entity.attach(StatusEffects::default());
        if let Some(ability) = spec.ability {
            let _ = entity.attach(Ability::new(ability));
        }
        let _ = entity.attach(Movement::new(scaled.speed));
        let _ = entity.attach(PathFollow::starting_at(progress));
        let _ = entity.attach(EnemyProfile {
            kind,
            salvage: spec.salvage,
            core_damage: spec.core_damage,
            flying: spec.flying,
            wave,
        });
        self.emit(Event::EnemySpawned {
            enemy: id,
            kind,
            position,
        });
        Some(id)
    }

    /// Launches a projectile from `origin` towards `aim`, recycling a pooled entity if possible.
    pub fn spawn_projectile(
        &mut self,
        kind: ProjectileKind,
        source: EntityId,
        target: EntityId,
        origin: Vec2,
        aim: Vec2,
        payload: Payload,
    ) -> EntityId {
        let id = self.acquire_projectile(kind);
        if let Some(entity) = self.entity_mut(id) {
            let _ = entity.attach(Transform::at(origin));
            let _ = entity.attach(Movement::new(kind.speed()));
            let body = ProjectileBody::launch(kind, source, target, origin, aim, payload);
            let _ = entity.attach(body);
        }
        self.emit(Event::ProjectileFired {
            projectile: id,
            kind,
            source,
            target,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use space_salvagers_catalog::Catalog;
    use space_salvagers_core::DamageType;

    use super::*;
    use crate::components::ComponentKind;

    fn state() -> WorldState {
        WorldState::new(Catalog::builtin(), 7)
    }

    #[test]
    fn towers_carry_combat_components() {
        let mut state = state();
        let id = state.spawn_tower(TowerKind::Cannon, BuildNodeId::new(0), Vec2::new(5.0, 5.0));
        for kind in [
            ComponentKind::Transform,
            ComponentKind::Targeting,
            ComponentKind::Weapon,
            ComponentKind::Tower,
        ] {
            assert!(state.has_component(id, kind), "{kind:?} missing");
        }
        assert!(!state.has_component(id, ComponentKind::Generator));
        assert_eq!(state.entities_in(Group::Towers), vec![id]);
        assert_eq!(state.component::<TowerProfile>(id).map(|p| p.invested), Some(100));
    }

    #[test]
    fn salvagers_generate_income() {
        let mut state = state();
        let id = state.spawn_tower(TowerKind::Salvager, BuildNodeId::new(1), Vec2::ZERO);
        assert!(state.has_component(id, ComponentKind::Generator));
    }

    #[test]
    fn enemies_scale_with_the_wave() {
        let mut state = state();
        let first = state.spawn_enemy(EnemyKind::Raider, 1, 0.0).expect("raider");
        let sixth = state.spawn_enemy(EnemyKind::Raider, 6, 0.0).expect("raider");
        let health = |id| state.component::<Health>(id).map(Health::max);
        assert_eq!(health(first), Some(60.0));
        assert!((health(sixth).unwrap_or_default() - 60.0 * 1.9).abs() < 1e-3);
        let speed = state.component::<Movement>(sixth).map(Movement::base_speed);
        assert!((speed.unwrap_or_default() - 60.0 * 1.18).abs() < 1e-3);
        assert!(matches!(
            state.pending_events().first(),
            Some(Event::EnemySpawned { kind: EnemyKind::Raider, .. })
        ));
    }

    #[test]
    fn projectiles_are_recycled_through_the_pool() {
        let mut state = state();
        let payload = Payload::damage(5.0, DamageType::Kinetic);
        let first = state.spawn_projectile(
            ProjectileKind::Bullet,
            EntityId::new(90, 0),
            EntityId::new(91, 0),
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            payload,
        );
        assert!(state.release_projectile(first));
        assert_eq!(state.pool().idle(ProjectileKind::Bullet), 1);

        let second = state.spawn_projectile(
            ProjectileKind::Bullet,
            EntityId::new(90, 0),
            EntityId::new(91, 0),
            Vec2::ZERO,
            Vec2::new(0.0, 10.0),
            payload,
        );
        assert_ne!(first, second);
        assert!(state.is_active(second));
        assert_eq!(state.pool().idle(ProjectileKind::Bullet), 0);
        assert_eq!(state.pool().stats().reused, 1);
        assert_eq!(state.entities_in(Group::Projectiles), vec![second]);
    }
}
