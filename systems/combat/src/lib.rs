#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resolution of the combat requests queued during the component pass.
//!
//! Weapons, projectiles and status effects never touch other entities
//! directly. The combat system drains their messages in posting order,
//! applies damage and effects, awards kills, lets enemies breach the station
//! and returns spent projectiles to the pool.

use std::any::Any;

use space_salvagers_catalog::AbilitySpec;
use space_salvagers_core::{EntityId, Event, ImpactKind, ProjectileKind, Vec2};
use space_salvagers_world::{
    components::{Ability, EnemyProfile, Health, PathFollow, StatusEffects, Transform},
    Group, Message, Payload, RadarContact, System, WorldState,
};
use tracing::{debug, info};

/// Schedule slot of the combat system.
pub const PRIORITY: i32 = 20;

const SPLIT_SPACING: f32 = 0.004;

/// Aim point for an unguided shot so that it meets a target moving at constant velocity.
#[must_use]
pub fn lead_aim(origin: Vec2, position: Vec2, velocity: Vec2, speed: f32) -> Vec2 {
    if speed <= f32::EPSILON {
        return position;
    }
    let flight = origin.distance(position) / speed;
    position + velocity * flight
}

/// Resolves hits, kills, breaches and projectile recycling.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatSystem {
    kills: u32,
    breaches: u32,
    hits: u64,
}

impl CombatSystem {
    /// Creates a combat system with zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            kills: 0,
            breaches: 0,
            hits: 0,
        }
    }

    /// Enemies destroyed.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Enemies that reached the station.
    #[must_use]
    pub const fn breaches(&self) -> u32 {
        self.breaches
    }

    /// Hits that reached a live enemy.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    fn resolve(&mut self, message: Message, state: &mut WorldState) {
        match message {
            Message::FireProjectile {
                source,
                origin,
                target,
                kind,
                payload,
            } => fire(source, origin, target, kind, payload, state),
            Message::Hit {
                target,
                payload,
                impact,
                ..
            } => self.hit(target, payload, impact, state),
            Message::AreaPulse {
                center,
                radius,
                payload,
                ..
            } => self.pulse(center, radius, payload, state),
            Message::ReachedCore { enemy } => self.breach(enemy, state),
            Message::Salvage { .. } => {}
        }
    }

    fn hit(
        &mut self,
        target: EntityId,
        payload: Payload,
        impact: Option<ImpactKind>,
        state: &mut WorldState,
    ) {
        if !state.is_active(target) {
            return;
        }
        let Some(position) = state.component::<Transform>(target).map(|t| t.position) else {
            return;
        };
        if let Some(kind) = impact {
            state.emit(Event::Impact { position, kind });
        }
        let _ = self.strike(target, &payload, state);

        let secondary = Payload {
            splash_radius: 0.0,
            chains: 0,
            ..payload
        };
        if payload.splash_radius > 0.0 {
            let splashed: Vec<EntityId> = state
                .radar()
                .within(position, payload.splash_radius)
                .filter(|contact| contact.id != target && reachable(contact, &payload))
                .map(|contact| contact.id)
                .collect();
            for enemy in splashed {
                let _ = self.strike(enemy, &secondary, state);
            }
        }

        let mut visited = vec![target];
        let mut from = position;
        for _ in 0..payload.chains {
            let next = state
                .radar()
                .within(from, payload.chain_radius)
                .filter(|contact| {
                    !visited.contains(&contact.id)
                        && reachable(contact, &payload)
                        && state.is_active(contact.id)
                })
                .min_by(|left, right| {
                    left.position
                        .distance_squared(from)
                        .total_cmp(&right.position.distance_squared(from))
                        .then(left.id.cmp(&right.id))
                })
                .map(|contact| (contact.id, contact.position));
            let Some((enemy, at)) = next else {
                break;
            };
            visited.push(enemy);
            state.emit(Event::Impact {
                position: at,
                kind: ImpactKind::Chain,
            });
            let _ = self.strike(enemy, &secondary, state);
            from = at;
        }
    }

    fn pulse(&mut self, center: Vec2, radius: f32, payload: Payload, state: &mut WorldState) {
        state.emit(Event::Impact {
            position: center,
            kind: ImpactKind::Pulse,
        });
        let caught: Vec<EntityId> = state
            .radar()
            .within(center, radius)
            .filter(|contact| reachable(contact, &payload))
            .map(|contact| contact.id)
            .collect();
        for enemy in caught {
            let _ = self.strike(enemy, &payload, state);
        }
    }

    /// Applies one hit to a live enemy; `false` when the enemy is gone or already dead.
    fn strike(&mut self, target: EntityId, payload: &Payload, state: &mut WorldState) -> bool {
        let Some(entity) = state.entity_mut(target) else {
            return false;
        };
        if !entity.is_active() {
            return false;
        }
        let vulnerability = entity
            .get::<StatusEffects>()
            .map_or(1.0, StatusEffects::vulnerability);
        let Some(health) = entity.get_mut::<Health>().filter(|health| !health.is_dead()) else {
            return false;
        };
        let report = health.apply(payload, vulnerability);
        if let (Some(effect), Some(status)) = (payload.effect, entity.get_mut::<StatusEffects>()) {
            match effect.holder {
                Some(holder) => {
                    status.sustain(effect.kind, effect.strength, effect.duration, holder);
                }
                None => status.apply(effect.kind, effect.strength, effect.duration),
            }
        }
        self.hits += 1;
        if report.killed {
            self.destroy(target, state);
        }
        true
    }

    fn destroy(&mut self, enemy: EntityId, state: &mut WorldState) {
        let Some(profile) = state.component::<EnemyProfile>(enemy).copied() else {
            return;
        };
        let position = state
            .component::<Transform>(enemy)
            .map_or(Vec2::ZERO, |transform| transform.position);
        let progress = state
            .component::<PathFollow>(enemy)
            .map_or(0.0, PathFollow::progress);
        let split = state
            .component::<Ability>(enemy)
            .and_then(|ability| match *ability.spec() {
                AbilitySpec::Split { child, count } => Some((child, count)),
                _ => None,
            });

        self.kills += 1;
        debug!(
            enemy = enemy.index(),
            kind = ?profile.kind,
            salvage = profile.salvage,
            "enemy_killed"
        );
        state.emit(Event::EnemyKilled {
            enemy,
            kind: profile.kind,
            salvage: profile.salvage,
            position,
        });
        state.mailbox_mut().post(Message::Salvage {
            amount: profile.salvage,
        });
        let _ = state.remove_entity(enemy);

        if let Some((child, count)) = split {
            for index in 0..count {
                let offset = SPLIT_SPACING * index as f32;
                let _ = state.spawn_enemy(child, profile.wave, (progress - offset).max(0.0));
            }
        }
    }

    fn breach(&mut self, enemy: EntityId, state: &mut WorldState) {
        let Some(profile) = state.component::<EnemyProfile>(enemy).copied() else {
            return;
        };
        let damage = profile.core_damage;
        let health = state.station_mut().damage(damage);
        self.breaches += 1;
        info!(kind = ?profile.kind, damage, health, "station_breached");
        state.emit(Event::EnemyReachedCore {
            enemy,
            kind: profile.kind,
            damage,
        });
        state.emit(Event::StationDamaged { health, damage });
        let _ = state.remove_entity(enemy);
    }
}

fn reachable(contact: &RadarContact, payload: &Payload) -> bool {
    payload.can_hit_air || !contact.flying
}

fn fire(
    source: EntityId,
    origin: Vec2,
    target: EntityId,
    kind: ProjectileKind,
    payload: Payload,
    state: &mut WorldState,
) {
    if !state.contains(source) {
        return;
    }
    let Some(contact) = state.radar().get(target).copied() else {
        return;
    };
    let aim = if kind.homing() > 0.0 {
        contact.position
    } else {
        lead_aim(origin, contact.position, contact.velocity, kind.speed())
    };
    let _ = state.spawn_projectile(kind, source, target, origin, aim, payload);
}

fn sweep(state: &mut WorldState) {
    for projectile in state.entities_in(Group::Projectiles) {
        if !state.is_active(projectile) {
            let _ = state.release_projectile(projectile);
        }
    }
    for enemy in state.entities_in(Group::Enemies) {
        if !state.is_active(enemy) {
            let _ = state.remove_entity(enemy);
        }
    }
}

impl System for CombatSystem {
    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn update(&mut self, _dt: f32, _active: &[EntityId], state: &mut WorldState) {
        state.refresh_radar();
        let requests = state
            .mailbox_mut()
            .take(|message| !matches!(message, Message::Salvage { .. }));
        for message in requests {
            self.resolve(message, state);
        }
        sweep(state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_aim_meets_a_constant_velocity_target() {
        let aim = lead_aim(
            Vec2::ZERO,
            Vec2::new(400.0, 0.0),
            Vec2::new(0.0, 50.0),
            400.0,
        );
        assert_eq!(aim, Vec2::new(400.0, 50.0));
    }

    #[test]
    fn lead_aim_without_speed_targets_the_current_position() {
        let position = Vec2::new(3.0, 4.0);
        assert_eq!(lead_aim(Vec2::ZERO, position, Vec2::new(9.0, 9.0), 0.0), position);
    }
}
