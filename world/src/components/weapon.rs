use space_salvagers_catalog::{FireMode, TowerSpec, TowerStats};
use space_salvagers_core::{DamageType, EntityId, ImpactKind, ProjectileKind, StatusKind};

use super::{Targeting, Transform};
use crate::{
    entity::Entity,
    mailbox::{EffectRequest, Message, Payload},
    FrameContext,
};

/// Firing logic of a tower.
#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    stats: TowerStats,
    fire_mode: FireMode,
    projectile: Option<ProjectileKind>,
    damage_type: DamageType,
    effect: Option<StatusKind>,
    since_fire: f32,
    shots: u64,
    owner: Option<EntityId>,
}

impl Weapon {
    /// Weapon for a tower archetype at the given stats.
    #[must_use]
    pub fn new(spec: &TowerSpec, stats: TowerStats) -> Self {
        Self {
            stats,
            fire_mode: spec.fire_mode,
            projectile: spec.projectile,
            damage_type: spec.damage_type,
            effect: spec.effect,
            since_fire: f32::INFINITY,
            shots: 0,
            owner: None,
        }
    }

    /// Current stats.
    #[must_use]
    pub const fn stats(&self) -> &TowerStats {
        &self.stats
    }

    /// Delivery mode.
    #[must_use]
    pub const fn fire_mode(&self) -> FireMode {
        self.fire_mode
    }

    /// Volleys fired since construction.
    #[must_use]
    pub const fn shots(&self) -> u64 {
        self.shots
    }

    /// Seconds between volleys.
    #[must_use]
    pub fn interval(&self) -> f32 {
        if self.stats.fire_rate > 0.0 {
            1.0 / self.stats.fire_rate
        } else {
            f32::INFINITY
        }
    }

    /// Applies upgraded stats.
    pub fn resync(&mut self, stats: TowerStats) {
        self.stats = stats;
    }

    pub(crate) fn initialize(&mut self, owner: EntityId) {
        self.owner = Some(owner);
    }

    pub(crate) fn teardown(&mut self) {
        self.owner = None;
        self.since_fire = f32::INFINITY;
    }

    fn payload(&self, damage: f32) -> Payload {
        Payload {
            damage,
            damage_type: self.damage_type,
            armor_pierce: self.stats.armor_pierce,
            splash_radius: self.stats.splash_radius,
            chains: self.stats.chains,
            chain_radius: self.stats.chain_radius,
            can_hit_air: self.stats.can_target_air,
            effect: self.effect.map(|kind| EffectRequest {
                kind,
                strength: self.stats.effect_strength,
                duration: self.stats.effect_duration,
                holder: self.owner.filter(|_| self.fire_mode == FireMode::Aura),
            }),
        }
    }

    fn holds_effect(&self) -> bool {
        self.fire_mode == FireMode::Aura && self.effect.is_some()
    }

    fn roll_damage(&self, ctx: &mut FrameContext<'_>) -> f32 {
        if self.stats.crit_chance > 0.0 && ctx.rng.chance(f64::from(self.stats.crit_chance)) {
            self.stats.damage * self.stats.crit_multiplier
        } else {
            self.stats.damage
        }
    }

    pub(crate) fn update(&mut self, entity: &Entity, ctx: &mut FrameContext<'_>) {
        self.since_fire += ctx.dt;
        let Some(owner) = self.owner else {
            return;
        };
        let firing = self.since_fire >= self.interval();
        if !firing && !self.holds_effect() {
            return;
        }
        let Some(targeting) = entity.get::<Targeting>() else {
            return;
        };
        let targets = targeting.targets();
        if targets.is_empty() {
            return;
        }
        if !firing {
            // Between volleys an aura only keeps its effect alive.
            for target in targets {
                ctx.mailbox.post(Message::Hit {
                    target: *target,
                    source: Some(owner),
                    payload: self.payload(0.0),
                    impact: None,
                });
            }
            return;
        }
        let origin = entity
            .get::<Transform>()
            .map(|transform| transform.position)
            .unwrap_or_default();
        self.since_fire = 0.0;
        self.shots += 1;

        match self.fire_mode {
            FireMode::Projectile => {
                let Some(kind) = self.projectile else {
                    return;
                };
                for target in targets {
                    let payload = self.payload(self.roll_damage(ctx));
                    ctx.mailbox.post(Message::FireProjectile {
                        source: owner,
                        origin,
                        target: *target,
                        kind,
                        payload,
                    });
                }
            }
            FireMode::Swarm => {
                let Some(kind) = self.projectile else {
                    return;
                };
                for volley in 0..self.stats.burst.max(1) as usize {
                    let payload = self.payload(self.roll_damage(ctx));
                    ctx.mailbox.post(Message::FireProjectile {
                        source: owner,
                        origin,
                        target: targets[volley % targets.len()],
                        kind,
                        payload,
                    });
                }
            }
            FireMode::Beam => {
                let payload = self.payload(self.roll_damage(ctx));
                ctx.mailbox.post(Message::Hit {
                    target: targets[0],
                    source: Some(owner),
                    payload,
                    impact: Some(ImpactKind::Beam),
                });
            }
            FireMode::Aura => {
                for target in targets {
                    ctx.mailbox.post(Message::Hit {
                        target: *target,
                        source: Some(owner),
                        payload: self.payload(self.stats.damage),
                        impact: None,
                    });
                }
            }
            FireMode::Pulse => {
                let payload = self.payload(self.roll_damage(ctx));
                ctx.mailbox.post(Message::AreaPulse {
                    source: owner,
                    center: origin,
                    radius: self.stats.range,
                    payload,
                });
            }
        }
    }
}
