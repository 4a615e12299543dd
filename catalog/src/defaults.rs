//! Built-in tables used when no external configuration is available.

use space_salvagers_core::{
    DamageType, EnemyKind, ProjectileKind, StatusKind, TargetingPolicy, TowerKind, TowerRole,
};

use crate::enemies::{AbilitySpec, EnemySpec, Resistances};
use crate::towers::{ExtraDelta, FireMode, StatDelta, TierUpgrade, TowerSpec, TowerStats};

const STANDARD_MAX_TIER: u8 = 5;
const ADVANCED_MAX_TIER: u8 = 3;

fn scaled_cost(cost: u32, factor: f32) -> u32 {
    (cost as f32 * factor).round() as u32
}

fn percent(damage: f32, fire_rate: f32, range: f32) -> StatDelta {
    StatDelta {
        damage,
        fire_rate,
        range,
        ..StatDelta::default()
    }
}

/// Four upgrades for the standard family: damage heavy with a pierce bump at tier four.
fn standard_tiers(cost: u32, unlock_air_at: Option<usize>) -> Vec<TierUpgrade> {
    let steps = [
        (0.6, percent(0.25, 0.10, 0.05), 0.0),
        (0.9, percent(0.25, 0.10, 0.05), 0.0),
        (1.3, percent(0.30, 0.10, 0.10), 2.0),
        (1.8, percent(0.40, 0.15, 0.10), 1.0),
    ];
    steps
        .iter()
        .enumerate()
        .map(|(index, (factor, percent, pierce))| TierUpgrade {
            cost: scaled_cost(cost, *factor),
            percent: *percent,
            flat: StatDelta {
                armor_pierce: *pierce,
                crit_chance: 0.02,
                ..StatDelta::default()
            },
            extra: ExtraDelta::default(),
            unlock_air: unlock_air_at == Some(index + 2),
        })
        .collect()
}

/// Two upgrades for the advanced family, each adding the archetype extra.
fn advanced_tiers(cost: u32, extra: ExtraDelta) -> Vec<TierUpgrade> {
    [(0.8, percent(0.35, 0.10, 0.10)), (1.2, percent(0.45, 0.15, 0.10))]
        .iter()
        .map(|(factor, percent)| TierUpgrade {
            cost: scaled_cost(cost, *factor),
            percent: *percent,
            flat: StatDelta::default(),
            extra,
            unlock_air: false,
        })
        .collect()
}

/// Built-in tower table covering every [`TowerKind`].
pub(crate) fn towers() -> Vec<TowerSpec> {
    vec![
        TowerSpec {
            kind: TowerKind::Cannon,
            role: TowerRole::Damage,
            cost: 100,
            max_tier: STANDARD_MAX_TIER,
            targeting: TargetingPolicy::Nearest,
            fire_mode: FireMode::Projectile,
            projectile: Some(ProjectileKind::Bullet),
            damage_type: DamageType::Kinetic,
            effect: None,
            cluster_radius: 0.0,
            base: TowerStats {
                damage: 12.0,
                fire_rate: 1.5,
                range: 150.0,
                crit_chance: 0.05,
                ..TowerStats::default()
            },
            tiers: standard_tiers(100, Some(3)),
        },
        TowerSpec {
            kind: TowerKind::Laser,
            role: TowerRole::Damage,
            cost: 140,
            max_tier: STANDARD_MAX_TIER,
            targeting: TargetingPolicy::Strongest,
            fire_mode: FireMode::Beam,
            projectile: None,
            damage_type: DamageType::Energy,
            effect: Some(StatusKind::Vulnerability),
            cluster_radius: 0.0,
            base: TowerStats {
                damage: 20.0,
                fire_rate: 1.0,
                range: 180.0,
                armor_pierce: 2.0,
                effect_strength: 0.1,
                effect_duration: 2.0,
                ..TowerStats::default()
            },
            tiers: standard_tiers(140, Some(4)),
        },
        TowerSpec {
            kind: TowerKind::MissileBattery,
            role: TowerRole::Damage,
            cost: 160,
            max_tier: STANDARD_MAX_TIER,
            targeting: TargetingPolicy::First,
            fire_mode: FireMode::Projectile,
            projectile: Some(ProjectileKind::Missile),
            damage_type: DamageType::Explosive,
            effect: None,
            cluster_radius: 0.0,
            base: TowerStats {
                damage: 30.0,
                fire_rate: 0.6,
                range: 220.0,
                can_target_air: true,
                splash_radius: 40.0,
                ..TowerStats::default()
            },
            tiers: standard_tiers(160, None),
        },
        TowerSpec {
            kind: TowerKind::PlasmaArc,
            role: TowerRole::Damage,
            cost: 180,
            max_tier: ADVANCED_MAX_TIER,
            targeting: TargetingPolicy::Weakest,
            fire_mode: FireMode::Projectile,
            projectile: Some(ProjectileKind::Plasma),
            damage_type: DamageType::Energy,
            effect: None,
            cluster_radius: 0.0,
            base: TowerStats {
                damage: 18.0,
                fire_rate: 1.0,
                range: 160.0,
                chains: 2,
                chain_radius: 80.0,
                ..TowerStats::default()
            },
            tiers: advanced_tiers(
                180,
                ExtraDelta {
                    chains: 1,
                    ..ExtraDelta::default()
                },
            ),
        },
        TowerSpec {
            kind: TowerKind::CryoField,
            role: TowerRole::Control,
            cost: 150,
            max_tier: ADVANCED_MAX_TIER,
            targeting: TargetingPolicy::MostClustered,
            fire_mode: FireMode::Aura,
            projectile: None,
            damage_type: DamageType::Energy,
            effect: Some(StatusKind::Slow),
            cluster_radius: 60.0,
            base: TowerStats {
                damage: 2.0,
                fire_rate: 1.0,
                range: 120.0,
                max_targets: 6,
                effect_strength: 0.3,
                effect_duration: 1.0,
                ..TowerStats::default()
            },
            tiers: advanced_tiers(
                150,
                ExtraDelta {
                    max_targets: 2,
                    effect_strength: 0.05,
                    ..ExtraDelta::default()
                },
            ),
        },
        TowerSpec {
            kind: TowerKind::FlakArray,
            role: TowerRole::AntiAir,
            cost: 130,
            max_tier: STANDARD_MAX_TIER,
            targeting: TargetingPolicy::FlyingOnly,
            fire_mode: FireMode::Projectile,
            projectile: Some(ProjectileKind::Bullet),
            damage_type: DamageType::Kinetic,
            effect: None,
            cluster_radius: 0.0,
            base: TowerStats {
                damage: 8.0,
                fire_rate: 3.0,
                range: 200.0,
                can_target_air: true,
                max_targets: 3,
                ..TowerStats::default()
            },
            tiers: standard_tiers(130, None),
        },
        TowerSpec {
            kind: TowerKind::NanobotHive,
            role: TowerRole::Control,
            cost: 170,
            max_tier: ADVANCED_MAX_TIER,
            targeting: TargetingPolicy::MostClustered,
            fire_mode: FireMode::Projectile,
            projectile: Some(ProjectileKind::Nanobot),
            damage_type: DamageType::Corrosive,
            effect: Some(StatusKind::Infection),
            cluster_radius: 60.0,
            base: TowerStats {
                damage: 4.0,
                fire_rate: 0.8,
                range: 170.0,
                effect_strength: 6.0,
                effect_duration: 3.0,
                ..TowerStats::default()
            },
            tiers: advanced_tiers(
                170,
                ExtraDelta {
                    effect_strength: 2.0,
                    effect_duration: 0.5,
                    ..ExtraDelta::default()
                },
            ),
        },
        TowerSpec {
            kind: TowerKind::PulseEmitter,
            role: TowerRole::Control,
            cost: 200,
            max_tier: ADVANCED_MAX_TIER,
            targeting: TargetingPolicy::Nearest,
            fire_mode: FireMode::Pulse,
            projectile: None,
            damage_type: DamageType::Kinetic,
            effect: Some(StatusKind::Stun),
            cluster_radius: 0.0,
            base: TowerStats {
                damage: 10.0,
                fire_rate: 0.4,
                range: 110.0,
                effect_strength: 1.0,
                effect_duration: 0.6,
                ..TowerStats::default()
            },
            tiers: advanced_tiers(
                200,
                ExtraDelta {
                    effect_duration: 0.2,
                    ..ExtraDelta::default()
                },
            ),
        },
        TowerSpec {
            kind: TowerKind::DroneBay,
            role: TowerRole::Damage,
            cost: 220,
            max_tier: ADVANCED_MAX_TIER,
            targeting: TargetingPolicy::First,
            fire_mode: FireMode::Swarm,
            projectile: Some(ProjectileKind::Missile),
            damage_type: DamageType::Explosive,
            effect: None,
            cluster_radius: 0.0,
            base: TowerStats {
                damage: 9.0,
                fire_rate: 0.5,
                range: 240.0,
                can_target_air: true,
                max_targets: 3,
                burst: 3,
                ..TowerStats::default()
            },
            tiers: advanced_tiers(
                220,
                ExtraDelta {
                    burst: 1,
                    ..ExtraDelta::default()
                },
            ),
        },
        TowerSpec {
            kind: TowerKind::Salvager,
            role: TowerRole::Economy,
            cost: 120,
            max_tier: ADVANCED_MAX_TIER,
            targeting: TargetingPolicy::Nearest,
            fire_mode: FireMode::Projectile,
            projectile: Some(ProjectileKind::Bullet),
            damage_type: DamageType::Kinetic,
            effect: None,
            cluster_radius: 0.0,
            base: TowerStats {
                damage: 3.0,
                fire_rate: 0.5,
                range: 100.0,
                income: 1.5,
                ..TowerStats::default()
            },
            tiers: advanced_tiers(
                120,
                ExtraDelta {
                    income: 1.0,
                    ..ExtraDelta::default()
                },
            ),
        },
    ]
}

fn enemy(kind: EnemyKind, health: f32, speed: f32, salvage: u32, core_damage: u32) -> EnemySpec {
    EnemySpec {
        kind,
        health,
        speed,
        armor: 0.0,
        resistances: Resistances::default(),
        shield: 0.0,
        salvage,
        core_damage,
        flying: false,
        ability: None,
    }
}

/// Built-in enemy table covering every [`EnemyKind`].
pub(crate) fn enemies() -> Vec<EnemySpec> {
    vec![
        enemy(EnemyKind::Scout, 30.0, 90.0, 5, 1),
        EnemySpec {
            armor: 1.0,
            ..enemy(EnemyKind::Raider, 60.0, 60.0, 8, 2)
        },
        EnemySpec {
            armor: 6.0,
            resistances: Resistances {
                kinetic: 0.2,
                ..Resistances::default()
            },
            ..enemy(EnemyKind::Brute, 180.0, 35.0, 15, 5)
        },
        EnemySpec {
            flying: true,
            resistances: Resistances {
                energy: 0.1,
                ..Resistances::default()
            },
            ..enemy(EnemyKind::Drone, 45.0, 80.0, 10, 2)
        },
        EnemySpec {
            ability: Some(AbilitySpec::PackSpeed {
                radius: 60.0,
                bonus_per_ally: 0.08,
                max_bonus: 0.4,
            }),
            ..enemy(EnemyKind::Swarmer, 35.0, 70.0, 6, 1)
        },
        EnemySpec {
            shield: 60.0,
            resistances: Resistances {
                energy: 0.25,
                ..Resistances::default()
            },
            ability: Some(AbilitySpec::RegenShield {
                rate: 15.0,
                delay: 2.0,
            }),
            ..enemy(EnemyKind::Aegis, 90.0, 50.0, 14, 3)
        },
        EnemySpec {
            ability: Some(AbilitySpec::Split {
                child: EnemyKind::Scout,
                count: 2,
            }),
            ..enemy(EnemyKind::Splitter, 100.0, 55.0, 12, 3)
        },
        EnemySpec {
            ability: Some(AbilitySpec::SelfHeal {
                interval: 3.0,
                fraction: 0.1,
            }),
            ..enemy(EnemyKind::Mender, 120.0, 50.0, 14, 3)
        },
        EnemySpec {
            armor: 10.0,
            shield: 200.0,
            resistances: Resistances {
                explosive: 0.2,
                ..Resistances::default()
            },
            ..enemy(EnemyKind::Behemoth, 1200.0, 25.0, 150, 25)
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_builtin_entry() {
        let towers = towers();
        for kind in TowerKind::ALL {
            assert!(towers.iter().any(|spec| spec.kind == kind), "{kind:?}");
        }
        let enemies = enemies();
        for kind in EnemyKind::ALL {
            assert!(enemies.iter().any(|spec| spec.kind == kind), "{kind:?}");
        }
    }

    #[test]
    fn families_reach_their_tier_caps() {
        for spec in towers() {
            assert_eq!(spec.effective_max_tier(), spec.max_tier, "{:?}", spec.kind);
            let expected = if spec.max_tier == STANDARD_MAX_TIER {
                4
            } else {
                2
            };
            assert_eq!(spec.tiers.len(), expected);
        }
    }

    #[test]
    fn cannon_gains_air_coverage_at_tier_three() {
        let cannon = towers()
            .into_iter()
            .find(|spec| spec.kind == TowerKind::Cannon)
            .expect("cannon");
        assert!(!cannon.stats_at(2).can_target_air);
        assert!(cannon.stats_at(3).can_target_air);
        assert_eq!(cannon.upgrade_cost(1), Some(60));
    }

    #[test]
    fn projectile_modes_name_a_projectile() {
        for spec in towers() {
            if matches!(spec.fire_mode, FireMode::Projectile | FireMode::Swarm) {
                assert!(spec.projectile.is_some(), "{:?}", spec.kind);
            }
        }
    }
}
