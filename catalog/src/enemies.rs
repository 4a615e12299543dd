//! Enemy archetype tables.

use serde::{Deserialize, Serialize};
use space_salvagers_core::{DamageType, EnemyKind};

/// Fractional damage reduction per damage channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resistances {
    /// Reduction against kinetic damage.
    pub kinetic: f32,
    /// Reduction against energy damage.
    pub energy: f32,
    /// Reduction against explosive damage.
    pub explosive: f32,
    /// Reduction against corrosive damage.
    pub corrosive: f32,
}

impl Resistances {
    /// Dense per-channel representation indexed by [`DamageType::index`].
    #[must_use]
    pub fn to_array(self) -> [f32; DamageType::COUNT] {
        [self.kinetic, self.energy, self.explosive, self.corrosive]
    }
}

/// Special behaviour carried by an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilitySpec {
    /// Moves faster for every pack member nearby.
    PackSpeed {
        /// Radius in which allies count.
        radius: f32,
        /// Speed bonus per ally.
        bonus_per_ally: f32,
        /// Upper bound of the bonus.
        max_bonus: f32,
    },
    /// Shield recharges after a quiet period.
    RegenShield {
        /// Shield points restored per second.
        rate: f32,
        /// Seconds without damage before recharging starts.
        delay: f32,
    },
    /// Spawns children when destroyed.
    Split {
        /// Archetype of the children.
        child: EnemyKind,
        /// Number of children.
        count: u32,
    },
    /// Periodically restores a fraction of maximum health.
    SelfHeal {
        /// Seconds between heals.
        interval: f32,
        /// Fraction of maximum health restored.
        fraction: f32,
    },
}

/// Configuration of a single enemy archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    /// Archetype described by the entry.
    pub kind: EnemyKind,
    /// Health before wave scaling.
    pub health: f32,
    /// Speed in world units per second before wave scaling.
    pub speed: f32,
    /// Flat damage reduction per hit.
    #[serde(default)]
    pub armor: f32,
    /// Percentage reduction per damage channel.
    #[serde(default)]
    pub resistances: Resistances,
    /// Shield capacity before wave scaling.
    #[serde(default)]
    pub shield: f32,
    /// Salvage awarded on kill.
    pub salvage: u32,
    /// Damage dealt to the station on reaching the core.
    pub core_damage: u32,
    /// Whether the enemy flies.
    #[serde(default)]
    pub flying: bool,
    /// Optional special ability.
    #[serde(default)]
    pub ability: Option<AbilitySpec>,
}

/// Stats of an enemy after applying a wave multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaledEnemy {
    /// Scaled maximum health.
    pub health: f32,
    /// Scaled speed.
    pub speed: f32,
    /// Scaled shield capacity.
    pub shield: f32,
}

impl EnemySpec {
    /// Scales health linearly and speed at a fifth of the rate.
    #[must_use]
    pub fn scaled(&self, multiplier: f32) -> ScaledEnemy {
        ScaledEnemy {
            health: self.health * multiplier,
            speed: self.speed * speed_multiplier(multiplier),
            shield: self.shield * multiplier,
        }
    }
}

/// Dampened speed factor for a wave multiplier.
#[must_use]
pub fn speed_multiplier(wave_multiplier: f32) -> f32 {
    1.0 + (wave_multiplier - 1.0) * 0.2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_is_linear_for_health_and_dampened_for_speed() {
        let spec = EnemySpec {
            kind: EnemyKind::Raider,
            health: 60.0,
            speed: 50.0,
            armor: 0.0,
            resistances: Resistances::default(),
            shield: 10.0,
            salvage: 5,
            core_damage: 2,
            flying: false,
            ability: None,
        };

        let scaled = spec.scaled(2.5);
        assert_eq!(scaled.health, 60.0 * 2.5);
        assert_eq!(scaled.speed, 50.0 * (1.0 + (2.5 - 1.0) * 0.2));
        assert_eq!(scaled.shield, 25.0);
    }

    #[test]
    fn resistances_follow_damage_type_indices() {
        let resistances = Resistances {
            kinetic: 0.1,
            energy: 0.2,
            explosive: 0.3,
            corrosive: 0.4,
        };
        let array = resistances.to_array();
        assert_eq!(array[DamageType::Energy.index()], 0.2);
        assert_eq!(array[DamageType::Corrosive.index()], 0.4);
    }
}
