//! Tower archetype tables and tier progression.

use serde::{Deserialize, Serialize};
use space_salvagers_core::{
    DamageType, ProjectileKind, StatusKind, TargetingPolicy, TowerKind, TowerRole,
};

/// How a tower delivers its damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireMode {
    /// Launches a projectile at each selected target.
    Projectile,
    /// Deals damage instantly to the primary target.
    Beam,
    /// Continuously applies its status effect to every target; damage ticks at the fire rate.
    Aura,
    /// Periodic radial blast centred on the tower.
    Pulse,
    /// Launches a burst of missiles spread over the selected targets.
    Swarm,
}

/// Complete stat line of a tower at a given tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerStats {
    /// Damage per shot before crits and resistances.
    pub damage: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Targeting range in world units.
    pub range: f32,
    /// Probability of a critical hit.
    pub crit_chance: f32,
    /// Damage multiplier applied on a critical hit.
    pub crit_multiplier: f32,
    /// Armor ignored per hit.
    pub armor_pierce: f32,
    /// Whether flying enemies can be engaged.
    pub can_target_air: bool,
    /// Number of enemies engaged simultaneously.
    pub max_targets: u32,
    /// Additional enemies a hit arcs to.
    pub chains: u32,
    /// Radius of the chain jump.
    pub chain_radius: f32,
    /// Radius of the splash around the impact.
    pub splash_radius: f32,
    /// Projectiles launched per swarm volley.
    pub burst: u32,
    /// Intensity of the applied status effect (slow fraction, DoT per second, ...).
    pub effect_strength: f32,
    /// Duration of the applied status effect in seconds.
    pub effect_duration: f32,
    /// Salvage generated per second.
    pub income: f32,
}

impl Default for TowerStats {
    fn default() -> Self {
        Self {
            damage: 0.0,
            fire_rate: 1.0,
            range: 100.0,
            crit_chance: 0.0,
            crit_multiplier: 1.5,
            armor_pierce: 0.0,
            can_target_air: false,
            max_targets: 1,
            chains: 0,
            chain_radius: 0.0,
            splash_radius: 0.0,
            burst: 1,
            effect_strength: 0.0,
            effect_duration: 0.0,
            income: 0.0,
        }
    }
}

impl TowerStats {
    /// Expected damage per second against an unarmored single target.
    #[must_use]
    pub fn damage_per_second(&self) -> f32 {
        let crit_bonus = 1.0 + self.crit_chance.clamp(0.0, 1.0) * (self.crit_multiplier - 1.0);
        let volleys = self.burst.max(1) as f32;
        self.damage * self.fire_rate * crit_bonus * volleys
    }
}

/// Adjustment applied to the six core stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatDelta {
    /// Change to damage.
    pub damage: f32,
    /// Change to fire rate.
    pub fire_rate: f32,
    /// Change to range.
    pub range: f32,
    /// Change to crit chance.
    pub crit_chance: f32,
    /// Change to crit multiplier.
    pub crit_multiplier: f32,
    /// Change to armor pierce.
    pub armor_pierce: f32,
}

/// Additive changes to archetype-specific extras.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraDelta {
    /// Additional simultaneous targets.
    pub max_targets: u32,
    /// Additional chain jumps.
    pub chains: u32,
    /// Additional projectiles per swarm volley.
    pub burst: u32,
    /// Added splash radius.
    pub splash_radius: f32,
    /// Added status intensity.
    pub effect_strength: f32,
    /// Added status duration.
    pub effect_duration: f32,
    /// Added salvage per second.
    pub income: f32,
}

/// Modifiers unlocked by reaching a tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierUpgrade {
    /// Salvage required to reach the tier.
    pub cost: u32,
    /// Multiplicative changes, applied first (`stat * (1 + percent)`).
    pub percent: StatDelta,
    /// Additive changes, applied after the percentages.
    pub flat: StatDelta,
    /// Archetype-specific additive changes.
    pub extra: ExtraDelta,
    /// Grants the ability to engage flying enemies.
    pub unlock_air: bool,
}

impl TierUpgrade {
    fn apply(&self, stats: &mut TowerStats) {
        stats.damage *= 1.0 + self.percent.damage;
        stats.fire_rate *= 1.0 + self.percent.fire_rate;
        stats.range *= 1.0 + self.percent.range;
        stats.crit_chance *= 1.0 + self.percent.crit_chance;
        stats.crit_multiplier *= 1.0 + self.percent.crit_multiplier;
        stats.armor_pierce *= 1.0 + self.percent.armor_pierce;

        stats.damage += self.flat.damage;
        stats.fire_rate += self.flat.fire_rate;
        stats.range += self.flat.range;
        stats.crit_chance += self.flat.crit_chance;
        stats.crit_multiplier += self.flat.crit_multiplier;
        stats.armor_pierce += self.flat.armor_pierce;

        stats.max_targets += self.extra.max_targets;
        stats.chains += self.extra.chains;
        stats.burst += self.extra.burst;
        stats.splash_radius += self.extra.splash_radius;
        stats.effect_strength += self.extra.effect_strength;
        stats.effect_duration += self.extra.effect_duration;
        stats.income += self.extra.income;
        stats.can_target_air |= self.unlock_air;
    }
}

/// Configuration of a single tower archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSpec {
    /// Archetype described by the entry.
    pub kind: TowerKind,
    /// Role used by the autopilot.
    pub role: TowerRole,
    /// Build cost.
    pub cost: u32,
    /// Highest reachable tier.
    pub max_tier: u8,
    /// Fixed targeting rule.
    pub targeting: TargetingPolicy,
    /// Damage delivery.
    pub fire_mode: FireMode,
    /// Projectile family for projectile and swarm modes.
    #[serde(default)]
    pub projectile: Option<ProjectileKind>,
    /// Damage channel.
    pub damage_type: DamageType,
    /// Status applied on hit.
    #[serde(default)]
    pub effect: Option<StatusKind>,
    /// Neighbourhood radius used by the most-clustered policy.
    #[serde(default)]
    pub cluster_radius: f32,
    /// Tier one stats.
    pub base: TowerStats,
    /// Upgrades for tiers two and above, in order.
    #[serde(default)]
    pub tiers: Vec<TierUpgrade>,
}

impl TowerSpec {
    /// Stats after folding the modifiers of tiers `2..=tier`, in order.
    ///
    /// Tiers beyond the table are clamped to the last available entry.
    #[must_use]
    pub fn stats_at(&self, tier: u8) -> TowerStats {
        let mut stats = self.base;
        let upgrades = usize::from(tier.max(1) - 1).min(self.tiers.len());
        for upgrade in &self.tiers[..upgrades] {
            upgrade.apply(&mut stats);
        }
        stats
    }

    /// Highest tier the table actually supports.
    #[must_use]
    pub fn effective_max_tier(&self) -> u8 {
        let table_limit = u8::try_from(self.tiers.len() + 1).unwrap_or(u8::MAX);
        self.max_tier.clamp(1, table_limit)
    }

    /// Cost of moving from `tier` to `tier + 1`, or `None` when already maxed.
    #[must_use]
    pub fn upgrade_cost(&self, tier: u8) -> Option<u32> {
        if tier >= self.effective_max_tier() {
            return None;
        }
        self.tiers
            .get(usize::from(tier.max(1) - 1))
            .map(|upgrade| upgrade.cost)
    }

    /// Total salvage invested in a tower that reached `tier`.
    #[must_use]
    pub fn cumulative_cost(&self, tier: u8) -> u32 {
        let upgrades = usize::from(tier.max(1) - 1).min(self.tiers.len());
        self.tiers[..upgrades]
            .iter()
            .fold(self.cost, |total, upgrade| total.saturating_add(upgrade.cost))
    }
}
