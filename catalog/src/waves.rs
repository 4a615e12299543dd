//! Wave, economy and station tuning.

use serde::{Deserialize, Serialize};
use space_salvagers_core::EnemyKind;

/// Enemy availability entry for wave composition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Archetype that may spawn.
    pub kind: EnemyKind,
    /// First wave in which the archetype appears.
    pub from_wave: u32,
    /// Relative spawn weight.
    pub weight: u32,
}

/// Parameters controlling wave size, cadence and scaling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Enemies in the first wave.
    pub base_count: u32,
    /// Additional enemies per subsequent wave.
    pub count_per_wave: u32,
    /// Seconds between spawns in the first wave.
    pub base_interval: f32,
    /// Interval reduction per subsequent wave.
    pub interval_step: f32,
    /// Lower bound of the spawn interval.
    pub min_interval: f32,
    /// Health multiplier growth per wave.
    pub health_growth: f32,
    /// Last wave of a session.
    pub final_wave: u32,
    /// Every n-th wave ends with a boss; zero disables bosses.
    pub boss_every: u32,
    /// Archetype used for boss spawns.
    pub boss: EnemyKind,
    /// Archetypes available to the composer.
    pub roster: Vec<RosterEntry>,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            base_count: 6,
            count_per_wave: 2,
            base_interval: 1.2,
            interval_step: 0.04,
            min_interval: 0.35,
            health_growth: 0.18,
            final_wave: 20,
            boss_every: 10,
            boss: EnemyKind::Behemoth,
            roster: vec![
                RosterEntry {
                    kind: EnemyKind::Scout,
                    from_wave: 1,
                    weight: 3,
                },
                RosterEntry {
                    kind: EnemyKind::Raider,
                    from_wave: 1,
                    weight: 4,
                },
                RosterEntry {
                    kind: EnemyKind::Drone,
                    from_wave: 3,
                    weight: 2,
                },
                RosterEntry {
                    kind: EnemyKind::Swarmer,
                    from_wave: 4,
                    weight: 3,
                },
                RosterEntry {
                    kind: EnemyKind::Brute,
                    from_wave: 5,
                    weight: 2,
                },
                RosterEntry {
                    kind: EnemyKind::Aegis,
                    from_wave: 7,
                    weight: 2,
                },
                RosterEntry {
                    kind: EnemyKind::Splitter,
                    from_wave: 8,
                    weight: 2,
                },
                RosterEntry {
                    kind: EnemyKind::Mender,
                    from_wave: 10,
                    weight: 2,
                },
            ],
        }
    }
}

impl WaveTuning {
    /// Health multiplier for a one-based wave number.
    #[must_use]
    pub fn multiplier(&self, wave: u32) -> f32 {
        1.0 + wave.saturating_sub(1) as f32 * self.health_growth
    }

    /// Number of regular enemies in the wave, excluding the boss.
    #[must_use]
    pub fn enemy_count(&self, wave: u32) -> u32 {
        self.base_count
            .saturating_add(wave.saturating_sub(1).saturating_mul(self.count_per_wave))
    }

    /// Seconds between consecutive spawns.
    #[must_use]
    pub fn spawn_interval(&self, wave: u32) -> f32 {
        let interval = self.base_interval - wave.saturating_sub(1) as f32 * self.interval_step;
        interval.max(self.min_interval)
    }

    /// Whether the wave ends with a boss.
    #[must_use]
    pub fn has_boss(&self, wave: u32) -> bool {
        self.boss_every != 0 && wave != 0 && wave % self.boss_every == 0
    }

    /// Archetypes and weights available in the wave, in roster order.
    #[must_use]
    pub fn roster(&self, wave: u32) -> Vec<(EnemyKind, u32)> {
        self.roster
            .iter()
            .filter(|entry| entry.from_wave <= wave && entry.weight > 0)
            .map(|entry| (entry.kind, entry.weight))
            .collect()
    }
}

/// Salvage economy parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    /// Balance at the start of a session.
    pub starting_salvage: u32,
    /// Fraction of the cumulative investment refunded on sale.
    pub sell_refund_ratio: f32,
    /// Flat part of the wave completion bonus.
    pub wave_bonus_base: u32,
    /// Per-wave part of the wave completion bonus.
    pub wave_bonus_per_wave: u32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            starting_salvage: 200,
            sell_refund_ratio: 0.7,
            wave_bonus_base: 20,
            wave_bonus_per_wave: 2,
        }
    }
}

impl EconomyTuning {
    /// Bonus credited when a wave is cleared.
    #[must_use]
    pub fn wave_bonus(&self, wave: u32) -> u32 {
        self.wave_bonus_base
            .saturating_add(self.wave_bonus_per_wave.saturating_mul(wave))
    }

    /// Refund for a tower with the given cumulative investment.
    #[must_use]
    pub fn refund(&self, invested: u32) -> u32 {
        (invested as f32 * self.sell_refund_ratio.clamp(0.0, 1.0)).floor() as u32
    }
}

/// Station parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationTuning {
    /// Station hit points.
    pub health: u32,
}

impl Default for StationTuning {
    fn default() -> Self {
        Self { health: 100 }
    }
}
