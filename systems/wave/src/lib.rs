#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave orchestration: composes each wave, spawns it on a timer and reports
//! when the field has been cleared.

use std::any::Any;

use space_salvagers_core::{EnemyKind, EntityId, Event, WaveStatus};
use space_salvagers_world::{query, System, WorldState, WAVE_STREAM};
use tracing::{debug, info};

/// Schedule slot of the wave system.
pub const PRIORITY: i32 = 0;

/// Spawns the enemies of the current wave.
#[derive(Clone, Debug)]
pub struct WaveSystem {
    wave: u32,
    status: WaveStatus,
    plan: Vec<EnemyKind>,
    spawned: usize,
    interval: f32,
    countdown: f32,
}

impl Default for WaveSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveSystem {
    /// Creates an idle wave system before the first wave.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wave: 0,
            status: WaveStatus::Idle,
            plan: Vec::new(),
            spawned: 0,
            interval: 0.0,
            countdown: 0.0,
        }
    }

    /// One-based number of the current wave, zero before the first.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Progress of the current wave.
    #[must_use]
    pub const fn status(&self) -> WaveStatus {
        self.status
    }

    /// Enemies the current wave spawns, in spawn order.
    #[must_use]
    pub fn plan(&self) -> &[EnemyKind] {
        &self.plan
    }

    /// Enemies of the current wave not yet spawned.
    #[must_use]
    pub fn remaining_spawns(&self) -> usize {
        self.plan.len() - self.spawned
    }

    /// Seconds between consecutive spawns of the current wave.
    #[must_use]
    pub const fn interval(&self) -> f32 {
        self.interval
    }

    /// Configures wave `wave` without spawning anything.
    ///
    /// Declines while a wave is spawning or clearing, or for wave zero.
    pub fn prepare_wave(&mut self, wave: u32, state: &mut WorldState) -> bool {
        if wave == 0 || self.is_running() {
            return false;
        }
        let tuning = state.catalog().waves().clone();
        let roster = tuning.roster(wave);
        let total_weight: u32 = roster.iter().map(|(_, weight)| *weight).sum();
        let count = tuning.enemy_count(wave);

        let rng = state.random(WAVE_STREAM);
        let mut plan = Vec::with_capacity(count as usize + 1);
        if total_weight > 0 {
            for _ in 0..count {
                let mut roll = rng.int_in(0, i64::from(total_weight) - 1);
                for (kind, weight) in &roster {
                    roll -= i64::from(*weight);
                    if roll < 0 {
                        plan.push(*kind);
                        break;
                    }
                }
            }
        }
        if tuning.has_boss(wave) {
            plan.push(tuning.boss);
        }

        self.wave = wave;
        self.status = WaveStatus::Prepared;
        self.plan = plan;
        self.spawned = 0;
        self.interval = tuning.spawn_interval(wave);
        self.countdown = 0.0;
        debug!(wave, enemies = self.plan.len(), "wave_prepared");
        true
    }

    /// Begins spawning the prepared wave; declines unless a wave is prepared.
    pub fn start_wave(&mut self, state: &mut WorldState) -> bool {
        if self.status != WaveStatus::Prepared {
            return false;
        }
        self.status = WaveStatus::Spawning;
        self.countdown = 0.0;
        let enemy_count = u32::try_from(self.plan.len()).unwrap_or(u32::MAX);
        info!(wave = self.wave, enemy_count, "wave_started");
        state.emit(Event::WaveStarted {
            wave: self.wave,
            enemy_count,
        });
        true
    }

    /// Reports whether the current wave is spawning or clearing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.status, WaveStatus::Spawning | WaveStatus::Clearing)
    }

    /// Returns to the idle state before the first wave.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn spawn_due(&mut self, dt: f32, state: &mut WorldState) {
        self.countdown -= dt;
        while self.countdown <= 0.0 && self.spawned < self.plan.len() {
            let kind = self.plan[self.spawned];
            self.spawned += 1;
            let _ = state.spawn_enemy(kind, self.wave, 0.0);
            self.countdown += self.interval;
        }
        if self.spawned >= self.plan.len() {
            self.status = WaveStatus::Clearing;
            debug!(wave = self.wave, "wave_spawns_exhausted");
            state.emit(Event::WaveSpawnsExhausted { wave: self.wave });
        }
    }
}

impl System for WaveSystem {
    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn update(&mut self, dt: f32, _active: &[EntityId], state: &mut WorldState) {
        match self.status {
            WaveStatus::Spawning => self.spawn_due(dt, state),
            WaveStatus::Clearing => {
                if query::live_enemy_count(state) == 0 {
                    self.status = WaveStatus::Cleared;
                    info!(wave = self.wave, "wave_cleared");
                }
            }
            WaveStatus::Idle | WaveStatus::Prepared | WaveStatus::Cleared => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
