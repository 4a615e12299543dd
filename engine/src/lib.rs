#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session: owns the world, its systems and the top level state machine.
//!
//! Every player mutation enters through [`GameEngine::submit`] as a
//! [`Command`] and leaves as a [`CommandOutcome`]. Commands that cannot be
//! applied right now are declined without touching the session. Frames are
//! advanced with [`GameEngine::update`]; the events they produce are drained
//! with [`GameEngine::drain_events`].

mod store;

use space_salvagers_catalog::Catalog;
use space_salvagers_core::{
    Command, CommandOutcome, DeclineReason, Event, GameSnapshot, GameState, Outcome, OutcomeKind,
    WaveStatus,
};
use space_salvagers_rng::StreamDigest;
use space_salvagers_system_combat::CombatSystem;
use space_salvagers_system_economy::EconomySystem;
use space_salvagers_system_tower::TowerSystem;
use space_salvagers_system_wave::WaveSystem;
use space_salvagers_world::{query, World};
use tracing::{debug, info};

pub use store::{MemoryOutcomeStore, OutcomeStore};

/// Longest frame forwarded to the world, in seconds.
pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;

/// Upper bound of the game speed factor.
pub const MAX_GAME_SPEED: f32 = 3.0;

/// Parameters of a game session.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Master seed of every random stream.
    pub seed: u64,
    /// Tables the session runs with.
    pub catalog: Catalog,
    /// Initial game speed factor.
    pub game_speed: f32,
    /// Seconds after which a prepared wave starts on its own.
    ///
    /// `None` waits for [`Command::StartWave`].
    pub auto_start_delay: Option<f32>,
}

impl SessionConfig {
    /// Built-in tables, normal speed and manual wave starts.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            catalog: Catalog::builtin(),
            game_speed: 1.0,
            auto_start_delay: None,
        }
    }

    /// Replaces the catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Starts prepared waves after `delay` seconds.
    #[must_use]
    pub fn with_auto_start(mut self, delay: f32) -> Self {
        self.auto_start_delay = Some(delay);
        self
    }
}

/// Running totals of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Enemies destroyed.
    pub kills: u32,
    /// Salvage credited, starting balance excluded.
    pub salvage_earned: u32,
    /// Towers constructed.
    pub towers_built: u32,
    /// Waves cleared.
    pub waves_cleared: u32,
}

/// A game session from menu to game over or victory.
#[derive(Debug)]
pub struct GameEngine<S: OutcomeStore = MemoryOutcomeStore> {
    config: SessionConfig,
    state: GameState,
    game_speed: f32,
    world: Option<World>,
    store: S,
    events: Vec<Event>,
    digest: StreamDigest,
    waves_cleared: u32,
    auto_start: Option<f32>,
}

impl GameEngine<MemoryOutcomeStore> {
    /// Creates a session in the menu that keeps outcomes in memory.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_store(config, MemoryOutcomeStore::new())
    }
}

impl<S: OutcomeStore> GameEngine<S> {
    /// Creates a session in the menu that persists outcomes to `store`.
    #[must_use]
    pub fn with_store(config: SessionConfig, store: S) -> Self {
        let game_speed = clamp_speed(config.game_speed);
        Self {
            config,
            state: GameState::Menu,
            game_speed,
            world: None,
            store,
            events: Vec::new(),
            digest: StreamDigest::new(),
            waves_cleared: 0,
            auto_start: None,
        }
    }

    /// Current top level state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Current game speed factor.
    #[must_use]
    pub const fn game_speed(&self) -> f32 {
        self.game_speed
    }

    /// Session parameters.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The simulated world, once a game has been started.
    #[must_use]
    pub const fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Outcome persistence.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Digest of every random stream of the running game.
    #[must_use]
    pub fn random_fingerprint(&self) -> Option<u64> {
        self.world
            .as_ref()
            .map(|world| world.state().random_registry().fingerprint())
    }

    /// Digest of every event produced since the session was created.
    #[must_use]
    pub fn event_fingerprint(&self) -> u64 {
        self.digest.value()
    }

    /// Resets the world and its systems and prepares wave 1.
    pub fn start_new_game(&mut self) {
        let catalog = self.config.catalog.clone();
        let starting = catalog.economy().starting_salvage;
        let mut world = World::new(catalog, self.config.seed);
        let towers = TowerSystem::for_world(world.state());
        world.add_system(WaveSystem::new());
        world.add_system(towers);
        world.add_system(CombatSystem::new());
        world.add_system(EconomySystem::new(starting));
        let _ = world.with_system::<WaveSystem, _>(|waves, state| waves.prepare_wave(1, state));

        info!(seed = self.config.seed, starting, "new_game");
        self.world = Some(world);
        self.waves_cleared = 0;
        self.auto_start = self.config.auto_start_delay;
        if self.state != GameState::Menu {
            self.transition(GameState::Menu);
        }
        self.transition(GameState::Preparing);
        self.collect();
    }

    /// Freezes a running game; `false` when nothing is running.
    pub fn pause(&mut self) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        self.transition(GameState::Paused);
        self.collect();
        true
    }

    /// Continues a paused game; `false` when the game is not paused.
    pub fn resume(&mut self) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.transition(GameState::Playing);
        self.collect();
        true
    }

    /// Applies a player command, declining it without side effects when it is not applicable.
    pub fn submit(&mut self, command: Command) -> CommandOutcome {
        let outcome = match self.apply(&command) {
            Ok(()) => {
                debug!(?command, "command_applied");
                CommandOutcome::Applied
            }
            Err(reason) => {
                debug!(?command, ?reason, "command_declined");
                CommandOutcome::Declined(reason)
            }
        };
        self.collect();
        outcome
    }

    fn apply(&mut self, command: &Command) -> Result<(), DeclineReason> {
        match *command {
            Command::Wait => Ok(()),
            Command::SetGameSpeed { speed } => {
                if !speed.is_finite() {
                    return Err(DeclineReason::InvalidState);
                }
                self.game_speed = clamp_speed(speed);
                info!(speed = self.game_speed, "game_speed_changed");
                Ok(())
            }
            Command::StartWave => {
                self.accepting()?;
                let world = self.world.as_mut().ok_or(DeclineReason::InvalidState)?;
                let status = world
                    .system::<WaveSystem>()
                    .map(WaveSystem::status)
                    .ok_or(DeclineReason::InvalidState)?;
                match status {
                    WaveStatus::Spawning | WaveStatus::Clearing => {
                        return Err(DeclineReason::WaveInProgress)
                    }
                    WaveStatus::Prepared => {}
                    WaveStatus::Idle | WaveStatus::Cleared => {
                        return Err(DeclineReason::NoWavePrepared)
                    }
                }
                let started = world
                    .with_system::<WaveSystem, _>(|waves, state| waves.start_wave(state))
                    .unwrap_or(false);
                if !started {
                    return Err(DeclineReason::NoWavePrepared);
                }
                self.auto_start = None;
                if self.state != GameState::Playing {
                    self.transition(GameState::Playing);
                }
                Ok(())
            }
            Command::PlaceTower { kind, node } => {
                self.accepting()?;
                let world = self.world.as_mut().ok_or(DeclineReason::InvalidState)?;
                let cost = world
                    .system::<TowerSystem>()
                    .ok_or(DeclineReason::InvalidState)?
                    .quote_placement(kind, node, world.state())?;
                spend(world, cost)?;
                let built = world
                    .with_system::<TowerSystem, _>(|towers, state| towers.build(kind, node, state))
                    .flatten();
                if built.is_none() {
                    refund(world, cost);
                    return Err(DeclineReason::NodeOccupied);
                }
                Ok(())
            }
            Command::UpgradeTower { tower } => {
                self.accepting()?;
                let world = self.world.as_mut().ok_or(DeclineReason::InvalidState)?;
                let cost = world
                    .system::<TowerSystem>()
                    .ok_or(DeclineReason::InvalidState)?
                    .quote_upgrade(tower, world.state())?;
                spend(world, cost)?;
                let upgraded = world
                    .with_system::<TowerSystem, _>(|towers, state| towers.upgrade(tower, state))
                    .flatten();
                if upgraded.is_none() {
                    refund(world, cost);
                    return Err(DeclineReason::TierMaxed);
                }
                Ok(())
            }
            Command::SellTower { tower } => {
                self.accepting()?;
                let world = self.world.as_mut().ok_or(DeclineReason::InvalidState)?;
                let _ = world
                    .system::<TowerSystem>()
                    .ok_or(DeclineReason::InvalidState)?
                    .quote_sale(tower, world.state())?;
                let value = world
                    .with_system::<TowerSystem, _>(|towers, state| towers.sell(tower, state))
                    .flatten()
                    .ok_or(DeclineReason::UnknownTower)?;
                refund(world, value);
                Ok(())
            }
        }
    }

    fn accepting(&self) -> Result<(), DeclineReason> {
        match self.state {
            GameState::Preparing | GameState::Playing | GameState::WaveComplete => Ok(()),
            GameState::Menu | GameState::Paused | GameState::GameOver | GameState::Victory => {
                Err(DeclineReason::InvalidState)
            }
        }
    }

    /// Advances the session by one rendered frame of `dt` seconds.
    ///
    /// The frame is capped at [`MAX_FRAME_DT`] and scaled by the game speed.
    /// Nothing happens in the menu, while paused or after the game ended.
    pub fn update(&mut self, dt: f32) {
        if self.state == GameState::WaveComplete {
            self.transition(GameState::Playing);
        }
        if !matches!(self.state, GameState::Playing | GameState::Preparing) {
            self.collect();
            return;
        }
        let frame = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        let scaled = frame * self.game_speed;
        let Some(world) = self.world.as_mut() else {
            return;
        };
        world.update(scaled);

        if world.state().station().is_destroyed() {
            self.finish(OutcomeKind::Defeat);
        } else if self.wave_status() == Some(WaveStatus::Cleared) {
            self.complete_wave();
        } else {
            self.tick_auto_start(scaled);
        }
        self.collect();
    }

    fn wave_status(&self) -> Option<WaveStatus> {
        self.world
            .as_ref()
            .and_then(|world| world.system::<WaveSystem>())
            .map(WaveSystem::status)
    }

    fn current_wave(&self) -> u32 {
        self.world
            .as_ref()
            .and_then(|world| world.system::<WaveSystem>())
            .map_or(0, WaveSystem::wave)
    }

    fn complete_wave(&mut self) {
        let wave = self.current_wave();
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let bonus = world.state().catalog().economy().wave_bonus(wave);
        let final_wave = world.state().catalog().waves().final_wave;
        let _ = world.with_system::<EconomySystem, _>(|economy, state| {
            economy.add_salvage(bonus, state);
        });
        world.state_mut().emit(Event::WaveComplete { wave, bonus });
        self.waves_cleared += 1;
        info!(wave, bonus, "wave_cleared");

        if wave >= final_wave {
            self.finish(OutcomeKind::Victory);
            return;
        }
        self.transition(GameState::WaveComplete);
        if let Some(world) = self.world.as_mut() {
            let _ = world
                .with_system::<WaveSystem, _>(|waves, state| waves.prepare_wave(wave + 1, state));
        }
        self.auto_start = self.config.auto_start_delay;
    }

    fn tick_auto_start(&mut self, dt: f32) {
        if self.wave_status() != Some(WaveStatus::Prepared) {
            return;
        }
        let Some(remaining) = self.auto_start.as_mut() else {
            return;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            debug!(wave = self.current_wave(), "wave_auto_started");
            let _ = self.apply(&Command::StartWave);
        }
    }

    fn finish(&mut self, kind: OutcomeKind) {
        let wave = self.current_wave();
        let (to, event) = match kind {
            OutcomeKind::Defeat => (GameState::GameOver, Event::GameOver { wave }),
            OutcomeKind::Victory => (GameState::Victory, Event::Victory { wave }),
        };
        if let Some(world) = self.world.as_mut() {
            world.state_mut().emit(event);
        }
        self.transition(to);

        let stats = self.stats();
        let outcome = Outcome {
            kind,
            seed: self.config.seed,
            wave,
            kills: stats.kills,
            salvage_earned: stats.salvage_earned,
            towers_built: stats.towers_built,
            elapsed: self.world.as_ref().map_or(0.0, |world| world.state().elapsed()),
        };
        info!(?kind, wave, kills = stats.kills, "session_finished");
        self.store.save(&outcome);
    }

    fn transition(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        info!(?from, ?to, "game_state_changed");
        if let Some(world) = self.world.as_mut() {
            world.state_mut().emit(Event::GameStateChanged { from, to });
        }
    }

    fn collect(&mut self) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        for event in world.drain_events() {
            self.digest.record(&format!("{event:?}"));
            self.events.push(event);
        }
    }

    /// Events produced since the last call, in emission order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Running totals of the current game.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        let Some(world) = self.world.as_ref() else {
            return SessionStats::default();
        };
        SessionStats {
            kills: world.system::<CombatSystem>().map_or(0, CombatSystem::kills),
            salvage_earned: world.system::<EconomySystem>().map_or(0, EconomySystem::earned),
            towers_built: world.system::<TowerSystem>().map_or(0, TowerSystem::towers_built),
            waves_cleared: self.waves_cleared,
        }
    }

    /// Read-only view of the session for the HUD and the autopilot.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let catalog = &self.config.catalog;
        let mut snapshot = GameSnapshot {
            state: self.state,
            wave: 0,
            final_wave: catalog.waves().final_wave,
            wave_status: WaveStatus::Idle,
            salvage: 0,
            station_health: catalog.station().health,
            station_max_health: catalog.station().health,
            game_speed: self.game_speed,
            elapsed: 0.0,
            towers: Vec::new(),
            enemies: Vec::new(),
            build_nodes: Vec::new(),
            path: Vec::new(),
            offers: catalog.offers(),
        };
        let Some(world) = self.world.as_ref() else {
            return snapshot;
        };
        let state = world.state();
        if let Some(waves) = world.system::<WaveSystem>() {
            snapshot.wave = waves.wave();
            snapshot.wave_status = waves.status();
        }
        if let Some(economy) = world.system::<EconomySystem>() {
            snapshot.salvage = economy.balance();
        }
        if let Some(towers) = world.system::<TowerSystem>() {
            snapshot.build_nodes = towers.node_snapshots();
        }
        snapshot.station_health = state.station().health();
        snapshot.station_max_health = state.station().max_health();
        snapshot.elapsed = state.elapsed();
        snapshot.towers = query::towers(state);
        snapshot.enemies = query::enemies(state);
        snapshot.path = state.path().points().to_vec();
        snapshot
    }
}

fn clamp_speed(speed: f32) -> f32 {
    speed.clamp(0.0, MAX_GAME_SPEED)
}

fn spend(world: &mut World, cost: u32) -> Result<(), DeclineReason> {
    world
        .with_system::<EconomySystem, _>(|economy, state| {
            if economy.spend_salvage(cost, state) {
                Ok(())
            } else {
                Err(DeclineReason::InsufficientSalvage {
                    required: cost,
                    available: economy.balance(),
                })
            }
        })
        .unwrap_or(Err(DeclineReason::InvalidState))
}

fn refund(world: &mut World, amount: u32) {
    let _ = world
        .with_system::<EconomySystem, _>(|economy, state| economy.refund_salvage(amount, state));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_clamped_to_the_supported_range() {
        assert_eq!(clamp_speed(-1.0), 0.0);
        assert_eq!(clamp_speed(1.5), 1.5);
        assert_eq!(clamp_speed(9.0), MAX_GAME_SPEED);
    }

    #[test]
    fn menu_sessions_ignore_frames_and_commands() {
        let mut engine = GameEngine::new(SessionConfig::new(1));
        engine.update(0.016);
        assert_eq!(engine.state(), GameState::Menu);
        assert_eq!(
            engine.submit(Command::StartWave),
            CommandOutcome::Declined(DeclineReason::InvalidState)
        );
        assert!(engine.drain_events().is_empty());
        assert_eq!(engine.snapshot().salvage, 0);
    }
}
