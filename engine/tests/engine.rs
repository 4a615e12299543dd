use space_salvagers_catalog::{Catalog, StationTuning};
use space_salvagers_core::{
    BuildNodeId, Command, CommandOutcome, DeclineReason, Event, GameState, OutcomeKind, TowerKind,
    WaveStatus,
};
use space_salvagers_engine::{GameEngine, SessionConfig, MAX_FRAME_DT};
use space_salvagers_system_autopilot::{Autopilot, BotConfig, Difficulty, Strategy};

fn started(config: SessionConfig) -> GameEngine {
    let mut engine = GameEngine::new(config);
    engine.start_new_game();
    engine
}

fn hardened(seed: u64) -> SessionConfig {
    let catalog = Catalog::builtin().with_station(StationTuning { health: 1_000_000 });
    SessionConfig {
        game_speed: 3.0,
        ..SessionConfig::new(seed).with_catalog(catalog)
    }
}

fn run_until(
    engine: &mut GameEngine,
    frames: u32,
    done: impl Fn(&GameEngine) -> bool,
) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..frames {
        engine.update(MAX_FRAME_DT);
        events.extend(engine.drain_events());
        if done(engine) {
            break;
        }
    }
    events
}

#[test]
fn second_placement_is_declined_when_salvage_runs_short() {
    let mut engine = started(SessionConfig::new(5));
    assert_eq!(engine.snapshot().salvage, 200);

    let first = engine.submit(Command::PlaceTower {
        kind: TowerKind::Cannon,
        node: BuildNodeId::new(0),
    });
    assert_eq!(first, CommandOutcome::Applied);
    assert_eq!(engine.snapshot().salvage, 100);

    let second = engine.submit(Command::PlaceTower {
        kind: TowerKind::MissileBattery,
        node: BuildNodeId::new(1),
    });
    assert_eq!(
        second,
        CommandOutcome::Declined(DeclineReason::InsufficientSalvage {
            required: 160,
            available: 100,
        })
    );
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.salvage, 100);
    assert_eq!(snapshot.towers.len(), 1);
    assert_eq!(snapshot.available_nodes().count(), snapshot.build_nodes.len() - 1);
}

#[test]
fn declined_commands_leave_the_session_untouched() {
    let mut engine = started(SessionConfig::new(5));
    let _ = engine.submit(Command::PlaceTower {
        kind: TowerKind::Cannon,
        node: BuildNodeId::new(2),
    });
    let _ = engine.drain_events();
    let before = engine.snapshot();

    let occupied = engine.submit(Command::PlaceTower {
        kind: TowerKind::Cannon,
        node: BuildNodeId::new(2),
    });
    assert_eq!(occupied, CommandOutcome::Declined(DeclineReason::NodeOccupied));
    let unknown = engine.submit(Command::PlaceTower {
        kind: TowerKind::Cannon,
        node: BuildNodeId::new(900),
    });
    assert_eq!(unknown, CommandOutcome::Declined(DeclineReason::UnknownNode));
    let ghost = engine.submit(Command::SellTower {
        tower: space_salvagers_core::EntityId::new(999, 0),
    });
    assert_eq!(ghost, CommandOutcome::Declined(DeclineReason::UnknownTower));

    assert_eq!(engine.snapshot(), before);
    assert!(engine.drain_events().is_empty());
}

#[test]
fn selling_refunds_part_of_the_investment() {
    let mut engine = started(SessionConfig::new(5));
    let _ = engine.submit(Command::PlaceTower {
        kind: TowerKind::Cannon,
        node: BuildNodeId::new(0),
    });
    let tower = engine.snapshot().towers[0].id;
    assert_eq!(engine.submit(Command::SellTower { tower }), CommandOutcome::Applied);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.salvage, 170);
    assert!(snapshot.towers.is_empty());
    assert_eq!(snapshot.available_nodes().count(), snapshot.build_nodes.len());
    assert_eq!(engine.stats().salvage_earned, 0);
}

#[test]
fn state_machine_follows_the_session_lifecycle() {
    let mut engine = GameEngine::new(SessionConfig::new(8));
    assert_eq!(engine.state(), GameState::Menu);
    engine.start_new_game();
    assert_eq!(engine.state(), GameState::Preparing);
    assert_eq!(engine.snapshot().wave_status, WaveStatus::Prepared);
    assert!(!engine.pause());

    assert_eq!(engine.submit(Command::StartWave), CommandOutcome::Applied);
    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(
        engine.submit(Command::StartWave),
        CommandOutcome::Declined(DeclineReason::WaveInProgress)
    );

    engine.update(MAX_FRAME_DT);
    assert!(engine.pause());
    let frozen = engine.snapshot().elapsed;
    engine.update(MAX_FRAME_DT);
    assert_eq!(engine.snapshot().elapsed, frozen);
    assert_eq!(
        engine.submit(Command::PlaceTower {
            kind: TowerKind::Cannon,
            node: BuildNodeId::new(0),
        }),
        CommandOutcome::Declined(DeclineReason::InvalidState)
    );
    assert!(engine.resume());
    engine.update(MAX_FRAME_DT);
    assert!(engine.snapshot().elapsed > frozen);

    let transitions: Vec<(GameState, GameState)> = engine
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            Event::GameStateChanged { from, to } => Some((from, to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            (GameState::Menu, GameState::Preparing),
            (GameState::Preparing, GameState::Playing),
            (GameState::Playing, GameState::Paused),
            (GameState::Paused, GameState::Playing),
        ]
    );
}

#[test]
fn frames_are_capped_and_scaled() {
    let mut engine = started(SessionConfig::new(8));
    let _ = engine.submit(Command::SetGameSpeed { speed: 2.0 });
    engine.update(1.0);
    let elapsed = engine.snapshot().elapsed;
    assert!((elapsed - f64::from(MAX_FRAME_DT * 2.0)).abs() < 1e-6);

    let _ = engine.submit(Command::SetGameSpeed { speed: 10.0 });
    assert_eq!(engine.game_speed(), 3.0);
    assert_eq!(
        engine.submit(Command::SetGameSpeed { speed: f32::NAN }),
        CommandOutcome::Declined(DeclineReason::InvalidState)
    );
}

#[test]
fn wave_bonus_is_credited_once_per_clear() {
    let mut engine = started(hardened(13));
    let mut events = Vec::new();
    for wave in 1..=5 {
        assert_eq!(
            engine.submit(Command::StartWave),
            CommandOutcome::Applied,
            "wave {wave} should start"
        );
        events.extend(run_until(&mut engine, 20_000, |engine| {
            engine.state() == GameState::WaveComplete
        }));
        assert_eq!(engine.state(), GameState::WaveComplete, "wave {wave} never cleared");
    }

    let fifth: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::WaveComplete { wave: 5, .. }))
        .collect();
    assert_eq!(fifth, vec![&Event::WaveComplete { wave: 5, bonus: 30 }]);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.salvage, 200 + 22 + 24 + 26 + 28 + 30);
    assert_eq!(snapshot.wave, 6);
    assert_eq!(snapshot.wave_status, WaveStatus::Prepared);
    assert_eq!(engine.stats().waves_cleared, 5);

    engine.update(MAX_FRAME_DT);
    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(engine.snapshot().salvage, snapshot.salvage);
}

#[test]
fn auto_start_launches_prepared_waves() {
    let mut engine = started(SessionConfig::new(3).with_auto_start(0.5));
    let _ = run_until(&mut engine, 60, |engine| engine.state() == GameState::Playing);
    assert_eq!(engine.state(), GameState::Playing);
    assert_eq!(engine.snapshot().wave_status, WaveStatus::Spawning);
}

#[test]
fn destroyed_station_ends_the_game_once() {
    let catalog = Catalog::builtin().with_station(StationTuning { health: 1 });
    let mut engine = started(SessionConfig {
        game_speed: 3.0,
        ..SessionConfig::new(4).with_catalog(catalog)
    });
    let _ = engine.submit(Command::StartWave);
    let events = run_until(&mut engine, 20_000, |engine| {
        engine.state() == GameState::GameOver
    });
    assert_eq!(engine.state(), GameState::GameOver);
    assert!(events.contains(&Event::GameOver { wave: 1 }));

    for _ in 0..10 {
        engine.update(MAX_FRAME_DT);
    }
    let outcomes = engine.store().outcomes();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].kind, OutcomeKind::Defeat);
    assert_eq!(outcomes[0].seed, 4);
    assert_eq!(
        engine.submit(Command::StartWave),
        CommandOutcome::Declined(DeclineReason::InvalidState)
    );
}

struct Replay {
    events: Vec<Event>,
    commands: Vec<Command>,
    event_fingerprint: u64,
    random_fingerprint: Option<u64>,
}

fn autoplay(seed: u64) -> Replay {
    let mut engine = started(SessionConfig::new(seed).with_auto_start(2.0));
    let mut autopilot = Autopilot::new(BotConfig {
        difficulty: Difficulty::Strategic,
        strategy: Strategy::Balanced,
        decision_interval: 0.5,
        seed,
    });
    let mut events = Vec::new();
    for _ in 0..4_000 {
        let snapshot = engine.snapshot();
        if let Some(command) = autopilot.decide(snapshot.elapsed, &snapshot) {
            let _ = engine.submit(command);
        }
        engine.update(MAX_FRAME_DT);
        events.extend(engine.drain_events());
    }
    Replay {
        events,
        commands: autopilot.log().commands().cloned().collect(),
        event_fingerprint: engine.event_fingerprint(),
        random_fingerprint: engine.random_fingerprint(),
    }
}

#[test]
fn side_by_side_sessions_replay_identically() {
    let first = autoplay(2024);
    let second = autoplay(2024);

    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::TowerBuilt { .. })));
    assert!(first
        .events
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. })));
    assert_eq!(first.commands, second.commands);
    assert_eq!(first.events, second.events);
    assert_eq!(first.event_fingerprint, second.event_fingerprint);
    assert_eq!(first.random_fingerprint, second.random_fingerprint);

    let other = autoplay(7);
    assert_ne!(first.event_fingerprint, other.event_fingerprint);
}
