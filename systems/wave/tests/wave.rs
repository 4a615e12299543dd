use space_salvagers_catalog::Catalog;
use space_salvagers_core::{EnemyKind, Event, WaveStatus};
use space_salvagers_system_wave::WaveSystem;
use space_salvagers_world::{Group, World};

fn world_with_waves(seed: u64) -> World {
    let mut world = World::new(Catalog::builtin(), seed);
    world.add_system(WaveSystem::new());
    world
}

fn prepare(world: &mut World, wave: u32) -> bool {
    world
        .with_system::<WaveSystem, _>(|waves, state| waves.prepare_wave(wave, state))
        .expect("wave system registered")
}

fn start(world: &mut World) -> bool {
    world
        .with_system::<WaveSystem, _>(|waves, state| waves.start_wave(state))
        .expect("wave system registered")
}

fn status(world: &World) -> WaveStatus {
    world.system::<WaveSystem>().expect("wave system").status()
}

#[test]
fn preparing_configures_without_spawning() {
    let mut world = world_with_waves(3);
    assert!(prepare(&mut world, 1));

    let waves = world.system::<WaveSystem>().expect("wave system");
    assert_eq!(waves.wave(), 1);
    assert_eq!(waves.plan().len(), 6);
    assert!(waves
        .plan()
        .iter()
        .all(|kind| matches!(kind, EnemyKind::Scout | EnemyKind::Raider)));
    assert_eq!(waves.status(), WaveStatus::Prepared);

    world.update(1.0);
    assert!(world.state().entities_in(Group::Enemies).is_empty());
}

#[test]
fn started_wave_spawns_on_the_interval() {
    let mut world = world_with_waves(3);
    assert!(prepare(&mut world, 1));
    assert!(start(&mut world));
    assert!(!start(&mut world), "a running wave cannot be restarted");
    assert!(!prepare(&mut world, 2), "no preparation while spawning");

    let events = world.drain_events();
    assert_eq!(
        events,
        vec![Event::WaveStarted {
            wave: 1,
            enemy_count: 6
        }]
    );

    world.update(0.1);
    assert_eq!(world.state().entities_in(Group::Enemies).len(), 1);
    world.update(1.0);
    assert_eq!(world.state().entities_in(Group::Enemies).len(), 1);
    world.update(0.2);
    assert_eq!(world.state().entities_in(Group::Enemies).len(), 2);
    assert_eq!(status(&world), WaveStatus::Spawning);
}

#[test]
fn exhausted_wave_clears_once_the_field_is_empty() {
    let mut world = world_with_waves(5);
    assert!(prepare(&mut world, 1));
    assert!(start(&mut world));
    for _ in 0..8 {
        world.update(1.2);
    }
    assert_eq!(status(&world), WaveStatus::Clearing);
    assert!(world
        .drain_events()
        .contains(&Event::WaveSpawnsExhausted { wave: 1 }));

    for enemy in world.state().entities_in(Group::Enemies) {
        assert!(world.state_mut().remove_entity(enemy).is_some());
    }
    world.update(0.1);
    assert_eq!(status(&world), WaveStatus::Cleared);
    assert!(prepare(&mut world, 2));
    assert_eq!(status(&world), WaveStatus::Prepared);
}

#[test]
fn boss_waves_end_with_the_boss() {
    let mut world = world_with_waves(9);
    assert!(prepare(&mut world, 10));
    let plan = world.system::<WaveSystem>().expect("wave system").plan().to_vec();
    assert_eq!(plan.len(), 6 + 9 * 2 + 1);
    assert_eq!(plan.last(), Some(&EnemyKind::Behemoth));
}

#[test]
fn composition_replays_from_the_seed() {
    let plan_for = |seed| {
        let mut world = world_with_waves(seed);
        assert!(prepare(&mut world, 8));
        world.system::<WaveSystem>().expect("wave system").plan().to_vec()
    };
    assert_eq!(plan_for(77), plan_for(77));
}
