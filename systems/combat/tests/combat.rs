use space_salvagers_catalog::{Catalog, EnemySpec, Resistances};
use space_salvagers_core::{
    BuildNodeId, DamageType, EnemyKind, EntityId, Event, ImpactKind, StatusKind, TowerKind, Vec2,
};
use space_salvagers_system_combat::CombatSystem;
use space_salvagers_system_economy::EconomySystem;
use space_salvagers_world::{
    components::{Health, StatusEffects, Transform},
    EffectRequest, Group, Message, Payload, World,
};

const FRAME: f32 = 1.0 / 60.0;

fn world(catalog: Catalog) -> World {
    let mut world = World::new(catalog, 21);
    world.add_system(CombatSystem::new());
    world.add_system(EconomySystem::new(0));
    world
}

fn spawn(world: &mut World, kind: EnemyKind, progress: f32) -> EntityId {
    world
        .state_mut()
        .spawn_enemy(kind, 1, progress)
        .expect("enemy in catalog")
}

fn hit(world: &mut World, target: EntityId, payload: Payload) {
    world.state_mut().mailbox_mut().post(Message::Hit {
        target,
        source: None,
        payload,
        impact: None,
    });
}

fn health(world: &World, enemy: EntityId) -> Option<f32> {
    world.state().component::<Health>(enemy).map(Health::current)
}

fn balance(world: &World) -> u32 {
    world.system::<EconomySystem>().expect("economy").balance()
}

fn kills(world: &World) -> u32 {
    world.system::<CombatSystem>().expect("combat").kills()
}

#[test]
fn three_hits_of_fifteen_kill_a_forty_point_enemy_once() {
    let fragile = EnemySpec {
        kind: EnemyKind::Scout,
        health: 40.0,
        speed: 10.0,
        armor: 0.0,
        resistances: Resistances::default(),
        shield: 0.0,
        salvage: 7,
        core_damage: 1,
        flying: false,
        ability: None,
    };
    let mut world = world(Catalog::builtin().with_enemy(fragile));
    let enemy = spawn(&mut world, EnemyKind::Scout, 0.0);
    let blow = Payload::damage(15.0, DamageType::Kinetic);
    let mut events = Vec::new();

    hit(&mut world, enemy, blow);
    world.update(FRAME);
    assert_eq!(health(&world, enemy), Some(25.0));
    hit(&mut world, enemy, blow);
    world.update(FRAME);
    assert_eq!(health(&world, enemy), Some(10.0));
    assert_eq!(kills(&world), 0);
    events.extend(world.drain_events());

    hit(&mut world, enemy, blow);
    world.update(FRAME);
    assert!(world.state().entity(enemy).is_none());
    hit(&mut world, enemy, blow);
    world.update(FRAME);
    events.extend(world.drain_events());

    let killed = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { salvage: 7, .. }))
        .count();
    assert_eq!(killed, 1);
    assert_eq!(kills(&world), 1);
    assert_eq!(balance(&world), 7, "salvage must be awarded exactly once");
}

#[test]
fn breaching_enemies_damage_the_station() {
    let mut world = world(Catalog::builtin());
    let enemy = spawn(&mut world, EnemyKind::Brute, 0.9999);

    world.update(1.0);
    assert!(!world.state().is_active(enemy));
    world.update(FRAME);

    assert!(world.state().entity(enemy).is_none());
    assert_eq!(world.state().station().health(), 95);
    assert_eq!(world.system::<CombatSystem>().map(CombatSystem::breaches), Some(1));
    let events = world.drain_events();
    assert!(events.contains(&Event::EnemyReachedCore {
        enemy,
        kind: EnemyKind::Brute,
        damage: 5,
    }));
    assert!(events.contains(&Event::StationDamaged {
        health: 95,
        damage: 5,
    }));
}

#[test]
fn splitters_leave_children_behind() {
    let mut world = world(Catalog::builtin());
    let splitter = spawn(&mut world, EnemyKind::Splitter, 0.2);
    hit(&mut world, splitter, Payload::damage(1_000.0, DamageType::Explosive));
    world.update(FRAME);

    let survivors = world.state().entities_in(Group::Enemies);
    assert_eq!(survivors.len(), 2);
    assert!(!survivors.contains(&splitter));
    let spawned = world
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, Event::EnemySpawned { kind: EnemyKind::Scout, .. }))
        .count();
    assert_eq!(spawned, 2);
}

#[test]
fn splash_reaches_neighbours_through_armor() {
    let mut world = world(Catalog::builtin());
    let primary = spawn(&mut world, EnemyKind::Raider, 0.0);
    let neighbour = spawn(&mut world, EnemyKind::Raider, 0.0);
    hit(
        &mut world,
        primary,
        Payload {
            splash_radius: 40.0,
            ..Payload::damage(10.0, DamageType::Explosive)
        },
    );
    world.update(FRAME);

    assert_eq!(health(&world, primary), Some(51.0));
    assert_eq!(health(&world, neighbour), Some(51.0));
}

#[test]
fn chains_jump_between_enemies() {
    let mut world = world(Catalog::builtin());
    let enemies: Vec<EntityId> = (0..3).map(|_| spawn(&mut world, EnemyKind::Scout, 0.0)).collect();
    hit(
        &mut world,
        enemies[0],
        Payload {
            chains: 2,
            chain_radius: 50.0,
            ..Payload::damage(10.0, DamageType::Energy)
        },
    );
    world.update(FRAME);

    for enemy in &enemies {
        assert_eq!(health(&world, *enemy), Some(20.0));
    }
    let arcs = world
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, Event::Impact { kind: ImpactKind::Chain, .. }))
        .count();
    assert_eq!(arcs, 2);
}

#[test]
fn ground_pulses_stun_walkers_but_not_flyers() {
    let mut world = world(Catalog::builtin());
    let walker = spawn(&mut world, EnemyKind::Scout, 0.0);
    let flyer = spawn(&mut world, EnemyKind::Drone, 0.0);
    let start = world.state().path().start();
    world.state_mut().mailbox_mut().post(Message::AreaPulse {
        source: EntityId::new(500, 0),
        center: start,
        radius: 50.0,
        payload: Payload {
            can_hit_air: false,
            effect: Some(EffectRequest {
                kind: StatusKind::Stun,
                strength: 1.0,
                duration: 1.0,
                holder: None,
            }),
            ..Payload::damage(1.0, DamageType::Kinetic)
        },
    });
    world.update(FRAME);

    let stunned = |enemy| {
        world
            .state()
            .component::<StatusEffects>(enemy)
            .is_some_and(StatusEffects::is_stunned)
    };
    assert!(stunned(walker));
    assert!(!stunned(flyer));
}

#[test]
fn cannon_shoots_down_a_passing_scout() {
    let mut world = world(Catalog::builtin());
    let _ = world
        .state_mut()
        .spawn_tower(TowerKind::Cannon, BuildNodeId::new(0), Vec2::new(400.0, 130.0));
    let _ = spawn(&mut world, EnemyKind::Scout, 0.0);

    let mut events = Vec::new();
    for _ in 0..600 {
        world.update(FRAME);
        events.extend(world.drain_events());
    }

    assert_eq!(kills(&world), 1);
    assert_eq!(balance(&world), 5);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
    let state = world.state();
    assert!(state.entities_in(Group::Projectiles).is_empty());
    assert_eq!(state.pool().stats().outstanding(), 0);
    assert!(state.pool().stats().returned > 0);
}

#[test]
fn cryo_slow_holds_without_lapses_or_extra_stacks() {
    let anchored = EnemySpec {
        kind: EnemyKind::Brute,
        health: 10_000.0,
        speed: 0.0,
        armor: 0.0,
        resistances: Resistances::default(),
        shield: 0.0,
        salvage: 1,
        core_damage: 1,
        flying: false,
        ability: None,
    };
    let mut world = world(Catalog::builtin().with_enemy(anchored));
    let brute = spawn(&mut world, EnemyKind::Brute, 0.0);
    let position = world
        .state()
        .component::<Transform>(brute)
        .expect("transform")
        .position;
    let _ = world
        .state_mut()
        .spawn_tower(TowerKind::CryoField, BuildNodeId::new(0), position);
    let start = health(&world, brute).expect("alive");

    let mut slowed_since = None;
    let mut lapses = Vec::new();
    for frame in 0..600 {
        world.update(FRAME);
        let status = world
            .state()
            .component::<StatusEffects>(brute)
            .expect("status");
        match status.effect(StatusKind::Slow) {
            Some(slow) => {
                assert_eq!(slow.stacks, 1, "frame {frame}");
                let _ = slowed_since.get_or_insert(frame);
            }
            None if slowed_since.is_some() => lapses.push(frame),
            None => {}
        }
    }

    assert!(slowed_since.is_some_and(|frame| frame < 5));
    assert_eq!(lapses, Vec::<usize>::new());
    assert!(health(&world, brute).expect("alive") < start);
}
