use space_salvagers_catalog::Catalog;
use space_salvagers_core::{BuildNodeId, DeclineReason, EntityId, Event, TowerKind};
use space_salvagers_system_tower::TowerSystem;
use space_salvagers_world::{
    components::{Targeting, TowerProfile, Weapon},
    World,
};

fn world() -> World {
    let mut world = World::new(Catalog::builtin(), 11);
    let towers = TowerSystem::for_world(world.state());
    world.add_system(towers);
    world
}

fn build(world: &mut World, kind: TowerKind, node: u32) -> Option<EntityId> {
    world
        .with_system::<TowerSystem, _>(|towers, state| {
            towers.build(kind, BuildNodeId::new(node), state)
        })
        .expect("tower system registered")
}

fn system(world: &World) -> &TowerSystem {
    world.system::<TowerSystem>().expect("tower system registered")
}

#[test]
fn placement_quotes_validate_the_node() {
    let mut world = world();
    let towers = system(&world);
    assert_eq!(
        towers.quote_placement(TowerKind::Cannon, BuildNodeId::new(0), world.state()),
        Ok(100)
    );
    assert_eq!(
        towers.quote_placement(TowerKind::Cannon, BuildNodeId::new(999), world.state()),
        Err(DeclineReason::UnknownNode)
    );

    let tower = build(&mut world, TowerKind::Cannon, 0).expect("free node");
    assert_eq!(system(&world).occupant(BuildNodeId::new(0)), Some(tower));
    assert_eq!(
        system(&world).quote_placement(TowerKind::Laser, BuildNodeId::new(0), world.state()),
        Err(DeclineReason::NodeOccupied)
    );
    assert!(build(&mut world, TowerKind::Laser, 0).is_none());
    assert_eq!(system(&world).towers_built(), 1);
    assert!(matches!(
        world.drain_events().as_slice(),
        [Event::TowerBuilt { kind: TowerKind::Cannon, cost: 100, .. }]
    ));
}

#[test]
fn node_table_covers_build_and_special_nodes() {
    let world = world();
    let nodes = system(&world).node_snapshots();
    assert_eq!(nodes.len(), 15);
    assert!(nodes.iter().all(|node| !node.occupied));
    assert!(nodes.iter().all(|node| node.path_distance > 0.0));
}

#[test]
fn upgrades_step_one_tier_until_the_cap() {
    let mut world = world();
    let tower = build(&mut world, TowerKind::Cannon, 3).expect("free node");
    let base_damage = world
        .state()
        .component::<Weapon>(tower)
        .map(|weapon| weapon.stats().damage)
        .expect("weapon");
    assert!(!world
        .state()
        .component::<Targeting>(tower)
        .expect("targeting")
        .can_target_air());

    let mut reached = Vec::new();
    while let Some(tier) = world
        .with_system::<TowerSystem, _>(|towers, state| towers.upgrade(tower, state))
        .flatten()
    {
        reached.push(tier);
    }
    assert_eq!(reached, vec![2, 3, 4, 5]);
    assert_eq!(
        system(&world).quote_upgrade(tower, world.state()),
        Err(DeclineReason::TierMaxed)
    );

    let state = world.state();
    let damage = state
        .component::<Weapon>(tower)
        .map(|weapon| weapon.stats().damage)
        .expect("weapon");
    assert!(damage > base_damage, "tier stats must reach the weapon");
    assert!(state
        .component::<Targeting>(tower)
        .expect("targeting")
        .can_target_air());
    let spec = state.catalog().tower_spec(TowerKind::Cannon);
    assert_eq!(
        state.component::<TowerProfile>(tower).map(|profile| profile.invested),
        Some(spec.cumulative_cost(5))
    );
}

#[test]
fn selling_refunds_seventy_percent_and_frees_the_node() {
    let mut world = world();
    let tower = build(&mut world, TowerKind::Cannon, 2).expect("free node");
    let _ = world.with_system::<TowerSystem, _>(|towers, state| towers.upgrade(tower, state));

    let refund = world
        .with_system::<TowerSystem, _>(|towers, state| towers.sell(tower, state))
        .flatten();
    assert_eq!(refund, Some(112));
    assert!(world.state().entity(tower).is_none());
    assert_eq!(system(&world).occupant(BuildNodeId::new(2)), None);
    assert_eq!(
        system(&world).quote_sale(tower, world.state()),
        Err(DeclineReason::UnknownTower)
    );
}

#[test]
fn towers_removed_elsewhere_release_their_node() {
    let mut world = world();
    let tower = build(&mut world, TowerKind::Laser, 5).expect("free node");
    world.flush_lifecycle();
    assert!(world.state_mut().remove_entity(tower).is_some());
    world.update(0.016);
    assert_eq!(system(&world).occupant(BuildNodeId::new(5)), None);
}
