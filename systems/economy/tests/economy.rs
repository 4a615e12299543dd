use space_salvagers_catalog::Catalog;
use space_salvagers_core::Event;
use space_salvagers_system_economy::EconomySystem;
use space_salvagers_world::{Message, World};

fn world(starting: u32) -> World {
    let mut world = World::new(Catalog::builtin(), 1);
    world.add_system(EconomySystem::new(starting));
    world
}

fn spend(world: &mut World, amount: u32) -> bool {
    world
        .with_system::<EconomySystem, _>(|economy, state| economy.spend_salvage(amount, state))
        .expect("economy registered")
}

fn balance(world: &World) -> u32 {
    world.system::<EconomySystem>().expect("economy").balance()
}

#[test]
fn overspending_is_declined_without_mutation() {
    let mut world = world(200);
    assert!(spend(&mut world, 100));
    assert!(!spend(&mut world, 160));
    assert_eq!(balance(&world), 100);
    assert_eq!(
        world.drain_events(),
        vec![Event::SalvageUpdated { balance: 100 }],
        "only the successful spend announces a balance",
    );
}

#[test]
fn spending_the_exact_balance_reaches_zero() {
    let mut world = world(120);
    assert!(spend(&mut world, 120));
    assert_eq!(balance(&world), 0);
    assert!(!spend(&mut world, 1));
    assert_eq!(balance(&world), 0);
}

#[test]
fn queued_rewards_are_credited_once_per_frame() {
    let mut world = world(0);
    world
        .state_mut()
        .mailbox_mut()
        .post(Message::Salvage { amount: 5 });
    world
        .state_mut()
        .mailbox_mut()
        .post(Message::Salvage { amount: 8 });

    world.update(0.016);
    assert_eq!(balance(&world), 13);
    assert_eq!(world.system::<EconomySystem>().map(EconomySystem::earned), Some(13));
    assert_eq!(world.drain_events(), vec![Event::SalvageUpdated { balance: 13 }]);

    world.update(0.016);
    assert_eq!(balance(&world), 13);
    assert!(world.drain_events().is_empty());
}

#[test]
fn refunds_restore_the_balance_without_counting_as_earnings() {
    let mut world = world(100);
    assert!(spend(&mut world, 80));
    let _ = world.drain_events();

    let _ = world.with_system::<EconomySystem, _>(|economy, state| {
        economy.refund_salvage(40, state);
    });
    let economy = world.system::<EconomySystem>().expect("economy");
    assert_eq!(economy.balance(), 60);
    assert_eq!(economy.earned(), 0);
    assert_eq!(economy.spent(), 80);
    assert_eq!(world.drain_events(), vec![Event::SalvageUpdated { balance: 60 }]);
}
