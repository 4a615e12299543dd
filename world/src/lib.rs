#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Entity-component-system runtime for the Space Salvagers simulation.
//!
//! A [`World`] owns the entity arena, named groups, the ordered system list
//! and the shared per-session resources. Every frame it snapshots the active
//! entities, runs the enabled systems in ascending priority, rebuilds the
//! enemy radar, and then runs the enabled components of every entity that is
//! still active. Systems always run before components.

pub mod components;
mod entity;
mod factory;
mod mailbox;
mod pool;
pub mod query;
mod radar;
mod station;

use std::{
    any::{type_name, Any},
    collections::{BTreeMap, BTreeSet},
};

use space_salvagers_catalog::{Catalog, PathGeometry};
use space_salvagers_core::{EntityId, Event, ProjectileKind};
use space_salvagers_rng::{RandomRegistry, SeededRandom};
use tracing::debug;

use components::{
    ComponentData, ComponentKind, EnemyProfile, Health, PathFollow, ProjectileBody, Transform,
};

pub use entity::{Entity, EntityArena};
pub use mailbox::{EffectRequest, Mailbox, Message, Payload};
pub use pool::{PoolStats, ProjectilePool, POOL_CAPACITY};
pub use radar::{EnemyRadar, RadarContact};
pub use station::Station;

/// Random stream used by weapons and hit resolution.
pub const COMBAT_STREAM: &str = "combat";

/// Random stream used by wave composition.
pub const WAVE_STREAM: &str = "waves";

/// Named entity categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Placed towers.
    Towers,
    /// Live enemies.
    Enemies,
    /// Projectiles in flight.
    Projectiles,
}

/// Shared state handed to components during their per-frame update.
pub struct FrameContext<'a> {
    /// Scaled frame duration in seconds.
    pub dt: f32,
    /// Live enemies at the start of the component pass.
    pub radar: &'a EnemyRadar,
    /// Combat random stream.
    pub rng: &'a mut SeededRandom,
    /// Queue for cross-entity requests.
    pub mailbox: &'a mut Mailbox,
    /// Enemy path.
    pub path: &'a PathGeometry,
}

/// Cross-entity logic run once per frame before the components.
pub trait System: Any {
    /// Ordering key; lower runs first, ties run in insertion order.
    fn priority(&self) -> i32;

    /// Runs the system for one frame over the active entity snapshot.
    fn update(&mut self, dt: f32, active: &[EntityId], state: &mut WorldState);

    /// Reacts to an entity being added.
    fn on_entity_added(&mut self, _entity: EntityId, _groups: &[Group], _state: &WorldState) {}

    /// Reacts to an entity being removed.
    fn on_entity_removed(&mut self, _entity: EntityId, _groups: &[Group], _state: &WorldState) {}

    /// Upcast used for typed lookups.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast used for typed lookups.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Lifecycle {
    Added(EntityId, Vec<Group>),
    Removed(EntityId, Vec<Group>),
}

/// Everything systems may read and mutate.
#[derive(Debug)]
pub struct WorldState {
    entities: EntityArena,
    groups: BTreeMap<Group, BTreeSet<EntityId>>,
    events: Vec<Event>,
    mailbox: Mailbox,
    random: RandomRegistry,
    catalog: Catalog,
    path: PathGeometry,
    pool: ProjectilePool,
    radar: EnemyRadar,
    station: Station,
    lifecycle: Vec<Lifecycle>,
    elapsed: f64,
    frame: u64,
}

impl WorldState {
    fn new(catalog: Catalog, seed: u64) -> Self {
        Self {
            entities: EntityArena::default(),
            groups: BTreeMap::new(),
            events: Vec::new(),
            mailbox: Mailbox::default(),
            random: RandomRegistry::new(seed),
            path: PathGeometry::new(catalog.map().path.clone()),
            station: Station::new(catalog.station().health),
            catalog,
            pool: ProjectilePool::default(),
            radar: EnemyRadar::default(),
            lifecycle: Vec::new(),
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Creates an empty active entity in the given groups.
    pub fn create_entity(&mut self, groups: &[Group]) -> EntityId {
        let id = self.entities.create();
        self.register(id, groups);
        id
    }

    fn register(&mut self, id: EntityId, groups: &[Group]) {
        for group in groups {
            let _ = self.groups.entry(*group).or_default().insert(id);
        }
        self.lifecycle.push(Lifecycle::Added(id, groups.to_vec()));
    }

    /// Adds a live entity to a group; `false` for stale handles.
    pub fn add_to_group(&mut self, id: EntityId, group: Group) -> bool {
        if !self.entities.contains(id) {
            return false;
        }
        self.groups.entry(group).or_default().insert(id)
    }

    /// Removes an entity, tearing down its components and purging it from every group.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(id)?;
        entity.teardown_all();
        let mut memberships = Vec::new();
        for (group, members) in &mut self.groups {
            if members.remove(&id) {
                memberships.push(*group);
            }
        }
        self.lifecycle.push(Lifecycle::Removed(id, memberships));
        Some(entity)
    }

    /// Resolves a handle.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Resolves a handle mutably.
    #[must_use]
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Reports whether the handle resolves to a stored entity.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    /// Reports whether the handle resolves to an active entity.
    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(Entity::is_active)
    }

    /// Typed component lookup through a handle.
    #[must_use]
    pub fn component<C: ComponentData>(&self, id: EntityId) -> Option<&C> {
        self.entities.get(id).and_then(Entity::get::<C>)
    }

    /// Typed mutable component lookup through a handle.
    #[must_use]
    pub fn component_mut<C: ComponentData>(&mut self, id: EntityId) -> Option<&mut C> {
        self.entities.get_mut(id).and_then(Entity::get_mut::<C>)
    }

    /// Reports whether the entity carries a component of `kind`.
    #[must_use]
    pub fn has_component(&self, id: EntityId, kind: ComponentKind) -> bool {
        self.entities.get(id).is_some_and(|entity| entity.has(kind))
    }

    /// Members of a group in handle order, skipping stale handles.
    #[must_use]
    pub fn entities_in(&self, group: Group) -> Vec<EntityId> {
        self.groups
            .get(&group)
            .map(|members| {
                members
                    .iter()
                    .copied()
                    .filter(|id| self.entities.contains(*id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of members of a group.
    #[must_use]
    pub fn group_len(&self, group: Group) -> usize {
        self.groups.get(&group).map_or(0, BTreeSet::len)
    }

    /// Handles of every active entity in arena order.
    #[must_use]
    pub fn active_entities(&self) -> Vec<EntityId> {
        self.entities.active_ids()
    }

    /// Number of stored entities, active or not.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Queues an event for collaborators.
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events emitted since the last drain.
    #[must_use]
    pub fn pending_events(&self) -> &[Event] {
        &self.events
    }

    /// Cross-entity request queue.
    #[must_use]
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Mutable cross-entity request queue.
    #[must_use]
    pub fn mailbox_mut(&mut self) -> &mut Mailbox {
        &mut self.mailbox
    }

    /// Random stream for `key`.
    pub fn random(&mut self, key: &str) -> &mut SeededRandom {
        self.random.generator(key)
    }

    /// Every random stream of the session.
    #[must_use]
    pub fn random_registry(&self) -> &RandomRegistry {
        &self.random
    }

    /// Tables the session runs with.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Enemy path.
    #[must_use]
    pub fn path(&self) -> &PathGeometry {
        &self.path
    }

    /// Defended station.
    #[must_use]
    pub fn station(&self) -> &Station {
        &self.station
    }

    /// Mutable defended station.
    #[must_use]
    pub fn station_mut(&mut self) -> &mut Station {
        &mut self.station
    }

    /// Enemy index built after the last system pass.
    #[must_use]
    pub fn radar(&self) -> &EnemyRadar {
        &self.radar
    }

    /// Projectile reuse cache.
    #[must_use]
    pub fn pool(&self) -> &ProjectilePool {
        &self.pool
    }

    /// Simulated seconds since the world was created.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Frames simulated since the world was created.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Checks out a projectile entity, recycling a pooled one when possible.
    pub fn acquire_projectile(&mut self, kind: ProjectileKind) -> EntityId {
        let id = match self.pool.checkout(kind) {
            Some(entity) => self.entities.reinsert(entity),
            None => self.entities.create(),
        };
        self.register(id, &[Group::Projectiles]);
        id
    }

    /// Removes a projectile and hands it back to the pool.
    ///
    /// Returns `false` for handles that are stale or not projectiles.
    pub fn release_projectile(&mut self, id: EntityId) -> bool {
        let Some(kind) = self.component::<ProjectileBody>(id).map(ProjectileBody::kind) else {
            return false;
        };
        match self.remove_entity(id) {
            Some(entity) => {
                let _ = self.pool.give_back(kind, entity);
                true
            }
            None => false,
        }
    }

    /// Rebuilds the enemy radar from the live members of the enemy group.
    pub fn refresh_radar(&mut self) {
        let Some(enemies) = self.groups.get(&Group::Enemies) else {
            self.radar.rebuild(std::iter::empty());
            return;
        };
        let entities = &self.entities;
        let contacts = enemies.iter().filter_map(|id| {
            let entity = entities.get(*id)?;
            if !entity.is_active() {
                return None;
            }
            let health = entity.get::<Health>()?;
            if health.is_dead() {
                return None;
            }
            let follow = entity.get::<PathFollow>();
            Some(RadarContact {
                id: *id,
                position: entity.get::<Transform>()?.position,
                velocity: follow.map_or(space_salvagers_core::Vec2::ZERO, PathFollow::velocity),
                health: health.current(),
                progress: follow.map_or(0.0, PathFollow::progress),
                flying: entity.get::<EnemyProfile>().is_some_and(|profile| profile.flying),
            })
        });
        self.radar.rebuild(contacts);
    }
}

struct SystemEntry {
    system: Box<dyn System>,
    name: &'static str,
    priority: i32,
    order: u64,
    enabled: bool,
}

/// Container of entities, systems and shared session resources.
pub struct World {
    systems: Vec<SystemEntry>,
    next_order: u64,
    state: WorldState,
}

impl std::fmt::Debug for World {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("World")
            .field(
                "systems",
                &self.systems.iter().map(|entry| entry.name).collect::<Vec<_>>(),
            )
            .field("state", &self.state)
            .finish()
    }
}

impl World {
    /// Creates an empty world for the catalog, seeding every random stream from `seed`.
    #[must_use]
    pub fn new(catalog: Catalog, seed: u64) -> Self {
        Self {
            systems: Vec::new(),
            next_order: 0,
            state: WorldState::new(catalog, seed),
        }
    }

    /// Registers a system and re-sorts the schedule.
    pub fn add_system<S: System>(&mut self, system: S) {
        let priority = system.priority();
        let name = type_name::<S>();
        debug!(system = name, priority, "system_added");
        self.systems.push(SystemEntry {
            system: Box::new(system),
            name,
            priority,
            order: self.next_order,
            enabled: true,
        });
        self.next_order += 1;
        self.systems.sort_by_key(|entry| (entry.priority, entry.order));
    }

    /// Removes every system of type `S`, returning how many were removed.
    pub fn remove_systems<S: System>(&mut self) -> usize {
        let before = self.systems.len();
        self.systems.retain(|entry| !entry.system.as_any().is::<S>());
        before - self.systems.len()
    }

    /// Enables or disables every system of type `S`; `false` when none is registered.
    pub fn set_system_enabled<S: System>(&mut self, enabled: bool) -> bool {
        let mut found = false;
        for entry in &mut self.systems {
            if entry.system.as_any().is::<S>() {
                entry.enabled = enabled;
                found = true;
            }
        }
        found
    }

    /// Names of the registered systems in execution order.
    #[must_use]
    pub fn schedule(&self) -> Vec<&'static str> {
        self.systems.iter().map(|entry| entry.name).collect()
    }

    /// First registered system of type `S`.
    #[must_use]
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems
            .iter()
            .find_map(|entry| entry.system.as_any().downcast_ref::<S>())
    }

    /// Runs `action` with the first system of type `S` and the shared state.
    pub fn with_system<S: System, R>(
        &mut self,
        action: impl FnOnce(&mut S, &mut WorldState) -> R,
    ) -> Option<R> {
        let Self { systems, state, .. } = self;
        let system = systems
            .iter_mut()
            .find_map(|entry| entry.system.as_any_mut().downcast_mut::<S>())?;
        Some(action(system, state))
    }

    /// Shared state.
    #[must_use]
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Mutable shared state.
    #[must_use]
    pub fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    /// Advances the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.flush_lifecycle();
        self.state.frame += 1;
        self.state.elapsed += f64::from(dt);

        let active = self.state.entities.active_ids();
        for entry in &mut self.systems {
            if entry.enabled {
                entry.system.update(dt, &active, &mut self.state);
            }
        }

        self.state.refresh_radar();

        let WorldState {
            entities,
            radar,
            random,
            mailbox,
            path,
            ..
        } = &mut self.state;
        let mut ctx = FrameContext {
            dt,
            radar,
            rng: random.generator(COMBAT_STREAM),
            mailbox,
            path,
        };
        for id in &active {
            if let Some(entity) = entities.get_mut(*id) {
                if entity.is_active() {
                    entity.update_components(&mut ctx);
                }
            }
        }

        self.flush_lifecycle();
    }

    /// Delivers pending entity added/removed notifications to the enabled systems.
    pub fn flush_lifecycle(&mut self) {
        let pending = std::mem::take(&mut self.state.lifecycle);
        for notification in pending {
            for entry in &mut self.systems {
                if !entry.enabled {
                    continue;
                }
                match &notification {
                    Lifecycle::Added(id, groups) => {
                        entry.system.on_entity_added(*id, groups, &self.state);
                    }
                    Lifecycle::Removed(id, groups) => {
                        entry.system.on_entity_removed(*id, groups, &self.state);
                    }
                }
            }
        }
    }

    /// Takes every event emitted since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.state.events)
    }
}
