//! Entities and the generation-checked arena that owns them.

use space_salvagers_core::EntityId;

use crate::{
    components::{Component, ComponentData, ComponentKind},
    FrameContext,
};

#[derive(Clone, Debug, PartialEq)]
struct Slot {
    enabled: bool,
    component: Component,
}

/// Identity owning at most one component per [`ComponentKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    id: EntityId,
    active: bool,
    slots: [Option<Slot>; ComponentKind::COUNT],
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            active: true,
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Handle of the entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Reports whether the entity takes part in updates and queries.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the entity as logically dead; it is skipped from now on.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Attaches a component, replacing and tearing down any previous one of the same kind.
    ///
    /// Returns the replaced component.
    pub fn attach<C: ComponentData>(&mut self, component: C) -> Option<Component> {
        self.attach_component(component.into_component())
    }

    /// Untyped form of [`Entity::attach`].
    pub fn attach_component(&mut self, mut component: Component) -> Option<Component> {
        component.initialize(self.id);
        let index = component.kind().index();
        let previous = self.slots[index].replace(Slot {
            enabled: true,
            component,
        });
        previous.map(|mut slot| {
            slot.component.teardown();
            slot.component
        })
    }

    /// Detaches and tears down the component of `kind`; `None` when absent.
    pub fn detach(&mut self, kind: ComponentKind) -> Option<Component> {
        self.slots[kind.index()].take().map(|mut slot| {
            slot.component.teardown();
            slot.component
        })
    }

    /// Reports whether a component of `kind` is attached.
    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Typed component lookup.
    #[must_use]
    pub fn get<C: ComponentData>(&self) -> Option<&C> {
        self.slots[C::KIND.index()]
            .as_ref()
            .and_then(|slot| C::peek(&slot.component))
    }

    /// Typed mutable component lookup.
    #[must_use]
    pub fn get_mut<C: ComponentData>(&mut self) -> Option<&mut C> {
        self.slots[C::KIND.index()]
            .as_mut()
            .and_then(|slot| C::peek_mut(&mut slot.component))
    }

    /// Untyped component lookup.
    #[must_use]
    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.slots[kind.index()].as_ref().map(|slot| &slot.component)
    }

    /// Enables or disables the per-frame update of a component.
    ///
    /// Returns `false` when no component of `kind` is attached.
    pub fn set_enabled(&mut self, kind: ComponentKind, enabled: bool) -> bool {
        match self.slots[kind.index()].as_mut() {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Reports whether the component of `kind` is attached and enabled.
    #[must_use]
    pub fn is_enabled(&self, kind: ComponentKind) -> bool {
        self.slots[kind.index()]
            .as_ref()
            .is_some_and(|slot| slot.enabled)
    }

    /// Kinds currently attached, in update order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        ComponentKind::ALL
            .into_iter()
            .filter(move |kind| self.has(*kind))
    }

    /// Runs every enabled component's update in kind order.
    ///
    /// Each component is lifted out of its slot while it runs so that it can
    /// read and adjust its siblings. Updating stops once the entity deactivates.
    pub(crate) fn update_components(&mut self, ctx: &mut FrameContext<'_>) {
        for kind in ComponentKind::ALL {
            if !self.active {
                return;
            }
            let index = kind.index();
            let Some(mut slot) = self.slots[index].take() else {
                continue;
            };
            if slot.enabled {
                slot.component.update(self, ctx);
            }
            if self.slots[index].is_none() {
                self.slots[index] = Some(slot);
            }
        }
    }

    pub(crate) fn teardown_all(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.component.teardown();
        }
    }

    pub(crate) fn reassign(&mut self, id: EntityId) {
        self.id = id;
        self.active = true;
    }
}

#[derive(Clone, Debug)]
struct ArenaSlot {
    generation: u32,
    entity: Option<Entity>,
}

/// Generation-checked storage of entities.
///
/// Freed slots are reused with a bumped generation, so stale handles resolve
/// to nothing instead of aliasing a newer entity.
#[derive(Clone, Debug, Default)]
pub struct EntityArena {
    slots: Vec<ArenaSlot>,
    free: Vec<u32>,
    live: usize,
}

impl EntityArena {
    /// Stores a fresh entity and returns its handle.
    pub fn create(&mut self) -> EntityId {
        self.insert_with(Entity::new)
    }

    /// Stores a recycled entity under a new handle, keeping its components.
    pub fn reinsert(&mut self, mut entity: Entity) -> EntityId {
        self.insert_with(move |id| {
            entity.reassign(id);
            entity
        })
    }

    fn insert_with(&mut self, build: impl FnOnce(EntityId) -> Entity) -> EntityId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let id = EntityId::new(index, slot.generation);
            slot.entity = Some(build(id));
            return id;
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        let id = EntityId::new(index, 0);
        self.slots.push(ArenaSlot {
            generation: 0,
            entity: Some(build(id)),
        });
        id
    }

    /// Removes the entity, invalidating its handle.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        Some(entity)
    }

    /// Resolves a handle.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entity.as_ref())
    }

    /// Resolves a handle mutably.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entity.as_mut())
    }

    /// Reports whether the handle resolves.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Number of stored entities.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Reports whether the arena is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Every stored entity in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().filter_map(|slot| slot.entity.as_ref())
    }

    /// Handles of every active entity in slot order.
    #[must_use]
    pub fn active_ids(&self) -> Vec<EntityId> {
        self.iter()
            .filter(|entity| entity.is_active())
            .map(Entity::id)
            .collect()
    }
}
