#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower construction, upgrades and sales on the map's build nodes.
//!
//! Every mutation is split into a quote, which validates the request and
//! prices it without touching the world, and the mutation itself. The
//! session charges or refunds salvage between the two.

use std::any::Any;

use space_salvagers_catalog::{MapLayout, PathGeometry};
use space_salvagers_core::{
    BuildNodeId, BuildNodeSnapshot, DeclineReason, EntityId, Event, TowerKind, Vec2,
};
use space_salvagers_world::{components::TowerProfile, Group, System, WorldState};
use tracing::info;

/// Schedule slot of the tower system.
pub const PRIORITY: i32 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
struct BuildNode {
    id: BuildNodeId,
    position: Vec2,
    path_distance: f32,
    occupant: Option<EntityId>,
}

/// Manages build nodes and the towers standing on them.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSystem {
    nodes: Vec<BuildNode>,
    built: u32,
}

impl TowerSystem {
    /// Creates the node table for a map, numbering build nodes before special nodes.
    #[must_use]
    pub fn new(layout: &MapLayout, path: &PathGeometry) -> Self {
        let nodes = layout
            .placement_nodes()
            .enumerate()
            .map(|(index, position)| BuildNode {
                id: BuildNodeId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                position,
                path_distance: path.distance_to(position),
                occupant: None,
            })
            .collect();
        Self { nodes, built: 0 }
    }

    /// Creates the node table for the map and path a world was built with.
    #[must_use]
    pub fn for_world(state: &WorldState) -> Self {
        Self::new(state.catalog().map(), state.path())
    }

    /// Towers constructed since the system was created.
    #[must_use]
    pub const fn towers_built(&self) -> u32 {
        self.built
    }

    /// Tower standing on `node`, if any.
    #[must_use]
    pub fn occupant(&self, node: BuildNodeId) -> Option<EntityId> {
        self.node(node).and_then(|node| node.occupant)
    }

    /// Views of every build node in identifier order.
    #[must_use]
    pub fn node_snapshots(&self) -> Vec<BuildNodeSnapshot> {
        self.nodes
            .iter()
            .map(|node| BuildNodeSnapshot {
                id: node.id,
                position: node.position,
                occupied: node.occupant.is_some(),
                path_distance: node.path_distance,
            })
            .collect()
    }

    fn node(&self, id: BuildNodeId) -> Option<&BuildNode> {
        self.nodes.get(id.get() as usize)
    }

    /// Price of building `kind` on `node`.
    ///
    /// # Panics
    ///
    /// Panics if the catalog lacks `kind`.
    pub fn quote_placement(
        &self,
        kind: TowerKind,
        node: BuildNodeId,
        state: &WorldState,
    ) -> Result<u32, DeclineReason> {
        let node = self.node(node).ok_or(DeclineReason::UnknownNode)?;
        if node.occupant.is_some() {
            return Err(DeclineReason::NodeOccupied);
        }
        Ok(state.catalog().tower_spec(kind).cost)
    }

    /// Builds a tier one tower; `None` when the node is unknown or occupied.
    pub fn build(
        &mut self,
        kind: TowerKind,
        node: BuildNodeId,
        state: &mut WorldState,
    ) -> Option<EntityId> {
        let slot = self
            .nodes
            .get_mut(node.get() as usize)
            .filter(|slot| slot.occupant.is_none())?;
        let tower = state.spawn_tower(kind, node, slot.position);
        slot.occupant = Some(tower);
        self.built += 1;
        let cost = state.catalog().tower_spec(kind).cost;
        info!(?kind, node = node.get(), cost, "tower_built");
        state.emit(Event::TowerBuilt {
            tower,
            kind,
            node,
            cost,
        });
        Some(tower)
    }

    /// Price of raising `tower` one tier.
    pub fn quote_upgrade(&self, tower: EntityId, state: &WorldState) -> Result<u32, DeclineReason> {
        let profile = state
            .component::<TowerProfile>(tower)
            .ok_or(DeclineReason::UnknownTower)?;
        let spec = state
            .catalog()
            .tower(profile.kind)
            .ok_or(DeclineReason::UnknownTower)?;
        spec.upgrade_cost(profile.tier)
            .ok_or(DeclineReason::TierMaxed)
    }

    /// Raises `tower` one tier and resynchronises its stats.
    ///
    /// Returns the tier reached, or `None` when the tower is unknown or maxed.
    pub fn upgrade(&mut self, tower: EntityId, state: &mut WorldState) -> Option<u8> {
        let cost = self.quote_upgrade(tower, state).ok()?;
        let profile = state.component_mut::<TowerProfile>(tower)?;
        profile.tier += 1;
        profile.invested = profile.invested.saturating_add(cost);
        let tier = profile.tier;
        let _ = state.resync_tower(tower);
        info!(tower = tower.index(), tier, cost, "tower_upgraded");
        state.emit(Event::TowerUpgraded { tower, tier, cost });
        Some(tier)
    }

    /// Salvage refunded when `tower` is sold.
    pub fn quote_sale(&self, tower: EntityId, state: &WorldState) -> Result<u32, DeclineReason> {
        let profile = state
            .component::<TowerProfile>(tower)
            .ok_or(DeclineReason::UnknownTower)?;
        Ok(state.catalog().economy().refund(profile.invested))
    }

    /// Removes `tower` and frees its node, returning the refund owed.
    pub fn sell(&mut self, tower: EntityId, state: &mut WorldState) -> Option<u32> {
        let refund = self.quote_sale(tower, state).ok()?;
        let _ = state.remove_entity(tower)?;
        self.release(tower);
        info!(tower = tower.index(), refund, "tower_sold");
        state.emit(Event::TowerSold { tower, refund });
        Some(refund)
    }

    /// Returns every node to the unoccupied state.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.occupant = None;
        }
        self.built = 0;
    }

    fn release(&mut self, tower: EntityId) {
        for node in &mut self.nodes {
            if node.occupant == Some(tower) {
                node.occupant = None;
            }
        }
    }
}

impl System for TowerSystem {
    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn update(&mut self, _dt: f32, _active: &[EntityId], _state: &mut WorldState) {}

    fn on_entity_removed(&mut self, entity: EntityId, groups: &[Group], _state: &WorldState) {
        if groups.contains(&Group::Towers) {
            self.release(entity);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
