//! Read-only per-frame index of live enemies.

use space_salvagers_core::{EntityId, Vec2};

/// What towers and projectiles can observe about one enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadarContact {
    /// Handle of the enemy.
    pub id: EntityId,
    /// Position at the start of the component pass.
    pub position: Vec2,
    /// Velocity over the previous frame.
    pub velocity: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Path progress in `[0, 1]`.
    pub progress: f32,
    /// Whether the enemy flies.
    pub flying: bool,
}

/// Snapshot of every active enemy, ordered by handle.
#[derive(Clone, Debug, Default)]
pub struct EnemyRadar {
    contacts: Vec<RadarContact>,
}

impl EnemyRadar {
    /// Replaces the contacts, sorting them by handle.
    pub fn rebuild(&mut self, contacts: impl IntoIterator<Item = RadarContact>) {
        self.contacts.clear();
        self.contacts.extend(contacts);
        self.contacts.sort_by_key(|contact| contact.id);
    }

    /// Every contact in handle order.
    #[must_use]
    pub fn contacts(&self) -> &[RadarContact] {
        &self.contacts
    }

    /// Contact for the handle, if the enemy is still alive.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&RadarContact> {
        self.contacts
            .binary_search_by_key(&id, |contact| contact.id)
            .ok()
            .map(|index| &self.contacts[index])
    }

    /// Contacts within `radius` of `center`, in handle order.
    pub fn within(&self, center: Vec2, radius: f32) -> impl Iterator<Item = &RadarContact> {
        let radius_squared = radius * radius;
        self.contacts
            .iter()
            .filter(move |contact| contact.position.distance_squared(center) <= radius_squared)
    }

    /// Closest contact to `center` within `radius`, optionally ignoring flyers.
    #[must_use]
    pub fn nearest(&self, center: Vec2, radius: f32, include_air: bool) -> Option<&RadarContact> {
        self.within(center, radius)
            .filter(|contact| include_air || !contact.flying)
            .min_by(|left, right| {
                left.position
                    .distance_squared(center)
                    .total_cmp(&right.position.distance_squared(center))
                    .then(left.id.cmp(&right.id))
            })
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(index: u32, x: f32, flying: bool) -> RadarContact {
        RadarContact {
            id: EntityId::new(index, 0),
            position: Vec2::new(x, 0.0),
            velocity: Vec2::ZERO,
            health: 10.0,
            progress: 0.0,
            flying,
        }
    }

    #[test]
    fn lookups_resolve_by_handle() {
        let mut radar = EnemyRadar::default();
        radar.rebuild([contact(5, 0.0, false), contact(2, 10.0, false)]);
        assert_eq!(radar.contacts()[0].id, EntityId::new(2, 0));
        assert!(radar.get(EntityId::new(5, 0)).is_some());
        assert!(radar.get(EntityId::new(5, 1)).is_none());
    }

    #[test]
    fn nearest_respects_air_filter() {
        let mut radar = EnemyRadar::default();
        radar.rebuild([contact(1, 5.0, true), contact(2, 20.0, false)]);
        let origin = Vec2::ZERO;
        assert_eq!(
            radar.nearest(origin, 50.0, true).map(|c| c.id),
            Some(EntityId::new(1, 0))
        );
        assert_eq!(
            radar.nearest(origin, 50.0, false).map(|c| c.id),
            Some(EntityId::new(2, 0))
        );
        assert!(radar.nearest(origin, 1.0, true).is_none());
    }
}
