//! Typed cross-entity requests queued during the component pass.
//!
//! Components never mutate other entities. They post a [`Message`] instead,
//! and the systems resolve the queue at the start of the next frame in the
//! order the messages were posted.

use space_salvagers_core::{DamageType, EntityId, ImpactKind, ProjectileKind, StatusKind, Vec2};

/// Status effect carried by a hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectRequest {
    /// Effect to apply.
    pub kind: StatusKind,
    /// Intensity added per application.
    pub strength: f32,
    /// Duration in seconds.
    pub duration: f32,
    /// Aura that keeps the effect applied; repeats from the same holder never stack.
    pub holder: Option<EntityId>,
}

/// Everything a hit needs to resolve against its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Payload {
    /// Damage before resistances and armor.
    pub damage: f32,
    /// Damage channel.
    pub damage_type: DamageType,
    /// Armor ignored by the hit.
    pub armor_pierce: f32,
    /// Radius of splash damage around the target.
    pub splash_radius: f32,
    /// Number of additional enemies the hit arcs to.
    pub chains: u32,
    /// Maximum distance of a chain jump.
    pub chain_radius: f32,
    /// Whether splash and chains may reach flying enemies.
    pub can_hit_air: bool,
    /// Status applied to every enemy the hit reaches.
    pub effect: Option<EffectRequest>,
}

impl Payload {
    /// Plain single-target damage without side effects.
    #[must_use]
    pub const fn damage(damage: f32, damage_type: DamageType) -> Self {
        Self {
            damage,
            damage_type,
            armor_pierce: 0.0,
            splash_radius: 0.0,
            chains: 0,
            chain_radius: 0.0,
            can_hit_air: true,
            effect: None,
        }
    }
}

/// Request posted by a component for the systems to resolve.
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// A weapon wants a projectile launched.
    FireProjectile {
        /// Tower that fired.
        source: EntityId,
        /// Launch position.
        origin: Vec2,
        /// Intended target.
        target: EntityId,
        /// Projectile family.
        kind: ProjectileKind,
        /// Hit resolution data carried by the projectile.
        payload: Payload,
    },
    /// Damage and effects landed on an enemy.
    Hit {
        /// Entity receiving the hit.
        target: EntityId,
        /// Entity responsible, if any.
        source: Option<EntityId>,
        /// Hit resolution data.
        payload: Payload,
        /// Impact effect to request, if any.
        impact: Option<ImpactKind>,
    },
    /// A radial blast centred on a point.
    AreaPulse {
        /// Tower that pulsed.
        source: EntityId,
        /// Blast centre.
        center: Vec2,
        /// Blast radius.
        radius: f32,
        /// Hit resolution data applied to every enemy inside.
        payload: Payload,
    },
    /// An enemy finished its path.
    ReachedCore {
        /// Enemy that arrived.
        enemy: EntityId,
    },
    /// Salvage produced by a generator or a kill.
    Salvage {
        /// Amount to credit.
        amount: u32,
    },
}

/// Ordered queue of pending [`Message`] values.
#[derive(Clone, Debug, Default)]
pub struct Mailbox {
    messages: Vec<Message>,
}

impl Mailbox {
    /// Queues a message.
    pub fn post(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Removes and returns every message matching `filter`, keeping order.
    pub fn take(&mut self, mut filter: impl FnMut(&Message) -> bool) -> Vec<Message> {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.messages.len());
        for message in self.messages.drain(..) {
            if filter(&message) {
                taken.push(message);
            } else {
                kept.push(message);
            }
        }
        self.messages = kept;
        taken
    }

    /// Number of pending messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Reports whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Read-only view of pending messages.
    #[must_use]
    pub fn pending(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_preserves_order_of_both_partitions() {
        let mut mailbox = Mailbox::default();
        mailbox.post(Message::Salvage { amount: 1 });
        mailbox.post(Message::ReachedCore {
            enemy: EntityId::new(0, 0),
        });
        mailbox.post(Message::Salvage { amount: 2 });

        let salvage = mailbox.take(|message| matches!(message, Message::Salvage { .. }));
        assert_eq!(
            salvage,
            vec![
                Message::Salvage { amount: 1 },
                Message::Salvage { amount: 2 }
            ]
        );
        assert_eq!(mailbox.len(), 1);
        assert!(!mailbox.is_empty());
    }
}
