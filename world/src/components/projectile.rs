use space_salvagers_core::{EntityId, ImpactKind, ProjectileKind, Vec2};

use super::{Movement, Transform};
use crate::{
    entity::Entity,
    mailbox::{Message, Payload},
    FrameContext,
};

/// Seconds a projectile may fly before it expires.
pub const MAX_LIFETIME: f32 = 5.0;

/// Distance under which a projectile connects with its target.
pub const HIT_RADIUS: f32 = 16.0;

const RETARGET_RANGE: f32 = 200.0;

/// Flight state of a projectile.
///
/// Guided kinds steer towards the live target and may pick a new one when it
/// dies. Unguided kinds fly straight at their aim point and expire on a miss.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileBody {
    kind: ProjectileKind,
    source: EntityId,
    target: EntityId,
    heading: Vec2,
    remaining: f32,
    payload: Payload,
    age: f32,
}

impl ProjectileBody {
    /// Launches from `origin` towards `aim`, intending to hit `target`.
    #[must_use]
    pub fn launch(
        kind: ProjectileKind,
        source: EntityId,
        target: EntityId,
        origin: Vec2,
        aim: Vec2,
        payload: Payload,
    ) -> Self {
        Self {
            kind,
            source,
            target,
            heading: (aim - origin).normalized(),
            remaining: origin.distance(aim) + HIT_RADIUS,
            payload,
            age: 0.0,
        }
    }

    /// Projectile family.
    #[must_use]
    pub const fn kind(&self) -> ProjectileKind {
        self.kind
    }

    /// Tower that fired.
    #[must_use]
    pub const fn source(&self) -> EntityId {
        self.source
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        self.target
    }

    /// Seconds in flight.
    #[must_use]
    pub const fn age(&self) -> f32 {
        self.age
    }

    /// Hit resolution data.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    pub(crate) fn update(&mut self, entity: &mut Entity, ctx: &mut FrameContext<'_>) {
        self.age += ctx.dt;
        if self.age >= MAX_LIFETIME {
            entity.deactivate();
            return;
        }
        let Some(position) = entity.get::<Transform>().map(|transform| transform.position) else {
            entity.deactivate();
            return;
        };

        let guided = self.kind.homing() > 0.0;
        let target = match ctx.radar.get(self.target) {
            Some(contact) => *contact,
            None if self.kind.retargets() => {
                match ctx
                    .radar
                    .nearest(position, RETARGET_RANGE, self.payload.can_hit_air)
                {
                    Some(contact) => {
                        self.target = contact.id;
                        *contact
                    }
                    None => {
                        entity.deactivate();
                        return;
                    }
                }
            }
            None => {
                entity.deactivate();
                return;
            }
        };

        if guided {
            let desired = (target.position - position).normalized();
            let turn = (self.kind.homing() * ctx.dt).min(1.0);
            let steered = self.heading.lerp(desired, turn).normalized();
            self.heading = if steered == Vec2::ZERO {
                desired
            } else {
                steered
            };
        }

        let speed = entity
            .get::<Movement>()
            .map_or(self.kind.speed(), Movement::speed);
        let step = speed * ctx.dt;
        let next = position + self.heading * step;
        let connected = target.position.distance_to_segment(position, next) <= HIT_RADIUS;

        if let Some(transform) = entity.get_mut::<Transform>() {
            transform.face(self.heading);
            transform.position = if connected { target.position } else { next };
        }

        if connected {
            ctx.mailbox.post(Message::Hit {
                target: target.id,
                source: Some(self.source),
                payload: self.payload,
                impact: Some(ImpactKind::Projectile(self.kind)),
            });
            entity.deactivate();
            return;
        }

        if !guided {
            self.remaining -= step;
            if self.remaining <= 0.0 {
                entity.deactivate();
            }
        }
    }
}
