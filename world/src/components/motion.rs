use space_salvagers_core::Vec2;

use super::{Ability, StatusEffects, Transform};
use crate::{entity::Entity, mailbox::Message, FrameContext};

/// Speed of a moving entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Movement {
    base_speed: f32,
    speed: f32,
}

impl Movement {
    /// Movement at a constant base speed.
    #[must_use]
    pub const fn new(base_speed: f32) -> Self {
        Self {
            base_speed,
            speed: base_speed,
        }
    }

    /// Unmodified speed.
    #[must_use]
    pub const fn base_speed(&self) -> f32 {
        self.base_speed
    }

    /// Speed after status effects and ability bonuses, refreshed every frame.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    pub(crate) fn update(&mut self, entity: &Entity) {
        let factor = entity
            .get::<StatusEffects>()
            .map_or(1.0, StatusEffects::speed_factor);
        let bonus = entity.get::<Ability>().map_or(0.0, Ability::speed_bonus);
        self.speed = self.base_speed * factor * (1.0 + bonus);
    }
}

/// Progress of an enemy along the map path.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathFollow {
    progress: f32,
    velocity: Vec2,
    completed: bool,
}

impl PathFollow {
    /// Starts following the path at `progress`.
    #[must_use]
    pub fn starting_at(progress: f32) -> Self {
        Self {
            progress: progress.clamp(0.0, 1.0),
            velocity: Vec2::ZERO,
            completed: false,
        }
    }

    /// Normalised progress in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Displacement per second over the last frame.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Reports whether the end of the path was reached.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn initialize(&mut self) {
        self.completed = false;
        self.velocity = Vec2::ZERO;
    }

    pub(crate) fn update(&mut self, entity: &mut Entity, ctx: &mut FrameContext<'_>) {
        if self.completed || ctx.dt <= 0.0 {
            return;
        }
        let speed = entity.get::<Movement>().map_or(0.0, Movement::speed);
        let length = ctx.path.length();
        self.progress = if length <= f32::EPSILON {
            1.0
        } else {
            (self.progress + speed * ctx.dt / length).min(1.0)
        };

        let next = ctx.path.point_at(self.progress);
        if let Some(transform) = entity.get_mut::<Transform>() {
            let travelled = next - transform.position;
            self.velocity = travelled * (1.0 / ctx.dt);
            transform.face(travelled);
            transform.position = next;
        }

        if self.progress >= 1.0 {
            self.completed = true;
            entity.deactivate();
            ctx.mailbox.post(Message::ReachedCore { enemy: entity.id() });
        }
    }
}
