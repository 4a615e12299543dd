use space_salvagers_catalog::AbilitySpec;

use super::{Health, Transform};
use crate::{entity::Entity, FrameContext};

/// Special behaviour of an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ability {
    spec: AbilitySpec,
    timer: f32,
    speed_bonus: f32,
}

impl Ability {
    /// Wraps a configured ability.
    #[must_use]
    pub const fn new(spec: AbilitySpec) -> Self {
        Self {
            spec,
            timer: 0.0,
            speed_bonus: 0.0,
        }
    }

    /// Configured ability.
    #[must_use]
    pub const fn spec(&self) -> &AbilitySpec {
        &self.spec
    }

    /// Fractional speed bonus computed this frame.
    #[must_use]
    pub const fn speed_bonus(&self) -> f32 {
        self.speed_bonus
    }

    pub(crate) fn initialize(&mut self) {
        self.timer = 0.0;
        self.speed_bonus = 0.0;
    }

    pub(crate) fn update(&mut self, entity: &mut Entity, ctx: &mut FrameContext<'_>) {
        match self.spec {
            AbilitySpec::PackSpeed {
                radius,
                bonus_per_ally,
                max_bonus,
            } => {
                let Some(position) = entity.get::<Transform>().map(|t| t.position) else {
                    return;
                };
                let owner = entity.id();
                let allies = ctx
                    .radar
                    .within(position, radius)
                    .filter(|contact| contact.id != owner)
                    .count();
                self.speed_bonus = (allies as f32 * bonus_per_ally).min(max_bonus);
            }
            AbilitySpec::RegenShield { rate, delay } => {
                if let Some(health) = entity.get_mut::<Health>() {
                    if health.since_damage() >= delay {
                        health.restore_shield(rate * ctx.dt);
                    }
                }
            }
            AbilitySpec::SelfHeal { interval, fraction } => {
                if interval <= 0.0 {
                    return;
                }
                self.timer += ctx.dt;
                while self.timer >= interval {
                    self.timer -= interval;
                    if let Some(health) = entity.get_mut::<Health>() {
                        let amount = health.max() * fraction;
                        health.heal(amount);
                    }
                }
            }
            AbilitySpec::Split { .. } => {}
        }
    }
}
