use space_salvagers_core::{DamageType, EntityId, StatusKind};

use crate::{
    mailbox::{Message, Payload},
    FrameContext,
};

/// Stacking behaviour of a status kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusRule {
    /// Whether reapplication adds intensity.
    pub stackable: bool,
    /// Maximum number of stacks.
    pub max_stacks: u32,
}

impl StatusRule {
    /// Rule for the given status kind.
    #[must_use]
    pub const fn of(kind: StatusKind) -> Self {
        match kind {
            StatusKind::Stun => Self {
                stackable: false,
                max_stacks: 1,
            },
            StatusKind::Slow => Self {
                stackable: true,
                max_stacks: 3,
            },
            StatusKind::Infection => Self {
                stackable: true,
                max_stacks: 5,
            },
            StatusKind::Vulnerability => Self {
                stackable: true,
                max_stacks: 3,
            },
        }
    }
}

/// One active timed modifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusEffect {
    /// Effect kind.
    pub kind: StatusKind,
    /// Accumulated intensity.
    pub intensity: f32,
    /// Seconds left.
    pub remaining: f32,
    /// Number of applications folded into the intensity.
    pub stacks: u32,
}

/// Timed modifiers carried by an enemy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
    holders: Vec<(StatusKind, EntityId)>,
}

const MIN_SLOW_FACTOR: f32 = 0.1;

impl StatusEffects {
    /// Applies or refreshes an effect.
    ///
    /// Reapplying refreshes the duration; stackable kinds also add intensity
    /// until the stack cap is reached.
    pub fn apply(&mut self, kind: StatusKind, strength: f32, duration: f32) {
        let rule = StatusRule::of(kind);
        if let Some(effect) = self.effects.iter_mut().find(|effect| effect.kind == kind) {
            effect.remaining = effect.remaining.max(duration);
            if rule.stackable && effect.stacks < rule.max_stacks {
                effect.stacks += 1;
                effect.intensity += strength;
            }
            return;
        }
        self.effects.push(StatusEffect {
            kind,
            intensity: strength,
            remaining: duration,
            stacks: 1,
        });
    }

    /// Applies an effect kept alive by an aura.
    ///
    /// The first application from `holder` behaves like [`apply`](Self::apply); while the
    /// effect lasts, repeats from the same holder only refresh its duration.
    pub fn sustain(&mut self, kind: StatusKind, strength: f32, duration: f32, holder: EntityId) {
        let held = self.holders.contains(&(kind, holder));
        if held {
            if let Some(effect) = self.effects.iter_mut().find(|effect| effect.kind == kind) {
                effect.remaining = effect.remaining.max(duration);
                return;
            }
        }
        self.apply(kind, strength, duration);
        if !held {
            self.holders.push((kind, holder));
        }
    }

    /// Active effect of the given kind.
    #[must_use]
    pub fn effect(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|effect| effect.kind == kind)
    }

    /// Every active effect in application order.
    #[must_use]
    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    /// Reports whether movement is suppressed.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.effect(StatusKind::Stun).is_some()
    }

    /// Multiplier applied to movement speed.
    #[must_use]
    pub fn speed_factor(&self) -> f32 {
        if self.is_stunned() {
            return 0.0;
        }
        self.effect(StatusKind::Slow)
            .map_or(1.0, |slow| (1.0 - slow.intensity).max(MIN_SLOW_FACTOR))
    }

    /// Multiplier applied to incoming damage.
    #[must_use]
    pub fn vulnerability(&self) -> f32 {
        self.effect(StatusKind::Vulnerability)
            .map_or(1.0, |effect| 1.0 + effect.intensity.max(0.0))
    }

    pub(crate) fn update(&mut self, owner: EntityId, ctx: &mut FrameContext<'_>) {
        for effect in &mut self.effects {
            let active = ctx.dt.min(effect.remaining.max(0.0));
            if effect.kind == StatusKind::Infection && active > 0.0 {
                ctx.mailbox.post(Message::Hit {
                    target: owner,
                    source: None,
                    payload: Payload::damage(effect.intensity * active, DamageType::Corrosive),
                    impact: None,
                });
            }
            effect.remaining -= ctx.dt;
        }
        self.effects.retain(|effect| effect.remaining > 0.0);
        let effects = &self.effects;
        self.holders.retain(|(kind, _)| effects.iter().any(|effect| effect.kind == *kind));
    }

    pub(crate) fn teardown(&mut self) {
        self.effects.clear();
        self.holders.clear();
    }
}
