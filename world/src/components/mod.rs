//! Component library.
//!
//! Components are variants of the closed [`Component`] enum. Each variant
//! wraps a plain struct that implements [`ComponentData`], which provides the
//! typed lookup used by [`crate::Entity::get`] without runtime type identity.

mod ability;
mod health;
mod motion;
mod profile;
mod projectile;
mod status;
mod targeting;
mod transform;
mod weapon;

pub use ability::Ability;
pub use health::{DamageReport, Health};
pub use motion::{Movement, PathFollow};
pub use profile::{EnemyProfile, Generator, TowerProfile};
pub use projectile::{ProjectileBody, HIT_RADIUS, MAX_LIFETIME};
pub use status::{StatusEffect, StatusEffects, StatusRule};
pub use targeting::Targeting;
pub use transform::Transform;
pub use weapon::Weapon;

use space_salvagers_core::EntityId;

use crate::{entity::Entity, FrameContext};

/// Tag identifying a component variant.
///
/// Within one entity, components update in the order listed here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// [`Transform`].
    Transform,
    /// [`Health`].
    Health,
    /// [`StatusEffects`].
    StatusEffects,
    /// [`Ability`].
    Ability,
    /// [`Movement`].
    Movement,
    /// [`PathFollow`].
    PathFollow,
    /// [`Targeting`].
    Targeting,
    /// [`Weapon`].
    Weapon,
    /// [`Generator`].
    Generator,
    /// [`ProjectileBody`].
    Projectile,
    /// [`TowerProfile`].
    Tower,
    /// [`EnemyProfile`].
    Enemy,
}

impl ComponentKind {
    /// Number of component kinds.
    pub const COUNT: usize = 12;

    /// Every kind in update order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Transform,
        Self::Health,
        Self::StatusEffects,
        Self::Ability,
        Self::Movement,
        Self::PathFollow,
        Self::Targeting,
        Self::Weapon,
        Self::Generator,
        Self::Projectile,
        Self::Tower,
        Self::Enemy,
    ];

    /// Dense slot index of the kind.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Behaviour unit owned by exactly one entity.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// Spatial state.
    Transform(Transform),
    /// Hit points, shield and mitigation.
    Health(Health),
    /// Timed modifiers.
    StatusEffects(StatusEffects),
    /// Enemy special ability.
    Ability(Ability),
    /// Speed and velocity.
    Movement(Movement),
    /// Progress along the map path.
    PathFollow(PathFollow),
    /// Target selection.
    Targeting(Targeting),
    /// Firing logic.
    Weapon(Weapon),
    /// Salvage production.
    Generator(Generator),
    /// Projectile flight and impact.
    Projectile(ProjectileBody),
    /// Tower bookkeeping.
    Tower(TowerProfile),
    /// Enemy bookkeeping.
    Enemy(EnemyProfile),
}

impl Component {
    /// Tag of the wrapped variant.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Transform(_) => ComponentKind::Transform,
            Self::Health(_) => ComponentKind::Health,
            Self::StatusEffects(_) => ComponentKind::StatusEffects,
            Self::Ability(_) => ComponentKind::Ability,
            Self::Movement(_) => ComponentKind::Movement,
            Self::PathFollow(_) => ComponentKind::PathFollow,
            Self::Targeting(_) => ComponentKind::Targeting,
            Self::Weapon(_) => ComponentKind::Weapon,
            Self::Generator(_) => ComponentKind::Generator,
            Self::Projectile(_) => ComponentKind::Projectile,
            Self::Tower(_) => ComponentKind::Tower,
            Self::Enemy(_) => ComponentKind::Enemy,
        }
    }

    /// Attach hook, invoked with the owning entity's handle.
    pub fn initialize(&mut self, owner: EntityId) {
        match self {
            Self::Weapon(weapon) => weapon.initialize(owner),
            Self::Ability(ability) => ability.initialize(),
            Self::PathFollow(follow) => follow.initialize(),
            _ => {}
        }
    }

    /// Detach hook, releasing per-owner state.
    pub fn teardown(&mut self) {
        match self {
            Self::Weapon(weapon) => weapon.teardown(),
            Self::Targeting(targeting) => targeting.teardown(),
            Self::StatusEffects(status) => status.teardown(),
            _ => {}
        }
    }

    /// Per-frame hook. `entity` gives access to the sibling components.
    pub(crate) fn update(&mut self, entity: &mut Entity, ctx: &mut FrameContext<'_>) {
        match self {
            Self::Health(health) => health.update(ctx.dt),
            Self::StatusEffects(status) => status.update(entity.id(), ctx),
            Self::Ability(ability) => ability.update(entity, ctx),
            Self::Movement(movement) => movement.update(entity),
            Self::PathFollow(follow) => follow.update(entity, ctx),
            Self::Targeting(targeting) => targeting.update(entity, ctx),
            Self::Weapon(weapon) => weapon.update(entity, ctx),
            Self::Generator(generator) => generator.update(ctx),
            Self::Projectile(body) => body.update(entity, ctx),
            Self::Transform(_) | Self::Tower(_) | Self::Enemy(_) => {}
        }
    }
}

/// Typed access to one [`Component`] variant.
pub trait ComponentData: Sized {
    /// Tag of the variant wrapping the type.
    const KIND: ComponentKind;

    /// Wraps the value into its variant.
    fn into_component(self) -> Component;

    /// Borrows the value if `component` is the matching variant.
    fn peek(component: &Component) -> Option<&Self>;

    /// Mutably borrows the value if `component` is the matching variant.
    fn peek_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_data {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl ComponentData for $ty {
                const KIND: ComponentKind = ComponentKind::$variant;

                fn into_component(self) -> Component {
                    Component::$variant(self)
                }

                fn peek(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                fn peek_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )+
    };
}

component_data! {
    Transform => Transform,
    Health => Health,
    StatusEffects => StatusEffects,
    Ability => Ability,
    Movement => Movement,
    PathFollow => PathFollow,
    Targeting => Targeting,
    Weapon => Weapon,
    Generator => Generator,
    Projectile => ProjectileBody,
    Tower => TowerProfile,
    Enemy => EnemyProfile,
}
