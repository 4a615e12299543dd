use space_salvagers_catalog::Resistances;
use space_salvagers_core::DamageType;

use crate::mailbox::Payload;

/// Hit points, shield and mitigation of an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
    shield: f32,
    max_shield: f32,
    armor: f32,
    resistances: [f32; DamageType::COUNT],
    since_damage: f32,
    dead: bool,
}

/// Result of resolving one hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageReport {
    /// Damage left after resistances and armor.
    pub mitigated: f32,
    /// Portion absorbed by the shield.
    pub absorbed: f32,
    /// Portion subtracted from health.
    pub dealt: f32,
    /// Whether this hit took health to zero or below.
    pub killed: bool,
}

impl Health {
    /// Unarmored health pool without a shield.
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            shield: 0.0,
            max_shield: 0.0,
            armor: 0.0,
            resistances: [0.0; DamageType::COUNT],
            since_damage: 0.0,
            dead: false,
        }
    }

    /// Adds flat armor.
    #[must_use]
    pub fn with_armor(mut self, armor: f32) -> Self {
        self.armor = armor.max(0.0);
        self
    }

    /// Adds per-channel resistances, each clamped to `[0, 1]`.
    #[must_use]
    pub fn with_resistances(mut self, resistances: Resistances) -> Self {
        self.resistances = resistances.to_array().map(|value| value.clamp(0.0, 1.0));
        self
    }

    /// Adds a full shield of the given capacity.
    #[must_use]
    pub fn with_shield(mut self, shield: f32) -> Self {
        self.max_shield = shield.max(0.0);
        self.shield = self.max_shield;
        self
    }

    /// Remaining health.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Remaining shield.
    #[must_use]
    pub const fn shield(&self) -> f32 {
        self.shield
    }

    /// Flat armor.
    #[must_use]
    pub const fn armor(&self) -> f32 {
        self.armor
    }

    /// Seconds since the last hit that got through mitigation.
    #[must_use]
    pub const fn since_damage(&self) -> f32 {
        self.since_damage
    }

    /// Reports whether health reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Resolves a hit.
    ///
    /// Percentage resistance applies before flat armor, the result is clamped
    /// at zero, and the shield absorbs before health. `killed` is reported
    /// only for the hit that crosses zero.
    pub fn apply(&mut self, payload: &Payload, vulnerability: f32) -> DamageReport {
        if self.dead {
            return DamageReport::default();
        }
        let resistance = self.resistances[payload.damage_type.index()];
        let resisted = payload.damage.max(0.0) * vulnerability.max(0.0) * (1.0 - resistance);
        let armor = (self.armor - payload.armor_pierce).max(0.0);
        let mitigated = (resisted - armor).max(0.0);
        if mitigated <= 0.0 {
            return DamageReport::default();
        }

        let absorbed = mitigated.min(self.shield);
        self.shield -= absorbed;
        let dealt = mitigated - absorbed;
        self.current -= dealt;
        self.since_damage = 0.0;
        let killed = self.current <= 0.0;
        self.dead = killed;
        DamageReport {
            mitigated,
            absorbed,
            dealt,
            killed,
        }
    }

    /// Restores health up to the maximum; the dead stay dead.
    pub fn heal(&mut self, amount: f32) {
        if !self.dead {
            self.current = (self.current + amount.max(0.0)).min(self.max);
        }
    }

    /// Restores shield up to its capacity.
    pub fn restore_shield(&mut self, amount: f32) {
        if !self.dead {
            self.shield = (self.shield + amount.max(0.0)).min(self.max_shield);
        }
    }

    pub(crate) fn update(&mut self, dt: f32) {
        self.since_damage += dt;
    }
}
