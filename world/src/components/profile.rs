use space_salvagers_core::{BuildNodeId, EnemyKind, TowerKind};

use crate::{mailbox::Message, FrameContext};

/// Bookkeeping of a placed tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerProfile {
    /// Archetype.
    pub kind: TowerKind,
    /// Current tier, starting at one.
    pub tier: u8,
    /// Build node hosting the tower.
    pub node: BuildNodeId,
    /// Salvage spent on construction and upgrades.
    pub invested: u32,
}

/// Bookkeeping of a spawned enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyProfile {
    /// Archetype.
    pub kind: EnemyKind,
    /// Salvage awarded on kill.
    pub salvage: u32,
    /// Damage dealt to the station on arrival.
    pub core_damage: u32,
    /// Whether the enemy flies.
    pub flying: bool,
    /// Wave that spawned the enemy.
    pub wave: u32,
}

/// Passive salvage production.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Generator {
    income: f32,
    accumulated: f32,
}

impl Generator {
    /// Produces `income` salvage per second.
    #[must_use]
    pub const fn new(income: f32) -> Self {
        Self {
            income,
            accumulated: 0.0,
        }
    }

    /// Salvage per second.
    #[must_use]
    pub const fn income(&self) -> f32 {
        self.income
    }

    /// Applies an upgraded income rate.
    pub fn resync(&mut self, income: f32) {
        self.income = income;
    }

    pub(crate) fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.accumulated += self.income.max(0.0) * ctx.dt;
        let whole = self.accumulated.floor();
        if whole >= 1.0 {
            self.accumulated -= whole;
            ctx.mailbox.post(Message::Salvage {
                amount: whole as u32,
            });
        }
    }
}
