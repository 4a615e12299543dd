#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Salvage accounting.
//!
//! The economy owns the single salvage balance of a session. Kill rewards
//! and generator income arrive as [`Message::Salvage`] requests and are
//! credited once per frame; purchases go through [`EconomySystem::spend_salvage`].

use std::any::Any;

use space_salvagers_core::{EntityId, Event};
use space_salvagers_world::{Message, System, WorldState};
use tracing::debug;

/// Schedule slot of the economy system; runs after combat has queued rewards.
pub const PRIORITY: i32 = 30;

/// Owner of the salvage balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EconomySystem {
    balance: u32,
    earned: u32,
    spent: u32,
}

impl EconomySystem {
    /// Creates an economy holding `starting` salvage.
    #[must_use]
    pub const fn new(starting: u32) -> Self {
        Self {
            balance: starting,
            earned: 0,
            spent: 0,
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Salvage credited since the session started, excluding the starting balance.
    #[must_use]
    pub const fn earned(&self) -> u32 {
        self.earned
    }

    /// Salvage spent since the session started.
    #[must_use]
    pub const fn spent(&self) -> u32 {
        self.spent
    }

    /// Reports whether the balance covers `amount`.
    #[must_use]
    pub const fn can_afford(&self, amount: u32) -> bool {
        amount <= self.balance
    }

    /// Credits `amount` and announces the new balance.
    pub fn add_salvage(&mut self, amount: u32, state: &mut WorldState) {
        if amount == 0 {
            return;
        }
        self.balance = self.balance.saturating_add(amount);
        self.earned = self.earned.saturating_add(amount);
        state.emit(Event::SalvageUpdated {
            balance: self.balance,
        });
    }

    /// Returns `amount` to the balance without counting it as earned.
    pub fn refund_salvage(&mut self, amount: u32, state: &mut WorldState) {
        if amount == 0 {
            return;
        }
        self.balance = self.balance.saturating_add(amount);
        state.emit(Event::SalvageUpdated {
            balance: self.balance,
        });
    }

    /// Debits `amount` if the balance covers it.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    pub fn spend_salvage(&mut self, amount: u32, state: &mut WorldState) -> bool {
        if !self.can_afford(amount) {
            debug!(amount, balance = self.balance, "salvage_spend_declined");
            return false;
        }
        self.balance -= amount;
        self.spent = self.spent.saturating_add(amount);
        state.emit(Event::SalvageUpdated {
            balance: self.balance,
        });
        true
    }
}

impl System for EconomySystem {
    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn update(&mut self, _dt: f32, _active: &[EntityId], state: &mut WorldState) {
        let income: u32 = state
            .mailbox_mut()
            .take(|message| matches!(message, Message::Salvage { .. }))
            .into_iter()
            .map(|message| match message {
                Message::Salvage { amount } => amount,
                _ => 0,
            })
            .fold(0, u32::saturating_add);
        self.add_salvage(income, state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
