//! The defended station.

/// Hit points of the station at the end of the enemy path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Station {
    health: u32,
    max_health: u32,
}

impl Station {
    /// Station at full health.
    #[must_use]
    pub const fn new(max_health: u32) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Reports whether the station has been destroyed.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.health == 0
    }

    /// Subtracts damage, saturating at zero, and returns the remaining health.
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.health = self.health.saturating_sub(amount);
        self.health
    }
}

#[cfg(test)]
mod tests {
    use super::Station;

    #[test]
    fn damage_saturates_at_zero() {
        let mut station = Station::new(10);
        assert_eq!(station.damage(4), 6);
        assert!(!station.is_destroyed());
        assert_eq!(station.damage(40), 0);
        assert!(station.is_destroyed());
        assert_eq!(station.max_health(), 10);
    }
}
