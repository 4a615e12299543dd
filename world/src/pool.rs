//! Bounded reuse cache for projectile entities.

use space_salvagers_core::ProjectileKind;

use crate::entity::Entity;

/// Default number of idle projectiles retained per kind.
pub const POOL_CAPACITY: usize = 100;

/// Lifetime counters of a [`ProjectilePool`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Projectiles handed out, fresh or recycled.
    pub checked_out: u64,
    /// Projectiles handed back.
    pub returned: u64,
    /// Returned projectiles dropped because the kind's cache was full.
    pub discarded: u64,
    /// Checkouts served from the cache.
    pub reused: u64,
}

impl PoolStats {
    /// Projectiles currently checked out and not yet returned.
    #[must_use]
    pub const fn outstanding(&self) -> u64 {
        self.checked_out.saturating_sub(self.returned)
    }
}

/// Idle projectile entities keyed by projectile kind.
#[derive(Clone, Debug)]
pub struct ProjectilePool {
    idle: [Vec<Entity>; ProjectileKind::COUNT],
    capacity: usize,
    stats: PoolStats,
}

impl Default for ProjectilePool {
    fn default() -> Self {
        Self::new(POOL_CAPACITY)
    }
}

impl ProjectilePool {
    /// Pool retaining at most `capacity` idle projectiles per kind.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: std::array::from_fn(|_| Vec::new()),
            capacity,
            stats: PoolStats::default(),
        }
    }

    /// Records a checkout and yields a recycled entity if one is idle.
    pub(crate) fn checkout(&mut self, kind: ProjectileKind) -> Option<Entity> {
        self.stats.checked_out += 1;
        let recycled = self.idle[kind.index()].pop();
        if recycled.is_some() {
            self.stats.reused += 1;
        }
        recycled
    }

    /// Takes a projectile back; returns `false` when it was discarded.
    pub(crate) fn give_back(&mut self, kind: ProjectileKind, mut entity: Entity) -> bool {
        self.stats.returned += 1;
        let idle = &mut self.idle[kind.index()];
        if idle.len() >= self.capacity {
            self.stats.discarded += 1;
            return false;
        }
        entity.deactivate();
        idle.push(entity);
        true
    }

    /// Idle projectiles cached for `kind`.
    #[must_use]
    pub fn idle(&self, kind: ProjectileKind) -> usize {
        self.idle[kind.index()].len()
    }

    /// Maximum idle projectiles per kind.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }
}
