#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Space Salvagers simulation.
//!
//! This crate defines the message surface that connects the engine, the
//! authoritative world, its systems, and outside collaborators. Players and
//! the autopilot submit [`Command`] values describing desired mutations, the
//! engine executes them against the world, and the world broadcasts [`Event`]
//! values that renderers, audio and HUD layers drain once per frame. Read-only
//! [`GameSnapshot`] values are the only view the autopilot ever receives.

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Generation-checked handle into the entity arena.
///
/// Handles are relations, never ownership: once the referenced slot is
/// recycled the generation no longer matches and lookups resolve to nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Creates a handle from an arena slot index and its generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot referenced by the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation the slot had when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Identifier of a static tower build node on the current map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildNodeId(u32);

impl BuildNodeId {
    /// Creates a new build node identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Two dimensional point or offset in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vec2 {
    /// Origin of the world plane.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared euclidean length.
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Squared distance between two points.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        (other - self).length_squared()
    }

    /// Unit vector pointing in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalized(self) -> Self {
        let length = self.length();
        if length <= f32::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / length, self.y / length)
        }
    }

    /// Linear interpolation towards `other` by factor `t`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    /// Dot product.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Shortest distance between the point and the segment `from..to`.
    #[must_use]
    pub fn distance_to_segment(self, from: Self, to: Self) -> f32 {
        let direction = to - from;
        let span = direction.length_squared();
        if span <= f32::EPSILON {
            return from.distance(self);
        }
        let t = ((self - from).dot(direction) / span).clamp(0.0, 1.0);
        from.lerp(to, t).distance(self)
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Fixed catalog of tower archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Rapid kinetic turret that engages the nearest enemy.
    Cannon,
    /// Instant-hit energy beam that engages the strongest enemy.
    Laser,
    /// Homing missiles with splash damage against the leading enemy.
    MissileBattery,
    /// Plasma bolts that chain between enemies, favouring the weakest.
    PlasmaArc,
    /// Continuous slowing field centred on the densest cluster.
    CryoField,
    /// Multi-target anti-air battery that only engages flying enemies.
    FlakArray,
    /// Nanobot swarms that infect their target with damage over time.
    NanobotHive,
    /// Periodic radial shockwave that stuns everything in range.
    PulseEmitter,
    /// Launches a burst of micro-missiles every volley.
    DroneBay,
    /// Salvage extractor that generates income and defends itself weakly.
    Salvager,
}

impl TowerKind {
    /// Every tower kind in catalog order.
    pub const ALL: [Self; 10] = [
        Self::Cannon,
        Self::Laser,
        Self::MissileBattery,
        Self::PlasmaArc,
        Self::CryoField,
        Self::FlakArray,
        Self::NanobotHive,
        Self::PulseEmitter,
        Self::DroneBay,
        Self::Salvager,
    ];

    /// Tower kinds the built-in fallback table must always provide.
    pub const CORE: [Self; 3] = [Self::Cannon, Self::Laser, Self::MissileBattery];

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cannon => "Cannon",
            Self::Laser => "Laser",
            Self::MissileBattery => "Missile Battery",
            Self::PlasmaArc => "Plasma Arc",
            Self::CryoField => "Cryo Field",
            Self::FlakArray => "Flak Array",
            Self::NanobotHive => "Nanobot Hive",
            Self::PulseEmitter => "Pulse Emitter",
            Self::DroneBay => "Drone Bay",
            Self::Salvager => "Salvager",
        }
    }
}

/// Fixed catalog of enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Fast and fragile.
    Scout,
    /// Baseline attacker.
    Raider,
    /// Slow, heavily armored.
    Brute,
    /// Flying attacker that only some towers can engage.
    Drone,
    /// Moves faster when surrounded by its pack.
    Swarmer,
    /// Carries a regenerating shield.
    Aegis,
    /// Splits into smaller enemies on death.
    Splitter,
    /// Periodically repairs itself.
    Mender,
    /// Boss-grade hulk.
    Behemoth,
}

impl EnemyKind {
    /// Every enemy kind in catalog order.
    pub const ALL: [Self; 9] = [
        Self::Scout,
        Self::Raider,
        Self::Brute,
        Self::Drone,
        Self::Swarmer,
        Self::Aegis,
        Self::Splitter,
        Self::Mender,
        Self::Behemoth,
    ];
}

/// Projectile families; determines homing, speed and on-hit behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// Fast unguided kinetic round.
    Bullet,
    /// Very fast unguided energy bolt.
    Laser,
    /// Slow strongly homing warhead.
    Missile,
    /// Medium speed lightly homing plasma bolt.
    Plasma,
    /// Slow homing swarm that delivers infection.
    Nanobot,
}

impl ProjectileKind {
    /// Number of projectile kinds.
    pub const COUNT: usize = 5;

    /// Every projectile kind, indexable through [`ProjectileKind::index`].
    pub const ALL: [Self; Self::COUNT] = [
        Self::Bullet,
        Self::Laser,
        Self::Missile,
        Self::Plasma,
        Self::Nanobot,
    ];

    /// Dense index of the projectile kind.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Bullet => 0,
            Self::Laser => 1,
            Self::Missile => 2,
            Self::Plasma => 3,
            Self::Nanobot => 4,
        }
    }

    /// Travel speed in world units per second.
    #[must_use]
    pub const fn speed(self) -> f32 {
        match self {
            Self::Bullet => 420.0,
            Self::Laser => 900.0,
            Self::Missile => 260.0,
            Self::Plasma => 340.0,
            Self::Nanobot => 180.0,
        }
    }

    /// Steering strength; zero means the projectile never adjusts course.
    #[must_use]
    pub const fn homing(self) -> f32 {
        match self {
            Self::Bullet | Self::Laser => 0.0,
            Self::Missile => 8.0,
            Self::Plasma => 3.0,
            Self::Nanobot => 6.0,
        }
    }

    /// Whether a projectile that lost its target may pick a new one.
    #[must_use]
    pub const fn retargets(self) -> bool {
        self.homing() > 0.0
    }
}

/// Damage channels resisted independently by enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    /// Bullets, flak, shockwaves.
    Kinetic,
    /// Lasers and plasma.
    Energy,
    /// Missiles and drones.
    Explosive,
    /// Nanobots and infection.
    Corrosive,
}

impl DamageType {
    /// Number of damage channels.
    pub const COUNT: usize = 4;

    /// Dense index of the damage channel.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Kinetic => 0,
            Self::Energy => 1,
            Self::Explosive => 2,
            Self::Corrosive => 3,
        }
    }
}

/// Rule a tower uses to pick which enemies to engage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingPolicy {
    /// Closest enemy to the tower.
    Nearest,
    /// Enemy with the most remaining health.
    Strongest,
    /// Enemy with the least remaining health.
    Weakest,
    /// Enemy furthest along the path.
    First,
    /// Flying enemies only, nearest first.
    FlyingOnly,
    /// Enemy with the most neighbours inside the cluster radius.
    MostClustered,
}

/// Timed modifiers applied to enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Prevents movement entirely.
    Stun,
    /// Reduces movement speed.
    Slow,
    /// Deals corrosive damage over time.
    Infection,
    /// Increases incoming damage.
    Vulnerability,
}

/// Broad purpose of a tower, used by the autopilot when composing a defence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerRole {
    /// Raw damage output.
    Damage,
    /// Crowd control (slow, stun, infection).
    Control,
    /// Dedicated anti-air.
    AntiAir,
    /// Income generation.
    Economy,
}

/// Top level state of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// No game in progress.
    Menu,
    /// A new game has been set up and waits for the first wave.
    Preparing,
    /// The simulation is running.
    Playing,
    /// The simulation is frozen by the player.
    Paused,
    /// A wave was just cleared; the next one is being prepared.
    WaveComplete,
    /// The station was destroyed.
    GameOver,
    /// The final wave was cleared.
    Victory,
}

/// Progress of the current wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveStatus {
    /// No wave configured.
    Idle,
    /// Wave configured, waiting for a start request.
    Prepared,
    /// Enemies are being spawned.
    Spawning,
    /// Every enemy was spawned; waiting for the field to clear.
    Clearing,
    /// Every enemy of the wave is gone.
    Cleared,
}

/// Commands that express all permissible player-driven mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Builds a tower on a free build node.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Build node that will host the tower.
        node: BuildNodeId,
    },
    /// Raises a tower by one tier.
    UpgradeTower {
        /// Tower to upgrade.
        tower: EntityId,
    },
    /// Removes a tower for a partial refund.
    SellTower {
        /// Tower to sell.
        tower: EntityId,
    },
    /// Starts the prepared wave.
    StartWave,
    /// Changes the global simulation speed factor.
    SetGameSpeed {
        /// Requested factor; clamped to `[0, 3]`.
        speed: f32,
    },
    /// Does nothing this decision.
    Wait,
}

/// Result of submitting a [`Command`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandOutcome {
    /// The command mutated the session.
    Applied,
    /// The command was not applicable right now; nothing changed.
    Declined(DeclineReason),
}

impl CommandOutcome {
    /// Reports whether the command was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Reasons a command may be declined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclineReason {
    /// The session state does not accept this command.
    InvalidState,
    /// The salvage balance cannot cover the cost.
    InsufficientSalvage {
        /// Salvage the command would cost.
        required: u32,
        /// Salvage currently available.
        available: u32,
    },
    /// The build node does not exist on the current map.
    UnknownNode,
    /// The build node already hosts a tower.
    NodeOccupied,
    /// No live tower matches the provided handle.
    UnknownTower,
    /// The tower already reached its maximum tier.
    TierMaxed,
    /// A wave is already running.
    WaveInProgress,
    /// No further wave is available.
    NoWavePrepared,
}

/// Visual flavour of an impact effect request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImpactKind {
    /// A projectile of the given kind struck its target.
    Projectile(ProjectileKind),
    /// An instant beam connected.
    Beam,
    /// A radial pulse went off.
    Pulse,
    /// A chain arc jumped to another enemy.
    Chain,
}

/// Events broadcast by the simulation, drained once per frame by collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A wave began spawning.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
        /// Number of enemies the wave will spawn.
        enemy_count: u32,
    },
    /// The wave finished spawning; remaining enemies still need clearing.
    WaveSpawnsExhausted {
        /// One-based wave number.
        wave: u32,
    },
    /// A wave was cleared and the completion bonus credited.
    WaveComplete {
        /// One-based wave number.
        wave: u32,
        /// Salvage awarded for clearing the wave.
        bonus: u32,
    },
    /// An enemy entered the field.
    EnemySpawned {
        /// Handle of the new enemy.
        enemy: EntityId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Spawn position.
        position: Vec2,
    },
    /// An enemy was destroyed.
    EnemyKilled {
        /// Handle of the destroyed enemy.
        enemy: EntityId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Salvage awarded for the kill.
        salvage: u32,
        /// Position of the wreck.
        position: Vec2,
    },
    /// An enemy completed its path and damaged the station.
    EnemyReachedCore {
        /// Handle of the enemy.
        enemy: EntityId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Damage dealt to the station.
        damage: u32,
    },
    /// A tower was constructed.
    TowerBuilt {
        /// Handle of the new tower.
        tower: EntityId,
        /// Archetype of the tower.
        kind: TowerKind,
        /// Build node hosting the tower.
        node: BuildNodeId,
        /// Salvage spent.
        cost: u32,
    },
    /// A tower advanced one tier.
    TowerUpgraded {
        /// Handle of the tower.
        tower: EntityId,
        /// Tier reached.
        tier: u8,
        /// Salvage spent.
        cost: u32,
    },
    /// A tower was sold.
    TowerSold {
        /// Handle of the former tower.
        tower: EntityId,
        /// Salvage refunded.
        refund: u32,
    },
    /// A projectile was launched.
    ProjectileFired {
        /// Handle of the projectile entity.
        projectile: EntityId,
        /// Projectile family.
        kind: ProjectileKind,
        /// Tower that fired.
        source: EntityId,
        /// Intended target.
        target: EntityId,
    },
    /// Request for an impact effect at a position.
    Impact {
        /// Where the impact happened.
        position: Vec2,
        /// Effect flavour.
        kind: ImpactKind,
    },
    /// The salvage balance changed.
    SalvageUpdated {
        /// New balance.
        balance: u32,
    },
    /// The station took damage.
    StationDamaged {
        /// Remaining station health.
        health: u32,
        /// Damage taken.
        damage: u32,
    },
    /// The session changed state.
    GameStateChanged {
        /// Previous state.
        from: GameState,
        /// New state.
        to: GameState,
    },
    /// The station was destroyed.
    GameOver {
        /// Wave that was running.
        wave: u32,
    },
    /// The final wave was cleared.
    Victory {
        /// Final wave number.
        wave: u32,
    },
}

/// Immutable view of a single tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerSnapshot {
    /// Handle of the tower.
    pub id: EntityId,
    /// Archetype of the tower.
    pub kind: TowerKind,
    /// Current tier.
    pub tier: u8,
    /// Maximum tier for the archetype.
    pub max_tier: u8,
    /// Build node hosting the tower.
    pub node: BuildNodeId,
    /// World position.
    pub position: Vec2,
    /// Cost of the next tier, if any.
    pub upgrade_cost: Option<u32>,
    /// Salvage returned when sold.
    pub sell_value: u32,
    /// Nominal damage per second at the current tier.
    pub damage_per_second: f32,
    /// Targeting range.
    pub range: f32,
}

/// Immutable view of a single enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Handle of the enemy.
    pub id: EntityId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// World position.
    pub position: Vec2,
    /// Remaining health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Path progress in `[0, 1]`.
    pub progress: f32,
    /// Whether the enemy flies.
    pub flying: bool,
}

/// Immutable view of a build node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildNodeSnapshot {
    /// Identifier of the node.
    pub id: BuildNodeId,
    /// World position.
    pub position: Vec2,
    /// Whether a tower currently occupies the node.
    pub occupied: bool,
    /// Shortest distance from the node to the enemy path.
    pub path_distance: f32,
}

/// Purchase option for a tower kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerOffer {
    /// Archetype on offer.
    pub kind: TowerKind,
    /// Role of the archetype.
    pub role: TowerRole,
    /// Build cost.
    pub cost: u32,
    /// Nominal damage per second at tier one.
    pub damage_per_second: f32,
    /// Targeting range at tier one.
    pub range: f32,
    /// Whether tier one can engage flying enemies.
    pub anti_air: bool,
}

/// Read-only snapshot of a session, shared by the HUD and the autopilot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Session state.
    pub state: GameState,
    /// Current one-based wave number (zero before the first wave).
    pub wave: u32,
    /// Last wave of the session.
    pub final_wave: u32,
    /// Progress of the current wave.
    pub wave_status: WaveStatus,
    /// Salvage balance.
    pub salvage: u32,
    /// Remaining station health.
    pub station_health: u32,
    /// Maximum station health.
    pub station_max_health: u32,
    /// Global simulation speed factor.
    pub game_speed: f32,
    /// Simulated seconds since the session started.
    pub elapsed: f64,
    /// Towers currently placed.
    pub towers: Vec<TowerSnapshot>,
    /// Enemies currently alive.
    pub enemies: Vec<EnemySnapshot>,
    /// Every build node on the map.
    pub build_nodes: Vec<BuildNodeSnapshot>,
    /// Enemy path from spawn to station.
    pub path: Vec<Vec2>,
    /// Tower kinds available for purchase.
    pub offers: Vec<TowerOffer>,
}

impl GameSnapshot {
    /// Build nodes that do not host a tower.
    pub fn available_nodes(&self) -> impl Iterator<Item = &BuildNodeSnapshot> {
        self.build_nodes.iter().filter(|node| !node.occupied)
    }

    /// Offers that the current balance can pay for.
    pub fn affordable_offers(&self) -> impl Iterator<Item = &TowerOffer> {
        let salvage = self.salvage;
        self.offers.iter().filter(move |offer| offer.cost <= salvage)
    }

    /// Looks up the offer for a tower kind.
    #[must_use]
    pub fn offer(&self, kind: TowerKind) -> Option<&TowerOffer> {
        self.offers.iter().find(|offer| offer.kind == kind)
    }
}

/// Final result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// The station was destroyed.
    Defeat,
    /// Every wave was cleared.
    Victory,
}

/// Summary handed to the external state manager when a session ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// How the session ended.
    pub kind: OutcomeKind,
    /// Seed the session ran with.
    pub seed: u64,
    /// Wave reached.
    pub wave: u32,
    /// Enemies destroyed.
    pub kills: u32,
    /// Salvage earned over the whole session.
    pub salvage_earned: u32,
    /// Towers constructed over the whole session.
    pub towers_built: u32,
    /// Simulated seconds played.
    pub elapsed: f64,
}

#[cfg(test)]
mod tests {
    use super::{BuildNodeId, Command, EntityId, TowerKind, Vec2};

    #[test]
    fn vec2_distance_matches_expectation() {
        let origin = Vec2::new(1.0, 1.0);
        let destination = Vec2::new(4.0, 5.0);
        assert!((origin.distance(destination) - 5.0).abs() < f32::EPSILON);
        assert!((destination.distance_squared(origin) - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(10.0, 0.0);
        assert!((Vec2::new(5.0, 3.0).distance_to_segment(from, to) - 3.0).abs() < 1e-6);
        assert!((Vec2::new(13.0, 4.0).distance_to_segment(from, to) - 5.0).abs() < 1e-6);
        assert!((Vec2::new(0.0, 2.0).distance_to_segment(from, from) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn normalizing_zero_vector_yields_zero() {
        assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
        let unit = Vec2::new(3.0, 4.0).normalized();
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn entity_ids_order_by_index_then_generation() {
        let older = EntityId::new(3, 1);
        let newer = EntityId::new(3, 2);
        assert!(older < newer);
        assert_ne!(older, newer);
        assert_eq!(newer.index(), 3);
        assert_eq!(newer.generation(), 2);
    }

    #[test]
    fn commands_round_trip_through_bincode() {
        let commands = vec![
            Command::PlaceTower {
                kind: TowerKind::PlasmaArc,
                node: BuildNodeId::new(4),
            },
            Command::UpgradeTower {
                tower: EntityId::new(9, 2),
            },
            Command::SetGameSpeed { speed: 2.0 },
            Command::Wait,
        ];
        let bytes = bincode::serialize(&commands).expect("serialize");
        let restored: Vec<Command> = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, commands);
    }

    #[test]
    fn core_tower_kinds_are_part_of_the_catalog() {
        for kind in TowerKind::CORE {
            assert!(TowerKind::ALL.contains(&kind));
        }
    }
}
