#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Defense Zone engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and the simulation loop
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values describing what happened. Systems consume event streams, query
//! immutable snapshot views, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod balance;
mod config;

pub use balance::{
    DamageType, Difficulty, EnemyKind, EnemyProfile, Guidance, ProjectileProfile, SlowEffect,
    TowerKind, TowerProfile,
};
pub use config::{ConfigError, Playfield, SimulationConfig, REFERENCE_PATH};

/// Highest level a tower can be upgraded to.
pub const MAX_TOWER_LEVEL: u8 = 5;

/// Describes whether, and how, the simulation advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayMode {
    /// No session has been started; ticks are ignored.
    Idle,
    /// A session is in progress and every tick advances it.
    Running,
    /// A session is in progress but frozen.
    Paused,
    /// The last life was lost; the session is over.
    GameOver,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Clears every live list and begins a fresh session.
    StartGame {
        /// Difficulty that sets the starting purse and lives.
        difficulty: Difficulty,
    },
    /// Requests a transition between running and paused.
    SetPlayMode {
        /// Mode the world should activate.
        mode: PlayMode,
    },
    /// Advances the clock and moves every enemy along the path.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Records that a new wave has begun.
    BeginWave {
        /// One-based number of the wave.
        wave: u32,
        /// Number of enemies the wave will spawn.
        enemies: u32,
    },
    /// Spawns an enemy at the head of the path.
    SpawnEnemy {
        /// Kind of enemy to create.
        kind: EnemyKind,
    },
    /// Requests placement of a tower at the provided position.
    PlaceTower {
        /// Kind of tower to construct.
        kind: TowerKind,
        /// Centre of the new tower.
        position: Vec2,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Updates the enemy a tower is tracking.
    AimTower {
        /// Tower being aimed.
        tower: TowerId,
        /// Enemy the tower tracks, or `None` when nothing is in range.
        target: Option<EnemyId>,
    },
    /// Requests that a tower launch a projectile at an enemy.
    FireProjectile {
        /// Tower that fires.
        tower: TowerId,
        /// Enemy the projectile is aimed at.
        target: EnemyId,
    },
    /// Moves every projectile and resolves their collisions.
    StepProjectiles {
        /// Duration of simulated time the projectiles travel for.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a fresh session began.
    GameStarted {
        /// Difficulty selected for the session.
        difficulty: Difficulty,
        /// Money in the ledger at the start.
        money: u32,
        /// Lives in the ledger at the start.
        lives: u32,
    },
    /// Announces that the simulation entered a new play mode.
    PlayModeChanged {
        /// Mode that became active.
        mode: PlayMode,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces the start of a wave.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
        /// Number of enemies the wave will spawn.
        enemies: u32,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Kind of enemy spawned.
        kind: EnemyKind,
        /// Spawn position.
        position: Vec2,
    },
    /// Reports an enemy that walked off the end of the path.
    EnemyReachedEnd {
        /// Enemy that escaped.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Lives left after the leak was charged.
        lives_remaining: u32,
    },
    /// Reports an enemy destroyed by tower fire.
    EnemyKilled {
        /// Enemy that was destroyed.
        enemy: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Money credited for the kill.
        reward: u32,
        /// Tower whose projectile landed the final hit.
        tower: Option<TowerId>,
    },
    /// Announces that the last life was lost.
    GameOver,
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of tower placed.
        kind: TowerKind,
        /// Centre of the tower.
        position: Vec2,
        /// Money debited for the tower.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Kind of tower requested.
        kind: TowerKind,
        /// Requested position.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was upgraded.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level reached.
        level: u8,
        /// Money debited for the upgrade.
        cost: u32,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Tower targeted by the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile was aimed at.
        target: EnemyId,
    },
    /// Reports a projectile striking an enemy.
    ProjectileHit {
        /// Projectile that struck.
        projectile: ProjectileId,
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Damage dealt after resistances.
        damage: u32,
    },
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
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

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// No session is in progress, so placement is disabled.
    #[error("towers can only be placed during a session")]
    InvalidMode,
    /// The requested position lies outside the playfield.
    #[error("position lies outside the playfield")]
    OutOfBounds,
    /// The requested position is within the clearance of a path waypoint.
    #[error("position is too close to the path")]
    TooCloseToPath,
    /// The requested position is within the spacing of another tower.
    #[error("position is too close to another tower")]
    TooCloseToTower,
    /// The ledger cannot cover the tower's cost.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Cost of the tower.
        required: u32,
        /// Money in the ledger.
        available: u32,
    },
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No session is in progress, so upgrades are disabled.
    #[error("towers can only be upgraded during a session")]
    InvalidMode,
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The tower is already at the highest level.
    #[error("tower is already at the maximum level")]
    MaxLevel,
    /// The ledger cannot cover the upgrade's cost.
    #[error("insufficient funds: {required} required, {available} available")]
    InsufficientFunds {
        /// Cost of the upgrade.
        required: u32,
        /// Money in the ledger.
        available: u32,
    },
}

/// Returned when a purchase exceeds the money in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[error("insufficient funds: {required} required, {available} available")]
pub struct InsufficientFunds {
    /// Price of the purchase.
    pub required: u32,
    /// Money in the ledger.
    pub available: u32,
}

impl From<InsufficientFunds> for PlacementError {
    fn from(error: InsufficientFunds) -> Self {
        Self::InsufficientFunds {
            required: error.required,
            available: error.available,
        }
    }
}

impl From<InsufficientFunds> for UpgradeError {
    fn from(error: InsufficientFunds) -> Self {
        Self::InsufficientFunds {
            required: error.required,
            available: error.available,
        }
    }
}

/// Returned when the wave generator is asked for a wave past the last one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("all {total_waves} waves have been dispatched")]
pub struct WaveExhausted {
    /// Number of waves the generator was configured with.
    pub total_waves: u32,
}

/// Returned when a kind name does not match any known enemy, tower or difficulty.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown {category} `{name}`")]
pub struct UnknownKind {
    /// What was being parsed.
    pub category: &'static str,
    /// Name that failed to parse.
    pub name: String,
}

impl UnknownKind {
    pub(crate) fn new(category: &'static str, name: &str) -> Self {
        Self {
            category,
            name: name.to_owned(),
        }
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Current position.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Health the enemy spawned with.
    pub max_health: u32,
    /// Index of the last waypoint the enemy reached.
    pub path_index: usize,
    /// Indicates whether a slow effect is active.
    pub slowed: bool,
}

impl EnemySnapshot {
    /// Remaining health as a fraction of the maximum, zero when the maximum is zero.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single enemy.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Centre of the tower.
    pub position: Vec2,
    /// Current targeting radius.
    pub range: f32,
    /// Current damage per projectile.
    pub damage: u32,
    /// Current upgrade level, starting at one.
    pub level: u8,
    /// Current time between shots.
    pub fire_interval: Duration,
    /// Time left until the tower may fire again.
    pub ready_in: Duration,
    /// Enemy the tower is tracking.
    pub target: Option<EnemyId>,
    /// Enemies destroyed by the tower.
    pub kills: u32,
}

impl TowerSnapshot {
    /// Progress through the cooldown, from zero right after firing to one when ready.
    #[must_use]
    pub fn cooldown_phase(&self) -> f32 {
        if self.fire_interval.is_zero() {
            return 1.0;
        }
        let remaining = self.ready_in.as_secs_f32() / self.fire_interval.as_secs_f32();
        (1.0 - remaining).clamp(0.0, 1.0)
    }
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no towers were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Tower that launched the projectile.
    pub tower: TowerId,
    /// Current position.
    pub position: Vec2,
    /// Current velocity in units per second.
    pub velocity: Vec2,
    /// Indicates whether the projectile steers toward its target.
    pub homing: bool,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in launch order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectiles were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Money and lives at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Money available to spend.
    pub money: u32,
    /// Lives left before the game is over.
    pub lives: u32,
}

/// Target selected for a tower by the targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy selected as the target.
    pub enemy: EnemyId,
    /// Distance between the tower and the enemy.
    pub distance: f32,
}

/// Single entry of a wave: which enemy to spawn and when.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScheduledSpawn {
    /// Kind of enemy to spawn.
    pub kind: EnemyKind,
    /// Delay after the start of the wave.
    pub delay: Duration,
}

/// Ordered spawn plan for one wave.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WaveSchedule {
    wave: u32,
    spawns: Vec<ScheduledSpawn>,
}

impl WaveSchedule {
    /// Creates a schedule for the provided wave number.
    #[must_use]
    pub fn new(wave: u32, spawns: Vec<ScheduledSpawn>) -> Self {
        Self { wave, spawns }
    }

    /// One-based number of the wave.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Spawns in the order they are due.
    #[must_use]
    pub fn spawns(&self) -> &[ScheduledSpawn] {
        &self.spawns
    }

    /// Number of enemies in the wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spawns.len()
    }

    /// Reports whether the wave spawns nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EnemyId, EnemyKind, EnemySnapshot, EnemyView, PlacementError, TowerId, TowerKind,
        TowerSnapshot, UpgradeError,
    };
    use glam::Vec2;
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn tower_id_round_trips_through_bincode() {
        assert_round_trip(&TowerId::new(42));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::InsufficientFunds {
            required: 100,
            available: 35,
        });
        assert_round_trip(&TowerKind::Laser);
    }

    #[test]
    fn insufficient_funds_converts_into_typed_rejections() {
        let shortfall = super::InsufficientFunds {
            required: 75,
            available: 20,
        };
        assert_eq!(
            PlacementError::from(shortfall),
            PlacementError::InsufficientFunds {
                required: 75,
                available: 20
            }
        );
        assert_eq!(
            UpgradeError::from(shortfall).to_string(),
            "insufficient funds: 75 required, 20 available"
        );
    }

    fn enemy(id: u32, health: u32, max_health: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Basic,
            position: Vec2::ZERO,
            health,
            max_health,
            path_index: 0,
            slowed: false,
        }
    }

    #[test]
    fn health_fraction_is_zero_without_max_health() {
        assert_eq!(enemy(1, 0, 0).health_fraction(), 0.0);
        assert!((enemy(1, 25, 50).health_fraction() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn enemy_view_sorts_and_looks_up_by_id() {
        let view = EnemyView::from_snapshots(vec![enemy(7, 1, 1), enemy(3, 1, 1)]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![3, 7]);
        assert!(view.get(EnemyId::new(7)).is_some());
        assert!(view.get(EnemyId::new(5)).is_none());
    }

    #[test]
    fn cooldown_phase_tracks_remaining_time() {
        let mut tower = TowerSnapshot {
            id: TowerId::new(1),
            kind: TowerKind::Cannon,
            position: Vec2::ZERO,
            range: 100.0,
            damage: 35,
            level: 1,
            fire_interval: Duration::from_millis(1000),
            ready_in: Duration::from_millis(250),
            target: None,
            kills: 0,
        };
        assert!((tower.cooldown_phase() - 0.75).abs() < 1e-6);
        tower.ready_in = Duration::ZERO;
        assert_eq!(tower.cooldown_phase(), 1.0);
    }
}
