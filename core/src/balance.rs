//! Canonical balance tables for enemies, towers and difficulty levels.
//!
//! Every kind-specific number lives here so the world never branches on a
//! kind directly; it looks the kind up and applies the profile it receives.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::UnknownKind;

/// Flavour of damage carried by a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Plain kinetic damage.
    Normal,
    /// Armor-piercing damage that ignores flat armor.
    Piercing,
    /// Blast damage that fragile enemies take extra damage from.
    Explosive,
}

/// Enemy archetypes that waves are composed of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline enemy without resistances.
    Basic,
    /// Fragile, jittery runner that is weak to explosives.
    Fast,
    /// Slow armored enemy.
    Tank,
}

impl EnemyKind {
    /// Every enemy kind in declaration order.
    pub const ALL: [EnemyKind; 3] = [Self::Basic, Self::Fast, Self::Tank];

    /// Returns the balance profile associated with the kind.
    #[must_use]
    pub const fn profile(self) -> &'static EnemyProfile {
        match self {
            Self::Basic => &BASIC_PROFILE,
            Self::Fast => &FAST_PROFILE,
            Self::Tank => &TANK_PROFILE,
        }
    }

    /// Lower-case name used when parsing and displaying the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Fast => "fast",
            Self::Tank => "tank",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnemyKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownKind::new("enemy kind", value))
    }
}

/// Base statistics and damage policy shared by every enemy of one kind.
#[derive(Debug)]
pub struct EnemyProfile {
    /// Health an enemy spawns with.
    pub max_health: u32,
    /// Movement speed in playfield units per second.
    pub speed: f32,
    /// Money granted when the enemy is destroyed.
    pub reward: u32,
    /// Flat damage reduction applied by the resistance policy.
    pub armor: u32,
    /// Inclusive range of the per-tick speed multiplier, when the kind jitters.
    pub speed_jitter: Option<(f32, f32)>,
    resistance: fn(u32, u32, DamageType) -> u32,
}

impl EnemyProfile {
    /// Converts an incoming damage amount into the damage actually dealt.
    #[must_use]
    pub fn resist(&self, amount: u32, damage_type: DamageType) -> u32 {
        (self.resistance)(amount, self.armor, damage_type)
    }
}

const BASIC_PROFILE: EnemyProfile = EnemyProfile {
    max_health: 50,
    speed: 50.0,
    reward: 10,
    armor: 0,
    speed_jitter: None,
    resistance: unmodified,
};

const FAST_PROFILE: EnemyProfile = EnemyProfile {
    max_health: 30,
    speed: 80.0,
    reward: 15,
    armor: 0,
    speed_jitter: Some((0.9, 1.1)),
    resistance: weak_to_explosives,
};

const TANK_PROFILE: EnemyProfile = EnemyProfile {
    max_health: 120,
    speed: 30.0,
    reward: 25,
    armor: 5,
    speed_jitter: None,
    resistance: armored,
};

fn unmodified(amount: u32, _armor: u32, _damage_type: DamageType) -> u32 {
    amount
}

fn weak_to_explosives(amount: u32, _armor: u32, damage_type: DamageType) -> u32 {
    match damage_type {
        // x1.2, floored
        DamageType::Explosive => amount.saturating_mul(6) / 5,
        DamageType::Normal | DamageType::Piercing => amount,
    }
}

fn armored(amount: u32, armor: u32, damage_type: DamageType) -> u32 {
    match damage_type {
        DamageType::Piercing => amount,
        DamageType::Normal | DamageType::Explosive => amount.saturating_sub(armor).max(1),
    }
}

/// Temporary movement penalty applied to an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlowEffect {
    /// How long the penalty lasts.
    pub duration: Duration,
    /// Multiplier applied to the enemy's speed while the penalty lasts.
    pub factor: f32,
}

/// Flight behaviour of a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Guidance {
    /// Flies a straight line toward the point it was aimed at.
    Straight,
    /// Re-steers toward its bound enemy every tick.
    Homing {
        /// Blend factor applied to the heading each tick.
        turn_rate: f32,
    },
}

/// Physical parameters of the projectiles a tower launches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileProfile {
    /// Travel speed in playfield units per second.
    pub speed: f32,
    /// Radius within which the projectile strikes an enemy.
    pub collision_radius: f32,
    /// Radius around the aim point within which the projectile expires.
    pub arrival_radius: f32,
    /// Straight or homing flight.
    pub guidance: Guidance,
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap all-rounder firing straight shells.
    Cannon,
    /// Slow-firing launcher of homing explosive missiles.
    Missile,
    /// Short-range, rapid piercing beam that slows its targets.
    Laser,
}

impl TowerKind {
    /// Every tower kind in declaration order.
    pub const ALL: [TowerKind; 3] = [Self::Cannon, Self::Missile, Self::Laser];

    /// Returns the balance profile associated with the kind.
    #[must_use]
    pub const fn profile(self) -> &'static TowerProfile {
        match self {
            Self::Cannon => &CANNON_PROFILE,
            Self::Missile => &MISSILE_PROFILE,
            Self::Laser => &LASER_PROFILE,
        }
    }

    /// Lower-case name used when parsing and displaying the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cannon => "cannon",
            Self::Missile => "missile",
            Self::Laser => "laser",
        }
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TowerKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownKind::new("tower kind", value))
    }
}

/// Base statistics shared by every tower of one kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerProfile {
    /// Money debited when the tower is placed.
    pub cost: u32,
    /// Targeting radius in playfield units.
    pub range: f32,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Minimum simulated time between two shots.
    pub fire_interval: Duration,
    /// Damage flavour of the tower's projectiles.
    pub damage_type: DamageType,
    /// Flight parameters of the tower's projectiles.
    pub projectile: ProjectileProfile,
    /// Slow applied to enemies struck by the tower, if any.
    pub on_hit_slow: Option<SlowEffect>,
}

const SHELL: ProjectileProfile = ProjectileProfile {
    speed: 300.0,
    collision_radius: 15.0,
    arrival_radius: 10.0,
    guidance: Guidance::Straight,
};

const CANNON_PROFILE: TowerProfile = TowerProfile {
    cost: 50,
    range: 100.0,
    damage: 35,
    fire_interval: Duration::from_millis(1500),
    damage_type: DamageType::Normal,
    projectile: SHELL,
    on_hit_slow: None,
};

const MISSILE_PROFILE: TowerProfile = TowerProfile {
    cost: 100,
    range: 120.0,
    damage: 50,
    fire_interval: Duration::from_millis(2000),
    damage_type: DamageType::Explosive,
    projectile: ProjectileProfile {
        speed: 200.0,
        collision_radius: 15.0,
        arrival_radius: 10.0,
        guidance: Guidance::Homing { turn_rate: 0.05 },
    },
    on_hit_slow: None,
};

const LASER_PROFILE: TowerProfile = TowerProfile {
    cost: 75,
    range: 80.0,
    damage: 65,
    fire_interval: Duration::from_millis(800),
    damage_type: DamageType::Piercing,
    projectile: SHELL,
    on_hit_slow: Some(SlowEffect {
        duration: Duration::from_secs(1),
        factor: 0.7,
    }),
};

/// Difficulty levels selectable when a session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Smaller waves and a generous purse.
    Easy,
    /// Reference balance.
    Medium,
    /// Larger waves, a tight purse and a single life.
    Hard,
}

impl Difficulty {
    /// Every difficulty in ascending order.
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Scale factor applied to the number of enemies per wave.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Easy => 0.8,
            Self::Medium => 1.0,
            Self::Hard => 1.3,
        }
    }

    /// Money the ledger starts with.
    #[must_use]
    pub const fn starting_money(self) -> u32 {
        match self {
            Self::Easy => 300,
            Self::Medium => 200,
            Self::Hard => 150,
        }
    }

    /// Lives the ledger starts with.
    #[must_use]
    pub const fn starting_lives(self) -> u32 {
        match self {
            Self::Easy => 5,
            Self::Medium => 3,
            Self::Hard => 1,
        }
    }

    /// Lower-case name used when parsing and displaying the difficulty.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownKind::new("difficulty", value))
    }
}
