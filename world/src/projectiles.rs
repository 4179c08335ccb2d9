//! Projectile flight and collision tests.

use defense_zone_core::{
    DamageType, EnemyId, Guidance, Playfield, ProjectileId, ProjectileProfile, ProjectileSnapshot,
    SlowEffect, TowerId,
};
use glam::Vec2;
use std::time::Duration;

use crate::enemies::Enemy;

/// Parameters a tower hands to a projectile it launches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Launch {
    /// Tower that fired.
    pub source: TowerId,
    /// Launch position.
    pub origin: Vec2,
    /// Damage dealt on impact before resistances.
    pub damage: u32,
    /// Damage flavour dealt on impact.
    pub damage_type: DamageType,
    /// Flight parameters.
    pub profile: ProjectileProfile,
    /// Slow applied to the enemy that is struck.
    pub on_hit_slow: Option<SlowEffect>,
}

/// Projectile in flight, owned by the world.
#[derive(Clone, Debug)]
pub struct Projectile {
    id: ProjectileId,
    launch: Launch,
    position: Vec2,
    velocity: Vec2,
    target: EnemyId,
    target_point: Vec2,
    active: bool,
    launched: bool,
}

impl Projectile {
    /// Creates a projectile flying from the launch origin toward `target_point`.
    #[must_use]
    pub fn new(id: ProjectileId, launch: Launch, target: EnemyId, target_point: Vec2) -> Self {
        let heading = (target_point - launch.origin).normalize_or_zero();
        Self {
            id,
            position: launch.origin,
            velocity: heading * launch.profile.speed,
            launch,
            target,
            target_point,
            active: true,
            launched: false,
        }
    }

    /// Identifier allocated to the projectile.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Tower that fired the projectile.
    #[must_use]
    pub const fn source(&self) -> TowerId {
        self.launch.source
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current velocity in units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Point the projectile expires at.
    #[must_use]
    pub const fn target_point(&self) -> Vec2 {
        self.target_point
    }

    /// Damage dealt on impact before resistances.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.launch.damage
    }

    /// Damage flavour dealt on impact.
    #[must_use]
    pub const fn damage_type(&self) -> DamageType {
        self.launch.damage_type
    }

    /// Slow applied to the enemy that is struck.
    #[must_use]
    pub const fn on_hit_slow(&self) -> Option<SlowEffect> {
        self.launch.on_hit_slow
    }

    /// Reports whether the projectile is still in flight.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enemy a homing projectile steers toward, `None` for straight projectiles.
    #[must_use]
    pub fn homing_target(&self) -> Option<EnemyId> {
        match self.launch.profile.guidance {
            Guidance::Homing { .. } => Some(self.target),
            Guidance::Straight => None,
        }
    }

    /// Blends the heading toward the bound enemy's current position.
    ///
    /// `bearing` is `None` once the bound enemy is gone, in which case the
    /// projectile keeps its last heading. The target point stays where it was
    /// at launch. Straight projectiles ignore this.
    pub fn steer(&mut self, bearing: Option<Vec2>) {
        let Guidance::Homing { turn_rate } = self.launch.profile.guidance else {
            return;
        };
        let Some(point) = bearing else {
            return;
        };
        let desired = (point - self.position).normalize_or_zero();
        if desired == Vec2::ZERO {
            return;
        }
        let current = self.velocity.normalize_or_zero();
        let blended = current.lerp(desired, turn_rate).normalize_or_zero();
        if blended != Vec2::ZERO {
            self.velocity = blended * self.launch.profile.speed;
        }
    }

    /// Moves the projectile along its velocity.
    pub fn advance(&mut self, dt: Duration) {
        if self.active {
            self.position += self.velocity * dt.as_secs_f32();
        }
    }

    /// Expires the projectile on arrival at its target point or outside the playfield.
    ///
    /// Arrival is not checked on the launch step, so a shot aimed at its own
    /// origin gets one collision test before it expires.
    pub fn settle(&mut self, playfield: &Playfield) {
        if !self.active {
            return;
        }
        let arrived = self.launched
            && self.position.distance(self.target_point) < self.launch.profile.arrival_radius;
        self.launched = true;
        if arrived || !playfield.contains(self.position) {
            self.active = false;
        }
    }

    /// Moves the projectile and then checks for arrival or leaving the playfield.
    pub fn tick(&mut self, dt: Duration, playfield: &Playfield) {
        self.advance(dt);
        self.settle(playfield);
    }

    /// Reports whether the projectile strikes the enemy.
    #[must_use]
    pub fn collides_with(&self, enemy: &Enemy) -> bool {
        self.active
            && enemy.is_active()
            && self.position.distance(enemy.position()) <= self.launch.profile.collision_radius
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    /// Captures an immutable snapshot of the projectile.
    #[must_use]
    pub fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            tower: self.launch.source,
            position: self.position,
            velocity: self.velocity,
            homing: self.homing_target().is_some(),
        }
    }
}
