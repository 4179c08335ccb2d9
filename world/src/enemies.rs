//! Enemy state and path following.

use std::time::Duration;

use defense_zone_core::{DamageType, EnemyId, EnemyKind, EnemyProfile, EnemySnapshot, TowerId};
use glam::Vec2;
use rand::Rng;

/// Distance at which an enemy snaps onto the waypoint it is walking toward.
const WAYPOINT_SNAP_RADIUS: f32 = 5.0;
/// Distance from the final waypoint at which an enemy leaves the path.
const EXIT_RADIUS: f32 = 10.0;
const MIN_SPEED: f32 = 0.1;

/// Reason an enemy stopped being active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyExit {
    /// The enemy walked off the end of the path.
    ReachedEnd,
    /// The enemy's health was exhausted.
    Destroyed,
}

/// Enemy walking the path, owned by the world.
#[derive(Clone, Debug)]
pub struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    position: Vec2,
    health: u32,
    max_health: u32,
    speed: f32,
    reward: u32,
    path_index: usize,
    slow_factor: f32,
    slow_remaining: Duration,
    exit: Option<EnemyExit>,
    pub(crate) struck_by: Option<TowerId>,
}

impl Enemy {
    /// Creates an enemy of the provided kind at the head of the path.
    #[must_use]
    pub fn spawn(id: EnemyId, kind: EnemyKind, path: &[Vec2]) -> Self {
        let profile = kind.profile();
        Self::with_stats(
            id,
            kind,
            path.first().copied().unwrap_or(Vec2::ZERO),
            profile.max_health,
            profile.speed,
        )
    }

    /// Creates an enemy with explicit stats, clamping health to at least 1 and
    /// speed to at least 0.1.
    #[must_use]
    pub fn with_stats(
        id: EnemyId,
        kind: EnemyKind,
        position: Vec2,
        max_health: u32,
        speed: f32,
    ) -> Self {
        let max_health = max_health.max(1);
        Self {
            id,
            kind,
            position,
            health: max_health,
            max_health,
            speed: if speed.is_nan() {
                MIN_SPEED
            } else {
                speed.max(MIN_SPEED)
            },
            reward: kind.profile().reward,
            path_index: 0,
            slow_factor: 1.0,
            slow_remaining: Duration::ZERO,
            exit: None,
            struck_by: None,
        }
    }

    /// Identifier allocated to the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Kind of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Balance profile of the enemy's kind.
    #[must_use]
    pub const fn profile(&self) -> &'static EnemyProfile {
        self.kind.profile()
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Health the enemy spawned with.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Base movement speed in units per second.
    #[must_use]
    pub const fn base_speed(&self) -> f32 {
        self.speed
    }

    /// Money granted when the enemy is destroyed.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        self.reward
    }

    /// Index of the last waypoint the enemy reached.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Speed multiplier applied by the current slow, 1.0 when not slowed.
    #[must_use]
    pub const fn slow_factor(&self) -> f32 {
        self.slow_factor
    }

    /// Time left on the current slow.
    #[must_use]
    pub const fn slow_remaining(&self) -> Duration {
        self.slow_remaining
    }

    /// Reports whether the enemy is still on the field.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.exit.is_none()
    }

    /// Reason the enemy became inactive, if it did.
    #[must_use]
    pub const fn exit(&self) -> Option<EnemyExit> {
        self.exit
    }

    /// Remaining health as a fraction of the maximum.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    /// Applies resistance-adjusted damage, returning whether the hit destroyed the enemy.
    pub fn take_damage(&mut self, amount: u32, damage_type: DamageType) -> bool {
        if !self.is_active() {
            return false;
        }
        let dealt = self.profile().resist(amount, damage_type);
        self.health = self.health.saturating_sub(dealt);
        if self.health == 0 {
            self.exit = Some(EnemyExit::Destroyed);
            return true;
        }
        false
    }

    /// Restores health, never above the maximum.
    pub fn heal(&mut self, amount: u32) {
        if self.is_active() {
            self.health = self.health.saturating_add(amount).min(self.max_health);
        }
    }

    /// Slows the enemy for the provided duration, replacing any current slow.
    pub fn apply_slow(&mut self, duration: Duration, factor: f32) {
        self.slow_remaining = duration;
        self.slow_factor = factor.max(0.0);
    }

    /// Advances the enemy along the path by `dt`.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: Duration, path: &[Vec2], rng: &mut R) {
        if !self.is_active() || path.is_empty() {
            return;
        }

        self.slow_remaining = self.slow_remaining.saturating_sub(dt);
        if self.slow_remaining.is_zero() {
            self.slow_factor = 1.0;
        }

        let last = path.len() - 1;
        if self.path_index < last {
            let next = path[self.path_index + 1];
            let jitter = match self.profile().speed_jitter {
                Some((low, high)) => rng.gen_range(low..=high),
                None => 1.0,
            };
            let step = self.speed * self.slow_factor * jitter * dt.as_secs_f32();
            let offset = next - self.position;
            let distance = offset.length();
            if distance > 0.0 {
                self.position += offset / distance * step.min(distance);
            }
            if self.position.distance(next) <= WAYPOINT_SNAP_RADIUS {
                self.path_index += 1;
                self.position = next;
            }
        }

        if self.path_index >= last && self.position.distance(path[last]) <= EXIT_RADIUS {
            self.exit = Some(EnemyExit::ReachedEnd);
        }
    }

    /// Captures an immutable snapshot of the enemy.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            path_index: self.path_index,
            slowed: self.slow_factor < 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const FRAME: Duration = Duration::from_millis(16);

    fn straight_path() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)]
    }

    #[test]
    fn constructor_clamps_degenerate_stats() {
        let enemy = Enemy::with_stats(EnemyId::new(0), EnemyKind::Basic, Vec2::ZERO, 0, -3.0);
        assert_eq!(enemy.max_health(), 1);
        assert_eq!(enemy.health(), 1);
        assert!((enemy.base_speed() - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn health_stays_within_bounds_under_repeated_damage() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for kind in EnemyKind::ALL {
            let mut enemy = Enemy::spawn(EnemyId::new(0), kind, &straight_path());
            for _ in 0..64 {
                let amount = rng.gen_range(0..40);
                let damage_type = match rng.gen_range(0..3) {
                    0 => DamageType::Normal,
                    1 => DamageType::Piercing,
                    _ => DamageType::Explosive,
                };
                let _ = enemy.take_damage(amount, damage_type);
                assert!(enemy.health() <= enemy.max_health());
            }
        }
    }

    #[test]
    fn tank_armor_leaves_one_point_of_damage() {
        let mut tank = Enemy::spawn(EnemyId::new(0), EnemyKind::Tank, &straight_path());
        assert!(!tank.take_damage(6, DamageType::Normal));
        assert_eq!(tank.health(), 119);
    }

    #[test]
    fn lethal_damage_destroys_once() {
        let mut basic = Enemy::spawn(EnemyId::new(0), EnemyKind::Basic, &straight_path());
        assert!(basic.take_damage(500, DamageType::Normal));
        assert_eq!(basic.health(), 0);
        assert_eq!(basic.exit(), Some(EnemyExit::Destroyed));
        assert!(!basic.take_damage(10, DamageType::Normal));
    }

    #[test]
    fn heal_is_capped_at_max_health() {
        let mut basic = Enemy::spawn(EnemyId::new(0), EnemyKind::Basic, &straight_path());
        let _ = basic.take_damage(30, DamageType::Normal);
        basic.heal(100);
        assert_eq!(basic.health(), basic.max_health());
    }

    #[test]
    fn enemy_walks_straight_path_and_reaches_end() {
        let path = straight_path();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Basic, &path);

        let mut elapsed = Duration::ZERO;
        while enemy.is_active() && elapsed < Duration::from_secs(5) {
            enemy.tick(FRAME, &path, &mut rng);
            elapsed += FRAME;
        }

        assert_eq!(enemy.path_index(), 1);
        assert_eq!(enemy.exit(), Some(EnemyExit::ReachedEnd));
        assert_eq!(enemy.position(), Vec2::new(100.0, 0.0));
        assert!(elapsed > Duration::from_millis(1800));
        assert!(elapsed < Duration::from_millis(2100));
    }

    #[test]
    fn path_index_never_decreases() {
        let path = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(30.0, 40.0),
            Vec2::new(90.0, 40.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Fast, &path);
        let mut previous = enemy.path_index();
        while enemy.is_active() {
            enemy.tick(FRAME, &path, &mut rng);
            assert!(enemy.path_index() >= previous);
            previous = enemy.path_index();
        }
        assert_eq!(enemy.exit(), Some(EnemyExit::ReachedEnd));
    }

    #[test]
    fn only_fast_enemies_jitter_their_step() {
        let path = vec![Vec2::new(0.0, 0.0), Vec2::new(10_000.0, 0.0)];
        let dt = FRAME.as_secs_f32();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut fast = Enemy::spawn(EnemyId::new(0), EnemyKind::Fast, &path);
        let mut steps = Vec::new();
        for _ in 0..200 {
            let before = fast.position().x;
            fast.tick(FRAME, &path, &mut rng);
            steps.push(fast.position().x - before);
        }
        let (low, high) = (0.9 * 80.0 * dt, 1.1 * 80.0 * dt);
        for step in &steps {
            assert!(
                (low - 1e-3..=high + 1e-3).contains(step),
                "fast step {step} outside [{low}, {high}]"
            );
        }
        let shortest = steps.iter().copied().fold(f32::INFINITY, f32::min);
        let longest = steps.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(longest - shortest > 0.05, "jitter is resampled every tick");

        for kind in [EnemyKind::Basic, EnemyKind::Tank] {
            let mut enemy = Enemy::spawn(EnemyId::new(1), kind, &path);
            let expected = enemy.base_speed() * dt;
            for _ in 0..200 {
                let before = enemy.position().x;
                enemy.tick(FRAME, &path, &mut rng);
                assert!((enemy.position().x - before - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn slow_expires_back_to_full_speed() {
        let path = straight_path();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut enemy = Enemy::with_stats(EnemyId::new(0), EnemyKind::Basic, path[0], 50, 1.0);
        enemy.apply_slow(Duration::from_secs(2), 0.5);
        assert_eq!(enemy.slow_factor(), 0.5);
        assert!(enemy.snapshot().slowed);

        for _ in 0..130 {
            enemy.tick(FRAME, &path, &mut rng);
        }

        assert_eq!(enemy.slow_factor(), 1.0);
        assert!(enemy.slow_remaining().is_zero());
    }

    #[test]
    fn later_slow_overwrites_earlier_slow() {
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Basic, &straight_path());
        enemy.apply_slow(Duration::from_secs(3), 0.2);
        enemy.apply_slow(Duration::from_millis(500), 0.7);
        assert_eq!(enemy.slow_factor(), 0.7);
        assert_eq!(enemy.slow_remaining(), Duration::from_millis(500));
    }

    #[test]
    fn inactive_enemies_do_not_move() {
        let path = straight_path();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut enemy = Enemy::spawn(EnemyId::new(0), EnemyKind::Basic, &path);
        let _ = enemy.take_damage(1_000, DamageType::Piercing);
        enemy.tick(Duration::from_secs(1), &path, &mut rng);
        assert_eq!(enemy.position(), Vec2::ZERO);
    }
}
