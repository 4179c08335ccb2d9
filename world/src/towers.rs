//! Authoritative tower state: cooldowns, upgrades and per-tower statistics.

use std::time::Duration;

use defense_zone_core::{
    DamageType, EnemyId, ProjectileId, ProjectileProfile, SlowEffect, TowerId, TowerKind,
    TowerSnapshot, MAX_TOWER_LEVEL,
};
use glam::Vec2;

use crate::{
    enemies::Enemy,
    projectiles::{Launch, Projectile},
};

const MIN_FIRE_INTERVAL: Duration = Duration::from_millis(200);

/// Tower placed on the playfield, owned by the world.
#[derive(Clone, Debug)]
pub struct Tower {
    id: TowerId,
    kind: TowerKind,
    position: Vec2,
    range: f32,
    damage: u32,
    fire_interval: Duration,
    damage_type: DamageType,
    projectile: ProjectileProfile,
    on_hit_slow: Option<SlowEffect>,
    level: u8,
    last_fired_at: Option<Duration>,
    target: Option<EnemyId>,
    kills: u32,
    damage_dealt: u64,
    invested: u32,
}

impl Tower {
    /// Creates a level one tower of the provided kind.
    #[must_use]
    pub fn new(id: TowerId, kind: TowerKind, position: Vec2) -> Self {
        let profile = kind.profile();
        Self {
            id,
            kind,
            position,
            range: profile.range,
            damage: profile.damage,
            fire_interval: profile.fire_interval,
            damage_type: profile.damage_type,
            projectile: profile.projectile,
            on_hit_slow: profile.on_hit_slow,
            level: 1,
            last_fired_at: None,
            target: None,
            kills: 0,
            damage_dealt: 0,
            invested: profile.cost,
        }
    }

    /// Identifier allocated to the tower.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Kind of tower.
    #[must_use]
    pub const fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Centre of the tower.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current targeting radius.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Current damage per projectile.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Current time between shots.
    #[must_use]
    pub const fn fire_interval(&self) -> Duration {
        self.fire_interval
    }

    /// Current upgrade level.
    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Enemy the tower is tracking.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// Enemies destroyed by the tower's projectiles.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Total damage dealt by the tower's projectiles.
    #[must_use]
    pub const fn damage_dealt(&self) -> u64 {
        self.damage_dealt
    }

    /// Money spent on placing and upgrading the tower.
    #[must_use]
    pub const fn invested(&self) -> u32 {
        self.invested
    }

    /// Reports whether the cooldown has elapsed at `now`.
    #[must_use]
    pub fn can_fire(&self, now: Duration) -> bool {
        match self.last_fired_at {
            Some(fired_at) => now.saturating_sub(fired_at) >= self.fire_interval,
            None => true,
        }
    }

    /// Time left on the cooldown at `now`.
    #[must_use]
    pub fn ready_in(&self, now: Duration) -> Duration {
        match self.last_fired_at {
            Some(fired_at) => fired_at
                .saturating_add(self.fire_interval)
                .saturating_sub(now),
            None => Duration::ZERO,
        }
    }

    /// Records the enemy the tower is tracking.
    pub fn aim(&mut self, target: Option<EnemyId>) {
        self.target = target;
    }

    /// Launches a projectile at the target's current position and restarts the cooldown.
    ///
    /// Callers check [`Tower::can_fire`] and the target's liveness first.
    pub fn fire(&mut self, id: ProjectileId, target: &Enemy, now: Duration) -> Projectile {
        self.last_fired_at = Some(now);
        self.target = Some(target.id());
        Projectile::new(
            id,
            Launch {
                source: self.id,
                origin: self.position,
                damage: self.damage,
                damage_type: self.damage_type,
                profile: self.projectile,
                on_hit_slow: self.on_hit_slow,
            },
            target.id(),
            target.position(),
        )
    }

    /// Price of the next upgrade, or `None` at the maximum level.
    #[must_use]
    pub fn upgrade_cost(&self) -> Option<u32> {
        if self.level >= MAX_TOWER_LEVEL {
            return None;
        }
        Some(self.kind.profile().cost * u32::from(self.level) * 4 / 5)
    }

    /// Raises the tower one level, returning the new level, or `None` at the maximum.
    pub fn upgrade(&mut self) -> Option<u8> {
        let cost = self.upgrade_cost()?;
        self.level += 1;
        self.damage = self.damage * 13 / 10;
        self.range = (self.range * 1.1).floor();
        self.fire_interval = (self.fire_interval * 85 / 100).max(MIN_FIRE_INTERVAL);
        self.invested = self.invested.saturating_add(cost);
        Some(self.level)
    }

    pub(crate) fn record_hit(&mut self, dealt: u32, killed: bool) {
        self.damage_dealt = self.damage_dealt.saturating_add(u64::from(dealt));
        if killed {
            self.kills = self.kills.saturating_add(1);
        }
    }

    /// Captures an immutable snapshot of the tower at `now`.
    #[must_use]
    pub fn snapshot(&self, now: Duration) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            range: self.range,
            damage: self.damage,
            level: self.level,
            fire_interval: self.fire_interval,
            ready_in: self.ready_in(now),
            target: self.target,
            kills: self.kills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defense_zone_core::EnemyKind;

    fn cannon() -> Tower {
        Tower::new(TowerId::new(0), TowerKind::Cannon, Vec2::new(100.0, 100.0))
    }

    #[test]
    fn fresh_tower_is_ready() {
        let tower = cannon();
        assert!(tower.can_fire(Duration::ZERO));
        assert_eq!(tower.ready_in(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn firing_restarts_cooldown() {
        let mut tower = cannon();
        let enemy = Enemy::with_stats(
            EnemyId::new(4),
            EnemyKind::Basic,
            Vec2::new(150.0, 100.0),
            50,
            50.0,
        );
        let now = Duration::from_secs(3);
        let projectile = tower.fire(ProjectileId::new(0), &enemy, now);

        assert_eq!(projectile.source(), tower.id());
        assert_eq!(projectile.target_point(), enemy.position());
        assert_eq!(tower.target(), Some(enemy.id()));
        assert!(!tower.can_fire(now + Duration::from_millis(1499)));
        assert!(tower.can_fire(now + Duration::from_millis(1500)));
        assert_eq!(
            tower.ready_in(now + Duration::from_millis(500)),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn upgrades_scale_stats_until_max_level() {
        let mut tower = cannon();
        assert_eq!(tower.upgrade_cost(), Some(40));
        assert_eq!(tower.upgrade(), Some(2));
        assert_eq!(tower.damage(), 45);
        assert_eq!(tower.range(), 110.0);
        assert_eq!(tower.fire_interval(), Duration::from_millis(1275));
        assert_eq!(tower.invested(), 90);

        while tower.upgrade().is_some() {}
        assert_eq!(tower.level(), MAX_TOWER_LEVEL);
        assert_eq!(tower.upgrade_cost(), None);
    }

    #[test]
    fn fire_interval_never_drops_below_floor() {
        let mut tower = Tower::new(TowerId::new(0), TowerKind::Laser, Vec2::ZERO);
        while tower.upgrade().is_some() {}
        assert!(tower.fire_interval() >= MIN_FIRE_INTERVAL);
        assert!(tower.range() > 0.0);
    }

    #[test]
    fn hits_accumulate_statistics() {
        let mut tower = cannon();
        tower.record_hit(35, false);
        tower.record_hit(15, true);
        assert_eq!(tower.damage_dealt(), 50);
        assert_eq!(tower.kills(), 1);
        assert_eq!(tower.snapshot(Duration::ZERO).kills, 1);
    }
}
