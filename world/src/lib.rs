#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Defense Zone.
//!
//! The world owns every enemy, tower and projectile together with the
//! resource ledger and the simulation clock. It changes only through
//! [`apply`] and is observed only through the [`query`] module.

mod enemies;
mod ledger;
mod projectiles;
mod towers;

use std::time::Duration;

use defense_zone_core::{
    Command, Difficulty, EnemyId, Event, PlacementError, PlayMode, ProjectileId,
    SimulationConfig, TowerId, TowerKind, UpgradeError,
};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

pub use enemies::{Enemy, EnemyExit};
pub use ledger::ResourceLedger;
pub use projectiles::{Launch, Projectile};
pub use towers::Tower;

/// Represents the authoritative Defense Zone world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    play_mode: PlayMode,
    difficulty: Difficulty,
    clock: Duration,
    ledger: ResourceLedger,
    enemies: Vec<Enemy>,
    towers: Vec<Tower>,
    projectiles: Vec<Projectile>,
    next_enemy_id: u32,
    next_tower_id: u32,
    next_projectile_id: u32,
    wave: u32,
    wave_started_at: Option<Duration>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an idle world using the provided configuration.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let difficulty = Difficulty::Medium;
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            config,
            play_mode: PlayMode::Idle,
            difficulty,
            clock: Duration::ZERO,
            ledger: ResourceLedger::new(difficulty.starting_money(), difficulty.starting_lives()),
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: Vec::new(),
            next_enemy_id: 0,
            next_tower_id: 0,
            next_projectile_id: 0,
            wave: 0,
            wave_started_at: None,
            rng,
        }
    }

    fn reset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.clock = Duration::ZERO;
        self.ledger = ResourceLedger::new(difficulty.starting_money(), difficulty.starting_lives());
        self.enemies.clear();
        self.towers.clear();
        self.projectiles.clear();
        self.next_enemy_id = 0;
        self.next_tower_id = 0;
        self.next_projectile_id = 0;
        self.wave = 0;
        self.wave_started_at = None;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
    }

    fn in_session(&self) -> bool {
        matches!(self.play_mode, PlayMode::Running | PlayMode::Paused)
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn allocate_tower_id(&mut self) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.wrapping_add(1);
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        id
    }

    fn placement_check(&self, kind: TowerKind, position: Vec2) -> Result<(), PlacementError> {
        if !self.in_session() {
            return Err(PlacementError::InvalidMode);
        }
        if !self.config.playfield.contains(position) {
            return Err(PlacementError::OutOfBounds);
        }
        if self
            .config
            .path
            .iter()
            .any(|waypoint| waypoint.distance(position) < self.config.path_clearance)
        {
            return Err(PlacementError::TooCloseToPath);
        }
        if self
            .towers
            .iter()
            .any(|tower| tower.position().distance(position) < self.config.tower_spacing)
        {
            return Err(PlacementError::TooCloseToTower);
        }
        let cost = kind.profile().cost;
        if !self.ledger.can_afford(cost) {
            return Err(PlacementError::InsufficientFunds {
                required: cost,
                available: self.ledger.money(),
            });
        }
        Ok(())
    }

    fn place_tower(&mut self, kind: TowerKind, position: Vec2) -> Result<TowerId, PlacementError> {
        self.placement_check(kind, position)?;
        let cost = kind.profile().cost;
        self.ledger.try_spend(cost)?;
        let id = self.allocate_tower_id();
        self.towers.push(Tower::new(id, kind, position));
        Ok(id)
    }

    fn upgrade_tower(&mut self, tower: TowerId) -> Result<(u8, u32), UpgradeError> {
        if !self.in_session() {
            return Err(UpgradeError::InvalidMode);
        }
        let Some(entry) = self.towers.iter_mut().find(|entry| entry.id() == tower) else {
            return Err(UpgradeError::MissingTower);
        };
        let cost = entry.upgrade_cost().ok_or(UpgradeError::MaxLevel)?;
        self.ledger.try_spend(cost)?;
        let level = entry.upgrade().ok_or(UpgradeError::MaxLevel)?;
        Ok((level, cost))
    }

    fn step_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for projectile in self.projectiles.iter_mut() {
            if !projectile.is_active() {
                continue;
            }

            let bearing = projectile.homing_target().and_then(|target| {
                self.enemies
                    .iter()
                    .find(|enemy| enemy.id() == target && enemy.is_active())
                    .map(Enemy::position)
            });
            projectile.steer(bearing);
            projectile.tick(dt, &self.config.playfield);
            if !projectile.is_active() {
                continue;
            }

            if let Some(enemy) = self
                .enemies
                .iter_mut()
                .find(|enemy| projectile.collides_with(enemy))
            {
                let before = enemy.health();
                let killed = enemy.take_damage(projectile.damage(), projectile.damage_type());
                let dealt = before - enemy.health();
                if let Some(slow) = projectile.on_hit_slow() {
                    enemy.apply_slow(slow.duration, slow.factor);
                }
                enemy.struck_by = Some(projectile.source());
                if let Some(tower) = self
                    .towers
                    .iter_mut()
                    .find(|tower| tower.id() == projectile.source())
                {
                    tower.record_hit(dealt, killed);
                }
                projectile.deactivate();
                out_events.push(Event::ProjectileHit {
                    projectile: projectile.id(),
                    enemy: enemy.id(),
                    damage: dealt,
                });
            }
        }

        self.projectiles.retain(Projectile::is_active);
    }

    fn retire_inactive_enemies(&mut self, out_events: &mut Vec<Event>) {
        for enemy in self.enemies.iter().filter(|enemy| !enemy.is_active()) {
            match enemy.exit() {
                Some(EnemyExit::ReachedEnd) => {
                    let out_of_lives = self.ledger.lose_life();
                    debug!(enemy = enemy.id().get(), kind = %enemy.kind(), lives = self.ledger.lives(), "enemy reached the end");
                    out_events.push(Event::EnemyReachedEnd {
                        enemy: enemy.id(),
                        kind: enemy.kind(),
                        lives_remaining: self.ledger.lives(),
                    });
                    if out_of_lives && self.play_mode != PlayMode::GameOver {
                        self.play_mode = PlayMode::GameOver;
                        info!(wave = self.wave, "game over");
                        out_events.push(Event::GameOver);
                        out_events.push(Event::PlayModeChanged {
                            mode: PlayMode::GameOver,
                        });
                    }
                }
                Some(EnemyExit::Destroyed) => {
                    self.ledger.earn(enemy.reward());
                    debug!(enemy = enemy.id().get(), kind = %enemy.kind(), reward = enemy.reward(), "enemy destroyed");
                    out_events.push(Event::EnemyKilled {
                        enemy: enemy.id(),
                        kind: enemy.kind(),
                        reward: enemy.reward(),
                        tower: enemy.struck_by,
                    });
                }
                None => {}
            }
        }
        self.enemies.retain(Enemy::is_active);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame { difficulty } => {
            world.reset(difficulty);
            world.play_mode = PlayMode::Running;
            info!(%difficulty, money = world.ledger.money(), lives = world.ledger.lives(), "game started");
            out_events.push(Event::GameStarted {
                difficulty,
                money: world.ledger.money(),
                lives: world.ledger.lives(),
            });
            out_events.push(Event::PlayModeChanged {
                mode: PlayMode::Running,
            });
        }
        Command::SetPlayMode { mode } => {
            let allowed = matches!(
                (world.play_mode, mode),
                (PlayMode::Running, PlayMode::Paused) | (PlayMode::Paused, PlayMode::Running)
            );
            if allowed {
                world.play_mode = mode;
                out_events.push(Event::PlayModeChanged { mode });
            }
        }
        Command::Tick { dt } => {
            if world.play_mode != PlayMode::Running {
                return;
            }
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            let path = &world.config.path;
            for enemy in world.enemies.iter_mut() {
                enemy.tick(dt, path, &mut world.rng);
            }
            world.retire_inactive_enemies(out_events);
        }
        Command::BeginWave { wave, enemies } => {
            if world.play_mode != PlayMode::Running {
                return;
            }
            world.wave = wave;
            world.wave_started_at = Some(world.clock);
            info!(wave, enemies, "wave started");
            out_events.push(Event::WaveStarted { wave, enemies });
        }
        Command::SpawnEnemy { kind } => {
            if world.play_mode != PlayMode::Running {
                return;
            }
            let id = world.allocate_enemy_id();
            let enemy = Enemy::spawn(id, kind, &world.config.path);
            let position = enemy.position();
            world.enemies.push(enemy);
            out_events.push(Event::EnemySpawned {
                enemy: id,
                kind,
                position,
            });
        }
        Command::PlaceTower { kind, position } => match world.place_tower(kind, position) {
            Ok(tower) => {
                let cost = kind.profile().cost;
                debug!(tower = tower.get(), %kind, x = position.x, y = position.y, cost, "tower placed");
                out_events.push(Event::TowerPlaced {
                    tower,
                    kind,
                    position,
                    cost,
                });
            }
            Err(reason) => {
                debug!(%kind, x = position.x, y = position.y, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected {
                    kind,
                    position,
                    reason,
                });
            }
        },
        Command::UpgradeTower { tower } => match world.upgrade_tower(tower) {
            Ok((level, cost)) => {
                debug!(tower = tower.get(), level, cost, "tower upgraded");
                out_events.push(Event::TowerUpgraded { tower, level, cost });
            }
            Err(reason) => {
                debug!(tower = tower.get(), %reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
            }
        },
        Command::AimTower { tower, target } => {
            if world.play_mode != PlayMode::Running {
                return;
            }
            if let Some(entry) = world.towers.iter_mut().find(|entry| entry.id() == tower) {
                entry.aim(target);
            }
        }
        Command::FireProjectile { tower, target } => {
            if world.play_mode != PlayMode::Running {
                return;
            }
            let now = world.clock;
            let Some(tower_index) = world.towers.iter().position(|entry| entry.id() == tower)
            else {
                return;
            };
            let Some(enemy_index) = world
                .enemies
                .iter()
                .position(|enemy| enemy.id() == target && enemy.is_active())
            else {
                return;
            };
            let entry = &world.towers[tower_index];
            let in_range =
                entry.position().distance(world.enemies[enemy_index].position()) <= entry.range();
            if !in_range || !entry.can_fire(now) {
                return;
            }
            let id = world.allocate_projectile_id();
            let projectile = world.towers[tower_index].fire(id, &world.enemies[enemy_index], now);
            trace!(projectile = id.get(), tower = tower.get(), target = target.get(), "projectile fired");
            world.projectiles.push(projectile);
            out_events.push(Event::ProjectileFired {
                projectile: id,
                tower,
                target,
            });
        }
        Command::StepProjectiles { dt } => {
            if world.play_mode != PlayMode::Running {
                return;
            }
            world.step_projectiles(dt, out_events);
            world.retire_inactive_enemies(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use defense_zone_core::{
        Difficulty, EnemyId, EnemyKind, EnemySnapshot, EnemyView, LedgerSnapshot, PlacementError,
        PlayMode, ProjectileView, SimulationConfig, TowerId, TowerKind, TowerSnapshot, TowerView,
    };
    use glam::Vec2;

    use super::World;

    /// Reports the current play mode.
    #[must_use]
    pub fn play_mode(world: &World) -> PlayMode {
        world.play_mode
    }

    /// Difficulty of the current or most recent session.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Simulated time elapsed since the session started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Captures the money and lives in the ledger.
    #[must_use]
    pub fn ledger(world: &World) -> LedgerSnapshot {
        world.ledger.snapshot()
    }

    /// Number of the most recently started wave, zero before the first.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Clock reading at which the most recent wave started.
    #[must_use]
    pub fn wave_started_at(world: &World) -> Option<Duration> {
        world.wave_started_at
    }

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Waypoints enemies follow.
    #[must_use]
    pub fn path(world: &World) -> &[Vec2] {
        &world.config.path
    }

    /// Number of enemies on the field.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures a read-only view of the enemies on the field.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|tower| tower.snapshot(world.clock))
                .collect(),
        )
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Looks up a single enemy.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<EnemySnapshot> {
        world
            .enemies
            .iter()
            .find(|enemy| enemy.id() == id)
            .map(|enemy| enemy.snapshot())
    }

    /// Looks up a single tower.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<TowerSnapshot> {
        world
            .towers
            .iter()
            .find(|tower| tower.id() == id)
            .map(|tower| tower.snapshot(world.clock))
    }

    /// Enemies within `radius` of `center`, in spawn order.
    #[must_use]
    pub fn enemies_in_range(world: &World, center: Vec2, radius: f32) -> Vec<EnemySnapshot> {
        enemies_where(world, |snapshot| snapshot.position.distance(center) <= radius)
    }

    /// Enemies whose health fraction is below `fraction`, in spawn order.
    #[must_use]
    pub fn enemies_below_health(world: &World, fraction: f32) -> Vec<EnemySnapshot> {
        enemies_where(world, |snapshot| snapshot.health_fraction() < fraction)
    }

    /// Enemies of the provided kind, in spawn order.
    #[must_use]
    pub fn enemies_of_kind(world: &World, kind: EnemyKind) -> Vec<EnemySnapshot> {
        enemies_where(world, |snapshot| snapshot.kind == kind)
    }

    fn enemies_where(
        world: &World,
        predicate: impl Fn(&EnemySnapshot) -> bool,
    ) -> Vec<EnemySnapshot> {
        enemy_view(world)
            .into_vec()
            .into_iter()
            .filter(|snapshot| predicate(snapshot))
            .collect()
    }

    /// Reports whether a tower of `kind` could be placed at `position` right now.
    pub fn placement_check(
        world: &World,
        kind: TowerKind,
        position: Vec2,
    ) -> Result<(), PlacementError> {
        world.placement_check(kind, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defense_zone_core::{EnemyKind, REFERENCE_PATH};

    const FRAME: Duration = Duration::from_millis(16);

    fn running_world(difficulty: Difficulty) -> (World, Vec<Event>) {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(&mut world, Command::StartGame { difficulty }, &mut events);
        (world, events)
    }

    fn short_path_world() -> World {
        let config = SimulationConfig {
            path: vec![Vec2::new(0.0, 100.0), Vec2::new(100.0, 100.0)],
            ..SimulationConfig::default()
        };
        let mut world = World::new(config);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Medium,
            },
            &mut events,
        );
        world
    }

    fn place(world: &mut World, kind: TowerKind, position: Vec2) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::PlaceTower { kind, position }, &mut events);
        events
    }

    #[test]
    fn start_game_seeds_ledger_from_difficulty() {
        let (world, events) = running_world(Difficulty::Easy);
        assert_eq!(query::play_mode(&world), PlayMode::Running);
        assert_eq!(query::ledger(&world).money, 300);
        assert_eq!(query::ledger(&world).lives, 5);
        assert_eq!(
            events.first(),
            Some(&Event::GameStarted {
                difficulty: Difficulty::Easy,
                money: 300,
                lives: 5,
            })
        );
    }

    #[test]
    fn ticks_are_ignored_while_idle_or_paused() {
        let mut world = World::default();
        let mut events = Vec::new();
        apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::clock(&world), Duration::ZERO);

        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Medium,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SetPlayMode {
                mode: PlayMode::Paused,
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn placement_near_path_is_rejected_regardless_of_funds() {
        let (mut world, _) = running_world(Difficulty::Easy);
        for waypoint in REFERENCE_PATH {
            let events = place(&mut world, TowerKind::Cannon, waypoint + Vec2::new(30.0, 30.0));
            assert!(matches!(
                events.as_slice(),
                [Event::TowerPlacementRejected {
                    reason: PlacementError::TooCloseToPath,
                    ..
                }]
            ));
        }
        assert_eq!(query::ledger(&world).money, 300);
    }

    #[test]
    fn placement_near_path_is_rejected_even_when_unaffordable() {
        let (mut world, _) = running_world(Difficulty::Hard);
        let _ = place(&mut world, TowerKind::Missile, Vec2::new(300.0, 700.0));
        assert_eq!(query::ledger(&world).money, 50);
        assert_eq!(
            query::placement_check(&world, TowerKind::Missile, Vec2::new(700.0, 100.0)),
            Err(PlacementError::InsufficientFunds {
                required: 100,
                available: 50,
            })
        );

        let events = place(
            &mut world,
            TowerKind::Missile,
            REFERENCE_PATH[5] + Vec2::new(20.0, -20.0),
        );
        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::TooCloseToPath,
                ..
            }]
        ));
        assert_eq!(query::ledger(&world).money, 50);
    }

    #[test]
    fn placement_debits_cost_and_enforces_spacing() {
        let (mut world, _) = running_world(Difficulty::Medium);
        let site = Vec2::new(300.0, 400.0);
        let events = place(&mut world, TowerKind::Missile, site);
        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlaced { cost: 100, .. }]
        ));
        assert_eq!(query::ledger(&world).money, 100);

        let events = place(&mut world, TowerKind::Cannon, site + Vec2::new(40.0, 0.0));
        assert!(matches!(
            events.as_slice(),
            [Event::TowerPlacementRejected {
                reason: PlacementError::TooCloseToTower,
                ..
            }]
        ));

        let _ = place(&mut world, TowerKind::Missile, Vec2::new(300.0, 700.0));
        let events = place(&mut world, TowerKind::Missile, Vec2::new(700.0, 700.0));
        assert_eq!(
            events,
            vec![Event::TowerPlacementRejected {
                kind: TowerKind::Missile,
                position: Vec2::new(700.0, 700.0),
                reason: PlacementError::InsufficientFunds {
                    required: 100,
                    available: 0,
                },
            }]
        );
    }

    #[test]
    fn placement_outside_session_or_playfield_is_rejected() {
        let idle = World::default();
        assert_eq!(
            query::placement_check(&idle, TowerKind::Cannon, Vec2::new(300.0, 400.0)),
            Err(PlacementError::InvalidMode)
        );
        let (world, _) = running_world(Difficulty::Medium);
        assert_eq!(
            query::placement_check(&world, TowerKind::Cannon, Vec2::new(-5.0, 400.0)),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(
            query::placement_check(&world, TowerKind::Cannon, Vec2::new(300.0, 400.0)),
            Ok(())
        );
    }

    #[test]
    fn enemy_reaching_end_costs_a_life_and_is_removed() {
        let mut world = short_path_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Basic,
            },
            &mut events,
        );
        for _ in 0..200 {
            apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        }
        assert!(events.iter().any(|event| matches!(
            event,
            Event::EnemyReachedEnd {
                lives_remaining: 2,
                ..
            }
        )));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::EnemyKilled { .. })));
        assert_eq!(query::enemy_count(&world), 0);
        assert_eq!(query::ledger(&world).lives, 2);
    }

    #[test]
    fn last_life_lost_ends_the_game() {
        let config = SimulationConfig {
            path: vec![Vec2::new(0.0, 100.0), Vec2::new(20.0, 100.0)],
            ..SimulationConfig::default()
        };
        let mut world = World::new(config);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Hard,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Basic,
            },
            &mut events,
        );
        events.clear();
        for _ in 0..60 {
            apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        }
        assert!(events.contains(&Event::GameOver));
        assert_eq!(query::play_mode(&world), PlayMode::GameOver);
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::GameOver))
                .count(),
            1
        );
    }

    #[test]
    fn laser_kill_credits_reward_and_tower() {
        let mut world = short_path_world();
        let mut events = Vec::new();
        let _ = place(&mut world, TowerKind::Laser, Vec2::new(0.0, 160.0));
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Basic,
            },
            &mut events,
        );
        let tower = TowerId::new(0);
        let enemy = EnemyId::new(0);
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: enemy,
            },
            &mut events,
        );
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ProjectileFired { .. })));

        events.clear();
        for _ in 0..20 {
            apply(&mut world, Command::StepProjectiles { dt: FRAME }, &mut events);
        }

        assert!(events.iter().any(|event| matches!(
            event,
            Event::ProjectileHit { damage: 50, .. }
        )));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::EnemyKilled {
                reward: 10,
                tower: Some(id),
                ..
            } if *id == tower
        )));
        assert_eq!(query::tower(&world, tower).map(|snapshot| snapshot.kills), Some(1));
        assert_eq!(query::ledger(&world).money, 200 - 75 + 10);
        assert!(query::projectile_view(&world).is_empty());
    }

    #[test]
    fn shell_expires_at_its_aim_point_when_the_enemy_moved_away() {
        let config = SimulationConfig {
            path: vec![Vec2::new(200.0, 300.0), Vec2::new(200.0, 700.0)],
            ..SimulationConfig::default()
        };
        let mut world = World::new(config);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Medium,
            },
            &mut events,
        );
        let _ = place(&mut world, TowerKind::Cannon, Vec2::new(100.0, 300.0));
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Basic,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::FireProjectile {
                tower: TowerId::new(0),
                target: EnemyId::new(0),
            },
            &mut events,
        );
        for _ in 0..15 {
            apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        }
        let enemy = query::enemy(&world, EnemyId::new(0)).expect("enemy on the path");
        assert!(enemy.position.distance(Vec2::new(200.0, 312.0)) < 0.01);

        events.clear();
        for _ in 0..30 {
            apply(&mut world, Command::StepProjectiles { dt: FRAME }, &mut events);
        }
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::ProjectileHit { .. })));
        assert!(query::projectile_view(&world).is_empty());
        assert_eq!(
            query::enemy(&world, EnemyId::new(0)).map(|enemy| enemy.health),
            Some(50)
        );
    }

    #[test]
    fn cooldown_blocks_rapid_fire() {
        let mut world = short_path_world();
        let mut events = Vec::new();
        let _ = place(&mut world, TowerKind::Cannon, Vec2::new(0.0, 160.0));
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Tank,
            },
            &mut events,
        );
        events.clear();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::FireProjectile {
                    tower: TowerId::new(0),
                    target: EnemyId::new(0),
                },
                &mut events,
            );
        }
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::ProjectileFired { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn upgrades_debit_money_and_stop_at_max_level() {
        let (mut world, _) = running_world(Difficulty::Easy);
        let _ = place(&mut world, TowerKind::Cannon, Vec2::new(300.0, 400.0));
        let tower = TowerId::new(0);
        let mut events = Vec::new();
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        assert_eq!(
            events,
            vec![Event::TowerUpgraded {
                tower,
                level: 2,
                cost: 40
            }]
        );
        assert_eq!(query::ledger(&world).money, 300 - 50 - 40);

        events.clear();
        apply(
            &mut world,
            Command::UpgradeTower {
                tower: TowerId::new(9),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::TowerUpgradeRejected {
                tower: TowerId::new(9),
                reason: UpgradeError::MissingTower
            }]
        );
    }

    #[test]
    fn enemy_queries_filter_snapshots() {
        let mut world = short_path_world();
        let mut events = Vec::new();
        for kind in [EnemyKind::Basic, EnemyKind::Tank, EnemyKind::Basic] {
            apply(&mut world, Command::SpawnEnemy { kind }, &mut events);
        }
        assert_eq!(query::enemies_of_kind(&world, EnemyKind::Basic).len(), 2);
        assert_eq!(
            query::enemies_in_range(&world, Vec2::new(0.0, 100.0), 1.0).len(),
            3
        );
        assert!(query::enemies_below_health(&world, 0.5).is_empty());
        assert_eq!(query::enemy(&world, EnemyId::new(1)).map(|e| e.kind), Some(EnemyKind::Tank));
    }

    #[test]
    fn restart_clears_the_field() {
        let mut world = short_path_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Fast,
            },
            &mut events,
        );
        let _ = place(&mut world, TowerKind::Cannon, Vec2::new(50.0, 200.0));
        apply(&mut world, Command::Tick { dt: FRAME }, &mut events);
        apply(
            &mut world,
            Command::StartGame {
                difficulty: Difficulty::Hard,
            },
            &mut events,
        );
        assert_eq!(query::enemy_count(&world), 0);
        assert!(query::tower_view(&world).is_empty());
        assert_eq!(query::clock(&world), Duration::ZERO);
        assert_eq!(query::ledger(&world).money, 150);
    }
}
