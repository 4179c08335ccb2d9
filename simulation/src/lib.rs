#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-stepped orchestration of the Defense Zone world and its systems.
//!
//! [`Simulation`] owns the authoritative [`World`] together with the pure
//! systems that read it. Every frame it advances the world, lets towers pick
//! and engage targets, steps projectiles, requests waves and releases due
//! spawns. All mutation flows through [`world::apply`], so a frame is a
//! fixed sequence of commands and two simulations fed the same inputs stay
//! in lockstep.

use std::time::Duration;

use defense_zone_core::{
    Command, ConfigError, Difficulty, EnemyView, Event, LedgerSnapshot, PlacementError, PlayMode,
    ProjectileView, SimulationConfig, TowerId, TowerKind, TowerTarget, TowerView, UpgradeError,
    WaveSchedule,
};
use defense_zone_system_spawning::Spawning;
use defense_zone_system_tower_combat::TowerCombat;
use defense_zone_system_tower_targeting::TowerTargeting;
use defense_zone_system_wave_generation::WaveGenerator;
use defense_zone_world::{self as world, query, World};
use glam::Vec2;
use tracing::{debug, info};

/// Owns the world and drives every system once per frame.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    generator: WaveGenerator,
    targeting: TowerTargeting,
    combat: TowerCombat,
    spawning: Spawning,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
    exhaustion_logged: bool,
    victory_logged: bool,
}

impl Simulation {
    /// Creates an idle simulation after validating the configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = WaveGenerator::with_total_waves(
            Difficulty::Medium,
            config.total_waves,
            config.rng_seed,
        );
        Ok(Self {
            world: World::new(config),
            generator,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            spawning: Spawning::new(),
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
            exhaustion_logged: false,
            victory_logged: false,
        })
    }

    /// Starts a fresh session, discarding every entity, pending spawn and wave.
    pub fn start_game(&mut self, difficulty: Difficulty) {
        let config = query::config(&self.world);
        self.generator =
            WaveGenerator::with_total_waves(difficulty, config.total_waves, config.rng_seed);
        self.spawning.reset();
        self.targets.clear();
        self.commands.clear();
        self.exhaustion_logged = false;
        self.victory_logged = false;

        self.events.clear();
        world::apply(
            &mut self.world,
            Command::StartGame { difficulty },
            &mut self.events,
        );
    }

    /// Advances the session by `dt` and returns the events the frame produced.
    ///
    /// Frames outside of [`PlayMode::Running`] are ignored and yield no events.
    pub fn tick(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();
        if query::play_mode(&self.world) != PlayMode::Running {
            return &self.events;
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);
        if query::play_mode(&self.world) == PlayMode::GameOver {
            return &self.events;
        }

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting
            .handle(PlayMode::Running, &towers, &enemies, &mut self.targets);
        self.combat
            .handle(PlayMode::Running, &towers, &self.targets, &mut self.commands);
        self.flush_commands();

        world::apply(
            &mut self.world,
            Command::StepProjectiles { dt },
            &mut self.events,
        );

        let wave = self.request_wave();
        if let Some(schedule) = &wave {
            world::apply(
                &mut self.world,
                Command::BeginWave {
                    wave: schedule.wave(),
                    enemies: u32::try_from(schedule.len()).unwrap_or(u32::MAX),
                },
                &mut self.events,
            );
        }
        self.spawning.handle(
            &self.events,
            query::play_mode(&self.world),
            wave.as_ref(),
            &mut self.commands,
        );
        self.flush_commands();

        if !self.victory_logged && self.is_victorious() {
            self.victory_logged = true;
            let ledger = query::ledger(&self.world);
            info!(
                waves = self.generator.total_waves(),
                money = ledger.money,
                lives = ledger.lives,
                "all waves cleared"
            );
        }

        &self.events
    }

    /// Pauses a running session, returning whether the mode changed.
    pub fn pause(&mut self) -> bool {
        self.set_play_mode(PlayMode::Paused)
    }

    /// Resumes a paused session, returning whether the mode changed.
    pub fn resume(&mut self) -> bool {
        self.set_play_mode(PlayMode::Running)
    }

    fn set_play_mode(&mut self, mode: PlayMode) -> bool {
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::SetPlayMode { mode },
            &mut self.events,
        );
        !self.events.is_empty()
    }

    /// Buys and places a tower, reporting why the site was refused otherwise.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
    ) -> Result<TowerId, PlacementError> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::PlaceTower { kind, position },
            &mut events,
        );
        for event in events {
            match event {
                Event::TowerPlaced { tower, .. } => return Ok(tower),
                Event::TowerPlacementRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }
        Err(PlacementError::InvalidMode)
    }

    /// Buys the next level of a tower, returning the level reached.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<u8, UpgradeError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::UpgradeTower { tower }, &mut events);
        for event in events {
            match event {
                Event::TowerUpgraded { level, .. } => return Ok(level),
                Event::TowerUpgradeRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }
        Err(UpgradeError::InvalidMode)
    }

    /// Reports whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        query::play_mode(&self.world) == PlayMode::GameOver
    }

    /// Reports whether every wave was dispatched and the field is clear.
    #[must_use]
    pub fn is_victorious(&self) -> bool {
        matches!(
            query::play_mode(&self.world),
            PlayMode::Running | PlayMode::Paused
        ) && self.generator.is_exhausted()
            && self.spawning.is_idle()
            && query::enemy_count(&self.world) == 0
    }

    /// Current play mode.
    #[must_use]
    pub fn play_mode(&self) -> PlayMode {
        query::play_mode(&self.world)
    }

    /// Number of the most recently started wave, zero before the first.
    #[must_use]
    pub fn wave_number(&self) -> u32 {
        query::wave(&self.world)
    }

    /// Number of waves in the current session.
    #[must_use]
    pub fn total_waves(&self) -> u32 {
        self.generator.total_waves()
    }

    /// Simulated time since the session started.
    #[must_use]
    pub fn clock(&self) -> Duration {
        query::clock(&self.world)
    }

    /// Snapshot of the enemies on the field.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Snapshot of the placed towers.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Snapshot of the projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Money and lives left.
    #[must_use]
    pub fn ledger(&self) -> LedgerSnapshot {
        query::ledger(&self.world)
    }

    /// Events produced by the most recent frame or session change.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Configuration the simulation was created with.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        query::config(&self.world)
    }

    /// Read-only access to the underlying world for detailed queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn request_wave(&mut self) -> Option<WaveSchedule> {
        if !self.next_wave_due() {
            return None;
        }
        match self.generator.next_wave() {
            Ok(schedule) => {
                debug!(
                    wave = schedule.wave(),
                    remaining = self.generator.remaining(),
                    "wave requested"
                );
                Some(schedule)
            }
            Err(exhausted) => {
                if !self.exhaustion_logged {
                    self.exhaustion_logged = true;
                    info!(%exhausted, "no waves left to dispatch");
                }
                None
            }
        }
    }

    fn next_wave_due(&self) -> bool {
        if query::enemy_count(&self.world) > 0 || !self.spawning.is_idle() {
            return false;
        }
        let since = query::wave_started_at(&self.world).unwrap_or(Duration::ZERO);
        query::clock(&self.world).saturating_sub(since)
            >= query::config(&self.world).inter_wave_delay
    }
}
