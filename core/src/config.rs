//! Startup configuration shared by the world and its orchestrator.

use std::time::Duration;

use glam::Vec2;
use thiserror::Error;

/// Waypoints of the reference map, from spawn to exit.
pub const REFERENCE_PATH: [Vec2; 12] = [
    Vec2::new(50.0, 400.0),
    Vec2::new(200.0, 400.0),
    Vec2::new(200.0, 200.0),
    Vec2::new(400.0, 200.0),
    Vec2::new(400.0, 600.0),
    Vec2::new(600.0, 600.0),
    Vec2::new(600.0, 300.0),
    Vec2::new(800.0, 300.0),
    Vec2::new(800.0, 500.0),
    Vec2::new(1000.0, 500.0),
    Vec2::new(1000.0, 200.0),
    Vec2::new(1150.0, 200.0),
];

/// Axis-aligned rectangle anchored at the origin that bounds all entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    width: f32,
    height: f32,
}

impl Playfield {
    /// Creates a playfield with the provided dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent in playfield units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent in playfield units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Reports whether the point lies inside the playfield, borders included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(1300.0, 800.0)
    }
}

/// Tunables handed to the simulation when it boots.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Bounds that projectiles expire outside of and towers must be placed in.
    pub playfield: Playfield,
    /// Polyline enemies follow, from spawn point to exit.
    pub path: Vec<Vec2>,
    /// Quiet time between the start of one wave and the next wave request.
    pub inter_wave_delay: Duration,
    /// Number of waves before the generator is exhausted.
    pub total_waves: u32,
    /// Minimum distance between a new tower and every path waypoint.
    pub path_clearance: f32,
    /// Minimum distance between a new tower and every existing tower.
    pub tower_spacing: f32,
    /// Frame rate the presentation layer drives `tick` with.
    pub tick_rate_hz: u32,
    /// Seed for wave composition and enemy speed jitter.
    pub rng_seed: u64,
}

impl SimulationConfig {
    /// Duration of a single frame at the configured tick rate, in whole milliseconds.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        if self.tick_rate_hz == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(u64::from(1_000 / self.tick_rate_hz))
    }

    /// Checks the configuration for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.len() < 2 {
            return Err(ConfigError::PathTooShort {
                waypoints: self.path.len(),
            });
        }
        if self.playfield.width() <= 0.0 || self.playfield.height() <= 0.0 {
            return Err(ConfigError::EmptyPlayfield);
        }
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1_000 {
            return Err(ConfigError::InvalidTickRate {
                tick_rate_hz: self.tick_rate_hz,
            });
        }
        if self.total_waves == 0 {
            return Err(ConfigError::NoWaves);
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),
            path: REFERENCE_PATH.to_vec(),
            inter_wave_delay: Duration::from_secs(10),
            total_waves: 10,
            path_clearance: 50.0,
            tower_spacing: 60.0,
            tick_rate_hz: 60,
            rng_seed: 0x5eed_d3f3_2e0e_0003,
        }
    }
}

/// Reasons a [`SimulationConfig`] is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Enemies need at least a spawn point and an exit.
    #[error("path needs at least two waypoints, got {waypoints}")]
    PathTooShort {
        /// Number of waypoints provided.
        waypoints: usize,
    },
    /// The playfield has no area.
    #[error("playfield must have a positive width and height")]
    EmptyPlayfield,
    /// Frames must last at least one whole millisecond.
    #[error("tick rate must be between 1 and 1000 Hz, got {tick_rate_hz}")]
    InvalidTickRate {
        /// Rate that was provided.
        tick_rate_hz: u32,
    },
    /// At least one wave must be scheduled.
    #[error("at least one wave must be configured")]
    NoWaves,
}
