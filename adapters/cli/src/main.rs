#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Defense Zone session.
//!
//! Towers are bought and upgraded up front, then the simulation runs at its
//! configured frame rate until the player wins, loses or the time limit
//! expires. Progress is printed periodically and a summary at the end.

use std::{fmt, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use defense_zone_core::{Difficulty, Event, SimulationConfig, TowerId, TowerKind};
use defense_zone_simulation::Simulation;
use glam::Vec2;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "defense-zone")]
#[command(about = "Runs a headless Defense Zone session")]
struct Args {
    /// Difficulty preset: easy, medium or hard.
    #[arg(long, default_value = "medium")]
    difficulty: Difficulty,

    /// Seed for wave composition and enemy speed jitter.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of waves in the session.
    #[arg(long, default_value_t = 10)]
    waves: u32,

    /// Frames simulated per second of game time.
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,

    /// Quiet time between the start of one wave and the next, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    inter_wave_delay_ms: u64,

    /// Tower to buy before the first frame, as `kind@x,y`. May be repeated.
    #[arg(long = "tower")]
    towers: Vec<TowerOrder>,

    /// Index of a bought tower to upgrade once. May be repeated.
    #[arg(long = "upgrade")]
    upgrades: Vec<u32>,

    /// Game time after which the session is abandoned, in seconds.
    #[arg(long, default_value_t = 900)]
    max_seconds: u64,

    /// Interval between progress lines, in seconds of game time. Zero disables them.
    #[arg(long, default_value_t = 30)]
    report_every: u64,
}

/// Tower purchase requested on the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerOrder {
    kind: TowerKind,
    position: Vec2,
}

impl fmt::Display for TowerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{},{}", self.kind, self.position.x, self.position.y)
    }
}

impl FromStr for TowerOrder {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let (kind, coordinates) = value
            .split_once('@')
            .with_context(|| format!("expected `kind@x,y`, got `{value}`"))?;
        let kind = kind.parse::<TowerKind>()?;
        let (x, y) = coordinates
            .split_once(',')
            .with_context(|| format!("expected `x,y` coordinates, got `{coordinates}`"))?;
        let x = x
            .trim()
            .parse::<f32>()
            .with_context(|| format!("invalid x coordinate `{x}`"))?;
        let y = y
            .trim()
            .parse::<f32>()
            .with_context(|| format!("invalid y coordinate `{y}`"))?;
        if !x.is_finite() || !y.is_finite() {
            bail!("coordinates must be finite, got `{coordinates}`");
        }
        Ok(Self {
            kind,
            position: Vec2::new(x, y),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Victory,
    Defeat,
    TimedOut,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Victory => "victory",
            Self::Defeat => "defeat",
            Self::TimedOut => "time limit reached",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Default)]
struct Tally {
    kills: u32,
    leaks: u32,
    shots: u32,
    earned: u32,
}

impl Tally {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EnemyKilled { reward, .. } => {
                self.kills += 1;
                self.earned += reward;
            }
            Event::EnemyReachedEnd { .. } => self.leaks += 1,
            Event::ProjectileFired { .. } => self.shots += 1,
            _ => {}
        }
    }
}

/// Entry point for the Defense Zone command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = SimulationConfig {
        total_waves: args.waves,
        tick_rate_hz: args.tick_rate,
        inter_wave_delay: Duration::from_millis(args.inter_wave_delay_ms),
        rng_seed: args.seed,
        ..SimulationConfig::default()
    };
    let mut simulation = Simulation::new(config).context("invalid simulation settings")?;
    simulation.start_game(args.difficulty);

    let mut bought = Vec::with_capacity(args.towers.len());
    for order in &args.towers {
        let tower = simulation
            .place_tower(order.kind, order.position)
            .with_context(|| format!("could not place tower {order}"))?;
        bought.push(tower);
    }
    for index in &args.upgrades {
        let tower = usize::try_from(*index)
            .ok()
            .and_then(|index| bought.get(index).copied())
            .with_context(|| format!("no bought tower at index {index}"))?;
        let level = simulation
            .upgrade_tower(tower)
            .with_context(|| format!("could not upgrade tower {index}"))?;
        info!(tower = tower.get(), level, "tower upgraded");
    }

    let (outcome, tally) = run(&mut simulation, &args);
    print_summary(&simulation, &bought, outcome, &tally);
    Ok(())
}

fn run(simulation: &mut Simulation, args: &Args) -> (Outcome, Tally) {
    let frame = simulation.config().frame_duration();
    let limit = Duration::from_secs(args.max_seconds);
    let report_every = Duration::from_secs(args.report_every);
    let mut next_report = report_every;
    let mut tally = Tally::default();

    while simulation.clock() < limit {
        for event in simulation.tick(frame) {
            tally.record(event);
        }
        if simulation.is_game_over() {
            return (Outcome::Defeat, tally);
        }
        if simulation.is_victorious() {
            return (Outcome::Victory, tally);
        }
        if !report_every.is_zero() && simulation.clock() >= next_report {
            next_report += report_every;
            let ledger = simulation.ledger();
            println!(
                "[{:>6.1}s] wave {}/{} enemies {} money {} lives {}",
                simulation.clock().as_secs_f32(),
                simulation.wave_number(),
                simulation.total_waves(),
                simulation.enemies().len(),
                ledger.money,
                ledger.lives,
            );
        }
    }

    warn!(seconds = args.max_seconds, "session abandoned at the time limit");
    (Outcome::TimedOut, tally)
}

fn print_summary(simulation: &Simulation, bought: &[TowerId], outcome: Outcome, tally: &Tally) {
    let ledger = simulation.ledger();
    println!("outcome: {outcome}");
    println!(
        "waves: {}/{} in {:.1}s",
        simulation.wave_number(),
        simulation.total_waves(),
        simulation.clock().as_secs_f32()
    );
    println!(
        "kills: {} (earned {}), leaks: {}, shots fired: {}",
        tally.kills, tally.earned, tally.leaks, tally.shots
    );
    println!("money: {}, lives: {}", ledger.money, ledger.lives);
    for tower in simulation.towers().iter() {
        if !bought.contains(&tower.id) {
            continue;
        }
        println!(
            "  tower {} {} level {} at ({:.0}, {:.0}): {} kills",
            tower.id.get(),
            tower.kind,
            tower.level,
            tower.position.x,
            tower.position.y,
            tower.kills
        );
    }
}
