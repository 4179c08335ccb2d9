#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave generation system.
//!
//! Every wave's spawn plan is computed up front from the difficulty and a
//! seed, so a given seed always replays the same sequence of waves.

use std::time::Duration;

use defense_zone_core::{Difficulty, EnemyKind, ScheduledSpawn, WaveExhausted, WaveSchedule};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

/// Number of waves in a standard session.
pub const DEFAULT_TOTAL_WAVES: u32 = 10;

const ENEMIES_PER_WAVE: u32 = 3;
const MAX_WAVE_BASE_SIZE: u32 = 15;
const SPAWN_STAGGER: Duration = Duration::from_secs(1);

const EARLY_ROSTER: [EnemyKind; 1] = [EnemyKind::Basic];
const MIDDLE_ROSTER: [EnemyKind; 2] = [EnemyKind::Basic, EnemyKind::Fast];
const LATE_ROSTER: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Tank];

/// State machine that hands out precomputed wave schedules in order.
#[derive(Clone, Debug)]
pub struct WaveGenerator {
    difficulty: Difficulty,
    wave_number: u32,
    schedules: Vec<WaveSchedule>,
}

impl WaveGenerator {
    /// Creates a generator for a standard session of [`DEFAULT_TOTAL_WAVES`] waves.
    #[must_use]
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_total_waves(difficulty, DEFAULT_TOTAL_WAVES, seed)
    }

    /// Creates a generator that is exhausted after `total_waves` waves.
    #[must_use]
    pub fn with_total_waves(difficulty: Difficulty, total_waves: u32, seed: u64) -> Self {
        let schedules = (1..=total_waves)
            .map(|wave| build_schedule(wave, difficulty, seed))
            .collect();
        Self {
            difficulty,
            wave_number: 1,
            schedules,
        }
    }

    /// Returns the schedule of the next wave and advances to the one after it.
    pub fn next_wave(&mut self) -> Result<WaveSchedule, WaveExhausted> {
        let schedule = self
            .schedule(self.wave_number)
            .cloned()
            .ok_or(WaveExhausted {
                total_waves: self.total_waves(),
            })?;
        self.wave_number += 1;
        Ok(schedule)
    }

    /// Looks up the schedule of a wave without advancing.
    #[must_use]
    pub fn schedule(&self, wave: u32) -> Option<&WaveSchedule> {
        let index = usize::try_from(wave.checked_sub(1)?).ok()?;
        self.schedules.get(index)
    }

    /// One-based number of the wave the next call to [`WaveGenerator::next_wave`] returns.
    #[must_use]
    pub const fn wave_number(&self) -> u32 {
        self.wave_number
    }

    /// Number of waves the generator was created with.
    #[must_use]
    pub fn total_waves(&self) -> u32 {
        u32::try_from(self.schedules.len()).unwrap_or(u32::MAX)
    }

    /// Number of waves not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.total_waves()
            .saturating_sub(self.wave_number.saturating_sub(1))
    }

    /// Reports whether every wave has been handed out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Difficulty the schedules were generated for.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Scale factor applied to the number of enemies per wave.
    #[must_use]
    pub const fn difficulty_multiplier(&self) -> f64 {
        self.difficulty.multiplier()
    }
}

/// Number of enemies in `wave` after scaling by the difficulty multiplier.
#[must_use]
pub fn wave_size(wave: u32, multiplier: f64) -> u32 {
    let base = wave
        .saturating_mul(ENEMIES_PER_WAVE)
        .min(MAX_WAVE_BASE_SIZE);
    let scaled = (f64::from(base) * multiplier).floor();
    if scaled <= 0.0 {
        return 0;
    }
    scaled as u32
}

/// Enemy kinds a wave draws from.
#[must_use]
pub fn roster(wave: u32) -> &'static [EnemyKind] {
    match wave {
        0..=3 => &EARLY_ROSTER,
        4..=6 => &MIDDLE_ROSTER,
        _ => &LATE_ROSTER,
    }
}

fn build_schedule(wave: u32, difficulty: Difficulty, seed: u64) -> WaveSchedule {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(seed, difficulty, wave));
    let kinds = roster(wave);
    let spawns = (0..wave_size(wave, difficulty.multiplier()))
        .map(|index| ScheduledSpawn {
            kind: kinds[rng.gen_range(0..kinds.len())],
            delay: SPAWN_STAGGER * index,
        })
        .collect();
    WaveSchedule::new(wave, spawns)
}

fn derive_wave_seed(seed: u64, difficulty: Difficulty, wave: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(difficulty.name().as_bytes());
    hasher.update(wave.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
