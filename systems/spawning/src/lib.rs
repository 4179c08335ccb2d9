#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that releases a wave's enemies on schedule.
//!
//! Spawns wait in a priority queue keyed on simulation time and are released
//! as `TimeAdvanced` events move the system's clock past their due time.

use std::{cmp::Reverse, collections::BinaryHeap, time::Duration};

use defense_zone_core::{Command, EnemyKind, Event, PlayMode, WaveSchedule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct PendingSpawn {
    due: Duration,
    sequence: u64,
    kind: EnemyKind,
}

/// Pure system that emits spawn commands as scheduled spawns fall due.
#[derive(Debug, Default)]
pub struct Spawning {
    clock: Duration,
    queue: BinaryHeap<Reverse<PendingSpawn>>,
    next_sequence: u64,
}

impl Spawning {
    /// Creates an idle spawning system with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes events and an optional freshly started wave to emit spawn commands.
    ///
    /// Time only advances while the simulation is running, so pending spawns
    /// keep their place in the schedule across a pause. A wave handed over in
    /// any mode is queued; its spawns are released once the simulation runs.
    pub fn handle(
        &mut self,
        events: &[Event],
        play_mode: PlayMode,
        wave: Option<&WaveSchedule>,
        out: &mut Vec<Command>,
    ) {
        let running = play_mode == PlayMode::Running;
        if running {
            for event in events {
                if let Event::TimeAdvanced { dt } = event {
                    self.clock = self.clock.saturating_add(*dt);
                }
            }
        }

        if let Some(schedule) = wave {
            self.schedule(schedule);
        }

        if !running {
            return;
        }

        while let Some(Reverse(next)) = self.queue.peek() {
            if next.due > self.clock {
                break;
            }
            let kind = next.kind;
            let _ = self.queue.pop();
            out.push(Command::SpawnEnemy { kind });
        }
    }

    /// Queues every spawn of the wave relative to the current clock.
    pub fn schedule(&mut self, wave: &WaveSchedule) {
        for spawn in wave.spawns() {
            let pending = PendingSpawn {
                due: self.clock.saturating_add(spawn.delay),
                sequence: self.next_sequence,
                kind: spawn.kind,
            };
            self.next_sequence += 1;
            self.queue.push(Reverse(pending));
        }
    }

    /// Number of spawns still waiting to be released.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Reports whether no spawns are waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Simulated time observed by the system.
    #[must_use]
    pub const fn clock(&self) -> Duration {
        self.clock
    }

    /// Drops every pending spawn and rewinds the clock.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.clock = Duration::ZERO;
        self.next_sequence = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defense_zone_core::ScheduledSpawn;

    fn wave(kinds: &[EnemyKind]) -> WaveSchedule {
        WaveSchedule::new(
            1,
            kinds
                .iter()
                .zip(0_u32..)
                .map(|(kind, index)| ScheduledSpawn {
                    kind: *kind,
                    delay: Duration::from_secs(1) * index,
                })
                .collect(),
        )
    }

    #[test]
    fn equal_due_times_release_in_schedule_order() {
        let mut spawning = Spawning::new();
        let schedule = WaveSchedule::new(
            1,
            vec![
                ScheduledSpawn {
                    kind: EnemyKind::Tank,
                    delay: Duration::ZERO,
                },
                ScheduledSpawn {
                    kind: EnemyKind::Basic,
                    delay: Duration::ZERO,
                },
            ],
        );
        let mut out = Vec::new();
        spawning.handle(&[], PlayMode::Running, Some(&schedule), &mut out);
        assert_eq!(
            out,
            vec![
                Command::SpawnEnemy {
                    kind: EnemyKind::Tank
                },
                Command::SpawnEnemy {
                    kind: EnemyKind::Basic
                },
            ]
        );
    }

    #[test]
    fn reset_clears_pending_spawns() {
        let mut spawning = Spawning::new();
        spawning.schedule(&wave(&[EnemyKind::Basic, EnemyKind::Fast]));
        assert_eq!(spawning.pending(), 2);
        spawning.reset();
        assert!(spawning.is_idle());
        assert_eq!(spawning.clock(), Duration::ZERO);
    }
}
