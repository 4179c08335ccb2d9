#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits aim and projectile firing commands from targeting data.

use defense_zone_core::{Command, PlayMode, TowerId, TowerSnapshot, TowerTarget, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::AimTower` for towers whose target changed and
    /// `Command::FireProjectile` for targeted towers whose cooldown elapsed.
    ///
    /// `tower_targets` must be ordered by tower, as produced by the targeting system.
    pub fn handle(
        &mut self,
        play_mode: PlayMode,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if play_mode != PlayMode::Running {
            return;
        }

        if towers.is_empty() {
            return;
        }

        self.scratch.clear();

        for snapshot in towers.iter() {
            let target = find_target(tower_targets, snapshot.id);
            let enemy = target.map(|target| target.enemy);
            if snapshot.target != enemy {
                self.scratch.push(Command::AimTower {
                    tower: snapshot.id,
                    target: enemy,
                });
            }
            if let Some(enemy) = enemy {
                if is_ready(snapshot) {
                    self.scratch.push(Command::FireProjectile {
                        tower: snapshot.id,
                        target: enemy,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn is_ready(snapshot: &TowerSnapshot) -> bool {
    snapshot.ready_in.is_zero()
}

fn find_target(targets: &[TowerTarget], tower: TowerId) -> Option<&TowerTarget> {
    targets
        .binary_search_by_key(&tower, |target| target.tower)
        .ok()
        .map(|index| &targets[index])
}
