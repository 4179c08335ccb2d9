#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use defense_zone_core::{EnemyId, EnemyView, PlayMode, TowerSnapshot, TowerTarget, TowerView};
use glam::Vec2;

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Each tower picks the nearest enemy within its range; the
    /// first enemy in spawn order wins when distances tie.
    pub fn handle(
        &mut self,
        play_mode: PlayMode,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if play_mode != PlayMode::Running {
            return;
        }

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);

        for tower in towers.iter() {
            if let Some(target) = nearest(tower, &self.enemy_workspace) {
                out.push(target);
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());
        for snapshot in enemies.iter().filter(|snapshot| snapshot.health > 0) {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
            });
        }
    }
}

/// Finds the nearest live enemy within the tower's range.
#[must_use]
pub fn find_target(tower: &TowerSnapshot, enemies: &EnemyView) -> Option<TowerTarget> {
    let candidates: Vec<EnemyCandidate> = enemies
        .iter()
        .filter(|snapshot| snapshot.health > 0)
        .map(|snapshot| EnemyCandidate {
            id: snapshot.id,
            position: snapshot.position,
        })
        .collect();
    nearest(tower, &candidates)
}

fn nearest(tower: &TowerSnapshot, candidates: &[EnemyCandidate]) -> Option<TowerTarget> {
    let mut best: Option<TowerTarget> = None;
    for candidate in candidates {
        let distance = tower.position.distance(candidate.position);
        if distance > tower.range {
            continue;
        }
        if best.map_or(true, |existing| distance < existing.distance) {
            best = Some(TowerTarget {
                tower: tower.id,
                enemy: candidate.id,
                distance,
            });
        }
    }
    best
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Vec2,
}
