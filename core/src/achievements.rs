//! Achievement rules, checked after every reduced event.

use std::collections::BTreeSet;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::state::{BoardState, Status, StepOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    FirstMerge,
    Tile128,
    Tile512,
    Tile2048,
    TripleMerge,
    FirstLevel,
    SpeedRun,
    Purist,
    Survivor,
}

/// One row of the rule table.
pub struct Achievement {
    pub id: AchievementId,
    pub title: &'static str,
    pub description: &'static str,
    predicate: fn(&BoardState, &StepOutcome) -> bool,
}

impl Achievement {
    pub fn is_met(&self, state: &BoardState, outcome: &StepOutcome) -> bool {
        (self.predicate)(state, outcome)
    }
}

const SPEED_RUN_LIMIT: Duration = Duration::from_secs(60);
const SURVIVOR_MOVES: u32 = 100;

fn first_merge(_: &BoardState, outcome: &StepOutcome) -> bool {
    !outcome.merges.is_empty()
}

fn tile_128(state: &BoardState, _: &StepOutcome) -> bool {
    state.max_tile() >= 128
}

fn tile_512(state: &BoardState, _: &StepOutcome) -> bool {
    state.max_tile() >= 512
}

fn tile_2048(state: &BoardState, _: &StepOutcome) -> bool {
    state.max_tile() >= 2048
}

fn triple_merge(_: &BoardState, outcome: &StepOutcome) -> bool {
    outcome.merges.len() >= 3
}

fn first_level(state: &BoardState, _: &StepOutcome) -> bool {
    state.status() == Status::LevelCompleted
}

/// Only counts once the level clock has been ticked.
fn speed_run(state: &BoardState, _: &StepOutcome) -> bool {
    state.status() == Status::LevelCompleted
        && !state.elapsed().is_zero()
        && state.elapsed() < SPEED_RUN_LIMIT
}

fn purist(state: &BoardState, _: &StepOutcome) -> bool {
    state.status() == Status::LevelCompleted && state.power_ups_used() == 0
}

fn survivor(state: &BoardState, _: &StepOutcome) -> bool {
    state.moves() >= SURVIVOR_MOVES
}

pub static ACHIEVEMENTS: [Achievement; 9] = [
    Achievement {
        id: AchievementId::FirstMerge,
        title: "First Merge",
        description: "Merge two tiles",
        predicate: first_merge,
    },
    Achievement {
        id: AchievementId::Tile128,
        title: "Getting Somewhere",
        description: "Build a 128 tile",
        predicate: tile_128,
    },
    Achievement {
        id: AchievementId::Tile512,
        title: "Halfway There",
        description: "Build a 512 tile",
        predicate: tile_512,
    },
    Achievement {
        id: AchievementId::Tile2048,
        title: "2048!",
        description: "Build a 2048 tile",
        predicate: tile_2048,
    },
    Achievement {
        id: AchievementId::TripleMerge,
        title: "Combo",
        description: "Make three merges in a single move",
        predicate: triple_merge,
    },
    Achievement {
        id: AchievementId::FirstLevel,
        title: "Level Up",
        description: "Complete a level",
        predicate: first_level,
    },
    Achievement {
        id: AchievementId::SpeedRun,
        title: "Speed Runner",
        description: "Complete a level in under a minute",
        predicate: speed_run,
    },
    Achievement {
        id: AchievementId::Purist,
        title: "Purist",
        description: "Complete a level without power-ups",
        predicate: purist,
    },
    Achievement {
        id: AchievementId::Survivor,
        title: "Survivor",
        description: "Make 100 moves in one level",
        predicate: survivor,
    },
];

/// Table entry for an id. The table is laid out in declaration order.
pub fn achievement(id: AchievementId) -> &'static Achievement {
    &ACHIEVEMENTS[id as usize]
}

/// Unlocked achievements across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementTracker {
    unlocked: BTreeSet<AchievementId>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = AchievementId> + '_ {
        self.unlocked.iter().copied()
    }

    /// Check every locked rule against the latest transition and return the
    /// ones that unlocked just now, in table order.
    pub fn evaluate(&mut self, state: &BoardState, outcome: &StepOutcome) -> Vec<AchievementId> {
        let mut fresh = Vec::new();
        for rule in ACHIEVEMENTS.iter() {
            if !self.unlocked.contains(&rule.id) && rule.is_met(state, outcome) {
                info!("achievement unlocked: {}", rule.title);
                self.unlocked.insert(rule.id);
                fresh.push(rule.id);
            }
        }
        fresh
    }
}
