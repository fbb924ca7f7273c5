//! Level table: target, board size, spawn odds and time limit per level.
//!
//! All values are fixed balance constants. Level numbers start at 1; level 0
//! is treated as level 1.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Difficulty band a level belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl Tier {
    pub fn for_level(level: u32) -> Tier {
        match level {
            0..=10 => Tier::Easy,
            11..=25 => Tier::Normal,
            26..=40 => Tier::Hard,
            _ => Tier::Expert,
        }
    }

    /// Chance that a spawned tile is worth twice the base.
    pub fn four_probability(self) -> f64 {
        match self {
            Tier::Easy => 0.05,
            Tier::Normal => 0.10,
            Tier::Hard => 0.15,
            Tier::Expert => 0.20,
        }
    }

    pub fn time_limit(self) -> Option<Duration> {
        match self {
            Tier::Easy | Tier::Normal => None,
            Tier::Hard => Some(Duration::from_secs(600)),
            Tier::Expert => Some(Duration::from_secs(420)),
        }
    }
}

/// Tile value a campaign level asks for.
pub fn target_for_level(level: u32) -> u32 {
    match level {
        0..=3 => 64,
        4..=8 => 128,
        9..=15 => 256,
        16..=25 => 512,
        26..=35 => 1024,
        36..=50 => 2048,
        _ => 4096,
    }
}

/// Board edge length for a target value.
pub fn board_size_for_target(target: u32) -> usize {
    match target {
        0..=64 => 3,
        65..=512 => 4,
        513..=2048 => 5,
        _ => 6,
    }
}

/// Everything a level needs to be set up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpec {
    /// Campaign level number, 0 for the non-campaign modes.
    pub level: u32,
    pub target: u32,
    pub board_size: usize,
    pub four_probability: f64,
    pub time_limit: Option<Duration>,
    pub tier: Tier,
}

/// Campaign level spec derived from the table.
pub fn level_spec(level: u32) -> LevelSpec {
    let level = level.max(1);
    let target = target_for_level(level);
    let tier = Tier::for_level(level);
    LevelSpec {
        level,
        target,
        board_size: board_size_for_target(target),
        four_probability: tier.four_probability(),
        time_limit: tier.time_limit(),
        tier,
    }
}

const CLASSIC_TARGET: u32 = 2048;
const TIME_ATTACK_LIMIT: Duration = Duration::from_secs(180);

/// Ways to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Endless 4x4 play toward 2048.
    Classic,
    /// 4x4 toward 2048 against a three minute clock.
    TimeAttack,
    /// One level of the campaign table.
    Campaign(u32),
}

impl GameMode {
    pub fn level_spec(self) -> LevelSpec {
        match self {
            GameMode::Classic => LevelSpec {
                level: 0,
                target: CLASSIC_TARGET,
                board_size: 4,
                four_probability: Tier::Normal.four_probability(),
                time_limit: None,
                tier: Tier::Normal,
            },
            GameMode::TimeAttack => LevelSpec {
                time_limit: Some(TIME_ATTACK_LIMIT),
                ..GameMode::Classic.level_spec()
            },
            GameMode::Campaign(level) => level_spec(level),
        }
    }

    /// Mode to play after completing this one, if any. The last
    /// representable level has no successor.
    pub fn next(self) -> Option<GameMode> {
        match self {
            GameMode::Campaign(level) => level.max(1).checked_add(1).map(GameMode::Campaign),
            GameMode::Classic | GameMode::TimeAttack => None,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Classic => write!(f, "Classic"),
            GameMode::TimeAttack => write!(f, "Time Attack"),
            GameMode::Campaign(level) => write!(f, "Level {}", level),
        }
    }
}
