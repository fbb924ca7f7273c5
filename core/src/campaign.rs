//! Campaign bookkeeping: star ratings, best results and unlocked levels.

use std::collections::BTreeMap;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementTracker;
use crate::progression::{GameMode, LevelSpec};
use crate::state::{BoardState, Status};

/// Star rating, 1 to 3, for a completed level.
///
/// Timed levels are rated by the share of the clock left over, untimed ones
/// by moves against a par of `target / 2`.
pub fn stars(spec: &LevelSpec, moves: u32, elapsed: Duration) -> u8 {
    match spec.time_limit {
        Some(limit) if !limit.is_zero() => {
            let left = limit.saturating_sub(elapsed).as_secs_f64() / limit.as_secs_f64();
            if left >= 0.5 {
                3
            } else if left >= 0.25 {
                2
            } else {
                1
            }
        }
        _ => {
            let par = (spec.target / 2).max(1);
            if moves <= par {
                3
            } else if moves <= par * 2 {
                2
            } else {
                1
            }
        }
    }
}

/// Best result achieved on one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub stars: u8,
    pub best_score: u32,
    pub best_time: Duration,
}

/// Saved campaign state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignProgress {
    highest_unlocked: u32,
    records: BTreeMap<u32, LevelRecord>,
    pub achievements: AchievementTracker,
}

impl Default for CampaignProgress {
    fn default() -> Self {
        CampaignProgress {
            highest_unlocked: 1,
            records: BTreeMap::new(),
            achievements: AchievementTracker::new(),
        }
    }
}

impl CampaignProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highest_unlocked(&self) -> u32 {
        self.highest_unlocked
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        (1..=self.highest_unlocked).contains(&level)
    }

    pub fn record(&self, level: u32) -> Option<&LevelRecord> {
        self.records.get(&level)
    }

    pub fn total_stars(&self) -> u32 {
        self.records.values().map(|r| u32::from(r.stars)).sum()
    }

    /// Fold a finished campaign level into the records.
    ///
    /// Returns the merged record, or `None` when the state is not a
    /// completed campaign level. Completing level `n` unlocks `n + 1`.
    pub fn record_completion(&mut self, state: &BoardState) -> Option<LevelRecord> {
        let level = match state.mode() {
            GameMode::Campaign(_) if state.status() == Status::LevelCompleted => state.level().level,
            _ => return None,
        };

        let earned = LevelRecord {
            stars: stars(state.level(), state.moves(), state.elapsed()),
            best_score: state.score(),
            best_time: state.elapsed(),
        };
        let record = self
            .records
            .entry(level)
            .and_modify(|r| {
                r.stars = r.stars.max(earned.stars);
                r.best_score = r.best_score.max(earned.best_score);
                r.best_time = r.best_time.min(earned.best_time);
            })
            .or_insert(earned);
        let record = *record;

        if level >= self.highest_unlocked {
            self.highest_unlocked = level.saturating_add(1);
            info!("unlocked level {}", self.highest_unlocked);
        }
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::progression::level_spec;
    use crate::state::Event;
    use crate::tile::Grid;
    use crate::Direction;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn completed_level(level: u32) -> BoardState {
        let grid = Grid::from_values(3, &[32, 32, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let state = BoardState::from_grid(GameMode::Campaign(level), &GameConfig::default(), grid)
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(9);
        state
            .reduce(Event::Move(Direction::Left), &mut rng)
            .unwrap()
            .state
    }

    fn finished(level: u32, values: &[u32], wait: Duration) -> BoardState {
        let grid = Grid::from_values(3, values).unwrap();
        let state = BoardState::from_grid(GameMode::Campaign(level), &GameConfig::default(), grid)
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(9);
        let state = state.reduce(Event::Tick(wait), &mut rng).unwrap().state;
        let state = state
            .reduce(Event::Move(Direction::Left), &mut rng)
            .unwrap()
            .state;
        assert_eq!(state.status(), Status::LevelCompleted);
        state
    }

    #[test]
    fn test_untimed_stars() {
        let spec = level_spec(5); // target 128, par 64
        assert_eq!(stars(&spec, 64, Duration::ZERO), 3);
        assert_eq!(stars(&spec, 65, Duration::ZERO), 2);
        assert_eq!(stars(&spec, 128, Duration::ZERO), 2);
        assert_eq!(stars(&spec, 129, Duration::ZERO), 1);
    }

    #[test]
    fn test_timed_stars() {
        let spec = level_spec(45); // 420 s limit
        assert_eq!(stars(&spec, 9999, Duration::from_secs(210)), 3);
        assert_eq!(stars(&spec, 0, Duration::from_secs(211)), 2);
        assert_eq!(stars(&spec, 0, Duration::from_secs(315)), 2);
        assert_eq!(stars(&spec, 0, Duration::from_secs(400)), 1);
    }

    #[test]
    fn test_completion_unlocks_next() {
        let mut progress = CampaignProgress::new();
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));
        assert!(!progress.is_unlocked(0));

        let record = progress.record_completion(&completed_level(1)).unwrap();
        assert_eq!(record.stars, 3);
        assert_eq!(progress.highest_unlocked(), 2);
        assert_eq!(progress.total_stars(), 3);

        // Replaying an earlier level does not move the frontier back.
        progress.record_completion(&completed_level(1));
        assert_eq!(progress.highest_unlocked(), 2);
    }

    #[test]
    fn test_records_keep_best_of_each_run() {
        // Level 45: target 2048, 420 s clock.
        let slow_high = finished(45, &[1024, 1024, 0, 4, 4, 0, 0, 0, 0], Duration::from_secs(300));
        let fast_low = finished(45, &[1024, 1024, 0, 0, 0, 0, 0, 0, 0], Duration::from_secs(10));

        let mut progress = CampaignProgress::new();
        let first = progress.record_completion(&slow_high).unwrap();
        assert_eq!(first.stars, 2);
        assert_eq!(first.best_score, 2056);
        assert_eq!(first.best_time, Duration::from_secs(300));

        let merged = progress.record_completion(&fast_low).unwrap();
        assert_eq!(merged.stars, 3);
        assert_eq!(merged.best_score, 2056);
        assert_eq!(merged.best_time, Duration::from_secs(10));

        let again = progress.record_completion(&slow_high).unwrap();
        assert_eq!(again, merged);
        assert_eq!(progress.record(45), Some(&merged));
        assert_eq!(progress.highest_unlocked(), 46);
        assert_eq!(progress.total_stars(), 3);
    }

    #[test]
    fn test_completing_last_level_keeps_it_unlocked() {
        let last = finished(u32::MAX, &[2048, 2048, 0, 0, 0, 0, 0, 0, 0], Duration::ZERO);
        let mut progress = CampaignProgress::new();
        assert!(progress.record_completion(&last).is_some());
        assert_eq!(progress.highest_unlocked(), u32::MAX);
        assert!(progress.is_unlocked(u32::MAX));
    }

    #[test]
    fn test_unfinished_or_non_campaign_is_ignored() {
        let mut progress = CampaignProgress::new();
        let grid = Grid::from_values(3, &[2, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let active =
            BoardState::from_grid(GameMode::Campaign(1), &GameConfig::default(), grid.clone())
                .unwrap();
        assert_eq!(progress.record_completion(&active), None);

        let classic = BoardState::from_grid(GameMode::Classic, &GameConfig::default(), grid)
            .unwrap();
        assert_eq!(progress.record_completion(&classic), None);
        assert_eq!(progress, CampaignProgress::new());
    }

    #[test]
    fn test_json_round_trip() {
        let mut progress = CampaignProgress::new();
        progress.record_completion(&completed_level(1));
        let json = serde_json::to_string(&progress).unwrap();
        let back: CampaignProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);

        let fresh: CampaignProgress = serde_json::from_str("{}").unwrap();
        assert_eq!(fresh.highest_unlocked(), 1);
    }
}
