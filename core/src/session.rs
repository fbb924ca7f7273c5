//! The controller-facing game session.
//!
//! A [`Session`] owns the current [`BoardState`], a seeded RNG and the
//! campaign progress. Every input goes through [`Session::dispatch`], which
//! runs the reducer, checks achievements and records completed levels.

use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::achievements::AchievementId;
use crate::campaign::{CampaignProgress, LevelRecord};
use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::progression::GameMode;
use crate::state::{BoardState, Event, Status, StepOutcome};

/// Everything one dispatched event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStep {
    pub outcome: StepOutcome,
    /// Achievements unlocked by this event.
    pub unlocked: Vec<AchievementId>,
    /// Set when this event completed a campaign level.
    pub record: Option<LevelRecord>,
}

pub struct Session {
    state: BoardState,
    config: GameConfig,
    progress: CampaignProgress,
    rng: SmallRng,
}

impl Session {
    /// Start `mode` with fresh campaign progress.
    pub fn new(mode: GameMode, config: GameConfig, seed: u64) -> Result<Session> {
        Session::with_progress(mode, config, seed, CampaignProgress::new())
    }

    /// Start `mode` on top of saved progress.
    pub fn with_progress(
        mode: GameMode,
        config: GameConfig,
        seed: u64,
        progress: CampaignProgress,
    ) -> Result<Session> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = BoardState::new(mode, &config, &mut rng)?;
        Ok(Session {
            state,
            config,
            progress,
            rng,
        })
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn progress(&self) -> &CampaignProgress {
        &self.progress
    }

    pub fn into_progress(self) -> CampaignProgress {
        self.progress
    }

    /// Reduce one event and update achievements and campaign records.
    pub fn dispatch(&mut self, event: Event) -> Result<SessionStep> {
        let was_active = self.state.status() == Status::Active;
        let transition = self.state.reduce(event, &mut self.rng)?;
        self.state = transition.state;

        let unlocked = self
            .progress
            .achievements
            .evaluate(&self.state, &transition.outcome);
        let record = if was_active && self.state.status() == Status::LevelCompleted {
            self.progress.record_completion(&self.state)
        } else {
            None
        };

        Ok(SessionStep {
            outcome: transition.outcome,
            unlocked,
            record,
        })
    }

    /// Replay the current mode from a new seed.
    pub fn restart(&mut self, seed: u64) -> Result<()> {
        self.rng = SmallRng::seed_from_u64(seed);
        self.state = BoardState::new(self.state.mode(), &self.config, &mut self.rng)?;
        Ok(())
    }

    /// Start an unlocked campaign level.
    pub fn start_level(&mut self, level: u32) -> Result<()> {
        if !self.progress.is_unlocked(level) {
            return Err(Error::LevelLocked(level));
        }
        self.state = BoardState::new(GameMode::Campaign(level), &self.config, &mut self.rng)?;
        Ok(())
    }

    /// Move on to the next campaign level after completing the current one.
    ///
    /// Returns `false` when the level is not complete or the mode has no
    /// follow-up.
    pub fn advance(&mut self) -> Result<bool> {
        if self.state.status() != Status::LevelCompleted {
            return Ok(false);
        }
        match self.state.mode().next() {
            Some(GameMode::Campaign(level)) => {
                self.start_level(level)?;
                info!("advanced to level {}", level);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powerup::PowerUp;
    use crate::Direction;

    // -------------------------------------------------------------------------
    // Determinism
    // -------------------------------------------------------------------------

    #[test]
    fn test_step_determinism() {
        let mut a = Session::new(GameMode::Classic, GameConfig::default(), 54321).unwrap();
        let mut b = Session::new(GameMode::Classic, GameConfig::default(), 54321).unwrap();
        for direction in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
            a.dispatch(Event::Move(direction)).unwrap();
            b.dispatch(Event::Move(direction)).unwrap();
            assert_eq!(a.state(), b.state());
        }
    }

    #[test]
    fn test_different_seeds_different_games() {
        let a = Session::new(GameMode::Classic, GameConfig::default(), 111).unwrap();
        let b = Session::new(GameMode::Classic, GameConfig::default(), 222).unwrap();
        assert_ne!(a.state().grid().values(), b.state().grid().values());
    }

    #[test]
    fn test_restart() {
        let mut session = Session::new(GameMode::Classic, GameConfig::default(), 42).unwrap();
        session.dispatch(Event::Move(Direction::Left)).unwrap();
        session.dispatch(Event::Move(Direction::Up)).unwrap();
        session.restart(42).unwrap();

        let fresh = Session::new(GameMode::Classic, GameConfig::default(), 42).unwrap();
        assert_eq!(session.state(), fresh.state());
    }

    // -------------------------------------------------------------------------
    // Campaign flow
    // -------------------------------------------------------------------------

    #[test]
    fn test_locked_level() {
        let mut session = Session::new(GameMode::Campaign(1), GameConfig::default(), 1).unwrap();
        assert_eq!(session.start_level(3), Err(Error::LevelLocked(3)));
        assert_eq!(session.advance(), Ok(false));
    }

    #[test]
    fn test_play_until_level_one_is_done() {
        let mut session = Session::new(GameMode::Campaign(1), GameConfig::default(), 7).unwrap();
        let order = [Direction::Left, Direction::Down, Direction::Right, Direction::Up];
        let mut record = None;
        for i in 0..10_000 {
            if session.state().status().is_finished() {
                break;
            }
            let step = session.dispatch(Event::Move(order[i % 4])).unwrap();
            if step.record.is_some() {
                record = step.record;
            }
        }

        match session.state().status() {
            Status::LevelCompleted => {
                assert!(record.is_some());
                assert_eq!(session.progress().highest_unlocked(), 2);
                assert_eq!(session.advance(), Ok(true));
                assert_eq!(session.state().mode(), GameMode::Campaign(2));
                assert_eq!(session.state().status(), Status::Active);
            }
            Status::GameOver(_) => {
                assert!(record.is_none());
                assert_eq!(session.advance(), Ok(false));
            }
            Status::Active => panic!("level should have ended"),
        }
    }

    #[test]
    fn test_power_up_errors_leave_session_untouched() {
        let mut session = Session::new(GameMode::Classic, GameConfig::default(), 5).unwrap();
        let before = session.state().clone();
        assert_eq!(
            session.dispatch(Event::UsePowerUp(PowerUp::Undo)),
            Err(Error::NothingToUndo)
        );
        assert_eq!(session.state(), &before);
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    #[test]
    fn test_rejects_config_without_start_tiles() {
        let config = GameConfig {
            start_tiles: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            Session::new(GameMode::Campaign(1), config, 1),
            Err(Error::NoStartTiles)
        ));
    }

    #[test]
    fn test_rejects_base_too_large_to_double() {
        let config = GameConfig {
            base: 1 << 31,
            four_probability: Some(1.0),
            ..GameConfig::default()
        };
        assert!(matches!(
            Session::new(GameMode::Classic, config, 1),
            Err(Error::InvalidBase(_))
        ));
    }
}
