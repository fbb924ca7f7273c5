//! # Campaign 2048 Core
//!
//! Game logic for a 2048-style tile-merging puzzle with campaign levels,
//! power-ups and achievements. The pure pieces (sliding, spawning, terminal
//! checks, the level table) are plain functions over [`Grid`]; a
//! [`BoardState`] reducer ties them together and a [`Session`] adds a seeded
//! RNG and campaign bookkeeping for controllers.
//!
//! ## Example
//!
//! ```rust
//! use campaign_2048_core::{Direction, Event, GameConfig, GameMode, Session};
//!
//! let mut session = Session::new(GameMode::Campaign(1), GameConfig::default(), 42).unwrap();
//! let step = session.dispatch(Event::Move(Direction::Left)).unwrap();
//! println!("Score: {}, Changed: {}", session.state().score(), step.outcome.changed);
//! ```

pub mod achievements;
pub mod campaign;
pub mod config;
pub mod error;
pub mod merge;
pub mod powerup;
pub mod progression;
pub mod session;
pub mod spawn;
pub mod state;
pub mod terminal;
pub mod tile;

pub use achievements::{AchievementId, AchievementTracker, ACHIEVEMENTS};
pub use campaign::{stars, CampaignProgress, LevelRecord};
pub use config::GameConfig;
pub use error::{Error, Result};
pub use merge::{legal_directions, slide, Merge, MoveOutcome};
pub use powerup::{PowerUp, PowerUpInventory, PowerUpKind};
pub use progression::{level_spec, GameMode, LevelSpec, Tier};
pub use session::{Session, SessionStep};
pub use spawn::SpawnRule;
pub use state::{BoardState, Event, GameOverReason, Status, StepOutcome, Transition};
pub use terminal::{is_game_over, is_level_complete};
pub use tile::{Grid, Tile, TileId};

/// The four possible move directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// Convert a u8 to a Direction (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    /// All four directions, in `from_u8` order.
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
    }
}
