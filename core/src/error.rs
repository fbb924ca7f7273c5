use crate::powerup::PowerUpKind;

/// Errors raised by constructors, power-ups and configuration.
///
/// The move/spawn/terminal transforms are total and never return these.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("board size {0} is outside 2..=8")]
    InvalidBoardSize(usize),
    #[error("expected {expected} cell values, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("cell ({row}, {col}) is outside a {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },
    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },
    #[error("cell ({row}, {col}) is empty")]
    CellEmpty { row: usize, col: usize },
    #[error("tile value {value} is not a power-of-two multiple of base {base}")]
    InvalidTileValue { value: u32, base: u32 },
    #[error("base tile value {0} is outside 1..=65536")]
    InvalidBase(u32),
    #[error("four probability {0} is outside [0, 1]")]
    InvalidProbability(f64),
    #[error("a level needs at least one start tile")]
    NoStartTiles,
    #[error("start tile count {requested} does not fit a {size}x{size} board")]
    TooManyStartTiles { requested: usize, size: usize },
    #[error("no {0:?} charges left")]
    PowerUpExhausted(PowerUpKind),
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("level {0} is locked")]
    LevelLocked(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
