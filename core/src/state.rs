//! Level state and the reducer that advances it.
//!
//! A [`BoardState`] is never mutated through its public API. Each
//! [`Event`] goes through [`BoardState::reduce`], which returns the next
//! state together with a [`StepOutcome`] describing what happened. The
//! controller owns the RNG and feeds it in, so a seeded RNG replays a level
//! exactly.

use std::time::Duration;

use log::{debug, info, trace};
use rand::Rng;

use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::merge::{self, Merge};
use crate::powerup::{self, PowerUp, PowerUpInventory};
use crate::progression::{GameMode, LevelSpec};
use crate::spawn::SpawnRule;
use crate::terminal::{is_game_over, is_level_complete};
use crate::tile::{Grid, Tile, TileId};
use crate::Direction;

/// Why a level was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    NoMoves,
    TimeUp,
}

/// Where a level stands. Pausing is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Active,
    LevelCompleted,
    GameOver(GameOverReason),
}

impl Status {
    pub fn is_finished(self) -> bool {
        self != Status::Active
    }
}

/// Input to the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Move(Direction),
    /// Wall-clock time that passed since the previous tick.
    Tick(Duration),
    Pause,
    Resume,
    UsePowerUp(PowerUp),
}

/// What a single event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether the grid changed.
    pub changed: bool,
    pub score_delta: u32,
    pub merges: Vec<Merge>,
    pub spawned: Option<Tile>,
    pub status: Status,
}

/// Next state plus the outcome that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: BoardState,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    grid: Grid,
    score: u32,
    moves: u32,
}

/// Everything about one level in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    grid: Grid,
    score: u32,
    moves: u32,
    elapsed: Duration,
    mode: GameMode,
    level: LevelSpec,
    status: Status,
    paused: bool,
    power_ups: PowerUpInventory,
    power_ups_used: u32,
    spawn_rule: SpawnRule,
    next_id: TileId,
    previous: Option<Box<Snapshot>>,
}

impl BoardState {
    /// Set up a fresh level for `mode` with `config.start_tiles` random tiles.
    pub fn new<R: Rng>(mode: GameMode, config: &GameConfig, rng: &mut R) -> Result<BoardState> {
        config.validate()?;
        let level = mode.level_spec();
        let grid = Grid::with_base(level.board_size, config.base)?;
        if config.start_tiles > level.board_size * level.board_size {
            return Err(Error::TooManyStartTiles {
                requested: config.start_tiles,
                size: level.board_size,
            });
        }

        let mut state = BoardState::from_parts(mode, level, config, grid)?;
        for _ in 0..config.start_tiles {
            state.spawn_one(rng);
        }
        state.update_status();
        debug!("started {} on a {}x{} board", mode, level.board_size, level.board_size);
        Ok(state)
    }

    /// Start a level from a prepared grid. The board size follows the grid.
    pub fn from_grid(mode: GameMode, config: &GameConfig, grid: Grid) -> Result<BoardState> {
        config.validate()?;
        let level = LevelSpec {
            board_size: grid.size(),
            ..mode.level_spec()
        };
        let config = GameConfig {
            base: grid.base(),
            ..*config
        };
        let mut state = BoardState::from_parts(mode, level, &config, grid)?;
        state.update_status();
        Ok(state)
    }

    fn from_parts(
        mode: GameMode,
        level: LevelSpec,
        config: &GameConfig,
        grid: Grid,
    ) -> Result<BoardState> {
        let next_id = grid.max_id().map_or(TileId(1), TileId::next);
        Ok(BoardState {
            spawn_rule: config.spawn_rule(&level)?,
            grid,
            score: 0,
            moves: 0,
            elapsed: Duration::ZERO,
            mode,
            level,
            status: Status::Active,
            paused: false,
            power_ups: config.power_ups,
            power_ups_used: 0,
            next_id,
            previous: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Accepted moves this level.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Unpaused time spent on this level.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn level(&self) -> &LevelSpec {
        &self.level
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn power_ups(&self) -> PowerUpInventory {
        self.power_ups
    }

    pub fn power_ups_used(&self) -> u32 {
        self.power_ups_used
    }

    pub fn spawn_rule(&self) -> &SpawnRule {
        &self.spawn_rule
    }

    pub fn can_undo(&self) -> bool {
        self.previous.is_some()
    }

    pub fn max_tile(&self) -> u32 {
        self.grid.max_value()
    }

    /// Time left on a timed level.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.level
            .time_limit
            .map(|limit| limit.saturating_sub(self.elapsed))
    }

    /// Legal directions as `[Up, Down, Left, Right]`.
    pub fn legal_directions(&self) -> [bool; 4] {
        merge::legal_directions(&self.grid)
    }

    /// Whether moves and power-ups are currently accepted.
    pub fn accepts_input(&self) -> bool {
        self.status == Status::Active && !self.paused
    }

    /// Apply one event.
    ///
    /// Moves that change nothing, and any input while paused or after the
    /// level ended, yield an unchanged state. Only power-ups can fail.
    pub fn reduce<R: Rng>(&self, event: Event, rng: &mut R) -> Result<Transition> {
        match event {
            Event::Move(direction) => Ok(self.apply_move(direction, rng)),
            Event::Tick(delta) => Ok(self.apply_tick(delta)),
            Event::Pause | Event::Resume => {
                let mut next = self.clone();
                if self.status == Status::Active {
                    next.paused = event == Event::Pause;
                }
                Ok(next.into_transition(StepOutcome::unchanged(self.status)))
            }
            Event::UsePowerUp(power_up) => self.apply_power_up(power_up, rng),
        }
    }

    fn apply_move<R: Rng>(&self, direction: Direction, rng: &mut R) -> Transition {
        if !self.accepts_input() {
            return self.unchanged();
        }
        let slid = merge::slide(&self.grid, direction);
        if !slid.moved {
            return self.unchanged();
        }

        let mut next = self.clone();
        next.previous = Some(Box::new(self.snapshot()));
        next.grid = slid.grid;
        next.score += slid.score_delta;
        next.moves += 1;
        let spawned = next.spawn_one(rng);
        next.update_status();
        trace!(
            "move {:?}: +{} ({} merges), score {}",
            direction,
            slid.score_delta,
            slid.merges.len(),
            next.score
        );

        let outcome = StepOutcome {
            changed: true,
            score_delta: slid.score_delta,
            merges: slid.merges,
            spawned,
            status: next.status,
        };
        next.into_transition(outcome)
    }

    fn apply_tick(&self, delta: Duration) -> Transition {
        if !self.accepts_input() {
            return self.unchanged();
        }
        let mut next = self.clone();
        next.elapsed += delta;
        if let Some(limit) = next.level.time_limit {
            if next.elapsed >= limit {
                next.status = Status::GameOver(GameOverReason::TimeUp);
                info!("{} ran out of time at score {}", next.mode, next.score);
            }
        }
        let status = next.status;
        next.into_transition(StepOutcome::unchanged(status))
    }

    fn apply_power_up<R: Rng>(&self, power_up: PowerUp, rng: &mut R) -> Result<Transition> {
        if !self.accepts_input() {
            return Ok(self.unchanged());
        }
        let mut next = self.clone();
        next.power_ups = self.power_ups.consume(power_up.kind())?;
        match power_up {
            PowerUp::Undo => {
                let snapshot = self.previous.as_deref().ok_or(Error::NothingToUndo)?;
                next.grid = snapshot.grid.clone();
                next.score = snapshot.score;
                next.moves = snapshot.moves;
                next.previous = None;
            }
            PowerUp::Smash { row, col } => {
                next.grid = powerup::smash(&self.grid, row, col)?;
            }
            PowerUp::Shuffle => {
                next.grid = powerup::shuffle(&self.grid, rng);
            }
        }
        next.power_ups_used += 1;
        next.update_status();
        debug!("used {:?}, {} left", power_up, next.power_ups.remaining(power_up.kind()));

        let outcome = StepOutcome {
            changed: next.grid != self.grid,
            ..StepOutcome::unchanged(next.status)
        };
        Ok(next.into_transition(outcome))
    }

    fn spawn_one<R: Rng>(&mut self, rng: &mut R) -> Option<Tile> {
        let tile = self.spawn_rule.spawn(&self.grid, self.next_id, rng)?;
        self.grid.place(tile);
        self.next_id = self.next_id.next();
        debug!("spawned {} at ({}, {})", tile.value(), tile.row(), tile.col());
        Some(tile)
    }

    /// Level completion wins over a full board.
    fn update_status(&mut self) {
        if is_level_complete(&self.grid, self.level.target) {
            if self.status != Status::LevelCompleted {
                info!(
                    "{} completed in {} moves, score {}",
                    self.mode, self.moves, self.score
                );
            }
            self.status = Status::LevelCompleted;
        } else if is_game_over(&self.grid) {
            info!("{} over: no moves left, score {}", self.mode, self.score);
            self.status = Status::GameOver(GameOverReason::NoMoves);
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            score: self.score,
            moves: self.moves,
        }
    }

    fn unchanged(&self) -> Transition {
        self.clone()
            .into_transition(StepOutcome::unchanged(self.status))
    }

    fn into_transition(self, outcome: StepOutcome) -> Transition {
        Transition {
            state: self,
            outcome,
        }
    }
}

impl StepOutcome {
    fn unchanged(status: Status) -> StepOutcome {
        StepOutcome {
            changed: false,
            score_delta: 0,
            merges: Vec::new(),
            spawned: None,
            status,
        }
    }
}
