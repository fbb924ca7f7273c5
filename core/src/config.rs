use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::powerup::PowerUpInventory;
use crate::progression::LevelSpec;
use crate::spawn::SpawnRule;
use crate::tile::{check_base, DEFAULT_BASE};

/// Tunables shared by every level of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Value of the smallest tile.
    pub base: u32,
    /// Overrides the level's spawn odds when set.
    pub four_probability: Option<f64>,
    /// Tiles placed when a level starts.
    pub start_tiles: usize,
    /// Charges granted at the start of each level.
    pub power_ups: PowerUpInventory,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            base: DEFAULT_BASE,
            four_probability: None,
            start_tiles: 2,
            power_ups: PowerUpInventory::default(),
        }
    }
}

impl GameConfig {
    /// Check base, spawn odds and start tiles. Whether the start tiles fit
    /// the board is checked when a level is set up.
    pub fn validate(&self) -> Result<()> {
        check_base(self.base)?;
        if self.start_tiles == 0 {
            return Err(Error::NoStartTiles);
        }
        if let Some(p) = self.four_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::InvalidProbability(p));
            }
        }
        Ok(())
    }

    /// Spawn rule for a level, honouring the probability override.
    pub fn spawn_rule(&self, spec: &LevelSpec) -> Result<SpawnRule> {
        SpawnRule::new(
            self.base,
            self.four_probability.unwrap_or(spec.four_probability),
        )
    }
}
