//! Diamond Dice - a dice-and-card tabletop baseball simulation
//!
//! Core modules:
//! - `cards`: Player cards, outcome tokens and the player repository
//! - `sim`: Dice, fielding chart, play resolution, game state and orchestration
//! - `stats`: Box score, scorecard and scoreboard
//! - `settings`: Headless game settings

pub mod cards;
pub mod error;
pub mod settings;
pub mod sim;
pub mod stats;

pub use cards::{PlayerRepository, Position};
pub use error::{Error, Result};
pub use settings::Settings;
pub use sim::{Game, GameResult, GameSetup, GameState, TeamSide};

/// Game constants
pub mod consts {
    /// Innings in a regulation game
    pub const REGULATION_INNINGS: u32 = 9;
    pub const OUTS_PER_INNING: u8 = 3;
    /// Batters in a lineup (designated hitter rule)
    pub const LINEUP_SIZE: usize = 9;
    pub const D20_FACES: u8 = 20;
    /// Entries in an outcome column, one per two-dice sum 2..=12
    pub const COLUMN_LENGTH: usize = 11;
    /// Cells in a fielding chart row, one per d20 face
    pub const CHART_ROW_LENGTH: usize = 20;
}
