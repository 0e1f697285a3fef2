//! Simulation module
//!
//! All game mechanics live here. Given the same dice and the same decisions
//! a game replays identically:
//! - Every random number comes through [`Dice`]
//! - Every optional choice comes through [`DecisionProvider`]
//! - Cards are read-only; per-game changes live in [`GameState`]

pub mod dice;
pub mod fielding;
pub mod game;
pub mod plays;
pub mod resolver;
pub mod running;
pub mod state;

pub use dice::{Dice, MixedRoll, ScriptedDice, SeededDice};
pub use fielding::{ChartCell, FieldingChart, FieldingOutcome, PositionChart};
pub use game::{Defender, Game, GameResult, GameSetup, GameSnapshot, PlateAppearance, TeamSheet};
pub use plays::{BoxScoreNote, GroundBallOutcome, PlayResult, ScorecardNote};
pub use resolver::{Resolution, Rewrite, resolve_plate_appearance};
pub use running::{
    Advancement, DecisionProvider, RunnerAdvancement, ScriptedDecisions, SendContext, SendPolicy,
    clamp_chance,
};
pub use state::{
    Base, GameState, InfieldAlignment, Lineup, LineupSlot, PitcherStatus, Roster, TeamSide,
};
