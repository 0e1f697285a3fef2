//! Statistics trackers
//!
//! Three read-models fed the same [`PlayResult`] after every play. None of
//! them looks at another, and none is reset during a game.

pub mod box_score;
pub mod scorecard;
pub mod scoreboard;

pub use box_score::{BattingLine, BoxScore, PitchingLine, TeamBox};
pub use scorecard::{Scorecard, ScorecardRow, notation};
pub use scoreboard::{Scoreboard, ScoreboardLine};

use crate::sim::{PlayResult, TeamSide};

/// Who was involved in a play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayContext<'a> {
    pub batting: TeamSide,
    pub inning: u32,
    pub batter: &'a str,
    pub pitcher: &'a str,
}

/// A tracker updated once per play
pub trait PlayRecorder {
    fn record(&mut self, context: &PlayContext<'_>, result: &PlayResult);
}
