//! Crate error type
//!
//! Everything here is a setup failure except `GameOver` and the chart/table
//! gaps, which setup validation rules out before the first pitch.

use thiserror::Error;

use crate::cards::{Position, Role};
use crate::sim::TeamSide;

#[derive(Error, Debug)]
pub enum Error {
    #[error("player not found: {name}")]
    PlayerNotFound { name: String },

    #[error("{name} is a {found} card, not a {expected} card")]
    WrongCardType {
        name: String,
        expected: Role,
        found: Role,
    },

    #[error("malformed card for {name}: {reason}")]
    MalformedCard { name: String, reason: String },

    #[error("{name} has no fielding rating at {position}")]
    MissingFielding { name: String, position: Position },

    #[error("fielding chart has no {what} at {position}")]
    ChartGap { position: Position, what: String },

    #[error("malformed fielding chart: {reason}")]
    MalformedChart { reason: String },

    #[error("invalid lineup for {team}: {reason}")]
    InvalidLineup { team: TeamSide, reason: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("the game is already over")]
    GameOver,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Error::MalformedCard {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
