//! Outcome tokens
//!
//! Card and chart cells are written in a compact `_`-separated notation
//! (`S_**`, `FB_9_B?`, `WP_GB_6_A+`, `E_2_6`). They are parsed once, when the
//! data is loaded, into the structured values below.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::card::Position;

/// How far runners move on a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advance {
    /// Every runner moves up this many bases
    Bases(u8),
    /// Fixed one-base advance, then the lead runner may test this fielder's arm
    Fielder(Position),
}

/// Flyball letter grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlyBallType {
    /// All runners tag and advance one base
    A,
    /// Deep fly, the runner on third scores
    B,
    /// Questionable `B?`, the runner on third must beat a throw
    BQuestionable,
    /// Runners advance one base
    C,
}

/// Groundball letter grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundBallType {
    /// Double play ball
    A,
    /// Force play at second
    B,
    /// Runners advance
    C,
}

/// A play the game state engine knows how to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Play {
    Strikeout,
    Walk,
    HitByPitch,
    HomeRun,
    Single(Advance),
    Double(Advance),
    Triple,
    FlyBall {
        position: Position,
        kind: FlyBallType,
    },
    GroundBall {
        position: Position,
        kind: GroundBallType,
    },
    LineoutMax(Position),
    Lineout(Position),
    Popout(Position),
    Foulout(Position),
    Error {
        position: Position,
        bases: u8,
    },
    WildPitch,
    PassedBall,
}

impl Play {
    pub fn kind(&self) -> PlayKind {
        match self {
            Play::Strikeout => PlayKind::Strikeout,
            Play::Walk => PlayKind::Walk,
            Play::HitByPitch => PlayKind::HitByPitch,
            Play::HomeRun => PlayKind::HomeRun,
            Play::Single(_) => PlayKind::Single,
            Play::Double(_) => PlayKind::Double,
            Play::Triple => PlayKind::Triple,
            Play::FlyBall { .. } => PlayKind::FlyBall,
            Play::GroundBall { .. } => PlayKind::GroundBall,
            Play::LineoutMax(_) => PlayKind::LineoutMax,
            Play::Lineout(_) => PlayKind::Lineout,
            Play::Popout(_) => PlayKind::Popout,
            Play::Foulout(_) => PlayKind::Foulout,
            Play::Error { .. } => PlayKind::Error,
            Play::WildPitch => PlayKind::WildPitch,
            Play::PassedBall => PlayKind::PassedBall,
        }
    }
}

/// Discriminant of [`Play`], shared by the engine and every tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayKind {
    Strikeout,
    Walk,
    HitByPitch,
    HomeRun,
    Single,
    Double,
    Triple,
    FlyBall,
    GroundBall,
    LineoutMax,
    Lineout,
    Popout,
    Foulout,
    Error,
    WildPitch,
    PassedBall,
}

impl PlayKind {
    pub const ALL: [PlayKind; 16] = [
        PlayKind::Strikeout,
        PlayKind::Walk,
        PlayKind::HitByPitch,
        PlayKind::HomeRun,
        PlayKind::Single,
        PlayKind::Double,
        PlayKind::Triple,
        PlayKind::FlyBall,
        PlayKind::GroundBall,
        PlayKind::LineoutMax,
        PlayKind::Lineout,
        PlayKind::Popout,
        PlayKind::Foulout,
        PlayKind::Error,
        PlayKind::WildPitch,
        PlayKind::PassedBall,
    ];

    /// Card notation code
    pub fn code(self) -> &'static str {
        match self {
            PlayKind::Strikeout => "K",
            PlayKind::Walk => "BB",
            PlayKind::HitByPitch => "HBP",
            PlayKind::HomeRun => "HR",
            PlayKind::Single => "S",
            PlayKind::Double => "D",
            PlayKind::Triple => "T",
            PlayKind::FlyBall => "FB",
            PlayKind::GroundBall => "GB",
            PlayKind::LineoutMax => "lomax",
            PlayKind::Lineout => "LO",
            PlayKind::Popout => "PO",
            PlayKind::Foulout => "FO",
            PlayKind::Error => "E",
            PlayKind::WildPitch => "WP",
            PlayKind::PassedBall => "PB",
        }
    }

    /// Counts as a base hit
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            PlayKind::Single | PlayKind::Double | PlayKind::Triple | PlayKind::HomeRun
        )
    }
}

impl fmt::Display for PlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A pitch that gets away before the batter's result is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mishap {
    WildPitch,
    PassedBall,
}

impl Mishap {
    pub fn play(self) -> Play {
        match self {
            Mishap::WildPitch => Play::WildPitch,
            Mishap::PassedBall => Play::PassedBall,
        }
    }
}

/// What a card cell says, before any secondary resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Play(Play),
    /// `HRN`: a home run only for batters with normal power
    ConditionalHomeRun,
    /// `X`: roll on the fielding chart for this position
    FieldingChart(Position),
}

/// A fully parsed card cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResult {
    pub mishap: Option<Mishap>,
    pub token: Token,
    /// `~`: becomes a 2-base single off a tired pitcher
    pub fatigue: bool,
    /// `+`: becomes a 2-base single with the infield drawn in
    pub infield_in: bool,
}

impl CardResult {
    pub fn play(play: Play) -> Self {
        Self {
            mishap: None,
            token: Token::Play(play),
            fatigue: false,
            infield_in: false,
        }
    }

    /// Parse a cell. `fielder` fills in the position of an `E_<bases>`
    /// token read from a fielding chart row.
    pub fn parse_with_fielder(text: &str, fielder: Option<Position>) -> Result<Self, ParseTokenError> {
        let fail = |reason: &'static str| ParseTokenError {
            token: text.to_string(),
            reason,
        };

        let mut segments: Vec<&str> = text.trim().split('_').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(fail("empty segment"));
        }

        let fatigue = segments.last() == Some(&"~");
        if fatigue {
            segments.pop();
        }

        let mut infield_in = false;
        if let Some(last) = segments.pop() {
            let last = match last.strip_suffix('+') {
                Some(stripped) => {
                    infield_in = true;
                    stripped
                }
                None => last,
            };
            segments.push(last);
        }

        let mishap = match segments.first() {
            Some(&"WP") => Some(Mishap::WildPitch),
            Some(&"PB") => Some(Mishap::PassedBall),
            _ => None,
        };
        if mishap.is_some() {
            segments.remove(0);
            if segments.is_empty() {
                return Err(fail("pitch mishap without a following play"));
            }
        }

        let token = parse_token(&segments, fielder).map_err(fail)?;
        if mishap.is_some() && matches!(token, Token::Play(Play::WildPitch | Play::PassedBall)) {
            return Err(fail("pitch mishap followed by another mishap"));
        }

        Ok(Self {
            mishap,
            token,
            fatigue,
            infield_in,
        })
    }
}

impl FromStr for CardResult {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_fielder(s, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad outcome token `{token}`: {reason}")]
pub struct ParseTokenError {
    pub token: String,
    pub reason: &'static str,
}

fn parse_token(segments: &[&str], fielder: Option<Position>) -> Result<Token, &'static str> {
    let (head, args) = segments.split_first().ok_or("empty token")?;

    let play = match (*head, args) {
        ("K", []) => Play::Strikeout,
        ("BB", []) => Play::Walk,
        ("HBP", []) => Play::HitByPitch,
        ("HR", []) => Play::HomeRun,
        ("HRN", []) => return Ok(Token::ConditionalHomeRun),
        ("T", []) => Play::Triple,
        ("WP", []) => Play::WildPitch,
        ("PB", []) => Play::PassedBall,
        ("S", [arg]) => Play::Single(match *arg {
            "*" => Advance::Bases(1),
            "**" => Advance::Bases(2),
            other => Advance::Fielder(fielding_position(other)?),
        }),
        ("D", [arg]) => Play::Double(match *arg {
            "**" => Advance::Bases(2),
            "***" => Advance::Bases(3),
            other => Advance::Fielder(fielding_position(other)?),
        }),
        ("FB", [pos, kind]) => Play::FlyBall {
            position: fielding_position(pos)?,
            kind: match *kind {
                "A" => FlyBallType::A,
                "B" => FlyBallType::B,
                "B?" => FlyBallType::BQuestionable,
                "C" => FlyBallType::C,
                _ => return Err("unknown flyball type"),
            },
        },
        ("GB", [pos, kind]) => Play::GroundBall {
            position: fielding_position(pos)?,
            kind: match *kind {
                "A" => GroundBallType::A,
                "B" => GroundBallType::B,
                "C" => GroundBallType::C,
                _ => return Err("unknown groundball type"),
            },
        },
        ("lomax", [pos]) => Play::LineoutMax(fielding_position(pos)?),
        ("LO", [pos]) => Play::Lineout(fielding_position(pos)?),
        ("PO", [pos]) => Play::Popout(fielding_position(pos)?),
        ("FO", [pos]) => Play::Foulout(fielding_position(pos)?),
        ("X", [pos]) => return Ok(Token::FieldingChart(fielding_position(pos)?)),
        ("E", [bases]) => Play::Error {
            position: fielder.ok_or("error without a fielder")?,
            bases: error_bases(bases)?,
        },
        ("E", [bases, pos]) => Play::Error {
            position: fielding_position(pos)?,
            bases: error_bases(bases)?,
        },
        _ => return Err("unknown play or wrong argument count"),
    };
    Ok(Token::Play(play))
}

fn fielding_position(text: &str) -> Result<Position, &'static str> {
    text.parse::<u8>()
        .ok()
        .filter(|n| (1..=9).contains(n))
        .and_then(Position::from_number)
        .ok_or("position must be 1-9")
}

fn error_bases(text: &str) -> Result<u8, &'static str> {
    text.parse::<u8>()
        .ok()
        .filter(|n| (1..=3).contains(n))
        .ok_or("error bases must be 1-3")
}
