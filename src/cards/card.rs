//! Player cards
//!
//! Cards are immutable once built. Anything that changes during a game
//! (pitcher fatigue, runs allowed) lives in the game state instead.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::CardResult;
use crate::consts::COLUMN_LENGTH;

/// Defensive positions, numbered the way a scorer numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    DesignatedHitter,
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    LeftField,
    CenterField,
    RightField,
}

impl Position {
    /// The nine fielding positions, 1 through 9
    pub const FIELDERS: [Position; 9] = [
        Position::Pitcher,
        Position::Catcher,
        Position::FirstBase,
        Position::SecondBase,
        Position::ThirdBase,
        Position::Shortstop,
        Position::LeftField,
        Position::CenterField,
        Position::RightField,
    ];

    /// Scorer's number (0 for the designated hitter)
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Position::DesignatedHitter),
            1..=9 => Some(Self::FIELDERS[(n - 1) as usize]),
            _ => None,
        }
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Position::DesignatedHitter => "DH",
            Position::Pitcher => "P",
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::Shortstop => "SS",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// Throwing hand, also the key of every outcome table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn opposite(self) -> Self {
        match self {
            Hand::Left => Hand::Right,
            Hand::Right => Hand::Left,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(Hand::Left),
            "R" => Some(Hand::Right),
            _ => None,
        }
    }
}

/// Batting side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bats {
    Left,
    Right,
    Switch,
}

impl Bats {
    /// The side the batter hits from against a pitcher throwing with `pitcher`
    pub fn against(self, pitcher: Hand) -> Hand {
        match self {
            Bats::Left => Hand::Left,
            Bats::Right => Hand::Right,
            Bats::Switch => pitcher.opposite(),
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(Bats::Left),
            "R" => Some(Bats::Right),
            "S" => Some(Bats::Switch),
            _ => None,
        }
    }
}

/// Power rating printed on each side of a batting card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Power {
    #[default]
    Normal,
    Weak,
}

/// Card type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Batter,
    Pitcher,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Batter => f.write_str("batter"),
            Role::Pitcher => f.write_str("pitcher"),
        }
    }
}

/// Letter or numeric rating the engine carries but does not resolve
/// (bunting, hit-and-run, stealing, holding, balks, wild pitches)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    #[default]
    Unrated,
    Number(i64),
    Letter(String),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Unrated => f.write_str("-"),
            Rating::Number(n) => write!(f, "{n}"),
            Rating::Letter(s) => f.write_str(s),
        }
    }
}

/// Fielding line for one position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldingRating {
    /// Range rating, selects the fielding chart row
    pub range: u8,
    /// Error number, selects the error sub-table row
    pub error: u8,
    /// Arm modifier added to a runner's chance of advancing
    pub arm: i32,
}

/// One cell of an outcome column
#[derive(Debug, Clone, PartialEq)]
pub enum TableEntry {
    Fixed(CardResult),
    /// Needs a tie-break roll: at or under `threshold` gives `low`, above gives `high`
    Split {
        threshold: u8,
        low: CardResult,
        high: CardResult,
    },
}

impl TableEntry {
    /// Pick a branch with a tie-break roll already made
    pub fn pick(&self, roll: u8) -> &CardResult {
        match self {
            TableEntry::Fixed(result) => result,
            TableEntry::Split {
                threshold,
                low,
                high,
            } => {
                if roll <= *threshold {
                    low
                } else {
                    high
                }
            }
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, TableEntry::Split { .. })
    }
}

/// Outcome columns for one hand, keyed by column number
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeColumns {
    pub columns: BTreeMap<u8, Vec<TableEntry>>,
}

impl OutcomeColumns {
    /// Entry for a column and a two-dice sum (2..=12)
    pub fn entry(&self, column: u8, sum: u8) -> Option<&TableEntry> {
        let index = usize::from(sum.checked_sub(2)?);
        self.columns.get(&column)?.get(index)
    }

    /// True when every wanted column exists and is full length
    pub fn covers(&self, wanted: &[u8]) -> bool {
        wanted.iter().all(|c| {
            self.columns
                .get(c)
                .is_some_and(|col| col.len() >= COLUMN_LENGTH)
        })
    }
}

/// One side (vs left or vs right) of a batting card
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattingSide {
    pub columns: OutcomeColumns,
    pub power: Power,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatterCard {
    pub name: String,
    pub bats: Bats,
    /// Running speed, the base of every advancement chance
    pub speed: i32,
    pub bunting: Rating,
    pub hit_and_run: Rating,
    pub stealing: Rating,
    pub fielding: BTreeMap<Position, FieldingRating>,
    pub vs_left: BattingSide,
    pub vs_right: BattingSide,
}

impl BatterCard {
    /// Card side used against a pitcher throwing with `hand`
    pub fn batting_vs(&self, hand: Hand) -> &BattingSide {
        match hand {
            Hand::Left => &self.vs_left,
            Hand::Right => &self.vs_right,
        }
    }

    pub fn fielding_at(&self, position: Position) -> Option<&FieldingRating> {
        self.fielding.get(&position)
    }
}

/// Innings a pitcher can go before tiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Endurance {
    pub starter: Option<u32>,
    pub relief: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PitcherCard {
    pub name: String,
    pub throws: Hand,
    pub hold: Rating,
    pub balk: Rating,
    pub wild_pitch: Rating,
    pub bunting: Rating,
    pub fielding: FieldingRating,
    pub endurance: Endurance,
    pub vs_left: OutcomeColumns,
    pub vs_right: OutcomeColumns,
}

impl PitcherCard {
    /// Card side used against a batter hitting from `hand`
    pub fn pitching_vs(&self, hand: Hand) -> &OutcomeColumns {
        match hand {
            Hand::Left => &self.vs_left,
            Hand::Right => &self.vs_right,
        }
    }
}
