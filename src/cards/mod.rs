//! Player cards, outcome tokens and the repository that loads them

pub mod card;
pub mod repository;
pub mod token;

pub use card::{
    BatterCard, BattingSide, Bats, Endurance, FieldingRating, Hand, OutcomeColumns, PitcherCard,
    Position, Power, Rating, Role, TableEntry,
};
pub use repository::{EntryRecord, PlayerRecord, PlayerRepository};
pub use token::{
    Advance, CardResult, FlyBallType, GroundBallType, Mishap, ParseTokenError, Play, PlayKind,
    Token,
};
