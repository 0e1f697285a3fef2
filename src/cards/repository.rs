//! Player repository
//!
//! Built once at startup from the player data file and handed to the game
//! by reference. Records are validated and every outcome token parsed here,
//! so a bad card stops setup with the player's name attached.

use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::card::{
    BatterCard, BattingSide, Bats, Endurance, FieldingRating, Hand, OutcomeColumns, PitcherCard,
    Position, Power, Rating, Role, TableEntry,
};
use super::token::CardResult;
use crate::consts::{COLUMN_LENGTH, D20_FACES};
use crate::error::{Error, Result};

/// Batting card columns (the white die shows 1-3)
pub const BATTER_COLUMNS: RangeInclusive<u8> = 1..=3;
/// Pitching card columns (the white die shows 4-6)
pub const PITCHER_COLUMNS: RangeInclusive<u8> = 4..=6;

/// Raw player record as it appears in the data file
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerRecord {
    #[serde(rename = "B")]
    Batter(BatterRecord),
    #[serde(rename = "P")]
    Pitcher(PitcherRecord),
}

impl PlayerRecord {
    pub fn role(&self) -> Role {
        match self {
            PlayerRecord::Batter(_) => Role::Batter,
            PlayerRecord::Pitcher(_) => Role::Pitcher,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatterRecord {
    pub hand: String,
    pub run: i32,
    #[serde(default)]
    pub bunt: Rating,
    #[serde(default, rename = "HnR")]
    pub hit_and_run: Rating,
    #[serde(default)]
    pub steal: Rating,
    #[serde(default)]
    pub fielding: BTreeMap<String, Vec<i32>>,
    pub batting: BTreeMap<String, SideRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PitcherRecord {
    pub hand: String,
    #[serde(default)]
    pub hold: Rating,
    #[serde(default)]
    pub balk: Rating,
    #[serde(default, rename = "wp")]
    pub wild_pitch: Rating,
    #[serde(default)]
    pub bunt: Rating,
    #[serde(default)]
    pub field: BTreeMap<String, Vec<i32>>,
    #[serde(default, rename = "endurance_S")]
    pub endurance_starter: Option<u32>,
    #[serde(default, rename = "endurance_R")]
    pub endurance_relief: Option<u32>,
    pub pitching: BTreeMap<String, SideRecord>,
}

/// One hand's worth of columns plus the optional `pow` rating
pub type SideRecord = BTreeMap<String, SideValue>;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SideValue {
    Column(Vec<EntryRecord>),
    Power(String),
}

/// A cell: a token, or `[threshold, token_if_le, token_if_gt]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntryRecord {
    Text(String),
    Split(i32, String, String),
}

impl EntryRecord {
    /// Parse into a table entry; `fielder` is set for fielding chart cells
    pub fn to_entry(&self, fielder: Option<Position>) -> std::result::Result<TableEntry, String> {
        let parse = |text: &str| CardResult::parse_with_fielder(text, fielder).map_err(|e| e.to_string());
        Ok(match self {
            EntryRecord::Text(text) => TableEntry::Fixed(parse(text)?),
            EntryRecord::Split(threshold, low, high) => TableEntry::Split {
                threshold: (*threshold).clamp(1, i32::from(D20_FACES)) as u8,
                low: parse(low)?,
                high: parse(high)?,
            },
        })
    }
}

/// Immutable lookup of every card in the data set
#[derive(Debug, Clone, Default)]
pub struct PlayerRepository {
    batters: HashMap<String, Arc<BatterCard>>,
    pitchers: HashMap<String, Arc<PitcherCard>>,
}

impl PlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every card, failing on the first malformed record
    pub fn from_records(records: impl IntoIterator<Item = (String, PlayerRecord)>) -> Result<Self> {
        let mut repo = Self::new();
        for (name, record) in records {
            match record {
                PlayerRecord::Batter(raw) => repo.insert_batter(batter_card(&name, &raw)?),
                PlayerRecord::Pitcher(raw) => repo.insert_pitcher(pitcher_card(&name, &raw)?),
            }
        }
        log::info!(
            "Loaded {} batters and {} pitchers",
            repo.batters.len(),
            repo.pitchers.len()
        );
        Ok(repo)
    }

    /// Parse the player data file contents
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut records = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let record = PlayerRecord::deserialize(value)
                .map_err(|e| Error::malformed(&name, e.to_string()))?;
            records.push((name, record));
        }
        Self::from_records(records)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn insert_batter(&mut self, card: BatterCard) {
        self.pitchers.remove(&card.name);
        self.batters.insert(card.name.clone(), Arc::new(card));
    }

    pub fn insert_pitcher(&mut self, card: PitcherCard) {
        self.batters.remove(&card.name);
        self.pitchers.insert(card.name.clone(), Arc::new(card));
    }

    /// Look up a batter card; a pitcher's name is a type error, not a miss
    pub fn batter(&self, name: &str) -> Result<Arc<BatterCard>> {
        if let Some(card) = self.batters.get(name) {
            return Ok(Arc::clone(card));
        }
        Err(self.lookup_error(name, Role::Batter))
    }

    pub fn pitcher(&self, name: &str) -> Result<Arc<PitcherCard>> {
        if let Some(card) = self.pitchers.get(name) {
            return Ok(Arc::clone(card));
        }
        Err(self.lookup_error(name, Role::Pitcher))
    }

    pub fn role_of(&self, name: &str) -> Option<Role> {
        if self.batters.contains_key(name) {
            Some(Role::Batter)
        } else if self.pitchers.contains_key(name) {
            Some(Role::Pitcher)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.batters.len() + self.pitchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup_error(&self, name: &str, expected: Role) -> Error {
        match self.role_of(name) {
            Some(found) => Error::WrongCardType {
                name: name.to_string(),
                expected,
                found,
            },
            None => Error::PlayerNotFound {
                name: name.to_string(),
            },
        }
    }
}

fn batter_card(name: &str, raw: &BatterRecord) -> Result<BatterCard> {
    let bats = Bats::from_code(&raw.hand)
        .ok_or_else(|| Error::malformed(name, format!("unknown batting hand `{}`", raw.hand)))?;

    let mut sides = [BattingSide::default(), BattingSide::default()];
    for (i, key) in ["L", "R"].into_iter().enumerate() {
        let side = raw
            .batting
            .get(key)
            .ok_or_else(|| Error::malformed(name, format!("no batting side vs {key}")))?;
        let (columns, power) = outcome_columns(name, side, BATTER_COLUMNS)?;
        sides[i] = BattingSide {
            columns,
            power: power.unwrap_or_default(),
        };
    }
    let [vs_left, vs_right] = sides;

    Ok(BatterCard {
        name: name.to_string(),
        bats,
        speed: raw.run,
        bunting: raw.bunt.clone(),
        hit_and_run: raw.hit_and_run.clone(),
        stealing: raw.steal.clone(),
        fielding: fielding_ratings(name, &raw.fielding)?,
        vs_left,
        vs_right,
    })
}

fn pitcher_card(name: &str, raw: &PitcherRecord) -> Result<PitcherCard> {
    let throws = Hand::from_code(&raw.hand)
        .ok_or_else(|| Error::malformed(name, format!("unknown throwing hand `{}`", raw.hand)))?;

    let fielding = fielding_ratings(name, &raw.field)?
        .remove(&Position::Pitcher)
        .ok_or_else(|| Error::MissingFielding {
            name: name.to_string(),
            position: Position::Pitcher,
        })?;

    let side = |key: &str| -> Result<OutcomeColumns> {
        let side = raw
            .pitching
            .get(key)
            .ok_or_else(|| Error::malformed(name, format!("no pitching side vs {key}")))?;
        Ok(outcome_columns(name, side, PITCHER_COLUMNS)?.0)
    };

    Ok(PitcherCard {
        name: name.to_string(),
        throws,
        hold: raw.hold.clone(),
        balk: raw.balk.clone(),
        wild_pitch: raw.wild_pitch.clone(),
        bunting: raw.bunt.clone(),
        fielding,
        endurance: Endurance {
            starter: raw.endurance_starter,
            relief: raw.endurance_relief,
        },
        vs_left: side("L")?,
        vs_right: side("R")?,
    })
}

fn outcome_columns(
    name: &str,
    side: &SideRecord,
    wanted: RangeInclusive<u8>,
) -> Result<(OutcomeColumns, Option<Power>)> {
    let mut columns = OutcomeColumns::default();
    let mut power = None;

    for (key, value) in side {
        match (key.as_str(), value) {
            ("pow", SideValue::Power(code)) => {
                power = Some(match code.as_str() {
                    "N" => Power::Normal,
                    "W" => Power::Weak,
                    other => return Err(Error::malformed(name, format!("unknown power `{other}`"))),
                });
            }
            (key, SideValue::Column(cells)) => {
                let column = key
                    .parse::<u8>()
                    .ok()
                    .filter(|c| wanted.contains(c))
                    .ok_or_else(|| Error::malformed(name, format!("unexpected column `{key}`")))?;
                if cells.len() < COLUMN_LENGTH {
                    return Err(Error::malformed(
                        name,
                        format!("column {column} has {} entries, expected {COLUMN_LENGTH}", cells.len()),
                    ));
                }
                let entries = cells
                    .iter()
                    .map(|cell| cell.to_entry(None))
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|reason| Error::malformed(name, format!("column {column}: {reason}")))?;
                columns.columns.insert(column, entries);
            }
            (key, _) => return Err(Error::malformed(name, format!("unexpected value under `{key}`"))),
        }
    }

    let wanted: Vec<u8> = wanted.collect();
    if !columns.covers(&wanted) {
        return Err(Error::malformed(name, format!("missing one of columns {wanted:?}")));
    }
    Ok((columns, power))
}

fn fielding_ratings(
    name: &str,
    raw: &BTreeMap<String, Vec<i32>>,
) -> Result<BTreeMap<Position, FieldingRating>> {
    let mut ratings = BTreeMap::new();
    for (key, values) in raw {
        let position = key
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=9).contains(n))
            .and_then(Position::from_number)
            .ok_or_else(|| Error::malformed(name, format!("bad fielding position `{key}`")))?;
        let (range, error) = match values.as_slice() {
            [range, error, ..] => (
                u8::try_from(*range).map_err(|_| Error::malformed(name, "negative range rating"))?,
                u8::try_from(*error).map_err(|_| Error::malformed(name, "negative error number"))?,
            ),
            _ => return Err(Error::malformed(name, format!("short fielding line at {position}"))),
        };
        let arm = values.get(2).copied().unwrap_or(0);
        ratings.insert(position, FieldingRating { range, error, arm });
    }
    Ok(ratings)
}
