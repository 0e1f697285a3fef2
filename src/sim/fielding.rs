//! Fielding chart
//!
//! `X` results are settled here: a d20 against the fielder's range row, and
//! on an error a mixed roll against his error-number row.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::dice::{Dice, MixedRoll};
use crate::cards::{CardResult, EntryRecord, FieldingRating, Mishap, Play, Position, TableEntry, Token};
use crate::consts::{CHART_ROW_LENGTH, COLUMN_LENGTH};
use crate::error::{Error, Result};

/// One d20 face on a range row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartCell {
    Error,
    /// A play, possibly behind a wild pitch or passed ball
    Result { mishap: Option<Mishap>, play: Play },
}

/// Rows for a single position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionChart {
    /// Range rating to 20 cells
    pub ratings: BTreeMap<u8, Vec<ChartCell>>,
    /// Error number to 11 entries indexed by two-dice sum
    pub errors: BTreeMap<u8, Vec<TableEntry>>,
}

/// What a fielding chart roll came to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldingOutcome {
    pub roll: u8,
    /// Set when the range row showed an error
    pub error_roll: Option<MixedRoll>,
    /// Applied before `play`
    pub mishap: Option<Mishap>,
    pub play: Play,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldingChart {
    positions: BTreeMap<Position, PositionChart>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChartRecord {
    Row(Vec<String>),
    Errors(BTreeMap<String, Vec<EntryRecord>>),
}

impl FieldingChart {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, ChartRecord>> = serde_json::from_str(json)?;
        let mut positions = BTreeMap::new();

        for (key, rows) in raw {
            let position = key
                .parse::<u8>()
                .ok()
                .filter(|n| (1..=9).contains(n))
                .and_then(Position::from_number)
                .ok_or_else(|| malformed(format!("bad position key `{key}`")))?;
            positions.insert(position, position_chart(position, rows)?);
        }

        log::info!("Loaded fielding chart for {} positions", positions.len());
        Ok(Self { positions })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn position(&self, position: Position) -> Option<&PositionChart> {
        self.positions.get(&position)
    }

    /// Check the chart has the rows a fielder will need
    pub fn check_fielder(&self, position: Position, rating: &FieldingRating) -> Result<()> {
        let gap = |what: String| Error::ChartGap { position, what };
        let chart = self
            .positions
            .get(&position)
            .ok_or_else(|| gap("position table".to_string()))?;
        let row = chart
            .ratings
            .get(&rating.range)
            .ok_or_else(|| gap(format!("range row {}", rating.range)))?;
        if row.contains(&ChartCell::Error) && !chart.errors.contains_key(&rating.error) {
            return Err(gap(format!("error row {}", rating.error)));
        }
        Ok(())
    }

    /// Roll the chart for the fielder at `position`
    pub fn resolve(
        &self,
        position: Position,
        rating: &FieldingRating,
        dice: &mut dyn Dice,
    ) -> Result<FieldingOutcome> {
        let gap = |what: String| Error::ChartGap { position, what };
        let chart = self
            .positions
            .get(&position)
            .ok_or_else(|| gap("position table".to_string()))?;

        let roll = dice.d20();
        let cell = chart
            .ratings
            .get(&rating.range)
            .and_then(|row| row.get(usize::from(roll) - 1))
            .ok_or_else(|| gap(format!("range row {} roll {roll}", rating.range)))?;
        log::debug!("{position} chart, range {}, rolled {roll}: {cell:?}", rating.range);

        match *cell {
            ChartCell::Result { mishap, play } => Ok(FieldingOutcome {
                roll,
                error_roll: None,
                mishap,
                play,
            }),
            ChartCell::Error => {
                let error_roll = dice.mixed();
                let entry = chart
                    .errors
                    .get(&rating.error)
                    .and_then(|row| row.get(usize::from(error_roll.sum.saturating_sub(2))))
                    .ok_or_else(|| gap(format!("error row {} sum {}", rating.error, error_roll.sum)))?;
                let result = entry.pick(error_roll.column);
                let (mishap, play) =
                    chart_play(result).ok_or_else(|| malformed(format!("{position} error table holds {result:?}")))?;
                log::debug!("{position} error {}, rolled {error_roll:?}: {mishap:?} {play:?}", rating.error);
                Ok(FieldingOutcome {
                    roll,
                    error_roll: Some(error_roll),
                    mishap,
                    play,
                })
            }
        }
    }
}

fn malformed(reason: String) -> Error {
    Error::MalformedChart { reason }
}

/// Chart cells name a play outright; a leading pitch mishap is the only
/// modifier allowed
fn chart_play(result: &CardResult) -> Option<(Option<Mishap>, Play)> {
    match result {
        CardResult {
            mishap,
            token: Token::Play(play),
            fatigue: false,
            infield_in: false,
        } => Some((*mishap, *play)),
        _ => None,
    }
}

fn position_chart(position: Position, rows: BTreeMap<String, ChartRecord>) -> Result<PositionChart> {
    let mut chart = PositionChart::default();

    for (key, record) in rows {
        match (key.as_str(), record) {
            ("E" | "Error", ChartRecord::Errors(errors)) => {
                for (number, entries) in errors {
                    let number = number
                        .parse::<u8>()
                        .map_err(|_| malformed(format!("{position}: bad error number `{number}`")))?;
                    if entries.len() < COLUMN_LENGTH {
                        return Err(malformed(format!(
                            "{position}: error row {number} has {} entries, expected {COLUMN_LENGTH}",
                            entries.len()
                        )));
                    }
                    let entries = entries
                        .iter()
                        .map(|e| {
                            let entry = e.to_entry(Some(position))?;
                            let branches = match &entry {
                                TableEntry::Fixed(result) => vec![result],
                                TableEntry::Split { low, high, .. } => vec![low, high],
                            };
                            if branches.iter().all(|r| chart_play(r).is_some()) {
                                Ok(entry)
                            } else {
                                Err(format!("{e:?} is not a plain play"))
                            }
                        })
                        .collect::<std::result::Result<Vec<_>, String>>()
                        .map_err(|reason| malformed(format!("{position}: error row {number}: {reason}")))?;
                    chart.errors.insert(number, entries);
                }
            }
            (rating, ChartRecord::Row(cells)) => {
                let rating = rating
                    .parse::<u8>()
                    .map_err(|_| malformed(format!("{position}: bad rating `{rating}`")))?;
                if cells.len() != CHART_ROW_LENGTH {
                    return Err(malformed(format!(
                        "{position}: rating {rating} has {} cells, expected {CHART_ROW_LENGTH}",
                        cells.len()
                    )));
                }
                let cells = cells
                    .iter()
                    .map(|text| chart_cell(position, text))
                    .collect::<Result<Vec<_>>>()?;
                chart.ratings.insert(rating, cells);
            }
            (key, _) => return Err(malformed(format!("{position}: unexpected value under `{key}`"))),
        }
    }
    Ok(chart)
}

fn chart_cell(position: Position, text: &str) -> Result<ChartCell> {
    if text == "E" {
        return Ok(ChartCell::Error);
    }
    let result = CardResult::parse_with_fielder(text, Some(position))
        .map_err(|e| malformed(format!("{position}: {e}")))?;
    chart_play(&result)
        .map(|(mishap, play)| ChartCell::Result { mishap, play })
        .ok_or_else(|| malformed(format!("{position}: `{text}` is not a plain play")))
}
