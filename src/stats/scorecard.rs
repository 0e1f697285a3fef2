//! Scorecard
//!
//! One row per batter, one column per inning. A cell holds every entry the
//! batter made in that inning, in order.

use std::fmt;

use serde::Serialize;

use super::{PlayContext, PlayRecorder};
use crate::cards::{PlayKind, Position};
use crate::sim::{Base, GameState, GroundBallOutcome, PlayResult, ScorecardNote, TeamSide};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorecardRow {
    pub name: String,
    pub position: Position,
    /// Entries per inning, first inning first
    pub cells: Vec<Vec<String>>,
}

impl ScorecardRow {
    fn new(name: impl Into<String>, position: Position, innings: usize) -> Self {
        Self {
            name: name.into(),
            position,
            cells: vec![Vec::new(); innings],
        }
    }

    pub fn cell(&self, inning: u32) -> &[String] {
        inning
            .checked_sub(1)
            .and_then(|i| self.cells.get(i as usize))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ScorecardTeam {
    name: String,
    rows: Vec<ScorecardRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scorecard {
    teams: [ScorecardTeam; 2],
    /// Columns printed, grows with extra innings
    innings: usize,
}

impl Scorecard {
    pub fn new(state: &GameState, regulation_innings: u32) -> Self {
        let innings = regulation_innings as usize;
        let team = |side: TeamSide| ScorecardTeam {
            name: state.roster(side).name.clone(),
            rows: state
                .lineup(side)
                .slots()
                .iter()
                .map(|slot| ScorecardRow::new(slot.card.name.clone(), slot.position, innings))
                .collect(),
        };
        Self {
            teams: [team(TeamSide::Away), team(TeamSide::Home)],
            innings,
        }
    }

    pub fn empty(away: impl Into<String>, home: impl Into<String>, regulation_innings: u32) -> Self {
        let team = |name: String| ScorecardTeam {
            name,
            rows: Vec::new(),
        };
        Self {
            teams: [team(away.into()), team(home.into())],
            innings: regulation_innings as usize,
        }
    }

    pub fn rows(&self, side: TeamSide) -> &[ScorecardRow] {
        &self.teams[side.index()].rows
    }

    pub fn row(&self, side: TeamSide, name: &str) -> Option<&ScorecardRow> {
        self.rows(side).iter().find(|row| row.name == name)
    }

    pub fn innings(&self) -> usize {
        self.innings
    }
}

impl PlayRecorder for Scorecard {
    fn record(&mut self, context: &PlayContext<'_>, result: &PlayResult) {
        let column = (context.inning.max(1) - 1) as usize;
        self.innings = self.innings.max(column + 1);
        let innings = self.innings;

        let team = &mut self.teams[context.batting.index()];
        let index = match team.rows.iter().position(|row| row.name == context.batter) {
            Some(i) => i,
            None => {
                log::warn!("{} scorecard has no row for {}, adding one", team.name, context.batter);
                team.rows
                    .push(ScorecardRow::new(context.batter, Position::DesignatedHitter, innings));
                team.rows.len() - 1
            }
        };
        let row = &mut team.rows[index];
        if row.cells.len() < innings {
            row.cells.resize(innings, Vec::new());
        }
        row.cells[column].push(notation(result));
    }
}

/// Scorer's shorthand for a play
pub fn notation(result: &PlayResult) -> String {
    match result.kind {
        PlayKind::Strikeout => "K".to_string(),
        PlayKind::Walk => "BB".to_string(),
        PlayKind::HitByPitch => "HBP".to_string(),
        PlayKind::HomeRun => "HR".to_string(),
        PlayKind::Single => "\u{2014}".to_string(),
        PlayKind::Double => "\u{2550}".to_string(),
        PlayKind::Triple => "\u{2261}".to_string(),
        PlayKind::FlyBall => match &result.scorecard {
            ScorecardNote::FlyBall {
                position,
                sacrifice,
                thrown_out,
            } => {
                let n = position.number();
                let caught = if *sacrifice { format!("SF{n}") } else { n.to_string() };
                match thrown_out {
                    Some(Base::Home) => format!("{n}-2"),
                    Some(Base::Third) => format!("{caught}-5"),
                    _ => caught,
                }
            }
            other => fallback(result.kind, other),
        },
        PlayKind::GroundBall => match &result.scorecard {
            ScorecardNote::GroundBall { position, outcome } => {
                let n = position.number();
                let pivot = if n <= 4 { 6 } else { 4 };
                match outcome {
                    GroundBallOutcome::DoublePlay => format!("{n}-{pivot}-3"),
                    GroundBallOutcome::FieldersChoice => format!("{n}-{pivot}"),
                    GroundBallOutcome::Out => format!("{n}-3"),
                }
            }
            other => fallback(result.kind, other),
        },
        PlayKind::LineoutMax => match &result.scorecard {
            ScorecardNote::LineoutMax { position, cleared } => {
                let mut chain = vec![position.number()];
                for base in cleared {
                    let fielder = match base {
                        Base::Third => 5,
                        Base::Second if matches!(chain.last(), Some(3 | 4)) => 6,
                        Base::Second => 4,
                        Base::First | Base::Home => 3,
                    };
                    chain.push(fielder);
                }
                chain
                    .iter()
                    .map(u8::to_string)
                    .collect::<Vec<_>>()
                    .join("-")
            }
            other => fallback(result.kind, other),
        },
        PlayKind::Lineout | PlayKind::Popout | PlayKind::Foulout => match &result.scorecard {
            ScorecardNote::Fielder(position) => format!("{}{}", result.kind.code(), position.number()),
            other => fallback(result.kind, other),
        },
        PlayKind::Error => match &result.scorecard {
            ScorecardNote::Error { position, bases } => format!("E{}({bases})", position.number()),
            other => fallback(result.kind, other),
        },
        PlayKind::WildPitch => "WP".to_string(),
        PlayKind::PassedBall => "PB".to_string(),
    }
}

fn fallback(kind: PlayKind, note: &ScorecardNote) -> String {
    log::warn!("{kind} recorded with scorecard note {note:?}");
    kind.code().to_string()
}

impl fmt::Display for Scorecard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for team in &self.teams {
            write!(f, "{:<24}{:>4}", team.name, "Pos")?;
            for inning in 1..=self.innings {
                write!(f, " {inning:^9}")?;
            }
            writeln!(f)?;
            for row in &team.rows {
                write!(f, "{:<24}{:>4}", row.name, row.position.abbrev())?;
                for inning in 0..self.innings {
                    let cell = row.cells.get(inning).map(|c| c.join(" ")).unwrap_or_default();
                    write!(f, " {cell:^9}")?;
                }
                writeln!(f)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BoxScoreNote;
    use crate::test_support::game_state;

    fn result(kind: PlayKind, scorecard: ScorecardNote) -> PlayResult {
        PlayResult {
            kind,
            runs: Vec::new(),
            rbi: true,
            earned: true,
            outs_recorded: 0,
            box_score: BoxScoreNote::None,
            scorecard,
        }
    }

    #[test]
    fn test_flyball_notation() {
        let fly = |sacrifice, thrown_out| {
            notation(&result(
                PlayKind::FlyBall,
                ScorecardNote::FlyBall {
                    position: Position::CenterField,
                    sacrifice,
                    thrown_out,
                },
            ))
        };
        assert_eq!(fly(false, None), "8");
        assert_eq!(fly(true, None), "SF8");
        assert_eq!(fly(false, Some(Base::Home)), "8-2");
        assert_eq!(fly(true, Some(Base::Third)), "SF8-5");
    }

    #[test]
    fn test_groundball_notation() {
        let grounder = |position, outcome| {
            notation(&result(PlayKind::GroundBall, ScorecardNote::GroundBall { position, outcome }))
        };
        assert_eq!(grounder(Position::Shortstop, GroundBallOutcome::DoublePlay), "6-4-3");
        assert_eq!(grounder(Position::SecondBase, GroundBallOutcome::DoublePlay), "4-6-3");
        assert_eq!(grounder(Position::ThirdBase, GroundBallOutcome::FieldersChoice), "5-4");
        assert_eq!(grounder(Position::Pitcher, GroundBallOutcome::Out), "1-3");
    }

    #[test]
    fn test_lineout_max_chain() {
        let lomax = |position, cleared| {
            notation(&result(PlayKind::LineoutMax, ScorecardNote::LineoutMax { position, cleared }))
        };
        assert_eq!(lomax(Position::FirstBase, vec![Base::Second]), "3-6");
        assert_eq!(lomax(Position::ThirdBase, vec![Base::Third, Base::Second]), "5-5-4");
        assert_eq!(lomax(Position::Shortstop, vec![Base::First]), "6-3");
        assert_eq!(lomax(Position::CenterField, vec![]), "8");
    }

    #[test]
    fn test_error_and_outs_notation() {
        assert_eq!(
            notation(&result(
                PlayKind::Error,
                ScorecardNote::Error {
                    position: Position::Shortstop,
                    bases: 2,
                }
            )),
            "E6(2)"
        );
        assert_eq!(
            notation(&result(PlayKind::Popout, ScorecardNote::Fielder(Position::Catcher))),
            "PO2"
        );
        assert_eq!(notation(&result(PlayKind::Double, ScorecardNote::None)), "\u{2550}");
    }

    #[test]
    fn test_cell_collects_entries_and_extra_innings_add_columns() {
        let mut card = Scorecard::new(&game_state(), 9);
        let context = |inning| PlayContext {
            batting: TeamSide::Home,
            inning,
            batter: "Home C",
            pitcher: "Away Ace",
        };
        card.record(&context(3), &result(PlayKind::Walk, ScorecardNote::None));
        card.record(&context(3), &result(PlayKind::Strikeout, ScorecardNote::None));
        card.record(&context(11), &result(PlayKind::HomeRun, ScorecardNote::None));
        let row = card.row(TeamSide::Home, "Home C").unwrap();
        assert_eq!(row.cell(3), ["BB", "K"]);
        assert_eq!(row.cell(11), ["HR"]);
        assert!(row.cell(1).is_empty());
        assert_eq!(card.innings(), 11);
    }

    #[test]
    fn test_every_kind_records_on_empty_card() {
        for kind in PlayKind::ALL {
            let mut card = Scorecard::empty("Away", "Home", 9);
            let context = PlayContext {
                batting: TeamSide::Away,
                inning: 1,
                batter: "Nobody",
                pitcher: "Nobody Else",
            };
            card.record(&context, &result(kind, ScorecardNote::None));
            assert_eq!(card.row(TeamSide::Away, "Nobody").unwrap().cell(1).len(), 1);
        }
    }
}
