//! Scoreboard: line score plus runs, hits and errors

use std::fmt;

use serde::Serialize;

use super::{PlayContext, PlayRecorder};
use crate::cards::PlayKind;
use crate::sim::{PlayResult, TeamSide};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreboardLine {
    pub name: String,
    /// Runs per inning; `None` until that half inning starts
    pub innings: Vec<Option<u32>>,
    pub runs: u32,
    pub hits: u32,
    pub errors: u32,
}

impl ScoreboardLine {
    fn new(name: String, innings: usize) -> Self {
        Self {
            name,
            innings: vec![None; innings],
            runs: 0,
            hits: 0,
            errors: 0,
        }
    }

    fn inning_mut(&mut self, inning: u32) -> &mut u32 {
        let index = (inning.max(1) - 1) as usize;
        if self.innings.len() <= index {
            self.innings.resize(index + 1, None);
        }
        self.innings[index].get_or_insert(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    lines: [ScoreboardLine; 2],
}

impl Scoreboard {
    pub fn new(away: impl Into<String>, home: impl Into<String>, regulation_innings: u32) -> Self {
        let innings = regulation_innings as usize;
        Self {
            lines: [
                ScoreboardLine::new(away.into(), innings),
                ScoreboardLine::new(home.into(), innings),
            ],
        }
    }

    /// Open a half inning so it shows 0 rather than blank
    pub fn start_half(&mut self, inning: u32, side: TeamSide) {
        self.lines[side.index()].inning_mut(inning);
    }

    pub fn line(&self, side: TeamSide) -> &ScoreboardLine {
        &self.lines[side.index()]
    }
}

impl PlayRecorder for Scoreboard {
    fn record(&mut self, context: &PlayContext<'_>, result: &PlayResult) {
        let runs = result.runs.len() as u32;
        let offense = &mut self.lines[context.batting.index()];
        *offense.inning_mut(context.inning) += runs;
        offense.runs += runs;

        match result.kind {
            PlayKind::Single | PlayKind::Double | PlayKind::Triple | PlayKind::HomeRun => {
                offense.hits += 1;
            }
            PlayKind::Error => self.lines[context.batting.other().index()].errors += 1,
            PlayKind::Strikeout
            | PlayKind::Walk
            | PlayKind::HitByPitch
            | PlayKind::FlyBall
            | PlayKind::GroundBall
            | PlayKind::LineoutMax
            | PlayKind::Lineout
            | PlayKind::Popout
            | PlayKind::Foulout
            | PlayKind::WildPitch
            | PlayKind::PassedBall => {}
        }
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let innings = self.lines.iter().map(|l| l.innings.len()).max().unwrap_or(0);
        write!(f, "{:<20}", "")?;
        for inning in 1..=innings {
            write!(f, "{inning:>3}")?;
        }
        writeln!(f, " |{:>3}{:>3}{:>3}", "R", "H", "E")?;
        for line in &self.lines {
            write!(f, "{:<20}", line.name)?;
            for inning in 0..innings {
                match line.innings.get(inning).copied().flatten() {
                    Some(runs) => write!(f, "{runs:>3}")?,
                    None => write!(f, "{:>3}", "")?,
                }
            }
            writeln!(f, " |{:>3}{:>3}{:>3}", line.runs, line.hits, line.errors)?;
        }
        Ok(())
    }
}
