//! Box score

use std::fmt;

use serde::Serialize;

use super::{PlayContext, PlayRecorder};
use crate::cards::{PlayKind, Position};
use crate::consts::OUTS_PER_INNING;
use crate::sim::{BoxScoreNote, GameState, GroundBallOutcome, PlayResult, TeamSide};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattingLine {
    pub name: String,
    pub position: Position,
    pub at_bats: u32,
    pub runs: u32,
    pub hits: u32,
    pub rbi: u32,
    pub home_runs: u32,
    pub walks: u32,
    pub hit_by_pitch: u32,
    pub strikeouts: u32,
}

impl BattingLine {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
            at_bats: 0,
            runs: 0,
            hits: 0,
            rbi: 0,
            home_runs: 0,
            walks: 0,
            hit_by_pitch: 0,
            strikeouts: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PitchingLine {
    pub name: String,
    /// Outs recorded; innings pitched is this over three
    pub outs: u32,
    pub hits: u32,
    pub runs: u32,
    pub earned_runs: u32,
    pub walks: u32,
    pub hit_by_pitch: u32,
    pub strikeouts: u32,
    pub home_runs: u32,
}

impl PitchingLine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Innings pitched in scorer's notation (`6.2` is six and two thirds)
    pub fn innings_pitched(&self) -> String {
        let per = u32::from(OUTS_PER_INNING);
        format!("{}.{}", self.outs / per, self.outs % per)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamBox {
    pub name: String,
    /// Batting order, then anyone who turned up later
    pub batters: Vec<BattingLine>,
    pub pitchers: Vec<PitchingLine>,
    /// Runners put out trying for an extra base
    pub thrown_out: u32,
    /// Double plays turned in the field (groundball or lineout)
    pub double_plays: u32,
}

impl TeamBox {
    fn new(name: String, batters: Vec<BattingLine>, pitchers: Vec<PitchingLine>) -> Self {
        Self {
            name,
            batters,
            pitchers,
            thrown_out: 0,
            double_plays: 0,
        }
    }

    fn batter_mut(&mut self, name: &str) -> &mut BattingLine {
        match self.batters.iter().position(|line| line.name == name) {
            Some(i) => &mut self.batters[i],
            None => {
                log::warn!("{} box score has no line for {name}, adding one", self.name);
                self.batters.push(BattingLine::new(name, Position::DesignatedHitter));
                let last = self.batters.len() - 1;
                &mut self.batters[last]
            }
        }
    }

    fn pitcher_mut(&mut self, name: &str) -> &mut PitchingLine {
        match self.pitchers.iter().position(|line| line.name == name) {
            Some(i) => &mut self.pitchers[i],
            None => {
                log::warn!("{} box score has no line for pitcher {name}, adding one", self.name);
                self.pitchers.push(PitchingLine::new(name));
                let last = self.pitchers.len() - 1;
                &mut self.pitchers[last]
            }
        }
    }

    pub fn batter(&self, name: &str) -> Option<&BattingLine> {
        self.batters.iter().find(|line| line.name == name)
    }

    pub fn pitcher(&self, name: &str) -> Option<&PitchingLine> {
        self.pitchers.iter().find(|line| line.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxScore {
    teams: [TeamBox; 2],
}

impl BoxScore {
    /// Lines for both starting lineups and starting pitchers
    pub fn new(state: &GameState) -> Self {
        let team = |side: TeamSide| {
            let roster = state.roster(side);
            TeamBox::new(
                roster.name.clone(),
                state
                    .lineup(side)
                    .slots()
                    .iter()
                    .map(|slot| BattingLine::new(slot.card.name.clone(), slot.position))
                    .collect(),
                vec![PitchingLine::new(roster.pitcher.name.clone())],
            )
        };
        Self {
            teams: [team(TeamSide::Away), team(TeamSide::Home)],
        }
    }

    /// Empty box score with no registered players
    pub fn empty(away: impl Into<String>, home: impl Into<String>) -> Self {
        let team = |name: String| TeamBox::new(name, Vec::new(), Vec::new());
        Self {
            teams: [team(away.into()), team(home.into())],
        }
    }

    pub fn team(&self, side: TeamSide) -> &TeamBox {
        &self.teams[side.index()]
    }
}

impl PlayRecorder for BoxScore {
    fn record(&mut self, context: &PlayContext<'_>, result: &PlayResult) {
        let runs = result.runs.len() as u32;
        let [away, home] = &mut self.teams;
        let (offense, defense) = match context.batting {
            TeamSide::Away => (away, home),
            TeamSide::Home => (home, away),
        };

        for runner in &result.runs {
            offense.batter_mut(runner).runs += 1;
        }

        let batter = offense.batter_mut(context.batter);
        if result.rbi {
            batter.rbi += runs;
        }
        let pitcher = defense.pitcher_mut(context.pitcher);
        pitcher.runs += runs;
        if result.earned {
            pitcher.earned_runs += runs;
        }
        pitcher.outs += u32::from(result.outs_recorded);

        match result.kind {
            PlayKind::Strikeout => {
                batter.at_bats += 1;
                batter.strikeouts += 1;
                pitcher.strikeouts += 1;
            }
            PlayKind::Walk => {
                batter.walks += 1;
                pitcher.walks += 1;
            }
            PlayKind::HitByPitch => {
                batter.hit_by_pitch += 1;
                pitcher.hit_by_pitch += 1;
            }
            PlayKind::HomeRun => {
                batter.at_bats += 1;
                batter.hits += 1;
                batter.home_runs += 1;
                pitcher.hits += 1;
                pitcher.home_runs += 1;
            }
            PlayKind::Single | PlayKind::Double | PlayKind::Triple => {
                batter.at_bats += 1;
                batter.hits += 1;
                pitcher.hits += 1;
            }
            PlayKind::FlyBall => {
                let sacrifice = matches!(result.box_score, BoxScoreNote::FlyBall { sacrifice: true, .. });
                if !sacrifice {
                    batter.at_bats += 1;
                }
            }
            PlayKind::GroundBall
            | PlayKind::LineoutMax
            | PlayKind::Lineout
            | PlayKind::Popout
            | PlayKind::Foulout
            | PlayKind::Error => batter.at_bats += 1,
            PlayKind::WildPitch | PlayKind::PassedBall => {}
        }

        match result.box_score {
            BoxScoreNote::Hit { runner_out: true } | BoxScoreNote::FlyBall { extra_out: true, .. } => {
                offense.thrown_out += 1;
            }
            BoxScoreNote::GroundBall(GroundBallOutcome::DoublePlay) => defense.double_plays += 1,
            BoxScoreNote::LineoutMax { outs } if outs >= 2 => defense.double_plays += 1,
            _ => {}
        }
    }
}

impl fmt::Display for BoxScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for team in &self.teams {
            writeln!(f, "{}", team.name)?;
            writeln!(
                f,
                "{:<24}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}",
                "", "Pos", "AB", "R", "H", "RBI", "HR", "BB", "HBP", "K"
            )?;
            for line in &team.batters {
                writeln!(
                    f,
                    "{:<24}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}",
                    line.name,
                    line.position.abbrev(),
                    line.at_bats,
                    line.runs,
                    line.hits,
                    line.rbi,
                    line.home_runs,
                    line.walks,
                    line.hit_by_pitch,
                    line.strikeouts
                )?;
            }
            writeln!(
                f,
                "{:<24}{:>5}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}",
                "", "IP", "H", "R", "ER", "BB", "HBP", "K", "HR"
            )?;
            for line in &team.pitchers {
                writeln!(
                    f,
                    "{:<24}{:>5}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}{:>4}",
                    line.name,
                    line.innings_pitched(),
                    line.hits,
                    line.runs,
                    line.earned_runs,
                    line.walks,
                    line.hit_by_pitch,
                    line.strikeouts,
                    line.home_runs
                )?;
            }
            if team.double_plays > 0 {
                writeln!(f, "DP: {}", team.double_plays)?;
            }
            if team.thrown_out > 0 {
                writeln!(f, "Thrown out on the bases: {}", team.thrown_out)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ScorecardNote;
    use crate::test_support::game_state;

    fn context() -> PlayContext<'static> {
        PlayContext {
            batting: TeamSide::Away,
            inning: 1,
            batter: "Away DH",
            pitcher: "Home Ace",
        }
    }

    fn result(kind: PlayKind, runs: &[&str], outs: u8) -> PlayResult {
        PlayResult {
            kind,
            runs: runs.iter().map(|r| r.to_string()).collect(),
            rbi: true,
            earned: true,
            outs_recorded: outs,
            box_score: BoxScoreNote::None,
            scorecard: ScorecardNote::None,
        }
    }

    #[test]
    fn test_strikeout_line() {
        let mut box_score = BoxScore::new(&game_state());
        box_score.record(&context(), &result(PlayKind::Strikeout, &[], 1));
        let batter = box_score.team(TeamSide::Away).batter("Away DH").unwrap();
        assert_eq!((batter.at_bats, batter.strikeouts), (1, 1));
        let pitcher = box_score.team(TeamSide::Home).pitcher("Home Ace").unwrap();
        assert_eq!((pitcher.outs, pitcher.strikeouts), (1, 1));
        assert_eq!(pitcher.innings_pitched(), "0.1");
    }

    #[test]
    fn test_home_run_credits_runs_and_rbi() {
        let mut box_score = BoxScore::new(&game_state());
        box_score.record(&context(), &result(PlayKind::HomeRun, &["Away DH", "Away C"], 0));
        let team = box_score.team(TeamSide::Away);
        let batter = team.batter("Away DH").unwrap();
        assert_eq!((batter.at_bats, batter.hits, batter.home_runs, batter.rbi, batter.runs), (1, 1, 1, 2, 1));
        assert_eq!(team.batter("Away C").unwrap().runs, 1);
        let pitcher = box_score.team(TeamSide::Home).pitcher("Home Ace").unwrap();
        assert_eq!((pitcher.hits, pitcher.home_runs, pitcher.runs, pitcher.earned_runs), (1, 1, 2, 2));
    }

    #[test]
    fn test_sacrifice_fly_is_not_an_at_bat() {
        let mut box_score = BoxScore::new(&game_state());
        let mut sac = result(PlayKind::FlyBall, &["Away C"], 1);
        sac.box_score = BoxScoreNote::FlyBall {
            sacrifice: true,
            extra_out: false,
        };
        box_score.record(&context(), &sac);
        let batter = box_score.team(TeamSide::Away).batter("Away DH").unwrap();
        assert_eq!((batter.at_bats, batter.rbi), (0, 1));
    }

    #[test]
    fn test_double_play_charges_two_outs() {
        let mut box_score = BoxScore::new(&game_state());
        let mut dp = result(PlayKind::GroundBall, &[], 2);
        dp.rbi = false;
        dp.box_score = BoxScoreNote::GroundBall(GroundBallOutcome::DoublePlay);
        box_score.record(&context(), &dp);
        box_score.record(&context(), &result(PlayKind::Lineout, &[], 1));
        let pitcher = box_score.team(TeamSide::Home).pitcher("Home Ace").unwrap();
        assert_eq!(pitcher.innings_pitched(), "1.0");
    }

    #[test]
    fn test_unearned_runs_without_rbi() {
        let mut box_score = BoxScore::new(&game_state());
        let mut wp = result(PlayKind::WildPitch, &["Away C"], 0);
        wp.rbi = false;
        wp.earned = false;
        box_score.record(&context(), &wp);
        let pitcher = box_score.team(TeamSide::Home).pitcher("Home Ace").unwrap();
        assert_eq!((pitcher.runs, pitcher.earned_runs), (1, 0));
        let batter = box_score.team(TeamSide::Away).batter("Away DH").unwrap();
        assert_eq!((batter.at_bats, batter.rbi), (0, 0));
    }

    #[test]
    fn test_baserunning_outs_and_double_plays() {
        let mut box_score = BoxScore::new(&game_state());
        let mut single = result(PlayKind::Single, &[], 1);
        single.box_score = BoxScoreNote::Hit { runner_out: true };
        box_score.record(&context(), &single);
        let mut held = result(PlayKind::Single, &[], 0);
        held.box_score = BoxScoreNote::Hit { runner_out: false };
        box_score.record(&context(), &held);
        let mut tag = result(PlayKind::FlyBall, &[], 2);
        tag.box_score = BoxScoreNote::FlyBall {
            sacrifice: false,
            extra_out: true,
        };
        box_score.record(&context(), &tag);
        let mut dp = result(PlayKind::GroundBall, &[], 2);
        dp.box_score = BoxScoreNote::GroundBall(GroundBallOutcome::DoublePlay);
        box_score.record(&context(), &dp);
        let mut lomax = result(PlayKind::LineoutMax, &[], 1);
        lomax.box_score = BoxScoreNote::LineoutMax { outs: 1 };
        box_score.record(&context(), &lomax);

        let away = box_score.team(TeamSide::Away);
        assert_eq!((away.thrown_out, away.double_plays), (2, 0));
        let home = box_score.team(TeamSide::Home);
        assert_eq!((home.thrown_out, home.double_plays), (0, 1));
        let batter = away.batter("Away DH").unwrap();
        assert_eq!((batter.hits, batter.at_bats), (2, 5));

        let text = box_score.to_string();
        assert!(text.contains("Thrown out on the bases: 2"));
        assert!(text.contains("DP: 1"));
    }

    #[test]
    fn test_every_kind_records_on_empty_box() {
        for kind in PlayKind::ALL {
            let mut box_score = BoxScore::empty("Away", "Home");
            box_score.record(&context(), &result(kind, &["Runner"], 0));
            assert!(box_score.team(TeamSide::Away).batter("Away DH").is_some());
            assert!(box_score.team(TeamSide::Home).pitcher("Home Ace").is_some());
        }
    }
}
