//! Game orchestrator
//!
//! Drives plate appearances: resolve, apply, record, advance the lineup,
//! then one end-of-game evaluation.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::dice::{Dice, MixedRoll};
use super::fielding::FieldingChart;
use super::plays::PlayResult;
use super::resolver::{Resolution, resolve_plate_appearance};
use super::running::{DecisionProvider, RunnerAdvancement};
use super::state::{Base, GameState, InfieldAlignment, Lineup, LineupSlot, Roster, TeamSide};
use crate::cards::{PlayerRepository, Position};
use crate::consts::{LINEUP_SIZE, OUTS_PER_INNING, REGULATION_INNINGS};
use crate::error::{Error, Result};
use crate::stats::{BoxScore, PlayContext, PlayRecorder, Scoreboard, Scorecard, notation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    InProgress,
    HomeWin,
    AwayWin,
}

/// One team as written in the setup file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSheet {
    pub name: String,
    /// Player per position index: 0 designated hitter, 1 pitcher, 2-9 fielders
    pub positions: [String; 10],
    /// Position indices in batting order
    pub batting_order: [u8; LINEUP_SIZE],
}

impl TeamSheet {
    /// Look up every card and check the lineup, fielding lines and chart rows
    pub fn build(&self, side: TeamSide, players: &PlayerRepository, chart: &FieldingChart) -> Result<(Roster, Lineup)> {
        let invalid = |reason: String| Error::InvalidLineup { team: side, reason };

        let mut seen = [false; 10];
        for &index in &self.batting_order {
            match Position::from_number(index) {
                Some(Position::Pitcher) => return Err(invalid("the pitcher cannot bat with a designated hitter".into())),
                Some(_) if seen[usize::from(index)] => {
                    return Err(invalid(format!("position {index} bats twice")));
                }
                Some(_) => seen[usize::from(index)] = true,
                None => return Err(invalid(format!("no position {index}"))),
            }
        }

        let pitcher = players.pitcher(&self.positions[1])?;
        chart.check_fielder(Position::Pitcher, &pitcher.fielding)?;

        let mut cards = Vec::with_capacity(9);
        for index in std::iter::once(0).chain(2..=9u8) {
            let name = &self.positions[usize::from(index)];
            let card = players.batter(name)?;
            if let Some(position) = Position::from_number(index).filter(|p| *p != Position::DesignatedHitter) {
                let rating = card.fielding_at(position).ok_or_else(|| Error::MissingFielding {
                    name: name.clone(),
                    position,
                })?;
                chart.check_fielder(position, rating)?;
            }
            cards.push(card);
        }
        let cards: [Arc<_>; 9] = cards
            .try_into()
            .map_err(|_| invalid("expected nine batters".into()))?;
        let roster = Roster::new(self.name.clone(), pitcher, cards);

        let mut slots = Vec::with_capacity(LINEUP_SIZE);
        for &index in &self.batting_order {
            let position = Position::from_number(index).ok_or_else(|| invalid(format!("no position {index}")))?;
            let card = roster
                .batter_at(position)
                .ok_or_else(|| invalid(format!("nobody bats for {position}")))?;
            slots.push(LineupSlot {
                position,
                card: Arc::clone(card),
            });
        }
        let slots: [LineupSlot; LINEUP_SIZE] = slots
            .try_into()
            .map_err(|_| invalid("expected nine lineup slots".into()))?;

        Ok((roster, Lineup::new(slots)))
    }
}

/// Both team sheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    pub away: TeamSheet,
    pub home: TeamSheet,
}

impl GameSetup {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Record of one plate appearance for play-by-play
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlateAppearance {
    pub inning: u32,
    pub batting: TeamSide,
    pub batter: String,
    pub pitcher: String,
    pub roll: MixedRoll,
    pub split_roll: Option<u8>,
    pub fielding_roll: Option<u8>,
    /// Pitch mishap first when there was one
    pub results: Vec<PlayResult>,
    /// Outs once the play was over, before any side change
    pub outs: u8,
    pub score: [u32; 2],
    pub result: GameResult,
}

impl fmt::Display for PlateAppearance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let half = match self.batting {
            TeamSide::Away => "Top",
            TeamSide::Home => "Bot",
        };
        write!(f, "{half} {:>2}  {:<24}", self.inning, self.batter)?;
        let plays: Vec<String> = self.results.iter().map(notation).collect();
        write!(f, "{:<12}", plays.join(", "))?;
        let runs: Vec<&str> = self
            .results
            .iter()
            .flat_map(|r| r.runs.iter().map(String::as_str))
            .collect();
        if !runs.is_empty() {
            write!(f, " scores: {}", runs.join(", "))?;
        }
        write!(f, "  [{} out, {}-{}]", self.outs, self.score[0], self.score[1])
    }
}

/// A defender for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Defender {
    pub position: Position,
    pub name: String,
}

/// Read-only view of the game for display collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub teams: [String; 2],
    pub score: [u32; 2],
    pub inning: u32,
    pub batting: TeamSide,
    pub outs: u8,
    pub runners: [Option<String>; 3],
    pub defense: Vec<Defender>,
    pub batter: String,
    pub pitcher: String,
    pub infield: InfieldAlignment,
    pub result: GameResult,
}

pub struct Game<D: Dice, P: DecisionProvider> {
    state: GameState,
    box_score: BoxScore,
    scorecard: Scorecard,
    scoreboard: Scoreboard,
    chart: FieldingChart,
    dice: D,
    decisions: P,
    regulation_innings: u32,
    result: GameResult,
    plate_appearances: u32,
}

impl<D: Dice, P: DecisionProvider> Game<D, P> {
    /// Validate both team sheets and set up a regulation-length game
    pub fn new(players: &PlayerRepository, chart: FieldingChart, setup: &GameSetup, dice: D, decisions: P) -> Result<Self> {
        let away = setup.away.build(TeamSide::Away, players, &chart)?;
        let home = setup.home.build(TeamSide::Home, players, &chart)?;
        let state = GameState::new(away, home);
        log::info!("{} at {}", setup.away.name, setup.home.name);
        Ok(Self::from_state(state, chart, dice, decisions, REGULATION_INNINGS))
    }

    /// Start from an existing state (any situation a test needs)
    pub fn from_state(state: GameState, chart: FieldingChart, dice: D, decisions: P, regulation_innings: u32) -> Self {
        let (scorecard, scoreboard) = inning_trackers(&state, regulation_innings);
        Self {
            box_score: BoxScore::new(&state),
            scorecard,
            scoreboard,
            state,
            chart,
            dice,
            decisions,
            regulation_innings,
            result: GameResult::InProgress,
            plate_appearances: 0,
        }
    }

    /// Set the game length. The scorecard and scoreboard are resized until
    /// the first plate appearance; after that only the end rule changes.
    pub fn with_regulation_innings(mut self, innings: u32) -> Self {
        self.regulation_innings = innings.max(1);
        if self.plate_appearances == 0 {
            (self.scorecard, self.scoreboard) = inning_trackers(&self.state, self.regulation_innings);
        } else {
            log::warn!("Game length changed to {} innings mid-game", self.regulation_innings);
        }
        self
    }

    pub fn with_infield(mut self, alignment: InfieldAlignment) -> Self {
        self.state.infield = alignment;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn box_score(&self) -> &BoxScore {
        &self.box_score
    }

    pub fn scorecard(&self) -> &Scorecard {
        &self.scorecard
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn dice(&self) -> &D {
        &self.dice
    }

    pub fn decisions(&self) -> &P {
        &self.decisions
    }

    pub fn plate_appearances(&self) -> u32 {
        self.plate_appearances
    }

    /// One plate appearance, start to finish
    pub fn plate_appearance(&mut self) -> Result<PlateAppearance> {
        if self.result != GameResult::InProgress {
            return Err(Error::GameOver);
        }

        let batting = self.state.batting();
        let inning = self.state.inning();
        let batter = Arc::clone(self.state.batter());
        let pitcher = Arc::clone(self.state.pitcher());

        let resolution: Resolution = resolve_plate_appearance(&self.state, &self.chart, &mut self.dice)?;

        let mut results = Vec::with_capacity(2);
        {
            let mut running = RunnerAdvancement::new(&mut self.dice, &mut self.decisions);
            if let Some(mishap) = resolution.mishap {
                results.push(self.state.apply(mishap.play(), &mut running));
            }
            results.push(self.state.apply(resolution.play, &mut running));
        }

        let context = PlayContext {
            batting,
            inning,
            batter: &batter.name,
            pitcher: &pitcher.name,
        };
        for result in &results {
            let trackers: [&mut dyn PlayRecorder; 3] = [&mut self.box_score, &mut self.scorecard, &mut self.scoreboard];
            for tracker in trackers {
                tracker.record(&context, result);
            }
            self.state
                .charge_pitcher(&pitcher, result.outs_recorded, result.runs.len(), result.earned);
        }

        self.state.advance_lineup();
        self.plate_appearances += 1;
        let outs = self.state.outs();
        let score = self.state.scores();
        self.evaluate_end();

        Ok(PlateAppearance {
            inning,
            batting,
            batter: batter.name.clone(),
            pitcher: pitcher.name.clone(),
            roll: resolution.roll,
            split_roll: resolution.split_roll,
            fielding_roll: resolution.fielding.map(|f| f.roll),
            results,
            outs,
            score,
            result: self.result,
        })
    }

    /// Play until a result or until `max_plate_appearances` more have been
    /// resolved
    pub fn play_out(&mut self, max_plate_appearances: u32) -> Result<GameResult> {
        let mut played = 0;
        while self.result == GameResult::InProgress && played < max_plate_appearances {
            self.plate_appearance()?;
            played += 1;
        }
        if self.result == GameResult::InProgress {
            log::warn!("Stopped after {played} plate appearances with the game unfinished");
        }
        Ok(self.result)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let state = &self.state;
        let defense = state.defense();
        GameSnapshot {
            teams: [
                state.roster(TeamSide::Away).name.clone(),
                state.roster(TeamSide::Home).name.clone(),
            ],
            score: state.scores(),
            inning: state.inning(),
            batting: state.batting(),
            outs: state.outs(),
            runners: Base::OCCUPIABLE.map(|b| state.runner(b).map(|r| r.name.clone())),
            defense: Position::FIELDERS
                .iter()
                .map(|&position| Defender {
                    position,
                    name: defense.name_at(position).to_string(),
                })
                .collect(),
            batter: state.batter().name.clone(),
            pitcher: state.pitcher().name.clone(),
            infield: state.infield,
            result: self.result,
        }
    }

    /// Three outs first, then walk-off
    fn evaluate_end(&mut self) {
        let [away, home] = self.state.scores();
        let late = self.state.inning() >= self.regulation_innings;
        let batting = self.state.batting();

        if self.state.outs() >= OUTS_PER_INNING {
            if late {
                self.result = match batting {
                    TeamSide::Away if home > away => GameResult::HomeWin,
                    TeamSide::Home if away > home => GameResult::AwayWin,
                    TeamSide::Home if home > away => GameResult::HomeWin,
                    _ => GameResult::InProgress,
                };
            }
            if self.result == GameResult::InProgress {
                self.state.end_half_inning();
                self.scoreboard.start_half(self.state.inning(), self.state.batting());
            }
        } else if late && batting == TeamSide::Home && home > away {
            log::info!("Walk-off in the {}", self.state.inning());
            self.result = GameResult::HomeWin;
        }

        if self.result != GameResult::InProgress {
            log::info!("Final: {away}-{home}, {:?}", self.result);
        }
    }
}

/// Trackers whose columns follow the game length
fn inning_trackers(state: &GameState, regulation_innings: u32) -> (Scorecard, Scoreboard) {
    let mut scoreboard = Scoreboard::new(
        state.roster(TeamSide::Away).name.clone(),
        state.roster(TeamSide::Home).name.clone(),
        regulation_innings,
    );
    scoreboard.start_half(state.inning(), state.batting());
    (Scorecard::new(state, regulation_innings), scoreboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::PlayKind;
    use crate::sim::dice::ScriptedDice;
    use crate::sim::running::SendPolicy;
    use crate::test_support::{chart, game_setup, repository};

    // Column 1 of the fixture batting card: sum 2 HR, 7 K, 5 S_**, 6 BB
    const HOME_RUN: (u8, u8) = (1, 2);
    const STRIKEOUT: (u8, u8) = (1, 7);
    const WALK: (u8, u8) = (1, 6);

    fn game(rolls: Vec<(u8, u8)>) -> Game<ScriptedDice, SendPolicy> {
        let dice = ScriptedDice::new().with_mixed(rolls);
        Game::new(&repository(), chart(), &game_setup(), dice, SendPolicy::Never).unwrap()
    }

    #[test]
    fn test_strikeout_advances_lineup() {
        let mut game = game(vec![STRIKEOUT]);
        let pa = game.plate_appearance().unwrap();
        assert_eq!(pa.batter, "Away DH");
        assert_eq!(pa.outs, 1);
        assert_eq!(game.state().batter().name, "Away C");
        assert_eq!(game.plate_appearances(), 1);
    }

    #[test]
    fn test_three_outs_switch_sides() {
        let mut game = game(vec![STRIKEOUT; 3]);
        for _ in 0..3 {
            game.plate_appearance().unwrap();
        }
        let state = game.state();
        assert_eq!(state.batting(), TeamSide::Home);
        assert_eq!(state.outs(), 0);
        assert_eq!(state.batter().name, "Home DH");
        assert_eq!(game.scoreboard().line(TeamSide::Home).innings[0], Some(0));
    }

    #[test]
    fn test_home_run_reaches_every_tracker() {
        let mut game = game(vec![HOME_RUN]);
        let pa = game.plate_appearance().unwrap();
        assert_eq!(pa.score, [1, 0]);
        let line = game.box_score().team(TeamSide::Away).batter("Away DH").unwrap();
        assert_eq!((line.home_runs, line.rbi, line.runs), (1, 1, 1));
        assert_eq!(game.scoreboard().line(TeamSide::Away).innings[0], Some(1));
        let row = game.scorecard().row(TeamSide::Away, "Away DH").unwrap();
        assert_eq!(row.cell(1), ["HR"]);
    }

    #[test]
    fn test_wild_pitch_runs_reach_trackers() {
        // Column 3 sum 2 on the fixture card is WP_K
        let mut game = game(vec![(3, 2)]);
        game.state_mut()
            .set_runner(Base::Third, Some(crate::test_support::batter("Away C", 10)));
        let pa = game.plate_appearance().unwrap();
        assert_eq!(pa.results.len(), 2);
        assert_eq!(pa.score, [1, 0]);
        assert_eq!(game.scoreboard().line(TeamSide::Away).runs, 1);
        let pitcher = game.box_score().team(TeamSide::Home).pitcher("Home Ace").unwrap();
        assert_eq!((pitcher.runs, pitcher.earned_runs, pitcher.strikeouts), (1, 0, 1));
    }

    #[test]
    fn test_walk_off_ends_game_mid_inning() {
        let mut game = game(vec![HOME_RUN]);
        let state = game.state_mut();
        state.inning = 9;
        state.batting = TeamSide::Home;
        state.score = [3, 3];
        let pa = game.plate_appearance().unwrap();
        assert_eq!(pa.result, GameResult::HomeWin);
        assert_eq!(game.result(), GameResult::HomeWin);
        assert!(matches!(game.plate_appearance(), Err(Error::GameOver)));
    }

    #[test]
    fn test_home_leading_after_top_of_ninth_wins() {
        let mut game = game(vec![STRIKEOUT]);
        let state = game.state_mut();
        state.inning = 9;
        state.score = [1, 2];
        state.set_outs(2);
        game.plate_appearance().unwrap();
        assert_eq!(game.result(), GameResult::HomeWin);
    }

    #[test]
    fn test_tie_after_nine_goes_to_extras() {
        let mut game = game(vec![STRIKEOUT]);
        let state = game.state_mut();
        state.inning = 9;
        state.batting = TeamSide::Home;
        state.score = [2, 2];
        state.set_outs(2);
        game.plate_appearance().unwrap();
        assert_eq!(game.result(), GameResult::InProgress);
        assert_eq!(game.state().inning(), 10);
        assert_eq!(game.state().batting(), TeamSide::Away);
    }

    #[test]
    fn test_away_win_after_bottom_half() {
        let mut game = game(vec![STRIKEOUT]);
        let state = game.state_mut();
        state.inning = 11;
        state.batting = TeamSide::Home;
        state.score = [5, 4];
        state.set_outs(2);
        game.plate_appearance().unwrap();
        assert_eq!(game.result(), GameResult::AwayWin);
    }

    #[test]
    fn test_shorter_game_sizes_trackers() {
        let game = game(Vec::new()).with_regulation_innings(7);
        assert_eq!(game.scorecard().innings(), 7);
        let row = game.scorecard().row(TeamSide::Away, "Away DH").unwrap();
        assert_eq!(row.cells.len(), 7);
        assert_eq!(game.scoreboard().line(TeamSide::Away).innings.len(), 7);
        assert_eq!(game.scoreboard().line(TeamSide::Away).innings[0], Some(0));
        assert_eq!(game.scoreboard().line(TeamSide::Home).innings.len(), 7);
        assert!(!game.scoreboard().to_string().contains("  8"));
    }

    #[test]
    fn test_chart_passed_ball_scores_before_the_out() {
        let mut row = vec!["PB_PO_2"; 20];
        row[19] = "PO_2";
        let mut data = serde_json::Map::new();
        for n in 1..=9 {
            data.insert(n.to_string(), serde_json::json!({ "1": row }));
        }
        let chart = FieldingChart::from_json(&serde_json::Value::Object(data).to_string()).unwrap();

        let mut players = repository();
        let mut hitter = crate::test_support::batter_card("Away DH", 10);
        hitter.vs_right.columns.columns.get_mut(&2).unwrap()[0] =
            crate::cards::TableEntry::Fixed("X_2".parse().unwrap());
        players.insert_batter(hitter);

        let dice = ScriptedDice::new().with_mixed([(2, 2)]).with_d20([1]);
        let mut game = Game::new(&players, chart, &game_setup(), dice, SendPolicy::Never).unwrap();
        game.state_mut()
            .set_runner(Base::Third, Some(crate::test_support::batter("Away C", 10)));

        let pa = game.plate_appearance().unwrap();
        let kinds: Vec<PlayKind> = pa.results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, [PlayKind::PassedBall, PlayKind::Popout]);
        assert_eq!(pa.results[0].runs, ["Away C"]);
        assert_eq!(pa.fielding_roll, Some(1));
        assert_eq!((pa.outs, pa.score), (1, [1, 0]));
        let pitcher = game.box_score().team(TeamSide::Home).pitcher("Home Ace").unwrap();
        assert_eq!((pitcher.runs, pitcher.earned_runs), (1, 0));
    }

    #[test]
    fn test_shorter_regulation() {
        let mut game = game(vec![STRIKEOUT; 3]).with_regulation_innings(1);
        game.state_mut().score = [0, 1];
        assert_eq!(game.play_out(10).unwrap(), GameResult::HomeWin);
        assert_eq!(game.plate_appearances(), 3);
    }

    #[test]
    fn test_walk_reaches_every_tracker() {
        let mut game = game(vec![WALK]);
        game.plate_appearance().unwrap();
        assert_eq!(game.state().runners_on(), 1);
        let line = game.box_score().team(TeamSide::Away).batter("Away DH").unwrap();
        assert_eq!((line.walks, line.at_bats), (1, 0));
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut game = game(vec![WALK]);
        game.plate_appearance().unwrap();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.runners[0].as_deref(), Some("Away DH"));
        assert_eq!(snapshot.batter, "Away C");
        assert_eq!(snapshot.pitcher, "Home Ace");
        assert_eq!(snapshot.defense.len(), 9);
        assert_eq!(snapshot.defense[0].name, "Home Ace");
        assert!(serde_json::to_string(&snapshot).is_ok());
    }

    #[test]
    fn test_lineup_validation() {
        let mut setup = game_setup();
        setup.home.batting_order[8] = 1;
        let result = Game::new(&repository(), chart(), &setup, ScriptedDice::new(), SendPolicy::Never);
        assert!(matches!(
            result,
            Err(Error::InvalidLineup {
                team: TeamSide::Home,
                ..
            })
        ));

        let mut setup = game_setup();
        setup.away.batting_order[1] = 0;
        let result = Game::new(&repository(), chart(), &setup, ScriptedDice::new(), SendPolicy::Never);
        assert!(matches!(result, Err(Error::InvalidLineup { .. })));
    }

    #[test]
    fn test_unknown_player_and_wrong_role_fail_setup() {
        let mut setup = game_setup();
        setup.away.positions[4] = "Nobody".to_string();
        let result = Game::new(&repository(), chart(), &setup, ScriptedDice::new(), SendPolicy::Never);
        assert!(matches!(result, Err(Error::PlayerNotFound { .. })));

        let mut setup = game_setup();
        setup.home.positions[1] = "Home DH".to_string();
        let result = Game::new(&repository(), chart(), &setup, ScriptedDice::new(), SendPolicy::Never);
        assert!(matches!(result, Err(Error::WrongCardType { .. })));
    }

    #[test]
    fn test_play_by_play_line() {
        let mut game = game(vec![HOME_RUN]);
        let text = game.plate_appearance().unwrap().to_string();
        assert!(text.starts_with("Top  1"));
        assert!(text.contains("HR"));
        assert!(text.contains("scores: Away DH"));
        assert!(text.ends_with("[0 out, 1-0]"));
    }
}
