//! Play outcome resolver
//!
//! Turns the mixed roll into a [`Play`]: card lookup, tie-break d20,
//! fatigue and infield rewrites, conditional home runs and fielding chart
//! rolls. Nothing here mutates the game.

use serde::Serialize;

use super::dice::{Dice, MixedRoll};
use super::fielding::{FieldingChart, FieldingOutcome};
use super::state::{GameState, InfieldAlignment};
use crate::cards::{Advance, CardResult, Mishap, Play, Power, Role, TableEntry, Token};
use crate::error::{Error, Result};

/// First pitcher-card column
const PITCHER_COLUMN: u8 = 4;

/// Why the card's result was replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rewrite {
    TiredPitcher,
    InfieldIn,
    WeakPower,
}

/// Everything rolled and decided for one plate appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub roll: MixedRoll,
    /// Whose card the white die pointed at
    pub card: Role,
    /// Tie-break d20 for a split entry
    pub split_roll: Option<u8>,
    pub entry: CardResult,
    pub fielding: Option<FieldingOutcome>,
    pub rewrite: Option<Rewrite>,
    /// Applied before `play`
    pub mishap: Option<Mishap>,
    pub play: Play,
}

/// Resolve the current batter against the current pitcher
pub fn resolve_plate_appearance(
    state: &GameState,
    chart: &FieldingChart,
    dice: &mut dyn Dice,
) -> Result<Resolution> {
    let batter = state.batter();
    let pitcher = state.pitcher();
    let roll = dice.mixed();

    let (card, name, entry) = if roll.column < PITCHER_COLUMN {
        let side = batter.batting_vs(pitcher.throws);
        (Role::Batter, &batter.name, side.columns.entry(roll.column, roll.sum))
    } else {
        let side = pitcher.pitching_vs(batter.bats.against(pitcher.throws));
        (Role::Pitcher, &pitcher.name, side.entry(roll.column, roll.sum))
    };
    let entry = entry.ok_or_else(|| {
        Error::malformed(name, format!("no entry for column {} sum {}", roll.column, roll.sum))
    })?;

    let (result, split_roll) = match entry {
        TableEntry::Fixed(result) => (*result, None),
        TableEntry::Split { .. } => {
            let tie_break = dice.d20();
            (*entry.pick(tie_break), Some(tie_break))
        }
    };
    log::debug!(
        "{} vs {}: rolled {:?} on the {} card{}: {:?}",
        batter.name,
        pitcher.name,
        roll,
        card,
        split_roll.map(|r| format!(", tie-break {r}")).unwrap_or_default(),
        result.token
    );

    let mut resolution = Resolution {
        roll,
        card,
        split_roll,
        entry: result,
        fielding: None,
        rewrite: None,
        mishap: result.mishap,
        play: Play::Strikeout,
    };

    if result.fatigue && state.pitcher_tired() {
        resolution.mishap = None;
        resolution.rewrite = Some(Rewrite::TiredPitcher);
        resolution.play = Play::Single(Advance::Bases(2));
        return Ok(resolution);
    }

    resolution.play = match result.token {
        Token::Play(play) => play,
        Token::ConditionalHomeRun => {
            if batter.batting_vs(pitcher.throws).power == Power::Normal {
                Play::HomeRun
            } else {
                resolution.rewrite = Some(Rewrite::WeakPower);
                Play::Single(Advance::Bases(2))
            }
        }
        Token::FieldingChart(position) => {
            let defense = state.defense();
            let rating = defense.fielding(position).ok_or_else(|| Error::MissingFielding {
                name: defense.name_at(position).to_string(),
                position,
            })?;
            let outcome = chart.resolve(position, &rating, dice)?;
            resolution.fielding = Some(outcome);
            if outcome.mishap.is_some() {
                resolution.mishap = outcome.mishap;
            }
            outcome.play
        }
    };

    let fielding_roll = matches!(result.token, Token::FieldingChart(_));
    if result.infield_in && !fielding_roll && state.infield == InfieldAlignment::InfieldIn {
        resolution.rewrite = Some(Rewrite::InfieldIn);
        resolution.play = Play::Single(Advance::Bases(2));
    }

    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Bats, FlyBallType, GroundBallType, Position};
    use crate::sim::dice::ScriptedDice;
    use crate::test_support::{batter_card, chart, game_state_with, pitcher_card};

    fn resolve(state: &GameState, dice: &mut ScriptedDice) -> Resolution {
        resolve_plate_appearance(state, &chart(), dice).unwrap()
    }

    #[test]
    fn test_batter_column_lookup() {
        let state = game_state_with(batter_card("Hitter", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(1, 2)]);
        let resolution = resolve(&state, &mut dice);
        assert_eq!(resolution.card, Role::Batter);
        assert_eq!(resolution.play, Play::HomeRun);
        assert_eq!(dice.rolls_taken(), 1);
    }

    #[test]
    fn test_pitcher_column_uses_effective_batter_hand() {
        let state = game_state_with(batter_card("Righty", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(5, 7)]);
        assert_eq!(resolve(&state, &mut dice).play, Play::Walk);

        let mut switch = batter_card("Switch", 10);
        switch.bats = Bats::Switch;
        let state = game_state_with(switch, pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(5, 7)]);
        let resolution = resolve(&state, &mut dice);
        assert_eq!(resolution.card, Role::Pitcher);
        assert_eq!(resolution.play, Play::Strikeout);
    }

    #[test]
    fn test_split_entry_rolls_tie_break() {
        let state = game_state_with(batter_card("Hitter", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(3, 8), (3, 8)]).with_d20([10, 11]);
        let low = resolve(&state, &mut dice);
        assert_eq!(low.split_roll, Some(10));
        assert_eq!(low.play, Play::HomeRun);
        let high = resolve(&state, &mut dice);
        assert_eq!(high.play, Play::Strikeout);
    }

    #[test]
    fn test_fatigue_marker() {
        let mut state = game_state_with(batter_card("Hitter", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(3, 4)]);
        assert_eq!(resolve(&state, &mut dice).play, Play::Strikeout);

        state.set_tired("Thrower", true);
        let mut dice = ScriptedDice::new().with_mixed([(3, 4)]);
        let resolution = resolve(&state, &mut dice);
        assert_eq!(resolution.play, Play::Single(Advance::Bases(2)));
        assert_eq!(resolution.rewrite, Some(Rewrite::TiredPitcher));
    }

    #[test]
    fn test_conditional_home_run_depends_on_power() {
        let state = game_state_with(batter_card("Slugger", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(3, 6)]);
        assert_eq!(resolve(&state, &mut dice).play, Play::HomeRun);

        let mut weak = batter_card("Slap Hitter", 10);
        weak.vs_right.power = Power::Weak;
        let state = game_state_with(weak, pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(3, 6)]);
        let resolution = resolve(&state, &mut dice);
        assert_eq!(resolution.play, Play::Single(Advance::Bases(2)));
        assert_eq!(resolution.rewrite, Some(Rewrite::WeakPower));
    }

    #[test]
    fn test_infield_in_downgrade() {
        let mut state = game_state_with(batter_card("Hitter", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(3, 7)]);
        assert_eq!(
            resolve(&state, &mut dice).play,
            Play::GroundBall {
                position: Position::Shortstop,
                kind: GroundBallType::A,
            }
        );

        state.infield = InfieldAlignment::InfieldIn;
        let mut dice = ScriptedDice::new().with_mixed([(3, 7)]);
        let resolution = resolve(&state, &mut dice);
        assert_eq!(resolution.play, Play::Single(Advance::Bases(2)));
        assert_eq!(resolution.rewrite, Some(Rewrite::InfieldIn));
    }

    #[test]
    fn test_mishap_carried_with_play() {
        let state = game_state_with(batter_card("Hitter", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(3, 2)]);
        let resolution = resolve(&state, &mut dice);
        assert_eq!(resolution.mishap, Some(Mishap::WildPitch));
        assert_eq!(resolution.play, Play::Strikeout);
    }

    #[test]
    fn test_fielding_chart_roll() {
        let state = game_state_with(batter_card("Hitter", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(2, 2)]).with_d20([15]);
        let resolution = resolve(&state, &mut dice);
        assert_eq!(resolution.play, Play::Popout(Position::Shortstop));
        assert_eq!(resolution.fielding.map(|f| f.roll), Some(15));
    }

    #[test]
    fn test_fielding_chart_error_roll() {
        let state = game_state_with(batter_card("Hitter", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new()
            .with_mixed([(2, 2), (1, 12)])
            .with_d20([20]);
        let resolution = resolve(&state, &mut dice);
        assert_eq!(
            resolution.play,
            Play::Error {
                position: Position::Shortstop,
                bases: 2,
            }
        );
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_catcher_chart_passed_ball() {
        let mut row = vec!["PO_2"; 20];
        row[4] = "PB_PO_2";
        let chart = FieldingChart::from_json(&serde_json::json!({ "2": { "1": row } }).to_string()).unwrap();

        let mut hitter = batter_card("Hitter", 10);
        hitter.vs_right.columns.columns.get_mut(&2).unwrap()[0] = TableEntry::Fixed("X_2".parse().unwrap());
        let state = game_state_with(hitter, pitcher_card("Thrower", None));

        let mut dice = ScriptedDice::new().with_mixed([(2, 2)]).with_d20([5]);
        let resolution = resolve_plate_appearance(&state, &chart, &mut dice).unwrap();
        assert_eq!(resolution.mishap, Some(Mishap::PassedBall));
        assert_eq!(resolution.play, Play::Popout(Position::Catcher));

        let mut dice = ScriptedDice::new().with_mixed([(2, 2)]).with_d20([6]);
        let resolution = resolve_plate_appearance(&state, &chart, &mut dice).unwrap();
        assert_eq!(resolution.mishap, None);
        assert_eq!(resolution.play, Play::Popout(Position::Catcher));
    }

    #[test]
    fn test_fly_ball_grades_pass_through() {
        let state = game_state_with(batter_card("Hitter", 10), pitcher_card("Thrower", None));
        let mut dice = ScriptedDice::new().with_mixed([(3, 5)]);
        assert_eq!(
            resolve(&state, &mut dice).play,
            Play::FlyBall {
                position: Position::CenterField,
                kind: FlyBallType::BQuestionable,
            }
        );
    }
}
