//! Game state
//!
//! The canonical mutable state of one game. The current batter and pitcher
//! are never stored; they are read off the lineup cursor and the fielding
//! roster every time they are asked for.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::{BatterCard, FieldingRating, PitcherCard, Position};
use crate::consts::{LINEUP_SIZE, OUTS_PER_INNING};

/// Away bats first, home bats second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Away,
    Home,
}

impl TeamSide {
    pub fn index(self) -> usize {
        match self {
            TeamSide::Away => 0,
            TeamSide::Home => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            TeamSide::Away => TeamSide::Home,
            TeamSide::Home => TeamSide::Away,
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSide::Away => f.write_str("away"),
            TeamSide::Home => f.write_str("home"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base {
    First,
    Second,
    Third,
    Home,
}

impl Base {
    /// The three bases a runner can stand on
    pub const OCCUPIABLE: [Base; 3] = [Base::First, Base::Second, Base::Third];

    pub fn index(self) -> usize {
        match self {
            Base::First => 0,
            Base::Second => 1,
            Base::Third => 2,
            Base::Home => 3,
        }
    }
}

/// Infield depth chosen by the fielding team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfieldAlignment {
    #[default]
    Normal,
    CornersIn,
    InfieldIn,
}

/// The nine defenders of one team plus its designated hitter
#[derive(Debug, Clone)]
pub struct Roster {
    pub name: String,
    pub pitcher: Arc<PitcherCard>,
    /// Designated hitter, then catcher through right field
    players: [Arc<BatterCard>; 9],
}

impl Roster {
    /// `players` runs designated hitter, catcher, first base ... right field
    pub fn new(name: impl Into<String>, pitcher: Arc<PitcherCard>, players: [Arc<BatterCard>; 9]) -> Self {
        Self {
            name: name.into(),
            pitcher,
            players,
        }
    }

    fn slot(position: Position) -> Option<usize> {
        match position {
            Position::DesignatedHitter => Some(0),
            Position::Pitcher => None,
            other => Some(usize::from(other.number()) - 1),
        }
    }

    /// Batter card at a position (none for the pitcher)
    pub fn batter_at(&self, position: Position) -> Option<&Arc<BatterCard>> {
        Self::slot(position).map(|i| &self.players[i])
    }

    /// Name of whoever plays a position
    pub fn name_at(&self, position: Position) -> &str {
        match self.batter_at(position) {
            Some(card) => &card.name,
            None => &self.pitcher.name,
        }
    }

    /// Fielding line of the defender at a position
    pub fn fielding(&self, position: Position) -> Option<FieldingRating> {
        match position {
            Position::Pitcher => Some(self.pitcher.fielding),
            Position::DesignatedHitter => None,
            other => self.batter_at(other)?.fielding_at(other).copied(),
        }
    }

    /// Arm modifier of the defender at a position
    pub fn arm(&self, position: Position) -> i32 {
        self.fielding(position).map_or(0, |f| f.arm)
    }
}

/// One spot in the batting order
#[derive(Debug, Clone)]
pub struct LineupSlot {
    pub position: Position,
    pub card: Arc<BatterCard>,
}

/// Batting order with its cursor
#[derive(Debug, Clone)]
pub struct Lineup {
    slots: [LineupSlot; LINEUP_SIZE],
    cursor: usize,
}

impl Lineup {
    pub fn new(slots: [LineupSlot; LINEUP_SIZE]) -> Self {
        Self { slots, cursor: 0 }
    }

    pub fn current(&self) -> &LineupSlot {
        &self.slots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn slots(&self) -> &[LineupSlot] {
        &self.slots
    }

    fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % LINEUP_SIZE;
    }
}

/// Per-game pitcher record, kept apart from the immutable card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitcherStatus {
    pub outs_recorded: u32,
    pub runs_allowed: u32,
    pub earned_runs: u32,
    pub tired: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) batting: TeamSide,
    /// First, second, third
    pub(crate) bases: [Option<Arc<BatterCard>>; 3],
    pub(crate) score: [u32; 2],
    pub(crate) outs: u8,
    pub(crate) inning: u32,
    pub(crate) rosters: [Roster; 2],
    pub(crate) lineups: [Lineup; 2],
    /// Alignment of the fielding team's infield
    pub infield: InfieldAlignment,
    pitchers: HashMap<String, PitcherStatus>,
}

impl GameState {
    /// Fresh game: top of the first, bases empty, nobody out
    pub fn new(away: (Roster, Lineup), home: (Roster, Lineup)) -> Self {
        let (away_roster, away_lineup) = away;
        let (home_roster, home_lineup) = home;
        let pitchers = [&away_roster, &home_roster]
            .iter()
            .map(|r| (r.pitcher.name.clone(), PitcherStatus::default()))
            .collect();
        Self {
            batting: TeamSide::Away,
            bases: [None, None, None],
            score: [0, 0],
            outs: 0,
            inning: 1,
            rosters: [away_roster, home_roster],
            lineups: [away_lineup, home_lineup],
            infield: InfieldAlignment::Normal,
            pitchers,
        }
    }

    pub fn batting(&self) -> TeamSide {
        self.batting
    }

    pub fn fielding(&self) -> TeamSide {
        self.batting.other()
    }

    pub fn inning(&self) -> u32 {
        self.inning
    }

    pub fn outs(&self) -> u8 {
        self.outs
    }

    pub fn score(&self, side: TeamSide) -> u32 {
        self.score[side.index()]
    }

    pub fn scores(&self) -> [u32; 2] {
        self.score
    }

    pub fn runner(&self, base: Base) -> Option<&Arc<BatterCard>> {
        self.bases.get(base.index())?.as_ref()
    }

    pub fn runners_on(&self) -> usize {
        self.bases.iter().flatten().count()
    }

    pub fn roster(&self, side: TeamSide) -> &Roster {
        &self.rosters[side.index()]
    }

    pub fn lineup(&self, side: TeamSide) -> &Lineup {
        &self.lineups[side.index()]
    }

    /// Roster currently in the field
    pub fn defense(&self) -> &Roster {
        self.roster(self.fielding())
    }

    pub fn batter(&self) -> &Arc<BatterCard> {
        &self.lineup(self.batting).current().card
    }

    pub fn pitcher(&self) -> &Arc<PitcherCard> {
        &self.defense().pitcher
    }

    pub fn pitcher_status(&self, name: &str) -> Option<&PitcherStatus> {
        self.pitchers.get(name)
    }

    pub fn pitcher_tired(&self) -> bool {
        self.pitchers
            .get(&self.pitcher().name)
            .is_some_and(|s| s.tired)
    }

    /// Mark a pitcher tired (or rested) regardless of endurance
    pub fn set_tired(&mut self, name: &str, tired: bool) {
        self.pitchers.entry(name.to_string()).or_default().tired = tired;
    }

    /// Put a runner on (or clear) a base, for setting up a situation
    pub fn set_runner(&mut self, base: Base, runner: Option<Arc<BatterCard>>) {
        if let Some(slot) = self.bases.get_mut(base.index()) {
            *slot = runner;
        }
    }

    /// Set the out count for a situation, clamped to a live half inning
    pub fn set_outs(&mut self, outs: u8) {
        self.outs = outs.min(OUTS_PER_INNING - 1);
    }

    /// Charge a play's outs and runs to the pitcher of record
    pub(crate) fn charge_pitcher(&mut self, pitcher: &PitcherCard, outs: u8, runs: usize, earned: bool) {
        let status = self.pitchers.entry(pitcher.name.clone()).or_default();
        status.outs_recorded += u32::from(outs);
        status.runs_allowed += runs as u32;
        if earned {
            status.earned_runs += runs as u32;
        }
        if let Some(innings) = pitcher.endurance.starter {
            if !status.tired && status.outs_recorded >= innings * u32::from(OUTS_PER_INNING) {
                status.tired = true;
                log::info!("{} is tiring after {} innings", pitcher.name, innings);
            }
        }
    }

    /// Move the batting team's lineup to the next hitter
    pub(crate) fn advance_lineup(&mut self) {
        self.lineups[self.batting.index()].advance();
    }

    /// Three outs: clear the bases and switch sides
    pub(crate) fn end_half_inning(&mut self) {
        self.outs = 0;
        self.bases = [None, None, None];
        if self.batting == TeamSide::Home {
            self.inning += 1;
        }
        self.batting = self.batting.other();
        log::info!(
            "{} {} begins ({}-{})",
            if self.batting == TeamSide::Away { "Top" } else { "Bottom" },
            self.inning,
            self.score[0],
            self.score[1]
        );
    }

    pub(crate) fn add_runs(&mut self, runs: usize) {
        self.score[self.batting.index()] += runs as u32;
    }
}
