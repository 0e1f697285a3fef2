//! Per-play state transitions
//!
//! One operation per [`PlayKind`]. Each mutates runners, score and outs and
//! returns a [`PlayResult`], the only thing the trackers ever see.

use std::sync::Arc;

use serde::Serialize;

use super::running::{Advancement, RunnerAdvancement, SendContext, clamp_chance};
use super::state::{Base, GameState};
use crate::cards::{Advance, BatterCard, FlyBallType, GroundBallType, Play, PlayKind, Position};
use crate::consts::OUTS_PER_INNING;

/// How a groundball out was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroundBallOutcome {
    Out,
    DoublePlay,
    FieldersChoice,
}

/// Extra detail the box score needs for some plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BoxScoreNote {
    #[default]
    None,
    /// A runner was thrown out trying for an extra base on the hit
    Hit { runner_out: bool },
    FlyBall { sacrifice: bool, extra_out: bool },
    GroundBall(GroundBallOutcome),
    LineoutMax { outs: u8 },
}

/// Extra detail the scorecard needs for some plays
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum ScorecardNote {
    #[default]
    None,
    Fielder(Position),
    FlyBall {
        position: Position,
        sacrifice: bool,
        /// Base a tagging runner was thrown out at
        thrown_out: Option<Base>,
    },
    GroundBall {
        position: Position,
        outcome: GroundBallOutcome,
    },
    LineoutMax {
        position: Position,
        cleared: Vec<Base>,
    },
    Error {
        position: Position,
        bases: u8,
    },
}

/// Normalized result of one play
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayResult {
    pub kind: PlayKind,
    /// Players who crossed the plate, trailing runner first
    pub runs: Vec<String>,
    /// Runs count as runs batted in
    pub rbi: bool,
    /// Runs are charged to the pitcher as earned
    pub earned: bool,
    pub outs_recorded: u8,
    pub box_score: BoxScoreNote,
    pub scorecard: ScorecardNote,
}

impl PlayResult {
    fn new(kind: PlayKind, runs: Vec<String>, outs_recorded: u8) -> Self {
        Self {
            kind,
            runs,
            rbi: true,
            earned: true,
            outs_recorded,
            box_score: BoxScoreNote::None,
            scorecard: ScorecardNote::None,
        }
    }

    fn without_rbi(mut self) -> Self {
        self.rbi = false;
        self
    }

    fn unearned(mut self) -> Self {
        self.earned = false;
        self.rbi = false;
        self
    }

    fn box_score(mut self, note: BoxScoreNote) -> Self {
        self.box_score = note;
        self
    }

    fn scorecard(mut self, note: ScorecardNote) -> Self {
        self.scorecard = note;
        self
    }
}

impl GameState {
    /// Apply any play
    pub fn apply(&mut self, play: Play, running: &mut RunnerAdvancement<'_>) -> PlayResult {
        match play {
            Play::Strikeout => self.strikeout(),
            Play::Walk => self.walk(),
            Play::HitByPitch => self.hit_by_pitch(),
            Play::HomeRun => self.home_run(),
            Play::Single(advance) => self.single(advance, running),
            Play::Double(advance) => self.double(advance, running),
            Play::Triple => self.triple(),
            Play::FlyBall { position, kind } => self.fly_ball(position, kind, running),
            Play::GroundBall { position, kind } => self.ground_ball(position, kind),
            Play::LineoutMax(position) => self.lineout_max(position),
            Play::Lineout(position) => self.lineout(position),
            Play::Popout(position) => self.popout(position),
            Play::Foulout(position) => self.foulout(position),
            Play::Error { position, bases } => self.error(position, bases),
            Play::WildPitch => self.wild_pitch(),
            Play::PassedBall => self.passed_ball(),
        }
    }

    pub fn strikeout(&mut self) -> PlayResult {
        self.outs += 1;
        PlayResult::new(PlayKind::Strikeout, Vec::new(), 1)
    }

    pub fn walk(&mut self) -> PlayResult {
        let runs = self.force_batter_to_first();
        PlayResult::new(PlayKind::Walk, runs, 0)
    }

    pub fn hit_by_pitch(&mut self) -> PlayResult {
        let runs = self.force_batter_to_first();
        PlayResult::new(PlayKind::HitByPitch, runs, 0)
    }

    pub fn home_run(&mut self) -> PlayResult {
        let batter = Arc::clone(self.batter());
        let mut runs = vec![batter.name.clone()];
        runs.extend(self.move_runners(3, None));
        self.add_runs(1);
        PlayResult::new(PlayKind::HomeRun, runs, 0)
    }

    pub fn single(&mut self, advance: Advance, running: &mut RunnerAdvancement<'_>) -> PlayResult {
        let start = self.outs;
        let (bases, runner_out) = match advance {
            Advance::Bases(n) => (n, false),
            Advance::Fielder(fielder) => {
                let attempt = if self.runner(Base::Second).is_some() {
                    self.extra_base(Base::Second, Base::Home, fielder, 0, running)
                } else if self.runner(Base::First).is_some() {
                    let bonus = 2 * (i32::from(fielder.number()) - 8);
                    self.extra_base(Base::First, Base::Third, fielder, bonus, running)
                } else {
                    Advancement::Held
                };
                match attempt {
                    Advancement::Held => (1, false),
                    Advancement::Safe => (2, false),
                    Advancement::Out => (2, true),
                }
            }
        };
        let runs = if self.outs >= OUTS_PER_INNING {
            Vec::new()
        } else {
            let batter = Arc::clone(self.batter());
            self.move_runners(bases, Some((batter, Base::First)))
        };
        PlayResult::new(PlayKind::Single, runs, self.outs - start)
            .box_score(BoxScoreNote::Hit { runner_out })
    }

    pub fn double(&mut self, advance: Advance, running: &mut RunnerAdvancement<'_>) -> PlayResult {
        let start = self.outs;
        let (bases, runner_out) = match advance {
            Advance::Bases(n) => (n, false),
            Advance::Fielder(fielder) if self.runner(Base::First).is_some() => {
                match self.extra_base(Base::First, Base::Home, fielder, 0, running) {
                    Advancement::Held => (2, false),
                    Advancement::Safe => (3, false),
                    Advancement::Out => (2, true),
                }
            }
            Advance::Fielder(_) => (2, false),
        };
        let runs = if self.outs >= OUTS_PER_INNING {
            Vec::new()
        } else {
            let batter = Arc::clone(self.batter());
            self.move_runners(bases, Some((batter, Base::Second)))
        };
        PlayResult::new(PlayKind::Double, runs, self.outs - start)
            .box_score(BoxScoreNote::Hit { runner_out })
    }

    pub fn triple(&mut self) -> PlayResult {
        let batter = Arc::clone(self.batter());
        let runs = self.move_runners(3, Some((batter, Base::Third)));
        PlayResult::new(PlayKind::Triple, runs, 0).box_score(BoxScoreNote::Hit { runner_out: false })
    }

    pub fn fly_ball(
        &mut self,
        position: Position,
        kind: FlyBallType,
        running: &mut RunnerAdvancement<'_>,
    ) -> PlayResult {
        let start = self.outs;
        self.outs += 1;
        let mut runs = Vec::new();
        let mut thrown_out = None;

        if self.outs < OUTS_PER_INNING {
            match kind {
                FlyBallType::A | FlyBallType::C => runs = self.move_runners(1, None),
                FlyBallType::B => {
                    if let Some(runner) = self.bases[Base::Third.index()].take() {
                        self.add_runs(1);
                        runs.push(runner.name.clone());
                    }
                    if position == Position::RightField {
                        if let Some(runner) = self.runner(Base::Second).cloned() {
                            let context = self.send_context(&runner, Base::Second, Base::Third, position, 2);
                            match running.attempt_deep_fly(&context) {
                                Advancement::Safe => {
                                    self.bases[Base::Third.index()] = self.bases[Base::Second.index()].take();
                                }
                                Advancement::Out => {
                                    self.bases[Base::Second.index()] = None;
                                    self.outs += 1;
                                    thrown_out = Some(Base::Third);
                                }
                                Advancement::Held => {}
                            }
                        }
                    }
                }
                FlyBallType::BQuestionable => {
                    if let Some(runner) = self.runner(Base::Third).cloned() {
                        let context = self.send_context(&runner, Base::Third, Base::Home, position, 2);
                        match running.attempt(&context) {
                            Advancement::Safe => {
                                self.bases[Base::Third.index()] = None;
                                self.add_runs(1);
                                runs.push(runner.name.clone());
                            }
                            Advancement::Out => {
                                self.bases[Base::Third.index()] = None;
                                self.outs += 1;
                                thrown_out = Some(Base::Home);
                            }
                            Advancement::Held => {}
                        }
                    }
                }
            }
        }

        let sacrifice = !runs.is_empty() && kind != FlyBallType::C;
        PlayResult::new(PlayKind::FlyBall, runs, self.outs - start)
            .box_score(BoxScoreNote::FlyBall {
                sacrifice,
                extra_out: thrown_out.is_some(),
            })
            .scorecard(ScorecardNote::FlyBall {
                position,
                sacrifice,
                thrown_out,
            })
    }

    pub fn ground_ball(&mut self, position: Position, kind: GroundBallType) -> PlayResult {
        let start = self.outs;
        self.outs += 1;
        let mut runs = Vec::new();
        let mut outcome = GroundBallOutcome::Out;
        let mut rbi = true;

        if self.outs < OUTS_PER_INNING {
            let runner_on_first = self.runner(Base::First).is_some();
            match kind {
                GroundBallType::A => {
                    rbi = false;
                    if runner_on_first {
                        outcome = GroundBallOutcome::DoublePlay;
                        self.outs += 1;
                        if self.outs < OUTS_PER_INNING {
                            self.bases[Base::First.index()] = None;
                            runs = self.move_runners(1, None);
                        }
                    }
                }
                GroundBallType::B => {
                    if runner_on_first {
                        outcome = GroundBallOutcome::FieldersChoice;
                        self.bases[Base::First.index()] = None;
                        let batter = Arc::clone(self.batter());
                        runs = self.move_runners(1, Some((batter, Base::First)));
                    }
                }
                GroundBallType::C => runs = self.move_runners(1, None),
            }
        }

        let result = PlayResult::new(PlayKind::GroundBall, runs, self.outs - start)
            .box_score(BoxScoreNote::GroundBall(outcome))
            .scorecard(ScorecardNote::GroundBall { position, outcome });
        if rbi { result } else { result.without_rbi() }
    }

    /// Catch, then double off runners from third, second, first until the
    /// side is retired
    pub fn lineout_max(&mut self, position: Position) -> PlayResult {
        let start = self.outs;
        self.outs += 1;
        let mut cleared = Vec::new();
        for base in [Base::Third, Base::Second, Base::First] {
            if self.outs >= OUTS_PER_INNING {
                break;
            }
            if self.bases[base.index()].take().is_some() {
                self.outs += 1;
                cleared.push(base);
            }
        }
        let outs = self.outs - start;
        PlayResult::new(PlayKind::LineoutMax, Vec::new(), outs)
            .box_score(BoxScoreNote::LineoutMax { outs })
            .scorecard(ScorecardNote::LineoutMax { position, cleared })
    }

    pub fn lineout(&mut self, position: Position) -> PlayResult {
        self.outs += 1;
        PlayResult::new(PlayKind::Lineout, Vec::new(), 1).scorecard(ScorecardNote::Fielder(position))
    }

    pub fn popout(&mut self, position: Position) -> PlayResult {
        self.outs += 1;
        PlayResult::new(PlayKind::Popout, Vec::new(), 1).scorecard(ScorecardNote::Fielder(position))
    }

    pub fn foulout(&mut self, position: Position) -> PlayResult {
        self.outs += 1;
        PlayResult::new(PlayKind::Foulout, Vec::new(), 1).scorecard(ScorecardNote::Fielder(position))
    }

    /// Batter reaches on an error, runners move as on the equivalent hit
    pub fn error(&mut self, position: Position, bases: u8) -> PlayResult {
        let batter = Arc::clone(self.batter());
        let runs = match bases {
            3 => self.move_runners(3, Some((batter, Base::Third))),
            2 => self.move_runners(2, Some((batter, Base::Second))),
            _ => self.move_runners(1, Some((batter, Base::First))),
        };
        PlayResult::new(PlayKind::Error, runs, 0)
            .unearned()
            .scorecard(ScorecardNote::Error { position, bases })
    }

    pub fn wild_pitch(&mut self) -> PlayResult {
        let runs = self.move_runners(1, None);
        PlayResult::new(PlayKind::WildPitch, runs, 0).unearned()
    }

    pub fn passed_ball(&mut self) -> PlayResult {
        let runs = self.move_runners(1, None);
        PlayResult::new(PlayKind::PassedBall, runs, 0).unearned()
    }

    /// Move every runner up `bases`, score whoever passes home, then place
    /// the batter. Returns who scored, trailing runner first.
    fn move_runners(&mut self, bases: u8, batter: Option<(Arc<BatterCard>, Base)>) -> Vec<String> {
        let mut scored = Vec::new();
        for from in (0..3).rev() {
            if let Some(runner) = self.bases[from].take() {
                let to = from + usize::from(bases);
                if to >= 3 {
                    scored.push(runner.name.clone());
                } else {
                    self.bases[to] = Some(runner);
                }
            }
        }
        if let Some((card, base)) = batter {
            self.bases[base.index()] = Some(card);
        }
        scored.reverse();
        self.add_runs(scored.len());
        scored
    }

    /// Walk or hit batsman: runners move only when forced
    fn force_batter_to_first(&mut self) -> Vec<String> {
        let mut runs = Vec::new();
        if self.bases[0].is_some() {
            if self.bases[1].is_some() {
                if let Some(runner) = self.bases[2].take() {
                    runs.push(runner.name.clone());
                }
                self.bases[2] = self.bases[1].take();
            }
            self.bases[1] = self.bases[0].take();
        }
        self.bases[0] = Some(Arc::clone(self.batter()));
        self.add_runs(runs.len());
        runs
    }

    fn send_context<'r>(
        &self,
        runner: &'r BatterCard,
        from: Base,
        to: Base,
        fielder: Position,
        bonus: i32,
    ) -> SendContext<'r> {
        let chance = clamp_chance(runner.speed + self.defense().arm(fielder) + bonus);
        SendContext {
            runner: &runner.name,
            from,
            to,
            chance,
            outs: self.outs,
            inning: self.inning,
            run_differential: i64::from(self.score(self.batting())) - i64::from(self.score(self.fielding())),
        }
    }

    /// Lead runner tries for an extra base on a hit to `fielder`; an out
    /// removes him and is charged immediately
    fn extra_base(
        &mut self,
        from: Base,
        to: Base,
        fielder: Position,
        bonus: i32,
        running: &mut RunnerAdvancement<'_>,
    ) -> Advancement {
        let Some(runner) = self.runner(from).cloned() else {
            return Advancement::Held;
        };
        let two_outs = if self.outs == 2 { 2 } else { 0 };
        let context = self.send_context(&runner, from, to, fielder, bonus + two_outs);
        let result = running.attempt(&context);
        if result == Advancement::Out {
            self.bases[from.index()] = None;
            self.outs += 1;
        }
        result
    }
}
