//! Runner advancement
//!
//! Optional extra-base attempts. Whether to send the runner is asked of a
//! [`DecisionProvider`]; only a runner who is sent consumes a d20.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::dice::Dice;
use super::state::Base;
use crate::consts::D20_FACES;

/// Outcome of an advancement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advancement {
    Out,
    Held,
    Safe,
}

/// Everything a manager knows when deciding to send a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendContext<'a> {
    pub runner: &'a str,
    pub from: Base,
    pub to: Base,
    /// Safe on a d20 at or under this, already clamped to 1..=20
    pub chance: u8,
    pub outs: u8,
    pub inning: u32,
    /// Batting team's score minus fielding team's score
    pub run_differential: i64,
}

/// Answers "send the runner?" at every optional advancement
pub trait DecisionProvider {
    fn send_runner(&mut self, context: &SendContext<'_>) -> bool;
}

impl<F> DecisionProvider for F
where
    F: FnMut(&SendContext<'_>) -> bool,
{
    fn send_runner(&mut self, context: &SendContext<'_>) -> bool {
        self(context)
    }
}

/// Headless send policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPolicy {
    Always,
    Never,
    /// Send when the chance is at least `min_chance`, or within two of it
    /// with two outs
    Chance { min_chance: u8 },
}

impl Default for SendPolicy {
    fn default() -> Self {
        SendPolicy::Chance { min_chance: 12 }
    }
}

impl DecisionProvider for SendPolicy {
    fn send_runner(&mut self, context: &SendContext<'_>) -> bool {
        match *self {
            SendPolicy::Always => true,
            SendPolicy::Never => false,
            SendPolicy::Chance { min_chance } => {
                let needed = if context.outs == 2 {
                    min_chance.saturating_sub(2)
                } else {
                    min_chance
                };
                context.chance >= needed
            }
        }
    }
}

/// Replays fixed answers, then declines
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisions {
    answers: VecDeque<bool>,
    asked: usize,
}

impl ScriptedDecisions {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: 0,
        }
    }

    /// How many times a decision was requested
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn send_runner(&mut self, _context: &SendContext<'_>) -> bool {
        self.asked += 1;
        self.answers.pop_front().unwrap_or(false)
    }
}

/// Clamp a raw advancement chance into the d20 range
pub fn clamp_chance(raw: i32) -> u8 {
    raw.clamp(1, i32::from(D20_FACES)) as u8
}

/// Resolves advancement attempts with borrowed dice and decisions
pub struct RunnerAdvancement<'a> {
    dice: &'a mut dyn Dice,
    decisions: &'a mut dyn DecisionProvider,
}

impl<'a> RunnerAdvancement<'a> {
    pub fn new(dice: &'a mut dyn Dice, decisions: &'a mut dyn DecisionProvider) -> Self {
        Self { dice, decisions }
    }

    /// Standard attempt: held if not sent, out on a roll above the chance
    pub fn attempt(&mut self, context: &SendContext<'_>) -> Advancement {
        if !self.decisions.send_runner(context) {
            log::debug!("{} holds at {:?}", context.runner, context.from);
            return Advancement::Held;
        }
        let roll = self.dice.d20();
        let result = if roll > context.chance {
            Advancement::Out
        } else {
            Advancement::Safe
        };
        log::debug!(
            "{} sent to {:?} (chance {}), rolled {}: {:?}",
            context.runner,
            context.to,
            context.chance,
            roll,
            result
        );
        result
    }

    /// Tag-up on a deep fly: safe at or under the chance, out only on a 20,
    /// otherwise the runner gets back
    pub fn attempt_deep_fly(&mut self, context: &SendContext<'_>) -> Advancement {
        if !self.decisions.send_runner(context) {
            return Advancement::Held;
        }
        let roll = self.dice.d20();
        let result = if roll <= context.chance {
            Advancement::Safe
        } else if roll == D20_FACES {
            Advancement::Out
        } else {
            Advancement::Held
        };
        log::debug!(
            "{} tags for {:?} (chance {}), rolled {}: {:?}",
            context.runner,
            context.to,
            context.chance,
            roll,
            result
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::dice::ScriptedDice;

    fn context(chance: u8, outs: u8) -> SendContext<'static> {
        SendContext {
            runner: "Runner",
            from: Base::Second,
            to: Base::Home,
            chance,
            outs,
            inning: 3,
            run_differential: 0,
        }
    }

    #[test]
    fn test_held_runner_consumes_no_dice() {
        let mut dice = ScriptedDice::new();
        let mut decisions = SendPolicy::Never;
        let mut advancement = RunnerAdvancement::new(&mut dice, &mut decisions);
        assert_eq!(advancement.attempt(&context(15, 0)), Advancement::Held);
        assert_eq!(dice.rolls_taken(), 0);
    }

    #[test]
    fn test_attempt_threshold() {
        let mut dice = ScriptedDice::new().with_d20([12, 13]);
        let mut decisions = SendPolicy::Always;
        let mut advancement = RunnerAdvancement::new(&mut dice, &mut decisions);
        assert_eq!(advancement.attempt(&context(12, 0)), Advancement::Safe);
        assert_eq!(advancement.attempt(&context(12, 0)), Advancement::Out);
    }

    #[test]
    fn test_deep_fly_only_out_on_twenty() {
        let mut dice = ScriptedDice::new().with_d20([5, 19, 20]);
        let mut decisions = SendPolicy::Always;
        let mut advancement = RunnerAdvancement::new(&mut dice, &mut decisions);
        assert_eq!(advancement.attempt_deep_fly(&context(6, 1)), Advancement::Safe);
        assert_eq!(advancement.attempt_deep_fly(&context(6, 1)), Advancement::Held);
        assert_eq!(advancement.attempt_deep_fly(&context(6, 1)), Advancement::Out);
    }

    #[test]
    fn test_chance_policy_is_bolder_with_two_outs() {
        let mut policy = SendPolicy::Chance { min_chance: 12 };
        assert!(!policy.send_runner(&context(10, 1)));
        assert!(policy.send_runner(&context(10, 2)));
        assert!(policy.send_runner(&context(12, 0)));
    }

    #[test]
    fn test_scripted_decisions_decline_when_exhausted() {
        let mut decisions = ScriptedDecisions::new([true]);
        assert!(decisions.send_runner(&context(10, 0)));
        assert!(!decisions.send_runner(&context(10, 0)));
        assert_eq!(decisions.asked(), 2);
    }

    #[test]
    fn test_closure_as_decision_provider() {
        let mut seen = Vec::new();
        let mut decide = |ctx: &SendContext<'_>| {
            seen.push(ctx.chance);
            ctx.chance > 10
        };
        assert!(decide.send_runner(&context(11, 0)));
        assert!(!decide.send_runner(&context(3, 0)));
        assert_eq!(seen, vec![11, 3]);
    }

    #[test]
    fn test_clamp_chance() {
        assert_eq!(clamp_chance(-4), 1);
        assert_eq!(clamp_chance(0), 1);
        assert_eq!(clamp_chance(14), 14);
        assert_eq!(clamp_chance(27), 20);
    }
}
