//! Dice
//!
//! Every random number in a game comes through [`Dice`], so a seeded
//! implementation replays a game exactly and a scripted one drives tests.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// The white die plus the sum of the two red dice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedRoll {
    /// Single d6, selects the card column (1-3 batter, 4-6 pitcher)
    pub column: u8,
    /// Sum of two d6, 2..=12
    pub sum: u8,
}

impl MixedRoll {
    pub fn new(column: u8, sum: u8) -> Self {
        Self { column, sum }
    }
}

pub trait Dice {
    /// Uniform 1..=20
    fn d20(&mut self) -> u8;
    /// One d6 and the sum of two more
    fn mixed(&mut self) -> MixedRoll;
}

/// PCG-backed dice, reproducible from the seed
#[derive(Debug, Clone)]
pub struct SeededDice {
    seed: u64,
    rng: Pcg32,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn d6(&mut self) -> u8 {
        self.rng.random_range(1..=6)
    }
}

impl Dice for SeededDice {
    fn d20(&mut self) -> u8 {
        self.rng.random_range(1..=20)
    }

    fn mixed(&mut self) -> MixedRoll {
        let column = self.d6();
        let sum = self.d6() + self.d6();
        MixedRoll { column, sum }
    }
}

/// Replays fixed rolls in order
///
/// # Panics
///
/// Rolling past the end of a script panics, so a test that consumes more
/// dice than it expects fails loudly.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    d20: VecDeque<u8>,
    mixed: VecDeque<MixedRoll>,
    d20_rolled: usize,
    mixed_rolled: usize,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_d20(mut self, rolls: impl IntoIterator<Item = u8>) -> Self {
        self.d20.extend(rolls);
        self
    }

    pub fn with_mixed(mut self, rolls: impl IntoIterator<Item = (u8, u8)>) -> Self {
        self.mixed
            .extend(rolls.into_iter().map(|(column, sum)| MixedRoll { column, sum }));
        self
    }

    /// Total rolls taken so far (d20 and mixed)
    pub fn rolls_taken(&self) -> usize {
        self.d20_rolled + self.mixed_rolled
    }

    pub fn d20_taken(&self) -> usize {
        self.d20_rolled
    }

    pub fn mixed_taken(&self) -> usize {
        self.mixed_rolled
    }

    /// Scripted rolls not yet used
    pub fn remaining(&self) -> usize {
        self.d20.len() + self.mixed.len()
    }
}

impl Dice for ScriptedDice {
    fn d20(&mut self) -> u8 {
        self.d20_rolled += 1;
        self.d20
            .pop_front()
            .unwrap_or_else(|| panic!("scripted dice ran out of d20 rolls after {}", self.d20_rolled - 1))
    }

    fn mixed(&mut self) -> MixedRoll {
        self.mixed_rolled += 1;
        self.mixed
            .pop_front()
            .unwrap_or_else(|| panic!("scripted dice ran out of mixed rolls after {}", self.mixed_rolled - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_in_range() {
        let mut dice = SeededDice::new(42);
        for _ in 0..1000 {
            let d20 = dice.d20();
            assert!((1..=20).contains(&d20));
            let roll = dice.mixed();
            assert!((1..=6).contains(&roll.column));
            assert!((2..=12).contains(&roll.sum));
        }
    }

    #[test]
    fn test_seeded_dice_determinism() {
        let mut a = SeededDice::new(7);
        let mut b = SeededDice::new(7);
        for _ in 0..50 {
            assert_eq!(a.d20(), b.d20());
            assert_eq!(a.mixed(), b.mixed());
        }
    }

    #[test]
    fn test_seeded_dice_covers_every_face() {
        let mut dice = SeededDice::new(2024);
        let mut seen = [false; 20];
        for _ in 0..2000 {
            seen[(dice.d20() - 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_scripted_dice_replays_in_order() {
        let mut dice = ScriptedDice::new().with_d20([3, 17]).with_mixed([(2, 7)]);
        assert_eq!(dice.mixed(), MixedRoll::new(2, 7));
        assert_eq!(dice.d20(), 3);
        assert_eq!(dice.d20(), 17);
        assert_eq!(dice.rolls_taken(), 3);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "ran out of d20 rolls")]
    fn test_scripted_dice_panics_when_exhausted() {
        let mut dice = ScriptedDice::new();
        dice.d20();
    }
}
