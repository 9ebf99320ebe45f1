//! Dice rolls and the multiset of unused die values.
//!
//! The controller draws faces through a `DiceSource`, so matches can run on
//! a seeded or entropy-backed RNG, or on a fixed script in tests.

use std::fmt;

use rand::rngs::{SmallRng, StdRng};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Produces independent uniform die faces in `1..=6`.
pub trait DiceSource: Send {
    fn roll_die(&mut self) -> u8;
}

impl DiceSource for SmallRng {
    fn roll_die(&mut self) -> u8 {
        self.gen_range(1..=6)
    }
}

impl DiceSource for StdRng {
    fn roll_die(&mut self) -> u8 {
        self.gen_range(1..=6)
    }
}

/// Replays a fixed sequence of faces, cycling when exhausted.
///
/// Faces outside `1..=6` are clamped into range, and an empty script always
/// rolls 1. The opening roll re-rolls ties, so a script used to begin a
/// match needs two differing faces or the opening never ends.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u8>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        ScriptedDice {
            faces: faces.into_iter().map(|f| f.clamp(1, 6)).collect(),
            cursor: 0,
        }
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        if self.faces.is_empty() {
            return 1;
        }
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        face
    }
}

/// The two faces of one roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceRoll {
    pub first: u8,
    pub second: u8,
}

impl DiceRoll {
    pub const fn new(first: u8, second: u8) -> Self {
        DiceRoll { first, second }
    }

    /// Draws both faces from a source.
    pub fn roll(source: &mut dyn DiceSource) -> Self {
        let first = source.roll_die();
        let second = source.roll_die();
        DiceRoll { first, second }
    }

    pub fn is_double(self) -> bool {
        self.first == self.second
    }

    /// The playable values this roll grants: four copies for doubles.
    pub fn expand(self) -> RemainingDice {
        if self.is_double() {
            RemainingDice(vec![self.first; 4])
        } else {
            RemainingDice(vec![self.first, self.second])
        }
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

/// Multiset of die values still to be played this turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemainingDice(Vec<u8>);

impl RemainingDice {
    pub fn new(values: impl IntoIterator<Item = u8>) -> Self {
        RemainingDice(values.into_iter().collect())
    }

    pub fn empty() -> Self {
        RemainingDice(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> &[u8] {
        &self.0
    }

    pub fn contains(&self, value: u8) -> bool {
        self.0.contains(&value)
    }

    /// Distinct values in ascending order.
    pub fn distinct(&self) -> Vec<u8> {
        let mut values = self.0.clone();
        values.sort_unstable();
        values.dedup();
        values
    }

    /// Smallest remaining value strictly greater than `value`.
    pub fn smallest_above(&self, value: u8) -> Option<u8> {
        self.0.iter().copied().filter(|&v| v > value).min()
    }

    /// Removes one copy of `value`. Returns false if it was not present.
    pub fn remove_one(&mut self, value: u8) -> bool {
        match self.0.iter().position(|&v| v == value) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Returns a copy with one instance of `value` removed.
    pub fn without(&self, value: u8) -> RemainingDice {
        let mut rest = self.clone();
        rest.remove_one(value);
        rest
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns true if every value here appears at least as often in `other`.
    pub fn is_sub_multiset_of(&self, other: &RemainingDice) -> bool {
        let mut pool = other.0.clone();
        self.0.iter().all(|v| match pool.iter().position(|p| p == v) {
            Some(idx) => {
                pool.swap_remove(idx);
                true
            }
            None => false,
        })
    }
}

impl fmt::Display for RemainingDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "-");
        }
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn doubles_expand_to_four() {
        assert_eq!(DiceRoll::new(5, 5).expand().values(), &[5, 5, 5, 5]);
        assert_eq!(DiceRoll::new(6, 4).expand().values(), &[6, 4]);
    }

    #[test]
    fn rng_faces_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let face = rng.roll_die();
            assert!((1..=6).contains(&face));
        }
    }

    #[test]
    fn scripted_dice_cycle() {
        let mut dice = ScriptedDice::new([3, 9, 0]);
        assert_eq!(dice.roll_die(), 3);
        assert_eq!(dice.roll_die(), 6);
        assert_eq!(dice.roll_die(), 1);
        assert_eq!(dice.roll_die(), 3);
    }

    #[test]
    fn empty_script_rolls_one() {
        let mut dice = ScriptedDice::new(Vec::<u8>::new());
        assert_eq!(dice.roll_die(), 1);
        assert_eq!(dice.roll_die(), 1);
    }

    #[test]
    fn remove_one_takes_a_single_copy() {
        let mut dice = DiceRoll::new(2, 2).expand();
        assert!(dice.remove_one(2));
        assert_eq!(dice.len(), 3);
        assert!(!dice.remove_one(5));
        assert_eq!(dice.len(), 3);
    }

    #[test]
    fn smallest_above_picks_minimum_larger() {
        let dice = RemainingDice::new([6, 3, 4]);
        assert_eq!(dice.smallest_above(2), Some(3));
        assert_eq!(dice.smallest_above(4), Some(6));
        assert_eq!(dice.smallest_above(6), None);
        assert_eq!(dice.distinct(), vec![3, 4, 6]);
    }

    #[test]
    fn sub_multiset() {
        let full = DiceRoll::new(4, 4).expand();
        assert!(RemainingDice::new([4, 4]).is_sub_multiset_of(&full));
        assert!(!RemainingDice::new([4, 3]).is_sub_multiset_of(&full));
        assert!(!RemainingDice::new([4; 5]).is_sub_multiset_of(&full));
        assert!(RemainingDice::empty().is_sub_multiset_of(&full));
    }
}
