//! Checker identities.
//!
//! Every checker carries a stable id for the lifetime of a match. Ids
//! `0..15` belong to White and `15..30` to Black.

use serde::{Deserialize, Serialize};

use super::side::{Side, CHECKERS_PER_SIDE};

/// Stable identity of one checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckerId(pub u8);

/// A checker: its identity and the side that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checker {
    pub id: CheckerId,
    pub side: Side,
}

impl Checker {
    /// Creates the `n`th checker of a side. `n` must be below 15.
    pub fn nth(side: Side, n: usize) -> Self {
        debug_assert!(n < CHECKERS_PER_SIDE);
        Checker {
            id: CheckerId((side.index() * CHECKERS_PER_SIDE + n) as u8),
            side,
        }
    }

    /// Returns the full set of 15 checkers for a side.
    pub fn set_for(side: Side) -> impl Iterator<Item = Checker> {
        (0..CHECKERS_PER_SIDE).map(move |n| Checker::nth(side, n))
    }
}
