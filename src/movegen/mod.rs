//! Move validation and legal move generation.
//!
//! `validate` decides whether one requested move is legal; `reach` answers
//! whether any legal move exists and enumerates the candidates it tried.

pub mod reach;
pub mod validate;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Move, Side};
use crate::dice::RemainingDice;

pub use reach::{can_play_both, candidate_moves, has_any_legal_move, legal_plays};
pub use validate::{validate, IllegalMove};

/// A legal move together with the die value it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Play {
    pub mv: Move,
    pub die: u8,
}

/// Every move `validate` accepts for `side` right now.
pub fn legal_moves(board: &Board, side: Side, dice: &RemainingDice) -> Vec<Play> {
    legal_plays(board, side, dice)
        .into_iter()
        .filter_map(|play| {
            validate(board, side, dice, play.mv)
                .ok()
                .map(|die| Play { mv: play.mv, die })
        })
        .collect()
}
