//! Reachability oracle.
//!
//! Answers whether a side has any legal play for a set of die values. Every
//! candidate is confirmed with the validator's per-move rules, so whatever
//! the oracle reports reachable is a move `validate` accepts structurally.

use super::validate::check_move;
use super::Play;
use crate::board::{Board, Move, Side, BAR};
use crate::dice::RemainingDice;
use crate::resolve::apply_move;

/// Candidate moves for one die value, before any rule is checked.
///
/// With checkers on the bar the only candidate is the entry point. Otherwise
/// every occupied point moves `die` pips forward, and a move past the board
/// edge becomes a bear-off.
pub fn candidate_moves(board: &Board, side: Side, die: u8) -> Vec<Move> {
    let geo = side.geometry();
    if board.bar_count(side) > 0 {
        return vec![Move::new(BAR, geo.entry_point(die))];
    }
    board
        .occupied_points(side)
        .map(|p| Move::new(p, geo.advance(p, die).unwrap_or(geo.off)))
        .collect()
}

/// Plays that pass every per-move rule for the given dice, one per move.
pub fn legal_plays(board: &Board, side: Side, dice: &RemainingDice) -> Vec<Play> {
    let mut plays: Vec<Play> = Vec::new();
    for die in dice.distinct() {
        for mv in candidate_moves(board, side, die) {
            if plays.iter().any(|p| p.mv == mv) {
                continue;
            }
            if let Ok(consumed) = check_move(board, side, dice, mv, false) {
                plays.push(Play { mv, die: consumed });
            }
        }
    }
    plays
}

/// Returns true if `side` has at least one legal play with the given dice.
pub fn has_any_legal_move(board: &Board, side: Side, dice: &RemainingDice) -> bool {
    dice.distinct().into_iter().any(|die| {
        candidate_moves(board, side, die)
            .into_iter()
            .any(|mv| check_move(board, side, dice, mv, false).is_ok())
    })
}

/// Returns true if some order of play uses two dice from `dice`, or wins
/// the game with the first.
pub fn can_play_both(board: &Board, side: Side, dice: &RemainingDice) -> bool {
    legal_plays(board, side, dice).into_iter().any(|play| {
        let mut after = board.clone();
        apply_move(&mut after, side, play.mv).won
            || has_any_legal_move(&after, side, &dice.without(play.die))
    })
}
