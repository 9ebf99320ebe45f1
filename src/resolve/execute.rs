//! Move execution.
//!
//! Moves one checker for a move that has already passed validation. A lone
//! opposing checker on the destination is hit to its owner's bar first.
//! Nothing here re-validates.

use tracing::debug;

use crate::board::{Board, Checker, MatchState, Move, Phase, Side, Source, Target, CHECKERS_PER_SIDE};

/// What happened when a move was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Applied {
    /// The opposing checker sent to the bar, if any.
    pub hit: Option<Checker>,
    pub borne_off: bool,
    /// The move bore off the side's fifteenth checker.
    pub won: bool,
}

/// Moves one checker on the board. Returns a default `Applied` and leaves
/// the board untouched if the move has no checker to take or no destination.
pub fn apply_move(board: &mut Board, side: Side, mv: Move) -> Applied {
    let target = mv.target(side);
    if target == Target::Nowhere {
        return Applied::default();
    }

    let taken = match mv.source() {
        Source::Bar => board.take_from_bar(side),
        Source::Point(p) => board.take_from_point(p),
    };
    debug_assert!(taken.is_some(), "apply_move called without a checker at {}", mv.start);
    let Some(checker) = taken else {
        return Applied::default();
    };

    let mut applied = Applied::default();
    match target {
        Target::Off => {
            board.bear_off(checker);
            applied.borne_off = true;
            applied.won = board.borne_off_count(side) == CHECKERS_PER_SIDE;
        }
        Target::Point(end) => {
            if board.count_for(end, side.opponent()) == 1 {
                if let Some(blot) = board.take_from_point(end) {
                    board.send_to_bar(blot);
                    applied.hit = Some(blot);
                }
            }
            board.place_on_point(end, checker);
        }
        Target::Nowhere => {}
    }
    applied
}

/// Executes a validated move on the match, ending the game when the side
/// bears off its last checker.
pub fn execute(state: &mut MatchState, side: Side, mv: Move) -> Applied {
    let applied = apply_move(&mut state.board, side, mv);
    if let Some(blot) = applied.hit {
        debug!(?side, %mv, hit = ?blot.id, "hit");
    }
    if applied.won {
        state.phase = Phase::GameOver;
        state.winner = Some(side);
        state.current = None;
    }
    applied
}
