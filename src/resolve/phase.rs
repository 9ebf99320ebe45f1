//! Turn sequencing.
//!
//! Decides who opens the game and moves the match between turns:
//!
//! - Opening: both sides roll one die, ties re-roll; the higher die plays
//!   both opening faces.
//! - Turn start: the roll is expanded into the remaining dice.
//! - Turn end: the other side becomes current and the dice are cleared.
//! - A turn whose remaining dice have no legal play ends at once.

use tracing::info;

use crate::board::{MatchState, Phase, Side};
use crate::dice::{DiceRoll, DiceSource};
use crate::movegen::has_any_legal_move;

/// Rolls one die per side until they differ. Returns the opening side and
/// the roll, with White's die first.
pub fn opening_roll(source: &mut dyn DiceSource) -> (Side, DiceRoll) {
    loop {
        let white = source.roll_die();
        let black = source.roll_die();
        if white != black {
            let opener = if white > black { Side::White } else { Side::Black };
            return (opener, DiceRoll::new(white, black));
        }
    }
}

/// Makes `side` current with `roll` as its dice.
pub fn start_turn(state: &mut MatchState, side: Side, roll: DiceRoll) {
    state.phase = Phase::PlayerTurn;
    state.current = Some(side);
    state.dice = Some(roll);
    state.remaining = roll.expand();
}

/// Hands the turn to the other side with no dice rolled.
///
/// Does nothing once the game is over.
pub fn end_turn(state: &mut MatchState) {
    if state.phase == Phase::GameOver {
        return;
    }
    state.dice = None;
    state.remaining.clear();
    state.current = state.current.map(Side::opponent);
}

/// Ends the turn if the current side has no dice left or cannot play any of
/// them. Returns true if the turn ended.
pub fn finish_turn_if_stuck(state: &mut MatchState) -> bool {
    if state.phase != Phase::PlayerTurn {
        return false;
    }
    let Some(side) = state.current else {
        return false;
    };
    if !state.remaining.is_empty() && has_any_legal_move(&state.board, side, &state.remaining) {
        return false;
    }
    if !state.remaining.is_empty() {
        info!(?side, remaining = %state.remaining, "no legal play, turn passes");
    }
    end_turn(state);
    true
}
