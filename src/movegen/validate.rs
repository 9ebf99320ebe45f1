//! Move validation.
//!
//! Checks a requested move against the board and the remaining dice and
//! reports the die value it consumes. Rules are applied in a fixed order and
//! the first failure is returned:
//!
//! 1. range of the raw numbers
//! 2. bar priority
//! 3. destination and required die (bar entry, bear-off or normal move)
//! 4. die availability, with the oversized-die bear-off exception
//! 5. die playability (a die with no play anywhere yields to the other)
//! 6. start occupancy
//! 7. destination openness
//! 8. forced use of both dice, or of the larger one

use thiserror::Error;

use super::reach::{can_play_both, has_any_legal_move};
use crate::board::{Board, Move, Side, Source, Target};
use crate::dice::RemainingDice;
use crate::resolve::apply_move;

/// Why a move was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("move {start}/{end} is outside the board")]
    OutOfRange { start: u8, end: u8 },

    #[error("a checker on the bar must enter before any other move")]
    MustEnterFromBar,

    #[error("there is no checker on the bar to enter")]
    NothingOnBar,

    #[error("point {0} is not in the entry quadrant")]
    NotAnEntryPoint(u8),

    #[error("{0} is not a destination for this side")]
    InvalidDestination(u8),

    #[error("checkers of this side move the other way")]
    WrongDirection,

    #[error("cannot bear off with checkers on the bar or outside the home board")]
    CannotBearOff,

    #[error("no {0} among the remaining dice")]
    DieUnavailable(u8),

    #[error("a larger die may only bear off from the farthest occupied home point")]
    OversizedDieBlocked,

    #[error("the {die} cannot be played anywhere while the {other} can; play the {other}")]
    MustPlayOtherDie { die: u8, other: u8 },

    #[error("no own checker on point {0}")]
    NoCheckerAtStart(u8),

    #[error("point {0} is blocked")]
    PointBlocked(u8),

    #[error("this leaves the {0} unplayable while both dice can be used")]
    WouldStrandOtherDie(u8),

    #[error("only one die can be played and it must be the larger {0}")]
    MustPlayLargerDie(u8),
}

/// Fully validates a move for `side`, returning the die value it consumes.
pub fn validate(board: &Board, side: Side, dice: &RemainingDice, mv: Move) -> Result<u8, IllegalMove> {
    let die = check_move(board, side, dice, mv, true)?;

    let Some(other) = other_die(dice, die) else {
        return Ok(die);
    };

    let mut after = board.clone();
    if apply_move(&mut after, side, mv).won {
        return Ok(die);
    }
    if has_any_legal_move(&after, side, &dice.without(die)) {
        return Ok(die);
    }
    if can_play_both(board, side, dice) {
        return Err(IllegalMove::WouldStrandOtherDie(other));
    }
    if die < other && has_any_legal_move(board, side, &RemainingDice::new([other])) {
        return Err(IllegalMove::MustPlayLargerDie(other));
    }
    Ok(die)
}

/// Applies the per-move rules, without the whole-turn check of step 8.
///
/// `forced` enables step 5, which consults the reachability oracle. The
/// oracle itself calls this with `forced` off.
pub(crate) fn check_move(
    board: &Board,
    side: Side,
    dice: &RemainingDice,
    mv: Move,
    forced: bool,
) -> Result<u8, IllegalMove> {
    if !mv.in_range() {
        return Err(IllegalMove::OutOfRange { start: mv.start, end: mv.end });
    }

    let source = mv.source();
    let target = mv.target(side);
    let on_bar = board.bar_count(side) > 0;
    match source {
        Source::Point(_) if on_bar => return Err(IllegalMove::MustEnterFromBar),
        Source::Bar if !on_bar => return Err(IllegalMove::NothingOnBar),
        _ => {}
    }

    let die = required_die(board, side, dice, source, target)?;

    if forced {
        if let Some(other) = other_die(dice, die) {
            let this_playable = has_any_legal_move(board, side, &RemainingDice::new([die]));
            if !this_playable && has_any_legal_move(board, side, &RemainingDice::new([other])) {
                return Err(IllegalMove::MustPlayOtherDie { die, other });
            }
        }
    }

    if let Source::Point(start) = source {
        if board.count_for(start, side) == 0 {
            return Err(IllegalMove::NoCheckerAtStart(start));
        }
    }
    if let Target::Point(end) = target {
        if !board.is_open_for(end, side) {
            return Err(IllegalMove::PointBlocked(end));
        }
    }

    Ok(die)
}

/// Derives the die a move needs and confirms it can be paid for.
fn required_die(
    board: &Board,
    side: Side,
    dice: &RemainingDice,
    source: Source,
    target: Target,
) -> Result<u8, IllegalMove> {
    let geo = side.geometry();
    let die = match (source, target) {
        (_, Target::Nowhere) => return Err(IllegalMove::InvalidDestination(25 - geo.off)),
        (Source::Bar, Target::Off) => return Err(IllegalMove::NotAnEntryPoint(geo.off)),
        (Source::Bar, Target::Point(end)) => {
            if !geo.entry.contains(&end) {
                return Err(IllegalMove::NotAnEntryPoint(end));
            }
            geo.entry_die(end)
        }
        (Source::Point(start), Target::Off) => {
            if !board.can_bear_off(side) {
                return Err(IllegalMove::CannotBearOff);
            }
            return bear_off_die(board, side, dice, start);
        }
        (Source::Point(start), Target::Point(end)) => {
            if !geo.is_forward(start, end) {
                return Err(IllegalMove::WrongDirection);
            }
            start.abs_diff(end)
        }
    };

    if dice.contains(die) {
        Ok(die)
    } else {
        Err(IllegalMove::DieUnavailable(die))
    }
}

/// Picks the die for bearing off from `start`: the exact distance if
/// available, otherwise the smallest larger die, which is only allowed from
/// the farthest occupied home point.
fn bear_off_die(board: &Board, side: Side, dice: &RemainingDice, start: u8) -> Result<u8, IllegalMove> {
    let exact = side.geometry().distance_off(start);
    if dice.contains(exact) {
        return Ok(exact);
    }
    match dice.smallest_above(exact) {
        Some(larger) if board.farthest_home_point(side) == Some(start) => Ok(larger),
        Some(_) => Err(IllegalMove::OversizedDieBlocked),
        None => Err(IllegalMove::DieUnavailable(exact)),
    }
}

/// The other value when exactly two distinct values remain.
fn other_die(dice: &RemainingDice, die: u8) -> Option<u8> {
    match dice.distinct().as_slice() {
        &[a, b] if a == die => Some(b),
        &[a, b] if b == die => Some(a),
        _ => None,
    }
}
