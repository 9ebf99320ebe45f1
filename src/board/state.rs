//! Board and match state.
//!
//! `Board` holds checker placement: 24 points, a bar and a borne-off pile per
//! side. `MatchState` wraps it with the seat table, phase, dice and winner.
//! Only the executor moves checkers; everything here is queries, layout
//! construction and invariant checks.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::checker::{Checker, CheckerId};
use super::side::{Side, ALL_SIDES, CHECKERS_PER_SIDE, POINT_COUNT};
use crate::dice::{DiceRoll, RemainingDice};

/// Errors from building a board out of a layout description.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("point {0} is not on the board (use 0 for the bar)")]
    InvalidPoint(u8),

    #[error("{side:?} is given {count} checkers, at most 15 allowed")]
    TooManyCheckers { side: Side, count: usize },

    #[error("point {0} is given checkers of both sides")]
    MixedPoint(u8),
}

/// A broken structural invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{side:?} has {count} checkers in play, bar and off; expected 15")]
    CheckerCount { side: Side, count: usize },

    #[error("point {0} holds checkers of both sides")]
    MixedPoint(u8),

    #[error("checker {0:?} appears more than once")]
    DuplicateChecker(CheckerId),

    #[error("checker {0:?} sits in a container of the wrong side")]
    WrongOwner(CheckerId),

    #[error("remaining dice {remaining} are not part of roll {roll}")]
    DiceMismatch { remaining: String, roll: String },

    #[error("phase {phase} does not match current player {current:?} / winner {winner:?}")]
    PhaseMismatch {
        phase: Phase,
        current: Option<Side>,
        winner: Option<Side>,
    },
}

/// Checker placement for both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Index `p - 1` holds point `p`; the last checker is the top one.
    points: [Vec<Checker>; POINT_COUNT],
    /// Hit checkers awaiting entry, oldest first.
    bar: [VecDeque<Checker>; 2],
    off: [Vec<Checker>; 2],
}

impl Board {
    fn empty() -> Self {
        Board {
            points: std::array::from_fn(|_| Vec::new()),
            bar: [VecDeque::new(), VecDeque::new()],
            off: [Vec::new(), Vec::new()],
        }
    }

    /// The standard starting position.
    pub fn standard() -> Self {
        Board::filled(
            &[(1, 2), (12, 5), (17, 3), (19, 5)],
            &[(24, 2), (13, 5), (8, 3), (6, 5)],
        )
    }

    /// Builds a board from `(point, count)` pairs per side.
    ///
    /// Point `0` places checkers on the bar. Checkers not listed start on
    /// the side's borne-off pile, so every layout keeps 15 checkers a side.
    pub fn from_layout(white: &[(u8, usize)], black: &[(u8, usize)]) -> Result<Board, LayoutError> {
        for (side, layout) in [(Side::White, white), (Side::Black, black)] {
            let total: usize = layout.iter().map(|&(_, n)| n).sum();
            if total > CHECKERS_PER_SIDE {
                return Err(LayoutError::TooManyCheckers { side, count: total });
            }
            if let Some(&(point, _)) = layout.iter().find(|&&(p, _)| p as usize > POINT_COUNT) {
                return Err(LayoutError::InvalidPoint(point));
            }
        }
        for &(point, count) in white {
            let clash = black.iter().any(|&(p, n)| p == point && n > 0);
            if point != 0 && count > 0 && clash {
                return Err(LayoutError::MixedPoint(point));
            }
        }
        Ok(Board::filled(white, black))
    }

    /// Places checkers without validating the layout.
    fn filled(white: &[(u8, usize)], black: &[(u8, usize)]) -> Board {
        let mut board = Board::empty();
        for (side, layout) in [(Side::White, white), (Side::Black, black)] {
            let mut checkers = Checker::set_for(side);
            for &(point, count) in layout {
                for checker in checkers.by_ref().take(count) {
                    if point == 0 {
                        board.bar[side.index()].push_back(checker);
                    } else {
                        board.points[point as usize - 1].push(checker);
                    }
                }
            }
            board.off[side.index()].extend(checkers);
        }
        board
    }

    /// Checkers on a point, bottom first. Empty for points outside 1..=24.
    pub fn point(&self, point: u8) -> &[Checker] {
        match point {
            1..=24 => &self.points[point as usize - 1],
            _ => &[],
        }
    }

    pub fn count_at(&self, point: u8) -> usize {
        self.point(point).len()
    }

    /// Side occupying a point, if any.
    pub fn owner_at(&self, point: u8) -> Option<Side> {
        self.point(point).first().map(|c| c.side)
    }

    /// Number of `side`'s checkers on a point.
    pub fn count_for(&self, point: u8, side: Side) -> usize {
        if self.owner_at(point) == Some(side) {
            self.count_at(point)
        } else {
            0
        }
    }

    pub fn bar_count(&self, side: Side) -> usize {
        self.bar[side.index()].len()
    }

    pub fn borne_off_count(&self, side: Side) -> usize {
        self.off[side.index()].len()
    }

    /// Checkers of `side` still on the 24 points.
    pub fn on_board_count(&self, side: Side) -> usize {
        self.points
            .iter()
            .filter(|p| p.first().is_some_and(|c| c.side == side))
            .map(Vec::len)
            .sum()
    }

    /// Returns true if `side` may land on the point: it is not held by two
    /// or more opposing checkers.
    pub fn is_open_for(&self, point: u8, side: Side) -> bool {
        self.count_for(point, side.opponent()) < 2
    }

    /// Points holding at least one of `side`'s checkers, ascending.
    pub fn occupied_points(&self, side: Side) -> impl Iterator<Item = u8> + '_ {
        (1..=POINT_COUNT as u8).filter(move |&p| self.owner_at(p) == Some(side))
    }

    /// Returns true if `side` has nothing on the bar and nothing outside its
    /// home quadrant.
    pub fn can_bear_off(&self, side: Side) -> bool {
        let geo = side.geometry();
        self.bar_count(side) == 0 && self.occupied_points(side).all(|p| geo.is_home(p))
    }

    /// Occupied home point farthest from the bear-off edge.
    pub fn farthest_home_point(&self, side: Side) -> Option<u8> {
        side.geometry()
            .home_farthest_first()
            .find(|&p| self.owner_at(p) == Some(side))
    }

    /// Total pips `side` needs to bear everything off. Bar checkers count 25.
    pub fn pip_count(&self, side: Side) -> u32 {
        let geo = side.geometry();
        let on_points: u32 = self
            .occupied_points(side)
            .map(|p| geo.distance_off(p) as u32 * self.count_at(p) as u32)
            .sum();
        on_points + 25 * self.bar_count(side) as u32
    }

    /// Checks conservation, point exclusivity and checker identity.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = [false; 2 * CHECKERS_PER_SIDE];
        let mut mark = |checker: &Checker, expected: Option<Side>| {
            let idx = checker.id.0 as usize;
            if idx >= seen.len()
                || idx / CHECKERS_PER_SIDE != checker.side.index()
                || expected.is_some_and(|s| s != checker.side)
            {
                return Err(InvariantViolation::WrongOwner(checker.id));
            }
            if std::mem::replace(&mut seen[idx], true) {
                return Err(InvariantViolation::DuplicateChecker(checker.id));
            }
            Ok(())
        };

        for (idx, point) in self.points.iter().enumerate() {
            let owner = point.first().map(|c| c.side);
            if point.iter().any(|c| Some(c.side) != owner) {
                return Err(InvariantViolation::MixedPoint(idx as u8 + 1));
            }
            for checker in point {
                mark(checker, None)?;
            }
        }
        for side in ALL_SIDES {
            for checker in self.bar[side.index()].iter().chain(&self.off[side.index()]) {
                mark(checker, Some(side))?;
            }
        }

        for side in ALL_SIDES {
            let count = self.on_board_count(side) + self.bar_count(side) + self.borne_off_count(side);
            if count != CHECKERS_PER_SIDE {
                return Err(InvariantViolation::CheckerCount { side, count });
            }
        }
        Ok(())
    }

    pub(crate) fn take_from_bar(&mut self, side: Side) -> Option<Checker> {
        self.bar[side.index()].pop_front()
    }

    pub(crate) fn take_from_point(&mut self, point: u8) -> Option<Checker> {
        self.points.get_mut((point as usize).wrapping_sub(1))?.pop()
    }

    pub(crate) fn place_on_point(&mut self, point: u8, checker: Checker) {
        self.points[point as usize - 1].push(checker);
    }

    pub(crate) fn send_to_bar(&mut self, checker: Checker) {
        self.bar[checker.side.index()].push_back(checker);
    }

    pub(crate) fn bear_off(&mut self, checker: Checker) {
        self.off[checker.side.index()].push(checker);
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

/// The phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    WaitingForPlayers,
    StartingRoll,
    PlayerTurn,
    GameOver,
}

impl Phase {
    pub const fn name(self) -> &'static str {
        match self {
            Phase::WaitingForPlayers => "waiting_for_players",
            Phase::StartingRoll => "starting_roll",
            Phase::PlayerTurn => "player_turn",
            Phase::GameOver => "game_over",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque handle the transport layer uses to identify a connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionToken(pub String);

impl From<&str> for ConnectionToken {
    fn from(s: &str) -> Self {
        ConnectionToken(s.to_string())
    }
}

impl From<String> for ConnectionToken {
    fn from(s: String) -> Self {
        ConnectionToken(s)
    }
}

impl fmt::Display for ConnectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub token: ConnectionToken,
    pub side: Side,
}

/// Complete snapshot of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub board: Board,
    /// Seat table indexed by `Side::index`.
    pub players: [Option<Player>; 2],
    pub phase: Phase,
    /// Side to act; set only during `PlayerTurn`.
    pub current: Option<Side>,
    /// Roll that produced `remaining`, cleared at end of turn.
    pub dice: Option<DiceRoll>,
    pub remaining: RemainingDice,
    /// Set only in `GameOver`.
    pub winner: Option<Side>,
}

impl MatchState {
    /// A fresh match on the standard board with no one seated.
    pub fn new() -> Self {
        MatchState::with_board(Board::standard())
    }

    /// A match waiting for players on the given board.
    pub fn with_board(board: Board) -> Self {
        MatchState {
            board,
            players: [None, None],
            phase: Phase::WaitingForPlayers,
            current: None,
            dice: None,
            remaining: RemainingDice::empty(),
            winner: None,
        }
    }

    /// A match already in `PlayerTurn` with `side` to play `dice`.
    ///
    /// Seats are left empty; used to set up positions directly.
    pub fn in_turn(board: Board, side: Side, dice: DiceRoll) -> Self {
        MatchState {
            board,
            players: [None, None],
            phase: Phase::PlayerTurn,
            current: Some(side),
            dice: Some(dice),
            remaining: dice.expand(),
            winner: None,
        }
    }

    pub fn player(&self, side: Side) -> Option<&Player> {
        self.players[side.index()].as_ref()
    }

    pub fn seat_of(&self, token: &ConnectionToken) -> Option<Side> {
        self.players.iter().flatten().find(|p| &p.token == token).map(|p| p.side)
    }

    pub fn both_players_present(&self) -> bool {
        self.players.iter().all(Option::is_some)
    }

    /// Checks every structural invariant of the match.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.board.check_invariants()?;

        let rolled = self.dice.map(DiceRoll::expand).unwrap_or_default();
        if !self.remaining.is_sub_multiset_of(&rolled) {
            return Err(InvariantViolation::DiceMismatch {
                remaining: self.remaining.to_string(),
                roll: self.dice.map_or_else(|| "-".to_string(), |d| d.to_string()),
            });
        }

        let consistent = match self.phase {
            Phase::PlayerTurn => self.current.is_some() && self.winner.is_none(),
            Phase::GameOver => self.current.is_none() && self.winner.is_some(),
            Phase::WaitingForPlayers | Phase::StartingRoll => {
                self.current.is_none() && self.winner.is_none()
            }
        };
        if !consistent {
            return Err(InvariantViolation::PhaseMismatch {
                phase: self.phase,
                current: self.current,
                winner: self.winner,
            });
        }
        Ok(())
    }
}

impl Default for MatchState {
    fn default() -> Self {
        MatchState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_board_is_valid() {
        let board = Board::standard();
        assert!(board.check_invariants().is_ok());
        assert_eq!(board.count_for(1, Side::White), 2);
        assert_eq!(board.count_for(19, Side::White), 5);
        assert_eq!(board.count_for(6, Side::Black), 5);
        assert_eq!(board.count_for(24, Side::Black), 2);
        assert_eq!(board.borne_off_count(Side::White), 0);
        assert_eq!(board.pip_count(Side::White), 167);
        assert_eq!(board.pip_count(Side::Black), 167);
    }

    #[test]
    fn layout_fills_borne_off_with_the_rest() {
        let board = Board::from_layout(&[(0, 1), (20, 2)], &[(3, 1)]).unwrap();
        assert_eq!(board.bar_count(Side::White), 1);
        assert_eq!(board.borne_off_count(Side::White), 12);
        assert_eq!(board.borne_off_count(Side::Black), 14);
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn layout_rejects_bad_input() {
        assert_eq!(
            Board::from_layout(&[(25, 1)], &[]),
            Err(LayoutError::InvalidPoint(25))
        );
        assert_eq!(
            Board::from_layout(&[(1, 10), (2, 6)], &[]),
            Err(LayoutError::TooManyCheckers { side: Side::White, count: 16 })
        );
        assert_eq!(
            Board::from_layout(&[(5, 1)], &[(5, 2)]),
            Err(LayoutError::MixedPoint(5))
        );
    }

    #[test]
    fn openness_counts_opponents_only() {
        let board = Board::from_layout(&[(4, 3)], &[(5, 1), (6, 2)]).unwrap();
        assert!(board.is_open_for(4, Side::White));
        assert!(board.is_open_for(5, Side::White));
        assert!(!board.is_open_for(6, Side::White));
        assert!(!board.is_open_for(4, Side::Black));
        assert!(board.is_open_for(7, Side::Black));
    }

    #[test]
    fn bear_off_eligibility() {
        let home = Board::from_layout(&[(19, 3), (24, 1)], &[(1, 2)]).unwrap();
        assert!(home.can_bear_off(Side::White));
        assert!(home.can_bear_off(Side::Black));
        assert_eq!(home.farthest_home_point(Side::White), Some(19));
        assert_eq!(home.farthest_home_point(Side::Black), Some(1));

        let straggler = Board::from_layout(&[(18, 1), (24, 1)], &[]).unwrap();
        assert!(!straggler.can_bear_off(Side::White));

        let on_bar = Board::from_layout(&[(0, 1), (24, 1)], &[]).unwrap();
        assert!(!on_bar.can_bear_off(Side::White));
    }

    #[test]
    fn invariants_catch_mixed_points_and_lost_checkers() {
        let mut board = Board::standard();
        let black = board.take_from_point(6).unwrap();
        board.place_on_point(1, black);
        assert_eq!(board.check_invariants(), Err(InvariantViolation::MixedPoint(1)));

        let mut board = Board::standard();
        board.take_from_point(1);
        assert_eq!(
            board.check_invariants(),
            Err(InvariantViolation::CheckerCount { side: Side::White, count: 14 })
        );
    }

    #[test]
    fn take_from_point_rejects_off_board_indices() {
        let mut board = Board::standard();
        assert!(board.take_from_point(0).is_none());
        assert!(board.take_from_point(25).is_none());
    }

    #[test]
    fn match_state_phase_consistency() {
        let mut state = MatchState::new();
        assert!(state.check_invariants().is_ok());
        state.current = Some(Side::White);
        assert!(matches!(
            state.check_invariants(),
            Err(InvariantViolation::PhaseMismatch { .. })
        ));

        let turn = MatchState::in_turn(Board::standard(), Side::Black, DiceRoll::new(3, 3));
        assert!(turn.check_invariants().is_ok());
        assert_eq!(turn.remaining.len(), 4);
    }

    #[test]
    fn remaining_dice_must_come_from_roll() {
        let mut state = MatchState::in_turn(Board::standard(), Side::White, DiceRoll::new(6, 4));
        state.remaining = RemainingDice::new([6, 6]);
        assert!(matches!(
            state.check_invariants(),
            Err(InvariantViolation::DiceMismatch { .. })
        ));
    }
}
