//! Match controller.
//!
//! `Engine` owns one match: the seat table, the board, the dice and the
//! turn/phase state machine. Every entry point either applies a complete
//! transition or returns an error and leaves the state untouched.
//!
//! `SharedMatch` wraps an engine in a mutex for callers that drive one match
//! from several connections.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::board::{Board, ConnectionToken, MatchState, Move, Phase, Player, Side, ALL_SIDES};
use crate::config::MatchConfig;
use crate::dice::{DiceRoll, DiceSource};
use crate::movegen::{self, validate, IllegalMove, Play};
use crate::resolve::{execute, finish_turn_if_stuck, opening_roll, start_turn};

/// Why a roll or move request was turned down.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("not allowed while the match is in {0}")]
    WrongPhase(Phase),

    #[error("it is not {0}'s turn")]
    NotYourTurn(Side),

    #[error("roll the dice first")]
    DiceNotRolled,

    #[error("the dice have already been rolled")]
    DiceAlreadyRolled,

    #[error(transparent)]
    Illegal(#[from] IllegalMove),
}

/// Seat bookkeeping failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeatError {
    #[error("the match already has two players")]
    MatchFull,

    #[error("no player is seated for connection {0}")]
    NotFound(ConnectionToken),
}

/// Holds the mutable state of one match between requests.
pub struct Engine {
    state: MatchState,
    config: MatchConfig,
    dice: Box<dyn DiceSource>,
}

impl Engine {
    /// Creates an engine on the standard board with dice built from `config`.
    pub fn new(config: MatchConfig) -> Self {
        let dice = config.dice();
        Engine::with_dice(config, dice)
    }

    pub fn with_dice(config: MatchConfig, dice: Box<dyn DiceSource>) -> Self {
        Engine {
            state: MatchState::new(),
            config,
            dice,
        }
    }

    /// Resumes from an existing state, e.g. a position set up for analysis.
    pub fn from_state(state: MatchState, dice: Box<dyn DiceSource>) -> Self {
        Engine {
            state,
            config: MatchConfig::default(),
            dice,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Replaces the configuration and rebuilds the dice from it.
    pub fn set_config(&mut self, config: MatchConfig) {
        self.dice = config.dice();
        self.config = config;
    }

    /// Seats `token` on the first free side. A token that is already seated
    /// gets its side back.
    #[instrument(skip(self, token), fields(token = %token))]
    pub fn assign_player(&mut self, token: ConnectionToken) -> Result<Side, SeatError> {
        if let Some(side) = self.state.seat_of(&token) {
            return Ok(side);
        }
        let side = ALL_SIDES
            .into_iter()
            .find(|s| self.state.player(*s).is_none())
            .ok_or(SeatError::MatchFull)?;
        self.state.players[side.index()] = Some(Player { token, side });
        info!(?side, "player seated");
        Ok(side)
    }

    /// Frees the seat held by `token`. The match itself is left alone;
    /// whether a departure aborts the game is the caller's decision.
    #[instrument(skip(self, token), fields(token = %token))]
    pub fn remove_player(&mut self, token: &ConnectionToken) -> Result<Side, SeatError> {
        let side = self
            .state
            .seat_of(token)
            .ok_or_else(|| SeatError::NotFound(token.clone()))?;
        self.state.players[side.index()] = None;
        info!(?side, "player left");
        Ok(side)
    }

    pub fn both_players_present(&self) -> bool {
        self.state.both_players_present()
    }

    /// Runs the opening roll and starts the first turn. Returns false and
    /// does nothing unless both seats are filled and the match is waiting.
    #[instrument(skip(self))]
    pub fn begin_match(&mut self) -> bool {
        if self.state.phase != Phase::WaitingForPlayers || !self.both_players_present() {
            debug!(phase = %self.state.phase, "begin ignored");
            return false;
        }
        self.state.phase = Phase::StartingRoll;
        let (opener, roll) = opening_roll(self.dice.as_mut());
        start_turn(&mut self.state, opener, roll);
        info!(?opener, %roll, "match started");
        finish_turn_if_stuck(&mut self.state);
        self.debug_check();
        true
    }

    /// Rolls for `side`. A roll with no legal play passes the turn at once.
    #[instrument(skip(self))]
    pub fn roll_dice(&mut self, side: Side) -> Result<MatchState, ActionError> {
        self.ensure_turn(side).inspect_err(|e| debug!(%e, "roll rejected"))?;
        if !self.state.remaining.is_empty() {
            debug!("roll rejected: dice already rolled");
            return Err(ActionError::DiceAlreadyRolled);
        }

        let roll = DiceRoll::roll(self.dice.as_mut());
        start_turn(&mut self.state, side, roll);
        info!(%roll, "rolled");
        finish_turn_if_stuck(&mut self.state);
        self.debug_check();
        Ok(self.snapshot())
    }

    /// Validates and plays one checker move for `side`.
    #[instrument(skip(self, mv), fields(mv = %mv))]
    pub fn submit_move(&mut self, side: Side, mv: Move) -> Result<MatchState, ActionError> {
        self.ensure_turn(side).inspect_err(|e| debug!(%e, "move rejected"))?;
        if self.state.remaining.is_empty() {
            debug!("move rejected: dice not rolled");
            return Err(ActionError::DiceNotRolled);
        }
        let die = validate(&self.state.board, side, &self.state.remaining, mv).inspect_err(|e| {
            debug!(reason = %e, remaining = %self.state.remaining, "move rejected");
        })?;

        let applied = execute(&mut self.state, side, mv);
        self.state.remaining.remove_one(die);
        debug!(
            die,
            hit = applied.hit.is_some(),
            borne_off = applied.borne_off,
            remaining = %self.state.remaining,
            "move played"
        );

        if applied.won {
            self.state.dice = None;
            self.state.remaining.clear();
            info!(winner = ?side, "game over");
        } else {
            finish_turn_if_stuck(&mut self.state);
        }
        self.debug_check();
        Ok(self.snapshot())
    }

    /// Discards the game in progress and returns to `WaitingForPlayers` on a
    /// fresh board. Seated players keep their seats.
    #[instrument(skip(self))]
    pub fn reset_match(&mut self) {
        let players = std::mem::take(&mut self.state.players);
        self.state = MatchState::with_board(Board::standard());
        self.state.players = players;
        info!("match reset");
    }

    pub fn snapshot(&self) -> MatchState {
        self.state.clone()
    }

    /// Plays `side` could make right now. Empty when it is not `side`'s
    /// move.
    pub fn legal_moves(&self, side: Side) -> Vec<Play> {
        if self.state.phase != Phase::PlayerTurn || self.state.current != Some(side) {
            return Vec::new();
        }
        movegen::legal_moves(&self.state.board, side, &self.state.remaining)
    }

    fn ensure_turn(&self, side: Side) -> Result<(), ActionError> {
        if self.state.phase != Phase::PlayerTurn {
            return Err(ActionError::WrongPhase(self.state.phase));
        }
        if self.state.current != Some(side) {
            return Err(ActionError::NotYourTurn(side));
        }
        Ok(())
    }

    fn debug_check(&self) {
        let checked = self.state.check_invariants();
        if let Err(violation) = &checked {
            warn!(%violation, "match invariant broken");
        }
        debug_assert!(checked.is_ok(), "match invariant broken: {checked:?}");
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(MatchConfig::default())
    }
}

/// Cloneable handle to one engine behind a mutex.
///
/// Each method holds the lock for the whole operation, so at most one
/// request touches the match at a time.
#[derive(Clone)]
pub struct SharedMatch {
    inner: Arc<Mutex<Engine>>,
}

impl SharedMatch {
    pub fn new(engine: Engine) -> Self {
        SharedMatch {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Engine> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("match lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn assign_player(&self, token: ConnectionToken) -> Result<Side, SeatError> {
        self.lock().assign_player(token)
    }

    pub fn remove_player(&self, token: &ConnectionToken) -> Result<Side, SeatError> {
        self.lock().remove_player(token)
    }

    pub fn both_players_present(&self) -> bool {
        self.lock().both_players_present()
    }

    pub fn begin_match(&self) -> bool {
        self.lock().begin_match()
    }

    pub fn roll_dice(&self, side: Side) -> Result<MatchState, ActionError> {
        self.lock().roll_dice(side)
    }

    pub fn submit_move(&self, side: Side, mv: Move) -> Result<MatchState, ActionError> {
        self.lock().submit_move(side, mv)
    }

    pub fn reset_match(&self) {
        self.lock().reset_match()
    }

    pub fn snapshot(&self) -> MatchState {
        self.lock().snapshot()
    }

    pub fn legal_moves(&self, side: Side) -> Vec<Play> {
        self.lock().legal_moves(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BAR;
    use crate::dice::{RemainingDice, ScriptedDice};

    fn scripted(faces: impl IntoIterator<Item = u8>) -> Box<dyn DiceSource> {
        Box::new(ScriptedDice::new(faces))
    }

    fn seated(faces: impl IntoIterator<Item = u8>) -> Engine {
        let mut engine = Engine::with_dice(MatchConfig::default(), scripted(faces));
        engine.assign_player("alice".into()).unwrap();
        engine.assign_player("bob".into()).unwrap();
        engine
    }

    #[test]
    fn seats_fill_in_order_then_full() {
        let mut engine = Engine::with_dice(MatchConfig::default(), scripted([1]));
        assert_eq!(engine.assign_player("a".into()), Ok(Side::White));
        assert!(!engine.both_players_present());
        assert_eq!(engine.assign_player("b".into()), Ok(Side::Black));
        assert!(engine.both_players_present());
        assert_eq!(engine.assign_player("c".into()), Err(SeatError::MatchFull));
        assert_eq!(engine.assign_player("a".into()), Ok(Side::White));
    }

    #[test]
    fn removed_seat_is_reused() {
        let mut engine = seated([1]);
        assert_eq!(engine.remove_player(&"alice".into()), Ok(Side::White));
        assert_eq!(
            engine.remove_player(&"alice".into()),
            Err(SeatError::NotFound("alice".into()))
        );
        assert_eq!(engine.assign_player("carol".into()), Ok(Side::White));
    }

    #[test]
    fn begin_needs_two_players() {
        let mut engine = Engine::with_dice(MatchConfig::default(), scripted([6, 1]));
        engine.assign_player("a".into()).unwrap();
        let before = engine.snapshot();
        assert!(!engine.begin_match());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn opening_roll_seeds_first_turn() {
        let mut engine = seated([3, 3, 2, 5]);
        assert!(engine.begin_match());
        let state = engine.state();
        assert_eq!(state.phase, Phase::PlayerTurn);
        assert_eq!(state.current, Some(Side::Black));
        assert_eq!(state.dice, Some(DiceRoll::new(2, 5)));
        assert_eq!(state.remaining.values(), &[2, 5]);
        assert!(!engine.begin_match());
    }

    #[test]
    fn doubles_expand_to_four() {
        // Opening 6-1 for White, then Black rolls 5-5.
        let mut engine = seated([6, 1, 5, 5]);
        engine.begin_match();
        engine.submit_move(Side::White, Move::new(12, 18)).unwrap();
        engine.submit_move(Side::White, Move::new(17, 18)).unwrap();
        assert_eq!(engine.state().current, Some(Side::Black));

        let state = engine.roll_dice(Side::Black).unwrap();
        assert_eq!(state.remaining.values(), &[5, 5, 5, 5]);
    }

    #[test]
    fn distinct_roll_keeps_both_faces() {
        let mut engine = seated([6, 1, 6, 4]);
        engine.begin_match();
        engine.submit_move(Side::White, Move::new(12, 18)).unwrap();
        engine.submit_move(Side::White, Move::new(17, 18)).unwrap();
        let state = engine.roll_dice(Side::Black).unwrap();
        assert_eq!(state.remaining.values(), &[6, 4]);
    }

    #[test]
    fn preconditions_checked_before_rules() {
        let mut engine = seated([6, 1]);
        assert_eq!(
            engine.roll_dice(Side::White),
            Err(ActionError::WrongPhase(Phase::WaitingForPlayers))
        );
        engine.begin_match();
        assert_eq!(engine.roll_dice(Side::Black), Err(ActionError::NotYourTurn(Side::Black)));
        assert_eq!(engine.roll_dice(Side::White), Err(ActionError::DiceAlreadyRolled));
        assert_eq!(
            engine.submit_move(Side::Black, Move::new(24, 18)),
            Err(ActionError::NotYourTurn(Side::Black))
        );

        engine.submit_move(Side::White, Move::new(12, 18)).unwrap();
        engine.submit_move(Side::White, Move::new(17, 18)).unwrap();
        assert_eq!(
            engine.submit_move(Side::Black, Move::new(24, 18)),
            Err(ActionError::DiceNotRolled)
        );
    }

    #[test]
    fn rejected_move_changes_nothing() {
        let mut engine = seated([6, 1]);
        engine.begin_match();
        let before = engine.snapshot();
        let err = engine.submit_move(Side::White, Move::new(1, 6)).unwrap_err();
        assert_eq!(err, ActionError::Illegal(IllegalMove::DieUnavailable(5)));
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn bar_priority_end_to_end() {
        let board = Board::from_layout(&[(BAR, 1), (12, 5)], &[(6, 2), (13, 2)]).unwrap();
        let mut state = MatchState::in_turn(board, Side::White, DiceRoll::new(4, 4));
        state.remaining = RemainingDice::new([4]);
        let mut engine = Engine::from_state(state, scripted([1]));

        let err = engine.submit_move(Side::White, Move::new(12, 16)).unwrap_err();
        assert_eq!(err, ActionError::Illegal(IllegalMove::MustEnterFromBar));

        let state = engine.submit_move(Side::White, Move::new(BAR, 4)).unwrap();
        assert_eq!(state.board.bar_count(Side::White), 0);
        assert_eq!(state.board.count_for(4, Side::White), 1);
        assert_eq!(state.current, Some(Side::Black));
    }

    #[test]
    fn unplayable_roll_passes_turn() {
        // White on the bar against a closed board; Black then rolls 2-1.
        let board = Board::from_layout(
            &[(BAR, 1), (12, 2)],
            &[(1, 2), (2, 2), (3, 2), (4, 2), (5, 2), (6, 2)],
        )
        .unwrap();
        let mut state = MatchState::in_turn(board, Side::White, DiceRoll::new(3, 4));
        state.dice = None;
        state.remaining.clear();
        let mut engine = Engine::from_state(state, scripted([3, 4]));

        let state = engine.roll_dice(Side::White).unwrap();
        assert_eq!(state.current, Some(Side::Black));
        assert!(state.remaining.is_empty());
        assert!(state.dice.is_none());
    }

    #[test]
    fn last_bear_off_wins_and_locks_actions() {
        let board = Board::from_layout(&[(23, 1), (24, 1)], &[(1, 2)]).unwrap();
        let state = MatchState::in_turn(board, Side::White, DiceRoll::new(1, 2));
        let mut engine = Engine::from_state(state, scripted([1]));

        engine.submit_move(Side::White, Move::new(24, 25)).unwrap();
        let state = engine.submit_move(Side::White, Move::new(23, 25)).unwrap();
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.winner, Some(Side::White));
        assert_eq!(state.current, None);
        assert!(state.remaining.is_empty());

        for side in ALL_SIDES {
            assert_eq!(
                engine.roll_dice(side),
                Err(ActionError::WrongPhase(Phase::GameOver))
            );
            assert_eq!(
                engine.submit_move(side, Move::new(1, 2)),
                Err(ActionError::WrongPhase(Phase::GameOver))
            );
        }
    }

    #[test]
    fn reset_keeps_seats_and_clears_game() {
        let mut engine = seated([6, 1]);
        engine.begin_match();
        engine.submit_move(Side::White, Move::new(12, 18)).unwrap();
        engine.reset_match();

        let state = engine.state();
        assert_eq!(state.phase, Phase::WaitingForPlayers);
        assert_eq!(state.board, Board::standard());
        assert!(state.current.is_none());
        assert!(state.dice.is_none());
        assert!(engine.both_players_present());
        assert!(engine.begin_match());
    }

    #[test]
    fn legal_moves_only_for_side_to_play() {
        let mut engine = seated([6, 1]);
        assert!(engine.legal_moves(Side::White).is_empty());
        engine.begin_match();
        assert!(engine.legal_moves(Side::Black).is_empty());
        let plays = engine.legal_moves(Side::White);
        assert!(plays.iter().any(|p| p.mv == Move::new(12, 18) && p.die == 6));
        assert!(plays.iter().any(|p| p.mv == Move::new(17, 18) && p.die == 1));
    }

    #[test]
    fn shared_match_serializes_across_threads() {
        let shared = SharedMatch::new(Engine::with_dice(MatchConfig::default(), scripted([6, 1])));
        let handles: Vec<_> = ["alice", "bob", "carol"]
            .into_iter()
            .map(|name| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.assign_player(name.into()))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert!(results.contains(&Err(SeatError::MatchFull)));
        assert!(shared.begin_match());
        assert_eq!(shared.snapshot().current, Some(Side::White));
    }
}
