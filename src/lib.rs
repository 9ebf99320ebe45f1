//! Gammon: an authoritative backgammon match rules engine.
//!
//! Exposes the board model, dice, move validation and reachability, move
//! execution, the match controller and the text protocol used by the binary
//! entry point and integration tests.

pub mod board;
pub mod config;
pub mod dice;
pub mod engine;
pub mod movegen;
pub mod protocol;
pub mod resolve;

pub use board::{Board, ConnectionToken, MatchState, Move, Phase, Side};
pub use config::{ConfigError, MatchConfig};
pub use dice::{DiceRoll, DiceSource, RemainingDice, ScriptedDice};
pub use engine::{ActionError, Engine, SeatError, SharedMatch};
pub use movegen::{IllegalMove, Play};
