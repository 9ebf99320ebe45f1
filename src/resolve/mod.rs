//! Move execution and turn sequencing.
//!
//! `execute` moves checkers for an already validated move; `phase` owns the
//! opening roll and the end-of-turn bookkeeping.

pub mod execute;
pub mod phase;

pub use execute::{apply_move, execute, Applied};
pub use phase::{end_turn, finish_turn_if_stuck, opening_roll, start_turn};
