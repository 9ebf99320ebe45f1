//! Board representation and match-state types.
//!
//! Contains sides and their geometry, checker identities, move requests,
//! the board itself and the aggregate match state.

pub mod checker;
pub mod moves;
pub mod side;
pub mod state;

pub use checker::{Checker, CheckerId};
pub use moves::{Move, Source, Target};
pub use side::{Geometry, Side, ALL_SIDES, BAR, CHECKERS_PER_SIDE, POINT_COUNT};
pub use state::{Board, ConnectionToken, InvariantViolation, LayoutError, MatchState, Phase, Player};
