//! Text protocol for the `gammon` binary.
//!
//! Parses line commands and renders snapshots and plays as text. The engine
//! itself never touches this module.

pub mod notation;
pub mod parser;

pub use notation::{encode_points, format_plays, format_snapshot};
pub use parser::{parse_command, Command};
