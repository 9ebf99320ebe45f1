//! Text notation for match snapshots and plays.
//!
//! A snapshot renders as one `key value` line per field, ending with
//! `end`, so a reader can consume it without knowing how many lines follow:
//!
//! ```text
//! phase player_turn
//! turn white
//! dice 6-1
//! remaining 6,1
//! white alice bar 0 off 0 pips 167
//! black bob bar 0 off 0 pips 167
//! points 1:w2 6:b5 8:b3 12:w5 13:b5 17:w3 19:w5 24:b2
//! winner -
//! end
//! ```
//!
//! Points are listed low to high as `<point>:<side letter><count>`; empty
//! points are omitted. An empty seat shows as `-`.

use std::fmt::Write as _;

use crate::board::{Board, MatchState, Side, ALL_SIDES, POINT_COUNT};
use crate::movegen::Play;

fn side_letter(side: Side) -> char {
    match side {
        Side::White => 'w',
        Side::Black => 'b',
    }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// Encodes the occupied points, e.g. `1:w2 6:b5`.
pub fn encode_points(board: &Board) -> String {
    let mut out = String::new();
    for point in 1..=POINT_COUNT as u8 {
        let Some(owner) = board.owner_at(point) else {
            continue;
        };
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{}:{}{}", point, side_letter(owner), board.count_at(point));
    }
    out
}

/// Renders a full snapshot as text.
pub fn format_snapshot(state: &MatchState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "phase {}", state.phase);
    let _ = writeln!(out, "turn {}", or_dash(state.current.map(|s| s.to_string())));
    let _ = writeln!(out, "dice {}", or_dash(state.dice.map(|d| d.to_string())));
    let _ = writeln!(out, "remaining {}", state.remaining);
    for side in ALL_SIDES {
        let seat = or_dash(state.player(side).map(|p| p.token.to_string()));
        let _ = writeln!(
            out,
            "{} {} bar {} off {} pips {}",
            side,
            seat,
            state.board.bar_count(side),
            state.board.borne_off_count(side),
            state.board.pip_count(side),
        );
    }
    let _ = writeln!(out, "points {}", encode_points(&state.board));
    let _ = writeln!(out, "winner {}", or_dash(state.winner.map(|s| s.to_string())));
    out.push_str("end");
    out
}

/// Formats plays as `start/end(die)` separated by spaces; `-` when empty.
pub fn format_plays(plays: &[Play]) -> String {
    if plays.is_empty() {
        return "-".to_string();
    }
    plays
        .iter()
        .map(|p| format!("{}({})", p.mv, p.die))
        .collect::<Vec<_>>()
        .join(" ")
}
