//! Move requests.
//!
//! A move is the raw `(start, end)` pair the external layer submits. Start
//! `0` is the bar; end `25` (White) or `0` (Black) is the bear-off sentinel.
//! `Source` and `Target` are the side-aware readings of those numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::side::{Side, BAR, POINT_COUNT};

/// A requested single-checker move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub start: u8,
    pub end: u8,
}

impl Move {
    pub const fn new(start: u8, end: u8) -> Self {
        Move { start, end }
    }

    /// Returns true if both numbers are within the encodable range.
    pub fn in_range(self) -> bool {
        self.start as usize <= POINT_COUNT && self.end as usize <= POINT_COUNT + 1
    }

    /// Where the checker comes from.
    pub fn source(self) -> Source {
        if self.start == BAR {
            Source::Bar
        } else {
            Source::Point(self.start)
        }
    }

    /// Where the checker goes, read for the moving side.
    ///
    /// The opponent's sentinel (0 for White, 25 for Black) is neither a point
    /// nor the side's bear-off and reads as `Target::Nowhere`.
    pub fn target(self, side: Side) -> Target {
        if self.end == side.geometry().off {
            Target::Off
        } else if (1..=POINT_COUNT as u8).contains(&self.end) {
            Target::Point(self.end)
        } else {
            Target::Nowhere
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

/// Origin of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Bar,
    Point(u8),
}

/// Destination of a move for a particular side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Point(u8),
    Off,
    Nowhere,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_start_reads_as_bar() {
        assert_eq!(Move::new(0, 4).source(), Source::Bar);
        assert_eq!(Move::new(7, 4).source(), Source::Point(7));
    }

    #[test]
    fn sentinels_depend_on_side() {
        let white_off = Move::new(22, 25);
        assert_eq!(white_off.target(Side::White), Target::Off);
        assert_eq!(white_off.target(Side::Black), Target::Nowhere);

        let black_off = Move::new(3, 0);
        assert_eq!(black_off.target(Side::Black), Target::Off);
        assert_eq!(black_off.target(Side::White), Target::Nowhere);
    }

    #[test]
    fn range_check() {
        assert!(Move::new(24, 25).in_range());
        assert!(!Move::new(25, 20).in_range());
        assert!(!Move::new(3, 26).in_range());
    }

    #[test]
    fn display_uses_slash() {
        assert_eq!(Move::new(13, 8).to_string(), "13/8");
    }
}
