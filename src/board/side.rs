//! Sides and their board geometry.
//!
//! Each side travels in a fixed direction, enters from the bar into the
//! opponent's home quadrant, and bears off past the far end of its own home
//! quadrant. All of that is captured once per side as a `Geometry` constant
//! instead of being re-derived at every call site.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Number of points on the board.
pub const POINT_COUNT: usize = 24;

/// Checkers each side owns.
pub const CHECKERS_PER_SIDE: usize = 15;

/// Move start value meaning "from the bar".
pub const BAR: u8 = 0;

/// A player's side and checker colour.
///
/// White moves from point 1 towards point 24, Black from 24 towards 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

/// Both sides in seat order.
pub const ALL_SIDES: [Side; 2] = [Side::White, Side::Black];

impl Side {
    /// Index into per-side arrays.
    pub const fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    pub const fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Returns the movement geometry for this side.
    pub fn geometry(self) -> &'static Geometry {
        match self {
            Side::White => &WHITE,
            Side::Black => &BLACK,
        }
    }

    /// Lowercase name used in the text protocol.
    pub const fn name(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }

    /// Parses a side from its lowercase name.
    pub fn from_name(s: &str) -> Option<Side> {
        match s {
            "white" | "w" => Some(Side::White),
            "black" | "b" => Some(Side::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-side movement data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    /// +1 when travelling towards higher points, -1 otherwise.
    pub direction: i8,
    /// The six points the side bears off from.
    pub home: RangeInclusive<u8>,
    /// The six points a bar checker may enter on (the opponent's home).
    pub entry: RangeInclusive<u8>,
    /// Move end value meaning "borne off".
    pub off: u8,
}

static WHITE: Geometry = Geometry {
    direction: 1,
    home: 19..=24,
    entry: 1..=6,
    off: 25,
};

static BLACK: Geometry = Geometry {
    direction: -1,
    home: 1..=6,
    entry: 19..=24,
    off: 0,
};

impl Geometry {
    pub fn is_home(&self, point: u8) -> bool {
        self.home.contains(&point)
    }

    /// Entry point reached from the bar with the given die.
    pub fn entry_point(&self, die: u8) -> u8 {
        if self.direction > 0 {
            die
        } else {
            25 - die
        }
    }

    /// Die needed to enter from the bar onto `point`.
    pub fn entry_die(&self, point: u8) -> u8 {
        if self.direction > 0 {
            point
        } else {
            25 - point
        }
    }

    /// Pips from `point` to the bear-off sentinel.
    pub fn distance_off(&self, point: u8) -> u8 {
        if self.direction > 0 {
            25 - point
        } else {
            point
        }
    }

    /// Point reached by moving `die` pips from `point`, or `None` when the
    /// move would leave the board past the bear-off edge.
    pub fn advance(&self, point: u8, die: u8) -> Option<u8> {
        let target = point as i16 + self.direction as i16 * die as i16;
        if (1..=POINT_COUNT as i16).contains(&target) {
            Some(target as u8)
        } else {
            None
        }
    }

    /// Returns true if moving from `start` to `end` follows the side's direction.
    pub fn is_forward(&self, start: u8, end: u8) -> bool {
        if self.direction > 0 {
            end > start
        } else {
            end < start
        }
    }

    /// Home points ordered from farthest to nearest the bear-off edge.
    pub fn home_farthest_first(&self) -> impl Iterator<Item = u8> {
        let (lo, hi) = (*self.home.start(), *self.home.end());
        let ascending = self.direction > 0;
        (lo..=hi).map(move |i| if ascending { i } else { hi + lo - i })
    }
}
