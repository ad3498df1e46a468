use std::fmt;

use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: u32 = 12;

pub const MONTH_NAMES: [&str; MONTHS_PER_YEAR as usize] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar position of a turn. One turn is one month.
///
/// Turn 1 is January of `start_year`; month and year are always derived from
/// the turn counter so they can never drift apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurnDate {
    turn: u32,
    start_year: u32,
}

impl TurnDate {
    /// Create a date for `turn` (1-based) in a game that began in `start_year`.
    pub fn new(turn: u32, start_year: u32) -> Self {
        assert!(turn >= 1, "turn out of range: {turn}");
        Self { turn, start_year }
    }

    /// The first turn of a game.
    pub fn first(start_year: u32) -> Self {
        Self::new(1, start_year)
    }

    pub fn turn(self) -> u32 {
        self.turn
    }

    /// Zero-based month index (0 = January).
    pub fn month_index(self) -> u32 {
        (self.turn - 1) % MONTHS_PER_YEAR
    }

    pub fn month_name(self) -> &'static str {
        MONTH_NAMES[self.month_index() as usize]
    }

    pub fn year(self) -> u32 {
        self.start_year + (self.turn - 1) / MONTHS_PER_YEAR
    }

    /// The date one turn later.
    pub fn next(self) -> Self {
        Self::new(self.turn + 1, self.start_year)
    }
}

impl fmt::Display for TurnDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year())
    }
}
