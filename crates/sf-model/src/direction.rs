//! Compass ordering of the incoming segments and their signal phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Incoming road segment, identified by the compass direction it arrives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All segments in state-vector order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Position of this segment in a state vector.
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// Signal phase on which this segment gets green.
    pub fn phase(self) -> Phase {
        match self {
            Direction::North | Direction::South => Phase::NorthSouth,
            Direction::East | Direction::West => Phase::EastWest,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// One of the two phases of the signal cycle. Opposite directions share a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    NorthSouth,
    EastWest,
}

impl Phase {
    /// Fraction of the cycle this phase is green for a given control split.
    ///
    /// The split is the East/West share; North/South gets the remainder.
    pub fn weight(self, control: f64) -> f64 {
        match self {
            Phase::NorthSouth => 1.0 - control,
            Phase::EastWest => control,
        }
    }

    /// Segments served by this phase, in state-vector order.
    pub fn segments(self) -> [Direction; 2] {
        match self {
            Phase::NorthSouth => [Direction::North, Direction::South],
            Phase::EastWest => [Direction::East, Direction::West],
        }
    }
}
