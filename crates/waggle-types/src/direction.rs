//! Cardinal directions.
//!
//! Coordinates follow the convention x grows east and y grows south, so
//! North is `(0, -1)`. Every loop over directions in the workspace uses
//! [`CANONICAL_ORDER`] so tie-breaking downstream is reproducible.

use serde::{Deserialize, Serialize};

/// One of the four cardinal directions an agent can observe or move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward negative y.
    North,
    /// Toward positive x.
    East,
    /// Toward positive y.
    South,
    /// Toward negative x.
    West,
}

/// The fixed scan order: North, East, South, West.
pub const CANONICAL_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// Unit logical displacement `(dx, dy)` for this direction.
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// The direction pointing the other way.
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Position of this direction within [`CANONICAL_ORDER`].
    pub const fn canonical_index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        };
        f.write_str(name)
    }
}
