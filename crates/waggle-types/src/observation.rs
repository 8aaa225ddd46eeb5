//! Per-direction observation input.
//!
//! The host environment tells the agent, for each cardinal neighbor, whether
//! it can be walked onto and how much food lies there. Nothing else about a
//! tile is interpreted by the knowledge core.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// What the agent sees on one adjacent tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileReading {
    /// Whether the tile can be walked onto.
    pub traversable: bool,
    /// Food on the tile. Ignored when the tile is not traversable.
    pub food: u32,
}

impl TileReading {
    /// A non-traversable tile.
    pub const WALL: Self = Self {
        traversable: false,
        food: 0,
    };

    /// A traversable tile holding `food` units.
    pub const fn open(food: u32) -> Self {
        Self {
            traversable: true,
            food,
        }
    }
}

/// Source of per-direction tile readings.
///
/// Implemented by whatever hosts the agent. The knowledge map queries each
/// direction once per observation.
pub trait Surroundings {
    /// Reading for the tile adjacent in `direction`.
    fn reading(&self, direction: Direction) -> TileReading;
}

/// An owned snapshot of all four neighbor readings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Readings indexed by [`Direction::canonical_index`].
    readings: [TileReading; 4],
}

impl Observation {
    /// An observation where every neighbor gives the same reading.
    pub const fn uniform(reading: TileReading) -> Self {
        Self {
            readings: [reading; 4],
        }
    }

    /// Replace the reading in one direction.
    #[must_use]
    pub fn with(mut self, direction: Direction, reading: TileReading) -> Self {
        if let Some(slot) = self.readings.get_mut(direction.canonical_index()) {
            *slot = reading;
        }
        self
    }
}

impl Surroundings for Observation {
    fn reading(&self, direction: Direction) -> TileReading {
        self.readings
            .get(direction.canonical_index())
            .copied()
            .unwrap_or(TileReading::WALL)
    }
}
