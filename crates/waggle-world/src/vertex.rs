//! Vertices of the per-query shortest-path graph.

use core::cmp::Ordering;

use waggle_types::Direction;

use crate::grid::GridCoord;

/// Distance sentinel for a vertex the search has not reached.
pub const UNREACHED: u32 = u32::MAX;

/// One known, traversable cell during a distance computation.
///
/// Built fresh for each query and dropped with its [`DistanceMap`].
///
/// [`DistanceMap`]: crate::distance::DistanceMap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    /// Storage coordinate of the cell.
    pub coord: GridCoord,
    /// Tentative distance from the query source, or [`UNREACHED`].
    pub distance: u32,
    /// Direction pointing back toward the vertex this one was reached from.
    /// Walking the plan means taking the opposite of this.
    pub predecessor: Option<Direction>,
    /// Food count copied from the grid when the vertex was built.
    pub food: u32,
}

impl Vertex {
    /// An unreached vertex with no predecessor.
    pub const fn new(coord: GridCoord, food: u32) -> Self {
        Self {
            coord,
            distance: UNREACHED,
            predecessor: None,
            food,
        }
    }

    /// Whether the search assigned a finite distance.
    pub const fn is_reached(&self) -> bool {
        self.distance != UNREACHED
    }

    /// Compare by tentative distance alone.
    pub fn cmp_distance(&self, other: &Self) -> Ordering {
        self.distance.cmp(&other.distance)
    }
}
