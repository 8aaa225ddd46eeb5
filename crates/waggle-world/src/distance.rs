//! Single-source shortest paths over known terrain.
//!
//! [`DistanceMap::compute`] runs Dijkstra's algorithm with unit edge weights
//! over the four wrapped cardinal neighbors of every known, traversable
//! cell. Unknown cells and walls get no vertex at all.
//!
//! # Queue
//!
//! The priority queue is a [`BinaryHeap`] with lazy invalidation: an
//! improved vertex is pushed again and the stale entry is skipped when it
//! surfaces. Entries with equal distance pop in insertion order, and
//! neighbors are relaxed in [`CANONICAL_ORDER`], so the first improvement in
//! canonical order fixes the predecessor and equal-cost alternatives found
//! later never replace it.
//!
//! # Cost
//!
//! Every query allocates a vertex slot per grid cell. Knowledge changes
//! after nearly every observation, so nothing is cached between queries.

use std::collections::{BinaryHeap, VecDeque};

use core::cmp::Ordering;

use waggle_types::{CANONICAL_ORDER, Direction};

use crate::error::WorldError;
use crate::grid::{Grid, GridCoord, TileKnowledge};
use crate::vertex::Vertex;

/// A walk as a sequence of directions, consumed front to back.
pub type Plan = VecDeque<Direction>;

/// Heap entry. Orders as a min-heap on distance, then insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    distance: u32,
    sequence: u64,
    coord: GridCoord,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .cmp(&self.distance)
            .then_with(|| other.sequence.cmp(&self.sequence))
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of one distance query: a vertex slot per grid cell.
#[derive(Debug, Clone)]
pub struct DistanceMap {
    size: usize,
    source: GridCoord,
    vertices: Vec<Option<Vertex>>,
}

impl DistanceMap {
    /// Compute distances from `source` over the known terrain in `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SourceNotTraversable`] if `source` is unknown,
    /// a wall, or outside the grid.
    pub fn compute(grid: &Grid, source: GridCoord) -> Result<Self, WorldError> {
        let vertices = grid
            .iter()
            .map(|(coord, knowledge)| match knowledge {
                TileKnowledge::Unknown | TileKnowledge::Wall => None,
                TileKnowledge::Origin => Some(Vertex::new(coord, 0)),
                TileKnowledge::Food(n) => Some(Vertex::new(coord, n)),
            })
            .collect();

        let mut map = Self {
            size: grid.size(),
            source,
            vertices,
        };

        let Some(start) = map.get_mut(source) else {
            return Err(WorldError::SourceNotTraversable(source));
        };
        start.distance = 0;

        let mut sequence: u64 = 0;
        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry {
            distance: 0,
            sequence,
            coord: source,
        });

        while let Some(entry) = queue.pop() {
            let current = match map.get(entry.coord) {
                Some(v) if v.distance == entry.distance => *v,
                _ => continue, // stale
            };
            let next_distance = current.distance.saturating_add(1);

            for direction in CANONICAL_ORDER {
                let neighbor = current.coord.neighbor(direction, map.size);
                let Some(vertex) = map.get_mut(neighbor) else {
                    continue;
                };
                if next_distance < vertex.distance {
                    vertex.distance = next_distance;
                    vertex.predecessor = Some(direction.opposite());
                    sequence = sequence.saturating_add(1);
                    queue.push(QueueEntry {
                        distance: next_distance,
                        sequence,
                        coord: neighbor,
                    });
                }
            }
        }

        Ok(map)
    }

    /// The query source.
    pub const fn source(&self) -> GridCoord {
        self.source
    }

    /// Vertex at `coord`, if that cell is known traversable terrain.
    pub fn get(&self, coord: GridCoord) -> Option<&Vertex> {
        let slot = self.slot(coord)?;
        self.vertices.get(slot)?.as_ref()
    }

    fn get_mut(&mut self, coord: GridCoord) -> Option<&mut Vertex> {
        let slot = self.slot(coord)?;
        self.vertices.get_mut(slot)?.as_mut()
    }

    fn slot(&self, coord: GridCoord) -> Option<usize> {
        if coord.x >= self.size || coord.y >= self.size {
            return None;
        }
        coord.y.checked_mul(self.size)?.checked_add(coord.x)
    }

    /// Every vertex in row-major order, reached or not.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().flatten()
    }

    /// Vertices the search reached, in row-major order.
    pub fn reached(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices().filter(|v| v.is_reached())
    }

    /// Distance to `coord`, if it was reached.
    pub fn distance_to(&self, coord: GridCoord) -> Option<u32> {
        self.get(coord).filter(|v| v.is_reached()).map(|v| v.distance)
    }

    /// Walk the predecessor chain from `destination` back to the source.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Unreachable`] if `destination` has no vertex or
    /// was not reached, and [`WorldError::BrokenPredecessorChain`] if a
    /// predecessor points at a missing vertex or the chain does not end.
    pub fn retrace(&self, destination: GridCoord) -> Result<Plan, WorldError> {
        let mut current = *self
            .get(destination)
            .filter(|v| v.is_reached())
            .ok_or(WorldError::Unreachable(destination))?;

        let mut plan = Plan::new();
        while current.coord != self.source {
            if plan.len() >= self.vertices.len() {
                return Err(WorldError::BrokenPredecessorChain(current.coord));
            }
            let Some(back) = current.predecessor else {
                return Err(WorldError::BrokenPredecessorChain(current.coord));
            };
            plan.push_front(back.opposite());
            let previous = current.coord.neighbor(back, self.size);
            current = *self
                .get(previous)
                .ok_or(WorldError::BrokenPredecessorChain(previous))?;
        }
        Ok(plan)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Grid of `size` with every cell known-empty except the origin.
    fn open_grid(size: usize) -> Grid {
        let mut grid = Grid::new(size).unwrap();
        for c in grid.coords() {
            grid.record(c, TileKnowledge::Food(0));
        }
        grid
    }

    #[test]
    fn source_distance_is_zero() {
        let grid = open_grid(5);
        let map = DistanceMap::compute(&grid, GridCoord::new(2, 2)).unwrap();
        assert_eq!(map.distance_to(GridCoord::new(2, 2)), Some(0));
    }

    #[test]
    fn distances_wrap_around() {
        let grid = open_grid(5);
        let map = DistanceMap::compute(&grid, GridCoord::new(0, 0)).unwrap();
        // (4, 4) is one step west and one step north across the seam.
        assert_eq!(map.distance_to(GridCoord::new(4, 4)), Some(2));
        assert_eq!(map.distance_to(GridCoord::new(2, 2)), Some(4));
        assert_eq!(map.distance_to(GridCoord::new(3, 0)), Some(2));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let grid = Grid::new(5).unwrap();
        let result = DistanceMap::compute(&grid, GridCoord::new(1, 1));
        assert!(matches!(
            result,
            Err(WorldError::SourceNotTraversable(c)) if c == GridCoord::new(1, 1)
        ));
    }

    #[test]
    fn walls_and_unknown_have_no_vertex() {
        let mut grid = Grid::new(5).unwrap();
        grid.record(GridCoord::new(1, 0), TileKnowledge::Wall);
        grid.record(GridCoord::new(0, 1), TileKnowledge::Food(2));
        let map = DistanceMap::compute(&grid, GridCoord::new(0, 0)).unwrap();
        assert!(map.get(GridCoord::new(1, 0)).is_none());
        assert!(map.get(GridCoord::new(3, 3)).is_none());
        assert_eq!(map.get(GridCoord::new(0, 1)).map(|v| v.food), Some(2));
        assert_eq!(map.vertices().count(), 2);
    }

    #[test]
    fn unreached_island_stays_unreached() {
        let mut grid = Grid::new(7).unwrap();
        grid.record(GridCoord::new(3, 3), TileKnowledge::Food(1));
        let map = DistanceMap::compute(&grid, GridCoord::new(0, 0)).unwrap();
        assert!(map.get(GridCoord::new(3, 3)).is_some());
        assert_eq!(map.distance_to(GridCoord::new(3, 3)), None);
        assert!(matches!(
            map.retrace(GridCoord::new(3, 3)),
            Err(WorldError::Unreachable(_))
        ));
    }

    #[test]
    fn predecessor_follows_canonical_order() {
        // From (1, 1), the cell (2, 2) is reachable via (1, 2) or (2, 1) at
        // equal cost. (2, 1) is discovered first (East comes before South),
        // and it is popped first, so it relaxes (2, 2) with South and the
        // predecessor points North.
        let grid = open_grid(5);
        let map = DistanceMap::compute(&grid, GridCoord::new(1, 1)).unwrap();
        let v = map.get(GridCoord::new(2, 2)).copied();
        assert_eq!(v.map(|v| v.distance), Some(2));
        assert_eq!(v.and_then(|v| v.predecessor), Some(Direction::North));
    }

    #[test]
    fn retrace_source_is_empty() {
        let grid = open_grid(3);
        let map = DistanceMap::compute(&grid, GridCoord::new(1, 1)).unwrap();
        assert_eq!(map.retrace(GridCoord::new(1, 1)).ok(), Some(Plan::new()));
    }

    #[test]
    fn retrace_detects_broken_chain() {
        let grid = open_grid(3);
        let mut map = DistanceMap::compute(&grid, GridCoord::new(0, 0)).unwrap();
        if let Some(v) = map.get_mut(GridCoord::new(2, 2)) {
            v.predecessor = None;
        }
        assert!(matches!(
            map.retrace(GridCoord::new(2, 2)),
            Err(WorldError::BrokenPredecessorChain(_))
        ));
    }

    #[test]
    fn retrace_detects_cycle() {
        let grid = open_grid(3);
        let mut map = DistanceMap::compute(&grid, GridCoord::new(0, 0)).unwrap();
        // Two vertices pointing at each other never reach the source.
        if let Some(v) = map.get_mut(GridCoord::new(1, 1)) {
            v.predecessor = Some(Direction::East);
        }
        if let Some(v) = map.get_mut(GridCoord::new(2, 1)) {
            v.predecessor = Some(Direction::West);
        }
        assert!(matches!(
            map.retrace(GridCoord::new(1, 1)),
            Err(WorldError::BrokenPredecessorChain(_))
        ));
    }

    #[test]
    fn queue_pops_lowest_distance_then_oldest() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry {
            distance: 3,
            sequence: 0,
            coord: GridCoord::new(0, 0),
        });
        heap.push(QueueEntry {
            distance: 1,
            sequence: 2,
            coord: GridCoord::new(1, 0),
        });
        heap.push(QueueEntry {
            distance: 1,
            sequence: 1,
            coord: GridCoord::new(2, 0),
        });
        let order: Vec<GridCoord> = std::iter::from_fn(|| heap.pop().map(|e| e.coord)).collect();
        assert_eq!(
            order,
            vec![
                GridCoord::new(2, 0),
                GridCoord::new(1, 0),
                GridCoord::new(0, 0)
            ]
        );
    }
}
