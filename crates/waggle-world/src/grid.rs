//! Toroidal grid of tile knowledge.
//!
//! Logical positions are unbounded; storage is a fixed `size x size` square.
//! Every logical-to-storage conversion goes through [`to_physical`], which
//! uses the Euclidean remainder so negative coordinates wrap instead of
//! truncating toward zero.
//!
//! # Aliasing
//!
//! Two logical cells exactly `size` apart share one storage cell. The world
//! is assumed to fit within one grid period of any agent's traversal, so
//! this is an accepted approximation rather than an error condition.
//!
//! # Layout
//!
//! Cells are stored row-major: `y * size + x`. Iteration order everywhere in
//! this crate is row-major, which is what makes heuristic tie-breaking
//! reproducible.

use serde::{Deserialize, Serialize};
use waggle_types::{CANONICAL_ORDER, Direction, Position, TileReading};

use crate::error::WorldError;

/// Grid side used by [`Grid::default`] and the knowledge map's default.
pub const DEFAULT_GRID_SIZE: usize = 20;

/// Largest accepted grid side.
pub const MAX_GRID_SIZE: usize = 1024;

/// Reduce one logical axis component to a storage index in `[0, size)`.
///
/// Returns 0 for a zero `size`.
pub fn to_physical(logical: i64, size: usize) -> usize {
    let Ok(period) = i64::try_from(size) else {
        return 0;
    };
    if period == 0 {
        return 0;
    }
    usize::try_from(logical.rem_euclid(period)).unwrap_or(0)
}

/// A physical storage coordinate, always within `[0, size)` on both axes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridCoord {
    /// Column (east-west).
    pub x: usize,
    /// Row (north-south).
    pub y: usize,
}

impl GridCoord {
    /// Create a coordinate from its components.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The wrapped neighbor one step away in `direction`.
    pub const fn neighbor(self, direction: Direction, size: usize) -> Self {
        let last = size.saturating_sub(1);
        match direction {
            Direction::North => Self {
                x: self.x,
                y: wrap_back(self.y, last),
            },
            Direction::South => Self {
                x: self.x,
                y: wrap_forward(self.y, last),
            },
            Direction::East => Self {
                x: wrap_forward(self.x, last),
                y: self.y,
            },
            Direction::West => Self {
                x: wrap_back(self.x, last),
                y: self.y,
            },
        }
    }

    /// This coordinate read as a logical position.
    ///
    /// Storage indices are their own representatives under [`to_physical`],
    /// so the result maps straight back to `self`.
    pub fn as_position(self) -> Position {
        Position::new(
            i64::try_from(self.x).unwrap_or(0),
            i64::try_from(self.y).unwrap_or(0),
        )
    }
}

impl core::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

const fn wrap_back(value: usize, last: usize) -> usize {
    match value.checked_sub(1) {
        Some(v) => v,
        None => last,
    }
}

const fn wrap_forward(value: usize, last: usize) -> usize {
    if value >= last { 0 } else { value.saturating_add(1) }
}

/// What an agent knows about one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKnowledge {
    /// Never observed.
    #[default]
    Unknown,
    /// Observed and not traversable.
    Wall,
    /// The home cell. Never overwritten.
    Origin,
    /// Observed, traversable, holding this much food (0 is known-empty).
    Food(u32),
}

impl TileKnowledge {
    /// Classify a fresh reading.
    pub const fn from_reading(reading: TileReading) -> Self {
        if reading.traversable {
            Self::Food(reading.food)
        } else {
            Self::Wall
        }
    }

    /// Anything but [`TileKnowledge::Unknown`].
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Known and walkable: the origin or a food cell.
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Origin | Self::Food(_))
    }

    /// Food count, if this is a food cell.
    pub const fn food(self) -> Option<u32> {
        match self {
            Self::Food(n) => Some(n),
            Self::Unknown | Self::Wall | Self::Origin => None,
        }
    }

    /// The value a merge should write over `self` given a peer's `theirs`.
    ///
    /// Unknown adopts whatever the peer knows. Two food cells keep the lower
    /// count. Walls and the origin are never replaced.
    pub const fn merged_with(self, theirs: Self) -> Option<Self> {
        match (self, theirs) {
            (Self::Unknown, Self::Unknown) => None,
            (Self::Unknown, known) => Some(known),
            (Self::Food(ours), Self::Food(peer)) if peer < ours => Some(Self::Food(peer)),
            _ => None,
        }
    }
}

/// Fixed-size toroidal store of [`TileKnowledge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Side length.
    size: usize,
    /// Row-major cells, `size * size` long.
    cells: Vec<TileKnowledge>,
}

impl Grid {
    /// Create an all-unknown grid with the origin marked.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGridSize`] unless `1 <= size <= MAX_GRID_SIZE`.
    pub fn new(size: usize) -> Result<Self, WorldError> {
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(WorldError::InvalidGridSize(size));
        }
        Ok(Self::blank(size))
    }

    /// Rebuild a grid from decoded cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGridSize`] for a bad size and
    /// [`WorldError::InvalidSnapshot`] when the cell count is wrong or the
    /// origin cell is not [`TileKnowledge::Origin`].
    pub fn from_cells(size: usize, cells: Vec<TileKnowledge>) -> Result<Self, WorldError> {
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(WorldError::InvalidGridSize(size));
        }
        let expected = size.saturating_mul(size);
        if cells.len() != expected {
            return Err(WorldError::InvalidSnapshot(format!(
                "expected {expected} cells for size {size}, got {}",
                cells.len()
            )));
        }
        if cells.first() != Some(&TileKnowledge::Origin) {
            return Err(WorldError::InvalidSnapshot(String::from(
                "origin cell is not marked as origin",
            )));
        }
        if let Some(extra) = cells.iter().skip(1).position(|c| *c == TileKnowledge::Origin) {
            return Err(WorldError::InvalidSnapshot(format!(
                "second origin cell at offset {}",
                extra.saturating_add(1)
            )));
        }
        Ok(Self { size, cells })
    }

    /// Unchecked constructor for sizes already known to be valid.
    fn blank(size: usize) -> Self {
        let mut cells = vec![TileKnowledge::Unknown; size.saturating_mul(size)];
        if let Some(origin) = cells.first_mut() {
            *origin = TileKnowledge::Origin;
        }
        Self { size, cells }
    }

    /// Side length.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[TileKnowledge] {
        &self.cells
    }

    /// Storage coordinate of a logical position.
    pub fn coord_of(&self, position: Position) -> GridCoord {
        GridCoord::new(
            to_physical(position.x, self.size),
            to_physical(position.y, self.size),
        )
    }

    /// Row-major slot of a coordinate, if it lies in the grid.
    pub(crate) fn slot(&self, coord: GridCoord) -> Option<usize> {
        if coord.x >= self.size || coord.y >= self.size {
            return None;
        }
        coord.y.checked_mul(self.size)?.checked_add(coord.x)
    }

    /// Knowledge stored at a coordinate.
    pub fn get(&self, coord: GridCoord) -> Option<TileKnowledge> {
        self.slot(coord).and_then(|i| self.cells.get(i)).copied()
    }

    /// Knowledge at a logical position.
    pub fn at(&self, position: Position) -> TileKnowledge {
        self.get(self.coord_of(position)).unwrap_or_default()
    }

    /// Every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = GridCoord> + use<> {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| GridCoord::new(x, y)))
    }

    /// Every `(coordinate, knowledge)` pair in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, TileKnowledge)> + '_ {
        self.coords().zip(self.cells.iter().copied())
    }

    /// Write `knowledge` unless the cell is the origin.
    ///
    /// Returns `true` if the stored value changed.
    pub fn record(&mut self, coord: GridCoord, knowledge: TileKnowledge) -> bool {
        let Some(cell) = self.slot(coord).and_then(|i| self.cells.get_mut(i)) else {
            return false;
        };
        if *cell == TileKnowledge::Origin || *cell == knowledge {
            return false;
        }
        *cell = knowledge;
        true
    }

    /// Take one unit of food from a food cell. Never goes below zero.
    ///
    /// Returns `true` if a unit was taken.
    pub fn take_food(&mut self, coord: GridCoord) -> bool {
        let Some(cell) = self.slot(coord).and_then(|i| self.cells.get_mut(i)) else {
            return false;
        };
        match *cell {
            TileKnowledge::Food(n) if n > 0 => {
                *cell = TileKnowledge::Food(n.saturating_sub(1));
                true
            }
            _ => false,
        }
    }

    /// Whether any wrapped cardinal neighbor of `coord` is unknown.
    pub fn has_unknown_neighbor(&self, coord: GridCoord) -> bool {
        CANONICAL_ORDER.iter().any(|&d| {
            self.get(coord.neighbor(d, self.size)) == Some(TileKnowledge::Unknown)
        })
    }

    /// Number of cells that are not unknown.
    pub fn known_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_known()).count()
    }

    /// Apply the per-cell merge rule against a same-sized peer grid.
    ///
    /// Returns the number of cells that changed.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::GridSizeMismatch`] without touching any cell
    /// when the sizes differ.
    pub fn merge_from(&mut self, other: &Self) -> Result<usize, WorldError> {
        if self.size != other.size {
            return Err(WorldError::GridSizeMismatch {
                ours: self.size,
                theirs: other.size,
            });
        }
        let mut changed: usize = 0;
        for (ours, theirs) in self.cells.iter_mut().zip(other.cells.iter()) {
            if let Some(next) = ours.merged_with(*theirs) {
                *ours = next;
                changed = changed.saturating_add(1);
            }
        }
        Ok(changed)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::blank(DEFAULT_GRID_SIZE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn to_physical_is_periodic_and_in_range() {
        for size in [1_usize, 5, 20] {
            let period = i64::try_from(size).unwrap_or(1);
            for k in -60_i64..60 {
                let p = to_physical(k, size);
                assert!(p < size);
                assert_eq!(p, to_physical(k.saturating_add(period), size));
                assert_eq!(p, to_physical(k.saturating_sub(period), size));
            }
        }
    }

    #[test]
    fn negative_coordinates_wrap_not_truncate() {
        assert_eq!(to_physical(-1, 20), 19);
        assert_eq!(to_physical(-5, 20), 15);
        assert_eq!(to_physical(-20, 20), 0);
        assert_eq!(to_physical(-21, 20), 19);
    }

    #[test]
    fn to_physical_zero_size() {
        assert_eq!(to_physical(7, 0), 0);
    }

    #[test]
    fn coord_of_relative_position() {
        let grid = Grid::default();
        // One west, five north.
        assert_eq!(grid.coord_of(Position::new(-1, -5)), GridCoord::new(19, 15));
    }

    #[test]
    fn neighbor_wraps_both_axes() {
        let corner = GridCoord::new(0, 0);
        assert_eq!(corner.neighbor(Direction::North, 5), GridCoord::new(0, 4));
        assert_eq!(corner.neighbor(Direction::West, 5), GridCoord::new(4, 0));
        let far = GridCoord::new(4, 4);
        assert_eq!(far.neighbor(Direction::South, 5), GridCoord::new(4, 0));
        assert_eq!(far.neighbor(Direction::East, 5), GridCoord::new(0, 4));
    }

    #[test]
    fn neighbor_agrees_with_position_step() {
        let grid = Grid::new(7).unwrap();
        let start = Position::new(-3, 12);
        for d in CANONICAL_ORDER {
            assert_eq!(
                grid.coord_of(start).neighbor(d, 7),
                grid.coord_of(start.step(d))
            );
        }
    }

    #[test]
    fn new_grid_marks_only_origin() {
        let grid = Grid::new(4).unwrap();
        assert_eq!(grid.get(GridCoord::new(0, 0)), Some(TileKnowledge::Origin));
        assert_eq!(grid.known_count(), 1);
        assert_eq!(grid.cells().len(), 16);
    }

    #[test]
    fn invalid_sizes_rejected() {
        assert!(matches!(Grid::new(0), Err(WorldError::InvalidGridSize(0))));
        assert!(Grid::new(MAX_GRID_SIZE.saturating_add(1)).is_err());
        assert!(Grid::new(MAX_GRID_SIZE).is_ok());
    }

    #[test]
    fn record_refuses_origin() {
        let mut grid = Grid::default();
        assert!(!grid.record(GridCoord::new(0, 0), TileKnowledge::Wall));
        assert_eq!(grid.get(GridCoord::new(0, 0)), Some(TileKnowledge::Origin));
        assert!(grid.record(GridCoord::new(1, 0), TileKnowledge::Wall));
        assert!(!grid.record(GridCoord::new(1, 0), TileKnowledge::Wall));
    }

    #[test]
    fn take_food_stops_at_zero() {
        let mut grid = Grid::default();
        let c = GridCoord::new(2, 2);
        grid.record(c, TileKnowledge::Food(1));
        assert!(grid.take_food(c));
        assert!(!grid.take_food(c));
        assert_eq!(grid.get(c), Some(TileKnowledge::Food(0)));
        assert!(!grid.take_food(GridCoord::new(0, 0)));
    }

    #[test]
    fn merge_rule_table() {
        use TileKnowledge::{Food, Origin, Unknown, Wall};
        assert_eq!(Unknown.merged_with(Wall), Some(Wall));
        assert_eq!(Unknown.merged_with(Food(0)), Some(Food(0)));
        assert_eq!(Unknown.merged_with(Unknown), None);
        assert_eq!(Food(5).merged_with(Food(2)), Some(Food(2)));
        assert_eq!(Food(2).merged_with(Food(5)), None);
        assert_eq!(Food(2).merged_with(Unknown), None);
        assert_eq!(Food(2).merged_with(Wall), None);
        assert_eq!(Wall.merged_with(Food(0)), None);
        assert_eq!(Origin.merged_with(Food(0)), None);
    }

    #[test]
    fn merge_from_rejects_size_mismatch() {
        let mut ours = Grid::new(5).unwrap();
        let theirs = Grid::new(6).unwrap();
        let result = ours.merge_from(&theirs);
        assert!(matches!(
            result,
            Err(WorldError::GridSizeMismatch { ours: 5, theirs: 6 })
        ));
    }

    #[test]
    fn from_cells_validates() {
        let good = Grid::new(3).unwrap();
        assert!(Grid::from_cells(3, good.cells().to_vec()).is_ok());
        assert!(Grid::from_cells(3, vec![TileKnowledge::Origin; 4]).is_err());

        let mut no_origin = good.cells().to_vec();
        if let Some(first) = no_origin.first_mut() {
            *first = TileKnowledge::Wall;
        }
        assert!(matches!(
            Grid::from_cells(3, no_origin),
            Err(WorldError::InvalidSnapshot(_))
        ));

        let mut two_origins = good.cells().to_vec();
        if let Some(last) = two_origins.last_mut() {
            *last = TileKnowledge::Origin;
        }
        assert!(Grid::from_cells(3, two_origins).is_err());
    }

    #[test]
    fn frontier_detection() {
        let mut grid = Grid::new(3).unwrap();
        assert!(grid.has_unknown_neighbor(GridCoord::new(0, 0)));
        for c in grid.coords() {
            grid.record(c, TileKnowledge::Food(0));
        }
        assert!(!grid.has_unknown_neighbor(GridCoord::new(0, 0)));
    }
}
