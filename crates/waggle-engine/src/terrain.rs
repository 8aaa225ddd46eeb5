//! Seeded ground-truth terrain for the survey harness.
//!
//! The terrain is the world the scouts cannot see directly. It answers
//! per-direction [`Surroundings`] queries at a logical position, wrapping
//! the same way the agents' maps do.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use waggle_core::config::SurveyConfig;
use waggle_types::{Direction, Position, Surroundings, TileReading};
use waggle_world::{MAX_GRID_SIZE, WorldError, to_physical};

/// One ground-truth cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Not traversable.
    Wall,
    /// Traversable, with this much food.
    Open {
        /// Food units on the cell.
        food: u32,
    },
}

/// A square toroidal world, row-major.
#[derive(Debug, Clone)]
pub struct Terrain {
    size: usize,
    cells: Vec<Cell>,
}

impl Terrain {
    /// Generate terrain from a seed.
    ///
    /// Each cell except the origin rolls once: below `wall_percent` it is a
    /// wall, below `wall_percent + food_percent` it holds `1..=max_food`
    /// food, otherwise it is open and empty. The origin is always open and
    /// empty.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGridSize`] for a size outside
    /// `1..=MAX_GRID_SIZE`.
    pub fn generate(size: usize, survey: &SurveyConfig) -> Result<Self, WorldError> {
        if size == 0 || size > MAX_GRID_SIZE {
            return Err(WorldError::InvalidGridSize(size));
        }
        let total = size
            .checked_mul(size)
            .ok_or(WorldError::InvalidGridSize(size))?;

        let mut rng = SmallRng::seed_from_u64(survey.seed);
        let wall_cut = survey.wall_percent;
        let food_cut = wall_cut.saturating_add(survey.food_percent);

        let cells = (0..total)
            .map(|slot| {
                if slot == 0 {
                    return Cell::Open { food: 0 };
                }
                let roll: u8 = rng.random_range(0..100);
                if roll < wall_cut {
                    Cell::Wall
                } else if roll < food_cut && survey.max_food > 0 {
                    Cell::Open {
                        food: rng.random_range(1..=survey.max_food),
                    }
                } else {
                    Cell::Open { food: 0 }
                }
            })
            .collect();

        Ok(Self { size, cells })
    }

    /// Side length.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The cell at a logical position.
    pub fn cell_at(&self, position: Position) -> Cell {
        let x = to_physical(position.x, self.size);
        let y = to_physical(position.y, self.size);
        y.checked_mul(self.size)
            .and_then(|row| row.checked_add(x))
            .and_then(|slot| self.cells.get(slot))
            .copied()
            .unwrap_or(Cell::Wall)
    }

    /// Whether a logical position can be walked onto.
    pub fn is_open(&self, position: Position) -> bool {
        matches!(self.cell_at(position), Cell::Open { .. })
    }

    /// Number of traversable cells.
    pub fn open_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Open { .. }))
            .count()
    }

    /// Number of walls.
    pub fn wall_cells(&self) -> usize {
        self.cells.len().saturating_sub(self.open_cells())
    }

    /// Total food on the map.
    pub fn total_food(&self) -> u64 {
        self.cells
            .iter()
            .map(|c| match c {
                Cell::Open { food } => u64::from(*food),
                Cell::Wall => 0,
            })
            .sum()
    }

    /// What an agent standing at `at` would see.
    pub const fn view(&self, at: Position) -> TerrainView<'_> {
        TerrainView { terrain: self, at }
    }

    /// Build terrain from text rows: `#` wall, a digit for food, anything
    /// else open and empty.
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        let size = rows.len();
        let cells = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|c| match c {
                '#' => Cell::Wall,
                c => Cell::Open {
                    food: c.to_digit(10).unwrap_or(0),
                },
            })
            .collect();
        Self { size, cells }
    }
}

/// [`Surroundings`] of one position on a [`Terrain`].
#[derive(Debug, Clone, Copy)]
pub struct TerrainView<'a> {
    terrain: &'a Terrain,
    at: Position,
}

impl Surroundings for TerrainView<'_> {
    fn reading(&self, direction: Direction) -> TileReading {
        match self.terrain.cell_at(self.at.step(direction)) {
            Cell::Wall => TileReading::WALL,
            Cell::Open { food } => TileReading::open(food),
        }
    }
}
