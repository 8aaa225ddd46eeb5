//! One agent's knowledge of the world.
//!
//! A [`KnowledgeMap`] owns a toroidal [`Grid`] of tile knowledge, the agent's
//! current logical position, and a navigation target, all relative to the
//! origin at `(0, 0)`. It is created when the agent spawns, with every cell
//! unknown except the origin, and is mutated only by its owner:
//!
//! - [`observe`] writes fresh neighbor readings,
//! - [`apply_move`] tracks the agent's own steps,
//! - [`merge`] folds in a peer's decoded snapshot.
//!
//! Path queries ([`route`]) and the two heuristics ([`suggest_food`],
//! [`suggest_scout`]) each run a fresh [`DistanceMap`] computation.
//!
//! [`observe`]: KnowledgeMap::observe
//! [`apply_move`]: KnowledgeMap::apply_move
//! [`merge`]: KnowledgeMap::merge
//! [`route`]: KnowledgeMap::route
//! [`suggest_food`]: KnowledgeMap::suggest_food
//! [`suggest_scout`]: KnowledgeMap::suggest_scout

use tracing::{debug, trace, warn};
use waggle_types::{CANONICAL_ORDER, Direction, Position, Surroundings};

use crate::distance::{DistanceMap, Plan};
use crate::error::WorldError;
use crate::grid::{Grid, GridCoord, TileKnowledge};

/// An agent's private map, position, and navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeMap {
    grid: Grid,
    position: Position,
    target: Position,
}

impl KnowledgeMap {
    /// A fresh map of [`DEFAULT_GRID_SIZE`] with the agent at the origin.
    ///
    /// [`DEFAULT_GRID_SIZE`]: crate::grid::DEFAULT_GRID_SIZE
    pub fn new() -> Self {
        Self {
            grid: Grid::default(),
            position: Position::ORIGIN,
            target: Position::ORIGIN,
        }
    }

    /// A fresh map with a custom grid side.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidGridSize`] for a size outside
    /// `1..=MAX_GRID_SIZE`.
    ///
    /// [`MAX_GRID_SIZE`]: crate::grid::MAX_GRID_SIZE
    pub fn with_size(size: usize) -> Result<Self, WorldError> {
        Ok(Self {
            grid: Grid::new(size)?,
            position: Position::ORIGIN,
            target: Position::ORIGIN,
        })
    }

    /// Reassemble a map from decoded parts.
    pub(crate) const fn from_parts(grid: Grid, position: Position, target: Position) -> Self {
        Self {
            grid,
            position,
            target,
        }
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// The underlying grid.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Grid side length.
    pub const fn size(&self) -> usize {
        self.grid.size()
    }

    /// Current logical position.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current navigation target.
    pub const fn target(&self) -> Position {
        self.target
    }

    /// Point the navigation target somewhere explicitly.
    pub const fn set_target(&mut self, target: Position) {
        self.target = target;
    }

    /// Reset the navigation target to the origin.
    ///
    /// Callers do this before sending a snapshot they do not want the peer
    /// to act on.
    pub const fn clear_target(&mut self) {
        self.target = Position::ORIGIN;
    }

    /// Whether the agent is standing exactly on the origin.
    pub const fn at_origin(&self) -> bool {
        self.position.is_origin()
    }

    /// Whether the agent stands on the origin cell, from any lap of the
    /// torus.
    pub fn on_origin_cell(&self) -> bool {
        self.grid.coord_of(self.position) == GridCoord::default()
    }

    /// Knowledge of the cell at a logical position.
    pub fn knowledge_at(&self, position: Position) -> TileKnowledge {
        self.grid.at(position)
    }

    /// Number of cells that are no longer unknown.
    pub fn known_cells(&self) -> usize {
        self.grid.known_count()
    }

    // -------------------------------------------------------------------
    // Ingestion and movement
    // -------------------------------------------------------------------

    /// Record what the agent sees around its current position.
    ///
    /// Each direction is read once, in canonical order. Fresh readings
    /// overwrite any non-origin cell.
    pub fn observe<S: Surroundings + ?Sized>(&mut self, surroundings: &S) {
        for direction in CANONICAL_ORDER {
            let neighbor = self.position.step(direction);
            let knowledge = TileKnowledge::from_reading(surroundings.reading(direction));
            let coord = self.grid.coord_of(neighbor);
            if self.grid.record(coord, knowledge) {
                trace!(%direction, %coord, ?knowledge, "cell updated");
            }
        }
    }

    /// Track one step taken by the agent.
    pub const fn apply_move(&mut self, direction: Direction) {
        self.position = self.position.step(direction);
    }

    /// Whether a step in `direction` is allowed by current knowledge.
    ///
    /// Only a confirmed wall blocks; unknown cells are assumed open.
    pub fn can_move(&self, direction: Direction) -> bool {
        self.knowledge_at(self.position.step(direction)) != TileKnowledge::Wall
    }

    // -------------------------------------------------------------------
    // Merge
    // -------------------------------------------------------------------

    /// Fold a peer's snapshot into this map.
    ///
    /// The peer's target is adopted unconditionally. Each cell is replaced
    /// when ours is unknown, or when both hold food and the peer reports
    /// less; walls and the origin are never replaced. `other` is not
    /// modified. Returns the number of cells that changed.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::GridSizeMismatch`] if the grid sizes differ.
    /// The receiver is left untouched in that case.
    pub fn merge(&mut self, other: &Self) -> Result<usize, WorldError> {
        let changed = self.grid.merge_from(&other.grid)?;
        self.target = other.target;
        debug!(
            changed,
            target = %self.target,
            known = self.known_cells(),
            "merged peer snapshot"
        );
        Ok(changed)
    }

    // -------------------------------------------------------------------
    // Paths
    // -------------------------------------------------------------------

    /// Distances over known terrain from a logical position.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::SourceNotTraversable`] if the position maps to
    /// an unknown or wall cell.
    pub fn compute_distances(&self, source: Position) -> Result<DistanceMap, WorldError> {
        DistanceMap::compute(&self.grid, self.grid.coord_of(source))
    }

    /// Shortest known walk from `from` to `to`.
    ///
    /// The plan reflects current knowledge only. New observations may
    /// invalidate it, and callers should replan when a step turns out to be
    /// blocked.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoRoute`] if either endpoint is not known
    /// traversable terrain or no known walk connects them, and
    /// [`WorldError::BrokenPredecessorChain`] if retracing finds an
    /// inconsistent distance graph.
    pub fn route(&self, from: Position, to: Position) -> Result<Plan, WorldError> {
        let source = self.grid.coord_of(from);
        let destination = self.grid.coord_of(to);
        if source == destination {
            return Ok(Plan::new());
        }

        let no_route = WorldError::NoRoute { from, to };
        let distances = match DistanceMap::compute(&self.grid, source) {
            Ok(d) => d,
            Err(WorldError::SourceNotTraversable(_)) => return Err(no_route),
            Err(e) => return Err(e),
        };

        match distances.retrace(destination) {
            Ok(plan) => {
                debug!(%from, %to, steps = plan.len(), "route found");
                Ok(plan)
            }
            Err(WorldError::Unreachable(_)) => {
                debug!(%from, %to, "no route over known terrain");
                Err(no_route)
            }
            Err(e) => {
                warn!(%from, %to, error = %e, "route retrace failed");
                Err(e)
            }
        }
    }

    /// Shortest known walk from the current position to the origin.
    ///
    /// # Errors
    ///
    /// See [`KnowledgeMap::route`].
    pub fn route_to_origin(&self) -> Result<Plan, WorldError> {
        self.route(self.position, Position::ORIGIN)
    }

    /// Shortest known walk from the current position to the target.
    ///
    /// # Errors
    ///
    /// See [`KnowledgeMap::route`].
    pub fn route_to_target(&self) -> Result<Plan, WorldError> {
        self.route(self.position, self.target)
    }

    // -------------------------------------------------------------------
    // Heuristics
    // -------------------------------------------------------------------

    /// Target the nearest reachable cell with food and reserve one unit.
    ///
    /// Ties go to the first cell in row-major order. The chosen cell's food
    /// count is decremented in the live grid so a repeated call does not
    /// hand the same last unit to a second requester. Leaves the target
    /// unchanged and returns `None` when no reachable food is known.
    pub fn suggest_food(&mut self) -> Option<Position> {
        let distances = self.distances_from_here()?;
        let chosen = distances
            .reached()
            .filter(|v| v.food > 0)
            .min_by(|a, b| a.cmp_distance(b))?
            .coord;

        self.target = chosen.as_position();
        self.grid.take_food(chosen);
        debug!(target = %self.target, "food target reserved");
        Some(self.target)
    }

    /// Target the nearest reachable frontier cell.
    ///
    /// A frontier cell is known, traversable, and has at least one unknown
    /// neighbor. When none is reachable the target resets to the origin and
    /// `None` is returned.
    pub fn suggest_scout(&mut self) -> Option<Position> {
        let Some(distances) = self.distances_from_here() else {
            self.clear_target();
            return None;
        };
        let frontier = distances
            .reached()
            .filter(|v| self.grid.has_unknown_neighbor(v.coord))
            .min_by(|a, b| a.cmp_distance(b))
            .map(|v| v.coord);

        if let Some(coord) = frontier {
            self.target = coord.as_position();
            debug!(target = %self.target, "scout target chosen");
            Some(self.target)
        } else {
            self.clear_target();
            debug!("no reachable frontier, target reset to origin");
            None
        }
    }

    fn distances_from_here(&self) -> Option<DistanceMap> {
        match self.compute_distances(self.position) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(position = %self.position, error = %e, "heuristic source unusable");
                None
            }
        }
    }

    // -------------------------------------------------------------------
    // Debugging
    // -------------------------------------------------------------------

    /// Text picture of the grid, one row per line.
    ///
    /// `?` unknown, `X` wall, `O` origin, `*` food, space for known-empty.
    pub fn render(&self) -> String {
        let size = self.grid.size();
        let mut out = String::with_capacity(size.saturating_add(1).saturating_mul(size));
        for (coord, knowledge) in self.grid.iter() {
            out.push(match knowledge {
                TileKnowledge::Unknown => '?',
                TileKnowledge::Wall => 'X',
                TileKnowledge::Origin => 'O',
                TileKnowledge::Food(0) => ' ',
                TileKnowledge::Food(_) => '*',
            });
            if coord.x.saturating_add(1) == size {
                out.push('\n');
            }
        }
        out
    }
}

impl Default for KnowledgeMap {
    fn default() -> Self {
        Self::new()
    }
}
