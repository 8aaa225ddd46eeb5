//! Knowledge representation and navigation for the Waggle agent core.
//!
//! This crate models what one agent knows about a toroidal grid world it
//! can only partially observe: a fixed-size grid of tile knowledge indexed by
//! unbounded logical coordinates, shortest paths over the known terrain, the
//! peer merge rule, and the nearest-food and nearest-frontier heuristics.
//!
//! # Modules
//!
//! - [`distance`] -- Dijkstra over known terrain and path retracing.
//! - [`error`] -- Error types for map queries and snapshot exchange.
//! - [`grid`] -- The toroidal grid, its index function, and
//!   [`TileKnowledge`].
//! - [`knowledge_map`] -- [`KnowledgeMap`]: observation, movement, merge,
//!   routing, and target heuristics.
//! - [`snapshot`] -- JSON snapshot encoding with validation on decode.
//! - [`vertex`] -- Per-query shortest-path vertices.
//!
//! [`TileKnowledge`]: grid::TileKnowledge
//! [`KnowledgeMap`]: knowledge_map::KnowledgeMap

pub mod distance;
pub mod error;
pub mod grid;
pub mod knowledge_map;
pub mod snapshot;
pub mod vertex;

// Re-export primary types at crate root.
pub use distance::{DistanceMap, Plan};
pub use error::WorldError;
pub use grid::{DEFAULT_GRID_SIZE, Grid, GridCoord, MAX_GRID_SIZE, TileKnowledge, to_physical};
pub use knowledge_map::KnowledgeMap;
pub use vertex::{UNREACHED, Vertex};
