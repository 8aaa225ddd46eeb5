//! Error types for the `waggle-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type.

use waggle_types::Position;

use crate::grid::GridCoord;

/// Errors that can occur while querying or exchanging a knowledge map.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// No walk over known terrain connects the two positions.
    #[error("no route from {from} to {to}")]
    NoRoute {
        /// Start position.
        from: Position,
        /// Destination position.
        to: Position,
    },

    /// The destination cell has no vertex or was never reached.
    #[error("cell {0} is not reachable over known terrain")]
    Unreachable(GridCoord),

    /// A distance query started on a cell that is unknown or a wall.
    #[error("source cell {0} is not known traversable terrain")]
    SourceNotTraversable(GridCoord),

    /// Retracing hit a vertex whose predecessor does not lead anywhere.
    #[error("predecessor chain broken at cell {0}")]
    BrokenPredecessorChain(GridCoord),

    /// Two maps with different grid sizes cannot be merged.
    #[error("grid size mismatch: ours is {ours}, theirs is {theirs}")]
    GridSizeMismatch {
        /// Receiver's grid size.
        ours: usize,
        /// Snapshot's grid size.
        theirs: usize,
    },

    /// A grid size outside `1..=MAX_GRID_SIZE` was requested.
    #[error("invalid grid size: {0}")]
    InvalidGridSize(usize),

    /// A decoded snapshot violates a structural invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// The snapshot bytes could not be encoded or decoded.
    #[error("snapshot codec error: {source}")]
    Codec {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
