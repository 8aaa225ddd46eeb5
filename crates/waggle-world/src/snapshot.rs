//! Snapshot wire format for exchanging knowledge between agents.
//!
//! A snapshot is the JSON encoding of every cell, the sender's logical
//! position, and its navigation target. Decoding validates the structure
//! before a [`KnowledgeMap`] is rebuilt, so a malformed or hostile payload
//! can never violate the origin invariant of the receiver's map.

use serde::{Deserialize, Serialize};
use waggle_types::Position;

use crate::error::WorldError;
use crate::grid::{Grid, TileKnowledge};
use crate::knowledge_map::KnowledgeMap;

/// Wire format revision written by [`encode`] and required by [`decode`].
pub const SNAPSHOT_FORMAT: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format: u32,
    size: usize,
    position: Position,
    target: Position,
    cells: &'a [TileKnowledge],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    format: u32,
    size: usize,
    position: Position,
    target: Position,
    cells: Vec<TileKnowledge>,
}

/// Serialize a map into snapshot bytes.
///
/// # Errors
///
/// Returns [`WorldError::Codec`] if JSON serialization fails.
pub fn encode(map: &KnowledgeMap) -> Result<Vec<u8>, WorldError> {
    let wire = SnapshotRef {
        format: SNAPSHOT_FORMAT,
        size: map.size(),
        position: map.position(),
        target: map.target(),
        cells: map.grid().cells(),
    };
    Ok(serde_json::to_vec(&wire)?)
}

/// Rebuild a map from snapshot bytes.
///
/// # Errors
///
/// Returns [`WorldError::Codec`] for malformed JSON,
/// [`WorldError::InvalidSnapshot`] for an unsupported format or broken grid
/// invariants, and [`WorldError::InvalidGridSize`] for an out-of-range size.
pub fn decode(bytes: &[u8]) -> Result<KnowledgeMap, WorldError> {
    let wire: SnapshotOwned = serde_json::from_slice(bytes)?;
    if wire.format != SNAPSHOT_FORMAT {
        return Err(WorldError::InvalidSnapshot(format!(
            "unsupported snapshot format {}",
            wire.format
        )));
    }
    let grid = Grid::from_cells(wire.size, wire.cells)?;
    Ok(KnowledgeMap::from_parts(grid, wire.position, wire.target))
}
