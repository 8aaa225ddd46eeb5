//! Snapshot exchange between agents sharing a cell.
//!
//! Sending and receiving wrap [`waggle_world::snapshot`] with the target
//! bookkeeping around it. A sender either withholds its target (the peer
//! adopts the origin) or assigns the peer the nearest food, reserving one
//! unit in its own map. In both cases the sender's own target is the origin
//! afterwards, so a single request never commits two peers to the same
//! food.

use tracing::{debug, warn};
use waggle_types::Position;
use waggle_world::{KnowledgeMap, WorldError, snapshot};

/// Errors raised while exchanging snapshots.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The outgoing snapshot could not be encoded.
    #[error("failed to encode snapshot: {source}")]
    Encode {
        /// The underlying map error.
        source: WorldError,
    },

    /// The incoming bytes are not a valid snapshot.
    #[error("failed to decode snapshot: {source}")]
    Decode {
        /// The underlying map error.
        source: WorldError,
    },

    /// The decoded snapshot cannot be merged into the receiver's map.
    #[error("failed to merge snapshot: {source}")]
    Merge {
        /// The underlying map error.
        source: WorldError,
    },
}

/// What the sender tells the peer about where to go next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetDisclosure {
    /// Clear the target first; the peer receives the origin.
    #[default]
    Withhold,
    /// Pick the nearest reachable food and hand it to the peer.
    AssignFood,
}

/// Encode `map` for a peer.
///
/// With [`TargetDisclosure::AssignFood`] this runs
/// [`KnowledgeMap::suggest_food`] first, which decrements that cell's food
/// in the sender's map. When no food is reachable the sender's existing
/// target is sent unchanged.
///
/// # Errors
///
/// Returns [`ExchangeError::Encode`] if serialization fails. The sender's
/// target is cleared either way.
pub fn outgoing(
    map: &mut KnowledgeMap,
    disclosure: TargetDisclosure,
) -> Result<Vec<u8>, ExchangeError> {
    match disclosure {
        TargetDisclosure::Withhold => map.clear_target(),
        TargetDisclosure::AssignFood => {
            if map.suggest_food().is_none() {
                debug!("no reachable food to assign");
            }
        }
    }
    let sent_target = map.target();
    let encoded = snapshot::encode(map);
    map.clear_target();

    let bytes = encoded.map_err(|source| ExchangeError::Encode { source })?;
    debug!(bytes = bytes.len(), target = %sent_target, ?disclosure, "snapshot sent");
    Ok(bytes)
}

/// Decode a peer's snapshot and merge it into `map`.
///
/// Returns the peer's logical position as it reported it, so the caller can
/// tell, for example, whether the peer is standing on the origin.
///
/// # Errors
///
/// Returns [`ExchangeError::Decode`] for malformed or invalid bytes and
/// [`ExchangeError::Merge`] if the peer's grid size differs. The receiver's
/// map is untouched on error.
pub fn incoming(map: &mut KnowledgeMap, bytes: &[u8]) -> Result<Position, ExchangeError> {
    let peer = snapshot::decode(bytes).map_err(|source| {
        warn!(error = %source, bytes = bytes.len(), "rejected peer snapshot");
        ExchangeError::Decode { source }
    })?;
    map.merge(&peer)
        .map_err(|source| ExchangeError::Merge { source })?;
    Ok(peer.position())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use waggle_types::{Direction, Observation, TileReading};
    use waggle_world::TileKnowledge;

    use super::*;

    fn map_with_food_south(food: u32) -> KnowledgeMap {
        let mut map = KnowledgeMap::new();
        map.observe(
            &Observation::uniform(TileReading::open(0))
                .with(Direction::South, TileReading::open(food)),
        );
        map
    }

    #[test]
    fn withhold_sends_origin_target() {
        let mut sender = map_with_food_south(2);
        sender.set_target(Position::new(3, 3));
        let bytes = outgoing(&mut sender, TargetDisclosure::Withhold).unwrap();

        let mut receiver = KnowledgeMap::new();
        receiver.set_target(Position::new(9, 9));
        let peer = incoming(&mut receiver, &bytes).unwrap();
        assert_eq!(peer, Position::ORIGIN);
        assert_eq!(receiver.target(), Position::ORIGIN);
        assert_eq!(sender.target(), Position::ORIGIN);
        assert_eq!(receiver.knowledge_at(Position::new(0, 1)), TileKnowledge::Food(2));
    }

    #[test]
    fn assign_food_hands_out_target_and_reserves() {
        let mut sender = map_with_food_south(1);
        let bytes = outgoing(&mut sender, TargetDisclosure::AssignFood).unwrap();

        // Sender reserved the last unit and cleared its own target.
        assert_eq!(sender.knowledge_at(Position::new(0, 1)), TileKnowledge::Food(0));
        assert_eq!(sender.target(), Position::ORIGIN);

        let mut receiver = KnowledgeMap::new();
        incoming(&mut receiver, &bytes).unwrap();
        assert_eq!(receiver.target(), Position::new(0, 1));
    }

    #[test]
    fn second_assignment_of_last_unit_gets_nothing() {
        let mut sender = map_with_food_south(1);
        assert!(outgoing(&mut sender, TargetDisclosure::AssignFood).is_ok());
        let bytes = outgoing(&mut sender, TargetDisclosure::AssignFood).unwrap();

        let mut receiver = KnowledgeMap::new();
        receiver.set_target(Position::new(4, 4));
        incoming(&mut receiver, &bytes).unwrap();
        assert_eq!(receiver.target(), Position::ORIGIN);
    }

    #[test]
    fn encoded_target_is_visible_on_the_wire() {
        let mut sender = map_with_food_south(3);
        let bytes = outgoing(&mut sender, TargetDisclosure::AssignFood).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let coord = |axis| value.pointer(axis).and_then(serde_json::Value::as_i64);
        assert_eq!(coord("/target/x"), Some(0));
        assert_eq!(coord("/target/y"), Some(1));
    }

    #[test]
    fn incoming_reports_peer_position() {
        let mut sender = KnowledgeMap::new();
        sender.observe(&Observation::uniform(TileReading::open(0)));
        sender.apply_move(Direction::East);
        let bytes = outgoing(&mut sender, TargetDisclosure::Withhold).unwrap();

        let mut receiver = KnowledgeMap::new();
        assert_eq!(
            incoming(&mut receiver, &bytes).ok(),
            Some(Position::new(1, 0))
        );
    }

    #[test]
    fn garbage_is_decode_error_and_leaves_receiver() {
        let mut receiver = map_with_food_south(5);
        receiver.set_target(Position::new(2, 2));
        let before = receiver.clone();
        let result = incoming(&mut receiver, b"\x00\x01garbage");
        assert!(matches!(result, Err(ExchangeError::Decode { .. })));
        assert_eq!(receiver, before);
    }

    #[test]
    fn size_mismatch_is_merge_error() {
        let mut sender = KnowledgeMap::with_size(6).unwrap();
        let bytes = outgoing(&mut sender, TargetDisclosure::Withhold).unwrap();
        let mut receiver = KnowledgeMap::new();
        let result = incoming(&mut receiver, &bytes);
        assert!(matches!(
            result,
            Err(ExchangeError::Merge {
                source: WorldError::GridSizeMismatch { .. }
            })
        ));
    }
}
