//! Shared boundary types for the Waggle agent core.
//!
//! These are the values exchanged between the knowledge map and whatever
//! game or environment hosts the agent: the four cardinal directions, logical
//! positions relative to the origin, and the per-direction observation seam.
//!
//! # Modules
//!
//! - [`direction`] -- Cardinal directions, unit offsets, and the canonical
//!   scan order used by every directional loop.
//! - [`position`] -- Unbounded logical coordinates relative to the origin.
//! - [`observation`] -- The [`Surroundings`] trait and the owned
//!   [`Observation`] implementor.

pub mod direction;
pub mod observation;
pub mod position;

// Re-export all public types at crate root for convenience.
pub use direction::{CANONICAL_ORDER, Direction};
pub use observation::{Observation, Surroundings, TileReading};
pub use position::Position;
