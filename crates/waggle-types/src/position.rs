//! Logical positions relative to the origin.
//!
//! A [`Position`] is unbounded: it is never reduced modulo the grid size.
//! Reduction to a storage index happens only inside the knowledge map.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// A logical coordinate relative to the origin at `(0, 0)`.
///
/// `x` grows east, `y` grows south.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// East-west component.
    pub x: i64,
    /// North-south component.
    pub y: i64,
}

impl Position {
    /// The origin.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a position from its components.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The position one step away in `direction`.
    ///
    /// Saturates at the `i64` bounds instead of overflowing.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Whether this is the origin.
    pub const fn is_origin(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
