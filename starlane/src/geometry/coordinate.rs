//! Galactic coordinate type.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::sector::{SectorKey, SectorShift};
use super::square::SquareFloat;

/// A position in the galaxy, in light-years.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    /// Create a coordinate from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared straight-line distance to another coordinate.
    #[inline]
    pub fn distance_sq(&self, other: &Coordinate) -> SquareFloat {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        SquareFloat::from_squared(dx * dx + dy * dy + dz * dz)
    }

    /// The sector cell this coordinate falls into.
    #[inline]
    pub fn sector_key(&self, shift: SectorShift) -> SectorKey {
        SectorKey::from_coordinate(self, shift)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Anything with a fixed position in the galaxy.
pub trait Positioned {
    fn position(&self) -> Coordinate;
}

impl Positioned for Coordinate {
    fn position(&self) -> Coordinate {
        *self
    }
}

/// Squared distance between two positioned things.
pub fn distance_sq(a: &impl Positioned, b: &impl Positioned) -> SquareFloat {
    a.position().distance_sq(&b.position())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_sq_pythagorean() {
        let a = Coordinate::new(0.0, 0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance_sq(&b).value(), 25.0);
        assert_eq!(a.distance_sq(&b).root(), 5.0);
    }

    #[test]
    fn test_distance_sq_is_symmetric() {
        let a = Coordinate::new(-12.5, 7.25, 3.0);
        let b = Coordinate::new(100.0, -2.0, 44.5);
        assert_eq!(a.distance_sq(&b), b.distance_sq(&a));
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let a = Coordinate::new(1.5, -2.5, 3.5);
        assert_eq!(a.distance_sq(&a).value(), 0.0);
    }

    #[test]
    fn test_free_distance_sq_uses_positions() {
        let a = Coordinate::new(1.0, 2.0, 2.0);
        assert_eq!(distance_sq(&a, &Coordinate::default()).root(), 3.0);
    }

    #[test]
    fn test_display() {
        let a = Coordinate::new(1.0, -2.5, 0.125);
        assert_eq!(format!("{}", a), "(1.000, -2.500, 0.125)");
    }
}
