//! Sector grid keys.
//!
//! A [`SectorKey`] identifies a cubic cell of `2^shift` light-years on each
//! side. Each coordinate component is floored and then arithmetically
//! shifted, so negative positions land in negative cells rather than being
//! truncated towards zero.

use std::fmt;
use thiserror::Error;

use super::coordinate::Coordinate;

/// Default sector shift: 32 ly cells.
pub const DEFAULT_SECTOR_SHIFT: u32 = 5;

/// Errors raised while building geometry values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Sector shift outside the supported range
    #[error("Invalid sector shift: {0} (must be between {min} and {max})", min = SectorShift::MIN, max = SectorShift::MAX)]
    InvalidShift(u32),
}

/// Width of a sector cell expressed as a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectorShift(u32);

impl SectorShift {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 16;

    /// The fine-grained default (32 ly cells).
    pub const FINE: SectorShift = SectorShift(DEFAULT_SECTOR_SHIFT);

    /// The coarse alternative (128 ly cells).
    pub const COARSE: SectorShift = SectorShift(7);

    /// Validate and wrap a shift value.
    pub fn new(bits: u32) -> Result<Self, GeometryError> {
        if (Self::MIN..=Self::MAX).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(GeometryError::InvalidShift(bits))
        }
    }

    /// Number of bits each component is shifted by.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Edge length of one cell in light-years.
    #[inline]
    pub fn cell_width(self) -> f64 {
        (1u64 << self.0) as f64
    }
}

impl Default for SectorShift {
    fn default() -> Self {
        Self::FINE
    }
}

/// Coarse grid cell containing a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SectorKey {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl SectorKey {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Bucket a coordinate into its cell.
    pub fn from_coordinate(position: &Coordinate, shift: SectorShift) -> Self {
        Self {
            x: cell(position.x, shift),
            y: cell(position.y, shift),
            z: cell(position.z, shift),
        }
    }

    /// The key `(dx, dy, dz)` cells away from this one.
    #[inline]
    pub const fn offset(self, dx: i64, dy: i64, dz: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }
}

#[inline]
fn cell(component: f64, shift: SectorShift) -> i64 {
    (component.floor() as i64) >> shift.bits()
}

impl fmt::Display for SectorKey {
    /// Format as `[+x,+y,+z]` with explicit signs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:+},{:+},{:+}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(x: f64, y: f64, z: f64) -> SectorKey {
        Coordinate::new(x, y, z).sector_key(SectorShift::default())
    }

    #[test]
    fn test_origin_is_zero_key() {
        assert_eq!(key(0.0, 0.0, 0.0), SectorKey::new(0, 0, 0));
    }

    #[test]
    fn test_negative_component_uses_arithmetic_shift() {
        let k = key(-1.0, 1.0, 2.0);
        assert!(k.x < 0, "expected negative x, got {}", k);
        assert_eq!(k, SectorKey::new(-1, 0, 0));
    }

    #[test]
    fn test_fractional_negative_floors() {
        // -0.5 floors to -1, which must not truncate back to cell 0.
        assert_eq!(key(-0.5, 0.0, 0.0).x, -1);
    }

    #[test]
    fn test_cell_boundaries() {
        assert_eq!(key(31.999, 0.0, 0.0).x, 0);
        assert_eq!(key(32.0, 0.0, 0.0).x, 1);
        assert_eq!(key(-32.0, 0.0, 0.0).x, -1);
        assert_eq!(key(-32.001, 0.0, 0.0).x, -2);
    }

    #[test]
    fn test_coarse_shift() {
        let position = Coordinate::new(200.0, -200.0, 127.0);
        let k = position.sector_key(SectorShift::COARSE);
        assert_eq!(k, SectorKey::new(1, -2, 0));
    }

    #[test]
    fn test_shift_validation() {
        assert!(SectorShift::new(5).is_ok());
        assert!(SectorShift::new(7).is_ok());
        assert_eq!(SectorShift::new(0), Err(GeometryError::InvalidShift(0)));
        assert_eq!(SectorShift::new(17), Err(GeometryError::InvalidShift(17)));
    }

    #[test]
    fn test_cell_width() {
        assert_eq!(SectorShift::default().cell_width(), 32.0);
        assert_eq!(SectorShift::COARSE.cell_width(), 128.0);
    }

    #[test]
    fn test_offset() {
        let k = SectorKey::new(1, 2, 3).offset(-2, 0, 4);
        assert_eq!(k, SectorKey::new(-1, 2, 7));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", SectorKey::new(1, -2, 0)), "[+1,-2,+0]");
    }
}
