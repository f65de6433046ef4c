//! Geometry primitives for galactic positions.
//!
//! Positions are [`Coordinate`]s in light-years. Distances are compared in
//! squared form ([`SquareFloat`]) so a square root is only taken when a real
//! distance has to be shown. The galaxy is bucketed into cubic cells keyed by
//! [`SectorKey`]; cell arithmetic happens in integer grid units
//! ([`SquareInt`]), which is a distinct type from the float domain.
//!
//! # Example
//!
//! ```
//! use starlane::geometry::{Coordinate, SectorKey, SectorShift};
//!
//! let sol = Coordinate::new(0.0, 0.0, 0.0);
//! let alpha = Coordinate::new(3.0, 4.0, 0.0);
//!
//! assert_eq!(sol.distance_sq(&alpha).root(), 5.0);
//! assert_eq!(sol.sector_key(SectorShift::default()), SectorKey::new(0, 0, 0));
//! ```

mod coordinate;
mod sector;
mod square;

pub use coordinate::{distance_sq, Coordinate, Positioned};
pub use sector::{GeometryError, SectorKey, SectorShift, DEFAULT_SECTOR_SHIFT};
pub use square::{SquareFloat, SquareInt};
