//! Entity registry and spatial query engine.
//!
//! # Example
//!
//! ```
//! use starlane::entity::{DbEntity, System};
//! use starlane::geometry::Coordinate;
//! use starlane::SystemDatabase;
//!
//! let mut sdb = SystemDatabase::default();
//! for (id, name, x, y) in [(1, "Sol", 0.0, 0.0), (2, "Alpha", 3.0, 4.0), (3, "Far", 100.0, 0.0)] {
//!     let entity = DbEntity::new(id, name).unwrap();
//!     sdb.register_system(System::new(entity, Coordinate::new(x, y, 0.0))).unwrap();
//! }
//!
//! let sol = sdb.get_system("sol").unwrap();
//! let names: Vec<&str> = sdb
//!     .range_query(sol, 5.0)
//!     .unwrap()
//!     .iter()
//!     .map(|hit| hit.system.name())
//!     .collect();
//! assert_eq!(names, ["Sol", "Alpha"]);
//! ```

mod database;
mod query;
mod sectors;
mod update;

pub use database::{Catalogue, Galaxy, SystemDatabase};
pub use query::{RangeHit, SectorKeys, VolumeQuery, MAX_SECTOR_RADIUS};
pub use sectors::SectorIndex;
pub use update::UpdateOutcome;
