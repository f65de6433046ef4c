//! Starlane - star system catalogue and spatial query engine
//!
//! This library keeps an in-memory registry of star systems, the facilities
//! orbiting them, tradable commodities and per-facility market listings, and
//! answers "everything within N light-years of X" queries against tens of
//! thousands of systems.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   import: concurrent startup load, GOMD import │
//! ├──────────────────────────────────────────────┤
//! │   registry: SystemDatabase, SectorIndex,       │
//! │             VolumeQuery                        │
//! ├───────────────────────┬──────────────────────┤
//! │ store: tables, typed   │ container: GOMD       │
//! │ loaders, LogStore      │ reader / writer       │
//! ├───────────────────────┴──────────────────────┤
//! │   schema: typed messages + bincode codec       │
//! ├──────────────────────────────────────────────┤
//! │   entity records  │  geometry primitives       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use starlane::config::ConfigFile;
//! use starlane::import::load_database;
//! use starlane::store::Database;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigFile::load()?;
//! let database = Database::open(&config.database.path)?;
//! let (sdb, _summary) =
//!     load_database(&database, config.sector_shift(), config.error_filter()).await?;
//!
//! if let Some(sol) = sdb.get_system("Sol") {
//!     for hit in sdb.range_query(sol, 15.0)? {
//!         println!("{} {:.2}ly", hit.system.name(), hit.distance());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod container;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod import;
pub mod log;
pub mod logging;
pub mod registry;
pub mod schema;
pub mod store;

pub use error::{ErrorFilter, ErrorKind, FilterPolicy, RegistryError};
pub use registry::{RangeHit, SystemDatabase, UpdateOutcome, VolumeQuery};

/// Version of the Starlane library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
