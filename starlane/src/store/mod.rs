//! Persistent key-value tables and typed bulk loaders.
//!
//! A [`Database`] is a root directory holding one [`LogStore`] per table.
//! [`Table`] wraps any [`Store`] with a name and drives a [`TypedLoader`]
//! across every stored record, repairing the store when a record is fatally
//! bad.
//!
//! Keys are the 4-byte little-endian record id; values are schema-encoded
//! messages.

mod database;
mod loader;
mod log_store;
mod memory;
mod table;
mod r#trait;

pub use database::{Database, COMMODITIES_TABLE, FACILITIES_TABLE, LISTINGS_TABLE, SYSTEMS_TABLE};
pub use loader::{LoadAborted, LoadReport, LoaderFormat, TypedLoader};
pub use log_store::LogStore;
pub use memory::MemoryStore;
pub use table::Table;
pub use r#trait::{Store, StoreError};
