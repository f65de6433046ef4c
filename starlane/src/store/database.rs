//! Database root directory.

use std::path::{Path, PathBuf};

use crate::schema::MessageKind;

use super::log_store::LogStore;
use super::r#trait::StoreError;
use super::table::Table;

pub const SYSTEMS_TABLE: &str = "systems";
pub const FACILITIES_TABLE: &str = "facilities";
pub const COMMODITIES_TABLE: &str = "commodities";
pub const LISTINGS_TABLE: &str = "listings";

/// Root of the on-disk tables: `<path>/database/<table>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    root: PathBuf,
}

impl Database {
    /// Open the database under `path`, creating the directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().join("database");
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open a table by name.
    ///
    /// A table has at most one open handle. Opening it again before the
    /// first handle is dropped fails with [`StoreError::Locked`].
    pub fn table(&self, name: &str) -> Result<Table, StoreError> {
        let store = LogStore::open(self.root.join(name))?;
        Ok(Table::new(name, store))
    }

    pub fn systems(&self) -> Result<Table, StoreError> {
        self.table(SYSTEMS_TABLE)
    }

    pub fn facilities(&self) -> Result<Table, StoreError> {
        self.table(FACILITIES_TABLE)
    }

    pub fn commodities(&self) -> Result<Table, StoreError> {
        self.table(COMMODITIES_TABLE)
    }

    pub fn listings(&self) -> Result<Table, StoreError> {
        self.table(LISTINGS_TABLE)
    }

    /// The table messages of `kind` are stored in.
    pub fn table_for(&self, kind: MessageKind) -> Result<Table, StoreError> {
        match kind {
            MessageKind::Commodity => self.commodities(),
            MessageKind::System => self.systems(),
            MessageKind::Facility => self.facilities(),
            MessageKind::FacilityListing => self.listings(),
        }
    }
}
