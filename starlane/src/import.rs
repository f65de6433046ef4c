//! Startup load and bulk import.
//!
//! [`load_database`] rebuilds a [`SystemDatabase`] from the on-disk tables.
//! Systems and facilities are loaded by one blocking task and commodities by
//! another; the two halves are joined once both finish, then stored listings
//! are applied.
//!
//! [`import_container`] feeds a GOMD container through the update-or-insert
//! path, writing accepted records back to the matching table.

use std::io::Read;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::container::{ContainerError, ContainerReader};
use crate::error::{ErrorFilter, RegistryError};
use crate::geometry::SectorShift;
use crate::registry::{Catalogue, Galaxy, SystemDatabase, UpdateOutcome};
use crate::schema::{
    CommodityMessage, FacilityListingMessage, FacilityMessage, MessageKind, SystemMessage,
};
use crate::store::{Database, LoadAborted, LoadReport, StoreError, TypedLoader};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Load(#[from] LoadAborted),

    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    #[error("{kind} import aborted after {completed} records: {source}")]
    Aborted {
        kind: MessageKind,
        completed: usize,
        source: RegistryError,
    },

    #[error("load task failed: {0}")]
    TaskFailed(String),
}

/// Per-table results of a startup load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub systems: LoadReport,
    pub facilities: LoadReport,
    pub commodities: LoadReport,
    pub listings: LoadReport,
}

impl LoadSummary {
    pub fn loaded(&self) -> usize {
        self.reports().map(|report| report.loaded).sum()
    }

    pub fn skipped(&self) -> usize {
        self.reports().map(|report| report.skipped).sum()
    }

    fn reports(&self) -> impl Iterator<Item = &LoadReport> {
        [&self.systems, &self.facilities, &self.commodities, &self.listings].into_iter()
    }
}

/// Counts from a container import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub kind: MessageKind,
    pub inserted: usize,
    pub updated: usize,
    pub stale: usize,
    /// Records whose error was demoted by the filter.
    pub skipped: usize,
}

impl ImportSummary {
    fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            inserted: 0,
            updated: 0,
            stale: 0,
            skipped: 0,
        }
    }

    fn record(&mut self, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::Inserted => self.inserted += 1,
            UpdateOutcome::Updated => self.updated += 1,
            UpdateOutcome::Stale => self.stale += 1,
        }
    }

    /// Records consumed, whatever their outcome.
    pub fn processed(&self) -> usize {
        self.inserted + self.updated + self.stale + self.skipped
    }
}

/// Build a registry from every table under `database`.
pub async fn load_database(
    database: &Database,
    shift: SectorShift,
    filter: ErrorFilter,
) -> Result<(SystemDatabase, LoadSummary), ImportError> {
    let galaxy_unit = {
        let database = database.clone();
        let filter = filter.clone();
        tokio::task::spawn_blocking(move || load_galaxy(&database, shift, &filter))
    };
    let catalogue_unit = {
        let database = database.clone();
        let filter = filter.clone();
        tokio::task::spawn_blocking(move || load_catalogue(&database, &filter))
    };

    let ((galaxy, systems, facilities), (catalogue, commodities)) =
        tokio::try_join!(join_unit(galaxy_unit), join_unit(catalogue_unit))?;

    let sdb = SystemDatabase::from_parts(galaxy, catalogue, filter.clone());
    let listings_unit = {
        let database = database.clone();
        tokio::task::spawn_blocking(move || load_listings(&database, sdb, &filter))
    };
    let (sdb, listings) = join_unit(listings_unit).await?;

    let summary = LoadSummary {
        systems,
        facilities,
        commodities,
        listings,
    };
    tracing::info!(
        loaded = summary.loaded(),
        skipped = summary.skipped(),
        sectors = sdb.sector_count(),
        "Database loaded"
    );
    Ok((sdb, summary))
}

async fn join_unit<T>(handle: JoinHandle<Result<T, ImportError>>) -> Result<T, ImportError> {
    handle
        .await
        .map_err(|e| ImportError::TaskFailed(e.to_string()))?
}

fn load_galaxy(
    database: &Database,
    shift: SectorShift,
    filter: &ErrorFilter,
) -> Result<(Galaxy, LoadReport, LoadReport), ImportError> {
    let mut galaxy = Galaxy::new(shift);

    let systems = {
        let mut table = database.systems()?;
        let mut loader = TypedLoader::schema(|item: SystemMessage| galaxy.new_system(&item));
        table.load_data(&mut loader, filter)?
    };
    let facilities = {
        let mut table = database.facilities()?;
        let mut loader = TypedLoader::schema(|item: FacilityMessage| galaxy.new_facility(&item));
        table.load_data(&mut loader, filter)?
    };

    Ok((galaxy, systems, facilities))
}

fn load_catalogue(
    database: &Database,
    filter: &ErrorFilter,
) -> Result<(Catalogue, LoadReport), ImportError> {
    let mut catalogue = Catalogue::new();
    let commodities = {
        let mut table = database.commodities()?;
        let mut loader =
            TypedLoader::schema(|item: CommodityMessage| catalogue.new_commodity(&item));
        table.load_data(&mut loader, filter)?
    };
    Ok((catalogue, commodities))
}

fn load_listings(
    database: &Database,
    mut sdb: SystemDatabase,
    filter: &ErrorFilter,
) -> Result<(SystemDatabase, LoadReport), ImportError> {
    let listings = {
        let mut table = database.listings()?;
        let mut loader =
            TypedLoader::schema(|item: FacilityListingMessage| sdb.new_listings(&item));
        table.load_data(&mut loader, filter)?
    };
    Ok((sdb, listings))
}

/// Apply every record of a container to `sdb`.
///
/// Errors the registry's filter demotes are counted as skipped. Any other
/// error stops the import; records applied before it stay applied.
pub fn import_container<R: Read>(
    sdb: &mut SystemDatabase,
    source: R,
    database: &Database,
) -> Result<ImportSummary, ImportError> {
    let mut reader = ContainerReader::open(source)?;
    let kind = reader.kind();
    let mut table = database.table_for(kind)?;
    let mut summary = ImportSummary::new(kind);

    let result = reader.read(|message, index| {
        match sdb.register_from_message(&message, &mut table) {
            Ok(outcome) => summary.record(outcome),
            Err(err) => {
                tracing::debug!(entry = index + 1, error = %err, "Import record rejected");
                sdb.filter().filter(err)?;
                summary.skipped += 1;
            }
        }
        Ok::<(), RegistryError>(())
    });

    if let Err(source) = result {
        return Err(ImportError::Aborted {
            kind,
            completed: summary.processed(),
            source,
        });
    }
    table.flush()?;

    tracing::info!(
        kind = %kind,
        inserted = summary.inserted,
        updated = summary.updated,
        stale = summary.stale,
        skipped = summary.skipped,
        "Imported container"
    );
    Ok(summary)
}
