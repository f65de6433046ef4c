//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;

use crate::geometry::SectorShift;

/// Complete configuration loaded from `starlane.ini`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub database: DatabaseSettings,
    pub import: ImportSettings,
    pub index: IndexSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSettings {
    /// Directory holding the `database/` tables.
    pub path: PathBuf,
}

/// Which load errors abort rather than warn.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub error_on_duplicate: bool,
    pub error_on_unknown: bool,
    pub show_warnings: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSettings {
    /// Sector size as a power of two in light-years.
    pub sector_shift: SectorShift,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}
