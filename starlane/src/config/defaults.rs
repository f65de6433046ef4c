//! Default values and the `ConfigFile::default()` implementation.

use std::path::PathBuf;

use super::settings::*;
use crate::geometry::SectorShift;

pub const CONFIG_DIR_NAME: &str = ".starlane";
pub const CONFIG_FILE_NAME: &str = "starlane.ini";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "starlane.log";

/// The config directory (`~/.starlane`).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// The config file (`~/.starlane/starlane.ini`).
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = config_directory();
        Self {
            database: DatabaseSettings {
                path: config_dir.join(DEFAULT_DATA_DIR),
            },
            import: ImportSettings {
                error_on_duplicate: false,
                error_on_unknown: false,
                show_warnings: false,
            },
            index: IndexSettings {
                sector_shift: SectorShift::default(),
            },
            logging: LoggingSettings {
                directory: config_dir.join(DEFAULT_LOG_DIR),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}
