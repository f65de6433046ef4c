//! Configuration file handling for `~/.starlane/starlane.ini`.
//!
//! Settings structs live in [`settings`], constants in [`defaults`],
//! parsing in `parser`, and serialization in `writer`.
//!
//! # Example
//!
//! ```
//! use starlane::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.sector_shift().bits(), 5);
//! assert!(!config.filter_policy().error_on_duplicate);
//! ```

pub mod defaults;
mod file;
mod parser;
pub mod settings;
mod writer;

pub use defaults::{config_directory, config_file_path};
pub use file::ConfigFileError;
pub use settings::{ConfigFile, DatabaseSettings, ImportSettings, IndexSettings, LoggingSettings};
