//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[database]
; Directory holding the database/ tables (systems, facilities, commodities, listings)
path = {}

[import]
; Abort a load on a duplicate id or name instead of skipping the record
error_on_duplicate = {}
; Abort a load on a reference to an unknown system, facility or commodity
error_on_unknown = {}
; Log a NOTE line for every skipped record
show_warnings = {}

[index]
; Sector size as a power of two in light-years (1-16). 5 = 32ly, 7 = 128ly
sector_shift = {}

[logging]
directory = {}
file = {}
"#,
        path_to_string(&config.database.path),
        config.import.error_on_duplicate,
        config.import.error_on_unknown,
        config.import.show_warnings,
        config.index.sector_shift.bits(),
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Display a path, collapsing the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
