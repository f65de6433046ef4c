//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::geometry::SectorShift;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    if let Some(section) = ini.section(Some("database")) {
        if let Some(v) = section.get("path") {
            let v = v.trim();
            if !v.is_empty() {
                config.database.path = expand_tilde(v);
            }
        }
    }

    if let Some(section) = ini.section(Some("import")) {
        if let Some(v) = section.get("error_on_duplicate") {
            config.import.error_on_duplicate = parse_bool(v);
        }
        if let Some(v) = section.get("error_on_unknown") {
            config.import.error_on_unknown = parse_bool(v);
        }
        if let Some(v) = section.get("show_warnings") {
            config.import.show_warnings = parse_bool(v);
        }
    }

    if let Some(section) = ini.section(Some("index")) {
        if let Some(v) = section.get("sector_shift") {
            let invalid = || ConfigFileError::InvalidValue {
                section: "index".to_string(),
                key: "sector_shift".to_string(),
                value: v.to_string(),
                reason: format!(
                    "must be an integer between {} and {}",
                    SectorShift::MIN,
                    SectorShift::MAX
                ),
            };
            let bits: u32 = v.trim().parse().map_err(|_| invalid())?;
            config.index.sector_shift = SectorShift::new(bits).map_err(|_| invalid())?;
        }
    }

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() || v.contains(['/', '\\']) {
                return Err(ConfigFileError::InvalidValue {
                    section: "logging".to_string(),
                    key: "file".to_string(),
                    value: v.to_string(),
                    reason: "must be a plain file name".to_string(),
                });
            }
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("starlane.ini");
        std::fs::write(&path, content).unwrap();
        ConfigFile::load_from(&path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[import]
error_on_duplicate = yes

[index]
sector_shift = 7
"#,
        )
        .unwrap();

        assert!(config.import.error_on_duplicate);
        assert!(!config.import.error_on_unknown);
        assert_eq!(config.sector_shift(), SectorShift::COARSE);
        assert_eq!(config.logging, ConfigFile::default().logging);
    }

    #[test]
    fn test_sector_shift_out_of_range() {
        let err = load("[index]\nsector_shift = 20\n").unwrap_err();
        assert!(err.to_string().contains("sector_shift"));
        assert!(err.to_string().contains("between 1 and 16"));
    }

    #[test]
    fn test_sector_shift_not_a_number() {
        let err = load("[index]\nsector_shift = big\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));
    }

    #[test]
    fn test_log_file_must_be_plain_name() {
        let err = load("[logging]\nfile = logs/starlane.log\n").unwrap_err();
        assert!(err.to_string().contains("logging.file"));
    }

    #[test]
    fn test_database_path_tilde() {
        let config = load("[database]\npath = ~/galaxy\n").unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.database.path, home.join("galaxy"));
        }
    }

    #[test]
    fn test_parse_bool_values() {
        for v in ["true", "YES", " on ", "1"] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["false", "no", "off", "0", ""] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
    }
}
