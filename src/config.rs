//! User configuration (`config.toml` in the platform config directory).
//!
//! ```toml
//! rows = 50
//! columns = 26
//! currency_symbol = "$"
//! date_format = "%Y-%m-%d"
//! sheet_name = "Sheet1"
//! ```

use crate::error::ConfigError;
use directories::ProjectDirs;
use ledgergrid_core::sheet::DEFAULT_SHEET_NAME;
use ledgergrid_engine::engine::{DEFAULT_COLUMNS, DEFAULT_ROWS, FormatOptions, GridBounds};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub rows: usize,
    pub columns: usize,
    pub currency_symbol: String,
    pub date_format: String,
    pub sheet_name: String,
}

impl Default for Config {
    fn default() -> Self {
        let format = FormatOptions::default();
        Config {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            currency_symbol: format.currency_symbol,
            date_format: format.date_format,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn bounds(&self) -> GridBounds {
        GridBounds::new(self.rows, self.columns)
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            currency_symbol: self.currency_symbol.clone(),
            date_format: self.date_format.clone(),
        }
    }

    /// Replace out-of-range sizes with the defaults.
    fn validate(mut self) -> (Self, Vec<ConfigError>) {
        let mut problems = Vec::new();
        if self.rows == 0 {
            problems.push(ConfigError::OutOfRange {
                key: "rows",
                value: self.rows,
                fallback: DEFAULT_ROWS,
            });
            self.rows = DEFAULT_ROWS;
        }
        if self.columns == 0 {
            problems.push(ConfigError::OutOfRange {
                key: "columns",
                value: self.columns,
                fallback: DEFAULT_COLUMNS,
            });
            self.columns = DEFAULT_COLUMNS;
        }
        (self, problems)
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "ledgergrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Read and parse one config file.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let meta = std::fs::metadata(path).map_err(io_err)?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(ConfigError::TooLarge {
            path: path.to_path_buf(),
            size: meta.len(),
            max: MAX_CONFIG_FILE_BYTES,
        });
    }
    let content = std::fs::read_to_string(path).map_err(io_err)?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the configuration, falling back to defaults on any problem.
///
/// An explicit `config_file` must exist; the per-user file is optional.
/// Returns the config plus human-readable warnings.
pub fn load_config(config_file: Option<&Path>, skip: bool) -> (Config, Vec<String>) {
    if skip {
        return (Config::default(), Vec::new());
    }
    let Some(path) = config_file.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), Vec::new());
    };

    if !path.exists() {
        let warnings = if config_file.is_some() {
            vec![ConfigError::NotFound(path).to_string()]
        } else {
            Vec::new()
        };
        return (Config::default(), warnings);
    }

    match read_config(&path) {
        Ok(config) => {
            let (config, problems) = config.validate();
            log::debug!("using config {}", path.display());
            (config, problems.iter().map(ToString::to_string).collect())
        }
        Err(err) => (Config::default(), vec![err.to_string()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "ledgergrid_config_{}_{}_{}_{:?}.toml",
            label,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            std::thread::current().id(),
        ))
    }

    struct Cleanup(PathBuf);
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let path = temp_path("partial");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "currency_symbol = \"€\"\nrows = 100\n").unwrap();

        let (config, warnings) = load_config(Some(&path), false);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.rows, 100);
        assert_eq!(config.columns, DEFAULT_COLUMNS);
        assert_eq!(config.format_options().currency_symbol, "€");
        assert_eq!(config.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_unknown_key_is_a_warning() {
        let path = temp_path("unknown");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "colour = \"blue\"\n").unwrap();

        let (config, warnings) = load_config(Some(&path), false);
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn test_zero_rows_falls_back() {
        let path = temp_path("zero");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "rows = 0\ncolumns = 4\n").unwrap();

        let (config, warnings) = load_config(Some(&path), false);
        assert_eq!(config.bounds(), GridBounds::new(DEFAULT_ROWS, 4));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_oversized_file_is_refused() {
        let path = temp_path("oversized");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "#".repeat(MAX_CONFIG_FILE_BYTES as usize + 1)).unwrap();

        match read_config(&path) {
            Err(ConfigError::TooLarge { size, .. }) => {
                assert_eq!(size, MAX_CONFIG_FILE_BYTES + 1)
            }
            other => panic!("expected too-large error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let path = temp_path("missing");
        let (config, warnings) = load_config(Some(&path), false);
        assert_eq!(config, Config::default());
        assert!(warnings[0].starts_with("Config file not found"));

        let (_, skipped) = load_config(Some(&path), true);
        assert!(skipped.is_empty());
    }
}
