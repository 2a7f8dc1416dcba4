//! Error types for the Ledgergrid binary

use std::path::PathBuf;
use thiserror::Error;

/// Problems reading the user's configuration. These never stop the program:
/// they are reported as warnings and defaults are used instead.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Refusing to read {}: file too large ({size} bytes, max {max})", .path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{key} must be at least 1 (got {value}); using {fallback}")]
    OutOfRange {
        key: &'static str,
        value: usize,
        fallback: usize,
    },
}
