//! Error types for Ledgergrid core.

use ledgergrid_engine::EngineError;
use thiserror::Error;

/// Errors that can occur while editing, saving or loading a sheet
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No file path set")]
    NoFilePath,

    #[error("Cell {address}: {source}")]
    Load {
        address: String,
        #[source]
        source: EngineError,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
