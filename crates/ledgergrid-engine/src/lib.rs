//! ledgergrid_engine - Spreadsheet engine: addressing, formulas, evaluation, formatting.

pub mod builtins;
pub mod engine;
pub mod error;

pub use error::{EngineError, Result};
