//! ledgergrid-core - UI-agnostic sheet model, selection and storage.

pub mod document;
pub mod error;
pub mod selection;
pub mod sheet;
pub mod storage;
pub mod template;

pub use document::Document;
pub use error::{LedgerError, Result};
pub use selection::{Direction, Selection};
pub use sheet::{CellRecord, Sheet};
pub use template::Template;

pub use ledgergrid_engine::engine::Address;
