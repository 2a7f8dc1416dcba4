//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`Address`], [`GridBounds`] - A1 notation and the grid's extent
//! - [`Cell`], [`CellType`], [`DeclaredType`], [`Style`] - Per-cell storage
//! - [`parse_formula`] - Formula text to [`Expr`]
//! - [`evaluate`] - Compute an [`Expr`] against a [`CellSource`]
//! - [`extract_dependencies`] - Cells a formula reads
//! - [`detect_cycle`], [`evaluation_order`] - Circular references and ordering
//! - [`display`] - Format cells for the grid

mod ast;
mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod format;
mod parser;
mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use cell::{Cell, CellType, DeclaredType, Style, TextAlign};
pub use cell_ref::{Address, DEFAULT_COLUMNS, DEFAULT_ROWS, GridBounds};
pub use cycle::{Component, detect_cycle, evaluation_order};
pub use deps::{MAX_DEPENDENCY_RANGE_CELLS, cells_in_range, extract_dependencies};
pub use eval::{CellSource, binary, compare, evaluate};
pub use format::{
    FormatOptions, display, format_currency, format_date_text, format_number, format_percentage,
    format_serial_date,
};
pub use parser::parse_formula;
pub use value::{ErrorValue, Value, format_general, parse_numeral};
