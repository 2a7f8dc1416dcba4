//! The cell store: one sheet's cells, their dependency graph and computed
//! values.

mod ops;
mod recalc;

use ledgergrid_engine::engine::{
    Address, Cell, DeclaredType, FormatOptions, GridBounds, Style,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default sheet name for new documents.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// The persisted part of a cell: what the user typed plus display metadata.
///
/// `value` and `type` are accepted as older spellings of `rawContent` and
/// `declaredType`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    #[serde(default, alias = "value")]
    pub raw_content: String,
    #[serde(default, alias = "type")]
    pub declared_type: DeclaredType,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
}

impl CellRecord {
    pub fn new(raw_content: impl Into<String>) -> Self {
        CellRecord {
            raw_content: raw_content.into(),
            ..CellRecord::default()
        }
    }

    pub fn with_type(mut self, declared_type: DeclaredType) -> Self {
        self.declared_type = declared_type;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl From<&Cell> for CellRecord {
    fn from(cell: &Cell) -> Self {
        CellRecord {
            raw_content: cell.raw.clone(),
            declared_type: cell.declared_type,
            style: cell.style.clone(),
        }
    }
}

/// A named grid of cells with a fixed size.
///
/// Every edit goes through the sheet, which keeps the reverse dependency map
/// current and recomputes affected cells before returning.
#[derive(Clone, Debug)]
pub struct Sheet {
    name: String,
    bounds: GridBounds,
    cells: HashMap<Address, Cell>,
    /// Reverse dependency map: cell -> cells that read it
    dependents: HashMap<Address, HashSet<Address>>,
    format: FormatOptions,
}

impl Sheet {
    pub fn new(name: impl Into<String>, bounds: GridBounds) -> Self {
        Sheet {
            name: name.into(),
            bounds,
            cells: HashMap::new(),
            dependents: HashMap::new(),
            format: FormatOptions::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn format_options(&self) -> &FormatOptions {
        &self.format
    }

    /// Display settings only; computed values are unaffected.
    pub fn set_format_options(&mut self, format: FormatOptions) {
        self.format = format;
    }

    /// Rebuild the reverse dependency map from the cells.
    pub(crate) fn rebuild_dependents(&mut self) {
        self.dependents.clear();
        for (addr, cell) in &self.cells {
            for dep in &cell.depends_on {
                self.dependents.entry(*dep).or_default().insert(*addr);
            }
        }
    }

    fn link(&mut self, addr: Address, deps: &[Address]) {
        for dep in deps {
            self.dependents.entry(*dep).or_default().insert(addr);
        }
    }

    fn unlink(&mut self, addr: Address, deps: &[Address]) {
        for dep in deps {
            if let Some(set) = self.dependents.get_mut(dep) {
                set.remove(&addr);
                if set.is_empty() {
                    self.dependents.remove(dep);
                }
            }
        }
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::new(DEFAULT_SHEET_NAME, GridBounds::default())
    }
}
