//! JSON sheet files.
//!
//! ```json
//! {
//!   "name": "Sheet1",
//!   "rowCount": 50,
//!   "columnCount": 26,
//!   "cells": {
//!     "A1": { "rawContent": "Cash", "declaredType": "text" },
//!     "B1": { "rawContent": "10000", "declaredType": "currency" }
//!   }
//! }
//! ```
//!
//! Only what the user entered is stored; computed values are rebuilt on load.

use crate::error::Result;
use crate::sheet::{CellRecord, DEFAULT_SHEET_NAME, Sheet};
use ledgergrid_engine::engine::{DEFAULT_COLUMNS, DEFAULT_ROWS, GridBounds};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk form of a sheet. Cells are written row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetFile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_rows", alias = "rows")]
    pub row_count: usize,
    #[serde(default = "default_columns", alias = "columns")]
    pub column_count: usize,
    #[serde(default, with = "cell_map")]
    pub cells: Vec<(String, CellRecord)>,
}

fn default_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

fn default_rows() -> usize {
    DEFAULT_ROWS
}

fn default_columns() -> usize {
    DEFAULT_COLUMNS
}

mod cell_map {
    use super::CellRecord;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        cells: &[(String, CellRecord)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(cells.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, CellRecord)>, D::Error> {
        let map = BTreeMap::<String, CellRecord>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

impl SheetFile {
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let bounds = sheet.bounds();
        SheetFile {
            name: sheet.name().to_string(),
            row_count: bounds.rows,
            column_count: bounds.columns,
            cells: sheet
                .records()
                .into_iter()
                .map(|(addr, record)| (addr.to_string(), record))
                .collect(),
        }
    }

    /// Build the sheet: replay every cell, then one full recalculation.
    pub fn into_sheet(self) -> Result<Sheet> {
        let mut sheet = Sheet::new(self.name, GridBounds::new(self.row_count, self.column_count));
        sheet.replace_cells(self.cells)?;
        Ok(sheet)
    }
}

/// Write a sheet to a JSON file
pub fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let content = write_sheet_content(sheet)?;
    fs::write(path, content)?;
    Ok(())
}

/// Write a sheet to a JSON string
pub fn write_sheet_content(sheet: &Sheet) -> Result<String> {
    let mut content = serde_json::to_string_pretty(&SheetFile::from_sheet(sheet))?;
    content.push('\n');
    Ok(content)
}

/// Read a sheet from a JSON file
pub fn parse_sheet(path: &Path) -> Result<Sheet> {
    let content = fs::read_to_string(path)?;
    parse_sheet_content(&content)
}

pub fn parse_sheet_content(content: &str) -> Result<Sheet> {
    let file: SheetFile = serde_json::from_str(content)?;
    file.into_sheet()
}
