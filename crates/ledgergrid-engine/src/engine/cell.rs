//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`CellType`] - What the raw content parsed to (empty, text, number, or formula)
//! - [`DeclaredType`] - How the value should be displayed
//! - [`Style`] - Display-only attributes carried along for the UI
//! - [`Cell`] - A cell with raw content, dependencies, and cached evaluation state

use serde::{Deserialize, Serialize};

use super::ast::Expr;
use super::cell_ref::{Address, GridBounds};
use super::deps::extract_dependencies;
use super::parser::parse_formula;
use super::value::{Value, parse_numeral};
use crate::error::Result;

/// Display category of a cell. Only affects formatting, never computation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredType {
    #[default]
    Text,
    Number,
    Currency,
    Percentage,
    Date,
}

impl DeclaredType {
    pub const ALL: [DeclaredType; 5] = [
        DeclaredType::Text,
        DeclaredType::Number,
        DeclaredType::Currency,
        DeclaredType::Percentage,
        DeclaredType::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeclaredType::Text => "text",
            DeclaredType::Number => "number",
            DeclaredType::Currency => "currency",
            DeclaredType::Percentage => "percentage",
            DeclaredType::Date => "date",
        }
    }
}

impl std::str::FromStr for DeclaredType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DeclaredType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown cell type: {}", s))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Display-only attributes; irrelevant to computation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

impl Style {
    pub fn is_empty(&self) -> bool {
        *self == Style::default()
    }

    pub fn bold() -> Style {
        Style {
            font_weight: Some("bold".to_string()),
            ..Style::default()
        }
    }
}

/// What a cell's raw content parsed to.
#[derive(Clone, Debug, PartialEq)]
pub enum CellType {
    Empty,
    Text(String),
    Number(f64),
    Formula(Expr),
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Exactly what the user typed.
    pub raw: String,
    pub declared_type: DeclaredType,
    pub style: Style,
    pub contents: CellType,
    pub depends_on: Vec<Address>,
    /// Last computed value; only meaningful while `stale` is false.
    pub computed: Value,
    pub stale: bool,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell {
            raw: String::new(),
            declared_type: DeclaredType::Text,
            style: Style::default(),
            contents: CellType::Empty,
            depends_on: vec![],
            computed: Value::Empty,
            stale: false,
        }
    }

    /// Parse raw input and create a stale cell with default metadata.
    /// - Empty string or whitespace -> Empty
    /// - Starts with '=' -> Formula (references resolved against `bounds`)
    /// - Valid numeral -> Number
    /// - Otherwise -> Text, kept verbatim
    pub fn from_input(input: &str, bounds: &GridBounds) -> Result<Cell> {
        let mut cell = Cell::new_empty();
        cell.set_raw(input, bounds)?;
        Ok(cell)
    }

    /// Replace the raw content, keeping type and style. On a parse failure the
    /// cell is left untouched.
    pub fn set_raw(&mut self, input: &str, bounds: &GridBounds) -> Result<()> {
        let contents = parse_contents(input, bounds)?;
        self.depends_on = match &contents {
            CellType::Formula(expr) => extract_dependencies(expr),
            _ => Vec::new(),
        };
        self.raw = input.to_string();
        self.contents = contents;
        self.computed = Value::Empty;
        self.stale = true;
        Ok(())
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.contents, CellType::Formula(_))
    }

    /// Value of a non-formula cell; formulas need the evaluator.
    pub fn literal_value(&self) -> Option<Value> {
        match &self.contents {
            CellType::Empty => Some(Value::Empty),
            CellType::Text(s) => Some(Value::Text(s.clone())),
            CellType::Number(n) => Some(Value::Number(*n)),
            CellType::Formula(_) => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new_empty()
    }
}

fn parse_contents(input: &str, bounds: &GridBounds) -> Result<CellType> {
    if input.trim().is_empty() {
        return Ok(CellType::Empty);
    }
    if input.starts_with('=') {
        return parse_formula(input, bounds).map(CellType::Formula);
    }
    if let Some(n) = parse_numeral(input) {
        return Ok(CellType::Number(n));
    }
    Ok(CellType::Text(input.to_string()))
}
