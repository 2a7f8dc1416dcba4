//! Starter sheets.
//!
//! A template is a complete set of cell records. Loading one replaces every
//! cell of the sheet; the sheet's name and size stay as they were.

use crate::sheet::CellRecord;
use ledgergrid_engine::engine::{DeclaredType, Style, TextAlign};

#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub id: String,
    pub name: String,
    /// Reference -> record, in the order they are listed.
    pub cells: Vec<(String, CellRecord)>,
}

impl Template {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Template {
            id: id.into(),
            name: name.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, reference: &str, record: CellRecord) -> Self {
        self.cells.push((reference.to_string(), record));
        self
    }

    fn label(self, reference: &str, text: &str) -> Self {
        self.cell(reference, CellRecord::new(text))
    }

    fn heading(self, reference: &str, text: &str) -> Self {
        self.cell(reference, CellRecord::new(text).with_style(Style::bold()))
    }

    fn title(self, reference: &str, text: &str) -> Self {
        let style = Style {
            text_align: Some(TextAlign::Center),
            ..Style::bold()
        };
        self.cell(reference, CellRecord::new(text).with_style(style))
    }

    fn amount(self, reference: &str, raw: &str) -> Self {
        self.cell(reference, CellRecord::new(raw).with_type(DeclaredType::Currency))
    }

    fn total(self, reference: &str, formula: &str) -> Self {
        self.cell(
            reference,
            CellRecord::new(formula)
                .with_type(DeclaredType::Currency)
                .with_style(Style::bold()),
        )
    }
}

/// The accounting templates shipped with the application.
pub fn builtin_templates() -> Vec<Template> {
    vec![balance_sheet(), income_statement()]
}

/// Look up a built-in template by id (case-insensitive).
pub fn find_builtin(id: &str) -> Option<Template> {
    builtin_templates()
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(id.trim()))
}

fn balance_sheet() -> Template {
    Template::new("balance-sheet", "Balance Sheet")
        .title("A1", "BALANCE SHEET")
        .heading("A3", "ASSETS")
        .label("A4", "Current Assets")
        .label("A5", "Cash")
        .amount("B5", "10000")
        .label("A6", "Accounts Receivable")
        .amount("B6", "5000")
        .label("A7", "Inventory")
        .amount("B7", "15000")
        .heading("A8", "Total Current Assets")
        .total("B8", "=SUM(B5:B7)")
        .heading("A10", "LIABILITIES")
        .label("A11", "Current Liabilities")
        .label("A12", "Accounts Payable")
        .amount("B12", "8000")
        .heading("A13", "Total Current Liabilities")
        .total("B13", "=SUM(B12:B12)")
        .heading("A15", "EQUITY")
        .label("A16", "Retained Earnings")
        .amount("B16", "=B8-B13")
}

fn income_statement() -> Template {
    Template::new("income-statement", "Income Statement")
        .title("A1", "INCOME STATEMENT")
        .heading("A3", "REVENUE")
        .label("A4", "Sales Revenue")
        .amount("B4", "100000")
        .label("A5", "Service Revenue")
        .amount("B5", "25000")
        .heading("A6", "Total Revenue")
        .total("B6", "=SUM(B4:B5)")
        .heading("A8", "EXPENSES")
        .label("A9", "Cost of Goods Sold")
        .amount("B9", "60000")
        .label("A10", "Operating Expenses")
        .amount("B10", "30000")
        .heading("A11", "Total Expenses")
        .total("B11", "=SUM(B9:B10)")
        .heading("A13", "NET INCOME")
        .total("B13", "=B6-B11")
}
