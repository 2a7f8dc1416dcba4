//! Display formatting for cells.
//!
//! Formatting is a pure function of a cell's raw content, computed value and
//! declared type. It never fails: content that does not fit the declared type
//! is shown as-is.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::cell::{Cell, DeclaredType};
use super::value::Value;

/// Days are counted from this date, matching common spreadsheet serials
/// (serial 1 is 1899-12-31, 45292 is 2024-01-01).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Locale-ish knobs for display formatting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub currency_symbol: String,
    /// chrono strftime pattern for date cells.
    pub date_format: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            currency_symbol: "$".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// The text a cell shows in the grid.
pub fn display(cell: &Cell, options: &FormatOptions) -> String {
    if cell.raw.trim().is_empty() {
        return String::new();
    }
    if let Value::Error(e) = &cell.computed {
        return e.token().to_string();
    }

    let fallback = || {
        if cell.is_formula() {
            cell.computed.to_string()
        } else {
            cell.raw.clone()
        }
    };

    match (cell.declared_type, &cell.computed) {
        (DeclaredType::Text, _) => fallback(),
        (DeclaredType::Number, Value::Number(n)) => format_number(*n),
        (DeclaredType::Currency, Value::Number(n)) => format_currency(*n, &options.currency_symbol),
        (DeclaredType::Percentage, Value::Number(n)) => format_percentage(*n),
        (DeclaredType::Date, Value::Number(n)) => {
            format_serial_date(*n, &options.date_format).unwrap_or_else(fallback)
        }
        (DeclaredType::Date, Value::Text(s)) => {
            format_date_text(s, &options.date_format).unwrap_or_else(fallback)
        }
        _ => fallback(),
    }
}

/// Two fixed decimals with thousands separators: `1234.5` -> `1,234.50`.
pub fn format_number(n: f64) -> String {
    let (negative, digits) = grouped_two_decimals(n);
    if negative { format!("-{}", digits) } else { digits }
}

/// `1234.5` -> `$1,234.50`, `-3` -> `-$3.00`.
pub fn format_currency(n: f64, symbol: &str) -> String {
    let (negative, digits) = grouped_two_decimals(n);
    let sign = if negative { "-" } else { "" };
    format!("{}{}{}", sign, symbol, digits)
}

/// The value is a fraction: `0.25` -> `25.00%`.
pub fn format_percentage(n: f64) -> String {
    format!("{}%", format_number(n * 100.0))
}

/// Render a day serial as a date; None when out of the calendar's range.
pub fn format_serial_date(serial: f64, pattern: &str) -> Option<String> {
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    let days = TimeDelta::try_days(serial.floor() as i64)?;
    let date = epoch.checked_add_signed(days)?;
    render_date(date, pattern)
}

/// Re-render a date typed as text (`2024-03-31`, `03/31/2024`, `2024/03/31`).
pub fn format_date_text(text: &str, pattern: &str) -> Option<String> {
    let text = text.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| render_date(date, pattern))
}

fn render_date(date: NaiveDate, pattern: &str) -> Option<String> {
    let mut out = String::new();
    // chrono reports a bad pattern as a fmt::Error rather than panicking here.
    write!(out, "{}", date.format(pattern)).ok()?;
    Some(out)
}

fn grouped_two_decimals(n: f64) -> (bool, String) {
    let fixed = format!("{:.2}", n.abs());
    let negative = n < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped.push('.');
    grouped.push_str(frac_part);
    (negative, grouped)
}
