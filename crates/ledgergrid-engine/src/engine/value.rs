//! Computed cell values and evaluation error values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error values produced by evaluation. These are ordinary results stored in
/// a cell, not failures, and they spread to every formula that reads them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ErrorValue {
    DivZero,
    Value,
    Name,
    Circular,
    NotAvailable,
}

impl ErrorValue {
    pub fn token(&self) -> &'static str {
        match self {
            ErrorValue::DivZero => "#DIV/0",
            ErrorValue::Value => "#VALUE",
            ErrorValue::Name => "#NAME?",
            ErrorValue::Circular => "#CIRCULAR",
            ErrorValue::NotAvailable => "#N/A",
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The result of evaluating a cell.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Error(ErrorValue),
}

impl Value {
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_error(&self) -> Option<ErrorValue> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view used by arithmetic: empty is 0, booleans are 1/0, text
    /// only when it is itself a numeral.
    pub fn to_number(&self) -> Result<f64, ErrorValue> {
        match self {
            Value::Empty => Ok(0.0),
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => parse_numeral(s).ok_or(ErrorValue::Value),
            Value::Error(e) => Err(*e),
        }
    }

    /// Text view used by `&`: empty is "", numbers use the general rendering.
    pub fn to_text(&self) -> Result<String, ErrorValue> {
        match self {
            Value::Empty => Ok(String::new()),
            Value::Number(n) => Ok(format_general(*n)),
            Value::Text(s) => Ok(s.clone()),
            Value::Bool(b) => Ok(bool_text(*b).to_string()),
            Value::Error(e) => Err(*e),
        }
    }

    /// Truthiness used by IF.
    pub fn to_bool(&self) -> Result<bool, ErrorValue> {
        match self {
            Value::Empty => Ok(false),
            Value::Number(n) => Ok(*n != 0.0),
            Value::Bool(b) => Ok(*b),
            Value::Text(s) if s.eq_ignore_ascii_case("TRUE") => Ok(true),
            Value::Text(s) if s.eq_ignore_ascii_case("FALSE") => Ok(false),
            Value::Text(_) => Err(ErrorValue::Value),
            Value::Error(e) => Err(*e),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        if n.is_finite() {
            Value::Number(n)
        } else {
            Value::Error(ErrorValue::Value)
        }
    }
}

impl From<ErrorValue> for Value {
    fn from(e: ErrorValue) -> Self {
        Value::Error(e)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => f.write_str(&format_general(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => f.write_str(bool_text(*b)),
            Value::Error(e) => e.fmt(f),
        }
    }
}

pub(crate) fn bool_text(b: bool) -> &'static str {
    if b { "TRUE" } else { "FALSE" }
}

/// Parse a plain decimal numeral: optional sign, digits with an optional
/// fraction, optional exponent. Words like `inf` or `NaN` are not numerals.
pub fn parse_numeral(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let body = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if !body.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    if body.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// General number rendering: integers without decimals, everything else with
/// at most ten decimals and trailing zeros removed.
pub fn format_general(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{:.0}", n);
    }
    let fixed = format!("{:.10}", n);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeral() {
        assert_eq!(parse_numeral("42"), Some(42.0));
        assert_eq!(parse_numeral(" -1.5 "), Some(-1.5));
        assert_eq!(parse_numeral(".25"), Some(0.25));
        assert_eq!(parse_numeral("1e3"), Some(1000.0));
        assert_eq!(parse_numeral("inf"), None);
        assert_eq!(parse_numeral("NaN"), None);
        assert_eq!(parse_numeral("12abc"), None);
        assert_eq!(parse_numeral("Cash"), None);
        assert_eq!(parse_numeral(""), None);
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(15.0), "15");
        assert_eq!(format_general(2.5), "2.5");
        assert_eq!(format_general(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_general(-0.0), "0");
    }

    #[test]
    fn test_coercions() {
        assert_eq!(Value::Empty.to_number(), Ok(0.0));
        assert_eq!(Value::Text("x".into()).to_number(), Err(ErrorValue::Value));
        assert_eq!(Value::Empty.to_text(), Ok(String::new()));
        assert_eq!(
            Value::Error(ErrorValue::Name).to_bool(),
            Err(ErrorValue::Name)
        );
        assert_eq!(Value::from(f64::INFINITY), Value::Error(ErrorValue::Value));
    }
}
