//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B12", "AA100") and one-indexed row/column coordinates.
//!
//! Column letters use the bijective base-26 numbering: there is no zero digit,
//! so column 26 is `Z` and column 27 is `AA`.
//!
//! # Examples
//!
//! ```
//! use ledgergrid_engine::engine::Address;
//!
//! let addr = Address::decode("B3").unwrap();
//! assert_eq!(addr.row, 3);
//! assert_eq!(addr.col, 2);
//! assert_eq!(addr.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::error::{EngineError, Result};

/// Default number of rows in a new sheet.
pub const DEFAULT_ROWS: usize = 50;
/// Default number of columns in a new sheet.
pub const DEFAULT_COLUMNS: usize = 26;

/// A reference to a cell by row and column (both one-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address {
    pub row: usize,
    pub col: usize,
}

impl Address {
    /// Build an address without validation. Callers that accept user input
    /// should go through [`Address::decode`] or [`GridBounds::resolve`].
    pub const fn new(row: usize, col: usize) -> Address {
        Address { row, col }
    }

    /// Render `(row, col)` as a reference string.
    pub fn encode(row: usize, col: usize) -> Result<String> {
        if row < 1 || col < 1 {
            return Err(EngineError::invalid_address(format!("({row}, {col})")));
        }
        Ok(format!("{}{}", Address::col_to_letters(col), row))
    }

    /// Parse a reference such as `b12`. Letters are case-insensitive; the row
    /// must not have a leading zero.
    pub fn decode(text: &str) -> Result<Address> {
        Self::parse_a1(text).ok_or_else(|| EngineError::invalid_address(text))
    }

    fn parse_a1(text: &str) -> Option<Address> {
        let caps = a1_re().captures(text)?;
        let col = Address::letters_to_col(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?;
        Some(Address::new(row, col))
    }

    /// Convert a one-indexed column to letters (1 -> A, 26 -> Z, 27 -> AA).
    /// Column 0 has no letter form and yields an empty string.
    pub fn col_to_letters(col: usize) -> String {
        let mut result = Vec::new();
        let mut n = col;
        while n > 0 {
            n -= 1;
            result.push(b'A' + (n % 26) as u8);
            n /= 26;
        }
        result.reverse();
        String::from_utf8(result).unwrap_or_default()
    }

    /// Convert column letters to a one-indexed column. Returns None on
    /// non-letters or overflow.
    pub fn letters_to_col(letters: &str) -> Option<usize> {
        if letters.is_empty() {
            return None;
        }
        let mut acc = 0usize;
        for c in letters.bytes() {
            if !c.is_ascii_alphabetic() {
                return None;
            }
            let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
            acc = acc.checked_mul(26)?.checked_add(digit)?;
        }
        Some(acc)
    }

    /// Move by a signed delta, returning None when the result would leave the
    /// one-indexed quadrant.
    pub fn offset(&self, delta_row: isize, delta_col: isize) -> Option<Address> {
        let row = self.row.checked_add_signed(delta_row)?;
        let col = self.col.checked_add_signed(delta_col)?;
        (row >= 1 && col >= 1).then_some(Address::new(row, col))
    }
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[1-9][0-9]*)$")
            .expect("cell reference regex must compile")
    })
}

impl std::str::FromStr for Address {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Address::decode(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Address::col_to_letters(self.col), self.row)
    }
}

/// Fixed grid dimensions of a sheet.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub rows: usize,
    pub columns: usize,
}

impl GridBounds {
    /// Bounds are at least 1x1.
    pub fn new(rows: usize, columns: usize) -> GridBounds {
        GridBounds {
            rows: rows.max(1),
            columns: columns.max(1),
        }
    }

    pub fn contains(&self, addr: &Address) -> bool {
        (1..=self.rows).contains(&addr.row) && (1..=self.columns).contains(&addr.col)
    }

    /// Decode a reference and reject it if it falls outside these bounds.
    pub fn resolve(&self, text: &str) -> Result<Address> {
        let addr = Address::decode(text)?;
        self.check(addr).map_err(|_| EngineError::invalid_address(text))
    }

    /// Return the address unchanged if it lies within these bounds.
    pub fn check(&self, addr: Address) -> Result<Address> {
        if self.contains(&addr) {
            Ok(addr)
        } else {
            Err(EngineError::invalid_address(addr.to_string()))
        }
    }

    /// Nearest address inside the bounds.
    pub fn clamp(&self, addr: Address) -> Address {
        Address::new(addr.row.clamp(1, self.rows), addr.col.clamp(1, self.columns))
    }

    /// Number of addressable cells.
    pub fn cell_count(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        GridBounds::new(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_references() {
        assert_eq!(Address::encode(1, 1).unwrap(), "A1");
        assert_eq!(Address::encode(50, 26).unwrap(), "Z50");
        assert_eq!(Address::encode(1, 27).unwrap(), "AA1");
        assert_eq!(Address::encode(7, 52).unwrap(), "AZ7");
        assert_eq!(Address::encode(7, 53).unwrap(), "BA7");
        assert_eq!(Address::encode(1, 702).unwrap(), "ZZ1");
        assert_eq!(Address::encode(1, 703).unwrap(), "AAA1");
    }

    #[test]
    fn test_encode_rejects_zero() {
        assert!(matches!(
            Address::encode(0, 1),
            Err(EngineError::InvalidAddress { .. })
        ));
        assert!(Address::encode(1, 0).is_err());
    }

    #[test]
    fn test_round_trip_within_default_bounds() {
        let bounds = GridBounds::default();
        for row in 1..=bounds.rows {
            for col in 1..=bounds.columns {
                let text = Address::encode(row, col).unwrap();
                assert_eq!(Address::decode(&text).unwrap(), Address::new(row, col));
            }
        }
    }

    #[test]
    fn test_round_trip_wide_columns() {
        for col in 1..=2000 {
            let text = Address::encode(3, col).unwrap();
            assert_eq!(Address::decode(&text).unwrap().col, col, "{text}");
        }
    }

    #[test]
    fn test_decode_case_insensitive() {
        assert_eq!(Address::decode("b12").unwrap(), Address::new(12, 2));
        assert_eq!(Address::decode("aA1").unwrap(), Address::new(1, 27));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for bad in ["", "A", "12", "A0", "A01", "1A", "A 1", "A1B", "$A$1", "A-1"] {
            assert!(Address::decode(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_decode_overflow_is_invalid() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(Address::decode(&huge).is_err());
        assert!(Address::decode("A99999999999999999999999").is_err());
    }

    #[test]
    fn test_resolve_checks_bounds() {
        let bounds = GridBounds::new(50, 26);
        assert_eq!(bounds.resolve("Z50").unwrap(), Address::new(50, 26));
        assert!(matches!(
            bounds.resolve("AA1"),
            Err(EngineError::InvalidAddress { text }) if text == "AA1"
        ));
        assert!(bounds.resolve("A51").is_err());
    }

    #[test]
    fn test_clamp_and_offset() {
        let bounds = GridBounds::new(10, 5);
        assert_eq!(bounds.clamp(Address::new(0, 9)), Address::new(1, 5));
        assert_eq!(Address::new(1, 1).offset(-1, 0), None);
        assert_eq!(Address::new(2, 2).offset(1, -1), Some(Address::new(3, 1)));
    }
}
