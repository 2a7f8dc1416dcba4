//! Structural errors raised while resolving addresses or parsing formulas.
//!
//! These are failures surfaced to the caller. Evaluation problems such as
//! division by zero are not errors at this level: they become
//! [`ErrorValue`](crate::engine::ErrorValue)s stored as a cell's computed value.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid cell reference: {text}")]
    InvalidAddress { text: String },

    #[error("Syntax error at position {position}: expected {expected}")]
    FormulaSyntax { position: usize, expected: String },

    #[error(
        "Range {range} at position {position} is only allowed as an argument to a range function"
    )]
    InvalidRangeUsage { range: String, position: usize },

    #[error("Range {range} at position {position} covers {cells} cells (max {max})")]
    RangeTooLarge {
        range: String,
        position: usize,
        cells: usize,
        max: usize,
    },
}

impl EngineError {
    pub(crate) fn invalid_address(text: impl Into<String>) -> Self {
        EngineError::InvalidAddress { text: text.into() }
    }

    pub(crate) fn syntax(position: usize, expected: impl Into<String>) -> Self {
        EngineError::FormulaSyntax {
            position,
            expected: expected.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
