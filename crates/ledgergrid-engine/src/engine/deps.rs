//! Dependency extraction from parsed formulas.
//!
//! Walks an [`Expr`] to find every cell it may read: plain references and
//! every cell covered by a range. Both branches of `IF` count, even though
//! only one is evaluated, so the dependency set is conservative.
//!
//! [`parse_formula`](super::parse_formula) refuses ranges larger than
//! [`MAX_DEPENDENCY_RANGE_CELLS`], so every range it produces expands fully.

use super::ast::Expr;
use super::cell_ref::Address;

pub const MAX_DEPENDENCY_RANGE_CELLS: usize = 1_000_000;

/// All addresses read by an expression, deduplicated, in first-seen order.
pub fn extract_dependencies(expr: &Expr) -> Vec<Address> {
    let mut deps = Vec::new();
    collect(expr, &mut deps);

    let mut seen = std::collections::HashSet::with_capacity(deps.len());
    deps.retain(|addr| seen.insert(*addr));
    deps
}

fn collect(expr: &Expr, deps: &mut Vec<Address>) {
    match expr {
        Expr::Number(_) | Expr::Text(_) | Expr::Bool(_) => {}
        Expr::CellRef(addr) => deps.push(*addr),
        Expr::Range(start, end) => deps.extend(cells_in_range(start, end)),
        Expr::FunctionCall { args, .. } => {
            for arg in args {
                collect(arg, deps);
            }
        }
        Expr::Unary { operand, .. } => collect(operand, deps),
        Expr::Binary { left, right, .. } => {
            collect(left, deps);
            collect(right, deps);
        }
    }
}

/// Number of cells in the rectangle spanned by two corners.
pub(crate) fn range_size(start: &Address, end: &Address) -> Option<usize> {
    let rows = start.row.abs_diff(end.row) + 1;
    let cols = start.col.abs_diff(end.col) + 1;
    rows.checked_mul(cols)
}

/// Cells of the rectangle spanned by two corners, row-major (left to right,
/// then top to bottom). Corner order does not matter.
pub fn cells_in_range(start: &Address, end: &Address) -> impl Iterator<Item = Address> + use<> {
    let (top, bottom) = (start.row.min(end.row), start.row.max(end.row));
    let (left, right) = (start.col.min(end.col), start.col.max(end.col));
    (top..=bottom).flat_map(move |row| (left..=right).map(move |col| Address::new(row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GridBounds, parse_formula};

    fn deps(formula: &str) -> Vec<String> {
        let expr = parse_formula(formula, &GridBounds::new(2_000, 26)).unwrap();
        extract_dependencies(&expr)
            .iter()
            .map(|a| a.to_string())
            .collect()
    }

    #[test]
    fn test_literals_have_no_dependencies() {
        assert!(deps("=10 + 20").is_empty());
        assert!(deps("=\"A1\"").is_empty());
    }

    #[test]
    fn test_references_are_deduplicated() {
        assert_eq!(deps("=A1 + B2 * A1"), vec!["A1", "B2"]);
    }

    #[test]
    fn test_ranges_expand_row_major() {
        assert_eq!(deps("=SUM(A1:B2)"), vec!["A1", "B1", "A2", "B2"]);
        assert_eq!(deps("=SUM(B2:A1)"), vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_both_if_branches_count() {
        assert_eq!(deps("=IF(A1, B1, C1)"), vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_nested_calls_and_unknown_functions() {
        assert_eq!(deps("=-NOPE(A3, MAX(A1:A2))"), vec!["A3", "A1", "A2"]);
    }
}
