//! Built-in spreadsheet functions.
//!
//! Conventions:
//! - Spreadsheet-facing names are ALL CAPS and matched case-insensitively by
//!   the parser (it upper-cases call names).
//! - Every function is a [`Function`] variant; a name that maps to no variant
//!   evaluates to `#NAME?`.
//! - If you add a function that takes ranges, say so in
//!   [`Function::accepts_ranges`] or the parser will reject its range
//!   arguments.

use crate::engine::{Address, CellSource, ErrorValue, Expr, Value, cells_in_range, compare, evaluate};
use std::cmp::Ordering;

pub struct BuiltinInfo {
    pub name: &'static str,
    pub function: Function,
    pub description: &'static str,
}

pub const BUILTINS: &[BuiltinInfo] = &[
    BuiltinInfo {
        name: "SUM",
        function: Function::Sum,
        description: "Sum of numeric values",
    },
    BuiltinInfo {
        name: "AVERAGE",
        function: Function::Average,
        description: "Average of numeric values (#DIV/0 when there are none)",
    },
    BuiltinInfo {
        name: "COUNT",
        function: Function::Count,
        description: "Count of numeric values",
    },
    BuiltinInfo {
        name: "MAX",
        function: Function::Max,
        description: "Largest numeric value (#VALUE when there are none)",
    },
    BuiltinInfo {
        name: "MIN",
        function: Function::Min,
        description: "Smallest numeric value (#VALUE when there are none)",
    },
    BuiltinInfo {
        name: "IF",
        function: Function::If,
        description: "IF(condition, then, [else]); only the taken branch is evaluated",
    },
    BuiltinInfo {
        name: "VLOOKUP",
        function: Function::Vlookup,
        description: "VLOOKUP(key, range, column, [exact]) looks up key in the first column",
    },
];

/// The closed set of functions the evaluator knows.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Function {
    Sum,
    Average,
    Count,
    Max,
    Min,
    If,
    Vlookup,
}

impl Function {
    /// Look up a function by its spreadsheet name (case-insensitive).
    /// `AVG` is accepted as a shorthand for `AVERAGE`.
    pub fn from_name(name: &str) -> Option<Function> {
        let upper = name.to_ascii_uppercase();
        if upper == "AVG" {
            return Some(Function::Average);
        }
        BUILTINS
            .iter()
            .find(|info| info.name == upper)
            .map(|info| info.function)
    }

    pub fn name(&self) -> &'static str {
        BUILTINS
            .iter()
            .find(|info| info.function == *self)
            .map(|info| info.name)
            .unwrap_or("?")
    }

    /// Whether a range may appear directly as one of this function's arguments.
    pub fn accepts_ranges(&self) -> bool {
        !matches!(self, Function::If)
    }
}

/// Dispatch a call to its implementation.
pub(crate) fn call(function: Function, args: &[Expr], source: &dyn CellSource) -> Value {
    match function {
        Function::Sum => aggregate(args, source, |nums| Value::from(nums.iter().sum::<f64>())),
        Function::Average => aggregate(args, source, |nums| {
            if nums.is_empty() {
                Value::Error(ErrorValue::DivZero)
            } else {
                Value::from(nums.iter().sum::<f64>() / nums.len() as f64)
            }
        }),
        Function::Count => aggregate(args, source, |nums| Value::Number(nums.len() as f64)),
        Function::Max => aggregate(args, source, |nums| {
            nums.iter()
                .copied()
                .reduce(f64::max)
                .map_or(Value::Error(ErrorValue::Value), Value::Number)
        }),
        Function::Min => aggregate(args, source, |nums| {
            nums.iter()
                .copied()
                .reduce(f64::min)
                .map_or(Value::Error(ErrorValue::Value), Value::Number)
        }),
        Function::If => if_fn(args, source),
        Function::Vlookup => vlookup(args, source),
    }
}

fn aggregate(args: &[Expr], source: &dyn CellSource, reduce: impl Fn(&[f64]) -> Value) -> Value {
    match collect_numbers(args, source) {
        Ok(nums) => reduce(&nums),
        Err(e) => Value::Error(e),
    }
}

/// Flatten aggregate arguments into numbers.
///
/// Referenced cells (single refs or ranges, row-major) contribute only numbers;
/// text, booleans and empty cells are skipped. Computed arguments contribute
/// numbers, booleans as 1/0 and numeric text; other text is `#VALUE`. Any
/// error value ends the aggregation with that error.
fn collect_numbers(args: &[Expr], source: &dyn CellSource) -> Result<Vec<f64>, ErrorValue> {
    fn push_cell(value: Value, nums: &mut Vec<f64>) -> Result<(), ErrorValue> {
        match value {
            Value::Number(n) => nums.push(n),
            Value::Error(e) => return Err(e),
            _ => {}
        }
        Ok(())
    }

    let mut nums = Vec::new();
    for arg in args {
        match arg {
            Expr::Range(start, end) => {
                for addr in cells_in_range(start, end) {
                    push_cell(source.value(&addr), &mut nums)?;
                }
            }
            Expr::CellRef(addr) => push_cell(source.value(addr), &mut nums)?,
            other => match evaluate(other, source) {
                Value::Empty => {}
                value => nums.push(value.to_number()?),
            },
        }
    }
    Ok(nums)
}

fn if_fn(args: &[Expr], source: &dyn CellSource) -> Value {
    if !(2..=3).contains(&args.len()) {
        return Value::Error(ErrorValue::Value);
    }
    match evaluate(&args[0], source).to_bool() {
        Ok(true) => evaluate(&args[1], source),
        Ok(false) => args
            .get(2)
            .map_or(Value::Bool(false), |expr| evaluate(expr, source)),
        Err(e) => Value::Error(e),
    }
}

fn vlookup(args: &[Expr], source: &dyn CellSource) -> Value {
    if !(3..=4).contains(&args.len()) {
        return Value::Error(ErrorValue::Value);
    }
    let Expr::Range(start, end) = &args[1] else {
        return Value::Error(ErrorValue::Value);
    };

    let key = evaluate(&args[0], source);
    if let Some(e) = key.as_error() {
        return Value::Error(e);
    }
    let column = match evaluate(&args[2], source).to_number() {
        Ok(n) => n.trunc(),
        Err(e) => return Value::Error(e),
    };
    let exact = match args.get(3).map(|expr| evaluate(expr, source).to_bool()) {
        None => true,
        Some(Ok(flag)) => flag,
        Some(Err(e)) => return Value::Error(e),
    };

    let (top, bottom) = (start.row.min(end.row), start.row.max(end.row));
    let (left, right) = (start.col.min(end.col), start.col.max(end.col));
    let width = right - left + 1;
    if column < 1.0 || column > width as f64 {
        return Value::Error(ErrorValue::Value);
    }
    let target_col = left + column as usize - 1;

    let mut matched: Option<usize> = None;
    for row in top..=bottom {
        let candidate = source.value(&Address::new(row, left));
        if let Some(e) = candidate.as_error() {
            return Value::Error(e);
        }
        if exact {
            if !matches!(candidate, Value::Empty) && compare(&candidate, &key) == Ordering::Equal {
                matched = Some(row);
                break;
            }
        } else if let (Some(n), Ok(k)) = (candidate.as_number(), key.to_number()) {
            if n > k {
                break;
            }
            matched = Some(row);
        }
    }

    match matched {
        Some(row) => source.value(&Address::new(row, target_col)),
        None => Value::Error(ErrorValue::NotAvailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GridBounds, parse_formula};
    use std::cell::Cell as Counter;
    use std::collections::HashMap;

    fn grid(cells: &[(&str, Value)]) -> HashMap<Address, Value> {
        cells
            .iter()
            .map(|(r, v)| (Address::decode(r).unwrap(), v.clone()))
            .collect()
    }

    fn eval_in(map: &HashMap<Address, Value>, formula: &str) -> Value {
        let expr = parse_formula(formula, &GridBounds::default()).unwrap();
        let source = |addr: &Address| map.get(addr).cloned().unwrap_or_default();
        evaluate(&expr, &source)
    }

    fn n(v: f64) -> Value {
        Value::Number(v)
    }

    fn t(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_function_names() {
        assert_eq!(Function::from_name("sum"), Some(Function::Sum));
        assert_eq!(Function::from_name("AVG"), Some(Function::Average));
        assert_eq!(Function::from_name("UNKNOWNFN"), None);
        assert_eq!(Function::Vlookup.name(), "VLOOKUP");
        assert!(!Function::If.accepts_ranges());
        assert!(Function::Count.accepts_ranges());
    }

    #[test]
    fn test_aggregates_skip_text_and_empty_cells() {
        let map = grid(&[("A1", n(5.0)), ("A2", t("note")), ("A4", n(10.0))]);
        assert_eq!(eval_in(&map, "=SUM(A1:A4)"), n(15.0));
        assert_eq!(eval_in(&map, "=AVERAGE(A1:A4)"), n(7.5));
        assert_eq!(eval_in(&map, "=COUNT(A1:A4)"), n(2.0));
        assert_eq!(eval_in(&map, "=MAX(A1:A4)"), n(10.0));
        assert_eq!(eval_in(&map, "=MIN(A1:A4)"), n(5.0));
    }

    #[test]
    fn test_aggregates_mix_arguments() {
        let map = grid(&[("A1", n(1.0)), ("B2", n(2.0)), ("C1", t("x"))]);
        assert_eq!(eval_in(&map, "=SUM(A1:B2, C1, 10, TRUE)"), n(14.0));
        assert_eq!(eval_in(&map, "=SUM(\"abc\")"), Value::Error(ErrorValue::Value));
        assert_eq!(eval_in(&map, "=SUM()"), n(0.0));
    }

    #[test]
    fn test_empty_aggregates() {
        let map = grid(&[("A1", t("a")), ("A2", t("b"))]);
        assert_eq!(
            eval_in(&map, "=AVERAGE(A1:A3)"),
            Value::Error(ErrorValue::DivZero)
        );
        assert_eq!(eval_in(&map, "=MAX(A1:A3)"), Value::Error(ErrorValue::Value));
        assert_eq!(eval_in(&map, "=MIN(A1:A3)"), Value::Error(ErrorValue::Value));
        assert_eq!(eval_in(&map, "=COUNT(A1:A3)"), n(0.0));
    }

    #[test]
    fn test_range_errors_propagate() {
        let map = grid(&[("A1", n(1.0)), ("A2", Value::Error(ErrorValue::Circular))]);
        assert_eq!(
            eval_in(&map, "=SUM(A1:A2)"),
            Value::Error(ErrorValue::Circular)
        );
    }

    #[test]
    fn test_reversed_range_is_normalised() {
        let map = grid(&[("A1", n(1.0)), ("B2", n(2.0))]);
        assert_eq!(eval_in(&map, "=SUM(B2:A1)"), n(3.0));
    }

    #[test]
    fn test_if_short_circuits() {
        let reads = Counter::new(0);
        let expr = parse_formula("=IF(1, 2, A1)", &GridBounds::default()).unwrap();
        let source = |_: &Address| {
            reads.set(reads.get() + 1);
            Value::Error(ErrorValue::DivZero)
        };
        assert_eq!(evaluate(&expr, &source), n(2.0));
        assert_eq!(reads.get(), 0);
    }

    #[test]
    fn test_if_conditions() {
        let map = grid(&[("A1", n(0.0)), ("A2", t("x"))]);
        assert_eq!(eval_in(&map, "=IF(A1, \"yes\", \"no\")"), t("no"));
        assert_eq!(eval_in(&map, "=IF(A1=0, \"yes\", \"no\")"), t("yes"));
        assert_eq!(eval_in(&map, "=IF(B9, 1)"), Value::Bool(false));
        assert_eq!(eval_in(&map, "=IF(A2, 1, 2)"), Value::Error(ErrorValue::Value));
        assert_eq!(eval_in(&map, "=IF(1)"), Value::Error(ErrorValue::Value));
        assert_eq!(
            eval_in(&map, "=IF(1/0, 1, 2)"),
            Value::Error(ErrorValue::DivZero)
        );
    }

    #[test]
    fn test_vlookup_exact() {
        let map = grid(&[
            ("A1", t("Cash")),
            ("B1", n(10000.0)),
            ("A2", t("Inventory")),
            ("B2", n(15000.0)),
        ]);
        assert_eq!(eval_in(&map, "=VLOOKUP(\"inventory\", A1:B2, 2)"), n(15000.0));
        assert_eq!(
            eval_in(&map, "=VLOOKUP(\"Land\", A1:B2, 2)"),
            Value::Error(ErrorValue::NotAvailable)
        );
        assert_eq!(
            eval_in(&map, "=VLOOKUP(\"Cash\", A1:B2, 3)"),
            Value::Error(ErrorValue::Value)
        );
    }

    #[test]
    fn test_vlookup_approximate() {
        let map = grid(&[
            ("A1", n(0.0)),
            ("B1", t("low")),
            ("A2", n(100.0)),
            ("B2", t("mid")),
            ("A3", n(1000.0)),
            ("B3", t("high")),
        ]);
        assert_eq!(eval_in(&map, "=VLOOKUP(250, A1:B3, 2, FALSE)"), t("mid"));
        assert_eq!(eval_in(&map, "=VLOOKUP(5000, A1:B3, 2, FALSE)"), t("high"));
        assert_eq!(
            eval_in(&map, "=VLOOKUP(-1, A1:B3, 2, FALSE)"),
            Value::Error(ErrorValue::NotAvailable)
        );
    }
}
