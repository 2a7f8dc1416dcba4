//! Expression evaluation.
//!
//! Evaluation never fails: problems become [`ErrorValue`]s in the result.
//! Cell values are read through [`CellSource`], so the evaluator has no idea
//! how cells are stored or when they were last computed; the caller is
//! responsible for handing it fresh values in dependency order.

use std::cmp::Ordering;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::cell_ref::Address;
use super::value::{ErrorValue, Value};
use crate::builtins::{self, Function};

/// Read access to computed cell values.
pub trait CellSource {
    /// Current value of a cell; absent cells are [`Value::Empty`].
    fn value(&self, addr: &Address) -> Value;
}

impl<F> CellSource for F
where
    F: Fn(&Address) -> Value,
{
    fn value(&self, addr: &Address) -> Value {
        self(addr)
    }
}

/// Evaluate an expression against the given cell values.
pub fn evaluate(expr: &Expr, source: &dyn CellSource) -> Value {
    match expr {
        Expr::Number(n) => Value::from(*n),
        Expr::Text(s) => Value::Text(s.clone()),
        Expr::Bool(b) => Value::Bool(*b),
        Expr::CellRef(addr) => source.value(addr),
        // The parser only admits ranges as range-function arguments.
        Expr::Range(..) => Value::Error(ErrorValue::Value),
        Expr::FunctionCall { name, args } => match Function::from_name(name) {
            Some(function) => builtins::call(function, args, source),
            None => Value::Error(ErrorValue::Name),
        },
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, source);
            match value.to_number() {
                Ok(n) => match op {
                    UnaryOp::Neg => Value::from(-n),
                    UnaryOp::Plus => Value::from(n),
                },
                Err(e) => Value::Error(e),
            }
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, source);
            let right = evaluate(right, source);
            binary(*op, &left, &right)
        }
    }
}

/// Apply a binary operator. The left operand's error wins over the right's.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    if let Some(e) = left.as_error().or_else(|| right.as_error()) {
        return Value::Error(e);
    }

    if op == BinaryOp::Concat {
        return match (left.to_text(), right.to_text()) {
            (Ok(l), Ok(r)) => Value::Text(l + &r),
            (Err(e), _) | (_, Err(e)) => Value::Error(e),
        };
    }

    if op.is_comparison() {
        let ordering = compare(left, right);
        let result = match op {
            BinaryOp::Eq => ordering == Ordering::Equal,
            BinaryOp::Ne => ordering != Ordering::Equal,
            BinaryOp::Lt => ordering == Ordering::Less,
            BinaryOp::Le => ordering != Ordering::Greater,
            BinaryOp::Gt => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        };
        return Value::Bool(result);
    }

    let (l, r) = match (left.to_number(), right.to_number()) {
        (Ok(l), Ok(r)) => (l, r),
        (Err(e), _) | (_, Err(e)) => return Value::Error(e),
    };

    match op {
        BinaryOp::Add => Value::from(l + r),
        BinaryOp::Sub => Value::from(l - r),
        BinaryOp::Mul => Value::from(l * r),
        BinaryOp::Div if r == 0.0 => Value::Error(ErrorValue::DivZero),
        BinaryOp::Div => Value::from(l / r),
        BinaryOp::Pow if l == 0.0 && r < 0.0 => Value::Error(ErrorValue::DivZero),
        BinaryOp::Pow => Value::from(l.powf(r)),
        _ => Value::Error(ErrorValue::Value),
    }
}

/// Ordering used by comparison operators and lookups. Numbers (including
/// booleans and empty cells) sort before text; text compares
/// case-insensitively.
pub fn compare(left: &Value, right: &Value) -> Ordering {
    fn numeric(v: &Value) -> Option<f64> {
        match v {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    match (left, right) {
        (Value::Empty, Value::Empty) => Ordering::Equal,
        (Value::Empty, Value::Text(s)) => "".cmp(s.to_lowercase().as_str()),
        (Value::Text(s), Value::Empty) => s.to_lowercase().as_str().cmp(""),
        (Value::Text(l), Value::Text(r)) => l.to_lowercase().cmp(&r.to_lowercase()),
        (Value::Text(_), _) => Ordering::Greater,
        (_, Value::Text(_)) => Ordering::Less,
        _ => {
            let l = numeric(left).unwrap_or(0.0);
            let r = numeric(right).unwrap_or(0.0);
            l.partial_cmp(&r).unwrap_or(Ordering::Equal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GridBounds, parse_formula};
    use std::collections::HashMap;

    fn eval_with(cells: &[(&str, Value)], formula: &str) -> Value {
        let map: HashMap<Address, Value> = cells
            .iter()
            .map(|(r, v)| (Address::decode(r).unwrap(), v.clone()))
            .collect();
        let expr = parse_formula(formula, &GridBounds::default()).unwrap();
        let source = |addr: &Address| map.get(addr).cloned().unwrap_or_default();
        evaluate(&expr, &source)
    }

    fn eval(formula: &str) -> Value {
        eval_with(&[], formula)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("=1+2*3"), Value::Number(7.0));
        assert_eq!(eval("=(1+2)*3"), Value::Number(9.0));
        assert_eq!(eval("=2^10"), Value::Number(1024.0));
        assert_eq!(eval("=-2^2"), Value::Number(-4.0));
        assert_eq!(eval("=10/4"), Value::Number(2.5));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("=1/0"), Value::Error(ErrorValue::DivZero));
        assert_eq!(
            eval_with(&[("A1", Value::Number(3.0))], "=A1/B1"),
            Value::Error(ErrorValue::DivZero)
        );
    }

    #[test]
    fn test_empty_cells_coerce() {
        assert_eq!(eval("=A1+5"), Value::Number(5.0));
        assert_eq!(eval("=\"x\"&A1&\"y\""), Value::Text("xy".to_string()));
    }

    #[test]
    fn test_text_in_arithmetic_is_value_error() {
        let cells = [("A1", Value::Text("Cash".to_string()))];
        assert_eq!(eval_with(&cells, "=A1*2"), Value::Error(ErrorValue::Value));
        assert_eq!(eval("=\"12\"*2"), Value::Number(24.0));
    }

    #[test]
    fn test_errors_are_contagious_left_first() {
        let cells = [
            ("A1", Value::Error(ErrorValue::Name)),
            ("B1", Value::Error(ErrorValue::DivZero)),
        ];
        assert_eq!(eval_with(&cells, "=A1+B1"), Value::Error(ErrorValue::Name));
        assert_eq!(eval_with(&cells, "=B1+A1"), Value::Error(ErrorValue::DivZero));
        assert_eq!(eval_with(&cells, "=1+A1"), Value::Error(ErrorValue::Name));
        assert_eq!(eval_with(&cells, "=A1&\"x\""), Value::Error(ErrorValue::Name));
        assert_eq!(eval_with(&cells, "=-A1"), Value::Error(ErrorValue::Name));
        assert_eq!(eval_with(&cells, "=A1=1"), Value::Error(ErrorValue::Name));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("=2>1"), Value::Bool(true));
        assert_eq!(eval("=\"abc\"=\"ABC\""), Value::Bool(true));
        assert_eq!(eval("=1<\"a\""), Value::Bool(true));
        assert_eq!(eval("=A1=0"), Value::Bool(true));
        assert_eq!(eval("=A1=\"\""), Value::Bool(true));
    }

    #[test]
    fn test_unknown_function_is_name_error() {
        assert_eq!(eval("=UNKNOWNFN(A1)"), Value::Error(ErrorValue::Name));
    }

    #[test]
    fn test_overflow_is_value_error() {
        assert_eq!(eval("=10^400"), Value::Error(ErrorValue::Value));
    }
}
