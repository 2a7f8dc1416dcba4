//! Formula tokenizer and recursive descent parser.
//!
//! Turns the text of a formula (with or without its leading `=`) into an
//! [`Expr`] tree. Precedence, loosest first:
//!
//! | Level          | Operators                  | Associativity |
//! |----------------|----------------------------|---------------|
//! | comparison     | `=` `<>` `<` `<=` `>` `>=` | left          |
//! | concatenation  | `&`                        | left          |
//! | additive       | `+` `-`                    | left          |
//! | multiplicative | `*` `/`                    | left          |
//! | sign           | unary `-` `+`              | prefix        |
//! | exponent       | `^`                        | right         |
//!
//! Positions in errors are character offsets into the text handed to
//! [`parse_formula`], so a caller passing the raw cell content (including the
//! `=`) gets offsets the user can match against what they typed.
//!
//! Nesting (parentheses, signs, exponents) is limited to
//! [`MAX_NESTING_DEPTH`] levels and a formula to [`MAX_OPERATORS`] binary
//! operators, which bounds the height of every tree handed to the evaluator.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::cell_ref::{Address, GridBounds};
use super::deps::{MAX_DEPENDENCY_RANGE_CELLS, range_size};
use crate::builtins::Function;
use crate::error::{EngineError, Result};

pub const MAX_NESTING_DEPTH: usize = 64;
pub const MAX_OPERATORS: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Text(String),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
    Comma,
    Colon,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(chars: &[char], origin: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut i = origin;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '+' => TokenKind::Op(BinaryOp::Add),
            '-' => TokenKind::Op(BinaryOp::Sub),
            '*' => TokenKind::Op(BinaryOp::Mul),
            '/' => TokenKind::Op(BinaryOp::Div),
            '^' => TokenKind::Op(BinaryOp::Pow),
            '&' => TokenKind::Op(BinaryOp::Concat),
            '=' => TokenKind::Op(BinaryOp::Eq),
            '<' => match chars.get(i + 1) {
                Some('=') => {
                    i += 1;
                    TokenKind::Op(BinaryOp::Le)
                }
                Some('>') => {
                    i += 1;
                    TokenKind::Op(BinaryOp::Ne)
                }
                _ => TokenKind::Op(BinaryOp::Lt),
            },
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    i += 1;
                    TokenKind::Op(BinaryOp::Ge)
                } else {
                    TokenKind::Op(BinaryOp::Gt)
                }
            }
            '"' => {
                let (text, end) = lex_string(chars, i)?;
                tokens.push(Token {
                    kind: TokenKind::Text(text),
                    pos: start,
                });
                i = end;
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (value, end) = lex_number(chars, i)?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    pos: start,
                });
                i = end;
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = i;
                while end < chars.len()
                    && (chars[end].is_ascii_alphanumeric() || chars[end] == '_')
                {
                    end += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(chars[i..end].iter().collect()),
                    pos: start,
                });
                i = end;
                continue;
            }
            _ => return Err(EngineError::syntax(start, "operator, value, or reference")),
        };

        tokens.push(Token { kind, pos: start });
        i += 1;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: chars.len(),
    });
    Ok(tokens)
}

/// Lex a double-quoted string starting at `start`; `""` is an escaped quote.
fn lex_string(chars: &[char], start: usize) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut i = start + 1;
    loop {
        match chars.get(i) {
            None => return Err(EngineError::syntax(chars.len(), "closing quote")),
            Some('"') if chars.get(i + 1) == Some(&'"') => {
                out.push('"');
                i += 2;
            }
            Some('"') => return Ok((out, i + 1)),
            Some(c) => {
                out.push(*c);
                i += 1;
            }
        }
    }
}

fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize)> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if chars.get(i) == Some(&'.') {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if matches!(chars.get(i), Some('e' | 'E')) {
        let mut j = i + 1;
        if matches!(chars.get(j), Some('+' | '-')) {
            j += 1;
        }
        if chars.get(j).is_some_and(|c| c.is_ascii_digit()) {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    let text: String = chars[start..i].iter().collect();
    text.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| (n, i))
        .ok_or_else(|| EngineError::syntax(start, "number"))
}

/// Parse a formula into an expression tree. A leading `=` is skipped.
/// References are resolved against `bounds`.
pub fn parse_formula(text: &str, bounds: &GridBounds) -> Result<Expr> {
    let chars: Vec<char> = text.chars().collect();
    let origin = usize::from(chars.first() == Some(&'='));
    let tokens = tokenize(&chars, origin)?;
    let mut parser = Parser {
        tokens,
        index: 0,
        bounds,
        depth: 0,
        operators: 0,
    };

    let start = parser.pos();
    let expr = parser.parse_comparison()?;
    let expr = parser.scalar(expr, start)?;
    match parser.peek() {
        TokenKind::Eof => Ok(expr),
        TokenKind::RParen => Err(EngineError::syntax(parser.pos(), "end of formula (unbalanced ')')")),
        _ => Err(EngineError::syntax(parser.pos(), "operator or end of formula")),
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    index: usize,
    bounds: &'a GridBounds,
    depth: usize,
    operators: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.index].kind
    }

    fn pos(&self) -> usize {
        self.tokens[self.index].pos
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<()> {
        if *self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(EngineError::syntax(self.pos(), expected))
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(EngineError::syntax(self.pos(), "shallower nesting"));
        }
        self.depth += 1;
        Ok(())
    }

    fn count_operator(&mut self) -> Result<()> {
        if self.operators >= MAX_OPERATORS {
            return Err(EngineError::syntax(self.pos(), "shorter formula"));
        }
        self.operators += 1;
        Ok(())
    }

    /// Reject a bare range used where a single value is required.
    fn scalar(&self, expr: Expr, pos: usize) -> Result<Expr> {
        match expr {
            Expr::Range(start, end) => Err(EngineError::InvalidRangeUsage {
                range: format!("{}:{}", start, end),
                position: pos,
            }),
            other => Ok(other),
        }
    }

    fn peek_op(&self, accept: fn(BinaryOp) -> bool) -> Option<BinaryOp> {
        match self.peek() {
            TokenKind::Op(op) if accept(*op) => Some(*op),
            _ => None,
        }
    }

    fn parse_left_assoc(
        &mut self,
        accept: fn(BinaryOp) -> bool,
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let start = self.pos();
        let mut left = next(self)?;
        while let Some(op) = self.peek_op(accept) {
            left = self.scalar(left, start)?;
            self.count_operator()?;
            self.advance();
            let right_start = self.pos();
            let right = next(self)?;
            let right = self.scalar(right, right_start)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        self.parse_left_assoc(|op| op.is_comparison(), Self::parse_concat)
    }

    fn parse_concat(&mut self) -> Result<Expr> {
        self.parse_left_assoc(|op| op == BinaryOp::Concat, Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        self.parse_left_assoc(
            |op| matches!(op, BinaryOp::Add | BinaryOp::Sub),
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        self.parse_left_assoc(
            |op| matches!(op, BinaryOp::Mul | BinaryOp::Div),
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.enter()?;
        let expr = self.parse_signed()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn parse_signed(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            TokenKind::Op(BinaryOp::Sub) => UnaryOp::Neg,
            TokenKind::Op(BinaryOp::Add) => UnaryOp::Plus,
            _ => return self.parse_power(),
        };
        self.advance();
        let start = self.pos();
        let operand = self.parse_unary()?;
        let operand = self.scalar(operand, start)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> Result<Expr> {
        let start = self.pos();
        let base = self.parse_primary()?;
        if self.peek_op(|op| op == BinaryOp::Pow).is_none() {
            return Ok(base);
        }
        let base = self.scalar(base, start)?;
        self.count_operator()?;
        self.advance();
        let exp_start = self.pos();
        let exponent = self.parse_unary()?;
        let exponent = self.scalar(exponent, exp_start)?;
        Ok(Expr::binary(BinaryOp::Pow, base, exponent))
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Text(s) => Ok(Expr::Text(s)),
            TokenKind::LParen => {
                let start = self.pos();
                let inner = self.parse_comparison()?;
                let inner = self.scalar(inner, start)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                // A call needs the '(' right after the name: `A1 (2)` is not one.
                if *self.peek() == TokenKind::LParen && self.pos() == token.pos + name.len() {
                    self.advance();
                    return self.parse_call(name.to_ascii_uppercase());
                }
                if name.eq_ignore_ascii_case("TRUE") {
                    return Ok(Expr::Bool(true));
                }
                if name.eq_ignore_ascii_case("FALSE") {
                    return Ok(Expr::Bool(false));
                }
                let start = self.reference(&name, token.pos)?;
                if *self.peek() != TokenKind::Colon {
                    return Ok(Expr::CellRef(start));
                }
                self.advance();
                let end_token = self.advance();
                let TokenKind::Ident(end_name) = end_token.kind else {
                    return Err(EngineError::syntax(end_token.pos, "cell reference after ':'"));
                };
                let end = self.reference(&end_name, end_token.pos)?;
                match range_size(&start, &end) {
                    Some(cells) if cells <= MAX_DEPENDENCY_RANGE_CELLS => Ok(Expr::Range(start, end)),
                    cells => Err(EngineError::RangeTooLarge {
                        range: format!("{}:{}", start, end),
                        position: token.pos,
                        cells: cells.unwrap_or(usize::MAX),
                        max: MAX_DEPENDENCY_RANGE_CELLS,
                    }),
                }
            }
            TokenKind::Eof => Err(EngineError::syntax(token.pos, "expression")),
            TokenKind::RParen => Err(EngineError::syntax(token.pos, "expression before ')'")),
            _ => Err(EngineError::syntax(token.pos, "expression")),
        }
    }

    fn reference(&self, name: &str, pos: usize) -> Result<Address> {
        if Address::decode(name).is_err() {
            return Err(EngineError::syntax(pos, "cell reference or function call"));
        }
        self.bounds.resolve(name)
    }

    fn parse_call(&mut self, name: String) -> Result<Expr> {
        // Unknown names may take ranges; they evaluate to #NAME? regardless.
        let accepts_ranges = Function::from_name(&name).is_none_or(|f| f.accepts_ranges());
        let mut args = Vec::new();

        if *self.peek() == TokenKind::RParen {
            self.advance();
            return Ok(Expr::FunctionCall { name, args });
        }

        loop {
            let start = self.pos();
            let arg = self.parse_comparison()?;
            let arg = if accepts_ranges {
                arg
            } else {
                self.scalar(arg, start)?
            };
            args.push(arg);

            match self.peek() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                _ => return Err(EngineError::syntax(self.pos(), "',' or ')'")),
            }
        }

        Ok(Expr::FunctionCall { name, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Expr> {
        parse_formula(text, &GridBounds::default())
    }

    fn a(text: &str) -> Address {
        Address::decode(text).unwrap()
    }

    #[test]
    fn test_precedence() {
        let expr = parse("=1+2*3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                Expr::Number(1.0),
                Expr::binary(BinaryOp::Mul, Expr::Number(2.0), Expr::Number(3.0)),
            )
        );
    }

    #[test]
    fn test_power_is_right_associative_and_binds_tighter_than_sign() {
        let expr = parse("=-2^3^2").unwrap();
        assert_eq!(expr.to_string(), "-(2 ^ (3 ^ 2))");
    }

    #[test]
    fn test_references_and_ranges() {
        let expr = parse("=SUM(a1:B10, C3) + d4").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                Expr::FunctionCall {
                    name: "SUM".to_string(),
                    args: vec![Expr::Range(a("A1"), a("B10")), Expr::CellRef(a("C3"))],
                },
                Expr::CellRef(a("D4")),
            )
        );
    }

    #[test]
    fn test_string_literals_and_concat() {
        let expr = parse(r#"="say ""hi"" " & A1"#).unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Concat,
                Expr::Text("say \"hi\" ".to_string()),
                Expr::CellRef(a("A1")),
            )
        );
    }

    #[test]
    fn test_comparisons_and_booleans() {
        assert_eq!(parse("=A1>=10").unwrap().to_string(), "(A1 >= 10)");
        assert_eq!(parse("=1<>2").unwrap().to_string(), "(1 <> 2)");
        assert_eq!(parse("=true").unwrap(), Expr::Bool(true));
    }

    #[test]
    fn test_unknown_function_is_parsed() {
        let expr = parse("=unknownfn(A1)").unwrap();
        assert_eq!(
            expr,
            Expr::FunctionCall {
                name: "UNKNOWNFN".to_string(),
                args: vec![Expr::CellRef(a("A1"))],
            }
        );
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(matches!(
            parse("=(1+2"),
            Err(EngineError::FormulaSyntax { position: 5, .. })
        ));
        assert!(matches!(
            parse("=1+2)"),
            Err(EngineError::FormulaSyntax { position: 4, .. })
        ));
    }

    #[test]
    fn test_trailing_and_unknown_tokens() {
        assert!(matches!(
            parse("=1 2"),
            Err(EngineError::FormulaSyntax { position: 3, .. })
        ));
        assert!(matches!(
            parse("=1 # 2"),
            Err(EngineError::FormulaSyntax { position: 3, .. })
        ));
        assert!(matches!(
            parse("="),
            Err(EngineError::FormulaSyntax { position: 1, .. })
        ));
        assert!(matches!(
            parse("=\"open"),
            Err(EngineError::FormulaSyntax { .. })
        ));
        assert!(matches!(
            parse("=SUM(A1,)"),
            Err(EngineError::FormulaSyntax { position: 8, .. })
        ));
    }

    #[test]
    fn test_bare_identifier_is_a_syntax_error() {
        assert!(matches!(
            parse("=total"),
            Err(EngineError::FormulaSyntax { position: 1, .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_reference() {
        assert!(matches!(
            parse("=A51"),
            Err(EngineError::InvalidAddress { text }) if text == "A51"
        ));
        assert!(parse_formula("=A51", &GridBounds::new(100, 26)).is_ok());
    }

    #[test]
    fn test_range_as_scalar_operand() {
        assert!(matches!(
            parse("=A1:A3+1"),
            Err(EngineError::InvalidRangeUsage { position: 1, .. })
        ));
        assert!(matches!(
            parse("=1+A1:A3"),
            Err(EngineError::InvalidRangeUsage { position: 3, .. })
        ));
        assert!(matches!(
            parse("=A1:A3"),
            Err(EngineError::InvalidRangeUsage { .. })
        ));
        assert!(matches!(
            parse("=IF(A1:A3, 1, 2)"),
            Err(EngineError::InvalidRangeUsage { position: 4, .. })
        ));
        assert!(matches!(
            parse("=SUM(A1:A3*2)"),
            Err(EngineError::InvalidRangeUsage { position: 5, .. })
        ));
    }

    #[test]
    fn test_range_functions_accept_ranges() {
        for name in ["SUM", "AVERAGE", "COUNT", "MAX", "MIN"] {
            assert!(parse(&format!("={}(A1:B2)", name)).is_ok(), "{name}");
        }
        assert!(parse("=VLOOKUP(1, A1:B5, 2)").is_ok());
    }

    #[test]
    fn test_deep_nesting_is_refused() {
        let depth = 10_000;
        let nested = format!("={}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(
            parse(&nested),
            Err(EngineError::FormulaSyntax { expected, .. }) if expected == "shallower nesting"
        ));

        let signs = format!("={}1", "-".repeat(200_000));
        assert!(matches!(parse(&signs), Err(EngineError::FormulaSyntax { .. })));

        let powers = format!("=2{}", "^2".repeat(10_000));
        assert!(parse(&powers).is_err());

        let shallow = format!("={}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(parse(&shallow).unwrap(), Expr::Number(1.0));
    }

    #[test]
    fn test_long_operator_chains() {
        let sum = format!("=1{}", "+1".repeat(500));
        assert!(parse(&sum).is_ok());

        let too_long = format!("=1{}", "+1".repeat(100_000));
        assert!(matches!(
            parse(&too_long),
            Err(EngineError::FormulaSyntax { expected, .. }) if expected == "shorter formula"
        ));
    }

    #[test]
    fn test_oversized_range_is_refused() {
        let bounds = GridBounds::new(2_000_000, 1);
        assert!(matches!(
            parse_formula("=SUM(A1:A1500000)", &bounds),
            Err(EngineError::RangeTooLarge { position: 5, cells: 1_500_000, .. })
        ));
        assert!(parse_formula("=SUM(A1:A1000000)", &bounds).is_ok());
    }

    #[test]
    fn test_call_needs_adjacent_paren() {
        assert!(matches!(
            parse("=A1 (2)"),
            Err(EngineError::FormulaSyntax { position: 4, .. })
        ));
        assert!(matches!(
            parse("=SUM (A1)"),
            Err(EngineError::FormulaSyntax { position: 1, .. })
        ));
    }

    #[test]
    fn test_dot_ends_an_identifier() {
        assert!(matches!(
            parse("=A1.5"),
            Err(EngineError::FormulaSyntax { position: 3, .. })
        ));
    }

    #[test]
    fn test_leading_equals_optional() {
        assert_eq!(parse("1+1").unwrap(), parse("=1+1").unwrap());
    }
}
