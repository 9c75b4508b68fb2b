//! Real-value and expression evaluation
//!
//! Recursive-descent, precedence-climbing reader over a preprocessed line.
//! Dispatches real-value productions by first character (`[` expression,
//! `#` parameter reference, alpha unary function, digit/sign/`.` number),
//! and evaluates `[a + b * c]`-style expressions with a value stack and an
//! operator stack.

use crate::error::{ArithmeticError, Error, LexError};
use crate::params::ParameterTable;

/// Binary operators, ordered here only for documentation; precedence comes
/// from [`precedence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Power,
    Times,
    Divide,
    Mod,
    Plus,
    Minus,
    And,
    Or,
    Xor,
}

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Power => 4,
        BinOp::Times | BinOp::Divide | BinOp::Mod => 3,
        BinOp::Plus | BinOp::Minus | BinOp::And | BinOp::Or | BinOp::Xor => 2,
    }
}

enum Tok {
    Op(BinOp),
    Terminator,
}

fn next_char(line: &str, pos: usize) -> Option<char> {
    line[pos..].chars().next()
}

fn read_operator_or_terminator(line: &str, pos: &mut usize) -> Result<Tok, Error> {
    match next_char(line, *pos) {
        Some(']') => {
            *pos += 1;
            Ok(Tok::Terminator)
        }
        Some('*') => {
            if line[*pos..].starts_with("**") {
                *pos += 2;
                Ok(Tok::Op(BinOp::Power))
            } else {
                *pos += 1;
                Ok(Tok::Op(BinOp::Times))
            }
        }
        Some('/') => {
            *pos += 1;
            Ok(Tok::Op(BinOp::Divide))
        }
        Some('+') => {
            *pos += 1;
            Ok(Tok::Op(BinOp::Plus))
        }
        Some('-') => {
            *pos += 1;
            Ok(Tok::Op(BinOp::Minus))
        }
        Some(c) if c.is_ascii_alphabetic() => {
            let rest = &line[*pos..];
            if rest.starts_with("mod") {
                *pos += 3;
                Ok(Tok::Op(BinOp::Mod))
            } else if rest.starts_with("and") {
                *pos += 3;
                Ok(Tok::Op(BinOp::And))
            } else if rest.starts_with("xor") {
                *pos += 3;
                Ok(Tok::Op(BinOp::Xor))
            } else if rest.starts_with("or") {
                *pos += 2;
                Ok(Tok::Op(BinOp::Or))
            } else {
                Err(ArithmeticError::UnknownOperation.into())
            }
        }
        _ => Err(LexError::UnclosedExpression.into()),
    }
}

fn apply_binop(left: f64, op: BinOp, right: f64) -> Result<f64, Error> {
    Ok(match op {
        BinOp::Divide => {
            if right == 0.0 {
                return Err(ArithmeticError::DivideByZero.into());
            }
            left / right
        }
        BinOp::Mod => {
            let mut r = left % right;
            if r < 0.0 {
                r += right.abs();
            }
            r
        }
        BinOp::Power => {
            if left < 0.0 && right.fract() != 0.0 {
                return Err(ArithmeticError::NegativeToNonIntegerPower.into());
            }
            left.powf(right)
        }
        BinOp::Times => left * right,
        BinOp::Minus => left - right,
        BinOp::Plus => left + right,
        BinOp::And => {
            if left == 0.0 || right == 0.0 {
                0.0
            } else {
                1.0
            }
        }
        BinOp::Or => {
            if left != 0.0 || right != 0.0 {
                1.0
            } else {
                0.0
            }
        }
        BinOp::Xor => {
            if (left == 0.0) != (right == 0.0) {
                1.0
            } else {
                0.0
            }
        }
    })
}

/// Read a bracketed expression, with `line[*pos]` positioned at the opening `[`.
///
/// Consumes through the matching `]`. Evaluates left-to-right among
/// same-precedence operators, per the precedence-climbing rule below.
pub fn read_expression(
    line: &str,
    pos: &mut usize,
    params: &ParameterTable,
) -> Result<f64, Error> {
    debug_assert_eq!(next_char(line, *pos), Some('['));
    *pos += 1;

    let mut values = vec![read_real_value(line, pos, params)?];
    let mut ops: Vec<BinOp> = Vec::new();

    loop {
        match read_operator_or_terminator(line, pos)? {
            Tok::Terminator => {
                while let Some(op) = ops.pop() {
                    let right = values.pop().expect("value stack underflow");
                    let left = values.pop().expect("value stack underflow");
                    values.push(apply_binop(left, op, right)?);
                }
                return Ok(values.pop().expect("expression produced no value"));
            }
            Tok::Op(new_op) => {
                while let Some(&top) = ops.last() {
                    if precedence(new_op) <= precedence(top) {
                        let op = ops.pop().unwrap();
                        let right = values.pop().expect("value stack underflow");
                        let left = values.pop().expect("value stack underflow");
                        values.push(apply_binop(left, op, right)?);
                    } else {
                        break;
                    }
                }
                ops.push(new_op);
                values.push(read_real_value(line, pos, params)?);
            }
        }
    }
}

const UNARY_NAMES: &[&str] = &[
    "abs", "acos", "asin", "atan", "cos", "exp", "fix", "fup", "ln", "round", "sin", "sqrt", "tan",
];

fn read_name(line: &str, pos: &mut usize) -> String {
    let start = *pos;
    let bytes = line.as_bytes();
    while *pos < bytes.len() && (bytes[*pos] as char).is_ascii_alphabetic() {
        *pos += 1;
    }
    line[start..*pos].to_string()
}

/// Read a unary-function real value (`abs[...]`, `atan[...]/[...]`, etc.),
/// with `line[*pos]` positioned at the function name's first letter.
fn read_unary_function(
    line: &str,
    pos: &mut usize,
    params: &ParameterTable,
) -> Result<f64, Error> {
    let start = *pos;
    let name = read_name(line, pos);
    if !UNARY_NAMES.contains(&name.as_str()) {
        return Err(LexError::UnknownWord {
            word: name,
            pos: start,
        }
        .into());
    }

    if next_char(line, *pos) != Some('[') {
        return Err(LexError::UnclosedExpression.into());
    }
    let arg = read_expression(line, pos, params)?;

    if name == "atan" {
        if next_char(line, *pos) != Some('/') {
            return Err(LexError::UnknownWord {
                word: "atan (missing '/')".to_string(),
                pos: start,
            }
            .into());
        }
        *pos += 1;
        if next_char(line, *pos) != Some('[') {
            return Err(LexError::UnclosedExpression.into());
        }
        let divisor = read_expression(line, pos, params)?;
        return Ok(arg.atan2(divisor).to_degrees());
    }

    apply_unary(&name, arg)
}

fn apply_unary(name: &str, v: f64) -> Result<f64, Error> {
    Ok(match name {
        "abs" => v.abs(),
        "acos" => {
            if !(-1.0..=1.0).contains(&v) {
                return Err(ArithmeticError::AcosOutOfRange.into());
            }
            v.acos().to_degrees()
        }
        "asin" => {
            if !(-1.0..=1.0).contains(&v) {
                return Err(ArithmeticError::AsinOutOfRange.into());
            }
            v.asin().to_degrees()
        }
        "cos" => v.to_radians().cos(),
        "exp" => v.exp(),
        "fix" => v.floor(),
        "fup" => v.ceil(),
        "ln" => {
            if v <= 0.0 {
                return Err(ArithmeticError::NonPositiveArgumentToLn.into());
            }
            v.ln()
        }
        "round" => v.round(),
        "sin" => v.to_radians().sin(),
        "sqrt" => {
            if v < 0.0 {
                return Err(ArithmeticError::NegativeArgumentToSqrt.into());
            }
            v.sqrt()
        }
        "tan" => v.to_radians().tan(),
        _ => unreachable!("validated against UNARY_NAMES"),
    })
}

/// Read a real number literal: optional sign, mantissa with at most one
/// decimal point, at least one digit, strict (no trailing garbage consumed
/// beyond the number itself).
fn read_real_number(line: &str, pos: &mut usize) -> Result<f64, Error> {
    let start = *pos;
    let bytes = line.as_bytes();
    let mut i = *pos;

    if i < bytes.len() && (bytes[i] as char == '+' || bytes[i] as char == '-') {
        i += 1;
    }

    let mut saw_digit = false;
    let mut saw_dot = false;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_digit() {
            saw_digit = true;
            i += 1;
        } else if c == '.' && !saw_dot {
            saw_dot = true;
            i += 1;
        } else {
            break;
        }
    }

    if !saw_digit {
        return Err(LexError::BadNumberFormat { pos: start }.into());
    }

    let text = &line[start..i];
    let value: f64 = text
        .parse()
        .map_err(|_| Error::from(LexError::BadNumberFormat { pos: start }))?;
    *pos = i;
    Ok(value)
}

/// Read a parameter reference, with `line[*pos]` positioned at `#`.
///
/// Looks up the (already-committed) value; does not stage a write. Used both
/// for parameter references inside expressions and for the index of a
/// parameter-setting item (`#<index> = ...`), for which the caller reads the
/// index separately via [`read_parameter_index`].
fn read_parameter_reference(
    line: &str,
    pos: &mut usize,
    params: &ParameterTable,
) -> Result<f64, Error> {
    let index = read_parameter_index(line, pos, params)?;
    Ok(params.get(index))
}

/// Read the integer parameter index following a `#`, with `line[*pos]`
/// positioned at the `#`. Validates `1..=5400`.
pub fn read_parameter_index(
    line: &str,
    pos: &mut usize,
    params: &ParameterTable,
) -> Result<i32, Error> {
    debug_assert_eq!(next_char(line, *pos), Some('#'));
    *pos += 1;
    let raw = read_real_value(line, pos, params)?;
    let index = raw.round() as i32;
    if !(1..=5400).contains(&index) {
        return Err(crate::error::SyntaxError::ParameterOutOfRange { index }.into());
    }
    Ok(index)
}

/// Read one real-value production, dispatching on the first character.
pub fn read_real_value(line: &str, pos: &mut usize, params: &ParameterTable) -> Result<f64, Error> {
    match next_char(line, *pos) {
        Some('[') => read_expression(line, pos, params),
        Some('#') => read_parameter_reference(line, pos, params),
        Some(c) if c.is_ascii_alphabetic() => read_unary_function(line, pos, params),
        Some(c) if c.is_ascii_digit() || c == '+' || c == '-' || c == '.' => {
            read_real_number(line, pos)
        }
        Some(c) => Err(LexError::BadCharacter { ch: c, pos: *pos }.into()),
        None => Err(LexError::UnclosedExpression.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(s: &str) -> f64 {
        let params = ParameterTable::new();
        let mut pos = 0;
        read_real_value(s, &mut pos, &params).unwrap()
    }

    #[test]
    fn plain_number() {
        assert_eq!(eval("1.5"), 1.5);
        assert_eq!(eval("-2.25"), -2.25);
    }

    #[test]
    fn precedence_law() {
        assert_eq!(eval("[2+3*4]"), 14.0);
    }

    #[test]
    fn left_to_right_power_chain() {
        // [2**3**2] = [[2**3]**2] = 64, not 512 (left-to-right, not right-associative)
        assert_eq!(eval("[2**3**2]"), 64.0);
    }

    #[test]
    fn modulo_is_nonnegative() {
        assert_eq!(eval("[-7mod3]"), 2.0);
        assert_eq!(eval("[7mod-3]"), 1.0);
    }

    #[test]
    fn atan_two_argument() {
        let v = eval("atan[1]/[1]");
        assert!((v - 45.0).abs() < 1e-9);
    }

    #[test]
    fn divide_by_zero_errors() {
        let params = ParameterTable::new();
        let mut pos = 0;
        let err = read_real_value("[1/0]", &mut pos, &params).unwrap_err();
        assert_eq!(err, ArithmeticError::DivideByZero.into());
    }

    #[test]
    fn parameter_reference_reads_stored_value() {
        let mut params = ParameterTable::new();
        params.set(1, 2.0);
        let mut pos = 0;
        let v = read_real_value("[#1+3]", &mut pos, &params).unwrap();
        assert_eq!(v, 5.0);
    }

    #[test]
    fn round_ties_away_from_zero() {
        assert_eq!(eval("round[2.5]"), 3.0);
        assert_eq!(eval("round[-2.5]"), -3.0);
    }
}
