//! Expression evaluator invariants through the public API.

use rs274ngc::error::{ArithmeticError, Error, SyntaxError};
use rs274ngc::reader::{read_expression, read_parameter_index, read_real_value};
use rs274ngc::ParameterTable;

fn eval(expr: &str) -> f64 {
    let params = ParameterTable::new();
    let mut pos = 0;
    read_real_value(expr, &mut pos, &params).unwrap()
}

#[test]
fn precedence_law_left_to_right_power_chain() {
    // 2**3**2 == (2**3)**2 == 64, not 2**(3**2) == 512.
    assert_eq!(eval("[2**3**2]"), 64.0);
}

#[test]
fn power_binds_tighter_than_multiplication() {
    assert_eq!(eval("[2+3*4**2]"), 50.0);
}

#[test]
fn modulo_is_always_non_negative() {
    // Modulo non-negativity: result takes the sign convention
    // of a positive divisor even for a negative dividend.
    assert_eq!(eval("[-7 mod 3]"), 2.0);
    assert_eq!(eval("[7 mod 3]"), 1.0);
}

#[test]
fn expression_round_trip_through_parameters() {
    let mut params = ParameterTable::new();
    params.set(1, 2.0);
    params.set(2, 3.0);
    let mut pos = 0;
    let value = read_expression("[#1 + #2 * 4]", &mut pos, &params).unwrap();
    assert_eq!(value, 14.0);
}

#[test]
fn unary_functions_compose() {
    assert_eq!(eval("sqrt[abs[-9]]"), 3.0);
}

#[test]
fn divide_by_zero_is_rejected() {
    let params = ParameterTable::new();
    let mut pos = 0;
    let err = read_expression("[1/0]", &mut pos, &params).unwrap_err();
    assert_eq!(err, Error::Arithmetic(ArithmeticError::DivideByZero));
}

#[test]
fn negative_base_to_a_fractional_power_is_rejected() {
    let params = ParameterTable::new();
    let mut pos = 0;
    let err = read_expression("[-2**0.5]", &mut pos, &params).unwrap_err();
    assert_eq!(err, Error::Arithmetic(ArithmeticError::NegativeToNonIntegerPower));
}

#[test]
fn parameter_index_out_of_range_is_rejected() {
    let params = ParameterTable::new();
    let mut pos = 0;
    let err = read_parameter_index("#5401", &mut pos, &params).unwrap_err();
    assert_eq!(err, Error::Syntax(SyntaxError::ParameterOutOfRange { index: 5401 }));
}

#[test]
fn logical_operators_treat_any_nonzero_as_true() {
    assert_eq!(eval("[0 and 5]"), 0.0);
    assert_eq!(eval("[3 and 5]"), 1.0);
    assert_eq!(eval("[0 or 0]"), 0.0);
    assert_eq!(eval("[1 xor 1]"), 0.0);
}
