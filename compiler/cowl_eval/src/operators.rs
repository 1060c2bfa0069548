//! Binary and unary operators.
//!
//! Direct enum dispatch over the closed operand set. Integer arithmetic is
//! checked; `&&` and `||` are short-circuited by the interpreter before
//! reaching here, so only their strict forms are implemented.

use std::cmp::Ordering;

use cowl_ir::{BinaryOp, UnaryOp};

use crate::errors::{division_by_zero, integer_overflow, type_mismatch, EvalError, EvalResult};
use crate::Value;

/// Evaluate `left op right`.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => return Ok(Value::Bool(left != right)),
        _ => {}
    }
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(*a, *b, op),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(*a, *b, op),
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinaryOp::And => Ok(Value::Bool(*a && *b)),
            BinaryOp::Or => Ok(Value::Bool(*a || *b)),
            _ => Err(binary_mismatch(left, right, op)),
        },
        (Value::Str(a), Value::Str(b)) => match op {
            BinaryOp::Add => Ok(Value::string(format!("{a}{b}"))),
            _ => compare(a.cmp(b), op).ok_or_else(|| binary_mismatch(left, right, op)),
        },
        (Value::Seq(a), Value::Seq(b)) if op == BinaryOp::Add => Ok(Value::seq(
            a.iter().chain(b.iter()).map(Value::clone_handle).collect(),
        )),
        _ => Err(binary_mismatch(left, right, op)),
    }
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    let checked = |result: Option<i64>, name: &str| {
        result.map(Value::Int).ok_or_else(|| integer_overflow(name))
    };
    match op {
        BinaryOp::Add => checked(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Div if b == 0 => Err(division_by_zero()),
        BinaryOp::Div => checked(a.checked_div(b), "division"),
        BinaryOp::Mod if b == 0 => Err(division_by_zero()),
        BinaryOp::Mod => checked(a.checked_rem(b), "remainder"),
        _ => compare(a.cmp(&b), op)
            .ok_or_else(|| binary_mismatch(&Value::Int(a), &Value::Int(b), op)),
    }
}

fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::Mod => Ok(Value::Float(a % b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
        _ => Err(binary_mismatch(&Value::Float(a), &Value::Float(b), op)),
    }
}

/// Result of an ordering operator, or `None` if `op` isn't one.
fn compare(ordering: Ordering, op: BinaryOp) -> Option<Value> {
    let result = match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => return None,
    };
    Some(Value::Bool(result))
}

#[cold]
fn binary_mismatch(left: &Value, right: &Value, op: BinaryOp) -> EvalError {
    type_mismatch(
        &format!("operands supported by `{op}`"),
        &format!("{} and {}", left.type_name(), right.type_name()),
    )
}

/// Evaluate `op value`.
pub fn evaluate_unary(value: &Value, op: UnaryOp) -> EvalResult {
    match (value, op) {
        (Value::Int(n), UnaryOp::Neg) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("negation")),
        (Value::Float(x), UnaryOp::Neg) => Ok(Value::Float(-x)),
        (Value::Bool(b), UnaryOp::Not) => Ok(Value::Bool(!b)),
        (_, UnaryOp::Neg) => Err(type_mismatch("int or float", value.type_name())),
        (_, UnaryOp::Not) => Err(type_mismatch("bool", value.type_name())),
    }
}
