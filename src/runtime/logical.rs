use crate::ast::BinaryOp;
use crate::error::Error;
use crate::types::Value;

/// Boolean operators; both operands are already coerced.
pub fn eval_bool(op: BinaryOp, x: bool, y: bool) -> Result<Value, Error> {
    match op {
        BinaryOp::And => Ok(Value::Bool(x && y)),
        BinaryOp::Or => Ok(Value::Bool(x || y)),
        BinaryOp::Eq => Ok(Value::Bool(x == y)),
        BinaryOp::Ne => Ok(Value::Bool(x != y)),
        _ => Err(Error::unsupported_operator(format!(
            "operator {} is not defined for bool",
            op
        ))),
    }
}

/// String operators: equality and concatenation only.
pub fn eval_string(op: BinaryOp, x: String, y: String) -> Result<Value, Error> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(x == y)),
        BinaryOp::Ne => Ok(Value::Bool(x != y)),
        BinaryOp::Add => Ok(Value::String(x + &y)),
        _ => Err(Error::unsupported_operator(format!(
            "operator {} is not defined for string",
            op
        ))),
    }
}
