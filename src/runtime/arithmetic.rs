use crate::ast::BinaryOp;
use crate::error::Error;
use crate::types::Value;

fn compare<T: PartialOrd>(op: BinaryOp, x: T, y: T) -> Option<bool> {
    Some(match op {
        BinaryOp::Eq => x == y,
        BinaryOp::Ne => x != y,
        BinaryOp::Gt => x > y,
        BinaryOp::Lt => x < y,
        BinaryOp::Ge => x >= y,
        BinaryOp::Le => x <= y,
        _ => return None,
    })
}

fn unsupported(op: BinaryOp) -> Error {
    Error::unsupported_operator(format!("operator {} is not defined for numbers", op))
}

/// Integer operators. Arithmetic wraps on overflow and division by zero yields 0.
pub fn eval_int(op: BinaryOp, x: i64, y: i64) -> Result<Value, Error> {
    if let Some(b) = compare(op, x, y) {
        return Ok(Value::Bool(b));
    }
    Ok(Value::Int(match op {
        BinaryOp::Add => x.wrapping_add(y),
        BinaryOp::Sub => x.wrapping_sub(y),
        BinaryOp::Mul => x.wrapping_mul(y),
        BinaryOp::Div => {
            if y == 0 {
                0
            } else {
                x.wrapping_div(y)
            }
        }
        _ => return Err(unsupported(op)),
    }))
}

/// Float operators. Division by zero yields `Float(0.0)` instead of an infinity or NaN;
/// the result keeps the float variant.
pub fn eval_float(op: BinaryOp, x: f64, y: f64) -> Result<Value, Error> {
    if let Some(b) = compare(op, x, y) {
        return Ok(Value::Bool(b));
    }
    Ok(Value::Float(match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div => {
            if y == 0.0 {
                0.0
            } else {
                x / y
            }
        }
        _ => return Err(unsupported(op)),
    }))
}
