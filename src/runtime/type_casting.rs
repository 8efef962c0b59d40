//! Explicit conversions between dynamic value variants.
//!
//! Each conversion accepts a fixed set of source variants and fails with
//! [`Error::TypeCoercion`] for everything else. Only [`to_string`] is total.

use crate::error::Error;
use crate::types::Value;

fn unsupported(v: &Value, target: &str) -> Error {
    Error::type_coercion(format!("cannot convert {} to {}", v.type_name(), target))
}

fn malformed(s: &str, target: &str) -> Error {
    Error::type_coercion(format!("cannot parse {:?} as {}", s, target))
}

/// Textual form: integers in decimal, floats in shortest round-trip form
/// (`+Inf`, `-Inf` and `NaN` when not finite), strings unchanged, everything
/// else through `Display`.
pub fn to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Platform-width integer, used for lengths and offsets.
pub fn to_int(v: &Value) -> Result<isize, Error> {
    match v {
        Value::Int(n) => Ok(*n as isize),
        Value::Float(n) => Ok(*n as isize),
        Value::String(s) => s.parse::<isize>().map_err(|_| malformed(s, "int")),
        other => Err(unsupported(other, "int")),
    }
}

pub fn to_int64(v: &Value) -> Result<i64, Error> {
    match v {
        Value::Int(n) => Ok(*n),
        Value::Float(n) => Ok(*n as i64),
        Value::String(s) => s.parse::<i64>().map_err(|_| malformed(s, "int64")),
        other => Err(unsupported(other, "int64")),
    }
}

pub fn to_float32(v: &Value) -> Result<f32, Error> {
    match v {
        Value::Int(n) => Ok(*n as f32),
        Value::Float(n) => Ok(*n as f32),
        Value::String(s) => s
            .parse::<f64>()
            .map(|f| f as f32)
            .map_err(|_| malformed(s, "float32")),
        other => Err(unsupported(other, "float32")),
    }
}

pub fn to_float64(v: &Value) -> Result<f64, Error> {
    match v {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        Value::String(s) => s.parse::<f64>().map_err(|_| malformed(s, "float64")),
        other => Err(unsupported(other, "float64")),
    }
}

/// Integers are true only when exactly 1, not when merely nonzero.
pub fn to_bool(v: &Value) -> Result<bool, Error> {
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Int(n) => Ok(*n == 1),
        Value::String(s) => match s.as_str() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(malformed(s, "bool")),
        },
        other => Err(unsupported(other, "bool")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn string_rendering() {
        assert_eq!(to_string(&Value::Int(123)), "123");
        assert_eq!(to_string(&Value::Float(2.5)), "2.5");
        assert_eq!(to_string(&Value::Float(3.0)), "3");
        assert_eq!(to_string(&Value::Float(1e21)), "1000000000000000000000");
        assert_eq!(to_string(&Value::String("x".into())), "x");
        assert_eq!(to_string(&Value::Bool(false)), "false");
        assert_eq!(to_string(&Value::Nil), "<nil>");
        let ts = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(to_string(&Value::Timestamp(ts)), "2020-01-02 03:04:05 UTC");
    }

    #[test]
    fn integer_conversions_truncate_toward_zero() {
        assert_eq!(to_int64(&Value::Float(2.9)).unwrap(), 2);
        assert_eq!(to_int64(&Value::Float(-2.9)).unwrap(), -2);
        assert_eq!(to_int(&Value::Float(7.7)).unwrap(), 7);
        assert_eq!(to_int64(&Value::String("-42".into())).unwrap(), -42);
        assert_eq!(to_int(&Value::String("+9".into())).unwrap(), 9);
    }

    #[test]
    fn integer_conversion_failures() {
        assert!(matches!(to_int64(&Value::String("4.2".into())), Err(Error::TypeCoercion(_))));
        assert!(matches!(to_int64(&Value::String("abc".into())), Err(Error::TypeCoercion(_))));
        assert!(matches!(to_int64(&Value::Bool(true)), Err(Error::TypeCoercion(_))));
        assert!(matches!(to_int(&Value::Nil), Err(Error::TypeCoercion(_))));
    }

    #[test]
    fn float_conversions() {
        assert_eq!(to_float64(&Value::Int(3)).unwrap(), 3.0);
        assert_eq!(to_float64(&Value::String("2.25".into())).unwrap(), 2.25);
        assert_eq!(to_float32(&Value::Float(0.5)).unwrap(), 0.5f32);
        assert_eq!(to_float32(&Value::String("1.5".into())).unwrap(), 1.5f32);
        assert!(matches!(to_float64(&Value::String("x1".into())), Err(Error::TypeCoercion(_))));
        assert!(matches!(to_float32(&Value::Bool(false)), Err(Error::TypeCoercion(_))));
    }

    #[test]
    fn bool_conversion_is_strict() {
        assert!(to_bool(&Value::Int(1)).unwrap());
        assert!(!to_bool(&Value::Int(2)).unwrap());
        assert!(!to_bool(&Value::Int(0)).unwrap());
        assert!(to_bool(&Value::String("True".into())).unwrap());
        assert!(!to_bool(&Value::String("f".into())).unwrap());
        assert!(matches!(to_bool(&Value::String("yes".into())), Err(Error::TypeCoercion(_))));
        assert!(matches!(to_bool(&Value::Float(1.0)), Err(Error::TypeCoercion(_))));
        assert!(matches!(to_bool(&Value::Nil), Err(Error::TypeCoercion(_))));
    }
}
