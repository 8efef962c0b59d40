use crate::ast::Expr;
use crate::custom::CustomFunction;
use crate::error::Error;
use crate::runtime::type_casting::{to_int, to_string};
use crate::runtime::Scope;
use crate::types::Value;

/// Shared argument handling for the pad functions: (str, padStr, toLength).
fn pad_params(args: &[Expr], scope: &Scope<'_>) -> Result<(String, String, isize), Error> {
    let s = scope.eval(&args[0])?;
    let pad = scope.eval(&args[1])?;
    let len = scope.eval(&args[2])?;
    Ok((to_string(&s), to_string(&pad), to_int(&len)?))
}

/// Longest string the pad functions will build, in bytes.
pub const MAX_PADDED_LEN: usize = 1 << 20;

/// Number of times the pad string gets repeated; one copy per missing byte.
fn pad_count(s: &str, pad: &str, to_length: isize) -> Result<Option<usize>, Error> {
    let len = s.len() as isize;
    if len >= to_length || pad.is_empty() {
        return Ok(None);
    }
    let n = (to_length - len) as usize;
    match pad.len().checked_mul(n).and_then(|added| added.checked_add(s.len())) {
        Some(total) if total <= MAX_PADDED_LEN => Ok(Some(n)),
        _ => Err(Error::illegal_params(format!(
            "padding to length {} exceeds the {} byte limit",
            to_length, MAX_PADDED_LEN
        ))),
    }
}

pub struct LeftPad;

impl CustomFunction for LeftPad {
    fn name(&self) -> &str { "left_pad" }
    fn min_args(&self) -> usize { 3 }
    fn max_args(&self) -> Option<usize> { Some(3) }

    fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
        let (s, pad, to_length) = pad_params(args, scope)?;
        Ok(Value::String(match pad_count(&s, &pad, to_length)? {
            Some(n) => pad.repeat(n) + &s,
            None => s,
        }))
    }

    fn description(&self) -> Option<&str> {
        Some("left_pad(str, pad, length): prepend copies of pad while str is shorter than length")
    }
}

pub struct RightPad;

impl CustomFunction for RightPad {
    fn name(&self) -> &str { "right_pad" }
    fn min_args(&self) -> usize { 3 }
    fn max_args(&self) -> Option<usize> { Some(3) }

    fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
        let (s, pad, to_length) = pad_params(args, scope)?;
        Ok(Value::String(match pad_count(&s, &pad, to_length)? {
            Some(n) => s + &pad.repeat(n),
            None => s,
        }))
    }

    fn description(&self) -> Option<&str> {
        Some("right_pad(str, pad, length): append copies of pad while str is shorter than length")
    }
}

pub struct SubStr;

impl CustomFunction for SubStr {
    fn name(&self) -> &str { "sub_str" }
    fn min_args(&self) -> usize { 3 }
    fn max_args(&self) -> Option<usize> { Some(3) }

    fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
        let values = scope.eval_all(args)?;
        let s = to_string(&values[0]);
        let start = to_int(&values[1])?;
        let end = to_int(&values[2])?;

        let len = s.len() as isize;
        if start < 0 || start > end || end > len {
            return Err(Error::illegal_params(format!(
                "sub_str bounds [{}, {}) out of range for length {}",
                start, end, len
            )));
        }
        let (start, end) = (start as usize, end as usize);
        if !s.is_char_boundary(start) || !s.is_char_boundary(end) {
            return Err(Error::illegal_params(format!(
                "sub_str bounds [{}, {}) split a character",
                start, end
            )));
        }
        Ok(Value::String(s[start..end].to_string()))
    }

    fn description(&self) -> Option<&str> {
        Some("sub_str(str, start, end): bytes [start, end) of str")
    }
}

pub struct Contact;

impl CustomFunction for Contact {
    fn name(&self) -> &str { "contact" }
    fn min_args(&self) -> usize { 0 }
    fn max_args(&self) -> Option<usize> { None }

    fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
        let mut out = String::new();
        for arg in args {
            out.push_str(&to_string(&scope.eval(arg)?));
        }
        Ok(Value::String(out))
    }

    fn description(&self) -> Option<&str> {
        Some("contact(a, b, ...): concatenate the text form of every argument")
    }
}

pub struct IndexOf;

impl CustomFunction for IndexOf {
    fn name(&self) -> &str { "index_of" }
    fn min_args(&self) -> usize { 2 }
    fn max_args(&self) -> Option<usize> { Some(2) }

    fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
        let s = to_string(&scope.eval(&args[0])?);
        let sub = to_string(&scope.eval(&args[1])?);
        Ok(Value::Int(s.find(&sub).map(|i| i as i64).unwrap_or(-1)))
    }

    fn description(&self) -> Option<&str> {
        Some("index_of(str, sub): byte offset of the first sub in str, or -1")
    }
}
