use crate::ast::{BinaryOp, Expr, LiteralKind, UnaryOp};
use crate::custom::FunctionRegistry;
use crate::error::Error;
use crate::lexer::unquote;
use crate::runtime::type_casting::{to_bool, to_float64, to_int64, to_string};
use crate::runtime::{arithmetic, logical};
use crate::types::Value;
use std::collections::HashMap;

/// Everything an evaluation (and every function handler it reaches) can see:
/// the caller's variables and the function table. Both are read-only.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    vars: &'a HashMap<String, Value>,
    registry: &'a FunctionRegistry,
}

impl<'a> Scope<'a> {
    pub fn new(vars: &'a HashMap<String, Value>, registry: &'a FunctionRegistry) -> Self {
        Self { vars, registry }
    }

    pub fn vars(&self) -> &'a HashMap<String, Value> {
        self.vars
    }

    pub fn registry(&self) -> &'a FunctionRegistry {
        self.registry
    }

    /// Unknown names resolve to `Nil`.
    pub fn lookup(&self, name: &str) -> Value {
        self.vars.get(name).cloned().unwrap_or(Value::Nil)
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, Error> {
        eval_expr(expr, self)
    }

    /// Evaluates arguments left to right, stopping at the first error.
    pub fn eval_all(&self, args: &[Expr]) -> Result<Vec<Value>, Error> {
        args.iter().map(|arg| self.eval(arg)).collect()
    }
}

/// Evaluate a parsed expression against variables and a function registry.
pub fn eval_with_registry(
    expr: &Expr,
    vars: &HashMap<String, Value>,
    registry: &FunctionRegistry,
) -> Result<Value, Error> {
    Scope::new(vars, registry).eval(expr)
}

fn eval_expr(expr: &Expr, scope: &Scope<'_>) -> Result<Value, Error> {
    match expr {
        Expr::Literal { kind, raw } => eval_literal(*kind, raw),
        Expr::Binary(l, op, r) => eval_binary_op(l, *op, r, scope),
        Expr::Call { name, args } => scope.registry.call(name, args, scope),
        Expr::Paren(inner) => eval_expr(inner, scope),
        Expr::Unary(op, e) => eval_unary_op(*op, e, scope),
        Expr::Ident(name) => Ok(match name.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => scope.lookup(name),
        }),
    }
}

fn eval_literal(kind: LiteralKind, raw: &str) -> Result<Value, Error> {
    match kind {
        LiteralKind::Int => raw
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| Error::UnsupportedLiteral(format!("integer literal {}: {}", raw, e))),
        LiteralKind::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| Error::UnsupportedLiteral(format!("float literal {}: {}", raw, e))),
        LiteralKind::String => unquote(raw)
            .map(Value::String)
            .map_err(|msg| Error::UnsupportedLiteral(format!("string literal {}: {}", raw, msg))),
        other => Err(Error::UnsupportedLiteral(format!("{} literal {}", other, raw))),
    }
}

fn eval_unary_op(op: UnaryOp, operand: &Expr, scope: &Scope<'_>) -> Result<Value, Error> {
    let v = eval_expr(operand, scope)?;
    match (op, v) {
        (_, Value::Nil) => Err(Error::nil_operand(format!("operand of unary {} is nil", op))),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, v) => Err(Error::unsupported_operator(format!(
            "unary {} is not defined for {}",
            op,
            v.type_name()
        ))),
    }
}

/// Dispatch is keyed on the left operand's variant only; the right operand is
/// coerced to whatever the left side demands.
fn eval_binary_op(l: &Expr, op: BinaryOp, r: &Expr, scope: &Scope<'_>) -> Result<Value, Error> {
    let x = eval_expr(l, scope)?;
    if x.is_nil() {
        return Err(Error::nil_operand(format!("left operand of {} is nil", op)));
    }
    let y = eval_expr(r, scope)?;
    if y.is_nil() {
        return Err(Error::nil_operand(format!("right operand of {} is nil", op)));
    }

    match &x {
        Value::Int(a) => arithmetic::eval_int(op, *a, to_int64(&y)?),
        Value::Float(a) => arithmetic::eval_float(op, *a, to_float64(&y)?),
        Value::String(_) => logical::eval_string(op, to_string(&x), to_string(&y)),
        Value::Bool(_) => {
            let (a, b) = match (to_bool(&x), to_bool(&y)) {
                (Ok(a), Ok(b)) => (a, b),
                _ => {
                    return Err(Error::type_coercion(format!(
                        "cannot evaluate {} {} {} as booleans",
                        x, op, y
                    )))
                }
            };
            logical::eval_bool(op, a, b)
        }
        other => Err(Error::unsupported_operator(format!(
            "operator {} is not defined for {}",
            op,
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn run(src: &str, vars: &HashMap<String, Value>) -> Result<Value, Error> {
        let expr = Parser::new(src)?.parse()?;
        let registry = FunctionRegistry::with_builtins();
        eval_with_registry(&expr, vars, &registry)
    }

    fn run0(src: &str) -> Result<Value, Error> {
        run(src, &HashMap::new())
    }

    #[test]
    fn literals() {
        assert_eq!(run0("42").unwrap(), Value::Int(42));
        assert_eq!(run0("2.5").unwrap(), Value::Float(2.5));
        assert_eq!(run0(r#""a\tb""#).unwrap(), Value::String("a\tb".into()));
        assert_eq!(run0("`raw\\n`").unwrap(), Value::String("raw\\n".into()));
        assert!(matches!(run0("'c'"), Err(Error::UnsupportedLiteral(_))));
        assert!(matches!(run0("99999999999999999999"), Err(Error::UnsupportedLiteral(_))));
    }

    #[test]
    fn reserved_identifiers_ignore_variables() {
        let mut vars = HashMap::new();
        vars.insert("true".to_string(), Value::Bool(false));
        assert_eq!(run("true", &vars).unwrap(), Value::Bool(true));
        assert_eq!(run("false", &vars).unwrap(), Value::Bool(false));
        assert_eq!(run("missing", &vars).unwrap(), Value::Nil);
    }

    #[test]
    fn left_operand_picks_the_operator_table() {
        let mut vars = HashMap::new();
        vars.insert("i".to_string(), Value::Int(10));
        vars.insert("f".to_string(), Value::Float(2.5));
        vars.insert("s".to_string(), Value::String("4".into()));
        vars.insert("b".to_string(), Value::Bool(true));

        assert_eq!(run("i + f", &vars).unwrap(), Value::Int(12));
        assert_eq!(run("f + i", &vars).unwrap(), Value::Float(12.5));
        assert_eq!(run("i + s", &vars).unwrap(), Value::Int(14));
        assert_eq!(run("s + i", &vars).unwrap(), Value::String("410".into()));
        assert_eq!(run("b == 1", &vars).unwrap(), Value::Bool(true));
        assert_eq!(run("b && \"false\"", &vars).unwrap(), Value::Bool(false));
        assert!(matches!(run("b && 2.0", &vars), Err(Error::TypeCoercion(_))));
        assert!(matches!(run("i + b", &vars), Err(Error::TypeCoercion(_))));
    }

    #[test]
    fn timestamp_left_operand_is_unsupported() {
        let mut vars = HashMap::new();
        vars.insert("ts".to_string(), Value::Timestamp(chrono::Utc::now()));
        assert!(matches!(run("ts == ts", &vars), Err(Error::UnsupportedOperator(_))));
    }

    #[test]
    fn nil_left_operand_short_circuits() {
        // The right side would fail with an unknown function if it were evaluated.
        assert!(matches!(run0("missing + nope()"), Err(Error::NilOperand(_))));
        assert!(matches!(run0("1 + missing"), Err(Error::NilOperand(_))));
        assert!(matches!(run0("1 + nope()"), Err(Error::UnknownFunction(_))));
    }

    #[test]
    fn unary_not_only() {
        assert_eq!(run0("!true").unwrap(), Value::Bool(false));
        assert_eq!(run0("!(1 > 2)").unwrap(), Value::Bool(true));
        assert!(matches!(run0("!5"), Err(Error::UnsupportedOperator(_))));
        assert!(matches!(run0("-5"), Err(Error::UnsupportedOperator(_))));
        assert!(matches!(run0("!missing"), Err(Error::NilOperand(_))));
    }

    #[test]
    fn scope_helpers() {
        let mut vars = HashMap::new();
        vars.insert("a".to_string(), Value::Int(1));
        let registry = FunctionRegistry::new();
        let scope = Scope::new(&vars, &registry);
        let args = vec![Expr::Ident("a".into()), Expr::Ident("b".into())];
        assert_eq!(scope.eval_all(&args).unwrap(), vec![Value::Int(1), Value::Nil]);
        assert!(scope.registry().is_empty());
        assert_eq!(scope.vars().len(), 1);
    }
}
