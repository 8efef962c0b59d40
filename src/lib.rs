//! fieldexpr: a small embedded expression language.
//!
//! An expression such as `left_pad(code, "0", 6) == "000042" && amount > 10` is
//! parsed once, cached by its text, and evaluated against a map of variables:
//!
//! ```rust
//! use fieldexpr::{evaluate, Value};
//! use std::collections::HashMap;
//!
//! let mut vars = HashMap::new();
//! vars.insert("a".to_string(), Value::Int(1));
//! vars.insert("b".to_string(), Value::Int(2));
//! assert_eq!(evaluate("a + b", &vars).unwrap(), Value::Int(3));
//! ```

pub mod ast;
pub mod cache;
pub mod custom;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod types;

pub use ast::Expr;
pub use cache::{CacheStats, ExpressionCache};
pub use custom::{CustomFunction, FunctionRegistry, NativeFunction};
pub use error::Error;
pub use runtime::Scope;
pub use types::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

// Global function registry and expression cache. Evaluations run against an
// `Arc` snapshot of the registry, so the lock is never held while handlers run.
lazy_static::lazy_static! {
    static ref GLOBAL_REGISTRY: RwLock<Arc<FunctionRegistry>> =
        RwLock::new(Arc::new(FunctionRegistry::with_builtins()));
    static ref EXPRESSION_CACHE: ExpressionCache = ExpressionCache::new();
}

/// Parse an expression into an AST without consulting the cache.
pub fn parse(input: &str) -> Result<Expr, Error> {
    let mut parser = parser::Parser::new(input)?;
    parser.parse()
}

/// Evaluate an expression against a map of variables.
///
/// The parsed form of `input` is cached process-wide; unknown variables evaluate to `Nil`.
#[tracing::instrument(level = "trace", skip(vars), err(level = "debug"))]
pub fn evaluate(input: &str, vars: &HashMap<String, Value>) -> Result<Value, Error> {
    let expr = EXPRESSION_CACHE.resolve(input)?;
    let registry = registry_snapshot();
    runtime::eval_with_registry(&expr, vars, &registry)
}

/// Evaluate with variables provided as a JSON object string.
/// JSON format: {"var1": "value1", "var2": 42, "var3": true}
pub fn evaluate_with_json(input: &str, json_vars: &str) -> Result<Value, Error> {
    let vars = vars_from_json(json_vars)?;
    evaluate(input, &vars)
}

/// Build a variable map from a JSON object.
///
/// Integers become `Int`, other numbers `Float`, `null` becomes `Nil`; nested
/// arrays and objects are kept as their compact JSON text.
pub fn vars_from_json(json_vars: &str) -> Result<HashMap<String, Value>, Error> {
    let json_value: serde_json::Value = serde_json::from_str(json_vars)
        .map_err(|e| Error::InvalidVariables(format!("Invalid JSON: {}", e)))?;

    match json_value {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| (key, json_to_value(value)))
            .collect()),
        _ => Err(Error::InvalidVariables(
            "JSON must be an object with key-value pairs".to_string(),
        )),
    }
}

/// Convert serde_json::Value to a dynamic value
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        nested @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
            Value::String(nested.to_string())
        }
    }
}

fn registry_snapshot() -> Arc<FunctionRegistry> {
    Arc::clone(&GLOBAL_REGISTRY.read().unwrap_or_else(PoisonError::into_inner))
}

/// Register a function globally. Intended for process start-up, before evaluation begins.
///
/// Evaluations already in flight keep the table they started with; the new
/// function is visible to evaluations started afterwards.
pub fn register_function(function: Box<dyn CustomFunction>) -> Result<(), Error> {
    let mut registry = GLOBAL_REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    Arc::make_mut(&mut *registry).register(function)
}

/// Register a closure globally under `name`; the closure checks its own arity.
pub fn register_fn<F>(name: &str, handler: F) -> Result<(), Error>
where
    F: Fn(&[Expr], &Scope<'_>) -> Result<Value, Error> + Send + Sync + 'static,
{
    register_function(Box::new(NativeFunction::new(name, handler)))
}

/// List all globally registered functions, built-ins included
pub fn list_functions() -> Vec<String> {
    registry_snapshot().list_functions().iter().map(|s| s.to_string()).collect()
}

/// Check if a function is registered globally
pub fn has_function(name: &str) -> bool {
    registry_snapshot().has_function(name)
}

/// Statistics for the process-wide expression cache
pub fn cache_stats() -> CacheStats {
    EXPRESSION_CACHE.stats()
}
