use crate::ast::Expr;
use crate::error::Error;
use crate::runtime::Scope;
use crate::types::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for implementing functions callable from expressions.
///
/// Handlers receive their argument nodes unevaluated, together with the
/// evaluation [`Scope`], so each function decides what to evaluate and when.
///
/// # Example
/// ```rust
/// use fieldexpr::custom::CustomFunction;
/// use fieldexpr::runtime::{type_casting, Scope};
/// use fieldexpr::{Error, Expr, Value};
///
/// struct Double;
///
/// impl CustomFunction for Double {
///     fn name(&self) -> &str { "double" }
///     fn min_args(&self) -> usize { 1 }
///     fn max_args(&self) -> Option<usize> { Some(1) }
///
///     fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
///         let n = type_casting::to_int64(&scope.eval(&args[0])?)?;
///         Ok(Value::Int(n * 2))
///     }
/// }
/// ```
pub trait CustomFunction: Send + Sync {
    /// The name expressions call the function by (case-sensitive)
    fn name(&self) -> &str;

    /// Minimum number of arguments required
    fn min_args(&self) -> usize;

    /// Maximum number of arguments allowed (None = unlimited)
    fn max_args(&self) -> Option<usize>;

    /// Execute the function against unevaluated argument nodes
    fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error>;

    /// Optional: Description of the function for documentation
    fn description(&self) -> Option<&str> {
        None
    }
}

type Handler = dyn Fn(&[Expr], &Scope<'_>) -> Result<Value, Error> + Send + Sync;

/// Adapter registering a plain closure; arity is left to the closure.
pub struct NativeFunction {
    name: String,
    handler: Box<Handler>,
}

impl NativeFunction {
    pub fn new<N, F>(name: N, handler: F) -> Self
    where
        N: Into<String>,
        F: Fn(&[Expr], &Scope<'_>) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Self { name: name.into(), handler: Box::new(handler) }
    }
}

impl CustomFunction for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }
    fn min_args(&self) -> usize {
        0
    }
    fn max_args(&self) -> Option<usize> {
        None
    }
    fn call(&self, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
        (self.handler)(args, scope)
    }
}

/// Name-to-handler table. Populated before evaluation starts and only read afterwards.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn CustomFunction>>,
}

impl FunctionRegistry {
    /// Create a new empty function registry
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    /// Registry pre-populated with the built-in function library
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::runtime::builtin_functions::register_builtins(&mut registry);
        registry
    }

    /// Register a function, replacing any previous one with the same name
    pub fn register(&mut self, function: Box<dyn CustomFunction>) -> Result<(), Error> {
        let name = function.name().to_string();

        if name.is_empty() {
            return Err(Error::InvalidFunction("Function name cannot be empty".to_string()));
        }

        if function.min_args() > function.max_args().unwrap_or(usize::MAX) {
            return Err(Error::InvalidFunction(format!(
                "{}: min_args cannot be greater than max_args",
                name
            )));
        }

        if self.functions.insert(name.clone(), Arc::from(function)).is_some() {
            tracing::warn!(function = %name, "replaced existing function");
        } else {
            tracing::debug!(function = %name, "registered function");
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn CustomFunction> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    /// List all registered function names, sorted
    pub fn list_functions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Validate the argument count and invoke the handler
    pub fn call(&self, name: &str, args: &[Expr], scope: &Scope<'_>) -> Result<Value, Error> {
        let function = self
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))?;

        let arg_count = args.len();
        if arg_count < function.min_args() {
            return Err(Error::illegal_params(format!(
                "{} expects at least {} arguments, got {}",
                name,
                function.min_args(),
                arg_count
            )));
        }

        if let Some(max_args) = function.max_args() {
            if arg_count > max_args {
                return Err(Error::illegal_params(format!(
                    "{} expects at most {} arguments, got {}",
                    name, max_args, arg_count
                )));
            }
        }

        function.call(args, scope)
    }
}
