use crate::custom::{CustomFunction, FunctionRegistry};
use super::datetime::DateParse;
use super::string::{Contact, IndexOf, LeftPad, RightPad, SubStr};

/// The built-in function library, in registration order.
pub fn builtins() -> Vec<Box<dyn CustomFunction>> {
    vec![
        Box::new(LeftPad),
        Box::new(RightPad),
        Box::new(DateParse),
        Box::new(SubStr),
        Box::new(Contact),
        Box::new(IndexOf),
    ]
}

pub fn register_builtins(registry: &mut FunctionRegistry) {
    for function in builtins() {
        // Built-in definitions are static and always valid.
        if let Err(e) = registry.register(function) {
            tracing::error!(error = %e, "failed to register built-in function");
        }
    }
}
