pub mod arithmetic;
pub mod builtin_functions;
pub mod datetime;
pub mod evaluator;
pub mod logical;
pub mod string;
pub mod type_casting;

// Re-export the main public items
pub use evaluator::{eval_with_registry, Scope};
pub use type_casting::{to_bool, to_float32, to_float64, to_int, to_int64, to_string};
