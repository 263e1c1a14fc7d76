//! Tree-walking evaluator for Carrion.
//!
//! This crate exists for the language server's catalog: it maintains a
//! live [`Environment`], bootstraps the bundled stdlib into it, and
//! evaluates ingested package sources so their grimoires and spells become
//! enumerable bindings. It is a faithful-enough interpreter for that job,
//! not a production runtime.

mod builtins;
mod environment;
mod errors;
mod interpreter;
mod stdlib;
mod value;

pub use builtins::builtins;
pub use environment::Environment;
pub use errors::{EvalError, EvalResult};
pub use interpreter::eval_program;
pub use stdlib::{load_stdlib, STDLIB_SOURCE};
pub use value::{BuiltinFn, BuiltinValue, ClassValue, FunctionValue, InstanceValue, Value};
