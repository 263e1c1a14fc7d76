//! Evaluation errors.

use std::fmt;

/// Runtime error raised while evaluating Carrion code.
///
/// Carries a message only; evaluation in this workspace serves catalog
/// ingestion, where the message is surfaced to the client as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        EvalError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

pub(crate) fn wrong_arg_count(name: &str, want: usize, got: usize) -> EvalError {
    EvalError::new(format!("{name} expects {want} argument(s), got {got}"))
}

pub(crate) fn wrong_arg_type(name: &str, want: &str) -> EvalError {
    EvalError::new(format!("{name} expects a {want} argument"))
}

pub(crate) fn undefined(name: &str) -> EvalError {
    EvalError::new(format!("identifier not found: {name}"))
}
