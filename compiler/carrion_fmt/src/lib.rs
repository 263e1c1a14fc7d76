//! Canonical formatter for Carrion source.
//!
//! Round-trips a document through the AST: parse, walk statements in
//! order, render each form to its canonical layout. Formatting is defined
//! only for source that parses cleanly: [`format_source`] refuses input
//! with parse errors so a formatter run can never destroy code it did not
//! understand.
//!
//! The renderer is idempotent: formatting already-formatted output yields
//! the same text, and reparsing the output yields a structurally equal
//! program (grouping parentheses are re-derived from operator precedence).

mod config;
mod formatter;

pub use config::FormatConfig;
pub use formatter::Formatter;

use carrion_ir::ast::{Expression, Program};
use carrion_parse::ParseError;
use std::fmt;

/// Why formatting produced no output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// The document does not parse; the offending errors are attached.
    Parse(Vec<ParseError>),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Parse(errors) => {
                write!(f, "cannot format source with {} parse error(s)", errors.len())
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Format a whole document. Errors when the source has parse errors.
pub fn format_source(source: &str, config: &FormatConfig) -> Result<String, FormatError> {
    let (program, errors) = carrion_parse::parse(source);
    if !errors.is_empty() {
        return Err(FormatError::Parse(errors));
    }
    Ok(format_program(&program, config))
}

/// Format an already-parsed program. An empty program renders as empty
/// text so no-op edits can be elided.
pub fn format_program(program: &Program, config: &FormatConfig) -> String {
    let body = Formatter::new(config).format_program(program);
    if body.is_empty() {
        return body;
    }
    finalize(body, config)
}

/// Render a single expression with default layout; used for signature
/// strings (parameter defaults, type hints) outside whole-document runs.
pub fn format_expression(expr: &Expression) -> String {
    let config = FormatConfig::default();
    Formatter::new(&config).format_expression(expr)
}

/// Trailing-whitespace and final-newline cleanup.
fn finalize(text: String, config: &FormatConfig) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let trimmed: Vec<String> = lines
        .drain(..)
        .map(|line| {
            if config.trim_trailing_whitespace {
                line.trim_end_matches([' ', '\t']).to_string()
            } else {
                line.to_string()
            }
        })
        .collect();

    let mut result = trimmed.join("\n");
    // Exactly one newline at the end.
    result.truncate(result.trim_end_matches('\n').len());
    result.push('\n');
    result
}

#[cfg(test)]
mod tests;
