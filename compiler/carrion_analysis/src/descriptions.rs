//! Static descriptor tables for recognized standard names.
//!
//! The catalog loader discovers *which* names exist by enumerating the
//! live environment; these tables supply the prose and typing the runtime
//! cannot: descriptions, parameter shapes for native builtins, and return
//! types. Unknown names get generic fallbacks, never errors.

use crate::catalog::ParamDescriptor;

pub(crate) fn builtin_description(name: &str) -> String {
    let known = match name {
        "print" => "Print values to output",
        "input" => "Read user input with optional prompt",
        "len" => "Get length of strings, arrays, or hashes",
        "type" => "Get the type of an object",
        "range" => "Generate a sequence of numbers",
        "int" => "Convert to integer",
        "float" => "Convert to float",
        "str" => "Convert to string",
        "bool" => "Convert to boolean",
        "list" => "Convert to array",
        "open" => "Open a file and return File grimoire instance",
        "max" => "Find maximum value",
        "abs" => "Get absolute value",
        "enumerate" => "Enumerate arrays with indices",
        "pairs" => "Extract key-value pairs from hashes",
        // Module-provided functions.
        "time_now" => "Get current Unix timestamp",
        "time_sleep" => "Sleep for specified duration",
        "time_format" => "Format timestamp to string",
        "time_parse" => "Parse time string to timestamp",
        "file_read" => "Read file content",
        "file_write" => "Write content to file",
        "file_exists" => "Check if file exists",
        "os_cwd" => "Get current working directory",
        "os_listdir" => "List directory contents",
        "os_mkdir" => "Create directory",
        "os_getenv" => "Get environment variable",
        "os_run" => "Run system command",
        "http_get" => "HTTP GET request",
        "http_post" => "HTTP POST request",
        "http_put" => "HTTP PUT request",
        "http_delete" => "HTTP DELETE request",
        _ => return format!("Built-in function: {name}"),
    };
    known.to_string()
}

pub(crate) fn builtin_params(name: &str) -> Vec<ParamDescriptor> {
    let p = |name: &str, hint: &str| ParamDescriptor {
        name: name.to_string(),
        type_hint: Some(hint.to_string()),
        default_value: None,
    };
    let pd = |name: &str, hint: &str, default: &str| ParamDescriptor {
        name: name.to_string(),
        type_hint: Some(hint.to_string()),
        default_value: Some(default.to_string()),
    };
    match name {
        "print" => vec![p("values", "...any")],
        "input" => vec![pd("prompt", "string", "\"\"")],
        "len" | "type" => vec![p("obj", "any")],
        "range" => vec![
            p("start", "int"),
            pd("stop", "int", "None"),
            pd("step", "int", "1"),
        ],
        "int" | "float" | "str" | "bool" | "list" => vec![p("value", "any")],
        "open" => vec![p("path", "string"), pd("mode", "string", "\"r\"")],
        "max" => vec![p("values", "...any")],
        "abs" => vec![p("value", "number")],
        "enumerate" => vec![p("array", "array")],
        "pairs" => vec![p("hash", "hash")],
        _ => Vec::new(),
    }
}

pub(crate) fn builtin_return_type(name: &str) -> String {
    let known = match name {
        "print" => "None",
        "input" => "string",
        "len" => "int",
        "type" => "string",
        "range" => "array",
        "int" => "int",
        "float" => "float",
        "str" => "string",
        "bool" => "bool",
        "list" => "array",
        "open" => "File",
        "max" => "any",
        "abs" => "number",
        "enumerate" => "array",
        "pairs" => "array",
        _ => "unknown",
    };
    known.to_string()
}

pub(crate) fn grimoire_description(name: &str) -> String {
    let known = match name {
        "String" => "String manipulation grimoire",
        "Array" => "Array manipulation grimoire",
        "Integer" => "Integer operations grimoire",
        "Float" => "Float operations grimoire",
        "Boolean" => "Boolean operations grimoire",
        "File" => "File operations grimoire",
        "OS" => "Operating system operations grimoire",
        "Time" => "Time operations grimoire",
        _ => return format!("Grimoire: {name}"),
    };
    known.to_string()
}

pub(crate) fn spell_description(grimoire: &str, spell: &str) -> String {
    format!("{spell} method from {grimoire} grimoire")
}

/// Return-type heuristics for grimoire spells.
pub(crate) fn spell_return_type(grimoire: &str, spell: &str) -> String {
    if spell.starts_with("is_") || spell.contains("contains") {
        return "bool".to_string();
    }
    if spell.contains("length") || spell.contains("count") {
        return "int".to_string();
    }
    if grimoire == "String" && matches!(spell, "lower" | "upper" | "reverse") {
        return "string".to_string();
    }
    "unknown".to_string()
}
