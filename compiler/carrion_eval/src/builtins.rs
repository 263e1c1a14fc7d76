//! The canonical builtin function table.
//!
//! Fixed set dispatched through plain function pointers; the catalog
//! loader walks [`builtins`] as its first enumeration source, so names
//! here are the names editors see.

use crate::errors::{wrong_arg_count, wrong_arg_type};
use crate::{BuiltinFn, EvalError, Value};

/// Name → native function, in catalog enumeration order.
pub fn builtins() -> &'static [(&'static str, BuiltinFn)] {
    &[
        ("print", builtin_print),
        ("input", builtin_input),
        ("len", builtin_len),
        ("type", builtin_type),
        ("range", builtin_range),
        ("int", builtin_int),
        ("float", builtin_float),
        ("str", builtin_str),
        ("bool", builtin_bool),
        ("list", builtin_list),
        ("open", builtin_open),
        ("max", builtin_max),
        ("abs", builtin_abs),
        ("enumerate", builtin_enumerate),
        ("pairs", builtin_pairs),
    ]
}

/// `print` routes to a trace event: stdout belongs to the protocol.
fn builtin_print(args: &[Value]) -> Result<Value, EvalError> {
    let rendered: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    tracing::debug!(target: "carrion_eval::print", "{}", rendered.join(" "));
    Ok(Value::None)
}

/// No interactive stdin under a language server; `input` yields "".
fn builtin_input(_args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::Str(String::new()))
}

fn builtin_len(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Str(s)] => Ok(Value::Int(s.chars().count() as i64)),
        [Value::Array(v)] | [Value::Tuple(v)] => Ok(Value::Int(v.len() as i64)),
        [Value::Hash(pairs)] => Ok(Value::Int(pairs.len() as i64)),
        [_] => Err(wrong_arg_type("len", "string, array, tuple, or hash")),
        _ => Err(wrong_arg_count("len", 1, args.len())),
    }
}

fn builtin_type(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [value] => Ok(Value::Str(value.type_name().to_string())),
        _ => Err(wrong_arg_count("type", 1, args.len())),
    }
}

fn builtin_range(args: &[Value]) -> Result<Value, EvalError> {
    let (start, stop, step) = match args {
        [Value::Int(stop)] => (0, *stop, 1),
        [Value::Int(start), Value::Int(stop)] => (*start, *stop, 1),
        [Value::Int(start), Value::Int(stop), Value::Int(step)] => (*start, *stop, *step),
        _ => return Err(wrong_arg_type("range", "int")),
    };
    if step == 0 {
        return Err(EvalError::new("range step cannot be zero"));
    }
    let mut out = Vec::new();
    let mut n = start;
    while (step > 0 && n < stop) || (step < 0 && n > stop) {
        out.push(Value::Int(n));
        n += step;
        if out.len() > 1_000_000 {
            return Err(EvalError::new("range result too large"));
        }
    }
    Ok(Value::Array(out))
}

fn builtin_int(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Int(n)] => Ok(Value::Int(*n)),
        [Value::Float(f)] => Ok(Value::Int(*f as i64)),
        [Value::Bool(b)] => Ok(Value::Int(i64::from(*b))),
        [Value::Str(s)] => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| EvalError::new(format!("cannot convert {s:?} to int"))),
        [_] => Err(wrong_arg_type("int", "number, bool, or string")),
        _ => Err(wrong_arg_count("int", 1, args.len())),
    }
}

fn builtin_float(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Int(n)] => Ok(Value::Float(*n as f64)),
        [Value::Float(f)] => Ok(Value::Float(*f)),
        [Value::Str(s)] => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| EvalError::new(format!("cannot convert {s:?} to float"))),
        [_] => Err(wrong_arg_type("float", "number or string")),
        _ => Err(wrong_arg_count("float", 1, args.len())),
    }
}

fn builtin_str(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [value] => Ok(Value::Str(value.to_string())),
        _ => Err(wrong_arg_count("str", 1, args.len())),
    }
}

fn builtin_bool(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [value] => Ok(Value::Bool(value.is_truthy())),
        _ => Err(wrong_arg_count("bool", 1, args.len())),
    }
}

fn builtin_list(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Array(v)] => Ok(Value::Array(v.clone())),
        [Value::Tuple(v)] => Ok(Value::Array(v.clone())),
        [Value::Str(s)] => Ok(Value::Array(
            s.chars().map(|c| Value::Str(c.to_string())).collect(),
        )),
        [Value::Hash(pairs)] => Ok(Value::Array(
            pairs.iter().map(|(k, _)| k.clone()).collect(),
        )),
        [_] => Err(wrong_arg_type("list", "array, tuple, string, or hash")),
        _ => Err(wrong_arg_count("list", 1, args.len())),
    }
}

/// `open` cannot hand out live file handles from catalog evaluation;
/// it returns `None` and the catalog's static table still reports the
/// `File` return type to editors.
fn builtin_open(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Str(_)] | [Value::Str(_), Value::Str(_)] => Ok(Value::None),
        _ => Err(wrong_arg_type("open", "string path")),
    }
}

fn builtin_max(args: &[Value]) -> Result<Value, EvalError> {
    let items: &[Value] = match args {
        [] => return Err(wrong_arg_count("max", 1, 0)),
        [Value::Array(v)] => v,
        other => other,
    };
    let mut best: Option<&Value> = None;
    for item in items {
        let bigger = match (best, item) {
            (None, _) => true,
            (Some(Value::Int(a)), Value::Int(b)) => b > a,
            (Some(Value::Float(a)), Value::Float(b)) => b > a,
            (Some(Value::Int(a)), Value::Float(b)) => *b > *a as f64,
            (Some(Value::Float(a)), Value::Int(b)) => (*b as f64) > *a,
            (Some(Value::Str(a)), Value::Str(b)) => b > a,
            _ => return Err(wrong_arg_type("max", "comparable")),
        };
        if bigger {
            best = Some(item);
        }
    }
    best.cloned().ok_or_else(|| EvalError::new("max of empty sequence"))
}

fn builtin_abs(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Int(n)] => Ok(Value::Int(n.saturating_abs())),
        [Value::Float(f)] => Ok(Value::Float(f.abs())),
        [_] => Err(wrong_arg_type("abs", "number")),
        _ => Err(wrong_arg_count("abs", 1, args.len())),
    }
}

fn builtin_enumerate(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Array(v)] => Ok(Value::Array(
            v.iter()
                .enumerate()
                .map(|(i, item)| Value::Tuple(vec![Value::Int(i as i64), item.clone()]))
                .collect(),
        )),
        [_] => Err(wrong_arg_type("enumerate", "array")),
        _ => Err(wrong_arg_count("enumerate", 1, args.len())),
    }
}

fn builtin_pairs(args: &[Value]) -> Result<Value, EvalError> {
    match args {
        [Value::Hash(pairs)] => Ok(Value::Array(
            pairs
                .iter()
                .map(|(k, v)| Value::Tuple(vec![k.clone(), v.clone()]))
                .collect(),
        )),
        [_] => Err(wrong_arg_type("pairs", "hash")),
        _ => Err(wrong_arg_count("pairs", 1, args.len())),
    }
}
