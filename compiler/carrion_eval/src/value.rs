//! Runtime values.
//!
//! Values are plain clonable data with no shared mutability: the evaluator
//! exists to populate an environment that the catalog loader enumerates
//! from other threads, so every value is `Send`. Assignment copies
//! aggregates; Carrion-the-real-interpreter aliases them, but nothing the
//! language server derives from evaluation can observe the difference.

use crate::EvalError;
use carrion_ir::ast::{Block, Param};
use rustc_hash::FxHashMap;
use std::fmt;

/// Native function signature for the builtin table.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
    Array(Vec<Value>),
    /// Pairs in insertion order.
    Hash(Vec<(Value, Value)>),
    Tuple(Vec<Value>),
    Builtin(BuiltinValue),
    Function(FunctionValue),
    Class(ClassValue),
    Instance(InstanceValue),
}

/// A native builtin callable.
#[derive(Clone, Copy)]
pub struct BuiltinValue {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// A user-defined spell: its parameter list (kept as AST so signatures can
/// be rendered later) and body.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionValue {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub doc: Option<String>,
    pub is_arcane: bool,
}

/// A grimoire definition living in the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassValue {
    pub name: String,
    pub is_arcane: bool,
    pub inherits: Option<String>,
    pub doc: Option<String>,
    pub init: Option<FunctionValue>,
    pub methods: FxHashMap<String, FunctionValue>,
}

/// An instantiated grimoire.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceValue {
    pub class: String,
    pub fields: FxHashMap<String, Value>,
}

impl Value {
    /// The Carrion type name, as reported by the `type` builtin.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::None => "None",
            Value::Array(_) => "array",
            Value::Hash(_) => "hash",
            Value::Tuple(_) => "tuple",
            Value::Builtin(_) => "builtin",
            Value::Function(_) => "spell",
            Value::Class(_) => "grimoire",
            Value::Instance(_) => "instance",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::None => false,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(v) => !v.is_empty(),
            Value::Hash(v) => !v.is_empty(),
            Value::Tuple(v) => !v.is_empty(),
            _ => true,
        }
    }
}

impl fmt::Debug for BuiltinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl PartialEq for BuiltinValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::None => f.write_str("None"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Hash(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name),
            Value::Function(func) => write!(f, "<spell {}>", func.name),
            Value::Class(c) => write!(f, "<grimoire {}>", c.name),
            Value::Instance(i) => write!(f, "<{} instance>", i.class),
        }
    }
}
