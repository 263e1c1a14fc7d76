//! The runtime-derived catalog of builtins and grimoires.
//!
//! A [`CatalogLoader`] owns a live evaluator environment. Construction
//! bootstraps the bundled stdlib; enumeration mirrors the environment's
//! bindings into immutable descriptor tables that feature providers read.
//! Writes rebuild the tables from scratch and swap one `Arc`, so readers
//! never observe a half-built catalog; `refresh` and `ingest` serialize
//! on the environment lock.

use crate::descriptions;
use carrion_eval::{Environment, EvalError, Value};
use carrion_parse::ParseError;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Descriptor for one builtin function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltinDescriptor {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamDescriptor>,
    pub return_type: String,
}

/// Descriptor for one grimoire method.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    /// Owning grimoire's name. A string, never a back-reference; lookups
    /// go through the class table.
    pub owner: String,
    pub description: String,
    pub params: Vec<ParamDescriptor>,
    pub return_type: String,
}

/// Descriptor for one grimoire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: String,
    pub description: String,
    pub methods: FxHashMap<String, MethodDescriptor>,
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: String,
    pub type_hint: Option<String>,
    pub default_value: Option<String>,
}

impl ParamDescriptor {
    /// `name[: hint][ = default]`, the shape signature strings use.
    pub fn render(&self) -> String {
        let mut out = self.name.clone();
        if let Some(hint) = &self.type_hint {
            out.push_str(&format!(": {hint}"));
        }
        if let Some(default) = &self.default_value {
            out.push_str(&format!(" = {default}"));
        }
        out
    }
}

/// One immutable snapshot of both tables.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub builtins: FxHashMap<String, BuiltinDescriptor>,
    pub classes: FxHashMap<String, ClassDescriptor>,
}

/// Why `ingest` failed.
#[derive(Clone, Debug)]
pub enum IngestError {
    ParseFailed(Vec<ParseError>),
    EvalFailed(EvalError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::ParseFailed(errors) => {
                write!(f, "parse errors: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
            IngestError::EvalFailed(err) => write!(f, "evaluation failed: {err}"),
        }
    }
}

impl std::error::Error for IngestError {}

/// Owner of the evaluator environment and the descriptor tables.
pub struct CatalogLoader {
    env: Mutex<Environment>,
    tables: RwLock<Arc<Catalog>>,
}

impl CatalogLoader {
    /// Bootstrap the stdlib into a fresh environment and enumerate it.
    /// A failed bootstrap logs a warning and starts empty.
    pub fn new() -> Self {
        let mut env = Environment::new();
        if let Err(err) = carrion_eval::load_stdlib(&mut env) {
            tracing::warn!("failed to load Carrion stdlib: {err}");
        }
        let catalog = Arc::new(enumerate(&env));
        CatalogLoader {
            env: Mutex::new(env),
            tables: RwLock::new(catalog),
        }
    }

    /// Rebuild both tables from the environment and swap them in.
    pub fn refresh(&self) {
        let env = self.env.lock();
        let catalog = Arc::new(enumerate(&env));
        *self.tables.write() = catalog;
    }

    /// Parse and evaluate `source` into the live environment, then
    /// refresh. The environment lock is held across the swap so
    /// concurrent ingests serialize.
    pub fn ingest(&self, source: &str) -> Result<(), IngestError> {
        let (program, errors) = carrion_parse::parse(source);
        if !errors.is_empty() {
            return Err(IngestError::ParseFailed(errors));
        }
        let mut env = self.env.lock();
        carrion_eval::eval_program(&program, &mut env).map_err(IngestError::EvalFailed)?;
        let catalog = Arc::new(enumerate(&env));
        *self.tables.write() = catalog;
        Ok(())
    }

    /// Current snapshot. The read lock is held only long enough to clone
    /// the `Arc`.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.tables.read().clone()
    }

    /// Immutable copy of the builtin table.
    pub fn builtins(&self) -> FxHashMap<String, BuiltinDescriptor> {
        self.snapshot().builtins.clone()
    }

    /// Immutable copy of the class table.
    pub fn classes(&self) -> FxHashMap<String, ClassDescriptor> {
        self.snapshot().classes.clone()
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk the canonical builtin table, then the environment's bindings.
/// First writer wins; unrecognized runtime kinds are skipped with a log
/// line.
fn enumerate(env: &Environment) -> Catalog {
    let mut catalog = Catalog::default();

    for &(name, _) in carrion_eval::builtins() {
        catalog
            .builtins
            .insert(name.to_string(), builtin_descriptor(name));
    }

    for (name, value) in env.globals() {
        match value {
            Value::Builtin(_) => {
                catalog
                    .builtins
                    .entry(name.clone())
                    .or_insert_with(|| builtin_descriptor(name));
            }
            Value::Function(func) => {
                catalog
                    .builtins
                    .entry(name.clone())
                    .or_insert_with(|| BuiltinDescriptor {
                        name: name.clone(),
                        description: format!("Module function: {name}"),
                        params: function_params(&func.params),
                        return_type: "unknown".to_string(),
                    });
            }
            Value::Class(class) => {
                let mut methods = FxHashMap::default();
                for (method_name, method) in &class.methods {
                    methods.insert(
                        method_name.clone(),
                        MethodDescriptor {
                            name: method_name.clone(),
                            owner: name.clone(),
                            description: descriptions::spell_description(name, method_name),
                            params: function_params(&method.params),
                            return_type: descriptions::spell_return_type(name, method_name),
                        },
                    );
                }
                catalog.classes.entry(name.clone()).or_insert(ClassDescriptor {
                    name: name.clone(),
                    description: descriptions::grimoire_description(name),
                    methods,
                    is_static: class.is_arcane,
                });
            }
            other => {
                tracing::debug!(
                    "skipping {} while enumerating catalog: unhandled value kind {}",
                    name,
                    other.type_name()
                );
            }
        }
    }

    catalog
}

fn builtin_descriptor(name: &str) -> BuiltinDescriptor {
    BuiltinDescriptor {
        name: name.to_string(),
        description: descriptions::builtin_description(name),
        params: descriptions::builtin_params(name),
        return_type: descriptions::builtin_return_type(name),
    }
}

/// Render AST parameters into descriptors.
fn function_params(params: &[carrion_ir::ast::Param]) -> Vec<ParamDescriptor> {
    params
        .iter()
        .map(|param| ParamDescriptor {
            name: param.name.clone(),
            type_hint: param.type_hint.as_ref().map(carrion_fmt::format_expression),
            default_value: param.default.as_ref().map(carrion_fmt::format_expression),
        })
        .collect()
}

/// The comma-joined parameter list for signatures: `a: int, b = 1`.
pub fn render_params(params: &[ParamDescriptor]) -> String {
    params
        .iter()
        .map(ParamDescriptor::render)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_loader_carries_stdlib() {
        let loader = CatalogLoader::new();
        let catalog = loader.snapshot();
        assert!(catalog.builtins.contains_key("print"));
        assert!(catalog.classes.contains_key("String"));
        assert!(catalog.classes.contains_key("OS"));
        assert!(catalog.classes["OS"].is_static);
        assert!(!catalog.classes["String"].is_static);
    }

    #[test]
    fn string_methods_carry_owner_and_heuristic_types() {
        let loader = CatalogLoader::new();
        let catalog = loader.snapshot();
        let string = &catalog.classes["String"];
        for name in ["lower", "upper", "split", "contains", "length"] {
            let method = string.methods.get(name).expect(name);
            assert_eq!(method.owner, "String");
        }
        assert_eq!(string.methods["lower"].return_type, "string");
        assert_eq!(string.methods["contains"].return_type, "bool");
        assert_eq!(string.methods["length"].return_type, "int");
    }

    #[test]
    fn ingest_adds_definitions_and_refreshes() {
        let loader = CatalogLoader::new();
        let before = loader.snapshot();
        assert!(!before.classes.contains_key("Greeter"));

        loader
            .ingest("grim Greeter:\n    spell hello(name):\n        return \"hi \" + name\n\nspell shout(text):\n    return text\n")
            .expect("ingest succeeds");

        let after = loader.snapshot();
        assert!(after.classes.contains_key("Greeter"));
        assert!(after.classes["Greeter"].methods.contains_key("hello"));
        assert_eq!(
            after.builtins["shout"].description,
            "Module function: shout"
        );
        // Old snapshots are unaffected.
        assert!(!before.classes.contains_key("Greeter"));
    }

    #[test]
    fn ingest_rejects_parse_and_eval_failures() {
        let loader = CatalogLoader::new();
        assert!(matches!(
            loader.ingest("grim :\n"),
            Err(IngestError::ParseFailed(_))
        ));
        assert!(matches!(
            loader.ingest("boom()\n"),
            Err(IngestError::EvalFailed(_))
        ));
    }

    #[test]
    fn refresh_is_stable() {
        let loader = CatalogLoader::new();
        let before = loader.snapshot();
        loader.refresh();
        let after = loader.snapshot();
        assert_eq!(before.builtins.len(), after.builtins.len());
        assert_eq!(before.classes.len(), after.classes.len());
    }
}
