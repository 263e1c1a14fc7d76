//! Symbol extraction: AST → per-document symbol table.
//!
//! Pure with respect to its inputs (the program, the document's line
//! index, and a catalog snapshot used for constructor recognition).
//! Variables discovered in nested bodies flatten into the one document
//! table: Carrion has no block scoping, and this release keeps the flat
//! model for function locals too.

use crate::catalog::Catalog;
use carrion_fmt::format_expression;
use carrion_ir::ast::*;
use carrion_ir::{LineIndex, Span};
use lsp_types::{Position, Range};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    pub classes: FxHashMap<String, ClassSymbol>,
    pub functions: FxHashMap<String, MethodSymbol>,
    pub variables: FxHashMap<String, VariableSymbol>,
    pub imports: FxHashMap<String, ImportSymbol>,
}

#[derive(Clone, Debug)]
pub struct ClassSymbol {
    pub name: String,
    pub range: Range,
    pub init: Option<MethodSymbol>,
    pub methods: FxHashMap<String, MethodSymbol>,
    /// Fields declared by `self.<name> = …` assignments in the init body.
    pub members: Vec<MemberSymbol>,
    pub is_arcane: bool,
    pub inherits: Option<String>,
    pub doc_string: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MethodSymbol {
    pub name: String,
    pub range: Range,
    pub params: Vec<ParamSymbol>,
    pub return_type: String,
    /// Owning grimoire's name; `None` for top-level spells.
    pub owner_class: Option<String>,
    pub doc_string: Option<String>,
    pub is_init: bool,
    pub is_static: bool,
    pub is_private: bool,
    pub is_protected: bool,
}

#[derive(Clone, Debug)]
pub struct ParamSymbol {
    pub name: String,
    pub type_hint: Option<String>,
    pub default_value: Option<String>,
    pub range: Range,
}

impl ParamSymbol {
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

/// `a, b = 1` rendering for spell signatures.
pub fn render_param_symbols(params: &[ParamSymbol]) -> String {
    params
        .iter()
        .map(ParamSymbol::render)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug)]
pub struct VariableSymbol {
    pub name: String,
    pub range: Range,
    /// Inferred type: a primitive name, a known class name, or "unknown".
    pub type_name: String,
    pub is_global: bool,
}

#[derive(Clone, Debug)]
pub struct MemberSymbol {
    pub name: String,
    pub range: Range,
    pub type_name: String,
}

#[derive(Clone, Debug)]
pub struct ImportSymbol {
    pub name: String,
    pub range: Range,
    pub path: String,
    pub alias: Option<String>,
    pub imported_name: Option<String>,
}

/// Extract the symbol table for one document.
pub fn extract(program: &Program, line_index: &LineIndex, catalog: &Catalog) -> SymbolTable {
    let mut extractor = Extractor {
        line_index,
        catalog,
        table: SymbolTable::default(),
        globals: Vec::new(),
    };

    for stmt in &program.statements {
        extractor.top_level_statement(stmt);
    }

    let Extractor {
        mut table, globals, ..
    } = extractor;
    for name in globals {
        if let Some(variable) = table.variables.get_mut(&name) {
            variable.is_global = true;
        }
    }
    table
}

struct Extractor<'a> {
    line_index: &'a LineIndex,
    catalog: &'a Catalog,
    table: SymbolTable,
    globals: Vec<String>,
}

impl Extractor<'_> {
    fn range(&self, span: Span) -> Range {
        let (start, end) = self.line_index.range(span);
        Range {
            start: Position::new(start.line, start.character),
            end: Position::new(end.line, end.character),
        }
    }

    fn top_level_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Class(node) => self.class_definition(node),
            Statement::Function(node) => {
                let symbol = self.method_symbol(node, None);
                self.table.functions.insert(node.name.clone(), symbol);
                self.block(&node.body, false);
            }
            Statement::Assign(node) => self.assignment(node, true),
            Statement::Import(node) => self.import(node),
            Statement::Global(node) => self.globals.extend(node.names.iter().cloned()),
            other => self.nested_statement(other),
        }
    }

    fn class_definition(&mut self, node: &ClassDef) {
        let mut class = ClassSymbol {
            name: node.name.clone(),
            range: self.range(node.span),
            init: None,
            methods: FxHashMap::default(),
            members: Vec::new(),
            is_arcane: node.is_arcane,
            inherits: node.inherits.clone(),
            doc_string: node.doc_string.clone(),
        };

        if let Some(init) = &node.init {
            let symbol = self.method_symbol(init, Some(&node.name));
            self.table.functions.insert("init".to_string(), symbol.clone());
            class.init = Some(symbol);
            self.scan_init_members(&init.body, &mut class);
            self.block(&init.body, false);
        }

        for method in &node.methods {
            let symbol = self.method_symbol(method, Some(&node.name));
            class.methods.insert(method.name.clone(), symbol.clone());
            self.table.functions.insert(method.name.clone(), symbol);
            self.block(&method.body, false);
        }

        self.table.classes.insert(class.name.clone(), class);
    }

    fn method_symbol(&self, node: &FunctionDef, owner: Option<&str>) -> MethodSymbol {
        MethodSymbol {
            name: node.name.clone(),
            range: self.range(node.span),
            params: node.params.iter().map(|p| self.param_symbol(p)).collect(),
            return_type: infer_return_type(&node.body, &self.table, self.catalog),
            owner_class: owner.map(str::to_string),
            doc_string: node.doc_string.clone(),
            is_init: node.is_init,
            is_static: node.is_arcane,
            is_private: node.name.starts_with("__"),
            is_protected: node.name.starts_with('_') && !node.name.starts_with("__"),
        }
    }

    fn param_symbol(&self, param: &Param) -> ParamSymbol {
        ParamSymbol {
            name: param.name.clone(),
            type_hint: param.type_hint.as_ref().map(format_expression),
            default_value: param.default.as_ref().map(format_expression),
            range: self.range(param.span),
        }
    }

    /// `self.<name> = …` in the init body declares a member on the class.
    fn scan_init_members(&mut self, body: &Block, class: &mut ClassSymbol) {
        for stmt in &body.statements {
            if let Statement::Assign(assign) = stmt {
                if let Expression::Dot(dot) = &assign.target {
                    if dot.object.as_identifier() == Some("self") {
                        let type_name = infer_type(&assign.value, &self.table, self.catalog);
                        class.members.push(MemberSymbol {
                            name: dot.property.clone(),
                            range: self.range(assign.span),
                            type_name,
                        });
                    }
                }
            }
        }
    }

    fn assignment(&mut self, node: &AssignStatement, top_level: bool) {
        let Expression::Identifier(target) = &node.target else {
            return;
        };
        let type_name = infer_type(&node.value, &self.table, self.catalog);
        self.table.variables.insert(
            target.name.clone(),
            VariableSymbol {
                name: target.name.clone(),
                range: self.range(node.span),
                type_name,
                is_global: top_level,
            },
        );
    }

    fn import(&mut self, node: &ImportStatement) {
        // Key preference: alias, then imported name, then the path's
        // basename without the source extension. Duplicates keep the
        // last occurrence.
        let basename = node
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&node.path)
            .trim_end_matches(".crl")
            .to_string();
        let name = node
            .alias
            .clone()
            .or_else(|| node.imported_name.clone())
            .unwrap_or(basename);

        self.table.imports.insert(
            name.clone(),
            ImportSymbol {
                name,
                range: self.range(node.span),
                path: node.path.clone(),
                alias: node.alias.clone(),
                imported_name: node.imported_name.clone(),
            },
        );
    }

    /// Recursive descent into block-bearing statements for nested
    /// assignments (flat variable model).
    fn nested_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Assign(node) => self.assignment(node, false),
            Statement::If(node) => {
                self.block(&node.consequence, false);
                for branch in &node.otherwise_branches {
                    self.block(&branch.consequence, false);
                }
                if let Some(alt) = &node.alternative {
                    self.block(alt, false);
                }
            }
            Statement::For(node) => {
                self.block(&node.body, false);
                if let Some(alt) = &node.alternative {
                    self.block(alt, false);
                }
            }
            Statement::While(node) => self.block(&node.body, false),
            Statement::Attempt(node) => {
                self.block(&node.try_block, false);
                for clause in &node.ensnare_clauses {
                    self.block(&clause.body, false);
                }
                if let Some(resolve) = &node.resolve_block {
                    self.block(resolve, false);
                }
            }
            Statement::Autoclose(node) => self.block(&node.body, false),
            Statement::Match(node) => {
                for case in &node.cases {
                    self.block(&case.body, false);
                }
                if let Some(default) = &node.default {
                    self.block(default, false);
                }
            }
            Statement::Main(node) => self.block(&node.body, false),
            Statement::Function(node) => {
                let symbol = self.method_symbol(node, None);
                self.table.functions.insert(node.name.clone(), symbol);
                self.block(&node.body, false);
            }
            _ => {}
        }
    }

    fn block(&mut self, block: &Block, top_level: bool) {
        for stmt in &block.statements {
            match stmt {
                Statement::Assign(node) => self.assignment(node, top_level),
                other => self.nested_statement(other),
            }
        }
    }
}

/// Infer a variable's type from its initializer. Runs left-to-right over
/// the document: only names already in the table resolve, forward
/// references stay "unknown".
pub fn infer_type(expr: &Expression, table: &SymbolTable, catalog: &Catalog) -> String {
    match expr {
        Expression::IntegerLit(_) => "int".to_string(),
        Expression::FloatLit(_) => "float".to_string(),
        Expression::StringLit(_) => "string".to_string(),
        Expression::BoolLit(_) => "bool".to_string(),
        Expression::ArrayLit(_) => "array".to_string(),
        Expression::HashLit(_) => "hash".to_string(),
        Expression::TupleLit(_) => "tuple".to_string(),
        Expression::NoneLit(_) => "None".to_string(),
        Expression::Call(call) => {
            // Constructor recognition: a call whose callee names a known
            // grimoire types the variable as that grimoire.
            if let Some(name) = call.callee.as_identifier() {
                if table.classes.contains_key(name) || catalog.classes.contains_key(name) {
                    return name.to_string();
                }
            }
            "unknown".to_string()
        }
        Expression::Identifier(id) => table
            .variables
            .get(&id.name)
            .map(|v| v.type_name.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        _ => "unknown".to_string(),
    }
}

/// Return-type inference for user spells: a literal-typed `return` in the
/// body wins, no `return` at all means "None".
fn infer_return_type(body: &Block, table: &SymbolTable, catalog: &Catalog) -> String {
    let mut saw_return = false;
    let mut inferred: Option<String> = None;
    scan_returns(body, &mut |ret: &ReturnStatement| {
        saw_return = true;
        if inferred.is_none() {
            if let Some(value) = &ret.value {
                let t = infer_type(value, table, catalog);
                if t != "unknown" {
                    inferred = Some(t);
                }
            }
        }
    });
    match inferred {
        Some(t) => t,
        None if !saw_return => "None".to_string(),
        None => "unknown".to_string(),
    }
}

fn scan_returns(block: &Block, visit: &mut impl FnMut(&ReturnStatement)) {
    for stmt in &block.statements {
        match stmt {
            Statement::Return(ret) => visit(ret),
            Statement::If(node) => {
                scan_returns(&node.consequence, visit);
                for branch in &node.otherwise_branches {
                    scan_returns(&branch.consequence, visit);
                }
                if let Some(alt) = &node.alternative {
                    scan_returns(alt, visit);
                }
            }
            Statement::For(node) => {
                scan_returns(&node.body, visit);
                if let Some(alt) = &node.alternative {
                    scan_returns(alt, visit);
                }
            }
            Statement::While(node) => scan_returns(&node.body, visit),
            Statement::Attempt(node) => {
                scan_returns(&node.try_block, visit);
                for clause in &node.ensnare_clauses {
                    scan_returns(&clause.body, visit);
                }
                if let Some(resolve) = &node.resolve_block {
                    scan_returns(resolve, visit);
                }
            }
            Statement::Autoclose(node) => scan_returns(&node.body, visit),
            Statement::Match(node) => {
                for case in &node.cases {
                    scan_returns(&case.body, visit);
                }
                if let Some(default) = &node.default {
                    scan_returns(default, visit);
                }
            }
            _ => {}
        }
    }
}
