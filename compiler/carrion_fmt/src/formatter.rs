//! Statement and expression rendering.

use crate::FormatConfig;
use carrion_ir::ast::*;
use carrion_parse::operator_precedence;

pub struct Formatter<'c> {
    config: &'c FormatConfig,
    indent: usize,
}

impl<'c> Formatter<'c> {
    pub fn new(config: &'c FormatConfig) -> Self {
        Formatter { config, indent: 0 }
    }

    pub fn format_program(&mut self, program: &Program) -> String {
        self.indent = 0;
        let mut parts: Vec<String> = Vec::new();

        for (i, stmt) in program.statements.iter().enumerate() {
            let formatted = self.format_statement(stmt);
            if !formatted.is_empty() {
                parts.push(formatted);
            }
            if let Some(next) = program.statements.get(i + 1) {
                match stmt {
                    // A grimoire followed directly by the main block gets
                    // two separating blank lines.
                    Statement::Class(_) if matches!(next, Statement::Main(_)) => {
                        parts.push(String::new());
                        parts.push(String::new());
                    }
                    // One blank line after a top-level spell unless
                    // another spell follows.
                    Statement::Function(_) if !matches!(next, Statement::Function(_)) => {
                        parts.push(String::new());
                    }
                    _ => {}
                }
            }
        }

        parts.join("\n")
    }

    fn indent_str(&self) -> String {
        self.config.indent_unit().repeat(self.indent)
    }

    fn indent_str_at(&self, level: usize) -> String {
        self.config.indent_unit().repeat(level)
    }

    // === Statements ===

    fn format_statement(&mut self, stmt: &Statement) -> String {
        match stmt {
            Statement::Expression(s) => {
                format!("{}{}", self.indent_str(), self.format_expression(&s.expression))
            }
            Statement::Assign(s) => self.format_assign(s),
            Statement::Return(s) => match &s.value {
                Some(value) => format!(
                    "{}return {}",
                    self.indent_str(),
                    self.format_expression(value)
                ),
                None => format!("{}return", self.indent_str()),
            },
            Statement::Function(f) => self.format_function(f),
            Statement::Class(c) => self.format_class(c),
            Statement::If(s) => self.format_if(s),
            Statement::For(s) => self.format_for(s),
            Statement::While(s) => self.format_while(s),
            Statement::Attempt(s) => self.format_attempt(s),
            Statement::Autoclose(s) => self.format_autoclose(s),
            Statement::Import(s) => self.format_import(s),
            Statement::Match(s) => self.format_match(s),
            Statement::Main(s) => self.format_main(s),
            Statement::Global(s) => {
                format!("{}global {}", self.indent_str(), s.names.join(", "))
            }
            Statement::Raise(s) => match &s.value {
                Some(value) => format!(
                    "{}raise {}",
                    self.indent_str(),
                    self.format_expression(value)
                ),
                None => format!("{}raise", self.indent_str()),
            },
            Statement::Check(s) => match &s.message {
                Some(message) => format!(
                    "{}check {}, {}",
                    self.indent_str(),
                    self.format_expression(&s.condition),
                    self.format_expression(message)
                ),
                None => format!(
                    "{}check {}",
                    self.indent_str(),
                    self.format_expression(&s.condition)
                ),
            },
            Statement::Stop(_) => format!("{}stop", self.indent_str()),
            Statement::Skip(_) => format!("{}skip", self.indent_str()),
            Statement::Ignore(_) => format!("{}ignore", self.indent_str()),
        }
    }

    fn format_assign(&mut self, node: &AssignStatement) -> String {
        format!(
            "{}{} {} {}",
            self.indent_str(),
            self.format_expression(&node.target),
            node.operator,
            self.format_expression(&node.value)
        )
    }

    fn format_function(&mut self, node: &FunctionDef) -> String {
        let keyword = if node.is_arcane { "arcanespell" } else { "spell" };
        let signature = format!(
            "{}{} {}({}):",
            self.indent_str(),
            keyword,
            node.name,
            self.format_params(&node.params)
        );
        let mut parts = vec![signature];
        self.push_doc_and_body(&mut parts, node.doc_string.as_deref(), &node.body);
        parts.join("\n")
    }

    /// Init is written without the `spell` keyword.
    fn format_init(&mut self, node: &FunctionDef) -> String {
        let signature = format!(
            "{}init({}):",
            self.indent_str(),
            self.format_params(&node.params)
        );
        let mut parts = vec![signature];
        self.push_doc_and_body(&mut parts, node.doc_string.as_deref(), &node.body);
        parts.join("\n")
    }

    fn push_doc_and_body(&mut self, parts: &mut Vec<String>, doc: Option<&str>, body: &Block) {
        self.indent += 1;
        if let Some(doc) = doc {
            parts.push(format!("{}\"\"\"{}\"\"\"", self.indent_str(), doc));
        }
        parts.extend(self.format_block(body));
        self.indent -= 1;
    }

    fn format_class(&mut self, node: &ClassDef) -> String {
        let keyword = if node.is_arcane { "arcane grim" } else { "grim" };
        let declaration = match &node.inherits {
            Some(parent) => format!("{}{} {}({}):", self.indent_str(), keyword, node.name, parent),
            None => format!("{}{} {}:", self.indent_str(), keyword, node.name),
        };

        let mut parts = vec![declaration];
        self.indent += 1;
        if let Some(doc) = &node.doc_string {
            parts.push(format!("{}\"\"\"{}\"\"\"", self.indent_str(), doc));
        }
        if let Some(init) = &node.init {
            parts.push(self.format_init(init));
        }
        for method in &node.methods {
            parts.push(self.format_function(method));
        }
        self.indent -= 1;

        parts.join("\n")
    }

    fn format_if(&mut self, node: &IfStatement) -> String {
        let mut parts = vec![format!(
            "{}if {}:",
            self.indent_str(),
            self.format_expression(&node.condition)
        )];
        self.push_body(&mut parts, &node.consequence);

        for branch in &node.otherwise_branches {
            parts.push(format!(
                "{}otherwise {}:",
                self.indent_str(),
                self.format_expression(&branch.condition)
            ));
            self.push_body(&mut parts, &branch.consequence);
        }

        if let Some(alternative) = &node.alternative {
            parts.push(format!("{}else:", self.indent_str()));
            self.push_body(&mut parts, alternative);
        }

        parts.join("\n")
    }

    fn format_for(&mut self, node: &ForStatement) -> String {
        let mut parts = vec![format!(
            "{}for {} in {}:",
            self.indent_str(),
            self.format_expression(&node.variable),
            self.format_expression(&node.iterable)
        )];
        self.push_body(&mut parts, &node.body);
        if let Some(alternative) = &node.alternative {
            parts.push(format!("{}else:", self.indent_str()));
            self.push_body(&mut parts, alternative);
        }
        parts.join("\n")
    }

    fn format_while(&mut self, node: &WhileStatement) -> String {
        let mut parts = vec![format!(
            "{}while {}:",
            self.indent_str(),
            self.format_expression(&node.condition)
        )];
        self.push_body(&mut parts, &node.body);
        parts.join("\n")
    }

    fn format_attempt(&mut self, node: &AttemptStatement) -> String {
        let mut parts = vec![format!("{}attempt:", self.indent_str())];
        self.push_body(&mut parts, &node.try_block);

        for clause in &node.ensnare_clauses {
            let mut line = format!("{}ensnare", self.indent_str());
            if let Some(condition) = &clause.condition {
                line.push_str(&format!("({})", self.format_expression(condition)));
            }
            if let Some(alias) = &clause.alias {
                line.push_str(&format!(" as {alias}"));
            }
            line.push(':');
            parts.push(line);
            self.push_body(&mut parts, &clause.body);
        }

        if let Some(resolve) = &node.resolve_block {
            parts.push(format!("{}resolve:", self.indent_str()));
            self.push_body(&mut parts, resolve);
        }

        parts.join("\n")
    }

    fn format_autoclose(&mut self, node: &AutocloseStatement) -> String {
        let mut parts = vec![format!(
            "{}autoclose {} as {}:",
            self.indent_str(),
            self.format_expression(&node.resource),
            node.variable
        )];
        self.push_body(&mut parts, &node.body);
        parts.join("\n")
    }

    fn format_import(&mut self, node: &ImportStatement) -> String {
        let mut out = format!("{}import \"{}\"", self.indent_str(), node.path);
        if let Some(name) = &node.imported_name {
            out.push_str(&format!(".{name}"));
        }
        if let Some(alias) = &node.alias {
            out.push_str(&format!(" as {alias}"));
        }
        out
    }

    fn format_match(&mut self, node: &MatchStatement) -> String {
        let mut parts = vec![format!(
            "{}match {}:",
            self.indent_str(),
            self.format_expression(&node.value)
        )];

        self.indent += 1;
        for case in &node.cases {
            parts.push(format!(
                "{}case {}:",
                self.indent_str(),
                self.format_expression(&case.condition)
            ));
            self.push_body(&mut parts, &case.body);
        }
        if let Some(default) = &node.default {
            parts.push(format!("{}default:", self.indent_str()));
            self.push_body(&mut parts, default);
        }
        self.indent -= 1;

        parts.join("\n")
    }

    fn format_main(&mut self, node: &MainStatement) -> String {
        let mut parts = vec![format!("{}main:", self.indent_str())];
        self.push_body(&mut parts, &node.body);
        parts.join("\n")
    }

    fn push_body(&mut self, parts: &mut Vec<String>, body: &Block) {
        self.indent += 1;
        parts.extend(self.format_block(body));
        self.indent -= 1;
    }

    fn format_block(&mut self, block: &Block) -> Vec<String> {
        let mut parts = Vec::new();
        for stmt in &block.statements {
            let formatted = self.format_statement(stmt);
            if !formatted.is_empty() {
                parts.push(formatted);
            }
        }
        parts
    }

    // === Expressions ===

    pub fn format_expression(&self, expr: &Expression) -> String {
        match expr {
            Expression::Identifier(id) => id.name.clone(),
            Expression::IntegerLit(lit) => format!("{}", lit.value),
            Expression::FloatLit(lit) => format_float(lit.value),
            Expression::StringLit(lit) => format!("\"{}\"", escape_string(&lit.value)),
            Expression::BoolLit(lit) => if lit.value { "True" } else { "False" }.to_string(),
            Expression::NoneLit(_) => "None".to_string(),
            Expression::ArrayLit(lit) => self.format_array(lit),
            Expression::HashLit(lit) => self.format_hash(lit),
            Expression::TupleLit(lit) => {
                let elements: Vec<String> = lit
                    .elements
                    .iter()
                    .map(|e| self.format_expression(e))
                    .collect();
                format!("({})", elements.join(", "))
            }
            Expression::Call(call) => {
                let args: Vec<String> =
                    call.args.iter().map(|a| self.format_expression(a)).collect();
                format!(
                    "{}({})",
                    self.format_postfix_operand(&call.callee),
                    args.join(", ")
                )
            }
            Expression::Infix(infix) => self.format_infix(infix),
            Expression::Prefix(prefix) => {
                let operand = match prefix.operand.as_ref() {
                    inner @ Expression::Infix(_) => {
                        format!("({})", self.format_expression(inner))
                    }
                    inner => self.format_expression(inner),
                };
                if prefix.operator.ends_with(char::is_alphabetic) {
                    format!("{} {}", prefix.operator, operand)
                } else {
                    format!("{}{}", prefix.operator, operand)
                }
            }
            Expression::Index(index) => format!(
                "{}[{}]",
                self.format_postfix_operand(&index.object),
                self.format_expression(&index.index)
            ),
            Expression::Dot(dot) => {
                format!(
                    "{}.{}",
                    self.format_postfix_operand(&dot.object),
                    dot.property
                )
            }
            Expression::Slice(slice) => {
                let start = slice
                    .start
                    .as_ref()
                    .map(|e| self.format_expression(e))
                    .unwrap_or_default();
                let end = slice
                    .end
                    .as_ref()
                    .map(|e| self.format_expression(e))
                    .unwrap_or_default();
                format!(
                    "{}[{}:{}]",
                    self.format_postfix_operand(&slice.object),
                    start,
                    end
                )
            }
        }
    }

    /// Infix rendering re-derives grouping parentheses from precedence:
    /// a child that binds looser than its parent (or an equally-binding
    /// right child) came from explicit parens in the source.
    fn format_infix(&self, node: &InfixExpression) -> String {
        let prec = operator_precedence(&node.operator);
        let left = self.format_operand(&node.left, prec, false);
        let right = self.format_operand(&node.right, prec, true);
        format!("{} {} {}", left, node.operator, right)
    }

    /// Operands of `.`/`()`/`[]` that are themselves operator expressions
    /// came from explicit parens; keep them.
    fn format_postfix_operand(&self, operand: &Expression) -> String {
        match operand {
            Expression::Infix(_) | Expression::Prefix(_) => {
                format!("({})", self.format_expression(operand))
            }
            _ => self.format_expression(operand),
        }
    }

    fn format_operand(&self, operand: &Expression, parent_prec: u8, is_right: bool) -> String {
        let rendered = self.format_expression(operand);
        if let Expression::Infix(child) = operand {
            let child_prec = operator_precedence(&child.operator);
            let needs_parens = child_prec < parent_prec || (is_right && child_prec == parent_prec);
            if needs_parens {
                return format!("({rendered})");
            }
        }
        rendered
    }

    fn format_params(&self, params: &[Param]) -> String {
        let parts: Vec<String> = params
            .iter()
            .map(|param| {
                let mut out = param.name.clone();
                if let Some(hint) = &param.type_hint {
                    out.push_str(&format!(": {}", self.format_expression(hint)));
                }
                if let Some(default) = &param.default {
                    out.push_str(&format!(" = {}", self.format_expression(default)));
                }
                out
            })
            .collect();
        parts.join(", ")
    }

    /// Arrays with more than three elements break one per line.
    fn format_array(&self, node: &ArrayLit) -> String {
        if node.elements.is_empty() {
            return "[]".to_string();
        }
        let elements: Vec<String> = node
            .elements
            .iter()
            .map(|e| self.format_expression(e))
            .collect();
        if elements.len() <= 3 {
            return format!("[{}]", elements.join(", "));
        }
        let inner = self.indent_str_at(self.indent + 1);
        format!(
            "[\n{}{}\n{}]",
            inner,
            elements.join(&format!(",\n{inner}")),
            self.indent_str()
        )
    }

    /// Hashes with more than two pairs break one per line.
    fn format_hash(&self, node: &HashLit) -> String {
        if node.pairs.is_empty() {
            return "{}".to_string();
        }
        let pairs: Vec<String> = node
            .pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}: {}",
                    self.format_expression(k),
                    self.format_expression(v)
                )
            })
            .collect();
        if pairs.len() <= 2 {
            return format!("{{{}}}", pairs.join(", "));
        }
        let inner = self.indent_str_at(self.indent + 1);
        format!(
            "{{\n{}{}\n{}}}",
            inner,
            pairs.join(&format!(",\n{inner}")),
            self.indent_str()
        )
    }
}

/// Float literals always keep a decimal point so they reparse as floats.
fn format_float(value: f64) -> String {
    let out = format!("{value}");
    if out.contains('.') || out.contains('e') || out.contains("inf") || out.contains("NaN") {
        out
    } else {
        format!("{out}.0")
    }
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}
