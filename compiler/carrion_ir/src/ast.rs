//! Abstract syntax tree for Carrion source.
//!
//! Nodes are plain owned data: the evaluator clones function bodies into
//! values and the formatter walks the tree read-only, so there is no
//! arena or id indirection here.

use crate::Span;

/// A parsed source file: the ordered top-level statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// A `:`-introduced statement suite.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// One formal parameter: `name[: hint][ = default]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_hint: Option<Expression>,
    pub default: Option<Expression>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Expression(ExpressionStatement),
    Assign(AssignStatement),
    Return(ReturnStatement),
    Function(FunctionDef),
    Class(ClassDef),
    If(IfStatement),
    For(ForStatement),
    While(WhileStatement),
    Attempt(AttemptStatement),
    Autoclose(AutocloseStatement),
    Import(ImportStatement),
    Match(MatchStatement),
    Main(MainStatement),
    Global(GlobalStatement),
    Raise(RaiseStatement),
    Check(CheckStatement),
    /// `stop` (loop break).
    Stop(Span),
    /// `skip` (loop continue).
    Skip(Span),
    /// `ignore` (no-op placeholder).
    Ignore(Span),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Expression(s) => s.span,
            Statement::Assign(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::Function(s) => s.span,
            Statement::Class(s) => s.span,
            Statement::If(s) => s.span,
            Statement::For(s) => s.span,
            Statement::While(s) => s.span,
            Statement::Attempt(s) => s.span,
            Statement::Autoclose(s) => s.span,
            Statement::Import(s) => s.span,
            Statement::Match(s) => s.span,
            Statement::Main(s) => s.span,
            Statement::Global(s) => s.span,
            Statement::Raise(s) => s.span,
            Statement::Check(s) => s.span,
            Statement::Stop(span) | Statement::Skip(span) | Statement::Ignore(span) => *span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

/// `TARGET OP VALUE`; `operator` is the literal spelling (`=`, `+=`, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct AssignStatement {
    pub target: Expression,
    pub operator: String,
    pub value: Expression,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

/// `spell NAME(PARAMS):` or a grimoire's `init(PARAMS):`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    /// Span of just the name token, for go-to-definition targets.
    pub name_span: Span,
    pub params: Vec<Param>,
    pub body: Block,
    pub doc_string: Option<String>,
    pub is_init: bool,
    /// `arcanespell` (static method).
    pub is_arcane: bool,
    pub span: Span,
}

/// `grim NAME[(PARENT)]:` with an optional init and its methods.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDef {
    pub name: String,
    pub name_span: Span,
    pub inherits: Option<String>,
    pub init: Option<FunctionDef>,
    pub methods: Vec<FunctionDef>,
    pub doc_string: Option<String>,
    /// `arcane grim` (static grimoire, never instantiated).
    pub is_arcane: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub consequence: Block,
    pub otherwise_branches: Vec<OtherwiseBranch>,
    pub alternative: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OtherwiseBranch {
    pub condition: Expression,
    pub consequence: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForStatement {
    pub variable: Expression,
    pub iterable: Expression,
    pub body: Block,
    pub alternative: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttemptStatement {
    pub try_block: Block,
    pub ensnare_clauses: Vec<EnsnareClause>,
    pub resolve_block: Option<Block>,
    pub span: Span,
}

/// `ensnare[(COND)][ as NAME]:`.
#[derive(Clone, Debug, PartialEq)]
pub struct EnsnareClause {
    pub condition: Option<Expression>,
    pub alias: Option<String>,
    pub body: Block,
    pub span: Span,
}

/// `autoclose EXPR as NAME:`.
#[derive(Clone, Debug, PartialEq)]
pub struct AutocloseStatement {
    pub resource: Expression,
    pub variable: String,
    pub body: Block,
    pub span: Span,
}

/// `import "PATH"[.NAME][ as ALIAS]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportStatement {
    pub path: String,
    pub imported_name: Option<String>,
    pub alias: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchStatement {
    pub value: Expression,
    pub cases: Vec<CaseClause>,
    pub default: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MainStatement {
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GlobalStatement {
    pub names: Vec<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RaiseStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

/// `check COND[, MESSAGE]` (runtime assertion).
#[derive(Clone, Debug, PartialEq)]
pub struct CheckStatement {
    pub condition: Expression,
    pub message: Option<Expression>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLit(IntegerLit),
    FloatLit(FloatLit),
    StringLit(StringLit),
    BoolLit(BoolLit),
    NoneLit(Span),
    ArrayLit(ArrayLit),
    HashLit(HashLit),
    TupleLit(TupleLit),
    Call(CallExpression),
    Infix(InfixExpression),
    Prefix(PrefixExpression),
    Index(IndexExpression),
    Dot(DotExpression),
    Slice(SliceExpression),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(e) => e.span,
            Expression::IntegerLit(e) => e.span,
            Expression::FloatLit(e) => e.span,
            Expression::StringLit(e) => e.span,
            Expression::BoolLit(e) => e.span,
            Expression::NoneLit(span) => *span,
            Expression::ArrayLit(e) => e.span,
            Expression::HashLit(e) => e.span,
            Expression::TupleLit(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::Infix(e) => e.span,
            Expression::Prefix(e) => e.span,
            Expression::Index(e) => e.span,
            Expression::Dot(e) => e.span,
            Expression::Slice(e) => e.span,
        }
    }

    /// The identifier name, if this expression is a bare identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntegerLit {
    pub value: i64,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatLit {
    pub value: f64,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLit {
    pub value: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoolLit {
    pub value: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayLit {
    pub elements: Vec<Expression>,
    pub span: Span,
}

/// Pairs are kept in source order so formatting is deterministic.
#[derive(Clone, Debug, PartialEq)]
pub struct HashLit {
    pub pairs: Vec<(Expression, Expression)>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TupleLit {
    pub elements: Vec<Expression>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InfixExpression {
    pub left: Box<Expression>,
    pub operator: String,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrefixExpression {
    pub operator: String,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DotExpression {
    pub object: Box<Expression>,
    pub property: String,
    pub property_span: Span,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SliceExpression {
    pub object: Box<Expression>,
    pub start: Option<Box<Expression>>,
    pub end: Option<Box<Expression>>,
    pub span: Span,
}
