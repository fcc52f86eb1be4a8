//! AST node definitions for the Lambdawg language.
//!
//! The AST is a closed family of tagged variants. Every node carries the
//! span of the source text it was parsed from; every expression
//! additionally carries a [`NodeId`], the key the type checker uses for
//! its external node-to-type map. Nodes are immutable after construction.

use lambdawg_common::span::Span;
use serde::Serialize;

/// Identity of an expression node within one parse.
///
/// Ids are dense and allocated in parse order by the parser.
pub type NodeId = u32;

/// A complete source file: module declarations plus top-level statements,
/// both in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub modules: Vec<Module>,
    pub statements: Vec<Statement>,
}

/// A `module name { ... }` declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub name: String,
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// Any statement, at the top level, inside a module, or inside a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Let(LetStatement),
    TypeDef(TypeDef),
    Import(Import),
    Expression(Expr),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Let(s) => s.span,
            Statement::TypeDef(s) => s.span,
            Statement::Import(s) => s.span,
            Statement::Expression(e) => e.span,
        }
    }
}

/// `[private] let name [with ambients] [: type] = value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetStatement {
    pub private: bool,
    pub name: String,
    pub name_span: Span,
    /// Ambient dependencies from the `with` clause, supplied at call sites
    /// by `provide` blocks.
    pub ambients: Vec<AmbientParam>,
    pub annotation: Option<TypeExpr>,
    pub value: Expr,
    pub span: Span,
}

/// One `name[: type]` entry of an ambient list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbientParam {
    pub name: String,
    pub annotation: Option<TypeExpr>,
    pub span: Span,
}

/// `type Name params = variants-or-alias`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDef {
    pub name: String,
    /// Lowercase type parameters, in declaration order.
    pub params: Vec<String>,
    pub body: TypeDefBody,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeDefBody {
    /// One or more `|`-separated variants.
    Sum(Vec<Variant>),
    /// An alias for an arbitrary type expression.
    Alias(TypeExpr),
}

/// A sum-type variant: a type identifier with an optional record of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub name: String,
    pub fields: Option<Vec<FieldType>>,
    pub span: Span,
}

/// A `name: Type` pair inside a variant or record type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldType {
    pub name: String,
    pub ty: TypeExpr,
}

/// `import [js] name [{ * | a, b as c }]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub js: bool,
    pub module: String,
    pub items: Option<ImportItems>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImportItems {
    All,
    Named(Vec<ImportItem>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

// ── Expressions ──────────────────────────────────────────────────────────

/// An expression node: identity, source span, and the tagged variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    pub id: NodeId,
    pub span: Span,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
    Identifier(String),
    List(Vec<Expr>),
    Record {
        /// Optional `...base` spread, expanded before explicit fields so
        /// later field writes win.
        spread: Option<Box<Expr>>,
        fields: Vec<RecordField>,
    },
    Function {
        params: Vec<Pattern>,
        body: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        field: String,
        field_span: Span,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `left |> right`, with the `seq` flag and `@parallel` hints recorded
    /// verbatim. The flags do not currently alter emission.
    Pipeline {
        left: Box<Expr>,
        right: Box<Expr>,
        sequential: bool,
        hints: Vec<PipelineHint>,
    },
    /// Postfix `?` error propagation.
    Try(Box<Expr>),
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Match {
        subject: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    /// `do { ... }` / `do? { ... }` effect block.
    Do {
        /// Whether this is the error-propagating `do?` variant.
        result_context: bool,
        statements: Vec<DoStatement>,
    },
    /// `provide name = expr, ... in body`
    Provide {
        provisions: Vec<Provision>,
        body: Box<Expr>,
    },
    /// `{ statements }`; a trailing expression statement is the value.
    Block(Vec<Statement>),
    /// `_` in argument position: a hole that turns the surrounding call
    /// into a function of the remaining arguments.
    Placeholder,
    /// `...expr` spread.
    Spread(Box<Expr>),
}

/// A `name: value` pair in a record literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// One `key: expr` entry of an `@parallel(...)` hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineHint {
    pub key: String,
    pub value: Expr,
}

/// One `name = expr` entry of a provide block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provision {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// The operator's surface (and JavaScript) spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Whether this operator compares rather than computes.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::LtEq
                | BinaryOp::GtEq
        )
    }

    /// Whether this operator is a logical connective.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// `pattern [if guard] => body`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Expr,
    pub span: Span,
}

/// A statement inside a `do` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DoStatement {
    /// `let pattern = [do!] expr`
    Let {
        pattern: Pattern,
        value: Expr,
        /// Whether the right-hand side carried the `do!` effect marker.
        effectful: bool,
        span: Span,
    },
    /// `do! expr`
    Effect { value: Expr, span: Span },
    /// A bare expression evaluated for its value or effect.
    Expr(Expr),
}

impl DoStatement {
    pub fn span(&self) -> Span {
        match self {
            DoStatement::Let { span, .. } => *span,
            DoStatement::Effect { span, .. } => *span,
            DoStatement::Expr(e) => e.span,
        }
    }
}

// ── Patterns ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pattern {
    pub span: Span,
    pub kind: PatternKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PatternKind {
    /// A binder capturing the matched value.
    Identifier(String),
    Literal(PatternLiteral),
    /// `_`
    Wildcard,
    /// `[p1, p2, ...rest?]`
    List {
        elements: Vec<Pattern>,
        rest: Option<RestPattern>,
    },
    /// `{field[: pattern], ..., ...?}`
    Record {
        fields: Vec<RecordFieldPattern>,
        rest: bool,
    },
    /// `Name`, `Name { fields }`, or `Name(pattern)`.
    Constructor {
        name: String,
        arg: Option<Box<Pattern>>,
    },
    /// `...name?` capturing a remainder.
    Rest(RestPattern),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PatternLiteral {
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestPattern {
    pub name: Option<String>,
    pub span: Span,
}

/// A `name[: pattern]` field of a record pattern. A missing sub-pattern
/// binds the field under its own name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFieldPattern {
    pub name: String,
    pub pattern: Option<Pattern>,
    pub span: Span,
}

// ── Type expressions ─────────────────────────────────────────────────────

/// A surface type annotation. Mirrors the type checker's types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeExpr {
    pub span: Span,
    pub kind: TypeExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeExprKind {
    /// `Int`, `Shape`, or a lowercase type variable `a`.
    Named(String),
    /// `(T1, T2) -> R`
    Fun(Vec<TypeExpr>, Box<TypeExpr>),
    /// `{name: T, ...}`
    Record(Vec<FieldType>),
    /// `[T]`
    List(Box<TypeExpr>),
    /// `Name T1 T2`
    App(String, Vec<TypeExpr>),
    /// `(T)`
    Paren(Box<TypeExpr>),
}
