//! AST node types for JavaScript and JSX.
//!
//! Design principle: everything is an Expression, Binding, or Statement.
//! Each category is a single tagged enum whose variants hold only their own
//! fields; the shared span lives on the wrapping struct.

use crate::span::Span;

/// How top-level code is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceType {
    /// ES module: `import`/`export` allowed.
    #[default]
    Module,
    /// Classic script.
    Script,
}

/// The root of a parsed file or of a merged bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub source_type: SourceType,
    pub span: Span,
}

impl Program {
    pub fn new(body: Vec<Stmt>, source_type: SourceType, span: Span) -> Self {
        Self { body, source_type, span }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Identifier reference with no source position.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Ident(name.into()), Span::default())
    }

    /// String literal with no source position.
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::String(value.into()), Span::default())
    }

    /// `callee(args)` with no source position.
    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        let span = callee.span;
        Self::new(ExprKind::Call { callee: Box::new(callee), args }, span)
    }

    /// `object.name` with no source position.
    pub fn member(object: Expr, name: impl Into<String>) -> Self {
        let span = object.span;
        Self::new(
            ExprKind::Member {
                object: Box::new(object),
                property: Box::new(Expr::ident(name)),
                computed: false,
            },
            span,
        )
    }

    /// `void 0`, the canonical `undefined`.
    pub fn undefined() -> Self {
        Self::new(
            ExprKind::Unary {
                op: UnaryOp::Void,
                arg: Box::new(Expr::new(ExprKind::Number(0.0), Span::default())),
            },
            Span::default(),
        )
    }

    /// Name of an identifier reference.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // === Literals ===
    Null,
    Bool(bool),
    Number(f64),
    /// BigInt literal digits (without the `n` suffix)
    BigInt(String),
    /// String literal (cooked value)
    String(String),
    Regex { pattern: String, flags: String },
    /// Template literal: `` `a${b}c` ``
    Template(Box<Template>),

    // === Identifiers ===
    Ident(String),
    /// Private name in member position: `this.#x` (stored without `#`)
    PrivateName(String),
    This,
    Super,

    // === Compound Expressions ===
    /// Array literal; `None` marks a hole.
    Array(Vec<Option<Expr>>),
    Object(Vec<Property>),
    Function(Box<Function>),
    Arrow(Box<ArrowFunction>),
    Class(Box<Class>),

    // === Operations ===
    Unary { op: UnaryOp, arg: Box<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `&&`, `||`, `??`
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Sequence(Vec<Expr>),

    // === Member Access ===
    /// `a.b` / `a[b]`
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },
    /// `a?.b` / `a?.[b]`
    OptionalMember {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },
    /// A member/call chain that contains at least one optional link.
    Chain(Box<Expr>),

    // === Calls ===
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `f?.(a)`
    OptionalCall { callee: Box<Expr>, args: Vec<Expr> },
    New { callee: Box<Expr>, args: Vec<Expr> },
    TaggedTemplate { tag: Box<Expr>, quasi: Box<Template> },

    // === Special ===
    Spread(Box<Expr>),
    Yield {
        arg: Option<Box<Expr>>,
        delegate: bool,
    },
    Await(Box<Expr>),
    /// Dynamic `import(x)`
    Import(Box<Expr>),
    /// `new.target`, `import.meta`
    MetaProperty { meta: String, property: String },

    // === JSX ===
    JsxElement(Box<JsxElement>),
    JsxFragment(Box<JsxFragment>),
    /// Raw text between JSX tags.
    JsxText(String),
    /// `{expr}` inside JSX; `None` for `{}` or a comment-only container.
    JsxExprContainer(Option<Box<Expr>>),
}

/// Template literal parts. `quasis.len() == exprs.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub quasis: Vec<TemplateElement>,
    pub exprs: Vec<Expr>,
}

/// One literal chunk of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElement {
    /// Source text as written.
    pub raw: String,
    /// Text with escapes processed.
    pub cooked: String,
}

// =============================================================================
// Statements
// =============================================================================

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Expression statement with no source position.
    pub fn expr(expr: Expr) -> Self {
        let span = expr.span;
        Self::new(StmtKind::Expr(expr), span)
    }

    /// `var name = init;` with no source position.
    pub fn var(name: impl Into<String>, init: Option<Expr>) -> Self {
        Self::new(
            StmtKind::Var {
                kind: VarKind::Var,
                decls: vec![VarDeclarator {
                    binding: Binding::ident(name),
                    init,
                    span: Span::default(),
                }],
            },
            Span::default(),
        )
    }
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // === Declarations ===
    Var {
        kind: VarKind,
        decls: Vec<VarDeclarator>,
    },
    Function(Box<Function>),
    Class(Box<Class>),

    // === Control Flow ===
    Block(Vec<Stmt>),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
    },
    ForOf {
        left: ForInit,
        right: Expr,
        body: Box<Stmt>,
        is_await: bool,
    },
    While { test: Expr, body: Box<Stmt> },
    DoWhile { body: Box<Stmt>, test: Expr },
    Break { label: Option<String> },
    Continue { label: Option<String> },
    Return { arg: Option<Expr> },
    Throw { arg: Expr },
    Try {
        block: Vec<Stmt>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
    },
    Labeled { label: String, body: Box<Stmt> },

    // === Expressions ===
    Expr(Expr),
    Empty,
    Debugger,

    // === Modules ===
    Import(Box<ImportDecl>),
    Export(Box<ExportDecl>),
}

// =============================================================================
// Bindings (Patterns)
// =============================================================================

/// A binding pattern (used in variable declarations, parameters, etc.)
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub kind: BindingKind,
    pub span: Span,
}

impl Binding {
    pub fn new(kind: BindingKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Plain identifier binding with no source position.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(BindingKind::Ident { name: name.into() }, Span::default())
    }

    /// Every name this pattern binds, in source order.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            BindingKind::Ident { name } => out.push(name),
            BindingKind::Array { elements } => {
                for elem in elements.iter().flatten() {
                    elem.binding.collect_names(out);
                }
            }
            BindingKind::Object { properties } => {
                for prop in properties {
                    prop.value.collect_names(out);
                }
            }
        }
    }
}

/// Binding pattern kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    /// Simple identifier: `x`
    Ident { name: String },
    /// Array pattern: `[a, b, ...rest]`
    Array { elements: Vec<Option<ArrayPatternElement>> },
    /// Object pattern: `{a, b: c, ...rest}`
    Object { properties: Vec<ObjectPatternProperty> },
}

/// Element in an array pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPatternElement {
    pub binding: Binding,
    pub default: Option<Expr>,
    pub rest: bool,
}

/// Property in an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatternProperty {
    pub key: PropertyKey,
    pub value: Binding,
    pub default: Option<Expr>,
    pub shorthand: bool,
    pub rest: bool,
}

// =============================================================================
// Supporting Types
// =============================================================================

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,  // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
    Typeof, // typeof
    Void,   // void
    Delete, // delete
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    Pow, // **

    // Comparison
    Eq,          // ==
    NotEq,       // !=
    StrictEq,    // ===
    StrictNotEq, // !==
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=

    // Bitwise
    BitOr,  // |
    BitXor, // ^
    BitAnd, // &
    Shl,    // <<
    Shr,    // >>
    UShr,   // >>>

    // Other
    In,         // in
    Instanceof, // instanceof
}

/// Short-circuiting operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,             // &&
    Or,              // ||
    NullishCoalesce, // ??
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,        // =
    AddAssign,     // +=
    SubAssign,     // -=
    MulAssign,     // *=
    DivAssign,     // /=
    ModAssign,     // %=
    PowAssign,     // **=
    ShlAssign,     // <<=
    ShrAssign,     // >>=
    UShrAssign,    // >>>=
    BitOrAssign,   // |=
    BitXorAssign,  // ^=
    BitAndAssign,  // &=
    AndAssign,     // &&=
    OrAssign,      // ||=
    NullishAssign, // ??=
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment, // ++
    Decrement, // --
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

/// Variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub binding: Binding,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Object literal member.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: PropertyKey,
    pub value: Expr,
    pub kind: PropertyKind,
    pub shorthand: bool,
    pub span: Span,
}

/// Property key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Ident(String),
    String(String),
    Number(f64),
    Computed(Box<Expr>),
    /// `#name` in a class body (stored without `#`)
    Private(String),
}

/// Property kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
    Method,
    /// `...expr`; the key is unused.
    Spread,
}

/// Switch case.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>, // None for default
    pub consequent: Vec<Stmt>,
    pub span: Span,
}

/// Catch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Binding>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// For loop initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var {
        kind: VarKind,
        decls: Vec<VarDeclarator>,
    },
    Expr(Expr),
}

// =============================================================================
// Functions and Classes
// =============================================================================

/// Function node (used for declarations, expressions, methods).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

/// Arrow function node.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub params: Vec<Param>,
    pub body: ArrowBody,
    pub is_async: bool,
    pub span: Span,
}

/// Arrow function body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub binding: Binding,
    pub default: Option<Expr>,
    pub rest: bool,
    pub span: Span,
}

/// Class node.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<String>,
    pub super_class: Option<Box<Expr>>,
    pub body: Vec<ClassMember>,
    pub span: Span,
}

/// Class member.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub kind: ClassMemberKind,
    pub span: Span,
}

/// Class member kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberKind {
    /// Method: `foo() {}`
    Method {
        key: PropertyKey,
        value: Function,
        kind: MethodKind,
        is_static: bool,
    },
    /// Field: `foo = 1`
    Property {
        key: PropertyKey,
        value: Option<Expr>,
        is_static: bool,
    },
    /// Static block: `static { ... }`
    StaticBlock(Vec<Stmt>),
    /// Empty (semicolon)
    Empty,
}

/// Method kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    Constructor,
}

// =============================================================================
// Modules
// =============================================================================

/// Import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    /// Span of the source string literal.
    pub source_span: Span,
    pub span: Span,
}

/// Import specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// Default import: `import foo from "mod"`
    Default { local: String, span: Span },
    /// Namespace import: `import * as foo from "mod"`
    Namespace { local: String, span: Span },
    /// Named import: `import { foo, bar as baz } from "mod"`
    Named {
        imported: String,
        local: String,
        span: Span,
    },
}

impl ImportSpecifier {
    pub fn local(&self) -> &str {
        match self {
            ImportSpecifier::Default { local, .. }
            | ImportSpecifier::Namespace { local, .. }
            | ImportSpecifier::Named { local, .. } => local,
        }
    }
}

/// Export declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// Named export: `export { foo, bar }` / `export { foo } from "mod"`
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<(String, Span)>,
        span: Span,
    },
    /// Default export: `export default expr`
    Default { expr: Expr, span: Span },
    /// Declaration export: `export function foo() {}`
    Decl { decl: Stmt, span: Span },
    /// All export: `export * from "mod"`
    All {
        exported: Option<String>,
        source: String,
        source_span: Span,
        span: Span,
    },
}

/// Export specifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
    pub span: Span,
}

// =============================================================================
// JSX
// =============================================================================

/// `<name attrs>children</name>` or `<name attrs />`
#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    pub name: JsxElementName,
    pub attributes: Vec<JsxAttribute>,
    /// `JsxText`, `JsxExprContainer`, `JsxElement`, `JsxFragment` expressions.
    pub children: Vec<Expr>,
    pub self_closing: bool,
    pub span: Span,
}

/// `<>children</>`
#[derive(Debug, Clone, PartialEq)]
pub struct JsxFragment {
    pub children: Vec<Expr>,
    pub span: Span,
}

/// JSX tag name.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxElementName {
    /// `div`, `Foo`
    Ident(String),
    /// `a.b.c`
    Member(Vec<String>),
    /// `svg:rect`
    Namespaced { namespace: String, name: String },
}

impl JsxElementName {
    /// Source form of the name.
    pub fn to_source(&self) -> String {
        match self {
            JsxElementName::Ident(name) => name.clone(),
            JsxElementName::Member(parts) => parts.join("."),
            JsxElementName::Namespaced { namespace, name } => format!("{namespace}:{name}"),
        }
    }
}

/// JSX attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttribute {
    /// `name`, `name="v"`, `name={expr}`, `name=<el/>`
    Attribute {
        name: String,
        value: Option<Expr>,
        span: Span,
    },
    /// `{...expr}`
    Spread { argument: Expr, span: Span },
}
