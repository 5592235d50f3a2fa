//! Lowering passes.
//!
//! [`lower`] rewrites a merged program so that it no longer contains
//! template literals, optional chains, nullish coalescing, default
//! parameters, destructured declarations or JSX. All passes share one
//! traversal and one [`LoweringContext`].

mod destructure;
#[cfg(feature = "jsx")]
mod jsx;
mod optional;
mod params;
mod template;

#[cfg(feature = "jsx")]
pub use jsx::jsx_factory;

use crate::ast::*;
use crate::span::Span;
use crate::traverse::{traverse, Path, Visitor};
use rustc_hash::FxHashSet;

/// State shared by the lowering passes of one bundle.
#[derive(Debug)]
pub struct LoweringContext {
    /// Names that generated identifiers must avoid.
    taken: FxHashSet<String>,
    counter: usize,
    /// Bundle-scope temporaries, declared by [`lower`] once it is done.
    temporaries: Vec<String>,
    jsx_factory: String,
    saw_jsx: bool,
}

impl LoweringContext {
    /// A context whose generated names avoid every name in `taken`.
    pub fn new(taken: impl IntoIterator<Item = String>) -> Self {
        Self {
            taken: taken.into_iter().collect(),
            counter: 0,
            temporaries: Vec::new(),
            jsx_factory: "h".to_string(),
            saw_jsx: false,
        }
    }

    /// Name of the function JSX elements are lowered to calls of.
    pub fn with_jsx_factory(mut self, name: impl Into<String>) -> Self {
        self.jsx_factory = name.into();
        self.taken.insert(self.jsx_factory.clone());
        self
    }

    pub fn jsx_factory(&self) -> &str {
        &self.jsx_factory
    }

    /// Whether any JSX was lowered.
    pub fn saw_jsx(&self) -> bool {
        self.saw_jsx
    }

    /// A new identifier `_<hint><n>` that collides with nothing seen so far.
    pub fn fresh(&mut self, hint: &str) -> String {
        loop {
            self.counter += 1;
            let name = format!("_{hint}{}", self.counter);
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }

    /// A fresh identifier declared once at bundle scope.
    pub fn temporary(&mut self) -> String {
        let name = self.fresh("t");
        self.temporaries.push(name.clone());
        name
    }

    /// Temporaries handed out since the last call.
    pub fn take_temporaries(&mut self) -> Vec<String> {
        std::mem::take(&mut self.temporaries)
    }

    /// `(name = value)` and a reference to `name`, or `value` twice when
    /// reading it again has no effects.
    pub(crate) fn memoize(&mut self, value: Expr) -> (Expr, Expr) {
        if matches!(value.kind, ExprKind::Ident(_) | ExprKind::This) {
            return (value.clone(), value);
        }
        let name = self.temporary();
        let span = value.span;
        let assign = Expr::new(
            ExprKind::Assign {
                op: AssignOp::Assign,
                left: Box::new(Expr::ident(&name)),
                right: Box::new(value),
            },
            span,
        );
        (assign, Expr::ident(name))
    }
}

impl Default for LoweringContext {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

struct Lowering<'c> {
    ctx: &'c mut LoweringContext,
}

impl Visitor for Lowering<'_> {
    fn enter_function(&mut self, function: &mut Function, _path: &Path) -> Option<Function> {
        params::lower_function(function, self.ctx);
        None
    }

    fn enter_arrow(&mut self, arrow: &mut ArrowFunction, _path: &Path) -> Option<ArrowFunction> {
        params::lower_arrow(arrow, self.ctx);
        None
    }

    fn enter_expr(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
        optional::lower_chain_reference(expr, self.ctx)
    }

    fn template(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
        template::lower(expr)
    }

    fn member_chain(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
        optional::lower_chain(expr, self.ctx)
    }

    fn logical(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
        optional::lower_nullish(expr, self.ctx)
    }

    fn var_decl(&mut self, stmt: &mut Stmt, _path: &Path) -> Option<Stmt> {
        destructure::lower(stmt, self.ctx)
    }

    #[cfg(feature = "jsx")]
    fn jsx_element(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
        self.ctx.saw_jsx = true;
        jsx::lower_element(expr, self.ctx)
    }

    #[cfg(feature = "jsx")]
    fn jsx_fragment(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
        self.ctx.saw_jsx = true;
        jsx::lower_fragment(expr)
    }

    #[cfg(feature = "jsx")]
    fn jsx_text(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
        jsx::lower_text(expr)
    }

    #[cfg(feature = "jsx")]
    fn jsx_expr_container(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
        jsx::lower_container(expr)
    }
}

/// Run every lowering pass over `program`. Temporaries the passes needed
/// are declared by one `var` statement at the top of the program.
pub fn lower(program: &mut Program, ctx: &mut LoweringContext) {
    traverse(program, &mut Lowering { ctx });
    let temporaries = ctx.take_temporaries();
    if temporaries.is_empty() {
        return;
    }
    tracing::debug!(count = temporaries.len(), "declaring lowering temporaries");
    let decls = temporaries
        .into_iter()
        .map(|name| VarDeclarator { binding: Binding::ident(name), init: None, span: Span::default() })
        .collect();
    let decl = Stmt::new(StmtKind::Var { kind: VarKind::Var, decls }, Span::default());
    program.body.insert(0, decl);
}

// =============================================================================
// Node builders shared by the passes
// =============================================================================

pub(crate) fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    let span = left.span;
    Expr::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, span)
}

pub(crate) fn assign(left: Expr, right: Expr) -> Expr {
    let span = left.span;
    Expr::new(
        ExprKind::Assign { op: AssignOp::Assign, left: Box::new(left), right: Box::new(right) },
        span,
    )
}

pub(crate) fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Expr {
    let span = test.span;
    Expr::new(
        ExprKind::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        },
        span,
    )
}

pub(crate) fn computed_member(object: Expr, property: Expr) -> Expr {
    let span = object.span;
    Expr::new(
        ExprKind::Member { object: Box::new(object), property: Box::new(property), computed: true },
        span,
    )
}

pub(crate) fn number(value: f64) -> Expr {
    Expr::new(ExprKind::Number(value), Span::default())
}

pub(crate) fn null() -> Expr {
    Expr::new(ExprKind::Null, Span::default())
}

/// `value === void 0`
pub(crate) fn is_undefined(value: Expr) -> Expr {
    binary(BinaryOp::StrictEq, value, Expr::undefined())
}

/// `object.key` for identifier-like keys, `object["key"]` otherwise.
pub(crate) fn member_by_name(object: Expr, key: &str) -> Expr {
    if crate::is_identifier_name(key) {
        Expr::member(object, key)
    } else {
        computed_member(object, Expr::string(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{generate, CodegenOptions};
    use crate::parser::{Parser, ParserOptions};

    pub(crate) fn lowered(source: &str) -> String {
        let mut program = Parser::new(source, ParserOptions::default().with_jsx(true)).parse().unwrap();
        let mut ctx = LoweringContext::default();
        lower(&mut program, &mut ctx);
        generate(&program, &CodegenOptions::minify())
    }

    #[test]
    fn test_fresh_names_avoid_taken() {
        let mut ctx = LoweringContext::new(["_t1".to_string(), "_t2".to_string()]);
        assert_eq!(ctx.fresh("t"), "_t3");
        assert_eq!(ctx.temporary(), "_t4");
        assert_eq!(ctx.take_temporaries(), vec!["_t4"]);
        assert!(ctx.take_temporaries().is_empty());
    }

    #[test]
    fn test_temporaries_declared_once() {
        let out = lowered("a()?.b; c()?.d;");
        assert!(out.starts_with("var _t1,_t2;"), "{out}");
    }

    #[test]
    fn test_untouched_program() {
        assert_eq!(lowered("let x=a+b;"), "let x=a+b;");
    }
}
