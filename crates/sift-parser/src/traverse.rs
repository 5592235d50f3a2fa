//! Depth-first tree rewriting.
//!
//! [`traverse`] visits every statement and expression of a program. Hooks on
//! [`Visitor`] may return a replacement node, which is written into the
//! parent's slot and offered to the hooks again (at most [`MAX_REWRITES`]
//! times per slot) before the walker descends into its children.

use crate::ast::*;

/// Upper bound on consecutive replacements of one slot.
pub const MAX_REWRITES: usize = 32;

/// Node kinds recorded on the [`Path`] while the walker is below them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ancestor {
    Program,
    Stmt,
    Expr,
    Function,
    Arrow,
    Class,
    Jsx,
}

/// Ancestors of the node being visited. Only valid during a hook call.
#[derive(Debug, Default)]
pub struct Path {
    stack: Vec<Ancestor>,
}

impl Path {
    /// The enclosing node kind.
    pub fn parent(&self) -> Option<Ancestor> {
        self.stack.last().copied()
    }

    /// Enclosing node kinds, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = Ancestor> + '_ {
        self.stack.iter().rev().copied()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether a function or arrow body encloses the node.
    pub fn inside_function(&self) -> bool {
        self.stack.iter().any(|a| matches!(a, Ancestor::Function | Ancestor::Arrow))
    }
}

/// Rewrite hooks. Every hook defaults to leaving the node alone.
///
/// `enter_*` hooks see every node of their category; the kind-specific
/// hooks only see the kinds they are named after and run after `enter_*`
/// declined to replace the node.
#[allow(unused_variables)]
pub trait Visitor {
    fn enter_stmt(&mut self, stmt: &mut Stmt, path: &Path) -> Option<Stmt> {
        None
    }

    fn enter_expr(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
        None
    }

    fn enter_function(&mut self, function: &mut Function, path: &Path) -> Option<Function> {
        None
    }

    fn enter_arrow(&mut self, arrow: &mut ArrowFunction, path: &Path) -> Option<ArrowFunction> {
        None
    }

    /// `ExprKind::Template`
    fn template(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
        None
    }

    /// `ExprKind::Chain`
    fn member_chain(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
        None
    }

    /// `ExprKind::Logical` and the logical assignments `&&=`, `||=`, `??=`
    fn logical(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
        None
    }

    /// `StmtKind::Var`
    fn var_decl(&mut self, stmt: &mut Stmt, path: &Path) -> Option<Stmt> {
        None
    }

    fn jsx_element(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
        None
    }

    fn jsx_fragment(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
        None
    }

    fn jsx_text(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
        None
    }

    fn jsx_expr_container(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
        None
    }
}

/// Walk `program` with `visitor`.
pub fn traverse<V: Visitor + ?Sized>(program: &mut Program, visitor: &mut V) {
    let mut walker = Walker { visitor, path: Path::default() };
    walker.path.stack.push(Ancestor::Program);
    walker.stmts(&mut program.body);
}

struct Walker<'v, V: ?Sized> {
    visitor: &'v mut V,
    path: Path,
}

#[derive(Clone, Copy)]
enum ExprHook {
    Template,
    Chain,
    Logical,
    JsxElement,
    JsxFragment,
    JsxText,
    JsxExprContainer,
}

fn expr_hook(kind: &ExprKind) -> Option<ExprHook> {
    Some(match kind {
        ExprKind::Template(_) => ExprHook::Template,
        ExprKind::Chain(_) => ExprHook::Chain,
        ExprKind::Logical { .. }
        | ExprKind::Assign { op: AssignOp::AndAssign | AssignOp::OrAssign | AssignOp::NullishAssign, .. } => {
            ExprHook::Logical
        }
        ExprKind::JsxElement(_) => ExprHook::JsxElement,
        ExprKind::JsxFragment(_) => ExprHook::JsxFragment,
        ExprKind::JsxText(_) => ExprHook::JsxText,
        ExprKind::JsxExprContainer(_) => ExprHook::JsxExprContainer,
        _ => return None,
    })
}

impl<V: Visitor + ?Sized> Walker<'_, V> {
    fn within(&mut self, ancestor: Ancestor, f: impl FnOnce(&mut Self)) {
        self.path.stack.push(ancestor);
        f(self);
        self.path.stack.pop();
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn stmts(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        for _ in 0..MAX_REWRITES {
            let mut replacement = self.visitor.enter_stmt(stmt, &self.path);
            if replacement.is_none() && matches!(stmt.kind, StmtKind::Var { .. }) {
                replacement = self.visitor.var_decl(stmt, &self.path);
            }
            match replacement {
                Some(new) => *stmt = new,
                None => break,
            }
        }
        self.within(Ancestor::Stmt, |w| w.stmt_children(stmt));
    }

    fn stmt_children(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Var { decls, .. } => self.declarators(decls),
            StmtKind::Function(f) => self.function(f),
            StmtKind::Class(c) => self.class(c),
            StmtKind::Block(body) => self.stmts(body),
            StmtKind::If { test, consequent, alternate } => {
                self.expr(test);
                self.stmt(consequent);
                if let Some(alt) = alternate {
                    self.stmt(alt);
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.expr(discriminant);
                for case in cases {
                    if let Some(test) = &mut case.test {
                        self.expr(test);
                    }
                    self.stmts(&mut case.consequent);
                }
            }
            StmtKind::For { init, test, update, body } => {
                if let Some(init) = init {
                    self.for_init(init);
                }
                if let Some(test) = test {
                    self.expr(test);
                }
                if let Some(update) = update {
                    self.expr(update);
                }
                self.stmt(body);
            }
            StmtKind::ForIn { left, right, body } | StmtKind::ForOf { left, right, body, .. } => {
                self.for_init(left);
                self.expr(right);
                self.stmt(body);
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.expr(test);
                self.stmt(body);
            }
            StmtKind::Return { arg } => {
                if let Some(arg) = arg {
                    self.expr(arg);
                }
            }
            StmtKind::Throw { arg } | StmtKind::Expr(arg) => self.expr(arg),
            StmtKind::Try { block, handler, finalizer } => {
                self.stmts(block);
                if let Some(handler) = handler {
                    if let Some(param) = &mut handler.param {
                        self.binding(param);
                    }
                    self.stmts(&mut handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.stmts(finalizer);
                }
            }
            StmtKind::Labeled { body, .. } => self.stmt(body),
            StmtKind::Export(export) => match export.as_mut() {
                ExportDecl::Default { expr, .. } => self.expr(expr),
                ExportDecl::Decl { decl, .. } => self.stmt(decl),
                ExportDecl::Named { .. } | ExportDecl::All { .. } => {}
            },
            StmtKind::Break { .. }
            | StmtKind::Continue { .. }
            | StmtKind::Empty
            | StmtKind::Debugger
            | StmtKind::Import(_) => {}
        }
    }

    fn declarators(&mut self, decls: &mut [VarDeclarator]) {
        for decl in decls {
            self.binding(&mut decl.binding);
            if let Some(init) = &mut decl.init {
                self.expr(init);
            }
        }
    }

    fn for_init(&mut self, init: &mut ForInit) {
        match init {
            ForInit::Var { decls, .. } => self.declarators(decls),
            ForInit::Expr(expr) => self.expr(expr),
        }
    }

    fn binding(&mut self, binding: &mut Binding) {
        match &mut binding.kind {
            BindingKind::Ident { .. } => {}
            BindingKind::Array { elements } => {
                for elem in elements.iter_mut().flatten() {
                    self.binding(&mut elem.binding);
                    if let Some(default) = &mut elem.default {
                        self.expr(default);
                    }
                }
            }
            BindingKind::Object { properties } => {
                for prop in properties {
                    self.property_key(&mut prop.key);
                    self.binding(&mut prop.value);
                    if let Some(default) = &mut prop.default {
                        self.expr(default);
                    }
                }
            }
        }
    }

    fn property_key(&mut self, key: &mut PropertyKey) {
        if let PropertyKey::Computed(expr) = key {
            self.expr(expr);
        }
    }

    fn params(&mut self, params: &mut [Param]) {
        for param in params {
            self.binding(&mut param.binding);
            if let Some(default) = &mut param.default {
                self.expr(default);
            }
        }
    }

    // =========================================================================
    // Functions and classes
    // =========================================================================

    fn function(&mut self, function: &mut Function) {
        for _ in 0..MAX_REWRITES {
            match self.visitor.enter_function(function, &self.path) {
                Some(new) => *function = new,
                None => break,
            }
        }
        self.within(Ancestor::Function, |w| {
            w.params(&mut function.params);
            w.stmts(&mut function.body);
        });
    }

    fn arrow(&mut self, arrow: &mut ArrowFunction) {
        for _ in 0..MAX_REWRITES {
            match self.visitor.enter_arrow(arrow, &self.path) {
                Some(new) => *arrow = new,
                None => break,
            }
        }
        self.within(Ancestor::Arrow, |w| {
            w.params(&mut arrow.params);
            match &mut arrow.body {
                ArrowBody::Expr(expr) => w.expr(expr),
                ArrowBody::Block(body) => w.stmts(body),
            }
        });
    }

    fn class(&mut self, class: &mut Class) {
        self.within(Ancestor::Class, |w| {
            if let Some(super_class) = &mut class.super_class {
                w.expr(super_class);
            }
            for member in &mut class.body {
                match &mut member.kind {
                    ClassMemberKind::Method { key, value, .. } => {
                        w.property_key(key);
                        w.function(value);
                    }
                    ClassMemberKind::Property { key, value, .. } => {
                        w.property_key(key);
                        if let Some(value) = value {
                            w.expr(value);
                        }
                    }
                    ClassMemberKind::StaticBlock(body) => w.stmts(body),
                    ClassMemberKind::Empty => {}
                }
            }
        });
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr(&mut self, expr: &mut Expr) {
        for _ in 0..MAX_REWRITES {
            let mut replacement = self.visitor.enter_expr(expr, &self.path);
            if replacement.is_none() {
                replacement = self.kind_hook(expr);
            }
            match replacement {
                Some(new) => *expr = new,
                None => break,
            }
        }
        let ancestor = match expr.kind {
            ExprKind::JsxElement(_) | ExprKind::JsxFragment(_) => Ancestor::Jsx,
            _ => Ancestor::Expr,
        };
        self.within(ancestor, |w| w.expr_children(expr));
    }

    fn kind_hook(&mut self, expr: &mut Expr) -> Option<Expr> {
        let path = &self.path;
        match expr_hook(&expr.kind)? {
            ExprHook::Template => self.visitor.template(expr, path),
            ExprHook::Chain => self.visitor.member_chain(expr, path),
            ExprHook::Logical => self.visitor.logical(expr, path),
            ExprHook::JsxElement => self.visitor.jsx_element(expr, path),
            ExprHook::JsxFragment => self.visitor.jsx_fragment(expr, path),
            ExprHook::JsxText => self.visitor.jsx_text(expr, path),
            ExprHook::JsxExprContainer => self.visitor.jsx_expr_container(expr, path),
        }
    }

    fn exprs(&mut self, exprs: &mut [Expr]) {
        for expr in exprs {
            self.expr(expr);
        }
    }

    fn expr_children(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Template(template) => self.exprs(&mut template.exprs),
            ExprKind::TaggedTemplate { tag, quasi } => {
                self.expr(tag);
                self.exprs(&mut quasi.exprs);
            }
            ExprKind::Array(elements) => {
                for elem in elements.iter_mut().flatten() {
                    self.expr(elem);
                }
            }
            ExprKind::Object(props) => {
                for prop in props {
                    self.property_key(&mut prop.key);
                    self.expr(&mut prop.value);
                }
            }
            ExprKind::Function(f) => self.function(f),
            ExprKind::Arrow(arrow) => self.arrow(arrow),
            ExprKind::Class(c) => self.class(c),
            ExprKind::Unary { arg, .. }
            | ExprKind::Update { arg, .. }
            | ExprKind::Spread(arg)
            | ExprKind::Await(arg)
            | ExprKind::Import(arg)
            | ExprKind::Chain(arg) => self.expr(arg),
            ExprKind::Binary { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::Assign { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.expr(test);
                self.expr(consequent);
                self.expr(alternate);
            }
            ExprKind::Sequence(exprs) => self.exprs(exprs),
            ExprKind::Member { object, property, computed }
            | ExprKind::OptionalMember { object, property, computed } => {
                self.expr(object);
                if *computed {
                    self.expr(property);
                }
            }
            ExprKind::Call { callee, args }
            | ExprKind::OptionalCall { callee, args }
            | ExprKind::New { callee, args } => {
                self.expr(callee);
                self.exprs(args);
            }
            ExprKind::Yield { arg, .. } => {
                if let Some(arg) = arg {
                    self.expr(arg);
                }
            }
            ExprKind::JsxElement(element) => {
                for attr in &mut element.attributes {
                    match attr {
                        JsxAttribute::Attribute { value: Some(value), .. } => self.expr(value),
                        JsxAttribute::Attribute { value: None, .. } => {}
                        JsxAttribute::Spread { argument, .. } => self.expr(argument),
                    }
                }
                self.exprs(&mut element.children);
            }
            ExprKind::JsxFragment(fragment) => self.exprs(&mut fragment.children),
            ExprKind::JsxExprContainer(Some(inner)) => self.expr(inner),
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::BigInt(_)
            | ExprKind::String(_)
            | ExprKind::Regex { .. }
            | ExprKind::Ident(_)
            | ExprKind::PrivateName(_)
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::MetaProperty { .. }
            | ExprKind::JsxText(_)
            | ExprKind::JsxExprContainer(None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Parser, ParserOptions};

    fn parse(source: &str) -> Program {
        Parser::new(source, ParserOptions::default()).parse().unwrap()
    }

    struct Rename;

    impl Visitor for Rename {
        fn enter_expr(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
            match expr.as_ident() {
                Some("a") => Some(Expr::ident("b")),
                _ => None,
            }
        }
    }

    struct Count(usize);

    impl Visitor for Count {
        fn enter_expr(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
            if expr.as_ident().is_some() {
                self.0 += 1;
            }
            None
        }
    }

    #[test]
    fn test_replaces_every_slot() {
        let mut program = parse("a + f(a, [a]); function g(x = a) { return `${a}`; }");
        traverse(&mut program, &mut Rename);
        let mut count = Count(0);
        traverse(&mut program, &mut count);
        let mut remaining = 0;
        struct FindA<'c>(&'c mut usize);
        impl Visitor for FindA<'_> {
            fn enter_expr(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
                if expr.as_ident() == Some("a") {
                    *self.0 += 1;
                }
                None
            }
        }
        traverse(&mut program, &mut FindA(&mut remaining));
        assert_eq!(remaining, 0);
        // b, f, b, b, b, b
        assert_eq!(count.0, 6);
    }

    #[test]
    fn test_self_replacing_hook_terminates() {
        struct Forever(usize);
        impl Visitor for Forever {
            fn enter_expr(&mut self, expr: &mut Expr, _path: &Path) -> Option<Expr> {
                if matches!(expr.kind, ExprKind::Number(_)) {
                    self.0 += 1;
                    return Some(Expr::new(ExprKind::Number(1.0), expr.span));
                }
                None
            }
        }
        let mut program = parse("1;");
        let mut visitor = Forever(0);
        traverse(&mut program, &mut visitor);
        assert_eq!(visitor.0, MAX_REWRITES);
    }

    #[test]
    fn test_path_tracks_functions() {
        struct Depths(Vec<bool>);
        impl Visitor for Depths {
            fn enter_expr(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
                if matches!(expr.kind, ExprKind::Ident(_)) {
                    self.0.push(path.inside_function());
                }
                None
            }
        }
        let mut program = parse("x; (() => y); function f() { z; }");
        let mut visitor = Depths(Vec::new());
        traverse(&mut program, &mut visitor);
        assert_eq!(visitor.0, vec![false, true, true]);
    }

    #[test]
    fn test_kind_hooks_see_only_their_kind() {
        struct Templates(usize);
        impl Visitor for Templates {
            fn template(&mut self, expr: &mut Expr, path: &Path) -> Option<Expr> {
                assert!(matches!(expr.kind, ExprKind::Template(_)));
                assert_eq!(path.parent(), Some(Ancestor::Stmt));
                self.0 += 1;
                None
            }
        }
        let mut program = parse("`a`; b; tag`c`;");
        let mut visitor = Templates(0);
        traverse(&mut program, &mut visitor);
        assert_eq!(visitor.0, 1);
    }
}
