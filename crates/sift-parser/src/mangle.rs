//! Variable name mangling for minification.
//!
//! Shortens local variable names (`myVariable` → `a`) by:
//! 1. Building a scope tree from the AST and recording every free reference
//! 2. Assigning short names per scope (avoiding names visible from the scope,
//!    free globals and reserved words)
//! 3. Renaming identifiers in-place on the AST
//!
//! Property names, object keys and labels are never mangled. Scopes
//! containing a direct `eval()` call are skipped along with their ancestors.

use crate::ast::*;
use rustc_hash::{FxHashMap, FxHashSet};

/// Options for name mangling.
#[derive(Debug, Clone, Default)]
pub struct MangleOptions {
    /// User-specified names to never rename.
    pub reserved: FxHashSet<String>,
    /// Whether to mangle program-level (top-level) bindings.
    pub top_level: bool,
}

/// Mangle variable names in `program` in-place.
pub fn mangle(program: &mut Program, options: &MangleOptions) {
    let mut ctx = MangleContext::new(options);

    ctx.collect_stmts(&program.body, ROOT_SCOPE);
    ctx.resolve_globals();
    ctx.assign_names();

    let renamed: usize = ctx.scopes.iter().map(|s| s.renames.len()).sum();
    tracing::debug!(scopes = ctx.scopes.len(), renamed, globals = ctx.globals.len(), "mangled names");

    Renamer::new(&ctx).rename_stmts(&mut program.body);
}

// =============================================================================
// Scope Tree
// =============================================================================

type ScopeId = usize;

const ROOT_SCOPE: ScopeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Program,
    Function,
    Block,
    Catch,
}

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    kind: ScopeKind,
    /// Original binding names declared in this scope, in declaration order.
    bindings: Vec<String>,
    /// Original name → mangled name (filled in by `assign_names`).
    renames: FxHashMap<String, String>,
    /// Skip renaming in this scope (direct `eval` somewhere below).
    has_eval: bool,
    children: Vec<ScopeId>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            parent,
            kind,
            bindings: Vec::new(),
            renames: FxHashMap::default(),
            has_eval: false,
            children: Vec::new(),
        }
    }

    fn declares(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| b == name)
    }
}

struct MangleContext<'a> {
    options: &'a MangleOptions,
    scopes: Vec<Scope>,
    /// Identifier references and the scope they appear in.
    references: Vec<(String, ScopeId)>,
    /// Referenced names no scope declares.
    globals: FxHashSet<String>,
}

impl<'a> MangleContext<'a> {
    fn new(options: &'a MangleOptions) -> Self {
        Self {
            options,
            scopes: vec![Scope::new(ScopeKind::Program, None)],
            references: Vec::new(),
            globals: FxHashSet::default(),
        }
    }

    fn add_scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(kind, Some(parent)));
        self.scopes[parent].children.push(id);
        id
    }

    /// Add a binding to a scope. `var` hoists to the nearest function scope.
    fn add_binding(&mut self, name: &str, var_kind: Option<VarKind>, scope: ScopeId) {
        let target = match var_kind {
            Some(VarKind::Var) => self.hoist_target(scope),
            _ => scope,
        };
        let s = &mut self.scopes[target];
        if !s.declares(name) {
            s.bindings.push(name.to_string());
        }
    }

    fn hoist_target(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        loop {
            let s = &self.scopes[current];
            if matches!(s.kind, ScopeKind::Function | ScopeKind::Program) {
                return current;
            }
            match s.parent {
                Some(p) => current = p,
                None => return current,
            }
        }
    }

    /// Mark a scope and all its ancestors as unsafe to rename.
    fn mark_eval(&mut self, scope: ScopeId) {
        let mut current = Some(scope);
        while let Some(id) = current {
            self.scopes[id].has_eval = true;
            current = self.scopes[id].parent;
        }
    }

    fn add_reference(&mut self, name: &str, scope: ScopeId) {
        self.references.push((name.to_string(), scope));
    }

    /// The scope that declares `name` as seen from `scope`.
    fn declaring_scope(&self, name: &str, scope: ScopeId) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scopes[id].declares(name) {
                return Some(id);
            }
            current = self.scopes[id].parent;
        }
        None
    }

    fn resolve_globals(&mut self) {
        let references = std::mem::take(&mut self.references);
        for (name, scope) in references {
            if self.declaring_scope(&name, scope).is_none() {
                self.globals.insert(name);
            }
        }
    }

    // =========================================================================
    // Phase 1: Collect scopes, bindings and references
    // =========================================================================

    fn collect_stmts(&mut self, stmts: &[Stmt], scope: ScopeId) {
        for stmt in stmts {
            self.collect_stmt(stmt, scope);
        }
    }

    fn collect_declarators(&mut self, kind: VarKind, decls: &[VarDeclarator], scope: ScopeId) {
        for decl in decls {
            self.collect_binding(&decl.binding, Some(kind), scope);
            if let Some(init) = &decl.init {
                self.collect_expr(init, scope);
            }
        }
    }

    fn collect_for_init(&mut self, init: &ForInit, scope: ScopeId) {
        match init {
            ForInit::Var { kind, decls } => self.collect_declarators(*kind, decls, scope),
            ForInit::Expr(e) => self.collect_expr(e, scope),
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt, scope: ScopeId) {
        match &stmt.kind {
            StmtKind::Var { kind, decls } => self.collect_declarators(*kind, decls, scope),
            StmtKind::Function(f) => {
                if let Some(name) = &f.name {
                    self.add_binding(name, None, scope);
                }
                self.collect_function(f, None, scope);
            }
            StmtKind::Class(c) => {
                if let Some(name) = &c.name {
                    self.add_binding(name, None, scope);
                }
                self.collect_class(c, scope);
            }
            StmtKind::Block(stmts) => {
                let block_scope = self.add_scope(ScopeKind::Block, scope);
                self.collect_stmts(stmts, block_scope);
            }
            StmtKind::If { test, consequent, alternate } => {
                self.collect_expr(test, scope);
                self.collect_stmt(consequent, scope);
                if let Some(alt) = alternate {
                    self.collect_stmt(alt, scope);
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.collect_expr(discriminant, scope);
                let switch_scope = self.add_scope(ScopeKind::Block, scope);
                for case in cases {
                    if let Some(test) = &case.test {
                        self.collect_expr(test, switch_scope);
                    }
                    self.collect_stmts(&case.consequent, switch_scope);
                }
            }
            StmtKind::For { init, test, update, body } => {
                let for_scope = self.add_scope(ScopeKind::Block, scope);
                if let Some(init) = init {
                    self.collect_for_init(init, for_scope);
                }
                if let Some(test) = test {
                    self.collect_expr(test, for_scope);
                }
                if let Some(update) = update {
                    self.collect_expr(update, for_scope);
                }
                self.collect_stmt(body, for_scope);
            }
            StmtKind::ForIn { left, right, body } | StmtKind::ForOf { left, right, body, .. } => {
                let for_scope = self.add_scope(ScopeKind::Block, scope);
                self.collect_for_init(left, for_scope);
                self.collect_expr(right, for_scope);
                self.collect_stmt(body, for_scope);
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.collect_stmt(body, scope);
                self.collect_expr(test, scope);
            }
            StmtKind::Return { arg } => {
                if let Some(arg) = arg {
                    self.collect_expr(arg, scope);
                }
            }
            StmtKind::Throw { arg } | StmtKind::Expr(arg) => self.collect_expr(arg, scope),
            StmtKind::Try { block, handler, finalizer } => {
                let try_scope = self.add_scope(ScopeKind::Block, scope);
                self.collect_stmts(block, try_scope);
                if let Some(catch) = handler {
                    let catch_scope = self.add_scope(ScopeKind::Catch, scope);
                    if let Some(param) = &catch.param {
                        self.collect_binding(param, None, catch_scope);
                    }
                    self.collect_stmts(&catch.body, catch_scope);
                }
                if let Some(fin) = finalizer {
                    let fin_scope = self.add_scope(ScopeKind::Block, scope);
                    self.collect_stmts(fin, fin_scope);
                }
            }
            // Labels are not mangled
            StmtKind::Labeled { body, .. } => self.collect_stmt(body, scope),
            StmtKind::Import(import) => {
                for spec in &import.specifiers {
                    self.add_binding(spec.local(), None, scope);
                }
            }
            StmtKind::Export(export) => match export.as_ref() {
                ExportDecl::Default { expr, .. } => self.collect_expr(expr, scope),
                ExportDecl::Decl { decl, .. } => self.collect_stmt(decl, scope),
                ExportDecl::Named { specifiers, source: None, .. } => {
                    for spec in specifiers {
                        self.add_reference(&spec.local, scope);
                    }
                }
                ExportDecl::Named { .. } | ExportDecl::All { .. } => {}
            },
            StmtKind::Empty | StmtKind::Debugger | StmtKind::Break { .. } | StmtKind::Continue { .. } => {}
        }
    }

    /// Parameters and body in a new function scope. A function expression's
    /// own name is visible only inside it.
    fn collect_function(&mut self, f: &Function, own_name: Option<&str>, parent_scope: ScopeId) {
        let fn_scope = self.add_scope(ScopeKind::Function, parent_scope);
        if let Some(name) = own_name {
            self.add_binding(name, None, fn_scope);
        }
        self.collect_params(&f.params, fn_scope);
        self.collect_stmts(&f.body, fn_scope);
    }

    fn collect_params(&mut self, params: &[Param], fn_scope: ScopeId) {
        for param in params {
            self.collect_binding(&param.binding, None, fn_scope);
            if let Some(default) = &param.default {
                self.collect_expr(default, fn_scope);
            }
        }
    }

    fn collect_class(&mut self, c: &Class, parent_scope: ScopeId) {
        if let Some(super_class) = &c.super_class {
            self.collect_expr(super_class, parent_scope);
        }
        for member in &c.body {
            match &member.kind {
                ClassMemberKind::Method { key, value, .. } => {
                    self.collect_property_key(key, parent_scope);
                    self.collect_function(value, None, parent_scope);
                }
                ClassMemberKind::Property { key, value, .. } => {
                    self.collect_property_key(key, parent_scope);
                    if let Some(v) = value {
                        self.collect_expr(v, parent_scope);
                    }
                }
                ClassMemberKind::StaticBlock(stmts) => {
                    let block_scope = self.add_scope(ScopeKind::Function, parent_scope);
                    self.collect_stmts(stmts, block_scope);
                }
                ClassMemberKind::Empty => {}
            }
        }
    }

    fn collect_arrow(&mut self, arrow: &ArrowFunction, parent_scope: ScopeId) {
        let fn_scope = self.add_scope(ScopeKind::Function, parent_scope);
        self.collect_params(&arrow.params, fn_scope);
        match &arrow.body {
            ArrowBody::Expr(e) => self.collect_expr(e, fn_scope),
            ArrowBody::Block(stmts) => self.collect_stmts(stmts, fn_scope),
        }
    }

    fn collect_property_key(&mut self, key: &PropertyKey, scope: ScopeId) {
        if let PropertyKey::Computed(e) = key {
            self.collect_expr(e, scope);
        }
    }

    fn collect_binding(&mut self, binding: &Binding, var_kind: Option<VarKind>, scope: ScopeId) {
        match &binding.kind {
            BindingKind::Ident { name } => self.add_binding(name, var_kind, scope),
            BindingKind::Array { elements } => {
                for elem in elements.iter().flatten() {
                    self.collect_binding(&elem.binding, var_kind, scope);
                    if let Some(default) = &elem.default {
                        self.collect_expr(default, scope);
                    }
                }
            }
            BindingKind::Object { properties } => {
                for prop in properties {
                    self.collect_property_key(&prop.key, scope);
                    self.collect_binding(&prop.value, var_kind, scope);
                    if let Some(default) = &prop.default {
                        self.collect_expr(default, scope);
                    }
                }
            }
        }
    }

    fn collect_exprs(&mut self, exprs: &[Expr], scope: ScopeId) {
        for e in exprs {
            self.collect_expr(e, scope);
        }
    }

    fn collect_expr(&mut self, expr: &Expr, scope: ScopeId) {
        match &expr.kind {
            ExprKind::Ident(name) => self.add_reference(name, scope),
            ExprKind::Function(f) => self.collect_function(f, f.name.as_deref(), scope),
            ExprKind::Arrow(arrow) => self.collect_arrow(arrow, scope),
            ExprKind::Class(c) => self.collect_class(c, scope),
            ExprKind::Call { callee, args } => {
                if callee.as_ident() == Some("eval") {
                    self.mark_eval(scope);
                }
                self.collect_expr(callee, scope);
                self.collect_exprs(args, scope);
            }
            ExprKind::OptionalCall { callee, args } | ExprKind::New { callee, args } => {
                self.collect_expr(callee, scope);
                self.collect_exprs(args, scope);
            }
            ExprKind::Array(elems) => {
                for elem in elems.iter().flatten() {
                    self.collect_expr(elem, scope);
                }
            }
            ExprKind::Object(props) => {
                for prop in props {
                    self.collect_property_key(&prop.key, scope);
                    self.collect_expr(&prop.value, scope);
                }
            }
            ExprKind::Unary { arg, .. }
            | ExprKind::Update { arg, .. }
            | ExprKind::Spread(arg)
            | ExprKind::Await(arg)
            | ExprKind::Import(arg)
            | ExprKind::Chain(arg) => self.collect_expr(arg, scope),
            ExprKind::Binary { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::Assign { left, right, .. } => {
                self.collect_expr(left, scope);
                self.collect_expr(right, scope);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.collect_expr(test, scope);
                self.collect_expr(consequent, scope);
                self.collect_expr(alternate, scope);
            }
            ExprKind::Sequence(exprs) => self.collect_exprs(exprs, scope),
            ExprKind::Member { object, property, computed }
            | ExprKind::OptionalMember { object, property, computed } => {
                self.collect_expr(object, scope);
                if *computed {
                    self.collect_expr(property, scope);
                }
            }
            ExprKind::TaggedTemplate { tag, quasi } => {
                self.collect_expr(tag, scope);
                self.collect_exprs(&quasi.exprs, scope);
            }
            ExprKind::Template(template) => self.collect_exprs(&template.exprs, scope),
            ExprKind::Yield { arg, .. } => {
                if let Some(arg) = arg {
                    self.collect_expr(arg, scope);
                }
            }
            ExprKind::JsxElement(el) => {
                if let Some(name) = component_reference(&el.name) {
                    self.add_reference(name, scope);
                }
                for attr in &el.attributes {
                    match attr {
                        JsxAttribute::Attribute { value: Some(value), .. } => self.collect_expr(value, scope),
                        JsxAttribute::Spread { argument, .. } => self.collect_expr(argument, scope),
                        JsxAttribute::Attribute { value: None, .. } => {}
                    }
                }
                self.collect_exprs(&el.children, scope);
            }
            ExprKind::JsxFragment(frag) => self.collect_exprs(&frag.children, scope),
            ExprKind::JsxExprContainer(Some(inner)) => self.collect_expr(inner, scope),
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::BigInt(_)
            | ExprKind::String(_)
            | ExprKind::Regex { .. }
            | ExprKind::PrivateName(_)
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::MetaProperty { .. }
            | ExprKind::JsxText(_)
            | ExprKind::JsxExprContainer(None) => {}
        }
    }

    // =========================================================================
    // Phase 2: Assign short names
    // =========================================================================

    fn assign_names(&mut self) {
        // Scope ids are allocated parent-first, so ancestors are assigned first
        for id in 0..self.scopes.len() {
            self.assign_scope_names(id);
        }
    }

    fn assign_scope_names(&mut self, scope_id: ScopeId) {
        if scope_id == ROOT_SCOPE && !self.options.top_level {
            return;
        }
        if self.scopes[scope_id].has_eval {
            return;
        }

        let used_names = self.collect_ancestor_names(scope_id);
        let bindings = self.scopes[scope_id].bindings.clone();
        let mut gen = NameGenerator::new();

        for name in &bindings {
            if self.options.reserved.contains(name) {
                continue;
            }
            loop {
                let candidate = gen.next();
                if !used_names.contains(&candidate)
                    && !self.globals.contains(&candidate)
                    && !is_js_reserved(&candidate)
                    && !self.options.reserved.contains(&candidate)
                    && !self.scope_has_binding_named(scope_id, &candidate, name)
                {
                    self.scopes[scope_id].renames.insert(name.clone(), candidate);
                    break;
                }
            }
        }
    }

    /// Whether another binding of this scope is originally called `candidate`.
    fn scope_has_binding_named(&self, scope_id: ScopeId, candidate: &str, excluding: &str) -> bool {
        self.scopes[scope_id].bindings.iter().any(|b| b != excluding && b == candidate)
    }

    /// Every name visible from ancestor scopes after renaming.
    fn collect_ancestor_names(&self, scope_id: ScopeId) -> FxHashSet<String> {
        let mut names = FxHashSet::default();
        let mut current = self.scopes[scope_id].parent;
        while let Some(id) = current {
            let scope = &self.scopes[id];
            names.extend(scope.renames.values().cloned());
            names.extend(scope.bindings.iter().filter(|b| !scope.renames.contains_key(*b)).cloned());
            current = scope.parent;
        }
        names
    }

    /// The mangled name for `original` as seen from `scope_id`, or `None`
    /// when it keeps its name.
    fn resolve_name(&self, original: &str, scope_id: ScopeId) -> Option<&str> {
        let declaring = self.declaring_scope(original, scope_id)?;
        self.scopes[declaring].renames.get(original).map(String::as_str)
    }
}

/// The binding a JSX tag refers to: `Foo` in `<Foo>` or `<Foo.Bar>`.
/// Lowercase tags are intrinsic elements.
fn component_reference(name: &JsxElementName) -> Option<&str> {
    let first = match name {
        JsxElementName::Ident(name) => name.as_str(),
        JsxElementName::Member(parts) => parts.first()?.as_str(),
        JsxElementName::Namespaced { .. } => return None,
    };
    (!first.starts_with(|c: char| c.is_ascii_lowercase()) && !first.contains('-')).then_some(first)
}

// =============================================================================
// Name Generator
// =============================================================================

/// Generates short identifier names: a, b, ..., z, A, ..., Z, _, $, aa, ba, ...
struct NameGenerator {
    counter: usize,
}

/// Characters used for the first position of generated names.
const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$";

/// Characters used for subsequent positions (includes digits).
const REST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_$";

impl NameGenerator {
    fn new() -> Self {
        Self { counter: 0 }
    }

    fn next(&mut self) -> String {
        let name = encode_name(self.counter);
        self.counter += 1;
        name
    }
}

fn encode_name(mut n: usize) -> String {
    let first_idx = n % FIRST_CHARS.len();
    n /= FIRST_CHARS.len();

    let mut name = String::with_capacity(4);
    name.push(FIRST_CHARS[first_idx] as char);
    while n > 0 {
        n -= 1;
        name.push(REST_CHARS[n % REST_CHARS.len()] as char);
        n /= REST_CHARS.len();
    }
    name
}

fn is_js_reserved(name: &str) -> bool {
    matches!(
        name,
        "do" | "if" | "in" | "for" | "let" | "new" | "try" | "var" | "case" | "else" | "enum"
            | "eval" | "null" | "this" | "true" | "void" | "with" | "await" | "break"
            | "catch" | "class" | "const" | "false" | "super" | "throw" | "while" | "yield"
            | "delete" | "export" | "import" | "return" | "switch" | "typeof"
            | "default" | "extends" | "finally" | "continue" | "debugger" | "function"
            | "arguments" | "instanceof" | "of" | "static" | "async" | "get" | "set"
            | "undefined" | "NaN" | "Infinity"
    )
}

// =============================================================================
// Phase 3: Rename AST in-place
// =============================================================================

/// Walks the AST in the same order as the collect phase, entering the same
/// scopes, and rewrites every binding and reference.
struct Renamer<'a> {
    ctx: &'a MangleContext<'a>,
    scope_stack: Vec<ScopeId>,
    /// Next child scope to enter, per entry of `scope_stack`.
    child_counters: Vec<usize>,
}

impl<'a> Renamer<'a> {
    fn new(ctx: &'a MangleContext<'a>) -> Self {
        Self {
            ctx,
            scope_stack: vec![ROOT_SCOPE],
            child_counters: vec![0],
        }
    }

    fn current_scope(&self) -> ScopeId {
        self.scope_stack.last().copied().unwrap_or(ROOT_SCOPE)
    }

    fn enter_scope(&mut self) {
        let parent = self.current_scope();
        let Some(counter) = self.child_counters.last_mut() else {
            return;
        };
        let child = self.ctx.scopes[parent].children.get(*counter).copied();
        debug_assert!(child.is_some(), "rename walk diverged from collect walk");
        *counter += 1;
        self.scope_stack.push(child.unwrap_or(parent));
        self.child_counters.push(0);
    }

    fn leave_scope(&mut self) {
        self.scope_stack.pop();
        self.child_counters.pop();
    }

    fn rename_ident(&self, name: &mut String) {
        if let Some(mangled) = self.ctx.resolve_name(name, self.current_scope()) {
            *name = mangled.to_string();
        }
    }

    fn rename_stmts(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.rename_stmt(stmt);
        }
    }

    fn rename_declarators(&mut self, decls: &mut [VarDeclarator]) {
        for decl in decls {
            self.rename_binding(&mut decl.binding);
            if let Some(init) = &mut decl.init {
                self.rename_expr(init);
            }
        }
    }

    fn rename_for_init(&mut self, init: &mut ForInit) {
        match init {
            ForInit::Var { decls, .. } => self.rename_declarators(decls),
            ForInit::Expr(e) => self.rename_expr(e),
        }
    }

    fn rename_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Var { decls, .. } => self.rename_declarators(decls),
            StmtKind::Function(f) => {
                if let Some(name) = &mut f.name {
                    self.rename_ident(name);
                }
                self.rename_function(f, false);
            }
            StmtKind::Class(c) => {
                if let Some(name) = &mut c.name {
                    self.rename_ident(name);
                }
                self.rename_class(c);
            }
            StmtKind::Block(stmts) => {
                self.enter_scope();
                self.rename_stmts(stmts);
                self.leave_scope();
            }
            StmtKind::If { test, consequent, alternate } => {
                self.rename_expr(test);
                self.rename_stmt(consequent);
                if let Some(alt) = alternate {
                    self.rename_stmt(alt);
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.rename_expr(discriminant);
                self.enter_scope();
                for case in cases {
                    if let Some(test) = &mut case.test {
                        self.rename_expr(test);
                    }
                    self.rename_stmts(&mut case.consequent);
                }
                self.leave_scope();
            }
            StmtKind::For { init, test, update, body } => {
                self.enter_scope();
                if let Some(init) = init {
                    self.rename_for_init(init);
                }
                if let Some(test) = test {
                    self.rename_expr(test);
                }
                if let Some(update) = update {
                    self.rename_expr(update);
                }
                self.rename_stmt(body);
                self.leave_scope();
            }
            StmtKind::ForIn { left, right, body } | StmtKind::ForOf { left, right, body, .. } => {
                self.enter_scope();
                self.rename_for_init(left);
                self.rename_expr(right);
                self.rename_stmt(body);
                self.leave_scope();
            }
            StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
                self.rename_stmt(body);
                self.rename_expr(test);
            }
            StmtKind::Return { arg } => {
                if let Some(arg) = arg {
                    self.rename_expr(arg);
                }
            }
            StmtKind::Throw { arg } | StmtKind::Expr(arg) => self.rename_expr(arg),
            StmtKind::Try { block, handler, finalizer } => {
                self.enter_scope();
                self.rename_stmts(block);
                self.leave_scope();
                if let Some(catch) = handler {
                    self.enter_scope();
                    if let Some(param) = &mut catch.param {
                        self.rename_binding(param);
                    }
                    self.rename_stmts(&mut catch.body);
                    self.leave_scope();
                }
                if let Some(fin) = finalizer {
                    self.enter_scope();
                    self.rename_stmts(fin);
                    self.leave_scope();
                }
            }
            StmtKind::Labeled { body, .. } => self.rename_stmt(body),
            StmtKind::Import(import) => {
                for spec in &mut import.specifiers {
                    match spec {
                        ImportSpecifier::Default { local, .. } | ImportSpecifier::Namespace { local, .. } => {
                            self.rename_ident(local);
                        }
                        // `imported` is the other module's name for it
                        ImportSpecifier::Named { local, .. } => self.rename_ident(local),
                    }
                }
            }
            StmtKind::Export(export) => match export.as_mut() {
                ExportDecl::Default { expr, .. } => self.rename_expr(expr),
                ExportDecl::Decl { decl, .. } => self.rename_stmt(decl),
                ExportDecl::Named { specifiers, source: None, .. } => {
                    // `exported` is the public name and stays
                    for spec in specifiers {
                        self.rename_ident(&mut spec.local);
                    }
                }
                ExportDecl::Named { .. } | ExportDecl::All { .. } => {}
            },
            StmtKind::Empty | StmtKind::Debugger | StmtKind::Break { .. } | StmtKind::Continue { .. } => {}
        }
    }

    fn rename_function(&mut self, f: &mut Function, own_name: bool) {
        self.enter_scope();
        if own_name {
            if let Some(name) = &mut f.name {
                self.rename_ident(name);
            }
        }
        self.rename_params(&mut f.params);
        self.rename_stmts(&mut f.body);
        self.leave_scope();
    }

    fn rename_params(&mut self, params: &mut [Param]) {
        for param in params {
            self.rename_binding(&mut param.binding);
            if let Some(default) = &mut param.default {
                self.rename_expr(default);
            }
        }
    }

    fn rename_class(&mut self, c: &mut Class) {
        if let Some(super_class) = &mut c.super_class {
            self.rename_expr(super_class);
        }
        for member in &mut c.body {
            match &mut member.kind {
                ClassMemberKind::Method { key, value, .. } => {
                    self.rename_property_key(key);
                    self.rename_function(value, false);
                }
                ClassMemberKind::Property { key, value, .. } => {
                    self.rename_property_key(key);
                    if let Some(v) = value {
                        self.rename_expr(v);
                    }
                }
                ClassMemberKind::StaticBlock(stmts) => {
                    self.enter_scope();
                    self.rename_stmts(stmts);
                    self.leave_scope();
                }
                ClassMemberKind::Empty => {}
            }
        }
    }

    fn rename_arrow(&mut self, arrow: &mut ArrowFunction) {
        self.enter_scope();
        self.rename_params(&mut arrow.params);
        match &mut arrow.body {
            ArrowBody::Expr(e) => self.rename_expr(e),
            ArrowBody::Block(stmts) => self.rename_stmts(stmts),
        }
        self.leave_scope();
    }

    fn rename_property_key(&mut self, key: &mut PropertyKey) {
        if let PropertyKey::Computed(e) = key {
            self.rename_expr(e);
        }
    }

    /// Keys stay; codegen drops the shorthand form once a value is renamed.
    fn rename_binding(&mut self, binding: &mut Binding) {
        match &mut binding.kind {
            BindingKind::Ident { name } => self.rename_ident(name),
            BindingKind::Array { elements } => {
                for elem in elements.iter_mut().flatten() {
                    self.rename_binding(&mut elem.binding);
                    if let Some(default) = &mut elem.default {
                        self.rename_expr(default);
                    }
                }
            }
            BindingKind::Object { properties } => {
                for prop in properties {
                    self.rename_property_key(&mut prop.key);
                    self.rename_binding(&mut prop.value);
                    if let Some(default) = &mut prop.default {
                        self.rename_expr(default);
                    }
                }
            }
        }
    }

    fn rename_exprs(&mut self, exprs: &mut [Expr]) {
        for e in exprs {
            self.rename_expr(e);
        }
    }

    fn rename_expr(&mut self, expr: &mut Expr) {
        match &mut expr.kind {
            ExprKind::Ident(name) => self.rename_ident(name),
            ExprKind::Function(f) => self.rename_function(f, true),
            ExprKind::Arrow(arrow) => self.rename_arrow(arrow),
            ExprKind::Class(c) => self.rename_class(c),
            ExprKind::Array(elems) => {
                for elem in elems.iter_mut().flatten() {
                    self.rename_expr(elem);
                }
            }
            ExprKind::Object(props) => {
                for prop in props {
                    self.rename_property_key(&mut prop.key);
                    self.rename_expr(&mut prop.value);
                }
            }
            ExprKind::Call { callee, args }
            | ExprKind::OptionalCall { callee, args }
            | ExprKind::New { callee, args } => {
                self.rename_expr(callee);
                self.rename_exprs(args);
            }
            ExprKind::Unary { arg, .. }
            | ExprKind::Update { arg, .. }
            | ExprKind::Spread(arg)
            | ExprKind::Await(arg)
            | ExprKind::Import(arg)
            | ExprKind::Chain(arg) => self.rename_expr(arg),
            ExprKind::Binary { left, right, .. }
            | ExprKind::Logical { left, right, .. }
            | ExprKind::Assign { left, right, .. } => {
                self.rename_expr(left);
                self.rename_expr(right);
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.rename_expr(test);
                self.rename_expr(consequent);
                self.rename_expr(alternate);
            }
            ExprKind::Sequence(exprs) => self.rename_exprs(exprs),
            // `obj.foo` keeps `foo`
            ExprKind::Member { object, property, computed }
            | ExprKind::OptionalMember { object, property, computed } => {
                self.rename_expr(object);
                if *computed {
                    self.rename_expr(property);
                }
            }
            ExprKind::TaggedTemplate { tag, quasi } => {
                self.rename_expr(tag);
                self.rename_exprs(&mut quasi.exprs);
            }
            ExprKind::Template(template) => self.rename_exprs(&mut template.exprs),
            ExprKind::Yield { arg, .. } => {
                if let Some(arg) = arg {
                    self.rename_expr(arg);
                }
            }
            ExprKind::JsxElement(el) => self.rename_jsx_element(el),
            ExprKind::JsxFragment(frag) => self.rename_exprs(&mut frag.children),
            ExprKind::JsxExprContainer(Some(inner)) => self.rename_expr(inner),
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Number(_)
            | ExprKind::BigInt(_)
            | ExprKind::String(_)
            | ExprKind::Regex { .. }
            | ExprKind::PrivateName(_)
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::MetaProperty { .. }
            | ExprKind::JsxText(_)
            | ExprKind::JsxExprContainer(None) => {}
        }
    }

    fn rename_jsx_element(&mut self, el: &mut JsxElement) {
        if component_reference(&el.name).is_some() {
            match &mut el.name {
                JsxElementName::Ident(name) => self.rename_ident(name),
                JsxElementName::Member(parts) => {
                    if let Some(first) = parts.first_mut() {
                        self.rename_ident(first);
                    }
                }
                JsxElementName::Namespaced { .. } => {}
            }
        }
        for attr in &mut el.attributes {
            match attr {
                JsxAttribute::Attribute { value: Some(value), .. } => self.rename_expr(value),
                JsxAttribute::Spread { argument, .. } => self.rename_expr(argument),
                JsxAttribute::Attribute { value: None, .. } => {}
            }
        }
        self.rename_exprs(&mut el.children);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{generate, CodegenOptions};
    use crate::parser::{Parser, ParserOptions};

    fn parse_and_mangle(source: &str, opts: &MangleOptions) -> String {
        let mut program = Parser::new(source, ParserOptions::default().with_jsx(true)).parse().unwrap();
        mangle(&mut program, opts);
        generate(&program, &CodegenOptions::minify())
    }

    fn parse_and_mangle_top(source: &str) -> String {
        let opts = MangleOptions { top_level: true, ..Default::default() };
        parse_and_mangle(source, &opts)
    }

    fn parse_and_mangle_local(source: &str) -> String {
        parse_and_mangle(source, &MangleOptions::default())
    }

    #[test]
    fn test_basic_variable_renaming() {
        let result = parse_and_mangle_top("let myVariable = 1; console.log(myVariable);");
        assert_eq!(result, "let a=1;console.log(a);");
    }

    #[test]
    fn test_function_params() {
        let result = parse_and_mangle_local("function foo(longParam, anotherParam) { return longParam + anotherParam; }");
        assert_eq!(result, "function foo(a,b){return a+b}");
    }

    #[test]
    fn test_sibling_scopes_reuse_names() {
        let result = parse_and_mangle_local("function f(x) { return x; } function g(y) { return y; }");
        assert_eq!(result, "function f(a){return a}function g(a){return a}");
    }

    #[test]
    fn test_var_hoisting() {
        let result = parse_and_mangle_local("function f() { if (c) { var hoisted = 1; } return hoisted; }");
        assert_eq!(result, "function f(){if(c){var a=1}return a}");
    }

    #[test]
    fn test_free_globals_never_shadowed() {
        let result = parse_and_mangle_local("function f(x) { return a + x; }");
        assert_eq!(result, "function f(b){return a+b}");
    }

    #[test]
    fn test_property_names_preserved() {
        let result = parse_and_mangle_local("function f(value) { return { value, other: value.value }; }");
        assert_eq!(result, "function f(a){return{value:a,other:a.value}}");
    }

    #[test]
    fn test_eval_bailout() {
        let result = parse_and_mangle_local("function f(secret) { eval('secret'); return secret; }");
        assert!(result.contains("secret"));
    }

    #[test]
    fn test_arrow_function_params() {
        let result = parse_and_mangle_local("const g = (first, second) => first * second;");
        assert_eq!(result, "const g=(a,b)=>a*b;");
    }

    #[test]
    fn test_catch_clause() {
        let result = parse_and_mangle_local("try { run(); } catch (error) { log(error); }");
        assert_eq!(result, "try{run()}catch(a){log(a)}");
    }

    #[test]
    fn test_for_loop_variable() {
        let result = parse_and_mangle_local("function f() { for (let index = 0; index < n; index++) g(index); }");
        assert_eq!(result, "function f(){for(let a=0;a<n;a++)g(a)}");
    }

    #[test]
    fn test_for_in_avoids_outer_names() {
        let result = parse_and_mangle_local("function f(o) { for (const key in o) g(key); }");
        assert_eq!(result, "function f(a){for(const b in a)g(b)}");
    }

    #[test]
    fn test_reserved_names_not_mangled() {
        let mut reserved = FxHashSet::default();
        reserved.insert("keepThis".to_string());
        let opts = MangleOptions { reserved, top_level: false };
        let result = parse_and_mangle("function f(keepThis, other) { return keepThis + other; }", &opts);
        assert_eq!(result, "function f(keepThis,a){return keepThis+a}");
    }

    #[test]
    fn test_labels_not_mangled() {
        let result = parse_and_mangle_local("function f() { outer: for (;;) { break outer; } }");
        assert_eq!(result, "function f(){outer:for(;;){break outer}}");
    }

    #[test]
    fn test_name_generator_sequence() {
        let mut gen = NameGenerator::new();
        assert_eq!(gen.next(), "a");
        assert_eq!(gen.next(), "b");
        assert_eq!(encode_name(26), "A");
        assert_eq!(encode_name(52), "_");
        assert_eq!(encode_name(53), "$");
        assert_eq!(encode_name(54), "aa");
        assert_eq!(encode_name(55), "ba");
    }

    #[test]
    fn test_reserved_words_skipped() {
        assert!(is_js_reserved("do"));
        assert!(is_js_reserved("in"));
        assert!(!is_js_reserved("a"));

        let params: Vec<String> = (0..900).map(|i| format!("p{i}")).collect();
        let source = format!("function f({}) {{}}", params.join(", "));
        let result = parse_and_mangle_local(&source);
        assert!(!result.contains(",do,") && !result.contains(",in,"), "{result}");
    }

    #[test]
    fn test_top_level_false_preserves_program_names() {
        let result = parse_and_mangle_local("let longName = 1; function helper(arg) { return longName + arg; }");
        assert_eq!(result, "let longName=1;function helper(a){return longName+a}");
    }

    #[test]
    fn test_function_expression_name() {
        let result = parse_and_mangle_local("x = function inner(n) { return inner(n - 1); };");
        assert_eq!(result, "x=function a(b){return a(b-1)};");
    }

    #[test]
    fn test_destructuring_keys_kept() {
        let result = parse_and_mangle_local("function f({ x, y: z }) { return x + z; }");
        assert_eq!(result, "function f({x:a,y:b}){return a+b}");
    }

    #[test]
    fn test_computed_key_destructuring() {
        let result = parse_and_mangle_local("function f(k, { [k]: v }) { return v; }");
        assert_eq!(result, "function f(a,{[a]:b}){return b}");
    }

    #[test]
    fn test_jsx_component_reference_renamed() {
        let result = parse_and_mangle_local("function f(Comp) { return <Comp><div/></Comp>; }");
        assert_eq!(result, "function f(a){return<a><div/></a>}");
    }

    #[test]
    fn test_bundle_wrapper_pattern() {
        let result = parse_and_mangle_local(
            "(function () { var longName = 1; function helper(p) { return longName + p; } })();",
        );
        assert_eq!(result, "(function(){var a=1;function b(c){return a+c}}());");
    }
}
