//! JavaScript code generator.
//!
//! Converts an AST back to JavaScript source code, either formatted (one
//! statement per line, indented) or minified (no optional whitespace).
//! Parentheses come from operator precedence, never from the source.

use crate::ast::*;

/// Code generation options.
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Human-readable spacing and indentation. `false` minifies.
    pub format: bool,
    /// Indent string for formatted output.
    pub indent: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            format: true,
            indent: "  ".to_string(),
        }
    }
}

impl CodegenOptions {
    /// Options for the most compact output.
    pub fn minify() -> Self {
        Self {
            format: false,
            ..Self::default()
        }
    }
}

/// Generate source text for `program`.
pub fn generate(program: &Program, options: &CodegenOptions) -> String {
    Codegen::new(program, options).generate()
}

// Precedence levels, loosest first.
const SEQUENCE: u8 = 1;
const ASSIGN: u8 = 2;
const CONDITIONAL: u8 = 3;
const UNARY: u8 = 15;
const UPDATE: u8 = 16;
const CALL: u8 = 17;
const MEMBER: u8 = 18;
const PRIMARY: u8 = 19;

/// The code generator.
pub struct Codegen<'a> {
    program: &'a Program,
    options: &'a CodegenOptions,
    output: String,
    indent_level: usize,
    /// Minified mode holds back `;` so none is written right before `}`.
    needs_semicolon: bool,
    /// Inside a classic `for` head, where `in` must be parenthesised.
    no_in: bool,
}

impl<'a> Codegen<'a> {
    pub fn new(program: &'a Program, options: &'a CodegenOptions) -> Self {
        Self {
            program,
            options,
            output: String::new(),
            indent_level: 0,
            needs_semicolon: false,
            no_in: false,
        }
    }

    /// Generate JavaScript source code.
    pub fn generate(mut self) -> String {
        for stmt in &self.program.body {
            self.emit_stmt(stmt);
            if self.options.format {
                self.emit_newline();
            }
        }
        if self.needs_semicolon {
            self.output.push(';');
        }
        self.output
    }

    // =========================================================================
    // Output Helpers
    // =========================================================================

    /// Append a token, separating it from the previous one when gluing them
    /// together would read differently.
    fn emit(&mut self, s: &str) {
        if self.needs_semicolon {
            self.output.push(';');
            self.needs_semicolon = false;
        }
        if let (Some(last), Some(first)) = (self.output.chars().last(), s.chars().next()) {
            if needs_separation(last, first, s) {
                self.output.push(' ');
            }
        }
        self.output.push_str(s);
    }

    fn emit_space(&mut self) {
        if self.options.format {
            self.output.push(' ');
        }
    }

    fn emit_newline(&mut self) {
        if self.options.format {
            self.output.push('\n');
            for _ in 0..self.indent_level {
                self.output.push_str(&self.options.indent);
            }
        }
    }

    fn emit_semicolon(&mut self) {
        if self.options.format {
            self.output.push(';');
        } else {
            self.needs_semicolon = true;
        }
    }

    fn emit_comma(&mut self) {
        self.emit(",");
        self.emit_space();
    }

    /// ` = `, `=`
    fn emit_equals(&mut self) {
        self.emit_space();
        self.emit("=");
        self.emit_space();
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    // =========================================================================
    // Statement Emission
    // =========================================================================

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var { kind, decls } => {
                self.emit_declarators(*kind, decls);
                self.emit_semicolon();
            }
            StmtKind::Function(func) => self.emit_function(func, true),
            StmtKind::Class(class) => self.emit_class(class),
            StmtKind::Block(stmts) => self.emit_block(stmts),
            StmtKind::If { test, consequent, alternate } => {
                self.emit("if");
                self.emit_space();
                self.emit_paren_expr(test);
                self.emit_space();
                match alternate {
                    Some(alt) => {
                        // `else` would bind to an inner `if` left open
                        if ends_with_open_if(consequent) {
                            self.emit_block(std::slice::from_ref(consequent.as_ref()));
                        } else {
                            self.emit_stmt(consequent);
                        }
                        if self.options.format {
                            if matches!(consequent.kind, StmtKind::Block(_)) {
                                self.emit_space();
                            } else {
                                self.emit_newline();
                            }
                        }
                        self.emit("else");
                        self.emit_space();
                        self.emit_stmt(alt);
                    }
                    None => self.emit_stmt(consequent),
                }
            }
            StmtKind::Switch { discriminant, cases } => {
                self.emit("switch");
                self.emit_space();
                self.emit_paren_expr(discriminant);
                self.emit_space();
                self.emit("{");
                self.indent();
                for case in cases {
                    self.emit_newline();
                    if let Some(test) = &case.test {
                        self.emit("case");
                        self.emit_space();
                        self.emit_expr(test);
                        self.emit(":");
                    } else {
                        self.emit("default:");
                    }
                    self.indent();
                    for stmt in &case.consequent {
                        self.emit_newline();
                        self.emit_stmt(stmt);
                    }
                    self.dedent();
                }
                self.dedent();
                self.emit_newline();
                self.close_brace();
            }
            StmtKind::For { init, test, update, body } => {
                self.emit("for");
                self.emit_space();
                self.emit("(");
                if let Some(init) = init {
                    let saved = std::mem::replace(&mut self.no_in, true);
                    self.emit_for_init(init, 0);
                    self.no_in = saved;
                }
                self.emit(";");
                if let Some(test) = test {
                    self.emit_space();
                    self.emit_expr(test);
                }
                self.emit(";");
                if let Some(update) = update {
                    self.emit_space();
                    self.emit_expr(update);
                }
                self.emit(")");
                self.emit_loop_body(body);
            }
            StmtKind::ForIn { left, right, body } => {
                self.emit("for");
                self.emit_space();
                self.emit("(");
                self.emit_for_init(left, CALL);
                self.emit("in");
                self.emit_expr(right);
                self.emit(")");
                self.emit_loop_body(body);
            }
            StmtKind::ForOf { left, right, body, is_await } => {
                self.emit("for");
                if *is_await {
                    self.emit("await");
                }
                self.emit_space();
                self.emit("(");
                self.emit_for_init(left, CALL);
                self.emit("of");
                self.emit_expr_prec(right, ASSIGN);
                self.emit(")");
                self.emit_loop_body(body);
            }
            StmtKind::While { test, body } => {
                self.emit("while");
                self.emit_space();
                self.emit_paren_expr(test);
                self.emit_loop_body(body);
            }
            StmtKind::DoWhile { body, test } => {
                self.emit("do");
                self.emit_space();
                self.emit_stmt(body);
                self.emit_space();
                self.emit("while");
                self.emit_space();
                self.emit_paren_expr(test);
                self.emit_semicolon();
            }
            StmtKind::Break { label } => {
                self.emit("break");
                if let Some(label) = label {
                    self.emit(label);
                }
                self.emit_semicolon();
            }
            StmtKind::Continue { label } => {
                self.emit("continue");
                if let Some(label) = label {
                    self.emit(label);
                }
                self.emit_semicolon();
            }
            StmtKind::Return { arg } => {
                self.emit("return");
                if let Some(arg) = arg {
                    self.emit_space();
                    self.emit_expr(arg);
                }
                self.emit_semicolon();
            }
            StmtKind::Throw { arg } => {
                self.emit("throw");
                self.emit_space();
                self.emit_expr(arg);
                self.emit_semicolon();
            }
            StmtKind::Try { block, handler, finalizer } => {
                self.emit("try");
                self.emit_space();
                self.emit_block(block);
                if let Some(catch) = handler {
                    self.emit_space();
                    self.emit("catch");
                    if let Some(param) = &catch.param {
                        self.emit_space();
                        self.emit("(");
                        self.emit_binding(param);
                        self.emit(")");
                    }
                    self.emit_space();
                    self.emit_block(&catch.body);
                }
                if let Some(finally) = finalizer {
                    self.emit_space();
                    self.emit("finally");
                    self.emit_space();
                    self.emit_block(finally);
                }
            }
            StmtKind::Labeled { label, body } => {
                self.emit(label);
                self.emit(":");
                self.emit_space();
                self.emit_stmt(body);
            }
            StmtKind::Expr(expr) => {
                if starts_ambiguously(expr) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr(expr);
                }
                self.emit_semicolon();
            }
            StmtKind::Empty => self.emit(";"),
            StmtKind::Debugger => {
                self.emit("debugger");
                self.emit_semicolon();
            }
            StmtKind::Import(decl) => self.emit_import(decl),
            StmtKind::Export(decl) => self.emit_export(decl),
        }
    }

    fn emit_loop_body(&mut self, body: &Stmt) {
        if matches!(body.kind, StmtKind::Empty) {
            self.emit(";");
        } else {
            self.emit_space();
            self.emit_stmt(body);
        }
    }

    fn emit_paren_expr(&mut self, expr: &Expr) {
        self.emit("(");
        self.emit_expr(expr);
        self.emit(")");
    }

    /// `}` with any held-back semicolon dropped.
    fn close_brace(&mut self) {
        self.needs_semicolon = false;
        self.emit("}");
    }

    fn emit_block(&mut self, stmts: &[Stmt]) {
        self.emit("{");
        if !stmts.is_empty() {
            self.indent();
            for stmt in stmts {
                self.emit_newline();
                self.emit_stmt(stmt);
            }
            self.dedent();
            self.emit_newline();
        }
        self.close_brace();
    }

    fn emit_declarators(&mut self, kind: VarKind, decls: &[VarDeclarator]) {
        self.emit(kind.as_str());
        self.emit_space();
        for (i, decl) in decls.iter().enumerate() {
            if i > 0 {
                self.emit_comma();
            }
            self.emit_binding(&decl.binding);
            if let Some(init) = &decl.init {
                self.emit_equals();
                self.emit_expr_prec(init, ASSIGN);
            }
        }
    }

    fn emit_for_init(&mut self, init: &ForInit, min_prec: u8) {
        match init {
            ForInit::Var { kind, decls } => self.emit_declarators(*kind, decls),
            ForInit::Expr(expr) => {
                if starts_with_let_bracket(expr) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr_prec(expr, min_prec);
                }
            }
        }
        // `for (a of b)` / `for (a in b)` need the space in both modes
        if !self.no_in {
            self.output.push(' ');
        }
    }

    fn emit_binding(&mut self, binding: &Binding) {
        match &binding.kind {
            BindingKind::Ident { name } => self.emit(name),
            BindingKind::Array { elements } => {
                self.emit("[");
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    if let Some(elem) = elem {
                        if elem.rest {
                            self.emit("...");
                        }
                        self.emit_binding(&elem.binding);
                        self.emit_default(elem.default.as_ref());
                    }
                }
                // A trailing hole needs its own comma
                if matches!(elements.last(), Some(None)) {
                    self.emit(",");
                }
                self.emit("]");
            }
            BindingKind::Object { properties } => {
                self.emit("{");
                for (i, prop) in properties.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    if prop.rest {
                        self.emit("...");
                        self.emit_binding(&prop.value);
                        continue;
                    }
                    let same_name = matches!(
                        (&prop.key, &prop.value.kind),
                        (PropertyKey::Ident(key), BindingKind::Ident { name }) if key == name
                    );
                    if !same_name {
                        self.emit_property_key(&prop.key);
                        self.emit(":");
                        self.emit_space();
                    }
                    self.emit_binding(&prop.value);
                    self.emit_default(prop.default.as_ref());
                }
                self.emit("}");
            }
        }
    }

    fn emit_default(&mut self, default: Option<&Expr>) {
        if let Some(default) = default {
            self.emit_equals();
            self.emit_expr_prec(default, ASSIGN);
        }
    }

    fn emit_function(&mut self, func: &Function, is_declaration: bool) {
        if func.is_async {
            self.emit("async");
        }
        self.emit("function");
        if func.is_generator {
            self.emit("*");
        }
        if let Some(name) = &func.name {
            if func.is_generator {
                self.emit_space();
            }
            self.emit(name);
        } else if is_declaration {
            self.emit_space();
        }
        self.emit_params(&func.params);
        self.emit_space();
        let saved = std::mem::replace(&mut self.no_in, false);
        self.emit_block(&func.body);
        self.no_in = saved;
    }

    fn emit_arrow(&mut self, arrow: &ArrowFunction) {
        if arrow.is_async {
            self.emit("async");
            self.emit_space();
        }

        // Single identifier parameter can omit parens
        match arrow.params.as_slice() {
            [Param { binding: Binding { kind: BindingKind::Ident { name }, .. }, default: None, rest: false, .. }] => {
                self.emit(name);
            }
            params => self.emit_params(params),
        }

        self.emit_space();
        self.emit("=>");
        self.emit_space();

        let saved = std::mem::replace(&mut self.no_in, false);
        match &arrow.body {
            ArrowBody::Expr(expr) => {
                // Object literal needs parens
                if starts_with_brace(expr) {
                    self.emit("(");
                    self.emit_expr(expr);
                    self.emit(")");
                } else {
                    self.emit_expr_prec(expr, ASSIGN);
                }
            }
            ArrowBody::Block(stmts) => self.emit_block(stmts),
        }
        self.no_in = saved;
    }

    fn emit_params(&mut self, params: &[Param]) {
        self.emit("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.emit_comma();
            }
            if param.rest {
                self.emit("...");
            }
            self.emit_binding(&param.binding);
            self.emit_default(param.default.as_ref());
        }
        self.emit(")");
    }

    fn emit_class(&mut self, class: &Class) {
        self.emit("class");
        if let Some(name) = &class.name {
            self.emit(name);
        }
        if let Some(super_class) = &class.super_class {
            self.emit("extends");
            self.emit_space();
            self.emit_expr_prec(super_class, CALL);
        }
        self.emit_space();
        self.emit("{");
        self.indent();
        for member in &class.body {
            self.emit_newline();
            self.emit_class_member(member);
        }
        self.dedent();
        if !class.body.is_empty() {
            self.emit_newline();
        }
        self.close_brace();
    }

    fn emit_class_member(&mut self, member: &ClassMember) {
        match &member.kind {
            ClassMemberKind::Method { key, value, kind, is_static } => {
                if *is_static {
                    self.emit("static");
                    self.emit_space();
                }
                match kind {
                    MethodKind::Get => self.emit("get"),
                    MethodKind::Set => self.emit("set"),
                    MethodKind::Method | MethodKind::Constructor => {}
                }
                self.emit_method(key, value);
            }
            ClassMemberKind::Property { key, value, is_static } => {
                if *is_static {
                    self.emit("static");
                    self.emit_space();
                }
                self.emit_property_key(key);
                if let Some(value) = value {
                    self.emit_equals();
                    self.emit_expr_prec(value, ASSIGN);
                }
                self.emit_semicolon();
            }
            ClassMemberKind::StaticBlock(stmts) => {
                self.emit("static");
                self.emit_space();
                self.emit_block(stmts);
            }
            ClassMemberKind::Empty => self.emit(";"),
        }
    }

    /// `[async] [*] key(params) { body }` after any `static`/`get`/`set`.
    fn emit_method(&mut self, key: &PropertyKey, value: &Function) {
        if value.is_async {
            self.emit("async");
        }
        if value.is_generator {
            self.emit("*");
        }
        self.emit_property_key(key);
        self.emit_params(&value.params);
        self.emit_space();
        self.emit_block(&value.body);
    }

    fn emit_string(&mut self, value: &str) {
        self.emit(&quote_string(value));
    }

    fn emit_import(&mut self, decl: &ImportDecl) {
        self.emit("import");

        let mut has_clause = false;
        let mut named = Vec::new();

        for spec in &decl.specifiers {
            match spec {
                ImportSpecifier::Default { local, .. } => {
                    self.emit_space();
                    self.emit(local);
                    has_clause = true;
                }
                ImportSpecifier::Namespace { local, .. } => {
                    if has_clause {
                        self.emit(",");
                    }
                    self.emit_space();
                    self.emit("*");
                    self.emit_space();
                    self.emit("as");
                    self.emit(local);
                    has_clause = true;
                }
                ImportSpecifier::Named { imported, local, .. } => {
                    named.push((imported, local));
                }
            }
        }

        if !named.is_empty() {
            if has_clause {
                self.emit(",");
            }
            self.emit_space();
            self.emit("{");
            for (i, (imported, local)) in named.iter().enumerate() {
                if i > 0 {
                    self.emit_comma();
                }
                self.emit_module_name(imported);
                if imported != local {
                    self.emit("as");
                    self.emit(local);
                }
            }
            self.emit("}");
            has_clause = true;
        }

        if has_clause {
            self.emit_space();
            self.emit("from");
        }
        self.emit_space();
        self.emit_string(&decl.source);
        self.emit_semicolon();
    }

    /// An import/export name, quoted when it is not an identifier.
    fn emit_module_name(&mut self, name: &str) {
        if crate::is_identifier_name(name) {
            self.emit(name);
        } else {
            self.emit_string(name);
        }
    }

    fn emit_export(&mut self, decl: &ExportDecl) {
        self.emit("export");
        self.emit_space();
        match decl {
            ExportDecl::Named { specifiers, source, .. } => {
                self.emit("{");
                for (i, spec) in specifiers.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    self.emit_module_name(&spec.local);
                    if spec.local != spec.exported {
                        self.emit("as");
                        self.emit_module_name(&spec.exported);
                    }
                }
                self.emit("}");
                if let Some((source, _)) = source {
                    self.emit_space();
                    self.emit("from");
                    self.emit_space();
                    self.emit_string(source);
                }
                self.emit_semicolon();
            }
            ExportDecl::Default { expr, .. } => {
                self.emit("default");
                self.emit_space();
                match &expr.kind {
                    ExprKind::Function(func) => self.emit_function(func, false),
                    ExprKind::Class(class) => self.emit_class(class),
                    _ => {
                        if starts_ambiguously(expr) {
                            self.emit("(");
                            self.emit_expr_prec(expr, ASSIGN);
                            self.emit(")");
                        } else {
                            self.emit_expr_prec(expr, ASSIGN);
                        }
                        self.emit_semicolon();
                    }
                }
            }
            ExportDecl::Decl { decl, .. } => self.emit_stmt(decl),
            ExportDecl::All { exported, source, .. } => {
                self.emit("*");
                if let Some(exported) = exported {
                    self.emit_space();
                    self.emit("as");
                    self.emit_module_name(exported);
                }
                self.emit_space();
                self.emit("from");
                self.emit_space();
                self.emit_string(source);
                self.emit_semicolon();
            }
        }
    }

    // =========================================================================
    // Expression Emission
    // =========================================================================

    fn emit_expr(&mut self, expr: &Expr) {
        self.emit_expr_prec(expr, 0);
    }

    /// Emit `expr`, parenthesised when it binds looser than `min_prec`.
    fn emit_expr_prec(&mut self, expr: &Expr, min_prec: u8) {
        let needs_in_parens = self.no_in && matches!(expr.kind, ExprKind::Binary { op: BinaryOp::In, .. });
        if precedence(expr) < min_prec || needs_in_parens {
            self.emit("(");
            let saved = std::mem::replace(&mut self.no_in, false);
            self.emit_expr_inner(expr);
            self.no_in = saved;
            self.emit(")");
        } else {
            self.emit_expr_inner(expr);
        }
    }

    fn emit_args(&mut self, args: &[Expr]) {
        self.emit("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.emit_comma();
            }
            self.emit_expr_prec(arg, ASSIGN);
        }
        self.emit(")");
    }

    fn emit_expr_inner(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Null => self.emit("null"),
            ExprKind::Bool(b) => self.emit(if *b { "true" } else { "false" }),
            ExprKind::Number(n) => self.emit(&format_number(*n)),
            ExprKind::BigInt(digits) => {
                self.emit(digits);
                self.output.push('n');
            }
            ExprKind::String(s) => self.emit_string(s),
            ExprKind::Regex { pattern, flags } => {
                self.emit("/");
                self.output.push_str(pattern);
                self.output.push('/');
                self.output.push_str(flags);
            }
            ExprKind::Template(template) => self.emit_template(template),
            ExprKind::Ident(name) => self.emit(name),
            ExprKind::PrivateName(name) => {
                self.emit("#");
                self.output.push_str(name);
            }
            ExprKind::This => self.emit("this"),
            ExprKind::Super => self.emit("super"),
            ExprKind::Array(elements) => {
                self.emit("[");
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    if let Some(elem) = elem {
                        self.emit_expr_prec(elem, ASSIGN);
                    }
                }
                if matches!(elements.last(), Some(None)) {
                    self.emit(",");
                }
                self.emit("]");
            }
            ExprKind::Object(properties) => {
                self.emit("{");
                for (i, prop) in properties.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    self.emit_object_property(prop);
                }
                self.emit("}");
            }
            ExprKind::Function(func) => self.emit_function(func, false),
            ExprKind::Arrow(arrow) => self.emit_arrow(arrow),
            ExprKind::Class(class) => self.emit_class(class),
            ExprKind::Unary { op, arg } => {
                self.emit(unary_op_str(*op));
                self.emit_expr_prec(arg, UNARY);
            }
            ExprKind::Binary { op, left, right } => {
                let (prec, op_str) = binary_op_info(*op);
                let (left_prec, right_prec) = if *op == BinaryOp::Pow {
                    // `-a ** b` is a syntax error
                    (UPDATE, prec)
                } else {
                    (prec, prec + 1)
                };
                self.emit_expr_prec(left, left_prec);
                self.emit_space();
                self.emit(op_str);
                self.emit_space();
                self.emit_expr_prec(right, right_prec);
            }
            ExprKind::Logical { op, left, right } => {
                let (prec, op_str) = logical_op_info(*op);
                let left_prec = if mixes_nullish(*op, left) { PRIMARY } else { prec };
                let right_prec = if mixes_nullish(*op, right) { PRIMARY } else { prec + 1 };
                self.emit_expr_prec(left, left_prec);
                self.emit_space();
                self.emit(op_str);
                self.emit_space();
                self.emit_expr_prec(right, right_prec);
            }
            ExprKind::Assign { op, left, right } => {
                self.emit_expr_prec(left, CALL);
                self.emit_space();
                self.emit(assign_op_str(*op));
                self.emit_space();
                self.emit_expr_prec(right, ASSIGN);
            }
            ExprKind::Update { op, prefix, arg } => {
                let op_str = match op {
                    UpdateOp::Increment => "++",
                    UpdateOp::Decrement => "--",
                };
                if *prefix {
                    self.emit(op_str);
                    self.emit_expr_prec(arg, UNARY);
                } else {
                    self.emit_expr_prec(arg, CALL);
                    self.emit(op_str);
                }
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                self.emit_expr_prec(test, CONDITIONAL + 1);
                self.emit_space();
                self.emit("?");
                self.emit_space();
                let saved = std::mem::replace(&mut self.no_in, false);
                self.emit_expr_prec(consequent, ASSIGN);
                self.no_in = saved;
                self.emit_space();
                self.emit(":");
                self.emit_space();
                self.emit_expr_prec(alternate, ASSIGN);
            }
            ExprKind::Sequence(exprs) => {
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        self.emit_comma();
                    }
                    self.emit_expr_prec(expr, ASSIGN);
                }
            }
            ExprKind::Member { object, property, computed } => {
                self.emit_member_object(object);
                if *computed {
                    self.emit("[");
                    self.emit_expr(property);
                    self.emit("]");
                } else {
                    self.emit(".");
                    self.emit_expr_inner(property);
                }
            }
            ExprKind::OptionalMember { object, property, computed } => {
                self.emit_member_object(object);
                if *computed {
                    self.emit("?.[");
                    self.emit_expr(property);
                    self.emit("]");
                } else {
                    self.emit("?.");
                    self.emit_expr_inner(property);
                }
            }
            ExprKind::Chain(inner) => self.emit_expr_inner(inner),
            ExprKind::Call { callee, args } => {
                self.emit_expr_prec(callee, CALL);
                self.emit_args(args);
            }
            ExprKind::OptionalCall { callee, args } => {
                self.emit_expr_prec(callee, CALL);
                self.emit("?.");
                self.emit_args(args);
            }
            ExprKind::New { callee, args } => {
                self.emit("new");
                if precedence(callee) < MEMBER || calls_in_spine(callee) {
                    self.emit("(");
                    self.emit_expr(callee);
                    self.emit(")");
                } else {
                    self.emit_expr_inner(callee);
                }
                self.emit_args(args);
            }
            ExprKind::TaggedTemplate { tag, quasi } => {
                self.emit_expr_prec(tag, CALL);
                self.emit_template(quasi);
            }
            ExprKind::Spread(arg) => {
                self.emit("...");
                self.emit_expr_prec(arg, ASSIGN);
            }
            ExprKind::Yield { arg, delegate } => {
                self.emit("yield");
                if *delegate {
                    self.emit("*");
                }
                if let Some(arg) = arg {
                    self.emit_space();
                    self.emit_expr_prec(arg, ASSIGN);
                }
            }
            ExprKind::Await(arg) => {
                self.emit("await");
                self.emit_space();
                self.emit_expr_prec(arg, UNARY);
            }
            ExprKind::Import(arg) => {
                self.emit("import(");
                self.emit_expr_prec(arg, ASSIGN);
                self.emit(")");
            }
            ExprKind::MetaProperty { meta, property } => {
                self.emit(meta);
                self.emit(".");
                self.emit(property);
            }
            ExprKind::JsxElement(el) => self.emit_jsx_element(el),
            ExprKind::JsxFragment(frag) => {
                self.emit("<>");
                self.emit_jsx_children(&frag.children);
                self.output.push_str("</>");
            }
            ExprKind::JsxText(text) => self.output.push_str(text),
            ExprKind::JsxExprContainer(inner) => {
                self.emit("{");
                if let Some(inner) = inner {
                    self.emit_expr(inner);
                }
                self.output.push('}');
            }
        }
    }

    fn emit_member_object(&mut self, object: &Expr) {
        // `1.x` would read as a number
        if let ExprKind::Number(n) = object.kind {
            if !format_number(n).contains(['.', 'e']) {
                self.emit("(");
                self.emit_expr_inner(object);
                self.emit(")");
                return;
            }
        }
        self.emit_expr_prec(object, CALL);
    }

    fn emit_template(&mut self, template: &Template) {
        self.emit("`");
        for (i, quasi) in template.quasis.iter().enumerate() {
            self.output.push_str(&quasi.raw);
            if let Some(expr) = template.exprs.get(i) {
                self.output.push_str("${");
                self.emit_expr(expr);
                self.output.push('}');
            }
        }
        self.output.push('`');
    }

    // =========================================================================
    // JSX
    // =========================================================================

    fn emit_jsx_element(&mut self, element: &JsxElement) {
        let name = element.name.to_source();
        self.emit("<");
        self.output.push_str(&name);
        for attr in &element.attributes {
            self.output.push(' ');
            match attr {
                JsxAttribute::Attribute { name, value, .. } => {
                    self.output.push_str(name);
                    if let Some(value) = value {
                        self.output.push('=');
                        self.emit_jsx_attribute_value(value);
                    }
                }
                JsxAttribute::Spread { argument, .. } => {
                    self.output.push_str("{...");
                    self.emit_expr_prec(argument, ASSIGN);
                    self.output.push('}');
                }
            }
        }
        if element.self_closing {
            self.output.push_str("/>");
            return;
        }
        self.output.push('>');
        self.emit_jsx_children(&element.children);
        self.output.push_str("</");
        self.output.push_str(&name);
        self.output.push('>');
    }

    fn emit_jsx_attribute_value(&mut self, value: &Expr) {
        match &value.kind {
            ExprKind::String(s) if !s.contains('"') => {
                self.output.push('"');
                self.output.push_str(s);
                self.output.push('"');
            }
            ExprKind::String(s) if !s.contains('\'') => {
                self.output.push('\'');
                self.output.push_str(s);
                self.output.push('\'');
            }
            ExprKind::JsxElement(_) | ExprKind::JsxFragment(_) => self.emit_expr_inner(value),
            _ => {
                self.output.push('{');
                self.emit_expr_prec(value, ASSIGN);
                self.output.push('}');
            }
        }
    }

    fn emit_jsx_children(&mut self, children: &[Expr]) {
        for child in children {
            match &child.kind {
                ExprKind::JsxText(text) => self.output.push_str(text),
                ExprKind::JsxExprContainer(inner) => {
                    self.output.push('{');
                    if let Some(inner) = inner {
                        self.emit_expr(inner);
                    }
                    self.output.push('}');
                }
                _ => self.emit_expr_inner(child),
            }
        }
    }

    // =========================================================================
    // Object members
    // =========================================================================

    fn emit_object_property(&mut self, prop: &Property) {
        match prop.kind {
            PropertyKind::Spread => {
                self.emit("...");
                self.emit_expr_prec(&prop.value, ASSIGN);
                return;
            }
            PropertyKind::Get | PropertyKind::Set | PropertyKind::Method => {
                if let ExprKind::Function(func) = &prop.value.kind {
                    match prop.kind {
                        PropertyKind::Get => self.emit("get"),
                        PropertyKind::Set => self.emit("set"),
                        _ => {}
                    }
                    self.emit_method(&prop.key, func);
                    return;
                }
            }
            PropertyKind::Init => {}
        }

        if let PropertyKey::Ident(key) = &prop.key {
            match &prop.value.kind {
                ExprKind::Ident(name) if name == key => {
                    self.emit(name);
                    return;
                }
                // `{ a = 1 }` in an assignment pattern
                ExprKind::Assign { op: AssignOp::Assign, left, right }
                    if prop.shorthand && left.as_ident() == Some(key.as_str()) =>
                {
                    self.emit(key);
                    self.emit_equals();
                    self.emit_expr_prec(right, ASSIGN);
                    return;
                }
                _ => {}
            }
        }

        self.emit_property_key(&prop.key);
        self.emit(":");
        self.emit_space();
        self.emit_expr_prec(&prop.value, ASSIGN);
    }

    fn emit_property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Ident(name) => self.emit(name),
            PropertyKey::String(s) => self.emit_string(s),
            PropertyKey::Number(n) => self.emit(&format_number(*n)),
            PropertyKey::Computed(expr) => {
                self.emit("[");
                self.emit_expr_prec(expr, ASSIGN);
                self.emit("]");
            }
            PropertyKey::Private(name) => {
                self.emit("#");
                self.output.push_str(name);
            }
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '\\' || !c.is_ascii()
}

/// Whether a space must separate `last` (end of output) from `next`.
fn needs_separation(last: char, first: char, next: &str) -> bool {
    (is_word_char(last) && is_word_char(first))
        || (last == '+' && first == '+')
        || (last == '-' && first == '-')
        || (last == '/' && first == '/')
        || (last == '<' && next.starts_with("!--"))
}

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Sequence(_) => SEQUENCE,
        ExprKind::Assign { .. } | ExprKind::Arrow(_) | ExprKind::Yield { .. } | ExprKind::Spread(_) => ASSIGN,
        ExprKind::Conditional { .. } => CONDITIONAL,
        ExprKind::Logical { op, .. } => logical_op_info(*op).0,
        ExprKind::Binary { op, .. } => binary_op_info(*op).0,
        ExprKind::Unary { .. } | ExprKind::Await(_) => UNARY,
        ExprKind::Update { .. } | ExprKind::Chain(_) => UPDATE,
        ExprKind::Call { .. } | ExprKind::OptionalCall { .. } => CALL,
        ExprKind::Member { .. }
        | ExprKind::OptionalMember { .. }
        | ExprKind::New { .. }
        | ExprKind::TaggedTemplate { .. } => MEMBER,
        _ => PRIMARY,
    }
}

/// `??` cannot be mixed with `&&`/`||` without parentheses.
fn mixes_nullish(op: LogicalOp, operand: &Expr) -> bool {
    let ExprKind::Logical { op: inner, .. } = &operand.kind else {
        return false;
    };
    (op == LogicalOp::NullishCoalesce) != (*inner == LogicalOp::NullishCoalesce)
}

/// The expression whose first token starts `expr`.
fn leftmost(expr: &Expr) -> &Expr {
    match &expr.kind {
        ExprKind::Binary { left, .. } | ExprKind::Logical { left, .. } | ExprKind::Assign { left, .. } => {
            leftmost(left)
        }
        ExprKind::Conditional { test, .. } => leftmost(test),
        ExprKind::Sequence(exprs) => exprs.first().map_or(expr, leftmost),
        ExprKind::Member { object, .. } | ExprKind::OptionalMember { object, .. } => {
            // An integer object gets its own parentheses
            if matches!(object.kind, ExprKind::Number(_)) {
                expr
            } else {
                leftmost(object)
            }
        }
        ExprKind::Call { callee, .. } | ExprKind::OptionalCall { callee, .. } => leftmost(callee),
        ExprKind::TaggedTemplate { tag, .. } => leftmost(tag),
        ExprKind::Update { prefix: false, arg, .. } => leftmost(arg),
        ExprKind::Chain(inner) => leftmost(inner),
        _ => expr,
    }
}

/// Whether an expression statement starting with `expr` would be read as
/// something else: a block, a declaration, or `let [`.
fn starts_ambiguously(expr: &Expr) -> bool {
    matches!(
        leftmost(expr).kind,
        ExprKind::Object(_) | ExprKind::Function(_) | ExprKind::Class(_)
    ) || starts_with_let_bracket(expr)
}

fn starts_with_brace(expr: &Expr) -> bool {
    matches!(leftmost(expr).kind, ExprKind::Object(_))
}

fn starts_with_let_bracket(expr: &Expr) -> bool {
    let mut current = expr;
    loop {
        match &current.kind {
            ExprKind::Member { object, computed: true, .. } if object.as_ident() == Some("let") => return true,
            ExprKind::Binary { left, .. } | ExprKind::Logical { left, .. } | ExprKind::Assign { left, .. } => {
                current = left;
            }
            ExprKind::Member { object, .. } => current = object,
            ExprKind::Call { callee, .. } => current = callee,
            ExprKind::Sequence(exprs) => match exprs.first() {
                Some(first) => current = first,
                None => return false,
            },
            _ => return false,
        }
    }
}

/// Whether a call sits in the member spine of a `new` callee.
fn calls_in_spine(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call { .. } | ExprKind::OptionalCall { .. } => true,
        ExprKind::Member { object, .. } | ExprKind::OptionalMember { object, .. } => calls_in_spine(object),
        ExprKind::TaggedTemplate { tag, .. } => calls_in_spine(tag),
        _ => false,
    }
}

/// Whether `stmt` ends in an `if` without `else` that a following `else`
/// would attach to.
fn ends_with_open_if(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::If { alternate: None, .. } => true,
        StmtKind::If { alternate: Some(alt), .. } => ends_with_open_if(alt),
        StmtKind::For { body, .. }
        | StmtKind::ForIn { body, .. }
        | StmtKind::ForOf { body, .. }
        | StmtKind::While { body, .. }
        | StmtKind::Labeled { body, .. } => ends_with_open_if(body),
        _ => false,
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return "Infinity".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        let s = format!("{}", n);
        // Use shorter exponential notation if beneficial
        let exp = format!("{:e}", n);
        if exp.len() < s.len() {
            exp
        } else {
            s
        }
    }
}

/// Double-quoted string literal for `value`.
pub(crate) fn quote_string(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 2);
    result.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => result.push_str("\\0"),
            // A bundle may end up inside an HTML <script>
            '<' if chars.peek() == Some(&'/') => result.push_str("<\\"),
            '\u{2028}' | '\u{2029}' => result.push_str(&format!("\\u{:04x}", c as u32)),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Minus => "-",
        UnaryOp::Plus => "+",
        UnaryOp::Not => "!",
        UnaryOp::BitNot => "~",
        UnaryOp::Typeof => "typeof",
        UnaryOp::Void => "void",
        UnaryOp::Delete => "delete",
    }
}

fn logical_op_info(op: LogicalOp) -> (u8, &'static str) {
    match op {
        LogicalOp::Or => (4, "||"),
        LogicalOp::NullishCoalesce => (4, "??"),
        LogicalOp::And => (5, "&&"),
    }
}

fn binary_op_info(op: BinaryOp) -> (u8, &'static str) {
    match op {
        BinaryOp::BitOr => (6, "|"),
        BinaryOp::BitXor => (7, "^"),
        BinaryOp::BitAnd => (8, "&"),
        BinaryOp::Eq => (9, "=="),
        BinaryOp::NotEq => (9, "!="),
        BinaryOp::StrictEq => (9, "==="),
        BinaryOp::StrictNotEq => (9, "!=="),
        BinaryOp::Lt => (10, "<"),
        BinaryOp::LtEq => (10, "<="),
        BinaryOp::Gt => (10, ">"),
        BinaryOp::GtEq => (10, ">="),
        BinaryOp::In => (10, "in"),
        BinaryOp::Instanceof => (10, "instanceof"),
        BinaryOp::Shl => (11, "<<"),
        BinaryOp::Shr => (11, ">>"),
        BinaryOp::UShr => (11, ">>>"),
        BinaryOp::Add => (12, "+"),
        BinaryOp::Sub => (12, "-"),
        BinaryOp::Mul => (13, "*"),
        BinaryOp::Div => (13, "/"),
        BinaryOp::Mod => (13, "%"),
        BinaryOp::Pow => (14, "**"),
    }
}

fn assign_op_str(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::AddAssign => "+=",
        AssignOp::SubAssign => "-=",
        AssignOp::MulAssign => "*=",
        AssignOp::DivAssign => "/=",
        AssignOp::ModAssign => "%=",
        AssignOp::PowAssign => "**=",
        AssignOp::ShlAssign => "<<=",
        AssignOp::ShrAssign => ">>=",
        AssignOp::UShrAssign => ">>>=",
        AssignOp::BitOrAssign => "|=",
        AssignOp::BitXorAssign => "^=",
        AssignOp::BitAndAssign => "&=",
        AssignOp::AndAssign => "&&=",
        AssignOp::OrAssign => "||=",
        AssignOp::NullishAssign => "??=",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Parser, ParserOptions};

    fn parse(source: &str) -> Program {
        Parser::new(source, ParserOptions::default().with_jsx(true)).parse().unwrap()
    }

    fn minified(source: &str) -> String {
        generate(&parse(source), &CodegenOptions::minify())
    }

    fn formatted(source: &str) -> String {
        generate(&parse(source), &CodegenOptions::default())
    }

    /// Generated text is a fixed point of parse + generate.
    fn roundtrip(source: &str) {
        for options in [CodegenOptions::default(), CodegenOptions::minify()] {
            let once = generate(&parse(source), &options);
            let twice = generate(&parse(&once), &options);
            assert_eq!(once, twice, "not stable for {source:?}");
        }
    }

    #[test]
    fn test_variable_declaration() {
        assert_eq!(formatted("let x = 1;"), "let x = 1;\n");
        assert_eq!(minified("let x = 1;\nlet y = 2;"), "let x=1;let y=2;");
    }

    #[test]
    fn test_function_declaration() {
        let output = formatted("function foo(a, b) { return a + b; }");
        assert_eq!(output, "function foo(a, b) {\n  return a + b;\n}\n");
        assert_eq!(minified("function foo(a, b) { return a + b; }"), "function foo(a,b){return a+b}");
    }

    #[test]
    fn test_custom_indent() {
        let options = CodegenOptions { format: true, indent: "\t".to_string() };
        let output = generate(&parse("if (a) { b(); }"), &options);
        assert_eq!(output, "if (a) {\n\tb();\n}\n");
    }

    #[test]
    fn test_precedence_parentheses() {
        assert_eq!(minified("(a + b) * c;"), "(a+b)*c;");
        assert_eq!(minified("a + (b + c);"), "a+(b+c);");
        assert_eq!(minified("a - (b - c);"), "a-(b-c);");
        assert_eq!(minified("(a ** b) ** c;"), "(a**b)**c;");
        assert_eq!(minified("(-a) ** b;"), "(-a)**b;");
        assert_eq!(minified("(a, b) ? c : d;"), "(a,b)?c:d;");
        assert_eq!(minified("f((a, b));"), "f((a,b));");
        assert_eq!(minified("(a || b) ?? c;"), "(a||b)??c;");
        assert_eq!(minified("new (a())();"), "new(a())();");
        assert_eq!(minified("new (a().b)();"), "new(a().b)();");
        assert_eq!(minified("(a?.b).c;"), "(a?.b).c;");
    }

    #[test]
    fn test_token_separation() {
        assert_eq!(minified("a + +b;"), "a+ +b;");
        assert_eq!(minified("a - -b;"), "a- -b;");
        assert_eq!(minified("typeof x;"), "typeof x;");
        assert_eq!(minified("a / /re/g;"), "a/ /re/g;");
        assert_eq!(minified("x = void 0;"), "x=void 0;");
    }

    #[test]
    fn test_statement_start() {
        assert_eq!(minified("({}).toString();"), "({}.toString());");
        assert_eq!(minified("(function () {})();"), "(function(){}());");
        assert_eq!(minified("(class {});"), "(class{});");
        assert_eq!(minified("x = () => ({});"), "x=()=>({});");
        assert_eq!(minified("(1).toString();"), "(1).toString();");
    }

    #[test]
    fn test_semicolons_deferred() {
        assert_eq!(minified("if (a) { b(); c(); }"), "if(a){b();c()}");
        assert_eq!(minified("if (a) b(); else c();"), "if(a)b();else c();");
        assert_eq!(minified("class A { x = 1; y; }"), "class A{x=1;y}");
    }

    #[test]
    fn test_dangling_else() {
        let program = Program::new(
            vec![Stmt::new(
                StmtKind::If {
                    test: Expr::ident("a"),
                    consequent: Box::new(Stmt::new(
                        StmtKind::If {
                            test: Expr::ident("b"),
                            consequent: Box::new(Stmt::expr(Expr::ident("x"))),
                            alternate: None,
                        },
                        Default::default(),
                    )),
                    alternate: Some(Box::new(Stmt::expr(Expr::ident("y")))),
                },
                Default::default(),
            )],
            SourceType::Module,
            Default::default(),
        );
        assert_eq!(generate(&program, &CodegenOptions::minify()), "if(a){if(b)x}else y;");
    }

    #[test]
    fn test_strings_escape() {
        assert_eq!(minified(r#"'a"b\n';"#), r#""a\"b\n";"#);
        assert_eq!(minified(r#""</script>";"#), r#""<\/script>";"#);
    }

    #[test]
    fn test_for_in_head() {
        assert_eq!(minified("for (var k in o) ;"), "for(var k in o);");
        assert_eq!(minified("for (x = (a in b); ;) ;"), "for(x=(a in b);;);");
        assert_eq!(minified("for (const [a, b] of m) f(a);"), "for(const[a,b] of m)f(a);");
    }

    #[test]
    fn test_roundtrip_fixed_point() {
        roundtrip(
            "import a, { b as c } from './m';\n\
             export const d = async function* g() { yield* c; };\n\
             export default class extends a { #p = 1; static { this.q = 2; } get r() { return this.#p; } }\n\
             label: for (let i = 0, j = 1; i < 10; i++) { if (i) continue label; else break; }\n\
             const { x, y: [z = 1, ...w], ...rest } = obj ?? {};\n\
             const t = tag`a${b}c`, u = `x${y}`;\n\
             switch (k) { case 1: f(); default: g(); }\n\
             try { h(); } catch { } finally { i(); }\n\
             do x--; while (x > 0);\n\
             const o = { a, b: 1, [c]: 2, 'd-e': 3, m() {}, get n() { return 1; }, ...s };\n\
             import.meta.url; a?.b?.[c]?.(d);\n\
             x ||= y; x &&= y; x ??= y;\n\
             const el = <div className=\"a\" {...p}>hi {name}<br/></div>;",
        );
    }

    #[test]
    fn test_jsx_output() {
        assert_eq!(minified("<a href=\"x\" b={1}>t{y}</a>;"), "<a href=\"x\" b={1}>t{y}</a>;");
    }
}
