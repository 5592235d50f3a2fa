//! Module wrapping.
//!
//! Every script becomes a function that runs its body on the first call
//! and returns the same exports object on every later call:
//!
//! ```text
//! var _i1 = 0, _x1 = {};
//! function _m1() {
//!   if (_i1) return _x1; else _i1++;
//!   Object.defineProperty(_x1, "name", {enumerable: true, get: function () { return name; }});
//!   ...body...
//!   return _x1;
//! }
//! ```
//!
//! Imports of other modules become calls of their functions, and exports
//! become live getters on the exports object.

use super::idents::Identifiers;
use rustc_hash::FxHashMap as HashMap;
use sift_parser::traverse::{traverse, Path as AstPath, Visitor};
use sift_parser::{
    is_identifier_name, Binding, ExportDecl, Expr, ExprKind, Function, ImportDecl,
    ImportSpecifier, Program, Property, PropertyKey, PropertyKind, SourceType, Span, Stmt,
    StmtKind, UpdateOp, VarDeclarator, VarKind,
};

/// What an import specifier of a module refers to after linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Another script, initialized by calling the named function.
    Module(String),
    /// A stylesheet; the import is dropped.
    Stylesheet,
    /// An image or opaque file, bound as its output file name.
    File(String),
}

/// Every specifier a script imports with a string literal, in source order,
/// with the byte offset of the literal.
pub fn dependency_specifiers(program: &mut Program) -> Vec<(String, u32)> {
    let mut found = Vec::new();
    for stmt in &program.body {
        match &stmt.kind {
            StmtKind::Import(import) => found.push((import.source.clone(), import.source_span.start)),
            StmtKind::Export(export) => match export.as_ref() {
                ExportDecl::Named { source: Some((source, span)), .. } => {
                    found.push((source.clone(), span.start));
                }
                ExportDecl::All { source, source_span, .. } => {
                    found.push((source.clone(), source_span.start));
                }
                _ => {}
            },
            _ => {}
        }
    }
    traverse(program, &mut RequireCollector { found: &mut found });

    let mut seen = rustc_hash::FxHashSet::default();
    found.retain(|(specifier, _)| seen.insert(specifier.clone()));
    found
}

/// The string argument of `require("x")` or `import("x")`.
fn required_specifier(expr: &Expr) -> Option<(&str, u32)> {
    let argument = match &expr.kind {
        ExprKind::Call { callee, args } if callee.as_ident() == Some("require") && args.len() == 1 => &args[0],
        ExprKind::Import(argument) => argument.as_ref(),
        _ => return None,
    };
    match &argument.kind {
        ExprKind::String(specifier) => Some((specifier, argument.span.start)),
        _ => None,
    }
}

struct RequireCollector<'a> {
    found: &'a mut Vec<(String, u32)>,
}

impl Visitor for RequireCollector<'_> {
    fn enter_expr(&mut self, expr: &mut Expr, _path: &AstPath) -> Option<Expr> {
        if let Some((specifier, offset)) = required_specifier(expr) {
            self.found.push((specifier.to_string(), offset));
        }
        None
    }
}

/// Replaces `require("x")` and `import("x")` with the linked module.
struct RequireRewriter<'a> {
    targets: &'a HashMap<String, Target>,
}

impl Visitor for RequireRewriter<'_> {
    fn enter_expr(&mut self, expr: &mut Expr, _path: &AstPath) -> Option<Expr> {
        let (specifier, _) = required_specifier(expr)?;
        let value = target_value(self.targets.get(specifier));
        if matches!(expr.kind, ExprKind::Import(_)) {
            let resolve = Expr::member(Expr::ident("Promise"), "resolve");
            Some(Expr::call(resolve, vec![value]))
        } else {
            Some(value)
        }
    }
}

/// The value an import of `target` evaluates to.
fn target_value(target: Option<&Target>) -> Expr {
    match target {
        Some(Target::Module(name)) => Expr::call(Expr::ident(name), Vec::new()),
        Some(Target::File(name)) => Expr::string(name),
        Some(Target::Stylesheet) | None => Expr::undefined(),
    }
}

/// Wrap `program` as the module `name`, linking its imports through
/// `targets`. Returns the statements to merge into the bundle.
pub fn prepare_module(
    program: Program,
    name: &str,
    targets: &HashMap<String, Target>,
    idents: &mut Identifiers,
) -> Vec<Stmt> {
    let initialized = idents.allocate("i");
    let exports = idents.allocate("x");
    let mut linker = Linker {
        targets,
        idents,
        exports: &exports,
        getters: Vec::new(),
        body: Vec::with_capacity(program.body.len()),
    };
    for stmt in program.body {
        linker.statement(stmt);
    }
    let Linker { getters, body, .. } = linker;

    let mut body = Program::new(body, SourceType::Module, program.span);
    traverse(&mut body, &mut RequireRewriter { targets });

    let guard = Stmt::new(
        StmtKind::If {
            test: Expr::ident(&initialized),
            consequent: Box::new(return_stmt(Expr::ident(&exports))),
            alternate: Some(Box::new(Stmt::expr(Expr::new(
                ExprKind::Update {
                    op: UpdateOp::Increment,
                    prefix: false,
                    arg: Box::new(Expr::ident(&initialized)),
                },
                Span::default(),
            )))),
        },
        Span::default(),
    );

    let mut function_body = Vec::with_capacity(body.body.len() + getters.len() + 2);
    function_body.push(guard);
    function_body.extend(getters);
    function_body.extend(body.body);
    function_body.push(return_stmt(Expr::ident(&exports)));

    let state = Stmt::new(
        StmtKind::Var {
            kind: VarKind::Var,
            decls: vec![
                declarator(&initialized, number(0.0)),
                declarator(&exports, Expr::new(ExprKind::Object(Vec::new()), Span::default())),
            ],
        },
        Span::default(),
    );
    let function = Function {
        name: Some(name.to_string()),
        params: Vec::new(),
        body: function_body,
        is_async: false,
        is_generator: false,
        span: program.span,
    };
    vec![state, Stmt::new(StmtKind::Function(Box::new(function)), program.span)]
}

struct Linker<'a> {
    targets: &'a HashMap<String, Target>,
    idents: &'a mut Identifiers,
    exports: &'a str,
    /// `Object.defineProperty` calls, run before the body.
    getters: Vec<Stmt>,
    body: Vec<Stmt>,
}

impl Linker<'_> {
    fn statement(&mut self, stmt: Stmt) {
        match stmt.kind {
            StmtKind::Import(import) => self.import(*import, stmt.span),
            StmtKind::Export(export) => self.export(*export),
            kind => self.body.push(Stmt::new(kind, stmt.span)),
        }
    }

    fn target(&self, specifier: &str) -> Option<&Target> {
        self.targets.get(specifier)
    }

    fn import(&mut self, import: ImportDecl, span: Span) {
        let target = self.target(&import.source).cloned();
        if import.specifiers.is_empty() {
            if let Some(Target::Module(_)) = target {
                self.body.push(Stmt::expr(target_value(target.as_ref())));
            }
            return;
        }
        if matches!(target, Some(Target::Stylesheet)) {
            return;
        }

        let decls = import
            .specifiers
            .into_iter()
            .map(|specifier| {
                let value = target_value(target.as_ref());
                let value = match (&target, &specifier) {
                    (Some(Target::Module(_)), ImportSpecifier::Default { .. }) => Expr::member(value, "default"),
                    (Some(Target::Module(_)), ImportSpecifier::Named { imported, .. }) => {
                        property_of(value, imported)
                    }
                    _ => value,
                };
                declarator(specifier.local(), value)
            })
            .collect();
        self.body.push(Stmt::new(StmtKind::Var { kind: VarKind::Var, decls }, span));
    }

    fn export(&mut self, export: ExportDecl) {
        match export {
            ExportDecl::Decl { decl, .. } => {
                for name in declared_names(&decl) {
                    self.getter(&name, Expr::ident(&name));
                }
                self.body.push(decl);
            }
            ExportDecl::Default { expr, span } => {
                let named = match &expr.kind {
                    ExprKind::Function(function) => function.name.clone(),
                    ExprKind::Class(class) => class.name.clone(),
                    _ => None,
                };
                match (named, expr.kind) {
                    (Some(name), ExprKind::Function(function)) => {
                        self.body.push(Stmt::new(StmtKind::Function(function), span));
                        self.getter("default", Expr::ident(name));
                    }
                    (Some(name), ExprKind::Class(class)) => {
                        self.body.push(Stmt::new(StmtKind::Class(class), span));
                        self.getter("default", Expr::ident(name));
                    }
                    (_, kind) => {
                        let local = self.idents.allocate("default");
                        let value = Expr::new(kind, expr.span);
                        self.body.push(Stmt::new(
                            StmtKind::Var { kind: VarKind::Var, decls: vec![declarator(&local, value)] },
                            span,
                        ));
                        self.getter("default", Expr::ident(local));
                    }
                }
            }
            ExportDecl::Named { specifiers, source: None, .. } => {
                for specifier in specifiers {
                    self.getter(&specifier.exported, Expr::ident(&specifier.local));
                }
            }
            ExportDecl::Named { specifiers, source: Some((source, _)), .. } => {
                let target = self.target(&source).cloned();
                for specifier in specifiers {
                    let value = target_value(target.as_ref());
                    let value = match target {
                        Some(Target::Module(_)) => property_of(value, &specifier.local),
                        _ => value,
                    };
                    self.getter(&specifier.exported, value);
                }
            }
            ExportDecl::All { exported: Some(exported), source, .. } => {
                let value = target_value(self.target(&source));
                self.getter(&exported, value);
            }
            ExportDecl::All { exported: None, source, .. } => {
                if let Some(Target::Module(module)) = self.target(&source).cloned() {
                    let stmt = self.reexport_all(&module);
                    self.getters.push(stmt);
                }
            }
        }
    }

    /// `Object.defineProperty(exports, "name", {enumerable: true, get: function () { return value; }});`
    fn getter(&mut self, exported: &str, value: Expr) {
        let stmt = define_getter(Expr::ident(self.exports), Expr::string(exported), value);
        self.getters.push(stmt);
    }

    /// Forward every export of `module` except `default` that this module
    /// does not define itself:
    ///
    /// ```text
    /// Object.keys(_m2()).forEach(function (_k1) {
    ///   if (_k1 !== "default" && !(_k1 in _x1)) Object.defineProperty(_x1, _k1, {...get: function () { return _m2()[_k1]; }});
    /// });
    /// ```
    fn reexport_all(&mut self, module: &str) -> Stmt {
        use sift_parser::{BinaryOp, LogicalOp, UnaryOp};

        let key = self.idents.allocate("k");
        let module_value = || Expr::call(Expr::ident(module), Vec::new());
        let read = Expr::new(
            ExprKind::Member {
                object: Box::new(module_value()),
                property: Box::new(Expr::ident(&key)),
                computed: true,
            },
            Span::default(),
        );
        let define = define_getter(Expr::ident(self.exports), Expr::ident(&key), read);

        let not_default = binary(BinaryOp::StrictNotEq, Expr::ident(&key), Expr::string("default"));
        let own = binary(BinaryOp::In, Expr::ident(&key), Expr::ident(self.exports));
        let not_own = Expr::new(ExprKind::Unary { op: UnaryOp::Not, arg: Box::new(own) }, Span::default());
        let test = Expr::new(
            ExprKind::Logical {
                op: LogicalOp::And,
                left: Box::new(not_default),
                right: Box::new(not_own),
            },
            Span::default(),
        );
        let body = Stmt::new(
            StmtKind::If { test, consequent: Box::new(define), alternate: None },
            Span::default(),
        );

        let keys = Expr::call(Expr::member(Expr::ident("Object"), "keys"), vec![module_value()]);
        let callback = function_expr(vec![Binding::ident(key)], vec![body]);
        Stmt::expr(Expr::call(Expr::member(keys, "forEach"), vec![callback]))
    }
}

/// Names a declaration statement binds.
fn declared_names(decl: &Stmt) -> Vec<String> {
    match &decl.kind {
        StmtKind::Var { decls, .. } => decls
            .iter()
            .flat_map(|d| d.binding.names())
            .map(str::to_string)
            .collect(),
        StmtKind::Function(function) => function.name.iter().cloned().collect(),
        StmtKind::Class(class) => class.name.iter().cloned().collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// Node builders
// =============================================================================

fn number(value: f64) -> Expr {
    Expr::new(ExprKind::Number(value), Span::default())
}

fn binary(op: sift_parser::BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::new(
        ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
        Span::default(),
    )
}

fn declarator(name: &str, init: Expr) -> VarDeclarator {
    VarDeclarator {
        binding: Binding::ident(name),
        init: Some(init),
        span: Span::default(),
    }
}

fn return_stmt(arg: Expr) -> Stmt {
    Stmt::new(StmtKind::Return { arg: Some(arg) }, Span::default())
}

/// `object.name`, or `object["name"]` when `name` is not an identifier.
fn property_of(object: Expr, name: &str) -> Expr {
    if is_identifier_name(name) {
        Expr::member(object, name)
    } else {
        Expr::new(
            ExprKind::Member {
                object: Box::new(object),
                property: Box::new(Expr::string(name)),
                computed: true,
            },
            Span::default(),
        )
    }
}

fn function_expr(params: Vec<Binding>, body: Vec<Stmt>) -> Expr {
    let params = params
        .into_iter()
        .map(|binding| sift_parser::Param { binding, default: None, rest: false, span: Span::default() })
        .collect();
    let function = Function {
        name: None,
        params,
        body,
        is_async: false,
        is_generator: false,
        span: Span::default(),
    };
    Expr::new(ExprKind::Function(Box::new(function)), Span::default())
}

fn define_getter(exports: Expr, key: Expr, value: Expr) -> Stmt {
    let descriptor = Expr::new(
        ExprKind::Object(vec![
            init_property("enumerable", Expr::new(ExprKind::Bool(true), Span::default())),
            init_property("get", function_expr(Vec::new(), vec![return_stmt(value)])),
        ]),
        Span::default(),
    );
    let define = Expr::member(Expr::ident("Object"), "defineProperty");
    Stmt::expr(Expr::call(define, vec![exports, key, descriptor]))
}

fn init_property(key: &str, value: Expr) -> Property {
    Property {
        key: PropertyKey::Ident(key.to_string()),
        value,
        kind: PropertyKind::Init,
        shorthand: false,
        span: Span::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_parser::{generate, parse, CodegenOptions, ParserOptions};

    fn program(source: &str) -> Program {
        parse(source, ParserOptions::default()).unwrap()
    }

    fn wrap(source: &str, targets: &[(&str, Target)]) -> String {
        let targets: HashMap<String, Target> =
            targets.iter().map(|(s, t)| ((*s).to_string(), t.clone())).collect();
        let mut idents = Identifiers::new();
        let body = prepare_module(program(source), "_m1", &targets, &mut idents);
        let merged = Program::new(body, SourceType::Module, Span::default());
        generate(&merged, &CodegenOptions::minify())
    }

    #[test]
    fn test_wrapper_runs_body_once() {
        assert_eq!(
            wrap("log(1);", &[]),
            "var _i1=0,_x1={};function _m1(){if(_i1)return _x1;else _i1++;log(1);return _x1}"
        );
    }

    #[test]
    fn test_imports_call_module_functions() {
        let out = wrap(
            "import a, { b as c, 'd-e' as f } from './x'; import * as ns from './x'; import './y';",
            &[("./x", Target::Module("_m2".into())), ("./y", Target::Module("_m3".into()))],
        );
        assert!(out.contains("var a=_m2().default,c=_m2().b,f=_m2()[\"d-e\"];"), "{out}");
        assert!(out.contains("var ns=_m2();"), "{out}");
        assert!(out.contains("_m3();"), "{out}");
    }

    #[test]
    fn test_stylesheets_dropped_and_files_bound_by_name() {
        let out = wrap(
            "import './site.css'; import logo from './logo.png';",
            &[("./site.css", Target::Stylesheet), ("./logo.png", Target::File("logo.png".into()))],
        );
        assert!(!out.contains("css"), "{out}");
        assert!(out.contains("var logo=\"logo.png\";"), "{out}");
    }

    #[test]
    fn test_exports_become_getters() {
        let out = wrap("export const a = 1, b = 2; export function f() {} export { a as z };", &[]);
        for name in ["a", "b", "f"] {
            let getter = format!("Object.defineProperty(_x1,\"{name}\",{{enumerable:true,get:function(){{return {name}}}}});");
            assert!(out.contains(&getter), "{out}");
        }
        assert!(out.contains("\"z\",{enumerable:true,get:function(){return a}}"), "{out}");
        assert!(out.contains("const a=1,b=2;function f(){}"), "{out}");
    }

    #[test]
    fn test_default_exports() {
        let out = wrap("export default 40 + 2;", &[]);
        assert!(out.contains("var _default1=40+2;"), "{out}");
        assert!(out.contains("\"default\",{enumerable:true,get:function(){return _default1}}"), "{out}");

        let out = wrap("export default function main() {}", &[]);
        assert!(out.contains("function main(){}"), "{out}");
        assert!(out.contains("return main}"), "{out}");
    }

    #[test]
    fn test_reexports() {
        let targets = [("./x", Target::Module("_m2".into()))];
        let out = wrap("export { a as b } from './x'; export * as ns from './x';", &targets);
        assert!(out.contains("\"b\",{enumerable:true,get:function(){return _m2().a}}"), "{out}");
        assert!(out.contains("\"ns\",{enumerable:true,get:function(){return _m2()}}"), "{out}");

        let out = wrap("export * from './x';", &targets);
        assert!(
            out.contains("Object.keys(_m2()).forEach(function(_k1){if(_k1!==\"default\"&&!(_k1 in _x1))"),
            "{out}"
        );
    }

    #[test]
    fn test_require_and_dynamic_import() {
        let out = wrap(
            "const x = require('./x'); load(import('./x')); require(name);",
            &[("./x", Target::Module("_m2".into()))],
        );
        assert!(out.contains("const x=_m2();"), "{out}");
        assert!(out.contains("load(Promise.resolve(_m2()));"), "{out}");
        assert!(out.contains("require(name);"), "{out}");
    }

    #[test]
    fn test_dependency_specifiers_in_source_order() {
        let mut program = program(
            "import a from './a';\nexport * from './b';\nfunction f() { return require('./c'); }\nimport('./a');",
        );
        let found = dependency_specifiers(&mut program);
        let specifiers: Vec<&str> = found.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(specifiers, ["./a", "./b", "./c"]);
        assert_eq!(found[0].1, 14);
    }
}
