//! Bundle-wide identifier bookkeeping.
//!
//! [`Identifiers`] is the set of every name used anywhere in the merged
//! program plus every name generated for it. [`ModuleIdentifiers`] maps each
//! module path to the one function name that initializes it.

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use sift_parser::traverse::{traverse, Path as AstPath, Visitor};
use sift_parser::{
    ArrowFunction, Binding, Expr, ExprKind, ForInit, Function, ImportSpecifier, Program, Stmt,
    StmtKind,
};
use std::path::{Path, PathBuf};

/// Names taken in the bundle. Generated names are `_<prefix><n>` with a
/// counter per prefix, skipping anything already taken.
#[derive(Debug, Default)]
pub struct Identifiers {
    taken: HashSet<String>,
    counters: HashMap<&'static str, usize>,
}

impl Identifiers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as used.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.taken.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }

    /// A new name that collides with nothing taken so far.
    pub fn allocate(&mut self, prefix: &'static str) -> String {
        let counter = self.counters.entry(prefix).or_insert(0);
        loop {
            *counter += 1;
            let name = format!("_{prefix}{counter}");
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }

    /// Every taken name.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.taken.iter().map(String::as_str)
    }

    /// Reserve every identifier `program` declares or references.
    pub fn collect(&mut self, program: &mut Program) {
        let before = self.taken.len();
        traverse(program, &mut Collector { names: self });
        tracing::trace!(added = self.taken.len() - before, "collected identifiers");
    }
}

/// The function name of each module, allocated on first request.
#[derive(Debug, Default)]
pub struct ModuleIdentifiers {
    names: HashMap<PathBuf, String>,
}

impl ModuleIdentifiers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The name for the module at `path`, allocating it if needed.
    pub fn get_or_allocate(&mut self, path: &Path, idents: &mut Identifiers) -> String {
        if let Some(name) = self.names.get(path) {
            return name.clone();
        }
        let name = idents.allocate("m");
        tracing::trace!(module = %name, path = %path.display(), "allocated module identifier");
        self.names.insert(path.to_path_buf(), name.clone());
        name
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&str> {
        self.names.get(path).map(String::as_str)
    }
}

struct Collector<'a> {
    names: &'a mut Identifiers,
}

impl Collector<'_> {
    fn binding(&mut self, binding: &Binding) {
        for name in binding.names() {
            self.names.reserve(name);
        }
    }
}

impl Visitor for Collector<'_> {
    fn enter_stmt(&mut self, stmt: &mut Stmt, _path: &AstPath) -> Option<Stmt> {
        match &stmt.kind {
            StmtKind::Var { decls, .. } => {
                for decl in decls {
                    self.binding(&decl.binding);
                }
            }
            StmtKind::Class(class) => {
                if let Some(name) = &class.name {
                    self.names.reserve(name);
                }
            }
            StmtKind::For { init: Some(ForInit::Var { decls, .. }), .. }
            | StmtKind::ForIn { left: ForInit::Var { decls, .. }, .. }
            | StmtKind::ForOf { left: ForInit::Var { decls, .. }, .. } => {
                for decl in decls {
                    self.binding(&decl.binding);
                }
            }
            StmtKind::Try { handler: Some(handler), .. } => {
                if let Some(param) = &handler.param {
                    self.binding(param);
                }
            }
            StmtKind::Import(import) => {
                for specifier in &import.specifiers {
                    self.names.reserve(specifier.local());
                    if let ImportSpecifier::Named { imported, .. } = specifier {
                        self.names.reserve(imported);
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn enter_expr(&mut self, expr: &mut Expr, _path: &AstPath) -> Option<Expr> {
        match &expr.kind {
            ExprKind::Ident(name) => self.names.reserve(name),
            ExprKind::Class(class) => {
                if let Some(name) = &class.name {
                    self.names.reserve(name);
                }
            }
            _ => {}
        }
        None
    }

    fn enter_function(&mut self, function: &mut Function, _path: &AstPath) -> Option<Function> {
        if let Some(name) = &function.name {
            self.names.reserve(name);
        }
        for param in &function.params {
            self.binding(&param.binding);
        }
        None
    }

    fn enter_arrow(&mut self, arrow: &mut ArrowFunction, _path: &AstPath) -> Option<ArrowFunction> {
        for param in &arrow.params {
            self.binding(&param.binding);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_parser::{parse, ParserOptions};

    #[test]
    fn test_allocate_skips_taken_names() {
        let mut idents = Identifiers::new();
        idents.reserve("_m1");
        idents.reserve("_m3");
        assert_eq!(idents.allocate("m"), "_m2");
        assert_eq!(idents.allocate("m"), "_m4");
        assert_eq!(idents.allocate("i"), "_i1");
        assert!(idents.contains("_m4"));
    }

    #[test]
    fn test_collect_declared_and_referenced_names() {
        let mut program = parse(
            "import d, { a as b } from './x';\n\
             const { c, e: [f] } = g;\n\
             function h(i, ...j) { try { k(); } catch (l) {} }\n\
             for (let m of n) (o) => p;\n\
             x = class Q {};",
            ParserOptions::default(),
        )
        .unwrap();
        let mut idents = Identifiers::new();
        idents.collect(&mut program);
        for name in ["d", "a", "b", "c", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "x", "Q"] {
            assert!(idents.contains(name), "missing {name}");
        }
        assert!(!idents.contains("e"), "property keys are not names");
    }

    #[test]
    fn test_module_identifiers_are_stable() {
        let mut idents = Identifiers::new();
        let mut modules = ModuleIdentifiers::new();
        let a = modules.get_or_allocate(Path::new("/a.js"), &mut idents);
        let b = modules.get_or_allocate(Path::new("/b.js"), &mut idents);
        assert_ne!(a, b);
        assert_eq!(modules.get_or_allocate(Path::new("/a.js"), &mut idents), a);
        assert_eq!(modules.get(Path::new("/b.js")), Some(b.as_str()));
    }
}
