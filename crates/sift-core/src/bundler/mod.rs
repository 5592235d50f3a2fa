//! JavaScript/JSX bundler.
//!
//! Bundles a module graph into one self-invoking script.
//!
//! ## Usage
//!
//! ```no_run
//! use sift_core::bundler::Bundler;
//! use sift_core::config::BundleOptions;
//!
//! let output = Bundler::new(BundleOptions::default()).bundle("src/index.js".as_ref())?;
//! std::fs::write("build/index.bundle.js", output.code)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery** - Depth-first from the entry: classify, parse, resolve
//! 2. **Link** - Wrap each script as a lazily initialized module function
//! 3. **Lower** - Desugar the merged program in one pass
//! 4. **Emit** - Wrap in an IIFE, optionally mangle, generate

mod asset;
mod idents;
mod images;
mod module;
mod resolve;

pub use asset::{is_image_extension, Asset, AssetKind, Dependency};
pub use idents::{Identifiers, ModuleIdentifiers};
pub use images::{check_format, ImageNames};
pub use module::{dependency_specifiers, prepare_module, Target};
pub use resolve::{is_bare, Resolver};

use crate::config::BundleOptions;
use crate::error::{Error, Result};
use rustc_hash::FxHashMap as HashMap;
use sift_parser::transform::{jsx_factory, lower, LoweringContext};
use sift_parser::{
    generate, mangle, parse, CodegenOptions, Expr, ExprKind, Function, Location, MangleOptions,
    ParserOptions, Program, SourceType, Span, Stmt,
};
use std::path::{Path, PathBuf};

/// Result of one bundle run.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// The final tree: one IIFE statement.
    pub program: Program,
    /// Generated JavaScript.
    pub code: String,
    /// Stylesheets imported by the bundle, for the document to link.
    pub stylesheets: Vec<PathBuf>,
    /// `(output name, source path)` of every image.
    pub images: Vec<(String, PathBuf)>,
    /// Opaque files referenced by the bundle.
    pub files: Vec<PathBuf>,
    /// Scripts in the bundle, in discovery order.
    pub modules: Vec<PathBuf>,
}

/// Per-invocation state. Nothing is shared between bundle runs.
#[derive(Debug, Default)]
struct BundleState {
    assets: Vec<Asset>,
    index: HashMap<PathBuf, usize>,
    idents: Identifiers,
    modules: ModuleIdentifiers,
    images: ImageNames,
    stylesheets: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

impl BundleState {
    fn insert(&mut self, asset: Asset) {
        self.index.insert(asset.path.clone(), self.assets.len());
        self.assets.push(asset);
    }

    fn kind_of(&self, path: &Path) -> Option<AssetKind> {
        self.index.get(path).map(|&i| self.assets[i].kind)
    }

    /// What importing `path` links to.
    fn target(&mut self, path: &Path) -> Target {
        match self.kind_of(path) {
            Some(AssetKind::Script) => Target::Module(self.modules.get_or_allocate(path, &mut self.idents)),
            Some(AssetKind::Stylesheet) => Target::Stylesheet,
            Some(AssetKind::Image) => Target::File(self.images.name_for(path)),
            Some(AssetKind::Opaque) | None => Target::File(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
        }
    }
}

/// The bundler.
#[derive(Debug, Clone)]
pub struct Bundler {
    options: BundleOptions,
    resolver: Resolver,
}

impl Bundler {
    #[must_use]
    pub fn new(options: BundleOptions) -> Self {
        let resolver = Resolver::new(options.allow_jsx);
        Self { options, resolver }
    }

    #[must_use]
    pub fn options(&self) -> &BundleOptions {
        &self.options
    }

    /// Bundle the module graph rooted at `entry`.
    pub fn bundle(&self, entry: &Path) -> Result<BundleOutput> {
        let entry = dunce::canonicalize(entry).map_err(|_| Error::FileNotFound {
            path: entry.to_path_buf(),
        })?;
        let _span = tracing::debug_span!("bundle", entry = %entry.display()).entered();

        let mut state = BundleState::default();
        self.discover(&entry, &mut state)?;

        let factory = state.idents.allocate("h");
        let body = self.link(&entry, &mut state);

        let mut ctx = LoweringContext::new(state.idents.iter().map(str::to_string)).with_jsx_factory(&factory);
        let mut program = Program::new(body, SourceType::Module, Span::default());
        lower(&mut program, &mut ctx);
        if ctx.saw_jsx() {
            let stmt = jsx_factory(&factory).map_err(|e| Error::syntax(Path::new("<jsx factory>"), "", e))?;
            program.body.insert(0, stmt);
        }

        let mut program = wrap_in_iife(program);
        if self.options.minify {
            mangle(&mut program, &MangleOptions::default());
        }

        let codegen = CodegenOptions {
            format: self.options.format && !self.options.minify,
            indent: self.options.indent.clone(),
        };
        let code = generate(&program, &codegen);

        let modules: Vec<PathBuf> = state
            .assets
            .iter()
            .filter(|a| a.kind == AssetKind::Script)
            .map(|a| a.path.clone())
            .collect();
        tracing::info!(
            modules = modules.len(),
            stylesheets = state.stylesheets.len(),
            images = state.images.pairs().len(),
            bytes = code.len(),
            "bundled"
        );

        Ok(BundleOutput {
            program,
            code,
            stylesheets: state.stylesheets,
            images: state.images.into_pairs(),
            files: state.files,
            modules,
        })
    }

    /// Load every file reachable from `entry`, depth-first. A path is
    /// loaded at most once.
    fn discover(&self, entry: &Path, state: &mut BundleState) -> Result<()> {
        let mut stack = vec![entry.to_path_buf()];
        while let Some(path) = stack.pop() {
            if state.index.contains_key(&path) {
                continue;
            }
            let asset = self.load(path, state)?;
            let pending: Vec<PathBuf> = asset
                .dependencies
                .iter()
                .rev()
                .filter(|d| !state.index.contains_key(&d.path))
                .map(|d| d.path.clone())
                .collect();
            state.insert(asset);
            stack.extend(pending);
        }
        Ok(())
    }

    fn load(&self, path: PathBuf, state: &mut BundleState) -> Result<Asset> {
        let kind = AssetKind::classify(&path, &self.options);
        let _span = tracing::debug_span!("asset", path = %path.display(), kind = kind.as_str()).entered();

        match kind {
            AssetKind::Script => self.load_script(path, &mut state.idents),
            AssetKind::Stylesheet => {
                state.stylesheets.push(path.clone());
                Ok(Asset::leaf(path, kind))
            }
            AssetKind::Image => {
                if self.options.check_image_types {
                    check_format(&path)?;
                }
                state.images.name_for(&path);
                Ok(Asset::leaf(path, kind))
            }
            AssetKind::Opaque => {
                state.files.push(path.clone());
                Ok(Asset::leaf(path, kind))
            }
        }
    }

    /// Parse a script, reserve its names and resolve its imports.
    fn load_script(&self, path: PathBuf, idents: &mut Identifiers) -> Result<Asset> {
        let source = std::fs::read_to_string(&path)?;
        let jsx = self.options.allow_jsx
            || path.extension().is_some_and(|e| e.eq_ignore_ascii_case("jsx"));
        let options = ParserOptions::default().with_jsx(jsx);
        let mut program = parse(&source, options).map_err(|e| Error::syntax(&path, &source, e))?;
        idents.collect(&mut program);

        let mut dependencies = Vec::new();
        for (specifier, offset) in dependency_specifiers(&mut program) {
            let Some(resolved) = self.resolver.resolve(&specifier, &path) else {
                return Err(Error::ImportedModuleMissing {
                    specifier,
                    importer: path,
                    location: Location::locate(&source, offset),
                });
            };
            tracing::debug!(specifier = %specifier, resolved = %resolved.display(), "resolved import");
            dependencies.push(Dependency { specifier, path: resolved });
        }

        Ok(Asset {
            path,
            kind: AssetKind::Script,
            program: Some(program),
            dependencies,
        })
    }

    /// Wrap every script as a module function and call the entry.
    fn link(&self, entry: &Path, state: &mut BundleState) -> Vec<Stmt> {
        let mut body = Vec::new();
        for i in 0..state.assets.len() {
            let Some(program) = state.assets[i].program.take() else {
                continue;
            };
            let path = state.assets[i].path.clone();
            let dependencies = state.assets[i].dependencies.clone();

            let name = state.modules.get_or_allocate(&path, &mut state.idents);
            let targets: HashMap<String, Target> = dependencies
                .into_iter()
                .map(|dep| {
                    let target = state.target(&dep.path);
                    (dep.specifier, target)
                })
                .collect();
            tracing::trace!(module = %name, path = %path.display(), "linking module");
            body.extend(prepare_module(program, &name, &targets, &mut state.idents));
        }

        let entry_name = state.modules.get_or_allocate(entry, &mut state.idents);
        body.push(Stmt::expr(Expr::call(Expr::ident(entry_name), Vec::new())));
        body
    }
}

/// `(function () { ...body })();`
fn wrap_in_iife(program: Program) -> Program {
    let function = Function {
        name: None,
        params: Vec::new(),
        body: program.body,
        is_async: false,
        is_generator: false,
        span: program.span,
    };
    let callee = Expr::new(ExprKind::Function(Box::new(function)), program.span);
    Program::new(
        vec![Stmt::expr(Expr::call(callee, Vec::new()))],
        SourceType::Script,
        program.span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn minified() -> BundleOptions {
        BundleOptions::default().with_format(false)
    }

    #[test]
    fn test_single_module() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.js");
        write(&entry, "console.log('hi');");

        let output = Bundler::new(minified()).bundle(&entry).unwrap();
        assert_eq!(
            output.code,
            "(function(){var _i1=0,_x1={};function _m1(){if(_i1)return _x1;else _i1++;\
             console.log(\"hi\");return _x1}_m1()}());"
        );
        assert_eq!(output.modules.len(), 1);
    }

    #[test]
    fn test_generated_names_avoid_user_names() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.js");
        write(&entry, "var _m1 = 1, _i1 = 2; log(_m1 + _i1);");

        let output = Bundler::new(minified()).bundle(&entry).unwrap();
        assert!(output.code.contains("function _m2(){if(_i2)"), "{}", output.code);
    }

    #[test]
    fn test_missing_entry() {
        let dir = tempdir().unwrap();
        let err = Bundler::new(minified()).bundle(&dir.path().join("nope.js")).unwrap_err();
        assert_eq!(err.code(), "FILE_NON_EXISTENT");
    }

    #[test]
    fn test_temporaries_declared_at_bundle_scope() {
        let dir = tempdir().unwrap();
        let entry = dir.path().join("main.js");
        write(&entry, "import { v } from './dep'; log(f()?.x);");
        write(&dir.path().join("dep.js"), "export const v = g()?.y;");

        let output = Bundler::new(minified()).bundle(&entry).unwrap();
        assert!(output.code.starts_with("(function(){var _t1,_t2;"), "{}", output.code);
    }
}
