//! `sift generate`: parse one file and print it back, optionally lowered
//! and minified. No imports are followed.

use super::report;
use miette::{IntoDiagnostic, Result};
use sift_core::bundler::Identifiers;
use sift_core::Error;
use sift_parser::transform::{lower, LoweringContext};
use sift_parser::{generate, mangle, parse, CodegenOptions, MangleOptions, ParserOptions};
use std::path::Path;

pub fn run(file: &Path, indent: &str, minify: bool, jsx: bool, lower_syntax: bool) -> Result<()> {
    let source = std::fs::read_to_string(file).into_diagnostic()?;
    let options = ParserOptions::default().with_jsx(jsx);
    let mut program = parse(&source, options).map_err(|e| report(Error::syntax(file, &source, e)))?;

    if lower_syntax {
        let mut idents = Identifiers::new();
        idents.collect(&mut program);
        let mut ctx = LoweringContext::new(idents.iter().map(str::to_string));
        lower(&mut program, &mut ctx);
    }
    if minify {
        mangle(&mut program, &MangleOptions::default());
    }

    let codegen = CodegenOptions {
        format: !minify,
        indent: indent.to_string(),
    };
    println!("{}", generate(&program, &codegen));
    Ok(())
}
