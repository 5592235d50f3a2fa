//! `sift parse`: print the syntax tree of one file.

use super::report;
use miette::{IntoDiagnostic, Result};
use sift_core::Error;
use sift_parser::{parse, ParserOptions, SourceType};
use std::path::Path;

pub fn run(file: &Path, jsx: bool, script: bool) -> Result<()> {
    let source = std::fs::read_to_string(file).into_diagnostic()?;
    let source_type = if script { SourceType::Script } else { SourceType::Module };
    let options = ParserOptions::default().with_jsx(jsx).with_source_type(source_type);

    let program = parse(&source, options).map_err(|e| report(Error::syntax(file, &source, e)))?;
    tracing::debug!(statements = program.body.len(), "parsed");
    println!("{program:#?}");
    Ok(())
}
