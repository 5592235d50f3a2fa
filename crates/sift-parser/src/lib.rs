//! sift-parser: scannerless JavaScript/JSX parser, tree rewriting and code
//! generation.
//!
//! # Design Principles
//!
//! 1. **Everything is an Expression, Binding, or Statement**
//!    - Expressions: `foo(1)`, `a + b`, `x.y`
//!    - Bindings: `a`, `[a, b]`, `{x: y}`
//!    - Statements: `let a = 1;`, `if (x) {}`, `return x;`
//!
//! 2. **No token stream**
//!    - The parser matches fixed text at the cursor (`eat`, `match_keyword`)
//!    - Context decides what `/`, `<` or `{` means at each position
//!
//! 3. **Scoped parser state**
//!    - Context, operator and belly stacks are pushed through guards that
//!      restore them on every exit path, including errors
//!
//! 4. **Rewrite, then print**
//!    - [`transform::lower`] desugars modern syntax and JSX in one traversal
//!    - [`mangle::mangle`] shortens local names
//!    - [`generate`] prints formatted or minified source
//!
//! # Example
//!
//! ```
//! use sift_parser::{generate, parse, CodegenOptions, ParserOptions};
//!
//! let program = parse("const x = 1 + 2;", ParserOptions::default()).unwrap();
//! assert_eq!(generate(&program, &CodegenOptions::minify()), "const x=1+2;");
//! ```

mod ast;
mod codegen;
mod error;
pub mod mangle;
mod parser;
mod scanner;
mod span;
pub mod transform;
pub mod traverse;

pub use ast::*;
pub use codegen::{generate, Codegen, CodegenOptions};
pub use error::{ParseError, SyntaxErrorKind};
pub use mangle::{mangle, MangleOptions};
pub use parser::{Parser, ParserOptions};
pub use span::{Location, Span};
pub use transform::{lower, LoweringContext};
pub use traverse::{traverse, Path, Visitor};

/// Parse JavaScript/JSX source code into a [`Program`].
pub fn parse(source: &str, options: ParserOptions) -> Result<Program, ParseError> {
    Parser::new(source, options).parse()
}

/// Whether `name` can be written as a bare identifier (or property name).
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(scanner::is_id_start) && chars.all(scanner::is_id_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_names() {
        assert!(is_identifier_name("foo"));
        assert!(is_identifier_name("$_a1"));
        assert!(is_identifier_name("class"));
        assert!(!is_identifier_name(""));
        assert!(!is_identifier_name("1a"));
        assert!(!is_identifier_name("data-x"));
    }

    #[test]
    fn test_parse_lower_mangle_generate() {
        let mut program = parse(
            "function greet(name = `world`) { const { first } = name; return first ?? name; }",
            ParserOptions::default(),
        )
        .unwrap();
        lower(&mut program, &mut LoweringContext::default());
        mangle(&mut program, &MangleOptions::default());
        let output = generate(&program, &CodegenOptions::minify());
        assert!(!output.contains('`'), "{output}");
        assert!(!output.contains("??"), "{output}");
        assert!(output.starts_with("function greet(a){"), "{output}");

        // The output is itself valid input
        parse(&output, ParserOptions::default()).unwrap();
    }
}
