//! Import and export declarations.

use super::{Context, Parser};
use crate::ast::*;
use crate::error::{ParseError, SyntaxErrorKind};
use crate::span::Span;

impl<'a> Parser<'a> {
    /// Module declarations are only legal at the top level of a module.
    fn check_module_item(&self, start: u32) -> Result<(), ParseError> {
        if self.options.source_type != SourceType::Module || self.contexts.len() > 1 {
            return Err(ParseError::at(SyntaxErrorKind::IllegalImport, start as usize));
        }
        Ok(())
    }

    pub(crate) fn parse_import_declaration(&mut self) -> Result<StmtKind, ParseError> {
        let start = self.start();
        self.check_module_item(start)?;
        self.scanner.match_keyword("import");

        let mut specifiers = Vec::new();
        let bare = matches!(self.scanner.peek(), Some(b'"' | b'\''));
        if !bare {
            // Default import
            if self.at_binding_identifier() {
                let spec_start = self.start();
                let local = self.binding_identifier()?;
                specifiers.push(ImportSpecifier::Default { local, span: self.span_from(spec_start) });
                if !self.scanner.eat(",") {
                    return self.finish_import(specifiers, true, start);
                }
            }
            // Namespace import: * as name
            if self.scanner.at("*") {
                let spec_start = self.start();
                self.scanner.eat("*");
                if !self.scanner.match_keyword("as") {
                    return Err(self.error(SyntaxErrorKind::Expected("as")));
                }
                let local = self.binding_identifier()?;
                specifiers.push(ImportSpecifier::Namespace { local, span: self.span_from(spec_start) });
            } else if self.scanner.at("{") {
                // Named imports: { a, b as c }
                self.open("{")?;
                for item in self.group(Context::Import)? {
                    if let super::Item::Import(spec) = item {
                        specifiers.push(spec);
                    }
                }
            } else {
                return Err(self.unexpected());
            }
        }
        self.finish_import(specifiers, !bare, start)
    }

    /// `from "source"` (unless the import is bare) and the statement end.
    fn finish_import(
        &mut self,
        specifiers: Vec<ImportSpecifier>,
        has_clause: bool,
        start: u32,
    ) -> Result<StmtKind, ParseError> {
        if has_clause && !self.scanner.match_keyword("from") {
            return Err(self.error(SyntaxErrorKind::Expected("from")));
        }
        let (source, source_span) = self.string_literal()?;
        self.skip_import_attributes()?;
        self.semicolon()?;
        Ok(StmtKind::Import(Box::new(ImportDecl {
            specifiers,
            source,
            source_span,
            span: self.span_from(start),
        })))
    }

    /// `with { type: "json" }` / `assert { … }` carry no meaning for bundling.
    fn skip_import_attributes(&mut self) -> Result<(), ParseError> {
        if self.scanner.newline_ahead() {
            return Ok(());
        }
        if self.scanner.at_keyword("with") || self.scanner.at_keyword("assert") {
            self.identifier_name()?;
            self.parse_object_literal()?;
        }
        Ok(())
    }

    /// `name`, `name as local`, `"string" as local`
    pub(crate) fn parse_import_specifier(&mut self) -> Result<ImportSpecifier, ParseError> {
        let start = self.start();
        let imported = self.module_export_name()?;
        let local = if self.scanner.match_keyword("as") {
            self.binding_identifier()?
        } else {
            imported.clone()
        };
        let span = self.span_from(start);
        self.separator("}")?;
        Ok(ImportSpecifier::Named { imported, local, span })
    }

    /// `local`, `local as exported`
    pub(crate) fn parse_export_specifier(&mut self) -> Result<ExportSpecifier, ParseError> {
        let start = self.start();
        let local = self.module_export_name()?;
        let exported = if self.scanner.match_keyword("as") {
            self.module_export_name()?
        } else {
            local.clone()
        };
        let span = self.span_from(start);
        self.separator("}")?;
        Ok(ExportSpecifier { local, exported, span })
    }

    /// Identifier name or string literal naming an export.
    fn module_export_name(&mut self) -> Result<String, ParseError> {
        if matches!(self.scanner.peek(), Some(b'"' | b'\'')) {
            return Ok(self.string_literal()?.0);
        }
        self.identifier_name()
    }

    pub(crate) fn parse_export_declaration(&mut self) -> Result<StmtKind, ParseError> {
        let start = self.start();
        self.check_module_item(start)?;
        self.scanner.match_keyword("export");

        // export * from "mod" / export * as ns from "mod"
        if self.scanner.eat("*") {
            let exported = if self.scanner.match_keyword("as") {
                Some(self.module_export_name()?)
            } else {
                None
            };
            if !self.scanner.match_keyword("from") {
                return Err(self.error(SyntaxErrorKind::Expected("from")));
            }
            let (source, source_span) = self.string_literal()?;
            self.skip_import_attributes()?;
            self.semicolon()?;
            return Ok(StmtKind::Export(Box::new(ExportDecl::All {
                exported,
                source,
                source_span,
                span: self.span_from(start),
            })));
        }

        // export { a, b as c } [from "mod"]
        if self.scanner.at("{") {
            self.open("{")?;
            let mut specifiers = Vec::new();
            for item in self.group(Context::Export)? {
                if let super::Item::Export(spec) = item {
                    specifiers.push(spec);
                }
            }
            let source = if self.scanner.match_keyword("from") {
                let source = self.string_literal()?;
                self.skip_import_attributes()?;
                Some(source)
            } else {
                None
            };
            self.semicolon()?;
            return Ok(StmtKind::Export(Box::new(ExportDecl::Named {
                specifiers,
                source,
                span: self.span_from(start),
            })));
        }

        // export default …
        if self.scanner.match_keyword("default") {
            let expr_start = self.start();
            let expr = match self.scanner.peek_word() {
                Some("function") => {
                    self.scanner.match_keyword("function");
                    let func = self.parse_function(false, expr_start)?;
                    Expr::new(ExprKind::Function(Box::new(func)), self.span_from(expr_start))
                }
                Some("async") if self.default_async_function_ahead() => {
                    self.scanner.match_keyword("async");
                    self.scanner.match_keyword("function");
                    let func = self.parse_function(true, expr_start)?;
                    Expr::new(ExprKind::Function(Box::new(func)), self.span_from(expr_start))
                }
                Some("class") => {
                    self.scanner.match_keyword("class");
                    let class = self.parse_class(expr_start, false)?;
                    Expr::new(ExprKind::Class(Box::new(class)), self.span_from(expr_start))
                }
                _ => {
                    let expr = self.parse_assignment()?;
                    self.semicolon()?;
                    expr
                }
            };
            return Ok(StmtKind::Export(Box::new(ExportDecl::Default {
                expr,
                span: self.span_from(start),
            })));
        }

        // export var/let/const/function/class
        let decl = self.parse_statement()?;
        match decl.kind {
            StmtKind::Var { .. } | StmtKind::Function(_) | StmtKind::Class(_) => {}
            _ => return Err(ParseError::at(SyntaxErrorKind::DeclarationExpected, decl.span.start as usize)),
        }
        Ok(StmtKind::Export(Box::new(ExportDecl::Decl {
            decl,
            span: Span::new(start, self.scanner.pos() as u32),
        })))
    }

    fn default_async_function_ahead(&mut self) -> bool {
        let save = self.scanner.pos();
        self.scanner.match_keyword("async");
        let found = !self.scanner.newline_ahead() && self.scanner.at_keyword("function");
        self.scanner.backtrack(save);
        found
    }
}
