//! Statements.

use super::{is_reserved, Context, Parser};
use crate::ast::*;
use crate::error::{ParseError, SyntaxErrorKind};

impl<'a> Parser<'a> {
    /// Parse a statement in a statement-holding context.
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.start();
        if self.scanner.at_end() {
            return Err(self.error(SyntaxErrorKind::Abrupt));
        }
        if self.scanner.eat(";") {
            return Ok(Stmt::new(StmtKind::Empty, self.span_from(start)));
        }
        if self.scanner.at("{") {
            let body = self.parse_block(Context::Block)?;
            return Ok(Stmt::new(StmtKind::Block(body), self.span_from(start)));
        }

        let kind = match self.scanner.peek_word() {
            Some("var") => self.parse_var_statement(VarKind::Var)?,
            Some("const") => self.parse_var_statement(VarKind::Const)?,
            Some("let") if self.let_starts_declaration() => self.parse_var_statement(VarKind::Let)?,
            Some("function") => {
                self.scanner.match_keyword("function");
                StmtKind::Function(Box::new(self.parse_function_declaration(false, start)?))
            }
            Some("async") if self.async_function_ahead() => {
                self.scanner.match_keyword("async");
                self.scanner.match_keyword("function");
                StmtKind::Function(Box::new(self.parse_function_declaration(true, start)?))
            }
            Some("class") => {
                self.scanner.match_keyword("class");
                StmtKind::Class(Box::new(self.parse_class(start, true)?))
            }
            Some("if") => self.parse_if()?,
            Some("for") => self.parse_for()?,
            Some("while") => self.parse_while()?,
            Some("do") => self.parse_do_while()?,
            Some("break") => self.parse_break()?,
            Some("continue") => self.parse_continue()?,
            Some("return") => self.parse_return()?,
            Some("throw") => self.parse_throw()?,
            Some("try") => self.parse_try()?,
            Some("switch") => self.parse_switch()?,
            Some("debugger") => {
                self.scanner.match_keyword("debugger");
                self.semicolon()?;
                StmtKind::Debugger
            }
            Some("else") => return Err(self.error(SyntaxErrorKind::IllegalElse)),
            Some("case" | "default") => return Err(self.error(SyntaxErrorKind::IllegalCase)),
            Some("import") if !self.import_expression_ahead() => self.parse_import_declaration()?,
            Some("export") => self.parse_export_declaration()?,
            Some(word) if !is_reserved(word) => match self.parse_labeled(word)? {
                Some(kind) => kind,
                None => self.parse_expression_statement()?,
            },
            _ => self.parse_expression_statement()?,
        };
        Ok(Stmt::new(kind, self.span_from(start)))
    }

    /// `let` followed by a binding starts a declaration; otherwise `let` is
    /// an identifier.
    fn let_starts_declaration(&mut self) -> bool {
        let save = self.scanner.pos();
        self.scanner.match_keyword("let");
        let declares = matches!(self.scanner.peek(), Some(b'[' | b'{')) || self.at_binding_identifier();
        self.scanner.backtrack(save);
        declares
    }

    fn async_function_ahead(&mut self) -> bool {
        let save = self.scanner.pos();
        self.scanner.match_keyword("async");
        let found = !self.scanner.newline_ahead() && self.scanner.at_keyword("function");
        self.scanner.backtrack(save);
        found
    }

    fn import_expression_ahead(&mut self) -> bool {
        let save = self.scanner.pos();
        self.scanner.match_keyword("import");
        let found = self.scanner.at("(") || self.scanner.at(".");
        self.scanner.backtrack(save);
        found
    }

    /// Function declaration after `function`; the name is required.
    pub(crate) fn parse_function_declaration(&mut self, is_async: bool, start: u32) -> Result<Function, ParseError> {
        let generator = self.scanner.at("*");
        let save = self.scanner.pos();
        if generator {
            self.scanner.eat("*");
        }
        if self.scanner.at("(") {
            return Err(self.error(SyntaxErrorKind::IdentifierExpected));
        }
        self.scanner.backtrack(save);
        self.parse_function(is_async, start)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_var_statement(&mut self, kind: VarKind) -> Result<StmtKind, ParseError> {
        self.scanner.match_keyword(kind.as_str());
        let decls = self.parse_declarators(kind, false)?;
        self.semicolon()?;
        Ok(StmtKind::Var { kind, decls })
    }

    /// Comma-separated declarators. In a for head an initialiser may be
    /// missing even for `const` (`for (const x of xs)`).
    pub(crate) fn parse_declarators(&mut self, kind: VarKind, in_for: bool) -> Result<Vec<VarDeclarator>, ParseError> {
        let mut p = self.enter(Context::Declaration);
        let mut decls = Vec::new();
        loop {
            let start = p.start();
            let binding = p.parse_binding()?;
            let init = if p.scanner.eat("=") {
                Some(p.parse_assignment()?)
            } else {
                None
            };
            if init.is_none() && kind == VarKind::Const && !in_for {
                return Err(p.error(SyntaxErrorKind::ConstInit));
            }
            decls.push(VarDeclarator { binding, init, span: p.span_from(start) });
            if !p.scanner.eat(",") {
                break;
            }
        }
        Ok(decls)
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_if(&mut self) -> Result<StmtKind, ParseError> {
        self.scanner.match_keyword("if");
        let test = self.parse_head()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.scanner.match_keyword("else") {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(StmtKind::If { test, consequent, alternate })
    }

    /// Loop body with the loop context pushed.
    fn parse_loop_body(&mut self) -> Result<Box<Stmt>, ParseError> {
        let mut p = self.enter(Context::Loop);
        Ok(Box::new(p.parse_statement()?))
    }

    fn parse_while(&mut self) -> Result<StmtKind, ParseError> {
        self.scanner.match_keyword("while");
        let test = self.parse_head()?;
        let body = self.parse_loop_body()?;
        Ok(StmtKind::While { test, body })
    }

    fn parse_do_while(&mut self) -> Result<StmtKind, ParseError> {
        self.scanner.match_keyword("do");
        let body = self.parse_loop_body()?;
        if !self.scanner.match_keyword("while") {
            return Err(self.error(SyntaxErrorKind::WhileExpected));
        }
        let test = self.parse_head()?;
        self.scanner.eat(";");
        Ok(StmtKind::DoWhile { body, test })
    }

    fn parse_for(&mut self) -> Result<StmtKind, ParseError> {
        self.scanner.match_keyword("for");
        let is_await = self.scanner.match_keyword("await");
        self.expect("(")?;

        let init = {
            let mut p = self.enter(Context::ForParams);
            p.parse_for_init()?
        };

        let init = match init {
            Some(left) if self.scanner.match_keyword("of") => {
                let right = self.parse_assignment()?;
                self.expect(")")?;
                let body = self.parse_loop_body()?;
                return Ok(StmtKind::ForOf { left, right, body, is_await });
            }
            Some(left) if self.scanner.match_keyword("in") => {
                let right = self.parse_expression()?;
                self.expect(")")?;
                let body = self.parse_loop_body()?;
                return Ok(StmtKind::ForIn { left, right, body });
            }
            other => other,
        };

        if let Some(ForInit::Var { kind: VarKind::Const, decls }) = &init {
            if let Some(decl) = decls.iter().find(|d| d.init.is_none()) {
                return Err(ParseError::at(SyntaxErrorKind::ConstInit, decl.span.end as usize));
            }
        }
        self.expect(";")?;
        let test = if self.scanner.at(";") { None } else { Some(self.parse_expression()?) };
        self.expect(";")?;
        let update = if self.scanner.at(")") { None } else { Some(self.parse_expression()?) };
        self.expect(")")?;
        let body = self.parse_loop_body()?;
        Ok(StmtKind::For { init, test, update, body })
    }

    fn parse_for_init(&mut self) -> Result<Option<ForInit>, ParseError> {
        if self.scanner.at(";") {
            return Ok(None);
        }
        let kind = match self.scanner.peek_word() {
            Some("var") => Some(VarKind::Var),
            Some("const") => Some(VarKind::Const),
            Some("let") if self.let_starts_declaration() => Some(VarKind::Let),
            _ => None,
        };
        if let Some(kind) = kind {
            self.scanner.match_keyword(kind.as_str());
            let decls = self.parse_declarators(kind, true)?;
            return Ok(Some(ForInit::Var { kind, decls }));
        }
        Ok(Some(ForInit::Expr(self.parse_expression()?)))
    }

    /// Optional label after `break`/`continue` on the same line.
    fn parse_jump_label(&mut self) -> Result<Option<String>, ParseError> {
        if !self.scanner.newline_ahead() && self.at_binding_identifier() {
            Ok(Some(self.identifier_name()?))
        } else {
            Ok(None)
        }
    }

    fn parse_break(&mut self) -> Result<StmtKind, ParseError> {
        let start = self.start();
        self.scanner.match_keyword("break");
        let label = self.parse_jump_label()?;
        let legal = match &label {
            Some(name) => self.in_function_scope(|c| matches!(c, Context::Label(l) if l == name)),
            None => self.in_function_scope(|c| matches!(c, Context::Loop | Context::Case | Context::SwitchBlock)),
        };
        if !legal {
            return Err(ParseError::at(SyntaxErrorKind::IllegalBreak, start as usize));
        }
        self.semicolon()?;
        Ok(StmtKind::Break { label })
    }

    fn parse_continue(&mut self) -> Result<StmtKind, ParseError> {
        let start = self.start();
        self.scanner.match_keyword("continue");
        let label = self.parse_jump_label()?;
        let legal = match &label {
            Some(name) => self.in_function_scope(|c| matches!(c, Context::Label(l) if l == name)),
            None => self.in_function_scope(|c| matches!(c, Context::Loop)),
        };
        if !legal {
            return Err(ParseError::at(SyntaxErrorKind::IllegalContinue, start as usize));
        }
        self.semicolon()?;
        Ok(StmtKind::Continue { label })
    }

    fn parse_return(&mut self) -> Result<StmtKind, ParseError> {
        let start = self.start();
        self.scanner.match_keyword("return");
        if self.function_flags().is_none() {
            return Err(ParseError::at(SyntaxErrorKind::IllegalReturn, start as usize));
        }
        let ends = self.scanner.newline_ahead()
            || self.scanner.at_end()
            || self.scanner.at(";")
            || self.scanner.at("}");
        let arg = if ends { None } else { Some(self.parse_expression()?) };
        self.semicolon()?;
        Ok(StmtKind::Return { arg })
    }

    fn parse_throw(&mut self) -> Result<StmtKind, ParseError> {
        self.scanner.match_keyword("throw");
        if self.scanner.newline_ahead() {
            return Err(self.error(SyntaxErrorKind::ExpressionExpected));
        }
        let arg = self.parse_expression()?;
        self.semicolon()?;
        Ok(StmtKind::Throw { arg })
    }

    fn parse_try(&mut self) -> Result<StmtKind, ParseError> {
        self.scanner.match_keyword("try");
        let block = self.parse_block(Context::Block)?;
        let handler = if self.scanner.at_keyword("catch") {
            let start = self.start();
            self.scanner.match_keyword("catch");
            let param = if self.scanner.eat("(") {
                let param = self.parse_binding()?;
                if self.scanner.at(",") {
                    return Err(self.error(SyntaxErrorKind::CatchNewParam));
                }
                if self.scanner.at("=") {
                    return Err(self.error(SyntaxErrorKind::CatchAssign));
                }
                self.expect(")")?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block(Context::Block)?;
            Some(CatchClause { param, body, span: self.span_from(start) })
        } else {
            None
        };
        let finalizer = if self.scanner.match_keyword("finally") {
            Some(self.parse_block(Context::Block)?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error(SyntaxErrorKind::Expected("catch")));
        }
        Ok(StmtKind::Try { block, handler, finalizer })
    }

    fn parse_switch(&mut self) -> Result<StmtKind, ParseError> {
        self.scanner.match_keyword("switch");
        let discriminant = self.parse_head()?;
        let cases = self.parse_switch_block()?;
        Ok(StmtKind::Switch { discriminant, cases })
    }

    /// `label: statement`, tried speculatively.
    fn parse_labeled(&mut self, word: &str) -> Result<Option<StmtKind>, ParseError> {
        let save = self.scanner.pos();
        let label = self.identifier_name()?;
        if label != word || !self.scanner.eat(":") {
            self.scanner.backtrack(save);
            return Ok(None);
        }
        let body = {
            let mut p = self.enter(Context::Label(label.clone()));
            Box::new(p.parse_statement()?)
        };
        Ok(Some(StmtKind::Labeled { label, body }))
    }

    fn parse_expression_statement(&mut self) -> Result<StmtKind, ParseError> {
        let expr = self.parse_expression()?;
        self.semicolon()?;
        Ok(StmtKind::Expr(expr))
    }
}
