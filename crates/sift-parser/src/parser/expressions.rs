//! Expressions.
//!
//! `parse_expression` parses a primary and hands it to `reparse`, which
//! looks at the lexeme after the node and either extends the node (member
//! access, calls, operators) or stops. Each operator combinator asks
//! `lower_precedence` first and hands the operator back if it must yield to
//! the operator whose operand is being parsed.

use super::{is_reserved, Context, FunctionFlags, Hint, Operator, Parser};
use crate::ast::*;
use crate::error::{ParseError, SyntaxErrorKind};
use crate::span::Span;

/// Outcome of an operator combinator.
enum Step {
    /// The node grew; keep going.
    More(Expr),
    /// The operator belongs to an outer expression.
    Yield(Expr),
}

impl<'a> Parser<'a> {
    /// Parse an expression, commas included where the context allows them.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let (node, hint) = self.parse_primary()?;
        self.reparse(node, hint)
    }

    /// Parse an expression that stops at a `,`: list items, initialisers,
    /// arrow bodies.
    pub(crate) fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let mut p = self.push_operator(Operator::Assign);
        p.parse_expression()
    }

    /// Extend `node` with whatever follows it.
    pub(crate) fn reparse(&mut self, mut node: Expr, mut hint: Hint) -> Result<Expr, ParseError> {
        let mut chain = false;
        loop {
            let trivia = self.scanner.trivia();
            let rest = &self.scanner.source()[trivia.end..];
            let Some(first) = rest.chars().next() else { break };
            let punct = self.scanner.peek_punctuator();

            // Member and call links
            match punct {
                Some(".") => {
                    node = self.parse_dot_member(node, false)?;
                    hint = Hint::None;
                    continue;
                }
                Some("?.") => {
                    node = self.parse_optional_link(node)?;
                    hint = Hint::None;
                    chain = true;
                    continue;
                }
                Some("[") => {
                    node = self.parse_computed_member(node)?;
                    hint = Hint::None;
                    continue;
                }
                Some("(") => {
                    if self.operators.last() == Some(&Operator::New) {
                        break;
                    }
                    let args = self.parse_arguments()?;
                    let span = Span::new(node.span.start, self.scanner.pos() as u32);
                    node = Expr::new(ExprKind::Call { callee: Box::new(node), args }, span);
                    hint = Hint::None;
                    continue;
                }
                _ if first == '`' => {
                    if trivia.newline {
                        break;
                    }
                    let quasi = self.parse_template()?;
                    let span = Span::new(node.span.start, self.scanner.pos() as u32);
                    node = Expr::new(
                        ExprKind::TaggedTemplate { tag: Box::new(node), quasi: Box::new(quasi) },
                        span,
                    );
                    hint = Hint::None;
                    continue;
                }
                _ => {}
            }

            if chain {
                let span = node.span;
                node = Expr::new(ExprKind::Chain(Box::new(node)), span);
                chain = false;
            }

            let step = match punct {
                Some(op @ ("++" | "--")) => {
                    if trivia.newline {
                        break;
                    }
                    self.parse_postfix(node, op)?
                }
                Some("=>") => self.parse_arrow(node, hint)?,
                Some("?") => self.parse_conditional(node)?,
                Some(",") => {
                    if self.comma_is_separator() {
                        break;
                    }
                    self.parse_sequence(node)?
                }
                Some(op) if assign_operator(op).is_some() => self.parse_assign(node, op)?,
                Some(op) if logical_operator(op).is_some() => self.parse_logical(node, hint, op)?,
                Some(op) if binary_operator(op).is_some() => self.parse_binary(node, op)?,
                Some("{") => self.unexpected_after(node, trivia.newline)?,
                Some(_) => Step::Yield(node),
                None => match self.scanner.peek_word() {
                    Some("in") if !self.in_for_init() => self.parse_binary(node, "in")?,
                    Some("instanceof") => self.parse_binary(node, "instanceof")?,
                    Some(_) => self.unexpected_after(node, trivia.newline)?,
                    None if matches!(first, '"' | '\'' | '0'..='9') => {
                        self.unexpected_after(node, trivia.newline)?
                    }
                    None => Step::Yield(node),
                },
            };
            match step {
                Step::More(grown) => {
                    node = grown;
                    hint = Hint::None;
                }
                Step::Yield(done) => return Ok(done),
            }
        }
        if chain {
            let span = node.span;
            node = Expr::new(ExprKind::Chain(Box::new(node)), span);
        }
        Ok(node)
    }

    /// A word, literal or `{` right after a complete expression. A line
    /// break ends the expression; on the same line it is an error, except
    /// where the enclosing construct continues with it.
    fn unexpected_after(&self, node: Expr, newline: bool) -> Result<Step, ParseError> {
        if newline || matches!(self.context(), Context::ForParams | Context::Heritage) {
            return Ok(Step::Yield(node));
        }
        Err(self.error(SyntaxErrorKind::UnexpectedKeywordOrIdentifier))
    }

    // =========================================================================
    // Operator combinators
    // =========================================================================

    fn parse_binary(&mut self, left: Expr, text: &'static str) -> Result<Step, ParseError> {
        let Some(op) = binary_operator(text) else {
            return Ok(Step::Yield(left));
        };
        self.swallow(text);
        if self.lower_precedence(Operator::Binary(op)) {
            self.recede();
            return Ok(Step::Yield(left));
        }
        self.digest();
        let right = {
            let mut p = self.push_operator(Operator::Binary(op));
            p.parse_expression()?
        };
        let span = left.span.merge(right.span);
        Ok(Step::More(Expr::new(
            ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
            span,
        )))
    }

    fn parse_logical(&mut self, left: Expr, hint: Hint, text: &'static str) -> Result<Step, ParseError> {
        let Some(op) = logical_operator(text) else {
            return Ok(Step::Yield(left));
        };
        if mixes_nullish(op, &left, hint, self.operators.last()) {
            return Err(self.error(SyntaxErrorKind::UnexpectedToken(text.into())));
        }
        self.swallow(text);
        if self.lower_precedence(Operator::Logical(op)) {
            self.recede();
            return Ok(Step::Yield(left));
        }
        self.digest();
        let right = {
            let mut p = self.push_operator(Operator::Logical(op));
            p.parse_expression()?
        };
        let span = left.span.merge(right.span);
        Ok(Step::More(Expr::new(
            ExprKind::Logical { op, left: Box::new(left), right: Box::new(right) },
            span,
        )))
    }

    fn parse_assign(&mut self, left: Expr, text: &'static str) -> Result<Step, ParseError> {
        let Some(op) = assign_operator(text) else {
            return Ok(Step::Yield(left));
        };
        self.swallow(text);
        if self.lower_precedence(Operator::Assign) {
            self.recede();
            return Ok(Step::Yield(left));
        }
        self.digest();
        let valid = match &left.kind {
            ExprKind::Ident(_) | ExprKind::Member { .. } => true,
            ExprKind::Array(_) | ExprKind::Object(_) => op == AssignOp::Assign,
            _ => false,
        };
        if !valid {
            return Err(ParseError::at(SyntaxErrorKind::InvalidLhsAssign, left.span.start as usize));
        }
        let right = {
            let mut p = self.push_operator(Operator::Assign);
            p.parse_expression()?
        };
        let span = left.span.merge(right.span);
        Ok(Step::More(Expr::new(
            ExprKind::Assign { op, left: Box::new(left), right: Box::new(right) },
            span,
        )))
    }

    fn parse_conditional(&mut self, test: Expr) -> Result<Step, ParseError> {
        self.swallow("?");
        if self.lower_precedence(Operator::Conditional) {
            self.recede();
            return Ok(Step::Yield(test));
        }
        self.digest();
        let consequent = {
            let mut p = self.push_operator(Operator::Assign);
            p.parse_expression()?
        };
        self.expect(":")?;
        let alternate = {
            let mut p = self.push_operator(Operator::Conditional);
            p.parse_expression()?
        };
        let span = test.span.merge(alternate.span);
        Ok(Step::More(Expr::new(
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        )))
    }

    fn parse_sequence(&mut self, left: Expr) -> Result<Step, ParseError> {
        self.swallow(",");
        if self.lower_precedence(Operator::Sequence) {
            self.recede();
            return Ok(Step::Yield(left));
        }
        self.digest();
        if *self.context() == Context::Expression && self.scanner.at(")") {
            self.dangling_comma = Some(self.scanner.pos() - 1);
            return Ok(Step::Yield(left));
        }
        let right = {
            let mut p = self.push_operator(Operator::Sequence);
            p.parse_expression()?
        };
        let span = left.span.merge(right.span);
        let mut items = match left.kind {
            ExprKind::Sequence(items) => items,
            _ => vec![left],
        };
        items.push(right);
        Ok(Step::More(Expr::new(ExprKind::Sequence(items), span)))
    }

    fn parse_postfix(&mut self, arg: Expr, text: &'static str) -> Result<Step, ParseError> {
        if !matches!(arg.kind, ExprKind::Ident(_) | ExprKind::Member { .. }) {
            return Err(self.error(SyntaxErrorKind::InvalidLhsPostfix));
        }
        self.scanner.eat(text);
        let op = if text == "++" { UpdateOp::Increment } else { UpdateOp::Decrement };
        let span = Span::new(arg.span.start, self.scanner.pos() as u32);
        Ok(Step::More(Expr::new(
            ExprKind::Update { op, prefix: false, arg: Box::new(arg) },
            span,
        )))
    }

    fn parse_arrow(&mut self, node: Expr, hint: Hint) -> Result<Step, ParseError> {
        self.swallow("=>");
        if self.lower_precedence(Operator::Assign) {
            self.recede();
            return Ok(Step::Yield(node));
        }
        if !matches!(node.kind, ExprKind::Ident(_)) && hint != Hint::Group {
            self.recede();
            return Err(self.error(SyntaxErrorKind::UnexpectedToken("=>".into())));
        }
        self.digest();
        let start = node.span.start;
        let params = self.exprs_to_params(node)?;
        let arrow = self.parse_arrow_body(params, false, start)?;
        Ok(Step::More(arrow))
    }

    // =========================================================================
    // Member access
    // =========================================================================

    fn parse_dot_member(&mut self, object: Expr, optional: bool) -> Result<Expr, ParseError> {
        if !optional {
            self.scanner.eat(".");
        }
        let property = self.parse_member_name()?;
        let span = Span::new(object.span.start, self.scanner.pos() as u32);
        let (object, property) = (Box::new(object), Box::new(property));
        let kind = if optional {
            ExprKind::OptionalMember { object, property, computed: false }
        } else {
            ExprKind::Member { object, property, computed: false }
        };
        Ok(Expr::new(kind, span))
    }

    /// Name after `.` or `?.`: an identifier name or a private name.
    fn parse_member_name(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        if self.scanner.at("#") {
            if !self.contexts.contains(&Context::ClassBody) {
                return Err(self.error(SyntaxErrorKind::IllegalPrivateIdentifier));
            }
            self.scanner.eat("#");
            let name = self.identifier_name()?;
            return Ok(Expr::new(ExprKind::PrivateName(name), self.span_from(start)));
        }
        let name = self.identifier_name()?;
        Ok(Expr::new(ExprKind::Ident(name), self.span_from(start)))
    }

    fn parse_computed_member(&mut self, object: Expr) -> Result<Expr, ParseError> {
        let property = self.parse_bracketed()?;
        let span = Span::new(object.span.start, self.scanner.pos() as u32);
        Ok(Expr::new(
            ExprKind::Member { object: Box::new(object), property: Box::new(property), computed: true },
            span,
        ))
    }

    /// `[ expr ]` after an object.
    fn parse_bracketed(&mut self) -> Result<Expr, ParseError> {
        self.open("[")?;
        let start = self.scanner.pos();
        let items = self.group(Context::Expression)?;
        items
            .into_iter()
            .find_map(|item| match item {
                super::Item::Expr(expr) => expr,
                _ => None,
            })
            .ok_or_else(|| ParseError::at(SyntaxErrorKind::ExpressionExpected, start))
    }

    /// `?.name`, `?.[expr]` or `?.(args)`
    fn parse_optional_link(&mut self, object: Expr) -> Result<Expr, ParseError> {
        self.scanner.eat("?.");
        let start = object.span.start;
        if self.scanner.at("(") {
            let args = self.parse_arguments()?;
            return Ok(Expr::new(
                ExprKind::OptionalCall { callee: Box::new(object), args },
                Span::new(start, self.scanner.pos() as u32),
            ));
        }
        if self.scanner.at("[") {
            let property = self.parse_bracketed()?;
            return Ok(Expr::new(
                ExprKind::OptionalMember { object: Box::new(object), property: Box::new(property), computed: true },
                Span::new(start, self.scanner.pos() as u32),
            ));
        }
        self.parse_dot_member(object, true)
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    /// Parse the expression that starts at the cursor, before any operator.
    pub(crate) fn parse_primary(&mut self) -> Result<(Expr, Hint), ParseError> {
        if self.scanner.at_end() {
            return Err(self.error(SyntaxErrorKind::Abrupt));
        }
        let start = self.start();
        let rest = self.scanner.rest();
        let first = rest.chars().next().unwrap_or(' ');
        let second = rest[first.len_utf8()..].chars().next();

        #[cfg(feature = "jsx")]
        if first == '<' && self.options.jsx {
            return Ok((self.parse_jsx()?, Hint::None));
        }

        let expr = match first {
            '"' | '\'' => {
                self.scanner.skip_trivia();
                let value = self.scanner.string().map_err(|kind| ParseError::at(kind, start as usize))?;
                Expr::new(ExprKind::String(value), self.span_from(start))
            }
            '`' => {
                let template = self.parse_template()?;
                Expr::new(ExprKind::Template(Box::new(template)), self.span_from(start))
            }
            '0'..='9' => self.parse_number(start)?,
            '.' if second.is_some_and(|c| c.is_ascii_digit()) => self.parse_number(start)?,
            '/' => {
                self.scanner.skip_trivia();
                let (pattern, flags) = self.scanner.regex().map_err(|kind| ParseError::at(kind, start as usize))?;
                Expr::new(ExprKind::Regex { pattern, flags }, self.span_from(start))
            }
            '(' => return Ok((self.parse_parenthesized()?, Hint::Group)),
            '[' => self.parse_array_literal()?,
            '{' => self.parse_object_literal()?,
            '#' => {
                // `#x in obj`
                if !self.contexts.contains(&Context::ClassBody) {
                    return Err(self.error(SyntaxErrorKind::IllegalPrivateIdentifier));
                }
                self.scanner.eat("#");
                let name = self.identifier_name()?;
                Expr::new(ExprKind::PrivateName(name), self.span_from(start))
            }
            _ => match self.scanner.peek_punctuator() {
                Some(op @ ("++" | "--")) => self.parse_prefix_update(op, start)?,
                Some(op @ ("!" | "~" | "+" | "-")) => {
                    self.scanner.eat(op);
                    let op = match op {
                        "!" => UnaryOp::Not,
                        "~" => UnaryOp::BitNot,
                        "+" => UnaryOp::Plus,
                        _ => UnaryOp::Minus,
                    };
                    self.parse_unary(op, start)?
                }
                Some("...") if *self.context() == Context::Expression => {
                    self.scanner.eat("...");
                    let arg = self.parse_assignment()?;
                    Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(start))
                }
                Some(_) => return Err(self.primary_error()),
                None if self.scanner.at_identifier() => return self.parse_word(start),
                None => return Err(self.unexpected()),
            },
        };
        Ok((expr, Hint::None))
    }

    /// Error for a punctuator that cannot start an expression.
    fn primary_error(&self) -> ParseError {
        match self.scanner.peek_punctuator() {
            Some(")" | "]" | "}" | ";" | "," | ":") => self.error(SyntaxErrorKind::ExpressionExpected),
            _ => self.unexpected(),
        }
    }

    fn parse_number(&mut self, start: u32) -> Result<Expr, ParseError> {
        self.scanner.skip_trivia();
        let (value, bigint) = self
            .scanner
            .number()
            .map_err(|kind| ParseError::at(kind, self.scanner.pos()))?;
        let kind = match bigint {
            Some(digits) => ExprKind::BigInt(digits),
            None => ExprKind::Number(value),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    /// Expressions introduced by a word: keywords and identifiers.
    fn parse_word(&mut self, start: u32) -> Result<(Expr, Hint), ParseError> {
        let word = self.scanner.peek_word().unwrap_or_default();
        let simple = |kind| Ok((Expr::new(kind, Span::new(start, start + word.len() as u32)), Hint::None));
        let expr = match word {
            "this" | "super" | "null" | "true" | "false" => {
                self.scanner.match_keyword(word);
                return simple(match word {
                    "this" => ExprKind::This,
                    "super" => ExprKind::Super,
                    "null" => ExprKind::Null,
                    "true" => ExprKind::Bool(true),
                    _ => ExprKind::Bool(false),
                });
            }
            "function" => {
                self.scanner.match_keyword("function");
                let func = self.parse_function(false, start)?;
                Expr::new(ExprKind::Function(Box::new(func)), self.span_from(start))
            }
            "class" => {
                self.scanner.match_keyword("class");
                let class = self.parse_class(start, false)?;
                Expr::new(ExprKind::Class(Box::new(class)), self.span_from(start))
            }
            "async" => return self.parse_async(start),
            "new" => {
                self.scanner.match_keyword("new");
                self.parse_new(start)?
            }
            "typeof" | "void" | "delete" => {
                self.scanner.match_keyword(word);
                let op = match word {
                    "typeof" => UnaryOp::Typeof,
                    "void" => UnaryOp::Void,
                    _ => UnaryOp::Delete,
                };
                self.parse_unary(op, start)?
            }
            "await" if self.await_allowed() => {
                self.scanner.match_keyword("await");
                let arg = {
                    let mut p = self.push_operator(Operator::Unary);
                    p.parse_expression()?
                };
                Expr::new(ExprKind::Await(Box::new(arg)), self.span_from(start))
            }
            "yield" if self.function_flags().is_some_and(|f| f.is_generator) => {
                self.scanner.match_keyword("yield");
                self.parse_yield(start)?
            }
            "import" => {
                self.scanner.match_keyword("import");
                self.parse_import_expression(start)?
            }
            word if is_reserved(word) => {
                return Err(self.error(SyntaxErrorKind::UnexpectedToken(word.to_string())));
            }
            _ => {
                let name = self.identifier_name()?;
                Expr::new(ExprKind::Ident(name), self.span_from(start))
            }
        };
        Ok((expr, Hint::None))
    }

    fn parse_unary(&mut self, op: UnaryOp, start: u32) -> Result<Expr, ParseError> {
        let arg = {
            let mut p = self.push_operator(Operator::Unary);
            p.parse_expression()?
        };
        Ok(Expr::new(ExprKind::Unary { op, arg: Box::new(arg) }, self.span_from(start)))
    }

    fn parse_prefix_update(&mut self, text: &'static str, start: u32) -> Result<Expr, ParseError> {
        self.scanner.eat(text);
        let arg = {
            let mut p = self.push_operator(Operator::Unary);
            p.parse_expression()?
        };
        if !matches!(arg.kind, ExprKind::Ident(_) | ExprKind::Member { .. }) {
            return Err(ParseError::at(SyntaxErrorKind::InvalidLhsPrefix, start as usize));
        }
        let op = if text == "++" { UpdateOp::Increment } else { UpdateOp::Decrement };
        Ok(Expr::new(
            ExprKind::Update { op, prefix: true, arg: Box::new(arg) },
            self.span_from(start),
        ))
    }

    fn parse_yield(&mut self, start: u32) -> Result<Expr, ParseError> {
        let delegate = !self.scanner.newline_ahead() && self.scanner.eat("*");
        let ends = self.scanner.newline_ahead()
            || self.scanner.at_end()
            || matches!(
                self.scanner.peek_punctuator(),
                Some(")" | "]" | "}" | "," | ";" | ":")
            );
        let arg = if ends && !delegate {
            None
        } else {
            Some(Box::new(self.parse_assignment()?))
        };
        Ok(Expr::new(ExprKind::Yield { arg, delegate }, self.span_from(start)))
    }

    /// `new.target`, `new Callee`, `new Callee(args)`
    fn parse_new(&mut self, start: u32) -> Result<Expr, ParseError> {
        if self.scanner.eat(".") {
            let property = self.identifier_name()?;
            if property != "target" {
                return Err(ParseError::at(
                    SyntaxErrorKind::InvalidNewMetaProperty(property),
                    start as usize,
                ));
            }
            return Ok(Expr::new(
                ExprKind::MetaProperty { meta: "new".into(), property },
                self.span_from(start),
            ));
        }
        let callee = {
            let mut p = self.enter(Context::New);
            p.operators.push(Operator::New);
            p.parse_expression()?
        };
        let args = if self.scanner.at("(") { self.parse_arguments()? } else { Vec::new() };
        Ok(Expr::new(
            ExprKind::New { callee: Box::new(callee), args },
            self.span_from(start),
        ))
    }

    /// `import(x)` and `import.meta`
    fn parse_import_expression(&mut self, start: u32) -> Result<Expr, ParseError> {
        if self.scanner.eat(".") {
            let property = self.identifier_name()?;
            return Ok(Expr::new(
                ExprKind::MetaProperty { meta: "import".into(), property },
                self.span_from(start),
            ));
        }
        if !self.scanner.at("(") {
            return Err(ParseError::at(SyntaxErrorKind::IllegalImport, start as usize));
        }
        let mut args = self.parse_arguments()?;
        if args.is_empty() {
            return Err(self.error(SyntaxErrorKind::ExpressionExpected));
        }
        let source = args.swap_remove(0);
        Ok(Expr::new(ExprKind::Import(Box::new(source)), self.span_from(start)))
    }

    /// `async function`, `async x => …`, `async (…) => …`, or a plain
    /// reference/call to something named `async`.
    fn parse_async(&mut self, start: u32) -> Result<(Expr, Hint), ParseError> {
        self.scanner.match_keyword("async");
        let newline = self.scanner.newline_ahead();
        if !newline && self.scanner.match_keyword("function") {
            let func = self.parse_function(true, start)?;
            return Ok((Expr::new(ExprKind::Function(Box::new(func)), self.span_from(start)), Hint::None));
        }
        if !newline && self.at_binding_identifier() {
            let save = self.scanner.pos();
            let param_start = self.start();
            let name = self.identifier_name()?;
            if self.scanner.eat("=>") {
                let param = Expr::new(ExprKind::Ident(name), self.span_from(param_start));
                let params = self.exprs_to_params(param)?;
                return Ok((self.parse_arrow_body(params, true, start)?, Hint::None));
            }
            self.scanner.backtrack(save);
        }
        if !newline && self.scanner.at("(") {
            let args = self.parse_arguments()?;
            if self.scanner.eat("=>") {
                let group = Expr::new(ExprKind::Sequence(args), self.span_from(start));
                let params = self.exprs_to_params(group)?;
                return Ok((self.parse_arrow_body(params, true, start)?, Hint::None));
            }
            let callee = Expr::new(ExprKind::Ident("async".into()), Span::new(start, start + 5));
            return Ok((
                Expr::new(ExprKind::Call { callee: Box::new(callee), args }, self.span_from(start)),
                Hint::None,
            ));
        }
        Ok((Expr::new(ExprKind::Ident("async".into()), self.span_from(start)), Hint::None))
    }

    /// Body after `=>`. The arrow itself has been consumed.
    pub(crate) fn parse_arrow_body(
        &mut self,
        params: Vec<Param>,
        is_async: bool,
        start: u32,
    ) -> Result<Expr, ParseError> {
        let flags = FunctionFlags { is_async, is_generator: false };
        let body = if self.scanner.at("{") {
            ArrowBody::Block(self.parse_function_body(flags)?)
        } else {
            let mut p = self.enter(Context::Function(flags));
            p.operators.push(Operator::Assign);
            ArrowBody::Expr(Box::new(p.parse_expression()?))
        };
        let span = self.span_from(start);
        Ok(Expr::new(
            ExprKind::Arrow(Box::new(ArrowFunction { params, body, is_async, span })),
            span,
        ))
    }

    /// Template body starting at the backquote.
    pub(crate) fn parse_template(&mut self) -> Result<Template, ParseError> {
        self.scanner.skip_trivia();
        let start = self.scanner.pos();
        self.scanner.bump();
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        loop {
            let (raw, cooked, done) = self
                .scanner
                .template_chunk()
                .map_err(|kind| ParseError::at(kind, start))?;
            quasis.push(TemplateElement { raw, cooked });
            if done {
                break;
            }
            let expr = {
                let mut p = self.isolate(Context::Expression);
                let expr = p.parse_expression()?;
                if !p.scanner.eat("}") {
                    return Err(p.error(SyntaxErrorKind::Expected("}")));
                }
                expr
            };
            exprs.push(expr);
        }
        Ok(Template { quasis, exprs })
    }
}

pub(crate) fn binary_operator(text: &str) -> Option<BinaryOp> {
    use BinaryOp::*;
    Some(match text {
        "+" => Add,
        "-" => Sub,
        "*" => Mul,
        "/" => Div,
        "%" => Mod,
        "**" => Pow,
        "==" => Eq,
        "!=" => NotEq,
        "===" => StrictEq,
        "!==" => StrictNotEq,
        "<" => Lt,
        "<=" => LtEq,
        ">" => Gt,
        ">=" => GtEq,
        "|" => BitOr,
        "^" => BitXor,
        "&" => BitAnd,
        "<<" => Shl,
        ">>" => Shr,
        ">>>" => UShr,
        "in" => In,
        "instanceof" => Instanceof,
        _ => return None,
    })
}

pub(crate) fn logical_operator(text: &str) -> Option<LogicalOp> {
    match text {
        "&&" => Some(LogicalOp::And),
        "||" => Some(LogicalOp::Or),
        "??" => Some(LogicalOp::NullishCoalesce),
        _ => None,
    }
}

pub(crate) fn assign_operator(text: &str) -> Option<AssignOp> {
    use AssignOp::*;
    Some(match text {
        "=" => Assign,
        "+=" => AddAssign,
        "-=" => SubAssign,
        "*=" => MulAssign,
        "/=" => DivAssign,
        "%=" => ModAssign,
        "**=" => PowAssign,
        "<<=" => ShlAssign,
        ">>=" => ShrAssign,
        ">>>=" => UShrAssign,
        "|=" => BitOrAssign,
        "^=" => BitXorAssign,
        "&=" => BitAndAssign,
        "&&=" => AndAssign,
        "||=" => OrAssign,
        "??=" => NullishAssign,
        _ => return None,
    })
}

/// `??` cannot share an unparenthesised operand with `||` or `&&`.
fn mixes_nullish(op: LogicalOp, left: &Expr, hint: Hint, top: Option<&Operator>) -> bool {
    let nullish = |op: LogicalOp| op == LogicalOp::NullishCoalesce;
    if let Some(Operator::Logical(outer)) = top {
        if nullish(op) != nullish(*outer) {
            return true;
        }
    }
    match &left.kind {
        ExprKind::Logical { op: inner, .. } if hint != Hint::Group => nullish(op) != nullish(*inner),
        _ => false,
    }
}
