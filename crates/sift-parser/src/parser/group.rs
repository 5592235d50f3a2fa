//! Delimited groups.
//!
//! `( … )`, `[ … ]` and `{ … }` are all parsed by [`Parser::group`]: the
//! opener is already in the belly, the context decides what each item looks
//! like, and the caller turns the items into the node for that context.

use super::{Context, FunctionFlags, Parser};
use crate::ast::*;
use crate::error::{ParseError, SyntaxErrorKind};
use crate::span::Span;

/// One item of a group.
pub(crate) enum Item {
    Stmt(Stmt),
    /// `None` marks an array hole.
    Expr(Option<Expr>),
    Property(Property),
    Member(ClassMember),
    Case(SwitchCase),
    Param(Param),
    Import(ImportSpecifier),
    Export(ExportSpecifier),
}

impl<'a> Parser<'a> {
    /// Parse items until the counterpart of the swallowed opener.
    pub(crate) fn group(&mut self, context: Context) -> Result<Vec<Item>, ParseError> {
        let closer = match self.belly.last().map(|s| s.text) {
            Some("(") => ")",
            Some("[") => "]",
            _ => "}",
        };
        let items = {
            let mut p = self.isolate(context);
            let mut items = Vec::new();
            loop {
                if p.scanner.eat(closer) {
                    break;
                }
                if p.scanner.at_end() {
                    return Err(p.error(SyntaxErrorKind::Expected(closer)));
                }
                items.push(p.statement()?);
            }
            items
        };
        self.digest();
        Ok(items)
    }

    /// Parse one group item according to the innermost context.
    pub(crate) fn statement(&mut self) -> Result<Item, ParseError> {
        match self.context().clone() {
            Context::Object => self.parse_property().map(Item::Property),
            Context::Array => self.parse_element().map(Item::Expr),
            Context::Call => self.parse_argument().map(|e| Item::Expr(Some(e))),
            Context::Parameters => self.parse_param().map(Item::Param),
            Context::ClassBody => self.parse_class_member().map(Item::Member),
            Context::SwitchBlock => self.parse_switch_case().map(Item::Case),
            Context::Import => self.parse_import_specifier().map(Item::Import),
            Context::Export => self.parse_export_specifier().map(Item::Export),
            Context::Expression | Context::Property => {
                self.parse_expression().map(|e| Item::Expr(Some(e)))
            }
            ref context if context.holds_statements() => self.parse_statement().map(Item::Stmt),
            _ => Err(self.unexpected()),
        }
    }

    // =========================================================================
    // Post-processing per context
    // =========================================================================

    /// `{ statements }` in the given statement context.
    pub(crate) fn parse_block(&mut self, context: Context) -> Result<Vec<Stmt>, ParseError> {
        self.open("{")?;
        let items = self.group(context)?;
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Item::Stmt(stmt) => Some(stmt),
                _ => None,
            })
            .collect())
    }

    /// Body of a function with the given flags.
    pub(crate) fn parse_function_body(&mut self, flags: FunctionFlags) -> Result<Vec<Stmt>, ParseError> {
        self.parse_block(Context::Function(flags))
    }

    /// `( args )`
    pub(crate) fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.open("(")?;
        let items = self.group(Context::Call)?;
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Item::Expr(expr) => expr,
                _ => None,
            })
            .collect())
    }

    /// `( expr )` heads of `if`, `while`, `switch`.
    pub(crate) fn parse_head(&mut self) -> Result<Expr, ParseError> {
        self.open("(")?;
        let start = self.scanner.pos();
        let items = self.group(Context::Expression)?;
        single_expr(items).ok_or_else(|| ParseError::at(SyntaxErrorKind::ExpressionExpected, start))
    }

    /// `( … )` in expression position: a parenthesised expression or the
    /// parameter list of an arrow function.
    pub(crate) fn parse_parenthesized(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.open("(")?;
        self.dangling_comma = None;
        let items = self.group(Context::Expression)?;
        let dangling = self.dangling_comma.take();
        let arrow = self.scanner.at("=>");
        let span = self.span_from(start);
        let expr = match single_expr(items) {
            Some(expr) => Expr::new(expr.kind, span),
            None if arrow => Expr::new(ExprKind::Sequence(Vec::new()), span),
            None => return Err(ParseError::at(SyntaxErrorKind::ExpressionExpected, span.end as usize - 1)),
        };
        if !arrow {
            if let Some(at) = dangling {
                return Err(ParseError::at(SyntaxErrorKind::ExpressionExpected, at));
            }
            if contains_spread(&expr) {
                return Err(ParseError::at(SyntaxErrorKind::UnexpectedToken("...".into()), start as usize));
            }
        }
        Ok(expr)
    }

    /// `[ elements ]`
    pub(crate) fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.open("[")?;
        let items = self.group(Context::Array)?;
        let elements = items
            .into_iter()
            .filter_map(|item| match item {
                Item::Expr(expr) => Some(expr),
                _ => None,
            })
            .collect();
        Ok(Expr::new(ExprKind::Array(elements), self.span_from(start)))
    }

    /// `{ properties }`
    pub(crate) fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.open("{")?;
        let items = self.group(Context::Object)?;
        let properties = items
            .into_iter()
            .filter_map(|item| match item {
                Item::Property(prop) => Some(prop),
                _ => None,
            })
            .collect();
        Ok(Expr::new(ExprKind::Object(properties), self.span_from(start)))
    }

    /// `[ key ]` of a computed property.
    pub(crate) fn parse_computed_key(&mut self) -> Result<Expr, ParseError> {
        let start = self.scanner.next_start();
        self.open("[")?;
        let items = self.group(Context::Property)?;
        let key = single_expr(items).ok_or_else(|| ParseError::at(SyntaxErrorKind::ExpressionExpected, start))?;
        if matches!(key.kind, ExprKind::Sequence(_)) {
            return Err(ParseError::at(SyntaxErrorKind::CommaInComputedProperty, key.span.start as usize));
        }
        Ok(key)
    }

    /// `( params )`
    pub(crate) fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.open("(")?;
        let items = self.group(Context::Parameters)?;
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Item::Param(param) => Some(param),
                _ => None,
            })
            .collect())
    }

    /// `{ members }` of a class.
    pub(crate) fn parse_class_body(&mut self) -> Result<Vec<ClassMember>, ParseError> {
        self.open("{")?;
        let items = self.group(Context::ClassBody)?;
        let mut members = Vec::with_capacity(items.len());
        let mut constructor: Option<Span> = None;
        for item in items {
            let Item::Member(member) = item else { continue };
            if let ClassMemberKind::Method { kind: MethodKind::Constructor, .. } = member.kind {
                if constructor.is_some() {
                    return Err(ParseError::at(SyntaxErrorKind::DuplicateConstructors, member.span.start as usize));
                }
                constructor = Some(member.span);
            }
            members.push(member);
        }
        Ok(members)
    }

    /// `{ cases }` of a switch statement.
    pub(crate) fn parse_switch_block(&mut self) -> Result<Vec<SwitchCase>, ParseError> {
        self.open("{")?;
        let items = self.group(Context::SwitchBlock)?;
        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Item::Case(case) => Some(case),
                _ => None,
            })
            .collect())
    }

    // =========================================================================
    // List items
    // =========================================================================

    /// Array element: expression, spread, or hole.
    fn parse_element(&mut self) -> Result<Option<Expr>, ParseError> {
        if self.scanner.eat(",") {
            return Ok(None);
        }
        let element = self.parse_spread_or_assignment()?;
        self.separator("]")?;
        Ok(Some(element))
    }

    /// Call argument.
    fn parse_argument(&mut self) -> Result<Expr, ParseError> {
        let arg = self.parse_spread_or_assignment()?;
        self.separator(")")?;
        Ok(arg)
    }

    fn parse_spread_or_assignment(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        if self.scanner.eat("...") {
            let arg = self.parse_assignment()?;
            return Ok(Expr::new(ExprKind::Spread(Box::new(arg)), self.span_from(start)));
        }
        self.parse_assignment()
    }

    /// Formal parameter.
    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let start = self.start();
        let rest = self.scanner.eat("...");
        let binding = self.parse_binding()?;
        let default = if !rest && self.scanner.eat("=") {
            Some(self.parse_assignment()?)
        } else {
            None
        };
        if rest && !self.scanner.at(")") {
            return Err(self.error(SyntaxErrorKind::RestMustEnd));
        }
        let span = self.span_from(start);
        self.separator(")")?;
        Ok(Param { binding, default, rest, span })
    }

    /// `case test:` or `default:` followed by its statements.
    fn parse_switch_case(&mut self) -> Result<SwitchCase, ParseError> {
        let start = self.start();
        let test = if self.scanner.match_keyword("case") {
            Some(self.parse_expression()?)
        } else if self.scanner.match_keyword("default") {
            None
        } else {
            return Err(self.error(SyntaxErrorKind::Expected("case")));
        };
        self.expect(":")?;
        let mut p = self.enter(Context::Case);
        let mut consequent = Vec::new();
        while !p.scanner.at("}") && !p.scanner.at_keyword("case") && !p.scanner.at_keyword("default") {
            if p.scanner.at_end() {
                return Err(p.error(SyntaxErrorKind::Expected("}")));
            }
            consequent.push(p.parse_statement()?);
        }
        let span = p.span_from(start);
        Ok(SwitchCase { test, consequent, span })
    }
}

/// The only expression item of a group, if there is one.
fn single_expr(items: Vec<Item>) -> Option<Expr> {
    items.into_iter().find_map(|item| match item {
        Item::Expr(expr) => expr,
        _ => None,
    })
}

fn contains_spread(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Spread(_) => true,
        ExprKind::Sequence(items) => items.iter().any(|e| matches!(e.kind, ExprKind::Spread(_))),
        _ => false,
    }
}
