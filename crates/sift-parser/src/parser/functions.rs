//! Functions, classes, and object literal members.

use super::{Context, FunctionFlags, Operator, Parser};
use crate::ast::*;
use crate::error::{ParseError, SyntaxErrorKind};

impl<'a> Parser<'a> {
    /// Parse a function after the `function` keyword.
    pub(crate) fn parse_function(&mut self, is_async: bool, start: u32) -> Result<Function, ParseError> {
        let is_generator = self.scanner.eat("*");
        let name = if self.scanner.at("(") {
            None
        } else {
            Some(self.binding_identifier()?)
        };
        let flags = FunctionFlags { is_async, is_generator };
        let (params, body) = self.parse_function_rest(flags)?;
        Ok(Function {
            name,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }

    /// Parameters and body of a function with the given flags.
    fn parse_function_rest(&mut self, flags: FunctionFlags) -> Result<(Vec<Param>, Vec<Stmt>), ParseError> {
        let params = {
            let mut p = self.enter(Context::Function(flags));
            p.parse_params()?
        };
        let body = self.parse_function_body(flags)?;
        Ok((params, body))
    }

    /// Parse a class after the `class` keyword.
    pub(crate) fn parse_class(&mut self, start: u32, require_name: bool) -> Result<Class, ParseError> {
        let name = if self.at_binding_identifier() && !self.scanner.at_keyword("extends") {
            Some(self.binding_identifier()?)
        } else if require_name {
            return Err(self.error(SyntaxErrorKind::IdentifierExpected));
        } else {
            None
        };
        let super_class = if self.scanner.match_keyword("extends") {
            let mut p = self.enter(Context::Heritage);
            p.operators.push(Operator::Assign);
            Some(Box::new(p.parse_expression()?))
        } else {
            None
        };
        let body = self.parse_class_body()?;
        Ok(Class { name, super_class, body, span: self.span_from(start) })
    }

    /// Consume a member modifier (`static`, `get`, `set`, `async`) when it
    /// is followed by something that can name a member. A modifier word
    /// followed by `(`, `=`, `;`, `}` or `:` is itself the member name.
    fn parse_modifier(&mut self, word: &'static str) -> bool {
        if !self.scanner.at_keyword(word) {
            return false;
        }
        let save = self.scanner.pos();
        self.scanner.match_keyword(word);
        if word == "async" && self.scanner.newline_ahead() {
            self.scanner.backtrack(save);
            return false;
        }
        let names_member = matches!(self.scanner.peek(), Some(b'[' | b'"' | b'\'' | b'#' | b'*' | b'{' | b'0'..=b'9'))
            || self.scanner.at_identifier();
        let follows_key = matches!(self.scanner.peek_punctuator(), Some("(" | "=" | ";" | "}" | ":" | ","));
        if names_member && !follows_key {
            true
        } else {
            self.scanner.backtrack(save);
            false
        }
    }

    /// Class member.
    pub(crate) fn parse_class_member(&mut self) -> Result<ClassMember, ParseError> {
        let start = self.start();
        if self.scanner.eat(";") {
            return Ok(ClassMember { kind: ClassMemberKind::Empty, span: self.span_from(start) });
        }
        let is_static = self.parse_modifier("static");
        if is_static && self.scanner.at("{") {
            let body = self.parse_block(Context::Block)?;
            return Ok(ClassMember { kind: ClassMemberKind::StaticBlock(body), span: self.span_from(start) });
        }
        let is_async = self.parse_modifier("async");
        let is_generator = self.scanner.eat("*");
        let mut kind = MethodKind::Method;
        if !is_async && !is_generator {
            if self.parse_modifier("get") {
                kind = MethodKind::Get;
            } else if self.parse_modifier("set") {
                kind = MethodKind::Set;
            }
        }
        let key = self.parse_property_key()?;

        if self.scanner.at("(") {
            let is_constructor = !is_static
                && matches!(&key, PropertyKey::Ident(n) | PropertyKey::String(n) if n == "constructor");
            if is_constructor && kind == MethodKind::Method {
                kind = MethodKind::Constructor;
            }
            let flags = FunctionFlags { is_async, is_generator };
            let fn_start = self.start();
            let (params, body) = self.parse_function_rest(flags)?;
            let value = Function {
                name: None,
                params,
                body,
                is_async,
                is_generator,
                span: self.span_from(fn_start),
            };
            return Ok(ClassMember {
                kind: ClassMemberKind::Method { key, value, kind, is_static },
                span: self.span_from(start),
            });
        }
        if is_async || is_generator || kind != MethodKind::Method {
            return Err(self.error(SyntaxErrorKind::Expected("(")));
        }

        // Field
        let value = if self.scanner.eat("=") {
            let mut p = self.enter(Context::Function(FunctionFlags::default()));
            Some(p.parse_assignment()?)
        } else {
            None
        };
        self.semicolon()?;
        Ok(ClassMember {
            kind: ClassMemberKind::Property { key, value, is_static },
            span: self.span_from(start),
        })
    }

    /// Object literal member.
    pub(crate) fn parse_property(&mut self) -> Result<Property, ParseError> {
        let start = self.start();
        if self.scanner.eat("...") {
            let value = self.parse_assignment()?;
            let span = self.span_from(start);
            self.separator("}")?;
            return Ok(Property {
                key: PropertyKey::Ident(String::new()),
                value,
                kind: PropertyKind::Spread,
                shorthand: false,
                span,
            });
        }

        let is_async = self.parse_modifier("async");
        let is_generator = self.scanner.eat("*");
        let mut kind = PropertyKind::Init;
        if !is_async && !is_generator {
            if self.parse_modifier("get") {
                kind = PropertyKind::Get;
            } else if self.parse_modifier("set") {
                kind = PropertyKind::Set;
            }
        }
        let key_start = self.start();
        let key = self.parse_property_key()?;

        let (value, shorthand) = if self.scanner.at("(") {
            let flags = FunctionFlags { is_async, is_generator };
            let (params, body) = self.parse_function_rest(flags)?;
            let span = self.span_from(key_start);
            if kind == PropertyKind::Init {
                kind = PropertyKind::Method;
            }
            let func = Function { name: None, params, body, is_async, is_generator, span };
            (Expr::new(ExprKind::Function(Box::new(func)), span), false)
        } else if is_async || is_generator || kind != PropertyKind::Init {
            return Err(self.error(SyntaxErrorKind::Expected("(")));
        } else if self.scanner.eat(":") {
            (self.parse_assignment()?, false)
        } else {
            let PropertyKey::Ident(name) = &key else {
                return Err(self.error(SyntaxErrorKind::Expected(":")));
            };
            let reference = Expr::new(ExprKind::Ident(name.clone()), self.span_from(key_start));
            if self.scanner.eat("=") {
                // `{ a = 1 }` only survives as a destructuring target
                let default = self.parse_assignment()?;
                let span = self.span_from(key_start);
                let assign = ExprKind::Assign {
                    op: AssignOp::Assign,
                    left: Box::new(reference),
                    right: Box::new(default),
                };
                (Expr::new(assign, span), true)
            } else {
                (reference, true)
            }
        };
        let span = self.span_from(start);
        self.separator("}")?;
        Ok(Property { key, value, kind, shorthand, span })
    }
}
