//! Binding patterns and property keys.

use super::{Context, Parser};
use crate::ast::*;
use crate::error::{ParseError, SyntaxErrorKind};

impl<'a> Parser<'a> {
    /// Parse a binding: identifier, array pattern, or object pattern.
    pub(crate) fn parse_binding(&mut self) -> Result<Binding, ParseError> {
        let start = self.start();
        match self.scanner.peek() {
            Some(b'[') => self.parse_array_binding(),
            Some(b'{') => self.parse_object_binding(),
            _ => {
                let name = self.binding_identifier()?;
                Ok(Binding::new(BindingKind::Ident { name }, self.span_from(start)))
            }
        }
    }

    /// Array binding pattern: `[a, , b = 1, ...rest]`
    fn parse_array_binding(&mut self) -> Result<Binding, ParseError> {
        let start = self.start();
        self.expect("[")?;
        let mut elements = Vec::new();
        while !self.scanner.at("]") {
            if self.scanner.at_end() {
                return Err(self.error(SyntaxErrorKind::Expected("]")));
            }
            if self.scanner.eat(",") {
                elements.push(None);
                continue;
            }
            let rest = self.scanner.eat("...");
            let binding = self.parse_binding()?;
            let default = if !rest && self.scanner.eat("=") {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            if rest && !self.scanner.at("]") {
                return Err(self.error(SyntaxErrorKind::RestMustEnd));
            }
            elements.push(Some(ArrayPatternElement { binding, default, rest }));
            self.separator("]")?;
        }
        self.expect("]")?;
        Ok(Binding::new(BindingKind::Array { elements }, self.span_from(start)))
    }

    /// Object binding pattern: `{a, b: c, d = 1, ...rest}`
    fn parse_object_binding(&mut self) -> Result<Binding, ParseError> {
        let start = self.start();
        self.expect("{")?;
        let mut properties = Vec::new();
        while !self.scanner.at("}") {
            if self.scanner.at_end() {
                return Err(self.error(SyntaxErrorKind::Expected("}")));
            }
            if self.scanner.eat("...") {
                let value = self.parse_binding()?;
                if !self.scanner.at("}") {
                    return Err(self.error(SyntaxErrorKind::RestMustEnd));
                }
                properties.push(ObjectPatternProperty {
                    key: PropertyKey::Ident(String::new()),
                    value,
                    default: None,
                    shorthand: false,
                    rest: true,
                });
                continue;
            }
            let key_start = self.start();
            let key = self.parse_property_key()?;
            let (value, shorthand) = if self.scanner.eat(":") {
                (self.parse_binding()?, false)
            } else {
                let PropertyKey::Ident(name) = &key else {
                    return Err(self.error(SyntaxErrorKind::Expected(":")));
                };
                if super::is_reserved(name) {
                    return Err(ParseError::at(
                        SyntaxErrorKind::UnexpectedToken(name.clone()),
                        key_start as usize,
                    ));
                }
                let span = self.span_from(key_start);
                (Binding::new(BindingKind::Ident { name: name.clone() }, span), true)
            };
            let default = if self.scanner.eat("=") {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            properties.push(ObjectPatternProperty { key, value, default, shorthand, rest: false });
            self.separator("}")?;
        }
        self.expect("}")?;
        Ok(Binding::new(BindingKind::Object { properties }, self.span_from(start)))
    }

    /// Property key of an object literal, object pattern, or class member.
    pub(crate) fn parse_property_key(&mut self) -> Result<PropertyKey, ParseError> {
        let start = self.start();
        match self.scanner.peek() {
            Some(b'"' | b'\'') => {
                let (value, _) = self.string_literal()?;
                Ok(PropertyKey::String(value))
            }
            Some(b'0'..=b'9' | b'.') => {
                self.scanner.skip_trivia();
                let (value, _) = self
                    .scanner
                    .number()
                    .map_err(|kind| ParseError::at(kind, start as usize))?;
                Ok(PropertyKey::Number(value))
            }
            Some(b'[') => Ok(PropertyKey::Computed(Box::new(self.parse_computed_key()?))),
            Some(b'#') => {
                if !self.contexts.contains(&Context::ClassBody) {
                    return Err(self.error(SyntaxErrorKind::IllegalPrivateIdentifier));
                }
                self.scanner.eat("#");
                Ok(PropertyKey::Private(self.identifier_name()?))
            }
            _ => Ok(PropertyKey::Ident(self.identifier_name()?)),
        }
    }

    // =========================================================================
    // Cover grammar: expressions reinterpreted as patterns
    // =========================================================================

    /// Turn the contents of `( … )` (or a lone identifier) into arrow
    /// parameters.
    pub(crate) fn exprs_to_params(&self, group: Expr) -> Result<Vec<Param>, ParseError> {
        let exprs = match group.kind {
            ExprKind::Sequence(items) => items,
            _ => vec![group],
        };
        let count = exprs.len();
        let mut params = Vec::with_capacity(count);
        for (i, expr) in exprs.into_iter().enumerate() {
            let param = self.expr_to_param(expr)?;
            if param.rest && i + 1 != count {
                return Err(ParseError::at(SyntaxErrorKind::RestMustEnd, param.span.start as usize));
            }
            params.push(param);
        }
        Ok(params)
    }

    /// Convert an expression to a parameter.
    fn expr_to_param(&self, expr: Expr) -> Result<Param, ParseError> {
        let span = expr.span;
        match expr.kind {
            ExprKind::Assign { left, right, op: AssignOp::Assign } => Ok(Param {
                binding: self.expr_to_binding(*left)?,
                default: Some(*right),
                rest: false,
                span,
            }),
            ExprKind::Spread(arg) => Ok(Param {
                binding: self.expr_to_binding(*arg)?,
                default: None,
                rest: true,
                span,
            }),
            kind => Ok(Param {
                binding: self.expr_to_binding(Expr::new(kind, span))?,
                default: None,
                rest: false,
                span,
            }),
        }
    }

    /// Convert an expression to a binding pattern.
    pub(crate) fn expr_to_binding(&self, expr: Expr) -> Result<Binding, ParseError> {
        let span = expr.span;
        match expr.kind {
            ExprKind::Ident(name) => Ok(Binding::new(BindingKind::Ident { name }, span)),
            ExprKind::Array(elems) => {
                let mut elements = Vec::with_capacity(elems.len());
                for elem in elems {
                    let Some(e) = elem else {
                        elements.push(None);
                        continue;
                    };
                    let element = match e.kind {
                        ExprKind::Spread(inner) => ArrayPatternElement {
                            binding: self.expr_to_binding(*inner)?,
                            default: None,
                            rest: true,
                        },
                        ExprKind::Assign { left, right, op: AssignOp::Assign } => ArrayPatternElement {
                            binding: self.expr_to_binding(*left)?,
                            default: Some(*right),
                            rest: false,
                        },
                        kind => ArrayPatternElement {
                            binding: self.expr_to_binding(Expr::new(kind, e.span))?,
                            default: None,
                            rest: false,
                        },
                    };
                    elements.push(Some(element));
                }
                Ok(Binding::new(BindingKind::Array { elements }, span))
            }
            ExprKind::Object(props) => {
                let mut properties = Vec::with_capacity(props.len());
                for prop in props {
                    match prop.kind {
                        PropertyKind::Spread => properties.push(ObjectPatternProperty {
                            key: PropertyKey::Ident(String::new()),
                            value: self.expr_to_binding(prop.value)?,
                            default: None,
                            shorthand: false,
                            rest: true,
                        }),
                        PropertyKind::Init => {
                            let (value, default) = match prop.value.kind {
                                ExprKind::Assign { left, right, op: AssignOp::Assign } => {
                                    (self.expr_to_binding(*left)?, Some(*right))
                                }
                                kind => (self.expr_to_binding(Expr::new(kind, prop.value.span))?, None),
                            };
                            properties.push(ObjectPatternProperty {
                                key: prop.key,
                                value,
                                default,
                                shorthand: prop.shorthand,
                                rest: false,
                            });
                        }
                        _ => return Err(ParseError::at(SyntaxErrorKind::InvalidLhsAssign, prop.span.start as usize)),
                    }
                }
                Ok(Binding::new(BindingKind::Object { properties }, span))
            }
            _ => Err(ParseError::at(SyntaxErrorKind::UnexpectedToken("=>".into()), span.start as usize)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::{Parser, ParserOptions};

    fn first_binding(source: &str) -> Binding {
        let program = Parser::new(source, ParserOptions::default()).parse().unwrap();
        match program.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Var { decls, .. }) => decls.into_iter().next().unwrap().binding,
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_patterns() {
        let binding = first_binding("const { a, b: [c, , d = 1], ...rest } = obj;");
        assert_eq!(binding.names(), vec!["a", "c", "d", "rest"]);
    }

    #[test]
    fn test_rest_must_end() {
        let err = Parser::new("let [...a, b] = c;", ParserOptions::default()).parse().unwrap_err();
        assert_eq!(err.code(), "JS_REST_MUST_END");
    }

    #[test]
    fn test_keyword_keys_in_patterns() {
        let binding = first_binding("var { default: x, if: y } = m;");
        assert_eq!(binding.names(), vec!["x", "y"]);
    }
}
