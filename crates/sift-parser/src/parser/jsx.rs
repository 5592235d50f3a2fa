//! JSX elements and fragments.
//!
//! JSX is scanned mostly raw: tag names may contain `-`, attribute strings
//! have no escapes, and text between tags is kept byte for byte so later
//! passes can decide what whitespace means.

use super::{Context, Parser};
use crate::ast::*;
use crate::error::{ParseError, SyntaxErrorKind};
use crate::scanner::{is_id_part, is_id_start};

impl<'a> Parser<'a> {
    /// Parse a JSX element or fragment starting at `<`.
    pub(crate) fn parse_jsx(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        self.scanner.skip_trivia();
        self.scanner.bump();

        if self.jsx_byte(b'>') {
            let children = self.parse_jsx_children("")?;
            let span = self.span_from(start);
            return Ok(Expr::new(ExprKind::JsxFragment(Box::new(JsxFragment { children, span })), span));
        }

        let name = self.parse_jsx_element_name()?;
        let attributes = self.parse_jsx_attributes()?;

        let self_closing = self.jsx_byte(b'/');
        if !self.jsx_byte(b'>') {
            return Err(self.error(SyntaxErrorKind::Expected(">")));
        }
        let children = if self_closing {
            Vec::new()
        } else {
            self.parse_jsx_children(&name.to_source())?
        };

        let span = self.span_from(start);
        let element = JsxElement { name, attributes, children, self_closing, span };
        Ok(Expr::new(ExprKind::JsxElement(Box::new(element)), span))
    }

    /// Consume `byte` after trivia.
    fn jsx_byte(&mut self, byte: u8) -> bool {
        if self.scanner.peek() == Some(byte) {
            self.scanner.skip_trivia();
            self.scanner.bump();
            true
        } else {
            false
        }
    }

    /// An identifier that may contain `-`.
    fn jsx_identifier(&mut self) -> Result<String, ParseError> {
        if !self.scanner.peek_char().is_some_and(is_id_start) {
            return Err(self.error(SyntaxErrorKind::IdentifierExpected));
        }
        self.scanner.skip_trivia();
        let rest = self.scanner.raw_rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_id_part(c) && c != '-')
            .map_or(rest.len(), |(i, _)| i);
        self.scanner.advance(len);
        Ok(rest[..len].to_string())
    }

    /// `div`, `my-tag`, `Foo.Bar`, `svg:rect`
    fn parse_jsx_element_name(&mut self) -> Result<JsxElementName, ParseError> {
        let first = self.jsx_identifier()?;
        if self.jsx_byte(b':') {
            let name = self.jsx_identifier()?;
            return Ok(JsxElementName::Namespaced { namespace: first, name });
        }
        if self.scanner.peek() != Some(b'.') {
            return Ok(JsxElementName::Ident(first));
        }
        let mut parts = vec![first];
        while self.jsx_byte(b'.') {
            parts.push(self.jsx_identifier()?);
        }
        Ok(JsxElementName::Member(parts))
    }

    fn parse_jsx_attributes(&mut self) -> Result<Vec<JsxAttribute>, ParseError> {
        let mut attributes = Vec::new();
        let mut p = self.isolate(Context::JsxAttribute);
        loop {
            match p.scanner.peek() {
                Some(b'>' | b'/') => break,
                None => return Err(p.error(SyntaxErrorKind::Expected(">"))),
                Some(b'{') => {
                    let start = p.start();
                    p.jsx_byte(b'{');
                    p.expect("...")?;
                    let argument = p.parse_assignment()?;
                    p.expect("}")?;
                    attributes.push(JsxAttribute::Spread { argument, span: p.span_from(start) });
                }
                Some(_) => {
                    let start = p.start();
                    let mut name = p.jsx_identifier()?;
                    if p.jsx_byte(b':') {
                        name.push(':');
                        name.push_str(&p.jsx_identifier()?);
                    }
                    let value = if p.jsx_byte(b'=') {
                        Some(p.parse_jsx_attribute_value()?)
                    } else {
                        None
                    };
                    attributes.push(JsxAttribute::Attribute { name, value, span: p.span_from(start) });
                }
            }
        }
        Ok(attributes)
    }

    /// `"text"`, `{expr}`, or a nested element.
    fn parse_jsx_attribute_value(&mut self) -> Result<Expr, ParseError> {
        let start = self.start();
        match self.scanner.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.scanner.skip_trivia();
                self.scanner.bump();
                let rest = self.scanner.raw_rest();
                let Some(len) = rest.bytes().position(|b| b == quote) else {
                    return Err(ParseError::at(SyntaxErrorKind::UnterminatedString, start as usize));
                };
                let value = rest[..len].to_string();
                self.scanner.advance(len + 1);
                Ok(Expr::new(ExprKind::String(value), self.span_from(start)))
            }
            Some(b'{') => {
                self.jsx_byte(b'{');
                let expr = self.parse_assignment()?;
                self.expect("}")?;
                Ok(expr)
            }
            Some(b'<') => self.parse_jsx(),
            _ => Err(self.unexpected()),
        }
    }

    /// Children up to and including the closing tag named `name` (empty for
    /// a fragment).
    fn parse_jsx_children(&mut self, name: &str) -> Result<Vec<Expr>, ParseError> {
        let mut children = Vec::new();
        loop {
            let start = self.scanner.pos() as u32;
            match self.scanner.raw_peek() {
                None => {
                    return Err(ParseError::at(
                        SyntaxErrorKind::JsxNoClose(name.to_string()),
                        self.scanner.pos(),
                    ));
                }
                Some(b'<') => {
                    let save = self.scanner.pos();
                    self.scanner.bump();
                    if self.jsx_byte(b'/') {
                        let closing = if self.scanner.peek() == Some(b'>') {
                            String::new()
                        } else {
                            self.parse_jsx_element_name()?.to_source()
                        };
                        if closing != name || !self.jsx_byte(b'>') {
                            return Err(ParseError::at(SyntaxErrorKind::JsxNoClose(name.to_string()), save));
                        }
                        return Ok(children);
                    }
                    self.scanner.backtrack(save);
                    children.push(self.parse_jsx()?);
                }
                Some(b'{') => {
                    self.scanner.bump();
                    let expr = if self.scanner.at("}") {
                        None
                    } else {
                        let mut p = self.isolate(Context::Expression);
                        Some(Box::new(p.parse_expression()?))
                    };
                    self.expect("}")?;
                    children.push(Expr::new(ExprKind::JsxExprContainer(expr), self.span_from(start)));
                }
                Some(_) => {
                    let rest = self.scanner.raw_rest();
                    let len = rest.find(['<', '{']).unwrap_or(rest.len());
                    self.scanner.advance(len);
                    let text = rest[..len].to_string();
                    children.push(Expr::new(ExprKind::JsxText(text), self.span_from(start)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::parser::{Parser, ParserOptions};

    fn jsx(source: &str) -> Expr {
        let program = Parser::new(source, ParserOptions::default().with_jsx(true)).parse().unwrap();
        match program.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_element_names() {
        let ExprKind::JsxElement(el) = jsx("<Foo.Bar />").kind else { panic!() };
        assert_eq!(el.name, JsxElementName::Member(vec!["Foo".into(), "Bar".into()]));
        assert!(el.self_closing);

        let ExprKind::JsxElement(el) = jsx("<svg:rect/>").kind else { panic!() };
        assert_eq!(el.name.to_source(), "svg:rect");

        let ExprKind::JsxElement(el) = jsx("<my-tag></my-tag>").kind else { panic!() };
        assert_eq!(el.name, JsxElementName::Ident("my-tag".into()));
    }

    #[test]
    fn test_attribute_values() {
        let ExprKind::JsxElement(el) = jsx(r#"<a href="x\y" disabled on={f(1)} icon=<i/> />"#).kind else {
            panic!()
        };
        assert_eq!(el.attributes.len(), 4);
        let JsxAttribute::Attribute { value: Some(value), .. } = &el.attributes[0] else { panic!() };
        assert_eq!(value.kind, ExprKind::String("x\\y".into()));
        assert!(matches!(&el.attributes[1], JsxAttribute::Attribute { value: None, .. }));
    }

    #[test]
    fn test_empty_container_and_comment() {
        let ExprKind::JsxElement(el) = jsx("<a>{}{/* note */}</a>").kind else { panic!() };
        assert_eq!(el.children.len(), 2);
        assert!(el.children.iter().all(|c| c.kind == ExprKind::JsxExprContainer(None)));
    }

    #[test]
    fn test_text_keeps_whitespace() {
        let ExprKind::JsxFragment(frag) = jsx("<>\n  a  b\n</>").kind else { panic!() };
        assert_eq!(frag.children[0].kind, ExprKind::JsxText("\n  a  b\n".into()));
    }

    #[test]
    fn test_element_in_expression() {
        let e = jsx("x = cond ? <a/> : <b>{y}</b>;");
        assert!(matches!(e.kind, ExprKind::Assign { .. }));
    }
}
