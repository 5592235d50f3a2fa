//! JSX to factory calls.
//!
//! `<div id="a">hi {name}</div>` becomes `h("div", {id: "a"}, "hi ", name)`
//! where `h` is the bundle's factory. Fragments become arrays of their
//! children.

use super::{null, LoweringContext};
use crate::ast::*;
use crate::error::ParseError;
use crate::parser::{Parser, ParserOptions};
use crate::span::Span;

/// DOM factory emitted once per bundle that contains JSX. Components
/// (function tags) receive their props with `children` added.
const FACTORY_SOURCE: &str = r#"function __FACTORY__(tag, props) {
  var children = Array.prototype.slice.call(arguments, 2);
  if (typeof tag === "function") {
    var all = {};
    for (var key in props) all[key] = props[key];
    all.children = children;
    return tag(all);
  }
  var node = document.createElement(tag);
  for (var attr in props) {
    var value = props[attr];
    if (attr === "className") node.setAttribute("class", value);
    else if (attr.slice(0, 2) === "on" && typeof value === "function") node.addEventListener(attr.slice(2).toLowerCase(), value);
    else if (value === true) node.setAttribute(attr, "");
    else if (value != null && value !== false) node.setAttribute(attr, value);
  }
  (function append(items) {
    for (var i = 0; i < items.length; i++) {
      var child = items[i];
      if (Array.isArray(child)) append(child);
      else if (child != null && child !== false && child !== true) node.appendChild(child.nodeType ? child : document.createTextNode(child));
    }
  })(children);
  return node;
}"#;

/// The factory function declaration, named `name`.
pub fn jsx_factory(name: &str) -> Result<Stmt, ParseError> {
    let source = FACTORY_SOURCE.replace("__FACTORY__", name);
    let program = Parser::new(&source, ParserOptions::default()).parse()?;
    program
        .body
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::at(crate::error::SyntaxErrorKind::DeclarationExpected, 0))
}

pub(super) fn lower_element(expr: &mut Expr, ctx: &mut LoweringContext) -> Option<Expr> {
    let ExprKind::JsxElement(element) = &mut expr.kind else {
        return None;
    };
    let span = expr.span;
    let element = std::mem::replace(element.as_mut(), empty_element());

    let mut args = Vec::with_capacity(element.children.len() + 2);
    args.push(tag(element.name, span));
    args.push(props(element.attributes, span));
    args.extend(children(element.children));

    let callee = Expr::new(ExprKind::Ident(ctx.jsx_factory().to_string()), span);
    Some(Expr::new(ExprKind::Call { callee: Box::new(callee), args }, span))
}

pub(super) fn lower_fragment(expr: &mut Expr) -> Option<Expr> {
    let ExprKind::JsxFragment(fragment) = &mut expr.kind else {
        return None;
    };
    let items = children(std::mem::take(&mut fragment.children)).map(Some).collect();
    Some(Expr::new(ExprKind::Array(items), expr.span))
}

pub(super) fn lower_text(expr: &mut Expr) -> Option<Expr> {
    let ExprKind::JsxText(text) = &expr.kind else {
        return None;
    };
    Some(Expr::new(ExprKind::String(collapse_whitespace(text)), expr.span))
}

pub(super) fn lower_container(expr: &mut Expr) -> Option<Expr> {
    let ExprKind::JsxExprContainer(inner) = &mut expr.kind else {
        return None;
    };
    Some(match inner.take() {
        Some(inner) => *inner,
        None => Expr::undefined(),
    })
}

fn empty_element() -> JsxElement {
    JsxElement {
        name: JsxElementName::Ident(String::new()),
        attributes: Vec::new(),
        children: Vec::new(),
        self_closing: true,
        span: Span::default(),
    }
}

/// Intrinsic elements (`div`, `my-tag`, `svg:rect`) are named by string,
/// components by reference.
fn tag(name: JsxElementName, span: Span) -> Expr {
    match name {
        JsxElementName::Ident(name) => {
            let intrinsic = name.starts_with(|c: char| c.is_ascii_lowercase()) || name.contains('-');
            if intrinsic {
                Expr::new(ExprKind::String(name), span)
            } else {
                Expr::new(ExprKind::Ident(name), span)
            }
        }
        JsxElementName::Member(parts) => {
            let mut parts = parts.into_iter();
            let first = parts.next().unwrap_or_default();
            parts.fold(Expr::new(ExprKind::Ident(first), span), Expr::member)
        }
        name @ JsxElementName::Namespaced { .. } => Expr::new(ExprKind::String(name.to_source()), span),
    }
}

fn props(attributes: Vec<JsxAttribute>, span: Span) -> Expr {
    if attributes.is_empty() {
        return null();
    }
    let properties = attributes
        .into_iter()
        .map(|attribute| match attribute {
            JsxAttribute::Attribute { name, value, span } => {
                let key = if crate::is_identifier_name(&name) {
                    PropertyKey::Ident(name)
                } else {
                    PropertyKey::String(name)
                };
                let value = value.unwrap_or_else(|| Expr::new(ExprKind::Bool(true), span));
                Property { key, value, kind: PropertyKind::Init, shorthand: false, span }
            }
            JsxAttribute::Spread { argument, span } => Property {
                key: PropertyKey::Ident(String::new()),
                value: argument,
                kind: PropertyKind::Spread,
                shorthand: false,
                span,
            },
        })
        .collect();
    Expr::new(ExprKind::Object(properties), span)
}

/// Children that produce output: empty containers and layout whitespace
/// (whitespace-only text spanning lines) are dropped.
fn children(children: Vec<Expr>) -> impl Iterator<Item = Expr> {
    children.into_iter().filter(|child| match &child.kind {
        ExprKind::JsxExprContainer(None) => false,
        ExprKind::JsxText(text) => !(text.trim().is_empty() && text.contains('\n')),
        _ => true,
    })
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::tests::lowered;

    #[test]
    fn test_intrinsic_element_with_attributes() {
        assert_eq!(
            lowered(r#"x=<div className="a" id={b} hidden {...p}>hi   there {c}</div>;"#),
            r#"x=h("div",{className:"a",id:b,hidden:true,...p},"hi there ",c);"#
        );
    }

    #[test]
    fn test_component_tags() {
        assert_eq!(lowered("x=<App/>;"), "x=h(App,null);");
        assert_eq!(lowered("x=<Foo.Bar x=\"1\"/>;"), "x=h(Foo.Bar,{x:\"1\"});");
        assert_eq!(lowered("x=<my-tag/>;"), "x=h(\"my-tag\",null);");
    }

    #[test]
    fn test_non_identifier_attribute_names_are_quoted() {
        assert_eq!(
            lowered(r#"x=<a data-x="1" xlink:href="y"/>;"#),
            r#"x=h("a",{"data-x":"1","xlink:href":"y"});"#
        );
    }

    #[test]
    fn test_layout_whitespace_dropped() {
        assert_eq!(lowered("x=<ul>\n  <li/>\n  {}\n</ul>;"), "x=h(\"ul\",null,h(\"li\",null));");
    }

    #[test]
    fn test_fragment_becomes_array() {
        assert_eq!(lowered("x=<><a/>\n  text\n</>;"), "x=[h(\"a\",null),\" text \"];");
    }

    #[test]
    fn test_factory_parses() {
        let stmt = jsx_factory("_jsx").unwrap();
        let StmtKind::Function(function) = stmt.kind else { panic!("expected a function declaration") };
        assert_eq!(function.name.as_deref(), Some("_jsx"));
        assert_eq!(function.params.len(), 2);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
    }
}
