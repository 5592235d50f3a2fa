//! Default parameters.
//!
//! `function f(x = 1) {}` becomes
//! `function f(x) { if (x === void 0) x = arguments[0] = 1; }`. Arrow
//! functions have no `arguments`, so only the parameter is assigned.
//! The checks go after any directive prologue such as `"use strict"`.

use super::{assign, computed_member, is_undefined, number, LoweringContext};
use crate::ast::*;
use crate::span::Span;

pub(super) fn lower_function(function: &mut Function, ctx: &mut LoweringContext) {
    let prologue = defaults_prologue(&mut function.params, true, ctx);
    if !prologue.is_empty() {
        let at = directives(&function.body);
        function.body.splice(at..at, prologue);
    }
}

/// Length of the leading run of string expression statements.
fn directives(body: &[Stmt]) -> usize {
    body.iter()
        .take_while(|stmt| matches!(&stmt.kind, StmtKind::Expr(e) if matches!(e.kind, ExprKind::String(_))))
        .count()
}

pub(super) fn lower_arrow(arrow: &mut ArrowFunction, ctx: &mut LoweringContext) {
    let mut prologue = defaults_prologue(&mut arrow.params, false, ctx);
    if prologue.is_empty() {
        return;
    }
    match &mut arrow.body {
        ArrowBody::Block(body) => {
            let at = directives(body);
            body.splice(at..at, prologue);
        }
        ArrowBody::Expr(expr) => {
            let expr = std::mem::replace(expr.as_mut(), Expr::undefined());
            let span = expr.span;
            prologue.push(Stmt::new(StmtKind::Return { arg: Some(expr) }, span));
            arrow.body = ArrowBody::Block(prologue);
        }
    }
}

/// Strip defaults from `params` and return the statements that apply them.
fn defaults_prologue(params: &mut [Param], has_arguments: bool, ctx: &mut LoweringContext) -> Vec<Stmt> {
    let mut prologue = Vec::new();
    for (index, param) in params.iter_mut().enumerate() {
        let Some(default) = param.default.take() else {
            continue;
        };
        let pattern = match &param.binding.kind {
            BindingKind::Ident { .. } => None,
            _ => {
                let name = ctx.fresh("p");
                Some(std::mem::replace(&mut param.binding, Binding::ident(name)))
            }
        };
        let BindingKind::Ident { name } = &param.binding.kind else {
            continue;
        };
        let name = name.clone();

        let value = if has_arguments {
            let slot = computed_member(Expr::ident("arguments"), number(index as f64));
            assign(slot, default)
        } else {
            default
        };
        let fill = Stmt::expr(assign(Expr::ident(&name), value));
        prologue.push(Stmt::new(
            StmtKind::If {
                test: is_undefined(Expr::ident(&name)),
                consequent: Box::new(fill),
                alternate: None,
            },
            param.span,
        ));

        // The destructuring declaration is flattened when the walker
        // reaches the body.
        if let Some(binding) = pattern {
            prologue.push(Stmt::new(
                StmtKind::Var {
                    kind: VarKind::Var,
                    decls: vec![VarDeclarator { binding, init: Some(Expr::ident(name)), span: Span::default() }],
                },
                param.span,
            ));
        }
    }
    prologue
}

#[cfg(test)]
mod tests {
    use crate::transform::tests::lowered;

    #[test]
    fn test_function_defaults_fill_arguments() {
        assert_eq!(
            lowered("function f(a,b=2){return b}"),
            "function f(a,b){if(b===void 0)b=arguments[1]=2;return b}"
        );
    }

    #[test]
    fn test_arrow_defaults_skip_arguments() {
        assert_eq!(lowered("g=(x=1)=>x;"), "g=x=>{if(x===void 0)x=1;return x};");
    }

    #[test]
    fn test_defaults_follow_directives() {
        assert_eq!(
            lowered("function f(a=1){'use strict';return a}"),
            "function f(a){\"use strict\";if(a===void 0)a=arguments[0]=1;return a}"
        );
        assert_eq!(
            lowered("g=(x=1)=>{'use strict';x()};"),
            "g=x=>{\"use strict\";if(x===void 0)x=1;x()};"
        );
    }

    #[test]
    fn test_pattern_parameter_with_default() {
        assert_eq!(
            lowered("function f({a}={}){}"),
            "function f(_p1){if(_p1===void 0)_p1=arguments[0]={};var a=_p1.a}"
        );
    }
}
