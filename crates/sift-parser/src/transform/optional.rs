//! Optional chaining and nullish coalescing.
//!
//! `a?.b.c` becomes `a == null ? void 0 : a.b.c`. Anything other than an
//! identifier or `this` is evaluated once into a temporary before it is
//! tested. `a ?? b` becomes `a != null ? a : b` with the same rule.
//!
//! A parenthesised chain that is called keeps its receiver:
//! `(o?.m)()` becomes `(o == null ? void 0 : o.m).call(o)`. Deleting
//! through a chain yields `true` when it short-circuits.

use super::{assign, binary, conditional, null, LoweringContext};
use crate::ast::*;

/// One step of a member/call chain.
enum Link {
    Member { property: Box<Expr>, computed: bool, optional: bool },
    Call { args: Vec<Expr>, optional: bool },
}

impl Link {
    fn optional(&self) -> bool {
        match self {
            Link::Member { optional, .. } | Link::Call { optional, .. } => *optional,
        }
    }
}

pub(super) fn lower_chain(expr: &mut Expr, ctx: &mut LoweringContext) -> Option<Expr> {
    let ExprKind::Chain(inner) = &mut expr.kind else {
        return None;
    };
    let span = expr.span;
    let inner = std::mem::replace(inner.as_mut(), Expr::undefined());
    let (base, mut links) = flatten(inner);
    let mut result = build(base, None, &mut links, ctx);
    result.span = span;
    Some(result)
}

/// Chains whose use depends on the final reference rather than its value:
/// the callee of a call and the operand of `delete`.
pub(super) fn lower_chain_reference(expr: &mut Expr, ctx: &mut LoweringContext) -> Option<Expr> {
    match &mut expr.kind {
        ExprKind::Call { callee, args } if matches!(callee.kind, ExprKind::Chain(_)) => {
            let callee = std::mem::replace(callee.as_mut(), Expr::undefined());
            let args = std::mem::take(args);
            let mut lowered = lower_chain_value(callee, ctx);
            let Some(object) = final_member_object(&mut lowered) else {
                return Some(Expr::new(ExprKind::Call { callee: Box::new(lowered), args }, expr.span));
            };
            let (check, reference) = ctx.memoize(std::mem::replace(object.as_mut(), Expr::undefined()));
            **object = check;
            let mut result = call_with_this(lowered, Some(reference), args);
            result.span = expr.span;
            Some(result)
        }
        ExprKind::Unary { op: UnaryOp::Delete, arg } if matches!(arg.kind, ExprKind::Chain(_)) => {
            let arg = std::mem::replace(arg.as_mut(), Expr::undefined());
            let mut result = lower_chain_value(arg, ctx);
            delete_on_spine(&mut result);
            result.span = expr.span;
            Some(result)
        }
        _ => None,
    }
}

fn lower_chain_value(mut chain: Expr, ctx: &mut LoweringContext) -> Expr {
    match lower_chain(&mut chain, ctx) {
        Some(lowered) => lowered,
        None => chain,
    }
}

/// The object of the member read when no link short-circuits.
fn final_member_object(expr: &mut Expr) -> Option<&mut Box<Expr>> {
    match &mut expr.kind {
        ExprKind::Conditional { alternate, .. } => final_member_object(alternate),
        ExprKind::Member { object, .. } => Some(object),
        _ => None,
    }
}

/// Short-circuits become `true`, the final member read becomes `delete`.
fn delete_on_spine(expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Conditional { consequent, alternate, .. } => {
            **consequent = Expr::new(ExprKind::Bool(true), consequent.span);
            delete_on_spine(alternate);
        }
        _ => {
            let span = expr.span;
            let target = std::mem::replace(expr, Expr::undefined());
            *expr = Expr::new(ExprKind::Unary { op: UnaryOp::Delete, arg: Box::new(target) }, span);
        }
    }
}

/// Split a chain into its innermost object and the links applied to it,
/// outermost first, so popping yields them in evaluation order.
fn flatten(mut expr: Expr) -> (Expr, Vec<Link>) {
    let mut links = Vec::new();
    loop {
        expr = match expr.kind {
            ExprKind::Member { object, property, computed } => {
                links.push(Link::Member { property, computed, optional: false });
                *object
            }
            ExprKind::OptionalMember { object, property, computed } => {
                links.push(Link::Member { property, computed, optional: true });
                *object
            }
            ExprKind::Call { callee, args } => {
                links.push(Link::Call { args, optional: false });
                *callee
            }
            ExprKind::OptionalCall { callee, args } => {
                links.push(Link::Call { args, optional: true });
                *callee
            }
            kind => return (Expr::new(kind, expr.span), links),
        };
    }
}

/// Apply `links` (popped from the back) to `current`. `this_value` is the
/// object `current` was read from, for a following optional call.
fn build(mut current: Expr, mut this_value: Option<Expr>, links: &mut Vec<Link>, ctx: &mut LoweringContext) -> Expr {
    while let Some(link) = links.pop() {
        if link.optional() {
            let (check, reference) = ctx.memoize(current);
            let rest = match link {
                Link::Member { property, computed, .. } => member(reference, property, computed),
                Link::Call { args, .. } => call_with_this(reference, this_value.take(), args),
            };
            let next_this = take_this(&rest, links);
            let rest = build(rest, next_this, links, ctx);
            return conditional(binary(BinaryOp::Eq, check, null()), Expr::undefined(), rest);
        }
        current = match link {
            Link::Member { property, computed, .. } => {
                // `a.b?.()` must call `b` with `a` as `this`
                if matches!(links.last(), Some(Link::Call { optional: true, .. })) {
                    let (check, reference) = ctx.memoize(current);
                    this_value = Some(reference);
                    member(check, property, computed)
                } else {
                    this_value = None;
                    member(current, property, computed)
                }
            }
            Link::Call { args, .. } => {
                this_value = None;
                call(current, args)
            }
        };
    }
    current
}

/// The receiver a freshly built member `rest` would need if the next link
/// is an optional call. Only memoized receivers can be reused.
fn take_this(rest: &Expr, links: &[Link]) -> Option<Expr> {
    if !matches!(links.last(), Some(Link::Call { optional: true, .. })) {
        return None;
    }
    match &rest.kind {
        ExprKind::Member { object, .. } if matches!(object.kind, ExprKind::Ident(_) | ExprKind::This) => {
            Some(object.as_ref().clone())
        }
        _ => None,
    }
}

fn member(object: Expr, property: Box<Expr>, computed: bool) -> Expr {
    let span = object.span;
    Expr::new(ExprKind::Member { object: Box::new(object), property, computed }, span)
}

fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::call(callee, args)
}

/// `callee.call(this, args)` when a receiver is known, `callee(args)`
/// otherwise.
fn call_with_this(callee: Expr, this_value: Option<Expr>, mut args: Vec<Expr>) -> Expr {
    match this_value {
        Some(this_value) => {
            args.insert(0, this_value);
            Expr::call(Expr::member(callee, "call"), args)
        }
        None => Expr::call(callee, args),
    }
}

pub(super) fn lower_nullish(expr: &mut Expr, ctx: &mut LoweringContext) -> Option<Expr> {
    let span = expr.span;
    let kind = std::mem::replace(&mut expr.kind, ExprKind::Null);
    let mut result = match kind {
        ExprKind::Logical { op: LogicalOp::NullishCoalesce, left, right } => {
            let (check, reference) = ctx.memoize(*left);
            conditional(binary(BinaryOp::NotEq, check, null()), reference, *right)
        }
        ExprKind::Assign { op: AssignOp::NullishAssign, left, right } => {
            let (read, target) = memoize_target(*left, ctx);
            conditional(binary(BinaryOp::NotEq, read, null()), target.clone(), assign(target, *right))
        }
        kind => {
            expr.kind = kind;
            return None;
        }
    };
    result.span = span;
    Some(result)
}

/// Split an assignment target into a first read, which evaluates its parts,
/// and a reference that can be read and written again.
fn memoize_target(target: Expr, ctx: &mut LoweringContext) -> (Expr, Expr) {
    let span = target.span;
    match target.kind {
        ExprKind::Member { object, property, computed } => {
            let (object_check, object_ref) = ctx.memoize(*object);
            let (property_check, property_ref) = if computed {
                ctx.memoize(*property)
            } else {
                (property.as_ref().clone(), *property)
            };
            let read = Expr::new(
                ExprKind::Member { object: Box::new(object_check), property: Box::new(property_check), computed },
                span,
            );
            let reference = Expr::new(
                ExprKind::Member { object: Box::new(object_ref), property: Box::new(property_ref), computed },
                span,
            );
            (read, reference)
        }
        kind => {
            let target = Expr::new(kind, span);
            (target.clone(), target)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::transform::tests::lowered;

    #[test]
    fn test_optional_member_on_identifier() {
        assert_eq!(lowered("x=a?.b.c;"), "x=a==null?void 0:a.b.c;");
    }

    #[test]
    fn test_complex_object_evaluated_once() {
        assert_eq!(lowered("x=f()?.b;"), "var _t1;x=(_t1=f())==null?void 0:_t1.b;");
    }

    #[test]
    fn test_nested_optional_links() {
        assert_eq!(
            lowered("x=a?.b?.c;"),
            "var _t1;x=a==null?void 0:(_t1=a.b)==null?void 0:_t1.c;"
        );
    }

    #[test]
    fn test_optional_call_keeps_receiver() {
        assert_eq!(lowered("x=o.m?.(1);"), "var _t1;x=(_t1=o.m)==null?void 0:_t1.call(o,1);");
        assert_eq!(lowered("x=f?.(1);"), "x=f==null?void 0:f(1);");
    }

    #[test]
    fn test_parenthesised_chain_ends_short_circuit() {
        assert_eq!(lowered("x=(a?.b).c;"), "x=(a==null?void 0:a.b).c;");
    }

    #[test]
    fn test_called_chain_keeps_receiver() {
        assert_eq!(lowered("(o?.m)(1);"), "(o==null?void 0:o.m).call(o,1);");
        assert_eq!(
            lowered("(f()?.a.m)();"),
            "var _t1,_t2;((_t1=f())==null?void 0:(_t2=_t1.a).m).call(_t2);"
        );
    }

    #[test]
    fn test_delete_through_chain() {
        assert_eq!(lowered("x=delete o?.a;"), "x=o==null?true:delete o.a;");
        assert_eq!(lowered("delete o?.a?.b;"), "var _t1;o==null?true:(_t1=o.a)==null?true:delete _t1.b;");
    }

    #[test]
    fn test_nullish_coalescing() {
        assert_eq!(lowered("x=a??b;"), "x=a!=null?a:b;");
        assert_eq!(lowered("x=f()??b;"), "var _t1;x=(_t1=f())!=null?_t1:b;");
    }

    #[test]
    fn test_nullish_assignment() {
        assert_eq!(lowered("x??=y;"), "x!=null?x:x=y;");
        assert_eq!(lowered("o.p??=y;"), "o.p!=null?o.p:o.p=y;");
    }

    #[test]
    fn test_other_logical_operators_kept() {
        assert_eq!(lowered("x=a&&b||c;"), "x=a&&b||c;");
    }
}
