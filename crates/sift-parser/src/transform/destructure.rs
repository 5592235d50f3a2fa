//! Destructured declarations.
//!
//! `const {a, b: [c] = d} = f();` becomes a list of plain declarators that
//! read each part in source order:
//! `const _d1 = f(), a = _d1.a, _d2 = _d1.b, _d3 = Array.from(_d2 === void 0 ? d : _d2), c = _d3[0];`
//!
//! Array patterns read from `Array.from(source)` so any iterable works.

use super::{computed_member, conditional, is_undefined, member_by_name, number, LoweringContext};
use crate::ast::*;
use crate::span::Span;

pub(super) fn lower(stmt: &mut Stmt, ctx: &mut LoweringContext) -> Option<Stmt> {
    let StmtKind::Var { kind, decls } = &mut stmt.kind else {
        return None;
    };
    if decls.iter().all(|d| matches!(d.binding.kind, BindingKind::Ident { .. })) {
        return None;
    }

    let mut out = Vec::with_capacity(decls.len());
    for decl in std::mem::take(decls) {
        let init = decl.init.unwrap_or_else(Expr::undefined);
        flatten(decl.binding, init, &mut out, ctx);
    }
    Some(Stmt::new(StmtKind::Var { kind: *kind, decls: out }, stmt.span))
}

fn declare(out: &mut Vec<VarDeclarator>, name: impl Into<String>, value: Expr) {
    out.push(VarDeclarator { binding: Binding::ident(name), init: Some(value), span: Span::default() });
}

/// `value` as an identifier, declaring a fresh one when it is anything else.
fn name_value(value: Expr, hint: &str, out: &mut Vec<VarDeclarator>, ctx: &mut LoweringContext) -> Expr {
    if value.as_ident().is_some() {
        return value;
    }
    let name = ctx.fresh(hint);
    declare(out, &name, value);
    Expr::ident(name)
}

/// `value === void 0 ? default : value`, reading `value` once.
fn with_default(
    value: Expr,
    default: Option<Expr>,
    out: &mut Vec<VarDeclarator>,
    ctx: &mut LoweringContext,
) -> Expr {
    let Some(default) = default else {
        return value;
    };
    let value = name_value(value, "d", out, ctx);
    conditional(is_undefined(value.clone()), default, value)
}

/// Bind `binding` to `value`, appending the declarators to `out`.
fn flatten(binding: Binding, value: Expr, out: &mut Vec<VarDeclarator>, ctx: &mut LoweringContext) {
    match binding.kind {
        BindingKind::Ident { name } => declare(out, name, value),
        BindingKind::Array { elements } => {
            let source = ctx.fresh("d");
            declare(out, &source, Expr::call(Expr::member(Expr::ident("Array"), "from"), vec![value]));
            let source = Expr::ident(source);
            for (index, element) in elements.into_iter().enumerate() {
                let Some(element) = element else {
                    continue;
                };
                let index = number(index as f64);
                let read = if element.rest {
                    Expr::call(Expr::member(source.clone(), "slice"), vec![index])
                } else {
                    computed_member(source.clone(), index)
                };
                let read = with_default(read, element.default, out, ctx);
                flatten(element.binding, read, out, ctx);
            }
        }
        BindingKind::Object { properties } => {
            let source = name_value(value, "d", out, ctx);
            let mut used_keys = Vec::new();
            for property in properties {
                if property.rest {
                    let rest = object_rest(source.clone(), std::mem::take(&mut used_keys), ctx);
                    flatten(property.value, rest, out, ctx);
                    continue;
                }
                let read = match property.key {
                    PropertyKey::Ident(key) | PropertyKey::String(key) | PropertyKey::Private(key) => {
                        used_keys.push(Expr::string(&key));
                        member_by_name(source.clone(), &key)
                    }
                    PropertyKey::Number(n) => {
                        used_keys.push(Expr::string(n.to_string()));
                        computed_member(source.clone(), number(n))
                    }
                    PropertyKey::Computed(key) => {
                        let name = ctx.fresh("k");
                        declare(out, &name, *key);
                        used_keys.push(Expr::ident(&name));
                        computed_member(source.clone(), Expr::ident(name))
                    }
                };
                let read = with_default(read, property.default, out, ctx);
                flatten(property.value, read, out, ctx);
            }
        }
    }
}

/// A copy of `source` without `keys`:
/// `Object.fromEntries(Object.entries(source).filter(function (e) { return [keys].indexOf(e[0]) < 0; }))`
fn object_rest(source: Expr, keys: Vec<Expr>, ctx: &mut LoweringContext) -> Expr {
    let entry = ctx.fresh("e");
    let excluded = Expr::new(ExprKind::Array(keys.into_iter().map(Some).collect()), Span::default());
    let key_of_entry = computed_member(Expr::ident(&entry), number(0.0));
    let test = super::binary(
        BinaryOp::Lt,
        Expr::call(Expr::member(excluded, "indexOf"), vec![key_of_entry]),
        number(0.0),
    );
    let filter = Function {
        name: None,
        params: vec![Param { binding: Binding::ident(entry), default: None, rest: false, span: Span::default() }],
        body: vec![Stmt::new(StmtKind::Return { arg: Some(test) }, Span::default())],
        is_async: false,
        is_generator: false,
        span: Span::default(),
    };
    let filter = Expr::new(ExprKind::Function(Box::new(filter)), Span::default());

    let entries = Expr::call(Expr::member(Expr::ident("Object"), "entries"), vec![source]);
    let kept = Expr::call(Expr::member(entries, "filter"), vec![filter]);
    Expr::call(Expr::member(Expr::ident("Object"), "fromEntries"), vec![kept])
}

#[cfg(test)]
mod tests {
    use crate::transform::tests::lowered;

    #[test]
    fn test_object_pattern() {
        assert_eq!(lowered("var {a, b: c, 'd-e': f} = o;"), "var a=o.a,c=o.b,f=o[\"d-e\"];");
    }

    #[test]
    fn test_array_pattern_with_holes_defaults_and_rest() {
        assert_eq!(
            lowered("let [x, , y = 2, ...z] = f();"),
            "let _d1=Array.from(f()),x=_d1[0],_d2=_d1[2],y=_d2===void 0?2:_d2,z=_d1.slice(3);"
        );
    }

    #[test]
    fn test_array_pattern_reads_any_iterable() {
        assert_eq!(
            lowered("const [a, b] = new Set([1, 2]);"),
            "const _d1=Array.from(new Set([1,2])),a=_d1[0],b=_d1[1];"
        );
        assert_eq!(
            lowered("let [first, ...others] = gen();"),
            "let _d1=Array.from(gen()),first=_d1[0],others=_d1.slice(1);"
        );
        assert_eq!(lowered("var [x] = xs;"), "var _d1=Array.from(xs),x=_d1[0];");
    }

    #[test]
    fn test_object_rest_excludes_named_keys() {
        assert_eq!(
            lowered("const {a = 1, ...rest} = o;"),
            "const _d1=o.a,a=_d1===void 0?1:_d1,\
             rest=Object.fromEntries(Object.entries(o).filter(function(_e2){return[\"a\"].indexOf(_e2[0])<0}));"
        );
    }

    #[test]
    fn test_nested_pattern() {
        assert_eq!(lowered("var {a: {b}, c: [d]} = o;"), "var _d1=o.a,b=_d1.b,_d2=Array.from(o.c),d=_d2[0];");
    }

    #[test]
    fn test_computed_key_evaluated_once() {
        assert_eq!(lowered("var {[k()]: v} = o;"), "var _k1=k(),v=o[_k1];");
    }

    #[test]
    fn test_plain_declarations_and_loop_heads_untouched() {
        assert_eq!(lowered("var a=1,b;"), "var a=1,b;");
        assert_eq!(lowered("for(const [k,v] of m);"), "for(const[k,v] of m);");
    }
}
