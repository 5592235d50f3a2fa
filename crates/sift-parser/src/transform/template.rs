//! Template literals to string concatenation.

use super::binary;
use crate::ast::*;

/// `` `a${b}c` `` becomes `"a" + b + "c"`. The first chunk is kept even
/// when empty so the result is always a string.
pub(super) fn lower(expr: &mut Expr) -> Option<Expr> {
    let ExprKind::Template(template) = &mut expr.kind else {
        return None;
    };
    let span = expr.span;
    let mut quasis = std::mem::take(&mut template.quasis).into_iter();
    let exprs = std::mem::take(&mut template.exprs);

    let head = quasis.next().map(|q| q.cooked).unwrap_or_default();
    let mut result = Expr::new(ExprKind::String(head), span);
    for (value, quasi) in exprs.into_iter().zip(quasis) {
        result = binary(BinaryOp::Add, result, value);
        if !quasi.cooked.is_empty() {
            let chunk = Expr::string(quasi.cooked);
            result = binary(BinaryOp::Add, result, chunk);
        }
    }
    result.span = span;
    Some(result)
}

#[cfg(test)]
mod tests {
    use crate::transform::tests::lowered;

    #[test]
    fn test_lone_quasi_is_string() {
        assert_eq!(lowered("x=`plain\\ttext`;"), "x=\"plain\\ttext\";");
    }

    #[test]
    fn test_concatenation_is_left_associative() {
        assert_eq!(lowered("x=`a${1+1}b`;"), "x=\"a\"+(1+1)+\"b\";");
        assert_eq!(lowered("x=`${a}${b}`;"), "x=\"\"+a+b;");
    }

    #[test]
    fn test_nested_templates() {
        assert_eq!(lowered("x=`a${`b${c}`}`;"), "x=\"a\"+(\"b\"+c);");
    }

    #[test]
    fn test_tagged_template_untouched() {
        assert_eq!(lowered("x=tag`a${b}`;"), "x=tag`a${b}`;");
    }
}
