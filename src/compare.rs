//! Semantic equality checks built on canonicalization.

use crate::context::EngineContext;
use crate::expr::Expr;
use crate::simplify::shrink;

/// True when the two expressions shrink to strictly equal canonical forms.
pub fn equals(ctx: &EngineContext, lhs: &Expr, rhs: &Expr) -> bool {
    shrink(ctx, lhs) == shrink(ctx, rhs)
}

/// True when the difference of the two expressions shrinks to zero. Catches cases where the
/// canonical forms differ in spelling but the terms cancel exactly.
pub fn delta_equals(ctx: &EngineContext, lhs: &Expr, rhs: &Expr) -> bool {
    if equals(ctx, lhs, rhs) {
        return true;
    }
    shrink(ctx, &Expr::subtract(lhs.clone(), rhs.clone())).is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;

    fn check(f: fn(&EngineContext, &Expr, &Expr) -> bool, lhs: &str, rhs: &str) -> bool {
        let ctx = EngineContext::new();
        f(&ctx, &parse(lhs).unwrap(), &parse(rhs).unwrap())
    }

    #[test]
    fn canonical_forms_compare_equal() {
        assert!(check(equals, "x + x", "2x"));
        assert!(check(equals, "2 + 3", "5"));
        assert!(check(equals, "3 + x", "x + 3"));
        assert!(!check(equals, "x + 1", "x + 2"));
    }

    #[test]
    fn subtraction_is_not_commutative() {
        assert!(check(equals, "a + b", "b + a"));
        assert!(!check(equals, "a - b", "b - a"));
    }

    #[test]
    fn differences_cancel() {
        assert!(check(delta_equals, "sin(x)^2 + cos(x)^2", "1"));
        assert!(check(delta_equals, "x * 3", "3x"));
        assert!(!check(delta_equals, "x", "y"));
    }
}
