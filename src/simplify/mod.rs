//! Canonicalization.
//!
//! [`shrink`] drives the rewrite passes to a fixpoint and is the only notion of "simplify" in
//! this crate: two expressions are semantically equal exactly when their shrunken forms are
//! strictly equal. Canonicalization happens in additive form (subtraction rewritten away), and
//! the subtraction spelling is restored on the way out.
//!
//! Results are memoized per subtree, keyed by display text. The iteration cap bounds pathological
//! inputs; well-behaved expressions settle long before it.

pub mod trig;

use crate::cache::CacheSlot;
use crate::context::EngineContext;
use crate::expr::{Expr, Op};
use crate::polynomial::divide_polynomials;
use crate::rewrite::cancel::cancel;
use crate::rewrite::combine::combine;
use crate::rewrite::convert::convert;
use crate::rewrite::everywhere;
use crate::rewrite::fraction::multiply_by_denominator;
use crate::rewrite::merge::merge;
use crate::rewrite::normal::{convert_subtract_to_add, undo_convert_subtract_to_add};
use crate::rewrite::order::{order_polynomial, order_subtract};
use crate::rewrite::snip::snip;
use trig::simplify_trig;

/// Canonicalizes an expression. Idempotent: shrinking a shrunken expression returns it unchanged.
pub fn shrink(ctx: &EngineContext, expr: &Expr) -> Expr {
    let key = expr.to_string();
    if let Some(slot) = ctx.shrink_cache.get(&key) {
        return match slot {
            CacheSlot::Result(cached) => cached,
            CacheSlot::NoChange => expr.clone(),
        };
    }

    let result = shrink_uncached(ctx, expr);
    let slot = if result == *expr {
        CacheSlot::NoChange
    } else {
        CacheSlot::Result(result.clone())
    };
    ctx.shrink_cache.insert(key, slot);
    result
}

fn shrink_uncached(ctx: &EngineContext, expr: &Expr) -> Expr {
    // canonicalize operands first so each subtree hits the cache independently
    let recursed = match expr {
        Expr::Number(_) | Expr::Identifier(_) => expr.clone(),
        Expr::Call(name, args) => Expr::Call(
            name.clone(),
            args.iter().map(|arg| shrink(ctx, arg)).collect(),
        ),
        Expr::Arithmetic(a) => Expr::arithmetic(
            a.op,
            a.operands
                .iter()
                .map(|operand| shrink(ctx, operand))
                .collect(),
        ),
    };

    let mut current = convert_subtract_to_add(&recursed);

    // opening passes; factoring only happens inside cancellation, as an enabling step, so sums
    // the loop leaves expanded stay expanded on a re-shrink
    apply(&mut current, &combine);
    apply(&mut current, &|e| cancel(ctx, e));

    for _ in 0..ctx.config.shrink_iterations {
        let mut changed = false;
        changed |= apply(&mut current, &order_subtract);
        changed |= apply(&mut current, &combine);
        changed |= apply(&mut current, &merge);
        changed |= apply(&mut current, &snip);
        changed |= apply(&mut current, &convert);
        changed |= apply(&mut current, &|e| cancel(ctx, e));
        changed |= apply(&mut current, &simplify_trig);
        changed |= apply(&mut current, &multiply_by_denominator);
        if !changed {
            break;
        }
    }

    // final ordering runs in additive form, before subtraction spelling returns
    apply(&mut current, &order_polynomial);
    current = undo_convert_subtract_to_add(&current);
    apply(&mut current, &exact_polynomial_quotient);
    current
}

/// Applies a rule everywhere, repeatedly, until it stops firing. True if it fired at all.
fn apply(current: &mut Expr, rule: &dyn Fn(&Expr) -> Option<Expr>) -> bool {
    let mut fired = false;
    while let Some(next) = everywhere(current, rule) {
        *current = next;
        fired = true;
    }
    fired
}

/// Replaces a quotient of polynomials that divides exactly: `(x^2 - 1) / (x - 1)` becomes
/// `x + 1`. Constant divisors are left for the cancellation pass, which preserves the fraction
/// spelling.
fn exact_polynomial_quotient(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Divide)?;
    if operands.len() != 2 {
        return None;
    }

    for symbol in expr.identifiers() {
        let divisor_degree = crate::polynomial::degree(&operands[1], &[&symbol]);
        if !divisor_degree.map(|d| d >= 1).unwrap_or(false) {
            continue;
        }
        if let Some((quotient, remainder)) =
            divide_polynomials(&operands[0], &operands[1], &symbol)
        {
            if remainder.is_zero() {
                return Some(quotient);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn shrunk(text: &str) -> String {
        let ctx = EngineContext::new();
        shrink(&ctx, &parse(text).unwrap()).to_string()
    }

    #[test]
    fn numeric_collapse() {
        assert_eq!(shrunk("1 + 2 + 3"), "6");
        assert_eq!(shrunk("10 / (5 / 2)"), "4");
        assert_eq!(shrunk("10 - (2 - 5)"), "13");
        assert_eq!(shrunk("2^3^2"), "64");
    }

    #[test]
    fn like_terms_fold() {
        assert_eq!(shrunk("x + x"), "2x");
        assert_eq!(shrunk("3x + 2x - x"), "4x");
        assert_eq!(shrunk("x * x"), "x^2");
    }

    #[test]
    fn subtraction_spelling() {
        assert_eq!(shrunk("(1 + 2x) - (2 + x)"), "x - 1");
        assert_eq!(shrunk("5 - (2 + x)"), "-x + 3");
        assert_eq!(shrunk("x - -y"), "x + y");
        assert_eq!(shrunk("1 + x * -2"), "-2x + 1");
    }

    #[test]
    fn polynomial_ordering() {
        assert_eq!(shrunk("x + x^3 + x^2"), "x^3 + x^2 + x");
        assert_eq!(shrunk("3 + x"), "x + 3");
        // positional order is meaningful: 3 - x is not x - 3
        assert_eq!(shrunk("3 - x"), "-x + 3");
    }

    #[test]
    fn canonical_forms_stay_expanded() {
        // factoring only enables cancellation; it never becomes the output spelling
        assert_eq!(shrunk("x * x + x"), "x^2 + x");
        assert_eq!(shrunk("x * y + x * z"), "x * y + x * z");
    }

    #[test]
    fn fractions_combine_over_a_common_denominator() {
        assert_eq!(shrunk("x / y + x"), "(x + x * y) / y");
        assert_eq!(shrunk("a / y + b / y"), "(a + b) / y");
    }

    #[test]
    fn coefficient_sums_distribute() {
        assert_eq!(shrunk("2 * (x + 3) + 3 * (x + 3)"), "5x + 15");
    }

    #[test]
    fn exact_division_factors_out() {
        assert_eq!(shrunk("(x^2 - 1) / (x - 1)"), "x + 1");
        // inexact division keeps the fraction
        assert_eq!(shrunk("(x^2 + 1) / (x - 1)"), "(x^2 + 1) / (x - 1)");
    }

    #[test]
    fn pythagorean_identity() {
        assert_eq!(shrunk("sin(x)^2 + cos(x)^2"), "1");
        assert_eq!(shrunk("sin(x) / cos(x)"), "tan(x)");
    }

    #[test]
    fn idempotence() {
        let ctx = EngineContext::new();
        for text in ["x - 1", "-x + 3", "(x + x * y) / y", "2x + 1", "x^3 + x^2 + x"] {
            let once = shrink(&ctx, &parse(text).unwrap());
            let twice = shrink(&ctx, &once);
            assert_eq!(once, twice, "shrink not idempotent on {}", text);
        }
    }

    #[test]
    fn zero_and_identity_elements() {
        assert_eq!(shrunk("x + 0"), "x");
        assert_eq!(shrunk("x * 1"), "x");
        assert_eq!(shrunk("x * 0"), "0");
        assert_eq!(shrunk("x^0"), "1");
        assert_eq!(shrunk("x / x"), "1");
    }
}
