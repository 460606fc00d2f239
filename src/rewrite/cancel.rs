//! Quotient cancellation.
//!
//! Works on `Divide` nodes, viewing numerator and denominator as factor lists. Steps run in a
//! fixed order and the first one that applies wins: exact match, shared power bases, numeric
//! coefficient GCD, sign migration out of the denominator, term-by-term distribution over a sum
//! numerator, and finally a factoring retry that exposes shared structure before giving up.
//! Memoized, including the no-change outcome.

use super::factor::multi_factor;
use super::{join_coefficient, split_coefficient, split_power};
use crate::cache::CacheSlot;
use crate::context::EngineContext;
use crate::expr::{Expr, Op};
use crate::polynomial::{
    factor_by_grouping, factor_difference_of_squares, factor_polynomial_by_gcd,
    factor_polynomial_by_rational_roots, factor_quadratic, factor_sum_of_cubes,
};

pub fn cancel(ctx: &EngineContext, expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Divide)?;

    let key = expr.to_string();
    if let Some(slot) = ctx.cancel_cache.get(&key) {
        return match slot {
            CacheSlot::Result(cached) => Some(cached),
            CacheSlot::NoChange => None,
        };
    }

    let numerator = operands[0].clone();
    let denominator = Expr::mul(operands[1..].to_vec());
    let result = cancel_quotient(ctx, &numerator, &denominator);

    let slot = match &result {
        Some(cancelled) => CacheSlot::Result(cancelled.clone()),
        None => CacheSlot::NoChange,
    };
    ctx.cancel_cache.insert(key, slot);
    result
}

fn cancel_quotient(ctx: &EngineContext, numerator: &Expr, denominator: &Expr) -> Option<Expr> {
    if numerator == denominator && !numerator.is_number() {
        return Some(Expr::int(1));
    }

    cancel_shared_bases(numerator, denominator)
        .or_else(|| cancel_numeric_gcd(numerator, denominator))
        .or_else(|| migrate_denominator_sign(numerator, denominator))
        .or_else(|| cancel_term_by_term(ctx, numerator, denominator))
        .or_else(|| cancel_after_factoring(ctx, numerator, denominator))
}

/// Cancels one shared non-numeric base between the factor lists, reducing exponents.
fn cancel_shared_bases(numerator: &Expr, denominator: &Expr) -> Option<Expr> {
    let mut top = numerator.factors().to_vec();
    let mut bottom = denominator.factors().to_vec();

    for i in 0..top.len() {
        let (base_t, exp_t) = split_power(&top[i]);
        if base_t.is_number() {
            continue;
        }
        for j in 0..bottom.len() {
            let (base_b, exp_b) = split_power(&bottom[j]);
            if base_t != base_b {
                continue;
            }

            top.remove(i);
            bottom.remove(j);
            match (exp_t.as_number(), exp_b.as_number()) {
                (Some(a), Some(b)) => {
                    let difference = a.subtract(b);
                    if difference.is_negative() {
                        bottom.push(power_of(base_t, Expr::Number(difference.negate())));
                    } else if !difference.is_zero() {
                        top.push(power_of(base_t, Expr::Number(difference)));
                    }
                }
                _ => {
                    if exp_t != exp_b {
                        top.push(power_of(
                            base_t,
                            Expr::subtract(exp_t, exp_b),
                        ));
                    }
                }
            }
            return Some(rebuild_quotient(top, bottom));
        }
    }
    None
}

/// Divides the numeric coefficients of numerator and denominator by their GCD.
fn cancel_numeric_gcd(numerator: &Expr, denominator: &Expr) -> Option<Expr> {
    let (cn, rest_n) = split_coefficient(numerator);
    let (cd, rest_d) = split_coefficient(denominator);

    let gcd = cn.gcd(&cd)?;
    if gcd.is_one() || gcd.is_zero() {
        return None;
    }

    let reduced = Expr::divide(
        join_coefficient(cn.divide(&gcd), rest_n),
        join_coefficient(cd.divide(&gcd), rest_d),
    );
    Some(collapse_unit_divisor(reduced))
}

/// Moves a negative sign out of the denominator: `x / (-2y)` becomes `-x / (2y)`.
fn migrate_denominator_sign(numerator: &Expr, denominator: &Expr) -> Option<Expr> {
    let (cd, rest_d) = split_coefficient(denominator);
    if !cd.is_negative() {
        return None;
    }
    let (cn, rest_n) = split_coefficient(numerator);
    let reduced = Expr::divide(
        join_coefficient(cn.negate(), rest_n),
        join_coefficient(cd.negate(), rest_d),
    );
    Some(collapse_unit_divisor(reduced))
}

/// Distributes the cancellation over a sum numerator, but only when every term cancels cleanly
/// (no residual fraction), so this never ping-pongs with the common-denominator pass.
fn cancel_term_by_term(ctx: &EngineContext, numerator: &Expr, denominator: &Expr) -> Option<Expr> {
    let terms = numerator.operands_of(Op::Add)?;

    let cancelled: Vec<Expr> = terms
        .iter()
        .map(|term| {
            cancel(ctx, &Expr::divide(term.clone(), denominator.clone()))
                .filter(|result| result.operands_of(Op::Divide).is_none())
        })
        .collect::<Option<_>>()?;
    Some(Expr::add(cancelled))
}

/// Factors the numerator and denominator and retries the direct steps on each factored pair.
/// Nothing factored is ever returned on its own: a factoring only survives if it actually
/// cancels, so shrink never commits a factored spelling.
fn cancel_after_factoring(
    ctx: &EngineContext,
    numerator: &Expr,
    denominator: &Expr,
) -> Option<Expr> {
    let tops = factorings(ctx, numerator);
    let bottoms = factorings(ctx, denominator);

    for (i, top) in tops.iter().enumerate() {
        for (j, bottom) in bottoms.iter().enumerate() {
            if i == 0 && j == 0 {
                // the unfactored pair already went through the direct steps
                continue;
            }
            if top == bottom && !top.is_number() {
                return Some(Expr::int(1));
            }
            if let Some(cancelled) = cancel_shared_bases(top, bottom)
                .or_else(|| cancel_numeric_gcd(top, bottom))
            {
                return Some(cancelled);
            }
        }
    }
    None
}

/// The expression itself, followed by every distinct factored spelling that applies: shared-value
/// extraction first, then the polynomial ladder.
fn factorings(ctx: &EngineContext, expr: &Expr) -> Vec<Expr> {
    let mut out = vec![expr.clone()];
    let mut push = |candidate: Option<Expr>| {
        if let Some(factored) = candidate {
            if !out.contains(&factored) {
                out.push(factored);
            }
        }
    };

    push(multi_factor(ctx, expr));
    push(factor_difference_of_squares(expr));
    push(factor_sum_of_cubes(expr));
    if let Some(symbol) = expr.single_identifier() {
        push(factor_quadratic(expr, &symbol, true));
        push(factor_polynomial_by_rational_roots(expr, &symbol));
    }
    push(factor_by_grouping(ctx, expr));
    push(factor_polynomial_by_gcd(expr));
    out
}

fn power_of(base: Expr, exponent: Expr) -> Expr {
    if exponent.is_one() {
        base
    } else {
        Expr::raise(base, exponent)
    }
}

fn rebuild_quotient(top: Vec<Expr>, bottom: Vec<Expr>) -> Expr {
    let numerator = if top.is_empty() {
        Expr::int(1)
    } else {
        Expr::mul(top)
    };
    if bottom.is_empty() {
        return numerator;
    }
    let denominator = Expr::mul(bottom);
    if denominator.is_one() {
        numerator
    } else {
        Expr::divide(numerator, denominator)
    }
}

fn collapse_unit_divisor(expr: Expr) -> Expr {
    match expr.operands_of(Op::Divide) {
        Some(operands) if operands.len() == 2 && operands[1].is_one() => operands[0].clone(),
        _ => expr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn cancelled(text: &str) -> Option<String> {
        let ctx = EngineContext::new();
        cancel(&ctx, &parse(text).unwrap()).map(|e| e.to_string())
    }

    #[test]
    fn exact_match() {
        assert_eq!(cancelled("x / x").as_deref(), Some("1"));
        assert_eq!(cancelled("sin(x) / sin(x)").as_deref(), Some("1"));
    }

    #[test]
    fn shared_bases_reduce() {
        assert_eq!(cancelled("x^3 / x").as_deref(), Some("x^2"));
        assert_eq!(cancelled("x / x^3").as_deref(), Some("1 / x^2"));
        assert_eq!(cancelled("x^a / x^b").as_deref(), Some("x^(a - b)"));
        assert_eq!(cancelled("x * y / y").as_deref(), Some("x"));
    }

    #[test]
    fn numeric_gcd() {
        assert_eq!(cancelled("2x / 4").as_deref(), Some("x / 2"));
        assert_eq!(cancelled("(6x) / (3y)").as_deref(), Some("2x / y"));
    }

    #[test]
    fn denominator_sign_migrates() {
        assert_eq!(cancelled("x / (-2 * y)").as_deref(), Some("-x / (2y)"));
    }

    #[test]
    fn term_by_term() {
        assert_eq!(cancelled("(2x + 4) / 2").as_deref(), Some("x + 2"));
        assert_eq!(cancelled("(x * y + y) / y").as_deref(), Some("x + 1"));
        // x / y leaves a residual fraction, so the sum stays put
        assert_eq!(cancelled("(x * y + x) / y"), None);
    }

    #[test]
    fn factoring_exposes_shared_structure() {
        assert_eq!(cancelled("(x^2 + x) / x").as_deref(), Some("x + 1"));
    }

    #[test]
    fn polynomial_factoring_cancels() {
        assert_eq!(cancelled("(x^2 - 9) / (x + 3)").as_deref(), Some("x - 3"));
        assert_eq!(cancelled("(x^2 + 3x + 2) / (x + 2)").as_deref(), Some("x + 1"));
        let ctx = EngineContext::new();
        let cubes = cancel(&ctx, &parse("(x^3 - 8) / (x - 2)").unwrap()).unwrap();
        assert_eq!(cubes, parse("x^2 + 2x + 4").unwrap());
        // nothing shared even after factoring
        assert_eq!(cancelled("(x^2 + 3x + 2) / (x + 3)"), None);
    }
}
