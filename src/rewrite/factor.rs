//! Common-factor extraction from sums.
//!
//! [`factor`] pulls one shared symbolic value out of the terms that contain it; [`multi_factor`]
//! reapplies until nothing more extracts. Numeric content extraction lives in the polynomial
//! module; this pass only considers symbolic factors, so it never fights the pass that
//! distributes numeric coefficients back into sums.

use super::normal::{convert_divide_to_multiply, undo_convert_divide_to_multiply};
use super::split_power;
use crate::cache::CacheSlot;
use crate::context::EngineContext;
use crate::expr::{Expr, Op};

/// Extracts one shared factor: `x * y + x * z` becomes `x * (y + z)`. Terms that do not contain
/// the factor ride along unchanged: `x^2 + x + 3` becomes `x * (x + 1) + 3`. Memoized.
pub fn factor(ctx: &EngineContext, expr: &Expr) -> Option<Expr> {
    let key = expr.to_string();
    if let Some(slot) = ctx.factor_cache.get(&key) {
        return match slot {
            CacheSlot::Result(cached) => Some(cached),
            CacheSlot::NoChange => None,
        };
    }

    let result = factor_once(expr);
    let slot = match &result {
        Some(factored) => CacheSlot::Result(factored.clone()),
        None => CacheSlot::NoChange,
    };
    ctx.factor_cache.insert(key, slot);
    result
}

/// Factors repeatedly, descending into the sums produced by earlier extractions, until no shared
/// value remains anywhere in the tree.
pub fn multi_factor(ctx: &EngineContext, expr: &Expr) -> Option<Expr> {
    let mut current = super::everywhere(expr, &|node| factor(ctx, node))?;
    while let Some(next) = super::everywhere(&current, &|node| factor(ctx, node)) {
        current = next;
    }
    Some(current)
}

fn factor_once(expr: &Expr) -> Option<Expr> {
    let terms = expr.operands_of(Op::Add)?;

    // the divide shift turns `x / y` into `x * y^-1`, so denominators participate like any
    // other factor and `x / y + x` extracts `x`
    let shifted: Vec<Expr> = terms.iter().map(convert_divide_to_multiply).collect();

    // candidate values: every non-numeric factor base appearing in any term
    let mut candidates: Vec<Expr> = Vec::new();
    for term in &shifted {
        for factor in term.factors() {
            let (base, _) = split_power(factor);
            if !base.is_number() && !candidates.contains(&base) {
                candidates.push(base);
            }
        }
    }

    for candidate in &candidates {
        let quotients: Vec<Option<Expr>> = shifted
            .iter()
            .map(|term| divide_out(term, candidate))
            .collect();
        if quotients.iter().flatten().count() < 2 {
            continue;
        }

        let mut inside = Vec::new();
        let mut outside = Vec::new();
        for (term, quotient) in terms.iter().zip(quotients) {
            match quotient {
                Some(q) => inside.push(q),
                // terms that do not contain the factor ride along in their original spelling
                None => outside.push(term.clone()),
            }
        }

        let product = Expr::mul(vec![candidate.clone(), Expr::add(inside)]);
        let product = undo_convert_divide_to_multiply(&product);
        return Some(if outside.is_empty() {
            product
        } else {
            let mut operands = vec![product];
            operands.extend(outside);
            Expr::add(operands)
        });
    }
    None
}

/// Removes one power of `value` from the term, if the term is divisible by it.
fn divide_out(term: &Expr, value: &Expr) -> Option<Expr> {
    if term == value {
        return Some(Expr::int(1));
    }

    let factors = term.factors();
    for (index, factor) in factors.iter().enumerate() {
        let replacement = if factor == value {
            None
        } else {
            let (base, exponent) = split_power(factor);
            if base != *value {
                continue;
            }
            let Some(power) = exponent.as_whole().filter(|&n| n >= 2) else {
                continue;
            };
            Some(if power == 2 {
                base
            } else {
                Expr::raise(base, Expr::int(power - 1))
            })
        };

        let mut rest: Vec<Expr> = factors.to_vec();
        match replacement {
            Some(reduced) => rest[index] = reduced,
            None => {
                rest.remove(index);
            }
        }
        return Some(if rest.is_empty() {
            Expr::int(1)
        } else {
            Expr::mul(rest)
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn factored(text: &str) -> Option<String> {
        let ctx = EngineContext::new();
        factor(&ctx, &parse(text).unwrap()).map(|e| e.to_string())
    }

    #[test]
    fn shared_symbol() {
        assert_eq!(factored("x * y + x * z").as_deref(), Some("x * (y + z)"));
        assert_eq!(factored("x^2 + x").as_deref(), Some("x * (x + 1)"));
        assert_eq!(factored("x + y"), None);
    }

    #[test]
    fn uncovered_terms_ride_along() {
        assert_eq!(factored("x * y + x * z + 3").as_deref(), Some("x * (y + z) + 3"));
    }

    #[test]
    fn shared_call() {
        assert_eq!(
            factored("sin(x) * a + sin(x) * b").as_deref(),
            Some("sin(x) * (a + b)")
        );
    }

    #[test]
    fn divides_expose_their_numerators() {
        assert_eq!(factored("x / y + x").as_deref(), Some("x * (1 / y + 1)"));
    }

    #[test]
    fn powers_reduce_by_one() {
        assert_eq!(factored("x^3 + x^2").as_deref(), Some("x * (x^2 + x)"));
    }

    #[test]
    fn multi_factor_exhausts() {
        let ctx = EngineContext::new();
        let expr = parse("x^2 * y + x * y").unwrap();
        let result = multi_factor(&ctx, &expr).unwrap();
        // both x and y extract
        assert_eq!(result.to_string(), "x * y * (x + 1)");
    }
}
