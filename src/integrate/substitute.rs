//! Generic u-substitution.
//!
//! Candidate inner expressions come from call arguments, power bases and exponents, and
//! denominators. A candidate `u` works when dividing the integrand by `du/dx` and replacing `u`
//! with a fresh symbol leaves nothing depending on the original symbol; the inner integral then
//! runs in a nested session over the fresh symbol, drawing on the caller's budget.
//!
//! Outcomes are memoized per `(integrand, symbol)` alongside the other rewrite caches.

use super::IntegrationSession;
use crate::cache::CacheSlot;
use crate::derivative::derive;
use crate::expr::{Expr, Op};
use crate::simplify::shrink;

pub(super) fn substitute(session: &IntegrationSession<'_>, expr: &Expr) -> Option<Expr> {
    let key = format!("{} | sub {}", expr, session.symbol());
    if let Some(slot) = session.ctx.substitute_cache.get(&key) {
        return match slot {
            CacheSlot::Result(cached) => Some(cached),
            CacheSlot::NoChange => None,
        };
    }

    let result = substitute_uncached(session, expr);
    if session.conclusive(&result) {
        let slot = match &result {
            Some(found) => CacheSlot::Result(found.clone()),
            None => CacheSlot::NoChange,
        };
        session.ctx.substitute_cache.insert(key, slot);
    }
    result
}

fn substitute_uncached(session: &IntegrationSession<'_>, expr: &Expr) -> Option<Expr> {
    let symbol = session.symbol();
    // fresh inner symbol; prefixing keeps nested substitutions distinct
    let inner_symbol = format!("@u{}", symbol);

    for candidate in candidates(expr, symbol) {
        let Some(du) = derive(session.ctx, &candidate, symbol) else {
            continue;
        };
        if du.is_zero() {
            continue;
        }

        let quotient = shrink(session.ctx, &Expr::divide(expr.clone(), du));
        let (replaced, count) =
            quotient.substitute_value(&candidate, &Expr::symbol(&inner_symbol));
        if count == 0 || replaced.contains_identifier(symbol) {
            continue;
        }

        let inner = session
            .nested(&inner_symbol)
            .integrate(&replaced)
            .and_then(|found| super::resolve_placeholder(session.ctx, found));
        let Some(inner) = inner else {
            continue;
        };
        return Some(inner.substitute_identifier(&inner_symbol, &candidate));
    }
    None
}

/// Collects substitution candidates: any call argument, power base or exponent, or denominator
/// that depends on the symbol without being the bare symbol itself.
fn candidates(expr: &Expr, symbol: &str) -> Vec<Expr> {
    fn consider(node: &Expr, symbol: &str, out: &mut Vec<Expr>) {
        if node.contains_identifier(symbol)
            && node.as_identifier() != Some(symbol)
            && !out.contains(node)
        {
            out.push(node.clone());
        }
    }

    fn walk(expr: &Expr, symbol: &str, out: &mut Vec<Expr>) {
        match expr {
            Expr::Number(_) | Expr::Identifier(_) => {}
            Expr::Call(_, args) => {
                for arg in args {
                    consider(arg, symbol, out);
                    walk(arg, symbol, out);
                }
            }
            Expr::Arithmetic(a) => {
                match a.op {
                    Op::Raise => {
                        for operand in &a.operands {
                            consider(operand, symbol, out);
                        }
                    }
                    Op::Divide => {
                        for operand in &a.operands[1..] {
                            consider(operand, symbol, out);
                        }
                    }
                    _ => {}
                }
                for operand in &a.operands {
                    walk(operand, symbol, out);
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(expr, symbol, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;

    #[test]
    fn candidate_collection() {
        let expr = parse("sin(x^2) / (x + 1)").unwrap();
        let found = candidates(&expr, "x");
        assert!(found.contains(&parse("x^2").unwrap()));
        assert!(found.contains(&parse("x + 1").unwrap()));
        // the bare symbol is never a candidate
        assert!(!found.contains(&parse("x").unwrap()));
    }

    #[test]
    fn free_arguments_are_skipped() {
        let expr = parse("sin(y) * x").unwrap();
        assert!(candidates(&expr, "x").is_empty());
    }
}
