//! Symbolic integration.
//!
//! [`integrate`] runs one [`IntegrationSession`] per top-level call. A session tries strategies
//! in a fixed order: constants, linearity, constant-factor extraction, the closed-form tables,
//! trig power reduction, expansion, polynomial long division, splitting a quotient across its
//! numerator, rewriting reciprocal trig functions, u-substitution, and finally integration by
//! parts. Recursion depth and total strategy attempts are capped by a [`SessionBudget`] shared
//! with any nested sessions a substitution spawns; integration is partial and `None` means no
//! antiderivative was found within budget, not that none exists.
//!
//! Cyclic by-parts integrals (`e^x sin x` and friends) resolve through a placeholder: when a
//! nested recursion reproduces the session's original integrand it returns the placeholder
//! symbol instead of recursing, and the resulting equation is handed to the solver.

mod rules;
mod substitute;

use crate::cache::CacheSlot;
use crate::context::EngineContext;
use crate::derivative::derive;
use crate::expr::{Expr, Op};
use crate::pattern::CalculusOps;
use crate::polynomial::{degree, divide_polynomials};
use crate::rewrite::distribute::{distribute, distribute_divide, distribute_like_a_madman};
use crate::rewrite::everywhere;
use crate::simplify::shrink;
use crate::solve::solve;
use std::cell::{Cell, RefCell};

/// Stands in for the session's own integral inside a cyclic by-parts equation.
const PLACEHOLDER: &str = "@I";

/// Total strategy attempts a session may spend before giving up.
const COMPUTATION_LIMIT: u32 = 2500;

/// Integrates with respect to `symbol`. Returns the shrunken antiderivative without the constant
/// of integration, or `None` when no strategy succeeds within budget.
pub fn integrate(ctx: &EngineContext, expr: &Expr, symbol: &str) -> Option<Expr> {
    let key = format!("{} | int {}", expr, symbol);
    if let Some(slot) = ctx.integrate_cache.get(&key) {
        return match slot {
            CacheSlot::Result(cached) => Some(cached),
            CacheSlot::NoChange => None,
        };
    }

    let budget = SessionBudget::default();
    let session = IntegrationSession::new(ctx, symbol, &budget);
    let result = session
        .integrate(expr)
        .and_then(|found| resolve_placeholder(ctx, found))
        .map(|r| shrink(ctx, &r));

    if session.conclusive(&result) {
        let slot = match &result {
            Some(r) => CacheSlot::Result(r.clone()),
            None => CacheSlot::NoChange,
        };
        ctx.integrate_cache.insert(key, slot);
    }
    result
}

/// A result still carrying the placeholder is an implicit equation in the pending integral;
/// isolating the placeholder finishes the job.
pub(super) fn resolve_placeholder(ctx: &EngineContext, found: Expr) -> Option<Expr> {
    if found.contains_identifier(PLACEHOLDER) {
        solve(ctx, PLACEHOLDER, &Expr::symbol(PLACEHOLDER), &found)
    } else {
        Some(found)
    }
}

/// Depth and attempt counters for one top-level call. Nested sessions spawned by substitution
/// draw on the same budget, so the caps bound the whole call tree rather than each session.
#[derive(Default)]
pub(super) struct SessionBudget {
    depth: Cell<u32>,
    parts_depth: Cell<u32>,
    computations: Cell<u32>,
    hit_limit: Cell<bool>,
    near_parts_limit: Cell<bool>,
}

pub(crate) struct IntegrationSession<'a> {
    pub(super) ctx: &'a EngineContext,
    symbol: String,
    original: RefCell<Option<Expr>>,
    in_flight: RefCell<Vec<String>>,
    budget: &'a SessionBudget,
}

impl<'a> IntegrationSession<'a> {
    fn new(ctx: &'a EngineContext, symbol: &str, budget: &'a SessionBudget) -> Self {
        Self {
            ctx,
            symbol: symbol.to_string(),
            original: RefCell::new(None),
            in_flight: RefCell::new(Vec::new()),
            budget,
        }
    }

    /// A session over a different symbol that draws on the same budget, for inner integrals
    /// produced by substitution. The placeholder and in-flight tracking start fresh; the depth
    /// and attempt counters do not.
    pub(super) fn nested(&self, symbol: &str) -> IntegrationSession<'a> {
        IntegrationSession::new(self.ctx, symbol, self.budget)
    }

    pub(super) fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether the outcome may go into a shared cache. A failure after the budget ran out and a
    /// success computed at the by-parts depth limit are both circumstantial, not conclusive.
    pub(super) fn conclusive(&self, result: &Option<Expr>) -> bool {
        match result {
            Some(_) => !self.budget.near_parts_limit.get(),
            None => !self.budget.hit_limit.get(),
        }
    }

    pub(super) fn integrate(&self, expr: &Expr) -> Option<Expr> {
        let budget = self.budget;
        if budget.depth.get() >= self.ctx.config.integrate_depth
            || budget.computations.get() >= COMPUTATION_LIMIT
        {
            budget.hit_limit.set(true);
            return None;
        }
        budget.depth.set(budget.depth.get() + 1);
        budget.computations.set(budget.computations.get() + 1);
        let result = self.dispatch(expr);
        budget.depth.set(budget.depth.get() - 1);
        result
    }

    fn dispatch(&self, expr: &Expr) -> Option<Expr> {
        let expr = shrink(self.ctx, expr);
        let symbol = self.symbol.as_str();

        // the placeholder names a pending integral, not a value; treating it as an ordinary
        // constant would pull a function of the symbol out of the integrand
        if expr.contains_identifier(PLACEHOLDER) {
            return None;
        }

        if !expr.contains_identifier(symbol) {
            return Some(Expr::mul(vec![expr, Expr::symbol(symbol)]));
        }

        // the first call records the session's target; a later recursion that reproduces it
        // inside by parts becomes the placeholder so the cycle can be solved at the top
        {
            let mut original = self.original.borrow_mut();
            match original.as_ref() {
                None => *original = Some(expr.clone()),
                Some(first) => {
                    if self.budget.parts_depth.get() > 0 && *first == expr {
                        return Some(Expr::symbol(PLACEHOLDER));
                    }
                }
            }
        }

        // refusing re-entry into an in-flight signature breaks mutual recursion between the
        // rewriting strategies; the refusal is local to this branch, never cached
        let signature = expr.to_string();
        if self.in_flight.borrow().iter().any(|seen| *seen == signature) {
            return None;
        }

        if self.unfindable(&expr) {
            return self.by_parts(&expr);
        }

        self.in_flight.borrow_mut().push(signature);
        let result = self
            .linearity(&expr)
            .or_else(|| self.pull_constants(&expr))
            .or_else(|| self.closed_forms(&expr))
            .or_else(|| self.function_forms(&expr))
            .or_else(|| rules::trig_power_reduction(self, &expr))
            .or_else(|| self.expand(&expr))
            .or_else(|| self.polynomial_division(&expr))
            .or_else(|| self.split_quotient(&expr))
            .or_else(|| self.rewrite_trig(&expr))
            .or_else(|| substitute::substitute(self, &expr))
            .or_else(|| self.by_parts(&expr));
        self.in_flight.borrow_mut().pop();
        result
    }

    /// Integrands known to have no elementary antiderivative, like `e^(x^2)`. The strategy
    /// ladder cannot help; only by parts against a sibling factor could, so everything else is
    /// skipped.
    fn unfindable(&self, expr: &Expr) -> bool {
        let symbol = self.symbol.as_str();
        let Some(operands) = expr.operands_of(Op::Raise) else {
            return false;
        };
        operands.len() == 2
            && !operands[0].contains_identifier(symbol)
            && matches!(degree(&operands[1], &[symbol]), Some(d) if d >= 2)
    }

    fn linearity(&self, expr: &Expr) -> Option<Expr> {
        let node = expr.as_arithmetic()?;
        if !matches!(node.op, Op::Add | Op::Subtract) {
            return None;
        }
        let operands: Vec<Expr> = node
            .operands
            .iter()
            .map(|term| self.integrate(term))
            .collect::<Option<_>>()?;
        Some(Expr::arithmetic(node.op, operands))
    }

    /// Pulls symbol-free factors out of a product, and a symbol-free divisor out of a quotient.
    fn pull_constants(&self, expr: &Expr) -> Option<Expr> {
        let symbol = self.symbol.as_str();

        if let Some(factors) = expr.operands_of(Op::Multiply) {
            let (free, bound): (Vec<Expr>, Vec<Expr>) = factors
                .iter()
                .cloned()
                .partition(|factor| !factor.contains_identifier(symbol));
            if !free.is_empty() && !bound.is_empty() {
                let inner = self.integrate(&Expr::mul(bound))?;
                let mut operands = free;
                operands.push(inner);
                return Some(Expr::mul(operands));
            }
        }

        if let Some(operands) = expr.operands_of(Op::Divide) {
            let divisor = Expr::mul(operands[1..].to_vec());
            if operands[0].contains_identifier(symbol) && !divisor.contains_identifier(symbol) {
                let inner = self.integrate(&operands[0])?;
                return Some(Expr::divide(inner, divisor));
            }
        }
        None
    }

    fn closed_forms(&self, expr: &Expr) -> Option<Expr> {
        let symbol = self.symbol.as_str();
        let ops = CalculusOps {
            derive: &|e| derive(self.ctx, e, symbol),
            integrate: &|e| self.integrate(e),
        };
        rules::CLOSED_FORMS
            .iter()
            .find_map(|rule| rule.apply(expr, symbol, &ops))
    }

    fn function_forms(&self, expr: &Expr) -> Option<Expr> {
        let (name, arg) = match expr {
            Expr::Call(name, args) if args.len() == 1 => (name.as_str(), &args[0]),
            _ => return None,
        };
        if arg.as_identifier() != Some(self.symbol.as_str()) {
            return None;
        }
        let form = &rules::FUNCTION_FORMS
            .iter()
            .find(|(known, _)| *known == name)?
            .1;
        Some(form.substitute_identifier("u", arg))
    }

    /// Unrolls small whole powers of sums and distributes products over sums, then integrates
    /// the expanded polynomial-ish form term by term.
    fn expand(&self, expr: &Expr) -> Option<Expr> {
        let limit = self.ctx.config.expand_power_limit;
        let unrolled = everywhere(expr, &|e| distribute_like_a_madman(e, limit));
        let mut changed = unrolled.is_some();
        let mut current = unrolled.unwrap_or_else(|| expr.clone());

        // expand fully before shrinking, or combine would just re-fold the repeated product
        while let Some(next) = everywhere(&current, &distribute) {
            current = next;
            changed = true;
        }
        if !changed {
            return None;
        }
        self.integrate(&current)
    }

    /// Splits a rational integrand whose numerator degree reaches the divisor degree:
    /// `(x^2 + 1) / x` integrates as `x + 1/x` does.
    fn polynomial_division(&self, expr: &Expr) -> Option<Expr> {
        let symbol = self.symbol.as_str();
        let operands = expr.operands_of(Op::Divide)?;
        let numerator = &operands[0];
        let divisor = Expr::mul(operands[1..].to_vec());

        let divisor_degree = degree(&divisor, &[symbol]).filter(|d| *d >= 1)?;
        if degree(numerator, &[symbol])? < divisor_degree {
            return None;
        }

        let (quotient, remainder) = divide_polynomials(numerator, &divisor, symbol)?;
        let integrated_quotient = self.integrate(&quotient)?;
        if remainder.is_zero() {
            return Some(integrated_quotient);
        }
        let integrated_remainder = self.integrate(&Expr::divide(remainder, divisor))?;
        Some(Expr::add(vec![integrated_quotient, integrated_remainder]))
    }

    /// Splits a quotient with a sum numerator and integrates the pieces separately. The shrink
    /// pass keeps such sums over a common denominator, so the split terms go straight into the
    /// recursion without another shrink re-fusing them.
    fn split_quotient(&self, expr: &Expr) -> Option<Expr> {
        let split = distribute_divide(expr)?;
        let node = split.as_arithmetic()?;
        let operands: Vec<Expr> = node
            .operands
            .iter()
            .map(|term| self.integrate(term))
            .collect::<Option<_>>()?;
        Some(Expr::arithmetic(node.op, operands))
    }

    fn rewrite_trig(&self, expr: &Expr) -> Option<Expr> {
        let rewritten = everywhere(expr, &rules::to_sin_cos)?;
        self.integrate(&rewritten)
    }

    /// `int u dv = u v - int v du`, with the ILATE ordering choosing `u` among a product's
    /// factors. Anything that is not a product pairs with an implicit unit: `u` is the whole
    /// integrand and `dv = 1`, which handles the likes of `ln(x)^2`.
    fn by_parts(&self, expr: &Expr) -> Option<Expr> {
        let budget = self.budget;
        if budget.parts_depth.get() >= self.ctx.config.by_parts_depth {
            return None;
        }

        let symbol = self.symbol.as_str();
        let (u, dv) = match expr.operands_of(Op::Multiply) {
            Some(factors) => {
                let (u_index, _) = factors
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, factor)| ilate_class(factor, symbol))?;
                let rest = factors
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != u_index)
                    .map(|(_, f)| f.clone())
                    .collect();
                (factors[u_index].clone(), Expr::mul(rest))
            }
            None => (expr.clone(), Expr::int(1)),
        };

        budget.parts_depth.set(budget.parts_depth.get() + 1);
        let outcome = (|| {
            let v = self.integrate(&dv)?;
            let du = derive(self.ctx, &u, symbol)?;
            let inner = self.integrate(&Expr::mul(vec![v.clone(), du]))?;
            Some(Expr::subtract(Expr::mul(vec![u.clone(), v]), inner))
        })();
        if outcome.is_some() && budget.parts_depth.get() >= self.ctx.config.by_parts_depth {
            // answers from the deepest level lean on attempts the cap may have cut short
            budget.near_parts_limit.set(true);
        }
        budget.parts_depth.set(budget.parts_depth.get() - 1);
        outcome
    }
}

/// The ILATE preference order: inverse trig, then logarithms, then algebraic terms, then trig,
/// then exponentials. Lower ranks differentiate away fastest and make the better `u`.
fn ilate_class(factor: &Expr, symbol: &str) -> u8 {
    if let Expr::Call(name, _) = factor {
        return match name.as_str() {
            "asin" | "acos" | "atan" => 0,
            "ln" | "log" => 1,
            "sin" | "cos" | "tan" | "sec" | "csc" | "cot" => 3,
            _ => 5,
        };
    }
    if degree(factor, &[symbol]).is_some() {
        return 2;
    }
    if let Some(operands) = factor.operands_of(Op::Raise) {
        if !operands[0].contains_identifier(symbol) {
            return 4;
        }
    }
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn integrated(text: &str) -> Option<String> {
        let ctx = EngineContext::new();
        integrate(&ctx, &parse(text).unwrap(), "x").map(|e| e.to_string())
    }

    #[test]
    fn constants_and_powers() {
        assert_eq!(integrated("5").as_deref(), Some("5x"));
        assert_eq!(integrated("x").as_deref(), Some("x^2 / 2"));
        assert_eq!(integrated("x^2").as_deref(), Some("x^3 / 3"));
        assert_eq!(integrated("x / 4").as_deref(), Some("x^2 / 8"));
    }

    #[test]
    fn polynomials_integrate_term_by_term() {
        assert_eq!(integrated("3x^2 + 2x + 1").as_deref(), Some("x^3 + x^2 + x"));
    }

    #[test]
    fn logarithmic_and_exponential_forms() {
        assert_eq!(integrated("1 / x").as_deref(), Some("ln(abs(x))"));
        assert_eq!(integrated("e^x").as_deref(), Some("e^x"));
    }

    #[test]
    fn function_antiderivatives() {
        assert_eq!(integrated("sin(x)").as_deref(), Some("-cos(x)"));
        assert_eq!(integrated("ln(x)").as_deref(), Some("x * ln(x) - x"));
    }

    #[test]
    fn substitution() {
        assert_eq!(integrated("sin(2x)").as_deref(), Some("-cos(2x) / 2"));
        assert_eq!(integrated("2x * e^(x^2)").as_deref(), Some("e^(x^2)"));
    }

    #[test]
    fn substitution_outcomes_are_memoized() {
        let ctx = EngineContext::new();
        assert!(integrate(&ctx, &parse("sin(2x)").unwrap(), "x").is_some());
        assert!(!ctx.substitute_cache.is_empty());
    }

    #[test]
    fn nested_sessions_share_the_budget() {
        let ctx = EngineContext::new();
        let budget = SessionBudget::default();
        budget.computations.set(COMPUTATION_LIMIT);
        let session = IntegrationSession::new(&ctx, "x", &budget);

        // a substitution-spawned session inherits the spent budget instead of a fresh one
        let nested = session.nested("@ux");
        assert_eq!(nested.integrate(&parse("x").unwrap()), None);
        assert!(budget.hit_limit.get());
    }

    #[test]
    fn expansion() {
        assert_eq!(
            integrated("(x + 1)^2").as_deref(),
            Some("(x^3 + 3x^2 + 3x) / 3")
        );
    }

    #[test]
    fn long_division() {
        assert_eq!(
            integrated("(x^2 + 1) / x").as_deref(),
            Some("(x^2 + 2ln(abs(x))) / 2")
        );
    }

    #[test]
    fn by_parts() {
        assert_eq!(integrated("x * e^x").as_deref(), Some("x * e^x - e^x"));
    }

    #[test]
    fn by_parts_with_an_implicit_unit() {
        // not a product, so `u` is the whole integrand and `dv = 1`
        let ctx = EngineContext::new();
        let expr = parse("ln(x)^2").unwrap();
        let antiderivative = integrate(&ctx, &expr, "x").unwrap();
        let restored = derive(&ctx, &antiderivative, "x").unwrap();
        assert!(
            shrink(&ctx, &Expr::subtract(restored, expr)).is_zero(),
            "bad antiderivative: {}",
            antiderivative
        );
    }

    #[test]
    fn quotients_split_across_their_numerators() {
        let result = integrated("(x * sin(x) + 1) / x").unwrap();
        assert!(result.contains("cos(x)"), "unexpected result: {}", result);
        assert!(
            result.contains("ln(abs(x))"),
            "unexpected result: {}",
            result
        );
    }

    #[test]
    fn cyclic_by_parts_resolves_through_the_solver() {
        let result = integrated("e^x * sin(x)").unwrap();
        assert!(result.contains("e^x"), "unexpected result: {}", result);
        assert!(!result.contains("@I"), "placeholder leaked: {}", result);
    }

    #[test]
    fn results_at_the_by_parts_limit_are_inconclusive() {
        let ctx = EngineContext::new();
        let budget = SessionBudget::default();
        budget.parts_depth.set(ctx.config.by_parts_depth - 1);
        let session = IntegrationSession::new(&ctx, "x", &budget);

        // the answer arrives at the depth cap, so it must not reach a shared cache
        let result = session.by_parts(&parse("x * sin(x)").unwrap());
        assert!(result.is_some());
        assert!(!session.conclusive(&result));
    }

    #[test]
    fn reduction_formulas() {
        let result = integrated("sin(x)^2").unwrap();
        assert!(result.contains("cos(x)"), "unexpected result: {}", result);
    }

    #[test]
    fn linear_scaling() {
        assert_eq!(integrated("2x").as_deref(), Some("x^2"));
    }

    #[test]
    fn derivatives_of_antiderivatives_restore_the_integrand() {
        let ctx = EngineContext::new();
        for text in ["x^2", "sin(x)", "e^x", "cos(x)", "x^3 + x"] {
            let expr = parse(text).unwrap();
            let antiderivative = integrate(&ctx, &expr, "x").unwrap();
            let restored = derive(&ctx, &antiderivative, "x").unwrap();
            assert!(
                shrink(&ctx, &Expr::subtract(restored, expr)).is_zero(),
                "d/dx of the antiderivative of {} does not restore it",
                text
            );
        }
    }

    #[test]
    fn out_of_scope_integrands() {
        assert_eq!(integrated("e^(x^2)"), None);
    }
}
