//! Symbolic differentiation.
//!
//! [`derive`] walks an ordered strategy list: constants, the target symbol itself, linearity over
//! sums, the product and quotient rules, a small pattern table for powers, and a function table
//! with the chain rule. Results are shrunken before they are returned or cached, so the cache
//! only ever holds canonical forms. Differentiation is partial: anything without a rule (a
//! factorial, a bitwise node, an unknown function) yields `None`.

use crate::cache::CacheSlot;
use crate::context::EngineContext;
use crate::expr::parse::parse;
use crate::expr::{Expr, Op};
use crate::pattern::{rule, CalculusOps, Rule};
use crate::simplify::shrink;
use once_cell::sync::Lazy;

/// Power and exponential rules, tried in order. The general `A^B` case at the end subsumes the
/// others but produces uglier results, so the specific shapes come first.
static RAISE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule("==2^ e A", "e^A * ~d(A)"),
        rule("==2^ NotX A", "NotX^A * ln(NotX) * ~d(A)"),
        rule("==2^ A NotX2", "NotX2 * A^(NotX2 - 1) * ~d(A)"),
        rule("==2^ A B", "A^B * (~d(B) * ln(A) + (B * ~d(A)) / A)"),
    ]
});

/// Outer derivatives of the known unary functions, written with `u` as the argument placeholder.
/// The chain rule multiplies by the argument's derivative afterwards.
static FUNCTION_RULES: Lazy<Vec<(&'static str, Expr)>> = Lazy::new(|| {
    vec![
        ("sin", template("cos(u)")),
        ("cos", template("-sin(u)")),
        ("tan", template("sec(u)^2")),
        ("sec", template("sec(u) * tan(u)")),
        ("csc", template("-csc(u) * cot(u)")),
        ("cot", template("-csc(u)^2")),
        ("asin", template("1 / sqrt(1 - u^2)")),
        ("acos", template("-1 / sqrt(1 - u^2)")),
        ("atan", template("1 / (1 + u^2)")),
        ("sinh", template("cosh(u)")),
        ("cosh", template("sinh(u)")),
        ("tanh", template("1 / cosh(u)^2")),
        ("exp", template("exp(u)")),
        ("ln", template("1 / u")),
        ("log", template("1 / (u * ln(10))")),
        ("sqrt", template("1 / (2 * sqrt(u))")),
        ("abs", template("u / abs(u)")),
    ]
});

/// Parses a table entry; the tables are literals, so failure is a programming error.
fn template(text: &str) -> Expr {
    match parse(text) {
        Ok(expr) => expr,
        Err(e) => panic!("bad derivative template `{}`: {}", text, e),
    }
}

/// Differentiates with respect to `symbol`. Returns the shrunken derivative, or `None` when no
/// rule applies to some part of the expression.
pub fn derive(ctx: &EngineContext, expr: &Expr, symbol: &str) -> Option<Expr> {
    let key = format!("{} | d{}", expr, symbol);
    if let Some(slot) = ctx.derive_cache.get(&key) {
        return match slot {
            CacheSlot::Result(cached) => Some(cached),
            CacheSlot::NoChange => None,
        };
    }

    let result = derive_uncached(ctx, expr, symbol).map(|d| shrink(ctx, &d));
    let slot = match &result {
        Some(d) => CacheSlot::Result(d.clone()),
        None => CacheSlot::NoChange,
    };
    ctx.derive_cache.insert(key, slot);
    result
}

fn derive_uncached(ctx: &EngineContext, expr: &Expr, symbol: &str) -> Option<Expr> {
    // canonicalize first so the rules below see one spelling per input
    let expr = &shrink(ctx, expr);
    if !expr.contains_identifier(symbol) {
        return Some(Expr::int(0));
    }
    if expr.as_identifier() == Some(symbol) {
        return Some(Expr::int(1));
    }

    match expr {
        Expr::Arithmetic(a) => match a.op {
            Op::Add | Op::Subtract => {
                let operands: Vec<Expr> = a
                    .operands
                    .iter()
                    .map(|operand| derive(ctx, operand, symbol))
                    .collect::<Option<_>>()?;
                Some(Expr::arithmetic(a.op, operands))
            }
            Op::Multiply => product_rule(ctx, &a.operands, symbol),
            Op::Divide => quotient_rule(ctx, &a.operands, symbol),
            Op::Raise => raise_rule(ctx, &a.operands, symbol),
            _ => None,
        },
        Expr::Call(name, args) if args.len() == 1 => {
            function_rule(ctx, name, &args[0], symbol)
        }
        _ => None,
    }
}

fn product_rule(ctx: &EngineContext, factors: &[Expr], symbol: &str) -> Option<Expr> {
    let (constant, varying): (Vec<&Expr>, Vec<&Expr>) = factors
        .iter()
        .partition(|factor| !factor.contains_identifier(symbol));

    // constant factors ride outside the derivative
    if !constant.is_empty() {
        let inner = Expr::mul(varying.iter().map(|f| (*f).clone()).collect());
        let mut operands: Vec<Expr> = constant.into_iter().cloned().collect();
        operands.push(derive(ctx, &inner, symbol)?);
        return Some(Expr::mul(operands));
    }

    // n-ary product rule: sum over each factor differentiated in place
    let terms: Vec<Expr> = (0..factors.len())
        .map(|i| {
            let derived = derive(ctx, &factors[i], symbol)?;
            let operands = factors
                .iter()
                .enumerate()
                .map(|(j, f)| if j == i { derived.clone() } else { f.clone() })
                .collect();
            Some(Expr::mul(operands))
        })
        .collect::<Option<_>>()?;
    Some(Expr::add(terms))
}

/// `(f / g)' = (f' g - f g') / g^2`, with a multi-divisor chain treated as one denominator.
fn quotient_rule(ctx: &EngineContext, operands: &[Expr], symbol: &str) -> Option<Expr> {
    let numerator = operands.first()?;
    let denominator = Expr::mul(operands[1..].to_vec());

    let numerator_d = derive(ctx, numerator, symbol)?;
    let denominator_d = derive(ctx, &denominator, symbol)?;

    let top = Expr::subtract(
        Expr::mul(vec![numerator_d, denominator.clone()]),
        Expr::mul(vec![numerator.clone(), denominator_d]),
    );
    Some(Expr::divide(top, Expr::raise(denominator, Expr::int(2))))
}

fn raise_rule(ctx: &EngineContext, operands: &[Expr], symbol: &str) -> Option<Expr> {
    // a^b^c is left associative; peel the topmost exponent so the rules see a binary node
    let node = if operands.len() > 2 {
        let (last, rest) = operands.split_last()?;
        Expr::raise(
            Expr::Arithmetic(crate::expr::Arithmetic {
                op: Op::Raise,
                operands: rest.to_vec(),
                grouped: false,
            }),
            last.clone(),
        )
    } else {
        Expr::Arithmetic(crate::expr::Arithmetic {
            op: Op::Raise,
            operands: operands.to_vec(),
            grouped: false,
        })
    };

    let ops = CalculusOps {
        derive: &|e| derive(ctx, e, symbol),
        integrate: &|_| None,
    };
    RAISE_RULES
        .iter()
        .find_map(|rule| rule.apply(&node, symbol, &ops))
}

fn function_rule(ctx: &EngineContext, name: &str, arg: &Expr, symbol: &str) -> Option<Expr> {
    let outer = FUNCTION_RULES
        .iter()
        .find(|(known, _)| *known == name)?
        .1
        .substitute_identifier("u", arg);
    let inner = derive(ctx, arg, symbol)?;
    Some(Expr::mul(vec![outer, inner]))
}
