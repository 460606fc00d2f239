//! Equation solving by term migration.
//!
//! [`solve`] isolates the target symbol by repeatedly moving everything else across the equals
//! sign: free terms subtract off, free factors divide off, divisions and powers invert, known
//! function calls unwrap through their inverses. Equations this cannot reduce to a single
//! occurrence of the symbol (after factoring) are out of scope and yield `None`.

use crate::context::EngineContext;
use crate::expr::{Expr, Op};
use crate::rewrite::factor::multi_factor;
use crate::rewrite::normal::convert_subtract_to_add;
use crate::simplify::shrink;

/// Migration steps before giving up on a cyclic or non-reducing equation.
const SOLVE_ITERATIONS: u32 = 32;

/// Solves `lhs = rhs` for `symbol`. The symbol may start on either side.
pub fn solve(ctx: &EngineContext, symbol: &str, lhs: &Expr, rhs: &Expr) -> Option<Expr> {
    let mut left = shrink(ctx, lhs);
    let mut right = shrink(ctx, rhs);

    if !left.contains_identifier(symbol) {
        std::mem::swap(&mut left, &mut right);
    }
    if !left.contains_identifier(symbol) || right.contains_identifier(symbol) {
        // the symbol must end up on exactly one side before migration can isolate it
        left = Expr::subtract(left, right);
        right = Expr::int(0);
        left = shrink(ctx, &left);
        if !left.contains_identifier(symbol) {
            return None;
        }
    }

    for _ in 0..SOLVE_ITERATIONS {
        if left.as_identifier() == Some(symbol) {
            return Some(shrink(ctx, &right));
        }
        (left, right) = migrate(ctx, symbol, left, right)?;
    }
    None
}

/// Performs one migration step, returning the narrowed equation.
fn migrate(
    ctx: &EngineContext,
    symbol: &str,
    left: Expr,
    right: Expr,
) -> Option<(Expr, Expr)> {
    match &left {
        Expr::Arithmetic(a) => match a.op {
            Op::Add => migrate_sum(ctx, symbol, &a.operands, right),
            Op::Subtract => {
                let shifted = convert_subtract_to_add(&left);
                Some((shifted, right))
            }
            Op::Multiply => {
                let (free, bound): (Vec<Expr>, Vec<Expr>) = a
                    .operands
                    .iter()
                    .cloned()
                    .partition(|factor| !factor.contains_identifier(symbol));
                if free.is_empty() {
                    return None;
                }
                Some((
                    Expr::mul(bound),
                    Expr::divide(right, Expr::mul(free)),
                ))
            }
            Op::Divide => {
                let numerator = a.operands.first()?.clone();
                let divisor = Expr::mul(a.operands[1..].to_vec());
                if numerator.contains_identifier(symbol) {
                    if divisor.contains_identifier(symbol) {
                        return None;
                    }
                    Some((numerator, Expr::mul(vec![right, divisor])))
                } else {
                    // a / D = r isolates the denominator: D = a / r
                    Some((divisor, Expr::divide(numerator, right)))
                }
            }
            Op::Raise => {
                if a.operands.len() != 2 {
                    return None;
                }
                let base = a.operands[0].clone();
                let exponent = a.operands[1].clone();
                if base.contains_identifier(symbol) && !exponent.contains_identifier(symbol) {
                    return Some((
                        base,
                        Expr::raise(right, Expr::divide(Expr::int(1), exponent)),
                    ));
                }
                if exponent.contains_identifier(symbol) && !base.contains_identifier(symbol) {
                    let right = if base.as_identifier() == Some("e") {
                        Expr::call("ln", vec![right])
                    } else {
                        Expr::divide(
                            Expr::call("ln", vec![right]),
                            Expr::call("ln", vec![base]),
                        )
                    };
                    return Some((exponent, right));
                }
                None
            }
            _ => None,
        },
        Expr::Call(name, args) if args.len() == 1 => {
            let inverted = invert_call(name, right)?;
            Some((args[0].clone(), inverted))
        }
        _ => None,
    }
}

fn migrate_sum(
    ctx: &EngineContext,
    symbol: &str,
    terms: &[Expr],
    right: Expr,
) -> Option<(Expr, Expr)> {
    let (bound, free): (Vec<Expr>, Vec<Expr>) = terms
        .iter()
        .cloned()
        .partition(|term| term.contains_identifier(symbol));

    if !free.is_empty() {
        return Some((
            Expr::add(bound),
            Expr::subtract(right, Expr::add(free)),
        ));
    }

    // several symbol terms and nothing left to move: factoring is the only way forward
    if bound.len() > 1 {
        let sum = Expr::add(bound);
        let factored = multi_factor(ctx, &sum)?;
        if factored == sum {
            return None;
        }
        return Some((factored, right));
    }
    None
}

fn invert_call(name: &str, right: Expr) -> Option<Expr> {
    Some(match name {
        "ln" => Expr::raise(Expr::symbol("e"), right),
        "exp" => Expr::call("ln", vec![right]),
        "sqrt" => Expr::raise(right, Expr::int(2)),
        "sin" => Expr::call("asin", vec![right]),
        "cos" => Expr::call("acos", vec![right]),
        "tan" => Expr::call("atan", vec![right]),
        "asin" => Expr::call("sin", vec![right]),
        "acos" => Expr::call("cos", vec![right]),
        "atan" => Expr::call("tan", vec![right]),
        _ => return None,
    })
}
