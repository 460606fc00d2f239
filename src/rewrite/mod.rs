//! Local, composable tree rewrites.
//!
//! Every rewrite in this module follows one convention: a function takes `&Expr` and returns
//! `Some(rewritten)` if it applies at that node, or `None` if it does not. `None` always means
//! "no change", the routine outcome, not an error. The shrink driver composes these with
//! [`everywhere`] and loops to a fixpoint.

pub mod cancel;
pub mod combine;
pub mod convert;
pub mod distribute;
pub mod factor;
pub mod fraction;
pub mod merge;
pub mod normal;
pub mod order;
pub mod snip;

use crate::expr::{Expr, Op};

/// Applies `rule` once at every node, bottom-up. Returns `Some` if the rule fired anywhere.
pub fn everywhere(expr: &Expr, rule: &dyn Fn(&Expr) -> Option<Expr>) -> Option<Expr> {
    let mut changed = false;

    let rebuilt = match expr {
        Expr::Number(_) | Expr::Identifier(_) => expr.clone(),
        Expr::Call(name, args) => {
            let args = args
                .iter()
                .map(|arg| match everywhere(arg, rule) {
                    Some(new_arg) => {
                        changed = true;
                        new_arg
                    }
                    None => arg.clone(),
                })
                .collect();
            Expr::Call(name.clone(), args)
        }
        Expr::Arithmetic(a) => {
            let operands = a
                .operands
                .iter()
                .map(|operand| match everywhere(operand, rule) {
                    Some(new_operand) => {
                        changed = true;
                        new_operand
                    }
                    None => operand.clone(),
                })
                .collect();
            Expr::arithmetic(a.op, operands)
        }
    };

    match rule(&rebuilt) {
        Some(result) => Some(result),
        None if changed => Some(rebuilt),
        None => None,
    }
}

/// If the expression is an arithmetic node with the given operator, calls the transformation
/// function with its operand list.
pub(crate) fn do_op(
    expr: &Expr,
    op: Op,
    f: impl Fn(&[Expr]) -> Option<Expr>,
) -> Option<Expr> {
    match expr {
        Expr::Arithmetic(a) if a.op == op => f(&a.operands),
        _ => None,
    }
}

/// The numeric coefficient and remaining symbolic part of a term.
///
/// - `5` -> `(5, 1)`
/// - `3x` -> `(3, x)`
/// - `x` -> `(1, x)`
/// - `3 * x * y` -> `(3, x * y)`
pub(crate) fn split_coefficient(term: &Expr) -> (crate::numeric::Numeric, Expr) {
    use crate::numeric::Numeric;

    match term {
        Expr::Number(n) => (n.clone(), Expr::int(1)),
        Expr::Arithmetic(a) if a.op == Op::Multiply => {
            let Some(idx) = a.operands.iter().position(Expr::is_number) else {
                return (Numeric::real(1), term.clone());
            };
            let mut rest = a.operands.clone();
            let coefficient = match rest.remove(idx) {
                Expr::Number(n) => n,
                _ => unreachable!(),
            };
            (coefficient, Expr::mul(rest))
        }
        _ => (Numeric::real(1), term.clone()),
    }
}

/// Rebuilds a term from a coefficient and symbolic part, collapsing unit coefficients.
pub(crate) fn join_coefficient(coefficient: crate::numeric::Numeric, rest: Expr) -> Expr {
    if coefficient.is_zero() {
        Expr::int(0)
    } else if coefficient.is_one() {
        rest
    } else if rest.is_one() {
        Expr::Number(coefficient)
    } else {
        Expr::mul(vec![Expr::Number(coefficient), rest])
    }
}

/// The base and exponent view of a factor.
///
/// - `x^3` -> `(x, 3)`
/// - `x` -> `(x, 1)`
pub(crate) fn split_power(factor: &Expr) -> (Expr, Expr) {
    match factor {
        Expr::Arithmetic(a) if a.op == Op::Raise && a.operands.len() == 2 => {
            (a.operands[0].clone(), a.operands[1].clone())
        }
        _ => (factor.clone(), Expr::int(1)),
    }
}
