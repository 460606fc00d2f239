//! Trigonometric cleanups beyond the pairwise folds in `combine`: quotient identities, the
//! squared Pythagorean variants, and parity of negated arguments.

use crate::expr::{Expr, Op};
use crate::rewrite::{join_coefficient, split_coefficient};

pub fn simplify_trig(expr: &Expr) -> Option<Expr> {
    quotient_identity(expr)
        .or_else(|| squared_identity(expr))
        .or_else(|| negated_argument(expr))
}

/// `sin(u) / cos(u)` is `tan(u)`; `cos(u) / sin(u)` is `cot(u)`.
fn quotient_identity(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Divide)?;
    if operands.len() != 2 {
        return None;
    }
    let (top, top_arg) = as_unary_call(&operands[0])?;
    let (bottom, bottom_arg) = as_unary_call(&operands[1])?;
    if top_arg != bottom_arg {
        return None;
    }
    match (top, bottom) {
        ("sin", "cos") => Some(Expr::call("tan", vec![top_arg.clone()])),
        ("cos", "sin") => Some(Expr::call("cot", vec![top_arg.clone()])),
        _ => None,
    }
}

/// `1 + tan(u)^2` is `sec(u)^2`; `1 + cot(u)^2` is `csc(u)^2`.
fn squared_identity(expr: &Expr) -> Option<Expr> {
    let terms = expr.operands_of(Op::Add)?;

    for (i, term) in terms.iter().enumerate() {
        if !term.is_one() {
            continue;
        }
        for (j, other) in terms.iter().enumerate() {
            if i == j {
                continue;
            }
            let Some((name, arg)) = squared_call(other) else {
                continue;
            };
            let replacement = match name {
                "tan" => "sec",
                "cot" => "csc",
                _ => continue,
            };
            let folded = Expr::raise(
                Expr::call(replacement, vec![arg.clone()]),
                Expr::int(2),
            );
            let rest: Vec<Expr> = terms
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i && *k != j)
                .map(|(_, t)| t.clone())
                .collect();
            if rest.is_empty() {
                return Some(folded);
            }
            let mut operands = vec![folded];
            operands.extend(rest);
            return Some(Expr::add(operands));
        }
    }
    None
}

/// Parity under negated arguments: `sin(-u)` is `-sin(u)`, `cos(-u)` is `cos(u)`.
fn negated_argument(expr: &Expr) -> Option<Expr> {
    let (name, arg) = as_unary_call(expr)?;
    let (coefficient, rest) = split_coefficient(arg);
    if !coefficient.is_negative() {
        return None;
    }
    let positivized = Expr::call(name, vec![join_coefficient(coefficient.negate(), rest)]);

    match name {
        "sin" | "tan" | "csc" | "cot" => Some(positivized.neg()),
        "cos" | "sec" => Some(positivized),
        _ => None,
    }
}

fn squared_call(expr: &Expr) -> Option<(&str, &Expr)> {
    let operands = expr.operands_of(Op::Raise)?;
    if operands.len() != 2 || operands[1].as_whole() != Some(2) {
        return None;
    }
    as_unary_call(&operands[0])
}

fn as_unary_call(expr: &Expr) -> Option<(&str, &Expr)> {
    match expr {
        Expr::Call(name, args) if args.len() == 1 => Some((name, &args[0])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn simplified(text: &str) -> Option<String> {
        simplify_trig(&parse(text).unwrap()).map(|e| e.to_string())
    }

    #[test]
    fn quotients() {
        assert_eq!(simplified("sin(x) / cos(x)").as_deref(), Some("tan(x)"));
        assert_eq!(simplified("cos(x) / sin(x)").as_deref(), Some("cot(x)"));
        assert_eq!(simplified("sin(x) / cos(y)"), None);
    }

    #[test]
    fn squared_identities() {
        assert_eq!(simplified("1 + tan(x)^2").as_deref(), Some("sec(x)^2"));
        assert_eq!(simplified("1 + cot(x)^2 + y").as_deref(), Some("csc(x)^2 + y"));
    }

    #[test]
    fn parity() {
        assert_eq!(simplified("sin(-1 * x)").as_deref(), Some("-sin(x)"));
        assert_eq!(simplified("cos(-1 * x)").as_deref(), Some("cos(x)"));
        assert_eq!(simplified("sin(x)"), None);
    }
}
