//! Invertible representational shifts.
//!
//! Subtraction rewrites into addition of negated terms so the commutative passes see one uniform
//! operator; division rewrites into multiplication by negative powers for the strategies that
//! want a pure factor list. Both shifts have exact inverses, applied before results are returned
//! to callers.

use super::{join_coefficient, split_coefficient};
use crate::expr::{Expr, Op};

/// Rewrites every subtraction into addition of negated terms: `a - b - c` becomes
/// `a + (-b) + (-c)`.
pub fn convert_subtract_to_add(expr: &Expr) -> Expr {
    transform(expr, &|node| {
        let operands = node.operands_of(Op::Subtract)?;
        let mut terms = vec![operands[0].clone()];
        terms.extend(operands[1..].iter().map(|operand| operand.clone().neg()));
        Some(Expr::add(terms))
    })
}

/// Restores subtraction spelling: a trailing run of negated terms in a sum becomes the
/// subtrahends of a `Subtract` node. A leading negated term stays where it is, so `-x + 3`
/// keeps its additive spelling while `x + (-5)` becomes `x - 5`.
pub fn undo_convert_subtract_to_add(expr: &Expr) -> Expr {
    transform(expr, &|node| {
        let operands = node.operands_of(Op::Add)?;

        let suffix_start = operands
            .iter()
            .rposition(|operand| !is_negated_term(operand))
            .map(|last_positive| last_positive + 1)
            .unwrap_or(1);
        if suffix_start == operands.len() {
            return None;
        }

        let minuend = Expr::add(operands[..suffix_start].to_vec());
        let mut subtrahends = vec![minuend];
        subtrahends.extend(operands[suffix_start..].iter().map(negate_term));
        Some(Expr::arithmetic(Op::Subtract, subtrahends))
    })
}

/// Rewrites every division into multiplication by inverse powers: `a / b / c` becomes
/// `a * b^(-1) * c^(-1)`.
pub fn convert_divide_to_multiply(expr: &Expr) -> Expr {
    transform(expr, &|node| {
        let operands = node.operands_of(Op::Divide)?;
        let mut factors = vec![operands[0].clone()];
        factors.extend(
            operands[1..]
                .iter()
                .map(|operand| Expr::raise(operand.clone(), Expr::int(-1))),
        );
        Some(Expr::mul(factors))
    })
}

/// Restores division spelling: the negative-power factors of a product become the divisor.
pub fn undo_convert_divide_to_multiply(expr: &Expr) -> Expr {
    transform(expr, &|node| {
        if let Some(operands) = node.operands_of(Op::Multiply) {
            let (inverted, plain): (Vec<&Expr>, Vec<&Expr>) =
                operands.iter().partition(|operand| invert_power(operand).is_some());
            if inverted.is_empty() {
                return None;
            }

            let numerator = if plain.is_empty() {
                Expr::int(1)
            } else {
                Expr::mul(plain.into_iter().cloned().collect())
            };
            let divisor = Expr::mul(
                inverted
                    .into_iter()
                    .map(|operand| invert_power(operand).unwrap_or_else(|| operand.clone()))
                    .collect(),
            );
            return Some(Expr::divide(numerator, divisor));
        }

        invert_power(node).map(|inverted| Expr::divide(Expr::int(1), inverted))
    })
}

/// The positive-power spelling of a negative-power factor: `x^(-2)` yields `x^2`, `x^(-1)`
/// yields `x`.
fn invert_power(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Raise)?;
    if operands.len() != 2 {
        return None;
    }
    let exponent = operands[1].as_number().filter(|n| n.is_negative())?;
    let positive = Expr::Number(exponent.negate());
    Some(if positive.is_one() {
        operands[0].clone()
    } else {
        Expr::raise(operands[0].clone(), positive)
    })
}

fn is_negated_term(term: &Expr) -> bool {
    split_coefficient(term).0.is_negative()
}

fn negate_term(term: &Expr) -> Expr {
    let (coefficient, rest) = split_coefficient(term);
    join_coefficient(coefficient.negate(), rest)
}

/// Rebuilds the tree bottom-up, applying `shift` at every node where it fires.
fn transform(expr: &Expr, shift: &dyn Fn(&Expr) -> Option<Expr>) -> Expr {
    let rebuilt = match expr {
        Expr::Number(_) | Expr::Identifier(_) => expr.clone(),
        Expr::Call(name, args) => Expr::Call(
            name.clone(),
            args.iter().map(|arg| transform(arg, shift)).collect(),
        ),
        Expr::Arithmetic(a) => Expr::arithmetic(
            a.op,
            a.operands
                .iter()
                .map(|operand| transform(operand, shift))
                .collect(),
        ),
    };
    shift(&rebuilt).unwrap_or(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn subtract_round_trip() {
        let expr = parse("x - 5").unwrap();
        let additive = convert_subtract_to_add(&expr);
        assert_eq!(additive, parse("x + -5").unwrap());
        assert_eq!(undo_convert_subtract_to_add(&additive), expr);
    }

    #[test]
    fn nested_subtractions_convert() {
        let expr = parse("10 - (2 - 5)").unwrap();
        let additive = convert_subtract_to_add(&expr);
        // the inner group becomes -1 * (2 + -5), an operand of the outer sum
        assert!(additive.operands_of(Op::Add).is_some());
        assert_eq!(additive, parse("10 + -1 * (2 + -5)").unwrap());
    }

    #[test]
    fn leading_negative_keeps_additive_spelling() {
        let expr = parse("-1 * x + 3").unwrap();
        assert_eq!(undo_convert_subtract_to_add(&expr), expr);

        let all_negative = parse("-1 * y + -2 * x").unwrap();
        let undone = undo_convert_subtract_to_add(&all_negative);
        assert_eq!(undone.to_string(), "-y - 2x");
    }

    #[test]
    fn divide_round_trip() {
        let expr = parse("x / y").unwrap();
        let multiplied = convert_divide_to_multiply(&expr);
        assert_eq!(multiplied, parse("x * y^-1").unwrap());
        assert_eq!(undo_convert_divide_to_multiply(&multiplied), expr);
    }

    #[test]
    fn lone_negative_power_becomes_reciprocal() {
        let expr = parse("y^-2").unwrap();
        assert_eq!(
            undo_convert_divide_to_multiply(&expr).to_string(),
            "1 / y^2"
        );
    }
}
