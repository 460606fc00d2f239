//! Expansion rewrites.
//!
//! These run outside the shrink fixpoint loop: shrink prefers compact forms, but the calculus
//! strategies sometimes need a sum of monomials to make progress, and expand one step at a time
//! until the other passes can take over.

use crate::expr::{Expr, Op};

/// Distributes one sum factor across the rest of a product: `a * (x + y)` becomes
/// `a * x + a * y`.
pub fn distribute(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Multiply)?;
    let index = operands
        .iter()
        .position(|operand| operand.as_sum().is_some())?;

    let rest: Vec<Expr> = operands
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, operand)| operand.clone())
        .collect();
    if rest.is_empty() {
        return None;
    }

    map_sum(&operands[index], |term| {
        let mut factors = vec![term.clone()];
        factors.extend(rest.iter().cloned());
        Expr::mul(factors)
    })
}

/// Distributes a division across a sum numerator: `(a + b) / c` becomes `a / c + b / c`.
pub fn distribute_divide(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Divide)?;
    operands[0].as_sum()?;

    let divisors = &operands[1..];
    map_sum(&operands[0], |term| {
        let mut quotient = vec![term.clone()];
        quotient.extend_from_slice(divisors);
        Expr::arithmetic(Op::Divide, quotient)
    })
}

/// Unrolls a whole power of a sum into a repeated product so [`distribute`] can expand it:
/// `(x + 1)^3` becomes `(x + 1) * (x + 1) * (x + 1)`. Exponents above `limit` are left alone;
/// the blowup is exponential and rarely worth it.
pub fn distribute_like_a_madman(expr: &Expr, limit: i64) -> Option<Expr> {
    let operands = expr.operands_of(Op::Raise)?;
    if operands.len() != 2 {
        return None;
    }
    operands[0].as_sum()?;
    let power = operands[1].as_whole()?;
    if !(2..=limit).contains(&power) {
        return None;
    }

    Some(Expr::mul(
        std::iter::repeat(operands[0].clone())
            .take(power as usize)
            .collect(),
    ))
}

/// Applies `f` to each top-level term of an `Add` or `Subtract` node, preserving the operator.
fn map_sum(sum: &Expr, f: impl Fn(&Expr) -> Expr) -> Option<Expr> {
    let node = sum.as_arithmetic()?;
    Some(Expr::arithmetic(node.op, node.operands.iter().map(f).collect()))
}

impl Expr {
    /// The node viewed as a sum: its operands if it is an `Add` or `Subtract` node.
    pub(crate) fn as_sum(&self) -> Option<&[Expr]> {
        match self {
            Expr::Arithmetic(a) if matches!(a.op, Op::Add | Op::Subtract) => Some(&a.operands),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn one_step_expansion() {
        let expanded = distribute(&parse("a * (x + y)").unwrap()).unwrap();
        assert_eq!(expanded, parse("x * a + y * a").unwrap());

        let subtracted = distribute(&parse("a * (x - y)").unwrap()).unwrap();
        assert_eq!(subtracted, parse("x * a - y * a").unwrap());

        assert_eq!(distribute(&parse("a * b").unwrap()), None);
    }

    #[test]
    fn division_over_sum() {
        let expanded = distribute_divide(&parse("(a + b) / c").unwrap()).unwrap();
        assert_eq!(expanded, parse("a / c + b / c").unwrap());
    }

    #[test]
    fn power_unrolling_respects_the_limit() {
        let unrolled = distribute_like_a_madman(&parse("(x + 1)^3").unwrap(), 6).unwrap();
        assert_eq!(unrolled, parse("(x + 1)(x + 1)(x + 1)").unwrap());

        assert_eq!(distribute_like_a_madman(&parse("(x + 1)^9").unwrap(), 6), None);
        assert_eq!(distribute_like_a_madman(&parse("x^3").unwrap(), 6), None);
    }
}
