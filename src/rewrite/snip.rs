//! Identity-element removal.
//!
//! Drops operands that cannot affect the result: zero terms of a sum, unit factors of a product,
//! unit divisors, unit exponents, zero shift amounts. A zero factor collapses the whole product.
//! Structural only; no numeric folding happens here.

use crate::expr::{Expr, Op};

pub fn snip(expr: &Expr) -> Option<Expr> {
    let node = expr.as_arithmetic()?;
    match node.op {
        Op::Add | Op::BitOr => {
            let kept: Vec<Expr> = node
                .operands
                .iter()
                .filter(|operand| !operand.is_zero())
                .cloned()
                .collect();
            rebuild(node.op, kept, node.operands.len(), Expr::int(0))
        }
        Op::Multiply => {
            if node.operands.iter().any(Expr::is_zero) {
                return Some(Expr::int(0));
            }
            let kept: Vec<Expr> = node
                .operands
                .iter()
                .filter(|operand| !operand.is_one())
                .cloned()
                .collect();
            rebuild(node.op, kept, node.operands.len(), Expr::int(1))
        }
        Op::Subtract => {
            let kept = drop_trailing(&node.operands, Expr::is_zero);
            rebuild(node.op, kept, node.operands.len(), Expr::int(0))
        }
        Op::Divide => {
            let kept = drop_trailing(&node.operands, Expr::is_one);
            rebuild(node.op, kept, node.operands.len(), Expr::int(1))
        }
        Op::LeftShift | Op::RightShift => {
            let kept = drop_trailing(&node.operands, Expr::is_zero);
            rebuild(node.op, kept, node.operands.len(), Expr::int(0))
        }
        Op::Raise => {
            let mut operands = node.operands.clone();
            let mut changed = false;
            while operands.len() >= 2 {
                if operands[1].is_zero() {
                    // x^0 = 1, and the rest of the chain applies to that 1
                    operands.splice(0..2, [Expr::int(1)]);
                    changed = true;
                } else if operands[1].is_one() {
                    operands.remove(1);
                    changed = true;
                } else if operands[0].is_one() {
                    return Some(Expr::int(1));
                } else {
                    break;
                }
            }
            if changed {
                Some(Expr::arithmetic(Op::Raise, operands))
            } else if operands.len() >= 2 && operands[0].is_one() {
                Some(Expr::int(1))
            } else {
                None
            }
        }
        Op::Factorial | Op::BitAnd => None,
    }
}

/// Removes operands past the first that satisfy the predicate.
fn drop_trailing(operands: &[Expr], is_identity: impl Fn(&Expr) -> bool) -> Vec<Expr> {
    let mut kept = vec![operands[0].clone()];
    kept.extend(
        operands[1..]
            .iter()
            .filter(|operand| !is_identity(operand))
            .cloned(),
    );
    kept
}

fn rebuild(op: Op, kept: Vec<Expr>, original_len: usize, empty: Expr) -> Option<Expr> {
    if kept.len() == original_len {
        return None;
    }
    if kept.is_empty() {
        return Some(empty);
    }
    Some(Expr::arithmetic(op, kept))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn snipped(text: &str) -> Option<String> {
        snip(&parse(text).unwrap()).map(|e| e.to_string())
    }

    #[test]
    fn additive_zeros() {
        assert_eq!(snipped("x + 0 + y").as_deref(), Some("x + y"));
        assert_eq!(snipped("0 + 0").as_deref(), Some("0"));
        assert_eq!(snipped("x + y"), None);
    }

    #[test]
    fn multiplicative_identities() {
        assert_eq!(snipped("1 * x").as_deref(), Some("x"));
        assert_eq!(snipped("x * 0 * y").as_deref(), Some("0"));
        assert_eq!(snipped("2 * x"), None);
    }

    #[test]
    fn positional_identities() {
        assert_eq!(snipped("x - 0").as_deref(), Some("x"));
        assert_eq!(snipped("x / 1").as_deref(), Some("x"));
        assert_eq!(snipped("x << 0").as_deref(), Some("x"));
        // a leading zero minuend is meaningful and stays
        assert_eq!(snipped("0 - x"), None);
    }

    #[test]
    fn exponent_identities() {
        assert_eq!(snipped("x^1").as_deref(), Some("x"));
        assert_eq!(snipped("x^0").as_deref(), Some("1"));
        assert_eq!(snipped("1^x").as_deref(), Some("1"));
        // x^0^y collapses through the whole chain
        assert_eq!(snipped("x^0^y").as_deref(), Some("1"));
        assert_eq!(snipped("x^2"), None);
    }
}
