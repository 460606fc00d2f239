//! Structural flattening.
//!
//! [`Expr::arithmetic`] already merges on construction, so this pass exists for trees built by
//! hand or deserialized from elsewhere: it re-establishes the invariant that associative chains
//! are flat and singleton operand lists are collapsed.

use crate::expr::{Expr, Op};

/// Flattens nested same-operator associative chains and collapses singleton operand lists.
pub fn merge(expr: &Expr) -> Option<Expr> {
    let node = expr.as_arithmetic()?;

    let singleton = node.operands.len() == 1 && node.op != Op::Factorial;
    let nested = node.op.is_associative()
        && node
            .operands
            .iter()
            .any(|operand| operand.operands_of(node.op).is_some());

    if !singleton && !nested {
        return None;
    }
    Some(Expr::arithmetic(node.op, node.operands.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Arithmetic;
    use pretty_assertions::assert_eq;

    /// Builds an arithmetic node without the constructor's merge pass.
    fn raw(op: Op, operands: Vec<Expr>) -> Expr {
        Expr::Arithmetic(Arithmetic {
            op,
            operands,
            grouped: false,
        })
    }

    #[test]
    fn flattens_nested_add() {
        let nested = raw(
            Op::Add,
            vec![
                Expr::symbol("x"),
                raw(Op::Add, vec![Expr::symbol("y"), Expr::symbol("z")]),
            ],
        );
        let merged = merge(&nested).unwrap();
        assert_eq!(merged.as_arithmetic().unwrap().operands.len(), 3);
    }

    #[test]
    fn collapses_singleton() {
        let single = raw(Op::Multiply, vec![Expr::symbol("x")]);
        assert_eq!(merge(&single).unwrap(), Expr::symbol("x"));
    }

    #[test]
    fn leaves_positional_chains_alone() {
        let divide = raw(
            Op::Divide,
            vec![
                Expr::int(10),
                raw(Op::Divide, vec![Expr::int(5), Expr::int(2)]),
            ],
        );
        assert_eq!(merge(&divide), None);
    }
}
