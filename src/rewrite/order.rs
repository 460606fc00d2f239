//! Term ordering within sums.
//!
//! Two orderings apply to `Add` nodes, and exactly one of them claims any given node. When every
//! term is a polynomial in the same single identifier, terms sort by descending degree
//! (`x + x^3 + 1` orders as `x^3 + x + 1`). Otherwise terms sort positives first, then negated
//! terms, then bare numbers (`2 + x - y` orders as `x - y + 2`). Both sorts are stable, so
//! repeated application settles immediately.

use super::split_coefficient;
use crate::expr::{Expr, Op};
use crate::polynomial::degree;

/// The degree of every term when the sum is a single-identifier polynomial.
fn polynomial_degrees(terms: &[Expr]) -> Option<Vec<i64>> {
    let sum = Expr::add(terms.to_vec());
    let identifier = sum.single_identifier()?;
    terms
        .iter()
        .map(|term| degree(term, &[&identifier]))
        .collect()
}

/// Orders the terms of a non-polynomial sum: positive terms, then negated terms, then numbers.
pub fn order_subtract(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Add)?;
    if polynomial_degrees(operands).is_some() {
        return None;
    }

    let mut ordered = operands.to_vec();
    ordered.sort_by_key(|term| {
        let negated = split_coefficient(term).0.is_negative();
        (term.is_number(), negated)
    });
    (ordered != operands).then(|| Expr::arithmetic(Op::Add, ordered))
}

/// Orders a single-identifier polynomial sum by descending degree.
pub fn order_polynomial(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Add)?;
    let degrees = polynomial_degrees(operands)?;

    let mut indexed: Vec<(i64, &Expr)> = degrees
        .into_iter()
        .zip(operands.iter())
        .collect();
    indexed.sort_by_key(|(degree, _)| std::cmp::Reverse(*degree));

    let ordered: Vec<Expr> = indexed.into_iter().map(|(_, term)| term.clone()).collect();
    (ordered != operands).then(|| Expr::arithmetic(Op::Add, ordered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn poly_ordered(text: &str) -> Option<String> {
        order_polynomial(&parse(text).unwrap()).map(|e| e.to_string())
    }

    #[test]
    fn descending_degree() {
        assert_eq!(poly_ordered("x + x^3 + x^2").as_deref(), Some("x^3 + x^2 + x"));
        assert_eq!(poly_ordered("3 + x").as_deref(), Some("x + 3"));
        assert_eq!(poly_ordered("x^3 + x^2 + x"), None);
    }

    #[test]
    fn leading_negative_outranks_constant() {
        assert_eq!(poly_ordered("3 + -1 * x").as_deref(), Some("-x + 3"));
    }

    #[test]
    fn mixed_identifiers_defer_to_sign_ordering() {
        // not a single-identifier polynomial, so the sign ordering claims it
        let expr = parse("2 + x + -1 * y").unwrap();
        assert_eq!(order_subtract(&expr).unwrap().to_string(), "x - y + 2");
        assert_eq!(order_polynomial(&expr), None);
    }

    #[test]
    fn stable_once_ordered() {
        let expr = parse("x + -1 * y + 2").unwrap();
        assert_eq!(order_subtract(&expr), None);
    }
}
