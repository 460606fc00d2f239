//! Common-denominator combining.
//!
//! A sum containing at least one fraction collapses onto the product of the distinct
//! denominators: `x / y + x` becomes `(x + x * y) / y`. Plain terms scale by the whole common
//! denominator; fraction terms scale by every distinct denominator except their own.

use crate::expr::{Expr, Op};

pub fn multiply_by_denominator(expr: &Expr) -> Option<Expr> {
    let terms = expr.operands_of(Op::Add)?;

    let mut denominators: Vec<Expr> = Vec::new();
    for term in terms {
        if let Some(denominator) = denominator_of(term) {
            if !denominators.contains(&denominator) {
                denominators.push(denominator);
            }
        }
    }
    if denominators.is_empty() {
        return None;
    }

    let scaled: Vec<Expr> = terms
        .iter()
        .map(|term| match term.operands_of(Op::Divide) {
            Some(operands) => {
                let own = denominator_of(term);
                let mut factors = vec![operands[0].clone()];
                factors.extend(
                    denominators
                        .iter()
                        .filter(|d| own.as_ref() != Some(*d))
                        .cloned(),
                );
                Expr::mul(factors)
            }
            None => {
                let mut factors = vec![term.clone()];
                factors.extend(denominators.iter().cloned());
                Expr::mul(factors)
            }
        })
        .collect();

    Some(Expr::divide(
        Expr::add(scaled),
        Expr::mul(denominators),
    ))
}

/// The denominator of a fraction term, with a multi-divisor chain viewed as one product.
fn denominator_of(term: &Expr) -> Option<Expr> {
    let operands = term.operands_of(Op::Divide)?;
    Some(Expr::mul(operands[1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn combined(text: &str) -> Option<String> {
        multiply_by_denominator(&parse(text).unwrap()).map(|e| e.to_string())
    }

    #[test]
    fn fraction_plus_plain_term() {
        assert_eq!(combined("x / y + x").as_deref(), Some("(x + x * y) / y"));
    }

    #[test]
    fn shared_denominator_collapses_once() {
        assert_eq!(combined("a / y + b / y").as_deref(), Some("(a + b) / y"));
    }

    #[test]
    fn distinct_denominators_multiply() {
        assert_eq!(
            combined("a / x + b / y").as_deref(),
            Some("(a * y + b * x) / (x * y)")
        );
    }

    #[test]
    fn no_fractions_no_change() {
        assert_eq!(combined("x + y"), None);
    }
}
