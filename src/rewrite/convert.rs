//! Shape conversions between equivalent operator spellings.
//!
//! These rules push expressions toward the canonical shapes the other passes expect: negative
//! exponents become divisions, stacked divisions merge into one, fraction factors pull their
//! product into the numerator, numeric coefficients distribute into sums and move to the front of
//! products.

use crate::expr::{Expr, Op};

pub fn convert(expr: &Expr) -> Option<Expr> {
    negative_exponent_to_divide(expr)
        .or_else(|| zero_numerator(expr))
        .or_else(|| merge_stacked_divides(expr))
        .or_else(|| fraction_factor_into_divide(expr))
        .or_else(|| distribute_number_into_sum(expr))
        .or_else(|| absolute_value_of_even_power(expr))
        .or_else(|| move_number_to_front(expr))
}

/// `x^(-n)` becomes `1 / x^n`.
fn negative_exponent_to_divide(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Raise)?;
    if operands.len() != 2 {
        return None;
    }
    let exponent = operands[1].as_number().filter(|n| n.is_negative())?;

    let positive = Expr::Number(exponent.negate());
    let raised = if positive.is_one() {
        operands[0].clone()
    } else {
        Expr::raise(operands[0].clone(), positive)
    };
    Some(Expr::divide(Expr::int(1), raised))
}

/// `0 / x` is zero outright.
fn zero_numerator(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Divide)?;
    if operands[0].is_zero() && !operands[1..].iter().any(Expr::is_zero) {
        Some(Expr::int(0))
    } else {
        None
    }
}

/// `(a / b) / c` becomes `a / (b * c)`, and `a / (b / c)` becomes `(a * c) / b`.
fn merge_stacked_divides(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Divide)?;

    if let Some(inner) = operands[0].operands_of(Op::Divide) {
        let mut divisor = inner[1..].to_vec();
        divisor.extend_from_slice(&operands[1..]);
        return Some(Expr::divide(inner[0].clone(), Expr::mul(divisor)));
    }

    for (index, operand) in operands.iter().enumerate().skip(1) {
        if let Some(inner) = operand.operands_of(Op::Divide) {
            let mut numerator = vec![operands[0].clone()];
            numerator.extend_from_slice(&inner[1..]);

            let mut divisor = operands[1..].to_vec();
            divisor[index - 1] = inner[0].clone();
            return Some(Expr::divide(Expr::mul(numerator), Expr::mul(divisor)));
        }
    }
    None
}

/// A fraction factor pulls the whole product into one division: `a * (n / d)` becomes
/// `(a * n) / d`.
fn fraction_factor_into_divide(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Multiply)?;
    let index = operands
        .iter()
        .position(|operand| operand.operands_of(Op::Divide).is_some())?;

    let inner = operands[index].operands_of(Op::Divide)?;
    let mut numerator = vec![inner[0].clone()];
    numerator.extend(
        operands
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, operand)| operand.clone()),
    );
    Some(Expr::divide(
        Expr::mul(numerator),
        Expr::mul(inner[1..].to_vec()),
    ))
}

/// A numeric multiplier distributes into a sum factor: `5 * (x + 3)` becomes `5x + 15`. This is
/// what turns a subtracted group into its negated terms after the subtract-to-add shift.
fn distribute_number_into_sum(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Multiply)?;
    let number = operands.iter().position(Expr::is_number)?;
    let sum = operands
        .iter()
        .position(|operand| operand.operands_of(Op::Add).is_some())?;

    let multiplier = &operands[number];
    let terms = operands[sum].operands_of(Op::Add)?;
    let distributed = Expr::add(
        terms
            .iter()
            .map(|term| Expr::mul(vec![multiplier.clone(), term.clone()]))
            .collect(),
    );

    let rest: Vec<Expr> = operands
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != number && *i != sum)
        .map(|(_, operand)| operand.clone())
        .collect();
    if rest.is_empty() {
        Some(distributed)
    } else {
        let mut factors = vec![distributed];
        factors.extend(rest);
        Some(Expr::mul(factors))
    }
}

/// `abs(x^n)` for even whole `n` is just `x^n`.
fn absolute_value_of_even_power(expr: &Expr) -> Option<Expr> {
    match expr {
        Expr::Call(name, args) if name == "abs" && args.len() == 1 => {
            let operands = args[0].operands_of(Op::Raise)?;
            let power = operands.get(1)?.as_whole()?;
            (power % 2 == 0).then(|| args[0].clone())
        }
        _ => None,
    }
}

/// Moves numeric factors to the front of a product: `x * 3` becomes `3 * x`.
pub fn move_number_to_front(expr: &Expr) -> Option<Expr> {
    let operands = expr.operands_of(Op::Multiply)?;
    if operands[0].is_number() || !operands.iter().any(Expr::is_number) {
        return None;
    }

    let (numbers, rest): (Vec<Expr>, Vec<Expr>) =
        operands.iter().cloned().partition(|operand| operand.is_number());
    let mut reordered = numbers;
    reordered.extend(rest);
    Some(Expr::arithmetic(Op::Multiply, reordered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn converted(text: &str) -> Option<String> {
        convert(&parse(text).unwrap()).map(|e| e.to_string())
    }

    #[test]
    fn negative_exponents() {
        assert_eq!(converted("x^-2").as_deref(), Some("1 / x^2"));
        assert_eq!(converted("x^-1").as_deref(), Some("1 / x"));
        assert_eq!(converted("x^2"), None);
    }

    #[test]
    fn stacked_divisions() {
        assert_eq!(converted("(x / y) / z").as_deref(), Some("x / (y * z)"));
        assert_eq!(converted("x / (y / z)").as_deref(), Some("x * z / y"));
    }

    #[test]
    fn fraction_factors() {
        assert_eq!(converted("3 * (x / y)").as_deref(), Some("x * 3 / y"));
    }

    #[test]
    fn numeric_distribution() {
        assert_eq!(converted("5(x + 3)").as_deref(), Some("5x + 5 * 3"));
        assert_eq!(converted("-1 * (x + 5)").as_deref(), Some("-x + -1 * 5"));
        // non-numeric multipliers do not distribute here
        assert_eq!(converted("y * (x + 3)"), None);
    }

    #[test]
    fn misc_shapes() {
        assert_eq!(converted("0 / x").as_deref(), Some("0"));
        assert_eq!(converted("abs(x^2)").as_deref(), Some("x^2"));
        assert_eq!(converted("x * 3").as_deref(), Some("3x"));
    }
}
