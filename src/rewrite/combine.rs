//! Pairwise operand folding.
//!
//! One application folds exactly one pair of operands and returns; the shrink loop reapplies
//! until nothing folds. For commutative operators every unordered pair is a candidate; for
//! positional operators only adjacent pairs are. Folding a non-leading adjacent pair uses the
//! operator's residual algebra: the trailing divisors of `a / b / c` multiply, the trailing
//! subtrahends of `a - b - c` add, the trailing exponents of `a ^ b ^ c` multiply.

use super::{join_coefficient, split_coefficient, split_power};
use crate::expr::{Expr, Op};
use crate::numeric::Numeric;
use crate::primitive::float;

pub fn combine(expr: &Expr) -> Option<Expr> {
    let node = expr.as_arithmetic()?;

    if node.op == Op::Factorial {
        let n = node.operands[0].as_number()?;
        return n.factorial().map(Expr::Number);
    }
    if node.operands.len() < 2 {
        return None;
    }

    if node.op.is_commutative() {
        for i in 0..node.operands.len() {
            for j in (i + 1)..node.operands.len() {
                if let Some(folded) =
                    commutative_pair(node.op, &node.operands[i], &node.operands[j])
                {
                    return Some(replace_pair(node.op, &node.operands, i, j, folded));
                }
            }
        }
    } else {
        for i in 0..node.operands.len() - 1 {
            if let Some(folded) =
                positional_pair(node.op, i, &node.operands[i], &node.operands[i + 1])
            {
                return Some(replace_pair(node.op, &node.operands, i, i + 1, folded));
            }
        }
    }
    None
}

fn replace_pair(op: Op, operands: &[Expr], i: usize, j: usize, folded: Expr) -> Expr {
    let mut operands = operands.to_vec();
    operands.remove(j);
    operands[i] = folded;
    Expr::arithmetic(op, operands)
}

fn commutative_pair(op: Op, x: &Expr, y: &Expr) -> Option<Expr> {
    match op {
        Op::Add => {
            if let (Some(a), Some(b)) = (x.as_number(), y.as_number()) {
                return Some(Expr::Number(a.add(b)));
            }
            combine_terms(x, y, 1).or_else(|| pythagorean_pair(x, y))
        }
        Op::Multiply => {
            if let (Some(a), Some(b)) = (x.as_number(), y.as_number()) {
                return Some(Expr::Number(a.multiply(b)));
            }
            combine_powers(x, y).or_else(|| trig_product(x, y))
        }
        Op::BitAnd => Some(Expr::Number(x.as_number()?.bit_and(y.as_number()?)?)),
        Op::BitOr => Some(Expr::Number(x.as_number()?.bit_or(y.as_number()?)?)),
        _ => None,
    }
}

fn positional_pair(op: Op, index: usize, x: &Expr, y: &Expr) -> Option<Expr> {
    match op {
        Op::Subtract => {
            if index == 0 {
                if let (Some(a), Some(b)) = (x.as_number(), y.as_number()) {
                    return Some(Expr::Number(a.subtract(b)));
                }
                combine_terms(x, y, -1)
            } else {
                // trailing subtrahends accumulate additively
                if let (Some(a), Some(b)) = (x.as_number(), y.as_number()) {
                    return Some(Expr::Number(a.add(b)));
                }
                combine_terms(x, y, 1)
            }
        }
        Op::Divide => {
            let a = x.as_number()?;
            let b = y.as_number()?;
            if index == 0 {
                if b.is_zero() {
                    return Some(Expr::Number(Numeric::Real(float(f64::NAN))));
                }
                Some(Expr::Number(a.divide(b)))
            } else {
                Some(Expr::Number(a.multiply(b)))
            }
        }
        Op::Raise => {
            let a = x.as_number()?;
            let b = y.as_number()?;
            if index == 0 {
                Some(Expr::Number(a.raise(b)))
            } else {
                Some(Expr::Number(a.multiply(b)))
            }
        }
        Op::LeftShift | Op::RightShift => {
            let a = x.as_number()?;
            let b = y.as_number()?;
            if index == 0 {
                let shifted = if op == Op::LeftShift {
                    a.shift_left(b)?
                } else {
                    a.shift_right(b)?
                };
                Some(Expr::Number(shifted))
            } else {
                Some(Expr::Number(a.add(b)))
            }
        }
        _ => None,
    }
}

/// Like-term folding: `3x` and `2x` fold to `5x` (or their difference for subtraction).
fn combine_terms(x: &Expr, y: &Expr, sign: i64) -> Option<Expr> {
    let (cx, rest_x) = split_coefficient(x);
    let (cy, rest_y) = split_coefficient(y);
    if rest_x.is_one() || rest_x != rest_y {
        return None;
    }
    let coefficient = if sign >= 0 {
        cx.add(&cy)
    } else {
        cx.subtract(&cy)
    };
    Some(join_coefficient(coefficient, rest_x))
}

/// Exponent laws over a shared base or shared exponent: `x^a * x^b` folds to `x^(a + b)`,
/// `2^x * 3^x` folds to `6^x`.
fn combine_powers(x: &Expr, y: &Expr) -> Option<Expr> {
    let (base_x, exp_x) = split_power(x);
    let (base_y, exp_y) = split_power(y);

    if base_x == base_y {
        let exponent = match (exp_x.as_number(), exp_y.as_number()) {
            (Some(a), Some(b)) => Expr::Number(a.add(b)),
            _ => Expr::add(vec![exp_x, exp_y]),
        };
        if exponent.is_one() {
            return Some(base_x);
        }
        return Some(Expr::raise(base_x, exponent));
    }

    if exp_x == exp_y && !exp_x.is_one() && base_x.is_number() && base_y.is_number() {
        let base = Expr::Number(base_x.as_number()?.multiply(base_y.as_number()?));
        return Some(Expr::raise(base, exp_x));
    }
    None
}

/// The squared-sine and squared-cosine terms of the Pythagorean identity fold to 1.
fn pythagorean_pair(x: &Expr, y: &Expr) -> Option<Expr> {
    let (fx, ax) = squared_trig(x)?;
    let (fy, ay) = squared_trig(y)?;
    if ax != ay {
        return None;
    }
    match (fx, fy) {
        ("sin", "cos") | ("cos", "sin") => Some(Expr::int(1)),
        _ => None,
    }
}

fn squared_trig(expr: &Expr) -> Option<(&str, &Expr)> {
    let operands = expr.operands_of(Op::Raise)?;
    if operands.len() != 2 || operands[1].as_whole() != Some(2) {
        return None;
    }
    let (name, arg) = as_unary_call(&operands[0])?;
    Some((name, arg))
}

fn as_unary_call(expr: &Expr) -> Option<(&str, &Expr)> {
    match expr {
        Expr::Call(name, args) if args.len() == 1 => Some((name, &args[0])),
        _ => None,
    }
}

/// Reciprocal and quotient trigonometric pairs inside a product.
fn trig_product(x: &Expr, y: &Expr) -> Option<Expr> {
    fn pair(x: &Expr, y: &Expr) -> Option<Expr> {
        let (fx, ax) = as_unary_call(x)?;
        let (fy, ay) = as_unary_call(y)?;
        if ax != ay {
            return None;
        }
        match (fx, fy) {
            ("sin", "csc") | ("cos", "sec") | ("tan", "cot") => Some(Expr::int(1)),
            ("tan", "cos") => Some(Expr::call("sin", vec![ax.clone()])),
            ("cot", "sin") => Some(Expr::call("cos", vec![ax.clone()])),
            ("sin", "sec") => Some(Expr::call("tan", vec![ax.clone()])),
            ("cos", "csc") => Some(Expr::call("cot", vec![ax.clone()])),
            _ => None,
        }
    }
    pair(x, y).or_else(|| pair(y, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn combined(text: &str) -> Option<String> {
        combine(&parse(text).unwrap()).map(|e| e.to_string())
    }

    #[test]
    fn numeric_folds() {
        assert_eq!(combined("2 + 3").as_deref(), Some("5"));
        assert_eq!(combined("2 * 3 * x").as_deref(), Some("6x"));
        assert_eq!(combined("10 / 5 / 2").as_deref(), Some("2 / 2"));
        assert_eq!(combined("2^10").as_deref(), Some("1024"));
        assert_eq!(combined("6 & 3").as_deref(), Some("2"));
        assert_eq!(combined("1 << 4").as_deref(), Some("16"));
        assert_eq!(combined("5!").as_deref(), Some("120"));
    }

    #[test]
    fn like_terms() {
        assert_eq!(combined("x + x").as_deref(), Some("2x"));
        assert_eq!(combined("3x + 2x").as_deref(), Some("5x"));
        assert_eq!(combined("y + 3x + 2x").as_deref(), Some("y + 5x"));
        assert_eq!(combined("x - x").as_deref(), Some("0"));
        assert_eq!(combined("x + y"), None);
    }

    #[test]
    fn exponent_laws() {
        assert_eq!(combined("x * x").as_deref(), Some("x^2"));
        assert_eq!(combined("x^2 * x^3").as_deref(), Some("x^5"));
        assert_eq!(combined("x^a * x^b").as_deref(), Some("x^(a + b)"));
        assert_eq!(combined("2^x * 3^x").as_deref(), Some("6^x"));
    }

    #[test]
    fn trailing_positional_algebra() {
        // a - b - c: the trailing subtrahends add
        assert_eq!(combined("x - 2 - 3").as_deref(), Some("x - 5"));
        // a / b / c: the trailing divisors multiply
        assert_eq!(combined("x / 2 / 3").as_deref(), Some("x / 6"));
        // a ^ b ^ c: the trailing exponents multiply
        assert_eq!(combined("x^2^3").as_deref(), Some("x^6"));
    }

    #[test]
    fn trig_identities() {
        assert_eq!(combined("sin(x)^2 + cos(x)^2").as_deref(), Some("1"));
        assert_eq!(combined("tan(x) * cos(x)").as_deref(), Some("sin(x)"));
        assert_eq!(combined("sin(x) * csc(x)").as_deref(), Some("1"));
        assert_eq!(combined("sin(x)^2 + cos(y)^2"), None);
    }

    #[test]
    fn division_by_zero_is_nan() {
        let folded = combine(&parse("1 / 0").unwrap()).unwrap();
        assert!(folded.as_number().unwrap().is_nan());
    }
}
