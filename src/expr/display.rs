//! Canonical display rendering.
//!
//! The rendered text doubles as the memoization cache key, so rendering must be deterministic for
//! a given tree. Formatting follows the usual conventions: numeric coefficients juxtapose with a
//! single symbolic factor (`3x`, `-x`), positional operators parenthesize nested operands
//! (`10 / (5 / 2)`), and negative or fractional exponents are parenthesized (`x^(-1)`,
//! `x^(0.5)`).

use super::{Arithmetic, Expr, Op};
use std::fmt;

/// Binding strength for parenthesization decisions. Leaves bind tightest.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Number(_) | Expr::Identifier(_) | Expr::Call(..) => 10,
        Expr::Arithmetic(a) => match a.op {
            Op::Factorial => 7,
            Op::Raise => 6,
            Op::Multiply | Op::Divide => 5,
            Op::Add | Op::Subtract => 4,
            Op::LeftShift | Op::RightShift => 3,
            Op::BitAnd => 2,
            Op::BitOr => 1,
        },
    }
}

fn is_grouped(expr: &Expr) -> bool {
    matches!(expr, Expr::Arithmetic(a) if a.grouped)
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

/// True if a numeric coefficient may juxtapose with this factor (`3x`, `2x^2`, `2sin(x)`).
fn juxtaposes(expr: &Expr) -> bool {
    match expr {
        Expr::Identifier(_) | Expr::Call(..) => true,
        Expr::Arithmetic(a) if a.op == Op::Raise => {
            matches!(a.operands.first(), Some(Expr::Identifier(_) | Expr::Call(..)))
        }
        _ => false,
    }
}

fn write_commutative(f: &mut fmt::Formatter<'_>, node: &Arithmetic) -> fmt::Result {
    let self_prec = match node.op {
        Op::Multiply => 5,
        Op::Add => 4,
        Op::BitAnd => 2,
        Op::BitOr => 1,
        _ => unreachable!(),
    };

    // `3x` / `-x` coefficient form for a two-factor product
    if node.op == Op::Multiply && node.operands.len() == 2 {
        if let (Expr::Number(n), factor) = (&node.operands[0], &node.operands[1]) {
            if n.as_real().is_some() && juxtaposes(factor) {
                if n.negate().is_one() {
                    return write!(f, "-{}", factor);
                }
                return write!(f, "{}{}", n, factor);
            }
        }
    }

    let mut first = true;
    for operand in &node.operands {
        let parens = precedence(operand) < self_prec || is_grouped(operand);
        if first {
            first = false;
        } else if node.op == Op::Add && !parens {
            // fold a leading minus sign into the join: `x + -2y` renders as `x - 2y`
            let text = operand.to_string();
            if let Some(stripped) = text.strip_prefix('-') {
                write!(f, " - {}", stripped)?;
                continue;
            }
            write!(f, " + ")?;
            write!(f, "{}", text)?;
            continue;
        } else {
            write!(f, " {} ", node.op.symbol())?;
        }
        write_operand(f, operand, parens)?;
    }
    Ok(())
}

fn write_positional(f: &mut fmt::Formatter<'_>, node: &Arithmetic) -> fmt::Result {
    let self_prec = match node.op {
        Op::Divide => 5,
        Op::Subtract => 4,
        Op::LeftShift | Op::RightShift => 3,
        _ => unreachable!(),
    };

    let mut first = true;
    for operand in &node.operands {
        let parens = if first {
            precedence(operand) < self_prec || is_grouped(operand)
        } else {
            precedence(operand) <= self_prec || is_grouped(operand)
        };
        if !first {
            write!(f, " {} ", node.op.symbol())?;
        }
        first = false;
        write_operand(f, operand, parens)?;
    }
    Ok(())
}

fn write_raise(f: &mut fmt::Formatter<'_>, node: &Arithmetic) -> fmt::Result {
    let mut first = true;
    for operand in &node.operands {
        let parens = if first {
            precedence(operand) < 7
                || is_grouped(operand)
                || matches!(operand, Expr::Number(n) if n.is_negative() || n.as_real().is_none())
        } else {
            // negative and fractional exponents always parenthesize
            precedence(operand) <= 6
                || is_grouped(operand)
                || matches!(operand, Expr::Number(n) if n.is_negative() || !n.is_whole())
        };
        if !first {
            write!(f, "^")?;
        }
        first = false;
        write_operand(f, operand, parens)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Identifier(name) => write!(f, "{}", name),
            Expr::Call(name, args) => {
                write!(f, "{}(", name)?;
                let mut iter = args.iter();
                if let Some(arg) = iter.next() {
                    write!(f, "{}", arg)?;
                    for arg in iter {
                        write!(f, ", {}", arg)?;
                    }
                }
                write!(f, ")")
            }
            Expr::Arithmetic(a) => match a.op {
                Op::Add | Op::Multiply | Op::BitAnd | Op::BitOr => write_commutative(f, a),
                Op::Subtract | Op::Divide | Op::LeftShift | Op::RightShift => {
                    write_positional(f, a)
                }
                Op::Raise => write_raise(f, a),
                Op::Factorial => {
                    let operand = &a.operands[0];
                    write_operand(f, operand, precedence(operand) < 7)?;
                    write!(f, "!")
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::parse::parse;
    use crate::expr::{Expr, Op};
    use pretty_assertions::assert_eq;

    fn rendered(text: &str) -> String {
        parse(text).unwrap().to_string()
    }

    #[test]
    fn coefficient_juxtaposition() {
        let two_x = Expr::mul(vec![Expr::int(2), Expr::symbol("x")]);
        assert_eq!(two_x.to_string(), "2x");

        let neg_x = Expr::mul(vec![Expr::int(-1), Expr::symbol("x")]);
        assert_eq!(neg_x.to_string(), "-x");

        let two_x_squared = Expr::mul(vec![
            Expr::int(2),
            Expr::raise(Expr::symbol("x"), Expr::int(2)),
        ]);
        assert_eq!(two_x_squared.to_string(), "2x^2");
    }

    #[test]
    fn positional_parenthesization() {
        assert_eq!(rendered("10 / (5 / 2)"), "10 / (5 / 2)");
        assert_eq!(rendered("(x + 1) / y"), "(x + 1) / y");
        assert_eq!(rendered("10 - (2 - 5)"), "10 - (2 - 5)");
        assert_eq!(rendered("3 / (x * y)"), "3 / (x * y)");
    }

    #[test]
    fn exponent_parenthesization() {
        let inv = Expr::raise(Expr::symbol("x"), Expr::int(-1));
        assert_eq!(inv.to_string(), "x^(-1)");

        let half = Expr::raise(Expr::symbol("x"), Expr::Number(crate::numeric::Numeric::real(0.5)));
        assert_eq!(half.to_string(), "x^(0.5)");

        assert_eq!(rendered("x^2"), "x^2");
    }

    #[test]
    fn negative_terms_fold_into_subtraction() {
        let expr = Expr::add(vec![
            Expr::symbol("x"),
            Expr::mul(vec![Expr::int(-2), Expr::symbol("y")]),
        ]);
        assert_eq!(expr.to_string(), "x - 2y");
    }

    #[test]
    fn factorial_and_bit_operators() {
        let fact = Expr::arithmetic(Op::Factorial, vec![Expr::symbol("n")]);
        assert_eq!(fact.to_string(), "n!");
        assert_eq!(rendered("x & 3"), "x & 3");
        assert_eq!(rendered("x << 2"), "x << 2");
    }
}
