//! Polynomial structure: degrees, coefficient extraction, long division, and the factoring
//! ladder (content GCD, difference of squares and cubes, quadratics, rational roots, grouping).
//!
//! Coefficient arithmetic runs on exact rationals, converting from the float leaves on the way in
//! and back on the way out, so divisions and root tests never suffer rounding. Any coefficient
//! that is not an exact rational (a complex value, an infinity) simply disqualifies the
//! expression from polynomial treatment.

use crate::context::EngineContext;
use crate::expr::{Expr, Op};
use crate::numeric::Numeric;
use crate::primitive::float;
use crate::rewrite::factor::multi_factor;
use crate::rewrite::normal::convert_subtract_to_add;
use crate::rewrite::{join_coefficient, split_coefficient, split_power};
use crate::simplify::shrink;
use rug::{ops::Pow, Integer, Rational};

/// The degree sentinel for the zero polynomial.
pub const ZERO_DEGREE: i64 = -1;

/// The structural degree of an expression in the given symbols, or `None` if it is not
/// polynomial in them. The zero polynomial reports [`ZERO_DEGREE`].
pub fn degree(expr: &Expr, symbols: &[&str]) -> Option<i64> {
    let free = |e: &Expr| !symbols.iter().any(|s| e.contains_identifier(s));

    match expr {
        Expr::Number(n) => Some(if n.is_zero() { ZERO_DEGREE } else { 0 }),
        Expr::Identifier(id) => Some(i64::from(symbols.contains(&id.as_str()))),
        Expr::Call(..) => free(expr).then_some(0),
        Expr::Arithmetic(a) => match a.op {
            Op::Add | Op::Subtract => a
                .operands
                .iter()
                .map(|operand| degree(operand, symbols))
                .try_fold(ZERO_DEGREE, |max, d| Some(max.max(d?))),
            Op::Multiply => {
                let degrees: Vec<i64> = a
                    .operands
                    .iter()
                    .map(|operand| degree(operand, symbols))
                    .collect::<Option<_>>()?;
                if degrees.contains(&ZERO_DEGREE) {
                    Some(ZERO_DEGREE)
                } else {
                    Some(degrees.into_iter().sum())
                }
            }
            Op::Divide => {
                let first = degree(&a.operands[0], symbols)?;
                if first == ZERO_DEGREE {
                    return Some(ZERO_DEGREE);
                }
                let rest: i64 = a.operands[1..]
                    .iter()
                    .map(|operand| degree(operand, symbols))
                    .try_fold(0, |sum, d| Some(sum + d?))?;
                // a denominator outdegreeing the numerator is not polynomial, and a negative
                // value would collide with the zero sentinel
                let difference = first - rest;
                (difference >= 0).then_some(difference)
            }
            Op::Raise => {
                if a.operands.len() != 2 || !free(&a.operands[1]) {
                    return None;
                }
                match a.operands[1].as_whole() {
                    Some(n) if n >= 0 => {
                        let base = degree(&a.operands[0], symbols)?;
                        Some(match base {
                            ZERO_DEGREE if n > 0 => ZERO_DEGREE,
                            ZERO_DEGREE => 0,
                            d => d * n,
                        })
                    }
                    _ => free(&a.operands[0]).then_some(0),
                }
            }
            Op::Factorial | Op::BitAnd | Op::BitOr | Op::LeftShift | Op::RightShift => {
                free(expr).then_some(0)
            }
        },
    }
}

/// The degree of the canonical (shrunken) form.
pub fn shrunken_degree(ctx: &EngineContext, expr: &Expr, symbols: &[&str]) -> Option<i64> {
    degree(&shrink(ctx, expr), symbols)
}

pub fn is_polynomial(expr: &Expr, symbols: &[&str]) -> bool {
    degree(expr, symbols).is_some()
}

fn to_rational(n: &Numeric) -> Option<Rational> {
    match n {
        Numeric::Real(f) => f.to_rational(),
        Numeric::Complex(_) => None,
    }
}

fn from_rational(r: &Rational) -> Numeric {
    Numeric::Real(float(r))
}

/// One additive term viewed as `c * symbol^k` with rational `c`.
fn monomial(term: &Expr, symbol: &str) -> Option<(usize, Rational)> {
    let mut power = 0usize;
    let mut coefficient = Rational::from(1);

    for factor in term.factors() {
        if let Some(n) = factor.as_number() {
            coefficient *= to_rational(n)?;
            continue;
        }
        if factor.as_identifier() == Some(symbol) {
            power += 1;
            continue;
        }
        let (base, exponent) = split_power(factor);
        if base.as_identifier() == Some(symbol) {
            let n = exponent.as_whole().filter(|&n| n >= 1)?;
            power += n as usize;
            continue;
        }
        return None;
    }
    Some((power, coefficient))
}

/// Dense ascending coefficient vector, trailing zeros trimmed; the zero polynomial is the empty
/// vector.
fn coefficient_vector(expr: &Expr, symbol: &str) -> Option<Vec<Rational>> {
    let additive = convert_subtract_to_add(expr);
    let single = [additive.clone()];
    let terms = additive.operands_of(Op::Add).unwrap_or(&single);

    let mut coefficients: Vec<Rational> = Vec::new();
    for term in terms {
        let (power, value) = monomial(term, symbol)?;
        if coefficients.len() <= power {
            coefficients.resize(power + 1, Rational::new());
        }
        coefficients[power] += value;
    }
    trim(&mut coefficients);
    Some(coefficients)
}

fn trim(coefficients: &mut Vec<Rational>) {
    while coefficients.last().map(|c| *c == 0).unwrap_or(false) {
        coefficients.pop();
    }
}

/// The coefficients of the expression as a polynomial in `symbol`, constant term first.
pub fn coefficients(expr: &Expr, symbol: &str) -> Option<Vec<Numeric>> {
    let vector = coefficient_vector(expr, symbol)?;
    Some(vector.iter().map(from_rational).collect())
}

/// Rebuilds an expression from an ascending coefficient vector, highest power first.
fn poly_from_coefficients(coefficients: &[Rational], symbol: &str) -> Expr {
    let mut terms = Vec::new();
    for (power, c) in coefficients.iter().enumerate().rev() {
        if *c == 0 {
            continue;
        }
        let coefficient = from_rational(c);
        let term = match power {
            0 => Expr::Number(coefficient),
            1 => join_coefficient(coefficient, Expr::symbol(symbol)),
            _ => join_coefficient(
                coefficient,
                Expr::raise(Expr::symbol(symbol), Expr::int(power as i64)),
            ),
        };
        terms.push(term);
    }
    if terms.is_empty() {
        Expr::int(0)
    } else {
        Expr::add(terms)
    }
}

/// Schoolbook long division of single-symbol polynomials. Returns `(quotient, remainder)`, or
/// `None` when either input is not a polynomial in `symbol` or the divisor is zero.
pub fn divide_polynomials(
    dividend: &Expr,
    divisor: &Expr,
    symbol: &str,
) -> Option<(Expr, Expr)> {
    let mut remainder = coefficient_vector(dividend, symbol)?;
    let divisor = coefficient_vector(divisor, symbol)?;
    if divisor.is_empty() {
        return None;
    }

    let mut quotient =
        vec![Rational::new(); remainder.len().saturating_sub(divisor.len()) + 1];
    while remainder.len() >= divisor.len() {
        let shift = remainder.len() - divisor.len();
        let factor =
            remainder[remainder.len() - 1].clone() / &divisor[divisor.len() - 1];
        for (offset, c) in divisor.iter().enumerate() {
            let product = c.clone() * &factor;
            remainder[shift + offset] -= product;
        }
        quotient[shift] = factor;
        trim(&mut remainder);
    }

    Some((
        poly_from_coefficients(&quotient, symbol),
        poly_from_coefficients(&remainder, symbol),
    ))
}

/// Extracts the numeric content of a sum: `2x + 4` becomes `2 * (x + 2)`.
pub fn factor_polynomial_by_gcd(expr: &Expr) -> Option<Expr> {
    let terms = expr.operands_of(Op::Add)?;

    let split: Vec<(Numeric, Expr)> = terms.iter().map(split_coefficient).collect();
    let mut gcd: Option<Integer> = None;
    for (coefficient, _) in &split {
        let whole = coefficient.to_integer()?;
        gcd = Some(match gcd {
            Some(g) => g.gcd(&whole),
            None => whole.abs(),
        });
    }
    let gcd = gcd?;
    if gcd <= 1 {
        return None;
    }

    let content = Numeric::Real(float(&gcd));
    let inner = Expr::add(
        split
            .into_iter()
            .map(|(coefficient, rest)| join_coefficient(coefficient.divide(&content), rest))
            .collect(),
    );
    Some(Expr::mul(vec![Expr::Number(content), inner]))
}

/// Exact square root of a non-negative rational, if both numerator and denominator are perfect
/// squares.
fn rational_sqrt(value: &Rational) -> Option<Rational> {
    if *value < 0 {
        return None;
    }
    let (numer, denom) = (value.numer(), value.denom());
    if !numer.is_perfect_square() || !denom.is_perfect_square() {
        return None;
    }
    Some(Rational::from((
        numer.clone().sqrt(),
        denom.clone().sqrt(),
    )))
}

/// Factors `a x^2 + b x + c` over the rationals. With `neat` set, only factors when the roots
/// are exactly rational (the discriminant is a perfect square); otherwise irrational real roots
/// are emitted as float leaves. Complex roots never factor.
pub fn factor_quadratic(expr: &Expr, symbol: &str, neat: bool) -> Option<Expr> {
    let coefficients = coefficient_vector(expr, symbol)?;
    if coefficients.len() != 3 {
        return None;
    }
    let (c, b, a) = (
        coefficients[0].clone(),
        coefficients[1].clone(),
        coefficients[2].clone(),
    );

    let discriminant = b.clone() * &b - Rational::from(4) * a.clone() * &c;
    if discriminant < 0 {
        return None;
    }

    let two_a = Rational::from(2) * a.clone();
    let linear = |root: Rational| {
        // (x - root)
        poly_from_coefficients(&[-root, Rational::from(1)], symbol)
    };

    let mut factors = Vec::new();
    if a != 1 {
        factors.push(Expr::Number(from_rational(&a)));
    }

    match rational_sqrt(&discriminant) {
        Some(root_disc) => {
            let r1 = (-b.clone() + &root_disc) / &two_a;
            let r2 = (-b - &root_disc) / &two_a;
            if r1 == r2 {
                factors.push(Expr::raise(linear(r1), Expr::int(2)));
            } else {
                factors.push(linear(r1));
                factors.push(linear(r2));
            }
        }
        None => {
            if neat {
                return None;
            }
            let root_disc = float(&discriminant).sqrt();
            let b = float(&b);
            let two_a = float(&two_a);
            let r1 = (-b.clone() + &root_disc) / &two_a;
            let r2 = (-b - &root_disc) / &two_a;
            for root in [r1, r2] {
                factors.push(Expr::add(vec![
                    Expr::symbol(symbol),
                    Expr::Number(Numeric::Real(-root)),
                ]));
            }
        }
    }
    Some(Expr::mul(factors))
}

/// Peels rational roots off an integer-coefficient polynomial: each root `p/q` contributes a
/// `(q x - p)` factor. Requires degree at least 2 and a nonzero constant term.
pub fn factor_polynomial_by_rational_roots(expr: &Expr, symbol: &str) -> Option<Expr> {
    let coefficients = coefficient_vector(expr, symbol)?;
    if coefficients.len() < 3 || coefficients[0] == 0 {
        return None;
    }
    let whole: Vec<Integer> = coefficients
        .iter()
        .map(|c| c.is_integer().then(|| c.numer().clone()))
        .collect::<Option<_>>()?;

    let constant_divisors = small_divisors(&whole[0])?;
    let leading_divisors = small_divisors(&whole[whole.len() - 1])?;

    for q in &leading_divisors {
        for p in &constant_divisors {
            for sign in [1i32, -1] {
                let root = Rational::from((p.clone() * sign, q.clone()));
                if horner(&coefficients, &root) != 0 {
                    continue;
                }

                let mut reduced = synthetic_divide(&coefficients, &root);
                // emitting (q x - p) instead of (x - p/q) scales the cofactor down by q
                let scale = Rational::from(root.denom().clone());
                if scale != 1 {
                    for c in &mut reduced {
                        *c /= &scale;
                    }
                }
                let rest = poly_from_coefficients(&reduced, symbol);
                let rest = factor_polynomial_by_rational_roots(&rest, symbol).unwrap_or(rest);

                // (q x - p), in lowest terms
                let linear = poly_from_coefficients(
                    &[
                        Rational::from(-root.numer().clone()),
                        Rational::from(root.denom().clone()),
                    ],
                    symbol,
                );
                let mut factors = vec![linear];
                factors.extend(rest.factors().iter().cloned());
                return Some(Expr::mul(factors));
            }
        }
    }
    None
}

/// Positive divisors of `n`, or `None` when `n` is too large to enumerate.
fn small_divisors(n: &Integer) -> Option<Vec<Integer>> {
    let magnitude = n.clone().abs().to_u64()?;
    if magnitude == 0 || magnitude > 1_000_000 {
        return None;
    }
    let mut divisors = Vec::new();
    let mut i = 1u64;
    while i * i <= magnitude {
        if magnitude % i == 0 {
            divisors.push(Integer::from(i));
            if i != magnitude / i {
                divisors.push(Integer::from(magnitude / i));
            }
        }
        i += 1;
    }
    divisors.sort();
    Some(divisors)
}

fn horner(coefficients: &[Rational], x: &Rational) -> Rational {
    coefficients
        .iter()
        .rev()
        .fold(Rational::new(), |acc, c| acc * x + c)
}

/// Divides by `(x - root)`, assuming `root` is an exact root.
fn synthetic_divide(coefficients: &[Rational], root: &Rational) -> Vec<Rational> {
    let mut reduced = vec![Rational::new(); coefficients.len() - 1];
    let mut carry = Rational::new();
    for (index, c) in coefficients.iter().enumerate().rev().take(coefficients.len() - 1) {
        carry = carry * root + c;
        reduced[index - 1] = carry.clone();
    }
    reduced
}

/// `a^2 - b^2` factors as `(a - b)(a + b)`. Accepts both the subtract spelling and the additive
/// spelling with one negated term.
pub fn factor_difference_of_squares(expr: &Expr) -> Option<Expr> {
    let (positive, negative) = as_difference(expr)?;
    let a = clean_root(&positive, 2)?;
    let b = clean_root(&negative, 2)?;
    Some(Expr::mul(vec![
        Expr::subtract(a.clone(), b.clone()),
        Expr::add(vec![a, b]),
    ]))
}

/// `a^3 + b^3` factors as `(a + b)(a^2 - a b + b^2)`; `a^3 - b^3` as
/// `(a - b)(a^2 + a b + b^2)`.
pub fn factor_sum_of_cubes(expr: &Expr) -> Option<Expr> {
    let (first, second, difference) = match as_difference(expr) {
        Some((positive, negative)) => (positive, negative, true),
        None => {
            let terms = expr.operands_of(Op::Add)?;
            if terms.len() != 2 {
                return None;
            }
            (terms[0].clone(), terms[1].clone(), false)
        }
    };
    let a = clean_root(&first, 3)?;
    let b = clean_root(&second, 3)?;

    let a_sq = square(&a);
    let b_sq = square(&b);
    let ab = Expr::mul(vec![a.clone(), b.clone()]);
    Some(if difference {
        Expr::mul(vec![
            Expr::subtract(a, b),
            Expr::add(vec![a_sq, ab, b_sq]),
        ])
    } else {
        Expr::mul(vec![
            Expr::add(vec![a, b]),
            Expr::add(vec![Expr::subtract(a_sq, ab), b_sq]),
        ])
    })
}

fn square(expr: &Expr) -> Expr {
    match expr.as_number() {
        Some(n) => Expr::Number(n.multiply(n)),
        None => Expr::raise(expr.clone(), Expr::int(2)),
    }
}

/// Splits a two-term difference into its positive and (positivized) negative halves.
fn as_difference(expr: &Expr) -> Option<(Expr, Expr)> {
    if let Some(operands) = expr.operands_of(Op::Subtract) {
        if operands.len() == 2 {
            return Some((operands[0].clone(), operands[1].clone()));
        }
        return None;
    }

    let terms = expr.operands_of(Op::Add)?;
    if terms.len() != 2 {
        return None;
    }
    let negated = terms
        .iter()
        .position(|term| split_coefficient(term).0.is_negative())?;
    let (coefficient, rest) = split_coefficient(&terms[negated]);
    Some((
        terms[1 - negated].clone(),
        join_coefficient(coefficient.negate(), rest),
    ))
}

/// The exact n-th root of a clean power product: `4x^2` has square root `2x`, `8y^3` has cube
/// root `2y`.
fn clean_root(expr: &Expr, n: u32) -> Option<Expr> {
    let roots: Vec<Expr> = expr
        .factors()
        .iter()
        .map(|factor| {
            if let Some(value) = factor.as_number() {
                let whole = value.to_integer().filter(|i| *i >= 0)?;
                let root = whole.clone().root(n);
                return (root.clone().pow(n) == whole).then(|| Expr::Number(Numeric::Real(float(root))));
            }
            let (base, exponent) = split_power(factor);
            let power = exponent.as_whole().filter(|e| *e > 0 && e % i64::from(n) == 0)?;
            let reduced = power / i64::from(n);
            Some(if reduced == 1 {
                base
            } else {
                Expr::raise(base, Expr::int(reduced))
            })
        })
        .collect::<Option<_>>()?;
    Some(Expr::mul(roots))
}

/// Four-term factoring by grouping: pairs whose extractions share a sum factor recombine, as in
/// `x^3 + x^2 + 2x + 2` into `(x^2 + 2)(x + 1)`.
pub fn factor_by_grouping(ctx: &EngineContext, expr: &Expr) -> Option<Expr> {
    let terms = expr.operands_of(Op::Add)?;
    if terms.len() != 4 {
        return None;
    }

    for (first, second) in [[(0, 1), (2, 3)], [(0, 2), (1, 3)], [(0, 3), (1, 2)]]
        .iter()
        .map(|pairing| (pairing[0], pairing[1]))
    {
        let Some((lead_a, shared_a)) = grouped_half(ctx, &terms[first.0], &terms[first.1]) else {
            continue;
        };
        let Some((lead_b, shared_b)) = grouped_half(ctx, &terms[second.0], &terms[second.1])
        else {
            continue;
        };
        if shared_a == shared_b {
            return Some(Expr::mul(vec![Expr::add(vec![lead_a, lead_b]), shared_a]));
        }
    }
    None
}

/// Factors a two-term sum into `(extracted, shared sum)` halves.
fn grouped_half(ctx: &EngineContext, x: &Expr, y: &Expr) -> Option<(Expr, Expr)> {
    let pair = Expr::add(vec![x.clone(), y.clone()]);
    let factored = multi_factor(ctx, &pair).or_else(|| factor_polynomial_by_gcd(&pair))?;
    let operands = factored.operands_of(Op::Multiply)?;

    // orient as (everything else, the one sum factor)
    let (sums, rest): (Vec<Expr>, Vec<Expr>) = operands
        .iter()
        .cloned()
        .partition(|operand| operand.operands_of(Op::Add).is_some());
    if sums.len() != 1 || rest.is_empty() {
        return None;
    }
    Some((Expr::mul(rest), sums.into_iter().next()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn deg(text: &str, symbols: &[&str]) -> Option<i64> {
        degree(&parse(text).unwrap(), symbols)
    }

    #[test]
    fn degrees() {
        assert_eq!(deg("x^3 + x + 1", &["x"]), Some(3));
        assert_eq!(deg("0", &["x"]), Some(ZERO_DEGREE));
        assert_eq!(deg("7", &["x"]), Some(0));
        assert_eq!(deg("x * y^2", &["x", "y"]), Some(3));
        assert_eq!(deg("x^2 / x", &["x"]), Some(1));
        // a negative quotient degree must not alias the zero sentinel
        assert_eq!(deg("1 / x", &["x"]), None);
        assert_eq!(deg("x / x^3", &["x"]), None);
        assert_eq!(deg("sin(x)", &["x"]), None);
        assert_eq!(deg("sin(y)", &["x"]), Some(0));
        assert_eq!(deg("2^x", &["x"]), None);
    }

    #[test]
    fn coefficient_extraction() {
        let coeffs = coefficients(&parse("x^3 + 2x - 5").unwrap(), "x").unwrap();
        let values: Vec<i64> = coeffs.iter().map(|c| c.to_i64().unwrap()).collect();
        assert_eq!(values, vec![-5, 2, 0, 1]);

        assert_eq!(coefficients(&parse("sin(x)").unwrap(), "x"), None);
        assert_eq!(coefficients(&parse("x * y").unwrap(), "x"), None);
    }

    #[test]
    fn long_division_exact() {
        // (x^2 - 1) / (x - 1) = x + 1 remainder 0
        let (quotient, remainder) = divide_polynomials(
            &parse("x^2 - 1").unwrap(),
            &parse("x - 1").unwrap(),
            "x",
        )
        .unwrap();
        assert_eq!(quotient.to_string(), "x + 1");
        assert!(remainder.is_zero());
    }

    #[test]
    fn long_division_with_remainder() {
        // (x^2 + 1) / (x + 1) = x - 1 remainder 2
        let (quotient, remainder) = divide_polynomials(
            &parse("x^2 + 1").unwrap(),
            &parse("x + 1").unwrap(),
            "x",
        )
        .unwrap();
        assert_eq!(quotient.to_string(), "x - 1");
        assert_eq!(remainder.to_string(), "2");
    }

    #[test]
    fn division_round_trips() {
        use crate::rewrite::distribute::distribute;
        use crate::rewrite::everywhere;

        let ctx = EngineContext::new();
        for (p, d) in [("x^3 + 2x - 5", "x - 1"), ("x^4 - 1", "x^2 + 3")] {
            let p = parse(p).unwrap();
            let d = parse(d).unwrap();
            let (q, r) = divide_polynomials(&p, &d, "x").unwrap();

            let mut rebuilt = Expr::add(vec![Expr::mul(vec![q, d]), r]);
            while let Some(next) = everywhere(&rebuilt, &distribute) {
                rebuilt = next;
            }
            assert!(
                shrink(&ctx, &Expr::subtract(rebuilt, p.clone())).is_zero(),
                "round trip failed for {}",
                p
            );
        }
    }

    #[test]
    fn content_extraction() {
        let factored = factor_polynomial_by_gcd(&parse("2x + 4").unwrap()).unwrap();
        assert_eq!(factored.to_string(), "2 * (x + 2)");
        assert_eq!(factor_polynomial_by_gcd(&parse("x + 3").unwrap()), None);
    }

    #[test]
    fn quadratic_roots() {
        let factored = factor_quadratic(&parse("x^2 + 3x + 2").unwrap(), "x", true).unwrap();
        assert_eq!(factored, parse("(x + 1)(x + 2)").unwrap());

        let square = factor_quadratic(&parse("x^2 + 2x + 1").unwrap(), "x", true).unwrap();
        assert_eq!(square, parse("(x + 1)^2").unwrap());

        // irrational roots only factor outside neat mode
        assert_eq!(factor_quadratic(&parse("x^2 - 2").unwrap(), "x", true), None);
        assert!(factor_quadratic(&parse("x^2 - 2").unwrap(), "x", false).is_some());

        // complex roots never factor
        assert_eq!(factor_quadratic(&parse("x^2 + 1").unwrap(), "x", true), None);
    }

    #[test]
    fn rational_roots_peel() {
        let factored =
            factor_polynomial_by_rational_roots(&parse("x^2 + 3x + 2").unwrap(), "x").unwrap();
        assert_eq!(factored, parse("(x + 1)(x + 2)").unwrap());

        let cubic =
            factor_polynomial_by_rational_roots(&parse("x^3 - 6x^2 + 11x - 6").unwrap(), "x")
                .unwrap();
        assert_eq!(cubic, parse("(x - 1)(x - 2)(x - 3)").unwrap());
    }

    #[test]
    fn squares_and_cubes() {
        let squares = factor_difference_of_squares(&parse("x^2 - 9").unwrap()).unwrap();
        assert_eq!(squares, parse("(x - 3)(x + 3)").unwrap());

        let squares = factor_difference_of_squares(&parse("4x^2 - y^2").unwrap()).unwrap();
        assert_eq!(squares, parse("(2x - y)(2x + y)").unwrap());

        let cubes = factor_sum_of_cubes(&parse("x^3 - 8").unwrap()).unwrap();
        assert_eq!(cubes, parse("(x - 2)(x^2 + 2x + 4)").unwrap());
    }

    #[test]
    fn grouping() {
        let ctx = EngineContext::new();
        let factored = factor_by_grouping(&ctx, &parse("x^3 + x^2 + 2x + 2").unwrap());
        assert!(factored.is_some());
    }
}
