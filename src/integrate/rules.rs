//! Closed-form antiderivative tables.

use super::IntegrationSession;
use crate::expr::parse::parse;
use crate::expr::{Expr, Op};
use crate::pattern::{rule, Rule};
use once_cell::sync::Lazy;

/// Structural closed forms, tried in order. The `x^(-1)` exception precedes the power rule; the
/// reciprocal-power and arctangent forms cover the quotient spellings shrink produces.
pub(super) static CLOSED_FORMS: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule("S", "S^2 / 2"),
        rule("==2^ S %-1", "ln(abs(S))"),
        rule("==2^ S NotX2", "S^(NotX2 + 1) / (NotX2 + 1)"),
        rule("==2^ e S", "e^S"),
        rule("==2^ NotX S", "NotX^S / ln(NotX)"),
        rule("==2/ NotX S", "NotX * ln(abs(S))"),
        rule("==2/ NotX ==2^ S b", "(NotX * S^(1 - b)) / (1 - b)"),
        rule(
            "==2/ NotX ==2+ NotX2 ==2^ S %2",
            "(NotX / sqrt(NotX2)) * atan(S / sqrt(NotX2))",
        ),
    ]
});

/// Antiderivatives of the known unary functions applied directly to the target symbol, written
/// with `u` as the placeholder. Arguments other than the bare symbol go through substitution
/// instead.
pub(super) static FUNCTION_FORMS: Lazy<Vec<(&'static str, Expr)>> = Lazy::new(|| {
    vec![
        ("sin", template("-cos(u)")),
        ("cos", template("sin(u)")),
        ("tan", template("-ln(abs(cos(u)))")),
        ("sec", template("ln(abs(sec(u) + tan(u)))")),
        ("csc", template("-ln(abs(csc(u) + cot(u)))")),
        ("cot", template("ln(abs(sin(u)))")),
        ("sinh", template("cosh(u)")),
        ("cosh", template("sinh(u)")),
        ("exp", template("exp(u)")),
        ("ln", template("u * ln(u) - u")),
        ("log", template("(u * ln(u) - u) / ln(10)")),
        ("sqrt", template("2 * u * sqrt(u) / 3")),
        ("abs", template("u * abs(u) / 2")),
        ("asin", template("u * asin(u) + sqrt(1 - u^2)")),
        ("acos", template("u * acos(u) - sqrt(1 - u^2)")),
        ("atan", template("u * atan(u) - ln(1 + u^2) / 2")),
    ]
});

fn template(text: &str) -> Expr {
    match parse(text) {
        Ok(expr) => expr,
        Err(e) => panic!("bad antiderivative template `{}`: {}", text, e),
    }
}

/// The `sin^n` / `cos^n` reduction formulas for whole powers of the bare symbol:
///
/// - `sin^n u` integrates to `-sin^(n-1) u cos u / n + (n-1)/n * int(sin^(n-2) u)`
/// - `cos^n u` integrates to `cos^(n-1) u sin u / n + (n-1)/n * int(cos^(n-2) u)`
pub(super) fn trig_power_reduction(
    session: &IntegrationSession<'_>,
    expr: &Expr,
) -> Option<Expr> {
    let operands = expr.operands_of(Op::Raise)?;
    if operands.len() != 2 {
        return None;
    }
    let power = operands[1].as_whole().filter(|n| *n >= 2)?;
    let (name, arg) = match &operands[0] {
        Expr::Call(name, args) if args.len() == 1 => (name.as_str(), &args[0]),
        _ => return None,
    };
    if arg.as_identifier() != Some(session.symbol()) {
        return None;
    }
    let negated = match name {
        "sin" => true,
        "cos" => false,
        _ => return None,
    };

    let partner = if negated { "cos" } else { "sin" };
    let lowered = Expr::raise(operands[0].clone(), Expr::int(power - 1));
    let mut leading = Expr::divide(
        Expr::mul(vec![lowered, Expr::call(partner, vec![arg.clone()])]),
        Expr::int(power),
    );
    if negated {
        leading = leading.neg();
    }

    let remaining = session.integrate(&Expr::raise(
        operands[0].clone(),
        Expr::int(power - 2),
    ))?;
    let tail = Expr::mul(vec![
        Expr::divide(Expr::int(power - 1), Expr::int(power)),
        remaining,
    ]);
    Some(Expr::add(vec![leading, tail]))
}

/// Rewrites the reciprocal trig functions in terms of sine and cosine so the quotient and
/// substitution strategies can reach them.
pub(super) fn to_sin_cos(expr: &Expr) -> Option<Expr> {
    let (name, arg) = match expr {
        Expr::Call(name, args) if args.len() == 1 => (name.as_str(), &args[0]),
        _ => return None,
    };
    let rewritten = match name {
        "tan" => Expr::divide(
            Expr::call("sin", vec![arg.clone()]),
            Expr::call("cos", vec![arg.clone()]),
        ),
        "cot" => Expr::divide(
            Expr::call("cos", vec![arg.clone()]),
            Expr::call("sin", vec![arg.clone()]),
        ),
        "sec" => Expr::divide(Expr::int(1), Expr::call("cos", vec![arg.clone()])),
        "csc" => Expr::divide(Expr::int(1), Expr::call("sin", vec![arg.clone()])),
        _ => return None,
    };
    Some(rewritten)
}
