//! The structural pattern language behind the calculus rule tables.
//!
//! Rules are written as whitespace-separated token text and compiled once, at startup, into a
//! closed [`Pat`] tree; matching never interprets strings. An operator token is the operator
//! symbol optionally prefixed by a comparator and arity count: `==2^` matches a `Raise` node
//! with exactly two operands and consumes exactly two sub-patterns, while `>=2+` matches an
//! `Add` node of at least two operands and must be terminated by the `#` rest marker, which
//! soaks up the unmatched operands (templates see them under the name `@0`).
//!
//! Leaf tokens: `N` any number, `%5` that exact number, `%NN` a negative number, `%N1` a number
//! other than one, `?` anything, `I` any identifier, `S` the target symbol, `e` Euler's
//! identifier, `F` any call, `FM` a call with several arguments. Named captures (`C`, `CC`,
//! `A`, `B`, `$1`..`$9`) bind on first occurrence and compare on later ones; `a` and `b` bind
//! like captures but only match a number or a non-target identifier; `NotX` and `NotX2` bind
//! anything free of the target symbol.
//!
//! Commutative operands match first-fit with backtracking; matching is all-or-nothing and the
//! bindings map is discarded on failure.

use crate::expr::{parse::parse, Expr, Op};
use crate::numeric::Numeric;
use crate::primitive::float_from_str;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ArityConstraint {
    Exact(usize),
    AtLeast(usize),
    AtMost(usize),
    Less(usize),
    Greater(usize),
}

impl ArityConstraint {
    fn admits(&self, len: usize) -> bool {
        match *self {
            Self::Exact(n) => len == n,
            Self::AtLeast(n) => len >= n,
            Self::AtMost(n) => len <= n,
            Self::Less(n) => len < n,
            Self::Greater(n) => len > n,
        }
    }
}

/// A compiled pattern node.
#[derive(Debug, Clone, PartialEq)]
pub enum Pat {
    Op {
        op: Op,
        arity: ArityConstraint,
        operands: Vec<Pat>,
        rest: bool,
    },
    AnyNumber,
    Exact(Numeric),
    NegativeNumber,
    NumberNotOne,
    Wildcard,
    AnyIdentifier,
    TargetSymbol,
    Euler,
    AnyCall,
    MultiArgCall,
    /// Binds on first occurrence, compares on later ones.
    Capture(String),
    /// A number or a non-target identifier; binds like a capture.
    NumberOrFreeLeaf(String),
    /// Any expression free of the target symbol; binds like a capture.
    FreeOfTarget(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternError {
    pub message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PatternError {}

fn error(message: impl Into<String>) -> PatternError {
    PatternError {
        message: message.into(),
    }
}

/// Compiles pattern text into a [`Pat`] tree.
pub fn compile(pattern: &str) -> Result<Pat, PatternError> {
    let tokens: Vec<&str> = pattern.split_whitespace().collect();
    let mut position = 0;
    let pat = compile_at(&tokens, &mut position)?;
    if position != tokens.len() {
        return Err(error(format!("trailing pattern tokens in `{}`", pattern)));
    }
    Ok(pat)
}

fn compile_at(tokens: &[&str], position: &mut usize) -> Result<Pat, PatternError> {
    let Some(&token) = tokens.get(*position) else {
        return Err(error("pattern ended unexpectedly"));
    };
    *position += 1;

    if let Some((op, arity)) = operator_token(token)? {
        let exact = match arity {
            ArityConstraint::Exact(n) => Some(n),
            _ => None,
        };

        let mut operands = Vec::new();
        let mut rest = false;
        match exact {
            Some(count) => {
                for _ in 0..count {
                    operands.push(compile_at(tokens, position)?);
                }
            }
            None => {
                // open arity reads sub-patterns up to the `#` rest terminator
                loop {
                    match tokens.get(*position) {
                        Some(&"#") => {
                            *position += 1;
                            rest = true;
                            break;
                        }
                        Some(_) => operands.push(compile_at(tokens, position)?),
                        None => return Err(error("open-arity operator missing `#` terminator")),
                    }
                }
            }
        }
        return Ok(Pat::Op {
            op,
            arity,
            operands,
            rest,
        });
    }

    Ok(match token {
        "N" => Pat::AnyNumber,
        "%NN" => Pat::NegativeNumber,
        "%N1" => Pat::NumberNotOne,
        "?" => Pat::Wildcard,
        "I" => Pat::AnyIdentifier,
        "S" => Pat::TargetSymbol,
        "e" => Pat::Euler,
        "F" => Pat::AnyCall,
        "FM" => Pat::MultiArgCall,
        "C" | "CC" | "A" | "B" => Pat::Capture(token.to_string()),
        "a" | "b" => Pat::NumberOrFreeLeaf(token.to_string()),
        "NotX" | "NotX2" => Pat::FreeOfTarget(token.to_string()),
        _ if token.starts_with('$') && token.len() == 2 => Pat::Capture(token.to_string()),
        _ if token.starts_with('%') => {
            let text = &token[1..];
            let negative = text.strip_prefix('-');
            let digits = negative.unwrap_or(text);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
                return Err(error(format!("bad number token `{}`", token)));
            }
            let value = Numeric::Real(float_from_str(digits));
            Pat::Exact(if negative.is_some() {
                value.negate()
            } else {
                value
            })
        }
        other => return Err(error(format!("unknown pattern token `{}`", other))),
    })
}

/// Parses an operator token of the form `[comparator][count]symbol`.
fn operator_token(token: &str) -> Result<Option<(Op, ArityConstraint)>, PatternError> {
    let (comparator, rest) = if let Some(rest) = token.strip_prefix("==") {
        ("==", rest)
    } else if let Some(rest) = token.strip_prefix("<=") {
        ("<=", rest)
    } else if let Some(rest) = token.strip_prefix(">=") {
        (">=", rest)
    } else if let Some(rest) = token.strip_prefix('<') {
        // `<<` is the shift operator, not a comparator
        if token == "<<" {
            ("", token)
        } else {
            ("<", rest)
        }
    } else if let Some(rest) = token.strip_prefix('>') {
        if token == ">>" {
            ("", token)
        } else {
            (">", rest)
        }
    } else {
        ("", token)
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let symbol = &rest[digits.len()..];

    let op = match symbol {
        "+" => Op::Add,
        "-" => Op::Subtract,
        "*" => Op::Multiply,
        "/" => Op::Divide,
        "^" => Op::Raise,
        "!" => Op::Factorial,
        "&" => Op::BitAnd,
        "|" => Op::BitOr,
        "<<" => Op::LeftShift,
        ">>" => Op::RightShift,
        _ => return Ok(None),
    };

    if digits.is_empty() {
        if !comparator.is_empty() {
            return Err(error(format!("comparator without count in `{}`", token)));
        }
        return Ok(Some((op, ArityConstraint::AtLeast(0))));
    }

    let count: usize = digits
        .parse()
        .map_err(|_| error(format!("bad arity in `{}`", token)))?;
    let arity = match comparator {
        "" | "==" => ArityConstraint::Exact(count),
        "<=" => ArityConstraint::AtMost(count),
        ">=" => ArityConstraint::AtLeast(count),
        "<" => ArityConstraint::Less(count),
        ">" => ArityConstraint::Greater(count),
        _ => return Err(error(format!("bad comparator in `{}`", token))),
    };
    Ok(Some((op, arity)))
}

pub type Bindings = HashMap<String, Expr>;

/// Matches an expression against a compiled pattern. `symbol` is the target symbol the `S`,
/// `NotX` and friends refer to. Returns the bindings on success.
pub fn matches(pat: &Pat, expr: &Expr, symbol: &str) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    match_pat(pat, expr, symbol, &mut bindings).then_some(bindings)
}

fn match_pat(pat: &Pat, expr: &Expr, symbol: &str, bindings: &mut Bindings) -> bool {
    match pat {
        Pat::Op {
            op,
            arity,
            operands,
            rest,
        } => {
            let node = match expr {
                Expr::Arithmetic(a) if a.op == *op => a,
                _ => return false,
            };
            if !arity.admits(node.operands.len()) {
                return false;
            }
            if node.operands.len() < operands.len() {
                return false;
            }
            if !*rest && node.operands.len() != operands.len() {
                return false;
            }

            let mut used = vec![false; node.operands.len()];
            if !assign(
                operands,
                &node.operands,
                op.is_commutative(),
                &mut used,
                symbol,
                bindings,
            ) {
                return false;
            }

            if *rest {
                let leftover: Vec<Expr> = node
                    .operands
                    .iter()
                    .zip(&used)
                    .filter(|(_, consumed)| !**consumed)
                    .map(|(operand, _)| operand.clone())
                    .collect();
                if !leftover.is_empty() {
                    bindings.insert("@0".to_string(), Expr::arithmetic(*op, leftover));
                }
            }
            true
        }
        Pat::AnyNumber => expr.is_number(),
        Pat::Exact(value) => expr.as_number() == Some(value),
        Pat::NegativeNumber => matches!(expr.as_number(), Some(n) if n.is_negative()),
        Pat::NumberNotOne => matches!(expr.as_number(), Some(n) if !n.is_one()),
        Pat::Wildcard => true,
        Pat::AnyIdentifier => matches!(expr, Expr::Identifier(_)),
        Pat::TargetSymbol => expr.as_identifier() == Some(symbol),
        Pat::Euler => expr.as_identifier() == Some("e"),
        Pat::AnyCall => matches!(expr, Expr::Call(..)),
        Pat::MultiArgCall => matches!(expr, Expr::Call(_, args) if args.len() >= 2),
        Pat::Capture(name) => bind_or_compare(name, expr, bindings),
        Pat::NumberOrFreeLeaf(name) => {
            let admissible = expr.is_number()
                || matches!(expr.as_identifier(), Some(id) if id != symbol);
            admissible && bind_or_compare(name, expr, bindings)
        }
        Pat::FreeOfTarget(name) => {
            !expr.contains_identifier(symbol) && bind_or_compare(name, expr, bindings)
        }
    }
}

fn bind_or_compare(name: &str, expr: &Expr, bindings: &mut Bindings) -> bool {
    match bindings.get(name) {
        Some(bound) => bound == expr,
        None => {
            bindings.insert(name.to_string(), expr.clone());
            true
        }
    }
}

/// Assigns each sub-pattern to one operand. Positional operators consume operands in order;
/// commutative operators try unused operands first-fit, backtracking through the bindings map.
fn assign(
    pats: &[Pat],
    operands: &[Expr],
    commutative: bool,
    used: &mut [bool],
    symbol: &str,
    bindings: &mut Bindings,
) -> bool {
    let Some((pat, rest_pats)) = pats.split_first() else {
        return true;
    };

    let next_positional = used.iter().position(|consumed| !consumed);
    for index in 0..operands.len() {
        if used[index] {
            continue;
        }
        if !commutative && Some(index) != next_positional {
            break;
        }

        let snapshot = bindings.clone();
        if match_pat(pat, &operands[index], symbol, bindings) {
            used[index] = true;
            if assign(rest_pats, operands, commutative, used, symbol, bindings) {
                return true;
            }
            used[index] = false;
        }
        *bindings = snapshot;

        if !commutative {
            break;
        }
    }
    false
}

/// A compiled rewrite rule: a pattern and a result template. Templates are ordinary expression
/// text; identifiers that name captures resolve to the bound expressions, `S` and `@s` resolve
/// to the target symbol, and the pseudo-calls `~d(...)` and `~int(...)` evaluate a derivative or
/// integral at instantiation time.
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: Pat,
    pub template: Expr,
}

impl Rule {
    pub fn new(pattern: &str, template: &str) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: compile(pattern)?,
            template: parse(template)
                .map_err(|e| error(format!("bad template `{}`: {}", template, e)))?,
        })
    }

    /// Matches and instantiates in one step.
    pub fn apply(&self, expr: &Expr, symbol: &str, ops: &CalculusOps) -> Option<Expr> {
        let bindings = matches(&self.pattern, expr, symbol)?;
        instantiate(&self.template, &bindings, symbol, ops)
    }
}

/// Compiles a rule table entry; the tables are literals, so a malformed entry is a programming
/// error caught at first use.
pub fn rule(pattern: &str, template: &str) -> Rule {
    match Rule::new(pattern, template) {
        Ok(rule) => rule,
        Err(e) => panic!("bad rule `{}` -> `{}`: {}", pattern, template, e),
    }
}

/// The deferred-calculus hooks available to templates.
pub struct CalculusOps<'a> {
    pub derive: &'a dyn Fn(&Expr) -> Option<Expr>,
    pub integrate: &'a dyn Fn(&Expr) -> Option<Expr>,
}

impl<'a> CalculusOps<'a> {
    /// Hooks that refuse every deferred call, for templates that use none.
    pub fn none() -> CalculusOps<'static> {
        CalculusOps {
            derive: &|_| None,
            integrate: &|_| None,
        }
    }
}

/// Builds the result expression from a template and a bindings map.
pub fn instantiate(
    template: &Expr,
    bindings: &Bindings,
    symbol: &str,
    ops: &CalculusOps,
) -> Option<Expr> {
    match template {
        Expr::Number(_) => Some(template.clone()),
        Expr::Identifier(name) => {
            if let Some(bound) = bindings.get(name) {
                return Some(bound.clone());
            }
            if name == "S" || name == "@s" {
                return Some(Expr::symbol(symbol));
            }
            Some(template.clone())
        }
        Expr::Call(name, args) => {
            let args: Vec<Expr> = args
                .iter()
                .map(|arg| instantiate(arg, bindings, symbol, ops))
                .collect::<Option<_>>()?;
            match name.as_str() {
                "~d" if args.len() == 1 => (ops.derive)(&args[0]),
                "~int" if args.len() == 1 => (ops.integrate)(&args[0]),
                _ => Some(Expr::Call(name.clone(), args)),
            }
        }
        Expr::Arithmetic(a) => {
            let operands: Vec<Expr> = a
                .operands
                .iter()
                .map(|operand| instantiate(operand, bindings, symbol, ops))
                .collect::<Option<_>>()?;
            Some(Expr::arithmetic(a.op, operands))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    fn bind(pattern: &str, expr: &str, symbol: &str) -> Option<Bindings> {
        matches(&compile(pattern).unwrap(), &parse(expr).unwrap(), symbol)
    }

    #[test]
    fn exact_arity_operators() {
        assert!(bind("==2^ S N", "x^2", "x").is_some());
        assert!(bind("==2^ S N", "x^2^3", "x").is_none());
        assert!(bind("==2^ S N", "y^2", "x").is_none());
    }

    #[test]
    fn commutative_first_fit() {
        // the number may sit anywhere in the product
        let bindings = bind("==2* N C", "x * 3", "x").unwrap();
        assert_eq!(bindings["C"], parse("x").unwrap());
    }

    #[test]
    fn open_arity_binds_the_rest() {
        let bindings = bind(">=2+ S #", "x + y + 1", "x").unwrap();
        assert_eq!(bindings["@0"], parse("y + 1").unwrap());
    }

    #[test]
    fn captures_bind_once_and_compare_after() {
        assert!(bind("==2* C C", "sin(x) * sin(x)", "x").is_some());
        assert!(bind("==2* C C", "sin(x) * cos(x)", "x").is_none());
    }

    #[test]
    fn free_of_target() {
        assert!(bind("==2^ NotX A", "2^x", "x").is_some());
        assert!(bind("==2^ NotX A", "x^2", "x").is_none());

        // backtracking: NotX must settle on the symbol-free operand
        let bindings = bind("==2* NotX A", "y * x", "x").unwrap();
        assert_eq!(bindings["NotX"], parse("y").unwrap());
        assert_eq!(bindings["A"], parse("x").unwrap());
    }

    #[test]
    fn numeric_leaf_tokens() {
        assert!(bind("%2", "2", "x").is_some());
        assert!(bind("%-1", "-1", "x").is_some());
        assert!(bind("%NN", "-5", "x").is_some());
        assert!(bind("%NN", "5", "x").is_none());
        assert!(bind("%N1", "3", "x").is_some());
        assert!(bind("%N1", "1", "x").is_none());
    }

    #[test]
    fn rule_round_trip() {
        // the power rule as a rule table entry
        let rule = rule("==2^ S NotX2", "NotX2 * S^(NotX2 - 1)");
        let result = rule
            .apply(&parse("x^5").unwrap(), "x", &CalculusOps::none())
            .unwrap();
        assert_eq!(result, parse("5 * x^(5 - 1)").unwrap());
    }

    #[test]
    fn deferred_calculus_hooks() {
        let rule = rule("==2^ e A", "e^A * ~d(A)");
        let ops = CalculusOps {
            derive: &|_| Some(Expr::int(1)),
            integrate: &|_| None,
        };
        let result = rule.apply(&parse("e^x").unwrap(), "x", &ops).unwrap();
        assert_eq!(result, parse("e^x * 1").unwrap());
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        assert!(compile("==2^ S").is_err());
        assert!(compile("+ S N").is_err());
        assert!(compile("zzz").is_err());
    }
}
