//! A flattened, n-ary representation of arithmetic expressions.
//!
//! Every algebraic manipulation in this crate operates on [`Expr`]. The representation flattens
//! associative chains: `x + (y + z)` is a single [`Op::Add`] node with three operands. The four
//! commutative operators (`Add`, `Multiply`, `BitAnd`, `BitOr`) are flattened on construction;
//! `Subtract`, `Divide` and `Raise` are positional (first operand is the minuend / numerator /
//! base, the rest apply left to right) and are never flattened into siblings of the same operator.
//!
//! # Strict equality
//!
//! The [`PartialEq`] implementation is **strict equality**: same node shape, same operator, and
//! for commutative operators the operands may match in any order (positional comparison is tried
//! first, then a multiset fallback). Strict equality never reports false positives, but two
//! semantically equal expressions such as `x^2 + 2x + 1` and `(x + 1)^2` are *not* strictly
//! equal; resolving those requires [`shrink`](crate::simplify::shrink).
//!
//! The `grouped` flag on [`Arithmetic`] records explicit parenthesization for display purposes
//! only; it never affects semantics or equality.

pub mod display;
pub mod parse;

use crate::numeric::Numeric;

/// The operators an [`Arithmetic`] node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
    Raise,
    Factorial,
    BitAnd,
    BitOr,
    LeftShift,
    RightShift,
}

impl Op {
    /// Operators whose operands may be reordered freely.
    pub fn is_commutative(self) -> bool {
        matches!(self, Op::Add | Op::Multiply | Op::BitAnd | Op::BitOr)
    }

    /// Operators whose nested chains flatten into the parent operand list. This is the same set
    /// as [`Op::is_commutative`]; the positional operators keep their tree shape.
    pub fn is_associative(self) -> bool {
        self.is_commutative()
    }

    /// The textual form used by [`Display`](std::fmt::Display) and the pattern mini-language.
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Subtract => "-",
            Op::Multiply => "*",
            Op::Divide => "/",
            Op::Raise => "^",
            Op::Factorial => "!",
            Op::BitAnd => "&",
            Op::BitOr => "|",
            Op::LeftShift => "<<",
            Op::RightShift => ">>",
        }
    }
}

/// An n-ary operator application.
#[derive(Debug, Clone)]
pub struct Arithmetic {
    pub op: Op,
    pub operands: Vec<Expr>,
    /// Explicit parenthesization, display-only.
    pub grouped: bool,
}

/// A single node in an expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A real or complex number.
    Number(Numeric),

    /// A variable, such as `x`.
    Identifier(String),

    /// A function call, such as `sin(x)`.
    Call(String, Vec<Expr>),

    /// An operator applied to an ordered operand list.
    Arithmetic(Arithmetic),
}

impl Expr {
    pub fn number(value: Numeric) -> Self {
        Self::Number(value)
    }

    /// A whole real number leaf.
    pub fn int(value: i64) -> Self {
        Self::Number(Numeric::real(value))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call(name.into(), args)
    }

    /// Builds an arithmetic node, immediately flattening nested same-operator associative chains
    /// and collapsing singleton operand lists, so constructed trees are never transiently
    /// malformed beyond one merge pass.
    pub fn arithmetic(op: Op, operands: Vec<Expr>) -> Self {
        let mut flattened = Vec::with_capacity(operands.len());
        for operand in operands {
            match operand {
                Expr::Arithmetic(inner) if inner.op == op && op.is_associative() => {
                    flattened.extend(inner.operands);
                }
                other => flattened.push(other),
            }
        }

        if flattened.len() == 1 && op != Op::Factorial {
            return flattened.remove(0);
        }

        Self::Arithmetic(Arithmetic {
            op,
            operands: flattened,
            grouped: false,
        })
    }

    pub fn add(operands: Vec<Expr>) -> Self {
        Self::arithmetic(Op::Add, operands)
    }

    pub fn mul(operands: Vec<Expr>) -> Self {
        Self::arithmetic(Op::Multiply, operands)
    }

    pub fn subtract(lhs: Expr, rhs: Expr) -> Self {
        Self::arithmetic(Op::Subtract, vec![lhs, rhs])
    }

    pub fn divide(numerator: Expr, denominator: Expr) -> Self {
        Self::arithmetic(Op::Divide, vec![numerator, denominator])
    }

    pub fn raise(base: Expr, exponent: Expr) -> Self {
        Self::arithmetic(Op::Raise, vec![base, exponent])
    }

    /// Multiplies by -1, folding the sign into a numeric leaf where possible.
    pub fn neg(self) -> Self {
        match self {
            Expr::Number(n) => Expr::Number(n.negate()),
            other => Expr::mul(vec![Expr::int(-1), other]),
        }
    }

    pub fn as_number(&self) -> Option<&Numeric> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_arithmetic(&self) -> Option<&Arithmetic> {
        match self {
            Expr::Arithmetic(a) => Some(a),
            _ => None,
        }
    }

    /// The operand list of an arithmetic node with the given operator.
    pub fn operands_of(&self, op: Op) -> Option<&[Expr]> {
        match self {
            Expr::Arithmetic(a) if a.op == op => Some(&a.operands),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Expr::Number(_))
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Number(n) if n.is_one())
    }

    /// The whole-number value of a numeric leaf, if it has one.
    pub fn as_whole(&self) -> Option<i64> {
        self.as_number().and_then(Numeric::to_i64)
    }

    /// Marks the node as explicitly parenthesized. Display-only.
    pub fn grouped(mut self) -> Self {
        if let Expr::Arithmetic(ref mut a) = self {
            a.grouped = true;
        }
        self
    }

    /// The factor list view of an expression: a `Multiply` node's operands, or the expression
    /// itself as a single factor.
    pub fn factors(&self) -> &[Expr] {
        match self {
            Expr::Arithmetic(a) if a.op == Op::Multiply => &a.operands,
            other => std::slice::from_ref(other),
        }
    }

    /// True if the expression mentions the identifier anywhere.
    pub fn contains_identifier(&self, name: &str) -> bool {
        match self {
            Expr::Number(_) => false,
            Expr::Identifier(id) => id == name,
            Expr::Call(_, args) => args.iter().any(|a| a.contains_identifier(name)),
            Expr::Arithmetic(a) => a.operands.iter().any(|o| o.contains_identifier(name)),
        }
    }

    /// Counts occurrences of the identifier.
    pub fn symbol_count(&self, name: &str) -> usize {
        match self {
            Expr::Number(_) => 0,
            Expr::Identifier(id) => usize::from(id == name),
            Expr::Call(_, args) => args.iter().map(|a| a.symbol_count(name)).sum(),
            Expr::Arithmetic(a) => a.operands.iter().map(|o| o.symbol_count(name)).sum(),
        }
    }

    /// Collects every distinct identifier, in first-appearance order.
    pub fn identifiers(&self) -> Vec<String> {
        fn walk(expr: &Expr, out: &mut Vec<String>) {
            match expr {
                Expr::Number(_) => {}
                Expr::Identifier(id) => {
                    if !out.iter().any(|existing| existing == id) {
                        out.push(id.clone());
                    }
                }
                Expr::Call(_, args) => args.iter().for_each(|a| walk(a, out)),
                Expr::Arithmetic(a) => a.operands.iter().for_each(|o| walk(o, out)),
            }
        }

        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Returns the expression's sole identifier, if exactly one distinct identifier appears.
    pub fn single_identifier(&self) -> Option<String> {
        let mut identifiers = self.identifiers();
        if identifiers.len() == 1 {
            identifiers.pop()
        } else {
            None
        }
    }

    /// Replaces every occurrence of the identifier with a copy of `replacement`, rebuilding
    /// arithmetic nodes so the merge invariant holds on the result.
    pub fn substitute_identifier(&self, name: &str, replacement: &Expr) -> Expr {
        match self {
            Expr::Number(_) => self.clone(),
            Expr::Identifier(id) => {
                if id == name {
                    replacement.clone()
                } else {
                    self.clone()
                }
            }
            Expr::Call(call_name, args) => Expr::Call(
                call_name.clone(),
                args.iter()
                    .map(|a| a.substitute_identifier(name, replacement))
                    .collect(),
            ),
            Expr::Arithmetic(a) => Expr::arithmetic(
                a.op,
                a.operands
                    .iter()
                    .map(|o| o.substitute_identifier(name, replacement))
                    .collect(),
            ),
        }
    }

    /// Replaces every sub-expression strictly equal to `target` with a copy of `replacement`.
    /// Returns the rewritten tree and the number of replacements made.
    pub fn substitute_value(&self, target: &Expr, replacement: &Expr) -> (Expr, usize) {
        if self == target {
            return (replacement.clone(), 1);
        }

        match self {
            Expr::Number(_) | Expr::Identifier(_) => (self.clone(), 0),
            Expr::Call(name, args) => {
                let mut count = 0;
                let args = args
                    .iter()
                    .map(|a| {
                        let (rewritten, n) = a.substitute_value(target, replacement);
                        count += n;
                        rewritten
                    })
                    .collect();
                (Expr::Call(name.clone(), args), count)
            }
            Expr::Arithmetic(a) => {
                let mut count = 0;
                let operands = a
                    .operands
                    .iter()
                    .map(|o| {
                        let (rewritten, n) = o.substitute_value(target, replacement);
                        count += n;
                        rewritten
                    })
                    .collect();
                (Expr::arithmetic(a.op, operands), count)
            }
        }
    }

    /// True if `target` occurs anywhere in the tree (strict equality).
    pub fn find(&self, target: &Expr) -> bool {
        if self == target {
            return true;
        }
        match self {
            Expr::Number(_) | Expr::Identifier(_) => false,
            Expr::Call(_, args) => args.iter().any(|a| a.find(target)),
            Expr::Arithmetic(a) => a.operands.iter().any(|o| o.find(target)),
        }
    }

    /// The largest whole-number exponent appearing on any `Raise` node.
    pub fn max_power(&self) -> Option<i64> {
        let mut max = None;
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Number(_) | Expr::Identifier(_) => {}
                Expr::Call(_, args) => stack.extend(args.iter()),
                Expr::Arithmetic(a) => {
                    if a.op == Op::Raise {
                        if let Some(power) = a.operands.get(1).and_then(Expr::as_whole) {
                            if max.map(|m| power > m).unwrap_or(true) {
                                max = Some(power);
                            }
                        }
                    }
                    stack.extend(a.operands.iter());
                }
            }
        }
        max
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Expr::Number(a), Expr::Number(b)) => a == b,
            (Expr::Identifier(a), Expr::Identifier(b)) => a == b,
            (Expr::Call(a, a_args), Expr::Call(b, b_args)) => a == b && a_args == b_args,
            (Expr::Arithmetic(a), Expr::Arithmetic(b)) => {
                if a.op != b.op || a.operands.len() != b.operands.len() {
                    return false;
                }
                if a.operands == b.operands {
                    return true;
                }
                if !a.op.is_commutative() {
                    return false;
                }
                // multiset fallback: each lhs operand consumes one unmatched rhs operand
                let mut used = vec![false; b.operands.len()];
                a.operands.iter().all(|lhs| {
                    b.operands.iter().enumerate().any(|(idx, rhs)| {
                        if !used[idx] && lhs == rhs {
                            used[idx] = true;
                            true
                        } else {
                            false
                        }
                    })
                })
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn construction_merges_associative_chains() {
        let nested = Expr::add(vec![
            Expr::symbol("x"),
            Expr::add(vec![Expr::symbol("y"), Expr::symbol("z")]),
        ]);
        assert_eq!(nested.as_arithmetic().unwrap().operands.len(), 3);
    }

    #[test]
    fn subtract_stays_positional() {
        let nested = Expr::arithmetic(
            Op::Subtract,
            vec![
                Expr::symbol("x"),
                Expr::subtract(Expr::symbol("y"), Expr::symbol("z")),
            ],
        );
        // inner subtract must remain its own node
        assert_eq!(nested.as_arithmetic().unwrap().operands.len(), 2);
    }

    #[test]
    fn singleton_collapses() {
        let single = Expr::add(vec![Expr::symbol("x")]);
        assert_eq!(single, Expr::symbol("x"));
    }

    #[test]
    fn commutative_equality_ignores_order() {
        assert_eq!(parse("3 * x").unwrap(), parse("x * 3").unwrap());
        assert_eq!(parse("3 + x").unwrap(), parse("x + 3").unwrap());
        assert_eq!(parse("3 & x").unwrap(), parse("x & 3").unwrap());
        assert_eq!(parse("3 | x").unwrap(), parse("x | 3").unwrap());
        assert_eq!(parse("3 * (x + y)").unwrap(), parse("(x + y) * 3").unwrap());
    }

    #[test]
    fn positional_equality_keeps_order() {
        assert_ne!(parse("3 - x").unwrap(), parse("x - 3").unwrap());
        assert_ne!(parse("3 / (x * y)").unwrap(), parse("(x * y) / 3").unwrap());
        assert_ne!(parse("3 * x").unwrap(), parse("3 + x").unwrap());
    }

    #[test]
    fn grouped_does_not_affect_equality() {
        let plain = parse("x + y").unwrap();
        let grouped = parse("(x + y)").unwrap();
        assert_eq!(plain, grouped);
    }

    #[test]
    fn substitution() {
        let expr = parse("x^2 + sin(x)").unwrap();
        let substituted = expr.substitute_identifier("x", &Expr::symbol("u"));
        assert_eq!(substituted, parse("u^2 + sin(u)").unwrap());
        assert_eq!(expr.symbol_count("x"), 2);
    }

    #[test]
    fn substitute_value_counts() {
        let expr = parse("sin(x) * sin(x) + y").unwrap();
        let (rewritten, count) = expr.substitute_value(&parse("sin(x)").unwrap(), &Expr::symbol("u"));
        assert_eq!(count, 2);
        assert_eq!(rewritten, parse("u * u + y").unwrap());
    }

    #[test]
    fn identifier_queries() {
        let expr = parse("x * y + x").unwrap();
        assert_eq!(expr.identifiers(), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(expr.single_identifier(), None);
        assert_eq!(parse("x^2 + x").unwrap().single_identifier(), Some("x".to_string()));
        assert_eq!(parse("x^5 + x^2").unwrap().max_power(), Some(5));
    }
}
