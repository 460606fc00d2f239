//! A symbolic algebra and calculus engine over flattened, n-ary expression trees.
//!
//! The core type is [`Expr`], a tree whose associative chains are flattened into single n-ary
//! nodes. Everything else is built on one operation: [`shrink`], which drives a set of local
//! rewrite passes to a fixpoint and produces the canonical form of an expression. Two
//! expressions are semantically equal exactly when their shrunken forms compare equal.
//!
//! On top of canonicalization sit the calculus and algebra operations:
//!
//! - [`derive`] differentiates with respect to a symbol
//! - [`integrate`] finds antiderivatives, strategy by strategy
//! - [`solve`] isolates a symbol by migrating terms across an equation
//! - [`equals`] and [`delta_equals`] compare expressions semantically
//!
//! All of these are partial: they return `Option` (or `bool`) rather than guessing, and they
//! memoize through the caches on [`EngineContext`], which callers construct and pass in.
//!
//! ```
//! use symcalc::{expr::parse::parse, EngineContext, shrink};
//!
//! let ctx = EngineContext::new();
//! let expr = parse("2x + 3x").unwrap();
//! assert_eq!(shrink(&ctx, &expr).to_string(), "5x");
//! ```

pub mod cache;
pub mod compare;
pub mod context;
pub mod derivative;
pub mod expr;
pub mod integrate;
pub mod numeric;
pub mod pattern;
pub mod polynomial;
pub mod primitive;
pub mod rewrite;
pub mod simplify;
pub mod solve;

pub use compare::{delta_equals, equals};
pub use context::{EngineConfig, EngineContext};
pub use derivative::derive;
pub use expr::{Expr, Op};
pub use integrate::integrate;
pub use numeric::Numeric;
pub use simplify::shrink;
pub use solve::solve;
