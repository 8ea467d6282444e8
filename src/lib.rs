//! A dice expression language: a small arithmetic calculator extended
//! with dice rolls (`3d6`, `2d{1,3,5}`), keep/drop/reroll modifiers
//! (`4d6kh3`, `2d20ro<2`), unary functions, and a trace that annotates
//! every die rolled, including rerolled, dropped, and critical values.
//!
//! ```
//! let rolled = dice_lang::roll("4d6kh3 + 2").unwrap();
//! assert!((5..=20).contains(&rolled.value));
//! ```

pub mod ast;
pub mod eval;
pub mod functions;
pub mod parse;

mod error;

#[cfg(test)]
mod test_strategies;

pub use ast::Expr;
pub use error::Error;
pub use eval::{eval, DiceRng, EvalError, Evaluator, Rolled};
pub use functions::supported_functions;
pub use parse::{parse, ParseError};

/// The integer type of every value in the language.
pub type Int = i64;

/// A vector guaranteed non-empty, used for reroll histories and custom
/// die faces.
pub type NonEmpty<T> = vec1::Vec1<T>;

/// The cap on primitive random draws in a single evaluation.
pub const MAX_RNG: Int = 150;

/// The largest input `fact` accepts during evaluation.
pub const FACT_LIMIT: Int = 50;

/// Renders an expression in its canonical written form. Feeding the
/// result back through [`parse`] yields a tree that prints identically.
pub fn pretty(expr: &Expr) -> String {
    expr.to_string()
}

/// Parses and evaluates in one step, with the thread RNG and the
/// default draw budget.
pub fn roll(input: &str) -> Result<Rolled, Error> {
    let expr = parse(input)?;
    Ok(eval(&expr, rand::thread_rng())?)
}
