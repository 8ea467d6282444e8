mod ctx;
mod error;
mod rng;

pub use ctx::{Evaluator, Rolled};
pub use error::EvalError;
pub use rng::{DefaultRng, DiceRng};

pub(crate) type EResult<T> = Result<T, EvalError>;

use crate::ast::Expr;

/// Evaluates an expression with the default draw budget of
/// [`MAX_RNG`](crate::MAX_RNG).
pub fn eval<R: DiceRng>(expr: &Expr, rng: R) -> EResult<Rolled> {
    Evaluator::new(rng).eval(expr)
}
