use thiserror::Error;

/// Either phase of [`roll`](crate::roll) can fail: the parse or the
/// evaluation.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] crate::parse::ParseError),
    #[error("{0}")]
    Eval(#[from] crate::eval::EvalError),
}
