use crate::Int;
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum EvalError {
    #[error("draw budget of {limit} exceeded ({observed} draws)")]
    RngBudgetExceeded { limit: Int, observed: Int },
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("cannot raise to a negative exponent")]
    NegativeExponent,
    #[error("d{base} must have at least one face, but its bound was {bound}")]
    InvalidDieBound { base: String, bound: Int },
    #[error("cannot roll a negative number of dice ({0})")]
    NegativeDiceCount(Int),
    #[error("factorial input {input} exceeds the limit of {limit}")]
    FactorialInputTooLarge { input: Int, limit: Int },
    #[error("unknown function {0:?}")]
    UnknownFunction(String),
    #[error("tried to show empty set of results")]
    EmptyResultSet,
}
